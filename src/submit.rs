//! Submit collaborators
//!
//! The wizard hands its form data to a [`Submitter`] when the user leaves the
//! last input step. [`OutboxSubmitter`] is the one shipped with the
//! application: it stores each submission as a JSON record in an outbox
//! directory, from where another process can pick it up.

use crate::definition::WizardDefinition;
use crate::error::{Error, Result, SubmitError};
use crate::hash::submission_id;
use crate::wizard::FormData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Receives the form data of a finished wizard
///
/// Called on a background thread; it may block for as long as it needs.
pub trait Submitter: Send + Sync + 'static {
    fn submit(&self, data: &FormData) -> std::result::Result<(), SubmitError>;
}

impl<F> Submitter for F
where
    F: Fn(&FormData) -> std::result::Result<(), SubmitError> + Send + Sync + 'static,
{
    fn submit(&self, data: &FormData) -> std::result::Result<(), SubmitError> {
        self(data)
    }
}

/// A stored submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Content hash of `data`
    pub id: String,

    /// Title of the wizard that produced it
    pub wizard: String,

    pub submitted_at: DateTime<Utc>,

    pub data: FormData,
}

impl Submission {
    /// Load a submission record
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| Error::SubmissionRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Writes submissions into an outbox directory as `<id>.json`
#[derive(Debug, Clone)]
pub struct OutboxSubmitter {
    outbox_dir: PathBuf,
    wizard_name: String,
    definition: Option<Arc<WizardDefinition>>,
    delay: Duration,
}

impl OutboxSubmitter {
    /// Create a submitter without field checks or delay
    pub fn new<P: Into<PathBuf>>(outbox_dir: P) -> Self {
        Self {
            outbox_dir: outbox_dir.into(),
            wizard_name: WizardDefinition::default().title,
            definition: None,
            delay: Duration::ZERO,
        }
    }

    /// Re-check every field against `definition` before storing
    pub fn with_definition(mut self, definition: WizardDefinition) -> Self {
        self.wizard_name = definition.title.clone();
        self.definition = Some(Arc::new(definition));
        self
    }

    /// Sleep before storing, to mimic a slow remote endpoint
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn outbox_dir(&self) -> &Path {
        &self.outbox_dir
    }

    /// Where the submission with `id` is stored
    pub fn submission_path(&self, id: &str) -> PathBuf {
        self.outbox_dir.join(id).with_extension("json")
    }

    fn store(&self, submission: &Submission, path: &Path) -> std::result::Result<(), SubmitError> {
        fs::create_dir_all(&self.outbox_dir)?;

        // Write to a temporary file first, then rename so readers never see
        // a partial record
        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, submission)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl Submitter for OutboxSubmitter {
    fn submit(&self, data: &FormData) -> std::result::Result<(), SubmitError> {
        if !self.delay.is_zero() {
            debug!(delay_ms = self.delay.as_millis() as u64, "Delaying submission");
            std::thread::sleep(self.delay);
        }

        if let Some(definition) = &self.definition {
            let issues = definition.check_all(data);
            if !issues.is_empty() {
                let reasons = issues
                    .iter()
                    .map(|issue| issue.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(SubmitError::Rejected(reasons));
            }
        }

        let id = submission_id(data)?;
        let path = self.submission_path(&id);
        if path.exists() {
            info!(%id, path = %path.display(), "Identical submission already stored");
            return Ok(());
        }

        let submission = Submission {
            id: id.clone(),
            wizard: self.wizard_name.clone(),
            submitted_at: Utc::now(),
            data: data.clone(),
        };
        self.store(&submission, &path)?;

        info!(%id, path = %path.display(), fields = data.len(), "Stored submission");
        Ok(())
    }
}

/// All readable submissions in `outbox_dir`, newest first
///
/// A missing directory is an empty outbox. Files that fail to parse are
/// skipped with a warning.
pub fn list_submissions(outbox_dir: &Path) -> Result<Vec<Submission>> {
    if !outbox_dir.exists() {
        return Ok(Vec::new());
    }

    let mut submissions: Vec<Submission> = fs::read_dir(outbox_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext == std::ffi::OsStr::new("json"))
                .unwrap_or(false)
        })
        .filter_map(|path| match Submission::load(&path) {
            Ok(submission) => Some(submission),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable submission");
                None
            }
        })
        .collect();

    submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(submissions)
}
