//! Wizard definitions
//!
//! A definition lists the input steps of a wizard and the fields each step
//! asks for. It is plain data: the step controller only needs the number of
//! steps, while hosts use the fields to render forms and to check answers
//! before moving on.

use crate::error::{Error, Result};
use crate::wizard::FormData;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Separator used when a list field is typed as a single line
pub const LIST_SEPARATOR: char = ';';

/// How a field is entered and stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text, stored as a string
    #[default]
    Text,
    /// `;`-separated text, stored as an array of strings
    List,
    /// One of `options`, stored as a string
    Choice,
    /// Yes/no, stored as a boolean
    Toggle,
}

/// A single form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Key in the form data
    pub key: String,

    /// Label shown to the user
    pub label: String,

    #[serde(default)]
    pub kind: FieldKind,

    /// Allowed values for choice fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Whether the field must be filled before leaving its step
    #[serde(default)]
    pub required: bool,

    /// Regular expression text values must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Example value shown while the field is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// One input step of the wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Stable identifier
    pub id: String,

    /// Title shown above the step's fields
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Ordered list of input steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardDefinition {
    /// Wizard name, also recorded on every submission
    pub title: String,

    pub steps: Vec<StepDefinition>,
}

/// Why a field's value is not acceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Required field left empty
    Missing,
    /// Text does not match the field pattern
    PatternMismatch,
    /// Choice value is not one of the options
    UnknownOption,
}

/// A problem found while checking form data against a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub key: String,
    pub label: String,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::Missing => write!(f, "{} is required", self.label),
            IssueKind::PatternMismatch => write!(f, "{} has an invalid format", self.label),
            IssueKind::UnknownOption => write!(f, "{} is not one of the allowed options", self.label),
        }
    }
}

impl FieldDefinition {
    fn new(key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            options: Vec::new(),
            required: false,
            pattern: None,
            placeholder: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    /// Whether the field is edited as a line of text
    pub fn is_input_field(&self) -> bool {
        matches!(self.kind, FieldKind::Text | FieldKind::List)
    }

    /// Convert typed text into the stored value
    pub fn parse_input(&self, raw: &str) -> Value {
        match self.kind {
            FieldKind::Text | FieldKind::Choice => Value::String(raw.trim().to_string()),
            FieldKind::List => Value::Array(
                raw.split(LIST_SEPARATOR)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            ),
            FieldKind::Toggle => Value::Bool(matches!(
                raw.trim().to_lowercase().as_str(),
                "true" | "yes" | "y" | "1" | "on"
            )),
        }
    }

    /// Render a stored value back into editable text
    pub fn format_value(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
            Some(other) => other.to_string(),
        }
    }

    /// Option after `current`, wrapping around; the first option if unset
    pub fn next_option(&self, current: Option<&Value>) -> Option<Value> {
        let count = self.options.len();
        if count == 0 {
            return None;
        }
        let next = match self.option_index(current) {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        Some(Value::String(self.options[next].clone()))
    }

    /// Option before `current`, wrapping around; the last option if unset
    pub fn prev_option(&self, current: Option<&Value>) -> Option<Value> {
        let count = self.options.len();
        if count == 0 {
            return None;
        }
        let prev = match self.option_index(current) {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        Some(Value::String(self.options[prev].clone()))
    }

    fn option_index(&self, current: Option<&Value>) -> Option<usize> {
        let current = current?.as_str()?;
        self.options.iter().position(|o| o == current)
    }

    /// Check one value against this field
    pub fn check(&self, value: Option<&Value>) -> Option<IssueKind> {
        if is_blank(value) {
            return self.required.then_some(IssueKind::Missing);
        }

        if self.kind == FieldKind::Choice {
            let known = value
                .and_then(Value::as_str)
                .map(|v| self.options.iter().any(|o| o == v))
                .unwrap_or(false);
            if !known {
                return Some(IssueKind::UnknownOption);
            }
        }

        if let Some(pattern) = &self.pattern {
            // patterns are validated when the definition is loaded
            if let Ok(re) = Regex::new(pattern) {
                let matches = match value {
                    Some(Value::String(s)) => re.is_match(s),
                    Some(Value::Array(items)) => items
                        .iter()
                        .all(|item| item.as_str().map(|s| re.is_match(s)).unwrap_or(false)),
                    _ => true,
                };
                if !matches {
                    return Some(IssueKind::PatternMismatch);
                }
            }
        }

        None
    }
}

/// Empty strings, empty lists, `null` and `false` count as not filled in
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(_) => false,
    }
}

impl StepDefinition {
    fn new(id: &str, title: &str, description: &str, fields: Vec<FieldDefinition>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: Some(description.to_string()),
            fields,
        }
    }

    /// Check every field of this step
    pub fn check(&self, data: &FormData) -> Vec<FieldIssue> {
        self.fields
            .iter()
            .filter_map(|field| {
                field.check(data.get(&field.key)).map(|kind| FieldIssue {
                    key: field.key.clone(),
                    label: field.label.clone(),
                    kind,
                })
            })
            .collect()
    }
}

impl Default for WizardDefinition {
    fn default() -> Self {
        Self::expert_onboarding()
    }
}

impl WizardDefinition {
    /// The expert onboarding flow of the talent marketplace
    pub fn expert_onboarding() -> Self {
        Self {
            title: "Expert Onboarding".to_string(),
            steps: vec![
                StepDefinition::new(
                    "profile",
                    "Profile",
                    "Tell clients who you are.",
                    vec![
                        FieldDefinition::new("full_name", "Full name", FieldKind::Text)
                            .required()
                            .placeholder("Ada Lovelace"),
                        FieldDefinition::new("email", "Email", FieldKind::Text)
                            .required()
                            .pattern(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
                            .placeholder("ada@example.com"),
                        FieldDefinition::new("headline", "Headline", FieldKind::Text)
                            .placeholder("ML engineer, LLM evaluation"),
                        FieldDefinition::new("linkedin", "LinkedIn URL", FieldKind::Text)
                            .pattern(r"^https?://")
                            .placeholder("https://linkedin.com/in/ada"),
                    ],
                ),
                StepDefinition::new(
                    "expertise",
                    "Expertise",
                    "What kind of AI work do you take on?",
                    vec![
                        FieldDefinition::new("primary_domain", "Primary domain", FieldKind::Choice)
                            .required()
                            .options(&[
                                "Machine Learning",
                                "Natural Language Processing",
                                "Computer Vision",
                                "Data Engineering",
                                "MLOps",
                                "AI Strategy",
                            ]),
                        FieldDefinition::new("skills", "Skills", FieldKind::List)
                            .required()
                            .placeholder("PyTorch; RAG; evaluation"),
                        FieldDefinition::new("years_experience", "Years of experience", FieldKind::Text)
                            .required()
                            .pattern(r"^\d{1,2}$")
                            .placeholder("5"),
                    ],
                ),
                StepDefinition::new(
                    "availability",
                    "Availability & Rates",
                    "When and how can clients book you?",
                    vec![
                        FieldDefinition::new("hours_per_week", "Hours per week", FieldKind::Choice)
                            .required()
                            .options(&["< 10", "10-20", "20-30", "30+"]),
                        FieldDefinition::new("hourly_rate", "Hourly rate (USD)", FieldKind::Text)
                            .required()
                            .pattern(r"^\d+(\.\d{1,2})?$")
                            .placeholder("120"),
                        FieldDefinition::new("remote_only", "Remote only", FieldKind::Toggle),
                    ],
                ),
                StepDefinition::new(
                    "review",
                    "Review & Submit",
                    "Confirm and send your application.",
                    vec![
                        FieldDefinition::new("notes", "Anything else?", FieldKind::Text),
                        FieldDefinition::new("accept_terms", "I accept the terms", FieldKind::Toggle)
                            .required(),
                    ],
                ),
            ],
        }
    }

    /// Number of input steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Step by its 1-based position
    pub fn step(&self, number: usize) -> Option<&StepDefinition> {
        number.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// All fields in step order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.steps.iter().flat_map(|s| s.fields.iter())
    }

    /// Field by key
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields().find(|f| f.key == key)
    }

    /// Starting data: toggles default to `false`, everything else is absent
    pub fn initial_data(&self) -> FormData {
        self.fields()
            .filter(|f| f.kind == FieldKind::Toggle)
            .map(|f| (f.key.clone(), Value::Bool(false)))
            .collect()
    }

    /// Check the fields of one step (1-based); unknown steps have no issues
    pub fn check_step(&self, number: usize, data: &FormData) -> Vec<FieldIssue> {
        self.step(number).map(|s| s.check(data)).unwrap_or_default()
    }

    /// Check the fields of every step
    pub fn check_all(&self, data: &FormData) -> Vec<FieldIssue> {
        self.steps.iter().flat_map(|s| s.check(data)).collect()
    }

    /// Reject definitions a wizard cannot be built from
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::Definition(format!(
                "'{}' has no steps",
                self.title
            )));
        }

        let mut keys = HashSet::new();
        for field in self.fields() {
            if !keys.insert(field.key.as_str()) {
                return Err(Error::Definition(format!(
                    "field key '{}' is used more than once",
                    field.key
                )));
            }
            if field.kind == FieldKind::Choice && field.options.is_empty() {
                return Err(Error::Definition(format!(
                    "choice field '{}' has no options",
                    field.key
                )));
            }
            if let Some(pattern) = &field.pattern {
                Regex::new(pattern)?;
            }
        }

        Ok(())
    }
}
