//! 已提交记录浏览状态

use crate::submit::{Submission, list_submissions};
use crate::tui::state::selection::Selectable;
use ratatui::widgets::ListState;
use std::path::Path;
use tracing::warn;

/// 提交记录列表
#[derive(Debug, Default)]
pub struct SubmissionsState {
    /// 记录（最新在前）
    pub submissions: Vec<Submission>,
    /// 列表状态
    pub list_state: ListState,
    /// 读取失败信息
    pub error: Option<String>,
}

impl SubmissionsState {
    /// 从发件箱目录加载
    pub fn load(outbox_dir: &Path) -> Self {
        match list_submissions(outbox_dir) {
            Ok(submissions) => {
                let selected = (!submissions.is_empty()).then_some(0);
                Self {
                    submissions,
                    list_state: ListState::default().with_selected(selected),
                    error: None,
                }
            }
            Err(e) => {
                warn!(outbox = %outbox_dir.display(), error = %e, "Failed to list submissions");
                Self {
                    error: Some(e.to_string()),
                    ..Self::default()
                }
            }
        }
    }

    /// 当前选中的记录
    pub fn selected(&self) -> Option<&Submission> {
        self.list_state
            .selected()
            .and_then(|i| self.submissions.get(i))
    }
}

impl Selectable for SubmissionsState {
    fn count(&self) -> usize {
        self.submissions.len()
    }

    fn list_state(&self) -> &ListState {
        &self.list_state
    }

    fn list_state_mut(&mut self) -> &mut ListState {
        &mut self.list_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submit::{OutboxSubmitter, Submitter};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_load_and_navigate() {
        let dir = tempdir().unwrap();
        let submitter = OutboxSubmitter::new(dir.path());
        for name in ["Ada", "Grace"] {
            let data = json!({ "full_name": name }).as_object().cloned().unwrap();
            submitter.submit(&data).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let mut state = SubmissionsState::load(dir.path());
        assert_eq!(state.count(), 2);
        assert_eq!(state.selected().unwrap().data["full_name"], json!("Grace"));
        state.next();
        assert_eq!(state.selected().unwrap().data["full_name"], json!("Ada"));
    }

    #[test]
    fn test_empty_outbox() {
        let dir = tempdir().unwrap();
        let mut state = SubmissionsState::load(&dir.path().join("missing"));
        assert!(state.selected().is_none());
        state.next();
        assert!(state.selected().is_none());
        assert!(state.error.is_none());
    }
}
