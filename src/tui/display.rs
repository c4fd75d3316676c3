//! 命令行显示模块
//!
//! 非交互模式下打印提交记录。

use crate::definition::WizardDefinition;
use crate::submit::Submission;
use crate::tui::labels::value_label;
use rust_i18n::t;

/// 格式化提交记录列表
pub fn format_submissions(submissions: &[Submission], definition: &WizardDefinition) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "═".repeat(60)));
    out.push_str(&format!(
        "{:^60}\n",
        t!("submissions_count", count = submissions.len())
    ));
    out.push_str(&format!("{}\n", "═".repeat(60)));

    if submissions.is_empty() {
        out.push_str(&format!("\n  {}\n", t!("no_submissions")));
    }

    for submission in submissions {
        out.push_str(&format!(
            "\n  {}  {}  ({})\n",
            submission.id,
            submission
                .submitted_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S"),
            submission.wizard
        ));
        out.push_str(&format!("  {}\n", "─".repeat(40)));
        for (key, value) in &submission.data {
            let (label, text) = match definition.field(key) {
                Some(field) => (field.label.clone(), value_label(field, Some(value))),
                None => (key.clone(), value.to_string()),
            };
            out.push_str(&format!("    {}: {}\n", label, text));
        }
    }

    out.push_str(&format!("\n{}\n", "═".repeat(60)));
    out
}

/// 显示提交记录列表
pub fn display_submissions(submissions: &[Submission], definition: &WizardDefinition) {
    print!("{}", format_submissions(submissions, definition));
}

/// 是否运行交互模式（无参数时启用）
pub fn should_run_interactive() -> bool {
    std::env::args().len() == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_format_uses_field_labels() {
        let submission = Submission {
            id: "00000000deadbeef".into(),
            wizard: "Expert Onboarding".into(),
            submitted_at: Utc::now(),
            data: json!({"full_name": "Ada", "skills": ["Rust", "RAG"], "extra": 1})
                .as_object()
                .cloned()
                .unwrap(),
        };
        let text = format_submissions(&[submission], &WizardDefinition::default());

        assert!(text.contains("00000000deadbeef"));
        assert!(text.contains("Full name: Ada"));
        assert!(text.contains("Skills: Rust; RAG"));
        assert!(text.contains("extra: 1"));
    }
}
