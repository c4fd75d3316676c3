//! 本地化标签映射
//!
//! 将字段值、问题类型等映射为翻译后的显示文本，避免依赖 Debug 输出。

use crate::definition::{FieldDefinition, FieldIssue, FieldKind, IssueKind};
use rust_i18n::t;
use serde_json::Value;
use std::borrow::Cow;

/// 布尔值标签
pub fn bool_label(value: bool) -> Cow<'static, str> {
    if value {
        t!("option_yes")
    } else {
        t!("option_no")
    }
}

/// 字段类型标签
pub fn field_kind_label(kind: FieldKind) -> Cow<'static, str> {
    match kind {
        FieldKind::Text => t!("kind_text"),
        FieldKind::List => t!("kind_list"),
        FieldKind::Choice => t!("kind_choice"),
        FieldKind::Toggle => t!("kind_toggle"),
    }
}

/// 字段问题说明
pub fn issue_label(issue: &FieldIssue) -> Cow<'static, str> {
    match issue.kind {
        IssueKind::Missing => t!("issue_missing", field = issue.label.as_str()),
        IssueKind::PatternMismatch => t!("issue_pattern", field = issue.label.as_str()),
        IssueKind::UnknownOption => t!("issue_unknown_option", field = issue.label.as_str()),
    }
}

/// 字段值的显示文本
pub fn value_label(field: &FieldDefinition, value: Option<&Value>) -> String {
    match (field.kind, value) {
        (FieldKind::Toggle, Some(Value::Bool(b))) => bool_label(*b).to_string(),
        (FieldKind::Toggle, _) => bool_label(false).to_string(),
        _ => field.format_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::WizardDefinition;
    use serde_json::json;

    #[test]
    fn test_value_label_formats_lists_and_toggles() {
        let definition = WizardDefinition::default();

        let skills = definition.field("skills").unwrap();
        assert_eq!(value_label(skills, Some(&json!(["Rust", "RAG"]))), "Rust; RAG");

        let remote = definition.field("remote_only").unwrap();
        assert_eq!(value_label(remote, Some(&json!(true))), bool_label(true));
        assert_eq!(value_label(remote, None), bool_label(false));
    }
}
