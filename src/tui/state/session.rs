//! 入驻表单会话状态
//!
//! 持有步骤控制器和当前步骤的表单光标。控制器的通知经由通道送回，
//! 每次事件循环调用 [`OnboardingSession::tick`] 处理。

use crate::config::Config;
use crate::definition::{FieldDefinition, FieldIssue, FieldKind, StepDefinition, WizardDefinition};
use crate::hash::submission_id;
use crate::tui::state::input::InputState;
use crate::tui::theme::config::FORM_VISIBLE_ROWS;
use crate::wizard::{FormData, Transition, WizardController, WizardEvent};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use tracing::{debug, info};

/// 当前步骤的表单光标
#[derive(Debug, Default)]
pub struct FormState {
    /// 选中行；字段之后还有一行“下一步/提交”
    pub selected: usize,
    /// 是否处于输入模式
    pub in_input_mode: bool,
    /// 输入状态
    pub input: InputState,
    /// 表单滚动偏移
    pub scroll_offset: usize,
}

impl FormState {
    /// 选择下一行（循环）
    pub fn next_row(&mut self, row_count: usize) {
        if row_count == 0 {
            return;
        }
        self.selected = (self.selected + 1) % row_count;
        self.auto_scroll();
    }

    /// 选择上一行（循环）
    pub fn prev_row(&mut self, row_count: usize) {
        if row_count == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            row_count - 1
        } else {
            self.selected - 1
        };
        self.auto_scroll();
    }

    /// 跳到指定行
    pub fn jump_to(&mut self, row: usize) {
        self.selected = row;
        self.auto_scroll();
    }

    fn auto_scroll(&mut self) {
        if self.selected >= self.scroll_offset + FORM_VISIBLE_ROWS {
            self.scroll_offset = self.selected + 1 - FORM_VISIBLE_ROWS;
        } else if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        }
    }
}

/// 一次入驻流程
#[derive(Debug)]
pub struct OnboardingSession {
    definition: WizardDefinition,
    controller: WizardController,
    events: Receiver<WizardEvent>,
    outbox_dir: PathBuf,
    /// 表单光标
    pub form: FormState,
    /// 当前步骤未通过的字段
    pub issues: Vec<FieldIssue>,
    /// 最近一次提交失败的信息
    pub banner: Option<String>,
    submission_id: Option<String>,
    /// 完成结果是否已被取走
    completion_taken: bool,
}

impl OnboardingSession {
    /// 按配置开始新的入驻流程
    pub fn start(config: &Config) -> crate::Result<Self> {
        let definition = config.wizard.clone();
        let (tx, events) = mpsc::channel();

        let mut controller = WizardController::new(
            definition.step_count(),
            definition.initial_data(),
            config.submitter(),
        )?
        .with_observer(tx);
        if let Some(timeout) = config.submit_timeout() {
            controller = controller.with_submit_timeout(timeout);
        }

        info!(
            wizard = %definition.title,
            steps = definition.step_count(),
            outbox = %config.outbox_dir.display(),
            "Onboarding session started"
        );

        Ok(Self {
            definition,
            controller,
            events,
            outbox_dir: config.outbox_dir.clone(),
            form: FormState::default(),
            issues: Vec::new(),
            banner: None,
            submission_id: None,
            completion_taken: false,
        })
    }

    pub fn definition(&self) -> &WizardDefinition {
        &self.definition
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    pub fn outbox_dir(&self) -> &std::path::Path {
        &self.outbox_dir
    }

    /// 提交成功后的记录编号
    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }

    /// 当前步骤定义；完成后为 `None`
    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.definition.step(self.controller.current_step())
    }

    /// 当前步骤的字段
    pub fn fields(&self) -> &[FieldDefinition] {
        self.current_step()
            .map(|step| step.fields.as_slice())
            .unwrap_or(&[])
    }

    /// 表单行数（字段 + 操作行）
    pub fn row_count(&self) -> usize {
        self.fields().len() + 1
    }

    /// 是否选中操作行
    pub fn is_action_selected(&self) -> bool {
        self.form.selected >= self.fields().len()
    }

    /// 当前选中的字段
    pub fn selected_field(&self) -> Option<&FieldDefinition> {
        self.fields().get(self.form.selected)
    }

    /// 字段当前值
    pub fn value_of(&self, key: &str) -> Option<&Value> {
        self.controller.form_data().get(key)
    }

    /// 字段的检查问题
    pub fn issue_for(&self, key: &str) -> Option<&FieldIssue> {
        self.issues.iter().find(|issue| issue.key == key)
    }

    pub fn is_submitting(&self) -> bool {
        self.controller.is_submitting()
    }

    pub fn is_complete(&self) -> bool {
        self.controller.is_complete()
    }

    /// 流程完成后返回一次提交编号，之后返回 `None`
    pub fn take_completion(&mut self) -> Option<String> {
        if !self.is_complete() || self.completion_taken {
            return None;
        }
        self.completion_taken = true;
        Some(self.submission_id.clone().unwrap_or_default())
    }

    /// 是否可编辑（提交中锁定表单）
    fn is_editable(&self) -> bool {
        !self.controller.is_submitting() && !self.controller.is_complete()
    }

    /// 选择下一行
    pub fn select_next(&mut self) {
        let rows = self.row_count();
        self.form.next_row(rows);
    }

    /// 选择上一行
    pub fn select_prev(&mut self) {
        let rows = self.row_count();
        self.form.prev_row(rows);
    }

    /// 回车：操作行前进，文本字段进入编辑，选项字段切换
    pub fn activate(&mut self) -> Transition {
        if self.is_action_selected() {
            return self.advance();
        }
        match self.selected_field().map(|f| f.kind) {
            Some(FieldKind::Text) | Some(FieldKind::List) => self.begin_edit(),
            Some(FieldKind::Choice) | Some(FieldKind::Toggle) => self.cycle(true),
            None => {}
        }
        Transition::Ignored
    }

    /// 切换选项字段或开关字段
    pub fn cycle(&mut self, forward: bool) {
        if !self.is_editable() {
            return;
        }
        let Some(field) = self.selected_field().cloned() else {
            return;
        };

        let current = self.value_of(&field.key);
        let value = match field.kind {
            FieldKind::Choice if forward => field.next_option(current),
            FieldKind::Choice => field.prev_option(current),
            FieldKind::Toggle => Some(Value::Bool(!current.and_then(Value::as_bool).unwrap_or(false))),
            FieldKind::Text | FieldKind::List => None,
        };
        if let Some(value) = value {
            self.set_value(&field.key, value);
        }
    }

    /// 进入输入模式
    pub fn begin_edit(&mut self) {
        if !self.is_editable() {
            return;
        }
        let Some(field) = self.selected_field() else {
            return;
        };
        if !field.is_input_field() {
            return;
        }
        let text = field.format_value(self.value_of(&field.key));
        self.form.input = InputState::with_value(&text);
        self.form.in_input_mode = true;
    }

    /// 退出输入模式并写入表单数据
    pub fn commit_edit(&mut self) {
        if !self.form.in_input_mode {
            return;
        }
        self.form.in_input_mode = false;
        let raw = self.form.input.take();
        if let Some(field) = self.selected_field().cloned() {
            let value = field.parse_input(&raw);
            self.set_value(&field.key, value);
        }
    }

    /// 退出输入模式（不保存）
    pub fn cancel_edit(&mut self) {
        self.form.in_input_mode = false;
        self.form.input.take();
    }

    fn set_value(&mut self, key: &str, value: Value) {
        debug!(field = key, "Field updated");
        let mut patch = FormData::new();
        patch.insert(key.to_string(), value);
        self.controller.update_data(patch);
        self.issues.retain(|issue| issue.key != key);
    }

    /// 检查当前步骤后前进；最后一步会发起提交
    pub fn advance(&mut self) -> Transition {
        if self.is_editable() {
            let issues = self
                .definition
                .check_step(self.controller.current_step(), self.controller.form_data());
            if !issues.is_empty() {
                debug!(
                    step = self.controller.current_step(),
                    issues = issues.len(),
                    "Step has unresolved fields"
                );
                let first = issues
                    .first()
                    .and_then(|issue| self.fields().iter().position(|f| f.key == issue.key));
                if let Some(row) = first {
                    self.form.jump_to(row);
                }
                self.issues = issues;
                return Transition::Ignored;
            }
        }

        let transition = self.controller.advance();
        self.drain_events();
        transition
    }

    /// 返回上一步
    pub fn retreat(&mut self) -> Transition {
        let transition = self.controller.retreat();
        self.drain_events();
        transition
    }

    /// 处理提交结果与控制器通知，返回是否需要重绘
    pub fn tick(&mut self) -> bool {
        let resolved = self.controller.poll().is_some();
        self.drain_events() || resolved
    }

    fn drain_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            changed = true;
            match event {
                WizardEvent::StepChanged(step) => {
                    debug!(step, "Form reset for new step");
                    self.form = FormState::default();
                    self.issues.clear();
                }
                WizardEvent::SubmitStarted => {
                    self.banner = None;
                }
                WizardEvent::SubmitSucceeded => {
                    self.submission_id = self
                        .controller
                        .submitted_data()
                        .and_then(|data| submission_id(data).ok());
                }
                WizardEvent::SubmitFailed(message) => {
                    self.banner = Some(message);
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn session(outbox: &std::path::Path) -> OnboardingSession {
        let config = Config {
            outbox_dir: outbox.to_path_buf(),
            ..Config::default()
        };
        OnboardingSession::start(&config).unwrap()
    }

    fn type_into(session: &mut OnboardingSession, key: &str, text: &str) {
        let row = session.fields().iter().position(|f| f.key == key).unwrap();
        session.form.jump_to(row);
        session.activate();
        assert!(session.form.in_input_mode);
        session.form.input.take();
        for c in text.chars() {
            session.form.input.insert_char(c);
        }
        session.commit_edit();
    }

    fn choose(session: &mut OnboardingSession, key: &str) {
        let row = session.fields().iter().position(|f| f.key == key).unwrap();
        session.form.jump_to(row);
        session.activate();
    }

    fn tick_until_settled(session: &mut OnboardingSession) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while session.is_submitting() && Instant::now() < deadline {
            session.tick();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_incomplete_step_blocks_advance() {
        let dir = tempdir().unwrap();
        let mut session = session(dir.path());

        assert_eq!(session.advance(), Transition::Ignored);
        assert_eq!(session.controller().current_step(), 1);
        assert!(session.issue_for("full_name").is_some());
        assert_eq!(session.form.selected, 0);

        type_into(&mut session, "full_name", "Ada Lovelace");
        assert!(session.issue_for("full_name").is_none());
        assert!(session.issue_for("email").is_some());
    }

    #[test]
    fn test_step_change_resets_form() {
        let dir = tempdir().unwrap();
        let mut session = session(dir.path());

        type_into(&mut session, "full_name", "Ada Lovelace");
        type_into(&mut session, "email", "ada@example.com");
        session.form.jump_to(session.row_count() - 1);
        assert!(session.is_action_selected());

        assert_eq!(session.activate(), Transition::Moved { from: 1, to: 2 });
        assert_eq!(session.form.selected, 0);
        assert_eq!(session.current_step().unwrap().id, "expertise");

        assert_eq!(session.retreat(), Transition::Moved { from: 2, to: 1 });
        assert_eq!(
            session.value_of("full_name"),
            Some(&Value::String("Ada Lovelace".into()))
        );
    }

    #[test]
    fn test_cycle_choice_and_toggle() {
        let dir = tempdir().unwrap();
        let mut session = session(dir.path());
        type_into(&mut session, "full_name", "Ada");
        type_into(&mut session, "email", "ada@example.com");
        session.advance();

        choose(&mut session, "primary_domain");
        assert_eq!(
            session.value_of("primary_domain"),
            Some(&Value::String("Machine Learning".into()))
        );
        session.cycle(false);
        assert_eq!(
            session.value_of("primary_domain"),
            Some(&Value::String("AI Strategy".into()))
        );

        type_into(&mut session, "skills", "Rust; LLM evals");
        type_into(&mut session, "years_experience", "9");
        session.advance();

        choose(&mut session, "remote_only");
        assert_eq!(session.value_of("remote_only"), Some(&Value::Bool(true)));
        session.cycle(true);
        assert_eq!(session.value_of("remote_only"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_full_walk_stores_submission() {
        let dir = tempdir().unwrap();
        let mut session = session(dir.path());

        type_into(&mut session, "full_name", "Ada Lovelace");
        type_into(&mut session, "email", "ada@example.com");
        session.advance();
        choose(&mut session, "primary_domain");
        type_into(&mut session, "skills", "PyTorch");
        type_into(&mut session, "years_experience", "12");
        session.advance();
        choose(&mut session, "hours_per_week");
        type_into(&mut session, "hourly_rate", "150");
        session.advance();
        choose(&mut session, "accept_terms");

        assert_eq!(session.advance(), Transition::SubmitStarted);
        assert!(session.is_submitting());
        // form is locked while submitting
        session.begin_edit();
        assert!(!session.form.in_input_mode);

        tick_until_settled(&mut session);
        assert!(session.is_complete());
        assert!(session.banner.is_none());

        let id = session.submission_id().unwrap().to_string();
        assert!(dir.path().join(format!("{id}.json")).exists());
    }

    #[test]
    fn test_cancel_edit_keeps_value() {
        let dir = tempdir().unwrap();
        let mut session = session(dir.path());
        type_into(&mut session, "headline", "ML engineer");

        session.begin_edit();
        session.form.input.insert_char('!');
        session.cancel_edit();
        assert_eq!(
            session.value_of("headline"),
            Some(&Value::String("ML engineer".into()))
        );
    }
}
