//! 入驻表单渲染

use crate::definition::{FieldDefinition, FieldKind};
use crate::tui::components::{
    list_content_width, render_banner, render_hint, render_title_block, three_panel_layout,
    truncate_value,
};
use crate::tui::labels::{field_kind_label, issue_label, value_label};
use crate::tui::state::OnboardingSession;
use crate::tui::theme::{
    config::{HIGHLIGHT_SYMBOL, REQUIRED_MARK},
    theme,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};
use rust_i18n::t;
use std::borrow::Cow;

/// 渲染入驻表单
pub fn draw(frame: &mut Frame, area: Rect, session: &OnboardingSession) {
    let [header, body, footer] = three_panel_layout(area);

    render_title_block(&session.definition().title, frame, header);

    let [progress_area, description_area, form_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(body);

    draw_progress(frame, progress_area, session);

    if let Some(description) = session.current_step().and_then(|s| s.description.as_deref()) {
        let paragraph = Paragraph::new(description)
            .style(theme().hint())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, description_area);
    }

    draw_form(frame, form_area, session);
    draw_status(frame, status_area, session);

    render_hint(&hint_text(session), frame, footer);
}

fn draw_progress(frame: &mut Frame, area: Rect, session: &OnboardingSession) {
    let controller = session.controller();
    let step_title = session
        .current_step()
        .map(|s| s.title.as_str())
        .unwrap_or_default();
    let label = t!(
        "step_of",
        current = controller.current_step(),
        total = controller.step_count(),
        title = step_title
    );

    let gauge = Gauge::default()
        .block(
            Block::bordered()
                .title(t!("progress_title"))
                .border_type(BorderType::Rounded),
        )
        .gauge_style(theme().progress())
        .ratio(controller.progress().clamp(0.0, 1.0))
        .label(label.to_string());

    frame.render_widget(gauge, area);
}

fn draw_form(frame: &mut Frame, area: Rect, session: &OnboardingSession) {
    let content_width = list_content_width(area);
    let selected = session.form.selected.min(session.row_count() - 1);

    let items: Vec<ListItem> = session
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let is_selected = idx == selected;
            let line = field_line(session, field, is_selected, content_width);
            let style = if is_selected && session.form.in_input_mode {
                theme().selected().add_modifier(Modifier::ITALIC)
            } else if is_selected {
                theme().selected()
            } else {
                theme().normal()
            };
            ListItem::new(line).style(style)
        })
        .chain(std::iter::once({
            let label = if session.is_submitting() {
                t!("submitting")
            } else if session.controller().is_last_input_step() {
                t!("action_submit")
            } else {
                t!("action_next")
            };
            let style = if selected == session.fields().len() {
                theme().selected().add_modifier(Modifier::BOLD)
            } else {
                theme().accent()
            };
            ListItem::new(format!("→ {}", label)).style(style)
        }))
        .collect();

    let list = List::new(items)
        .block(
            Block::bordered()
                .title(t!("form_fields"))
                .border_type(BorderType::Rounded),
        )
        .highlight_style(theme().selected())
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    let mut list_state = ListState::default()
        .with_offset(session.form.scroll_offset)
        .with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn field_line(
    session: &OnboardingSession,
    field: &FieldDefinition,
    is_selected: bool,
    width: usize,
) -> Line<'static> {
    let mark = if field.required { REQUIRED_MARK } else { "" };
    let mut spans = vec![Span::raw(format!("{}{}: ", field.label, mark))];

    if is_selected && session.form.in_input_mode {
        let (left, right) = session.form.input.split_at_cursor();
        spans.push(Span::raw(format!("[{}|{}]", left, right)));
        return Line::from(spans);
    }

    let value = session.value_of(&field.key);
    let text = value_label(field, value);
    if text.is_empty() {
        let placeholder = field
            .placeholder
            .clone()
            .unwrap_or_else(|| format!("<{}>", field_kind_label(field.kind)));
        spans.push(Span::styled(placeholder, theme().hint()));
    } else {
        spans.push(Span::raw(truncate_value(&text, width)));
    }

    if field.kind == FieldKind::Choice {
        spans.push(Span::styled(
            format!("  ({}/{})", option_position(field, value), field.options.len()),
            theme().hint(),
        ));
    }

    if let Some(issue) = session.issue_for(&field.key) {
        spans.push(Span::styled(format!("  ✗ {}", issue_label(issue)), theme().error()));
    }

    Line::from(spans)
}

fn option_position(field: &FieldDefinition, value: Option<&serde_json::Value>) -> usize {
    value
        .and_then(|v| v.as_str())
        .and_then(|v| field.options.iter().position(|o| o == v))
        .map_or(0, |i| i + 1)
}

fn draw_status(frame: &mut Frame, area: Rect, session: &OnboardingSession) {
    if session.is_submitting() {
        render_banner(&t!("submitting_banner"), theme().warning(), frame, area);
    } else if let Some(ref message) = session.banner {
        let text = t!("submit_failed", error = message.as_str());
        render_banner(&text, theme().error(), frame, area);
    } else if !session.issues.is_empty() {
        let text = t!("step_incomplete", count = session.issues.len());
        render_banner(&text, theme().error(), frame, area);
    }
}

fn hint_text(session: &OnboardingSession) -> Cow<'static, str> {
    if session.is_submitting() {
        return t!("submitting_hint");
    }
    if session.form.in_input_mode {
        return t!("input_mode_hint");
    }
    if session.is_action_selected() {
        return if session.controller().is_last_input_step() {
            t!("form_submit_hint")
        } else {
            t!("form_next_hint")
        };
    }
    match session.selected_field() {
        Some(field) if field.is_input_field() => t!("form_text_hint"),
        Some(_) => t!("form_option_hint"),
        None => t!("form_next_hint"),
    }
}
