//! 已提交记录浏览渲染

use crate::tui::components::{
    list_content_width, render_hint, render_title_block, three_panel_layout, truncate_value,
    wrap_lines,
};
use crate::tui::state::AppState;
use crate::tui::theme::{config::HIGHLIGHT_SYMBOL, theme};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::{Block, BorderType, Cell, List, ListItem, Paragraph, Row, Table, Wrap},
};
use rust_i18n::t;
use serde_json::Value;

const KEY_COLUMN_WIDTH: u16 = 18;

/// 渲染提交记录列表与详情
pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let [header, body, footer] = three_panel_layout(area);

    render_title_block(&t!("submissions_title"), frame, header);

    if let Some(ref error) = state.submissions.error {
        let paragraph = Paragraph::new(error.as_str())
            .style(theme().error())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, body);
        render_hint(&t!("submissions_hint"), frame, footer);
        return;
    }

    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(body);

    draw_list(frame, list_area, state);
    draw_detail(frame, detail_area, state);

    render_hint(&t!("submissions_hint"), frame, footer);
}

fn draw_list(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let width = list_content_width(area);
    let items: Vec<ListItem> = if state.submissions.submissions.is_empty() {
        vec![ListItem::new(wrap_lines(&t!("no_submissions"), width)).style(theme().hint())]
    } else {
        state
            .submissions
            .submissions
            .iter()
            .map(|submission| {
                let name = submission
                    .data
                    .get("full_name")
                    .and_then(Value::as_str)
                    .unwrap_or(&submission.id);
                let when = submission
                    .submitted_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M");
                ListItem::new(truncate_value(&format!("{}  {}", when, name), width))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::bordered()
                .title(t!("submissions_count", count = state.submissions.submissions.len()))
                .border_type(BorderType::Rounded),
        )
        .highlight_style(theme().selected())
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    frame.render_stateful_widget(list, area, &mut state.submissions.list_state);
}

fn draw_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(submission) = state.submissions.selected() else {
        let block = Block::bordered().border_type(BorderType::Rounded);
        frame.render_widget(block, area);
        return;
    };

    let value_width = area
        .width
        .saturating_sub(2 + KEY_COLUMN_WIDTH + 2)
        .max(1) as usize;

    let mut rows = vec![Row::new(vec![
        Cell::from(t!("submission_id")).style(theme().hint()),
        Cell::from(submission.id.clone()).style(theme().accent()),
    ])];

    rows.extend(submission.data.iter().map(|(key, value)| {
        let label = state
            .config
            .wizard
            .field(key)
            .map(|field| field.label.clone())
            .unwrap_or_else(|| key.clone());
        let text = match state.config.wizard.field(key) {
            Some(field) => crate::tui::labels::value_label(field, Some(value)),
            None => value.to_string(),
        };
        let lines = wrap_lines(&text, value_width);
        let height = lines.len().max(1) as u16;
        Row::new(vec![Cell::from(label), Cell::from(lines)]).height(height)
    }));

    let table = Table::new(
        rows,
        [Constraint::Length(KEY_COLUMN_WIDTH), Constraint::Fill(1)],
    )
    .block(
        Block::bordered()
            .title(submission.wizard.clone())
            .border_type(BorderType::Rounded),
    )
    .column_spacing(2)
    .style(theme().normal());

    frame.render_widget(table, area);
}
