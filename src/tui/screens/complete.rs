//! 提交完成屏幕渲染

use crate::tui::components::{render_hint, render_title_block, three_panel_layout};
use crate::tui::state::AppState;
use crate::tui::theme::theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Wrap},
};
use rust_i18n::t;

/// 渲染提交完成屏幕
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    let [header, body, footer] = three_panel_layout(area);

    render_title_block(&t!("complete_title"), frame, header);

    let mut lines = vec![
        Line::from(t!("complete_thanks")).style(theme().success().add_modifier(Modifier::BOLD)),
        Line::from(""),
    ];

    if let Some(session) = state.session.as_ref() {
        if let Some(id) = session.submission_id() {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", t!("submission_id")), theme().hint()),
                Span::styled(id.to_string(), theme().accent()),
            ]));
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", t!("outbox_dir")), theme().hint()),
            Span::raw(session.outbox_dir().display().to_string()),
        ]));
        if let Some(name) = session
            .controller()
            .form_data()
            .get("full_name")
            .and_then(|v| v.as_str())
        {
            lines.push(Line::from(""));
            lines.push(Line::from(t!("complete_next_steps", name = name)));
        }
    }

    if let Some(ref log_path) = state.log_path {
        lines.push(Line::from(""));
        lines.push(
            Line::from(vec![
                Span::from(t!("log_saved_to")),
                Span::raw(" "),
                Span::styled(log_path.display().to_string(), theme().accent()),
            ])
            .style(theme().hint()),
        );
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::bordered().border_type(BorderType::Rounded))
        .style(theme().normal())
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, body);

    render_hint(&t!("complete_hint"), frame, footer);
}
