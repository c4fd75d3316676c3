//! 退出确认渲染

use crate::tui::theme::theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    widgets::{Paragraph, Wrap},
};
use rust_i18n::t;

/// 渲染退出确认；有未完成的入驻流程时额外提示
pub fn draw(frame: &mut Frame, area: Rect, unsaved: bool) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .areas(area);

    let text = if unsaved {
        format!("{}\n{}", t!("exit_unsaved"), t!("exit_confirm"))
    } else {
        t!("exit_confirm").to_string()
    };

    let confirm_text = Paragraph::new(text)
        .style(theme().warning())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(confirm_text, middle);
}
