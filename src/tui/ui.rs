//! UI渲染模块
//!
//! 按当前屏幕分发到 `screens` 下的渲染函数。

use crate::tui::screens;
use crate::tui::state::{AppState, Screen};
use crate::tui::theme::theme;
use ratatui::{
    DefaultTerminal, Frame,
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
};

/// 设置全局背景
fn set_background(area: Rect, buf: &mut Buffer) {
    let style = Style::new().bg(theme().bg);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut(Position { x, y }) {
                cell.set_style(style);
            }
        }
    }
}

/// 渲染整个应用
pub fn render(terminal: &mut DefaultTerminal, state: &mut AppState) -> std::io::Result<()> {
    terminal.draw(|frame| draw(frame, state))?;
    Ok(())
}

/// 主渲染函数
pub fn draw(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();
    set_background(area, frame.buffer_mut());

    match state.current_screen {
        Screen::MainMenu => screens::main_menu::draw(frame, area, state),
        Screen::Onboarding => match state.session.as_ref() {
            Some(session) => screens::onboarding::draw(frame, area, session),
            None => screens::main_menu::draw(frame, area, state),
        },
        Screen::Complete => screens::complete::draw(frame, area, state),
        Screen::Submissions => screens::submissions::draw(frame, area, state),
        Screen::Exit => {
            let unsaved = state
                .session
                .as_ref()
                .is_some_and(|session| !session.is_complete());
            screens::exit::draw(frame, area, unsaved)
        }
    }
}
