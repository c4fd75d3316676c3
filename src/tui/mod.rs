//! Ratatui 终端 UI 模块
//!
//! 提供基于 ratatui 的入驻向导终端界面。

pub mod app;
pub mod components;
pub mod display;
pub mod event;
pub mod labels;
pub mod screens;
pub mod state;
pub mod theme;
pub mod ui;

pub use app::TuiApp;
pub use display::{display_submissions, format_submissions, should_run_interactive};
pub use event::{EventPoll, TuiEvent};
pub use state::{AppState, OnboardingSession, Screen, TuiResult};
pub use theme::{Theme, theme};
pub use ui::render;
