//! TUI 状态模块

pub mod app;
pub mod input;
pub mod menu;
pub mod selection;
pub mod session;
pub mod submissions;

pub use app::{AppState, TuiResult, reset_to_main_menu};
pub use input::InputState;
pub use menu::{MenuItem, MenuState, Screen};
pub use selection::Selectable;
pub use session::{FormState, OnboardingSession};
pub use submissions::SubmissionsState;
