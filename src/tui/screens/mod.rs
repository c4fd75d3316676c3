//! 各屏幕渲染

pub mod complete;
pub mod exit;
pub mod main_menu;
pub mod onboarding;
pub mod submissions;
