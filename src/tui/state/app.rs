//! 应用状态

use crate::config::Config;
use crate::tui::state::{MenuState, OnboardingSession, Screen, SubmissionsState};
use tracing::info;

/// TUI 运行结果
#[derive(Debug, Default)]
pub struct TuiResult {
    /// 本次运行中成功提交的记录编号
    pub submitted: Vec<String>,
}

/// 应用状态（包含 UI 状态）
#[derive(Debug)]
pub struct AppState {
    /// 当前屏幕
    pub current_screen: Screen,
    /// 退出确认前所在的屏幕
    pub previous_screen: Screen,
    /// 运行配置
    pub config: Config,
    /// 菜单状态
    pub menu_state: MenuState,
    /// 进行中的入驻流程
    pub session: Option<OnboardingSession>,
    /// 已提交记录
    pub submissions: SubmissionsState,
    /// 无法开始流程时的错误信息
    pub error_message: Option<String>,
    /// 日志文件路径
    pub log_path: Option<std::path::PathBuf>,
    /// 运行结果
    pub result: TuiResult,
}

impl AppState {
    /// 以主菜单为起点创建
    pub fn new(config: Config) -> Self {
        Self {
            current_screen: Screen::MainMenu,
            previous_screen: Screen::MainMenu,
            config,
            menu_state: MenuState::default(),
            session: None,
            submissions: SubmissionsState::default(),
            error_message: None,
            log_path: None,
            result: TuiResult::default(),
        }
    }

    /// 轮询进行中的入驻流程，返回是否需要重绘
    ///
    /// 流程完成时记录提交编号并切到完成屏幕；若此时正在确认退出，
    /// 取消退出后回到完成屏幕。
    pub fn poll_session(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let mut dirty = session.tick();

        if let Some(id) = session.take_completion() {
            info!(submission_id = %id, "Onboarding completed");
            self.result.submitted.push(id);
            match self.current_screen {
                Screen::Exit => self.previous_screen = Screen::Complete,
                _ => self.current_screen = Screen::Complete,
            }
            dirty = true;
        }
        dirty
    }

    /// 打开退出确认
    pub fn show_exit_confirm(&mut self) {
        if self.current_screen != Screen::Exit {
            self.previous_screen = self.current_screen;
            self.current_screen = Screen::Exit;
        }
    }

    /// 取消退出，回到之前的屏幕
    pub fn close_exit_confirm(&mut self) {
        self.current_screen = self.previous_screen;
    }
}

/// 重置到主菜单
pub fn reset_to_main_menu(state: &mut AppState) {
    state.current_screen = Screen::MainMenu;
    state.menu_state = MenuState::default();
    state.session = None;
    state.submissions = SubmissionsState::default();
}
