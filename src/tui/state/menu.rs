//! 菜单相关状态

use crate::tui::state::selection::Selectable;
use crate::tui::theme::config::MENU_ITEM_COUNT;
use ratatui::widgets::ListState;

/// 屏幕枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// 主菜单
    #[default]
    MainMenu,
    /// 入驻表单
    Onboarding,
    /// 提交完成
    Complete,
    /// 已提交记录
    Submissions,
    /// 退出确认
    Exit,
}

/// 菜单项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// 开始入驻
    StartOnboarding,
    /// 浏览已提交记录
    BrowseSubmissions,
    /// 退出
    Exit,
}

const MENU_ITEMS: [MenuItem; MENU_ITEM_COUNT] = [
    MenuItem::StartOnboarding,
    MenuItem::BrowseSubmissions,
    MenuItem::Exit,
];

impl MenuItem {
    /// 获取显示文本
    pub fn label(&self) -> String {
        match self {
            MenuItem::StartOnboarding => rust_i18n::t!("menu_start").to_string(),
            MenuItem::BrowseSubmissions => rust_i18n::t!("menu_submissions").to_string(),
            MenuItem::Exit => rust_i18n::t!("menu_exit").to_string(),
        }
    }

    /// 迭代所有菜单项
    pub fn iter() -> std::array::IntoIter<MenuItem, MENU_ITEM_COUNT> {
        MENU_ITEMS.into_iter()
    }

    /// 按索引取菜单项
    pub fn from_index(index: usize) -> Option<MenuItem> {
        MENU_ITEMS.get(index).copied()
    }
}

/// 菜单状态
#[derive(Debug)]
pub struct MenuState {
    /// List 组件状态
    pub list_state: ListState,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            list_state: ListState::default().with_selected(Some(0)),
        }
    }
}

impl MenuState {
    /// 当前选中的菜单项
    pub fn selected_item(&self) -> MenuItem {
        MenuItem::from_index(self.selected_or_default()).unwrap_or(MenuItem::Exit)
    }
}

impl Selectable for MenuState {
    fn count(&self) -> usize {
        MENU_ITEM_COUNT
    }

    fn list_state(&self) -> &ListState {
        &self.list_state
    }

    fn list_state_mut(&mut self) -> &mut ListState {
        &mut self.list_state
    }
}
