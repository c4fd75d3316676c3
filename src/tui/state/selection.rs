//! 通用选择状态

use ratatui::widgets::ListState;

/// 可选择列表通用行为
pub trait Selectable {
    /// 总选项数
    fn count(&self) -> usize;
    /// 获取列表状态引用
    fn list_state(&self) -> &ListState;
    /// 获取列表状态可变引用
    fn list_state_mut(&mut self) -> &mut ListState;

    /// 选择下一个（循环）
    fn next(&mut self) {
        let count = self.count();
        if count == 0 {
            return;
        }
        let next = self.list_state().selected().map_or(0, |i| (i + 1) % count);
        self.list_state_mut().select(Some(next));
    }

    /// 选择上一个（循环）
    fn prev(&mut self) {
        let count = self.count();
        if count == 0 {
            return;
        }
        let prev = match self.list_state().selected() {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        self.list_state_mut().select(Some(prev));
    }

    /// 获取当前选中索引（有默认）
    fn selected_or_default(&self) -> usize {
        self.list_state().selected().unwrap_or(0)
    }
}
