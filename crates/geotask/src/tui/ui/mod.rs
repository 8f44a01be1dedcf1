/*
[INPUT]:  TUI app state for UI components
[OUTPUT]: UI component render functions and module exports
[POS]:    TUI UI module root
[UPDATE]: When adding or removing panels
*/

mod confirm;
mod layout;
mod logs;
mod map;
mod task_form;
mod task_list;
mod toast;

pub(in crate::tui) use confirm::draw_confirm;
pub(in crate::tui) use layout::draw_tabs;
pub(in crate::tui) use logs::draw_logs;
pub(in crate::tui) use task_form::draw_task_form;
pub(in crate::tui) use task_list::draw_task_list;
pub(in crate::tui) use toast::draw_toast;
