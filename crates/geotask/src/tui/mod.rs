/*
[INPUT]:  Task gateway, AppConfig and log buffer
[OUTPUT]: Ratatui-based TUI for browsing and editing geo-tagged tasks
[POS]:    TUI module for the geotask binary
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

mod app;
mod events;
mod runtime;
mod terminal;
mod ui;

pub use runtime::{LOG_BUFFER_CAPACITY, LogBuffer, LogBufferHandle, LogWriterFactory, run_tui_with_log};
