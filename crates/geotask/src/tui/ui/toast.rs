/*
[INPUT]:  Front toast of the notification queue
[OUTPUT]: One-line colored banner at the top of the screen
[POS]:    TUI UI toast rendering
[UPDATE]: When changing toast levels or colors
*/

use geotask::navigation::{Toast, ToastLevel};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;

pub(in crate::tui) fn draw_toast(frame: &mut ratatui::Frame, area: Rect, toast: Option<&Toast>) {
    let Some(toast) = toast else {
        return;
    };
    let background = match toast.level {
        ToastLevel::Success => Color::Green,
        ToastLevel::Warning => Color::Yellow,
        ToastLevel::Danger => Color::Red,
    };
    let widget = Paragraph::new(toast.message.as_str())
        .style(
            Style::default()
                .fg(Color::Black)
                .bg(background)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}
