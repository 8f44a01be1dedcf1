/*
[INPUT]:  Task awaiting delete confirmation
[OUTPUT]: Blocking yes/no dialog rendered over the current view
[POS]:    TUI UI confirm dialog
[UPDATE]: When changing dialog wording or keys
*/

use geotask_gateway::Task;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::runtime::key_style;

pub(in crate::tui) fn draw_confirm(frame: &mut ratatui::Frame, area: Rect, task: &Task) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightRed))
        .title("Delete task");
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(
                format!("\"{}\"", task.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("?"),
        ]),
        Line::from("This cannot be undone."),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", key_style()),
            Span::raw(" Delete   "),
            Span::styled("[n]", key_style()),
            Span::raw(" Keep"),
        ]),
    ];
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}
