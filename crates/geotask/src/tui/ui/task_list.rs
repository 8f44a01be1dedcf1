/*
[INPUT]:  AppState task list view, selection and per-task map widgets
[OUTPUT]: Task list, task details and location map rendered into Ratatui frame
[POS]:    TUI UI task list rendering
[UPDATE]: When changing list columns or detail panel content
*/

use geotask::list::LoadState;
use geotask_gateway::Task;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::map::draw_map;
use crate::tui::app::AppState;
use crate::tui::runtime::border_style;

pub(in crate::tui) fn draw_task_list(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Tasks");

    match app.list.state() {
        LoadState::Idle | LoadState::Loading => {
            let widget = Paragraph::new("Loading tasks...")
                .block(block)
                .alignment(Alignment::Center);
            frame.render_widget(widget, area);
            return;
        }
        LoadState::LoadError(message) => {
            let text = vec![
                Line::from(Span::styled(
                    message.as_str(),
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("Press [r] to retry."),
            ];
            let widget = Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(widget, area);
            return;
        }
        LoadState::Loaded => {}
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let title_width = columns[0].width.saturating_sub(10) as usize;
    let items = if app.list.tasks().is_empty() {
        vec![ListItem::new("No tasks yet. Press [n] to add one.")]
    } else {
        app.list
            .tasks()
            .iter()
            .map(|task| task_item(task, title_width))
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    list_state.select(app.list.selected_index());
    frame.render_stateful_widget(list, columns[0], &mut list_state);

    let Some(task) = app.list.selected_task() else {
        return;
    };
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(6)])
        .split(columns[1]);
    draw_details(frame, right[0], task);
    if let Some(view) = app.list.map_for(task.id) {
        let title = if task.coordinate().is_some() {
            "Location"
        } else {
            "Location (not set)"
        };
        draw_map(frame, right[1], view, title, &app.attribution, false);
    }
}

fn task_item(task: &Task, width: usize) -> ListItem<'static> {
    let checkbox = if task.is_done { "[x] " } else { "[ ] " };
    let pin = if task.coordinate().is_some() { " @" } else { "" };
    let style = if task.is_done {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    ListItem::new(Line::from(vec![
        Span::raw(checkbox),
        Span::styled(truncate(&task.title, width), style),
        Span::styled(pin, Style::default().fg(Color::Cyan)),
    ]))
}

fn draw_details(frame: &mut ratatui::Frame, area: Rect, task: &Task) {
    let label = Style::default().fg(Color::Cyan);
    let status = if task.is_done { "done" } else { "open" };
    let location = task
        .coordinate()
        .map(|coordinate| coordinate.to_string())
        .unwrap_or_else(|| "-".to_string());
    let lines = vec![
        Line::from(vec![Span::styled("Title:       ", label), Span::raw(task.title.clone())]),
        Line::from(vec![Span::styled("Status:      ", label), Span::raw(status)]),
        Line::from(vec![
            Span::styled("Description: ", label),
            Span::raw(task.description.clone().unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(vec![Span::styled("Location:    ", label), Span::raw(location)]),
        Line::from(vec![
            Span::styled("Created:     ", label),
            Span::raw(task.created_display().unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(vec![
            Span::styled("Updated:     ", label),
            Span::raw(task.updated_display().unwrap_or_else(|| "-".to_string())),
        ]),
    ];
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(format!("Task #{}", task.id)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

/// Cut `text` to `width` terminal columns, marking the cut with an ellipsis
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_columns() {
        assert_eq!(truncate("milk", 10), "milk");
        assert_eq!(truncate("buy oat milk", 6), "buy o…");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
    }
}
