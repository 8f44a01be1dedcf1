/*
[INPUT]:  AppState task form view, focus and device lookup progress
[OUTPUT]: Form fields, status panel and pick map rendered into Ratatui frame
[POS]:    TUI UI task form rendering
[UPDATE]: When adding form fields or changing the form layout
*/

use geotask::form::FormField;
use geotask::navigation::FormMode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tui_input::Input;

use super::map::draw_map;
use crate::tui::app::AppState;
use crate::tui::runtime::border_style;

/// Returns the inner map area so clicks can be mapped to coordinates
pub(in crate::tui) fn draw_task_form(
    frame: &mut ratatui::Frame,
    area: Rect,
    app: &AppState,
) -> Option<Rect> {
    let form = &app.form;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(4),
        ])
        .split(columns[0]);

    let fields = [
        (FormField::Title, form.title()),
        (FormField::Description, form.description()),
        (FormField::Latitude, form.latitude()),
        (FormField::Longitude, form.longitude()),
    ];
    for (index, (field, input)) in fields.into_iter().enumerate() {
        draw_input(frame, rows[index], field.label(), input, form.focus() == field);
    }

    draw_status(frame, rows[4], app);

    let map_title = if form.focus() == FormField::Map {
        "Pick a location (arrows move, Enter picks)"
    } else {
        "Pick a location (click or Tab here)"
    };
    Some(draw_map(
        frame,
        columns[1],
        form.map(),
        map_title,
        &app.attribution,
        form.focus() == FormField::Map,
    ))
}

fn draw_input(frame: &mut ratatui::Frame, area: Rect, label: &str, input: &Input, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        border_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(label);
    let inner = block.inner(area);
    let width = inner.width.max(1) as usize;
    let scroll = input.visual_scroll(width.saturating_sub(1));
    let widget = Paragraph::new(input.value())
        .block(block)
        .scroll((0, scroll as u16));
    frame.render_widget(widget, area);

    if focused {
        let offset = input.visual_cursor().saturating_sub(scroll) as u16;
        frame.set_cursor_position((inner.x + offset, inner.y));
    }
}

fn draw_status(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let form = &app.form;
    let title = match form.mode() {
        FormMode::Create => "New task".to_string(),
        FormMode::Edit(task) => format!("Edit task #{}", task.id),
    };

    let mut lines = Vec::new();
    if form.is_submitting() {
        lines.push(Line::from(Span::styled(
            "Saving...",
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    if !form.mode().is_edit() {
        let location = match (app.location_pending(), form.device_position()) {
            (true, _) => "Your location: locating...".to_string(),
            (false, Some(position)) => format!("Your location: {position} (press g on the map to use it)"),
            (false, None) => "Your location: unavailable".to_string(),
        };
        lines.push(Line::from(Span::styled(
            location,
            Style::default().fg(Color::Cyan),
        )));
    }
    let pin = form
        .map()
        .marker()
        .map(|marker| format!("Pin: {marker}"))
        .unwrap_or_else(|| "Pin: none".to_string());
    lines.push(Line::from(pin));
    lines.push(Line::from(Span::styled(
        "Leave latitude and longitude empty for a task without a location.",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(title),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}
