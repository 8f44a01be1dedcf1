/*
[INPUT]:  Loaded AppConfig, task gateway, log buffer, crossterm input, shutdown token
[OUTPUT]: Ratatui-based TUI run loop, rendering, and log buffer utilities
[POS]:    TUI runtime loop and shared helpers
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::MakeWriter;

use geotask::AppConfig;
use geotask::location::{self, LocationProvider};
use geotask::navigation::Route;
use geotask_gateway::TaskGateway;

use super::app::{AppState, Tab, View};
use super::events::{handle_key_event, handle_mouse_event};
use super::terminal::TerminalGuard;
use super::ui::*;

const UI_TICK_INTERVAL: Duration = Duration::from_millis(250);
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const LOG_BUFFER_CAPACITY: usize = 2000;

pub type LogBufferHandle = Arc<StdMutex<LogBuffer>>;

#[derive(Debug, Default)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity,
        }
    }

    pub fn push_line(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Last `count` lines, oldest first
    pub fn tail(&self, count: usize) -> Vec<String> {
        let start = self.lines.len().saturating_sub(count);
        self.lines.iter().skip(start).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

#[derive(Clone)]
pub struct LogWriterFactory {
    buffer: LogBufferHandle,
}

impl LogWriterFactory {
    pub fn new(buffer: LogBufferHandle) -> Self {
        Self { buffer }
    }
}

pub struct LogWriter {
    buffer: LogBufferHandle,
    partial: String,
}

impl LogWriter {
    fn push(&self, line: String) {
        // A poisoned buffer still holds usable lines
        let mut guard = self
            .buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.push_line(line);
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let chunk = String::from_utf8_lossy(buf);
        self.partial.push_str(&chunk);
        while let Some(pos) = self.partial.find('\n') {
            let line = self.partial[..pos].trim_end_matches('\r').to_string();
            self.partial = self.partial[pos + 1..].to_string();
            self.push(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            self.push(line);
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.buffer.clone(),
            partial: String::new(),
        }
    }
}

enum UiEvent {
    Input(CrosstermEvent),
}

pub(crate) fn border_style() -> Style {
    Style::default().fg(Color::Magenta)
}

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn key_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn draw_footer(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let hotkeys: &[(&str, &str)] = match (app.current_tab, app.view) {
        (Tab::Logs, _) => &[("[F1/1]", "Tasks"), ("[F2/2]", "Logs"), ("[q]", "Quit")],
        (Tab::Tasks, View::List) if app.list.pending_delete().is_some() => {
            &[("[y/Enter]", "Delete"), ("[n/Esc]", "Keep")]
        }
        (Tab::Tasks, View::List) => &[
            ("[Up/Down]", "Select"),
            ("[n]", "New"),
            ("[e/Enter]", "Edit"),
            ("[Space]", "Done"),
            ("[d]", "Delete"),
            ("[+/-]", "Zoom"),
            ("[r]", "Reload"),
            ("[q]", "Quit"),
        ],
        (Tab::Tasks, View::Form) => &[
            ("[Tab]", "Next field"),
            ("[Ctrl+S]", "Save"),
            ("[Enter]", "Save/Pick"),
            ("[Arrows]", "Move pin"),
            ("[g]", "Use my location"),
            ("[c]", "Clear pin"),
            ("[Esc]", "Cancel"),
        ],
    };

    let spans = hotkeys
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, key_style()),
                Span::raw(format!(" {label}  ")),
            ]
        })
        .collect::<Vec<_>>();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Hotkeys");
    let widget = Paragraph::new(Text::from(Line::from(spans)))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

pub async fn run_tui_with_log(
    config: AppConfig,
    gateway: Arc<dyn TaskGateway>,
    log_buffer: LogBufferHandle,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut terminal = TerminalGuard::new()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let input_shutdown = CancellationToken::new();
    let input_shutdown_clone = input_shutdown.clone();

    tokio::task::spawn_blocking(move || {
        while !input_shutdown_clone.is_cancelled() {
            if crossterm::event::poll(INPUT_POLL_INTERVAL).unwrap_or(false) {
                if let Ok(event) = crossterm::event::read() {
                    let _ = event_tx.send(UiEvent::Input(event));
                }
            }
        }
    });

    let provider: Arc<dyn LocationProvider> =
        Arc::from(location::provider_from_config(&config.location));
    let mut app = AppState::new(&config, gateway, provider, log_buffer);

    app.list.begin_load();
    terminal.draw(|frame| draw_ui(frame, &mut app))?;
    app.navigate(Route::TaskList(None)).await;

    let mut tick = tokio::time::interval(UI_TICK_INTERVAL);
    let mut should_quit = false;

    while !should_quit {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("shutdown requested; leaving tui");
                should_quit = true;
            }
            _ = tick.tick() => {
                app.tick(Instant::now()).await;
            }
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(UiEvent::Input(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        if handle_key_event(&mut app, key).await {
                            should_quit = true;
                        }
                    }
                    Some(UiEvent::Input(CrosstermEvent::Mouse(mouse))) => {
                        handle_mouse_event(&mut app, mouse);
                    }
                    Some(_) => {}
                    None => should_quit = true,
                }
            }
        }

        terminal.draw(|frame| draw_ui(frame, &mut app))?;
    }

    app.shutdown();
    input_shutdown.cancel();
    Ok(())
}

fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    draw_toast(frame, layout[0], app.toasts.current());
    draw_tabs(frame, layout[2], app.current_tab);

    match (app.current_tab, app.view) {
        (Tab::Tasks, View::List) => {
            app.map_area = None;
            draw_task_list(frame, layout[1], app);
        }
        (Tab::Tasks, View::Form) => {
            app.map_area = draw_task_form(frame, layout[1], app);
        }
        (Tab::Logs, _) => {
            app.map_area = None;
            draw_logs(frame, layout[1], &app.log_buffer);
        }
    }

    draw_footer(frame, layout[3], app);

    if app.current_tab == Tab::Tasks {
        if let Some(task) = app.list.pending_delete() {
            let dialog_area = centered_rect(area, 50, 30);
            draw_confirm(frame, dialog_area, task);
        }
    }
}

pub(crate) fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
