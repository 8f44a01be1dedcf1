/*
[INPUT]:  Crossterm key and mouse events
[OUTPUT]: AppState actions for the list, the form, tabs and the delete dialog
[POS]:    TUI event routing
[UPDATE]: When changing keybindings or mouse behavior
*/

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use geotask::form::FormField;
use tui_input::InputRequest;

use super::app::{AppState, Tab, View};

/// Handles key events for the TUI.
///
/// Returns `true` if quit is requested, `false` otherwise.
pub(super) async fn handle_key_event(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    match key.code {
        KeyCode::F(1) => {
            app.set_tab(Tab::Tasks);
            return false;
        }
        KeyCode::F(2) => {
            app.set_tab(Tab::Logs);
            return false;
        }
        _ => {}
    }

    match (app.current_tab, app.view) {
        (Tab::Logs, _) => handle_logs_key(app, key),
        (Tab::Tasks, View::List) => handle_list_key(app, key).await,
        (Tab::Tasks, View::Form) => {
            handle_form_key(app, key).await;
            false
        }
    }
}

fn handle_logs_key(app: &mut AppState, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => true,
        KeyCode::Tab | KeyCode::Char('l') => {
            app.next_tab();
            false
        }
        KeyCode::Char('1') | KeyCode::Esc => {
            app.set_tab(Tab::Tasks);
            false
        }
        _ => false,
    }
}

async fn handle_list_key(app: &mut AppState, key: KeyEvent) -> bool {
    if app.list.pending_delete().is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete().await,
            KeyCode::Char('n') | KeyCode::Esc => app.list.cancel_delete(),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Up | KeyCode::Char('k') => app.list.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.list.move_selection(1),
        KeyCode::Char('n') => app.open_create().await,
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_selected().await,
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected().await,
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete_selected(),
        KeyCode::Char('r') => app.reload().await,
        KeyCode::Char('+') | KeyCode::Char('=') => zoom_selected(app, true),
        KeyCode::Char('-') => zoom_selected(app, false),
        KeyCode::Tab | KeyCode::Char('l') => app.next_tab(),
        KeyCode::Char('2') => app.set_tab(Tab::Logs),
        _ => {}
    }
    false
}

fn zoom_selected(app: &mut AppState, zoom_in: bool) {
    let Some(id) = app.list.selected_task().map(|task| task.id) else {
        return;
    };
    if let Some(map) = app.list.map_for_mut(id) {
        if zoom_in {
            map.zoom_in();
        } else {
            map.zoom_out();
        }
    }
}

async fn handle_form_key(app: &mut AppState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
        app.submit_form().await;
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.back_to_list().await;
            return;
        }
        KeyCode::Tab => {
            app.form.focus_next();
            return;
        }
        KeyCode::BackTab => {
            app.form.focus_prev();
            return;
        }
        _ => {}
    }

    if app.form.focus() == FormField::Map {
        match key.code {
            KeyCode::Up => app.form.map_mut().nudge_cursor(1, 0),
            KeyCode::Down => app.form.map_mut().nudge_cursor(-1, 0),
            KeyCode::Left => app.form.map_mut().nudge_cursor(0, -1),
            KeyCode::Right => app.form.map_mut().nudge_cursor(0, 1),
            KeyCode::Char('+') | KeyCode::Char('=') => app.form.map_mut().zoom_in(),
            KeyCode::Char('-') => app.form.map_mut().zoom_out(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                app.form.pick_cursor();
            }
            KeyCode::Char('g') => app.use_device_position(),
            KeyCode::Char('c') => app.form.clear_coordinate(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit_form().await,
        KeyCode::Up => app.form.focus_prev(),
        KeyCode::Down => app.form.focus_next(),
        _ => {
            if let Some(request) = input_request(key) {
                app.form.handle_input(request);
            }
        }
    }
}

/// Text-editing request for a key pressed in a form field
fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char(ch) if !ctrl && !alt => Some(InputRequest::InsertChar(ch)),
        KeyCode::Backspace if ctrl || alt => Some(InputRequest::DeletePrevWord),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left if ctrl => Some(InputRequest::GoToPrevWord),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right if ctrl => Some(InputRequest::GoToNextWord),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

pub(super) fn handle_mouse_event(app: &mut AppState, mouse: MouseEvent) {
    if app.view != View::Form || app.current_tab != Tab::Tasks {
        return;
    }
    let inside_map = app.map_area.is_some_and(|area| {
        mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height
    });
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.pick_on_map(mouse.column, mouse.row);
        }
        MouseEventKind::ScrollUp if inside_map => app.form.map_mut().zoom_in(),
        MouseEventKind::ScrollDown if inside_map => app.form.map_mut().zoom_out(),
        _ => {}
    }
}
