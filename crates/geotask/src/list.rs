/*
[INPUT]:  TaskGateway results, ListReturn markers, user delete/toggle actions
[OUTPUT]: In-memory task list, load state, keyed map widgets, toasts
[POS]:    Task list view state - load, delete with confirmation, done toggle
[UPDATE]: When list actions or load/teardown lifecycle change
*/

use geotask_gateway::{Coordinate, GatewayError, Task, TaskGateway, TaskId, TaskUpdate};

use crate::map::{MapView, MapWidgets};
use crate::navigation::{ListReturn, Toasts};

pub const LOAD_ERROR_MESSAGE: &str =
    "Tasks could not be loaded. Is the backend running and reachable?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    LoadError(String),
}

#[derive(Debug)]
pub struct TaskListView {
    state: LoadState,
    tasks: Vec<Task>,
    selected: Option<usize>,
    widgets: MapWidgets,
    pending_delete: Option<TaskId>,
    highlight: Option<TaskId>,
    fallback: Coordinate,
    span_degrees: f64,
}

impl TaskListView {
    pub fn new(fallback: Coordinate, span_degrees: f64) -> Self {
        Self {
            state: LoadState::Idle,
            tasks: Vec::new(),
            selected: None,
            widgets: MapWidgets::new(),
            pending_delete: None,
            highlight: None,
            fallback,
            span_degrees,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn widgets(&self) -> &MapWidgets {
        &self.widgets
    }

    pub fn map_for(&self, id: TaskId) -> Option<&MapView> {
        self.widgets.get(id)
    }

    pub fn map_for_mut(&mut self, id: TaskId) -> Option<&mut MapView> {
        self.widgets.get_mut(id)
    }

    /// Activate the view: always reloads from the gateway
    pub async fn enter(&mut self, gateway: &dyn TaskGateway, marker: Option<ListReturn>) {
        if let Some(marker) = marker {
            tracing::debug!(refresh = marker.refresh, highlight = ?marker.highlight, "list entered after save");
            self.highlight = marker.highlight;
        }
        self.reload(gateway).await;
    }

    pub async fn reload(&mut self, gateway: &dyn TaskGateway) {
        self.begin_load();
        let result = gateway.list().await;
        self.finish_load(result);
    }

    pub fn begin_load(&mut self) {
        tracing::info!("loading tasks");
        self.state = LoadState::Loading;
        self.pending_delete = None;
    }

    pub fn finish_load(&mut self, result: Result<Vec<Task>, GatewayError>) {
        // A highlight marker applies to the first load after a save only
        let highlight = self.highlight.take();
        match result {
            Ok(tasks) => {
                tracing::info!(count = tasks.len(), "tasks loaded");
                self.widgets.rebuild(&tasks, self.fallback, self.span_degrees);
                self.tasks = tasks;
                self.state = LoadState::Loaded;
                self.restore_selection(highlight);
            }
            Err(err) => {
                tracing::error!(error = %err, "loading tasks failed");
                self.widgets.teardown();
                self.tasks.clear();
                self.selected = None;
                self.state = LoadState::LoadError(LOAD_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Leave the view; releases every map widget
    pub fn exit(&mut self) {
        self.widgets.teardown();
        self.tasks.clear();
        self.selected = None;
        self.pending_delete = None;
        self.state = LoadState::Idle;
    }

    fn restore_selection(&mut self, highlight: Option<TaskId>) {
        if self.tasks.is_empty() {
            self.selected = None;
            return;
        }
        if let Some(id) = highlight {
            if let Some(index) = self.tasks.iter().position(|task| task.id == id) {
                self.selected = Some(index);
                return;
            }
        }
        self.selected = Some(
            self.selected
                .unwrap_or(0)
                .min(self.tasks.len().saturating_sub(1)),
        );
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|index| self.tasks.get(index))
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.tasks.is_empty() {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, (self.tasks.len() - 1) as isize) as usize;
        self.selected = Some(next);
    }

    /// Open the blocking confirmation for deleting `id`
    pub fn request_delete(&mut self, id: TaskId) -> bool {
        if self.task(id).is_none() {
            return false;
        }
        self.pending_delete = Some(id);
        true
    }

    pub fn pending_delete(&self) -> Option<&Task> {
        self.pending_delete.and_then(|id| self.task(id))
    }

    pub fn cancel_delete(&mut self) {
        if let Some(id) = self.pending_delete.take() {
            tracing::debug!(task_id = id, "delete cancelled");
        }
    }

    /// Issue the confirmed delete; the task leaves the list only on success
    pub async fn confirm_delete(&mut self, gateway: &dyn TaskGateway, toasts: &mut Toasts) {
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        match gateway.delete(id).await {
            Ok(()) => {
                self.tasks.retain(|task| task.id != id);
                self.widgets.remove(id);
                if let Some(selected) = self.selected {
                    if self.tasks.is_empty() {
                        self.selected = None;
                    } else if selected >= self.tasks.len() {
                        self.selected = Some(self.tasks.len() - 1);
                    }
                }
                toasts.success("Task deleted.");
            }
            Err(err) => {
                tracing::error!(task_id = id, error = %err, "deleting task failed");
                toasts.danger("Could not delete the task.");
            }
        }
    }

    /// Send the flipped done flag; the local flag follows the server answer only
    pub async fn toggle_done(
        &mut self,
        id: TaskId,
        gateway: &dyn TaskGateway,
        toasts: &mut Toasts,
    ) {
        let Some(previous) = self.task(id).map(|task| task.is_done) else {
            return;
        };
        let requested = !previous;
        match gateway.update(id, TaskUpdate::done(requested)).await {
            Ok(updated) => {
                if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
                    task.is_done = updated.is_done;
                    task.updated_at = updated.updated_at;
                }
                tracing::info!(task_id = id, is_done = updated.is_done, "done flag updated");
            }
            Err(err) => {
                tracing::error!(task_id = id, error = %err, "updating done flag failed");
                if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
                    task.is_done = previous;
                }
                toasts.danger("Could not update the task status.");
            }
        }
    }

    /// Fresh copy of a task before editing it
    ///
    /// Falls back to the listed copy when the lookup fails for any reason
    /// other than the task being gone.
    pub async fn fetch_for_edit(
        &mut self,
        id: TaskId,
        gateway: &dyn TaskGateway,
        toasts: &mut Toasts,
    ) -> Option<Task> {
        match gateway.get_by_id(id).await {
            Ok(task) => Some(task),
            Err(err) if err.is_not_found() => {
                tracing::warn!(task_id = id, "task vanished before edit");
                self.tasks.retain(|task| task.id != id);
                self.widgets.remove(id);
                self.move_selection(0);
                toasts.warning("This task no longer exists.");
                None
            }
            Err(err) => {
                tracing::warn!(task_id = id, error = %err, "refreshing task failed; editing listed copy");
                self.task(id).cloned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::ToastLevel;

    fn task(id: TaskId, title: &str, is_done: bool) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            is_done,
            created_at: None,
            updated_at: None,
            latitude: None,
            longitude: None,
        }
    }

    fn loaded(tasks: Vec<Task>) -> TaskListView {
        let mut view = TaskListView::new(Coordinate::new(52.52, 13.405), 8.0);
        view.begin_load();
        view.finish_load(Ok(tasks));
        view
    }

    #[test]
    fn test_load_state_transitions() {
        let mut view = TaskListView::new(Coordinate::new(0.0, 0.0), 8.0);
        assert_eq!(view.state(), &LoadState::Idle);
        view.begin_load();
        assert_eq!(view.state(), &LoadState::Loading);
        view.finish_load(Err(GatewayError::Timeout { duration: 30 }));
        assert_eq!(
            view.state(),
            &LoadState::LoadError(LOAD_ERROR_MESSAGE.to_string())
        );
        assert!(view.widgets().is_empty());

        view.begin_load();
        view.finish_load(Ok(vec![task(1, "Buy milk", false)]));
        assert_eq!(view.state(), &LoadState::Loaded);
        assert_eq!(view.widgets().len(), 1);
        assert_eq!(view.selected_index(), Some(0));
    }

    #[test]
    fn test_highlight_selects_task_after_load() {
        let mut view = loaded(vec![task(1, "a", false)]);
        view.highlight = Some(3);
        view.begin_load();
        view.finish_load(Ok(vec![
            task(1, "a", false),
            task(2, "b", false),
            task(3, "c", false),
        ]));
        assert_eq!(view.selected_task().map(|t| t.id), Some(3));
    }

    #[test]
    fn test_highlight_is_dropped_after_failed_or_empty_load() {
        let three = || vec![task(1, "a", false), task(2, "b", false), task(3, "c", false)];

        let mut view = TaskListView::new(Coordinate::new(0.0, 0.0), 8.0);
        view.highlight = Some(3);
        view.begin_load();
        view.finish_load(Err(GatewayError::Timeout { duration: 30 }));
        view.begin_load();
        view.finish_load(Ok(three()));
        assert_eq!(view.selected_task().map(|t| t.id), Some(1));

        let mut view = TaskListView::new(Coordinate::new(0.0, 0.0), 8.0);
        view.highlight = Some(3);
        view.begin_load();
        view.finish_load(Ok(Vec::new()));
        view.begin_load();
        view.finish_load(Ok(three()));
        assert_eq!(view.selected_task().map(|t| t.id), Some(1));
    }

    #[test]
    fn test_delete_needs_pending_confirmation() {
        let mut view = loaded(vec![task(1, "a", false)]);
        assert!(!view.request_delete(99));
        assert!(view.request_delete(1));
        assert_eq!(view.pending_delete().map(|t| t.id), Some(1));
        view.cancel_delete();
        assert!(view.pending_delete().is_none());
        assert_eq!(view.tasks().len(), 1);
    }

    #[test]
    fn test_exit_tears_down_widgets() {
        let mut view = loaded(vec![task(1, "a", false), task(2, "b", true)]);
        assert_eq!(view.widgets().len(), 2);
        view.exit();
        assert!(view.widgets().is_empty());
        assert!(view.tasks().is_empty());
        assert_eq!(view.state(), &LoadState::Idle);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut view = loaded(vec![task(1, "a", false), task(2, "b", false)]);
        view.move_selection(5);
        assert_eq!(view.selected_index(), Some(1));
        view.move_selection(-5);
        assert_eq!(view.selected_index(), Some(0));
    }

    #[test]
    fn test_toast_levels_are_distinct() {
        let mut toasts = Toasts::default();
        toasts.danger("x");
        assert_eq!(toasts.current().map(|t| t.level), Some(ToastLevel::Danger));
    }
}
