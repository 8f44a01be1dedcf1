/*
[INPUT]:  AppConfig, task gateway, location provider, log buffer
[OUTPUT]: AppState owning both views, toasts and the active route
[POS]:    TUI app state and navigation between list and form
[UPDATE]: When adding views, tabs or app-level actions
*/

use std::sync::Arc;
use std::time::Instant;

use geotask::AppConfig;
use geotask::form::TaskFormView;
use geotask::list::TaskListView;
use geotask::location::{self, LocationError, LocationProvider, PositionOptions};
use geotask::navigation::{FormMode, Route, Toasts};
use geotask_gateway::{Coordinate, TaskGateway};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::tui::LogBufferHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tab {
    Tasks,
    Logs,
}

/// Which view the Tasks tab shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum View {
    List,
    Form,
}

type LocationLookup = JoinHandle<Result<Coordinate, LocationError>>;

pub(super) struct AppState {
    pub(super) gateway: Arc<dyn TaskGateway>,
    pub(super) location: Arc<dyn LocationProvider>,
    pub(super) position_options: PositionOptions,
    pub(super) log_buffer: LogBufferHandle,
    pub(super) list: TaskListView,
    pub(super) form: TaskFormView,
    pub(super) toasts: Toasts,
    pub(super) view: View,
    pub(super) current_tab: Tab,
    pub(super) attribution: String,
    /// Inner area of the form map from the last frame, for mouse picks
    pub(super) map_area: Option<Rect>,
    pending_location: Option<LocationLookup>,
}

impl AppState {
    pub(super) fn new(
        config: &AppConfig,
        gateway: Arc<dyn TaskGateway>,
        location: Arc<dyn LocationProvider>,
        log_buffer: LogBufferHandle,
    ) -> Self {
        let center = config.map.default_center;
        let span = config.map.span_degrees;
        Self {
            gateway,
            location,
            position_options: PositionOptions::from_config(&config.location),
            log_buffer,
            list: TaskListView::new(center, span),
            form: TaskFormView::new(center, span),
            toasts: Toasts::new(config.toast_duration()),
            view: View::List,
            current_tab: Tab::Tasks,
            attribution: config.map.attribution.clone(),
            map_area: None,
            pending_location: None,
        }
    }

    /// Leave the current view and enter the one named by `route`
    pub(super) async fn navigate(&mut self, route: Route) {
        self.cancel_location_lookup();
        self.map_area = None;
        match route {
            Route::TaskList(marker) => {
                self.form.reset();
                self.view = View::List;
                self.list.enter(self.gateway.as_ref(), marker).await;
            }
            Route::TaskForm(mode) => {
                if self.view == View::List {
                    self.list.exit();
                }
                let create = !mode.is_edit();
                self.form.enter(mode);
                self.view = View::Form;
                if create {
                    self.start_location_lookup();
                }
            }
        }
        self.current_tab = Tab::Tasks;
    }

    pub(super) async fn open_create(&mut self) {
        self.navigate(Route::TaskForm(FormMode::Create)).await;
    }

    pub(super) async fn open_edit_selected(&mut self) {
        let Some(id) = self.list.selected_task().map(|task| task.id) else {
            return;
        };
        let task = self
            .list
            .fetch_for_edit(id, self.gateway.as_ref(), &mut self.toasts)
            .await;
        if let Some(task) = task {
            self.navigate(Route::TaskForm(FormMode::from_task(Some(task))))
                .await;
        }
    }

    pub(super) async fn toggle_selected(&mut self) {
        if let Some(id) = self.list.selected_task().map(|task| task.id) {
            self.list
                .toggle_done(id, self.gateway.as_ref(), &mut self.toasts)
                .await;
        }
    }

    pub(super) fn request_delete_selected(&mut self) {
        if let Some(id) = self.list.selected_task().map(|task| task.id) {
            self.list.request_delete(id);
        }
    }

    pub(super) async fn confirm_delete(&mut self) {
        self.list
            .confirm_delete(self.gateway.as_ref(), &mut self.toasts)
            .await;
    }

    pub(super) async fn reload(&mut self) {
        self.list.reload(self.gateway.as_ref()).await;
    }

    pub(super) async fn submit_form(&mut self) {
        let route = self
            .form
            .submit(self.gateway.as_ref(), &mut self.toasts)
            .await;
        if let Some(route) = route {
            self.navigate(route).await;
        }
    }

    pub(super) async fn back_to_list(&mut self) {
        self.navigate(Route::TaskList(None)).await;
    }

    /// Pick the coordinate under a mouse click on the form map
    pub(super) fn pick_on_map(&mut self, column: u16, row: u16) -> bool {
        if self.view != View::Form || self.current_tab != Tab::Tasks {
            return false;
        }
        let Some(area) = self.map_area else {
            return false;
        };
        match self.form.map().coordinate_at(area, column, row) {
            Some(coordinate) => {
                self.form.pick_coordinate(coordinate);
                true
            }
            None => false,
        }
    }

    pub(super) fn use_device_position(&mut self) {
        if self.form.use_device_position().is_none() {
            self.toasts.warning("Your location is not available.");
        }
    }

    pub(super) fn next_tab(&mut self) {
        self.current_tab = match self.current_tab {
            Tab::Tasks => Tab::Logs,
            Tab::Logs => Tab::Tasks,
        };
    }

    pub(super) fn set_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
    }

    pub(super) async fn tick(&mut self, now: Instant) {
        self.toasts.prune(now);
        self.poll_location_lookup().await;
    }

    pub(super) fn shutdown(&mut self) {
        self.cancel_location_lookup();
        self.list.exit();
    }

    fn start_location_lookup(&mut self) {
        let provider = Arc::clone(&self.location);
        let options = self.position_options;
        tracing::debug!(timeout = ?options.timeout, "looking up device position");
        self.pending_location = Some(tokio::spawn(async move {
            location::locate(provider.as_ref(), &options).await
        }));
    }

    pub(super) async fn poll_location_lookup(&mut self) {
        let finished = self
            .pending_location
            .as_ref()
            .is_some_and(|handle| handle.is_finished());
        if !finished {
            return;
        }
        if let Some(handle) = self.pending_location.take() {
            match handle.await {
                Ok(result) => self.form.apply_device_position(result),
                Err(err) => tracing::warn!(error = %err, "location lookup task failed"),
            }
        }
    }

    pub(super) fn location_pending(&self) -> bool {
        self.pending_location.is_some()
    }

    fn cancel_location_lookup(&mut self) {
        if let Some(handle) = self.pending_location.take() {
            handle.abort();
        }
    }
}
