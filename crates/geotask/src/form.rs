/*
[INPUT]:  FormMode handed over by navigation, field edits, map picks, device position
[OUTPUT]: Validated task payloads, create/update calls, route back to the list
[POS]:    Task form view state - create and edit share one form
[UPDATE]: When form fields, validation rules or submit flow change
*/

use geotask_gateway::{
    Coordinate, GatewayError, LATITUDE_RANGE, LONGITUDE_RANGE, NewTask, Task, TaskGateway,
    TaskUpdate,
};
use thiserror::Error;
use tui_input::{Input, InputRequest};

use crate::location::LocationError;
use crate::map::MapView;
use crate::navigation::{FormMode, ListReturn, Route, Toasts};

/// Validation failures, checked in declaration order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required.")]
    TitleRequired,
    #[error("Latitude and longitude are both required when setting a location.")]
    CoordinateIncomplete,
    #[error("Latitude must be a number.")]
    LatitudeNotNumber,
    #[error("Latitude must be between -90 and 90.")]
    LatitudeOutOfRange,
    #[error("Longitude must be a number.")]
    LongitudeNotNumber,
    #[error("Longitude must be between -180 and 180.")]
    LongitudeOutOfRange,
}

/// Form content that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTask {
    pub title: String,
    pub description: Option<String>,
    pub coordinate: Option<Coordinate>,
}

impl ValidatedTask {
    pub fn to_new_task(&self) -> NewTask {
        NewTask::new(self.title.clone())
            .with_description(self.description.clone())
            .with_coordinate(self.coordinate)
    }

    /// Every editable field, so cleared values are cleared on the server too
    pub fn to_update(&self) -> TaskUpdate {
        TaskUpdate {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            ..TaskUpdate::default()
        }
        .with_coordinate(self.coordinate)
    }
}

/// Validate raw field text
///
/// Short-circuits on the first failure: title, coordinate completeness,
/// latitude, longitude.
pub fn validate_fields(
    title: &str,
    description: &str,
    latitude: &str,
    longitude: &str,
) -> Result<ValidatedTask, FormError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FormError::TitleRequired);
    }

    let latitude = latitude.trim();
    let longitude = longitude.trim();
    let coordinate = match (latitude.is_empty(), longitude.is_empty()) {
        (true, true) => None,
        (false, false) => {
            let latitude: f64 = latitude
                .parse()
                .map_err(|_| FormError::LatitudeNotNumber)?;
            if !LATITUDE_RANGE.contains(&latitude) {
                return Err(FormError::LatitudeOutOfRange);
            }
            let longitude: f64 = longitude
                .parse()
                .map_err(|_| FormError::LongitudeNotNumber)?;
            if !LONGITUDE_RANGE.contains(&longitude) {
                return Err(FormError::LongitudeOutOfRange);
            }
            Some(Coordinate::new(latitude, longitude))
        }
        _ => return Err(FormError::CoordinateIncomplete),
    };

    let description = description.trim();
    Ok(ValidatedTask {
        title: title.to_string(),
        description: (!description.is_empty()).then(|| description.to_string()),
        coordinate,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Latitude,
    Longitude,
    Map,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Title,
        FormField::Description,
        FormField::Latitude,
        FormField::Longitude,
        FormField::Map,
    ];

    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Latitude => "Latitude",
            FormField::Longitude => "Longitude",
            FormField::Map => "Map",
        }
    }
}

/// A save that passed validation and is waiting for the server
#[derive(Debug, Clone, PartialEq)]
pub enum PendingSave {
    Create(NewTask),
    Update { id: i64, update: TaskUpdate },
}

/// State of the task form view
#[derive(Debug)]
pub struct TaskFormView {
    mode: FormMode,
    title: Input,
    description: Input,
    latitude: Input,
    longitude: Input,
    focus: FormField,
    map: MapView,
    default_center: Coordinate,
    span_degrees: f64,
    device_position: Option<Coordinate>,
    submitting: bool,
}

impl TaskFormView {
    pub fn new(default_center: Coordinate, span_degrees: f64) -> Self {
        Self {
            mode: FormMode::Create,
            title: Input::default(),
            description: Input::default(),
            latitude: Input::default(),
            longitude: Input::default(),
            focus: FormField::Title,
            map: MapView::new(default_center, span_degrees),
            default_center,
            span_degrees,
            device_position: None,
            submitting: false,
        }
    }

    /// Activate the view; nothing from a previous activation survives
    pub fn enter(&mut self, mode: FormMode) {
        self.reset();
        if let FormMode::Edit(task) = &mode {
            self.title = Input::new(task.title.clone());
            self.description = Input::new(task.description.clone().unwrap_or_default());
            self.latitude = Input::new(task.latitude.map(format_degrees).unwrap_or_default());
            self.longitude = Input::new(task.longitude.map(format_degrees).unwrap_or_default());
            self.sync_marker_from_fields();
            tracing::debug!(task_id = task.id, "task form entered in edit mode");
        } else {
            tracing::debug!("task form entered in create mode");
        }
        self.mode = mode;
    }

    /// Back to an empty create form
    pub fn reset(&mut self) {
        self.mode = FormMode::Create;
        self.title.reset();
        self.description.reset();
        self.latitude.reset();
        self.longitude.reset();
        self.focus = FormField::Title;
        self.map = MapView::new(self.default_center, self.span_degrees);
        self.device_position = None;
        self.submitting = false;
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn title(&self) -> &Input {
        &self.title
    }

    pub fn description(&self) -> &Input {
        &self.description
    }

    pub fn latitude(&self) -> &Input {
        &self.latitude
    }

    pub fn longitude(&self) -> &Input {
        &self.longitude
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapView {
        &mut self.map
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn set_focus(&mut self, field: FormField) {
        if field == FormField::Map {
            self.map.show_cursor();
        } else {
            self.map.hide_cursor();
        }
        self.focus = field;
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus.prev());
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn device_position(&self) -> Option<Coordinate> {
        self.device_position
    }

    /// Edit the focused text field
    pub fn handle_input(&mut self, request: InputRequest) {
        let input = match self.focus {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Latitude => &mut self.latitude,
            FormField::Longitude => &mut self.longitude,
            FormField::Map => return,
        };
        let _ = input.handle(request);
        if matches!(self.focus, FormField::Latitude | FormField::Longitude) {
            self.sync_marker_from_fields();
        }
    }

    /// Replace every text field at once
    pub fn set_fields(&mut self, title: &str, description: &str, latitude: &str, longitude: &str) {
        self.title = Input::new(title.to_string());
        self.description = Input::new(description.to_string());
        self.latitude = Input::new(latitude.to_string());
        self.longitude = Input::new(longitude.to_string());
        self.sync_marker_from_fields();
    }

    /// A coordinate picked on the map: replaces the marker and fills both fields
    pub fn pick_coordinate(&mut self, coordinate: Coordinate) {
        let coordinate = coordinate.clamped().rounded();
        self.latitude = Input::new(format_degrees(coordinate.latitude));
        self.longitude = Input::new(format_degrees(coordinate.longitude));
        self.map.set_marker(Some(coordinate));
        tracing::debug!(%coordinate, "coordinate picked");
    }

    /// Pick the coordinate under the keyboard crosshair
    pub fn pick_cursor(&mut self) -> Option<Coordinate> {
        let cursor = self.map.cursor()?;
        self.pick_coordinate(cursor);
        Some(cursor)
    }

    /// Adopt the last device position as the task coordinate
    pub fn use_device_position(&mut self) -> Option<Coordinate> {
        let position = self.device_position?;
        self.pick_coordinate(position);
        Some(position)
    }

    pub fn clear_coordinate(&mut self) {
        self.latitude.reset();
        self.longitude.reset();
        self.map.set_marker(None);
    }

    /// Outcome of the device lookup started on entering create mode
    ///
    /// Only centers the map; the coordinate fields stay untouched. Once the
    /// user has placed a marker the view is left where it is.
    pub fn apply_device_position(&mut self, result: Result<Coordinate, LocationError>) {
        if self.mode.is_edit() {
            return;
        }
        let keep_view = self.map.marker().is_some();
        match result {
            Ok(position) => {
                self.device_position = Some(position);
                self.map.set_device(Some(position));
                if !keep_view {
                    self.map.recenter(position);
                    tracing::info!(%position, "map centered on device position");
                }
            }
            Err(err) => {
                self.device_position = None;
                self.map.set_device(None);
                if !keep_view {
                    self.map.recenter(self.default_center);
                }
                tracing::debug!(error = %err, "device position unavailable; using default center");
            }
        }
    }

    pub fn validate(&self) -> Result<ValidatedTask, FormError> {
        validate_fields(
            self.title.value(),
            self.description.value(),
            self.latitude.value(),
            self.longitude.value(),
        )
    }

    /// Validate and mark the form busy
    ///
    /// Returns `None` (after queueing a warning) when validation fails or a
    /// save is already pending.
    pub fn prepare_submit(&mut self, toasts: &mut Toasts) -> Option<PendingSave> {
        if self.submitting {
            toasts.warning("A save is already in progress.");
            return None;
        }
        let validated = match self.validate() {
            Ok(validated) => validated,
            Err(err) => {
                tracing::debug!(error = %err, "task form rejected");
                toasts.warning(err.to_string());
                return None;
            }
        };
        self.submitting = true;
        Some(match &self.mode {
            FormMode::Create => PendingSave::Create(validated.to_new_task()),
            FormMode::Edit(task) => PendingSave::Update {
                id: task.id,
                update: validated.to_update(),
            },
        })
    }

    /// Apply the server answer for a pending save
    ///
    /// On success the form resets and the route back to the list is
    /// returned; on failure the fields stay populated for a retry.
    pub fn finish_submit(
        &mut self,
        result: Result<Task, GatewayError>,
        toasts: &mut Toasts,
    ) -> Option<Route> {
        self.submitting = false;
        let editing = self.mode.task_id();
        match result {
            Ok(task) => {
                if editing.is_some() {
                    toasts.success("Task updated.");
                } else {
                    toasts.success("Task created.");
                }
                tracing::info!(task_id = task.id, edit = editing.is_some(), "task saved");
                self.reset();
                Some(Route::TaskList(Some(ListReturn::now(editing))))
            }
            Err(err) => {
                tracing::error!(error = %err, "saving task failed");
                if editing.is_some() {
                    toasts.danger("Could not update the task.");
                } else {
                    toasts.danger("Could not create the task.");
                }
                None
            }
        }
    }

    /// Validate, send and apply the result in one go
    pub async fn submit(
        &mut self,
        gateway: &dyn TaskGateway,
        toasts: &mut Toasts,
    ) -> Option<Route> {
        let pending = self.prepare_submit(toasts)?;
        let result = match pending {
            PendingSave::Create(new_task) => gateway.create(new_task).await,
            PendingSave::Update { id, update } => gateway.update(id, update).await,
        };
        self.finish_submit(result, toasts)
    }

    fn sync_marker_from_fields(&mut self) {
        let parsed = (
            self.latitude.value().trim().parse::<f64>(),
            self.longitude.value().trim().parse::<f64>(),
        );
        match parsed {
            (Ok(latitude), Ok(longitude)) => {
                let coordinate = Coordinate::new(latitude, longitude);
                if coordinate.is_valid() {
                    self.map.set_marker(Some(coordinate));
                    self.map.recenter(coordinate);
                } else {
                    self.map.set_marker(None);
                }
            }
            _ => self.map.set_marker(None),
        }
    }
}

fn format_degrees(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn form() -> TaskFormView {
        TaskFormView::new(Coordinate::new(52.520008, 13.404954), 8.0)
    }

    fn task(id: i64) -> Task {
        Task {
            id,
            title: "Visit museum".into(),
            description: Some("Pergamon".into()),
            is_done: false,
            created_at: None,
            updated_at: None,
            latitude: Some(52.5),
            longitude: Some(13.4),
        }
    }

    #[rstest]
    #[case("", "", "", "", Err(FormError::TitleRequired))]
    #[case("   ", "", "", "", Err(FormError::TitleRequired))]
    #[case("  ", "", "91", "", Err(FormError::TitleRequired))]
    #[case("a", "", "52.5", "", Err(FormError::CoordinateIncomplete))]
    #[case("a", "", "", "13.4", Err(FormError::CoordinateIncomplete))]
    #[case("a", "", "north", "13.4", Err(FormError::LatitudeNotNumber))]
    #[case("a", "", "90.1", "200", Err(FormError::LatitudeOutOfRange))]
    #[case("a", "", "-90", "east", Err(FormError::LongitudeNotNumber))]
    #[case("a", "", "45", "-180.5", Err(FormError::LongitudeOutOfRange))]
    fn test_validation_order(
        #[case] title: &str,
        #[case] description: &str,
        #[case] latitude: &str,
        #[case] longitude: &str,
        #[case] expected: Result<ValidatedTask, FormError>,
    ) {
        assert_eq!(
            validate_fields(title, description, latitude, longitude),
            expected
        );
    }

    #[test]
    fn test_valid_payload_is_trimmed() {
        let validated =
            validate_fields("  Buy milk ", "   ", " -90 ", "180").expect("valid input");
        assert_eq!(validated.title, "Buy milk");
        assert_eq!(validated.description, None);
        assert_eq!(validated.coordinate, Some(Coordinate::new(-90.0, 180.0)));

        let validated = validate_fields("x", " 2 litres ", "", "").expect("valid input");
        assert_eq!(validated.description.as_deref(), Some("2 litres"));
        assert_eq!(validated.coordinate, None);
    }

    #[test]
    fn test_edit_mode_prefills_and_create_resets() {
        let mut form = form();
        form.enter(FormMode::Edit(task(5)));
        assert_eq!(form.title().value(), "Visit museum");
        assert_eq!(form.description().value(), "Pergamon");
        assert_eq!(form.latitude().value(), "52.5");
        assert_eq!(form.map().marker(), Some(Coordinate::new(52.5, 13.4)));

        form.enter(FormMode::Create);
        assert!(!form.mode().is_edit());
        assert_eq!(form.title().value(), "");
        assert_eq!(form.description().value(), "");
        assert_eq!(form.latitude().value(), "");
        assert_eq!(form.longitude().value(), "");
        assert!(form.map().marker().is_none());
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_edit_with_half_coordinate_fails_validation() {
        let mut form = form();
        let mut half = task(5);
        half.longitude = None;
        form.enter(FormMode::Edit(half));
        assert_eq!(form.validate(), Err(FormError::CoordinateIncomplete));
    }

    #[test]
    fn test_typing_edits_focused_field_and_syncs_marker() {
        let mut form = form();
        form.enter(FormMode::Create);
        for ch in "Walk".chars() {
            form.handle_input(InputRequest::InsertChar(ch));
        }
        assert_eq!(form.title().value(), "Walk");

        form.set_focus(FormField::Latitude);
        for ch in "48.1".chars() {
            form.handle_input(InputRequest::InsertChar(ch));
        }
        assert!(form.map().marker().is_none());
        form.focus_next();
        assert_eq!(form.focus(), FormField::Longitude);
        for ch in "11.5".chars() {
            form.handle_input(InputRequest::InsertChar(ch));
        }
        assert_eq!(form.map().marker(), Some(Coordinate::new(48.1, 11.5)));

        form.handle_input(InputRequest::DeleteLine);
        assert!(form.map().marker().is_none());
    }

    #[test]
    fn test_pick_coordinate_rounds_and_replaces_marker() {
        let mut form = form();
        form.enter(FormMode::Create);
        form.pick_coordinate(Coordinate::new(1.0, 1.0));
        form.pick_coordinate(Coordinate::new(48.137_154_49, 11.576_124_51));
        assert_eq!(form.latitude().value(), "48.137154");
        assert_eq!(form.longitude().value(), "11.576125");
        assert_eq!(
            form.map().marker(),
            Some(Coordinate::new(48.137154, 11.576125))
        );

        form.clear_coordinate();
        assert_eq!(form.latitude().value(), "");
        assert!(form.map().marker().is_none());
    }

    #[test]
    fn test_device_position_only_centers_map() {
        let mut form = form();
        form.enter(FormMode::Create);
        form.apply_device_position(Ok(Coordinate::new(40.0, -3.7)));
        assert_eq!(form.map().center(), Coordinate::new(40.0, -3.7));
        assert_eq!(form.latitude().value(), "");
        assert_eq!(form.longitude().value(), "");

        assert_eq!(form.use_device_position(), Some(Coordinate::new(40.0, -3.7)));
        assert_eq!(form.latitude().value(), "40");

        form.enter(FormMode::Create);
        form.apply_device_position(Err(LocationError::Timeout(std::time::Duration::from_secs(5))));
        assert_eq!(form.map().center(), Coordinate::new(52.520008, 13.404954));
        assert!(form.use_device_position().is_none());
    }

    #[test]
    fn test_late_device_position_keeps_picked_marker_in_view() {
        let picked = Coordinate::new(48.137154, 11.576124);
        let mut form = form();
        form.enter(FormMode::Create);
        form.pick_coordinate(picked);
        let center = form.map().center();

        form.apply_device_position(Ok(Coordinate::new(-33.9, 18.4)));
        assert_eq!(form.map().center(), center);
        assert_eq!(form.map().marker(), Some(picked));
        assert_eq!(form.map().device(), Some(Coordinate::new(-33.9, 18.4)));
        assert_eq!(form.use_device_position(), Some(Coordinate::new(-33.9, 18.4)));

        let mut form = self::form();
        form.enter(FormMode::Create);
        form.pick_coordinate(picked);
        let center = form.map().center();
        form.apply_device_position(Err(LocationError::Timeout(std::time::Duration::from_secs(5))));
        assert_eq!(form.map().center(), center);
        assert_eq!(form.map().marker(), Some(picked));
    }

    #[test]
    fn test_device_position_ignored_in_edit_mode() {
        let mut form = form();
        form.enter(FormMode::Edit(task(5)));
        form.apply_device_position(Ok(Coordinate::new(0.0, 0.0)));
        assert_eq!(form.map().center(), Coordinate::new(52.5, 13.4));
    }

    #[test]
    fn test_prepare_submit_guards_pending_save() {
        let mut form = form();
        let mut toasts = Toasts::default();
        form.enter(FormMode::Create);
        form.set_fields("Buy milk", "", "", "");

        let pending = form.prepare_submit(&mut toasts).expect("pending save");
        assert_eq!(pending, PendingSave::Create(NewTask::new("Buy milk")));
        assert!(form.is_submitting());

        assert!(form.prepare_submit(&mut toasts).is_none());
        assert_eq!(
            toasts.last().map(|t| t.message.as_str()),
            Some("A save is already in progress.")
        );
    }

    #[test]
    fn test_edit_update_clears_removed_coordinate() {
        let mut form = form();
        let mut toasts = Toasts::default();
        form.enter(FormMode::Edit(task(5)));
        form.clear_coordinate();

        match form.prepare_submit(&mut toasts) {
            Some(PendingSave::Update { id, update }) => {
                assert_eq!(id, 5);
                assert_eq!(update.title.as_deref(), Some("Visit museum"));
                assert_eq!(update.latitude, Some(None));
                assert_eq!(update.longitude, Some(None));
            }
            other => panic!("unexpected pending save: {other:?}"),
        }
    }

    #[test]
    fn test_finish_submit_failure_keeps_fields() {
        let mut form = form();
        let mut toasts = Toasts::default();
        form.enter(FormMode::Create);
        form.set_fields("Buy milk", "", "", "");
        assert!(form.prepare_submit(&mut toasts).is_some());

        let route = form.finish_submit(
            Err(GatewayError::Timeout { duration: 30 }),
            &mut toasts,
        );
        assert!(route.is_none());
        assert!(!form.is_submitting());
        assert_eq!(form.title().value(), "Buy milk");
        assert_eq!(
            toasts.last().map(|t| t.message.as_str()),
            Some("Could not create the task.")
        );
    }
}
