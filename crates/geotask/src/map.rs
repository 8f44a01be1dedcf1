/*
[INPUT]:  Task coordinates, fallback center, terminal cells hit by the mouse
[OUTPUT]: Map viewports, picked coordinates, keyed per-task map widgets
[POS]:    Map layer - viewport math and widget lifecycle (rendering lives in tui::ui::map)
[UPDATE]: When changing map projection, zoom behavior or widget ownership
*/

use std::collections::BTreeMap;

use geotask_gateway::{
    Coordinate, LATITUDE_RANGE, LONGITUDE_RANGE, Task, TaskId,
};
use ratatui::layout::Rect;

const MIN_SPAN_DEGREES: f64 = 0.05;
const MAX_SPAN_DEGREES: f64 = 360.0;
/// Cursor moves this fraction of the visible span per key press
const CURSOR_STEP_FRACTION: f64 = 0.05;

/// Viewport over the world map plus the pins drawn on it
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    center: Coordinate,
    span_degrees: f64,
    marker: Option<Coordinate>,
    device: Option<Coordinate>,
    cursor: Option<Coordinate>,
}

impl MapView {
    pub fn new(center: Coordinate, span_degrees: f64) -> Self {
        Self {
            center: center.clamped(),
            span_degrees: span_degrees.clamp(MIN_SPAN_DEGREES, MAX_SPAN_DEGREES),
            marker: None,
            device: None,
            cursor: None,
        }
    }

    /// Centered on `target` with a marker on it
    pub fn pinned(target: Coordinate, span_degrees: f64) -> Self {
        let mut view = Self::new(target, span_degrees);
        view.marker = Some(target);
        view
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn span_degrees(&self) -> f64 {
        self.span_degrees
    }

    pub fn marker(&self) -> Option<Coordinate> {
        self.marker
    }

    pub fn device(&self) -> Option<Coordinate> {
        self.device
    }

    pub fn cursor(&self) -> Option<Coordinate> {
        self.cursor
    }

    pub fn recenter(&mut self, center: Coordinate) {
        self.center = center.clamped();
    }

    /// Replace any existing marker
    pub fn set_marker(&mut self, marker: Option<Coordinate>) {
        self.marker = marker.map(|m| m.rounded());
    }

    pub fn set_device(&mut self, device: Option<Coordinate>) {
        self.device = device;
    }

    pub fn zoom_in(&mut self) {
        self.span_degrees = (self.span_degrees / 2.0).max(MIN_SPAN_DEGREES);
    }

    pub fn zoom_out(&mut self) {
        self.span_degrees = (self.span_degrees * 2.0).min(MAX_SPAN_DEGREES);
    }

    /// Longitude range visible in the viewport
    pub fn x_bounds(&self) -> [f64; 2] {
        shifted_window(
            self.center.longitude,
            self.span_degrees / 2.0,
            *LONGITUDE_RANGE.start(),
            *LONGITUDE_RANGE.end(),
        )
    }

    /// Latitude range visible in the viewport
    ///
    /// Terminal cells are roughly twice as tall as wide, so half the
    /// longitude span keeps the map close to its natural aspect.
    pub fn y_bounds(&self) -> [f64; 2] {
        shifted_window(
            self.center.latitude,
            self.span_degrees / 4.0,
            *LATITUDE_RANGE.start(),
            *LATITUDE_RANGE.end(),
        )
    }

    /// Coordinate under a terminal cell of the map's inner area
    pub fn coordinate_at(&self, inner: Rect, column: u16, row: u16) -> Option<Coordinate> {
        if inner.width == 0 || inner.height == 0 {
            return None;
        }
        if column < inner.x
            || column >= inner.x + inner.width
            || row < inner.y
            || row >= inner.y + inner.height
        {
            return None;
        }

        let [x_min, x_max] = self.x_bounds();
        let [y_min, y_max] = self.y_bounds();
        let fx = (f64::from(column - inner.x) + 0.5) / f64::from(inner.width);
        let fy = (f64::from(row - inner.y) + 0.5) / f64::from(inner.height);
        let longitude = x_min + fx * (x_max - x_min);
        let latitude = y_max - fy * (y_max - y_min);
        Some(Coordinate::new(latitude, longitude).clamped().rounded())
    }

    /// Show the keyboard crosshair, starting from the marker or the center
    pub fn show_cursor(&mut self) {
        if self.cursor.is_none() {
            self.cursor = Some(self.marker.unwrap_or(self.center));
        }
    }

    pub fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    /// Move the crosshair by whole steps; the viewport follows it
    pub fn nudge_cursor(&mut self, lat_steps: i32, lon_steps: i32) {
        self.show_cursor();
        let step = self.span_degrees * CURSOR_STEP_FRACTION;
        if let Some(cursor) = self.cursor {
            let moved = Coordinate::new(
                cursor.latitude + f64::from(lat_steps) * step,
                cursor.longitude + f64::from(lon_steps) * step,
            )
            .clamped()
            .rounded();
            self.cursor = Some(moved);
            self.follow(moved);
        }
    }

    fn follow(&mut self, point: Coordinate) {
        let [x_min, x_max] = self.x_bounds();
        let [y_min, y_max] = self.y_bounds();
        if point.longitude < x_min
            || point.longitude > x_max
            || point.latitude < y_min
            || point.latitude > y_max
        {
            self.recenter(point);
        }
    }
}

/// Window of `half` around `center`, shifted (not shrunk) to stay inside [min, max]
fn shifted_window(center: f64, half: f64, min: f64, max: f64) -> [f64; 2] {
    if half * 2.0 >= max - min {
        return [min, max];
    }
    let mut low = center - half;
    let mut high = center + half;
    if low < min {
        high += min - low;
        low = min;
    }
    if high > max {
        low -= high - max;
        high = max;
    }
    [low, high]
}

/// One map widget per listed task, keyed by task id
///
/// Owned by the task list; `teardown` must run when the list is left.
#[derive(Debug, Default)]
pub struct MapWidgets {
    widgets: BTreeMap<TaskId, MapView>,
}

impl MapWidgets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every widget, then create one per task
    ///
    /// Tasks without a coordinate get an unpinned view on `fallback`.
    pub fn rebuild(&mut self, tasks: &[Task], fallback: Coordinate, span_degrees: f64) {
        self.teardown();
        for task in tasks {
            let view = match task.coordinate() {
                Some(coordinate) => MapView::pinned(coordinate, span_degrees),
                None => MapView::new(fallback, span_degrees),
            };
            self.widgets.insert(task.id, view);
        }
        tracing::debug!(count = self.widgets.len(), "map widgets rebuilt");
    }

    pub fn get(&self, id: TaskId) -> Option<&MapView> {
        self.widgets.get(&id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut MapView> {
        self.widgets.get_mut(&id)
    }

    pub fn remove(&mut self, id: TaskId) -> Option<MapView> {
        self.widgets.remove(&id)
    }

    pub fn teardown(&mut self) {
        if !self.widgets.is_empty() {
            tracing::debug!(count = self.widgets.len(), "map widgets released");
        }
        self.widgets.clear();
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.widgets.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, coordinate: Option<Coordinate>) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: None,
            is_done: false,
            created_at: None,
            updated_at: None,
            latitude: coordinate.map(|c| c.latitude),
            longitude: coordinate.map(|c| c.longitude),
        }
    }

    #[test]
    fn test_bounds_follow_center() {
        let view = MapView::new(Coordinate::new(10.0, 20.0), 8.0);
        assert_eq!(view.x_bounds(), [16.0, 24.0]);
        assert_eq!(view.y_bounds(), [8.0, 12.0]);
    }

    #[test]
    fn test_bounds_shift_at_world_edge() {
        let view = MapView::new(Coordinate::new(89.0, 179.0), 8.0);
        assert_eq!(view.x_bounds(), [172.0, 180.0]);
        assert_eq!(view.y_bounds(), [86.0, 90.0]);

        let world = MapView::new(Coordinate::new(0.0, 0.0), 360.0);
        assert_eq!(world.x_bounds(), [-180.0, 180.0]);
        assert_eq!(world.y_bounds(), [-90.0, 90.0]);
    }

    #[test]
    fn test_coordinate_at_maps_cells() {
        let view = MapView::new(Coordinate::new(0.0, 0.0), 360.0);
        let inner = Rect::new(10, 5, 36, 18);

        let top_left = view.coordinate_at(inner, 10, 5).expect("inside");
        assert_eq!(top_left, Coordinate::new(85.0, -175.0));

        let bottom_right = view.coordinate_at(inner, 45, 22).expect("inside");
        assert_eq!(bottom_right, Coordinate::new(-85.0, 175.0));

        assert!(view.coordinate_at(inner, 9, 5).is_none());
        assert!(view.coordinate_at(inner, 46, 5).is_none());
        assert!(view.coordinate_at(inner, 10, 23).is_none());
    }

    #[test]
    fn test_coordinate_at_rounds_to_six_places() {
        let view = MapView::new(Coordinate::new(52.520008, 13.404954), 0.3);
        let inner = Rect::new(0, 0, 7, 3);
        let picked = view.coordinate_at(inner, 3, 1).expect("inside");
        assert_eq!(picked, picked.rounded());
        assert!((picked.latitude - 52.520008).abs() < 1e-6);
        assert!((picked.longitude - 13.404954).abs() < 1e-6);
    }

    #[test]
    fn test_marker_replaced_and_zoom_limits() {
        let mut view = MapView::new(Coordinate::new(0.0, 0.0), 8.0);
        view.set_marker(Some(Coordinate::new(1.0, 1.0)));
        view.set_marker(Some(Coordinate::new(2.123_456_789, 3.0)));
        assert_eq!(view.marker(), Some(Coordinate::new(2.123457, 3.0)));

        for _ in 0..20 {
            view.zoom_out();
        }
        assert_eq!(view.span_degrees(), 360.0);
        for _ in 0..40 {
            view.zoom_in();
        }
        assert_eq!(view.span_degrees(), MIN_SPAN_DEGREES);
    }

    #[test]
    fn test_cursor_nudge_recenters_when_leaving_view() {
        let mut view = MapView::new(Coordinate::new(0.0, 0.0), 8.0);
        view.nudge_cursor(0, 1);
        assert_eq!(view.cursor(), Some(Coordinate::new(0.0, 0.4)));
        assert_eq!(view.center(), Coordinate::new(0.0, 0.0));

        for _ in 0..10 {
            view.nudge_cursor(0, 1);
        }
        assert_eq!(view.center(), view.cursor().expect("cursor"));
    }

    #[test]
    fn test_widgets_rebuild_uses_fallback() {
        let fallback = Coordinate::new(52.52, 13.405);
        let mut widgets = MapWidgets::new();
        widgets.rebuild(
            &[task(1, Some(Coordinate::new(48.1, 11.5))), task(2, None)],
            fallback,
            8.0,
        );
        assert_eq!(widgets.len(), 2);
        let pinned = widgets.get(1).expect("widget 1");
        assert_eq!(pinned.marker(), Some(Coordinate::new(48.1, 11.5)));
        let unpinned = widgets.get(2).expect("widget 2");
        assert_eq!(unpinned.center(), fallback);
        assert!(unpinned.marker().is_none());

        widgets.rebuild(&[task(3, None)], fallback, 8.0);
        assert_eq!(widgets.ids().collect::<Vec<_>>(), vec![3]);

        widgets.teardown();
        assert!(widgets.is_empty());
    }
}
