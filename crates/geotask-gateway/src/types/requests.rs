/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::models::Coordinate;

/// Body of `POST /api/tasks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_coordinate(mut self, coordinate: Option<Coordinate>) -> Self {
        self.latitude = coordinate.map(|c| c.latitude);
        self.longitude = coordinate.map(|c| c.longitude);
        self
    }
}

/// Body of `PUT /api/tasks/{id}`
///
/// Outer `None` leaves a field untouched; `Some(None)` sends an explicit
/// `null` and clears it on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Option<f64>>,
}

impl TaskUpdate {
    /// Update that only flips the completion flag
    pub fn done(is_done: bool) -> Self {
        Self {
            is_done: Some(is_done),
            ..Self::default()
        }
    }

    /// Set or clear both coordinate components together
    pub fn with_coordinate(mut self, coordinate: Option<Coordinate>) -> Self {
        self.latitude = Some(coordinate.map(|c| c.latitude));
        self.longitude = Some(coordinate.map(|c| c.longitude));
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
