/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Task and Coordinate domain types with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Server-assigned task identifier
pub type TaskId = i64;

pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// Decimal places kept when a coordinate is picked on a map
pub const COORDINATE_PRECISION: i32 = 6;

/// A (latitude, longitude) pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        LATITUDE_RANGE.contains(&self.latitude) && LONGITUDE_RANGE.contains(&self.longitude)
    }

    /// Round both components to `COORDINATE_PRECISION` decimal places
    pub fn rounded(&self) -> Self {
        Self {
            latitude: round_to(self.latitude, COORDINATE_PRECISION),
            longitude: round_to(self.longitude, COORDINATE_PRECISION),
        }
    }

    /// Clamp into the valid latitude/longitude ranges
    pub fn clamped(&self) -> Self {
        Self {
            latitude: self.latitude.clamp(*LATITUDE_RANGE.start(), *LATITUDE_RANGE.end()),
            longitude: self
                .longitude
                .clamp(*LONGITUDE_RANGE.start(), *LONGITUDE_RANGE.end()),
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// A to-do item as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Task {
    /// Coordinate of the task when both components are present
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    /// Human readable creation time (local time if the server sent RFC 3339)
    pub fn created_display(&self) -> Option<String> {
        self.created_at.as_deref().map(display_timestamp)
    }

    /// Human readable update time (local time if the server sent RFC 3339)
    pub fn updated_display(&self) -> Option<String> {
        self.updated_at.as_deref().map(display_timestamp)
    }
}

fn display_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserialize_without_geo_fields() {
        let json = r#"{
            "id": 1,
            "title": "Buy milk",
            "description": null,
            "is_done": false,
            "created_at": "2025-05-01T10:00:00+00:00",
            "updated_at": "2025-05-01T10:00:00+00:00"
        }"#;
        let task: Task = serde_json::from_str(json).expect("deserialize task");
        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Buy milk");
        assert!(task.description.is_none());
        assert!(task.coordinate().is_none());
    }

    #[test]
    fn test_task_coordinate_requires_both_components() {
        let json = r#"{"id": 5, "title": "Visit", "latitude": 52.5, "longitude": null}"#;
        let task: Task = serde_json::from_str(json).expect("deserialize task");
        assert_eq!(task.latitude, Some(52.5));
        assert!(task.coordinate().is_none());
    }

    #[test]
    fn test_coordinate_rounding_and_validity() {
        let coordinate = Coordinate::new(52.520_008_49, 13.404_954_51).rounded();
        assert_eq!(coordinate, Coordinate::new(52.520_008, 13.404_955));
        assert!(coordinate.is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert_eq!(
            Coordinate::new(95.0, -200.0).clamped(),
            Coordinate::new(90.0, -180.0)
        );
    }

    #[test]
    fn test_timestamp_display_falls_back_to_raw() {
        let task = Task {
            id: 1,
            title: "t".into(),
            description: None,
            is_done: false,
            created_at: Some("yesterday".into()),
            updated_at: None,
            latitude: None,
            longitude: None,
        };
        assert_eq!(task.created_display().as_deref(), Some("yesterday"));
        assert!(task.updated_display().is_none());
    }
}
