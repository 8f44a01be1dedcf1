/*
[INPUT]:  Public API exports for the geotask crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod form;
pub mod list;
pub mod location;
pub mod map;
pub mod navigation;

// Re-export main types for convenience
pub use config::AppConfig;
pub use form::{FormError, FormField, TaskFormView};
pub use list::{LoadState, TaskListView};
pub use location::{LocationError, LocationProvider, PositionOptions};
pub use map::{MapView, MapWidgets};
pub use navigation::{FormMode, ListReturn, Route, Toast, ToastLevel, Toasts};
