/*
[INPUT]:  HTTP client configuration and task API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod tasks;

pub use error::{GatewayError, Result};

pub use client::{ClientConfig, GeotaskClient, DEFAULT_BASE_URL};
