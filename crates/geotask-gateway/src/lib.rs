/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public GeoTask gateway crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod gateway;
pub mod http;
pub mod types;

pub use gateway::TaskGateway;

// Re-export commonly used types from http
pub use http::{ClientConfig, GatewayError, GeotaskClient, Result, DEFAULT_BASE_URL};

// Re-export all types
pub use types::*;
