/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for geotask-gateway tests

use geotask_gateway::{ClientConfig, GeotaskClient};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> GeotaskClient {
    GeotaskClient::with_base_url(ClientConfig::default(), &server.uri()).expect("client init")
}

/// Task JSON as the backend renders it
pub fn task_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "is_done": false,
        "created_at": "2025-05-01T10:00:00+00:00",
        "updated_at": "2025-05-01T10:00:00+00:00"
    })
}
