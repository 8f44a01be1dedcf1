/*
[INPUT]:  Mock server requirements of the view tests
[OUTPUT]: Shared fixtures: mock server, gateway client, task JSON
[POS]:    Test infrastructure - shared across geotask integration tests
[UPDATE]: When adding new test patterns or fixtures
*/

#![allow(dead_code)]

use geotask_gateway::{ClientConfig, Coordinate, GeotaskClient};
use serde_json::{Value, json};
use wiremock::MockServer;

pub const FALLBACK: Coordinate = Coordinate::new(52.520008, 13.404954);

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> GeotaskClient {
    GeotaskClient::with_base_url(ClientConfig::default(), &server.uri()).expect("client init")
}

pub fn task_json(id: i64, title: &str, is_done: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "is_done": is_done,
        "created_at": "2025-05-01T10:00:00+00:00",
        "updated_at": "2025-05-01T10:00:00+00:00",
        "latitude": null,
        "longitude": null
    })
}

pub fn list_json(tasks: Vec<Value>) -> Value {
    json!({ "tasks": tasks })
}
