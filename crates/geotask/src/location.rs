/*
[INPUT]:  Location configuration and position request options
[OUTPUT]: Current device position or a typed failure
[POS]:    Device location layer - pluggable providers with a bounded timeout
[UPDATE]: When adding location providers or changing timeout handling
*/

use std::time::Duration;

use async_trait::async_trait;
use geotask_gateway::Coordinate;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{LocationConfig, LocationSource};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    /// The user (or configuration) refused location access
    #[error("location access denied")]
    Denied,

    #[error("location lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Options passed to every position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub timeout: Duration,
    pub high_accuracy: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            high_accuracy: true,
        }
    }
}

impl PositionOptions {
    pub fn from_config(config: &LocationConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            high_accuracy: config.high_accuracy,
        }
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, LocationError>;
}

/// Query `provider`, giving up after `options.timeout`
pub async fn locate(
    provider: &dyn LocationProvider,
    options: &PositionOptions,
) -> Result<Coordinate, LocationError> {
    match tokio::time::timeout(options.timeout, provider.current_position(options)).await {
        Ok(Ok(position)) if position.is_valid() => Ok(position),
        Ok(Ok(position)) => Err(LocationError::Unavailable(format!(
            "position out of range: {position}"
        ))),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(LocationError::Timeout(options.timeout)),
    }
}

/// Approximate position from an IP geolocation service
#[derive(Debug, Clone)]
pub struct IpLocationProvider {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "longitude")]
    lon: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl IpLocationProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        if options.high_accuracy {
            tracing::debug!("ip geolocation cannot honor high accuracy; using coarse position");
        }
        let response = self
            .client
            .get(&self.endpoint)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|err| LocationError::Unavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "lookup returned {}",
                response.status()
            )));
        }
        let body: IpLocationResponse = response
            .json()
            .await
            .map_err(|err| LocationError::Unavailable(err.to_string()))?;
        if body.status.as_deref() == Some("fail") {
            return Err(LocationError::Unavailable(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }
        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(LocationError::Unavailable(
                "response carried no coordinate".to_string(),
            )),
        }
    }
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    position: Coordinate,
}

impl FixedLocationProvider {
    pub fn new(position: Coordinate) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        Ok(self.position)
    }
}

/// Location access switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLocationProvider;

#[async_trait]
impl LocationProvider for DisabledLocationProvider {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        Err(LocationError::Denied)
    }
}

/// Build the provider selected in configuration
pub fn provider_from_config(config: &LocationConfig) -> Box<dyn LocationProvider> {
    match (config.provider, config.fixed) {
        (LocationSource::Ip, _) => Box::new(IpLocationProvider::new(config.endpoint.clone())),
        (LocationSource::Fixed, Some(position)) => Box::new(FixedLocationProvider::new(position)),
        (LocationSource::Fixed, None) => {
            tracing::warn!("fixed location provider without coordinate; location disabled");
            Box::new(DisabledLocationProvider)
        }
        (LocationSource::Disabled, _) => Box::new(DisabledLocationProvider),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct SlowProvider;

    #[async_trait]
    impl LocationProvider for SlowProvider {
        async fn current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinate, LocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinate::new(0.0, 0.0))
        }
    }

    #[tokio::test]
    async fn test_locate_times_out() {
        let options = PositionOptions {
            timeout: Duration::from_millis(20),
            high_accuracy: true,
        };
        let result = locate(&SlowProvider, &options).await;
        assert_eq!(result, Err(LocationError::Timeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_fixed_and_disabled_providers() {
        let options = PositionOptions::default();
        let fixed = FixedLocationProvider::new(Coordinate::new(48.1, 11.5));
        assert_eq!(
            locate(&fixed, &options).await,
            Ok(Coordinate::new(48.1, 11.5))
        );
        assert_eq!(
            locate(&DisabledLocationProvider, &options).await,
            Err(LocationError::Denied)
        );
    }

    #[tokio::test]
    async fn test_out_of_range_position_is_unavailable() {
        let fixed = FixedLocationProvider::new(Coordinate::new(120.0, 0.0));
        let result = locate(&fixed, &PositionOptions::default()).await;
        assert!(matches!(result, Err(LocationError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_ip_provider_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "lat": 52.52,
                "lon": 13.405
            })))
            .mount(&server)
            .await;

        let provider = IpLocationProvider::new(format!("{}/json/", server.uri()));
        let position = locate(&provider, &PositionOptions::default())
            .await
            .expect("position");
        assert_eq!(position, Coordinate::new(52.52, 13.405));
    }

    #[tokio::test]
    async fn test_ip_provider_reports_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "fail",
                "message": "private range"
            })))
            .mount(&server)
            .await;

        let provider = IpLocationProvider::new(format!("{}/json/", server.uri()));
        let result = locate(&provider, &PositionOptions::default()).await;
        assert_eq!(
            result,
            Err(LocationError::Unavailable("private range".to_string()))
        );
    }
}
