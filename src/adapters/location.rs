use crate::domain::model::ReferenceLocation;
use crate::domain::ports::LocationProvider;
use crate::utils::error::GeolocationError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Position supplied up front, e.g. from `--lat/--lng`.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    location: ReferenceLocation,
}

impl FixedLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            location: ReferenceLocation::new(latitude, longitude),
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<ReferenceLocation, GeolocationError> {
        Ok(self.location)
    }
}

/// Used when no provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocation;

#[async_trait]
impl LocationProvider for UnsupportedLocation {
    async fn current_position(&self) -> Result<ReferenceLocation, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Approximate position from an IP geolocation service.
///
/// Understands both `{"lat", "lon"}` and `{"latitude", "longitude"}`
/// response shapes.
pub struct IpGeolocation {
    client: Client,
    endpoint: String,
}

impl IpGeolocation {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for IpGeolocation {
    async fn current_position(&self) -> Result<ReferenceLocation, GeolocationError> {
        tracing::debug!("Requesting position from {}", self.endpoint);

        let response = self.client.get(&self.endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                GeolocationError::Timeout
            } else {
                GeolocationError::PositionUnavailable(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(GeolocationError::PermissionDenied)
            }
            status if !status.is_success() => {
                return Err(GeolocationError::PositionUnavailable(format!(
                    "status {}",
                    status.as_u16()
                )))
            }
            _ => {}
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GeolocationError::Timeout
            } else {
                GeolocationError::PositionUnavailable(e.to_string())
            }
        })?;

        parse_position(&body)
    }
}

fn parse_position(body: &Value) -> Result<ReferenceLocation, GeolocationError> {
    if body.get("status").and_then(Value::as_str) == Some("fail") {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("lookup failed");
        return Err(GeolocationError::PositionUnavailable(message.to_string()));
    }

    let number = |keys: &[&str]| keys.iter().find_map(|key| body.get(*key).and_then(Value::as_f64));

    match (number(&["lat", "latitude"]), number(&["lon", "lng", "longitude"])) {
        (Some(latitude), Some(longitude)) => Ok(ReferenceLocation::new(latitude, longitude)),
        _ => Err(GeolocationError::PositionUnavailable(
            "response carried no coordinates".to_string(),
        )),
    }
}
