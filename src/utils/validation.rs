use crate::domain::model::Coordinates;
use crate::utils::error::{LocatorError, Result};
use url::Url;

pub const MAP_OUTPUT_EXTENSIONS: &[&str] = &["geojson", "json"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> LocatorError {
    LocatorError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// An HTTP(S) endpoint. The content API key may ride along in the query
/// string, so the query is not inspected.
pub fn validate_endpoint(field_name: &str, endpoint: &str) -> Result<Url> {
    if endpoint.trim().is_empty() {
        return Err(invalid(field_name, endpoint, "Endpoint cannot be empty"));
    }

    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field_name, endpoint, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(invalid(
                field_name,
                endpoint,
                format!("Unsupported URL scheme: {}", scheme),
            ))
        }
    }

    Ok(url)
}

/// Both halves of a fixed location must be present and on the globe.
pub fn require_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<Coordinates> {
    let latitude = latitude.ok_or_else(|| LocatorError::MissingConfigError {
        field: "geolocation.latitude".to_string(),
    })?;
    let longitude = longitude.ok_or_else(|| LocatorError::MissingConfigError {
        field: "geolocation.longitude".to_string(),
    })?;

    validate_range("geolocation.latitude", latitude, -90.0, 90.0)?;
    validate_range("geolocation.longitude", longitude, -180.0, 180.0)?;
    Ok(Coordinates::new(latitude, longitude))
}

/// GeoJSON export target: a usable file name ending in `.geojson` or `.json`.
pub fn validate_map_output(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) if MAP_OUTPUT_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(invalid(
            field_name,
            path,
            format!("Map output must end in .{}", MAP_OUTPUT_EXTENSIONS.join(" or .")),
        )),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN fails both comparisons, so check containment rather than exclusion.
    if !(value >= min && value <= max) {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint() {
        let url = validate_endpoint("source.endpoint", "https://cg.optimizely.com/content/v2?auth=abc").unwrap();
        assert_eq!(url.host_str(), Some("cg.optimizely.com"));
        assert!(validate_endpoint("source.endpoint", "http://localhost:8080/graphql").is_ok());
        assert!(validate_endpoint("source.endpoint", "").is_err());
        assert!(validate_endpoint("source.endpoint", "invalid-url").is_err());
        assert!(validate_endpoint("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_require_coordinates() {
        let location = require_coordinates(Some(40.7128), Some(-74.006)).unwrap();
        assert_eq!(location, Coordinates::new(40.7128, -74.006));

        assert!(matches!(
            require_coordinates(Some(40.7), None),
            Err(LocatorError::MissingConfigError { field }) if field == "geolocation.longitude"
        ));
        assert!(require_coordinates(Some(91.0), Some(0.0)).is_err());
        assert!(require_coordinates(Some(0.0), Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("source.page_size", 30, 1, 100).is_ok());
        assert!(validate_range("source.page_size", 0, 1, 100).is_err());
        assert!(validate_range("geolocation.latitude", f64::NAN, -90.0, 90.0).is_err());
    }

    #[test]
    fn test_validate_map_output() {
        assert!(validate_map_output("display.map_output", "out/map.geojson").is_ok());
        assert!(validate_map_output("display.map_output", "MAP.JSON").is_ok());
        assert!(validate_map_output("display.map_output", "map.txt").is_err());
        assert!(validate_map_output("display.map_output", "map").is_err());
        assert!(validate_map_output("display.map_output", "").is_err());
    }
}
