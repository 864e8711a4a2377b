use crate::adapters::location::{FixedLocation, IpGeolocation, UnsupportedLocation};
use crate::adapters::render::OutputFormat;
use crate::core::pagination::DEFAULT_PAGE_SIZE;
use crate::domain::ports::{ConfigProvider, LocationProvider};
use crate::utils::error::{LocatorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://cg.optimizely.com/content/v2";
pub const DEFAULT_GEOLOCATION_TIMEOUT_SECONDS: u64 = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Sent as `Authorization: Bearer <token>` when set.
    pub auth_token: Option<String>,
    pub page_size: Option<usize>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            auth_token: None,
            page_size: None,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationProviderKind {
    None,
    Fixed,
    Ip,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeolocationConfig {
    pub provider: Option<GeolocationProviderKind>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl GeolocationConfig {
    fn require_endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .ok_or_else(|| LocatorError::MissingConfigError {
                field: "geolocation.endpoint".to_string(),
            })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub format: Option<OutputFormat>,
    pub map_output: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LocatorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LocatorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPTIMIZELY_KEY})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LocatorError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn page_size(&self) -> usize {
        self.source.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn output_format(&self) -> OutputFormat {
        self.display.format.unwrap_or_default()
    }

    pub fn map_output(&self) -> Option<&str> {
        self.display.map_output.as_deref()
    }

    /// Explicit provider if configured, otherwise `fixed` when both
    /// coordinates are present.
    pub fn geolocation_provider(&self) -> GeolocationProviderKind {
        match self.geolocation.provider {
            Some(kind) => kind,
            None if self.geolocation.latitude.is_some() && self.geolocation.longitude.is_some() => {
                GeolocationProviderKind::Fixed
            }
            None => GeolocationProviderKind::None,
        }
    }

    pub fn build_location_provider(&self) -> Result<Box<dyn LocationProvider>> {
        let geo = &self.geolocation;
        let provider: Box<dyn LocationProvider> = match self.geolocation_provider() {
            GeolocationProviderKind::None => Box::new(UnsupportedLocation),
            GeolocationProviderKind::Fixed => {
                let location = validation::require_coordinates(geo.latitude, geo.longitude)?;
                Box::new(FixedLocation::new(location.latitude, location.longitude))
            }
            GeolocationProviderKind::Ip => {
                let endpoint = geo.require_endpoint()?;
                let timeout = geo
                    .timeout_seconds
                    .unwrap_or(DEFAULT_GEOLOCATION_TIMEOUT_SECONDS);
                Box::new(IpGeolocation::new(endpoint, Duration::from_secs(timeout)))
            }
        };
        Ok(provider)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_endpoint("source.endpoint", &self.source.endpoint)?;
        validation::validate_range("source.page_size", self.page_size(), 1, MAX_PAGE_SIZE)?;

        if let Some(token) = &self.source.auth_token {
            if token.contains("${") {
                return Err(LocatorError::ConfigValidationError {
                    field: "source.auth_token".to_string(),
                    message: format!("unresolved environment variable in '{}'", token),
                });
            }
        }

        let geo = &self.geolocation;
        match self.geolocation_provider() {
            GeolocationProviderKind::None => {}
            GeolocationProviderKind::Fixed => {
                validation::require_coordinates(geo.latitude, geo.longitude)?;
            }
            GeolocationProviderKind::Ip => {
                validation::validate_endpoint("geolocation.endpoint", geo.require_endpoint()?)?;
                if let Some(timeout) = geo.timeout_seconds {
                    validation::validate_range("geolocation.timeout_seconds", timeout, 1, 120)?;
                }
            }
        }

        if let Some(path) = &self.display.map_output {
            validation::validate_map_output("display.map_output", path)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn auth_token(&self) -> Option<&str> {
        self.source.auth_token.as_deref()
    }

    fn page_size(&self) -> usize {
        self.page_size()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
