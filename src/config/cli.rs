use crate::adapters::render::OutputFormat;
use crate::config::toml_config::{GeolocationProviderKind, TomlConfig, MAX_PAGE_SIZE};
use crate::utils::error::Result;
use crate::utils::validation::{validate_range, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "branch-locator")]
#[command(about = "Browse branch locations, filter them, and rank them by distance")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// GraphQL endpoint (may carry an ?auth= key)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Static bearer token for the content API
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long)]
    pub page_size: Option<usize>,

    /// Page to open first
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Initial search text
    #[arg(short, long)]
    pub query: Option<String>,

    /// Your latitude, used as a fixed location
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Your longitude, used as a fixed location
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Look up your position from an IP geolocation service instead
    #[arg(long, conflicts_with = "lat")]
    pub geolocation_endpoint: Option<String>,

    /// Sort by distance right after the first page loads
    #[arg(long)]
    pub locate: bool,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the map view as GeoJSON to this file after every command
    #[arg(long)]
    pub map_output: Option<String>,

    /// Print the first page and exit instead of reading commands
    #[arg(long)]
    pub once: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl CliConfig {
    /// Loads the configuration file (if any) and layers flags on top.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.source.endpoint = endpoint.clone();
        }
        if let Some(token) = &self.token {
            config.source.auth_token = Some(token.clone());
        }
        if let Some(page_size) = self.page_size {
            config.source.page_size = Some(page_size);
        }
        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            config.geolocation.provider = Some(GeolocationProviderKind::Fixed);
            config.geolocation.latitude = Some(lat);
            config.geolocation.longitude = Some(lng);
        }
        if let Some(endpoint) = &self.geolocation_endpoint {
            config.geolocation.provider = Some(GeolocationProviderKind::Ip);
            config.geolocation.endpoint = Some(endpoint.clone());
        }
        if let Some(format) = self.format {
            config.display.format = Some(format);
        }
        if let Some(path) = &self.map_output {
            config.display.map_output = Some(path.clone());
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        // Keeps `page * page_size` within range for any accepted page size.
        validate_range("page", self.page, 1, usize::MAX / MAX_PAGE_SIZE)
    }
}
