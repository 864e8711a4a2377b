use thiserror::Error;

/// Failure of a single page request against the branch content API.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("API error: {0}")]
    Api(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response body: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("Location request timed out")]
    Timeout,

    #[error("Geolocation is not supported by this configuration")]
    Unsupported,
}

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("Unable to load branches: {0}")]
    FetchError(#[from] FetchError),

    #[error("Unable to retrieve your location: {0}")]
    GeolocationError(#[from] GeolocationError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid command '{input}': {reason}")]
    InvalidCommand { input: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Location,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for a run that ends on this error.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,      // warning only
            ErrorSeverity::Medium => 2,   // worth retrying
            ErrorSeverity::High => 1,     // bad input or configuration
            ErrorSeverity::Critical => 3, // system failure
        }
    }
}

impl LocatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LocatorError::FetchError(_) => ErrorCategory::Network,
            LocatorError::GeolocationError(_) => ErrorCategory::Location,
            LocatorError::ConfigValidationError { .. }
            | LocatorError::InvalidConfigValueError { .. }
            | LocatorError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LocatorError::InvalidCommand { .. } => ErrorCategory::Input,
            LocatorError::IoError(_)
            | LocatorError::SerializationError(_)
            | LocatorError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Location => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LocatorError::FetchError(_) => "Unable to load branches".to_string(),
            LocatorError::GeolocationError(GeolocationError::Unsupported) => {
                "Geolocation is not supported by your configuration".to_string()
            }
            LocatorError::GeolocationError(_) => "Unable to retrieve your location.".to_string(),
            LocatorError::InvalidCommand { input, .. } => {
                format!("Unknown command: {}", input)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LocatorError::FetchError(FetchError::Status(401 | 403)) => {
                "Check the auth key in the endpoint URL or the configured token"
            }
            LocatorError::FetchError(_) => {
                "Please check your connection or try again later (use 'reload')"
            }
            LocatorError::GeolocationError(GeolocationError::Unsupported) => {
                "Pass --lat/--lng or configure a geolocation provider"
            }
            LocatorError::GeolocationError(_) => "Try 'locate' again or pass --lat/--lng",
            LocatorError::ConfigValidationError { .. }
            | LocatorError::InvalidConfigValueError { .. }
            | LocatorError::MissingConfigError { .. } => {
                "Fix the configuration file or command-line flags and restart"
            }
            LocatorError::InvalidCommand { .. } => "Type 'help' to list available commands",
            LocatorError::IoError(_)
            | LocatorError::SerializationError(_)
            | LocatorError::CsvError(_) => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, LocatorError>;
