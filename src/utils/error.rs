use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Login as {role} failed: {message}")]
    AuthError { role: String, message: String },

    #[error("Unexpected response from {endpoint}: {message}")]
    UnexpectedResponse { endpoint: String, message: String },
}

impl SmokeError {
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SmokeError::ConfigError { .. }
                | SmokeError::ConfigValidationError { .. }
                | SmokeError::InvalidConfigValueError { .. }
                | SmokeError::MissingConfigError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SmokeError::ApiError(e) if e.is_timeout() => {
                "The TAJLINE API did not answer in time".to_string()
            }
            SmokeError::ApiError(e) if e.is_connect() => {
                "Could not connect to the TAJLINE API".to_string()
            }
            SmokeError::AuthError { role, .. } => format!("Could not log in as {}", role),
            SmokeError::MissingConfigError { field } => {
                format!("Required setting '{}' is not configured", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SmokeError::ApiError(_) => "Check --base-url and that the service is reachable",
            SmokeError::AuthError { .. } => {
                "Check the phone/password for this role (TAJLINE_<ROLE>_PHONE / TAJLINE_<ROLE>_PASSWORD)"
            }
            SmokeError::ConfigError { .. }
            | SmokeError::ConfigValidationError { .. }
            | SmokeError::InvalidConfigValueError { .. }
            | SmokeError::MissingConfigError { .. } => "Fix the suite TOML or CLI flags and rerun",
            SmokeError::IoError(_) | SmokeError::ZipError(_) | SmokeError::CsvError(_) => {
                "Check that --output-path is writable"
            }
            SmokeError::SerializationError(_) | SmokeError::UnexpectedResponse { .. } => {
                "The API contract may have changed; rerun with --verbose to see the raw body"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SmokeError>;
