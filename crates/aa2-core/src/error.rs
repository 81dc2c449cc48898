use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("AuthError: {0}")]
    Auth(#[from] AuthError),
    #[error("InputError: {0}")]
    Input(#[from] InputError),
    #[error("EmptyResultError: {0}")]
    EmptyResult(#[from] EmptyResultError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Profile '{profile}' is not configured")]
    UnknownProfile {
        profile: String,
        available_profiles: Vec<String>,
    },
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {endpoint} timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("{endpoint} returned {status}: {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("{endpoint} rejected the access token ({status}): {server_message}")]
    Unauthorized {
        status: u16,
        endpoint: String,
        server_message: String,
    },
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token exchange failed: {message}")]
    TokenExchange { endpoint: String, message: String },
    #[error("No global company id in discovery response: {message}")]
    CompanyNotFound { message: String },
    #[error("Failed to sign assertion: {message}")]
    Signing { message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Profile '{profile}' has no value for '{field}'")]
    MissingField { field: String, profile: String },
    #[error("Bad value '{value}' for '{field}': {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    #[error("Private key at {path} could not be read: {source}")]
    PrivateKeyUnreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("Private key at {path} is not a valid RSA PEM key: {reason}")]
    PrivateKeyInvalid { path: String, reason: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum InputError {
    #[error("Please provide at least one dimension")]
    NoDimensions,
    #[error("Please provide at least one metric")]
    NoMetrics,
    #[error("More than 2 dimensions is not supported (got {count})")]
    TooManyDimensions { count: usize },
    #[error("More than 1 segment is not supported (got {count})")]
    TooManySegments { count: usize },
    #[error("Metric ids must be provided")]
    EmptyMetricIds,
    #[error("Search term for {resource} must be a string (use \"\" to list everything)")]
    SearchTermRequired { resource: String },
    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: String, end: String },
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

#[derive(Error, Debug, PartialEq)]
#[error(
    "API returned no results for {dimension} under item {item_id}. If there is a segment filter try removing it"
)]
pub struct EmptyResultError {
    pub dimension: String,
    pub item_id: String,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorSeverity::Critical => "🚨",
            ErrorSeverity::High => "❌",
            ErrorSeverity::Medium => "⚠️",
            ErrorSeverity::Low => "ℹ️",
        }
    }
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Api(api_error) => match api_error {
                ApiError::Unauthorized { .. } => ErrorSeverity::High,
                ApiError::Timeout { .. } => ErrorSeverity::Medium,
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Auth(AuthError::Signing { .. }) => ErrorSeverity::Critical,
            AppError::Auth(_) => ErrorSeverity::High,
            AppError::Input(_) => ErrorSeverity::Low,
            AppError::EmptyResult(_) => ErrorSeverity::Medium,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Display(_) => ErrorSeverity::Low,
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Config(ConfigError::MissingField { field, profile }) => Some(format!(
                "'aa2 config set --profile {} --{} <value>' to set it",
                profile,
                field.replace('_', "-")
            )),
            AppError::Config(ConfigError::PrivateKeyUnreadable { .. }) => {
                Some("Check private_key_path points to the key of your service account".to_string())
            }
            AppError::Auth(AuthError::TokenExchange { .. }) => Some(
                "Check api_key, client_secret and that the key matches the uploaded certificate"
                    .to_string(),
            ),
            AppError::Auth(AuthError::CompanyNotFound { .. }) => Some(
                "The technical account has no Analytics company; check product profile access"
                    .to_string(),
            ),
            AppError::Api(ApiError::Timeout { .. }) => {
                Some("Check your internet connection and try again".to_string())
            }
            AppError::EmptyResult(_) => {
                Some("Remove the segment filter or widen the date range".to_string())
            }
            AppError::Cli(CliError::UnknownProfile {
                available_profiles, ..
            }) if !available_profiles.is_empty() => Some(format!(
                "Available profiles: {}",
                available_profiles.join(", ")
            )),
            _ => None,
        }
    }
}
