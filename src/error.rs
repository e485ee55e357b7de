use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Please set your LeetCode username in config.ini")]
    MissingUsername,

    #[error("Failed to parse config: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Failed to parse config: {0}")]
    IniParseError(String),

    #[error("Invalid value for {key} in config: {value}")]
    InvalidConfigValue { key: String, value: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP Error: {}", .0.as_u16())]
    HttpStatus(reqwest::StatusCode),

    #[error("Error fetching badges: {0}")]
    GraphQlError(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Failed to parse API response: {0}")]
    ResponseParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No badges found or error occurred.")]
    NoBadges,
}
