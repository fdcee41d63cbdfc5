//! Error types for csv-charts

use thiserror::Error;

/// Result type alias for csv-charts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for csv-charts
#[derive(Error, Debug)]
pub enum Error {
    /// The data source could not be fetched (blank URL, transport failure or
    /// a non-success status).
    #[error("Data source unavailable: {url}{}: {reason}", .status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
    SourceUnavailable {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// One or more required configuration keys are missing or blank.
    #[error("Invalid configuration for {kind} chart: missing {}", .missing.join(", "))]
    Configuration { kind: String, missing: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse tabular data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl Error {
    /// Build a `SourceUnavailable` error
    pub fn source_unavailable(url: &str, status: Option<u16>, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            url: url.to_string(),
            status,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_message_includes_status() {
        let err = Error::source_unavailable("https://example.com/a.csv", Some(404), "Not Found");
        assert_eq!(
            err.to_string(),
            "Data source unavailable: https://example.com/a.csv (status 404): Not Found"
        );
    }

    #[test]
    fn test_configuration_message_lists_every_key() {
        let err = Error::Configuration {
            kind: "bar".to_string(),
            missing: vec!["labelCol".to_string(), "yCol".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration for bar chart: missing labelCol, yCol"
        );
    }
}
