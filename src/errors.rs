use thiserror::Error;

#[derive(Debug, Error)]
pub enum MattermostError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Mattermost API returned HTTP {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Failed to parse Mattermost response: {0}")]
    ParseError(String),

    #[error("Request to {0} is outside the permitted network domain")]
    DomainNotAllowed(String),

    #[error("Unknown formula: {0}")]
    UnknownFormula(String),
}

impl MattermostError {
    pub(crate) fn invalid_parameter(name: &str, reason: &str) -> Self {
        MattermostError::InvalidParameter {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for MattermostError {
    fn from(error: reqwest::Error) -> Self {
        MattermostError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for MattermostError {
    fn from(error: serde_json::Error) -> Self {
        MattermostError::ParseError(error.to_string())
    }
}

impl From<url::ParseError> for MattermostError {
    fn from(error: url::ParseError) -> Self {
        MattermostError::ConfigError(error.to_string())
    }
}

/// Reject an empty (or whitespace-only) required string argument.
///
/// # Errors
///
/// Returns `InvalidParameter` naming the offending parameter.
pub fn require_non_empty<'a>(name: &str, value: &'a str) -> Result<&'a str, MattermostError> {
    if value.trim().is_empty() {
        return Err(MattermostError::invalid_parameter(name, "must not be empty"));
    }
    Ok(value)
}
