use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("{service} client not initialized. Please check the {env_var} API key.")]
    ClientNotConfigured {
        service: &'static str,
        env_var: &'static str,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{service} API returned status {status}: {body}")]
    ApiStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed API response: {message}")]
    MalformedResponse { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("No usable text extracted from image: {message}")]
    NoTextExtracted { message: String },

    #[error("Uploaded file is too large (max {max_mb} MB).")]
    UploadTooLarge { max_mb: usize },
}

/// Upstream error bodies shown to HTTP clients are cut to this many chars.
pub const MAX_UPSTREAM_BODY_CHARS: usize = 200;

/// Which side of the system an error belongs to. Callers branch on this
/// instead of inspecting the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    ExternalService,
    Extraction,
}

impl SolverError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SolverError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SolverError::ClientNotConfigured { .. }
            | SolverError::ConfigError { .. }
            | SolverError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SolverError::InvalidInput { .. } | SolverError::UploadTooLarge { .. } => {
                ErrorCategory::Input
            }
            SolverError::NoTextExtracted { .. } => ErrorCategory::Extraction,
            SolverError::ApiError(_)
            | SolverError::ApiStatus { .. }
            | SolverError::MalformedResponse { .. }
            | SolverError::IoError(_)
            | SolverError::SerializationError(_) => ErrorCategory::ExternalService,
        }
    }

    /// True when the caller supplied something unusable, as opposed to a
    /// failure on our side or upstream.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Input | ErrorCategory::Extraction
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SolverError::NoTextExtracted { .. } => {
                "Could not extract a valid math problem from the image. Please try a clearer image."
                    .to_string()
            }
            SolverError::ApiError(e) if e.is_timeout() => {
                "The model service took too long to respond. Please try again.".to_string()
            }
            SolverError::ApiError(e) => {
                format!("Error contacting the model service: {}", e)
            }
            SolverError::ApiStatus {
                service,
                status,
                body,
            } => format!(
                "Error contacting {}: status {}: {}",
                service,
                status,
                truncate_chars(body.trim(), MAX_UPSTREAM_BODY_CHARS)
            ),
            SolverError::MalformedResponse { message } => {
                format!("Unexpected response from {}", message)
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Set GROQ_API_KEY / TOGETHER_API_KEY or fix the configuration file"
            }
            ErrorCategory::Input => "Provide a non-empty problem text or an image",
            ErrorCategory::ExternalService => {
                "Check network connectivity and the remote service status"
            }
            ErrorCategory::Extraction => "Retry with a sharper, well-lit image of the problem",
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = SolverError::ClientNotConfigured {
            service: "Groq",
            env_var: "GROQ_API_KEY",
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(!err.is_client_fault());

        let err = SolverError::invalid_input("empty");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(err.is_client_fault());

        let err = SolverError::NoTextExtracted {
            message: "blank".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Extraction);
        assert!(err.is_client_fault());

        let err = SolverError::ApiStatus {
            service: "Groq",
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::ExternalService);
    }

    #[test]
    fn test_not_configured_message_names_the_key() {
        let err = SolverError::ClientNotConfigured {
            service: "Groq",
            env_var: "GROQ_API_KEY",
        };
        assert_eq!(
            err.user_friendly_message(),
            "Groq client not initialized. Please check the GROQ_API_KEY API key."
        );
    }

    #[test]
    fn test_extraction_message_asks_for_clearer_image() {
        let err = SolverError::NoTextExtracted {
            message: "too short".to_string(),
        };
        assert!(err.user_friendly_message().contains("clearer image"));
    }

    #[test]
    fn test_upstream_status_names_service_and_is_bounded() {
        let err = SolverError::ApiStatus {
            service: "Together AI",
            status: 502,
            body: "x".repeat(5000),
        };
        let message = err.user_friendly_message();
        assert!(message.starts_with("Error contacting Together AI: status 502: "));
        assert!(!message.contains("solver service"));
        assert!(message.ends_with("..."));
        assert!(message.len() < MAX_UPSTREAM_BODY_CHARS + 100);
    }

    #[test]
    fn test_short_upstream_body_is_kept_whole() {
        let err = SolverError::ApiStatus {
            service: "Groq",
            status: 429,
            body: "rate limit exceeded\n".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Error contacting Groq: status 429: rate limit exceeded"
        );
    }
}
