//! Error plumbing shared across services and routes.

use serde::Serialize;

/// Grepable error codes attached to log lines.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

/// JSON error payload returned by HTTP routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), details: None }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
