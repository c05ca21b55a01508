//! Error types for CloudWatch-to-Timber.
//!
//! Precondition failures during packaging (no functions, no API key) are not
//! errors; they are reported through the host and surface as
//! [`crate::ForwardingOutcome::Skipped`]. The variants here cover plugin
//! construction and document handling only.

use thiserror::Error;

/// Errors raised by the plugin and the document host.
#[derive(Debug, Error)]
pub enum TimberError {
    /// The host framework is older than the plugin supports.
    #[error("serverless-plugin-timber requires serverless {required} or higher! (found {found})")]
    IncompatibleFramework { found: String, required: String },

    /// The host framework reported a version string that could not be read.
    #[error("Invalid framework version: {0}")]
    InvalidFrameworkVersion(String),

    /// The service document does not have the expected shape.
    #[error("Invalid service configuration: {0}")]
    InvalidServiceConfig(String),

    /// JSON (de)serialization of the service document failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TimberError {
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        Self::InvalidFrameworkVersion(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidServiceConfig(msg.into())
    }
}

pub type TimberResult<T> = Result<T, TimberError>;
