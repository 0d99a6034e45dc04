// ── Core error types ──
//
// Failures that abort a lookup. Anything that only costs one field of a
// report is carried as a `Warning` on the report instead; see `report`.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid identifier '{input}': {reason}")]
    InvalidIdentifier { input: String, reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Ambiguous result: {count} {entity} records match {identifier}")]
    AmbiguousResult {
        entity: String,
        identifier: String,
        count: usize,
        /// Object references of every match, so the caller can tell them apart.
        references: Vec<String>,
    },

    // ── Gateway errors ───────────────────────────────────────────────
    /// The mandatory first lookup of a workflow failed or timed out.
    #[error("Data source unavailable during {operation}: {source}")]
    GatewayUnavailable {
        operation: String,
        #[source]
        source: GatewayError,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The underlying gateway failure, if this error wraps one.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            Self::GatewayUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ddiq_api::Error> for CoreError {
    fn from(err: ddiq_api::Error) -> Self {
        match err {
            ddiq_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid WAPI URL: {e}"),
            },
            ddiq_api::Error::Tls(message) => CoreError::Config {
                message: format!("TLS setup failed: {message}"),
            },
            other => CoreError::GatewayUnavailable {
                operation: "connect".into(),
                source: GatewayError::from(other),
            },
        }
    }
}
