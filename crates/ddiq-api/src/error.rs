use thiserror::Error;

/// Top-level error type for the `ddiq-api` crate.
///
/// Covers every failure mode of a WAPI round trip: transport, TLS,
/// authentication, structured WAPI errors and response decoding.
/// `ddiq-core` maps these into gateway failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The grid master rejected the credentials (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── WAPI ────────────────────────────────────────────────────────
    /// Structured error body returned by WAPI:
    /// `{"Error": "...", "code": "Client.Ibap.Proto", "text": "..."}`.
    #[error("WAPI error (HTTP {status}): {message}")]
    Wapi {
        message: String,
        code: Option<String>,
        status: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Wapi { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the requested object does not exist.
    ///
    /// WAPI answers unknown references either with a plain 404 or with a
    /// 400 carrying an `AdmConDataNotFoundError` body.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Wapi { status: 404, .. } => true,
            Self::Wapi { message, .. } => message.contains("DataNotFound"),
            _ => false,
        }
    }

    /// Returns `true` if this error came from a request timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Extract the WAPI error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Wapi { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
