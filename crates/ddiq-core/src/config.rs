// ── Runtime connection configuration ──
//
// Describes how to reach a WAPI grid master. Carries credentials and
// connection tuning but never touches disk; the CLI builds a
// `GatewayConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed grid masters).
    DangerAcceptInvalid,
}

impl From<TlsVerification> for ddiq_api::TlsMode {
    fn from(tls: TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Configuration for talking to a single grid master.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// WAPI base URL, e.g. `https://gm.example.com/wapi/v2.13.1/`.
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// HTTP timeout for a single request.
    pub timeout: Duration,
    /// `_max_results` per page when folding paged searches.
    pub page_size: u32,
}

impl GatewayConfig {
    pub fn new(base_url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_size: ddiq_api::wapi::client::DEFAULT_PAGE_SIZE,
        }
    }
}
