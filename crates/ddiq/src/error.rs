//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use ddiq_config::ConfigError;
use ddiq_core::{CoreError, GatewayError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

/// ` after 300ms`, or nothing when the wait is not known.
fn waited(after: &Duration) -> String {
    if after.is_zero() {
        String::new()
    } else {
        format!(" after {after:?}")
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("InfoBlox did not answer the {operation} lookup")]
    #[diagnostic(
        code(ddiq::unreachable),
        help(
            "Check that the Grid Master is reachable from this host.\n\
             Self-signed certificate? Use --ca-bundle <PEM> or --insecure (-k)."
        )
    )]
    Unreachable {
        operation: String,
        #[source]
        source: GatewayError,
    },

    #[error("Lookup {operation} timed out{}", waited(.after))]
    #[diagnostic(
        code(ddiq::timeout),
        help("Increase the timeout with --timeout or check Grid Master load.")
    )]
    Timeout { operation: String, after: Duration },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ddiq::auth_failed),
        help(
            "Verify the WAPI username and password.\n\
             Run: ddiq config set-password --profile <name>"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(ddiq::no_credentials),
        help(
            "Store one with: ddiq config set-password --profile {profile}\n\
             Or set DDIQ_PASSWORD / INFOBLOX_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Lookup results ───────────────────────────────────────────────
    #[error("Invalid identifier '{input}': {reason}")]
    #[diagnostic(
        code(ddiq::invalid_identifier),
        help("Networks use CIDR notation (192.168.1.0/24); addresses are bare IPs (192.168.1.50).")
    )]
    InvalidIdentifier { input: String, reason: String },

    #[error("{entity} '{identifier}' not found")]
    #[diagnostic(
        code(ddiq::not_found),
        help("Check the identifier and the network view this grid uses.")
    )]
    NotFound { entity: String, identifier: String },

    #[error("{count} {entity} objects match '{identifier}'")]
    #[diagnostic(
        code(ddiq::ambiguous),
        help("The same CIDR exists in several network views:\n{references}")
    )]
    Ambiguous {
        entity: String,
        identifier: String,
        count: usize,
        references: String,
    },

    #[error("InfoBlox rejected the {operation} lookup: {message}")]
    #[diagnostic(code(ddiq::rejected), help("Check --wapi-version against the grid's WAPI."))]
    Rejected { operation: String, message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Lookup aborted: {call} was declined")]
    #[diagnostic(
        code(ddiq::declined),
        help("The first lookup of a report cannot be skipped. Approve it, or drop --confirm.")
    )]
    Declined { call: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ddiq::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ddiq::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ddiq config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Profile '{profile}' is missing: {fields}")]
    #[diagnostic(
        code(ddiq::incomplete_profile),
        help("Complete it with: ddiq config init, or pass --host / --username.")
    )]
    IncompleteProfile { profile: String, fields: String },

    #[error("No InfoBlox host configured")]
    #[diagnostic(
        code(ddiq::no_config),
        help(
            "Create a profile with: ddiq config init\n\
             Expected at: {path}\n\
             Or pass --host (INFOBLOX_HOST) and --username (INFOBLOX_USER)."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(ddiq::config))]
    Config(Box<figment::Error>),

    #[error("Could not write configuration: {message}")]
    #[diagnostic(code(ddiq::config_write))]
    ConfigWrite { message: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(ddiq::keyring),
        help("No usable keyring on this system? Set password_env in the profile instead.")
    )]
    Keyring { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(ddiq::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(ddiq::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Ambiguous { .. } => exit_code::CONFLICT,
            Self::InvalidIdentifier { .. } | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidIdentifier { input, reason } => {
                CliError::InvalidIdentifier { input, reason }
            }

            CoreError::NotFound { entity, identifier } => {
                CliError::NotFound { entity, identifier }
            }

            CoreError::AmbiguousResult {
                entity,
                identifier,
                count,
                references,
            } => CliError::Ambiguous {
                entity,
                identifier,
                count,
                references: references
                    .iter()
                    .map(|r| format!("  {r}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            CoreError::GatewayUnavailable { operation, source } => match source {
                GatewayError::Authentication { message } => CliError::AuthFailed { message },
                GatewayError::Timeout { after } => CliError::Timeout { operation, after },
                GatewayError::Declined { call } => CliError::Declined { call },
                GatewayError::Rejected { message } => CliError::Rejected { operation, message },
                source @ GatewayError::Unavailable { .. } => {
                    CliError::Unreachable { operation, source }
                }
            },

            CoreError::Config { message } => CliError::Validation {
                field: "connection".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Incomplete { profile, fields } => CliError::IncompleteProfile {
                profile,
                fields: fields.join(", "),
            },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(run `ddiq config show` to list them)".into(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::ConfigWrite {
                message: e.to_string(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable(source: GatewayError) -> CliError {
        CoreError::GatewayUnavailable {
            operation: "lookup_network".into(),
            source,
        }
        .into()
    }

    #[test]
    fn gateway_failures_pick_distinct_exit_codes() {
        let auth = unavailable(GatewayError::Authentication {
            message: "HTTP 401".into(),
        });
        let timeout = unavailable(GatewayError::Timeout {
            after: Duration::from_secs(30),
        });
        let down = unavailable(GatewayError::Unavailable {
            message: "connection refused".into(),
        });

        assert_eq!(auth.exit_code(), exit_code::AUTH);
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
        assert_eq!(down.exit_code(), exit_code::CONNECTION);
        assert_eq!(
            timeout.to_string(),
            "Lookup lookup_network timed out after 30s"
        );
    }

    #[test]
    fn timeout_message_keeps_milliseconds_and_drops_unknown_wait() {
        let short = unavailable(GatewayError::Timeout {
            after: Duration::from_millis(300),
        });
        assert_eq!(short.to_string(), "Lookup lookup_network timed out after 300ms");

        let unknown = unavailable(GatewayError::Timeout {
            after: Duration::ZERO,
        });
        assert_eq!(unknown.to_string(), "Lookup lookup_network timed out");
    }

    #[test]
    fn lookup_outcomes_map_to_usage_not_found_and_conflict() {
        let invalid: CliError = CoreError::InvalidIdentifier {
            input: "10.0.0.0/33".into(),
            reason: "prefix length 33 exceeds 32".into(),
        }
        .into();
        let missing: CliError = CoreError::NotFound {
            entity: "IP address".into(),
            identifier: "192.168.1.50".into(),
        }
        .into();
        let ambiguous: CliError = CoreError::AmbiguousResult {
            entity: "network".into(),
            identifier: "10.0.0.0/24".into(),
            count: 2,
            references: vec![
                "network/a:10.0.0.0/24/default".into(),
                "network/b:10.0.0.0/24/lab".into(),
            ],
        }
        .into();

        assert_eq!(invalid.exit_code(), exit_code::USAGE);
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(ambiguous.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn incomplete_profile_lists_every_field() {
        let err: CliError = ConfigError::Incomplete {
            profile: "lab".into(),
            fields: vec!["host".into(), "password".into()],
        }
        .into();
        assert_eq!(err.to_string(), "Profile 'lab' is missing: host, password");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
