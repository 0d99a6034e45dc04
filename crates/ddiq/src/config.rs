//! CLI configuration: the shared `ddiq-config` crate plus flag overrides.
//!
//! Flags and their environment variables always win over the profile.

use secrecy::SecretString;
use tracing::warn;

pub use ddiq_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
    store_password,
};
use ddiq_core::{GatewayConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// `--profile`, else the config's default, else `"default"`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
        .unwrap_or("default")
        .to_owned()
}

/// Build the gateway settings for a lookup from the config file, the active
/// profile and the global flags.
pub fn resolve_gateway_config(global: &GlobalOpts) -> Result<GatewayConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let config = match cfg.profiles.get(&profile_name) {
        Some(profile) => resolve_profile(profile, &profile_name, &cfg.defaults, global)?,
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            // No profile: everything has to come from flags / env.
            if global.host.is_none() {
                return Err(CliError::NoConfig {
                    path: config_path().display().to_string(),
                });
            }
            let password = global
                .password
                .clone()
                .or_else(|| std::env::var(ddiq_config::PASSWORD_ENV).ok())
                .map(SecretString::from);
            let profile = overlay(&Profile::default(), global);
            ddiq_config::build_gateway_config(&profile, "(flags)", &cfg.defaults, password)?
        }
    };

    if matches!(config.tls, TlsVerification::DangerAcceptInvalid) {
        warn!(url = %config.base_url, "TLS certificate verification is disabled");
    }
    Ok(config)
}

/// Apply flag overrides to a stored profile and resolve its password.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<GatewayConfig, CliError> {
    let merged = overlay(profile, global);
    let password = match global.password {
        Some(ref pw) => Some(SecretString::from(pw.clone())),
        None => ddiq_config::resolve_password(&merged, profile_name).ok(),
    };
    Ok(ddiq_config::build_gateway_config(
        &merged,
        profile_name,
        defaults,
        password,
    )?)
}

fn overlay(profile: &Profile, global: &GlobalOpts) -> Profile {
    let mut merged = profile.clone();
    if let Some(ref host) = global.host {
        merged.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        merged.username = Some(username.clone());
    }
    if let Some(ref version) = global.wapi_version {
        merged.wapi_version = Some(version.clone());
    }
    if let Some(ref ca) = global.ca_bundle {
        merged.ca_bundle = Some(ca.clone());
    }
    if global.skip_tls_verify() {
        merged.verify_tls = Some(false);
    } else if global.verify_ssl == Some(true) {
        merged.verify_tls = Some(true);
    }
    if let Some(timeout) = global.timeout {
        merged.timeout = Some(timeout);
    }
    if let Some(page_size) = global.page_size {
        merged.page_size = Some(page_size);
    }
    merged
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["ddiq"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["ip", "10.0.0.1"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn lab() -> Profile {
        Profile {
            host: "gm.lab.example.com".into(),
            username: Some("admin".into()),
            timeout: Some(10),
            ..Profile::default()
        }
    }

    #[test]
    fn flags_override_profile_values() {
        let merged = overlay(
            &lab(),
            &global(&["--host", "gm2.example.com", "--timeout", "5", "-k"]),
        );
        assert_eq!(merged.host, "gm2.example.com");
        assert_eq!(merged.username.as_deref(), Some("admin"));
        assert_eq!(merged.timeout, Some(5));
        assert_eq!(merged.verify_tls, Some(false));
    }

    #[test]
    fn profile_values_survive_without_flags() {
        let merged = overlay(&lab(), &global(&[]));
        assert_eq!(merged, lab());
    }

    #[test]
    fn flagged_password_builds_a_gateway_config() {
        let opts = global(&["--password", "s3cret", "--wapi-version", "v2.12"]);
        let config = resolve_profile(&lab(), "lab", &Defaults::default(), &opts).unwrap();
        assert_eq!(
            config.base_url.as_str(),
            "https://gm.lab.example.com/wapi/v2.12/"
        );
        assert_eq!(config.username, "admin");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
