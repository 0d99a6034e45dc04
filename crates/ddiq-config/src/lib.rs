//! Shared configuration for ddiq.
//!
//! TOML profiles, `DDIQ_*` environment overrides, credential resolution
//! (env + keyring + plaintext) and translation to
//! `ddiq_core::GatewayConfig`. The CLI layers its flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ddiq_api::WapiClient;
use ddiq_api::wapi::client::{DEFAULT_PAGE_SIZE, DEFAULT_WAPI_VERSION};
use ddiq_core::{GatewayConfig, TlsVerification};

/// Keyring service name; entries are keyed `<profile>/password`.
pub const KEYRING_SERVICE: &str = "ddiq";

/// Password fallback checked after a profile's own `password_env`.
pub const PASSWORD_ENV: &str = "DDIQ_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' is missing required settings: {}", fields.join(", "))]
    Incomplete { profile: String, fields: Vec<String> },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named grid master profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit choice, else `default_profile`.
    pub fn active_profile_name<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested.or(self.default_profile.as_deref())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Seconds, for both the HTTP client and each lookup call.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// A named grid master profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Profile {
    /// Grid master host or URL (e.g. "gm.example.com").
    #[serde(default)]
    pub host: String,

    /// WAPI schema version, e.g. "v2.13.1".
    pub wapi_version: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext; prefer the keyring or `password_env`).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Verify the grid master's certificate (default true).
    pub verify_tls: Option<bool>,

    /// PEM bundle of extra CA certificates.
    pub ca_bundle: Option<PathBuf>,

    pub timeout: Option<u64>,

    pub page_size: Option<u32>,
}

impl Profile {
    pub fn wapi_version(&self) -> &str {
        self.wapi_version.as_deref().unwrap_or(DEFAULT_WAPI_VERSION)
    }

    /// TLS strategy; `verify_tls = false` wins over a CA bundle.
    pub fn tls(&self, defaults: &Defaults) -> TlsVerification {
        let verify = self.verify_tls.unwrap_or(!defaults.insecure);
        if !verify {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca) = self.ca_bundle {
            TlsVerification::CustomCa(ca.clone())
        } else {
            TlsVerification::SystemDefaults
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ddiq", "ddiq").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ddiq");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) merged with `DDIQ_*` variables.
///
/// Nested keys use a double underscore:
/// `DDIQ_PROFILES__LAB__HOST=gm.lab.example.com`, `DDIQ_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DDIQ_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_password(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))?;
    entry.set_password(password)?;
    Ok(())
}

/// Resolve a profile's password from the credential chain.
///
/// Order: the variable named by `password_env`, then `DDIQ_PASSWORD`, then
/// the keyring, then plaintext in the profile.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(profile, profile_name, keyring_password)
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(pw) = profile
        .password_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Ok(SecretString::from(pw));
    }

    // 2. Tool-wide env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Some(pw) = keyring(profile_name) {
        return Ok(SecretString::from(pw));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `GatewayConfig` from a profile, without CLI flag overrides.
///
/// Every missing setting is reported at once.
pub fn profile_to_gateway_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<GatewayConfig, ConfigError> {
    build_gateway_config(profile, profile_name, defaults, resolve_password(profile, profile_name).ok())
}

/// Build a `GatewayConfig` from a profile and an already resolved password.
pub fn build_gateway_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    password: Option<SecretString>,
) -> Result<GatewayConfig, ConfigError> {
    let mut missing = Vec::new();
    if profile.host.trim().is_empty() {
        missing.push("host".to_owned());
    }
    let username = profile.username.clone().filter(|u| !u.is_empty());
    if username.is_none() {
        missing.push("username".to_owned());
    }
    if password.is_none() {
        missing.push("password".to_owned());
    }
    let (username, password) = match (username, password) {
        (Some(username), Some(password)) if missing.is_empty() => (username, password),
        _ => {
            return Err(ConfigError::Incomplete {
                profile: profile_name.into(),
                fields: missing,
            });
        }
    };

    let base_url = WapiClient::base_url_for(&profile.host, profile.wapi_version()).map_err(|e| {
        ConfigError::Validation {
            field: "host".into(),
            reason: format!("{}: {e}", profile.host),
        }
    })?;

    Ok(GatewayConfig {
        base_url,
        username,
        password,
        tls: profile.tls(defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        page_size: profile.page_size.unwrap_or(defaults.page_size),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn lab_profile() -> Profile {
        Profile {
            host: "gm.lab.example.com".into(),
            username: Some("admin".into()),
            password: Some("plaintext".into()),
            ..Profile::default()
        }
    }

    fn to_figment(err: ConfigError) -> figment::Error {
        figment::Error::from(err.to_string())
    }

    #[test]
    fn profile_values_and_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "lab"

                [defaults]
                timeout = 45

                [profiles.lab]
                host = "gm.lab.example.com"
                username = "admin"
                verify_tls = false
                "#,
            )?;
            jail.set_env("DDIQ_PROFILES__LAB__HOST", "gm2.lab.example.com");
            jail.set_env("DDIQ_DEFAULTS__PAGE_SIZE", "250");

            let cfg = load_config_from(Path::new("config.toml")).map_err(to_figment)?;
            let lab = cfg.profile("lab").map_err(to_figment)?;

            assert_eq!(cfg.active_profile_name(None), Some("lab"));
            assert_eq!(lab.host, "gm2.lab.example.com");
            assert_eq!(lab.username.as_deref(), Some("admin"));
            assert_eq!(cfg.defaults.timeout, 45);
            assert_eq!(cfg.defaults.page_size, 250);
            assert_eq!(cfg.defaults.output, "table");
            assert_eq!(lab.tls(&cfg.defaults), TlsVerification::DangerAcceptInvalid);
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults, Defaults::default());
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), lab_profile());

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.profile("lab").unwrap(), &lab_profile());
    }

    #[test]
    fn incomplete_profile_names_every_missing_field() {
        let err = build_gateway_config(&Profile::default(), "empty", &Defaults::default(), None)
            .unwrap_err();
        match err {
            ConfigError::Incomplete { profile, fields } => {
                assert_eq!(profile, "empty");
                assert_eq!(fields, vec!["host", "username", "password"]);
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn gateway_config_from_profile() {
        let profile = Profile {
            wapi_version: Some("v2.12".into()),
            ca_bundle: Some(PathBuf::from("/etc/ssl/lab-ca.pem")),
            timeout: Some(10),
            ..lab_profile()
        };
        let password = Some(SecretString::from("s3cret".to_owned()));

        let config = build_gateway_config(&profile, "lab", &Defaults::default(), password).unwrap();

        assert_eq!(config.base_url.as_str(), "https://gm.lab.example.com/wapi/v2.12/");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password.expose_secret(), "s3cret");
        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/lab-ca.pem"))
        );
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn password_chain_order() {
        Jail::expect_with(|jail| {
            let profile = Profile {
                password_env: Some("LAB_GRID_PASSWORD".into()),
                ..lab_profile()
            };

            // Plaintext is the last resort.
            let pw = resolve_password_with(&profile, "lab", |_| None).map_err(to_figment)?;
            assert_eq!(pw.expose_secret(), "plaintext");

            // Keyring beats plaintext.
            let pw = resolve_password_with(&profile, "lab", |name| {
                assert_eq!(name, "lab");
                Some("from-keyring".into())
            })
            .map_err(to_figment)?;
            assert_eq!(pw.expose_secret(), "from-keyring");

            // DDIQ_PASSWORD beats the keyring.
            jail.set_env(PASSWORD_ENV, "from-ddiq-env");
            let pw = resolve_password_with(&profile, "lab", |_| Some("from-keyring".into()))
                .map_err(to_figment)?;
            assert_eq!(pw.expose_secret(), "from-ddiq-env");

            // The profile's own variable beats everything.
            jail.set_env("LAB_GRID_PASSWORD", "from-profile-env");
            let pw = resolve_password_with(&profile, "lab", |_| None).map_err(to_figment)?;
            assert_eq!(pw.expose_secret(), "from-profile-env");
            Ok(())
        });
    }

    #[test]
    fn no_password_anywhere_is_an_error() {
        Jail::expect_with(|_| {
            let profile = Profile {
                password: None,
                ..lab_profile()
            };
            let err = resolve_password_with(&profile, "lab", |_| None).unwrap_err();
            assert!(matches!(err, ConfigError::NoCredentials { .. }));
            Ok(())
        });
    }
}
