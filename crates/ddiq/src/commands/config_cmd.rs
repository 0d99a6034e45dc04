//! Config subcommand handlers.

use std::fmt::Write;
use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use super::util::prompt_err;
use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with every stored secret masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

/// TOML-like view of the config. Secrets are masked by the caller.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "page_size = {}", cfg.defaults.page_size);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "host = \"{}\"", p.host);
        let _ = writeln!(out, "wapi_version = \"{}\"", p.wapi_version());
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if let Some(ref pw) = p.password {
            let _ = writeln!(out, "password = \"{pw}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(verify) = p.verify_tls {
            let _ = writeln!(out, "verify_tls = {verify}");
        }
        if let Some(ref ca) = p.ca_bundle {
            let _ = writeln!(out, "ca_bundle = \"{}\"", ca.display());
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(page_size) = p.page_size {
            let _ = writeln!(out, "page_size = {page_size}");
        }
    }

    out
}

fn available(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Where the password for a new profile ends up.
enum PasswordStorage {
    Keyring(String),
    Plaintext(String),
    Env(String),
}

fn prompt_password_storage() -> Result<PasswordStorage, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Read from an environment variable at run time",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where should the password live?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 1 {
        let var: String = Input::new()
            .with_prompt("Environment variable")
            .default(ddiq_config::PASSWORD_ENV.into())
            .interact_text()
            .map_err(prompt_err)?;
        return Ok(PasswordStorage::Env(var));
    }

    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(if selection == 0 {
        PasswordStorage::Keyring(password)
    } else {
        PasswordStorage::Plaintext(password)
    })
}

// ── Handlers ────────────────────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    eprintln!("ddiq configuration wizard");
    eprintln!("   Config path: {}\n", config::config_path().display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(config::active_profile_name(global, &cfg))
        .interact_text()
        .map_err(prompt_err)?;

    let host: String = Input::new()
        .with_prompt("Grid Master host")
        .with_initial_text(global.host.clone().unwrap_or_default())
        .interact_text()
        .map_err(prompt_err)?;

    let wapi_version: String = Input::new()
        .with_prompt("WAPI version")
        .default(Profile::default().wapi_version().to_owned())
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .with_initial_text(global.username.clone().unwrap_or_default())
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        host,
        wapi_version: Some(wapi_version),
        username: Some(username),
        ..Profile::default()
    };

    match prompt_password_storage()? {
        PasswordStorage::Keyring(password) => {
            config::store_password(&profile_name, &password)?;
            eprintln!("   ✓ password stored in system keyring");
        }
        PasswordStorage::Plaintext(password) => profile.password = Some(password),
        PasswordStorage::Env(var) => profile.password_env = Some(var),
    }

    let verify = Confirm::new()
        .with_prompt("Verify the Grid Master's TLS certificate?")
        .default(true)
        .interact()
        .map_err(prompt_err)?;
    if verify {
        let ca: String = Input::new()
            .with_prompt("CA bundle (PEM, empty for system roots)")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_err)?;
        if !ca.trim().is_empty() {
            profile.ca_bundle = Some(PathBuf::from(ca.trim()));
        }
    } else {
        profile.verify_tls = Some(false);
    }

    let make_default = cfg.profiles.is_empty()
        || Confirm::new()
            .with_prompt(format!("Make '{profile_name}' the default profile?"))
            .default(false)
            .interact()
            .map_err(prompt_err)?;
    if make_default {
        cfg.default_profile = Some(profile_name.clone());
    }

    cfg.profiles.insert(profile_name.clone(), profile);
    let path = config::save_config(&cfg)?;
    eprintln!("\n   ✓ profile '{profile_name}' saved to {}", path.display());
    Ok(())
}

fn set_password(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    if !cfg.profiles.contains_key(&profile_name) {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available(&cfg),
        });
    }

    let password =
        rpassword::prompt_password(format!("Password for '{profile_name}': ")).map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    config::store_password(&profile_name, &password)?;
    eprintln!("   ✓ password for '{profile_name}' stored in system keyring");
    Ok(())
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => set_password(global),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_never_prints_secrets() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                host: "gm.lab.example.com".into(),
                username: Some("admin".into()),
                password: Some("hunter2".into()),
                password_env: Some("LAB_PW".into()),
                ..Profile::default()
            },
        );

        let text = format_config(&redacted(&cfg));

        assert!(!text.contains("hunter2"), "{text}");
        assert!(text.contains("password = \"****\""));
        assert!(text.contains("password_env = \"LAB_PW\""));
        assert!(text.contains("[profiles.lab]\nhost = \"gm.lab.example.com\""));
    }
}
