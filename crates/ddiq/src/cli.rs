//! Clap derive structures for the `ddiq` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ddiq -- network and IP address lookups against InfoBlox
#[derive(Debug, Parser)]
#[command(
    name = "ddiq",
    version,
    about = "Look up networks and IP addresses in InfoBlox",
    long_about = "Queries an InfoBlox grid through WAPI and merges networks, containers,\n\
        DHCP leases and reservations, ranges and DNS records into one report.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Connection profile to use
    #[arg(long, short = 'p', env = "DDIQ_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Grid Master host or URL (overrides profile)
    #[arg(long, env = "INFOBLOX_HOST", global = true)]
    pub host: Option<String>,

    /// WAPI username (overrides profile)
    #[arg(long, short = 'u', env = "INFOBLOX_USER", global = true)]
    pub username: Option<String>,

    /// WAPI password
    #[arg(long, env = "INFOBLOX_PASSWORD", global = true, hide_env_values = true, hide = true)]
    pub password: Option<String>,

    /// WAPI version, e.g. v2.13.1 (overrides profile)
    #[arg(long, env = "WAPI_VERSION", global = true)]
    pub wapi_version: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DDIQ_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid or self-signed TLS certificates
    #[arg(long, short = 'k', env = "DDIQ_INSECURE", global = true)]
    pub insecure: bool,

    /// Verify TLS certificates (`false` is the same as --insecure)
    #[arg(
        long,
        env = "INFOBLOX_VERIFY_SSL",
        global = true,
        hide = true,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub verify_ssl: Option<bool>,

    /// PEM bundle of extra CA certificates to trust
    #[arg(long, env = "INFOBLOX_CA_BUNDLE", global = true)]
    pub ca_bundle: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "DDIQ_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Records requested per WAPI page
    #[arg(long, env = "DDIQ_PAGE_SIZE", global = true)]
    pub page_size: Option<u32>,

    /// Preview and approve every WAPI call before it is sent
    #[arg(long, global = true)]
    pub confirm: bool,

    /// Also write logs to this file
    #[arg(long, env = "DDIQ_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

impl GlobalOpts {
    /// `--insecure`, or verification explicitly switched off.
    pub fn skip_tls_verify(&self) -> bool {
        self.insecure || self.verify_ssl == Some(false)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Bare identifier only (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show everything known about a network
    #[command(alias = "net", alias = "n")]
    Network(NetworkArgs),

    /// Show everything known about an IP address
    #[command(alias = "addr")]
    Ip(IpArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Lookups ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworkArgs {
    /// Network in CIDR notation, e.g. 192.168.1.0/24
    pub cidr: String,
}

#[derive(Debug, Args)]
pub struct IpArgs {
    /// IPv4 or IPv6 address, e.g. 192.168.1.50
    pub address: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Display the configuration with secrets masked
    Show,

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
