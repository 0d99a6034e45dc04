//! Output formatting: report text, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Structured formats
//! use serde; plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use serde::Serialize;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;
use crate::render::Styles;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

pub fn styles(mode: ColorMode) -> Styles {
    let mut styles = Styles::default();
    if should_color(mode) {
        styles.colorize();
    }
    styles
}

/// Render a single item in the chosen format.
///
/// `table` uses `text_fn`, a pre-formatted human view; `plain` uses `id_fn`.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    data: &T,
    text_fn: impl FnOnce(&T) -> String,
    id_fn: impl FnOnce(&T) -> String,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table => text_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", output.trim_end_matches('\n'));
}
