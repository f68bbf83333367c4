//! Opt-in debug log file.
//!
//! Enabled by `AWS_SIGNER_NOTATION_PLUGIN_DEBUG=true`. Records go to
//! `<user config dir>/notation-aws-signer/plugin.log`, appended per run.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub const DEBUG_ENV: &str = "AWS_SIGNER_NOTATION_PLUGIN_DEBUG";

const LOG_DIR: &str = "notation-aws-signer";
const LOG_FILE: &str = "plugin.log";
const SEPARATOR: &str =
    "-----------------------------------------------------------------------------------------";

pub fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV).is_ok_and(|v| v == "true")
}

pub fn log_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("user config directory is unknown")?;
    Ok(config_dir.join(LOG_DIR).join(LOG_FILE))
}

/// Open (creating if needed) the log file and write the run header.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    writeln!(file, "{}", SEPARATOR)?;
    writeln!(
        file,
        "Logs from execution of AWS signer plugin version: {}",
        aws_signer_notation::VERSION
    )?;
    Ok(file)
}

/// Install a debug-level subscriber writing to `file`.
pub fn init(file: File) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))
}
