//! Tracing setup. The TUI owns the terminal, so interactive sessions log to a
//! file; one-shot commands log to stderr.
//!
//!   RUST_LOG=library_desk=debug library-desk   # fine-grained control
//!   library-desk --debug catalogue             # debug level, with targets

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Default to `debug` instead of `info` when `RUST_LOG` is unset.
    pub debug: bool,
}

fn filter(options: LogOptions) -> EnvFilter {
    let fallback = if options.debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

pub fn init_stderr(options: LogOptions) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(options))
        .with_target(options.debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Append logs to `path`, creating the file and its directory if needed.
pub fn init_file(options: LogOptions, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create log directory")?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(options))
        .with_target(options.debug)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow!(err))
}
