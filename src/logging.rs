//! Log sink setup.
//!
//! Logs go to stderr by default, or are appended to `--log-file`.  The filter
//! comes from `--log-level`, then `RUST_LOG`, then `info`.

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, Layer, fmt, fmt::writer::BoxMakeWriter, prelude::*};

use crate::cli::LogFormat;

const DEFAULT_FILTER: &str = "info";

/// Where the process log ended up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSink {
    pub file: Option<PathBuf>,
}

impl LogSink {
    pub const fn has_log_file(&self) -> bool {
        self.file.is_some()
    }
}

/// Build the level filter from an explicit directive or the environment.
pub fn filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level {directive:?}")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install the global subscriber.  Call once, before anything logs.
pub fn init(level: Option<&str>, file: Option<&Path>, format: LogFormat) -> Result<LogSink> {
    let filter = filter(level)?;

    let writer = match file {
        Some(path) => {
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(f))
        },
        None => BoxMakeWriter::new(std::io::stderr),
    };

    // Use Layer::boxed() to unify the types of the two formats.
    let fmt_layer = match format {
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_ansi(file.is_none())
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("installing the log subscriber")?;

    Ok(LogSink {
        file: file.map(Path::to_path_buf),
    })
}
