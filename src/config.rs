//! Configuration types, the optional defaults file, and flag assembly.
//!
//! A [`BackupConfig`] is assembled fresh for every invocation from three
//! layers, highest priority first:
//!
//! 1. command-line flags ([`BackupFlags`] and the leaf's filter flags)
//! 2. the TOML defaults file ([`FileConfig`])
//! 3. built-in defaults
//!
//! Assembly is pure: it reads values and either returns a validated config or
//! a [`ValidationError`].  It never touches the runtime or the cluster.
//!
//! # Defaults file format
//!
//! ```toml
//! [cluster]
//! pd      = ["10.0.1.1:2379", "10.0.1.2:2379"]
//! storage = "s3://backups/prod"
//!
//! [backup]
//! ratelimit         = 128     # MiB/s per node
//! concurrency       = 4
//! checksum          = true
//! compression       = "zstd"  # lz4 | snappy | zstd
//! remove_schedulers = false
//!
//! [engine]
//! program = "br-engine"
//! args    = []                # prepended to every engine invocation
//!
//! [log]
//! level = "info"
//! file  = "/var/log/br/backup.log"
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    cli::{BackupFlags, ScopeCommand},
    error::ValidationError,
};

/// Concurrency used when neither flag nor file sets one.
pub const DEFAULT_CONCURRENCY: u32 = 4;

// ─── Defaults file ────────────────────────────────────────────────────────────

/// Root of the optional TOML defaults file.  Every section may be omitted.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(default)]
    pub cluster: ClusterSection,

    #[serde(default)]
    pub backup: BackupSection,

    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub log: LogSection,
}

/// Where the cluster lives and where backups go.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClusterSection {
    pub pd: Vec<String>,
    pub storage: Option<String>,
}

/// Defaults for the persistent backup flags.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BackupSection {
    pub ratelimit: Option<u64>,
    pub concurrency: Option<u32>,
    pub checksum: Option<bool>,
    pub compression: Option<CompressionType>,
    pub remove_schedulers: Option<bool>,
}

/// The external engine executable the default runner drives.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineSection {
    pub program: Option<String>,
    /// Arguments placed before the generated backup arguments.
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

/// Location of the per-user defaults file, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|d| d.join("br-backup").join("config.toml"))
}

/// Load the defaults file.
///
/// An explicitly requested file must exist.  Without one, the per-user file
/// is read when present and an empty [`FileConfig`] is returned otherwise.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    match explicit {
        Some(path) => parse_file_config(path),
        None => match default_config_path() {
            Some(path) if path.exists() => parse_file_config(&path),
            _ => Ok(FileConfig::default()),
        },
    }
}

fn parse_file_config(path: &Path) -> Result<FileConfig> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ─── Generic settings ─────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    Lz4,
    Snappy,
    #[default]
    Zstd,
}

impl CompressionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lz4 => "lz4",
            Self::Snappy => "snappy",
            Self::Zstd => "zstd",
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings shared by every backup scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub pd: Vec<String>,
    pub storage: String,
    /// Log progress lines instead of drawing a spinner.  Set when the process
    /// writes its log to a file.
    pub log_progress: bool,
    /// MiB/s per node; `None` means unlimited.
    pub rate_limit: Option<u64>,
    pub concurrency: u32,
    pub checksum: bool,
    pub backup_ts: Option<u64>,
    pub compression: CompressionType,
    pub remove_schedulers: bool,
}

impl Config {
    fn from_flags(
        flags: &BackupFlags,
        defaults: &FileConfig,
        has_log_file: bool,
    ) -> Result<Self, ValidationError> {
        let pd: Vec<String> = if flags.pd.is_empty() {
            &defaults.cluster.pd
        } else {
            &flags.pd
        }
        .iter()
        .map(|addr| addr.trim())
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect();
        if pd.is_empty() {
            return Err(ValidationError::MissingPd);
        }

        let storage = flags
            .storage
            .as_deref()
            .or(defaults.cluster.storage.as_deref())
            .filter(|s| !s.trim().is_empty())
            .ok_or(ValidationError::MissingStorage)?
            .to_string();

        let concurrency = flags
            .concurrency
            .or(defaults.backup.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(ValidationError::ZeroConcurrency);
        }

        let rate_limit = flags.ratelimit.or(defaults.backup.ratelimit);
        if rate_limit == Some(0) {
            return Err(ValidationError::ZeroRateLimit);
        }

        Ok(Self {
            pd,
            storage,
            log_progress: has_log_file,
            rate_limit,
            concurrency,
            checksum: flags.checksum.or(defaults.backup.checksum).unwrap_or(true),
            backup_ts: flags.backup_ts,
            compression: flags
                .compression
                .or(defaults.backup.compression)
                .unwrap_or_default(),
            remove_schedulers: flags.remove_schedulers
                || defaults.backup.remove_schedulers.unwrap_or(false),
        })
    }
}

// ─── Scope ────────────────────────────────────────────────────────────────────

/// What a single invocation backs up.  The filters live in the variants, so a
/// table backup without a table name cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Full,
    Database { db: String },
    Table { db: String, table: String },
}

impl Scope {
    fn from_command(cmd: &ScopeCommand) -> Result<Self, ValidationError> {
        match cmd {
            ScopeCommand::Full => Ok(Self::Full),
            ScopeCommand::Db(filter) => Ok(Self::Database {
                db: non_empty(filter.db.as_deref(), ValidationError::MissingDatabase)?,
            }),
            ScopeCommand::Table(filter) => Ok(Self::Table {
                db: non_empty(filter.db.as_deref(), ValidationError::MissingDatabase)?,
                table: non_empty(filter.table.as_deref(), ValidationError::MissingTable)?,
            }),
        }
    }

    /// Short name of the leaf, as the engine expects it.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Database { .. } => "db",
            Self::Table { .. } => "table",
        }
    }

    pub fn database(&self) -> Option<&str> {
        match self {
            Self::Full => None,
            Self::Database { db } | Self::Table { db, .. } => Some(db),
        }
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            Self::Table { table, .. } => Some(table),
            _ => None,
        }
    }
}

fn non_empty(value: Option<&str>, missing: ValidationError) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(missing),
    }
}

// ─── Backup config ────────────────────────────────────────────────────────────

/// A validated description of one backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    pub scope: Scope,
    pub config: Config,
}

impl BackupConfig {
    /// Assemble and validate the config for one leaf invocation.
    ///
    /// `has_log_file` reports whether the process logs to a file; it decides
    /// `log_progress` and is not a flag of its own.
    pub fn from_flags(
        flags: &BackupFlags,
        scope: &ScopeCommand,
        defaults: &FileConfig,
        has_log_file: bool,
    ) -> Result<Self, ValidationError> {
        let config = Config::from_flags(flags, defaults, has_log_file)?;
        let scope = Scope::from_command(scope)?;
        Ok(Self { scope, config })
    }
}

/// Strip the query string from a storage URL.
///
/// Object-store URLs carry credentials as query parameters
/// (`s3://bucket/p?access-key=…`), which must not reach the log.
pub fn redact_storage_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{base}?<redacted>"),
        None => url.to_string(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
