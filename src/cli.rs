//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! passed (by reference) into the command handlers.
//!
//! # Command tree
//!
//! ```text
//! br [--config PATH] [--log-file PATH] [--log-level LEVEL] [--log-format FMT]
//! └── backup [persistent backup flags]
//!     ├── full
//!     ├── db    --db NAME
//!     └── table --db NAME --table NAME
//! ```
//!
//! Persistent flags are registered as `global` args on `backup`, so they may
//! appear before or after the leaf name.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::CompressionType;

/// Top-level CLI arguments, shared across every subcommand.
#[derive(Parser, Debug)]
#[command(
    name    = "br",
    about   = "Backup orchestration for a distributed database cluster",
    version,
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// TOML file with default cluster, engine, and log settings.
    ///
    /// When omitted, `~/.config/br-backup/config.toml` is read if it exists.
    /// Flags always win over values from the file.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    ///
    /// With a log file configured, backup progress is written to the log
    /// rather than drawn as a spinner.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. `info` or `br_backup=debug`.  Falls back to `RUST_LOG`.
    #[arg(short = 'L', long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Back up a cluster, a single database, or a single table.
    Backup(BackupArgs),
}

/// Arguments of the `backup` command: persistent flags plus the chosen leaf.
#[derive(Args, Debug, Clone)]
pub struct BackupArgs {
    #[command(flatten)]
    pub flags: BackupFlags,

    #[command(subcommand)]
    pub scope: ScopeCommand,
}

/// Flags shared by every backup leaf.
///
/// Everything is optional at parse time; unset values fall back to the
/// config file and then to built-in defaults when the backup config is
/// assembled.
#[derive(Args, Debug, Clone, Default)]
pub struct BackupFlags {
    /// PD address(es) of the cluster, comma separated.
    #[arg(
        short = 'u',
        long = "pd",
        global = true,
        value_delimiter = ',',
        value_name = "ADDR"
    )]
    pub pd: Vec<String>,

    /// Where backup files go, e.g. `local:///data/br` or `s3://bucket/prefix`.
    #[arg(short = 's', long, global = true, value_name = "URL")]
    pub storage: Option<String>,

    /// Per-node rate limit in MiB/s.
    #[arg(long, global = true, value_name = "MIB")]
    pub ratelimit: Option<u64>,

    /// Number of concurrent backup requests per node.
    #[arg(long, global = true, value_name = "N")]
    pub concurrency: Option<u32>,

    /// Verify checksums once the backup finishes (`--checksum=false` to skip).
    #[arg(
        long,
        global = true,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub checksum: Option<bool>,

    /// Snapshot timestamp to back up.  Defaults to the current TSO.
    #[arg(long = "backupts", global = true, value_name = "TS")]
    pub backup_ts: Option<u64>,

    /// Compression applied to backup files.
    #[arg(long, global = true, value_enum)]
    pub compression: Option<CompressionType>,

    /// Ask the engine to remove PD schedulers for the duration of the backup.
    #[arg(long, global = true)]
    pub remove_schedulers: bool,

    /// Backup engine executable.  Overrides `[engine].program`.
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub engine: Option<String>,
}

/// The three backup leaves.  Exactly one runs per invocation.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ScopeCommand {
    /// Back up all databases.
    Full,
    /// Back up a single database.
    Db(DatabaseFilter),
    /// Back up a single table.
    Table(TableFilter),
}

impl ScopeCommand {
    /// Human-readable name the runner reports the backup under.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Full => "Full backup",
            Self::Db(_) => "Database backup",
            Self::Table(_) => "Table backup",
        }
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseFilter {
    /// Database to back up (required).
    #[arg(short = 'd', long = "db", value_name = "NAME")]
    pub db: Option<String>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    /// Database the table belongs to (required).
    #[arg(short = 'd', long = "db", value_name = "NAME")]
    pub db: Option<String>,

    /// Table to back up (required).
    #[arg(short = 't', long = "table", value_name = "NAME")]
    pub table: Option<String>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
