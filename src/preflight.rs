//! One-time environment preparation before a backup runs.
//!
//! # Steps (in order)
//!
//! | # | Step                                | Can fail |
//! |---|-------------------------------------|----------|
//! | 1 | Disable the background DDL worker   | no       |
//! | 2 | Disable the statistics worker       | no       |
//! | 3 | Log build info and parsed arguments | no       |
//! | 4 | Set the reporting unit              | yes      |
//!
//! The DDL and statistics workers would mutate schema and stats tables while
//! the snapshot is being read, so both stay off for the rest of the process.
//! Nothing is restored afterwards: the process exits once the backup is done.

use tracing::info;

use crate::{
    cli::{BackupArgs, ScopeCommand},
    config::redact_storage_url,
    error::PreflightError,
    runtime::{BACKUP_UNIT, RuntimeToggles},
};

/// Prepare `toggles` for a backup described by `args`.
///
/// Running it again against the same toggles leaves them in the same state.
pub fn run(toggles: &mut RuntimeToggles, args: &BackupArgs) -> Result<(), PreflightError> {
    toggles.set_ddl_worker_enabled(false);
    toggles.disable_stats_for_test();

    log_build_info();
    info!(arguments = %describe_arguments(args), "parsed arguments");

    toggles.set_reporting_unit(BACKUP_UNIT)?;
    info!(unit = BACKUP_UNIT, "reporting unit set");

    toggles.record_preflight();
    Ok(())
}

fn log_build_info() {
    info!(
        release_version = env!("CARGO_PKG_VERSION"),
        os = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "Welcome to {}",
        env!("CARGO_PKG_NAME")
    );
}

/// Render the explicit arguments as `--flag=value` pairs for the log.
///
/// Unset flags are skipped and storage credentials are redacted.
pub fn describe_arguments(args: &BackupArgs) -> String {
    let f = &args.flags;
    let mut out: Vec<String> = Vec::new();

    if !f.pd.is_empty() {
        out.push(format!("--pd={}", f.pd.join(",")));
    }
    if let Some(storage) = &f.storage {
        out.push(format!("--storage={}", redact_storage_url(storage)));
    }
    if let Some(v) = f.ratelimit {
        out.push(format!("--ratelimit={v}"));
    }
    if let Some(v) = f.concurrency {
        out.push(format!("--concurrency={v}"));
    }
    if let Some(v) = f.checksum {
        out.push(format!("--checksum={v}"));
    }
    if let Some(v) = f.backup_ts {
        out.push(format!("--backupts={v}"));
    }
    if let Some(v) = f.compression {
        out.push(format!("--compression={v}"));
    }
    if f.remove_schedulers {
        out.push("--remove-schedulers".into());
    }
    if let Some(v) = &f.engine {
        out.push(format!("--engine={v}"));
    }

    match &args.scope {
        ScopeCommand::Full => out.push("full".into()),
        ScopeCommand::Db(filter) => {
            out.push("db".into());
            if let Some(db) = &filter.db {
                out.push(format!("--db={db}"));
            }
        },
        ScopeCommand::Table(filter) => {
            out.push("table".into());
            if let Some(db) = &filter.db {
                out.push(format!("--db={db}"));
            }
            if let Some(table) = &filter.table {
                out.push(format!("--table={table}"));
            }
        },
    }

    out.join(" ")
}

// ─── Tests ────────────────────────────────────────────────────────────────────
