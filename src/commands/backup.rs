//! `br backup` and its three leaves.
//!
//! # Execution order
//!
//! | # | Step        | Runs for         | Description                              |
//! |---|-------------|------------------|------------------------------------------|
//! | 1 | Preflight   | every leaf, once | Persistent pre-run hook of `backup`      |
//! | 2 | Assemble    | the chosen leaf  | Flags → validated [`BackupConfig`]       |
//! | 3 | Dispatch    | the chosen leaf  | Hand the config to the backup runner     |
//!
//! Any step that fails ends the invocation with that error; later steps never
//! run.

use anyhow::Result;

use crate::{
    cli::{BackupArgs, BackupFlags, ScopeCommand},
    config::{BackupConfig, FileConfig},
    context::ExecutionContext,
    dispatch::{BackupRunner, dispatch},
    glue::Glue,
    preflight,
    runtime::RuntimeToggles,
};

/// Everything one invocation of `br backup` works with.
pub struct Invocation<'a> {
    pub runner: &'a dyn BackupRunner,
    pub glue: &'a dyn Glue,
    pub ctx: &'a ExecutionContext,
    pub toggles: &'a mut RuntimeToggles,
    pub defaults: &'a FileConfig,
    /// Whether the process logs to a file; decides `log_progress`.
    pub has_log_file: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

/// Run `br backup <leaf>`: the persistent preflight hook, then the leaf.
pub fn execute<'a>(args: &BackupArgs, inv: &mut Invocation<'a>) -> Result<()> {
    let root = with_persistent_pre_run(
        |inv: &mut Invocation<'a>| Ok(preflight::run(&mut *inv.toggles, args)?),
        |inv: &mut Invocation<'a>| run_backup_command(&args.flags, &args.scope, inv),
    );
    root(inv)
}

/// Compose a persistent pre-run hook with a run hook.
///
/// The returned hook runs `pre` and, only if it succeeds, `run`.
pub fn with_persistent_pre_run<T: ?Sized>(
    pre: impl FnOnce(&mut T) -> Result<()>,
    run: impl FnOnce(&mut T) -> Result<()>,
) -> impl FnOnce(&mut T) -> Result<()> {
    move |target| {
        pre(target)?;
        run(target)
    }
}

// ─── Leaves ───────────────────────────────────────────────────────────────────

/// Shared run hook of the three leaves; `leaf` picks the scope and label.
fn run_backup_command(
    flags: &BackupFlags,
    leaf: &ScopeCommand,
    inv: &mut Invocation<'_>,
) -> Result<()> {
    let cfg = BackupConfig::from_flags(flags, leaf, inv.defaults, inv.has_log_file)?;
    dispatch(inv.runner, inv.ctx, inv.glue, &*inv.toggles, leaf.label(), cfg)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
