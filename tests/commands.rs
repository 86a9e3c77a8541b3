//! Command-level tests for `br backup`.
//!
//! These drive [`br_backup::commands::backup::execute`] with a recording
//! runner instead of the engine, so they check the orchestration itself:
//! preflight ordering, scope selection, validation, and error propagation.

use std::{cell::RefCell, io, process::Child};

use br_backup::{
    cli::{BackupArgs, Cli, Command},
    commands::backup::{Invocation, execute},
    config::{BackupConfig, FileConfig, Scope},
    context::ExecutionContext,
    dispatch::BackupRunner,
    error::ValidationError,
    glue::Glue,
    runtime::{BACKUP_UNIT, RuntimeToggles},
};
use clap::Parser;

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// What the runner saw when it was called.
#[derive(Debug, Clone)]
struct Call {
    cmd_name: String,
    cfg: BackupConfig,
    ddl_worker_enabled: bool,
    stats_worker_enabled: bool,
    reporting_unit: Option<&'static str>,
    preflight_runs: u32,
    cancelled: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("sentinel runner failure #{0}")]
struct Sentinel(u32);

#[derive(Default)]
struct RecordingRunner {
    calls: RefCell<Vec<Call>>,
    fail_with: Option<u32>,
}

impl BackupRunner for RecordingRunner {
    fn run(
        &self,
        ctx: &ExecutionContext,
        _glue: &dyn Glue,
        toggles: &RuntimeToggles,
        cmd_name: &str,
        cfg: BackupConfig,
    ) -> anyhow::Result<()> {
        self.calls.borrow_mut().push(Call {
            cmd_name: cmd_name.to_string(),
            cfg,
            ddl_worker_enabled: toggles.ddl_worker_enabled(),
            stats_worker_enabled: toggles.stats_worker_enabled(),
            reporting_unit: toggles.reporting_unit(),
            preflight_runs: toggles.preflight_runs(),
            cancelled: ctx.is_cancelled(),
        });
        match self.fail_with {
            Some(n) => Err(Sentinel(n).into()),
            None => Ok(()),
        }
    }
}

struct NoSessionGlue;

impl Glue for NoSessionGlue {
    fn name(&self) -> &str {
        "no-session"
    }

    fn open_session(&self, _args: &[String]) -> io::Result<Child> {
        Err(io::Error::other("sessions are not available in tests"))
    }
}

const PD: &str = "127.0.0.1:2379";
const STORAGE: &str = "local:///tmp/br-test";

fn backup_args(leaf: &[&str]) -> BackupArgs {
    let argv = ["br", "backup", "--pd", PD, "-s", STORAGE]
        .into_iter()
        .chain(leaf.iter().copied());
    match Cli::try_parse_from(argv).expect("arguments should parse").command {
        Command::Backup(args) => args,
    }
}

/// Run `br backup <leaf>` against fresh toggles and return the outcome, the
/// recorded calls, and the toggles afterwards.
fn run_leaf(
    leaf: &[&str],
    runner: &RecordingRunner,
) -> (anyhow::Result<()>, Vec<Call>, RuntimeToggles) {
    let mut toggles = RuntimeToggles::default();
    let ctx = ExecutionContext::new();
    let defaults = FileConfig::default();
    let res = {
        let mut inv = Invocation {
            runner,
            glue: &NoSessionGlue,
            ctx: &ctx,
            toggles: &mut toggles,
            defaults: &defaults,
            has_log_file: false,
        };
        execute(&backup_args(leaf), &mut inv)
    };
    (res, runner.calls.borrow().clone(), toggles)
}

// ─── Leaves ──────────────────────────────────────────────────────────────────

#[test]
fn full_dispatches_once_with_full_label() {
    let runner = RecordingRunner::default();
    let (res, calls, toggles) = run_leaf(&["full"], &runner);

    res.unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].cmd_name, "Full backup");
    assert_eq!(calls[0].cfg.scope, Scope::Full);
    assert_eq!(toggles.preflight_runs(), 1);
}

#[test]
fn db_dispatches_once_with_database_label() {
    let runner = RecordingRunner::default();
    let (res, calls, toggles) = run_leaf(&["db", "--db", "shop"], &runner);

    res.unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].cmd_name, "Database backup");
    assert_eq!(calls[0].cfg.scope, Scope::Database { db: "shop".into() });
    assert_eq!(toggles.preflight_runs(), 1);
}

#[test]
fn table_dispatches_once_with_table_label() {
    let runner = RecordingRunner::default();
    let (res, calls, toggles) =
        run_leaf(&["table", "--db", "shop", "--table", "orders"], &runner);

    res.unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].cmd_name, "Table backup");
    assert_eq!(calls[0].cfg.scope, Scope::Table {
        db: "shop".into(),
        table: "orders".into(),
    });
    assert_eq!(toggles.preflight_runs(), 1);
}

#[test]
fn persistent_flags_reach_the_runner() {
    let runner = RecordingRunner::default();
    let (res, calls, _) = run_leaf(&["full"], &runner);

    res.unwrap();
    assert_eq!(calls[0].cfg.config.pd, vec![PD]);
    assert_eq!(calls[0].cfg.config.storage, STORAGE);
    assert!(!calls[0].cfg.config.log_progress);
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[test]
fn db_without_database_is_a_validation_error() {
    let runner = RecordingRunner::default();
    let (res, calls, _) = run_leaf(&["db"], &runner);

    let err = res.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::MissingDatabase)
    );
    assert!(calls.is_empty(), "runner must not be called");
}

#[test]
fn table_without_table_is_a_validation_error() {
    let runner = RecordingRunner::default();
    let (res, calls, _) = run_leaf(&["table", "--db", "shop"], &runner);

    let err = res.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::MissingTable)
    );
    assert!(calls.is_empty(), "runner must not be called");
}

#[test]
fn validation_failure_still_follows_preflight() {
    let runner = RecordingRunner::default();
    let (res, _, toggles) = run_leaf(&["db", "--db", ""], &runner);

    assert!(res.is_err());
    assert_eq!(toggles.preflight_runs(), 1);
}

// ─── Preflight ordering ──────────────────────────────────────────────────────

#[test]
fn preflight_effects_precede_dispatch_for_every_leaf() {
    let leaves: [&[&str]; 3] = [
        &["full"],
        &["db", "--db", "shop"],
        &["table", "--db", "shop", "--table", "orders"],
    ];
    for leaf in leaves {
        let runner = RecordingRunner::default();
        let (res, calls, _) = run_leaf(leaf, &runner);
        res.unwrap();

        let call = &calls[0];
        assert!(!call.ddl_worker_enabled, "{leaf:?}: DDL worker still on");
        assert!(!call.stats_worker_enabled, "{leaf:?}: stats worker still on");
        assert_eq!(call.reporting_unit, Some(BACKUP_UNIT), "{leaf:?}");
        assert_eq!(call.preflight_runs, 1, "{leaf:?}");
    }
}

#[test]
fn failed_preflight_skips_dispatch() {
    let runner = RecordingRunner::default();
    let mut toggles = RuntimeToggles::default();
    toggles.set_reporting_unit("RestoreUnit").unwrap();
    let ctx = ExecutionContext::new();
    let defaults = FileConfig::default();

    let res = execute(&backup_args(&["full"]), &mut Invocation {
        runner: &runner,
        glue: &NoSessionGlue,
        ctx: &ctx,
        toggles: &mut toggles,
        defaults: &defaults,
        has_log_file: false,
    });

    assert!(res.is_err());
    assert!(runner.calls.borrow().is_empty());
}

#[test]
fn running_full_twice_keeps_environment_stable() {
    let runner = RecordingRunner::default();
    let mut toggles = RuntimeToggles::default();
    let ctx = ExecutionContext::new();
    let defaults = FileConfig::default();
    let args = backup_args(&["full"]);

    for _ in 0..2 {
        execute(&args, &mut Invocation {
            runner: &runner,
            glue: &NoSessionGlue,
            ctx: &ctx,
            toggles: &mut toggles,
            defaults: &defaults,
            has_log_file: false,
        })
        .unwrap();
    }

    let calls = runner.calls.borrow();
    assert_eq!(calls.len(), 2);
    let state = |c: &Call| {
        (
            c.ddl_worker_enabled,
            c.stats_worker_enabled,
            c.reporting_unit,
        )
    };
    assert_eq!(state(&calls[0]), state(&calls[1]));
    assert_eq!(toggles.preflight_runs(), 2);
}

// ─── Runner result ───────────────────────────────────────────────────────────

#[test]
fn runner_error_is_returned_unchanged() {
    let runner = RecordingRunner {
        fail_with: Some(42),
        ..RecordingRunner::default()
    };
    let (res, calls, _) = run_leaf(&["full"], &runner);

    let err = res.unwrap_err();
    assert_eq!(calls.len(), 1);
    assert_eq!(err.downcast_ref::<Sentinel>(), Some(&Sentinel(42)));
    assert_eq!(err.chain().count(), 1, "no context may be layered on top");
    assert_eq!(err.to_string(), "sentinel runner failure #42");
}

#[test]
fn cancellation_reaches_the_runner() {
    let runner = RecordingRunner::default();
    let mut toggles = RuntimeToggles::default();
    let ctx = ExecutionContext::new();
    let defaults = FileConfig::default();
    ctx.clone().cancel();

    execute(&backup_args(&["full"]), &mut Invocation {
        runner: &runner,
        glue: &NoSessionGlue,
        ctx: &ctx,
        toggles: &mut toggles,
        defaults: &defaults,
        has_log_file: false,
    })
    .unwrap();

    assert!(runner.calls.borrow()[0].cancelled);
}

#[test]
fn log_file_turns_on_progress_logging() {
    let runner = RecordingRunner::default();
    let mut toggles = RuntimeToggles::default();
    let ctx = ExecutionContext::new();
    let defaults = FileConfig::default();

    execute(&backup_args(&["full"]), &mut Invocation {
        runner: &runner,
        glue: &NoSessionGlue,
        ctx: &ctx,
        toggles: &mut toggles,
        defaults: &defaults,
        has_log_file: true,
    })
    .unwrap();

    assert!(runner.calls.borrow()[0].cfg.config.log_progress);
}
