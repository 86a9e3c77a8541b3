//! The default backup runner: drives an external engine executable.
//!
//! Argument construction is kept apart from execution.  [`engine_args`] is a
//! pure function and trivially unit-testable; [`EngineRunner`] opens a
//! session through the [`Glue`], watches it, and reports the result.
//!
//! # Engine invocation
//!
//! ```text
//! <program> [leading args] backup <full|db|table>
//!     --pd <a,b> --storage <url> --concurrency <n> --checksum=<bool>
//!     --compression <codec> [--ratelimit <n>] [--backupts <ts>]
//!     [--remove-schedulers] [--db <name>] [--table <name>] [--log-progress]
//! ```

use std::{
    io::{BufRead, BufReader, Read},
    process::{Child, ExitStatus},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::{
    config::{BackupConfig, redact_storage_url},
    context::ExecutionContext,
    dispatch::BackupRunner,
    glue::Glue,
    runtime::RuntimeToggles,
    summary::Summary,
    ui::{self, EngineOutcome},
};

// ─── Argument builder ─────────────────────────────────────────────────────────

/// Build the engine argument list for `cfg`.
pub fn engine_args(cfg: &BackupConfig) -> Vec<String> {
    let c = &cfg.config;
    let mut args: Vec<String> = vec![
        "backup".into(),
        cfg.scope.kind().into(),
        "--pd".into(),
        c.pd.join(","),
        "--storage".into(),
        c.storage.clone(),
        "--concurrency".into(),
        c.concurrency.to_string(),
        format!("--checksum={}", c.checksum),
        "--compression".into(),
        c.compression.to_string(),
    ];
    if let Some(limit) = c.rate_limit {
        args.extend(["--ratelimit".into(), limit.to_string()]);
    }
    if let Some(ts) = c.backup_ts {
        args.extend(["--backupts".into(), ts.to_string()]);
    }
    if c.remove_schedulers {
        args.push("--remove-schedulers".into());
    }
    if let Some(db) = cfg.scope.database() {
        args.extend(["--db".into(), db.to_string()]);
    }
    if let Some(table) = cfg.scope.table() {
        args.extend(["--table".into(), table.to_string()]);
    }
    if c.log_progress {
        args.push("--log-progress".into());
    }
    args
}

/// `engine_args` joined for logging, with storage credentials redacted.
fn loggable(args: &[String]) -> String {
    args.iter()
        .map(|a| redact_storage_url(a))
        .collect::<Vec<_>>()
        .join(" ")
}

// ─── Runner ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EngineRunner {
    /// How often the engine is checked for exit and the context for
    /// cancellation.
    poll_interval: Duration,
}

impl Default for EngineRunner {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl EngineRunner {
    pub const fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl BackupRunner for EngineRunner {
    fn run(
        &self,
        ctx: &ExecutionContext,
        glue: &dyn Glue,
        toggles: &RuntimeToggles,
        cmd_name: &str,
        cfg: BackupConfig,
    ) -> Result<()> {
        if ctx.is_cancelled() {
            bail!("{cmd_name} cancelled before it started");
        }

        let args = engine_args(&cfg);
        let log_progress = cfg.config.log_progress;
        info!(
            cmd = cmd_name,
            session = glue.name(),
            args = %loggable(&args),
            "starting backup engine"
        );

        let summary = Summary::start(cmd_name, toggles.reporting_unit());
        let mut child = glue
            .open_session(&args)
            .with_context(|| format!("failed to start backup engine `{}`", glue.name()))?;

        let stdout = spawn_reader(child.stdout.take(), log_progress);
        let stderr = spawn_reader(child.stderr.take(), false);
        let spinner = if log_progress {
            None
        } else {
            ui::spinner(cmd_name)
        };

        let waited = wait_or_cancel(&mut child, ctx, self.poll_interval);
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let Some(status) = waited.context("waiting for backup engine")? else {
            // Readers are left detached: anything else still holding the pipes
            // would keep a join blocked.
            summary.finish(false);
            bail!("{cmd_name} cancelled");
        };

        let mut outcome = EngineOutcome {
            label: cmd_name.to_string(),
            success: status.success(),
            stdout: collect(stdout),
            stderr: collect(stderr),
            error: None,
        };

        if outcome.failed() {
            let msg = format!("backup engine exited with {status}");
            warn!(cmd = cmd_name, stderr = %outcome.stderr.trim_end(), "{msg}");
            outcome.error = Some(msg.clone());
            outcome.print();
            summary.finish(false);
            bail!(msg);
        }

        outcome.print();
        summary.finish(true);
        Ok(())
    }
}

/// Wait for the engine to exit, killing it if `ctx` is cancelled first.
///
/// Returns `None` when the engine was killed because of cancellation.
fn wait_or_cancel(
    child: &mut Child,
    ctx: &ExecutionContext,
    poll_interval: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if ctx.is_cancelled() {
            warn!("cancellation requested, stopping backup engine");
            kill_session(child);
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(poll_interval);
    }
}

/// Kill the engine and, on unix, every process in its process group.
///
/// The engine may exit on its own between the check and the kill, so
/// failures are ignored.
fn kill_session(child: &mut Child) {
    kill_process_group(child);
    let _ = child.kill();
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: killpg has no memory-safety preconditions.  It fails with
        // ESRCH when the engine does not lead its own group.
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

/// Drain a child pipe on its own thread, optionally logging each line.
///
/// Lines are split on raw bytes and decoded lossily, so output that is not
/// valid UTF-8 never stops the drain.
fn spawn_reader<R>(pipe: Option<R>, log_lines: bool) -> Option<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    pipe.map(|pipe| {
        thread::spawn(move || {
            let mut reader = BufReader::new(pipe);
            let mut captured = String::new();
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {},
                }
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                if log_lines {
                    info!(target: "engine", "{line}");
                }
                captured.push_str(line);
                captured.push('\n');
            }
            captured
        })
    })
}

fn collect(reader: Option<JoinHandle<String>>) -> String {
    reader.and_then(|h| h.join().ok()).unwrap_or_default()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
