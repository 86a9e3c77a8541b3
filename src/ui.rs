//! Terminal UI: spinner, result lines, and replay of captured engine output.
//!
//! # Design goals
//!
//! - **Clean by default.** While the engine runs the user sees only a spinner and the backup
//!   label.  Raw engine output is captured and hidden.
//! - **Informative on failure.** If the engine exits non-zero its captured stdout *and* stderr
//!   are printed in full so the operator can diagnose the problem without re-running manually.
//! - **Quiet when not interactive.** No spinner is drawn when stderr is not a terminal or
//!   `NO_PROGRESS` is set, so logs and CI output stay readable.

use std::{io::IsTerminal, time::Duration};

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Braille spinner frames — same style as indicatif's default.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Green ✓  — printed when the backup succeeds.
fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
/// Red ✗    — printed when the backup fails.
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}

// ─── Engine outcome ───────────────────────────────────────────────────────────

/// What the engine did during one backup.
///
/// Carries the backup label plus whatever the engine wrote to stdout/stderr
/// so it can be replayed to the terminal when something goes wrong.
#[derive(Debug)]
pub struct EngineOutcome {
    /// Human-readable label, e.g. `"Full backup"`.
    pub label: String,
    /// Whether the engine exited successfully.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Why the run failed, if it did.
    pub error: Option<String>,
}

impl EngineOutcome {
    /// Print the one-line result (✓/✗ + label).
    ///
    /// On failure, also prints the error and the captured output so the
    /// operator has everything they need without re-running.
    pub fn print(&self) {
        if self.success {
            println!("  {}  {}", icon_ok(), style(&self.label).bold());
            return;
        }

        println!("  {}  {}", icon_err(), style(&self.label).bold());

        if let Some(ref msg) = self.error {
            eprintln!();
            eprintln!("  {} {}", style("Error:").red().bold(), msg);
        }

        // Replay captured output so the operator can see what the engine said.
        if !self.stdout.is_empty() {
            eprintln!();
            eprintln!("  {} stdout:", style("►").dim());
            for line in self.stdout.lines() {
                eprintln!("    {line}");
            }
        }
        if !self.stderr.is_empty() {
            eprintln!();
            eprintln!("  {} stderr:", style("►").dim());
            for line in self.stderr.lines() {
                eprintln!("    {line}");
            }
        }
    }

    pub const fn failed(&self) -> bool {
        !self.success
    }
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

fn progress_enabled() -> bool {
    if std::env::var_os("NO_PROGRESS").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

/// Start an indeterminate spinner for `label`, or `None` when progress
/// drawing is disabled.
///
/// The spinner ticks at ~80 ms; call [`ProgressBar::finish_and_clear`] when
/// the work is done.
pub fn spinner(label: &str) -> Option<ProgressBar> {
    if !progress_enabled() {
        return None;
    }
    let template = ProgressStyle::with_template("  {spinner:.cyan}  {msg}  {elapsed:.dim}")
        .ok()?
        .tick_chars(SPINNER_CHARS);

    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(template);
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
