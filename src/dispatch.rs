//! Hand-off from the command layer to the backup runner.

use anyhow::Result;
use tracing::debug;

use crate::{
    config::BackupConfig, context::ExecutionContext, glue::Glue, runtime::RuntimeToggles,
};

/// Performs the actual backup.
///
/// May block for the whole backup and should stop early once `ctx` is
/// cancelled.  Errors are opaque to this layer.  Whether a runner is safe to
/// retry is up to the runner; nothing here retries.
pub trait BackupRunner {
    fn run(
        &self,
        ctx: &ExecutionContext,
        glue: &dyn Glue,
        toggles: &RuntimeToggles,
        cmd_name: &str,
        cfg: BackupConfig,
    ) -> Result<()>;
}

/// Invoke `runner` once and return its result untouched.
pub fn dispatch(
    runner: &dyn BackupRunner,
    ctx: &ExecutionContext,
    glue: &dyn Glue,
    toggles: &RuntimeToggles,
    cmd_name: &str,
    cfg: BackupConfig,
) -> Result<()> {
    debug!(
        cmd = cmd_name,
        scope = cfg.scope.kind(),
        session = glue.name(),
        "dispatching backup"
    );
    runner.run(ctx, glue, toggles, cmd_name, cfg)
}
