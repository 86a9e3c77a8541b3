//! Process-wide runtime toggles.
//!
//! The toggles describe the environment a backup runs in: whether the
//! background DDL and statistics workers may run, and which unit progress and
//! summary reports are attributed to.  They live in an explicit value that is
//! handed to the preflight step and then to the dispatcher, so two tests (or
//! two invocations) never observe each other's state.

use crate::error::PreflightError;

/// Reporting unit label used by every backup subcommand.
pub const BACKUP_UNIT: &str = "BackupUnit";

#[derive(Debug, Clone)]
pub struct RuntimeToggles {
    ddl_worker_enabled: bool,
    stats_worker_enabled: bool,
    reporting_unit: Option<&'static str>,
    preflight_runs: u32,
}

impl Default for RuntimeToggles {
    /// A fresh process: both background workers would run, nothing reported yet.
    fn default() -> Self {
        Self {
            ddl_worker_enabled: true,
            stats_worker_enabled: true,
            reporting_unit: None,
            preflight_runs: 0,
        }
    }
}

impl RuntimeToggles {
    pub fn set_ddl_worker_enabled(&mut self, enabled: bool) {
        self.ddl_worker_enabled = enabled;
    }

    /// Keep the statistics worker from ever starting in this process.
    pub fn disable_stats_for_test(&mut self) {
        self.stats_worker_enabled = false;
    }

    /// Attribute subsequent reports to `unit`.
    ///
    /// Setting the same unit again is a no-op.  Switching an already-set unit
    /// to a different one is refused, since reports collected so far would be
    /// misattributed.
    pub fn set_reporting_unit(&mut self, unit: &'static str) -> Result<(), PreflightError> {
        match self.reporting_unit {
            Some(current) if current != unit => Err(PreflightError::UnitConflict {
                current,
                requested: unit,
            }),
            _ => {
                self.reporting_unit = Some(unit);
                Ok(())
            },
        }
    }

    pub(crate) fn record_preflight(&mut self) {
        self.preflight_runs += 1;
    }

    pub const fn ddl_worker_enabled(&self) -> bool {
        self.ddl_worker_enabled
    }

    pub const fn stats_worker_enabled(&self) -> bool {
        self.stats_worker_enabled
    }

    pub const fn reporting_unit(&self) -> Option<&'static str> {
        self.reporting_unit
    }

    /// How many times the preflight step completed against these toggles.
    pub const fn preflight_runs(&self) -> u32 {
        self.preflight_runs
    }
}
