//! End-of-run summary attributed to the reporting unit.

use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Unit shown when the preflight step never set one.
const UNSET_UNIT: &str = "unset";

#[derive(Debug)]
pub struct Summary {
    name: String,
    unit: &'static str,
    started: Instant,
}

impl Summary {
    pub fn start(name: &str, unit: Option<&'static str>) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.unwrap_or(UNSET_UNIT),
            started: Instant::now(),
        }
    }

    pub fn render(&self, success: bool, elapsed: Duration) -> String {
        let outcome = if success { "success" } else { "failed" };
        format!(
            "{} {} summary: unit={}, total-take={:.3}s",
            self.name,
            outcome,
            self.unit,
            elapsed.as_secs_f64()
        )
    }

    /// Log the summary line and return it.
    pub fn finish(&self, success: bool) -> String {
        let line = self.render(success, self.started.elapsed());
        if success {
            info!(unit = self.unit, "{line}");
        } else {
            warn!(unit = self.unit, "{line}");
        }
        line
    }
}
