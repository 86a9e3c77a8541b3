//! Cancellable execution context.
//!
//! One [`ExecutionContext`] is created per process and handed, unchanged, to
//! the backup runner.  Clones share the same cancellation flag, so cancelling
//! any clone is observed by all of them.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Set from the signal handler.  Only contexts built with
/// [`ExecutionContext::interruptible`] look at it.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    cancelled: Arc<AtomicBool>,
    watch_signals: bool,
}

impl ExecutionContext {
    /// A context that is only cancelled through [`ExecutionContext::cancel`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that is also cancelled by SIGINT or SIGTERM.
    ///
    /// Installs the process signal handlers; intended to be called once from
    /// `main`.
    pub fn interruptible() -> Self {
        install_signal_handlers();
        Self {
            cancelled: Arc::default(),
            watch_signals: true,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || (self.watch_signals && INTERRUPTED.load(Ordering::SeqCst))
    }
}

#[cfg(unix)]
fn install_signal_handlers() {
    extern "C" fn on_interrupt(_signal: libc::c_int) {
        INTERRUPTED.store(true, Ordering::SeqCst);
    }

    let handler = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only performs an atomic store, which is
    // async-signal-safe.
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
}

#[cfg(not(unix))]
fn install_signal_handlers() {}
