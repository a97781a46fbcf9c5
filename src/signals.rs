//! Asynchronous signal handling.
//!
//! The handler runs preemptively on the main thread's execution
//! context, so the only thing it does is store into two process-wide
//! atomics: the run flag, and a bitmask of received signals. The main
//! loop drains the bitmask and emits the corresponding log records on
//! its next wakeup; nothing in handler context allocates, locks or
//! logs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Whether the service should continue running. False at process
/// start, set true after successful setup, cleared exactly once by a
/// stop signal.
static RUNNING: AtomicBool = AtomicBool::new(false);

/// Handled signals received since the last drain, as a bitmask.
static PENDING_SIGNALS: AtomicUsize = AtomicUsize::new(0);

const PENDING_RELOAD: usize = 1 << 0;
const PENDING_STOP: usize = 1 << 1;
const PENDING_INTERRUPT: usize = 1 << 2;

extern "C" fn handle_signal(sig: i32) {
    let bit = if sig == Signal::SIGHUP as i32 {
        // Reload request; there is no reloadable configuration, the
        // run flag stays untouched.
        PENDING_RELOAD
    } else if sig == Signal::SIGTERM as i32 {
        RUNNING.store(false, Ordering::SeqCst);
        PENDING_STOP
    } else if sig == Signal::SIGINT as i32 {
        RUNNING.store(false, Ordering::SeqCst);
        PENDING_INTERRUPT
    } else {
        return;
    };
    PENDING_SIGNALS.fetch_or(bit, Ordering::SeqCst);
}

#[derive(thiserror::Error, Debug)]
#[error("could not install the handler for {signal}: {error}")]
pub struct SignalInstallError {
    pub signal: Signal,
    pub error: nix::errno::Errno,
}

/// Handle for the per-process run flag. All handles alias the same
/// flag; the type only exists so that the loop receives its state
/// explicitly instead of reaching for a global.
#[derive(Debug, Clone, Copy)]
pub struct RunState(());

impl RunState {
    pub fn running(&self) -> bool {
        RUNNING.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        RUNNING.store(running, Ordering::SeqCst);
    }
}

/// Install the handlers: SIGHUP (reload, a no-op), SIGTERM (graceful
/// stop), and, with `with_interrupt`, SIGINT for the variant that may
/// run attached to a terminal. All other signals keep their default
/// disposition.
pub fn install_handlers(with_interrupt: bool) -> Result<RunState, SignalInstallError> {
    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    let mut handled = vec![Signal::SIGHUP, Signal::SIGTERM];
    if with_interrupt {
        handled.push(Signal::SIGINT);
    }
    for signal in handled {
        unsafe {
            // Safe: the handler only performs atomic stores.
            sigaction(signal, &action)
        }
        .map_err(|error| SignalInstallError { signal, error })?;
    }
    Ok(RunState(()))
}

/// The signals that arrived since the previous drain.
#[derive(Debug, Clone, Copy)]
pub struct PendingSignals(usize);

impl PendingSignals {
    pub fn reload(&self) -> bool {
        self.0 & PENDING_RELOAD != 0
    }

    pub fn stop(&self) -> bool {
        self.0 & PENDING_STOP != 0
    }

    pub fn interrupt(&self) -> bool {
        self.0 & PENDING_INTERRUPT != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Drain the pending bitmask; each received signal is reported
/// exactly once across all drains.
pub fn take_pending() -> PendingSignals {
    PendingSignals(PENDING_SIGNALS.swap(0, Ordering::SeqCst))
}
