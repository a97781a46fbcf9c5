//! The main control loop.
//!
//! Lifecycle: setup happens in the binaries (lock, handlers, run flag
//! set true); `Service::run` is the `Running` state, sleeping one
//! interval per iteration, advancing the sequence, logging the new
//! term and re-checking the run flag. When the flag has been cleared
//! it returns, and the caller performs the `Stopping` work (final log
//! record, lock release).

use std::{thread::sleep, time::Duration};

use log::info;

use crate::{
    sequence::SequenceState,
    signals::{self, RunState},
};

/// State owned by the loop: the fixed sleep interval and the sequence
/// being iterated. Created at startup, dropped at process exit; only
/// this loop touches it.
pub struct Service {
    interval: Duration,
    sequence: SequenceState,
}

impl Service {
    pub fn new(interval: Duration) -> Service {
        Service {
            interval,
            sequence: SequenceState::new(),
        }
    }

    /// Run until the run flag is cleared by a stop signal. The sleep
    /// is not required to wake early on signal delivery; shutdown
    /// latency is at most one full interval. Returns the number of
    /// completed iterations.
    pub fn run(&mut self, run_state: &RunState) -> u64 {
        let mut iterations: u64 = 0;
        while run_state.running() {
            sleep(self.interval);

            let next = self.sequence.advance();
            if next.restarted {
                info!("sequence left the u64 range, restarting from (0, 1)");
            }
            info!("computed term: {}", next.term);
            iterations += 1;

            log_pending_signals();
        }
        // A signal may have arrived after the drain above (or before
        // the first iteration); report it before entering shutdown.
        log_pending_signals();
        iterations
    }
}

/// Emit the log records for signals received since the last drain.
/// This runs in the loop, not in handler context.
fn log_pending_signals() {
    let pending = signals::take_pending();
    if pending.reload() {
        info!("ignoring SIGHUP because there is nothing to reload");
    }
    if pending.interrupt() {
        info!("received SIGINT and clearing the run flag");
    }
    if pending.stop() {
        info!("received SIGTERM and clearing the run flag");
    }
}
