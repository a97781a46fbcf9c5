//! Compile-time defaults. There is deliberately no command-line or
//! configuration file surface for these.

use std::time::Duration;

/// The single-instance lock file, holding the pid of the running
/// instance. Left behind if the process crashes.
pub const PID_FILE: &str = "/var/run/fibd.pid";

/// Log sink of the self-daemonizing variant.
pub const LOG_FILE: &str = "/var/log/fibd.log";

/// Time between two computed terms.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
