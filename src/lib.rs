//! A minimal single-instance background service: detach from the
//! invoking session (or let a supervisor handle that), hold an
//! exclusive lock file so only one instance runs, then iterate the
//! Fibonacci sequence once per second and log each term, until a stop
//! signal arrives.
//!
//! The binaries in `src/bin/` wire these modules together:
//! `fibd` is the SysV-style self-daemonizing variant, and
//! `fibd-supervised` the variant meant to run under a process
//! supervisor.

pub mod daemonize;
pub mod defaults;
pub mod lock_file;
pub mod logging;
pub mod sequence;
pub mod service;
pub mod signals;
pub mod unix;
