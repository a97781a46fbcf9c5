//! The SysV-style variant: puts itself into the background with the
//! double-fork procedure, takes the single-instance lock, then runs
//! the computation loop until a SIGTERM arrives.
//!
//! Needs permission to write `/var/run/fibd.pid` and
//! `/var/log/fibd.log`, i.e. normally runs as root.

use std::process::exit;

use anyhow::Context;
use log::{error, info, warn};

use fibd::{
    daemonize::daemonize,
    defaults::{LOG_FILE, PID_FILE, TICK_INTERVAL},
    lock_file::LockFile,
    logging::init_file_logger,
    service::Service,
    signals::install_handlers,
};

fn run() -> anyhow::Result<()> {
    // From here on the process has no terminal and its standard
    // streams end in /dev/null; everything below must report through
    // the log file.
    daemonize().context("daemonizing the process")?;

    init_file_logger(LOG_FILE).context("setting up logging")?;

    let lock = LockFile::acquire(PID_FILE).context("acquiring the single-instance lock")?;

    // No SIGINT here: a detached process has no terminal to receive
    // an interactive interrupt from.
    let run_state = install_handlers(false).context("installing signal handlers")?;
    run_state.set_running(true);

    info!("starting");

    let mut service = Service::new(TICK_INTERVAL);
    service.run(&run_state);

    info!("stopping");

    if let Err(error) = lock.release() {
        warn!("could not clean up the lock file: {error}");
    }
    Ok(())
}

fn main() {
    match run() {
        Ok(()) => (),
        Err(error) => {
            // Before detachment this reaches the invoking terminal;
            // afterwards the log file, if one is installed yet.
            eprintln!("fibd: {error:#}");
            error!("fatal: {error:#}");
            exit(1);
        }
    }
}
