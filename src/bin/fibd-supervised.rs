//! The supervisor-managed variant: no self-backgrounding (the
//! supervisor performs the isolation and owns the restart policy),
//! logs to stderr for the supervisor to collect, and additionally
//! handles SIGINT so it can be stopped from a terminal when run by
//! hand.

use std::process::exit;

use anyhow::Context;
use log::{error, info, warn};

use fibd::{
    defaults::{PID_FILE, TICK_INTERVAL},
    lock_file::LockFile,
    logging::init_stderr_logger,
    service::Service,
    signals::install_handlers,
};

fn run() -> anyhow::Result<()> {
    init_stderr_logger();

    let lock = LockFile::acquire(PID_FILE).context("acquiring the single-instance lock")?;

    let run_state = install_handlers(true).context("installing signal handlers")?;
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
            error!("fatal: {error:#}");
            exit(1);
        }
    }
}
