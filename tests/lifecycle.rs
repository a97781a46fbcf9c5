//! Run/stop behaviour driven by real signal delivery. Everything
//! lives in a single test function because the run flag and the
//! pending-signal mask are per-process.

use std::{thread, time::Duration};

use nix::sys::signal::{raise, Signal};

use fibd::{
    service::Service,
    signals::{install_handlers, take_pending},
};

#[test]
fn t_signal_driven_lifecycle() {
    let run_state = install_handlers(true).unwrap();
    assert!(!run_state.running());

    run_state.set_running(true);

    // A reload request leaves the run flag alone; it only shows up in
    // the pending drain (where the loop would log it).
    raise(Signal::SIGHUP).unwrap();
    assert!(run_state.running());
    let pending = take_pending();
    assert!(pending.reload());
    assert!(!pending.stop());
    assert!(!pending.interrupt());
    // Each signal is reported exactly once.
    assert!(take_pending().is_empty());

    // The loop keeps iterating until SIGTERM clears the flag, then
    // winds down within one sleep interval.
    let worker = thread::spawn(move || {
        let mut service = Service::new(Duration::from_millis(10));
        service.run(&run_state)
    });
    thread::sleep(Duration::from_millis(50));
    assert!(run_state.running());
    raise(Signal::SIGTERM).unwrap();
    let iterations = worker.join().unwrap();
    assert!(!run_state.running());
    assert!(iterations >= 1);
    // The loop drained and logged the stop signal on its way out.
    assert!(take_pending().is_empty());

    // SIGINT clears the flag the same way as SIGTERM.
    run_state.set_running(true);
    raise(Signal::SIGINT).unwrap();
    assert!(!run_state.running());
    assert!(take_pending().interrupt());
    run_state.set_running(false);
}
