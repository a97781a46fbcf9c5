//! Small wrappers around unix process primitives.

use nix::{
    errno::Errno,
    unistd::{fork, ForkResult, Pid},
};
use num_threads::is_single_threaded;

/// Fork the current process; gives the child pid in the parent, and
/// `None` in the child. Can only be called while no other threads are
/// running; it checks and panics if there are (or if that cannot be
/// determined).
pub fn checked_fork() -> Result<Option<Pid>, Errno> {
    match is_single_threaded() {
        Some(true) => (),
        Some(false) => panic!("checked_fork: other threads are running, refusing to fork"),
        None => panic!("checked_fork: can't determine whether other threads are running"),
    }
    match unsafe {
        // Safe because there are no other threads (checked above).
        fork()
    }? {
        ForkResult::Parent { child, .. } => Ok(Some(child)),
        ForkResult::Child => Ok(None),
    }
}
