//! Conversion of the calling process into a detached background
//! service, SysV style.
//!
//! The sequence follows the classic double-fork recipe: after it, the
//! process is no session leader, has no controlling terminal and can
//! never acquire one again, its working directory is `/`, its umask
//! imposes no restriction, and all three standard streams read from /
//! write to the null device. Each step depends on the previous one,
//! so the ordering must not be changed.

use std::process::exit;

use nix::{
    errno::Errno,
    fcntl::{open, OFlag},
    sys::stat::{umask, Mode},
    unistd::{chdir, close, dup2, setsid, sysconf, SysconfVar},
};

use crate::unix::checked_fork;

/// Upper bound for the descriptor-closing loop when sysconf does not
/// report one.
const FALLBACK_MAX_FD: i32 = 8192;

#[derive(thiserror::Error, Debug)]
pub enum DaemonizeError {
    #[error("could not fork the {which} time: {error}")]
    Fork { which: &'static str, error: Errno },
    #[error("could not start a new session: {0}")]
    NewSession(Errno),
    #[error("could not open /dev/null: {0}")]
    OpenNull(Errno),
    #[error("/dev/null opened as descriptor {0} instead of stdin")]
    NullNotStdin(i32),
    #[error("could not bind {stream} to /dev/null: {error}")]
    Redirect { stream: &'static str, error: Errno },
}

/// Put the current process into the background. On success the caller
/// is the final, fully detached process; the two intermediate parents
/// exit with status 0 in here and never return. All failures are
/// fatal for the caller, there is nothing to retry.
///
/// Note: must be run while there are no other threads, panics
/// otherwise! Any descriptor opened before this call (including a log
/// sink) is closed by it; set up logging afterwards.
pub fn daemonize() -> Result<(), DaemonizeError> {
    // First fork: the parent returns control to the invoking shell
    // right away; the child keeps running, and is not a process group
    // leader, which is the precondition for setsid below.
    if checked_fork()
        .map_err(|error| DaemonizeError::Fork {
            which: "first",
            error,
        })?
        .is_some()
    {
        exit(0);
    }

    // New session; detaches from the controlling terminal of the
    // invoking session.
    setsid().map_err(DaemonizeError::NewSession)?;

    // Second fork: the session leader exits, the remaining process
    // can never acquire a controlling terminal again, not even by
    // opening a terminal device.
    if checked_fork()
        .map_err(|error| DaemonizeError::Fork {
            which: "second",
            error,
        })?
        .is_some()
    {
        exit(0);
    }

    // Files and directories created from here on get exactly the
    // permissions they ask for.
    umask(Mode::empty());

    // Do not keep a working directory on a filesystem that someone
    // may want to unmount. Not checked, same as in every daemon
    // recipe; `/` is always there.
    _ = chdir("/");

    close_inherited_descriptors();

    // Everything is closed, so the next open lands on descriptor 0.
    let nullfd = open("/dev/null", OFlag::O_RDWR, Mode::empty()).map_err(DaemonizeError::OpenNull)?;
    if nullfd != 0 {
        return Err(DaemonizeError::NullNotStdin(nullfd));
    }
    dup2(0, 1).map_err(|error| DaemonizeError::Redirect {
        stream: "stdout",
        error,
    })?;
    dup2(0, 2).map_err(|error| DaemonizeError::Redirect {
        stream: "stderr",
        error,
    })?;

    Ok(())
}

/// Close every descriptor in the currently possible range, dropping
/// the references to the original terminal and any inherited files.
fn close_inherited_descriptors() {
    let maxfd = match sysconf(SysconfVar::OPEN_MAX) {
        Ok(Some(n)) => i32::try_from(n).unwrap_or(FALLBACK_MAX_FD),
        Ok(None) | Err(_) => FALLBACK_MAX_FD,
    };
    for fd in 0..maxfd {
        // Most of the range is not open; EBADF for those is expected.
        _ = close(fd);
    }
}
