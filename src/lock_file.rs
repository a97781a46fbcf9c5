//! The single-instance lock file.
//!
//! One process at a time may hold the exclusive flock on the file;
//! the holder writes its pid into it so that an operator can see who
//! it is. The pid is never read back by the service itself. A crash
//! leaves the file behind (without the flock), which is the expected
//! operational state after a crash, not something handled here.

use std::{
    fs::{remove_file, File, OpenOptions},
    io::Write,
    os::unix::{fs::OpenOptionsExt, io::AsRawFd},
    path::{Path, PathBuf},
};

use nix::{
    errno::Errno,
    fcntl::{fcntl, flock, FcntlArg, FdFlag, FlockArg},
    unistd::getpid,
};

#[derive(thiserror::Error, Debug)]
pub enum LockFileError {
    #[error("another instance is already holding {0:?}")]
    AlreadyRunning(PathBuf),
    #[error("could not open lock file {path:?}: {error}")]
    Open {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("could not set close-on-exec on {path:?}: {error}")]
    CloseOnExec { path: PathBuf, error: Errno },
    #[error("could not lock {path:?}: {error}")]
    Lock { path: PathBuf, error: Errno },
    #[error("could not write the process id to {path:?}: {error}")]
    WritePid {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("could not remove lock file {path:?}: {error}")]
    Remove {
        path: PathBuf,
        error: std::io::Error,
    },
}

/// The held lock: the open descriptor with its exclusive flock, plus
/// the path needed for removal on release. Held for the whole process
/// lifetime.
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    /// Open (creating with mode 0o600 if absent) and exclusively lock
    /// the file at `path`, then truncate it and write the current
    /// pid. Never blocks: if the lock is already taken,
    /// `AlreadyRunning` is returned immediately.
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<LockFile, LockFileError> {
        let path = path.as_ref();
        // Can't use `File::create` since that would truncate a live
        // instance's lock file before we have the lock.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o600)
            .open(path)
            .map_err(|error| LockFileError::Open {
                path: path.to_owned(),
                error,
            })?;

        let fd = file.as_raw_fd();

        // Close-on-exec, so a re-exec of the binary does not leak the
        // descriptor.
        let set_cloexec = || -> Result<(), Errno> {
            let flags = fcntl(fd, FcntlArg::F_GETFD)?;
            let flags = FdFlag::from_bits_truncate(flags) | FdFlag::FD_CLOEXEC;
            fcntl(fd, FcntlArg::F_SETFD(flags))?;
            Ok(())
        };
        set_cloexec().map_err(|error| LockFileError::CloseOnExec {
            path: path.to_owned(),
            error,
        })?;

        match flock(fd, FlockArg::LockExclusiveNonblock) {
            Ok(()) => (),
            Err(Errno::EWOULDBLOCK) => {
                return Err(LockFileError::AlreadyRunning(path.to_owned()))
            }
            Err(error) => {
                return Err(LockFileError::Lock {
                    path: path.to_owned(),
                    error,
                })
            }
        }

        let mut lock = LockFile {
            file,
            path: path.to_owned(),
        };
        lock.write_pid().map_err(|error| LockFileError::WritePid {
            path: lock.path.clone(),
            error,
        })?;
        Ok(lock)
    }

    fn write_pid(&mut self) -> std::io::Result<()> {
        self.file.set_len(0)?;
        self.file.write_fmt(format_args!("{}", getpid()))?;
        self.file.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock, close and remove the file. To be called on every clean
    /// shutdown path; after a crash the file simply stays behind.
    pub fn release(self) -> Result<(), LockFileError> {
        let LockFile { file, path } = self;
        _ = flock(file.as_raw_fd(), FlockArg::Unlock);
        drop(file);
        match remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) => Err(LockFileError::Remove { path, error }),
        }
    }
}
