//! Logging sinks.
//!
//! The rest of the crate only depends on the `log` facade; the
//! binaries pick the sink. The self-daemonizing variant cannot use
//! its standard streams (they are bound to the null device), so it
//! appends timestamped lines to a log file. The supervised variant
//! writes to stderr and leaves collection to the supervisor.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::Utc;
use log::{LevelFilter, Log, Metadata, Record};

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("could not open log file {path:?}: {error}")]
    Open {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("a logger is already installed: {0}")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

/// Appends `timestamp<TAB>LEVEL<TAB>message` lines to a single file.
struct FileLogger {
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        // A failed write must not take the service down; the record
        // is silently lost instead.
        _ = writeln!(
            file,
            "{}\t{}\t{}",
            Utc::now(),
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            _ = file.flush();
        }
    }
}

/// Install the file-backed sink, creating the file if needed and
/// appending to it otherwise. For the daemonized variant this must
/// happen after detachment, which closes every inherited descriptor.
pub fn init_file_logger<P: AsRef<Path>>(path: P) -> Result<(), LoggingError> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| LoggingError::Open {
            path: path.to_owned(),
            error,
        })?;
    log::set_boxed_logger(Box::new(FileLogger {
        file: Mutex::new(file),
    }))?;
    log::set_max_level(LevelFilter::Info);
    Ok(())
}

/// Install the stderr sink for the supervisor-managed variant. Level
/// defaults to info, overridable through the usual `RUST_LOG`.
pub fn init_stderr_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
