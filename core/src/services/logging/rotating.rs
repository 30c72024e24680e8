//! Size-rotating audit log writer.

use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use hl_shared::config::LoggingConfig;
use hl_shared::types::LogLevel;
use parking_lot::Mutex;

use crate::errors::LoggingError;
use crate::services::clock::Clock;

/// Upper bound on name collisions tried when opening a rotation file
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Formats one entry: `<ISO-8601 timestamp> [<LEVEL>] <message>\n`
pub fn format_entry(at: DateTime<Utc>, level: LogLevel, message: &str) -> String {
    format!(
        "{} [{}] {}\n",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        message
    )
}

// =============================================================================
// Log File
// =============================================================================

/// The current append target. Only ever touched under the logger's lock.
struct LogFile {
    path: PathBuf,
    writer: LineWriter<File>,
    bytes_written: u64,
}

impl LogFile {
    /// Opens a fresh file in `folder` named after `at`.
    ///
    /// Names are ISO-8601 basic-format timestamps with microseconds. If the
    /// name is taken (two rotations within the same microsecond, or a clock
    /// that stands still) the timestamp is nudged forward one microsecond at
    /// a time, so names stay unique and sort in creation order.
    fn open(folder: &Path, at: DateTime<Utc>) -> Result<Self, LoggingError> {
        let mut stamp = at;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = folder.join(Self::file_name(stamp));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    return Ok(Self {
                        path,
                        writer: LineWriter::new(file),
                        bytes_written: 0,
                    })
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    stamp = stamp + Duration::microseconds(1);
                }
                Err(source) => return Err(LoggingError::FileOpen { path, source }),
            }
        }

        Err(LoggingError::FileOpen {
            path: folder.join(Self::file_name(at)),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "too many log files with the same timestamp"),
        })
    }

    fn file_name(at: DateTime<Utc>) -> String {
        format!("{}.log", at.format("%Y%m%dT%H%M%S%.6fZ"))
    }

    fn append(&mut self, bytes: &[u8]) -> Result<(), LoggingError> {
        self.writer
            .write_all(bytes)
            .map_err(|source| LoggingError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LoggingError> {
        self.writer.flush().map_err(|source| LoggingError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

// =============================================================================
// Rotating Logger
// =============================================================================

/// Level-filtered, size-rotated audit logger.
///
/// One instance is built at startup and shared through `Arc` by everything
/// that audits. Appending an entry, counting its bytes and the rotation
/// check-and-swap all happen under a single lock acquisition, so concurrent
/// writers can neither rotate twice nor skip a rotation.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use hl_core::services::{clock::SystemClock, logging::{LogLevel, RotatingLogger}};
/// use hl_shared::config::LoggingConfig;
///
/// let logger = RotatingLogger::new(LoggingConfig::new("logs"), Arc::new(SystemClock))?;
/// logger.log_message("service started", LogLevel::Info);
/// ```
pub struct RotatingLogger {
    min_level: LogLevel,
    folder: PathBuf,
    max_file_size: u64,
    console: bool,
    clock: Arc<dyn Clock>,
    /// `None` only between a failed rotation and the next successful open
    current: Mutex<Option<LogFile>>,
    total_bytes_written: AtomicU64,
    files_opened: AtomicU64,
}

impl RotatingLogger {
    /// Creates the log folder (recursively) and opens the first file.
    ///
    /// Fails with [`LoggingError::FolderCreation`] when the folder cannot be
    /// created; callers treat that as fatal.
    pub fn new(config: LoggingConfig, clock: Arc<dyn Clock>) -> Result<Self, LoggingError> {
        fs::create_dir_all(&config.folder).map_err(|source| LoggingError::FolderCreation {
            path: config.folder.clone(),
            source,
        })?;

        let first = LogFile::open(&config.folder, clock.now())?;
        tracing::debug!(path = %first.path.display(), "Opened audit log file");

        Ok(Self {
            min_level: config.level,
            folder: config.folder,
            max_file_size: config.max_file_size,
            console: config.console,
            clock,
            current: Mutex::new(Some(first)),
            total_bytes_written: AtomicU64::new(0),
            files_opened: AtomicU64::new(1),
        })
    }

    /// Appends `message` at `level` if it passes the configured minimum.
    ///
    /// Write failures never propagate: they are reported on the operational
    /// error channel and the caller carries on.
    pub fn log_message(&self, message: &str, level: LogLevel) {
        if !self.min_level.allows(level) {
            return;
        }

        let entry = format_entry(self.clock.now(), level, message);
        if let Err(e) = self.append(&entry) {
            tracing::error!(error = %e, "Failed to write audit log entry");
        }

        if self.console {
            mirror_to_console(level, message);
        }
    }

    pub fn debug(&self, message: &str) {
        self.log_message(message, LogLevel::Debug);
    }

    pub fn info(&self, message: &str) {
        self.log_message(message, LogLevel::Info);
    }

    pub fn warn(&self, message: &str) {
        self.log_message(message, LogLevel::Warn);
    }

    pub fn error(&self, message: &str) {
        self.log_message(message, LogLevel::Error);
    }

    /// Writes one formatted entry, rotating around it as the ceiling requires.
    ///
    /// A non-empty file that cannot take the whole entry is rotated first, so
    /// only an entry larger than the ceiling ever pushes a file past it. A
    /// file that reaches the ceiling is rotated right after the write.
    fn append(&self, entry: &str) -> Result<(), LoggingError> {
        let len = entry.len() as u64;
        let mut slot = self.current.lock();

        let overflows = slot.as_ref().map_or(false, |file| {
            file.bytes_written > 0 && file.bytes_written + len > self.max_file_size
        });
        if overflows {
            self.rotate(&mut slot)?;
        }

        // Empty after a failed rotation; retry the open here
        let file = match slot.take() {
            Some(file) => file,
            None => self.open_next()?,
        };
        let current = slot.insert(file);

        current.append(entry.as_bytes())?;
        self.total_bytes_written.fetch_add(len, Ordering::Relaxed);

        if current.bytes_written >= self.max_file_size {
            self.rotate(&mut slot)?;
        }

        Ok(())
    }

    /// Flushes and closes the current file, then opens the next one.
    /// Caller holds the lock.
    fn rotate(&self, slot: &mut Option<LogFile>) -> Result<(), LoggingError> {
        if let Some(mut previous) = slot.take() {
            let flushed = previous.flush();
            drop(previous);
            flushed?;
        }

        *slot = Some(self.open_next()?);
        tracing::debug!("Rotated audit log file (size limit)");

        Ok(())
    }

    fn open_next(&self) -> Result<LogFile, LoggingError> {
        let file = LogFile::open(&self.folder, self.clock.now())?;
        self.files_opened.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(path = %file.path.display(), "Opened audit log file");
        Ok(file)
    }

    /// Flushes buffered bytes of the current file
    pub fn flush(&self) -> Result<(), LoggingError> {
        match self.current.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Flushes the current file before the process exits
    pub fn shutdown(&self) {
        match self.flush() {
            Ok(()) => tracing::info!(
                total_bytes = self.total_bytes_written(),
                files = self.files_opened(),
                "Audit log closed"
            ),
            Err(e) => tracing::error!(error = %e, "Failed to flush audit log on shutdown"),
        }
    }

    /// Path of the file currently being appended to, if one is open
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current.lock().as_ref().map(|file| file.path.clone())
    }

    /// Bytes appended to the current file
    pub fn current_file_size(&self) -> u64 {
        self.current.lock().as_ref().map_or(0, |file| file.bytes_written)
    }

    /// Bytes appended across all files since startup
    pub fn total_bytes_written(&self) -> u64 {
        self.total_bytes_written.load(Ordering::Relaxed)
    }

    /// Files opened since startup, including the first one
    pub fn files_opened(&self) -> u64 {
        self.files_opened.load(Ordering::Relaxed)
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl Drop for RotatingLogger {
    fn drop(&mut self) {
        if let Some(file) = self.current.get_mut().as_mut() {
            let _ = file.flush();
        }
    }
}

impl std::fmt::Debug for RotatingLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingLogger")
            .field("folder", &self.folder)
            .field("min_level", &self.min_level)
            .field("max_file_size", &self.max_file_size)
            .field("total_bytes_written", &self.total_bytes_written())
            .field("files_opened", &self.files_opened())
            .finish()
    }
}

fn mirror_to_console(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => tracing::debug!(target: "audit", "{}", message),
        LogLevel::Info => tracing::info!(target: "audit", "{}", message),
        LogLevel::Warn => tracing::warn!(target: "audit", "{}", message),
        LogLevel::Error => tracing::error!(target: "audit", "{}", message),
    }
}
