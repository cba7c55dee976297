//! File destinations
//!
//! Helpers that open log files (creating parent directories first) and a
//! registry that remembers every file it opened so they can all be closed
//! with one call at shutdown.
//!
//! Registration is expected to happen during setup. Closing while other
//! threads are still logging is allowed: writes to a closed [`LogFile`]
//! fail, and the logger counts those as handler failures.

use crate::core::{Level, Logger, LoggerError, Result};
use crate::handlers::JsonHandler;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .map_err(|e| LoggerError::io_operation("creating directory", dir.display().to_string(), e)),
        _ => Ok(()),
    }
}

fn open_with(path: &Path, options: &mut OpenOptions, operation: &str) -> Result<File> {
    ensure_parent_dir(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    options
        .open(path)
        .map_err(|e| LoggerError::io_operation(operation, path.display().to_string(), e))
}

/// Open `path` read-write, creating it and its parent directories, truncating existing content
pub fn open_file_truncate(path: impl AsRef<Path>) -> Result<File> {
    open_with(
        path.as_ref(),
        OpenOptions::new().read(true).write(true).create(true).truncate(true),
        "opening (truncate)",
    )
}

/// Open `path` for appending, creating it and its parent directories
pub fn open_file_append(path: impl AsRef<Path>) -> Result<File> {
    open_with(
        path.as_ref(),
        OpenOptions::new().create(true).append(true),
        "opening (append)",
    )
}

/// Shared handle to an open log file
///
/// Clones refer to the same file. After [`LogFile::close`] every clone
/// rejects writes with an error instead of reopening.
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
    file: Arc<Mutex<Option<File>>>,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>, file: File) -> Self {
        Self {
            path: path.into(),
            file: Arc::new(Mutex::new(Some(file))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.lock().is_some()
    }

    /// Flush and release the file; returns false if it was already closed
    pub fn close(&self) -> bool {
        match self.file.lock().take() {
            Some(mut file) => {
                let _ = file.flush();
                true
            }
            None => false,
        }
    }

    /// Flush file contents to disk
    pub fn sync(&self) -> Result<()> {
        match self.file.lock().as_ref() {
            Some(file) => file
                .sync_all()
                .map_err(|e| LoggerError::io_operation("syncing", self.path.display().to_string(), e)),
            None => Ok(()),
        }
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.lock().as_mut() {
            Some(file) => file.write(buf),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "log file closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Files opened for logging, closed together by [`FileRegistry::close_all`]
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: Mutex<Vec<LogFile>>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, file: LogFile) {
        self.files.lock().push(file);
    }

    /// Open with truncation and register the handle
    pub fn open_truncate(&self, path: impl AsRef<Path>) -> Result<LogFile> {
        let path = path.as_ref();
        let file = LogFile::new(path, open_file_truncate(path)?);
        self.register(file.clone());
        Ok(file)
    }

    /// Open for appending and register the handle
    pub fn open_append(&self, path: impl AsRef<Path>) -> Result<LogFile> {
        let path = path.as_ref();
        let file = LogFile::new(path, open_file_append(path)?);
        self.register(file.clone());
        Ok(file)
    }

    /// Point `logger`'s only output at a freshly truncated file
    pub fn set_output_file(&self, logger: &Logger, path: impl AsRef<Path>) -> Result<LogFile> {
        let file = self.open_truncate(path)?;
        logger.set_output(file.clone());
        Ok(file)
    }

    /// Add a text output at `min_level` writing to a freshly truncated file
    pub fn add_file_writer(
        &self,
        logger: &Logger,
        min_level: Level,
        path: impl AsRef<Path>,
    ) -> Result<LogFile> {
        let file = self.open_truncate(path)?;
        logger.add_writer(min_level, file.clone());
        Ok(file)
    }

    /// Add a JSON-lines output at `min_level` writing to a freshly truncated file
    pub fn add_json_file(
        &self,
        logger: &Logger,
        min_level: Level,
        path: impl AsRef<Path>,
    ) -> Result<LogFile> {
        let file = self.open_truncate(path)?;
        logger.add_handler(min_level, JsonHandler::new(file.clone()));
        Ok(file)
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }

    /// Close every registered file and empty the registry
    ///
    /// Best-effort: each file is flushed and released regardless of what
    /// happened to the others. Returns how many were still open.
    pub fn close_all(&self) -> usize {
        let files = std::mem::take(&mut *self.files.lock());
        files.iter().filter(|file| file.close()).count()
    }
}

/// Process-wide registry used by the default-logger file helpers
pub fn file_registry() -> &'static FileRegistry {
    static REGISTRY: OnceLock<FileRegistry> = OnceLock::new();
    REGISTRY.get_or_init(FileRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Flags;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("a/b/c.log");

        let mut file = open_file_truncate(&path).unwrap();
        file.write_all(b"first\n").unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");

        let mut file = open_file_append(&path).unwrap();
        file.write_all(b"second\n").unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");

        let file = open_file_truncate(&path).unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_open_failure_carries_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let err = open_file_append(blocker.join("child.log")).unwrap_err();
        match err {
            LoggerError::IoOperation { path, .. } => assert!(path.contains("file")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registry_close_all_is_best_effort() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let registry = FileRegistry::new();
        let first = registry.open_truncate(temp_dir.path().join("1.log")).unwrap();
        let second = registry.open_append(temp_dir.path().join("2.log")).unwrap();
        assert_eq!(registry.len(), 2);

        assert!(second.close());
        assert_eq!(registry.close_all(), 1);
        assert!(!first.is_open());
        assert!(registry.is_empty());
        assert_eq!(registry.close_all(), 0);
    }

    #[test]
    fn test_logger_file_outputs() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let registry = FileRegistry::new();
        let logger = Logger::new(io::sink(), "", Flags::empty());

        let text = temp_dir.path().join("logs/all.log");
        let json = temp_dir.path().join("logs/errors.json");
        registry.set_output_file(&logger, &text).unwrap();
        registry.add_json_file(&logger, Level::ERROR, &json).unwrap();
        assert_eq!(logger.output_count(), 2);

        logger.info("hello");
        logger.error("bad");
        registry.close_all();

        assert_eq!(fs::read_to_string(&text).unwrap(), "INFO     hello\nERROR    bad\n");
        let json_out = fs::read_to_string(&json).unwrap();
        assert_eq!(json_out, "{\"time\":\"\",\"level\":\"ERROR\",\"msg\":\"bad\"}\n");
    }

    #[test]
    fn test_write_after_close_is_counted_not_raised() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let registry = FileRegistry::new();
        let logger = Logger::builder().flags(Flags::empty()).no_default_output().build();
        registry
            .add_file_writer(&logger, Level::ALL, temp_dir.path().join("x.log"))
            .unwrap();

        registry.close_all();
        logger.info("after close");
        assert_eq!(logger.metrics().handler_failures(), 1);
    }
}
