//! Rolling File Logger
//!
//! Writes one log file per day (`<app>-YYYY-MM-DD.log`), prunes old files
//! beyond a retention count and keeps the most recent lines in memory so a
//! diagnostics view can show them without touching the disk.
//!
//! `log` records are forwarded through `tracing-subscriber`, so crates that
//! only use the `log` macros end up in the same file.

use chrono::{Local, NaiveDate};
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_BUFFER_LINES: usize = 500;
const DEFAULT_RETENTION_FILES: usize = 7;

/// Logger tuning knobs
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub max_level: log::LevelFilter,
    /// Lines kept in the in-memory ring buffer
    pub buffer_lines: usize,
    /// Daily files kept on disk (older ones are deleted)
    pub retention_files: usize,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_level: log::LevelFilter::Info,
            buffer_lines: DEFAULT_BUFFER_LINES,
            retention_files: DEFAULT_RETENTION_FILES,
        }
    }
}

struct FileState {
    date: Option<NaiveDate>,
    file: Option<File>,
}

struct Shared {
    dir: PathBuf,
    prefix: String,
    retention_files: usize,
    capacity: usize,
    file: Mutex<FileState>,
    lines: Mutex<VecDeque<String>>,
}

/// Writer handed to the fmt subscriber. Cheap to clone.
#[derive(Clone)]
pub struct RollingWriter {
    shared: Arc<Shared>,
}

impl RollingWriter {
    pub fn new(dir: impl Into<PathBuf>, app_name: &str, options: &LoggerOptions) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            shared: Arc::new(Shared {
                dir,
                prefix: app_name.to_string(),
                retention_files: options.retention_files.max(1),
                capacity: options.buffer_lines.max(1),
                file: Mutex::new(FileState { date: None, file: None }),
                lines: Mutex::new(VecDeque::new()),
            }),
        })
    }

    /// Path of the log file for a given day
    pub fn file_for(&self, date: NaiveDate) -> PathBuf {
        self.shared
            .dir
            .join(format!("{}-{}.log", self.shared.prefix, date.format("%Y-%m-%d")))
    }

    /// Snapshot of the ring buffer, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        match self.shared.lines.lock() {
            Ok(lines) => lines.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn append(&self, buf: &[u8], today: NaiveDate) -> io::Result<()> {
        {
            let mut state = self
                .shared
                .file
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;

            if state.date != Some(today) || state.file.is_none() {
                let path = self.file_for(today);
                state.file = Some(OpenOptions::new().create(true).append(true).open(&path)?);
                state.date = Some(today);
                self.prune()?;
            }

            if let Some(file) = state.file.as_mut() {
                file.write_all(buf)?;
            }
        }

        self.remember(buf);
        Ok(())
    }

    fn remember(&self, buf: &[u8]) {
        let text = String::from_utf8_lossy(buf);
        if let Ok(mut lines) = self.shared.lines.lock() {
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                if lines.len() == self.shared.capacity {
                    lines.pop_front();
                }
                lines.push_back(line.to_string());
            }
        }
    }

    /// Delete the oldest daily files beyond the retention count.
    fn prune(&self) -> io::Result<()> {
        let prefix = format!("{}-", self.shared.prefix);
        let mut logs: Vec<PathBuf> = fs::read_dir(&self.shared.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&prefix) && n.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Date-stamped names sort chronologically
        logs.sort();

        if logs.len() > self.shared.retention_files {
            let excess = logs.len() - self.shared.retention_files;
            for path in logs.drain(..excess) {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf, Local::now().date_naive())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .shared
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        match state.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

/// Initialize the global logger with default options
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, LoggerOptions::default())
}

/// Initialize the global logger. Fails if called twice.
pub fn init_logger_with(log_dir: PathBuf, app_name: &str, options: LoggerOptions) -> Result<(), String> {
    let writer = RollingWriter::new(log_dir, app_name, &options)
        .map_err(|e| format!("Failed to open log dir: {}", e))?;

    if LOGGER.set(writer.clone()).is_err() {
        return Err("Logger already initialized".to_string());
    }

    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(options.max_level)
                .with_tag(app_name),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_max_level(to_tracing_level(options.max_level))
            .try_init()
            .map_err(|e| format!("Failed to install subscriber: {}", e))?;
    }

    log::set_max_level(options.max_level);
    Ok(())
}

fn to_tracing_level(level: log::LevelFilter) -> LevelFilter {
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

fn ensure_init() -> Result<(), String> {
    if LOGGER.get().is_some() {
        Ok(())
    } else {
        Err("Logger not initialized".to_string())
    }
}

pub fn info(message: &str) -> Result<(), String> {
    ensure_init()?;
    tracing::info!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), String> {
    ensure_init()?;
    tracing::error!("{}", message);
    Ok(())
}

/// Recent lines from the global logger (empty before init)
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(|w| w.recent_lines()).unwrap_or_default()
}
