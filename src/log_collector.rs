//! Decoupled logging pipeline for module operations.
//!
//! Every `log::*` record is pushed onto an unbounded channel and written to
//! disk by a dedicated thread, so callers never block on file I/O.
//!
//! ```text
//! log::info!() ... ──> [LogCollector] ──(crossbeam channel)──> [disk writer thread]
//!                                                                   |
//!                                                        <log_dir>/kmod_<ts>.log
//! ```

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Internal log line or special marker
enum LogMessage {
    Line(LogLine),
    /// Flush marker with channel sender to signal completion
    Flush(std::sync::mpsc::Sender<()>),
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub message: String,
    /// Record level, e.g. "INFO"
    pub level: String,
    /// Local time the line was created
    pub timestamp: String,
}

impl LogLine {
    pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
        LogLine {
            message: message.into(),
            level: level.into(),
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    fn format(&self) -> String {
        format!("[{}] [{}] {}\n", self.timestamp, self.level, self.message)
    }
}

/// Logger that hands records to a background disk writer
#[derive(Clone)]
pub struct LogCollector {
    /// Channel sender for log lines - crossbeam unbounded so sends never block
    tx: Sender<LogMessage>,
    log_path: PathBuf,
    max_level: LevelFilter,
}

impl LogCollector {
    /// Create the log directory and file, and start the writer thread.
    pub fn new(log_dir: &Path, max_level: LevelFilter) -> Result<Self, String> {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| format!("Failed to create log dir {}: {}", log_dir.display(), e))?;

        let log_path = log_dir.join(format!("kmod_{}.log", Local::now().format("%Y%m%d_%H%M%S")));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| format!("Failed to open log file {}: {}", log_path.display(), e))?;

        let (tx, rx) = unbounded::<LogMessage>();
        std::thread::spawn(move || run_writer(file, rx));

        Ok(LogCollector {
            tx,
            log_path,
            max_level,
        })
    }

    /// File this collector writes to
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Send a log line (non-blocking)
    pub fn send(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    /// Wait for all pending logs to be written to disk
    ///
    /// Sends a flush marker down the channel and blocks until the writer
    /// thread has processed everything queued before it.
    pub fn wait_for_empty(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        rx.recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }
}

fn run_writer(mut file: File, rx: crossbeam_channel::Receiver<LogMessage>) {
    while let Ok(msg) = rx.recv() {
        match msg {
            LogMessage::Line(line) => {
                let _ = file.write_all(line.format().as_bytes());
            }
            LogMessage::Flush(done) => {
                let _ = file.flush();
                let _ = file.sync_data();
                let _ = done.send(());
            }
        }
    }
}

/// Implementation of the `log` crate's Log trait
impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.send(LogLine::new(record.level().to_string(), record.args().to_string()));
        }
    }

    fn flush(&self) {
        let _ = self.wait_for_empty();
    }
}

/// Register a `LogCollector` writing under `log_dir` as the global logger.
///
/// Returns the collector so callers can flush it before exiting.
pub fn init_logging(log_dir: &Path, max_level: LevelFilter) -> Result<LogCollector, String> {
    let collector = LogCollector::new(log_dir, max_level)?;
    log::set_boxed_logger(Box::new(collector.clone()))
        .map(|()| log::set_max_level(max_level))
        .map_err(|e| format!("Failed to set global logger: {}", e))?;
    log::info!("kmod_manager logging initialized");
    Ok(collector)
}
