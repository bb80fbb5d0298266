//! Log of a single batch render.
//!
//! Every line goes to `tracing`. Lines at or above the configured level are
//! also appended to `batch_<timestamp>.log` (when a log folder is given) and
//! passed to the optional GUI callback.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{GuiLogCallback, LogConfig, LogLevel, MessagePrefix};

pub struct BatchLogger {
    log_path: Option<PathBuf>,
    file: Mutex<Option<BufWriter<File>>>,
    callback: Option<GuiLogCallback>,
    config: LogConfig,
}

impl BatchLogger {
    /// Open a new log file in `log_dir`, creating the folder if needed.
    pub fn new(
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<GuiLogCallback>,
    ) -> std::io::Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let started = Local::now();
        let log_path = log_dir.join(format!("batch_{}.log", started.format("%Y%m%d_%H%M%S")));
        let mut writer = BufWriter::new(File::create(&log_path)?);
        writeln!(
            writer,
            "# EasySynth batch started {}",
            started.format("%Y-%m-%d %H:%M:%S")
        )?;

        Ok(Self {
            log_path: Some(log_path),
            file: Mutex::new(Some(writer)),
            callback,
            config,
        })
    }

    /// Logger without a file; lines only reach `tracing` and the callback.
    pub fn without_file(config: LogConfig, callback: Option<GuiLogCallback>) -> Self {
        Self {
            log_path: None,
            file: Mutex::new(None),
            callback,
            config,
        }
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "easysynth::batch", "{}", message),
            LogLevel::Debug => tracing::debug!(target: "easysynth::batch", "{}", message),
            LogLevel::Info => tracing::info!(target: "easysynth::batch", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "easysynth::batch", "{}", message),
            LogLevel::Error => tracing::error!(target: "easysynth::batch", "{}", message),
        }

        if level < self.config.level {
            return;
        }

        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };

        if let Some(writer) = self.file.lock().as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
        if let Some(callback) = &self.callback {
            callback(&line);
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// Header line for a sequence about to render.
    pub fn sequence(&self, name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Sequence.format(name));
    }

    pub fn done(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Done.format(message));
    }

    pub fn flush(&self) {
        if let Some(writer) = self.file.lock().as_mut() {
            let _ = writer.flush();
        }
    }

    /// Flush and close the file. Later lines only reach the callback.
    pub fn close(&self) {
        if let Some(mut writer) = self.file.lock().take() {
            let _ = writer.flush();
        }
    }
}

impl Drop for BatchLogger {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for BatchLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLogger")
            .field("log_path", &self.log_path)
            .field("config", &self.config)
            .finish()
    }
}
