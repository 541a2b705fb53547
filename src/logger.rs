// File-based logger, grounded on the teacher's `logic::logger` module:
// writes dated log files and exposes a char-boundary-safe preview helper
// used throughout the scanners for debug tracing.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};

pub struct SimpleFileLogger {
    inner: Mutex<Option<File>>,
    base_dir: PathBuf,
    level: LevelFilter,
}

impl SimpleFileLogger {
    pub fn new(base_dir: impl Into<PathBuf>, level: LevelFilter) -> Self {
        Self {
            inner: Mutex::new(None),
            base_dir: base_dir.into(),
            level,
        }
    }

    fn open_today(&self) -> Result<File> {
        let now = Local::now();
        let month_dir = self.base_dir.join(now.format("%Y%m").to_string());
        fs::create_dir_all(&month_dir)
            .with_context(|| format!("creating log directory {}", month_dir.display()))?;
        let path = month_dir.join(format!("{}.log", now.format("%y%m%d")));
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))
    }
}

impl Log for SimpleFileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if guard.is_none() {
            match self.open_today() {
                Ok(file) => *guard = Some(file),
                Err(err) => {
                    eprintln!("blocktree logger: failed to open log file: {err:#}");
                    return;
                }
            }
        }
        if let Some(file) = guard.as_mut() {
            let message = safe_preview(&record.args().to_string(), 4096);
            let _ = writeln!(
                file,
                "{} [{}] {}: {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                message
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

pub fn init_file_logger(base_dir: impl AsRef<Path>, level: LevelFilter) -> Result<()> {
    let logger = Box::new(SimpleFileLogger::new(base_dir.as_ref().to_path_buf(), level));
    log::set_boxed_logger(logger)
        .map(|()| log::set_max_level(level))
        .context("installing file logger")
}

pub fn shutdown_file_logger() {
    log::logger().flush();
}

/// Truncate `s` to at most `max_chars` characters without splitting a
/// multi-byte UTF-8 sequence, appending an ellipsis marker if truncated.
pub fn safe_preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut preview: String = s.chars().take(max_chars).collect();
    preview.push('\u{2026}');
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_preview_short_string_unchanged() {
        assert_eq!(safe_preview("hello", 10), "hello");
    }

    #[test]
    fn smoke_test_preview_truncates_on_char_boundary() {
        let input = "h\u{e9}llo world";
        let preview = safe_preview(input, 3);
        assert_eq!(preview, "h\u{e9}l\u{2026}");
    }
}
