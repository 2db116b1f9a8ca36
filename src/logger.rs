//! Console logging plus an opt-in rotating log file.
//!
//! The opt-in survives restarts through a one-line state file next to the
//! settings database, so a relaunched process keeps logging to the same file.

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tklog::{Format, LEVEL, LOG};

const LOG_FILE_ENV: &str = "LAUNCHER_PREFS_LOG_FILE";
const LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const LOG_ROTATE_KEEP: u32 = 5;

struct LogPaths {
    log_file: PathBuf,
    opt_in: PathBuf,
}

static PATHS: OnceLock<LogPaths> = OnceLock::new();
static FILE_LOGGING: AtomicBool = AtomicBool::new(false);
static CUTMODE_INSTALLED: AtomicBool = AtomicBool::new(false);

fn paths() -> &'static LogPaths {
    PATHS.get_or_init(|| {
        let data_dir = crate::config::data_dir();
        let log_file = std::env::var_os(LOG_FILE_ENV)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs").join("settings.log"));
        LogPaths {
            log_file,
            opt_in: data_dir.join("logging_enabled"),
        }
    })
}

fn parse_logging_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn write_opt_in(path: &Path, enabled: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, if enabled { "1" } else { "0" })
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn log_file_path() -> &'static Path {
    &paths().log_file
}

pub fn file_logging_enabled() -> bool {
    FILE_LOGGING.load(Ordering::Relaxed)
}

/// Routes tklog output into the rotating file and remembers the opt-in.
pub fn enable_file_logging() -> Result<()> {
    if file_logging_enabled() {
        return Ok(());
    }

    let paths = paths();
    if let Some(parent) = paths.log_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log dir {}", parent.display()))?;
    }

    if !CUTMODE_INSTALLED.swap(true, Ordering::Relaxed) {
        let log_file = paths.log_file.to_string_lossy();
        LOG.set_cutmode_by_size(&log_file, LOG_ROTATE_SIZE, LOG_ROTATE_KEEP, true);
    }

    FILE_LOGGING.store(true, Ordering::Relaxed);
    write_opt_in(&paths.opt_in, true)
}

pub fn disable_file_logging() -> Result<()> {
    FILE_LOGGING.store(false, Ordering::Relaxed);
    write_opt_in(&paths().opt_in, false)
}

pub fn initialize() {
    LOG.set_level(LEVEL::Debug)
        .set_console(true)
        .set_format(Format::LevelFlag | Format::Date | Format::Time | Format::ShortFileName)
        .set_formatter("{level}{time} {file}:{message}\n");

    let opted_in = fs::read_to_string(&paths().opt_in)
        .map(|raw| parse_logging_flag(&raw))
        .unwrap_or(false);
    if opted_in && let Err(err) = enable_file_logging() {
        eprintln!("[log] file logging stays off: {err:#}");
    }
}

#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        if $crate::logger::file_logging_enabled() {
            tklog::debug!(format!($($arg)*));
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_flag_accepts_common_truthy_spellings() {
        assert!(parse_logging_flag("1"));
        assert!(parse_logging_flag(" On \n"));
        assert!(parse_logging_flag("TRUE"));
        assert!(!parse_logging_flag("0"));
        assert!(!parse_logging_flag(""));
        assert!(!parse_logging_flag("enabled"));
    }

    #[test]
    fn opt_in_file_is_created_with_its_directory() {
        let dir = std::env::temp_dir().join(format!("launcher-prefs-log-{}", std::process::id()));
        let path = dir.join("nested").join("logging_enabled");
        write_opt_in(&path, true).unwrap();
        assert!(parse_logging_flag(&fs::read_to_string(&path).unwrap()));
        write_opt_in(&path, false).unwrap();
        assert!(!parse_logging_flag(&fs::read_to_string(&path).unwrap()));
        let _ = fs::remove_dir_all(dir);
    }
}
