//! File logging for the roster store.
//!
//! # Invariants
//! - At most one logger per process; a second init must match the first.
//! - Log lines carry ids and counts only; filter values are never logged.

use crate::config::CoreConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "rosterdb";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static ACTIVE_LOGGER: OnceCell<(LogTarget, LoggerHandle)> = OnceCell::new();

/// Level and directory of a rolling file logger.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: LevelFilter,
    dir: PathBuf,
}

impl LogTarget {
    fn new(level: &str, dir: &Path) -> Result<Self, String> {
        let level = level
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| format!("unsupported log level `{}`", level.trim()))?;
        if !dir.is_absolute() {
            return Err(format!("log_dir must be absolute, got `{}`", dir.display()));
        }
        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Starts rolling file logging under `config.log_dir`.
///
/// Returns `Ok(false)` when `log_dir` is unset and logging stays off.
///
/// # Errors
/// - Unknown level or relative directory.
/// - Backend start failure.
/// - A logger with a different level or directory is already running.
pub fn init_logging_from_config(config: &CoreConfig) -> Result<bool, String> {
    let Some(dir) = config.log_dir.as_deref() else {
        return Ok(false);
    };
    let target = LogTarget::new(&config.log_level, dir)?;

    let (active, _) = ACTIVE_LOGGER.get_or_try_init(|| start(&target))?;
    if *active != target {
        return Err(format!(
            "logging already running at {} in `{}`; refusing {} in `{}`",
            active.level,
            active.dir.display(),
            target.level,
            target.dir.display()
        ));
    }
    Ok(true)
}

fn start(target: &LogTarget) -> Result<(LogTarget, LoggerHandle), String> {
    std::fs::create_dir_all(&target.dir)
        .map_err(|err| format!("cannot create `{}`: {err}", target.dir.display()))?;

    let handle = Logger::with(LogSpecification::builder().default(target.level).build())
        .log_to_file(
            FileSpec::default()
                .directory(&target.dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=logging_start module=core status=ok version={} level={}",
        env!("CARGO_PKG_VERSION"),
        target.level
    );
    Ok((target.clone(), handle))
}
