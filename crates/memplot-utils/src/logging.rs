//! # Logging Utilities
//!
//! Logging infrastructure for memplot using `tracing`.
//!
//! Two setups are offered:
//! - Console logging on **stderr** (stdout is left to command output), with
//!   an optional copy written to a file
//! - File-only logging, for code running inside a debugger whose terminal
//!   and stdout belong to the debugger's own UI
//!
//! Both return a [`LogGuard`]. Keep it alive for as long as logs should be
//! written; dropping it flushes the file writer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memplot_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=memplot_core=debug`)
//! - `MEMPLOT_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `MEMPLOT_LOG_FILE`: Optional path to a log file written next to the console output
//!
//! ## Examples
//!
//! ```rust,no_run
//! use memplot_utils::{init_logging_to_file, init_logging_with_level, LogFormat, LogLevel};
//!
//! // Explicit level and format on the console
//! let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
//!     .expect("Failed to initialize logging");
//!
//! // Or, inside a debugger: file only
//! let _guard = init_logging_to_file("/tmp/memplot.log", Some(LogLevel::Info))
//!     .expect("Failed to initialize logging");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "MEMPLOT_LOG_FORMAT";

/// Environment variable naming an extra log file
pub const LOG_FILE_ENV: &str = "MEMPLOT_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    Error,
    Warn,
    /// Default
    Info,
    Debug,
    /// Most verbose
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Keeps the background file writer running
///
/// Console-only setups hold nothing; the guard is still returned so callers
/// do not have to care which setup was picked.
#[derive(Debug, Default)]
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard
{
    file: Option<WorkerGuard>,
}

impl LogGuard
{
    /// Whether a log file is being written
    pub fn writes_file(&self) -> bool
    {
        self.file.is_some()
    }
}

/// Initialize console logging from the environment
///
/// Reads:
/// - `RUST_LOG`: Log level filter (e.g., `debug`, `memplot_core=debug`)
/// - `MEMPLOT_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `MEMPLOT_LOG_FILE`: Optional path of a log file written as well
///
/// ## Errors
///
/// Returns an error if:
/// - A global subscriber is already installed
/// - The log file's directory cannot be created
pub fn init_logging() -> Result<LogGuard, LoggingError>
{
    init_logging_with(None, None)
}

/// Initialize console logging with an explicit level and format
///
/// The level wins over `RUST_LOG`. `MEMPLOT_LOG_FILE` is still honoured.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log file's
/// directory cannot be created.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LogGuard, LoggingError>
{
    init_logging_with(Some(level), Some(format))
}

/// Initialize console logging, falling back to the environment for
/// whatever is `None`
///
/// ## Errors
///
/// Same as [`init_logging`].
pub fn init_logging_with(level: Option<LogLevel>, format: Option<LogFormat>) -> Result<LogGuard, LoggingError>
{
    let format = format.unwrap_or_else(|| {
        env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| LogFormat::from_str(&s).ok())
            .unwrap_or_default()
    });
    init_console(format, level.map(Into::into))
}

/// Initialize file-only logging
///
/// Nothing is written to stdout or stderr. Missing parent directories are
/// created. When `level` is `None`, `RUST_LOG` or `INFO` is used.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the directory
/// cannot be created.
pub fn init_logging_to_file(path: impl AsRef<Path>, level: Option<LogLevel>) -> Result<LogGuard, LoggingError>
{
    let (layer, guard) = file_layer(path.as_ref(), LogFormat::Pretty, filter(level.map(Into::into)))?;
    Registry::default()
        .with(layer)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok(LogGuard { file: Some(guard) })
}

/// Dated log file under `~/.memplot`, or the temp dir without a home
///
/// ## Errors
///
/// Returns an error if `~/.memplot` cannot be created.
pub fn default_log_file() -> Result<PathBuf, LoggingError>
{
    let today = Utc::now().format("%Y-%m-%d");
    let dir = match env::var_os("HOME") {
        Some(home) => {
            let dir = PathBuf::from(home).join(".memplot");
            fs::create_dir_all(&dir)?;
            dir
        }
        None => env::temp_dir(),
    };
    Ok(dir.join(format!("{today}-memplot.log")))
}

fn init_console(format: LogFormat, explicit_level: Option<Level>) -> Result<LogGuard, LoggingError>
{
    let console = layer(format, io::stderr, true, filter(explicit_level));

    let mut layers = vec![console];
    let mut guard = None;
    if let Some(path) = env::var_os(LOG_FILE_ENV) {
        let (file, file_guard) = file_layer(Path::new(&path), format, filter(explicit_level))?;
        layers.push(file);
        guard = Some(file_guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok(LogGuard { file: guard })
}

/// Explicit level, then `RUST_LOG`, then `INFO`
fn filter(explicit_level: Option<Level>) -> EnvFilter
{
    match explicit_level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
    }
}

fn file_layer(path: &Path, format: LogFormat, filter: EnvFilter) -> Result<(BoxedLayer, WorkerGuard), LoggingError>
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let Some(name) = path.file_name() else {
        return Err(LoggingError::InvalidPath(path.to_path_buf()));
    };
    fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((layer(format, writer, false, filter), guard))
}

fn layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(ansi)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// The log path has no file name
    #[error("Invalid log file path: {0}")]
    InvalidPath(PathBuf),

    /// A global subscriber is already installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("invalid").is_err());
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_file_layer_rejects_paths_without_name()
    {
        let result = file_layer(Path::new("/"), LogFormat::Pretty, EnvFilter::new("info"));
        assert!(matches!(result, Err(LoggingError::InvalidPath(_))));
    }

    // The only test in this crate that installs the global subscriber.
    #[test]
    fn test_file_only_logging_writes_and_flushes()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("memplot.log");

        let guard = init_logging_to_file(&path, Some(LogLevel::Debug)).unwrap();
        assert!(guard.writes_file());
        tracing::debug!(answer = 42, "file logging works");
        drop(guard);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("file logging works"));
        assert!(contents.contains("answer=42"));
        assert!(init_logging_to_file(&path, None).is_err());
    }
}
