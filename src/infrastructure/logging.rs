//! Logging system configuration and initialization
//!
//! Console and file outputs are independent layers over one registry.
//! `RUST_LOG` overrides the configured level and module filters entirely.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use once_cell::sync::Lazy;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, time::FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub use crate::infrastructure::config::LoggingConfig;
use crate::infrastructure::config::defaults;

/// Dependency targets that flood the output below `trace`
const NOISY_TARGETS: &[(&str, &str)] = &[
    ("reqwest", "warn"),
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("h2", "warn"),
    ("cookie_store", "warn"),
    ("html5ever", "warn"),
    ("selectors", "warn"),
];

// Keeps the non-blocking file writer alive for the whole process
static LOG_GUARDS: Lazy<Mutex<Vec<WorkerGuard>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Timestamps in a fixed UTC offset
#[derive(Debug, Clone, Copy)]
struct OffsetTime {
    offset: FixedOffset,
}

impl OffsetTime {
    fn from_hours(hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours.saturating_mul(3600)).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }
}

impl FormatTime for OffsetTime {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Utc::now().with_timezone(&self.offset);
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Directory for log files when the config does not name one
pub fn get_log_directory(config: &LoggingConfig) -> PathBuf {
    config.log_dir.clone().unwrap_or_else(|| {
        dirs::data_local_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
            .join(defaults::APP_DIR_NAME)
            .join("logs")
    })
}

/// Build the level filter for a logging configuration.
///
/// Returns the filter plus the module filters that could not be parsed.
pub fn build_env_filter(config: &LoggingConfig) -> (EnvFilter, Vec<String>) {
    let mut rejected = Vec::new();
    let mut filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| {
        rejected.push(format!("level={}", config.level));
        EnvFilter::new(defaults::LOG_LEVEL)
    });

    let verbose = config.level.to_lowercase().contains("trace");
    let clamps = NOISY_TARGETS.iter().filter(|_| !verbose).map(|(target, level)| format!("{target}={level}"));
    // Our own target follows the configured level unless a module filter names it
    let own = config
        .level
        .parse::<LevelFilter>()
        .ok()
        .map(|level| format!("{}={level}", env!("CARGO_CRATE_NAME")));
    let modules = config.module_filters.iter().map(|(target, level)| format!("{target}={level}"));

    for directive in clamps.chain(own).chain(modules) {
        match directive.parse() {
            Ok(parsed) => filter = filter.add_directive(parsed),
            Err(_) => rejected.push(directive),
        }
    }

    (filter, rejected)
}

/// Initialize logging with custom configuration
///
/// Outputs:
/// - console: human readable (or JSON) lines on stderr, so stdout stays free
///   for command output
/// - file: daily rolling file through a non-blocking writer
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let (env_filter, rejected) = match EnvFilter::try_from_default_env() {
        Ok(from_env) => (from_env, Vec::new()),
        Err(_) => build_env_filter(config),
    };

    let timer = OffsetTime::from_hours(config.utc_offset_hours);
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let log_dir = get_log_directory(config);
    if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let file_appender = rolling::daily(&log_dir, defaults::LOG_FILE_PREFIX);
        let (file_writer, file_guard) = non_blocking(file_appender);
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);

        let file_layer = fmt::layer().with_writer(file_writer).with_timer(timer).with_ansi(false);
        layers.push(if config.json_format {
            file_layer
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed()
        } else {
            file_layer.with_target(false).boxed()
        });
    }

    if config.console_output {
        let console_layer = fmt::layer().with_writer(std::io::stderr).with_timer(timer);
        layers.push(if config.json_format {
            console_layer.json().with_target(true).boxed()
        } else {
            console_layer.with_target(false).boxed()
        });
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Global logger already initialized")?;

    for directive in rejected {
        warn!("Ignored invalid log filter: {}", directive);
    }

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    info!("JSON format: {}", config.json_format);
    info!("Console output: {}", config.console_output);
    info!("File output: {}", config.file_output);
    if config.file_output {
        info!("Log directory: {:?}", log_dir);
    }

    Ok(())
}
