//! Tracing subscriber setup for hosts embedding the generator, plus the event macros the
//! template cache and resolver emit through.

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt::format::FmtSpan, layer::SubscriberExt,
    util::SubscriberInitExt,
};

const ENV_LOG_FORMAT: &str = "ARTIFACT_GEN_LOG_FORMAT";
const ENV_LOG_DIR: &str = "ARTIFACT_GEN_LOG_DIR";
const ENV_LOG_FILTER: &str = "ARTIFACT_GEN_LOG";

/// File name of the log when writing to a directory; rotated files get a date suffix.
pub const LOG_FILE_PREFIX: &str = "artifact-gen.log";

/// Filter used when neither the config nor the environment names one. Tera's own parser
/// events are noisy at debug level.
pub const DEFAULT_FILTER: &str = "info,tera=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => anyhow::bail!("expected \"json\" or \"pretty\", got {other:?}"),
        }
    }
}

/// Where formatted events go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// `LOG_FILE_PREFIX` inside `dir`, created on demand
    Directory { dir: PathBuf, rotation: Rotation },
}

impl fmt::Display for LogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogOutput::Stderr => write!(f, "stderr"),
            LogOutput::Directory { dir, .. } => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub output: LogOutput,
    /// `EnvFilter` directives, e.g. `artifact_gen=debug,tera=warn`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Defaults overlaid by `ARTIFACT_GEN_LOG_FORMAT`, `ARTIFACT_GEN_LOG_DIR` (daily rotated
    /// files) and `ARTIFACT_GEN_LOG`, falling back to `RUST_LOG` for the filter.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(format) = env::var(ENV_LOG_FORMAT) {
            config.format = format
                .parse()
                .with_context(|| format!("invalid {ENV_LOG_FORMAT} value"))?;
        }

        if let Some(dir) = env::var_os(ENV_LOG_DIR).filter(|dir| !dir.is_empty()) {
            config.output = LogOutput::Directory {
                dir: PathBuf::from(dir),
                rotation: Rotation::DAILY,
            };
        }

        if let Ok(filter) = env::var(ENV_LOG_FILTER).or_else(|_| env::var(EnvFilter::DEFAULT_ENV)) {
            config.filter = filter;
        }

        Ok(config)
    }
}

/// Install the global subscriber described by `config`.
///
/// The returned guard flushes the background writer when dropped; hold it for the life of the
/// process. Fails if the filter does not parse, the log directory cannot be created, or a
/// global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("invalid log filter {:?}", config.filter))?;

    let (writer, guard) = match &config.output {
        LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
        LogOutput::Directory { dir, rotation } => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {:?}", dir))?;
            let appender = RollingFileAppender::builder()
                .rotation(rotation.clone())
                .filename_prefix(LOG_FILE_PREFIX)
                .build(dir)
                .with_context(|| format!("failed to open log file in {:?}", dir))?;
            tracing_appender::non_blocking(appender)
        }
    };

    // Task spans carry the state machine; close events show where a task ended.
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(config.output == LogOutput::Stderr)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    tracing::info!(
        format = ?config.format,
        output = %config.output,
        filter = %config.filter,
        "logging initialized"
    );
    Ok(guard)
}

/// Debug event for one template cache lookup; `$outcome` is `"hit"` or `"miss"`.
macro_rules! log_template_lookup {
    ($outcome:literal, $template:expr) => {
        tracing::debug!(template = %$template, lookup = $outcome, "template cache lookup")
    };
}

/// Event for a finished compilation, raised to warn once it exceeds
/// `SLOW_COMPILE_THRESHOLD_MS`.
macro_rules! log_template_compiled {
    ($template:expr, $elapsed:expr $(, $key:ident = $value:expr)* $(,)?) => {{
        let elapsed_ms = $elapsed.as_millis() as u64;
        let threshold_ms = $crate::template::SLOW_COMPILE_THRESHOLD_MS;
        if elapsed_ms > threshold_ms {
            tracing::warn!(
                template = %$template,
                elapsed_ms,
                threshold_ms,
                $($key = $value,)*
                "slow template compilation"
            );
        } else {
            tracing::debug!(template = %$template, elapsed_ms, $($key = $value,)* "template compiled");
        }
    }};
}

pub(crate) use log_template_compiled;
pub(crate) use log_template_lookup;
