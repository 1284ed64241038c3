//! Log subscriber setup.
//!
//! The runtime installs one subscriber per process from [`LoggingConfig`]:
//!
//! - the filter starts from `RUST_LOG` when it is set, otherwise from
//!   `logging.level` with the socket and HTTP stacks held at `warn`;
//! - enabling any `span_events` also lowers the dispatcher and executor to
//!   `debug`, since their `dispatch` and `action` spans live at that level;
//! - `[logging.filters]` is applied last and wins over both.
//!
//! File output runs through a non-blocking writer. Keep the returned
//! [`LogGuard`] alive for as long as lines should reach the file.

use std::path::Path;

use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

/// Held at `warn` unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: &[&str] = &["tungstenite", "tokio_tungstenite", "reqwest", "hyper_util"];

/// Modules whose spans are only visible at `debug`.
const SPAN_TARGETS: &[&str] = &[
    "ferrite_core::framework::dispatcher",
    "ferrite_core::integration::executor",
];

const DEFAULT_LOG_FILE: &str = "ferrite.log";

/// Flushes buffered file output when dropped.
#[derive(Debug, Default)]
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Installs the subscriber, ignoring a second installation.
pub fn init_from_config(config: &LoggingConfig) -> LogGuard {
    try_init(config).unwrap_or_default()
}

/// Installs the subscriber described by `config`.
pub fn try_init(config: &LoggingConfig) -> Result<LogGuard, TryInitError> {
    let (writer, worker, missing_path) = make_writer(config);
    let layer = fmt_layer(config, writer);

    tracing_subscriber::registry()
        .with(layer)
        .with(build_filter(config, env_filter_set()))
        .try_init()?;

    if missing_path {
        warn!("File output requested without logging.file_path, writing to stdout");
    }
    Ok(LogGuard { _worker: worker })
}

fn env_filter_set() -> bool {
    std::env::var_os(EnvFilter::DEFAULT_ENV).is_some_and(|v| !v.is_empty())
}

/// Directives layered on top of the base level, lowest precedence first.
fn directives(config: &LoggingConfig, from_env: bool) -> Vec<String> {
    let mut out = Vec::new();
    if !from_env {
        out.extend(QUIET_TARGETS.iter().map(|t| format!("{t}=warn")));
    }
    if span_events(&config.span_events) != FmtSpan::NONE {
        out.extend(SPAN_TARGETS.iter().map(|t| format!("{t}=debug")));
    }

    let mut filters: Vec<_> = config.filters.iter().collect();
    filters.sort_by(|a, b| a.0.cmp(b.0));
    out.extend(filters.into_iter().map(|(module, level)| format!("{module}={level}")));
    out
}

fn build_filter(config: &LoggingConfig, from_env: bool) -> EnvFilter {
    let base = LevelFilter::from_level(config.level.to_tracing_level());
    let mut filter = if from_env {
        EnvFilter::builder()
            .with_default_directive(Directive::from(base))
            .from_env_lossy()
    } else {
        EnvFilter::new(config.level.as_str())
    };

    // Malformed module names in the config are skipped.
    for directive in directives(config, from_env) {
        if let Ok(d) = directive.parse::<Directive>() {
            filter = filter.add_directive(d);
        }
    }
    filter
}

fn span_events(config: &SpanEventConfig) -> FmtSpan {
    [
        (config.new, FmtSpan::NEW),
        (config.enter, FmtSpan::ENTER),
        (config.exit, FmtSpan::EXIT),
        (config.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(on, _)| *on)
    .fold(FmtSpan::NONE, |acc, (_, span)| acc | span)
}

/// Returns the writer, the file worker guard if any, and whether a file was
/// requested without a path.
fn make_writer(config: &LoggingConfig) -> (BoxMakeWriter, Option<WorkerGuard>, bool) {
    match (config.output, config.file_path.as_deref()) {
        (LogOutput::Stdout, _) => (BoxMakeWriter::new(std::io::stdout), None, false),
        (LogOutput::Stderr, _) => (BoxMakeWriter::new(std::io::stderr), None, false),
        (LogOutput::File, Some(path)) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .map_or_else(|| DEFAULT_LOG_FILE.into(), |n| n.to_owned());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard), false)
        }
        (LogOutput::File, None) => (BoxMakeWriter::new(std::io::stdout), None, true),
    }
}

fn fmt_layer(
    config: &LoggingConfig,
    writer: BoxMakeWriter,
) -> Box<dyn Layer<Registry> + Send + Sync> {
    let spans = span_events(&config.span_events);
    let base = fmt::layer()
        .with_writer(writer)
        .with_span_events(spans)
        .with_thread_ids(config.thread_ids)
        .with_file(config.file_location)
        .with_line_number(config.file_location);

    match config.format {
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Full => base.boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
        #[cfg(feature = "json-log")]
        LogFormat::Json => base.json().boxed(),
    }
}
