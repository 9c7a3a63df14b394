//! Process-wide `tracing` setup for chat front ends.
//!
//! Console records go to stderr so they never mix with a reply streamed to
//! stdout. Setting `MENTOR_JSON_LOG_PATH` sends JSON lines to that file
//! instead.
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INSTALLED: OnceCell<()> = OnceCell::new();

const FALLBACK_FILTER: &str = "warn";
const DEFAULT_LOG_FILE: &str = "mentor-chat.logs.jsonl";

/// Where log records are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    JsonFile(PathBuf),
}

/// Filter directive and sink for [`init_observability`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub sink: LogSink,
}

impl LogConfig {
    /// Logs to stderr with `filter` as given, e.g. a `--log-level` flag.
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            sink: LogSink::Stderr,
        }
    }

    /// Applies environment overrides on top of `default_filter`.
    ///
    /// `MENTOR_LOG_LEVEL` wins over `RUST_LOG`. `MENTOR_OBSERVABILITY=off`
    /// silences everything.
    pub fn from_env(default_filter: &str) -> Self {
        let var = |name| std::env::var(name).ok();
        let filter = pick_filter(
            var("MENTOR_OBSERVABILITY").as_deref(),
            var("MENTOR_LOG_LEVEL"),
            var("RUST_LOG"),
            default_filter,
        );
        let sink = match var("MENTOR_JSON_LOG_PATH") {
            Some(path) if !path.trim().is_empty() => LogSink::JsonFile(path.into()),
            _ => LogSink::Stderr,
        };
        Self { filter, sink }
    }
}

fn pick_filter(
    switch: Option<&str>,
    mentor_level: Option<String>,
    rust_log: Option<String>,
    default_filter: &str,
) -> String {
    let disabled = switch.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        )
    });
    if disabled {
        return "off".to_string();
    }
    [mentor_level, rust_log]
        .into_iter()
        .flatten()
        .find(|directive| EnvFilter::try_new(directive).is_ok())
        .unwrap_or_else(|| default_filter.to_string())
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

fn file_writer(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let _ = std::fs::create_dir_all(dir);
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);
    tracing_appender::rolling::never(dir, file_name)
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_observability(config: &LogConfig) {
    INSTALLED.get_or_init(|| {
        let filter = build_filter(&config.filter);
        let registry = tracing_subscriber::registry().with(filter);
        let _ = match &config.sink {
            LogSink::Stderr => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
            LogSink::JsonFile(path) => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(file_writer(path)),
                )
                .try_init(),
        };
    });
}
