// Logging setup for the roost runtime.
// Built on the `tracing` ecosystem: the runtime emits spans around worker
// waits and resume slices plus gauges for mailbox depth, and this module
// wires up a subscriber to see them.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{
    filter::EnvFilter, fmt, prelude::*, registry::Registry,
};

/// Configuration for the logging subscriber.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display.
    pub level: Level,
    /// Whether to emit JSON instead of human-readable lines.
    pub json_format: bool,
    /// Whether to include file and line information.
    pub show_file_line: bool,
    /// Whether to include thread names and ids. Useful here, since every
    /// worker thread is named.
    pub show_thread_info: bool,
    /// Whether to include timestamps (process uptime).
    pub show_time: bool,
    /// Target filter expressions ("target=level,target2=level2,...").
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: false,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

// Initialization guard so competing callers (tests, demos) only install
// one global subscriber.
static INIT: Once = Once::new();

/// Initialize the global subscriber with the given configuration.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

        if let Some(filters) = config.target_filters {
            for filter in filters.split(',') {
                if let Ok(directive) = filter.parse() {
                    env_filter = env_filter.add_directive(directive);
                }
            }
        }

        let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.json_format {
            Box::new(
                Registry::default()
                    .with(env_filter)
                    .with(fmt::layer().json().flatten_event(true)),
            )
        } else {
            let fmt_layer = fmt::layer()
                .with_ansi(atty::is(atty::Stream::Stdout))
                .with_file(config.show_file_line)
                .with_line_number(config.show_file_line)
                .with_thread_names(config.show_thread_info)
                .with_thread_ids(config.show_thread_info);
            if config.show_time {
                Box::new(
                    Registry::default()
                        .with(env_filter)
                        .with(fmt_layer.with_timer(fmt::time::uptime())),
                )
            } else {
                Box::new(
                    Registry::default()
                        .with(env_filter)
                        .with(fmt_layer.without_time()),
                )
            }
        };

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("error setting global tracing subscriber: {err}");
        }
    });
}

/// Reasonable defaults for applications embedding the runtime.
pub fn init_default() {
    init(LogConfig::default());
}

/// Verbose setup for development: scheduler and mailbox traces enabled.
pub fn init_development() {
    init(LogConfig {
        level: Level::DEBUG,
        show_file_line: true,
        target_filters: Some("roost=trace".to_string()),
        ..LogConfig::default()
    });
}

/// Quiet setup for tests: warnings and errors only.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        show_thread_info: false,
        show_time: false,
        ..LogConfig::default()
    });
}
