//! Process-wide logging setup.
//!
//! Lines look like `2024-03-09 07:05:02,123 backup [INFO] starting backup`: the
//! event target plays the role of a logger name.

use chrono::Local;
use std::fmt;
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

pub const LOG_LEVEL_ENV: &str = "LOGLEVEL";

/// Maps a `LOGLEVEL` value to a filter. Accepts the classic level names
/// (`DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`) as well as `TRACE`/`WARN`,
/// case-insensitively. `None` means the value was not recognised.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_uppercase().as_str() {
        "NOTSET" | "TRACE" => Some(LevelFilter::TRACE),
        "DEBUG" => Some(LevelFilter::DEBUG),
        "INFO" => Some(LevelFilter::INFO),
        "WARN" | "WARNING" => Some(LevelFilter::WARN),
        "ERROR" | "CRITICAL" | "FATAL" => Some(LevelFilter::ERROR),
        _ => None,
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

/// `{timestamp} {logger} [{level}] {message}`
pub(crate) struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "{} {} [{}] ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            metadata.target(),
            level_name(metadata.level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the global subscriber writing to stderr.
///
/// `level` is the raw `LOGLEVEL` value; unset means INFO, an unknown value
/// falls back to INFO and is reported once logging is up.
pub fn init_logging(level: Option<&str>) -> anyhow::Result<()> {
    let parsed = level.map(parse_level);
    let max_level = parsed.flatten().unwrap_or(LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .event_format(LineFormat)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if let (Some(raw), Some(None)) = (level, parsed) {
        tracing::warn!(target: "main", "unknown {} value {:?}, using INFO", LOG_LEVEL_ENV, raw);
    }
    Ok(())
}
