//! Stderr logger for the overlay tools.
//!
//! Lines look like `[  0.012s  INFO marker_overlay::live] message`. Records
//! from this workspace (`marker_overlay*` targets) pass at the configured
//! level; records from other crates (image codecs, ...) are capped at `Warn`.
//! Install once at startup with [`init_with_level`]. With the `tracing`
//! feature, [`init_tracing`] installs a `tracing-subscriber` formatter
//! instead.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted for the log level / tracing filter.
pub const LOG_ENV: &str = "MARKER_OVERLAY_LOG";

const OWN_TARGET_PREFIX: &str = "marker_overlay";
const FOREIGN_MAX_LEVEL: LevelFilter = LevelFilter::Warn;

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn level_for(&self, target: &str) -> LevelFilter {
        if target.starts_with(OWN_TARGET_PREFIX) {
            self.level
        } else {
            self.level.min(FOREIGN_MAX_LEVEL)
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = writeln!(
            std::io::stderr().lock(),
            "[{:7.3}s {:>5} {}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger.
///
/// Only the first call has an effect; later calls return `Ok(())` and keep
/// the original level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Parse a level name (`"off"`, `"warn"`, `"debug"`, ...), falling back to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Info)
}

/// Level from [`LOG_ENV`], or `default` when unset.
pub fn level_from_env(default: LevelFilter) -> LevelFilter {
    std::env::var(LOG_ENV)
        .map(|v| parse_level(&v))
        .unwrap_or(default)
}

/// Output format of [`init_tracing`].
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable lines with uptime stamps.
    Compact,
    /// One JSON object per event; span timings on close.
    Json,
}

/// Install a global `tracing` subscriber.
///
/// The filter comes from [`LOG_ENV`] (`EnvFilter` syntax) and falls back to
/// `default_directive`, e.g. `"info"` or `"marker_overlay=debug"`.
#[cfg(feature = "tracing")]
pub fn init_tracing(format: TracingFormat, default_directive: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));
    match format {
        TracingFormat::Json => {
            let _ = fmt()
                .with_env_filter(filter)
                .with_span_events(FmtSpan::CLOSE)
                .json()
                .flatten_event(true)
                .finish()
                .try_init();
        }
        TracingFormat::Compact => {
            let _ = fmt()
                .with_env_filter(filter)
                .with_timer(fmt::time::Uptime::default())
                .compact()
                .finish()
                .try_init();
        }
    }
}
