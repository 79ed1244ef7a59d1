//! Subscriber installation for binaries and tests.
//!
//! Library code only emits `tracing` events. Whoever owns the process picks
//! an output format and installs a subscriber once with [`TracingSetup`].
//!
//! ```
//! use stowage_runtime::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("stowage_catalog=trace,stowage_query=info")
//!     .install();
//! ```

use core::str::FromStr;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable read by [`TracingSetup::from_env`] for the filter.
pub const ENV_LOG: &str = "STOWAGE_LOG";
/// Environment variable read by [`TracingSetup::from_env`] for the format.
pub const ENV_LOG_FORMAT: &str = "STOWAGE_LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Multi-line human-readable output.
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
    /// One JSON object per event.
    Json,
}

impl FromStr for TracingFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Builder for the process subscriber. Events go to stderr so command
/// output on stdout stays machine-readable.
#[derive(Debug, Clone)]
pub struct TracingSetup {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// Creates a setup logging at `INFO` in the pretty format.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies [`ENV_LOG`] and [`ENV_LOG_FORMAT`] on top of the defaults.
    /// Unparseable formats are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut setup = Self::default();
        if let Ok(filter) = std::env::var(ENV_LOG)
            && !filter.trim().is_empty()
        {
            setup = setup.with_env_filter(filter);
        }
        if let Some(format) = std::env::var(ENV_LOG_FORMAT)
            .ok()
            .and_then(|value| value.parse().ok())
        {
            setup = setup.with_format(format);
        }
        setup
    }

    /// Sets the maximum level used when no filter directive applies.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets per-target directives, e.g. `stowage_catalog=debug`.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Emits span enter and exit events.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// The configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The configured format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Builds the filter. Invalid directives fall back to the level.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        self.env_filter
            .as_deref()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(self.level.as_str()))
    }

    /// Installs the global subscriber. Returns `false` if one was already
    /// installed, in which case this setup has no effect.
    pub fn install(&self) -> bool {
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(span_events);
        let registry = tracing_subscriber::registry().with(self.filter());

        let installed = match self.format {
            TracingFormat::Pretty => registry.with(layer.pretty()).try_init().is_ok(),
            TracingFormat::Compact => registry.with(layer.compact()).try_init().is_ok(),
            TracingFormat::Json => registry.with(layer.json()).try_init().is_ok(),
        };
        if installed {
            tracing::debug!(level = %self.level, format = ?self.format, "tracing installed");
        }
        installed
    }
}
