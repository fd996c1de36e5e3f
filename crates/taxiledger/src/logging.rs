//! Logging setup for the `taxiledger` binary.
//!
//! Diagnostics go to stderr through `tracing` so that command output on
//! stdout (tables, JSON, activation codes) can be piped untouched.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding filter directives; wins over `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "TAXILEDGER_LOG";

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above, without timestamps or targets.
    #[default]
    Normal,
    /// Debug and above with timestamps and targets.
    Verbose,
    /// Trace and above.
    Trace,
}

impl Verbosity {
    /// Map the `-q` flag and the `-v` count. `-q` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directives used when neither environment variable is set.
    #[must_use]
    pub fn default_directives(&self) -> String {
        format!("taxiledger={}", self.to_level_filter())
    }

    fn is_detailed(self) -> bool {
        matches!(self, Self::Verbose | Self::Trace)
    }
}

fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directives()))
}

/// Initialize the logging system.
///
/// Call once at startup. `TAXILEDGER_LOG`, then `RUST_LOG`, take precedence
/// over `verbosity`. Normal runs print bare `LEVEL message` lines; verbose runs
/// add timestamps and module targets.
///
/// ```no_run
/// use taxiledger::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let detailed = verbosity.is_detailed();
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(detailed)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(env_filter(verbosity));

    // A second call leaves the first subscriber in place
    let _ = if detailed {
        registry.with(layer).try_init()
    } else {
        registry.with(layer.without_time()).try_init()
    };
}

/// Initialize logging for tests.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
