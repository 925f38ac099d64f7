//! Tracing configuration for the CLI
//!
//! The application configures the subscriber; library modules only emit
//! events. `log` records from the library are captured through the
//! tracing-log bridge.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Subscriber configuration derived from the CLI verbosity flags
#[derive(Debug, Default)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
}

impl TracingConfig {
    /// Create a new tracing configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Convert the verbosity level to a tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Initialize the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the verbosity flags when set.
    ///
    /// # Errors
    ///
    /// Returns an error when the environment filter cannot be parsed.
    pub fn init(self) -> anyhow::Result<()> {
        let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(env) => EnvFilter::try_new(env)?,
            Err(_) => EnvFilter::try_new(self.verbosity_to_filter())?,
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_level(true)
            .compact();

        Registry::default().with(filter).with(fmt_layer).init();
        Ok(())
    }
}
