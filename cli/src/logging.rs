//! Logging for the `hexcells` binary.
//!
//! The core crate logs through the `log` facade; the subscriber installed here
//! bridges those records into `tracing` and writes them to stderr.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override the level when no verbosity flag was given.
    pub use_env_filter: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
        }
    }
}

impl LogConfig {
    fn env_filter(&self) -> EnvFilter {
        if self.use_env_filter {
            EnvFilter::builder()
                .with_default_directive(self.level_filter.into())
                .from_env_lossy()
        } else {
            EnvFilter::default().add_directive(self.level_filter.into())
        }
    }
}

pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|err| anyhow::anyhow!("{err}"))
}
