use anyhow::{anyhow, Result};
use std::io::{stderr, IsTerminal};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "warn";
const VERBOSE_LOG_LEVEL: &str = "qrgen=debug";

/// Installs a compact stderr logger. `RUST_LOG` wins over `--verbose`.
pub fn init_logger(verbose: bool) -> Result<()> {
    let fallback = if verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let console_layer = fmt::layer()
        .with_writer(stderr)
        .with_ansi(stderr().is_terminal())
        .with_level(true)
        .with_target(false)
        .without_time()
        .compact()
        .with_filter(env_filter);

    registry()
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("could not install logger: {e}"))
}
