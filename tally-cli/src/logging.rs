use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Console plus optional file logging. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str, file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {level:?}"))?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = match file {
        Some(path) => {
            let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(f)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}
