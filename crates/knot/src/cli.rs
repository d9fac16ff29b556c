use crate::pipeline;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod binary;
pub mod text;

/// Where the move string comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Read the move string from this file instead of stdin.
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

impl InputArgs {
    pub fn read(&self) -> Result<String> {
        pipeline::read_source(self.input.as_deref())
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level {level:?}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
