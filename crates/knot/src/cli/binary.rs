use super::InputArgs;
use crate::{config::Config, pipeline};
use anyhow::Result;
use clap::Args;
use knot_emit::write_binary;
use std::path::PathBuf;

#[derive(Args)]
pub struct BinaryArgs {
    /// File to write the packed control points to. Overwritten if it exists.
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub input: InputArgs,
}

impl BinaryArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let source = self.input.read()?;
        let path = pipeline::convert(&source, &config.check)?;

        write_binary(&path, &self.output)?;
        tracing::info!(
            points = path.control_point_count(),
            output = %self.output.display(),
            "wrote binary output"
        );
        Ok(())
    }
}
