use super::InputArgs;
use crate::{config::Config, pipeline};
use anyhow::{Context, Result};
use clap::Args;
use knot_emit::{Template, write_text};
use std::io::{self, BufWriter};

#[derive(Args)]
pub struct TextArgs {
    /// Line template, e.g. "{0} {1:.6f} {2:.6f} {3:.6f}".
    ///
    /// Positional fields are the line index, x, y and z. Defaults to the
    /// configured `text.template`.
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    #[command(flatten)]
    pub input: InputArgs,
}

impl TextArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let template = match &self.format {
            Some(format) => Template::parse(format)
                .with_context(|| format!("invalid --format template {format:?}"))?,
            None => config.template()?,
        };

        let source = self.input.read()?;
        let path = pipeline::convert(&source, &config.check)?;

        let stdout = io::stdout();
        write_text(&path, &template, BufWriter::new(stdout.lock()))
            .context("failed to write control points to stdout")?;
        tracing::info!(points = path.control_point_count(), "wrote text output");
        Ok(())
    }
}
