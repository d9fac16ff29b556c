//! Library side of the `knot` command: configuration, the parse/solve
//! pipeline, and the subcommand implementations.

pub mod cli;
pub mod config;
pub mod pipeline;
