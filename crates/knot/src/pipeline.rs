//! Read, parse and solve: everything between the raw move string and the
//! serializers.

use crate::config::CheckConfig;
use anyhow::{Context, Result};
use knot_core::{Path, solve};
use std::{
    fs,
    io::{self, Read},
    path::Path as FsPath,
};
use tracing::{debug, warn};

/// Read the whole move string from `input`, or from stdin when `None`.
pub fn read_source(input: Option<&FsPath>) -> Result<String> {
    match input {
        Some(file) => fs::read_to_string(file)
            .with_context(|| format!("failed to read input {}", file.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read move string from stdin")?;
            Ok(source)
        }
    }
}

/// Parse `source` and fill in every control point.
pub fn convert(source: &str, check: &CheckConfig) -> Result<Path> {
    let mut path = knot_path::parse(source).context("failed to parse move string")?;
    debug!(segments = path.len(), "parsed move string");

    let closed = path.is_closed(check.closure_tolerance);
    if !closed {
        warn!(
            start = ?path.start(),
            end = ?path.end(),
            "path does not return to its start; the wrap-around joint will not be smooth"
        );
    }

    solve(&mut path).context("failed to solve control points")?;

    let residual = continuity_residual(&path, closed);
    debug!(residual, "solved control points");
    if residual > check.residual_tolerance {
        warn!(
            residual,
            segments = path.len(),
            "joint continuity residual exceeds tolerance; long paths lose precision"
        );
    }

    Ok(path)
}

// The wrap-around joint only counts when the loop actually closes.
fn continuity_residual(path: &Path, closed: bool) -> f64 {
    path.joint_residuals()
        .iter()
        .filter(|r| closed || r.index != 0)
        .map(|r| r.max())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_square_is_smooth() {
        let path = convert("1R1R1R1", &CheckConfig::default()).unwrap();
        assert_eq!(path.len(), 4);
        assert!(continuity_residual(&path, true) < 1e-9);
    }

    #[test]
    fn open_path_skips_wrap_joint() {
        let path = convert("3R2", &CheckConfig::default()).unwrap();
        assert!(!path.is_closed(1e-9));
        assert!(continuity_residual(&path, false) < 1e-9);
        assert!(continuity_residual(&path, true) > 1.0);
    }

    #[test]
    fn parse_errors_carry_context() {
        let err = convert("R1", &CheckConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "failed to parse move string");
        let root = err.root_cause().to_string();
        assert!(root.contains("must start with a magnitude"), "{root}");
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("loop.moves");
        fs::write(&file, "1R1\n").unwrap();
        assert_eq!(read_source(Some(&file)).unwrap(), "1R1\n");
        assert!(read_source(Some(&dir.path().join("missing"))).is_err());
    }
}
