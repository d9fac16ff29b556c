//! Packed big-endian output.
//!
//! Layout: an `i32` header followed by `3n + 1` records of four `f64`
//! values `(x, y, z, 1.0)`, all big-endian. Records come in the same order
//! as the text output.
//!
//! The header holds `4 * (3n + 1)`, the value count of the payload. Readers
//! of this format expect exactly that number, so it is kept even though it
//! is not the payload's byte length (each value takes 8 bytes).

use bytes::{BufMut, Bytes, BytesMut};
use knot_core::Path;
use std::{fs, io, path::PathBuf};
use thiserror::Error;

/// Fourth coordinate written after x, y and z
pub const HOMOGENEOUS_W: f64 = 1.0;

const VALUES_PER_POINT: usize = 4;
const RECORD_BYTES: usize = VALUES_PER_POINT * std::mem::size_of::<f64>();

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("{count} control points do not fit in the binary header")]
    TooManyPoints { count: usize },

    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Header value for a path of `segments` segments
pub fn header_value(segments: usize) -> Result<i32, EmitError> {
    let count = segments
        .checked_mul(3)
        .and_then(|n| n.checked_add(1))
        .ok_or(EmitError::TooManyPoints { count: usize::MAX })?;
    count
        .checked_mul(VALUES_PER_POINT)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(EmitError::TooManyPoints { count })
}

pub fn encode_binary(path: &Path) -> Result<Bytes, EmitError> {
    let header = header_value(path.len())?;
    let mut buf = BytesMut::with_capacity(4 + path.control_point_count() * RECORD_BYTES);

    buf.put_i32(header);
    for point in path.control_points() {
        buf.put_f64(point.x);
        buf.put_f64(point.y);
        buf.put_f64(point.z);
        buf.put_f64(HOMOGENEOUS_W);
    }
    Ok(buf.freeze())
}

/// Encode `path` and overwrite `dest` with the result.
///
/// Encoding finishes before the file is opened, so a failed encode leaves
/// `dest` untouched.
pub fn write_binary(path: &Path, dest: impl AsRef<std::path::Path>) -> Result<(), EmitError> {
    let dest = dest.as_ref();
    let blob = encode_binary(path)?;
    fs::write(dest, &blob).map_err(|source| EmitError::Io {
        path: dest.to_path_buf(),
        source,
    })
}
