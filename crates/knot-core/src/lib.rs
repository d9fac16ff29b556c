//! Geometry and spline solving shared across knot components.
//!
//! This crate intentionally avoids any parsing- or output-specific
//! dependencies.

pub mod path;
pub mod point;
pub mod solver;

pub use path::{JointResidual, Path, PathError, Segment};
pub use point::Point3;
pub use solver::{CharacteristicRoots, SolveError, solve};
