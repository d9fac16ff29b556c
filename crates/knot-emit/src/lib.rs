//! Serializers for solved paths: one formatted line per control point, or
//! a packed big-endian blob.

pub mod binary;
pub mod template;
pub mod text;

pub use binary::{EmitError, encode_binary, header_value, write_binary};
pub use template::{Arg, DEFAULT_TEMPLATE, Template, TemplateError};
pub use text::{render_text, write_text};
