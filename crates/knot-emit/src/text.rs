use crate::template::Template;
use knot_core::Path;
use std::io::{self, Write};

/// Render every control point of `path` through `template`, one line each.
///
/// Lines are numbered `0..=3n`: `p0, p1, p2` of each segment in order,
/// then the final `p3`.
pub fn render_text(path: &Path, template: &Template) -> String {
    let mut out = String::new();
    for (index, point) in path.control_points().enumerate() {
        template.render_into(&mut out, index, point);
        out.push('\n');
    }
    out
}

pub fn write_text<W: Write>(path: &Path, template: &Template, mut writer: W) -> io::Result<()> {
    let mut line = String::new();
    for (index, point) in path.control_points().enumerate() {
        line.clear();
        template.render_into(&mut line, index, point);
        line.push('\n');
        writer.write_all(line.as_bytes())?;
    }
    writer.flush()
}
