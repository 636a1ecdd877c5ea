//! SVG export
//!
//! Each stroke becomes one round-capped polyline `<path>`. Erase strokes are
//! painted with the background colour so the export matches what the
//! operator sees.

use std::fmt::Write;

use crate::canvas::CanvasSettings;
use crate::error::Result;
use crate::stroke::Stroke;

/// Render strokes into a standalone SVG document
pub fn render(strokes: &[Stroke], settings: &CanvasSettings) -> Result<String> {
    let mut out = String::new();
    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = settings.width,
        h = settings.height
    )?;
    write!(
        out,
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        escape_attr(&settings.background)
    )?;
    out.push_str(r#"<g id="strokes">"#);

    for stroke in strokes {
        let color = if stroke.is_ink() {
            stroke.color()
        } else {
            settings.background.as_str()
        };
        write!(
            out,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round"/>"#,
            path_data(stroke)?,
            escape_attr(color),
            stroke.width()
        )?;
    }

    out.push_str("</g></svg>");
    Ok(out)
}

fn path_data(stroke: &Stroke) -> Result<String> {
    let mut d = String::new();
    let points = stroke.points();
    let Some(first) = points.first() else {
        return Ok(d);
    };
    write!(d, "M {},{}", first.x, first.y)?;
    if points.len() == 1 {
        // zero-length segment so the round cap renders a dot
        write!(d, " L {},{}", first.x, first.y)?;
    }
    for p in &points[1..] {
        write!(d, " L {},{}", p.x, p.y)?;
    }
    Ok(d)
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
