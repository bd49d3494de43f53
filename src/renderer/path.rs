//! Path data rewriting
//!
//! Geometry arrives as SVG path data in node-local coordinates. It is parsed
//! with kurbo, moved into the rendered viewport and written back with a fixed
//! number of decimals.

use kurbo::{Affine, BezPath, PathEl, Point, SvgParseError};

/// Translate path data by `(dx, dy)` and round every coordinate
pub fn translate_path(
    data: &str,
    dx: f64,
    dy: f64,
    precision: usize,
) -> Result<String, SvgParseError> {
    let mut path = BezPath::from_svg(data)?;
    path.apply_affine(Affine::translate((dx, dy)));
    Ok(to_svg_d(&path, precision))
}

/// Convert to SVG path `d` attribute string
pub fn to_svg_d(path: &BezPath, precision: usize) -> String {
    let point = |p: Point| format!("{} {}", round(p.x, precision), round(p.y, precision));

    let segments: Vec<String> = path
        .elements()
        .iter()
        .map(|el| match el {
            PathEl::MoveTo(p) => format!("M{}", point(*p)),
            PathEl::LineTo(p) => format!("L{}", point(*p)),
            PathEl::QuadTo(c, p) => format!("Q{} {}", point(*c), point(*p)),
            PathEl::CurveTo(c1, c2, p) => {
                format!("C{} {} {}", point(*c1), point(*c2), point(*p))
            }
            PathEl::ClosePath => "Z".to_string(),
        })
        .collect();

    segments.join(" ")
}

/// Round to `precision` decimals, dropping trailing zeros and negative zero
pub fn round(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, value);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
