//! Paints applied to fills, strokes and backgrounds

use std::fmt;

use serde::Deserialize;

use crate::document::raw::RawPaint;
use crate::error::ParseError;
use crate::variables::{VariableAlias, VariableLibrary};

/// An RGBA colour with channels in `0..=1`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// CSS `rgba()` notation. Channels are scaled to 0..=255 without rounding.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.r * 255.0,
            self.g * 255.0,
            self.b * 255.0,
            self.a
        )
    }
}

/// A point in normalized object space
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
    Angular,
    Diamond,
}

impl GradientKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "GRADIENT_LINEAR" => Some(Self::Linear),
            "GRADIENT_RADIAL" => Some(Self::Radial),
            "GRADIENT_ANGULAR" => Some(Self::Angular),
            "GRADIENT_DIAMOND" => Some(Self::Diamond),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "GRADIENT_LINEAR",
            Self::Radial => "GRADIENT_RADIAL",
            Self::Angular => "GRADIENT_ANGULAR",
            Self::Diamond => "GRADIENT_DIAMOND",
        }
    }
}

impl fmt::Display for GradientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolidPaint {
    pub color: Color,
    pub opacity: Option<f64>,
    pub visible: bool,
    /// Variable bound to the colour channel
    pub bound_color: Option<VariableAlias>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientPaint {
    pub kind: GradientKind,
    pub blend_mode: Option<String>,
    /// Start, end and width handles
    pub handle_positions: Vec<Vector>,
    pub stops: Vec<ColorStop>,
    pub opacity: Option<f64>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePaint {
    pub scale_mode: Option<String>,
    pub image_ref: Option<String>,
    /// Only present for stretched images
    pub image_transform: Option<Vec<Vec<f64>>>,
    /// Only present for tiled images
    pub scaling_factor: Option<f64>,
    pub rotation: f64,
    pub gif_ref: Option<String>,
    pub opacity: Option<f64>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(SolidPaint),
    Gradient(GradientPaint),
    Image(ImagePaint),
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Paint::Solid(SolidPaint {
            color,
            opacity: None,
            visible: true,
            bound_color: None,
        })
    }

    /// Build a paint from its wire form, binding variable aliases to `library`
    pub fn from_raw(raw: &RawPaint, library: &VariableLibrary) -> Result<Self, ParseError> {
        if raw.kind == "SOLID" {
            let bound_color = raw
                .bound_variables
                .as_ref()
                .and_then(|bound| bound.color.as_ref())
                .map(|alias| VariableAlias::new(alias.id.clone(), library));
            return Ok(Paint::Solid(SolidPaint {
                color: raw.color.unwrap_or_default(),
                opacity: raw.opacity,
                visible: raw.visible,
                bound_color,
            }));
        }

        if raw.kind == "IMAGE" {
            return Ok(Paint::Image(ImagePaint {
                scale_mode: raw.scale_mode.clone(),
                image_ref: raw.image_ref.clone(),
                image_transform: raw.image_transform.clone(),
                scaling_factor: raw.scaling_factor,
                rotation: raw.rotation.unwrap_or(0.0),
                gif_ref: raw.gif_ref.clone(),
                opacity: raw.opacity,
                visible: raw.visible,
            }));
        }

        match GradientKind::from_type_name(&raw.kind) {
            Some(kind) => Ok(Paint::Gradient(GradientPaint {
                kind,
                blend_mode: raw.blend_mode.clone(),
                handle_positions: raw.gradient_handle_positions.clone(),
                stops: raw.gradient_stops.clone(),
                opacity: raw.opacity,
                visible: raw.visible,
            })),
            None => Err(ParseError::UnknownPaintKind {
                kind: raw.kind.clone(),
            }),
        }
    }

    /// Wire name of the paint type
    pub fn type_name(&self) -> &'static str {
        match self {
            Paint::Solid(_) => "SOLID",
            Paint::Gradient(gradient) => gradient.kind.as_str(),
            Paint::Image(_) => "IMAGE",
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Paint::Solid(paint) => paint.visible,
            Paint::Gradient(paint) => paint.visible,
            Paint::Image(paint) => paint.visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawPaint {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_color_display_is_unrounded_rgba() {
        assert_eq!(
            Color::rgba(1.0, 0.0, 0.5, 0.25).to_string(),
            "rgba(255, 0, 127.5, 0.25)"
        );
    }

    #[test]
    fn test_color_alpha_defaults_to_opaque() {
        let color: Color = serde_json::from_str(r#"{"r": 0, "g": 1, "b": 0}"#).unwrap();
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_solid_paint_with_bound_variable() {
        let library = VariableLibrary::empty();
        let paint = Paint::from_raw(
            &raw(r#"{
                "type": "SOLID",
                "color": {"r": 1, "g": 0, "b": 0, "a": 1},
                "boundVariables": {"color": {"type": "VARIABLE_ALIAS", "id": "VariableID:1:2"}}
            }"#),
            &library,
        )
        .unwrap();

        let Paint::Solid(solid) = paint else {
            panic!("expected a solid paint");
        };
        assert_eq!(solid.color, Color::rgba(1.0, 0.0, 0.0, 1.0));
        assert!(solid.visible);
        assert_eq!(solid.bound_color.map(|a| a.id().to_string()).as_deref(), Some("VariableID:1:2"));
    }

    #[test]
    fn test_gradient_paint_keeps_stops() {
        let paint = Paint::from_raw(
            &raw(r#"{
                "type": "GRADIENT_RADIAL",
                "blendMode": "NORMAL",
                "gradientHandlePositions": [{"x": 0, "y": 0}, {"x": 1, "y": 1}],
                "gradientStops": [
                    {"position": 0, "color": {"r": 1, "g": 1, "b": 1, "a": 1}},
                    {"position": 1, "color": {"r": 0, "g": 0, "b": 0, "a": 1}}
                ]
            }"#),
            &VariableLibrary::empty(),
        )
        .unwrap();

        assert_eq!(paint.type_name(), "GRADIENT_RADIAL");
        let Paint::Gradient(gradient) = paint else {
            panic!("expected a gradient");
        };
        assert_eq!(gradient.stops.len(), 2);
        assert_eq!(gradient.handle_positions[1], Vector { x: 1.0, y: 1.0 });
    }

    #[test]
    fn test_unknown_paint_type_is_rejected() {
        let err = Paint::from_raw(&raw(r#"{"type": "EMOJI"}"#), &VariableLibrary::empty())
            .unwrap_err();
        assert!(matches!(err, ParseError::UnknownPaintKind { kind } if kind == "EMOJI"));
    }

    #[test]
    fn test_invisible_image_paint() {
        let paint = Paint::from_raw(
            &raw(r#"{"type": "IMAGE", "visible": false, "scaleMode": "FILL", "imageRef": "abc"}"#),
            &VariableLibrary::empty(),
        )
        .unwrap();
        assert!(!paint.is_visible());
        assert_eq!(paint.type_name(), "IMAGE");
    }
}
