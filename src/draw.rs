//! Transient draw and cut modes. At most one shape is drawn at a time.

use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::map::{LayerId, LayerKind};

pub type DrawResult<T> = std::result::Result<T, DrawError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("unknown draw shape: {0}")]
    UnknownShape(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawShape {
    Marker,
    Polyline,
    Rectangle,
    Polygon,
    Circle,
    Cut,
}

impl DrawShape {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Marker => "Marker",
            Self::Polyline => "Line",
            Self::Rectangle => "Rectangle",
            Self::Polygon => "Polygon",
            Self::Circle => "Circle",
            Self::Cut => "Cut",
        }
    }

    /// Kind of layer a finished drawing produces. Cutting produces none.
    pub const fn layer_kind(self) -> Option<LayerKind> {
        match self {
            Self::Marker => Some(LayerKind::Marker),
            Self::Polyline => Some(LayerKind::Polyline),
            Self::Rectangle => Some(LayerKind::Rectangle),
            Self::Polygon => Some(LayerKind::Polygon),
            Self::Circle => Some(LayerKind::Circle),
            Self::Cut => None,
        }
    }
}

impl FromStr for DrawShape {
    type Err = DrawError;

    fn from_str(value: &str) -> DrawResult<Self> {
        match value {
            "Marker" => Ok(Self::Marker),
            "Line" | "Polyline" => Ok(Self::Polyline),
            "Rectangle" => Ok(Self::Rectangle),
            // "Poly" predates the rename to "Polygon".
            "Polygon" | "Poly" => Ok(Self::Polygon),
            "Circle" => Ok(Self::Circle),
            "Cut" => Ok(Self::Cut),
            other => Err(DrawError::UnknownShape(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DrawOptions {
    pub snappable: bool,
    pub cursor_marker: bool,
    pub allow_self_intersection: bool,
    /// Keep the shape active after a drawing is finished.
    pub continue_drawing: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            snappable: true,
            cursor_marker: true,
            allow_self_intersection: true,
            continue_drawing: false,
        }
    }
}

impl DrawOptions {
    /// Options the cut button starts with.
    pub fn cut() -> Self {
        Self {
            allow_self_intersection: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDraw {
    pub shape: DrawShape,
    pub options: DrawOptions,
    /// Vertices placed so far in the current drawing.
    pub vertices: usize,
    pub(crate) hint_layer: Option<LayerId>,
}

#[derive(Debug, Clone, Default)]
pub struct Draw {
    active: Option<ActiveDraw>,
}

impl Draw {
    pub fn active(&self) -> Option<&ActiveDraw> {
        self.active.as_ref()
    }

    pub fn active_shape(&self) -> Option<DrawShape> {
        self.active.as_ref().map(|active| active.shape)
    }

    pub fn is_drawing(&self, shape: DrawShape) -> bool {
        self.active_shape() == Some(shape)
    }

    pub(crate) fn start(&mut self, shape: DrawShape, options: DrawOptions, hint_layer: LayerId) {
        self.active = Some(ActiveDraw {
            shape,
            options,
            vertices: 0,
            hint_layer: Some(hint_layer),
        });
    }

    pub(crate) fn push_vertex(&mut self) -> Option<usize> {
        let active = self.active.as_mut()?;
        active.vertices += 1;
        Some(active.vertices)
    }

    /// Returns `false` when nothing is drawn or no vertex was placed yet.
    pub(crate) fn pop_vertex(&mut self) -> bool {
        match self.active.as_mut() {
            Some(active) if active.vertices > 0 => {
                active.vertices -= 1;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn stop(&mut self) -> Option<ActiveDraw> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_poly_name_parses_as_polygon() {
        assert_eq!("Poly".parse::<DrawShape>(), Ok(DrawShape::Polygon));
        assert_eq!("Line".parse::<DrawShape>(), Ok(DrawShape::Polyline));
        assert_eq!(
            "Hexagon".parse::<DrawShape>(),
            Err(DrawError::UnknownShape("Hexagon".to_string()))
        );
    }

    #[test]
    fn start_and_stop_track_single_active_shape() {
        let mut draw = Draw::default();
        draw.start(DrawShape::Circle, DrawOptions::default(), LayerId(9));
        assert!(draw.is_drawing(DrawShape::Circle));
        assert!(!draw.is_drawing(DrawShape::Marker));

        let stopped = draw.stop().expect("circle was active");
        assert_eq!(stopped.hint_layer, Some(LayerId(9)));
        assert_eq!(draw.active_shape(), None);
    }

    #[test]
    fn vertices_are_counted_per_drawing() {
        let mut draw = Draw::default();
        assert_eq!(draw.push_vertex(), None);

        draw.start(DrawShape::Polygon, DrawOptions::default(), LayerId(3));
        assert_eq!(draw.push_vertex(), Some(1));
        assert_eq!(draw.push_vertex(), Some(2));
        assert!(draw.pop_vertex());
        assert!(draw.pop_vertex());
        assert!(!draw.pop_vertex());

        draw.push_vertex();
        draw.start(DrawShape::Polyline, DrawOptions::default(), LayerId(4));
        assert_eq!(draw.active().map(|active| active.vertices), Some(0));
    }

    #[test]
    fn cut_defaults_forbid_self_intersection() {
        assert!(!DrawOptions::cut().allow_self_intersection);
        assert_eq!(DrawShape::Cut.layer_kind(), None);
    }
}
