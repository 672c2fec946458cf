//! Shape kinds and their named parameters.

use serde::{Deserialize, Serialize};

use crate::model::coord::{Angle, Coord, Coordinate};

/// The closed set of shape kinds a region can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Ellipse,
    Rectangle,
    Polygon,
    RegularPolygon,
    Line,
    Point,
    Text,
    CircleAnnulus,
    EllipseAnnulus,
    RectangleAnnulus,
}

impl ShapeKind {
    /// Lowercase name for messages.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Polygon => "polygon",
            ShapeKind::RegularPolygon => "regular polygon",
            ShapeKind::Line => "line",
            ShapeKind::Point => "point",
            ShapeKind::Text => "text",
            ShapeKind::CircleAnnulus => "circle annulus",
            ShapeKind::EllipseAnnulus => "ellipse annulus",
            ShapeKind::RectangleAnnulus => "rectangle annulus",
        }
    }

    /// The kind this shape is written as. Regular polygons are plain polygons.
    pub fn canonical(&self) -> ShapeKind {
        match self {
            ShapeKind::RegularPolygon => ShapeKind::Polygon,
            other => *other,
        }
    }
}

/// A typed shape parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Unitless number (pixel lengths, counts).
    Number(f64),
    /// Angular size on the sky.
    Quantity(Angle),
    /// Rotation angle.
    Angle(Angle),
    /// Single position.
    Point(Coord),
    /// Ordered positions (e.g. polygon vertices).
    Points(Vec<Coord>),
    /// Free text.
    Text(String),
}

/// Geometry of a region, generic over its coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", bound = "")]
pub enum Shape<C: Coordinate> {
    Circle {
        center: C,
        radius: C::Length,
    },
    Ellipse {
        center: C,
        width: C::Length,
        height: C::Length,
        angle: Angle,
    },
    Rectangle {
        center: C,
        width: C::Length,
        height: C::Length,
        angle: Angle,
    },
    Polygon {
        vertices: Vec<C>,
    },
    RegularPolygon {
        center: C,
        nvertices: usize,
        radius: C::Length,
        angle: Angle,
    },
    Line {
        start: C,
        end: C,
    },
    Point {
        center: C,
    },
    Text {
        center: C,
        text: String,
    },
    CircleAnnulus {
        center: C,
        inner_radius: C::Length,
        outer_radius: C::Length,
    },
    EllipseAnnulus {
        center: C,
        inner_width: C::Length,
        outer_width: C::Length,
        inner_height: C::Length,
        outer_height: C::Length,
        angle: Angle,
    },
    RectangleAnnulus {
        center: C,
        inner_width: C::Length,
        outer_width: C::Length,
        inner_height: C::Length,
        outer_height: C::Length,
        angle: Angle,
    },
}

impl<C: Coordinate> Shape<C> {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Ellipse { .. } => ShapeKind::Ellipse,
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
            Shape::Polygon { .. } => ShapeKind::Polygon,
            Shape::RegularPolygon { .. } => ShapeKind::RegularPolygon,
            Shape::Line { .. } => ShapeKind::Line,
            Shape::Point { .. } => ShapeKind::Point,
            Shape::Text { .. } => ShapeKind::Text,
            Shape::CircleAnnulus { .. } => ShapeKind::CircleAnnulus,
            Shape::EllipseAnnulus { .. } => ShapeKind::EllipseAnnulus,
            Shape::RectangleAnnulus { .. } => ShapeKind::RectangleAnnulus,
        }
    }

    /// Named parameters in declaration order.
    pub fn params(&self) -> Vec<(&'static str, ParamValue)> {
        let point = |c: &C| ParamValue::Point(c.to_coord());
        let length = |l: &C::Length| C::length_param(*l);
        let angle = |a: &Angle| ParamValue::Angle(*a);

        match self {
            Shape::Circle { center, radius } => {
                vec![("center", point(center)), ("radius", length(radius))]
            }
            Shape::Ellipse {
                center,
                width,
                height,
                angle: rotation,
            }
            | Shape::Rectangle {
                center,
                width,
                height,
                angle: rotation,
            } => vec![
                ("center", point(center)),
                ("width", length(width)),
                ("height", length(height)),
                ("angle", angle(rotation)),
            ],
            Shape::Polygon { vertices } => vec![(
                "vertices",
                ParamValue::Points(vertices.iter().map(C::to_coord).collect()),
            )],
            Shape::RegularPolygon {
                center,
                nvertices,
                radius,
                angle: rotation,
            } => vec![
                ("center", point(center)),
                ("nvertices", ParamValue::Number(*nvertices as f64)),
                ("radius", length(radius)),
                ("angle", angle(rotation)),
            ],
            Shape::Line { start, end } => vec![("start", point(start)), ("end", point(end))],
            Shape::Point { center } => vec![("center", point(center))],
            Shape::Text { center, text } => vec![
                ("center", point(center)),
                ("text", ParamValue::Text(text.clone())),
            ],
            Shape::CircleAnnulus {
                center,
                inner_radius,
                outer_radius,
            } => vec![
                ("center", point(center)),
                ("inner_radius", length(inner_radius)),
                ("outer_radius", length(outer_radius)),
            ],
            Shape::EllipseAnnulus {
                center,
                inner_width,
                outer_width,
                inner_height,
                outer_height,
                angle: rotation,
            }
            | Shape::RectangleAnnulus {
                center,
                inner_width,
                outer_width,
                inner_height,
                outer_height,
                angle: rotation,
            } => vec![
                ("center", point(center)),
                ("inner_width", length(inner_width)),
                ("outer_width", length(outer_width)),
                ("inner_height", length(inner_height)),
                ("outer_height", length(outer_height)),
                ("angle", angle(rotation)),
            ],
        }
    }

    /// Vertices of a regular polygon, first vertex pointing "up" before rotation.
    pub fn regular_polygon_vertices(
        center: &C,
        nvertices: usize,
        radius: C::Length,
        angle: Angle,
    ) -> Vec<C> {
        let step = 360.0 / nvertices.max(1) as f64;
        (0..nvertices)
            .map(|i| {
                let direction = Angle::from_degrees(90.0 + angle.degrees() + step * i as f64);
                center.offset(radius, direction)
            })
            .collect()
    }

    /// The shape this one is written as, if it differs.
    ///
    /// Only regular polygons are rewritten: they become explicit polygons.
    pub fn to_canonical(&self) -> Option<Shape<C>> {
        match self {
            Shape::RegularPolygon {
                center,
                nvertices,
                radius,
                angle,
            } => Some(Shape::Polygon {
                vertices: Self::regular_polygon_vertices(center, *nvertices, *radius, *angle),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::coord::PixCoord;

    #[test]
    fn test_canonical_kind() {
        assert_eq!(ShapeKind::RegularPolygon.canonical(), ShapeKind::Polygon);
        assert_eq!(ShapeKind::CircleAnnulus.canonical(), ShapeKind::CircleAnnulus);
    }

    #[test]
    fn test_circle_params() {
        let shape = Shape::Circle {
            center: PixCoord::new(9.0, 9.0),
            radius: 5.0,
        };
        let params = shape.params();
        let names: Vec<_> = params.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["center", "radius"]);
        assert_eq!(params[1].1, ParamValue::Number(5.0));
    }

    #[test]
    fn test_regular_polygon_canonicalizes() {
        let shape = Shape::RegularPolygon {
            center: PixCoord::new(0.0, 0.0),
            nvertices: 4,
            radius: 1.0,
            angle: Angle::from_degrees(0.0),
        };
        let Some(Shape::Polygon { vertices }) = shape.to_canonical() else {
            panic!("Expected polygon");
        };
        assert_eq!(vertices.len(), 4);
        // First vertex straight up from the center
        assert!(vertices[0].x.abs() < 1e-12);
        assert!((vertices[0].y - 1.0).abs() < 1e-12);
        assert!((vertices[1].x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_regular_shapes_are_canonical() {
        let shape = Shape::Point {
            center: PixCoord::new(1.0, 2.0),
        };
        assert!(shape.to_canonical().is_none());
    }
}
