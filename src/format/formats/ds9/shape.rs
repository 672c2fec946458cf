//! Rendering of region geometry into DS9 shape clauses.

use std::collections::HashMap;

use crate::format::error::RegionError;
use crate::model::{Coord, Geometry, ParamValue, Region, ShapeKind};

/// Output name and parameter template of one DS9 shape.
///
/// Placeholders are parameter names in braces, e.g. `{radius}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeTemplate {
    pub name: &'static str,
    pub params: &'static str,
}

impl ShapeTemplate {
    const fn new(name: &'static str, params: &'static str) -> Self {
        Self { name, params }
    }
}

/// Frame names mapped to DS9 frame keywords.
pub const FRAME_MAPPING: &[(&str, &str)] = &[
    ("image", "image"),
    ("icrs", "icrs"),
    ("fk5", "fk5"),
    ("fk4", "fk4"),
    ("galactic", "galactic"),
    ("geocentrictrueecliptic", "ecliptic"),
];

const MIN_POLYGON_VERTICES: usize = 3;

// Not written: vector, ruler, compass, projection, panda, epanda, bpanda,
// composite.
const SHAPE_TEMPLATES: &[(ShapeKind, ShapeTemplate)] = &[
    (ShapeKind::Circle, ShapeTemplate::new("circle", "{radius}")),
    (
        ShapeKind::Ellipse,
        ShapeTemplate::new("ellipse", "{width},{height},{angle}"),
    ),
    (
        ShapeKind::Rectangle,
        ShapeTemplate::new("box", "{width},{height},{angle}"),
    ),
    (
        ShapeKind::CircleAnnulus,
        ShapeTemplate::new("annulus", "{inner_radius},{outer_radius}"),
    ),
    (
        ShapeKind::EllipseAnnulus,
        ShapeTemplate::new(
            "ellipse",
            "{inner_width},{inner_height},{outer_width},{outer_height},{angle}",
        ),
    ),
    (
        ShapeKind::RectangleAnnulus,
        ShapeTemplate::new(
            "box",
            "{inner_width},{inner_height},{outer_width},{outer_height},{angle}",
        ),
    ),
    (ShapeKind::Polygon, ShapeTemplate::new("polygon", "{vertices}")),
    (ShapeKind::Line, ShapeTemplate::new("line", "{start},{end}")),
    (ShapeKind::Point, ShapeTemplate::new("point", "")),
    (ShapeKind::Text, ShapeTemplate::new("text", "")),
];

/// Frame keyword and shape clause of one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedShape {
    pub frame: &'static str,
    pub shape: String,
}

/// Outcome of encoding one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    Encoded(EncodedShape),
    /// The region cannot be written in this dialect; the reason is attached.
    Skipped(String),
}

/// Renders region geometry as DS9 shape clauses.
#[derive(Debug, Clone)]
pub struct ShapeEncoder {
    precision: usize,
    frames: HashMap<&'static str, &'static str>,
    templates: HashMap<ShapeKind, ShapeTemplate>,
}

impl ShapeEncoder {
    pub fn new(precision: usize) -> Self {
        Self {
            precision,
            frames: FRAME_MAPPING.iter().copied().collect(),
            templates: SHAPE_TEMPLATES.iter().copied().collect(),
        }
    }

    /// Encode one region.
    ///
    /// Regions whose frame or shape has no DS9 counterpart are skipped, not
    /// rejected. Missing frame information or template values are errors.
    pub fn encode(&self, region: &Region) -> Result<Encoding, RegionError> {
        let frame_name = frame_name(region)?;
        let Some(frame) = self.frames.get(frame_name.as_str()).copied() else {
            return Ok(Encoding::Skipped(format!(
                "Cannot serialize region with frame={}, skipping",
                frame_name
            )));
        };

        let kind = region.kind().canonical();
        let Some(template) = self.templates.get(&kind) else {
            return Ok(Encoding::Skipped(format!(
                "Cannot serialize region shape \"{}\", skipping",
                kind.name()
            )));
        };

        let geometry = region.geometry.canonical();
        let params = geometry.params();

        if kind == ShapeKind::Polygon {
            let vertices = params
                .iter()
                .find_map(|(name, value)| match value {
                    ParamValue::Points(coords) if *name == "vertices" => Some(coords.len()),
                    _ => None,
                })
                .unwrap_or(0);
            if vertices < MIN_POLYGON_VERTICES {
                return Err(RegionError::invalid_format(format!(
                    "{} has {} vertices, DS9 polygons need at least {}",
                    region, vertices, MIN_POLYGON_VERTICES
                )));
            }
        }

        let center = params
            .iter()
            .find_map(|(name, value)| match value {
                ParamValue::Point(coord) if *name == "center" => Some(self.render_center(coord)),
                _ => None,
            })
            .unwrap_or_default();

        let rendered: HashMap<&str, String> = params
            .iter()
            .filter(|(name, _)| !matches!(*name, "center" | "text"))
            .map(|(name, value)| (*name, self.render(value)))
            .collect();
        let shape_params = fill_template(template.params, &rendered).map_err(|placeholder| {
            RegionError::MissingTemplateValue {
                region: region.to_string(),
                placeholder,
            }
        })?;

        let args: Vec<&str> = [center.as_str(), shape_params.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();

        Ok(Encoding::Encoded(EncodedShape {
            frame,
            shape: format!("{}({})", template.name, args.join(",")),
        }))
    }

    fn render(&self, value: &ParamValue) -> String {
        let p = self.precision;
        match value {
            ParamValue::Number(n) => format!("{:.p$}", n),
            ParamValue::Quantity(angle) | ParamValue::Angle(angle) => {
                format!("{:.p$}", angle.degrees())
            }
            ParamValue::Point(coord) => self.render_coord(coord),
            ParamValue::Points(coords) => coords
                .iter()
                .map(|c| self.render_coord(c))
                .collect::<Vec<_>>()
                .join(","),
            ParamValue::Text(text) => text.clone(),
        }
    }

    fn render_coord(&self, coord: &Coord) -> String {
        let p = self.precision;
        match coord {
            Coord::Pixel(pix) => format!("{:.p$},{:.p$}", pix.x + 1.0, pix.y + 1.0),
            Coord::Sky(sky) => format!(
                "{:.p$},{:.p$}",
                sky.lon.degrees().rem_euclid(360.0),
                sky.lat.degrees()
            ),
        }
    }

    /// Center as written for a region.
    ///
    /// DS9 pixels are 1-based, so pixel centers are shifted by one and
    /// written at full precision. Sky centers use the configured precision.
    fn render_center(&self, coord: &Coord) -> String {
        match coord {
            Coord::Pixel(pix) => format!("{},{}", pix.x + 1.0, pix.y + 1.0),
            Coord::Sky(_) => self.render_coord(coord),
        }
    }
}

/// Name of the frame a region is expressed in.
///
/// Sky regions take it from the first of center, vertices and start.
fn frame_name(region: &Region) -> Result<String, RegionError> {
    if let Geometry::Pixel(_) = region.geometry {
        return Ok("image".to_string());
    }

    let params = region.params();
    let lookup = |wanted: &str| {
        params
            .iter()
            .find(|(name, _)| *name == wanted)
            .and_then(|(_, value)| match value {
                ParamValue::Point(coord) => Some(coord.clone()),
                ParamValue::Points(coords) => coords.first().cloned(),
                _ => None,
            })
    };

    match lookup("center")
        .or_else(|| lookup("vertices"))
        .or_else(|| lookup("start"))
    {
        Some(Coord::Sky(sky)) => Ok(sky.frame.name().to_string()),
        Some(Coord::Pixel(_)) => Ok("image".to_string()),
        None => Err(RegionError::UndeterminedFrame {
            region: region.to_string(),
        }),
    }
}

/// Substitute `{name}` placeholders. Returns the first unmatched name on failure.
fn fill_template(template: &str, values: &HashMap<&str, String>) -> Result<String, String> {
    let mut out = String::with_capacity(template.len() * 4);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            // Unterminated brace, keep it literally
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let name = &after[..close];
        let value = values.get(name).ok_or_else(|| name.to_string())?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Angle, PixCoord, Shape, SkyCoord, SkyFrame};

    fn encode(region: &Region) -> EncodedShape {
        match ShapeEncoder::new(8).encode(region).unwrap() {
            Encoding::Encoded(shape) => shape,
            Encoding::Skipped(reason) => panic!("Unexpected skip: {reason}"),
        }
    }

    #[test]
    fn test_pixel_circle_literal() {
        let region = Region::pixel(Shape::Circle {
            center: PixCoord::new(9.0, 9.0),
            radius: 5.0,
        });
        let encoded = encode(&region);
        assert_eq!(encoded.frame, "image");
        assert_eq!(encoded.shape, "circle(10,10,5.00000000)");
    }

    #[test]
    fn test_pixel_center_full_precision() {
        let region = Region::pixel(Shape::Point {
            center: PixCoord::new(0.25, 1.5),
        });
        assert_eq!(encode(&region).shape, "point(1.25,2.5)");
    }

    #[test]
    fn test_sky_ellipse() {
        let region = Region::sky(Shape::Ellipse {
            center: SkyCoord::from_degrees(10.5, -20.25, SkyFrame::Fk5),
            width: Angle::from_degrees(0.5),
            height: Angle::from_arcsec(36.0),
            angle: Angle::from_degrees(30.0),
        });
        let encoded = encode(&region);
        assert_eq!(encoded.frame, "fk5");
        assert_eq!(
            encoded.shape,
            "ellipse(10.50000000,-20.25000000,0.50000000,0.01000000,30.00000000)"
        );
    }

    #[test]
    fn test_ecliptic_frame_keyword() {
        let region = Region::sky(Shape::Point {
            center: SkyCoord::from_degrees(1.0, 2.0, SkyFrame::GeocentricTrueEcliptic),
        });
        assert_eq!(encode(&region).frame, "ecliptic");
    }

    #[test]
    fn test_rectangle_is_box() {
        let region = Region::pixel(Shape::Rectangle {
            center: PixCoord::new(0.0, 0.0),
            width: 4.0,
            height: 2.0,
            angle: Angle::from_degrees(45.0),
        });
        assert_eq!(
            encode(&region).shape,
            "box(1,1,4.00000000,2.00000000,45.00000000)"
        );
    }

    #[test]
    fn test_annulus_templates() {
        let region = Region::pixel(Shape::CircleAnnulus {
            center: PixCoord::new(1.0, 1.0),
            inner_radius: 2.0,
            outer_radius: 3.0,
        });
        assert_eq!(encode(&region).shape, "annulus(2,2,2.00000000,3.00000000)");

        let region = Region::pixel(Shape::EllipseAnnulus {
            center: PixCoord::new(1.0, 1.0),
            inner_width: 1.0,
            outer_width: 2.0,
            inner_height: 3.0,
            outer_height: 4.0,
            angle: Angle::from_degrees(0.0),
        });
        assert_eq!(
            ShapeEncoder::new(1).encode(&region).unwrap(),
            Encoding::Encoded(EncodedShape {
                frame: "image",
                shape: "ellipse(2,2,1.0,3.0,2.0,4.0,0.0)".into(),
            })
        );
    }

    #[test]
    fn test_polygon_has_no_center() {
        let region = Region::pixel(Shape::Polygon {
            vertices: vec![
                PixCoord::new(0.0, 0.0),
                PixCoord::new(2.0, 0.0),
                PixCoord::new(1.0, 1.0),
            ],
        });
        let encoded = ShapeEncoder::new(2).encode(&region).unwrap();
        assert_eq!(
            encoded,
            Encoding::Encoded(EncodedShape {
                frame: "image",
                shape: "polygon(1.00,1.00,3.00,1.00,2.00,2.00)".into(),
            })
        );
    }

    #[test]
    fn test_sky_polygon_frame_from_vertices() {
        let region = Region::sky(Shape::Polygon {
            vertices: vec![
                SkyCoord::from_degrees(1.0, 1.0, SkyFrame::Galactic),
                SkyCoord::from_degrees(2.0, 1.0, SkyFrame::Galactic),
                SkyCoord::from_degrees(2.0, 2.0, SkyFrame::Galactic),
            ],
        });
        assert_eq!(encode(&region).frame, "galactic");
    }

    #[test]
    fn test_line_frame_from_start() {
        let region = Region::sky(Shape::Line {
            start: SkyCoord::from_degrees(1.0, 2.0, SkyFrame::Icrs),
            end: SkyCoord::from_degrees(3.0, 4.0, SkyFrame::Icrs),
        });
        let encoded = ShapeEncoder::new(1).encode(&region).unwrap();
        assert_eq!(
            encoded,
            Encoding::Encoded(EncodedShape {
                frame: "icrs",
                shape: "line(1.0,2.0,3.0,4.0)".into(),
            })
        );
    }

    #[test]
    fn test_regular_polygon_written_as_polygon() {
        let region = Region::pixel(Shape::RegularPolygon {
            center: PixCoord::new(9.0, 9.0),
            nvertices: 4,
            radius: 2.0,
            angle: Angle::from_degrees(0.0),
        });
        let shape = encode(&region).shape;
        assert!(shape.starts_with("polygon(10.00000000,12.00000000,"));
        assert_eq!(shape.matches(',').count(), 7);
    }

    #[test]
    fn test_degenerate_polygon_fails() {
        let region = Region::pixel(Shape::Polygon {
            vertices: vec![PixCoord::new(0.0, 0.0), PixCoord::new(1.0, 1.0)],
        });
        assert!(matches!(
            ShapeEncoder::new(8).encode(&region),
            Err(RegionError::InvalidFormat { .. })
        ));

        let region = Region::pixel(Shape::RegularPolygon {
            center: PixCoord::new(5.0, 5.0),
            nvertices: 0,
            radius: 2.0,
            angle: Angle::from_degrees(0.0),
        });
        assert!(matches!(
            ShapeEncoder::new(8).encode(&region),
            Err(RegionError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_sky_longitude_wraps() {
        let region = Region::sky(Shape::Point {
            center: SkyCoord::from_degrees(-10.0, 5.0, SkyFrame::Icrs),
        });
        assert_eq!(encode(&region).shape, "point(350.00000000,5.00000000)");

        let region = Region::sky(Shape::Line {
            start: SkyCoord::from_degrees(370.0, 0.0, SkyFrame::Icrs),
            end: SkyCoord::from_degrees(-0.5, 0.0, SkyFrame::Icrs),
        });
        assert_eq!(
            ShapeEncoder::new(1).encode(&region).unwrap(),
            Encoding::Encoded(EncodedShape {
                frame: "icrs",
                shape: "line(10.0,0.0,359.5,0.0)".into(),
            })
        );
    }

    #[test]
    fn test_empty_sky_polygon_has_no_frame() {
        let region = Region::sky(Shape::Polygon { vertices: vec![] });
        assert!(matches!(
            ShapeEncoder::new(8).encode(&region),
            Err(RegionError::UndeterminedFrame { .. })
        ));
    }

    #[test]
    fn test_unmapped_frame_is_skipped() {
        let region = Region::sky(Shape::Circle {
            center: SkyCoord::from_degrees(1.0, 2.0, SkyFrame::Other("altaz".into())),
            radius: Angle::from_degrees(1.0),
        });
        match ShapeEncoder::new(8).encode(&region).unwrap() {
            Encoding::Skipped(reason) => assert!(reason.contains("frame=altaz")),
            other => panic!("Expected skip, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_template_is_skipped() {
        let mut encoder = ShapeEncoder::new(8);
        encoder.templates.remove(&ShapeKind::Text);

        let region = Region::pixel(Shape::Text {
            center: PixCoord::new(0.0, 0.0),
            text: "t".into(),
        });
        assert!(matches!(
            encoder.encode(&region).unwrap(),
            Encoding::Skipped(_)
        ));
    }

    #[test]
    fn test_missing_placeholder_fails() {
        let mut encoder = ShapeEncoder::new(8);
        encoder
            .templates
            .insert(ShapeKind::Circle, ShapeTemplate::new("circle", "{diameter}"));

        let region = Region::pixel(Shape::Circle {
            center: PixCoord::new(0.0, 0.0),
            radius: 1.0,
        });
        match encoder.encode(&region) {
            Err(RegionError::MissingTemplateValue {
                region,
                placeholder,
            }) => {
                assert_eq!(placeholder, "diameter");
                assert_eq!(region, "pixel circle region");
            }
            other => panic!("Expected MissingTemplateValue, got {other:?}"),
        }
    }

    #[test]
    fn test_fill_template() {
        let values: HashMap<&str, String> =
            [("a", "1".to_string()), ("b", "2".to_string())].into();
        assert_eq!(fill_template("{a},{b}", &values).unwrap(), "1,2");
        assert_eq!(fill_template("", &values).unwrap(), "");
        assert_eq!(fill_template("{c}", &values).unwrap_err(), "c");
    }
}
