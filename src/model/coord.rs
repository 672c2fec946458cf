//! Coordinates and angles for pixel and sky regions.

use std::f64::consts::TAU;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::shape::ParamValue;

/// An angle, stored in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle {
    degrees: f64,
}

impl Angle {
    /// Create an angle from degrees.
    pub const fn from_degrees(degrees: f64) -> Self {
        Self { degrees }
    }

    /// Create an angle from arcminutes.
    pub fn from_arcmin(arcmin: f64) -> Self {
        Self::from_degrees(arcmin / 60.0)
    }

    /// Create an angle from arcseconds.
    pub fn from_arcsec(arcsec: f64) -> Self {
        Self::from_degrees(arcsec / 3600.0)
    }

    /// Create an angle from radians.
    pub fn from_radians(radians: f64) -> Self {
        Self::from_degrees(radians.to_degrees())
    }

    /// Value in degrees.
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Value in radians.
    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }
}

/// A position in 0-based pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixCoord {
    pub x: f64,
    pub y: f64,
}

impl PixCoord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Celestial reference frame of a sky coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SkyFrame {
    Icrs,
    Fk5,
    Fk4,
    Galactic,
    GeocentricTrueEcliptic,
    /// Any frame without a dedicated variant (e.g. "altaz").
    Other(String),
}

impl SkyFrame {
    /// Lowercase frame name, as used in frame mappings.
    pub fn name(&self) -> &str {
        match self {
            SkyFrame::Icrs => "icrs",
            SkyFrame::Fk5 => "fk5",
            SkyFrame::Fk4 => "fk4",
            SkyFrame::Galactic => "galactic",
            SkyFrame::GeocentricTrueEcliptic => "geocentrictrueecliptic",
            SkyFrame::Other(name) => name,
        }
    }

    /// Whether longitudes in this frame are conventionally given in hours.
    pub fn is_equatorial(&self) -> bool {
        matches!(self, SkyFrame::Icrs | SkyFrame::Fk5 | SkyFrame::Fk4)
    }
}

impl From<String> for SkyFrame {
    fn from(name: String) -> Self {
        match name.to_lowercase().as_str() {
            "icrs" => SkyFrame::Icrs,
            "fk5" => SkyFrame::Fk5,
            "fk4" => SkyFrame::Fk4,
            "galactic" => SkyFrame::Galactic,
            "geocentrictrueecliptic" => SkyFrame::GeocentricTrueEcliptic,
            _ => SkyFrame::Other(name),
        }
    }
}

impl From<SkyFrame> for String {
    fn from(frame: SkyFrame) -> Self {
        frame.name().to_string()
    }
}

impl fmt::Display for SkyFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A position on the sky.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyCoord {
    pub lon: Angle,
    pub lat: Angle,
    pub frame: SkyFrame,
}

impl SkyCoord {
    pub fn new(lon: Angle, lat: Angle, frame: SkyFrame) -> Self {
        Self { lon, lat, frame }
    }

    /// Create a coordinate from longitude/latitude in degrees.
    pub fn from_degrees(lon: f64, lat: f64, frame: SkyFrame) -> Self {
        Self::new(Angle::from_degrees(lon), Angle::from_degrees(lat), frame)
    }
}

/// A coordinate of either space, used when parameters are inspected generically.
#[derive(Debug, Clone, PartialEq)]
pub enum Coord {
    Pixel(PixCoord),
    Sky(SkyCoord),
}

/// Coordinate types a [`Shape`](crate::model::Shape) can be positioned with.
///
/// Each coordinate space fixes how lengths are expressed: plain numbers in
/// pixel space and angular sizes on the sky.
pub trait Coordinate: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Length type for radii, widths and heights.
    type Length: Copy + fmt::Debug + PartialEq + Serialize + DeserializeOwned;

    /// Wrap this coordinate for generic inspection.
    fn to_coord(&self) -> Coord;

    /// Describe a length of this space as a shape parameter.
    fn length_param(length: Self::Length) -> ParamValue;

    /// Move `distance` along `direction`.
    ///
    /// Pixel directions are counter-clockwise from the +x axis, sky
    /// directions are position angles east of north.
    fn offset(&self, distance: Self::Length, direction: Angle) -> Self;
}

impl Coordinate for PixCoord {
    type Length = f64;

    fn to_coord(&self) -> Coord {
        Coord::Pixel(*self)
    }

    fn length_param(length: f64) -> ParamValue {
        ParamValue::Number(length)
    }

    fn offset(&self, distance: f64, direction: Angle) -> Self {
        let theta = direction.radians();
        PixCoord::new(
            self.x + distance * theta.cos(),
            self.y + distance * theta.sin(),
        )
    }
}

impl Coordinate for SkyCoord {
    type Length = Angle;

    fn to_coord(&self) -> Coord {
        Coord::Sky(self.clone())
    }

    fn length_param(length: Angle) -> ParamValue {
        ParamValue::Quantity(length)
    }

    fn offset(&self, distance: Angle, direction: Angle) -> Self {
        let (lon, lat) = (self.lon.radians(), self.lat.radians());
        let (d, pa) = (distance.radians(), direction.radians());

        let lat2 = (lat.sin() * d.cos() + lat.cos() * d.sin() * pa.cos()).asin();
        let dlon = (pa.sin() * d.sin() * lat.cos()).atan2(d.cos() - lat.sin() * lat2.sin());

        SkyCoord::new(
            Angle::from_radians((lon + dlon).rem_euclid(TAU)),
            Angle::from_radians(lat2),
            self.frame.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_units() {
        assert!((Angle::from_arcsec(3600.0).degrees() - 1.0).abs() < 1e-12);
        assert!((Angle::from_arcmin(30.0).degrees() - 0.5).abs() < 1e-12);
        assert!((Angle::from_radians(std::f64::consts::PI).degrees() - 180.0).abs() < 1e-12);
    }

    #[test]
    fn test_sky_frame_names() {
        assert_eq!(SkyFrame::from("FK5".to_string()), SkyFrame::Fk5);
        assert_eq!(
            SkyFrame::from("altaz".to_string()),
            SkyFrame::Other("altaz".into())
        );
        assert_eq!(SkyFrame::GeocentricTrueEcliptic.name(), "geocentrictrueecliptic");
        assert!(SkyFrame::Icrs.is_equatorial());
        assert!(!SkyFrame::Galactic.is_equatorial());
    }

    #[test]
    fn test_pixel_offset() {
        let p = PixCoord::new(1.0, 1.0).offset(2.0, Angle::from_degrees(90.0));
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sky_offset_north() {
        let c = SkyCoord::from_degrees(10.0, 20.0, SkyFrame::Icrs);
        let moved = c.offset(Angle::from_degrees(1.0), Angle::from_degrees(0.0));
        assert!((moved.lon.degrees() - 10.0).abs() < 1e-9);
        assert!((moved.lat.degrees() - 21.0).abs() < 1e-9);
        assert_eq!(moved.frame, SkyFrame::Icrs);
    }
}
