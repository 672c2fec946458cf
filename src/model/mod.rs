//! Region data model consumed by the format plugins.
//!
//! Geometry is a closed set of shape kinds with typed parameters,
//! positioned either in pixel space or on the sky.

mod coord;
mod region;
mod shape;

pub use coord::{Angle, Coord, Coordinate, PixCoord, SkyCoord, SkyFrame};
pub use region::{Geometry, LineStyle, Region, RegionMeta, RegionVisual, Regions};
pub use shape::{ParamValue, Shape, ShapeKind};
