//! Regions: geometry plus free-form metadata and visual style.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::coord::{PixCoord, SkyCoord};
use crate::model::shape::{ParamValue, Shape, ShapeKind};

/// Shape plus the coordinate space it lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "space", content = "shape", rename_all = "lowercase")]
pub enum Geometry {
    Pixel(Shape<PixCoord>),
    Sky(Shape<SkyCoord>),
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Pixel(shape) => shape.kind(),
            Geometry::Sky(shape) => shape.kind(),
        }
    }

    pub fn is_pixel(&self) -> bool {
        matches!(self, Geometry::Pixel(_))
    }

    pub fn params(&self) -> Vec<(&'static str, ParamValue)> {
        match self {
            Geometry::Pixel(shape) => shape.params(),
            Geometry::Sky(shape) => shape.params(),
        }
    }

    /// The geometry as it is written out (regular polygons become polygons).
    pub fn canonical(&self) -> Cow<'_, Geometry> {
        let rewritten = match self {
            Geometry::Pixel(shape) => shape.to_canonical().map(Geometry::Pixel),
            Geometry::Sky(shape) => shape.to_canonical().map(Geometry::Sky),
        };
        match rewritten {
            Some(geometry) => Cow::Owned(geometry),
            None => Cow::Borrowed(self),
        }
    }
}

/// Line style of a region outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

/// Descriptive metadata of a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionMeta {
    /// Free-text label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Whether the region is included (as opposed to excluded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<bool>,

    /// Per-region tags. Multi-valued.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Any other key/value pair, passed through where the format allows it.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, String>,
}

impl RegionMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_include(mut self, include: bool) -> Self {
        self.include = Some(include);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Visual style of a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionVisual {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linewidth: Option<f64>,
    /// Outline width of point markers; takes precedence over `linewidth`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markeredgewidth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linestyle: Option<LineStyle>,
    /// Dash and gap lengths for dashed outlines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashes: Option<[u32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fontname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fontsize: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fontweight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fontstyle: Option<String>,
    /// Marker code of point regions ("o", "s", "D", "x", "+", "^", "*").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markersize: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, String>,
}

impl RegionVisual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_linewidth(mut self, width: f64) -> Self {
        self.linewidth = Some(width);
        self
    }

    pub fn with_linestyle(mut self, style: LineStyle) -> Self {
        self.linestyle = Some(style);
        self
    }

    pub fn with_dashes(mut self, dash: u32, gap: u32) -> Self {
        self.dashes = Some([dash, gap]);
        self
    }

    pub fn with_font(mut self, name: impl Into<String>) -> Self {
        self.fontname = Some(name.into());
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>, size: Option<f64>) -> Self {
        self.marker = Some(marker.into());
        self.markersize = size;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub geometry: Geometry,

    #[serde(default, skip_serializing_if = "RegionMeta::is_empty")]
    pub meta: RegionMeta,

    #[serde(default, skip_serializing_if = "RegionVisual::is_empty")]
    pub visual: RegionVisual,
}

impl Region {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            meta: RegionMeta::default(),
            visual: RegionVisual::default(),
        }
    }

    /// Create a region in pixel space.
    pub fn pixel(shape: Shape<PixCoord>) -> Self {
        Self::new(Geometry::Pixel(shape))
    }

    /// Create a region on the sky.
    pub fn sky(shape: Shape<SkyCoord>) -> Self {
        Self::new(Geometry::Sky(shape))
    }

    pub fn with_meta(mut self, meta: RegionMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_visual(mut self, visual: RegionVisual) -> Self {
        self.visual = visual;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn is_pixel(&self) -> bool {
        self.geometry.is_pixel()
    }

    pub fn params(&self) -> Vec<(&'static str, ParamValue)> {
        self.geometry.params()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let space = if self.is_pixel() { "pixel" } else { "sky" };
        write!(f, "{} {} region", space, self.kind().name())
    }
}

/// An ordered collection of regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Regions(Vec<Region>);

impl Regions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, region: Region) {
        self.0.push(region);
    }

    pub fn into_vec(self) -> Vec<Region> {
        self.0
    }
}

impl From<Vec<Region>> for Regions {
    fn from(regions: Vec<Region>) -> Self {
        Self(regions)
    }
}

impl FromIterator<Region> for Regions {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Regions {
    type Item = Region;
    type IntoIter = std::vec::IntoIter<Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Deref for Regions {
    type Target = [Region];

    fn deref(&self) -> &[Region] {
        &self.0
    }
}
