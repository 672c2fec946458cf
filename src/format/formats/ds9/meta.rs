//! Translation of region metadata into DS9 attributes.

use std::fmt;

use indexmap::IndexMap;

use crate::format::error::RegionError;
use crate::model::{Geometry, LineStyle, Region, Shape};

/// Non-visual attribute keys DS9 accepts.
pub const META_KEYS: &[&str] = &[
    "text", "select", "highlite", "fixed", "edit", "move", "rotate", "delete", "include", "tag",
];

/// Visual attribute keys DS9 accepts.
pub const VISUAL_KEYS: &[&str] = &[
    "color",
    "textangle",
    "textrotate",
    "dash",
    "dashlist",
    "width",
    "font",
    "fill",
    "point",
];

/// DS9 point symbols and the marker codes they correspond to.
pub const SYMBOLS: &[(&str, &str)] = &[
    ("circle", "o"),
    ("box", "s"),
    ("diamond", "D"),
    ("x", "x"),
    ("cross", "+"),
    ("arrow", "^"),
    ("boxcircle", "*"),
];

pub const DEFAULT_FONT_NAME: &str = "helvetica";
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_FONT_WEIGHT: &str = "normal";
pub const DEFAULT_FONT_STYLE: &str = "roman";
pub const DEFAULT_MARKER_SIZE: f64 = 11.0;

/// Whether DS9 accepts `key` as a region attribute.
pub fn is_known_key(key: &str) -> bool {
    META_KEYS.contains(&key) || VISUAL_KEYS.contains(&key)
}

/// DS9 symbol name for a marker code.
pub fn symbol_for_marker(marker: &str) -> Option<&'static str> {
    SYMBOLS
        .iter()
        .find(|(_, code)| *code == marker)
        .map(|(symbol, _)| *symbol)
}

/// Marker code for a DS9 symbol name.
pub fn marker_for_symbol(symbol: &str) -> Option<&'static str> {
    SYMBOLS
        .iter()
        .find(|(name, _)| *name == symbol)
        .map(|(_, code)| *code)
}

/// Attributes of one DS9 region line (or of the `global` line).
///
/// Single-valued attributes keep their insertion order. Tags are
/// multi-valued and kept apart; they are written last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ds9Attributes {
    pairs: IndexMap<String, String>,
    tags: Vec<String>,
}

impl Ds9Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    /// Remove an attribute, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.pairs.shift_remove(key)
    }

    pub fn push_tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.tags.is_empty()
    }

    /// Drop every attribute DS9 does not know.
    fn retain_known(&mut self) {
        self.pairs.retain(|key, _| {
            let known = is_known_key(key);
            if !known {
                log::debug!("Dropping attribute '{}' not supported by DS9", key);
            }
            known
        });
    }
}

impl fmt::Display for Ds9Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self.pairs.iter().map(|(k, v)| format!("{}={}", k, v));
        let tags = self.tags.iter().map(|t| format!("tag={{{}}}", t));
        let tokens: Vec<String> = pairs.chain(tags).collect();
        f.write_str(&tokens.join(" "))
    }
}

/// Translate a region's metadata and visual style into DS9 attributes.
///
/// Keys DS9 does not accept are dropped. A marker without a DS9 symbol is
/// an error.
pub fn translate(region: &Region) -> Result<Ds9Attributes, RegionError> {
    let meta = &region.meta;
    let visual = &region.visual;
    let mut attrs = Ds9Attributes::new();

    let shape_text = match &region.geometry {
        Geometry::Pixel(Shape::Text { text, .. }) | Geometry::Sky(Shape::Text { text, .. }) => {
            Some(text.as_str())
        }
        _ => None,
    };
    let extra_text = meta.extra.get("text").map(|text| unbrace(text));
    if let Some(text) = meta.text.as_deref().or(extra_text).or(shape_text) {
        attrs.insert("text", format!("{{{}}}", text));
    }

    let include = match (meta.include, meta.extra.get("include")) {
        (Some(include), _) => include,
        (None, Some(value)) => include_flag(value)?,
        (None, None) => true,
    };
    attrs.insert("include", if include { "1" } else { "0" });

    for (key, value) in &meta.extra {
        match key.as_str() {
            "tag" => attrs.push_tag(value.clone()),
            "text" | "include" => {}
            _ if !attrs.contains(key) => attrs.insert(key.clone(), value.clone()),
            _ => {}
        }
    }

    if let Some(color) = &visual.color {
        attrs.insert("color", color.clone());
    }

    if let Some(width) = visual.markeredgewidth.or(visual.linewidth) {
        attrs.insert("width", width.to_string());
    }

    if visual.fontname.is_some()
        || visual.fontsize.is_some()
        || visual.fontweight.is_some()
        || visual.fontstyle.is_some()
    {
        let name = visual.fontname.as_deref().unwrap_or(DEFAULT_FONT_NAME);
        let size = visual.fontsize.unwrap_or(DEFAULT_FONT_SIZE);
        let weight = visual.fontweight.as_deref().unwrap_or(DEFAULT_FONT_WEIGHT);
        let style = visual
            .fontstyle
            .as_deref()
            .unwrap_or(DEFAULT_FONT_STYLE)
            .replace("normal", "roman");
        attrs.insert("font", format!("\"{} {} {} {}\"", name, size, weight, style));
    }

    if visual.linestyle == Some(LineStyle::Dashed) {
        attrs.insert("dash", "1");
        if let Some([dash, gap]) = visual.dashes {
            attrs.insert("dashlist", format!("{} {}", dash, gap));
        }
    }

    if let Some(marker) = &visual.marker {
        let symbol = symbol_for_marker(marker).ok_or_else(|| RegionError::UnknownMarker {
            marker: marker.clone(),
            format: "ds9".to_string(),
        })?;
        let size = visual.markersize.unwrap_or(DEFAULT_MARKER_SIZE);
        attrs.insert("point", format!("{} {}", symbol, size));
    }

    if let Some(fill) = visual.fill {
        attrs.insert("fill", if fill { "1" } else { "0" });
    }

    for (key, value) in &visual.extra {
        if !attrs.contains(key) {
            attrs.insert(key.clone(), value.clone());
        }
    }

    for tag in &meta.tags {
        attrs.push_tag(tag.clone());
    }

    attrs.retain_known();
    Ok(attrs)
}

/// Text with one pair of enclosing braces removed.
fn unbrace(text: &str) -> &str {
    text.strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(text)
}

/// Inclusion flag given as a free-form metadata value.
fn include_flag(value: &str) -> Result<bool, RegionError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(RegionError::invalid_format(format!(
            "invalid include value '{}'",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PixCoord, RegionMeta, RegionVisual};

    fn point_region() -> Region {
        Region::pixel(Shape::Point {
            center: PixCoord::new(1.0, 1.0),
        })
    }

    #[test]
    fn test_include_defaults_to_one() {
        let attrs = translate(&point_region()).unwrap();
        assert_eq!(attrs.get("include"), Some("1"));

        let excluded = point_region().with_meta(RegionMeta::new().with_include(false));
        assert_eq!(translate(&excluded).unwrap().get("include"), Some("0"));
    }

    #[test]
    fn test_include_from_extra() {
        let excluded = point_region().with_meta(RegionMeta::new().with_extra("include", "0"));
        assert_eq!(translate(&excluded).unwrap().get("include"), Some("0"));

        // The typed field wins over the bag
        let meta = RegionMeta::new()
            .with_include(true)
            .with_extra("include", "false");
        let region = point_region().with_meta(meta);
        assert_eq!(translate(&region).unwrap().get("include"), Some("1"));

        let bad = point_region().with_meta(RegionMeta::new().with_extra("include", "maybe"));
        assert!(matches!(
            translate(&bad),
            Err(RegionError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_text_from_extra_is_braced() {
        let region = point_region().with_meta(RegionMeta::new().with_extra("text", "hello world"));
        assert_eq!(translate(&region).unwrap().get("text"), Some("{hello world}"));

        let region = point_region().with_meta(RegionMeta::new().with_extra("text", "{kept}"));
        assert_eq!(translate(&region).unwrap().get("text"), Some("{kept}"));

        let meta = RegionMeta::new().with_text("typed").with_extra("text", "bag");
        let region = point_region().with_meta(meta);
        assert_eq!(translate(&region).unwrap().get("text"), Some("{typed}"));
    }

    #[test]
    fn test_text_is_braced() {
        let region = point_region().with_meta(RegionMeta::new().with_text("my label"));
        assert_eq!(translate(&region).unwrap().get("text"), Some("{my label}"));
    }

    #[test]
    fn test_text_shape_supplies_label() {
        let region = Region::pixel(Shape::Text {
            center: PixCoord::new(0.0, 0.0),
            text: "hello".into(),
        });
        assert_eq!(translate(&region).unwrap().get("text"), Some("{hello}"));
    }

    #[test]
    fn test_width_from_either_source() {
        let line = point_region().with_visual(RegionVisual::new().with_linewidth(2.0));
        assert_eq!(translate(&line).unwrap().get("width"), Some("2"));

        let mut visual = RegionVisual::new().with_linewidth(2.0);
        visual.markeredgewidth = Some(3.0);
        let marker = point_region().with_visual(visual);
        assert_eq!(translate(&marker).unwrap().get("width"), Some("3"));
    }

    #[test]
    fn test_font_defaults() {
        let region = point_region().with_visual(RegionVisual::new().with_font("times"));
        assert_eq!(
            translate(&region).unwrap().get("font"),
            Some("\"times 10 normal roman\"")
        );

        let mut visual = RegionVisual::new().with_font("courier");
        visual.fontsize = Some(14.0);
        visual.fontweight = Some("bold".into());
        visual.fontstyle = Some("normal".into());
        let region = point_region().with_visual(visual);
        assert_eq!(
            translate(&region).unwrap().get("font"),
            Some("\"courier 14 bold roman\"")
        );
    }

    #[test]
    fn test_dash_pattern() {
        let region = point_region().with_visual(
            RegionVisual::new()
                .with_linestyle(LineStyle::Dashed)
                .with_dashes(8, 3),
        );
        let attrs = translate(&region).unwrap();
        assert_eq!(attrs.get("dash"), Some("1"));
        assert_eq!(attrs.get("dashlist"), Some("8 3"));

        // Dash lengths alone do not make a line dashed
        let solid = point_region().with_visual(RegionVisual::new().with_dashes(8, 3));
        let attrs = translate(&solid).unwrap();
        assert!(!attrs.contains("dash"));
        assert!(!attrs.contains("dashlist"));
    }

    #[test]
    fn test_marker_symbol() {
        let region = point_region().with_visual(RegionVisual::new().with_marker("D", None));
        assert_eq!(translate(&region).unwrap().get("point"), Some("diamond 11"));

        let region = point_region().with_visual(RegionVisual::new().with_marker("+", Some(5.0)));
        assert_eq!(translate(&region).unwrap().get("point"), Some("cross 5"));
    }

    #[test]
    fn test_unknown_marker_fails() {
        let region = point_region().with_visual(RegionVisual::new().with_marker("v", None));
        assert!(matches!(
            translate(&region),
            Err(RegionError::UnknownMarker { .. })
        ));
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let region = point_region()
            .with_meta(RegionMeta::new().with_extra("comment", "x").with_extra("edit", "0"))
            .with_visual(RegionVisual::new().with_extra("alpha", "0.5"));
        let attrs = translate(&region).unwrap();
        assert!(!attrs.contains("comment"));
        assert!(!attrs.contains("alpha"));
        assert_eq!(attrs.get("edit"), Some("0"));
    }

    #[test]
    fn test_tags_render_last() {
        let region = point_region().with_meta(RegionMeta::new().with_tag("a").with_tag("b c"));
        let attrs = translate(&region).unwrap();
        assert_eq!(attrs.tags(), &["a".to_string(), "b c".to_string()]);
        assert_eq!(attrs.to_string(), "include=1 tag={a} tag={b c}");
    }

    #[test]
    fn test_symbol_table_is_bijective() {
        for (symbol, marker) in SYMBOLS {
            assert_eq!(symbol_for_marker(marker), Some(*symbol));
            assert_eq!(marker_for_symbol(symbol), Some(*marker));
        }
    }
}
