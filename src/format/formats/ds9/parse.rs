//! DS9 region text parsing.

use crate::format::error::RegionError;
use crate::format::formats::ds9::meta::{Ds9Attributes, META_KEYS, marker_for_symbol};
use crate::format::traits::ImportOptions;
use crate::model::{
    Angle, Coordinate, Geometry, LineStyle, PixCoord, Region, RegionMeta, RegionVisual, Shape,
    SkyCoord, SkyFrame,
};

/// DS9 frames that exist but cannot be represented.
const UNSUPPORTED_FRAMES: &[&str] = &[
    "physical",
    "linear",
    "amplifier",
    "detector",
    "wcs",
    "j2000",
    "b1950",
    "helioecliptic",
    "supergalactic",
];

/// Shape names this parser reads.
const SHAPE_NAMES: &[&str] = &[
    "circle", "ellipse", "box", "annulus", "polygon", "line", "point", "text",
];

#[derive(Debug, Clone, PartialEq)]
enum Frame {
    Image,
    Sky(SkyFrame),
}

impl Frame {
    fn from_keyword(keyword: &str) -> Option<Self> {
        let frame = match keyword {
            "image" => Frame::Image,
            "icrs" => Frame::Sky(SkyFrame::Icrs),
            "fk5" => Frame::Sky(SkyFrame::Fk5),
            "fk4" => Frame::Sky(SkyFrame::Fk4),
            "galactic" => Frame::Sky(SkyFrame::Galactic),
            "ecliptic" => Frame::Sky(SkyFrame::GeocentricTrueEcliptic),
            _ => return None,
        };
        Some(frame)
    }
}

/// One `;`-separated statement: the part before `#` and the attributes after it.
#[derive(Debug, Clone, PartialEq)]
struct Statement<'a> {
    body: &'a str,
    attributes: Option<&'a str>,
}

/// Parse a DS9 document into regions.
///
/// Shapes DS9 knows but this crate does not are skipped with a warning,
/// or rejected when `options.strict` is set.
pub fn parse_regions(text: &str, options: &ImportOptions) -> Result<Vec<Region>, RegionError> {
    log::info!("Parsing DS9 regions");

    let mut regions = Vec::new();
    let mut frame = Frame::Image;
    let mut global = Ds9Attributes::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix('#') {
            if let Some(shape) = commented_shape(comment) {
                log::debug!("Line {}: ignoring commented-out {} region", line_no, shape);
            }
            continue;
        }

        for statement in split_statements(trimmed) {
            let body = statement.body.trim();
            if body.is_empty() {
                continue;
            }

            let keyword = body.to_lowercase();
            if keyword == "global" || keyword.starts_with("global ") {
                let mut updated = parse_attributes(&body["global".len()..]);
                merge_attributes(&mut updated, &global);
                global = updated;
                continue;
            }
            if let Some(next) = Frame::from_keyword(&keyword) {
                frame = next;
                continue;
            }
            if UNSUPPORTED_FRAMES.contains(&keyword.as_str()) {
                return Err(RegionError::parse(
                    line_no,
                    format!("unsupported coordinate frame '{}'", body),
                ));
            }

            let mut attributes = statement
                .attributes
                .map(parse_attributes)
                .unwrap_or_default();
            merge_attributes(&mut attributes, &global);

            let region = parse_region(body, &frame, &attributes)
                .map_err(|message| RegionError::parse(line_no, message))?;
            match region {
                Some(region) => regions.push(region),
                None if options.strict => {
                    return Err(RegionError::parse(
                        line_no,
                        format!("unsupported shape in '{}'", body),
                    ));
                }
                None => log::warn!("Skipping unsupported DS9 shape on line {}: {}", line_no, body),
            }
        }
    }

    log::info!("Parsed {} DS9 regions", regions.len());
    Ok(regions)
}

/// Fill `target` with the pairs of `defaults` it does not set itself.
///
/// Tags are taken over only when `target` has none.
fn merge_attributes(target: &mut Ds9Attributes, defaults: &Ds9Attributes) {
    for (key, value) in defaults.pairs() {
        if !target.contains(key) {
            target.insert(key, value);
        }
    }
    if target.tags().is_empty() {
        for tag in defaults.tags() {
            target.push_tag(tag.clone());
        }
    }
}

/// Split a line on `;` and `#`, ignoring separators inside shape
/// arguments and inside delimited attribute values.
fn split_statements(line: &str) -> Vec<Statement<'_>> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut hash: Option<usize> = None;
    let mut depth = 0usize;
    let mut closer: Option<char> = None;

    for (i, ch) in line.char_indices() {
        if let Some(close) = closer {
            if ch == close {
                closer = None;
            }
            continue;
        }
        match ch {
            '(' if hash.is_none() => depth += 1,
            ')' if hash.is_none() => depth = depth.saturating_sub(1),
            '#' if depth == 0 && hash.is_none() => hash = Some(i),
            '{' if hash.is_some() => closer = Some('}'),
            '"' | '\'' if hash.is_some() => closer = Some(ch),
            ';' if depth == 0 => {
                statements.push(statement(line, start, hash, i));
                start = i + 1;
                hash = None;
            }
            _ => {}
        }
    }
    statements.push(statement(line, start, hash, line.len()));
    statements
}

fn statement(line: &str, start: usize, hash: Option<usize>, end: usize) -> Statement<'_> {
    match hash {
        Some(h) => Statement {
            body: &line[start..h],
            attributes: Some(&line[h + 1..end]),
        },
        None => Statement {
            body: &line[start..end],
            attributes: None,
        },
    }
}

/// Split attribute text into whitespace-separated tokens, keeping
/// `{...}`, `"..."` and `'...'` groups whole.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut closer: Option<char> = None;

    for (i, ch) in text.char_indices() {
        if let Some(close) = closer {
            if ch == close {
                closer = None;
            }
            continue;
        }
        match ch {
            c if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    tokens.push(&text[s..i]);
                }
            }
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
                closer = match ch {
                    '{' => Some('}'),
                    '"' | '\'' => Some(ch),
                    _ => None,
                };
            }
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

/// Parse `key=value` attribute text.
///
/// A token without `=` continues the previous value, as in
/// `point=circle 11`.
fn parse_attributes(text: &str) -> Ds9Attributes {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for token in tokenize(text) {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() && !key.contains(['{', '"', '\'']) => {
                pairs.push((key.to_lowercase(), value.to_string()));
            }
            _ => match pairs.last_mut() {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(token);
                }
                None => log::debug!("Ignoring DS9 property '{}'", token),
            },
        }
    }

    let mut attributes = Ds9Attributes::new();
    for (key, value) in pairs {
        if key == "tag" {
            attributes.push_tag(strip_delimiters(&value));
        } else {
            attributes.insert(key, value);
        }
    }
    attributes
}

/// Shape name of a comment that holds a region, like `# text(1,2) text={a}`.
fn commented_shape(comment: &str) -> Option<&'static str> {
    let comment = comment.trim_start().to_lowercase();
    SHAPE_NAMES
        .iter()
        .copied()
        .find(|name| comment.strip_prefix(*name).is_some_and(|rest| rest.starts_with('(')))
}

fn strip_delimiters(value: &str) -> &str {
    let value = value.trim();
    for (open, close) in [('{', '}'), ('"', '"'), ('\'', '\'')] {
        if let Some(inner) = value
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    value
}

/// Build one region from a shape statement. `Ok(None)` means the shape is
/// not supported.
fn parse_region(
    body: &str,
    frame: &Frame,
    attributes: &Ds9Attributes,
) -> Result<Option<Region>, String> {
    let (include, body) = match body.as_bytes().first() {
        Some(b'-') => (false, body[1..].trim_start()),
        Some(b'+') => (true, body[1..].trim_start()),
        _ => (true, body),
    };

    let open = body
        .find('(')
        .ok_or_else(|| format!("unrecognized statement '{}'", body))?;
    let close = body
        .rfind(')')
        .filter(|close| *close > open)
        .ok_or_else(|| format!("unterminated shape arguments in '{}'", body))?;
    if !body[close + 1..].trim().is_empty() {
        return Err(format!("unexpected text after shape in '{}'", body));
    }

    let name = body[..open].trim().to_lowercase();
    let args: Vec<&str> = body[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .collect();
    let text = attributes.get("text").map(strip_delimiters);

    let geometry = match frame {
        Frame::Image => build_shape(&PixelArgs, &name, &args, text)?.map(Geometry::Pixel),
        Frame::Sky(sky) => build_shape(&SkyArgs(sky.clone()), &name, &args, text)?.map(Geometry::Sky),
    };
    let Some(geometry) = geometry else {
        return Ok(None);
    };

    let is_text_shape = matches!(
        geometry,
        Geometry::Pixel(Shape::Text { .. }) | Geometry::Sky(Shape::Text { .. })
    );
    let (mut meta, visual) = untranslate(attributes, is_text_shape)?;
    if !include {
        meta.include = Some(false);
    }

    Ok(Some(Region::new(geometry).with_meta(meta).with_visual(visual)))
}

/// Reads shape arguments in one coordinate space.
trait ShapeArgs {
    type Coord: Coordinate;

    fn coord(&self, x: &str, y: &str) -> Result<Self::Coord, String>;
    fn length(&self, value: &str) -> Result<<Self::Coord as Coordinate>::Length, String>;
}

struct PixelArgs;

impl ShapeArgs for PixelArgs {
    type Coord = PixCoord;

    fn coord(&self, x: &str, y: &str) -> Result<PixCoord, String> {
        Ok(PixCoord::new(number(x)? - 1.0, number(y)? - 1.0))
    }

    fn length(&self, value: &str) -> Result<f64, String> {
        number(value)
    }
}

struct SkyArgs(SkyFrame);

impl ShapeArgs for SkyArgs {
    type Coord = SkyCoord;

    fn coord(&self, lon: &str, lat: &str) -> Result<SkyCoord, String> {
        let lon = if lon.contains(':') {
            let scale = if self.0.is_equatorial() { 15.0 } else { 1.0 };
            sexagesimal(lon)? * scale
        } else {
            degrees(lon)?
        };
        let lat = if lat.contains(':') {
            sexagesimal(lat)?
        } else {
            degrees(lat)?
        };
        Ok(SkyCoord::from_degrees(lon, lat, self.0.clone()))
    }

    fn length(&self, value: &str) -> Result<Angle, String> {
        if let Some(arcsec) = value.strip_suffix('"') {
            Ok(Angle::from_arcsec(number(arcsec)?))
        } else if let Some(arcmin) = value.strip_suffix('\'') {
            Ok(Angle::from_arcmin(number(arcmin)?))
        } else {
            Ok(Angle::from_degrees(degrees(value)?))
        }
    }
}

fn build_shape<A: ShapeArgs>(
    reader: &A,
    name: &str,
    args: &[&str],
    text: Option<&str>,
) -> Result<Option<Shape<A::Coord>>, String> {
    let arity_error = || format!("wrong number of arguments ({}) for {}", args.len(), name);
    let angle = |value: &str| degrees(value).map(Angle::from_degrees);
    let center = || reader.coord(args[0], args[1]);

    let shape = match (name, args.len()) {
        ("circle", 3) => Shape::Circle {
            center: center()?,
            radius: reader.length(args[2])?,
        },
        ("ellipse", 5) => Shape::Ellipse {
            center: center()?,
            width: reader.length(args[2])?,
            height: reader.length(args[3])?,
            angle: angle(args[4])?,
        },
        ("ellipse", 7) => Shape::EllipseAnnulus {
            center: center()?,
            inner_width: reader.length(args[2])?,
            inner_height: reader.length(args[3])?,
            outer_width: reader.length(args[4])?,
            outer_height: reader.length(args[5])?,
            angle: angle(args[6])?,
        },
        ("box", 4 | 5) => Shape::Rectangle {
            center: center()?,
            width: reader.length(args[2])?,
            height: reader.length(args[3])?,
            angle: match args.get(4) {
                Some(value) => angle(*value)?,
                None => Angle::from_degrees(0.0),
            },
        },
        ("box", 7) => Shape::RectangleAnnulus {
            center: center()?,
            inner_width: reader.length(args[2])?,
            inner_height: reader.length(args[3])?,
            outer_width: reader.length(args[4])?,
            outer_height: reader.length(args[5])?,
            angle: angle(args[6])?,
        },
        ("annulus", 4) => Shape::CircleAnnulus {
            center: center()?,
            inner_radius: reader.length(args[2])?,
            outer_radius: reader.length(args[3])?,
        },
        ("polygon", n) if n >= 6 && n % 2 == 0 => Shape::Polygon {
            vertices: args
                .chunks_exact(2)
                .map(|pair| reader.coord(pair[0], pair[1]))
                .collect::<Result<_, _>>()?,
        },
        ("line", 4) => Shape::Line {
            start: reader.coord(args[0], args[1])?,
            end: reader.coord(args[2], args[3])?,
        },
        ("point", 2) => Shape::Point { center: center()? },
        ("text", 2) => Shape::Text {
            center: center()?,
            text: text.unwrap_or_default().to_string(),
        },
        ("circle" | "ellipse" | "box" | "annulus" | "polygon" | "line" | "point" | "text", _) => {
            return Err(arity_error());
        }
        _ => return Ok(None),
    };
    Ok(Some(shape))
}

/// Turn parsed attributes back into region metadata and visual style.
fn untranslate(
    attributes: &Ds9Attributes,
    is_text_shape: bool,
) -> Result<(RegionMeta, RegionVisual), String> {
    let mut meta = RegionMeta::new();
    let mut visual = RegionVisual::new();

    for (key, value) in attributes.pairs() {
        match key {
            "text" => {
                if !is_text_shape {
                    meta.text = Some(strip_delimiters(value).to_string());
                }
            }
            "include" => meta.include = Some(flag(key, value)?),
            "color" => visual.color = Some(value.to_string()),
            "width" => visual.linewidth = Some(number(value)?),
            "font" => {
                let mut parts = strip_delimiters(value).split_whitespace();
                visual.fontname = parts.next().map(str::to_string);
                visual.fontsize = parts.next().map(number).transpose()?;
                visual.fontweight = parts.next().map(str::to_string);
                visual.fontstyle = parts.next().map(str::to_string);
            }
            "dash" => {
                visual.linestyle = Some(if flag(key, value)? {
                    LineStyle::Dashed
                } else {
                    LineStyle::Solid
                });
            }
            "dashlist" => {
                let lengths: Vec<u32> = value
                    .split_whitespace()
                    .map(|part| {
                        part.parse::<u32>()
                            .map_err(|_| format!("invalid dash length '{}'", part))
                    })
                    .collect::<Result<_, _>>()?;
                match lengths.as_slice() {
                    [dash, gap] => visual.dashes = Some([*dash, *gap]),
                    _ => return Err(format!("invalid dashlist '{}'", value)),
                }
            }
            "point" => {
                let mut parts = value.split_whitespace();
                let symbol = parts.next().unwrap_or_default();
                let marker = marker_for_symbol(symbol)
                    .ok_or_else(|| format!("unknown point symbol '{}'", symbol))?;
                visual.marker = Some(marker.to_string());
                visual.markersize = parts.next().map(number).transpose()?;
            }
            "fill" => visual.fill = Some(flag(key, value)?),
            _ if META_KEYS.contains(&key) => {
                meta.extra.insert(key.to_string(), value.to_string());
            }
            _ => {
                visual.extra.insert(key.to_string(), value.to_string());
            }
        }
    }

    meta.tags = attributes.tags().to_vec();
    Ok((meta, visual))
}

fn flag(key: &str, value: &str) -> Result<bool, String> {
    match value {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => Err(format!("invalid value '{}' for {}", value, key)),
    }
}

fn number(value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid number '{}'", value))
}

/// Decimal degrees, with an optional `d` suffix.
fn degrees(value: &str) -> Result<f64, String> {
    number(value.strip_suffix('d').unwrap_or(value))
}

/// `a:b:c` to `a + b/60 + c/3600`, with the sign of `a` applying to all parts.
fn sexagesimal(value: &str) -> Result<f64, String> {
    let value = value.trim();
    let (sign, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, value.strip_prefix('+').unwrap_or(value)),
    };

    let parts: Vec<f64> = unsigned.split(':').map(number).collect::<Result<_, _>>()?;
    if parts.len() > 3 {
        return Err(format!("invalid sexagesimal value '{}'", value));
    }
    let total = parts
        .iter()
        .zip([1.0, 60.0, 3600.0])
        .map(|(part, scale)| part / scale)
        .sum::<f64>();
    Ok(sign * total)
}
