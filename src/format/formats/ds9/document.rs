//! Assembly of complete DS9 documents.

use crate::format::error::RegionError;
use crate::format::formats::ds9::meta::{Ds9Attributes, translate};
use crate::format::formats::ds9::shape::{EncodedShape, Encoding, ShapeEncoder};
use crate::format::traits::{ExportResult, FormatWarning};
use crate::model::Region;

/// First line of every written document.
pub const HEADER: &str = "# Region file format: DS9 skyregions";

/// Move the attribute pairs shared by every entry into a global block.
///
/// Shared means same key and same value in all entries. The block keeps the
/// order of the first entry, and shared keys are removed from every entry.
/// Tags are never shared.
pub fn factor_global(entries: &mut [Ds9Attributes]) -> Ds9Attributes {
    let mut global = Ds9Attributes::new();
    let Some((first, rest)) = entries.split_first() else {
        return global;
    };

    for (key, value) in first.pairs() {
        if rest.iter().all(|other| other.get(key) == Some(value)) {
            global.insert(key, value);
        }
    }

    let shared: Vec<String> = global.pairs().map(|(key, _)| key.to_string()).collect();
    for entry in entries.iter_mut() {
        for key in &shared {
            entry.remove(key);
        }
    }
    global
}

/// Serialize regions as a DS9 document.
///
/// Regions that cannot be expressed in DS9 are left out, each with a
/// warning in the result. Every other failure aborts the whole document.
pub fn serialize_regions(regions: &[Region], precision: usize) -> Result<ExportResult, RegionError> {
    log::info!("Serializing {} regions to DS9", regions.len());

    let encoder = ShapeEncoder::new(precision);
    let mut result = ExportResult::new();
    let mut shapes: Vec<EncodedShape> = Vec::with_capacity(regions.len());
    let mut attributes: Vec<Ds9Attributes> = Vec::with_capacity(regions.len());

    for (index, region) in regions.iter().enumerate() {
        match encoder.encode(region)? {
            Encoding::Encoded(shape) => {
                attributes.push(translate(region)?);
                shapes.push(shape);
            }
            Encoding::Skipped(reason) => {
                log::warn!("{}", reason);
                result.add_warning(FormatWarning::new(reason).with_region(index));
            }
        }
    }

    let global = factor_global(&mut attributes);

    let mut output = String::new();
    output.push_str(HEADER);
    output.push('\n');
    if !global.is_empty() {
        output.push_str(&format!("global {}\n", global));
    }
    for (shape, attrs) in shapes.iter().zip(&attributes) {
        output.push_str(&format!("{}; {} # {}\n", shape.frame, shape.shape, attrs));
    }

    result.output = output;
    result.regions_written = shapes.len();

    log::info!(
        "DS9 serialization complete: {} written, {} skipped",
        result.regions_written,
        result.regions_skipped()
    );
    Ok(result)
}
