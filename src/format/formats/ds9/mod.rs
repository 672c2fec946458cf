//! SAOImage DS9 region format.
//!
//! Writing follows a fixed pipeline per region:
//! - resolve the DS9 frame keyword ([`shape`]);
//! - render the shape clause from its template ([`shape`]);
//! - translate metadata and style into DS9 attributes ([`meta`]).
//!
//! Attribute pairs shared by all regions are then moved to a `global`
//! line and the document is assembled ([`document`]). Regions whose frame
//! or shape has no DS9 counterpart are skipped with a warning.
//!
//! Reading ([`parse`]) accepts the same dialect plus sexagesimal
//! coordinates and unit-suffixed sky lengths.

pub mod document;
pub mod meta;
pub mod parse;
pub mod shape;

use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::format::error::RegionError;
use crate::format::handler::{Handler, OperationKind, TargetType};
use crate::format::output::write_output;
use crate::format::registry::RegionsRegistry;
use crate::format::traits::{ExportOptions, ExportResult, FormatPlugin, ImportOptions};
use crate::model::Region;

/// File extensions recognized as DS9 region files.
pub const EXTENSIONS: &[&str] = &["reg", "ds9"];

/// Marker DS9 puts on the first line of its region files.
const SIGNATURE: &str = "Region file format: DS9";

/// DS9 region format.
pub struct Ds9Format;

impl FormatPlugin for Ds9Format {
    fn name(&self) -> &'static str {
        "ds9"
    }

    fn register(&self, registry: &mut RegionsRegistry) -> Result<(), RegionError> {
        for target in [TargetType::Region, TargetType::Regions] {
            registry.register(target, self.name(), Handler::Read(read))?;
            registry.register(target, self.name(), Handler::Write(write))?;
            registry.register(target, self.name(), Handler::Parse(parse_text))?;
            registry.register(target, self.name(), Handler::Serialize(serialize))?;
            registry.register(target, self.name(), Handler::Identify(identify))?;
        }
        Ok(())
    }
}

fn parse_text(data: &str, options: &ImportOptions) -> Result<Vec<Region>, RegionError> {
    parse::parse_regions(data, options)
}

fn serialize(regions: &[Region], options: &ExportOptions) -> Result<ExportResult, RegionError> {
    document::serialize_regions(regions, options.precision)
}

fn read(path: &Path, options: &ImportOptions) -> Result<Vec<Region>, RegionError> {
    log::info!("Reading DS9 regions from {:?}", path);
    let text = std::fs::read_to_string(path)?;
    parse::parse_regions(&text, options)
}

fn write(
    regions: &[Region],
    path: &Path,
    options: &ExportOptions,
) -> Result<ExportResult, RegionError> {
    log::info!("Writing {} regions to {:?}", regions.len(), path);

    let mut result = document::serialize_regions(regions, options.precision)?;
    write_output(path, &result.output, options.overwrite)?;
    result.files_created = vec![path.to_path_buf()];

    log::info!("Wrote {} DS9 regions", result.regions_written);
    Ok(result)
}

/// Accept DS9 files by extension, or for reading by their first line.
fn identify(operation: OperationKind, path: &Path) -> bool {
    if has_extension(path) {
        return true;
    }
    operation == OperationKind::Read && has_signature(path)
}

fn has_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn has_signature(path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };
    let mut first_line = String::new();
    match BufReader::new(file).read_line(&mut first_line) {
        Ok(_) => first_line.contains(SIGNATURE),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_all_operations() {
        let mut registry = RegionsRegistry::new();
        registry.install(&Ds9Format).unwrap();

        for target in [TargetType::Region, TargetType::Regions] {
            let formats = registry.formats(target);
            assert_eq!(formats.len(), 1);
            let ds9 = &formats[0];
            assert!(ds9.parse && ds9.serialize && ds9.read && ds9.write && ds9.identify);
        }
    }

    #[test]
    fn test_identify_by_extension() {
        assert!(identify(OperationKind::Write, Path::new("out.reg")));
        assert!(identify(OperationKind::Write, Path::new("OUT.DS9")));
        assert!(!identify(OperationKind::Write, Path::new("out.txt")));
    }

    #[test]
    fn test_identify_by_signature_on_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.txt");
        std::fs::write(&path, "# Region file format: DS9 version 4.1\nimage; point(1,1)\n").unwrap();

        assert!(identify(OperationKind::Read, &path));
        assert!(!identify(OperationKind::Write, &path));
    }

    #[test]
    fn test_missing_file_is_not_identified() {
        assert!(!identify(OperationKind::Read, Path::new("/nonexistent/regions.txt")));
    }
}
