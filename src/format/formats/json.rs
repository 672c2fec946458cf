//! Native JSON region format.
//!
//! Lossless: every shape kind, frame, metadata field and style field is
//! kept, including the ones DS9 cannot express.
//!
//! # Versioning
//!
//! Documents carry a semantic version. Version 0.x.x is unstable; files
//! from another minor version are read with a warning.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::error::RegionError;
use crate::format::handler::{Handler, OperationKind, TargetType};
use crate::format::output::write_output;
use crate::format::registry::RegionsRegistry;
use crate::format::traits::{ExportOptions, ExportResult, FormatPlugin, ImportOptions};
use crate::model::Region;

/// On-disk layout of a JSON region document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionsDocument {
    /// Format version for compatibility checking.
    pub version: String,

    pub regions: Vec<Region>,
}

impl RegionsDocument {
    /// Current version of the document format.
    pub const CURRENT_VERSION: &'static str = "0.1.0";

    pub const VERSION_MAJOR: u32 = 0;
    pub const VERSION_MINOR: u32 = 1;

    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            regions,
        }
    }

    /// Parse a version string into (major, minor, patch) components.
    pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
        let mut parts = version.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((major, minor, patch))
    }

    /// Whether a file version can be read without caveats.
    ///
    /// In 0.x.x only the same minor version qualifies; from 1.0.0 on, the
    /// same major version does.
    pub fn is_version_compatible(file_version: &str) -> bool {
        let Some((major, minor, _)) = Self::parse_version(file_version) else {
            return false;
        };
        if Self::VERSION_MAJOR == 0 {
            major == 0 && minor == Self::VERSION_MINOR
        } else {
            major == Self::VERSION_MAJOR
        }
    }

    /// Whether a file version can be read at all (possibly with warnings).
    pub fn is_version_readable(file_version: &str) -> bool {
        matches!(Self::parse_version(file_version), Some((major, _, _)) if major == Self::VERSION_MAJOR)
    }
}

/// JSON region format.
pub struct JsonFormat;

impl FormatPlugin for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn register(&self, registry: &mut RegionsRegistry) -> Result<(), RegionError> {
        for target in [TargetType::Region, TargetType::Regions] {
            registry.register(target, self.name(), Handler::Read(read))?;
            registry.register(target, self.name(), Handler::Write(write))?;
            registry.register(target, self.name(), Handler::Parse(parse))?;
            registry.register(target, self.name(), Handler::Serialize(serialize))?;
            registry.register(target, self.name(), Handler::Identify(identify))?;
        }
        Ok(())
    }
}

fn parse(data: &str, _options: &ImportOptions) -> Result<Vec<Region>, RegionError> {
    let document: RegionsDocument = serde_json::from_str(data)?;

    if !RegionsDocument::is_version_readable(&document.version) {
        return Err(RegionError::VersionMismatch {
            expected: RegionsDocument::CURRENT_VERSION.to_string(),
            found: document.version,
        });
    }
    if !RegionsDocument::is_version_compatible(&document.version) {
        log::warn!(
            "Region document version {} may not be fully compatible with current version {} \
             (version 0.x.x is unstable - format may have changed)",
            document.version,
            RegionsDocument::CURRENT_VERSION
        );
    }

    Ok(document.regions)
}

fn serialize(regions: &[Region], _options: &ExportOptions) -> Result<ExportResult, RegionError> {
    let document = RegionsDocument::new(regions.to_vec());
    let output = serde_json::to_string_pretty(&document)?;

    Ok(ExportResult {
        output,
        regions_written: regions.len(),
        ..Default::default()
    })
}

fn read(path: &Path, options: &ImportOptions) -> Result<Vec<Region>, RegionError> {
    log::info!("Reading JSON regions from {:?}", path);

    let json = std::fs::read_to_string(path)?;
    let regions = parse(&json, options)?;

    log::info!("Read {} regions", regions.len());
    Ok(regions)
}

fn write(
    regions: &[Region],
    path: &Path,
    options: &ExportOptions,
) -> Result<ExportResult, RegionError> {
    log::info!("Writing {} regions to {:?}", regions.len(), path);

    let mut result = serialize(regions, options)?;
    write_output(path, &result.output, options.overwrite)?;
    result.files_created = vec![path.to_path_buf()];

    log::info!("Wrote {} JSON regions", result.regions_written);
    Ok(result)
}

fn identify(_operation: OperationKind, path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!(RegionsDocument::parse_version("0.1.0"), Some((0, 1, 0)));
        assert_eq!(RegionsDocument::parse_version("10.20.30"), Some((10, 20, 30)));
        assert_eq!(RegionsDocument::parse_version("1.2"), None);
        assert_eq!(RegionsDocument::parse_version("1.2.3.4"), None);
        assert_eq!(RegionsDocument::parse_version("invalid"), None);
    }

    #[test]
    fn test_version_compatibility() {
        assert!(RegionsDocument::is_version_compatible(
            RegionsDocument::CURRENT_VERSION
        ));
        assert!(RegionsDocument::is_version_compatible("0.1.7"));

        // Minor versions differ in unstable 0.x
        assert!(!RegionsDocument::is_version_compatible("0.2.0"));
        assert!(RegionsDocument::is_version_readable("0.2.0"));

        assert!(!RegionsDocument::is_version_readable("1.0.0"));
        assert!(!RegionsDocument::is_version_readable("garbage"));
    }

    #[test]
    fn test_identify() {
        assert!(identify(OperationKind::Read, Path::new("regions.json")));
        assert!(identify(OperationKind::Write, Path::new("REGIONS.JSON")));
        assert!(!identify(OperationKind::Read, Path::new("regions.reg")));
    }
}
