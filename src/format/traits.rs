//! Plugin trait and the option/result types shared by all formats.

use std::path::PathBuf;

use crate::format::error::RegionError;
use crate::format::registry::RegionsRegistry;

/// Default number of decimals for rendered coordinates and parameters.
pub const DEFAULT_PRECISION: usize = 8;

/// A region format plugin.
///
/// Plugins register their handlers once, before the registry is shared.
/// A format only needs to register the operations it supports.
pub trait FormatPlugin {
    /// Format name handlers are registered under (e.g., "ds9", "json").
    fn name(&self) -> &'static str;

    /// Register this format's handlers.
    fn register(&self, registry: &mut RegionsRegistry) -> Result<(), RegionError>;
}

/// Options for write and serialize operations.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Decimal places for rendered values.
    pub precision: usize,

    /// Whether an existing destination may be replaced.
    pub overwrite: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            overwrite: false,
        }
    }
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of decimals.
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Allow replacing an existing destination.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Options for read and parse operations.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Fail on unsupported shapes instead of skipping them.
    pub strict: bool,
}

impl ImportOptions {
    /// Create new import options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Result of a write or serialize operation.
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Serialized document.
    pub output: String,

    /// Number of regions present in the output.
    pub regions_written: usize,

    /// Warnings generated during export (e.g., skipped regions).
    pub warnings: Vec<FormatWarning>,

    /// Files created during export.
    pub files_created: Vec<PathBuf>,
}

impl ExportResult {
    /// Create a new export result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the result.
    pub fn add_warning(&mut self, warning: FormatWarning) {
        self.warnings.push(warning);
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of regions that were skipped.
    pub fn regions_skipped(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.region_index.is_some())
            .count()
    }
}

/// Warning generated during format conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatWarning {
    /// Position of the region in the input collection (if applicable).
    pub region_index: Option<usize>,

    /// Human-readable warning message.
    pub message: String,
}

impl FormatWarning {
    /// Create a new warning.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            region_index: None,
            message: message.into(),
        }
    }

    /// Set the region this warning relates to.
    pub fn with_region(mut self, index: usize) -> Self {
        self.region_index = Some(index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_options_builder() {
        let options = ExportOptions::new().precision(3).overwrite(true);
        assert_eq!(options.precision, 3);
        assert!(options.overwrite);
        assert_eq!(ExportOptions::default().precision, DEFAULT_PRECISION);
        assert!(!ExportOptions::default().overwrite);
    }

    #[test]
    fn test_export_result_skips() {
        let mut result = ExportResult::new();
        assert!(!result.has_warnings());

        result.add_warning(FormatWarning::new("skipped").with_region(2));
        result.add_warning(FormatWarning::new("general"));

        assert!(result.has_warnings());
        assert_eq!(result.regions_skipped(), 1);
    }
}
