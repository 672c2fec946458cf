//! Registry keys and typed handler signatures.

use std::fmt;
use std::path::Path;

use crate::format::error::RegionError;
use crate::format::traits::{ExportOptions, ExportResult, ImportOptions};
use crate::model::Region;

/// The entity class an operation is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// A single region.
    Region,
    /// An ordered collection of regions.
    Regions,
}

impl TargetType {
    pub fn name(&self) -> &'static str {
        match self {
            TargetType::Region => "Region",
            TargetType::Regions => "Regions",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of I/O operation a handler performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Read,
    Write,
    Parse,
    Serialize,
    Identify,
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Write => "write",
            OperationKind::Parse => "parse",
            OperationKind::Serialize => "serialize",
            OperationKind::Identify => "identify",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read regions from a file.
pub type ReadFn = fn(&Path, &ImportOptions) -> Result<Vec<Region>, RegionError>;

/// Write regions to a file.
pub type WriteFn = fn(&[Region], &Path, &ExportOptions) -> Result<ExportResult, RegionError>;

/// Parse regions from text.
pub type ParseFn = fn(&str, &ImportOptions) -> Result<Vec<Region>, RegionError>;

/// Serialize regions to text.
pub type SerializeFn = fn(&[Region], &ExportOptions) -> Result<ExportResult, RegionError>;

/// Decide whether a path belongs to a format, for the given operation.
pub type IdentifyFn = fn(OperationKind, &Path) -> bool;

/// A registered handler. The variant fixes both the operation kind and the
/// function signature.
#[derive(Debug, Clone, Copy)]
pub enum Handler {
    Read(ReadFn),
    Write(WriteFn),
    Parse(ParseFn),
    Serialize(SerializeFn),
    Identify(IdentifyFn),
}

impl Handler {
    /// The operation this handler is registered under.
    pub fn operation(&self) -> OperationKind {
        match self {
            Handler::Read(_) => OperationKind::Read,
            Handler::Write(_) => OperationKind::Write,
            Handler::Parse(_) => OperationKind::Parse,
            Handler::Serialize(_) => OperationKind::Serialize,
            Handler::Identify(_) => OperationKind::Identify,
        }
    }

    pub fn as_read(&self) -> Option<ReadFn> {
        match self {
            Handler::Read(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_write(&self) -> Option<WriteFn> {
        match self {
            Handler::Write(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_parse(&self) -> Option<ParseFn> {
        match self {
            Handler::Parse(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_serialize(&self) -> Option<SerializeFn> {
        match self {
            Handler::Serialize(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_identify(&self) -> Option<IdentifyFn> {
        match self {
            Handler::Identify(f) => Some(*f),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_operation: OperationKind, _path: &Path) -> bool {
        false
    }

    #[test]
    fn test_handler_operation() {
        let handler = Handler::Identify(never);
        assert_eq!(handler.operation(), OperationKind::Identify);
        assert!(handler.as_identify().is_some());
        assert!(handler.as_read().is_none());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TargetType::Regions.to_string(), "Regions");
        assert_eq!(OperationKind::Serialize.to_string(), "serialize");
    }
}
