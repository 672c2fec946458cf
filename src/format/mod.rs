//! Region format registry and I/O.
//!
//! Formats plug into a [`RegionsRegistry`] by registering typed handlers
//! keyed by target type, operation and format name. Callers then read,
//! write, parse or serialize through the registry, which identifies the
//! format from the path when none is given.
//!
//! ## Supported Formats
//!
//! - **DS9**: SAOImage DS9 region files (`.reg`, `.ds9`)
//! - **JSON**: Native lossless format (`.json`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use skyregions::format::{ExportOptions, RegionsRegistry};
//! use skyregions::model::Regions;
//!
//! let registry = RegionsRegistry::with_defaults()?;
//! let regions = Regions::read(&registry, path, None, &ImportOptions::default())?;
//! regions.write(&registry, "out.reg".as_ref(), None, &ExportOptions::default())?;
//! ```

mod error;
pub mod formats;
mod handler;
mod output;
mod registry;
mod table;
mod traits;

pub use error::RegionError;
pub use handler::{
    Handler, IdentifyFn, OperationKind, ParseFn, ReadFn, SerializeFn, TargetType, WriteFn,
};
pub use output::{ensure_writable, write_output};
pub use registry::{RegionsRegistry, RegistryKey};
pub use table::{FormatCapabilities, FormatTable};
pub use traits::{
    DEFAULT_PRECISION, ExportOptions, ExportResult, FormatPlugin, FormatWarning, ImportOptions,
};
