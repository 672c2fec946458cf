//! skyregions - astronomical region files
//!
//! Reads and writes sky and pixel regions through a registry of file
//! formats, with SAOImage DS9 and a native JSON format built in.

pub mod config;
pub mod format;
pub mod model;

pub use config::{LogLevel, RegionsConfig};
pub use format::{
    ExportOptions, ExportResult, ImportOptions, OperationKind, RegionError, RegionsRegistry,
    TargetType,
};
pub use model::{Region, Regions};
