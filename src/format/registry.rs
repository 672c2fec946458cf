//! Format registry for discovering and dispatching region formats.

use std::path::Path;

use indexmap::IndexMap;

use crate::format::error::RegionError;
use crate::format::formats::{Ds9Format, JsonFormat};
use crate::format::handler::{Handler, OperationKind, TargetType};
use crate::format::output::ensure_writable;
use crate::format::table::{FormatCapabilities, FormatTable};
use crate::format::traits::{ExportOptions, ExportResult, FormatPlugin, ImportOptions};
use crate::model::{Region, Regions};

/// Unique key of a registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryKey {
    pub target: TargetType,
    pub operation: OperationKind,
    pub format: String,
}

impl RegistryKey {
    pub fn new(target: TargetType, operation: OperationKind, format: impl Into<String>) -> Self {
        Self {
            target,
            operation,
            format: format.into(),
        }
    }
}

/// Registry of region format handlers.
///
/// Handlers are keyed by (target type, operation, format name). Keys are
/// append-only: there is no way to replace or remove a handler once it is
/// registered. Registration order is kept, and identification tries the
/// identify predicates in that order.
///
/// Registration needs `&mut self`, so a registry is populated before it is
/// shared; after that every operation is a plain lookup.
#[derive(Debug, Default)]
pub struct RegionsRegistry {
    handlers: IndexMap<RegistryKey, Handler>,
}

impl RegionsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in formats registered.
    pub fn with_defaults() -> Result<Self, RegionError> {
        let mut registry = Self::new();
        registry.install(&Ds9Format)?;
        registry.install(&JsonFormat)?;
        Ok(registry)
    }

    /// Let a format plugin register its handlers.
    pub fn install(&mut self, plugin: &dyn FormatPlugin) -> Result<(), RegionError> {
        log::debug!("Installing region format '{}'", plugin.name());
        plugin.register(self)
    }

    /// Register a handler for `target` and `format`.
    ///
    /// The operation kind is taken from the handler variant. The handler is
    /// returned unchanged so it can still be called directly.
    pub fn register(
        &mut self,
        target: TargetType,
        format: &str,
        handler: Handler,
    ) -> Result<Handler, RegionError> {
        let key = RegistryKey::new(target, handler.operation(), format);
        if self.handlers.contains_key(&key) {
            return Err(RegionError::DuplicateRegistration {
                target,
                operation: key.operation,
                format: key.format,
            });
        }

        log::trace!("Registered {} for {} on {}", key.operation, key.format, target);
        self.handlers.insert(key, handler);
        Ok(handler)
    }

    /// Check whether a handler exists for this key.
    pub fn has(&self, target: TargetType, operation: OperationKind, format: &str) -> bool {
        self.handlers
            .contains_key(&RegistryKey::new(target, operation, format))
    }

    /// Find the format of `path` for `operation`.
    ///
    /// Identify predicates registered for `target` are tried in registration
    /// order; the first one that accepts the path wins.
    pub fn identify(
        &self,
        path: &Path,
        target: TargetType,
        operation: OperationKind,
    ) -> Result<&str, RegionError> {
        self.handlers
            .iter()
            .filter(|(key, _)| key.target == target)
            .find_map(|(key, handler)| {
                let identify = handler.as_identify()?;
                identify(operation, path).then_some(key.format.as_str())
            })
            .ok_or_else(|| RegionError::FormatNotIdentified {
                target,
                formats: self.formats_hint(target),
            })
    }

    /// Read regions from `path`, identifying the format when none is given.
    pub fn read(
        &self,
        path: &Path,
        target: TargetType,
        format: Option<&str>,
        options: &ImportOptions,
    ) -> Result<Vec<Region>, RegionError> {
        let format = match format {
            Some(format) => format,
            None => self.identify(path, target, OperationKind::Read)?,
        };
        let read = self.lookup(target, OperationKind::Read, format, Handler::as_read)?;
        read(path, options)
    }

    /// Write regions to `path`, identifying the format when none is given.
    ///
    /// An existing destination is only replaced when `options.overwrite` is set.
    pub fn write(
        &self,
        regions: &[Region],
        path: &Path,
        target: TargetType,
        format: Option<&str>,
        options: &ExportOptions,
    ) -> Result<ExportResult, RegionError> {
        let format = match format {
            Some(format) => format,
            None => self.identify(path, target, OperationKind::Write)?,
        };
        let write = self.lookup(target, OperationKind::Write, format, Handler::as_write)?;
        ensure_writable(path, options.overwrite)?;
        write(regions, path, options)
    }

    /// Parse regions from text in the given format.
    pub fn parse(
        &self,
        data: &str,
        target: TargetType,
        format: &str,
        options: &ImportOptions,
    ) -> Result<Vec<Region>, RegionError> {
        let parse = self.lookup(target, OperationKind::Parse, format, Handler::as_parse)?;
        parse(data, options)
    }

    /// Serialize regions to text in the given format.
    pub fn serialize(
        &self,
        regions: &[Region],
        target: TargetType,
        format: &str,
        options: &ExportOptions,
    ) -> Result<ExportResult, RegionError> {
        let serialize =
            self.lookup(target, OperationKind::Serialize, format, Handler::as_serialize)?;
        serialize(regions, options)
    }

    /// Capabilities of every format registered for `target`, sorted by name.
    pub fn formats(&self, target: TargetType) -> Vec<FormatCapabilities> {
        let mut names: Vec<&str> = self
            .handlers
            .keys()
            .filter(|key| key.target == target)
            .map(|key| key.format.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();

        names
            .into_iter()
            .map(|name| FormatCapabilities {
                format: name.to_string(),
                parse: self.has(target, OperationKind::Parse, name),
                serialize: self.has(target, OperationKind::Serialize, name),
                read: self.has(target, OperationKind::Read, name),
                write: self.has(target, OperationKind::Write, name),
                identify: self.has(target, OperationKind::Identify, name),
            })
            .collect()
    }

    /// Printable capability table for `target`.
    pub fn format_table(&self, target: TargetType) -> FormatTable {
        FormatTable::new(self.formats(target))
    }

    fn lookup<F>(
        &self,
        target: TargetType,
        operation: OperationKind,
        format: &str,
        select: fn(&Handler) -> Option<F>,
    ) -> Result<F, RegionError> {
        self.handlers
            .get(&RegistryKey::new(target, operation, format))
            .and_then(select)
            .ok_or_else(|| RegionError::UnregisteredHandler {
                target,
                operation,
                format: format.to_string(),
                formats: self.formats_hint(target),
            })
    }

    fn formats_hint(&self, target: TargetType) -> String {
        format!(
            "\nThe available formats for the {} class are:\n\n{}",
            target,
            self.format_table(target)
        )
    }
}

impl Regions {
    /// Read a region file.
    pub fn read(
        registry: &RegionsRegistry,
        path: &Path,
        format: Option<&str>,
        options: &ImportOptions,
    ) -> Result<Self, RegionError> {
        registry
            .read(path, TargetType::Regions, format, options)
            .map(Regions::from)
    }

    /// Parse regions from text.
    pub fn parse(
        registry: &RegionsRegistry,
        data: &str,
        format: &str,
        options: &ImportOptions,
    ) -> Result<Self, RegionError> {
        registry
            .parse(data, TargetType::Regions, format, options)
            .map(Regions::from)
    }

    /// Write these regions to a file.
    pub fn write(
        &self,
        registry: &RegionsRegistry,
        path: &Path,
        format: Option<&str>,
        options: &ExportOptions,
    ) -> Result<ExportResult, RegionError> {
        registry.write(self, path, TargetType::Regions, format, options)
    }

    /// Serialize these regions to text.
    pub fn serialize(
        &self,
        registry: &RegionsRegistry,
        format: &str,
        options: &ExportOptions,
    ) -> Result<String, RegionError> {
        registry
            .serialize(self, TargetType::Regions, format, options)
            .map(|result| result.output)
    }
}

impl Region {
    /// Read a file holding exactly one region.
    pub fn read(
        registry: &RegionsRegistry,
        path: &Path,
        format: Option<&str>,
        options: &ImportOptions,
    ) -> Result<Self, RegionError> {
        single(registry.read(path, TargetType::Region, format, options)?)
    }

    /// Parse text holding exactly one region.
    pub fn parse(
        registry: &RegionsRegistry,
        data: &str,
        format: &str,
        options: &ImportOptions,
    ) -> Result<Self, RegionError> {
        single(registry.parse(data, TargetType::Region, format, options)?)
    }

    /// Write this region to a file.
    pub fn write(
        &self,
        registry: &RegionsRegistry,
        path: &Path,
        format: Option<&str>,
        options: &ExportOptions,
    ) -> Result<ExportResult, RegionError> {
        registry.write(
            std::slice::from_ref(self),
            path,
            TargetType::Region,
            format,
            options,
        )
    }

    /// Serialize this region to text.
    pub fn serialize(
        &self,
        registry: &RegionsRegistry,
        format: &str,
        options: &ExportOptions,
    ) -> Result<String, RegionError> {
        registry
            .serialize(std::slice::from_ref(self), TargetType::Region, format, options)
            .map(|result| result.output)
    }
}

fn single(mut regions: Vec<Region>) -> Result<Region, RegionError> {
    match regions.len() {
        1 => Ok(regions.remove(0)),
        n => Err(RegionError::invalid_format(format!(
            "expected exactly one region, found {}",
            n
        ))),
    }
}
