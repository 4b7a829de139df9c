use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::builtin::BUILTIN_DESCRIPTORS;
use super::{ApiDescriptor, DescriptorError};

/// Registry mapping descriptor names to loaded descriptors
#[derive(Clone, Default)]
pub struct DescriptorRegistry {
    descriptors: BTreeMap<String, Arc<ApiDescriptor>>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every descriptor compiled into the binary
    pub fn with_builtins() -> Result<Self, DescriptorError> {
        let mut registry = Self::new();
        for (name, json) in BUILTIN_DESCRIPTORS {
            registry.register(ApiDescriptor::from_json(name, json)?);
        }
        Ok(registry)
    }

    /// Replaces any descriptor already registered under the same name
    pub fn register(&mut self, descriptor: ApiDescriptor) {
        debug!(descriptor = %descriptor.name, "Registering API descriptor");
        self.descriptors
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    /// Load every `*.json` file in `dir`, in file name order
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, DescriptorError> {
        let io_error = |source| DescriptorError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let origin = path.display().to_string();
            let json = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
                path: origin.clone(),
                source,
            })?;
            self.register(ApiDescriptor::from_json(&origin, &json)?);
        }

        info!(dir = %dir.display(), count = paths.len(), "Loaded API descriptors");
        Ok(paths.len())
    }

    pub fn get(&self, name: &str) -> Result<Arc<ApiDescriptor>, DescriptorError> {
        self.descriptors
            .get(name)
            .cloned()
            .ok_or_else(|| DescriptorError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }
}
