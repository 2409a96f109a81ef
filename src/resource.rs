//! Bundled resource stores that hold template sources.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of template text, keyed by resource name.
pub trait ResourceStore: Send + Sync {
    /// Reads a resource as UTF-8 text. `Ok(None)` means the resource is not present.
    fn read_resource(&self, name: &str) -> io::Result<Option<String>>;
}

impl<S: ResourceStore + ?Sized> ResourceStore for Arc<S> {
    fn read_resource(&self, name: &str) -> io::Result<Option<String>> {
        (**self).read_resource(name)
    }
}

// ============================================================================
// Embedded resources
// ============================================================================

/// In-memory store, typically filled from `include_str!` at build time.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedResourceStore {
    resources: HashMap<String, Cow<'static, str>, ahash::RandomState>,
}

impl EmbeddedResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_static(resources: &[(&'static str, &'static str)]) -> Self {
        let mut store = Self::new();
        for (name, content) in resources {
            store
                .resources
                .insert((*name).to_string(), Cow::Borrowed(*content));
        }
        store
    }

    pub fn with_resource(
        mut self,
        name: impl Into<String>,
        content: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.resources.insert(name.into(), content.into());
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceStore for EmbeddedResourceStore {
    fn read_resource(&self, name: &str) -> io::Result<Option<String>> {
        Ok(self.resources.get(name).map(|content| content.to_string()))
    }
}

// ============================================================================
// Directory resources
// ============================================================================

/// Store rooted at a directory; resource names are relative paths below it.
#[derive(Debug, Clone)]
pub struct DirectoryResourceStore {
    root: PathBuf,
}

impl DirectoryResourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        validate_resource_name(name)?;
        Ok(self.root.join(name))
    }
}

impl ResourceStore for DirectoryResourceStore {
    fn read_resource(&self, name: &str) -> io::Result<Option<String>> {
        let path = self.resolve(name)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Rejects names that could escape the store root.
fn validate_resource_name(name: &str) -> io::Result<()> {
    let unsafe_name = name.is_empty()
        || name.contains('\0')
        || name.split(['/', '\\']).any(|segment| segment == "..")
        || name.starts_with('/')
        || name.starts_with('\\')
        || Path::new(name).is_absolute()
        || has_drive_prefix(name);

    if unsafe_name {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsafe resource name: {name:?}"),
        ));
    }
    Ok(())
}

fn has_drive_prefix(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}

// ============================================================================
// Chained resources
// ============================================================================

/// Ordered list of stores; the first store that has a resource wins.
#[derive(Clone, Default)]
pub struct ResourceChain {
    stores: Vec<Arc<dyn ResourceStore>>,
}

impl ResourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, store: impl ResourceStore + 'static) {
        self.stores.push(Arc::new(store));
    }

    pub fn with(mut self, store: impl ResourceStore + 'static) -> Self {
        self.push(store);
        self
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl fmt::Debug for ResourceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceChain")
            .field("stores", &self.stores.len())
            .finish()
    }
}

impl ResourceStore for ResourceChain {
    fn read_resource(&self, name: &str) -> io::Result<Option<String>> {
        for store in &self.stores {
            if let Some(content) = store.read_resource(name)? {
                return Ok(Some(content));
            }
        }
        Ok(None)
    }
}
