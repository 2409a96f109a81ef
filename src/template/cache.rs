//! Process-wide compiled template cache.
//!
//! Each template name owns a slot holding a `OnceCell`. The map lock is only taken to find or
//! create a slot; compilation runs inside the slot's `get_or_try_init`, so racing callers for
//! one name wait on that slot while other names proceed. A failed compilation leaves the slot
//! empty; the last caller holding it removes it from the map, and the next request compiles again.

use crate::error::GenerationError;
use crate::logging::log_template_lookup;
use crate::template::CompiledTemplate;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Slot = Arc<OnceCell<Arc<dyn CompiledTemplate>>>;

/// Compiled templates keyed by logical template name. Entries are never evicted.
#[derive(Default)]
pub struct TemplateCache {
    slots: RwLock<HashMap<String, Slot, ahash::RandomState>>,
    /// Requests served by an already compiled template
    hits: AtomicU64,
    /// Requests that ran the compile function
    misses: AtomicU64,
    /// Compile functions that succeeded
    compilations: AtomicU64,
    /// Compile functions that failed
    failures: AtomicU64,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled template for `name`, compiling it with `compile` if absent.
    ///
    /// `compile` runs at most once per successful entry, even when many threads request the
    /// same absent name at the same time; all of them receive the same object. Failures are
    /// returned to the caller that ran `compile` and are not cached.
    pub fn get_or_compile<F>(
        &self,
        name: &str,
        compile: F,
    ) -> Result<Arc<dyn CompiledTemplate>, GenerationError>
    where
        F: FnOnce(&str) -> Result<Arc<dyn CompiledTemplate>, GenerationError>,
    {
        let slot = self.slot(name);
        if let Some(template) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log_template_lookup!("hit", name);
            return Ok(Arc::clone(template));
        }

        let mut compiled_here = false;
        let result = slot.get_or_try_init(|| {
            compiled_here = true;
            self.misses.fetch_add(1, Ordering::Relaxed);
            log_template_lookup!("miss", name);
            compile(name)
        });

        match result {
            Ok(template) => {
                if compiled_here {
                    self.compilations.fetch_add(1, Ordering::Relaxed);
                } else {
                    // Another caller finished compiling while this one waited on the slot.
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    log_template_lookup!("hit", name);
                }
                Ok(Arc::clone(template))
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                self.release_empty_slot(name, &slot);
                tracing::debug!(
                    cache_key = %name,
                    error_kind = %err.kind(),
                    "template compilation failed; nothing cached"
                );
                Err(err)
            }
        }
    }

    /// Whether a compiled template is present for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.slots
            .read()
            .get(name)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of compiled templates.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            compilations: self.compilations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, name: &str) -> Slot {
        if let Some(slot) = self.slots.read().get(name) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(name.to_string()).or_default())
    }

    /// Drop the map entry for a slot whose compilation failed, unless another caller still
    /// holds it. Slot handles are only cloned under the map lock, so the count is stable here.
    fn release_empty_slot(&self, name: &str, slot: &Slot) {
        let mut slots = self.slots.write();
        let removable = slots.get(name).is_some_and(|current| {
            Arc::ptr_eq(current, slot) && current.get().is_none() && Arc::strong_count(slot) == 2
        });
        if removable {
            slots.remove(name);
        }
    }
}

impl fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub compilations: u64,
    pub failures: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
