//! Template lookup: cache first, otherwise read the bundled resource and compile it.

use crate::error::GenerationError;
use crate::logging::log_template_compiled;
use crate::resource::ResourceStore;
use crate::template::{CompiledTemplate, TemplateCache, TemplateEngine};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Compilations slower than this are logged at warn level.
pub const SLOW_COMPILE_THRESHOLD_MS: u64 = 250;

/// Shared handle to the template cache, the resource store it compiles from, and the engine.
///
/// Construct one per process and clone it into every generation task; clones share the
/// same cache.
#[derive(Clone)]
pub struct TemplateResolver {
    cache: Arc<TemplateCache>,
    store: Arc<dyn ResourceStore>,
    engine: Arc<dyn TemplateEngine>,
}

impl TemplateResolver {
    pub fn new(store: impl ResourceStore + 'static, engine: impl TemplateEngine + 'static) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(engine))
    }

    /// Resolver over already shared store and engine handles.
    ///
    /// The cache is keyed by template name alone, so it is never shared between resolvers;
    /// each one built here starts empty. Clone the resolver to share its cache.
    pub fn from_shared(store: Arc<dyn ResourceStore>, engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            cache: Arc::new(TemplateCache::new()),
            store,
            engine,
        }
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Compiled template for `name`, compiling it on first request.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn CompiledTemplate>, GenerationError> {
        self.cache.get_or_compile(name, |name| self.compile(name))
    }

    fn compile(&self, name: &str) -> Result<Arc<dyn CompiledTemplate>, GenerationError> {
        let started = Instant::now();
        let source = self
            .store
            .read_resource(name)
            .map_err(|source| GenerationError::ResourceRead {
                template: name.to_string(),
                source,
            })?
            .ok_or_else(|| GenerationError::ResourceNotFound {
                template: name.to_string(),
            })?;

        let template = self.engine.parse(name, &source)?;
        log_template_compiled!(name, started.elapsed(), source_len = source.len());
        Ok(template)
    }
}

impl fmt::Debug for TemplateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateResolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
