//! Template-driven source artifact generation.
//!
//! A type-processing pipeline holds [`GenerationTask`]s, one per candidate type and
//! generation purpose, and executes them each discovery round. Template-based tasks decide
//! whether an artifact is needed, resolve their template through a shared
//! [`TemplateCache`] (compiled at most once per name), render it, and return a
//! [`SourceArtifact`].
//!
//! ```rust,no_run
//! use artifact_gen::{
//!     CompiledTemplate, EmbeddedResourceStore, TemplateResolver, TeraEngine, VariableContext,
//! };
//!
//! # fn example() -> Result<(), artifact_gen::GenerationError> {
//! let resolver = TemplateResolver::new(
//!     EmbeddedResourceStore::from_static(&[("greeting.tmpl", "Hello, {{name}}!")]),
//!     TeraEngine::new(),
//! );
//! let template = resolver.resolve("greeting.tmpl")?;
//! let text = template.render(&VariableContext::new().with("name", "World"))?;
//! assert_eq!(text, "Hello, World!");
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod resource;
pub mod task;
pub mod template;

pub use artifact::{Artifact, ArtifactType, ResourceArtifact, SourceArtifact};
pub use config::GeneratorConfig;
pub use error::{ErrorKind, GenerationError};
pub use logging::{LogFormat, LogOutput, LoggingConfig, init_logging};
pub use model::{CustomType, TypeHandle};
pub use resource::{DirectoryResourceStore, EmbeddedResourceStore, ResourceChain, ResourceStore};
pub use task::{GenerationTask, TaskState, TemplateGenerationTask, TemplatePurpose};
pub use template::{
    CacheStats, CompiledTemplate, TemplateCache, TemplateEngine, TemplateResolver, TeraEngine,
    VariableContext,
};
