pub mod cache;
pub mod context;
pub mod engine;
pub mod resolver;

pub use cache::{CacheStats, TemplateCache};
pub use context::VariableContext;
pub use engine::{CompiledTemplate, TemplateEngine, TeraEngine, TeraTemplate};
pub use resolver::{SLOW_COMPILE_THRESHOLD_MS, TemplateResolver};
