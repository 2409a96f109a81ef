//! Generation tasks and the template-based task algorithm.
//!
//! An orchestrator holds one task per (initiator type, annotated type, purpose) and calls
//! [`GenerationTask::execute`] once per discovery round. A template-based task runs:
//!
//! ```text
//! START -> ANALYZE -> SKIPPED
//!                  -> RESOLVE_TEMPLATE -> RENDER -> COMPLETE
//!                          |                 |
//!                          +----> FAILED <---+
//! ```
//!
//! Skipping never touches the template cache, so elements that need no artifact cost no
//! compilation.

use crate::artifact::{Artifact, SourceArtifact};
use crate::error::GenerationError;
use crate::model::TypeHandle;
use crate::template::{TemplateResolver, VariableContext};
use std::fmt;
use std::sync::Arc;
use tracing::Span;

/// Unit of work that inspects one annotated type and produces at most one artifact.
pub trait GenerationTask: Send + Sync {
    type Type: TypeHandle + ?Sized;
    /// Per-round discovery snapshot, opaque to the engine.
    type Round: ?Sized;

    /// Type whose processing caused this generation to be considered.
    fn initiator_type(&self) -> &Self::Type;

    /// Type being analyzed and rendered. May be the initiator itself.
    fn annotated_type(&self) -> &Self::Type;

    /// `Ok(None)` when no artifact is warranted this round; an error when the template is
    /// missing, malformed, or fails to render.
    fn execute(&self, round: &Self::Round) -> Result<Option<Artifact>, GenerationError>;
}

/// What one kind of template-generated artifact needs: when to generate, what to call the
/// result, which template to use, and which variables to feed it.
pub trait TemplatePurpose: Send + Sync {
    type Type: TypeHandle + ?Sized;
    type Round: ?Sized;

    /// Logical name of the bundled template resource.
    fn template_name(&self) -> &str;

    /// Name of the generated artifact; a deterministic function of the annotated type.
    fn artifact_name(&self, annotated: &Self::Type) -> String;

    /// Whether an artifact should be generated this round.
    fn analyze(&self, round: &Self::Round, annotated: &Self::Type) -> bool;

    /// Variables for one render, computed fresh on every call.
    fn template_variables(&self, initiator: &Self::Type, annotated: &Self::Type)
    -> VariableContext;

    fn purpose_name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Step of a template-based task, recorded on its tracing span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Start,
    Analyze,
    Skipped,
    ResolveTemplate,
    Render,
    Complete,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Start => "start",
            TaskState::Analyze => "analyze",
            TaskState::Skipped => "skipped",
            TaskState::ResolveTemplate => "resolve_template",
            TaskState::Render => "render",
            TaskState::Complete => "complete",
            TaskState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Skipped | TaskState::Complete | TaskState::Failed
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// [`GenerationTask`] that renders a cached template chosen by its [`TemplatePurpose`].
pub struct TemplateGenerationTask<P: TemplatePurpose> {
    purpose: P,
    initiator_type: Arc<P::Type>,
    annotated_type: Arc<P::Type>,
    resolver: TemplateResolver,
}

impl<P: TemplatePurpose> TemplateGenerationTask<P> {
    pub fn new(
        purpose: P,
        initiator_type: Arc<P::Type>,
        annotated_type: Arc<P::Type>,
        resolver: TemplateResolver,
    ) -> Self {
        Self {
            purpose,
            initiator_type,
            annotated_type,
            resolver,
        }
    }

    /// Task whose initiator is the annotated type itself.
    pub fn for_type(purpose: P, annotated_type: Arc<P::Type>, resolver: TemplateResolver) -> Self {
        Self::new(purpose, Arc::clone(&annotated_type), annotated_type, resolver)
    }

    pub fn purpose(&self) -> &P {
        &self.purpose
    }

    fn synthesize(&self, span: &Span) -> Result<Artifact, GenerationError> {
        span.record("state", TaskState::ResolveTemplate.as_str());
        let artifact_name = self.purpose.artifact_name(&self.annotated_type);
        if artifact_name.is_empty() {
            return Err(GenerationError::EmptyArtifactName {
                purpose: self.purpose.purpose_name().to_string(),
            });
        }
        let template_name = self.purpose.template_name();
        tracing::debug!(
            artifact = %artifact_name,
            template = %template_name,
            "generating artifact"
        );
        let template = self.resolver.resolve(template_name)?;

        span.record("state", TaskState::Render.as_str());
        let variables = self
            .purpose
            .template_variables(&self.initiator_type, &self.annotated_type);
        let source_text = template.render(&variables)?;

        span.record("state", TaskState::Complete.as_str());
        Ok(SourceArtifact::new(artifact_name, source_text).into())
    }
}

impl<P: TemplatePurpose> GenerationTask for TemplateGenerationTask<P> {
    type Type = P::Type;
    type Round = P::Round;

    fn initiator_type(&self) -> &Self::Type {
        &self.initiator_type
    }

    fn annotated_type(&self) -> &Self::Type {
        &self.annotated_type
    }

    fn execute(&self, round: &Self::Round) -> Result<Option<Artifact>, GenerationError> {
        let span = tracing::debug_span!(
            "generation_task",
            purpose = %self.purpose.purpose_name(),
            initiator = %self.initiator_type.canonical_name(),
            annotated = %self.annotated_type.canonical_name(),
            state = TaskState::Start.as_str(),
        );
        let _entered = span.enter();

        span.record("state", TaskState::Analyze.as_str());
        if !self.purpose.analyze(round, &self.annotated_type) {
            span.record("state", TaskState::Skipped.as_str());
            tracing::debug!("artifact not required this round");
            return Ok(None);
        }

        match self.synthesize(&span) {
            Ok(artifact) => {
                tracing::debug!(artifact = %artifact.name(), "artifact generated");
                Ok(Some(artifact))
            }
            Err(err) => {
                span.record("state", TaskState::Failed.as_str());
                tracing::debug!(error_kind = %err.kind(), error = %err, "generation failed");
                Err(err)
            }
        }
    }
}

impl<P: TemplatePurpose> fmt::Debug for TemplateGenerationTask<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateGenerationTask")
            .field("purpose", &self.purpose.purpose_name())
            .field("template", &self.purpose.template_name())
            .field("initiator_type", &self.initiator_type.canonical_name())
            .field("annotated_type", &self.annotated_type.canonical_name())
            .finish()
    }
}
