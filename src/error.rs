//! Error taxonomy for artifact generation.
//!
//! Skipping a task is not an error: `execute` returns `Ok(None)`. Every variant here is a
//! packaging or configuration defect that aborts the task and is propagated unchanged to the
//! orchestrator.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use thiserror::Error;

// =============================================================================
// ERROR KINDS
// =============================================================================

/// Discriminant of a [`GenerationError`], for branching without matching payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Template resource is absent from the bundle
    ResourceNotFound,
    /// Template resource exists but could not be read
    ResourceRead,
    /// Template source is malformed
    TemplateParse,
    /// Variable mapping is incompatible with the template
    Render,
    /// Generated artifact would violate the artifact invariants
    InvalidArtifact,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ResourceNotFound => "resource_not_found",
            ErrorKind::ResourceRead => "resource_read",
            ErrorKind::TemplateParse => "template_parse",
            ErrorKind::Render => "render",
            ErrorKind::InvalidArtifact => "invalid_artifact",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GENERATION ERROR
// =============================================================================

/// Fatal failure of a generation task.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("template for artifact generation is not found: {template}")]
    ResourceNotFound { template: String },

    #[error("failed to read template resource {template}: {source}")]
    ResourceRead {
        template: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse template {template}: {message}")]
    TemplateParse { template: String, message: String },

    #[error("failed to render template {template}: {message}")]
    Render { template: String, message: String },

    #[error("generation purpose {purpose} produced an empty artifact name")]
    EmptyArtifactName { purpose: String },
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            GenerationError::ResourceRead { .. } => ErrorKind::ResourceRead,
            GenerationError::TemplateParse { .. } => ErrorKind::TemplateParse,
            GenerationError::Render { .. } => ErrorKind::Render,
            GenerationError::EmptyArtifactName { .. } => ErrorKind::InvalidArtifact,
        }
    }

    /// Template the failure refers to, if any.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            GenerationError::ResourceNotFound { template }
            | GenerationError::ResourceRead { template, .. }
            | GenerationError::TemplateParse { template, .. }
            | GenerationError::Render { template, .. } => Some(template),
            GenerationError::EmptyArtifactName { .. } => None,
        }
    }

    pub(crate) fn parse(template: &str, err: &(dyn StdError + 'static)) -> Self {
        GenerationError::TemplateParse {
            template: template.to_string(),
            message: error_chain(err),
        }
    }

    pub(crate) fn render(template: &str, err: &(dyn StdError + 'static)) -> Self {
        GenerationError::Render {
            template: template.to_string(),
            message: error_chain(err),
        }
    }
}

/// Flattens an error and its sources into one message.
///
/// Tera reports the useful detail (missing variable, unexpected token) in nested sources,
/// so the top-level `Display` alone is not enough for a diagnostic.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        current = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer {
        #[source]
        inner: Inner,
    }

    #[derive(Debug, Error)]
    #[error("inner detail")]
    struct Inner;

    #[test]
    fn error_chain_includes_nested_sources() {
        let err = Outer { inner: Inner };
        assert_eq!(error_chain(&err), "outer: inner detail");
    }

    #[test]
    fn kinds_and_template_names() {
        let missing = GenerationError::ResourceNotFound {
            template: "missing.tmpl".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::ResourceNotFound);
        assert_eq!(missing.template_name(), Some("missing.tmpl"));
        assert!(missing.to_string().contains("missing.tmpl"));

        let empty = GenerationError::EmptyArtifactName {
            purpose: "Stub".to_string(),
        };
        assert_eq!(empty.kind(), ErrorKind::InvalidArtifact);
        assert_eq!(empty.template_name(), None);
    }

    #[test]
    fn render_constructor_keeps_template_name() {
        let err = GenerationError::render("greeting.tmpl", &Inner);
        assert_eq!(err.kind(), ErrorKind::Render);
        assert_eq!(err.template_name(), Some("greeting.tmpl"));
        assert!(err.to_string().contains("inner detail"));
    }
}
