//! Generated artifacts.
//!
//! Artifacts are immutable values: a generation task builds one on success and hands it to
//! the caller, which passes it on to whatever writer persists it. They serialize for that
//! writer and are never read back.

use serde::Serialize;
use std::fmt;

/// Kind of a generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    /// Generated source code
    Source,
    /// Any other generated file (service registrations, descriptors)
    Resource,
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactType::Source => write!(f, "source"),
            ArtifactType::Resource => write!(f, "resource"),
        }
    }
}

/// Named, typed result of a generation task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Artifact {
    Source(SourceArtifact),
    Resource(ResourceArtifact),
}

impl Artifact {
    pub fn name(&self) -> &str {
        match self {
            Artifact::Source(source) => source.name(),
            Artifact::Resource(resource) => resource.name(),
        }
    }

    pub fn artifact_type(&self) -> ArtifactType {
        match self {
            Artifact::Source(_) => ArtifactType::Source,
            Artifact::Resource(_) => ArtifactType::Resource,
        }
    }

    /// Source view of this artifact; `None` unless the kind is [`ArtifactType::Source`].
    pub fn as_source_artifact(&self) -> Option<&SourceArtifact> {
        match self {
            Artifact::Source(source) => Some(source),
            Artifact::Resource(_) => None,
        }
    }

    pub fn into_source_artifact(self) -> Option<SourceArtifact> {
        match self {
            Artifact::Source(source) => Some(source),
            Artifact::Resource(_) => None,
        }
    }
}

impl From<SourceArtifact> for Artifact {
    fn from(source: SourceArtifact) -> Self {
        Artifact::Source(source)
    }
}

impl From<ResourceArtifact> for Artifact {
    fn from(resource: ResourceArtifact) -> Self {
        Artifact::Resource(resource)
    }
}

/// Artifact carrying generated source text, exactly as the template engine rendered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceArtifact {
    name: String,
    source_text: String,
}

impl SourceArtifact {
    pub fn new(name: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_text: source_text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceArtifact {
    name: String,
    content: Vec<u8>,
}

impl ResourceArtifact {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}
