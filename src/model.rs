//! Boundary to the type model that describes the program being processed.
//!
//! The engine only needs a canonical name from a type. Richer type models implement
//! [`TypeHandle`] on their own descriptors; [`CustomType`] is a minimal one.

use serde::{Deserialize, Serialize};

/// Read-only handle to a type supplied by the external type-analysis facility.
pub trait TypeHandle: Send + Sync {
    /// Fully qualified, dot-separated name, e.g. `com.acme.User`.
    fn canonical_name(&self) -> &str;

    fn simple_name(&self) -> &str {
        let name = self.canonical_name();
        name.rsplit_once('.').map_or(name, |(_, simple)| simple)
    }

    /// Everything before the last dot; empty for types in the default package.
    fn package_name(&self) -> &str {
        self.canonical_name()
            .rsplit_once('.')
            .map_or("", |(package, _)| package)
    }
}

/// Plain type descriptor: a canonical name and the annotations present on the type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomType {
    canonical_name: String,
    #[serde(default)]
    annotations: Vec<String>,
}

impl CustomType {
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }
}

impl TypeHandle for CustomType {
    fn canonical_name(&self) -> &str {
        &self.canonical_name
    }
}
