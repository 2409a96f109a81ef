//! Boundary to the template engine, with a Tera-backed implementation.

use crate::error::GenerationError;
use crate::template::VariableContext;
use std::sync::Arc;
use tera::{Context, Tera};

/// Parsed template, ready to be rendered any number of times.
pub trait CompiledTemplate: Send + Sync {
    /// Logical template name this object was compiled from.
    fn name(&self) -> &str;

    /// Render against a variable mapping. Same template and same mapping always give the
    /// same output.
    fn render(&self, variables: &VariableContext) -> Result<String, GenerationError>;
}

/// Turns template source text into a [`CompiledTemplate`].
pub trait TemplateEngine: Send + Sync {
    fn parse(
        &self,
        name: &str,
        source: &str,
    ) -> Result<Arc<dyn CompiledTemplate>, GenerationError>;
}

// ============================================================================
// Tera
// ============================================================================

/// Tera-backed engine.
///
/// Autoescaping is off unless requested: generated source code must come out verbatim,
/// whatever the template's file suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraEngine {
    autoescape: bool,
}

impl TeraEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTML-escape every rendered value.
    pub fn with_autoescape(mut self, enable: bool) -> Self {
        self.autoescape = enable;
        self
    }
}

impl TemplateEngine for TeraEngine {
    fn parse(
        &self,
        name: &str,
        source: &str,
    ) -> Result<Arc<dyn CompiledTemplate>, GenerationError> {
        let mut tera = Tera::default();
        if self.autoescape {
            // Every name ends with the empty suffix.
            tera.autoescape_on(vec![""]);
        } else {
            tera.autoescape_on(Vec::new());
        }
        tera.add_raw_template(name, source)
            .map_err(|err| GenerationError::parse(name, &err))?;

        Ok(Arc::new(TeraTemplate {
            name: name.to_string(),
            tera,
        }))
    }
}

/// One template in its own private `Tera` instance.
#[derive(Debug)]
pub struct TeraTemplate {
    name: String,
    tera: Tera,
}

impl CompiledTemplate for TeraTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, variables: &VariableContext) -> Result<String, GenerationError> {
        let mut context = Context::new();
        for (key, value) in variables.iter() {
            context.insert(key, value);
        }
        self.tera
            .render(&self.name, &context)
            .map_err(|err| GenerationError::render(&self.name, &err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn renders_greeting() {
        let template = TeraEngine::new()
            .parse("greeting.tmpl", "Hello, {{name}}!")
            .expect("parse");
        let vars = VariableContext::new().with("name", "World");
        assert_eq!(template.render(&vars).unwrap(), "Hello, World!");
        assert_eq!(template.name(), "greeting.tmpl");
    }

    #[test]
    fn html_suffix_is_not_escaped_by_default() {
        let template = TeraEngine::new()
            .parse("snippet.html", "{{ body }}")
            .expect("parse");
        let vars = VariableContext::new().with("body", "a < b && c");
        assert_eq!(template.render(&vars).unwrap(), "a < b && c");
    }

    #[test]
    fn autoescape_applies_to_any_suffix() {
        let template = TeraEngine::new()
            .with_autoescape(true)
            .parse("snippet.tmpl", "{{ body }}")
            .expect("parse");
        let vars = VariableContext::new().with("body", "<b>");
        assert_eq!(template.render(&vars).unwrap(), "&lt;b&gt;");
    }

    #[test]
    fn malformed_source_is_parse_error() {
        let err = TeraEngine::new()
            .parse("broken.tmpl", "{% if unclosed")
            .err()
            .expect("parse must fail");
        assert_eq!(err.kind(), ErrorKind::TemplateParse);
        assert_eq!(err.template_name(), Some("broken.tmpl"));
    }

    #[test]
    fn missing_variable_is_render_error() {
        let template = TeraEngine::new()
            .parse("greeting.tmpl", "Hello, {{name}}!")
            .expect("parse");
        let err = template.render(&VariableContext::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
        assert!(err.to_string().contains("name"), "{err}");
    }

    #[test]
    fn loops_over_structured_values() {
        let template = TeraEngine::new()
            .parse(
                "fields.tmpl",
                "{% for f in fields %}{{ f.ty }} {{ f.name }};\n{% endfor %}",
            )
            .expect("parse");
        let vars = VariableContext::new().with(
            "fields",
            serde_json::json!([{ "name": "id", "ty": "long" }, { "name": "email", "ty": "String" }]),
        );
        assert_eq!(
            template.render(&vars).unwrap(),
            "long id;\nString email;\n"
        );
    }
}
