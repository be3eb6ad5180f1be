//! Renderer backed by the built-in `{{ … }}` template language.

use distgen_core::{
    application::ports::TemplateRenderer,
    domain::{Bindings, MissingVariablePolicy, RenderedOutput, Template},
    error::DistgenResult,
};
use tracing::{debug, instrument};

/// Renders templates with the engine in `distgen_core::domain::template`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer {
    policy: MissingVariablePolicy,
}

impl PlaceholderRenderer {
    /// Create a renderer using the default policy for unbound variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with an explicit policy for unbound variables.
    pub fn with_policy(policy: MissingVariablePolicy) -> Self {
        Self { policy }
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    #[instrument(skip_all, fields(policy = %self.policy))]
    fn render(&self, source: &str, bindings: &Bindings) -> DistgenResult<RenderedOutput> {
        let template = Template::parse(source)?;
        debug!(
            variables = ?template.variables(),
            is_static = template.is_static(),
            "Template parsed"
        );

        Ok(template.render(bindings, self.policy)?)
    }
}
