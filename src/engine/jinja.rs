//! Adapter over the `minijinja` crate.
//!
//! Compiled in only when the `minijinja` feature is enabled; the installer
//! picks it up automatically. The engine is opaque to us — no node tree,
//! so events from it carry no node timeline.

use crate::engine::{Context, RenderableTemplate, TemplateEngine, JINJA_ENGINE_ID};
use crate::instrument::{instrumented_render, RenderMeta};
use crate::utils::error::{ParseError, RenderError};

pub struct JinjaEngine;

impl JinjaEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for JinjaEngine {
    fn id(&self) -> &'static str {
        JINJA_ENGINE_ID
    }

    fn template_from_str(
        &self,
        name: Option<&str>,
        source: &str,
    ) -> Result<Box<dyn RenderableTemplate>, ParseError> {
        // minijinja reports syntax errors at render time in this adapter;
        // they surface as RenderError::Jinja
        Ok(Box::new(JinjaTemplate {
            name: name.map(str::to_owned),
            source: source.to_string(),
        }))
    }
}

pub struct JinjaTemplate {
    name: Option<String>,
    source: String,
}

impl RenderableTemplate for JinjaTemplate {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn render(&self, ctx: &Context) -> Result<String, RenderError> {
        let meta = RenderMeta {
            engine: JINJA_ENGINE_ID,
            name: self.name.as_deref(),
            node_timeline: None,
        };
        instrumented_render(meta, || {
            let env = minijinja::Environment::new();
            let template = env.template_from_named_str(
                self.name.as_deref().unwrap_or("<string>"),
                &self.source,
            )?;
            Ok(template.render(ctx)?)
        })
    }
}
