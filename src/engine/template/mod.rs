//! The built-in template engine.
//!
//! Deliberately small: `{{ var.path }}` substitution, `{% if %}` /
//! `{% for %}` blocks, `{% include "name" %}`, and the `{% profile %}`
//! span tag. Every render, including the nested render behind an
//! `include`, goes through the instrumentation wrapper and exposes its
//! node tree to the per-node timeline walker.

mod nodes;
mod parser;
mod timeline;

use crate::engine::{Context, RenderableTemplate, TemplateEngine, BUILTIN_ENGINE_ID};
use crate::instrument::{instrumented_render, RenderMeta};
use crate::utils::error::{ParseError, RenderError};
use nodes::{NodeList, RenderEnv};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Template registry and loader.
///
/// Single-threaded by design: a request owns its engine, templates carry
/// interior span cells and are not meant to cross threads.
pub struct Engine {
    inner: Rc<EngineInner>,
}

#[derive(Default)]
pub(crate) struct EngineInner {
    templates: RefCell<HashMap<String, Rc<CompiledTemplate>>>,
}

impl EngineInner {
    pub(crate) fn get(&self, name: &str) -> Option<Rc<CompiledTemplate>> {
        self.templates.borrow().get(name).cloned()
    }
}

pub(crate) struct CompiledTemplate {
    name: Option<String>,
    root: NodeList,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(EngineInner::default()),
        }
    }

    /// Parse and register a template under `name`, making it available to
    /// `{% include %}` and [`Engine::get_template`].
    pub fn add_template(
        &self,
        name: impl Into<String>,
        source: &str,
    ) -> Result<(), ParseError> {
        let name = name.into();
        let root = parser::parse(source)?;
        let compiled = Rc::new(CompiledTemplate {
            name: Some(name.clone()),
            root,
        });
        self.inner.templates.borrow_mut().insert(name, compiled);
        Ok(())
    }

    pub fn get_template(&self, name: &str) -> Result<Template, RenderError> {
        self.inner
            .get(name)
            .map(|compiled| Template {
                engine: Rc::clone(&self.inner),
                compiled,
            })
            .ok_or_else(|| RenderError::UnknownTemplate {
                name: name.to_string(),
            })
    }

    /// Compile a one-off template without registering it.
    pub fn template_from_source(
        &self,
        name: Option<&str>,
        source: &str,
    ) -> Result<Template, ParseError> {
        let root = parser::parse(source)?;
        Ok(Template {
            engine: Rc::clone(&self.inner),
            compiled: Rc::new(CompiledTemplate {
                name: name.map(str::to_owned),
                root,
            }),
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for Engine {
    fn id(&self) -> &'static str {
        BUILTIN_ENGINE_ID
    }

    fn template_from_str(
        &self,
        name: Option<&str>,
        source: &str,
    ) -> Result<Box<dyn RenderableTemplate>, ParseError> {
        Ok(Box::new(self.template_from_source(name, source)?))
    }
}

/// A compiled template bound to its engine's registry.
pub struct Template {
    engine: Rc<EngineInner>,
    compiled: Rc<CompiledTemplate>,
}

impl Template {
    pub fn name(&self) -> Option<&str> {
        self.compiled.name.as_deref()
    }

    /// Render with `ctx`. The instrumented entry point: timing, nesting
    /// level and the node timeline are captured here.
    pub fn render(&self, ctx: &Context) -> Result<String, RenderError> {
        render_compiled(&self.engine, &self.compiled, ctx, 0)
    }
}

impl RenderableTemplate for Template {
    fn name(&self) -> Option<&str> {
        Template::name(self)
    }

    fn render(&self, ctx: &Context) -> Result<String, RenderError> {
        Template::render(self, ctx)
    }
}

pub(crate) fn render_compiled(
    engine: &EngineInner,
    compiled: &CompiledTemplate,
    ctx: &Context,
    include_depth: usize,
) -> Result<String, RenderError> {
    compiled.root.clear_spans();

    let walker = |start_level: usize| timeline::node_timeline(&compiled.root, start_level);
    let meta = RenderMeta {
        engine: BUILTIN_ENGINE_ID,
        name: compiled.name.as_deref(),
        node_timeline: Some(&walker),
    };

    instrumented_render(meta, || {
        let mut out = String::new();
        let env = RenderEnv {
            engine,
            include_depth,
        };
        compiled.root.render(ctx, &env, &mut out)?;
        Ok(out)
    })
}
