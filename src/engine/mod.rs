//! Template engines and the one-shot instrumentation installer.
//!
//! Engines are a statically known, extensible list: the built-in engine is
//! always present, and the minijinja adapter joins it when the `minijinja`
//! cargo feature is compiled in. [`install`] probes that list exactly once
//! per process and arms the render wrapper; constructing more panels never
//! re-wraps anything.

pub mod template;

#[cfg(feature = "minijinja")]
pub mod jinja;

use crate::instrument;
use crate::utils::error::{ParseError, RenderError};
use log::{debug, info};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value;

/// Engine id of the built-in template engine
pub const BUILTIN_ENGINE_ID: &str = "builtin";

/// Engine id of the optional minijinja adapter
#[cfg(feature = "minijinja")]
pub const JINJA_ENGINE_ID: &str = "minijinja";

/// Rendering context: a named bag of JSON-shaped values.
///
/// Variables resolve by dotted path, so `user.name` walks into objects and
/// `items.0` indexes into arrays.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Context {
    values: serde_json::Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Resolve a dotted path against the context. `None` when any segment
    /// is missing.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// A template engine: hands out renderable templates from source text.
pub trait TemplateEngine {
    /// Stable identifier, also the tag on published render events
    fn id(&self) -> &'static str;

    /// Compile a one-off template from source
    fn template_from_str(
        &self,
        name: Option<&str>,
        source: &str,
    ) -> Result<Box<dyn RenderableTemplate>, ParseError>;
}

/// A compiled template exposing the instrumented render entry point.
pub trait RenderableTemplate {
    /// Display name used for filtering and the per-request summary
    fn name(&self) -> Option<&str>;

    /// Render with the given context. Engine errors propagate unchanged.
    fn render(&self, ctx: &Context) -> Result<String, RenderError>;
}

/// One probed engine: id plus a constructor for fresh instances.
///
/// The registry hands out constructors rather than shared instances because
/// engines (and their templates) are single-threaded values owned by the
/// request that uses them.
pub struct EngineDescriptor {
    id: &'static str,
    constructor: fn() -> Box<dyn TemplateEngine>,
}

impl EngineDescriptor {
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn create(&self) -> Box<dyn TemplateEngine> {
        (self.constructor)()
    }
}

/// Process-wide instrumentation registry, built once by [`install`]
pub struct Instrumentation {
    engines: Vec<EngineDescriptor>,
}

impl Instrumentation {
    /// Every engine available in this process
    pub fn engines(&self) -> &[EngineDescriptor] {
        &self.engines
    }

    /// Look up an engine by id and construct a fresh instance
    pub fn engine(&self, id: &str) -> Option<Box<dyn TemplateEngine>> {
        self.engines
            .iter()
            .find(|descriptor| descriptor.id == id)
            .map(EngineDescriptor::create)
    }
}

static INSTRUMENTATION: OnceCell<Instrumentation> = OnceCell::new();

/// Install render instrumentation for every available engine.
///
/// Idempotent and safe to call from every panel constructor: the engine
/// list is probed once per process and event emission is armed by a
/// one-shot flag, so repeated calls return the same registry and can never
/// double-count a render.
pub fn install() -> &'static Instrumentation {
    let instrumentation = INSTRUMENTATION.get_or_init(|| {
        let engines = probe_engines();
        info!(
            "template instrumentation installed, {} engine(s): {}",
            engines.len(),
            engines
                .iter()
                .map(EngineDescriptor::id)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Instrumentation { engines }
    });

    instrument::arm();
    debug!("install() called, {} engine(s) registered", instrumentation.engines.len());
    instrumentation
}

fn probe_engines() -> Vec<EngineDescriptor> {
    #[allow(unused_mut)]
    let mut engines = vec![EngineDescriptor {
        id: BUILTIN_ENGINE_ID,
        constructor: || Box::new(template::Engine::new()),
    }];

    #[cfg(feature = "minijinja")]
    engines.push(EngineDescriptor {
        id: JINJA_ENGINE_ID,
        constructor: || Box::new(jinja::JinjaEngine::new()),
    });

    engines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_install_is_idempotent() {
        let first = install();
        let second = install();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.engines().len(), second.engines().len());
        assert!(instrument::is_installed());
    }

    #[test]
    fn test_builtin_engine_is_always_probed() {
        let instrumentation = install();
        assert!(instrumentation.engine(BUILTIN_ENGINE_ID).is_some());
        assert!(instrumentation.engine("no-such-engine").is_none());
    }

    #[test]
    fn test_context_resolves_dotted_paths() {
        let mut ctx = Context::new();
        ctx.set("user", json!({"name": "ada", "tags": ["a", "b"]}));
        ctx.set("count", 3);

        assert_eq!(ctx.resolve("user.name"), Some(&json!("ada")));
        assert_eq!(ctx.resolve("user.tags.1"), Some(&json!("b")));
        assert_eq!(ctx.resolve("count"), Some(&json!(3)));
        assert_eq!(ctx.resolve("user.missing"), None);
        assert_eq!(ctx.resolve("user.tags.7"), None);
        assert_eq!(ctx.resolve("absent"), None);
    }
}
