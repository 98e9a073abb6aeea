//! Engine registry and instrumentation behavior through the public API.

use parking_lot::Mutex;
use std::sync::Arc;
use template_trace_panel::bus::template_rendered;
use template_trace_panel::engine::{install, Context, BUILTIN_ENGINE_ID};
use template_trace_panel::utils::error::RenderError;

#[test]
fn test_install_returns_the_same_registry() {
    let first = install();
    let second = install();
    assert!(std::ptr::eq(first, second));
    assert!(!first.engines().is_empty());
    assert_eq!(first.engines()[0].id(), BUILTIN_ENGINE_ID);
}

#[test]
fn test_rendering_through_the_registry_trait_objects() {
    let registry = install();
    let engine = registry.engine(BUILTIN_ENGINE_ID).unwrap();
    let template = engine
        .template_from_str(Some("greeting.html"), "Hello {{ who }}")
        .unwrap();

    let mut ctx = Context::new();
    ctx.set("who", "world");
    assert_eq!(template.render(&ctx).unwrap(), "Hello world");
    assert_eq!(template.name(), Some("greeting.html"));
}

#[test]
fn test_render_errors_propagate_and_publish_nothing() {
    install();

    let marker = "engine-tests/failing.html";
    let seen = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&seen);
    let id = template_rendered().connect(move |event| {
        if event.name.as_deref() == Some(marker) {
            *counter.lock() += 1;
        }
    });

    let engine = install().engine(BUILTIN_ENGINE_ID).unwrap();
    let template = engine
        .template_from_str(Some(marker), "{% for x in scalar %}x{% endfor %}")
        .unwrap();

    let mut ctx = Context::new();
    ctx.set("scalar", 7);
    let result = template.render(&ctx);

    template_rendered().disconnect(id);

    assert!(matches!(result, Err(RenderError::NotIterable { .. })));
    assert_eq!(*seen.lock(), 0);
}

#[test]
fn test_successful_render_publishes_exactly_once() {
    install();

    let marker = "engine-tests/counted.html";
    let seen = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::clone(&seen);
    let id = template_rendered().connect(move |event| {
        if event.name.as_deref() == Some(marker) {
            events.lock().push(event.clone());
        }
    });

    let engine = install().engine(BUILTIN_ENGINE_ID).unwrap();
    let template = engine.template_from_str(Some(marker), "static").unwrap();
    template.render(&Context::new()).unwrap();

    template_rendered().disconnect(id);

    let events = seen.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].engine, BUILTIN_ENGINE_ID);
    assert_eq!(events[0].level, 1);
    assert!(events[0].end >= events[0].start);
    // The built-in engine always attaches a node timeline, possibly empty
    assert!(events[0].nodes.is_some());
}

#[cfg(feature = "minijinja")]
mod jinja {
    use super::*;
    use template_trace_panel::engine::JINJA_ENGINE_ID;

    #[test]
    fn test_jinja_adapter_is_probed_and_publishes() {
        let registry = install();
        let engine = registry.engine(JINJA_ENGINE_ID).unwrap();

        let marker = "engine-tests/jinja.html";
        let seen = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        let id = template_rendered().connect(move |event| {
            if event.name.as_deref() == Some(marker) {
                *counter.lock() += 1;
            }
        });

        let template = engine
            .template_from_str(Some(marker), "{{ 40 + 2 }}")
            .unwrap();
        assert_eq!(template.render(&Context::new()).unwrap(), "42");

        template_rendered().disconnect(id);
        assert_eq!(*seen.lock(), 1);
    }
}
