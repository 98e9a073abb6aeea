//! Per-request buffering of render events.
//!
//! A recorder is created per request and bound to the thread that created
//! it. Handlers run synchronously on the rendering thread, so ignoring
//! events from other threads scopes recording to exactly the request the
//! recorder belongs to; that is the only cross-request isolation this
//! design needs.

use crate::bus::{NodeInterval, RenderEvent};
use crate::color::{ColorPair, LevelColors};
use crate::utils::config::TOOLBAR_TEMPLATE_PREFIX;
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Recording options supplied by the host application
#[derive(Debug, Clone, Default)]
pub struct RecorderConfig {
    /// Template name prefixes to exclude from recording, in addition to
    /// the toolbar's own namespace. Exact `starts_with` semantics.
    pub skip_template_prefixes: Vec<String>,
}

/// One buffered render call, enriched for display
#[derive(Debug, Clone)]
pub struct TemplateRenderRecord {
    /// Identifier of the originating engine
    pub engine: &'static str,

    /// Template display name; `None` when the engine had none
    pub name: Option<String>,

    /// Start timestamp, seconds
    pub start: f64,

    /// End timestamp, seconds
    pub end: f64,

    /// Render duration in milliseconds
    pub time_ms: f64,

    /// Nesting level of the render call
    pub level: usize,

    /// Row color, stable per level for this recorder's lifetime
    pub color: ColorPair,

    /// Node timeline, carried through unprocessed
    pub nodes: Option<Vec<NodeInterval>>,
}

struct RecorderInner {
    enabled: bool,
    colors: LevelColors,
    buffer: Vec<TemplateRenderRecord>,
    config: RecorderConfig,
}

/// Buffers render events for one request while enabled.
#[derive(Clone)]
pub struct Recorder {
    inner: Arc<Mutex<RecorderInner>>,
    thread: ThreadId,
}

impl Recorder {
    /// Create a disabled recorder bound to the calling thread.
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecorderInner {
                enabled: false,
                colors: LevelColors::new(),
                buffer: Vec::new(),
                config,
            })),
            thread: thread::current().id(),
        }
    }

    /// Start buffering events.
    pub fn enable(&self) {
        self.inner.lock().enabled = true;
    }

    /// Stop buffering events; already-buffered records are kept.
    pub fn disable(&self) {
        self.inner.lock().enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Handle one published render event.
    ///
    /// No-op when disabled, when the event was published from another
    /// thread, or when the template name matches an excluded prefix. A
    /// missing name is never matched against prefixes and is recorded.
    pub fn on_event(&self, event: &RenderEvent) {
        if thread::current().id() != self.thread {
            return;
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if !inner.enabled {
            return;
        }
        if is_skipped(event.name.as_deref(), &inner.config.skip_template_prefixes) {
            debug!("skipping excluded template {:?}", event.name);
            return;
        }

        let color = inner.colors.get(event.level);
        inner.buffer.push(TemplateRenderRecord {
            engine: event.engine,
            name: event.name.clone(),
            start: event.start,
            end: event.end,
            time_ms: (event.end - event.start) * 1000.0,
            level: event.level,
            color,
            nodes: event.nodes.clone(),
        });
    }

    pub fn record_count(&self) -> usize {
        self.inner.lock().buffer.len()
    }

    /// Drain the buffer for aggregation.
    pub fn take_records(&self) -> Vec<TemplateRenderRecord> {
        std::mem::take(&mut self.inner.lock().buffer)
    }
}

fn is_skipped(name: Option<&str>, prefixes: &[String]) -> bool {
    match name {
        None => false,
        Some(name) => {
            name.starts_with(TOOLBAR_TEMPLATE_PREFIX)
                || prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: Option<&str>, start: f64, end: f64, level: usize) -> RenderEvent {
        RenderEvent {
            engine: "test",
            name: name.map(str::to_owned),
            start,
            end,
            level,
            nodes: None,
        }
    }

    #[test]
    fn test_disabled_recorder_buffers_nothing() {
        let recorder = Recorder::new(RecorderConfig::default());
        recorder.on_event(&event(Some("index.html"), 0.0, 1.0, 1));
        assert_eq!(recorder.record_count(), 0);

        recorder.enable();
        recorder.on_event(&event(Some("index.html"), 0.0, 1.0, 1));
        assert_eq!(recorder.record_count(), 1);

        recorder.disable();
        recorder.on_event(&event(Some("index.html"), 1.0, 2.0, 1));
        assert_eq!(recorder.record_count(), 1);
    }

    #[test]
    fn test_toolbar_templates_are_always_skipped() {
        let recorder = Recorder::new(RecorderConfig::default());
        recorder.enable();
        recorder.on_event(&event(Some("debug_toolbar/panel.html"), 0.0, 1.0, 1));
        assert_eq!(recorder.record_count(), 0);
    }

    #[test]
    fn test_configured_prefixes_are_skipped() {
        let recorder = Recorder::new(RecorderConfig {
            skip_template_prefixes: vec!["admin/".to_string()],
        });
        recorder.enable();
        recorder.on_event(&event(Some("admin/login.html"), 0.0, 1.0, 1));
        recorder.on_event(&event(Some("shop/list.html"), 0.0, 1.0, 1));
        assert_eq!(recorder.record_count(), 1);
        assert_eq!(
            recorder.take_records()[0].name.as_deref(),
            Some("shop/list.html")
        );
    }

    #[test]
    fn test_missing_name_is_recorded_not_filtered() {
        let recorder = Recorder::new(RecorderConfig {
            skip_template_prefixes: vec![String::new()],
        });
        recorder.enable();
        // An empty prefix matches every named template, but never a
        // nameless one
        recorder.on_event(&event(None, 0.0, 1.0, 1));
        recorder.on_event(&event(Some("anything.html"), 0.0, 1.0, 1));
        let records = recorder.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, None);
    }

    #[test]
    fn test_time_ms_is_derived_from_span() {
        let recorder = Recorder::new(RecorderConfig::default());
        recorder.enable();
        recorder.on_event(&event(Some("a.html"), 1.25, 1.5, 1));
        let records = recorder.take_records();
        assert!((records[0].time_ms - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_level_colors_are_stable_within_recorder() {
        let recorder = Recorder::new(RecorderConfig::default());
        recorder.enable();
        recorder.on_event(&event(Some("a.html"), 0.0, 1.0, 1));
        recorder.on_event(&event(Some("b.html"), 1.0, 2.0, 2));
        recorder.on_event(&event(Some("c.html"), 2.0, 3.0, 1));
        let records = recorder.take_records();
        assert_eq!(records[0].color, records[2].color);
        assert_ne!(records[0].color, records[1].color);
    }

    #[test]
    fn test_events_from_other_threads_are_ignored() {
        let recorder = Recorder::new(RecorderConfig::default());
        recorder.enable();

        let remote = recorder.clone();
        std::thread::spawn(move || {
            remote.on_event(&event(Some("other.html"), 0.0, 1.0, 1));
        })
        .join()
        .unwrap();

        assert_eq!(recorder.record_count(), 0);
    }
}
