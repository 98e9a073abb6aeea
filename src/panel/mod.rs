//! The toolbar panel: request lifecycle glue around recorder and
//! aggregator.
//!
//! The host framework drives one panel per request: construct it, call
//! `enable_instrumentation` when measurement should start,
//! `disable_instrumentation` when it should stop, and `process_response`
//! once at response time to obtain the stats payload.

use crate::aggregator::{self, StatsPayload};
use crate::bus::{template_rendered, SubscriptionId};
use crate::engine;
use crate::recorder::{Recorder, RecorderConfig};
use log::warn;

/// Displays template rendering times on the request timeline.
pub struct TemplateProfilerPanel {
    recorder: Recorder,
    subscription: Option<SubscriptionId>,
    stats: Option<StatsPayload>,
}

impl TemplateProfilerPanel {
    pub fn new() -> Self {
        Self::with_config(RecorderConfig::default())
    }

    /// Create a panel with host-supplied recording options.
    ///
    /// Installs render instrumentation as a side effect; install is
    /// one-shot process-wide, so constructing many panels is safe.
    pub fn with_config(config: RecorderConfig) -> Self {
        engine::install();
        Self {
            recorder: Recorder::new(config),
            subscription: None,
            stats: None,
        }
    }

    /// Start measuring for the current request.
    pub fn enable_instrumentation(&mut self) {
        if self.subscription.is_none() {
            let recorder = self.recorder.clone();
            self.subscription =
                Some(template_rendered().connect(move |event| recorder.on_event(event)));
        }
        self.recorder.enable();
    }

    /// Stop measuring; buffered records are kept for `process_response`.
    pub fn disable_instrumentation(&mut self) {
        self.recorder.disable();
        if let Some(id) = self.subscription.take() {
            template_rendered().disconnect(id);
        }
    }

    /// Reduce the request's records into the stats payload.
    ///
    /// Meant to be called once per request; a second call keeps and
    /// returns the first payload.
    pub fn process_response(&mut self) -> &StatsPayload {
        if self.stats.is_some() {
            warn!("process_response called more than once, keeping the first payload");
        }
        self.stats
            .get_or_insert_with(|| aggregator::finalize(self.recorder.take_records()))
    }

    /// The payload built by `process_response`, if it ran yet
    pub fn stats(&self) -> Option<&StatsPayload> {
        self.stats.as_ref()
    }

    pub fn nav_title(&self) -> &'static str {
        "Template Profiler"
    }

    /// Short call-count/duration line, recomputed from current state on
    /// each access.
    pub fn nav_subtitle(&self) -> String {
        let (calls, window_ms) = match &self.stats {
            Some(stats) => (stats.total_calls, stats.window_ms),
            None => (0, 0.0),
        };
        format!("{} calls in {:.2} ms", calls, window_ms)
    }

    pub fn title(&self) -> &'static str {
        "Template Rendering Time"
    }
}

impl Default for TemplateProfilerPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TemplateProfilerPanel {
    fn drop(&mut self) {
        // A dropped panel must not leave its handler on the bus
        if let Some(id) = self.subscription.take() {
            template_rendered().disconnect(id);
        }
    }
}
