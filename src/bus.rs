//! In-process publish/subscribe channel for render events.
//!
//! Publishing is synchronous: every subscriber runs, in registration order,
//! on the publishing thread before `publish` returns. There is no queuing
//! and no cross-thread delivery guarantee.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Position of a node in its template source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

/// One sub-node's render span inside a template.
///
/// Produced by the node timeline walker in tree traversal order; `level`
/// records tree depth, starting at 0 for children of the template root.
#[derive(Debug, Clone)]
pub struct NodeInterval {
    /// Node type tag ("if", "for", "profile"); keys the node color cache
    pub kind: &'static str,

    /// Short human-readable description of the node
    pub label: String,

    /// Start timestamp, seconds
    pub start: f64,

    /// End timestamp, seconds
    pub end: f64,

    /// Tree depth (0 = root children)
    pub level: usize,

    /// Where the node's tag appears in the template source
    pub position: Option<SourcePosition>,
}

/// A single completed render call, as published on the bus.
///
/// Immutable once published; the recorder clones what it keeps.
#[derive(Debug, Clone)]
pub struct RenderEvent {
    /// Identifier of the originating engine
    pub engine: &'static str,

    /// Template display name, if the engine knows one
    pub name: Option<String>,

    /// Start timestamp, seconds
    pub start: f64,

    /// End timestamp, seconds
    pub end: f64,

    /// Nesting depth of this render call, >= 1
    pub level: usize,

    /// Per-node render spans, when the engine exposes a node tree
    pub nodes: Option<Vec<NodeInterval>>,
}

type Handler = Arc<dyn Fn(&RenderEvent) + Send + Sync + 'static>;

/// Handle returned by [`RenderBus::connect`], used to disconnect later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Synchronous publish/subscribe primitive for [`RenderEvent`]s
pub struct RenderBus {
    subscribers: Mutex<Vec<(u64, Handler)>>,
    next_id: AtomicU64,
}

impl RenderBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler; it fires on every subsequent publish until
    /// disconnected.
    pub fn connect<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&RenderEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, Arc::new(handler)));
        SubscriptionId(id)
    }

    /// Remove a previously registered handler. Unknown ids are ignored.
    pub fn disconnect(&self, id: SubscriptionId) {
        self.subscribers.lock().retain(|(sid, _)| *sid != id.0);
    }

    /// Deliver `event` to every current subscriber in registration order.
    ///
    /// The subscriber list is snapshotted first so a handler that renders
    /// templates itself cannot deadlock against the list lock.
    pub fn publish(&self, event: &RenderEvent) {
        let handlers: Vec<Handler> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Default for RenderBus {
    fn default() -> Self {
        Self::new()
    }
}

static TEMPLATE_RENDERED: Lazy<RenderBus> = Lazy::new(RenderBus::new);

/// The process-wide bus all instrumented render calls publish to
pub fn template_rendered() -> &'static RenderBus {
    &TEMPLATE_RENDERED
}
