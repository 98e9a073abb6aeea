//! Output schema for the per-request stats payload.
//!
//! This is the shape handed to the display layer (and written by the
//! `demo` command). Schema is versioned to allow future evolution.

use crate::bus::SourcePosition;
use crate::color::ColorPair;
use serde::{Deserialize, Serialize};

/// Top-level stats for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsPayload {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the payload was built
    pub generated_at: String,

    /// Number of recorded render calls
    pub total_calls: usize,

    /// Width of the request's render window, milliseconds
    pub window_ms: f64,

    /// One entry per recorded render call, ascending by start time
    pub templates: Vec<TemplateStats>,

    /// Per-template-name totals, descending by total time
    pub summary: Vec<SummaryEntry>,
}

/// One render call on the request timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateStats {
    /// Identifier of the originating engine
    pub engine: String,

    /// Template display name, if the engine had one
    pub name: Option<String>,

    /// Start timestamp, seconds
    pub start: f64,

    /// End timestamp, seconds
    pub end: f64,

    /// Render duration, milliseconds
    pub time_ms: f64,

    /// Nesting level of the render call
    pub level: usize,

    /// Row color (background plus readable text color)
    pub color: ColorPair,

    /// Start offset as a percentage of the request window
    pub offset_p: f64,

    /// Duration as a percentage of the request window
    pub duration_p: f64,

    /// Duration as a percentage of the window remaining after the offset
    pub rel_duration_p: f64,

    /// Per-node spans, present when the engine exposes a node tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<NodeTimelineEntry>>,

    /// Deepest node nesting level seen, for layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_node_level: Option<usize>,
}

/// One node span inside a template render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTimelineEntry {
    /// Node type tag ("if", "for", "profile")
    pub kind: String,

    /// Short human-readable description of the node
    pub label: String,

    /// Tree depth (0 = root children)
    pub level: usize,

    /// Start timestamp, seconds
    pub start: f64,

    /// End timestamp, seconds
    pub end: f64,

    /// Offset from the window start, milliseconds
    pub offset_ms: f64,

    /// Span duration, milliseconds
    pub time_ms: f64,

    /// Start offset as a percentage of the request window
    pub offset_p: f64,

    /// Duration as a percentage of the request window
    pub duration_p: f64,

    /// Duration as a percentage of the window remaining after the offset
    pub rel_duration_p: f64,

    /// Color keyed by node type, stable for the process lifetime
    pub color: ColorPair,

    /// Where the node's tag appears in the template source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
}

/// Aggregate render time of one template name across the request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub name: String,
    pub total_time_ms: f64,
}
