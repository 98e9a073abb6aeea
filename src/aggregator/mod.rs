//! Reduction of buffered render records into the stats payload.
//!
//! Two passes over the buffer: the first folds the window bounds and the
//! per-name totals, the second places every record (and its node timeline,
//! when present) on the percentage timeline.

pub mod schema;
pub mod timeline;

// Re-export main types and functions
pub use schema::{NodeTimelineEntry, StatsPayload, SummaryEntry, TemplateStats};
pub use timeline::{percent, TimelineSlot, Window};

use crate::color::node_kind_color;
use crate::recorder::TemplateRenderRecord;
use crate::utils::config::{ANONYMOUS_TEMPLATE_NAME, SCHEMA_VERSION};
use chrono::Utc;
use indexmap::IndexMap;
use log::debug;

/// Reduce one request's records into the final payload.
///
/// Called once per request after recording has stopped. An empty buffer
/// yields an empty payload with no division performed.
pub fn finalize(records: Vec<TemplateRenderRecord>) -> StatsPayload {
    debug!("aggregating {} render record(s)", records.len());

    // Pass 1: window bounds and per-name totals. The bounds fold starts
    // from None so a legitimate first timestamp of exactly 0.0 is never
    // mistaken for "not yet set".
    let mut t_min: Option<f64> = None;
    let mut t_max: Option<f64> = None;
    let mut totals: IndexMap<String, f64> = IndexMap::new();

    for record in &records {
        t_min = Some(match t_min {
            None => record.start,
            Some(current) => current.min(record.start),
        });
        t_max = Some(match t_max {
            None => record.end,
            Some(current) => current.max(record.end),
        });

        let name = record
            .name
            .clone()
            .unwrap_or_else(|| ANONYMOUS_TEMPLATE_NAME.to_string());
        *totals.entry(name).or_insert(0.0) += record.time_ms;
    }

    let window = match (t_min, t_max) {
        (Some(min), Some(max)) => Window::from_bounds(min, max),
        _ => return empty_payload(),
    };

    // Pass 2: place every record on the timeline
    let mut templates: Vec<TemplateStats> = records
        .iter()
        .map(|record| place_record(record, &window))
        .collect();
    templates.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut summary: Vec<SummaryEntry> = totals
        .into_iter()
        .map(|(name, total_time_ms)| SummaryEntry {
            name,
            total_time_ms,
        })
        .collect();
    summary.sort_by(|a, b| b.total_time_ms.total_cmp(&a.total_time_ms));

    StatsPayload {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        total_calls: templates.len(),
        window_ms: window.width() * 1000.0,
        templates,
        summary,
    }
}

fn empty_payload() -> StatsPayload {
    StatsPayload {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        total_calls: 0,
        window_ms: 0.0,
        templates: Vec::new(),
        summary: Vec::new(),
    }
}

fn place_record(record: &TemplateRenderRecord, window: &Window) -> TemplateStats {
    let slot = window.slot(record.start, record.end);

    let (nodes, max_node_level) = match &record.nodes {
        None => (None, None),
        Some(intervals) => {
            let entries: Vec<NodeTimelineEntry> = intervals
                .iter()
                .map(|interval| {
                    let slot = window.slot(interval.start, interval.end);
                    NodeTimelineEntry {
                        kind: interval.kind.to_string(),
                        label: interval.label.clone(),
                        level: interval.level,
                        start: interval.start,
                        end: interval.end,
                        offset_ms: (interval.start - window.t_min()) * 1000.0,
                        time_ms: (interval.end - interval.start) * 1000.0,
                        offset_p: slot.offset_p,
                        duration_p: slot.duration_p,
                        rel_duration_p: slot.rel_duration_p,
                        color: node_kind_color(interval.kind),
                        position: interval.position,
                    }
                })
                .collect();
            let max_level = entries.iter().map(|entry| entry.level).max();
            (Some(entries), max_level)
        }
    };

    TemplateStats {
        engine: record.engine.to_string(),
        name: record.name.clone(),
        start: record.start,
        end: record.end,
        time_ms: record.time_ms,
        level: record.level,
        color: record.color.clone(),
        offset_p: slot.offset_p,
        duration_p: slot.duration_p,
        rel_duration_p: slot.rel_duration_p,
        nodes,
        max_node_level,
    }
}
