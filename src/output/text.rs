//! Text rendering of the timeline and summary for the CLI.
//!
//! A bar view of the request window plus a per-template totals table, for
//! inspecting a payload without the toolbar UI.

use crate::aggregator::StatsPayload;
use crate::utils::config::{ANONYMOUS_TEMPLATE_NAME, TEXT_TIMELINE_WIDTH};

/// Render a payload as a human-readable timeline and summary.
pub fn render_text_timeline(payload: &StatsPayload) -> String {
    if payload.templates.is_empty() {
        return "  (no renders recorded)".to_string();
    }

    let mut lines = Vec::new();

    lines.push("  TEMPLATE RENDER TIMELINE".to_string());
    lines.push(format!(
        "  {} call(s) in {:.2} ms",
        payload.total_calls, payload.window_ms
    ));
    lines.push(String::new());

    for entry in &payload.templates {
        let name = entry
            .name
            .as_deref()
            .unwrap_or(ANONYMOUS_TEMPLATE_NAME)
            .to_string();
        lines.push(format!(
            "  {:>3}  |{}| {:>9.3} ms  {}",
            format!("L{}", entry.level),
            bar(entry.offset_p, entry.duration_p),
            entry.time_ms,
            name
        ));
    }

    lines.push(String::new());
    lines.push("  RENDER TIME SUMMARY".to_string());
    lines.push(format!(
        "  ┏{}┳{}┓",
        "━".repeat(42),
        "━".repeat(14)
    ));
    lines.push(format!("  ┃ {:<40} ┃ {:^12} ┃", "Template (Slowest First)", "TOTAL MS"));
    lines.push(format!(
        "  ┣{}╋{}┫",
        "━".repeat(42),
        "━".repeat(14)
    ));

    for entry in &payload.summary {
        let display_name = if entry.name.len() > 40 {
            format!("...{}", &entry.name[entry.name.len() - 37..])
        } else {
            entry.name.clone()
        };
        lines.push(format!(
            "  ┃ {:<40} ┃ {:>12.3} ┃",
            display_name, entry.total_time_ms
        ));
    }

    lines.push(format!(
        "  ┗{}┻{}┛",
        "━".repeat(42),
        "━".repeat(14)
    ));

    lines.join("\n")
}

/// One timeline bar: offset as leading space, duration as a filled block.
fn bar(offset_p: f64, duration_p: f64) -> String {
    let width = TEXT_TIMELINE_WIDTH;
    let lead = ((offset_p / 100.0) * width as f64).round() as usize;
    let lead = lead.min(width);
    let fill = ((duration_p / 100.0) * width as f64).round() as usize;
    // Every render is at least one cell wide so it stays visible
    let fill = fill.max(1).min(width - lead.min(width - 1));

    let mut out = String::with_capacity(width);
    out.push_str(&" ".repeat(lead.min(width - fill)));
    out.push_str(&"█".repeat(fill));
    let used = out.chars().count();
    out.push_str(&" ".repeat(width - used));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::finalize;
    use crate::color::ColorPair;
    use crate::recorder::TemplateRenderRecord;

    fn record(name: &str, start: f64, end: f64) -> TemplateRenderRecord {
        TemplateRenderRecord {
            engine: "builtin",
            name: Some(name.to_string()),
            start,
            end,
            time_ms: (end - start) * 1000.0,
            level: 1,
            color: ColorPair::from_background([0x80, 0, 0]),
            nodes: None,
        }
    }

    #[test]
    fn test_empty_payload_renders_placeholder() {
        let text = render_text_timeline(&finalize(Vec::new()));
        assert!(text.contains("no renders recorded"));
    }

    #[test]
    fn test_timeline_lists_every_template() {
        let text = render_text_timeline(&finalize(vec![
            record("index.html", 0.0, 1.0),
            record("footer.html", 0.5, 1.0),
        ]));
        assert!(text.contains("index.html"));
        assert!(text.contains("footer.html"));
        assert!(text.contains("2 call(s) in 1000.00 ms"));
    }

    #[test]
    fn test_bar_widths_follow_percentages() {
        let full = bar(0.0, 100.0);
        assert_eq!(full.chars().filter(|c| *c == '█').count(), TEXT_TIMELINE_WIDTH);

        let half = bar(50.0, 50.0);
        assert_eq!(half.chars().filter(|c| *c == '█').count(), TEXT_TIMELINE_WIDTH / 2);
        assert!(half.starts_with(&" ".repeat(TEXT_TIMELINE_WIDTH / 2)));

        // A zero-duration render still shows one cell
        let sliver = bar(0.0, 0.0);
        assert_eq!(sliver.chars().filter(|c| *c == '█').count(), 1);
    }

    #[test]
    fn test_bar_is_always_full_width() {
        for (offset, duration) in [(0.0, 100.0), (100.0, 100.0), (25.0, 10.0), (99.0, 0.5)] {
            assert_eq!(bar(offset, duration).chars().count(), TEXT_TIMELINE_WIDTH);
        }
    }
}
