//! Node timeline walker.
//!
//! Pre-order depth-first walk over a rendered template's node tree,
//! emitting an interval for every structural node that carries a measured
//! span. Output order is tree traversal order; the aggregator's start-time
//! sort never touches it.

use super::nodes::{Node, NodeList};
use crate::bus::NodeInterval;

/// Collect the measured node intervals of `root`, with tree depth starting
/// at `start_level` for the root's direct children.
pub(crate) fn node_timeline(root: &NodeList, start_level: usize) -> Vec<NodeInterval> {
    let mut intervals = Vec::new();
    walk(root, start_level, &mut intervals);
    intervals
}

fn walk(list: &NodeList, level: usize, out: &mut Vec<NodeInterval>) {
    for node in list.nodes() {
        match node {
            Node::If(n) => {
                if let Some((start, end)) = n.span.get() {
                    out.push(NodeInterval {
                        kind: "if",
                        label: n.label(),
                        start,
                        end,
                        level,
                        position: Some(n.position),
                    });
                }
                walk(&n.truthy, level + 1, out);
                walk(&n.falsy, level + 1, out);
            }
            Node::For(n) => {
                if let Some((start, end)) = n.span.get() {
                    out.push(NodeInterval {
                        kind: "for",
                        label: n.label(),
                        start,
                        end,
                        level,
                        position: Some(n.position),
                    });
                }
                walk(&n.body, level + 1, out);
            }
            Node::Profile(n) => {
                if let Some((start, end)) = n.span.get() {
                    out.push(NodeInterval {
                        kind: "profile",
                        label: n.label(),
                        start,
                        end,
                        level,
                        position: Some(n.position),
                    });
                }
                walk(&n.body, level + 1, out);
            }
            Node::Text(_) | Node::Var(_) | Node::Include(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::nodes::RenderEnv;
    use super::super::{parser, EngineInner};
    use super::*;
    use crate::engine::Context;
    use serde_json::json;

    fn render_and_walk(source: &str, ctx: &Context) -> Vec<NodeInterval> {
        let root = parser::parse(source).unwrap();
        root.clear_spans();
        let engine = EngineInner::default();
        let env = RenderEnv {
            engine: &engine,
            include_depth: 0,
        };
        let mut out = String::new();
        root.render(ctx, &env, &mut out).unwrap();
        node_timeline(&root, 0)
    }

    #[test]
    fn test_walk_is_depth_first_in_tree_order() {
        let mut ctx = Context::new();
        ctx.set("items", json!([1, 2]));
        ctx.set("ok", true);

        let intervals = render_and_walk(
            "{% for item in items %}{% if item %}x{% endif %}{% endfor %}{% if ok %}y{% endif %}",
            &ctx,
        );

        let shape: Vec<(&str, usize)> = intervals
            .iter()
            .map(|interval| (interval.kind, interval.level))
            .collect();
        assert_eq!(shape, vec![("for", 0), ("if", 1), ("if", 0)]);
    }

    #[test]
    fn test_skipped_branch_contributes_nothing() {
        let mut ctx = Context::new();
        ctx.set("ok", false);

        // The else branch holds the profile node; the truthy branch's for
        // loop is never rendered and must not appear.
        let intervals = render_and_walk(
            "{% if ok %}{% for x in xs %}a{% endfor %}{% else %}{% profile 'alt' %}b{% endprofile %}{% endif %}",
            &ctx,
        );

        let shape: Vec<(&str, usize)> = intervals
            .iter()
            .map(|interval| (interval.kind, interval.level))
            .collect();
        assert_eq!(shape, vec![("if", 0), ("profile", 1)]);
    }

    #[test]
    fn test_empty_loop_is_still_measured() {
        let mut ctx = Context::new();
        ctx.set("items", json!([]));

        let intervals = render_and_walk("{% for item in items %}x{% endfor %}", &ctx);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].kind, "for");
        assert_eq!(intervals[0].label, "for item in items");
        let (start, end) = (intervals[0].start, intervals[0].end);
        assert!(end >= start);
    }

    #[test]
    fn test_spans_are_cleared_between_renders() {
        let root = parser::parse("{% if ok %}x{% endif %}").unwrap();
        let engine = EngineInner::default();
        let env = RenderEnv {
            engine: &engine,
            include_depth: 0,
        };

        let mut ctx = Context::new();
        ctx.set("ok", true);
        let mut out = String::new();
        root.clear_spans();
        root.render(&ctx, &env, &mut out).unwrap();
        assert_eq!(node_timeline(&root, 0).len(), 1);

        // A fresh render starts from a clean slate
        root.clear_spans();
        assert!(node_timeline(&root, 0).is_empty());
    }
}
