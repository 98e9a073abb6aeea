//! Parse-tree nodes of the built-in engine.
//!
//! Structural nodes (the ones owning child node-lists) capture a start/end
//! span around their own render, the same way the top-level render is
//! wrapped. Spans live in per-node cells, cleared at the start of every
//! top-level render so a skipped branch never reports a stale interval.

use crate::bus::SourcePosition;
use crate::engine::Context;
use crate::instrument::now_seconds;
use crate::utils::config::MAX_INCLUDE_DEPTH;
use crate::utils::error::RenderError;
use serde_json::Value;
use std::cell::Cell;

/// Measured (start, end) of one node render, seconds
pub(crate) type Span = (f64, f64);

/// Per-render state threaded through the node tree
pub(crate) struct RenderEnv<'a> {
    pub engine: &'a super::EngineInner,
    pub include_depth: usize,
}

#[derive(Debug)]
pub(crate) enum Node {
    Text(String),
    Var(VarNode),
    If(IfNode),
    For(ForNode),
    Profile(ProfileNode),
    Include(IncludeNode),
}

#[derive(Debug)]
pub(crate) struct VarNode {
    pub path: String,
}

#[derive(Debug)]
pub(crate) struct IfNode {
    pub condition: String,
    pub truthy: NodeList,
    pub falsy: NodeList,
    pub position: SourcePosition,
    pub span: Cell<Option<Span>>,
}

#[derive(Debug)]
pub(crate) struct ForNode {
    pub var: String,
    pub iterable: String,
    pub body: NodeList,
    pub position: SourcePosition,
    pub span: Cell<Option<Span>>,
}

#[derive(Debug)]
pub(crate) struct ProfileNode {
    pub label: String,
    pub body: NodeList,
    pub position: SourcePosition,
    pub span: Cell<Option<Span>>,
}

#[derive(Debug)]
pub(crate) struct IncludeNode {
    pub name: String,
    pub position: SourcePosition,
}

#[derive(Debug, Default)]
pub(crate) struct NodeList {
    nodes: Vec<Node>,
}

impl NodeList {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Drop every measured span in the subtree.
    pub fn clear_spans(&self) {
        for node in &self.nodes {
            match node {
                Node::If(n) => {
                    n.span.set(None);
                    n.truthy.clear_spans();
                    n.falsy.clear_spans();
                }
                Node::For(n) => {
                    n.span.set(None);
                    n.body.clear_spans();
                }
                Node::Profile(n) => {
                    n.span.set(None);
                    n.body.clear_spans();
                }
                Node::Text(_) | Node::Var(_) | Node::Include(_) => {}
            }
        }
    }

    pub fn render(
        &self,
        ctx: &Context,
        env: &RenderEnv<'_>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        for node in &self.nodes {
            node.render(ctx, env, out)?;
        }
        Ok(())
    }
}

impl Node {
    fn render(
        &self,
        ctx: &Context,
        env: &RenderEnv<'_>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        match self {
            Node::Text(text) => {
                out.push_str(text);
                Ok(())
            }
            Node::Var(var) => {
                // Unresolved variables render as nothing
                if let Some(value) = ctx.resolve(&var.path) {
                    out.push_str(&value_to_string(value));
                }
                Ok(())
            }
            Node::If(n) => n.render(ctx, env, out),
            Node::For(n) => n.render(ctx, env, out),
            Node::Profile(n) => n.render(ctx, env, out),
            Node::Include(n) => n.render(ctx, env, out),
        }
    }
}

impl IfNode {
    pub fn label(&self) -> String {
        format!("if {}", self.condition)
    }

    fn render(
        &self,
        ctx: &Context,
        env: &RenderEnv<'_>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let start = now_seconds();
        let branch = if is_truthy(ctx.resolve(&self.condition)) {
            &self.truthy
        } else {
            &self.falsy
        };
        let result = branch.render(ctx, env, out);
        self.span.set(Some((start, now_seconds())));
        result
    }
}

impl ForNode {
    pub fn label(&self) -> String {
        format!("for {} in {}", self.var, self.iterable)
    }

    fn render(
        &self,
        ctx: &Context,
        env: &RenderEnv<'_>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let start = now_seconds();
        let result = self.render_rows(ctx, env, out);
        self.span.set(Some((start, now_seconds())));
        result
    }

    fn render_rows(
        &self,
        ctx: &Context,
        env: &RenderEnv<'_>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        match ctx.resolve(&self.iterable) {
            // A missing iterable renders as an empty loop
            None => Ok(()),
            Some(Value::Array(items)) => {
                for item in items {
                    let mut scoped = ctx.clone();
                    scoped.set(self.var.clone(), item.clone());
                    self.body.render(&scoped, env, out)?;
                }
                Ok(())
            }
            Some(_) => Err(RenderError::NotIterable {
                name: self.iterable.clone(),
            }),
        }
    }
}

impl ProfileNode {
    pub fn label(&self) -> String {
        if self.label.is_empty() {
            "profile".to_string()
        } else {
            self.label.clone()
        }
    }

    /// The manual span tag: renders its body unchanged. The only effect is
    /// the measured span the node timeline picks up.
    fn render(
        &self,
        ctx: &Context,
        env: &RenderEnv<'_>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let start = now_seconds();
        let result = self.body.render(ctx, env, out);
        self.span.set(Some((start, now_seconds())));
        result
    }
}

impl IncludeNode {
    fn render(
        &self,
        ctx: &Context,
        env: &RenderEnv<'_>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        if env.include_depth >= MAX_INCLUDE_DEPTH {
            return Err(RenderError::IncludeDepthExceeded {
                name: self.name.clone(),
            });
        }
        let compiled = env
            .engine
            .get(&self.name)
            .ok_or_else(|| RenderError::UnknownTemplate {
                name: self.name.clone(),
            })?;
        let rendered = super::render_compiled(env.engine, &compiled, ctx, env.include_depth + 1)?;
        out.push_str(&rendered);
        Ok(())
    }
}

pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
