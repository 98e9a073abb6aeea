//! Source parser for the built-in engine.
//!
//! Two-stage: tokenize into text / `{{ variable }}` / `{% tag %}` pieces,
//! then recursive descent over the tag structure. Positions are 1-based
//! line/column of the opening marker.

use super::nodes::{ForNode, IfNode, IncludeNode, Node, NodeList, ProfileNode, VarNode};
use crate::bus::SourcePosition;
use crate::utils::error::ParseError;
use std::cell::Cell;

#[derive(Debug)]
enum Token {
    Text(String),
    Var {
        path: String,
    },
    Tag {
        content: String,
        position: SourcePosition,
    },
}

#[derive(Clone, Copy, PartialEq)]
enum Marker {
    Var,
    Tag,
}

/// Parse template source into a node tree.
pub(crate) fn parse(source: &str) -> Result<NodeList, ParseError> {
    let tokens = tokenize(source)?;
    let mut iter = tokens.into_iter();
    let (list, stopped) = parse_list(&mut iter, &[])?;
    debug_assert!(stopped.is_none());
    Ok(list)
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < source.len() {
        let remainder = &source[offset..];
        let Some((idx, marker)) = find_marker(remainder) else {
            tokens.push(Token::Text(remainder.to_string()));
            break;
        };

        if idx > 0 {
            tokens.push(Token::Text(remainder[..idx].to_string()));
        }

        let open = offset + idx;
        let position = position_of(source, open);
        let body = &source[open + 2..];
        let closer = match marker {
            Marker::Var => "}}",
            Marker::Tag => "%}",
        };

        let Some(close) = body.find(closer) else {
            return Err(match marker {
                Marker::Var => ParseError::UnclosedVariable {
                    line: position.line,
                    column: position.column,
                },
                Marker::Tag => ParseError::UnclosedTag {
                    line: position.line,
                    column: position.column,
                },
            });
        };

        let content = body[..close].trim().to_string();
        tokens.push(match marker {
            Marker::Var => Token::Var { path: content },
            Marker::Tag => Token::Tag { content, position },
        });

        offset = open + 2 + close + 2;
    }

    Ok(tokens)
}

fn find_marker(s: &str) -> Option<(usize, Marker)> {
    match (s.find("{{"), s.find("{%")) {
        (None, None) => None,
        (Some(v), None) => Some((v, Marker::Var)),
        (None, Some(t)) => Some((t, Marker::Tag)),
        (Some(v), Some(t)) if v < t => Some((v, Marker::Var)),
        (_, Some(t)) => Some((t, Marker::Tag)),
    }
}

fn position_of(source: &str, offset: usize) -> SourcePosition {
    let mut line = 1;
    let mut column = 1;
    for ch in source[..offset].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    SourcePosition { line, column }
}

type TokenIter = std::vec::IntoIter<Token>;

/// Parse nodes until one of the `stop` tags (returned, consumed) or the
/// end of input (returns `None` — the caller decides whether that is an
/// unclosed block).
fn parse_list(
    iter: &mut TokenIter,
    stop: &[&str],
) -> Result<(NodeList, Option<String>), ParseError> {
    let mut nodes = Vec::new();

    while let Some(token) = iter.next() {
        match token {
            Token::Text(text) => nodes.push(Node::Text(text)),
            Token::Var { path } => nodes.push(Node::Var(VarNode { path })),
            Token::Tag { content, position } => {
                let tag = content.split_whitespace().next().unwrap_or("");
                if stop.contains(&tag) {
                    return Ok((NodeList::new(nodes), Some(tag.to_string())));
                }
                match tag {
                    "if" => nodes.push(parse_if(&content, position, iter)?),
                    "for" => nodes.push(parse_for(&content, position, iter)?),
                    "profile" => nodes.push(parse_profile(&content, position, iter)?),
                    "include" => nodes.push(parse_include(&content, position)?),
                    "else" | "endif" | "endfor" | "endprofile" => {
                        return Err(ParseError::UnexpectedEndTag {
                            tag: tag.to_string(),
                            line: position.line,
                        });
                    }
                    other => {
                        return Err(ParseError::UnknownTag {
                            tag: other.to_string(),
                            line: position.line,
                        });
                    }
                }
            }
        }
    }

    Ok((NodeList::new(nodes), None))
}

fn parse_if(
    content: &str,
    position: SourcePosition,
    iter: &mut TokenIter,
) -> Result<Node, ParseError> {
    let mut parts = content.split_whitespace().skip(1);
    let condition = match (parts.next(), parts.next()) {
        (Some(condition), None) => condition.to_string(),
        _ => {
            return Err(ParseError::BadTagArguments {
                tag: "if".to_string(),
                line: position.line,
                detail: "expected a single condition".to_string(),
            });
        }
    };

    let (truthy, stopped) = parse_list(iter, &["else", "endif"])?;
    let falsy = match stopped.as_deref() {
        Some("else") => {
            let (falsy, stopped) = parse_list(iter, &["endif"])?;
            if stopped.is_none() {
                return Err(unclosed("if", position));
            }
            falsy
        }
        Some(_) => NodeList::default(),
        None => return Err(unclosed("if", position)),
    };

    Ok(Node::If(IfNode {
        condition,
        truthy,
        falsy,
        position,
        span: Cell::new(None),
    }))
}

fn parse_for(
    content: &str,
    position: SourcePosition,
    iter: &mut TokenIter,
) -> Result<Node, ParseError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    let (var, iterable) = match parts.as_slice() {
        ["for", var, "in", iterable] => (var.to_string(), iterable.to_string()),
        _ => {
            return Err(ParseError::BadTagArguments {
                tag: "for".to_string(),
                line: position.line,
                detail: "expected 'for <var> in <path>'".to_string(),
            });
        }
    };

    let (body, stopped) = parse_list(iter, &["endfor"])?;
    if stopped.is_none() {
        return Err(unclosed("for", position));
    }

    Ok(Node::For(ForNode {
        var,
        iterable,
        body,
        position,
        span: Cell::new(None),
    }))
}

fn parse_profile(
    content: &str,
    position: SourcePosition,
    iter: &mut TokenIter,
) -> Result<Node, ParseError> {
    let label = unquote(content["profile".len()..].trim()).to_string();

    let (body, stopped) = parse_list(iter, &["endprofile"])?;
    if stopped.is_none() {
        return Err(unclosed("profile", position));
    }

    Ok(Node::Profile(ProfileNode {
        label,
        body,
        position,
        span: Cell::new(None),
    }))
}

fn parse_include(content: &str, position: SourcePosition) -> Result<Node, ParseError> {
    let name = unquote(content["include".len()..].trim()).to_string();
    if name.is_empty() {
        return Err(ParseError::BadTagArguments {
            tag: "include".to_string(),
            line: position.line,
            detail: "expected a template name".to_string(),
        });
    }

    Ok(Node::Include(IncludeNode { name, position }))
}

fn unclosed(tag: &str, position: SourcePosition) -> ParseError {
    ParseError::UnclosedBlock {
        tag: tag.to_string(),
        line: position.line,
    }
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
