//! Parsing of `${kind:arg}` placeholders inside descriptor strings.
//!
//! Supported forms:
//! - `${env:NAME}`: environment variable
//! - `${var:name}`: entry of the descriptor's top-level `vars` object
//! - `${ref:/json/pointer}`: any node of the raw descriptor (RFC 6901)
//! - `${file:relative/path}`: file contents relative to the workspace root
//! - `${workspace_root}`: directory holding the descriptor
//!
//! `$${` produces a literal `${`. A lone `$` is kept as-is.

use anyhow::{Result, anyhow, bail};

/// What a placeholder refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Env(String),
    Var(String),
    Ref(String),
    File(String),
    WorkspaceRoot,
}

/// Piece of a parsed template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A descriptor string split into literal text and placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(input: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = input;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix("$${") {
                literal.push_str("${");
                rest = after;
            } else if let Some(after) = tail.strip_prefix("${") {
                let end = after
                    .find('}')
                    .ok_or_else(|| anyhow!("unterminated placeholder in {input:?}"))?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(parse_body(&after[..end])?));
                rest = &after[end + 1..];
            } else {
                literal.push('$');
                rest = &tail[1..];
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// The placeholder when it makes up the entire string.
    pub fn as_whole(&self) -> Option<&Placeholder> {
        match self.segments.as_slice() {
            [Segment::Placeholder(placeholder)] => Some(placeholder),
            _ => None,
        }
    }

    /// The template's text with no placeholders substituted (escapes applied).
    pub fn literal_text(&self) -> Option<String> {
        match self.segments.as_slice() {
            [] => Some(String::new()),
            [Segment::Literal(text)] => Some(text.clone()),
            _ => None,
        }
    }
}

/// Cheap pre-check before running the parser.
pub fn may_contain_placeholder(input: &str) -> bool {
    input.contains("${")
}

fn parse_body(body: &str) -> Result<Placeholder> {
    if body == "workspace_root" {
        return Ok(Placeholder::WorkspaceRoot);
    }
    let (kind, arg) = body
        .split_once(':')
        .ok_or_else(|| anyhow!("placeholder ${{{body}}} is missing a kind prefix"))?;
    let arg = arg.trim();
    if arg.is_empty() {
        bail!("placeholder ${{{body}}} has an empty argument");
    }
    match kind.trim() {
        "env" => Ok(Placeholder::Env(arg.to_string())),
        "var" => Ok(Placeholder::Var(arg.to_string())),
        "ref" => {
            if !arg.starts_with('/') {
                bail!("ref placeholder must be a JSON pointer starting with '/' (got {arg:?})");
            }
            Ok(Placeholder::Ref(arg.to_string()))
        }
        "file" => Ok(Placeholder::File(arg.to_string())),
        other => bail!("unknown placeholder kind {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_placeholder_is_detected() {
        let template = Template::parse("${var:ports}").expect("parse");
        assert_eq!(
            template.as_whole(),
            Some(&Placeholder::Var("ports".to_string()))
        );
    }

    #[test]
    fn mixed_text_splits_into_segments() {
        let template = Template::parse("http://${env:HOST}:${var:port}/").expect("parse");
        assert!(template.as_whole().is_none());
        assert_eq!(
            template.into_segments(),
            vec![
                Segment::Literal("http://".to_string()),
                Segment::Placeholder(Placeholder::Env("HOST".to_string())),
                Segment::Literal(":".to_string()),
                Segment::Placeholder(Placeholder::Var("port".to_string())),
                Segment::Literal("/".to_string()),
            ]
        );
    }

    #[test]
    fn escaped_and_lone_dollars_stay_literal() {
        let template = Template::parse("cost $5, literal $${env:X}").expect("parse");
        assert!(template.as_whole().is_none());
        assert_eq!(
            template.literal_text().as_deref(),
            Some("cost $5, literal ${env:X}")
        );
    }

    #[test]
    fn workspace_root_needs_no_argument() {
        let template = Template::parse("${workspace_root}/out").expect("parse");
        assert_eq!(
            template.into_segments(),
            vec![
                Segment::Placeholder(Placeholder::WorkspaceRoot),
                Segment::Literal("/out".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_placeholders_are_rejected() {
        let unterminated = Template::parse("${env:HOME").expect_err("unterminated");
        assert!(unterminated.to_string().contains("unterminated"));

        let unknown = Template::parse("${secret:x}").expect_err("unknown kind");
        assert!(unknown.to_string().contains("unknown placeholder kind"));

        let empty = Template::parse("${var:}").expect_err("empty arg");
        assert!(empty.to_string().contains("empty argument"));

        let relative_ref = Template::parse("${ref:vars/a}").expect_err("relative ref");
        assert!(relative_ref.to_string().contains("JSON pointer"));
    }
}
