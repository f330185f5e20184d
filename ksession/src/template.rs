//! `{{$name}}` prompt templates.
//!
//! ```rust
//! use ksession::{Arguments, PromptTemplate};
//!
//! let template = PromptTemplate::new("{{$history}}\nHuman: {{ $human_input }}\nChatBot:");
//! let arguments = Arguments::new().with("human_input", "hi");
//!
//! assert_eq!(template.render(&arguments), "\nHuman: hi\nChatBot:");
//! assert_eq!(template.variables(), vec!["history", "human_input"]);
//! ```

use crate::Arguments;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = parse_segments(&source);
        Self { source, segments }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Variable(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Missing arguments render as empty text.
    pub fn render(&self, arguments: &Arguments) -> String {
        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Variable(name) => {
                    if let Some(value) = arguments.get(name) {
                        rendered.push_str(&value.to_string());
                    }
                }
            }
        }
        rendered
    }
}

impl From<&str> for PromptTemplate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PromptTemplate {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

fn parse_segments(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        match parse_variable(after_open) {
            Some((name, consumed)) => {
                literal.push_str(&rest[..start]);
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
                rest = &after_open[consumed..];
            }
            None => {
                literal.push_str(&rest[..start + 2]);
                rest = after_open;
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Parses ` $name }}` after an opening `{{`, returning the name and bytes consumed.
fn parse_variable(input: &str) -> Option<(&str, usize)> {
    let trimmed = input.trim_start_matches([' ', '\t']);
    let leading = input.len() - trimmed.len();
    let body = trimmed.strip_prefix('$')?;

    let name_len = body
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }

    let name = &body[..name_len];
    let tail = &body[name_len..];
    let closing = tail.trim_start_matches([' ', '\t']);
    closing.strip_prefix("}}")?;

    let consumed = leading + 1 + name_len + (tail.len() - closing.len()) + 2;
    Some((name, consumed))
}
