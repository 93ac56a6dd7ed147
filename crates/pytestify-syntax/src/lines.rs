//! Line classification.
//!
//! The converter only understands a handful of line shapes: `with` headers,
//! `class` openers and `def name(self, ...)` helpers. Everything else is
//! carried through as opaque text. This module splits the source into lines,
//! measures their indentation and tags each one.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Scope;
use crate::parser::{ParseError, ParseResult};
use crate::span::Span;

static MAMBA_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(from|import)\s+mamba(\s|$)").unwrap());

static WITH_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^with\s+(description|context|describe|it|(?:before|after)[._](?:each|all))\b").unwrap()
});

static WITH_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^with\s+(description|context|describe|it|(?:before|after)[._](?:each|all))\s*(?:\(\s*['"](.*)['"]\s*\))?(\s+as\s+self)?\s*:\s*(#.*)?$"#,
    )
    .unwrap()
});

static CLASS_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^class\s").unwrap());

static METHOD_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^def\s+\w+\s*\(\s*self(\W|$)").unwrap());

static METHOD_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^def\s+(\w+)\s*\(\s*self[^,)]*(?:,\s*([^#]+))?\)([^:#]*:\s*(#.*)?)$").unwrap()
});

/// Source text of a reserved pytest function at top level.
const RESERVED_DEF: &str = "def test_";

// ============================================================================
// Line types
// ============================================================================

/// One physical source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number.
    pub number: u32,
    /// Number of leading spaces.
    pub indent: usize,
    /// The full line including indentation and its `\n`.
    pub text: String,
}

impl SourceLine {
    /// Span of this line.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::line(self.number)
    }

    /// The line without indentation and line terminator.
    #[must_use]
    pub fn content(&self) -> &str {
        self.text[self.indent.min(self.text.len())..].trim_end_matches(['\n', '\r'])
    }
}

/// What a `with` header declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// `description`, `context` or `describe`.
    Group,
    /// `it`.
    Example,
    /// `before.each` or `before.all`.
    Setup(Scope),
    /// `after.each` or `after.all`.
    Teardown(Scope),
}

impl HeaderKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword.replace('_', ".").as_str() {
            "description" | "context" | "describe" => Self::Group,
            "it" => Self::Example,
            "before.each" => Self::Setup(Scope::PerExample),
            "before.all" => Self::Setup(Scope::PerGroup),
            "after.each" => Self::Teardown(Scope::PerExample),
            "after.all" => Self::Teardown(Scope::PerGroup),
            _ => return None,
        };
        Some(kind)
    }
}

/// A recognized `with <keyword>(...) [as self]:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// The source line.
    pub line: SourceLine,
    /// Declared node kind.
    pub kind: HeaderKind,
    /// Quoted title, if present.
    pub title: Option<String>,
    /// Declared with `as self`.
    pub capturing: bool,
    /// Trailing `# comment`, if present.
    pub comment: Option<String>,
}

impl Header {
    /// The same header without its trailing comment.
    #[must_use]
    pub fn without_comment(self) -> Self {
        Self {
            comment: None,
            ..self
        }
    }
}

/// A `def name(self, ...):` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodHeader {
    /// The source line.
    pub line: SourceLine,
    /// Function name.
    pub name: String,
}

/// A classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Blank or comment-only; never affects indentation structure.
    Codeless(SourceLine),
    /// Anything not otherwise recognized.
    Code(SourceLine),
    /// A `class` declaration whose body is opaque.
    Opaque(SourceLine),
    /// A `with` header.
    Header(Header),
    /// A helper bound to `self`.
    Method(MethodHeader),
}

impl Line {
    /// The underlying source line.
    #[must_use]
    pub const fn source(&self) -> &SourceLine {
        match self {
            Self::Codeless(line) | Self::Code(line) | Self::Opaque(line) => line,
            Self::Header(header) => &header.line,
            Self::Method(method) => &method.line,
        }
    }

    /// Indentation of the line.
    #[must_use]
    pub const fn indent(&self) -> usize {
        self.source().indent
    }

    /// Downgrade the line to plain code, keeping codeless lines as they are.
    #[must_use]
    pub fn into_code(self) -> Self {
        match self {
            Self::Codeless(line) => Self::Codeless(line),
            Self::Code(line) | Self::Opaque(line) => Self::Code(line),
            Self::Header(header) => Self::Code(header.line),
            Self::Method(method) => Self::Code(method.line),
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Split `source` into classified lines.
///
/// Mamba imports are dropped. Tabs in indentation, reserved pytest names at
/// top level and `with` headers that look structural but cannot be parsed are
/// errors.
pub fn classify(source: &str) -> ParseResult<Vec<Line>> {
    let mut lines = Vec::new();
    for (index, text) in source.split_inclusive('\n').enumerate() {
        let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        if let Some(line) = classify_line(number, text)? {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// Classify a single line. Returns `None` for lines that are dropped.
pub fn classify_line(number: u32, text: &str) -> ParseResult<Option<Line>> {
    let rest = text.trim_start_matches(' ');
    let indent = text.len() - rest.len();
    let line = SourceLine {
        number,
        indent,
        text: text.to_string(),
    };

    if rest.starts_with('\t') {
        return Err(ParseError::TabIndent {
            line: number,
            text: line.content().to_string(),
        });
    }

    let content = rest.trim_end_matches(['\n', '\r']);
    if content.trim().is_empty() || content.starts_with('#') {
        return Ok(Some(Line::Codeless(line)));
    }
    if text.starts_with(RESERVED_DEF) {
        return Err(ParseError::ReservedName {
            line: number,
            text: content.to_string(),
        });
    }
    if MAMBA_IMPORT.is_match(content) {
        return Ok(None);
    }
    if WITH_START.is_match(content) {
        return parse_header(line, content).map(|header| Some(Line::Header(header)));
    }
    if CLASS_START.is_match(content) {
        return Ok(Some(Line::Opaque(line)));
    }
    if METHOD_START.is_match(content) {
        return parse_method(line, content).map(|method| Some(Line::Method(method)));
    }
    Ok(Some(Line::Code(line)))
}

fn parse_header(line: SourceLine, content: &str) -> ParseResult<Header> {
    let malformed = |line: &SourceLine, reason: &str| ParseError::MalformedHeader {
        line: line.number,
        reason: reason.to_string(),
        text: content.to_string(),
    };

    let caps = WITH_HEADER
        .captures(content)
        .ok_or_else(|| malformed(&line, "cannot convert this with-line automatically, please simplify it first"))?;

    let keyword = &caps[1];
    let kind = HeaderKind::from_keyword(keyword)
        .ok_or_else(|| malformed(&line, "unknown mamba keyword"))?;
    let title = caps.get(2).map(|m| m.as_str().to_string());
    let capturing = caps.get(3).is_some();
    let comment = caps.get(4).map(|m| m.as_str().to_string());

    match kind {
        HeaderKind::Group if title.is_none() => {
            return Err(malformed(&line, &format!("encountered nameless {keyword}()")));
        }
        HeaderKind::Example if title.is_none() => {
            return Err(malformed(&line, "encountered nameless it()"));
        }
        HeaderKind::Example if capturing => {
            return Err(malformed(&line, "`as self` is only supported on groups"));
        }
        HeaderKind::Setup(_) | HeaderKind::Teardown(_) if title.is_some() || capturing => {
            return Err(malformed(&line, &format!("{keyword} takes neither a name nor `as self`")));
        }
        _ => {}
    }

    Ok(Header {
        line,
        kind,
        title,
        capturing,
        comment,
    })
}

fn parse_method(line: SourceLine, content: &str) -> ParseResult<MethodHeader> {
    let caps = METHOD_HEADER
        .captures(content)
        .ok_or_else(|| ParseError::MalformedHeader {
            line: line.number,
            reason: "cannot convert this method automatically, please simplify it first".to_string(),
            text: content.to_string(),
        })?;
    let name = caps[1].to_string();
    Ok(MethodHeader { line, name })
}
