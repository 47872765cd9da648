//! Structured view of a `user.js` preference file.
//!
//! Each physical line is classified as blank, comment, a preference statement
//! (`user_pref("dotted.key", value);`) or malformed. Lines keep their original
//! text, and the document remembers its line terminator (`\n` or `\r\n`) and
//! whether the last line was terminated, so rendering an unmodified document
//! reproduces the input. Edits replace only the statement text of a line;
//! comments sharing the line are kept.
//!
//! The authoritative key view follows the browser: when a key appears more
//! than once, the last occurrence wins.

mod scan;

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

pub use scan::parse_value_literal;

/// Statement keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
  UserPref,
  Pref,
}

impl Directive {
  pub fn parse(name: &str) -> Option<Self> {
    match name {
      "user_pref" => Some(Self::UserPref),
      "pref" => Some(Self::Pref),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::UserPref => "user_pref",
      Self::Pref => "pref",
    }
  }
}

impl fmt::Display for Directive {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A preference value literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
  Bool(bool),
  Int(i64),
  Float(f64),
  String(String),
}

/// Coarse type of a [`PrefValue`], used for registry type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
  Bool,
  Int,
  Float,
  String,
}

impl ValueKind {
  pub fn is_numeric(&self) -> bool {
    matches!(self, Self::Int | Self::Float)
  }
}

impl fmt::Display for ValueKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Bool => "boolean",
      Self::Int => "integer",
      Self::Float => "float",
      Self::String => "string",
    };
    f.write_str(s)
  }
}

impl PrefValue {
  pub fn kind(&self) -> ValueKind {
    match self {
      Self::Bool(_) => ValueKind::Bool,
      Self::Int(_) => ValueKind::Int,
      Self::Float(_) => ValueKind::Float,
      Self::String(_) => ValueKind::String,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Int(i) => Some(*i as f64),
      Self::Float(f) => Some(*f),
      _ => None,
    }
  }

  /// Source text for this value as it would appear in a statement.
  pub fn to_source(&self) -> String {
    match self {
      Self::Bool(b) => b.to_string(),
      Self::Int(i) => i.to_string(),
      Self::Float(f) => {
        let s = f.to_string();
        if s.contains(['.', 'e', 'E']) { s } else { format!("{s}.0") }
      }
      Self::String(s) => {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('"');
        for c in s.chars() {
          match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
          }
        }
        out.push('"');
        out
      }
    }
  }
}

impl fmt::Display for PrefValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_source())
  }
}

/// A well-formed `directive("key", value);` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefStatement {
  /// 1-based line number in the source text.
  pub line: usize,
  pub directive: Directive,
  pub key: String,
  /// Value exactly as written in the source.
  pub raw_value: String,
  pub value: PrefValue,
  /// Byte range of the statement, through its `;`, within the line text.
  #[serde(skip)]
  pub span: Range<usize>,
}

impl PrefStatement {
  pub fn render(directive: Directive, key: &str, value: &PrefValue) -> String {
    format!(
      "{}({}, {});",
      directive,
      PrefValue::String(key.to_string()).to_source(),
      value.to_source()
    )
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineKind {
  Blank,
  Comment,
  Pref(PrefStatement),
  Malformed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLine {
  pub number: usize,
  pub text: String,
  pub kind: LineKind,
  /// Byte offset in `text` past any block comment carried over from an
  /// earlier line.
  #[serde(skip)]
  pub code_start: usize,
}

impl DocumentLine {
  pub fn statement(&self) -> Option<&PrefStatement> {
    match &self.kind {
      LineKind::Pref(stmt) => Some(stmt),
      _ => None,
    }
  }

  /// True for blank and comment lines.
  pub fn is_trivia(&self) -> bool {
    matches!(self.kind, LineKind::Blank | LineKind::Comment)
  }

  /// The part of the line outside a carried-over block comment.
  pub fn code(&self) -> &str {
    &self.text[self.code_start..]
  }
}

/// Parsed preference file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
  lines: Vec<DocumentLine>,
  /// key -> index into `lines` of the last occurrence.
  index: HashMap<String, usize>,
  /// Keys in first-seen order.
  order: Vec<String>,
  newline: &'static str,
  trailing_newline: bool,
}

impl Default for ConfigDocument {
  fn default() -> Self {
    Self::parse("")
  }
}

impl ConfigDocument {
  pub fn parse(text: &str) -> Self {
    let newline = match text.find('\n') {
      Some(i) if text[..i].ends_with('\r') => "\r\n",
      _ => "\n",
    };

    let mut in_block = false;
    let lines = text
      .lines()
      .enumerate()
      .map(|(i, raw)| {
        let number = i + 1;
        let (kind, code_start) = scan::classify(raw, number, &mut in_block);
        DocumentLine {
          number,
          text: raw.to_string(),
          kind,
          code_start,
        }
      })
      .collect();

    let mut doc = Self {
      lines,
      index: HashMap::new(),
      order: Vec::new(),
      newline,
      trailing_newline: text.is_empty() || text.ends_with('\n'),
    };
    doc.rebuild_index();
    doc
  }

  /// Line terminator used when rendering.
  pub fn newline(&self) -> &'static str {
    self.newline
  }

  fn rebuild_index(&mut self) {
    self.index.clear();
    self.order.clear();
    for (idx, line) in self.lines.iter().enumerate() {
      if let Some(stmt) = line.statement() {
        if self.index.insert(stmt.key.clone(), idx).is_none() {
          self.order.push(stmt.key.clone());
        }
      }
    }
  }

  pub fn lines(&self) -> &[DocumentLine] {
    &self.lines
  }

  /// All well-formed statements in file order, duplicates included.
  pub fn statements(&self) -> impl Iterator<Item = &PrefStatement> {
    self.lines.iter().filter_map(DocumentLine::statement)
  }

  pub fn statement_count(&self) -> usize {
    self.statements().count()
  }

  /// Lines that could not be parsed as statements.
  pub fn malformed(&self) -> impl Iterator<Item = (&DocumentLine, &str)> {
    self.lines.iter().filter_map(|line| match &line.kind {
      LineKind::Malformed { reason } => Some((line, reason.as_str())),
      _ => None,
    })
  }

  /// Effective statement for `key` (last occurrence).
  pub fn get(&self, key: &str) -> Option<&PrefStatement> {
    self.index.get(key).and_then(|&idx| self.lines[idx].statement())
  }

  /// Unique keys in first-seen order.
  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.order.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  /// Sets `key` to `value`.
  ///
  /// The effective statement is rewritten in place, keeping its directive and
  /// anything else on its line; a new `user_pref` line is appended when the
  /// key is not present.
  pub fn set(&mut self, key: &str, value: PrefValue) {
    match self.index.get(key).copied() {
      Some(idx) => {
        let line = &mut self.lines[idx];
        if let LineKind::Pref(stmt) = &line.kind {
          let rendered = PrefStatement::render(stmt.directive, key, &value);
          line.text.replace_range(stmt.span.clone(), &rendered);
        }
      }
      None => {
        let text = PrefStatement::render(Directive::UserPref, key, &value);
        self.lines.push(DocumentLine {
          number: self.lines.len() + 1,
          text,
          kind: LineKind::Blank,
          code_start: 0,
        });
      }
    }
    self.reparse();
  }

  /// Removes every statement for `key`. Returns whether anything was removed.
  ///
  /// A line left with only whitespace is dropped; a line that also carries a
  /// comment keeps the comment.
  pub fn remove(&mut self, key: &str) -> bool {
    let mut removed = false;
    self.lines.retain_mut(|line| {
      let span = match &line.kind {
        LineKind::Pref(stmt) if stmt.key == key => stmt.span.clone(),
        _ => return true,
      };
      removed = true;
      line.text.replace_range(span, "");
      !line.text.trim().is_empty()
    });
    if removed {
      self.reparse();
    }
    removed
  }

  fn reparse(&mut self) {
    let text = self.render();
    let (newline, trailing_newline) = (self.newline, self.trailing_newline);
    *self = Self::parse(&text);
    self.newline = newline;
    self.trailing_newline = trailing_newline;
  }

  /// Renders the document back to text with the original line terminator.
  pub fn render(&self) -> String {
    let mut out = String::new();
    for (i, line) in self.lines.iter().enumerate() {
      if i > 0 {
        out.push_str(self.newline);
      }
      out.push_str(&line.text);
    }
    if self.trailing_newline && !self.lines.is_empty() {
      out.push_str(self.newline);
    }
    out
  }
}
