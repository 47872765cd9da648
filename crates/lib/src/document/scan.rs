//! Single-line scanner for preference statements.

use super::{Directive, LineKind, PrefStatement, PrefValue};

struct Scanner<'a> {
  src: &'a str,
  pos: usize,
}

impl<'a> Scanner<'a> {
  fn new(src: &'a str) -> Self {
    Self { src, pos: 0 }
  }

  fn peek(&self) -> Option<char> {
    self.src[self.pos..].chars().next()
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += c.len_utf8();
    Some(c)
  }

  fn eat(&mut self, want: char) -> bool {
    if self.peek() == Some(want) {
      self.bump();
      true
    } else {
      false
    }
  }

  fn skip_ws(&mut self) {
    while self.peek().is_some_and(char::is_whitespace) {
      self.bump();
    }
  }

  fn rest(&self) -> &'a str {
    &self.src[self.pos..]
  }

  fn ident(&mut self) -> &'a str {
    let start = self.pos;
    while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
      self.bump();
    }
    &self.src[start..self.pos]
  }

  /// Reads a double-quoted string; the cursor must be on the opening quote.
  fn string(&mut self) -> Result<String, String> {
    self.bump();
    let mut out = String::new();
    loop {
      match self.bump() {
        None => return Err("unterminated string".to_string()),
        Some('"') => return Ok(out),
        Some('\\') => match self.bump() {
          None => return Err("unterminated string".to_string()),
          Some('n') => out.push('\n'),
          Some('r') => out.push('\r'),
          Some('t') => out.push('\t'),
          Some(c @ ('"' | '\\' | '\'')) => out.push(c),
          Some(c) => {
            out.push('\\');
            out.push(c);
          }
        },
        Some(c) => out.push(c),
      }
    }
  }

  fn number(&mut self) -> Result<PrefValue, String> {
    let start = self.pos;
    if matches!(self.peek(), Some('-' | '+')) {
      self.bump();
    }
    let mut digits = 0;
    let mut is_float = false;
    while let Some(c) = self.peek() {
      match c {
        '0'..='9' => digits += 1,
        '.' if !is_float => is_float = true,
        'e' | 'E' if digits > 0 => {
          is_float = true;
          self.bump();
          if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
          }
          continue;
        }
        _ => break,
      }
      self.bump();
    }
    let text = &self.src[start..self.pos];
    if digits == 0 {
      return Err(format!("invalid number `{}`", text));
    }
    if is_float {
      text
        .parse::<f64>()
        .map(PrefValue::Float)
        .map_err(|_| format!("invalid number `{}`", text))
    } else {
      text
        .trim_start_matches('+')
        .parse::<i64>()
        .map(PrefValue::Int)
        .map_err(|_| format!("integer out of range `{}`", text))
    }
  }

  fn value(&mut self) -> Result<PrefValue, String> {
    match self.peek() {
      Some('"') => self.string().map(PrefValue::String),
      Some('\'') => Err("strings must be double-quoted".to_string()),
      Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
      Some(c) if c.is_ascii_alphabetic() => match self.ident() {
        "true" => Ok(PrefValue::Bool(true)),
        "false" => Ok(PrefValue::Bool(false)),
        other => Err(format!("unsupported value `{}`", other)),
      },
      _ => Err("expected a boolean, number or string value".to_string()),
    }
  }
}

fn check_key(key: &str) -> Result<(), String> {
  if key.is_empty() {
    return Err("preference name is empty".to_string());
  }
  if let Some(bad) = key
    .chars()
    .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '@' | '{' | '}' | ':')))
  {
    return Err(format!("invalid character {:?} in preference name `{}`", bad, key));
  }
  if key.split('.').any(str::is_empty) {
    return Err(format!("preference name `{}` has an empty segment", key));
  }
  Ok(())
}

struct Parsed {
  directive: Directive,
  key: String,
  raw_value: String,
  value: PrefValue,
  /// Byte length of the statement through its `;`.
  len: usize,
  opens_block: bool,
}

fn parse_statement(code: &str) -> Result<Parsed, String> {
  let mut s = Scanner::new(code);
  s.skip_ws();

  let name = s.ident();
  if name.is_empty() {
    return Err("expected a statement such as user_pref(\"key\", value);".to_string());
  }
  let directive = Directive::parse(name).ok_or_else(|| format!("unknown directive `{}`", name))?;

  s.skip_ws();
  if !s.eat('(') {
    return Err(format!("expected `(` after `{}`", name));
  }

  s.skip_ws();
  if s.peek() != Some('"') {
    return Err("preference name must be a double-quoted string".to_string());
  }
  let key = s.string()?;
  check_key(&key)?;

  s.skip_ws();
  if !s.eat(',') {
    return Err(format!("expected `,` after \"{}\"", key));
  }

  s.skip_ws();
  let start = s.pos;
  let value = s.value()?;
  let raw_value = code[start..s.pos].to_string();

  s.skip_ws();
  if !s.eat(')') {
    return Err(format!("expected `)` after value of \"{}\"", key));
  }
  s.skip_ws();
  if !s.eat(';') {
    return Err(format!("expected `;` at end of statement for \"{}\"", key));
  }
  let len = s.pos;

  s.skip_ws();
  let rest = s.rest();
  let opens_block = if rest.is_empty() || rest.starts_with("//") {
    false
  } else if let Some(comment) = rest.strip_prefix("/*") {
    match comment.find("*/") {
      Some(end) if comment[end + 2..].trim().is_empty() => false,
      Some(_) => return Err("only one statement is allowed per line".to_string()),
      None => true,
    }
  } else {
    return Err(format!("unexpected text after statement: `{}`", rest.trim()));
  };

  Ok(Parsed {
    directive,
    key,
    raw_value,
    value,
    len,
    opens_block,
  })
}

/// Classifies one physical line, tracking `/* … */` comments across lines.
///
/// Also returns the byte offset where code starts: past the end of a block
/// comment carried over from an earlier line, otherwise 0.
pub(super) fn classify(line: &str, number: usize, in_block: &mut bool) -> (LineKind, usize) {
  let mut start = 0;
  if *in_block {
    match line.find("*/") {
      Some(end) => {
        *in_block = false;
        start = end + 2;
        if line[start..].trim().is_empty() {
          return (LineKind::Comment, start);
        }
      }
      None => return (LineKind::Comment, line.len()),
    }
  }
  (classify_code(line, start, number, in_block), start)
}

fn classify_code(line: &str, start: usize, number: usize, in_block: &mut bool) -> LineKind {
  let code = &line[start..];
  let lead = start + (code.len() - code.trim_start().len());
  let trimmed = code.trim();
  if trimmed.is_empty() {
    return LineKind::Blank;
  }
  if trimmed.starts_with("//") || trimmed.starts_with('#') {
    return LineKind::Comment;
  }
  if let Some(after) = trimmed.strip_prefix("/*") {
    return match after.find("*/") {
      None => {
        *in_block = true;
        LineKind::Comment
      }
      Some(end) => {
        let rest = lead + 2 + end + 2;
        if line[rest..].trim().is_empty() {
          LineKind::Comment
        } else {
          classify_code(line, rest, number, in_block)
        }
      }
    };
  }

  match parse_statement(trimmed) {
    Ok(parsed) => {
      if parsed.opens_block {
        *in_block = true;
      }
      LineKind::Pref(PrefStatement {
        line: number,
        directive: parsed.directive,
        key: parsed.key,
        raw_value: parsed.raw_value,
        value: parsed.value,
        span: lead..lead + parsed.len,
      })
    }
    Err(reason) => LineKind::Malformed { reason },
  }
}

/// Parses a standalone value literal (`true`, `42`, `1.5`, `"text"`).
///
/// Returns `None` when `text` is not exactly one literal.
pub fn parse_value_literal(text: &str) -> Option<PrefValue> {
  let mut s = Scanner::new(text.trim());
  let value = s.value().ok()?;
  s.rest().is_empty().then_some(value)
}
