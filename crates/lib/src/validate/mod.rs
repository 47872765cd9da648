//! Static checks on proposed preference text.
//!
//! Validation is a pure function of the input text: it never reads or writes
//! the filesystem. Three independent checks decide validity (balance, statement
//! shape, deny-list); registry lookups only add warnings.

pub mod registry;
mod types;

use std::collections::HashMap;
use std::sync::Arc;

use crate::document::{ConfigDocument, DocumentLine, PrefStatement};

pub use registry::{Catalog, KnownPreference, PreferenceRegistry, RegistryError, ValueRange};
pub use types::{DenyRule, IssueKind, ValidationIssue, ValidationResult};

#[derive(Clone)]
pub struct ConfigValidator {
  deny_list: Vec<DenyRule>,
  registry: Arc<dyn PreferenceRegistry>,
}

impl std::fmt::Debug for ConfigValidator {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ConfigValidator")
      .field("deny_list", &self.deny_list)
      .field("registry_entries", &self.registry.entries().len())
      .finish()
  }
}

impl Default for ConfigValidator {
  fn default() -> Self {
    Self::new(DenyRule::defaults(), Arc::new(Catalog::builtin()))
  }
}

impl ConfigValidator {
  pub fn new(deny_list: Vec<DenyRule>, registry: Arc<dyn PreferenceRegistry>) -> Self {
    Self { deny_list, registry }
  }

  pub fn registry(&self) -> &dyn PreferenceRegistry {
    self.registry.as_ref()
  }

  pub fn validate(&self, text: &str) -> ValidationResult {
    let doc = ConfigDocument::parse(text);
    self.validate_document(&doc)
  }

  pub fn validate_document(&self, doc: &ConfigDocument) -> ValidationResult {
    let mut issues = Vec::new();

    for line in doc.lines().iter().filter(|l| !l.is_trivia()) {
      check_balance(line, &mut issues);
    }

    for (line, reason) in doc.malformed() {
      issues.push(ValidationIssue::new(
        line.number,
        IssueKind::MalformedStatement,
        format!("{} in `{}`", reason, line.text.trim()),
      ));
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for stmt in doc.statements() {
      self.check_denied(stmt, &mut issues);
      if let Some(first) = seen.insert(stmt.key.as_str(), stmt.line) {
        issues.push(ValidationIssue::new(
          stmt.line,
          IssueKind::DuplicateKey,
          format!("\"{}\" already set on line {}; the last value wins", stmt.key, first),
        ));
      }
      self.check_registry(stmt, &mut issues);
    }

    issues.sort_by_key(|i| i.line);
    ValidationResult::from_issues(doc.statement_count(), issues)
  }

  fn check_denied(&self, stmt: &PrefStatement, issues: &mut Vec<ValidationIssue>) {
    if let Some(rule) = self.deny_list.iter().find(|r| r.matches(&stmt.key, &stmt.value)) {
      issues.push(ValidationIssue::new(
        stmt.line,
        IssueKind::DeniedValue,
        format!("\"{}\" = {} is not allowed: {}", stmt.key, stmt.raw_value, rule.reason),
      ));
    }
  }

  fn check_registry(&self, stmt: &PrefStatement, issues: &mut Vec<ValidationIssue>) {
    let Some(known) = self.registry.lookup(&stmt.key) else {
      issues.push(ValidationIssue::new(
        stmt.line,
        IssueKind::UnknownKey,
        format!("\"{}\" is not in the known preference catalog", stmt.key),
      ));
      return;
    };

    let expected = known.expected.kind();
    let actual = stmt.value.kind();
    let compatible = expected == actual || (expected.is_numeric() && actual.is_numeric());
    if !compatible {
      issues.push(ValidationIssue::new(
        stmt.line,
        IssueKind::UnexpectedType,
        format!("\"{}\" expects a {} value, got {}", stmt.key, expected, actual),
      ));
      return;
    }

    let out_of_range = known.range.zip(stmt.value.as_f64()).filter(|(range, v)| !range.contains(*v));
    if let Some((range, _)) = out_of_range {
      issues.push(ValidationIssue::new(
        stmt.line,
        IssueKind::OutOfRange,
        format!(
          "\"{}\" = {} is outside the expected range {}..={}",
          stmt.key, stmt.raw_value, range.min, range.max
        ),
      ));
    }
  }
}

/// Quote and parenthesis balance of one code line.
///
/// Double-quoted strings honour backslash escapes; `//` outside a string ends
/// the scan and `/* … */` spans on the same line are skipped, as is the tail
/// of a block comment opened on an earlier line.
fn check_balance(line: &DocumentLine, issues: &mut Vec<ValidationIssue>) {
  let mut chars = line.code().chars().peekable();
  let mut in_string = false;
  let mut depth: i32 = 0;
  let mut underflow = false;

  while let Some(c) = chars.next() {
    if in_string {
      match c {
        '\\' => {
          chars.next();
        }
        '"' => in_string = false,
        _ => {}
      }
      continue;
    }
    match c {
      '"' => in_string = true,
      '(' => depth += 1,
      ')' => {
        depth -= 1;
        if depth < 0 {
          underflow = true;
        }
      }
      '/' if chars.peek() == Some(&'/') => break,
      '/' if chars.peek() == Some(&'*') => {
        chars.next();
        let mut prev = '\0';
        for c in chars.by_ref() {
          if prev == '*' && c == '/' {
            break;
          }
          prev = c;
        }
      }
      _ => {}
    }
  }

  if in_string {
    issues.push(ValidationIssue::new(
      line.number,
      IssueKind::UnbalancedQuotes,
      format!("unbalanced quotes in `{}`", line.text.trim()),
    ));
  }
  if depth != 0 || underflow {
    issues.push(ValidationIssue::new(
      line.number,
      IssueKind::UnbalancedParens,
      format!("unbalanced parentheses in `{}`", line.text.trim()),
    ));
  }
}
