use serde::{Deserialize, Serialize};

use crate::document::PrefValue;

/// Category of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
  UnbalancedQuotes,
  UnbalancedParens,
  MalformedStatement,
  DeniedValue,
  DuplicateKey,
  UnknownKey,
  UnexpectedType,
  OutOfRange,
}

impl IssueKind {
  /// Whether this kind makes the document invalid.
  pub fn is_fatal(&self) -> bool {
    matches!(
      self,
      Self::UnbalancedQuotes | Self::UnbalancedParens | Self::MalformedStatement | Self::DeniedValue
    )
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
  /// 1-based line number the finding refers to.
  pub line: usize,
  pub kind: IssueKind,
  pub message: String,
}

impl ValidationIssue {
  pub fn new(line: usize, kind: IssueKind, message: impl Into<String>) -> Self {
    Self {
      line,
      kind,
      message: message.into(),
    }
  }
}

/// Outcome of validating proposed preference text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
  pub valid: bool,
  /// First fatal finding, formatted for display.
  pub error_detail: Option<String>,
  /// Number of well-formed statements (duplicates included).
  pub statement_count: usize,
  pub errors: Vec<ValidationIssue>,
  pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
  pub(crate) fn from_issues(statement_count: usize, issues: Vec<ValidationIssue>) -> Self {
    let (errors, warnings): (Vec<_>, Vec<_>) = issues.into_iter().partition(|i| i.kind.is_fatal());
    let error_detail = errors.first().map(|e| format!("line {}: {}", e.line, e.message));
    Self {
      valid: errors.is_empty(),
      error_detail,
      statement_count,
      errors,
      warnings,
    }
  }
}

/// A key (and optionally a specific value) that must never be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenyRule {
  pub key: String,
  /// When absent, any value for `key` is denied.
  #[serde(default)]
  pub value: Option<PrefValue>,
  pub reason: String,
}

impl DenyRule {
  pub fn new(key: &str, value: Option<PrefValue>, reason: &str) -> Self {
    Self {
      key: key.to_string(),
      value,
      reason: reason.to_string(),
    }
  }

  /// Numbers compare by value, so `0`, `0.0` and `+0` all match a rule for `0`.
  pub fn matches(&self, key: &str, value: &PrefValue) -> bool {
    self.key == key
      && self.value.as_ref().is_none_or(|denied| match (denied.as_f64(), value.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => denied == value,
      })
  }

  /// Deny rules protecting the browser's own safety mechanisms.
  pub fn defaults() -> Vec<DenyRule> {
    vec![
      DenyRule::new(
        "xpinstall.signatures.required",
        Some(PrefValue::Bool(false)),
        "disables add-on signature verification",
      ),
      DenyRule::new(
        "toolkit.startup.max_resumed_crashes",
        Some(PrefValue::Int(-1)),
        "disables the safe-mode prompt after repeated startup crashes",
      ),
      DenyRule::new(
        "browser.safebrowsing.malware.enabled",
        Some(PrefValue::Bool(false)),
        "disables malware protection",
      ),
      DenyRule::new(
        "browser.safebrowsing.phishing.enabled",
        Some(PrefValue::Bool(false)),
        "disables phishing protection",
      ),
      DenyRule::new(
        "security.sandbox.content.level",
        Some(PrefValue::Int(0)),
        "disables the content process sandbox",
      ),
    ]
  }
}
