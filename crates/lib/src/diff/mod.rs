//! Line diff between the on-disk and proposed preference text.
//!
//! Uses a longest-common-subsequence alignment over lines. Lines shared at
//! the start and end are matched directly, so the alignment table only covers
//! the changed middle. When the alignment has a choice, a line is kept as
//! unchanged rather than split into a removal/addition pair, and removals are
//! emitted before additions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkKind {
  Unchanged,
  Added,
  Removed,
}

/// A run of consecutive lines with the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
  pub kind: HunkKind,
  /// Lines joined with `\n`, without a trailing newline.
  pub text: String,
}

impl DiffHunk {
  pub fn lines(&self) -> impl Iterator<Item = &str> {
    self.text.split('\n')
  }

  pub fn line_count(&self) -> usize {
    self.text.split('\n').count()
  }
}

/// Line counts per hunk kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
  pub added: usize,
  pub removed: usize,
  pub unchanged: usize,
}

impl DiffSummary {
  pub fn of(hunks: &[DiffHunk]) -> Self {
    let mut summary = Self::default();
    for hunk in hunks {
      let n = hunk.line_count();
      match hunk.kind {
        HunkKind::Added => summary.added += n,
        HunkKind::Removed => summary.removed += n,
        HunkKind::Unchanged => summary.unchanged += n,
      }
    }
    summary
  }

  /// True when nothing was added or removed.
  pub fn is_empty(&self) -> bool {
    self.added == 0 && self.removed == 0
  }
}

/// Computes the line diff from `old` to `new`.
///
/// Line terminators are not significant: `"a\n"` and `"a"` compare equal.
pub fn diff(old: &str, new: &str) -> Vec<DiffHunk> {
  let a: Vec<&str> = old.lines().collect();
  let b: Vec<&str> = new.lines().collect();

  let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
  let suffix = a[prefix..]
    .iter()
    .rev()
    .zip(b[prefix..].iter().rev())
    .take_while(|(x, y)| x == y)
    .count();

  let mut builder = HunkBuilder::default();
  for line in &a[..prefix] {
    builder.push(HunkKind::Unchanged, line);
  }
  align(&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix], &mut builder);
  for line in &a[a.len() - suffix..] {
    builder.push(HunkKind::Unchanged, line);
  }
  builder.finish()
}

fn align(a: &[&str], b: &[&str], builder: &mut HunkBuilder) {
  let (n, m) = (a.len(), b.len());

  // lcs[i][j] = LCS length of a[i..] and b[j..]
  let width = m + 1;
  let mut lcs = vec![0u32; (n + 1) * width];
  for i in (0..n).rev() {
    for j in (0..m).rev() {
      lcs[i * width + j] = if a[i] == b[j] {
        lcs[(i + 1) * width + j + 1] + 1
      } else {
        lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
      };
    }
  }

  let (mut i, mut j) = (0, 0);
  while i < n && j < m {
    if a[i] == b[j] {
      builder.push(HunkKind::Unchanged, a[i]);
      i += 1;
      j += 1;
    } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
      builder.push(HunkKind::Removed, a[i]);
      i += 1;
    } else {
      builder.push(HunkKind::Added, b[j]);
      j += 1;
    }
  }
  for line in &a[i..] {
    builder.push(HunkKind::Removed, line);
  }
  for line in &b[j..] {
    builder.push(HunkKind::Added, line);
  }
}

/// Renders hunks as `+`/`-`/` ` prefixed lines.
pub fn render_unified(hunks: &[DiffHunk]) -> String {
  let mut out = String::new();
  for hunk in hunks {
    let prefix = match hunk.kind {
      HunkKind::Unchanged => ' ',
      HunkKind::Added => '+',
      HunkKind::Removed => '-',
    };
    for line in hunk.lines() {
      out.push(prefix);
      out.push_str(line);
      out.push('\n');
    }
  }
  out
}

#[derive(Default)]
struct HunkBuilder {
  hunks: Vec<DiffHunk>,
}

impl HunkBuilder {
  fn push(&mut self, kind: HunkKind, line: &str) {
    match self.hunks.last_mut() {
      Some(last) if last.kind == kind => {
        last.text.push('\n');
        last.text.push_str(line);
      }
      _ => self.hunks.push(DiffHunk {
        kind,
        text: line.to_string(),
      }),
    }
  }

  fn finish(self) -> Vec<DiffHunk> {
    self.hunks
  }
}
