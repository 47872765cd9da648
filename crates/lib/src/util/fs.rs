//! Filesystem helpers.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Writes `contents` to a synced temp file in the directory of `path`.
///
/// `path` itself is not touched until the returned file is persisted.
pub fn stage(path: &Path, contents: &[u8]) -> io::Result<NamedTempFile> {
  let parent = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };

  let mut temp = NamedTempFile::new_in(parent)?;
  temp.write_all(contents)?;
  temp.as_file().sync_all()?;
  Ok(temp)
}

/// Replaces `path` with `contents` by staging a temp file in the same
/// directory and renaming it over the destination.
///
/// Readers observe either the old or the new file, never a truncated one.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
  stage(path, contents)?.persist(path).map_err(|e| e.error)?;
  Ok(())
}
