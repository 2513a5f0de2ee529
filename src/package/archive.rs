use std::io::{Cursor, Read};
use std::sync::Arc;

use regex::Regex;

use crate::foundation::error::{ReelError, ReelResult};

/// Largest decompressed entry a read will produce.
pub const DEFAULT_ENTRY_LIMIT: u64 = 256 * 1024 * 1024;
/// Upper bound on up-front buffer reservation; declared sizes are not trusted beyond it.
const PREALLOC_CAP: u64 = 1024 * 1024;

/// Read-only view over one OPC zip container.
///
/// The archive bytes are shared behind an `Arc`, and every read works on its own clone of the
/// parsed central directory, so a single `Archive` can serve concurrent readers through `&self`.
#[derive(Clone)]
pub struct Archive {
    zip: zip::ZipArchive<Cursor<Arc<[u8]>>>,
    names: Vec<String>,
    byte_len: usize,
    entry_limit: u64,
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("entries", &self.names.len())
            .field("byte_len", &self.byte_len)
            .finish()
    }
}

impl Archive {
    /// Open archive bytes, failing on bad magic or an unreadable central directory.
    pub fn open(bytes: impl Into<Arc<[u8]>>) -> ReelResult<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        let byte_len = bytes.len();
        let zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ReelError::archive(format!("cannot open container: {e}")))?;
        let names = zip.file_names().map(str::to_owned).collect();
        Ok(Self {
            zip,
            names,
            byte_len,
            entry_limit: DEFAULT_ENTRY_LIMIT,
        })
    }

    /// Cap the decompressed size of any single read at `limit` bytes.
    pub fn with_entry_limit(mut self, limit: u64) -> Self {
        self.entry_limit = limit;
        self
    }

    pub fn entry_limit(&self) -> u64 {
        self.entry_limit
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn entry_count(&self) -> usize {
        self.names.len()
    }

    /// Entry names in central-directory order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, path: &str) -> bool {
        self.names.iter().any(|n| n == path)
    }

    /// True if any entry lives under `prefix` (directory entries may be implicit in zips).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.names.iter().any(|n| n.starts_with(prefix))
    }

    /// Entry names matching `pattern`, in central-directory order.
    pub fn list_entries(&self, pattern: &Regex) -> Vec<String> {
        self.names
            .iter()
            .filter(|n| pattern.is_match(n))
            .cloned()
            .collect()
    }

    /// Decompressed bytes of `path`. Entries that declare or inflate to more than
    /// [`Archive::entry_limit`] bytes fail with [`ReelError::Archive`].
    pub fn read_binary(&self, path: &str) -> ReelResult<Vec<u8>> {
        let mut zip = self.zip.clone();
        let file = zip
            .by_name(path)
            .map_err(|e| ReelError::archive(format!("entry '{path}': {e}")))?;
        let declared = file.size();
        if declared > self.entry_limit {
            return Err(ReelError::archive(format!(
                "entry '{path}' declares {declared} bytes; the limit is {}",
                self.entry_limit
            )));
        }

        let reserve = usize::try_from(declared.min(PREALLOC_CAP)).unwrap_or(0);
        let mut out = Vec::with_capacity(reserve);
        file.take(self.entry_limit.saturating_add(1))
            .read_to_end(&mut out)
            .map_err(|e| ReelError::archive(format!("read entry '{path}': {e}")))?;
        if out.len() as u64 > self.entry_limit {
            return Err(ReelError::archive(format!(
                "entry '{path}' inflates past the {} byte limit",
                self.entry_limit
            )));
        }
        Ok(out)
    }

    pub fn read_text(&self, path: &str) -> ReelResult<String> {
        let bytes = self.read_binary(path)?;
        String::from_utf8(bytes)
            .map_err(|e| ReelError::archive(format!("entry '{path}' is not utf-8: {e}")))
    }

    /// Uncompressed size of `path`, or `None` if the entry is absent.
    pub fn entry_size(&self, path: &str) -> Option<u64> {
        let mut zip = self.zip.clone();
        zip.by_name(path).ok().map(|f| f.size())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/package/archive.rs"]
mod tests;
