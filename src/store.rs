//! Opaque "store bytes, get a URL" persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use crate::encode::RenderedVideo;
use crate::foundation::error::{ReelError, ReelResult};

pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return a URL for them.
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> ReelResult<String>;
}

/// Keys are `/`-separated relative paths without `.`/`..` segments.
pub fn check_key(key: &str) -> ReelResult<()> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|s| s.is_empty() || s == "." || s == "..");
    if bad {
        return Err(ReelError::validation(format!("invalid object key '{key}'")));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-process store handing out `memory://` URLs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ObjectStore for MemoryStore {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> ReelResult<String> {
        check_key(key)?;
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| ReelError::Other(anyhow::anyhow!("memory store lock poisoned")))?;
        objects.insert(
            key.to_owned(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_owned(),
            },
        );
        Ok(format!("memory://{key}"))
    }
}

/// Files under a root directory, returned as `file://` URLs.
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ObjectStore for DirStore {
    fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> ReelResult<String> {
        check_key(key)?;
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
        }
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(format!("file://{}", path.display()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedRender {
    pub video_url: String,
    pub thumbnail_url: String,
}

fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Store the video as `<prefix>/video.<ext>` and its thumbnail as `<prefix>/thumbnail.jpg`.
/// An empty prefix stores both at the top level.
pub fn publish_render(
    store: &dyn ObjectStore,
    prefix: &str,
    video: &RenderedVideo,
) -> ReelResult<PublishedRender> {
    let video_url = store.put(
        &join_key(prefix, &format!("video.{}", video.format.extension())),
        &video.bytes,
        video.format.content_type(),
    )?;
    let thumbnail_url = store.put(
        &join_key(prefix, "thumbnail.jpg"),
        &video.thumbnail,
        "image/jpeg",
    )?;
    tracing::debug!(%video_url, "render published");
    Ok(PublishedRender {
        video_url,
        thumbnail_url,
    })
}

#[cfg(test)]
#[path = "../tests/unit/store.rs"]
mod tests;
