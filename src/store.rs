//! Where crawl artifacts end up once a crawl is done.

use crate::error::{CrawlError, Result};
use crate::results::CrawlResult;
use crate::utils::sanitize_filename;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Key/value blob storage for screenshots and result documents.
///
/// Keys are `/`-separated relative paths.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;
    async fn fetch(&self, key: &str) -> Result<Vec<u8>>;
}

/// Stores each key as a file below `root`
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(CrawlError::Store(format!("invalid artifact key {:?}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ArtifactStore for DirectoryStore {
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CrawlError::Store(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CrawlError::Store(format!("{}: {}", path.display(), e)))?;
        ::log::debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| CrawlError::Store(format!("{}: {}", path.display(), e)))
    }
}

/// Write every screenshot as `<prefix>/<index>-<sanitized-url>.jpg` and the
/// result, screenshots stripped, as `<prefix>/result.json`.
///
/// The page index keeps keys unique when sanitized URLs collide.
///
/// Returns the keys written, result document last.
pub async fn persist_artifacts<S>(result: &CrawlResult, store: &S, prefix: &str) -> Result<Vec<String>>
where
    S: ArtifactStore + ?Sized,
{
    let prefix = prefix.trim_matches('/');
    let key = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        }
    };

    let mut written = Vec::new();
    for (index, page) in result.pages.iter().enumerate() {
        if let Some(jpeg) = &page.screenshot {
            let name = key(&format!("{:03}-{}.jpg", index, sanitize_filename(&page.url)));
            store.save(&name, jpeg).await?;
            written.push(name);
        }
    }

    let mut stripped = result.clone();
    for page in &mut stripped.pages {
        page.screenshot = None;
    }
    let json = serde_json::to_vec_pretty(&stripped)
        .map_err(|e| CrawlError::Store(format!("could not serialize result: {}", e)))?;
    let name = key("result.json");
    store.save(&name, &json).await?;
    written.push(name);

    ::log::info!("Persisted {} artifacts under {:?}", written.len(), prefix);
    Ok(written)
}
