//! Loading raw content files.
//!
//! The [`ContentLoader`] trait is the seam between composition and storage:
//! [`FsContentLoader`] reads from a content root on disk, tests plug in
//! `MockContentLoader` or an in-memory map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::try_join_all;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::{debug, error};

use crate::corpus::Corpus;
use crate::error::LoadError;
use crate::frontmatter::split_frontmatter;
use crate::meta::{ContentKind, ContentMeta};
use crate::registry::DocRegistry;

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentLoader: Send + Sync {
    /// Raw source of `file`, a path relative to the content root.
    async fn load(&self, file: &str) -> Result<String, LoadError>;
}

/// Reads content files below `root` with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct FsContentLoader {
    root: PathBuf,
}

impl FsContentLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ContentLoader for FsContentLoader {
    async fn load(&self, file: &str) -> Result<String, LoadError> {
        let path = self.root.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(source) => {
                debug!(path = %path.display(), bytes = source.len(), "Loaded content file");
                Ok(source)
            }
            Err(source) => {
                error!(path = %path.display(), error = ?source, "Failed to read content file");
                Err(LoadError::Io { path, source })
            }
        }
    }
}

/// Sources keyed by path relative to the content root.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    files: HashMap<String, String>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: impl Into<String>, source: impl Into<String>) -> Self {
        self.files.insert(file.into(), source.into());
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

#[async_trait]
impl ContentLoader for InMemoryLoader {
    async fn load(&self, file: &str) -> Result<String, LoadError> {
        self.files.get(file).cloned().ok_or_else(|| LoadError::Io {
            path: PathBuf::from(file),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not in memory"),
        })
    }
}

/// Metadata of all content: docs from the registry, blog posts and policies
/// from their frontmatter. Files are read concurrently; the result keeps the
/// order docs → blog → policy, each sorted by logical path.
pub async fn load_metadata<L>(
    registry: &DocRegistry,
    corpus: &Corpus,
    loader: &L,
) -> Result<Vec<ContentMeta>, LoadError>
where
    L: ContentLoader + ?Sized,
{
    let mut metas: Vec<ContentMeta> = registry.all().iter().cloned().map(ContentMeta::Doc).collect();

    let others: Vec<_> = corpus
        .files()
        .filter(|f| f.kind != ContentKind::Doc)
        .collect();
    let loaded = try_join_all(others.iter().map(|file| async move {
        let source = loader.load(&file.file).await?;
        let parsed = split_frontmatter(&source).map_err(|reason| LoadError::Frontmatter {
            path: PathBuf::from(&file.file),
            reason,
        })?;
        Ok::<_, LoadError>(ContentMeta::from_frontmatter(file, parsed.frontmatter))
    }))
    .await?;
    metas.extend(loaded.into_iter().flatten());
    Ok(metas)
}
