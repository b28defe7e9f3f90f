//! The set of physical content files under a content root.
//!
//! Files are grouped by their top-level directory:
//!
//! | directory | kind                      | logical path                   |
//! |-----------|---------------------------|--------------------------------|
//! | `doc/`    | [`ContentKind::Doc`]      | `doc/mirascope/learn/calls.mdx` → `mirascope/learn/calls` |
//! | `blog/`   | [`ContentKind::Blog`]     | `blog/launch.mdx` → `launch`   |
//! | `policy/` | [`ContentKind::Policy`]   | `policy/terms/use.md` → `terms/use` |
//!
//! Only `.md` and `.mdx` files are considered; anything else is skipped.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::meta::ContentKind;

const CONTENT_EXTENSIONS: [&str; 2] = ["mdx", "md"];

/// One content file found under the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    pub kind: ContentKind,
    /// Path relative to the content root, always with `/` separators.
    pub file: String,
    /// Path relative to the kind directory, without extension.
    pub logical_path: String,
}

impl CorpusFile {
    /// Classify a path relative to the content root. Returns `None` for
    /// files outside the known kind directories or with other extensions.
    pub fn classify(file: &str) -> Option<Self> {
        let file = file.trim_start_matches("./").replace('\\', "/");
        let (dir, rest) = file.split_once('/')?;
        let kind = ContentKind::from_dir(dir)?;
        let (stem, ext) = rest.rsplit_once('.')?;
        if stem.is_empty() || !CONTENT_EXTENSIONS.contains(&ext) {
            return None;
        }
        Some(Self {
            kind,
            logical_path: stem.to_string(),
            file,
        })
    }
}

/// All content files, indexed by kind and logical path.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    files: BTreeMap<(ContentKind, String), CorpusFile>,
}

impl Corpus {
    /// Build a corpus from paths relative to the content root.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut candidates: Vec<CorpusFile> = paths
            .into_iter()
            .filter_map(|p| {
                let classified = CorpusFile::classify(p.as_ref());
                if classified.is_none() {
                    debug!(file = p.as_ref(), "Skipping non-content file");
                }
                classified
            })
            .collect();
        candidates.sort_by(|a, b| a.file.cmp(&b.file));

        let mut files: BTreeMap<(ContentKind, String), CorpusFile> = BTreeMap::new();
        for candidate in candidates {
            let key = (candidate.kind, candidate.logical_path.clone());
            if let Some(existing) = files.get(&key) {
                warn!(
                    kept = %existing.file,
                    ignored = %candidate.file,
                    "Two content files map to the same logical path"
                );
                continue;
            }
            files.insert(key, candidate);
        }
        Self { files }
    }

    /// Recursively scan `root` for content files. Hidden directories are skipped.
    pub fn scan(root: &Path) -> Result<Self, LoadError> {
        info!(root = %root.display(), "Scanning content directory");

        fn visit_dir(dir: &Path, root: &Path, results: &mut Vec<String>) -> Result<(), LoadError> {
            let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            for entry_res in entries {
                let entry = entry_res.map_err(|source| LoadError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
                let path = entry.path();
                if path.is_dir() {
                    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                    if name.starts_with('.') {
                        debug!(path = %path.display(), "Skipping hidden directory");
                        continue;
                    }
                    visit_dir(&path, root, results)?;
                } else if path.is_file() {
                    if let Ok(rel_path) = path.strip_prefix(root) {
                        let segments: Vec<String> = rel_path
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy().into_owned())
                            .collect();
                        results.push(segments.join("/"));
                    }
                }
            }
            Ok(())
        }

        let mut paths = Vec::new();
        visit_dir(root, root, &mut paths)?;
        let corpus = Self::from_paths(paths);
        info!(files = corpus.len(), "Content directory scanned");
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All files, ordered by kind then logical path.
    pub fn files(&self) -> impl Iterator<Item = &CorpusFile> {
        self.files.values()
    }

    pub fn of_kind(&self, kind: ContentKind) -> impl Iterator<Item = &CorpusFile> {
        self.files.values().filter(move |f| f.kind == kind)
    }

    pub fn get(&self, kind: ContentKind, logical_path: &str) -> Option<&CorpusFile> {
        self.files.get(&(kind, logical_path.to_string()))
    }

    pub fn doc(&self, logical_path: &str) -> Option<&CorpusFile> {
        self.get(ContentKind::Doc, logical_path)
    }
}
