//! Writing composed documents to disk.
//!
//! Each document produces two files below the output directory:
//! the flattened text at its route (`/docs/mirascope/llms-full.txt` →
//! `<out>/docs/mirascope/llms-full.txt`) and the JSON tree next to it with a
//! `.json` extension.
//!
//! Both files are staged next to their targets and renamed into place only
//! once both were written, so a failed write leaves neither half behind.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::content::{with_table_of_contents, LlmContent};
use crate::directive::LlmDocDirective;
use crate::error::ArtifactError;
use crate::tokens::TokenCounter;

/// What was written for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifact {
    pub route: String,
    pub text_path: PathBuf,
    pub json_path: PathBuf,
    pub token_count: usize,
    /// SHA-256 of the flattened text, hex encoded.
    pub content_hash: String,
}

/// Text and JSON paths for `route` below `output_dir`.
///
/// Routes containing `..` are rejected so artifacts cannot escape the output directory.
pub fn artifact_paths(output_dir: &Path, route: &str) -> Result<(PathBuf, PathBuf), ArtifactError> {
    let relative = Path::new(route.trim_start_matches('/'));
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if route.trim_start_matches('/').is_empty() || escapes {
        return Err(ArtifactError::InvalidRoute {
            route: route.to_string(),
        });
    }
    let text_path = output_dir.join(relative);
    let json_path = text_path.with_extension("json");
    Ok((text_path, json_path))
}

pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Write the flattened text and JSON of `document`, adding a table of
/// contents first when the directive asks for one.
pub async fn write_artifacts(
    document: &LlmContent,
    directive: &LlmDocDirective,
    output_dir: &Path,
    counter: &TokenCounter,
) -> Result<WrittenArtifact, ArtifactError> {
    let route = directive.route_path.as_str();
    let (text_path, json_path) = artifact_paths(output_dir, route)?;

    let with_toc;
    let document = if directive.table_of_contents {
        with_toc = with_table_of_contents(document, counter)?;
        &with_toc
    } else {
        document
    };

    let text = document.content();
    let json = document
        .to_json_pretty()
        .map_err(|source| ArtifactError::Encode {
            route: route.to_string(),
            source,
        })?;

    if let Some(parent) = text_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ArtifactError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    publish_pair(&text_path, &text, &json_path, &json).await?;

    let artifact = WrittenArtifact {
        route: route.to_string(),
        text_path,
        json_path,
        token_count: document.token_count(),
        content_hash: content_hash(&text),
    };
    info!(
        route,
        path = %artifact.text_path.display(),
        tokens = artifact.token_count,
        "Wrote LLM artifacts"
    );
    Ok(artifact)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".tmp");
    PathBuf::from(staged)
}

/// Stage both files, then rename the JSON and the text into place.
async fn publish_pair(
    text_path: &Path,
    text: &str,
    json_path: &Path,
    json: &str,
) -> Result<(), ArtifactError> {
    let text_tmp = staging_path(text_path);
    let json_tmp = staging_path(json_path);

    let staged = async {
        write_file(&text_tmp, text).await?;
        write_file(&json_tmp, json).await
    }
    .await;
    if let Err(e) = staged {
        discard(&[text_tmp.as_path(), json_tmp.as_path()]).await;
        return Err(e);
    }

    if let Err(e) = rename(&json_tmp, json_path).await {
        discard(&[text_tmp.as_path(), json_tmp.as_path()]).await;
        return Err(e);
    }
    if let Err(e) = rename(&text_tmp, text_path).await {
        discard(&[text_tmp.as_path(), json_path]).await;
        return Err(e);
    }
    Ok(())
}

async fn write_file(path: &Path, contents: &str) -> Result<(), ArtifactError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(())
}

async fn rename(from: &Path, to: &Path) -> Result<(), ArtifactError> {
    tokio::fs::rename(from, to)
        .await
        .map_err(|source| ArtifactError::Io {
            path: to.to_path_buf(),
            source,
        })
}

async fn discard(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to remove partial artifact");
            }
        }
    }
}
