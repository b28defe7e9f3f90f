//! Content metadata, one variant per content kind.

use serde::Serialize;

use crate::corpus::CorpusFile;
use crate::frontmatter::Frontmatter;
use crate::registry::DocInfo;

/// Kind of content, derived from the top-level directory of a content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Doc,
    Blog,
    Policy,
}

impl ContentKind {
    pub fn from_dir(dir: &str) -> Option<Self> {
        match dir {
            "doc" => Some(Self::Doc),
            "blog" => Some(Self::Blog),
            "policy" => Some(Self::Policy),
            _ => None,
        }
    }

    pub fn dir(self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Blog => "blog",
            Self::Policy => "policy",
        }
    }
}

/// Fields shared by every kind of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseMeta {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub path: String,
    pub route: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogMeta {
    #[serde(flatten)]
    pub base: BaseMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyMeta {
    #[serde(flatten)]
    pub base: BaseMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentMeta {
    Doc(DocInfo),
    Blog(BlogMeta),
    Policy(PolicyMeta),
}

impl ContentMeta {
    /// Metadata for a blog post or policy page from its frontmatter.
    ///
    /// Docs take their metadata from the spec instead, so a doc file yields `None`.
    pub fn from_frontmatter(file: &CorpusFile, frontmatter: Frontmatter) -> Option<Self> {
        let title = frontmatter
            .title
            .unwrap_or_else(|| title_from_path(&file.logical_path));
        match file.kind {
            ContentKind::Doc => None,
            ContentKind::Blog => Some(Self::Blog(BlogMeta {
                base: BaseMeta {
                    title,
                    description: frontmatter.description,
                    path: file.logical_path.clone(),
                    route: format!("/blog/{}", file.logical_path),
                },
                date: frontmatter.date,
                author: frontmatter.author,
            })),
            ContentKind::Policy => Some(Self::Policy(PolicyMeta {
                base: BaseMeta {
                    title,
                    description: frontmatter.description,
                    path: file.logical_path.clone(),
                    route: format!("/{}", file.logical_path),
                },
                last_updated: frontmatter.last_updated,
            })),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Doc(_) => ContentKind::Doc,
            Self::Blog(_) => ContentKind::Blog,
            Self::Policy(_) => ContentKind::Policy,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Doc(doc) => &doc.title,
            Self::Blog(blog) => &blog.base.title,
            Self::Policy(policy) => &policy.base.title,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Doc(doc) => &doc.path,
            Self::Blog(blog) => &blog.base.path,
            Self::Policy(policy) => &policy.base.path,
        }
    }

    pub fn route(&self) -> &str {
        match self {
            Self::Doc(doc) => &doc.route_path,
            Self::Blog(blog) => &blog.base.route,
            Self::Policy(policy) => &policy.base.route,
        }
    }
}

fn title_from_path(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
