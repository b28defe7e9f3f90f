//! Recursive, immutable content tree used for LLM artifacts.
//!
//! An [`LlmContent`] node is one of:
//! - a **leaf**: raw content, no children;
//! - a **container**: one or more children, no raw content;
//! - a **container with preamble**: children plus raw content that is placed
//!   before the children's content.
//!
//! Nodes are built bottom-up and never change afterwards. The token count of
//! a container is always the preamble's token count plus the sum of its
//! children's, and sibling slugs are unique. Both invariants are checked when
//! a node is constructed and again when a tree is decoded from JSON.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ContentError, DecodeError};
use crate::slug::is_valid_slug;
use crate::tokens::TokenCounter;

/// Separator between the preamble and each child's content.
pub const CONTENT_SEPARATOR: &str = "\n\n";

/// Slug of the synthetic node added by [`with_table_of_contents`].
pub const TABLE_OF_CONTENTS_SLUG: &str = "table-of-contents";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LlmContentRepr")]
pub struct LlmContent {
    slug: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<String>,
    token_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<LlmContent>,
}

/// Arguments of [`LlmContent::from_raw_content`].
#[derive(Debug, Clone, Default)]
pub struct LeafParams {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub route: Option<String>,
}

/// Arguments of [`LlmContent::from_children`].
#[derive(Debug, Clone, Default)]
pub struct ContainerParams {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub children: Vec<LlmContent>,
    pub route: Option<String>,
    pub preamble: Option<String>,
}

impl LlmContent {
    /// Build a leaf. The token count comes from `counter`.
    pub fn from_raw_content(
        params: LeafParams,
        counter: &TokenCounter,
    ) -> Result<Self, ContentError> {
        check_slug(&params.slug)?;
        let token_count = counter.count(&params.content);
        Ok(Self {
            slug: params.slug,
            title: params.title,
            description: params.description,
            route: params.route,
            token_count,
            raw_content: Some(params.content),
            children: Vec::new(),
        })
    }

    /// Build a container from already constructed children.
    ///
    /// An empty preamble is treated as no preamble.
    pub fn from_children(
        params: ContainerParams,
        counter: &TokenCounter,
    ) -> Result<Self, ContentError> {
        let preamble = params.preamble.filter(|p| !p.is_empty());
        let preamble_tokens = preamble.as_deref().map_or(0, |p| counter.count(p));
        Self::assemble(
            params.slug,
            params.title,
            params.description,
            params.route,
            preamble,
            preamble_tokens,
            params.children,
        )
    }

    fn assemble(
        slug: String,
        title: String,
        description: Option<String>,
        route: Option<String>,
        preamble: Option<String>,
        preamble_tokens: usize,
        children: Vec<LlmContent>,
    ) -> Result<Self, ContentError> {
        check_slug(&slug)?;
        if children.is_empty() {
            return Err(ContentError::EmptyContainer { slug });
        }
        if let Some(duplicate) = first_duplicate_slug(&children) {
            return Err(ContentError::DuplicateSlug {
                slug: duplicate.to_string(),
                parent: slug,
            });
        }
        let token_count = preamble_tokens + children.iter().map(|c| c.token_count).sum::<usize>();
        Ok(Self {
            slug,
            title,
            description,
            route,
            token_count,
            raw_content: preamble,
            children,
        })
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Raw content of a leaf, or the preamble of a container.
    pub fn raw_content(&self) -> Option<&str> {
        self.raw_content.as_deref()
    }

    pub fn children(&self) -> &[LlmContent] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The container's own preamble; `None` for leaves.
    pub fn preamble(&self) -> Option<&str> {
        if self.is_leaf() {
            None
        } else {
            self.raw_content.as_deref()
        }
    }

    /// Tokens contributed by the node itself rather than its children.
    pub fn own_token_count(&self) -> usize {
        self.token_count - self.children.iter().map(|c| c.token_count).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(LlmContent::leaf_count).sum()
        }
    }

    /// Flattened text: the raw content of a leaf, or the preamble followed by
    /// every child's content, separated by blank lines.
    pub fn content(&self) -> String {
        if self.is_leaf() {
            return self.raw_content.clone().unwrap_or_default();
        }
        let mut parts: Vec<String> = Vec::with_capacity(self.children.len() + 1);
        if let Some(preamble) = &self.raw_content {
            parts.push(preamble.clone());
        }
        parts.extend(self.children.iter().map(LlmContent::content));
        parts.join(CONTENT_SEPARATOR)
    }

    pub fn child(&self, slug: &str) -> Option<&LlmContent> {
        self.children.iter().find(|c| c.slug == slug)
    }

    /// Descendant at a slash-separated slug path relative to this node.
    pub fn find(&self, path: &str) -> Option<&LlmContent> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, slug| node.child(slug))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Decode and validate a tree produced by [`LlmContent::to_json`].
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let repr: LlmContentRepr = serde_json::from_str(json)?;
        Self::from_repr(repr, "")
    }

    fn from_repr(repr: LlmContentRepr, parent: &str) -> Result<Self, DecodeError> {
        let path = if parent.is_empty() {
            repr.slug.clone()
        } else {
            format!("{parent}/{}", repr.slug)
        };
        let invalid = |field: &'static str, reason: String| DecodeError::InvalidNode {
            path: path.clone(),
            field,
            reason,
        };

        if !is_valid_slug(&repr.slug) {
            return Err(invalid("slug", format!("{:?} is not a valid slug", repr.slug)));
        }
        if repr.raw_content.is_none() && repr.children.is_empty() {
            return Err(invalid(
                "rawContent",
                "node has neither rawContent nor children".to_string(),
            ));
        }

        let children = repr
            .children
            .into_iter()
            .map(|child| Self::from_repr(child, &path))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(duplicate) = first_duplicate_slug(&children) {
            return Err(invalid("children", format!("duplicate child slug {duplicate:?}")));
        }

        if !children.is_empty() {
            let children_tokens: usize = children.iter().map(|c| c.token_count).sum();
            let consistent = match repr.raw_content {
                Some(_) => repr.token_count >= children_tokens,
                None => repr.token_count == children_tokens,
            };
            if !consistent {
                return Err(invalid(
                    "tokenCount",
                    format!(
                        "{} does not match the children's total of {}",
                        repr.token_count, children_tokens
                    ),
                ));
            }
        }

        Ok(Self {
            slug: repr.slug,
            title: repr.title,
            description: repr.description,
            route: repr.route,
            token_count: repr.token_count,
            raw_content: repr.raw_content,
            children,
        })
    }
}

/// Wire shape of a node before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmContentRepr {
    slug: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    route: Option<String>,
    token_count: usize,
    #[serde(default)]
    raw_content: Option<String>,
    #[serde(default)]
    children: Vec<LlmContentRepr>,
}

impl TryFrom<LlmContentRepr> for LlmContent {
    type Error = DecodeError;

    fn try_from(repr: LlmContentRepr) -> Result<Self, Self::Error> {
        Self::from_repr(repr, "")
    }
}

fn check_slug(slug: &str) -> Result<(), ContentError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(ContentError::InvalidSlug {
            slug: slug.to_string(),
        })
    }
}

fn first_duplicate_slug(children: &[LlmContent]) -> Option<&str> {
    let mut seen = HashSet::new();
    children
        .iter()
        .map(|c| c.slug.as_str())
        .find(|slug| !seen.insert(*slug))
}

/// Markdown outline of the root's children and grandchildren.
///
/// Only two levels are rendered; anything nested deeper is left out.
pub fn table_of_contents(root: &LlmContent) -> String {
    let mut out = String::from("# Table of Contents\n");
    for child in &root.children {
        push_entry(&mut out, "##", child);
        for grandchild in &child.children {
            push_entry(&mut out, "###", grandchild);
        }
    }
    out
}

fn push_entry(out: &mut String, heading: &str, node: &LlmContent) {
    out.push('\n');
    out.push_str(heading);
    out.push(' ');
    out.push_str(&node.title);
    out.push('\n');
    if let Some(description) = node.description.as_deref().filter(|d| !d.is_empty()) {
        out.push('\n');
        out.push_str(description);
        out.push('\n');
    }
}

/// A copy of `root` with a table-of-contents leaf inserted as its first child.
pub fn with_table_of_contents(
    root: &LlmContent,
    counter: &TokenCounter,
) -> Result<LlmContent, ContentError> {
    if root.is_leaf() {
        return Err(ContentError::NotAContainer {
            slug: root.slug.clone(),
        });
    }
    let toc = LlmContent::from_raw_content(
        LeafParams {
            slug: TABLE_OF_CONTENTS_SLUG.to_string(),
            title: "Table of Contents".to_string(),
            description: None,
            content: table_of_contents(root),
            route: None,
        },
        counter,
    )?;
    let mut children = Vec::with_capacity(root.children.len() + 1);
    children.push(toc);
    children.extend(root.children.iter().cloned());
    LlmContent::assemble(
        root.slug.clone(),
        root.title.clone(),
        root.description.clone(),
        root.route.clone(),
        root.raw_content.clone(),
        root.own_token_count(),
        children,
    )
}
