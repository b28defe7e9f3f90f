//! Composition of document directives into [`LlmContent`] trees.
//!
//! For every section of a directive:
//!   - the section's includes are resolved against the registry (a missing
//!     exact include aborts the document),
//!   - the matched files are loaded concurrently; results come back in
//!     include order,
//!   - frontmatter is stripped and each document becomes a leaf,
//!   - the leaves are wrapped in a section container, with the tagline as preamble.
//!
//! The sections are then wrapped in the document's root container.
//! Composition is all-or-nothing per document: either a complete tree is
//! returned or the first error is.
//!
//! [`build_all`] composes many documents and collects failures instead of
//! stopping, so one broken definition does not block the others.

use std::path::PathBuf;

use futures::future::try_join_all;
use tracing::{error, info, warn};

use crate::content::{ContainerParams, LeafParams, LlmContent};
use crate::directive::{DirectiveSection, LlmDocDirective};
use crate::error::{ComposeError, LoadError};
use crate::frontmatter::split_frontmatter;
use crate::include::resolve_includes;
use crate::loader::ContentLoader;
use crate::registry::{DocInfo, DocRegistry};
use crate::tokens::TokenCounter;

/// Slug of a document leaf, derived from its logical path.
///
/// `/` becomes `-`; literal `-` and `~` are escaped as `~-` and `~~`. The
/// encoding is reversible, so distinct paths never share a slug.
///
/// ```
/// use docs_bundle_core::compose::leaf_slug;
///
/// assert_eq!(leaf_slug("demo/learn/calls"), "demo-learn-calls");
/// assert_eq!(leaf_slug("demo/learn/a/b"), "demo-learn-a-b");
/// assert_eq!(leaf_slug("demo/learn/a-b"), "demo-learn-a~-b");
/// ```
pub fn leaf_slug(path: &str) -> String {
    let mut slug = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '/' => slug.push('-'),
            '-' => slug.push_str("~-"),
            '~' => slug.push_str("~~"),
            other => slug.push(other),
        }
    }
    slug
}

/// Compose a single directive into a content tree.
pub async fn compose_document<L>(
    directive: &LlmDocDirective,
    registry: &DocRegistry,
    loader: &L,
    counter: &TokenCounter,
) -> Result<LlmContent, ComposeError>
where
    L: ContentLoader + ?Sized,
{
    let route = directive.route_path.clone();
    directive
        .validate()
        .map_err(|source| ComposeError::Directive {
            route: route.clone(),
            source,
        })?;
    info!(route = %route, sections = directive.sections.len(), "Composing document");

    let mut sections = Vec::with_capacity(directive.sections.len());
    for section in &directive.sections {
        sections.push(compose_section(&route, section, registry, loader, counter).await?);
    }

    let document = LlmContent::from_children(
        ContainerParams {
            slug: directive.root_slug(),
            title: directive.title.clone(),
            description: Some(directive.description.clone()),
            children: sections,
            route: Some(route.clone()),
            preamble: None,
        },
        counter,
    )
    .map_err(|source| ComposeError::Content {
        route: route.clone(),
        source,
    })?;

    info!(
        route = %route,
        documents = document.leaf_count(),
        tokens = document.token_count(),
        "Composed document"
    );
    Ok(document)
}

async fn compose_section<L>(
    route: &str,
    section: &DirectiveSection,
    registry: &DocRegistry,
    loader: &L,
    counter: &TokenCounter,
) -> Result<LlmContent, ComposeError>
where
    L: ContentLoader + ?Sized,
{
    let docs = resolve_includes(&section.includes, registry.all()).map_err(|source| {
        error!(route, section = %section.title, error = %source, "Include resolution failed");
        ComposeError::Include {
            route: route.to_string(),
            section: section.title.clone(),
            source,
        }
    })?;
    if docs.is_empty() {
        warn!(route, section = %section.title, "Section resolved to no documents");
    }

    let sources = try_join_all(docs.iter().map(|doc| loader.load(&doc.file)))
        .await
        .map_err(|source| ComposeError::Load {
            route: route.to_string(),
            section: section.title.clone(),
            source,
        })?;

    let mut leaves = Vec::with_capacity(docs.len());
    for (doc, source) in docs.into_iter().zip(sources) {
        leaves.push(document_leaf(route, section, doc, &source, counter)?);
    }

    LlmContent::from_children(
        ContainerParams {
            slug: section.slug(),
            title: section.title.clone(),
            description: None,
            children: leaves,
            route: section.link_route.clone(),
            preamble: section.tagline.clone(),
        },
        counter,
    )
    .map_err(|source| ComposeError::Content {
        route: route.to_string(),
        source,
    })
}

fn document_leaf(
    route: &str,
    section: &DirectiveSection,
    doc: &DocInfo,
    source: &str,
    counter: &TokenCounter,
) -> Result<LlmContent, ComposeError> {
    let parsed = split_frontmatter(source).map_err(|reason| ComposeError::Load {
        route: route.to_string(),
        section: section.title.clone(),
        source: LoadError::Frontmatter {
            path: PathBuf::from(&doc.file),
            reason,
        },
    })?;
    LlmContent::from_raw_content(
        LeafParams {
            slug: leaf_slug(&doc.path),
            title: doc.title.clone(),
            description: parsed.frontmatter.description,
            content: parsed.body.trim_end().to_string(),
            route: Some(doc.route_path.clone()),
        },
        counter,
    )
    .map_err(|source| ComposeError::Content {
        route: route.to_string(),
        source,
    })
}

/// A successfully composed document.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub directive: LlmDocDirective,
    pub content: LlmContent,
}

/// A document whose composition failed.
#[derive(Debug)]
pub struct DocumentFailure {
    pub title: String,
    pub route: String,
    pub error: ComposeError,
}

/// Outcome of composing a batch of directives.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub documents: Vec<ComposedDocument>,
    pub failures: Vec<DocumentFailure>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compose every directive, continuing past failures.
pub async fn build_all<L>(
    directives: &[LlmDocDirective],
    registry: &DocRegistry,
    loader: &L,
    counter: &TokenCounter,
) -> BuildReport
where
    L: ContentLoader + ?Sized,
{
    let mut report = BuildReport::default();
    for directive in directives {
        match compose_document(directive, registry, loader, counter).await {
            Ok(content) => report.documents.push(ComposedDocument {
                directive: directive.clone(),
                content,
            }),
            Err(e) => {
                error!(route = %directive.route_path, error = %e, "Document composition failed");
                report.failures.push(DocumentFailure {
                    title: directive.title.clone(),
                    route: directive.route_path.clone(),
                    error: e,
                });
            }
        }
    }
    info!(
        composed = report.documents.len(),
        failed = report.failures.len(),
        "Build finished"
    );
    report
}
