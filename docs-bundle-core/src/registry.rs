//! Resolution of product specs against the content corpus.
//!
//! [`DocRegistry::build`] walks every product spec in display order and keeps
//! one [`DocInfo`] per spec entry that has a physical file. Entries without a
//! file are logged and left out: documentation is written incrementally, so a
//! missing page is expected rather than fatal.
//!
//! The registry is built once and then only read. It is passed by reference to
//! whatever needs it; nothing in the crate keeps a global copy.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::corpus::Corpus;
use crate::spec::{ProductSpec, SpecCatalog, SpecNode, INDEX_SLUG};

/// Resolved metadata of a single documentation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocInfo {
    /// Logical path, e.g. `mirascope/learn/calls`. Unique across the registry.
    pub path: String,
    /// URL path, e.g. `/docs/mirascope/learn/calls`.
    pub route_path: String,
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub title: String,
    /// Source file relative to the content root.
    pub file: String,
}

/// Route of a logical path: `/docs/` followed by the path with `index` segments removed.
///
/// ```
/// use docs_bundle_core::registry::route_for_path;
///
/// assert_eq!(route_for_path("mirascope/index"), "/docs/mirascope");
/// assert_eq!(route_for_path("mirascope/learn/index"), "/docs/mirascope/learn");
/// assert_eq!(route_for_path("mirascope/learn/calls"), "/docs/mirascope/learn/calls");
/// ```
pub fn route_for_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != INDEX_SLUG)
        .collect();
    format!("/docs/{}", segments.join("/"))
}

/// Immutable lookup of resolved documents, ordered as the specs order them.
#[derive(Debug, Clone, Default)]
pub struct DocRegistry {
    docs: Vec<DocInfo>,
    by_path: HashMap<String, usize>,
}

impl DocRegistry {
    /// Resolve every product of `catalog` against `corpus`.
    pub fn build(catalog: &SpecCatalog, corpus: &Corpus) -> Self {
        let mut registry = Self::default();
        for spec in catalog.iter() {
            registry.add_product(spec, corpus);
        }
        info!(
            products = catalog.len(),
            docs = registry.docs.len(),
            "Resolved documentation registry"
        );
        registry
    }

    /// Resolve a single product spec.
    pub fn resolve(spec: &ProductSpec, corpus: &Corpus) -> Self {
        let mut registry = Self::default();
        registry.add_product(spec, corpus);
        registry
    }

    fn add_product(&mut self, spec: &ProductSpec, corpus: &Corpus) {
        let product = spec.product();
        let before = self.docs.len();
        for section in spec.ordered_sections() {
            let section_path = if section.slug() == INDEX_SLUG {
                product.to_string()
            } else {
                format!("{product}/{}", section.slug())
            };
            let mut walker = Walker {
                registry: self,
                corpus,
                product,
                section: section.slug(),
            };
            if section.has_children() {
                if section.slug() != INDEX_SLUG {
                    walker.register_optional(&section_path, section.label(), None);
                }
                for child in section.ordered_children() {
                    walker.visit(child, &section_path, None);
                }
            } else {
                let path = if section.slug() == INDEX_SLUG {
                    format!("{product}/{INDEX_SLUG}")
                } else {
                    section_path
                };
                walker.register_required(&path, section.label(), None);
            }
        }
        debug!(product, docs = self.docs.len() - before, "Resolved product spec");
    }

    fn insert(&mut self, doc: DocInfo) {
        if let Some(&existing) = self.by_path.get(&doc.path) {
            warn!(
                path = %doc.path,
                kept = %self.docs[existing].title,
                ignored = %doc.title,
                "Two spec entries resolve to the same logical path"
            );
            return;
        }
        self.by_path.insert(doc.path.clone(), self.docs.len());
        self.docs.push(doc);
    }

    pub fn get(&self, path: &str) -> Option<&DocInfo> {
        self.by_path.get(path).map(|&i| &self.docs[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Every resolved document in spec order. This is the corpus include directives expand against.
    pub fn all(&self) -> &[DocInfo] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn by_product(&self, product: &str) -> Vec<&DocInfo> {
        self.docs.iter().filter(|d| d.product == product).collect()
    }

    pub fn by_section(&self, product: &str, section: &str) -> Vec<&DocInfo> {
        self.docs
            .iter()
            .filter(|d| d.product == product && d.section.as_deref() == Some(section))
            .collect()
    }

    pub fn by_group(&self, product: &str, group: &str) -> Vec<&DocInfo> {
        self.docs
            .iter()
            .filter(|d| d.product == product && d.group.as_deref() == Some(group))
            .collect()
    }
}

struct Walker<'a> {
    registry: &'a mut DocRegistry,
    corpus: &'a Corpus,
    product: &'a str,
    section: &'a str,
}

impl Walker<'_> {
    fn visit(&mut self, node: &SpecNode, parent_path: &str, group: Option<&str>) {
        let path = format!("{parent_path}/{}", node.slug());
        if node.has_children() {
            let group = group.unwrap_or(node.slug());
            self.register_optional(&path, node.label(), Some(group));
            for child in node.ordered_children() {
                self.visit(child, &path, Some(group));
            }
        } else {
            self.register_required(&path, node.label(), group);
        }
    }

    /// Group and section landing pages may legitimately have no file of their own.
    fn register_optional(&mut self, path: &str, title: &str, group: Option<&str>) {
        if self.corpus.doc(path).is_some() {
            self.register_required(path, title, group);
        }
    }

    fn register_required(&mut self, path: &str, title: &str, group: Option<&str>) {
        let Some(file) = self.corpus.doc(path) else {
            warn!(path, product = self.product, "Spec entry has no content file; skipping");
            return;
        };
        self.registry.insert(DocInfo {
            path: path.to_string(),
            route_path: route_for_path(path),
            product: self.product.to_string(),
            section: Some(self.section.to_string()),
            group: group.map(str::to_string),
            title: title.to_string(),
            file: file.file.clone(),
        });
    }
}
