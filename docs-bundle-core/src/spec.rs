//! Declarative documentation structure per product.
//!
//! A [`ProductSpec`] is a tree of sections → groups → items described by
//! [`SpecNode`]s. It says nothing about which files exist on disk; the
//! [`crate::registry::DocRegistry`] joins it against the corpus.
//!
//! Specs are validated once when constructed and never mutated afterwards.
//! Author-facing declarations ([`ProductSpecDecl`]) deserialize from YAML or
//! JSON and are converted with [`ProductSpec::from_decl`].
//!
//! # Ordering
//! Siblings are ordered by [`order_siblings`]: ascending `weight`, with
//! unweighted nodes after all weighted ones, stable otherwise. Sections get one
//! extra rule on top of that: a section with the slug `index` is always moved
//! to the front by [`ProductSpec::ordered_sections`]. The two rules are
//! applied independently.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SpecValidationError;
use crate::slug::is_valid_slug;

/// Slug of the section (or item) that represents a landing page.
pub const INDEX_SLUG: &str = "index";

/// One node of a product's documentation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecNode {
    slug: String,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<SpecNode>,
}

impl SpecNode {
    pub fn new(slug: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            label: label.into(),
            weight: None,
            children: Vec::new(),
        }
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_children(mut self, children: Vec<SpecNode>) -> Self {
        self.children = children;
        self
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn weight(&self) -> Option<i64> {
        self.weight
    }

    /// Children in declaration order. Use [`SpecNode::ordered_children`] for display order.
    pub fn children(&self) -> &[SpecNode] {
        &self.children
    }

    pub fn ordered_children(&self) -> Vec<&SpecNode> {
        order_siblings(&self.children)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    fn from_decl(decl: SpecNodeDecl, parent: &str) -> Result<Self, SpecValidationError> {
        let weight = match decl.weight {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(value.as_i64().ok_or_else(|| {
                SpecValidationError::InvalidWeight {
                    slug: decl.slug.clone(),
                    parent: parent.to_string(),
                    weight: value.to_string(),
                }
            })?),
        };
        let path = format!("{parent}/{}", decl.slug);
        let children = decl
            .children
            .into_iter()
            .map(|child| SpecNode::from_decl(child, &path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            slug: decl.slug,
            label: decl.label,
            weight,
            children,
        })
    }
}

/// Stable ordering of siblings by `weight`.
///
/// Weighted nodes come first in ascending weight; unweighted nodes follow in
/// their original relative order. Ties keep declaration order.
pub fn order_siblings(children: &[SpecNode]) -> Vec<&SpecNode> {
    let mut ordered: Vec<&SpecNode> = children.iter().collect();
    ordered.sort_by_key(|node| match node.weight {
        Some(weight) => (false, weight),
        None => (true, 0),
    });
    ordered
}

/// The documentation tree of a single product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSpec {
    product: String,
    sections: Vec<SpecNode>,
}

impl ProductSpec {
    /// Validate and build a product spec.
    ///
    /// Fails when any slug (product, section or node) is not URL-safe or when
    /// two siblings share a slug.
    pub fn new(
        product: impl Into<String>,
        sections: Vec<SpecNode>,
    ) -> Result<Self, SpecValidationError> {
        let product = product.into();
        if !is_valid_slug(&product) {
            return Err(SpecValidationError::InvalidSlug {
                slug: product,
                parent: String::new(),
            });
        }
        validate_siblings(&sections, &product)?;
        info!(product = %product, sections = sections.len(), "Validated product spec");
        Ok(Self { product, sections })
    }

    pub fn from_decl(decl: ProductSpecDecl) -> Result<Self, SpecValidationError> {
        let sections = decl
            .sections
            .into_iter()
            .map(|section| SpecNode::from_decl(section, &decl.product))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(decl.product, sections)
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    /// Sections in declaration order.
    pub fn sections(&self) -> &[SpecNode] {
        &self.sections
    }

    /// Sections in display order: weight order, then the `index` section moved to the front.
    pub fn ordered_sections(&self) -> Vec<&SpecNode> {
        let mut ordered = order_siblings(&self.sections);
        if let Some(pos) = ordered.iter().position(|s| s.slug == INDEX_SLUG) {
            let index = ordered.remove(pos);
            ordered.insert(0, index);
        }
        ordered
    }

    pub fn section(&self, slug: &str) -> Option<&SpecNode> {
        self.sections.iter().find(|s| s.slug == slug)
    }
}

fn validate_siblings(nodes: &[SpecNode], parent: &str) -> Result<(), SpecValidationError> {
    let mut seen = HashSet::new();
    for node in nodes {
        if !is_valid_slug(&node.slug) {
            return Err(SpecValidationError::InvalidSlug {
                slug: node.slug.clone(),
                parent: parent.to_string(),
            });
        }
        if !seen.insert(node.slug.as_str()) {
            return Err(SpecValidationError::DuplicateSlug {
                slug: node.slug.clone(),
                parent: parent.to_string(),
            });
        }
        validate_siblings(&node.children, &format!("{parent}/{}", node.slug))?;
    }
    Ok(())
}

/// Author-facing declaration of a spec node.
///
/// `weight` is kept loosely typed so a non-integer value is reported as a
/// [`SpecValidationError`] that names the node instead of a generic parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecNodeDecl {
    pub slug: String,
    pub label: String,
    #[serde(default)]
    pub weight: Option<serde_json::Value>,
    #[serde(default)]
    pub children: Vec<SpecNodeDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSpecDecl {
    pub product: String,
    #[serde(default)]
    pub sections: Vec<SpecNodeDecl>,
}

/// All product specs, keyed by product identifier, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecCatalog {
    specs: Vec<ProductSpec>,
}

impl SpecCatalog {
    pub fn new(specs: Vec<ProductSpec>) -> Result<Self, SpecValidationError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.product.as_str()) {
                return Err(SpecValidationError::DuplicateProduct {
                    product: spec.product.clone(),
                });
            }
        }
        debug!(products = specs.len(), "Built spec catalog");
        Ok(Self { specs })
    }

    pub fn from_decls(decls: Vec<ProductSpecDecl>) -> Result<Self, SpecValidationError> {
        let specs = decls
            .into_iter()
            .map(ProductSpec::from_decl)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(specs)
    }

    pub fn get(&self, product: &str) -> Option<&ProductSpec> {
        self.specs.iter().find(|s| s.product == product)
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.product.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
