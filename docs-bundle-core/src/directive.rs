//! Declarative definitions of composed LLM documents (e.g. `llms-full.txt`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DirectiveError;
use crate::include::IncludeDirective;
use crate::slug::{is_valid_slug, slugify};

/// One section of a composed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveSection {
    pub title: String,
    pub includes: Vec<IncludeDirective>,
    /// Introductory text placed before the section's documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    /// Route the section links to in the presentation layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_route: Option<String>,
}

impl DirectiveSection {
    pub fn new(title: impl Into<String>, includes: Vec<IncludeDirective>) -> Self {
        Self {
            title: title.into(),
            includes,
            tagline: None,
            link_route: None,
        }
    }

    pub fn with_tagline(mut self, tagline: impl Into<String>) -> Self {
        self.tagline = Some(tagline.into());
        self
    }

    pub fn with_link_route(mut self, route: impl Into<String>) -> Self {
        self.link_route = Some(route.into());
        self
    }

    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

/// Configuration of a single composed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmDocDirective {
    pub title: String,
    pub description: String,
    /// Route the flattened text is served at, e.g. `/docs/mirascope/llms-full.txt`.
    pub route_path: String,
    /// Slug of the root node; defaults to the slugified title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Prepend a table of contents when the artifact is written.
    #[serde(default)]
    pub table_of_contents: bool,
    pub sections: Vec<DirectiveSection>,
}

impl LlmDocDirective {
    /// Build and validate a directive.
    pub fn define(
        title: impl Into<String>,
        description: impl Into<String>,
        route_path: impl Into<String>,
        sections: Vec<DirectiveSection>,
    ) -> Result<Self, DirectiveError> {
        let directive = Self {
            title: title.into(),
            description: description.into(),
            route_path: route_path.into(),
            slug: None,
            table_of_contents: false,
            sections,
        };
        directive.validate()?;
        Ok(directive)
    }

    pub fn with_table_of_contents(mut self) -> Self {
        self.table_of_contents = true;
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Checks required fields and the slugs derived from titles. Deserialized
    /// directives must be validated before use.
    pub fn validate(&self) -> Result<(), DirectiveError> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("route_path", &self.route_path),
        ] {
            if value.trim().is_empty() {
                return Err(DirectiveError::EmptyField { field });
            }
        }
        if self.sections.is_empty() {
            return Err(DirectiveError::NoSections {
                title: self.title.clone(),
            });
        }
        for (index, section) in self.sections.iter().enumerate() {
            if section.title.trim().is_empty() {
                return Err(DirectiveError::EmptySectionTitle {
                    title: self.title.clone(),
                    index,
                });
            }
            if section.includes.is_empty() {
                return Err(DirectiveError::NoIncludes {
                    title: self.title.clone(),
                    section: section.title.clone(),
                });
            }
            if section.includes.iter().any(|i| i.pattern().is_empty()) {
                return Err(DirectiveError::EmptyPattern {
                    title: self.title.clone(),
                    section: section.title.clone(),
                });
            }
        }
        self.validate_slugs()
    }

    fn validate_slugs(&self) -> Result<(), DirectiveError> {
        let root = self.root_slug();
        if !is_valid_slug(&root) {
            return Err(DirectiveError::InvalidSlug {
                title: self.title.clone(),
                slug: root,
            });
        }
        let mut seen: HashMap<String, &str> = HashMap::new();
        for section in &self.sections {
            let slug = section.slug();
            if !is_valid_slug(&slug) {
                return Err(DirectiveError::InvalidSectionSlug {
                    title: self.title.clone(),
                    section: section.title.clone(),
                });
            }
            if let Some(first) = seen.insert(slug.clone(), &section.title) {
                return Err(DirectiveError::DuplicateSectionSlug {
                    title: self.title.clone(),
                    first: first.to_string(),
                    second: section.title.clone(),
                    slug,
                });
            }
        }
        Ok(())
    }

    pub fn root_slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.title))
    }
}
