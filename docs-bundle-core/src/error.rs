//! Error types for every stage of the content pipeline.
//!
//! Each stage has its own enum so callers can tell a malformed static spec
//! (fatal for the whole build) apart from a broken document definition
//! (fatal for that document only).

use std::path::PathBuf;

use thiserror::Error;

/// A static product spec that cannot be turned into a [`crate::spec::ProductSpec`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecValidationError {
    #[error("invalid slug {slug:?} under {parent:?}: slugs must be non-empty URL-safe tokens without '/'")]
    InvalidSlug { slug: String, parent: String },

    #[error("duplicate slug {slug:?} under {parent:?}")]
    DuplicateSlug { slug: String, parent: String },

    #[error("slug {slug:?} under {parent:?} has a non-integer weight: {weight}")]
    InvalidWeight {
        slug: String,
        parent: String,
        weight: String,
    },

    #[error("product {product:?} is declared more than once")]
    DuplicateProduct { product: String },
}

/// Construction failures of [`crate::content::LlmContent`] nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("invalid content slug {slug:?}: slugs must be non-empty URL-safe tokens without '/'")]
    InvalidSlug { slug: String },

    #[error("duplicate child slug {slug:?} in {parent:?}")]
    DuplicateSlug { slug: String, parent: String },

    #[error("container {slug:?} must have at least one child")]
    EmptyContainer { slug: String },

    #[error("{slug:?} is a leaf and cannot take a table of contents")]
    NotAContainer { slug: String },
}

/// Raised when decoding a composed JSON tree.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed content JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid content node at {path:?}, field `{field}`: {reason}")]
    InvalidNode {
        path: String,
        field: &'static str,
        reason: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IncludeError {
    #[error("exact include {pattern:?} matched no document")]
    MissingExact { pattern: String },
}

/// A document definition that fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("document directive field `{field}` must not be empty")]
    EmptyField { field: &'static str },

    #[error("document directive {title:?} has no sections")]
    NoSections { title: String },

    #[error("section #{index} of {title:?} has an empty title")]
    EmptySectionTitle { title: String, index: usize },

    #[error("section {section:?} of {title:?} has no includes")]
    NoIncludes { title: String, section: String },

    #[error("section {section:?} of {title:?} has an include with an empty pattern")]
    EmptyPattern { title: String, section: String },

    #[error("document {title:?} has slug {slug:?}, which is not URL-safe; set an explicit slug")]
    InvalidSlug { title: String, slug: String },

    #[error("section {section:?} of {title:?} yields no usable slug; use ASCII letters or digits in its title")]
    InvalidSectionSlug { title: String, section: String },

    #[error("sections {first:?} and {second:?} of {title:?} both have slug {slug:?}")]
    DuplicateSectionSlug {
        title: String,
        first: String,
        second: String,
        slug: String,
    },
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse frontmatter of {path:?}: {reason}")]
    Frontmatter { path: PathBuf, reason: String },
}

/// Everything that can abort the composition of a single document.
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("document {route}: {source}")]
    Directive {
        route: String,
        #[source]
        source: DirectiveError,
    },

    #[error("document {route}, section {section:?}: {source}")]
    Include {
        route: String,
        section: String,
        #[source]
        source: IncludeError,
    },

    #[error("document {route}, section {section:?}: {source}")]
    Load {
        route: String,
        section: String,
        #[source]
        source: LoadError,
    },

    #[error("document {route}: {source}")]
    Content {
        route: String,
        #[source]
        source: ContentError,
    },
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("route {route:?} does not map to a file below the output directory")]
    InvalidRoute { route: String },

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {route}: {source}")]
    Encode {
        route: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Content(#[from] ContentError),
}
