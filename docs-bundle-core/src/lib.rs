#![doc = "docs-bundle-core: content models and pipelines for LLM documentation bundles."]

//! This crate holds the data models and algorithms behind the documentation
//! site's LLM artifacts. The CLI crate only loads configuration and calls in here.
//!
//! # Pipeline
//! 1. [`spec`]: per-product documentation structure, validated once.
//! 2. [`corpus`]: content files found on disk, classified by [`meta::ContentKind`].
//! 3. [`registry`]: specs joined against the corpus into [`registry::DocInfo`] records.
//! 4. [`include`]: exact / glob / wildcard selection of documents.
//! 5. [`content`]: the recursive [`content::LlmContent`] tree with token counts.
//! 6. [`directive`] + [`compose`]: declarative documents turned into trees.
//! 7. [`artifact`]: flattened text and JSON written to the output directory.

pub mod artifact;
pub mod compose;
pub mod content;
pub mod corpus;
pub mod directive;
pub mod error;
pub mod frontmatter;
pub mod include;
pub mod loader;
pub mod meta;
pub mod registry;
pub mod slug;
pub mod spec;
pub mod tokens;

pub use content::LlmContent;
pub use directive::{DirectiveSection, LlmDocDirective};
pub use include::IncludeDirective;
pub use registry::{DocInfo, DocRegistry};
pub use spec::{ProductSpec, SpecCatalog, SpecNode};
pub use tokens::TokenCounter;
