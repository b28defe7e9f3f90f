///
/// This module implements the CLI for docs-bundle: command parsing, routing and
/// user-visible output.
///
/// All models and pipelines live in [`docs-bundle-core`]. This module only
/// loads configuration, wires the core together and reports results.
///
/// ## Commands
/// - `build`: compose every configured document and write its artifacts.
/// - `resolve`: print the resolved documentation registry.
/// - `inspect`: decode a composed JSON artifact and print its outline.
///
/// For programmatic and integration use, call [`run`] with a constructed [`Cli`].
///
/// [`docs-bundle-core`]: ../../docs-bundle-core/
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docs_bundle_core::artifact::write_artifacts;
use docs_bundle_core::compose::build_all;
use docs_bundle_core::content::table_of_contents;
use docs_bundle_core::corpus::Corpus;
use docs_bundle_core::loader::{load_metadata, FsContentLoader};
use docs_bundle_core::{DocRegistry, LlmContent};
use std::path::PathBuf;

/// CLI for docs-bundle: compose product documentation into LLM-ready artifacts.
#[derive(Parser)]
#[clap(
    name = "docs-bundle",
    version,
    about = "Compose product documentation into llms-full.txt bundles and JSON content trees"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose all documents in the config and write their artifacts
    Build {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Print the documentation registry resolved from the config's specs
    Resolve {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Only list documents of this product
        #[clap(long)]
        product: Option<String>,
        /// Also list blog posts and policy pages
        #[clap(long)]
        all: bool,
    },
    /// Print the outline and token count of a composed JSON artifact
    Inspect {
        /// Path to a JSON artifact written by `build`
        #[clap(long)]
        json: PathBuf,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Build { config } => build(config).await,
        Commands::Resolve {
            config,
            product,
            all,
        } => resolve(config, product, all).await,
        Commands::Inspect { json } => inspect(json).await,
    }
}

async fn build(config: PathBuf) -> Result<()> {
    let config = load_config(config)?;
    tracing::info!(command = "build", "Starting build");

    let corpus = Corpus::scan(&config.content_dir)?;
    let registry = DocRegistry::build(&config.catalog, &corpus);
    let loader = FsContentLoader::new(&config.content_dir);
    let counter = config.tokenizer.counter();

    let report = build_all(&config.documents, &registry, &loader, &counter).await;

    let mut failures: Vec<String> = report
        .failures
        .iter()
        .map(|f| format!("{} ({}): {}", f.title, f.route, f.error))
        .collect();

    println!("Build complete.");
    for doc in &report.documents {
        match write_artifacts(&doc.content, &doc.directive, &config.output_dir, &counter).await {
            Ok(artifact) => {
                println!(
                    "  {} -> {} ({} tokens, sha256 {})",
                    artifact.route,
                    artifact.text_path.display(),
                    artifact.token_count,
                    artifact.content_hash
                );
            }
            Err(e) => {
                tracing::error!(command = "build", route = %doc.directive.route_path, error = %e, "Writing artifacts failed");
                failures.push(format!(
                    "{} ({}): {}",
                    doc.directive.title, doc.directive.route_path, e
                ));
            }
        }
    }

    if failures.is_empty() {
        tracing::info!(command = "build", documents = report.documents.len(), "Build succeeded");
        return Ok(());
    }
    for failure in &failures {
        eprintln!("[ERROR] {failure}");
    }
    anyhow::bail!("{} document(s) failed to build", failures.len())
}

async fn resolve(config: PathBuf, product: Option<String>, all: bool) -> Result<()> {
    let config = load_config(config)?;
    tracing::info!(command = "resolve", "Resolving documentation registry");

    let corpus = Corpus::scan(&config.content_dir)?;
    let registry = DocRegistry::build(&config.catalog, &corpus);

    if let Some(product) = &product {
        if config.catalog.get(product).is_none() {
            anyhow::bail!("Unknown product {product:?}");
        }
    }

    if all {
        let loader = FsContentLoader::new(&config.content_dir);
        let metas = load_metadata(&registry, &corpus, &loader).await?;
        for meta in metas {
            if let docs_bundle_core::meta::ContentMeta::Doc(doc) = &meta {
                if product.as_deref().is_some_and(|p| p != doc.product) {
                    continue;
                }
            }
            println!(
                "{:?}\t{}\t{}\t{}",
                meta.kind(),
                meta.path(),
                meta.route(),
                meta.title()
            );
        }
        return Ok(());
    }

    let docs = match &product {
        Some(product) => registry.by_product(product),
        None => registry.all().iter().collect(),
    };
    for doc in docs {
        println!("{}\t{}\t{}", doc.path, doc.route_path, doc.title);
    }
    Ok(())
}

async fn inspect(json: PathBuf) -> Result<()> {
    let source = tokio::fs::read_to_string(&json)
        .await
        .with_context(|| format!("Failed to read {}", json.display()))?;
    let content = LlmContent::from_json(&source)
        .with_context(|| format!("Failed to decode {}", json.display()))?;
    tracing::info!(command = "inspect", slug = content.slug(), "Decoded content tree");

    println!("{}", table_of_contents(&content));
    println!("Title: {}", content.title());
    println!("Documents: {}", content.leaf_count());
    println!("Tokens: {}", content.token_count());
    Ok(())
}
