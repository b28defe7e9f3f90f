/// `load_config` module: reads the YAML build configuration and turns it into validated core types.
///
/// This is the only place where author-maintained YAML is parsed. Product
/// specs are validated here because a malformed spec must stop the whole
/// build. Document directives are only parsed: each one is validated when it
/// is composed, so a broken definition fails alone.
///
/// # Paths
/// Relative `content_dir` and `output_dir` are resolved against the directory
/// containing the config file. `DOCS_BUNDLE_CONTENT_DIR` and
/// `DOCS_BUNDLE_OUTPUT_DIR` override them when set.
///
/// # Errors
/// All errors use `anyhow::Error` with context and surface at the CLI boundary.
use anyhow::{Context, Result};
use docs_bundle_core::spec::{ProductSpecDecl, SpecCatalog};
use docs_bundle_core::tokens::TokenCounter;
use docs_bundle_core::LlmDocDirective;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const CONTENT_DIR_ENV: &str = "DOCS_BUNDLE_CONTENT_DIR";
pub const OUTPUT_DIR_ENV: &str = "DOCS_BUNDLE_OUTPUT_DIR";

/// Which token counter the build uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// `cl100k_base` BPE, with the character estimate as fallback.
    #[default]
    Tiktoken,
    /// Character estimate only.
    Approximate,
}

impl TokenizerKind {
    pub fn counter(self) -> TokenCounter {
        match self {
            TokenizerKind::Tiktoken => TokenCounter::tiktoken(),
            TokenizerKind::Approximate => TokenCounter::approximate(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    content_dir: PathBuf,
    output_dir: PathBuf,
    #[serde(default)]
    tokenizer: TokenizerKind,
    #[serde(default)]
    products: Vec<ProductSpecDecl>,
    #[serde(default)]
    documents: Vec<LlmDocDirective>,
}

/// Fully loaded build configuration.
#[derive(Debug)]
pub struct CliConfig {
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tokenizer: TokenizerKind,
    pub catalog: SpecCatalog,
    pub documents: Vec<LlmDocDirective>,
}

impl CliConfig {
    pub fn trace_loaded(&self) {
        info!(
            content_dir = %self.content_dir.display(),
            output_dir = %self.output_dir.display(),
            products = self.catalog.len(),
            documents = self.documents.len(),
            "Loaded config"
        );
        debug!(config = ?self, "Config loaded (full debug)");
    }
}

/// Loads the YAML config at `path`, applies environment overrides and validates the product specs.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let catalog = SpecCatalog::from_decls(raw.products).map_err(|e| {
        error!(error = %e, config_path = ?path_ref, "Invalid product spec");
        e
    })
    .context("Invalid product spec in config")?;

    let base_dir = path_ref.parent().unwrap_or_else(|| Path::new("."));
    let content_dir = dir_setting(CONTENT_DIR_ENV, raw.content_dir, base_dir);
    let output_dir = dir_setting(OUTPUT_DIR_ENV, raw.output_dir, base_dir);

    let config = CliConfig {
        content_dir,
        output_dir,
        tokenizer: raw.tokenizer,
        catalog,
        documents: raw.documents,
    };
    config.trace_loaded();
    Ok(config)
}

fn dir_setting(env_var: &str, configured: PathBuf, base_dir: &Path) -> PathBuf {
    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => {
            info!(env_var, value = %value, "Directory overridden from environment");
            PathBuf::from(value)
        }
        _ if configured.is_relative() => base_dir.join(configured),
        _ => configured,
    }
}
