use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Writes a content tree and a config file into a fresh directory.
///
/// The `demo` spec lists pages `a` and `b`, but only `a` has a file.
fn create_site(extra_documents: &str) -> TempDir {
    let dir = TempDir::new().expect("Creating temp dir failed");
    let root = dir.path();
    write(root, "content/doc/demo/a.mdx", "---\ntitle: Alpha\n---\n\nAlpha body\n");
    write(
        root,
        "content/blog/hello-world.mdx",
        "---\ntitle: Hello\ndate: 2025-01-01\n---\nPost",
    );
    write(
        root,
        "docs-bundle.yaml",
        &format!(
            r#"
content_dir: content
output_dir: public
tokenizer: approximate
products:
  - product: demo
    sections:
      - slug: index
        label: Overview
        children:
          - slug: a
            label: Alpha
          - slug: b
            label: Beta
documents:
  - title: Demo
    description: Demo docs
    route_path: /docs/demo/llms-full.txt
    sections:
      - title: Docs
        includes:
          - type: wildcard
            pattern: demo/*
{extra_documents}"#
        ),
    );
    dir
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn build_writes_text_and_json_artifacts() {
    let site = create_site("");
    let mut cmd = Command::cargo_bin("docs-bundle").expect("Binary exists");

    cmd.arg("build")
        .arg("--config")
        .arg(site.path().join("docs-bundle.yaml"))
        .env_remove("DOCS_BUNDLE_CONTENT_DIR")
        .env_remove("DOCS_BUNDLE_OUTPUT_DIR");

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("Build complete.")
                .and(predicate::str::contains("/docs/demo/llms-full.txt")),
        );

    let text = fs::read_to_string(site.path().join("public/docs/demo/llms-full.txt")).unwrap();
    assert_eq!(text, "Alpha body");
    let json = fs::read_to_string(site.path().join("public/docs/demo/llms-full.json")).unwrap();
    assert!(json.contains("\"tokenCount\": 3"));
}

#[test]
fn build_fails_when_a_document_references_a_missing_page() {
    let site = create_site(
        r#"  - title: Broken
    description: Needs page b
    route_path: /docs/demo/broken.txt
    sections:
      - title: Docs
        includes:
          - type: exact
            pattern: demo/b
"#,
    );
    let mut cmd = Command::cargo_bin("docs-bundle").expect("Binary exists");
    cmd.arg("build")
        .arg("--config")
        .arg(site.path().join("docs-bundle.yaml"))
        .env_remove("DOCS_BUNDLE_CONTENT_DIR")
        .env_remove("DOCS_BUNDLE_OUTPUT_DIR");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("[ERROR] Broken (/docs/demo/broken.txt)"));

    // The healthy document is still written.
    assert!(site.path().join("public/docs/demo/llms-full.txt").exists());
    assert!(!site.path().join("public/docs/demo/broken.txt").exists());
}

#[test]
fn resolve_lists_registry_and_other_content() {
    let site = create_site("");
    let config = site.path().join("docs-bundle.yaml");

    Command::cargo_bin("docs-bundle")
        .expect("Binary exists")
        .args(["resolve", "--config"])
        .arg(&config)
        .env_remove("DOCS_BUNDLE_CONTENT_DIR")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("demo/a\t/docs/demo/a\tAlpha")
                .and(predicate::str::contains("demo/b").not()),
        );

    Command::cargo_bin("docs-bundle")
        .expect("Binary exists")
        .args(["resolve", "--all", "--config"])
        .arg(&config)
        .env_remove("DOCS_BUNDLE_CONTENT_DIR")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blog\thello-world\t/blog/hello-world\tHello"));

    Command::cargo_bin("docs-bundle")
        .expect("Binary exists")
        .args(["resolve", "--product", "unknown", "--config"])
        .arg(&config)
        .env_remove("DOCS_BUNDLE_CONTENT_DIR")
        .assert()
        .failure();
}

#[test]
fn inspect_prints_outline_of_built_artifact() {
    let site = create_site("");
    Command::cargo_bin("docs-bundle")
        .expect("Binary exists")
        .arg("build")
        .arg("--config")
        .arg(site.path().join("docs-bundle.yaml"))
        .env_remove("DOCS_BUNDLE_CONTENT_DIR")
        .env_remove("DOCS_BUNDLE_OUTPUT_DIR")
        .assert()
        .success();

    Command::cargo_bin("docs-bundle")
        .expect("Binary exists")
        .arg("inspect")
        .arg("--json")
        .arg(site.path().join("public/docs/demo/llms-full.json"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("## Docs")
                .and(predicate::str::contains("Title: Demo"))
                .and(predicate::str::contains("Documents: 1"))
                .and(predicate::str::contains("Tokens: 3")),
        );
}

#[test]
fn inspect_rejects_invalid_json() {
    let site = create_site("");
    let bad = site.path().join("bad.json");
    fs::write(&bad, r#"{"slug": "x", "title": "X", "tokenCount": 0}"#).unwrap();

    Command::cargo_bin("docs-bundle")
        .expect("Binary exists")
        .arg("inspect")
        .arg("--json")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rawContent"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let site = create_site("");
    let cli = docs_bundle::cli::Cli {
        command: docs_bundle::cli::Commands::Inspect {
            json: site.path().join("missing.json"),
        },
    };
    // Inspecting a missing file fails, but tracing is initialised first.
    assert!(docs_bundle::cli::run(cli).await.is_err());

    let events = events.lock().unwrap();
    assert!(
        events.iter().any(|e| e.contains("trace_initialised")),
        "Expected 'trace_initialised' event, got: {:?}",
        *events
    );
}
