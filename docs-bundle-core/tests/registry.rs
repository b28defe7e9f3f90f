use std::sync::{Arc, Mutex};

use docs_bundle_core::corpus::Corpus;
use docs_bundle_core::registry::{route_for_path, DocRegistry};
use docs_bundle_core::spec::{ProductSpec, SpecCatalog, SpecNode};
use pretty_assertions::assert_eq;
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
        let msg = format!("{} {:?}", event.metadata().level(), event);
        self.events.lock().unwrap().push(msg);
    }
}

fn demo_spec() -> ProductSpec {
    ProductSpec::new(
        "demo",
        vec![SpecNode::new("index", "Overview")
            .with_children(vec![SpecNode::new("a", "Alpha"), SpecNode::new("b", "Beta")])],
    )
    .unwrap()
}

fn paths(docs: &[&docs_bundle_core::DocInfo]) -> Vec<String> {
    docs.iter().map(|d| d.path.clone()).collect()
}

#[test]
fn missing_files_are_skipped_with_a_warning() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Registry::default().with(EventCollector {
        events: events.clone(),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let corpus = Corpus::from_paths(["doc/demo/a.mdx"]);
    let registry = DocRegistry::resolve(&demo_spec(), &corpus);

    assert_eq!(registry.len(), 1);
    let doc = registry.get("demo/a").expect("demo/a resolved");
    assert_eq!(doc.title, "Alpha");
    assert_eq!(doc.route_path, "/docs/demo/a");
    assert_eq!(doc.section.as_deref(), Some("index"));
    assert_eq!(doc.group, None);
    assert_eq!(doc.file, "doc/demo/a.mdx");
    assert!(!registry.contains("demo/b"));

    let events = events.lock().unwrap();
    assert!(
        events
            .iter()
            .any(|e| e.contains("WARN") && e.contains("demo/b") && e.contains("no content file")),
        "expected a warning for demo/b, got: {events:?}"
    );
}

#[test]
fn route_paths_elide_index_segments() {
    assert_eq!(route_for_path("demo/index"), "/docs/demo");
    assert_eq!(route_for_path("demo/learn/index"), "/docs/demo/learn");
    assert_eq!(route_for_path("demo/learn/calls"), "/docs/demo/learn/calls");
}

#[test]
fn sections_groups_and_landing_pages_resolve_in_spec_order() {
    let spec = ProductSpec::new(
        "mirascope",
        vec![
            SpecNode::new("learn", "Learn").with_weight(2).with_children(vec![
                SpecNode::new("index", "Learn Overview"),
                SpecNode::new("calls", "Calls").with_weight(2),
                SpecNode::new("tools", "Tools").with_weight(1),
                SpecNode::new("providers", "Providers").with_children(vec![
                    SpecNode::new("openai", "OpenAI"),
                    SpecNode::new("anthropic", "Anthropic"),
                ]),
            ]),
            SpecNode::new("index", "Welcome")
                .with_children(vec![SpecNode::new("index", "Welcome")]),
            SpecNode::new("api", "API Reference"),
        ],
    )
    .unwrap();
    let corpus = Corpus::from_paths([
        "doc/mirascope/index.mdx",
        "doc/mirascope/learn/index.mdx",
        "doc/mirascope/learn/calls.mdx",
        "doc/mirascope/learn/tools.md",
        "doc/mirascope/learn/providers/openai.mdx",
        "doc/mirascope/learn/providers/anthropic.mdx",
        "doc/mirascope/api.mdx",
        "doc/mirascope/orphan.mdx",
        "assets/logo.png",
    ]);

    let registry = DocRegistry::resolve(&spec, &corpus);

    let all: Vec<&str> = registry.all().iter().map(|d| d.path.as_str()).collect();
    assert_eq!(
        all,
        vec![
            "mirascope/index",
            "mirascope/learn/tools",
            "mirascope/learn/calls",
            "mirascope/learn/index",
            "mirascope/learn/providers/openai",
            "mirascope/learn/providers/anthropic",
            "mirascope/api",
        ]
    );

    let landing = registry.get("mirascope/index").unwrap();
    assert_eq!(landing.route_path, "/docs/mirascope");
    let learn_index = registry.get("mirascope/learn/index").unwrap();
    assert_eq!(learn_index.route_path, "/docs/mirascope/learn");

    let openai = registry.get("mirascope/learn/providers/openai").unwrap();
    assert_eq!(openai.section.as_deref(), Some("learn"));
    assert_eq!(openai.group.as_deref(), Some("providers"));
    assert_eq!(openai.file, "doc/mirascope/learn/providers/openai.mdx");

    assert_eq!(
        paths(&registry.by_section("mirascope", "learn")),
        vec![
            "mirascope/learn/tools",
            "mirascope/learn/calls",
            "mirascope/learn/index",
            "mirascope/learn/providers/openai",
            "mirascope/learn/providers/anthropic",
        ]
    );
    assert_eq!(
        paths(&registry.by_group("mirascope", "providers")),
        vec!["mirascope/learn/providers/openai", "mirascope/learn/providers/anthropic"]
    );
    assert_eq!(paths(&registry.by_section("mirascope", "api")), vec!["mirascope/api"]);
}

#[test]
fn products_are_resolved_independently_in_catalog_order() {
    let catalog = SpecCatalog::new(vec![
        ProductSpec::new(
            "mirascope",
            vec![SpecNode::new("index", "Overview").with_children(vec![SpecNode::new("index", "Home")])],
        )
        .unwrap(),
        ProductSpec::new(
            "lilypad",
            vec![SpecNode::new("index", "Overview").with_children(vec![
                SpecNode::new("index", "Home"),
                SpecNode::new("setup", "Setup"),
            ])],
        )
        .unwrap(),
    ])
    .unwrap();
    let corpus = Corpus::from_paths([
        "doc/lilypad/index.mdx",
        "doc/lilypad/setup.mdx",
        "doc/mirascope/index.mdx",
    ]);

    let registry = DocRegistry::build(&catalog, &corpus);

    assert_eq!(
        registry.all().iter().map(|d| d.path.as_str()).collect::<Vec<_>>(),
        vec!["mirascope/index", "lilypad/index", "lilypad/setup"]
    );
    assert_eq!(paths(&registry.by_product("lilypad")), vec!["lilypad/index", "lilypad/setup"]);
    assert!(registry.by_product("unknown").is_empty());
}

#[test]
fn fresh_registries_do_not_share_state() {
    let spec = demo_spec();
    let first = DocRegistry::resolve(&spec, &Corpus::from_paths(["doc/demo/a.mdx"]));
    let second = DocRegistry::resolve(&spec, &Corpus::from_paths(["doc/demo/b.mdx"]));

    assert!(first.contains("demo/a") && !first.contains("demo/b"));
    assert!(second.contains("demo/b") && !second.contains("demo/a"));
}
