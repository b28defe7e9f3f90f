use docs_bundle_core::error::SpecValidationError;
use docs_bundle_core::spec::{order_siblings, ProductSpec, ProductSpecDecl, SpecCatalog, SpecNode};

fn slugs<'a>(nodes: impl IntoIterator<Item = &'a SpecNode>) -> Vec<&'a str> {
    nodes.into_iter().map(|n| n.slug()).collect()
}

#[test]
fn order_siblings_sorts_by_weight_and_keeps_unweighted_in_document_order() {
    let children = vec![
        SpecNode::new("c", "C"),
        SpecNode::new("b", "B").with_weight(2),
        SpecNode::new("a", "A"),
        SpecNode::new("z", "Z").with_weight(1),
        SpecNode::new("y", "Y").with_weight(2),
    ];

    let ordered = order_siblings(&children);

    assert_eq!(slugs(ordered), vec!["z", "b", "y", "c", "a"]);
}

#[test]
fn negative_weights_sort_before_positive_ones() {
    let children = vec![
        SpecNode::new("late", "Late").with_weight(10),
        SpecNode::new("early", "Early").with_weight(-5),
    ];
    assert_eq!(slugs(order_siblings(&children)), vec!["early", "late"]);
}

#[test]
fn index_section_is_moved_to_front_regardless_of_weight() {
    let spec = ProductSpec::new(
        "demo",
        vec![
            SpecNode::new("learn", "Learn").with_weight(1),
            SpecNode::new("guides", "Guides"),
            SpecNode::new("index", "Overview").with_weight(50),
        ],
    )
    .expect("valid spec");

    assert_eq!(slugs(spec.ordered_sections()), vec!["index", "learn", "guides"]);
    // Declaration order is untouched.
    assert_eq!(slugs(spec.sections()), vec!["learn", "guides", "index"]);
}

#[test]
fn slug_with_separator_is_rejected_naming_slug_and_parent() {
    let err = ProductSpec::new(
        "demo",
        vec![SpecNode::new("learn", "Learn").with_children(vec![SpecNode::new("calls/streams", "Bad")])],
    )
    .unwrap_err();

    assert_eq!(
        err,
        SpecValidationError::InvalidSlug {
            slug: "calls/streams".to_string(),
            parent: "demo/learn".to_string(),
        }
    );
    let message = err.to_string();
    assert!(message.contains("calls/streams"));
    assert!(message.contains("demo/learn"));
}

#[test]
fn empty_slug_is_rejected() {
    let err = ProductSpec::new("demo", vec![SpecNode::new("", "Nameless")]).unwrap_err();
    assert!(matches!(err, SpecValidationError::InvalidSlug { .. }));
}

#[test]
fn duplicate_sibling_slugs_are_rejected() {
    let err = ProductSpec::new(
        "demo",
        vec![SpecNode::new("learn", "Learn").with_children(vec![
            SpecNode::new("calls", "Calls"),
            SpecNode::new("calls", "Calls again"),
        ])],
    )
    .unwrap_err();

    assert_eq!(
        err,
        SpecValidationError::DuplicateSlug {
            slug: "calls".to_string(),
            parent: "demo/learn".to_string(),
        }
    );
}

#[test]
fn same_slug_under_different_parents_is_allowed() {
    let spec = ProductSpec::new(
        "demo",
        vec![
            SpecNode::new("learn", "Learn").with_children(vec![SpecNode::new("index", "Learn")]),
            SpecNode::new("guides", "Guides").with_children(vec![SpecNode::new("index", "Guides")]),
        ],
    );
    assert!(spec.is_ok());
}

#[test]
fn declarations_parse_from_yaml_with_weights() {
    let yaml = r#"
product: demo
sections:
  - slug: learn
    label: Learn
    weight: 2
    children:
      - slug: calls
        label: Calls
      - slug: tools
        label: Tools
        weight: 1
"#;
    let decl: ProductSpecDecl = serde_yaml::from_str(yaml).expect("valid yaml");
    let spec = ProductSpec::from_decl(decl).expect("valid spec");

    let learn = spec.section("learn").expect("learn section");
    assert_eq!(learn.weight(), Some(2));
    assert_eq!(slugs(learn.ordered_children()), vec!["tools", "calls"]);
}

#[test]
fn non_integer_weight_is_a_validation_error() {
    let yaml = r#"
product: demo
sections:
  - slug: learn
    label: Learn
    weight: heavy
"#;
    let decl: ProductSpecDecl = serde_yaml::from_str(yaml).expect("yaml parses loosely");
    let err = ProductSpec::from_decl(decl).unwrap_err();

    match err {
        SpecValidationError::InvalidWeight { slug, parent, weight } => {
            assert_eq!(slug, "learn");
            assert_eq!(parent, "demo");
            assert!(weight.contains("heavy"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn catalog_supports_many_products_and_rejects_duplicates() {
    let catalog = SpecCatalog::new(vec![
        ProductSpec::new("mirascope", vec![]).unwrap(),
        ProductSpec::new("lilypad", vec![]).unwrap(),
        ProductSpec::new("third", vec![]).unwrap(),
    ])
    .expect("distinct products");
    assert_eq!(catalog.products().collect::<Vec<_>>(), vec!["mirascope", "lilypad", "third"]);
    assert!(catalog.get("lilypad").is_some());
    assert!(catalog.get("unknown").is_none());

    let err = SpecCatalog::new(vec![
        ProductSpec::new("mirascope", vec![]).unwrap(),
        ProductSpec::new("mirascope", vec![]).unwrap(),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        SpecValidationError::DuplicateProduct {
            product: "mirascope".to_string()
        }
    );
}
