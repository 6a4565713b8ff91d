//! Generator behavior: each dialect's concrete syntax, driven by trees built
//! by hand and through the parsers.

use any2any::ir::{AttrMap, Element, Node};
use any2any::{convert, generators, ConvertError, ConvertOptions, Format, WarningCollector};

fn void_tree() -> Node {
    let mut attributes = AttrMap::new();
    attributes.insert("src", "/logo.png");
    Node::template(vec![Node::Element(Element {
        tag_name: "img".into(),
        attributes,
        children: vec![],
        self_closing: true,
        pos: None,
    })])
}

#[test]
fn void_elements_render_per_dialect() {
    let tree = void_tree();
    let mut warnings = WarningCollector::new();

    assert_eq!(
        generators::erb::generate(&tree, &mut warnings).unwrap(),
        "<img src=\"/logo.png\" />"
    );
    assert_eq!(
        generators::haml::generate(&tree, &mut warnings).unwrap(),
        "%img{ src: \"/logo.png\" }"
    );
    assert_eq!(
        generators::slim::generate(&tree, &mut warnings).unwrap(),
        "img src=\"/logo.png\""
    );
    let phlex = generators::phlex::generate(&tree, &mut warnings).unwrap();
    assert!(phlex.contains("    img(src: \"/logo.png\")\n"));
}

#[test]
fn non_template_input_is_rejected_by_every_generator() {
    let not_root = Node::text("x");
    let mut warnings = WarningCollector::new();
    for result in [
        generators::erb::generate(&not_root, &mut warnings),
        generators::haml::generate(&not_root, &mut warnings),
        generators::slim::generate(&not_root, &mut warnings),
        generators::phlex::generate(&not_root, &mut warnings),
    ] {
        assert!(matches!(result, Err(ConvertError::InvalidInput { .. })));
    }
}

#[test]
fn attribute_order_survives_an_erb_round_trip() {
    let source = "<div id=\"a\" class=\"b\" data-role=\"c\"></div>";
    let conversion = convert(source, Format::Erb, Format::Erb, &ConvertOptions::default()).unwrap();
    assert_eq!(conversion.output, source);
}

#[test]
fn opaque_code_round_trips_byte_for_byte() {
    let source = "<%= user.display_name(:short, fallback: guest_label) %>";
    let conversion = convert(source, Format::Erb, Format::Erb, &ConvertOptions::default()).unwrap();
    assert_eq!(conversion.output, source);

    // The same code survives a detour through another dialect.
    let through_haml = convert(source, Format::Erb, Format::Haml, &ConvertOptions::default()).unwrap();
    assert_eq!(
        through_haml.output,
        "= user.display_name(:short, fallback: guest_label)"
    );
}

#[test]
fn phlex_initializer_appears_only_with_instance_variables() {
    let with_ivars = convert(
        "<p><%= @name %></p>",
        Format::Erb,
        Format::Phlex,
        &ConvertOptions::default(),
    )
    .unwrap();
    assert!(with_ivars.output.contains("def initialize(**attributes)"));

    let without_ivars = convert(
        "<p><%= name %></p>",
        Format::Erb,
        Format::Phlex,
        &ConvertOptions::default(),
    )
    .unwrap();
    assert!(!without_ivars.output.contains("def initialize"));
}

#[test]
fn escaped_and_raw_expressions_keep_their_distinction() {
    let source = "<%= safe %><%== unsafe %>";
    for (to, expected) in [
        (Format::Haml, "= safe\n== unsafe"),
        (Format::Slim, "= safe\n== unsafe"),
    ] {
        let conversion = convert(source, Format::Erb, to, &ConvertOptions::default()).unwrap();
        assert_eq!(conversion.output, expected);
    }
    let phlex = convert(source, Format::Erb, Format::Phlex, &ConvertOptions::default()).unwrap();
    assert!(phlex.output.contains("plain safe"));
    assert!(phlex.output.contains("raw unsafe"));
}

#[test]
fn literal_attribute_values_are_escaped_only_in_markup_dialects() {
    let mut attributes = AttrMap::new();
    attributes.insert("title", "a & \"b\"");
    let tree = Node::template(vec![Node::Element(Element {
        tag_name: "div".into(),
        attributes,
        children: vec![],
        self_closing: false,
        pos: None,
    })]);
    let mut warnings = WarningCollector::new();
    assert_eq!(
        generators::erb::generate(&tree, &mut warnings).unwrap(),
        "<div title=\"a &amp; &quot;b&quot;\"></div>"
    );
    // Ruby-literal dialects escape quotes instead.
    assert_eq!(
        generators::haml::generate(&tree, &mut warnings).unwrap(),
        "%div{ title: \"a & \\\"b\\\"\" }"
    );
}

#[test]
fn hidden_and_visible_comments_translate() {
    let source = "<%# internal %><!-- shown -->";
    let haml = convert(source, Format::Erb, Format::Haml, &ConvertOptions::default()).unwrap();
    assert_eq!(haml.output, "-# internal\n/ shown");
    let slim = convert(source, Format::Erb, Format::Slim, &ConvertOptions::default()).unwrap();
    assert_eq!(slim.output, "/ internal\n/! shown");
}
