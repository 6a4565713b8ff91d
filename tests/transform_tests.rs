//! Normalizer, optimizer and validator behavior over parsed and hand-built
//! trees.

use any2any::ir::{AttrMap, Element, Loop, Node, Visitor};
use any2any::parsers::erb;
use any2any::transform::{normalize, optimize, validate};
use any2any::{ConvertError, WarningCollector};

/// Collects every static text in traversal order.
struct Statics(Vec<String>);

impl Visitor for Statics {
    fn visit_static(&mut self, content: &any2any::ir::StaticContent) {
        self.0.push(content.text.clone());
    }
}

fn count_adjacent_statics(nodes: &[Node]) -> usize {
    let mut count = 0;
    for pair in nodes.windows(2) {
        if matches!(pair, [Node::StaticContent(_), Node::StaticContent(_)]) {
            count += 1;
        }
    }
    for node in nodes {
        count += match node {
            Node::Template(t) => count_adjacent_statics(&t.children),
            Node::Element(e) => count_adjacent_statics(&e.children),
            Node::Block(b) => count_adjacent_statics(&b.children),
            Node::Conditional(c) => {
                count_adjacent_statics(&c.true_branch) + count_adjacent_statics(&c.false_branch)
            }
            Node::Loop(l) => count_adjacent_statics(&l.body),
            _ => 0,
        };
    }
    count
}

#[test]
fn normalize_leaves_no_adjacent_statics() {
    // Skipped stray tokens leave adjacent statics behind.
    let mut warnings = WarningCollector::new();
    let root = erb::parse("<div>a<% end %>b<% else %>c</div>", &mut warnings).unwrap();
    let normalized = normalize(root);
    assert_eq!(count_adjacent_statics(std::slice::from_ref(&normalized)), 0);

    let mut statics = Statics(Vec::new());
    statics.visit(&normalized);
    assert_eq!(statics.0, vec!["abc".to_string()]);
}

#[test]
fn normalize_is_idempotent_over_parsed_trees() {
    let sources = [
        "<div>a<% end %>b</div>",
        "<% if @x %>y<% end %><p>z</p>",
        "plain <%= code %> more",
    ];
    for source in sources {
        let mut warnings = WarningCollector::new();
        let root = erb::parse(source, &mut warnings).unwrap();
        let once = normalize(root);
        assert_eq!(normalize(once.clone()), once, "source: {source}");
    }
}

#[test]
fn optimize_is_the_identity() {
    let mut warnings = WarningCollector::new();
    let root = erb::parse("<div><%= @x %></div>", &mut warnings).unwrap();
    assert_eq!(optimize(root.clone()), root);
}

#[test]
fn validate_accepts_parser_output() {
    let sources = [
        "<div class=\"a\"><%= @x %></div>",
        "<% if @ok %>y<% end %>",
        "<% @items.each do |item| %><li></li><% end %>",
    ];
    for source in sources {
        let mut warnings = WarningCollector::new();
        let root = erb::parse(source, &mut warnings).unwrap();
        assert!(validate(&normalize(root)).is_ok(), "source: {source}");
    }
}

#[test]
fn validate_reports_all_violations_at_once() {
    let tree = Node::template(vec![
        Node::Element(Element {
            tag_name: String::new(),
            attributes: AttrMap::new(),
            children: vec![Node::expression("", true)],
            self_closing: false,
            pos: None,
        }),
        Node::Loop(Loop {
            collection: String::new(),
            variable: "item".into(),
            body: vec![],
            pos: None,
        }),
    ]);
    let Err(ConvertError::Validation { violations }) = validate(&tree) else {
        panic!("expected validation failure");
    };
    assert_eq!(violations.len(), 3);
    let rendered = violations.join(", ");
    assert!(rendered.contains("tag name"));
    assert!(rendered.contains("expression"));
    assert!(rendered.contains("collection"));
}

#[test]
fn validate_rejects_nested_templates() {
    let tree = Node::template(vec![Node::template(vec![])]);
    let Err(ConvertError::Validation { violations }) = validate(&tree) else {
        panic!("expected validation failure");
    };
    assert!(violations[0].contains("root"));
}
