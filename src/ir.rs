//! The shared intermediate representation every dialect parses into and
//! every generator emits from.
//!
//! The tree is deliberately small: eight node kinds cover the constructs the
//! four dialects have in common. Embedded code (conditions, expressions,
//! loop receivers) is carried as opaque strings and never interpreted here.

use serde::{Deserialize, Serialize};

// ============================================================================
// SOURCE POSITIONS
// ============================================================================

/// Advisory 1-based source location.
///
/// ```
/// use any2any::ir::Pos;
/// let pos = Pos::new(3, 7);
/// assert_eq!((pos.line, pos.column), (3, 7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// Ordered attribute map with last-write-wins semantics.
///
/// Insertion order is preserved so generated markup keeps the source's
/// attribute order; re-inserting a key overwrites its value in place.
///
/// ```
/// use any2any::ir::AttrMap;
/// let mut attrs = AttrMap::new();
/// attrs.insert("class", "a");
/// attrs.insert("id", "x");
/// attrs.insert("class", "b");
/// let keys: Vec<_> = attrs.iter().map(|(k, _)| k.as_str()).collect();
/// assert_eq!(keys, ["class", "id"]);
/// assert_eq!(attrs.get("class"), Some("b"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrMap {
    entries: Vec<(String, String)>,
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// ============================================================================
// NODE PAYLOADS
// ============================================================================

/// Document root. Always the top of a parsed tree, never nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub children: Vec<Node>,
    pub pos: Option<Pos>,
}

/// An HTML element with ordered attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag_name: String,
    pub attributes: AttrMap,
    pub children: Vec<Node>,
    pub self_closing: bool,
    pub pos: Option<Pos>,
}

/// An embedded expression whose value is rendered into the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub code: String,
    pub escaped: bool,
    pub pos: Option<Pos>,
}

/// Embedded code executed for effect, optionally owning a nested scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub code: String,
    pub children: Vec<Node>,
    pub pos: Option<Pos>,
}

/// A two-way branch on an opaque condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub condition: String,
    pub true_branch: Vec<Node>,
    pub false_branch: Vec<Node>,
    pub pos: Option<Pos>,
}

/// Iteration of a body once per item of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub collection: String,
    pub variable: String,
    pub body: Vec<Node>,
    pub pos: Option<Pos>,
}

/// Literal text emitted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticContent {
    pub text: String,
    pub pos: Option<Pos>,
}

/// A comment, either visible in rendered HTML or source-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub html_visible: bool,
    pub pos: Option<Pos>,
}

// ============================================================================
// NODE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Template(Template),
    Element(Element),
    Expression(Expression),
    Block(Block),
    Conditional(Conditional),
    Loop(Loop),
    StaticContent(StaticContent),
    Comment(Comment),
}

impl Node {
    pub fn template(children: Vec<Node>) -> Self {
        Node::Template(Template {
            children,
            pos: None,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::StaticContent(StaticContent {
            text: text.into(),
            pos: None,
        })
    }

    pub fn expression(code: impl Into<String>, escaped: bool) -> Self {
        Node::Expression(Expression {
            code: code.into(),
            escaped,
            pos: None,
        })
    }

    pub fn block(code: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Block(Block {
            code: code.into(),
            children,
            pos: None,
        })
    }

    pub fn comment(text: impl Into<String>, html_visible: bool) -> Self {
        Node::Comment(Comment {
            text: text.into(),
            html_visible,
            pos: None,
        })
    }

    /// Attaches a source position, builder-style.
    pub fn at(mut self, pos: Pos) -> Self {
        let slot = match &mut self {
            Node::Template(n) => &mut n.pos,
            Node::Element(n) => &mut n.pos,
            Node::Expression(n) => &mut n.pos,
            Node::Block(n) => &mut n.pos,
            Node::Conditional(n) => &mut n.pos,
            Node::Loop(n) => &mut n.pos,
            Node::StaticContent(n) => &mut n.pos,
            Node::Comment(n) => &mut n.pos,
        };
        *slot = Some(pos);
        self
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Template(_) => "template",
            Node::Element(_) => "element",
            Node::Expression(_) => "expression",
            Node::Block(_) => "block",
            Node::Conditional(_) => "conditional",
            Node::Loop(_) => "loop",
            Node::StaticContent(_) => "static_content",
            Node::Comment(_) => "comment",
        }
    }

    /// Serializes the tree as JSON, tagged by node kind. Useful for
    /// inspecting what a parser produced without a generator in the way.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn pos(&self) -> Option<Pos> {
        match self {
            Node::Template(n) => n.pos,
            Node::Element(n) => n.pos,
            Node::Expression(n) => n.pos,
            Node::Block(n) => n.pos,
            Node::Conditional(n) => n.pos,
            Node::Loop(n) => n.pos,
            Node::StaticContent(n) => n.pos,
            Node::Comment(n) => n.pos,
        }
    }
}

// ============================================================================
// VOID ELEMENTS
// ============================================================================

/// Tags that never take children and render without a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
}

// ============================================================================
// TRAVERSAL
// ============================================================================

/// Read-only tree traversal with per-kind hooks.
///
/// Every hook defaults to recursing into the node's children, so an
/// implementation only overrides the kinds it cares about and inherits full
/// traversal for the rest.
pub trait Visitor {
    fn visit(&mut self, node: &Node) {
        match node {
            Node::Template(n) => self.visit_template(n),
            Node::Element(n) => self.visit_element(n),
            Node::Expression(n) => self.visit_expression(n),
            Node::Block(n) => self.visit_block(n),
            Node::Conditional(n) => self.visit_conditional(n),
            Node::Loop(n) => self.visit_loop(n),
            Node::StaticContent(n) => self.visit_static(n),
            Node::Comment(n) => self.visit_comment(n),
        }
    }

    fn visit_all(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.visit(node);
        }
    }

    fn visit_template(&mut self, template: &Template) {
        self.visit_all(&template.children);
    }

    fn visit_element(&mut self, element: &Element) {
        self.visit_all(&element.children);
    }

    fn visit_expression(&mut self, _expression: &Expression) {}

    fn visit_block(&mut self, block: &Block) {
        self.visit_all(&block.children);
    }

    fn visit_conditional(&mut self, conditional: &Conditional) {
        self.visit_all(&conditional.true_branch);
        self.visit_all(&conditional.false_branch);
    }

    fn visit_loop(&mut self, r#loop: &Loop) {
        self.visit_all(&r#loop.body);
    }

    fn visit_static(&mut self, _content: &StaticContent) {}

    fn visit_comment(&mut self, _comment: &Comment) {}
}
