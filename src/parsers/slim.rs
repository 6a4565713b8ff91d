//! Slim parser. Works in two stages: the line tokenizer produces a tagged
//! symbolic tree (`multi`/`html`/`static`/`output`/...), and the decoder
//! lowers that tree into the shared IR. Keeping the stages apart means the
//! decoder never sees raw source text, only tagged lists.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{Severity, Warning, WarningCollector};
use crate::errors::ParseError;
use crate::ir::{is_void_element, AttrMap, Conditional, Element, Loop, Node, Pos};
use crate::parsers::{opens_loop, split_conditional, split_loop};

const INDENT_UNIT: usize = 2;

static TAG_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z][A-Za-z0-9-]*)?(?P<shorthand>(?:[.#][A-Za-z0-9_-]+)+)?(?P<rest>\s.*|=.*)?$")
        .expect("slim tag pattern")
});

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?P<key>[A-Za-z@:][A-Za-z0-9_:-]*)=(?:"(?P<quoted>[^"]*)"|(?P<bare>[^\s]+))"#)
        .expect("slim attribute pattern")
});

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a Slim document into a template tree.
pub fn parse(source: &str, warnings: &mut WarningCollector) -> Result<Node, ParseError> {
    let lines = collect_lines(source, warnings);
    let mut index = 0;
    let sexp = tokenize_level(&lines, &mut index, 0, warnings)?;
    let children = decode_multi(&sexp, warnings);
    Ok(Node::template(children))
}

// ============================================================================
// SYMBOLIC TREE
// ============================================================================

/// A tagged list, the tokenizer's output language. The first atom of a list
/// names the construct; the decoder dispatches on it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl Sexp {
    fn atom(s: impl Into<String>) -> Self {
        Sexp::Atom(s.into())
    }

    fn list(items: Vec<Sexp>) -> Self {
        Sexp::List(items)
    }

    fn tag(&self) -> Option<&str> {
        match self {
            Sexp::List(items) => match items.first() {
                Some(Sexp::Atom(tag)) => Some(tag),
                _ => None,
            },
            Sexp::Atom(_) => None,
        }
    }

    fn as_atom(&self) -> Option<&str> {
        match self {
            Sexp::Atom(s) => Some(s),
            Sexp::List(_) => None,
        }
    }
}

// ============================================================================
// LINE SCANNING
// ============================================================================

struct Line<'s> {
    depth: usize,
    content: &'s str,
    number: usize,
}

fn collect_lines<'s>(source: &'s str, warnings: &mut WarningCollector) -> Vec<Line<'s>> {
    let mut lines = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let number = i + 1;
        let mut spaces = 0;
        for c in raw.chars() {
            match c {
                ' ' => spaces += 1,
                '\t' => {
                    warnings.add(
                        Warning::new(Severity::Warning, "tab indentation treated as one level")
                            .at_line(number),
                    );
                    spaces += INDENT_UNIT;
                }
                _ => break,
            }
        }
        lines.push(Line {
            depth: spaces / INDENT_UNIT,
            content: raw.trim(),
            number,
        });
    }
    lines
}

// ============================================================================
// STAGE 1: TOKENIZER
// ============================================================================

fn tokenize_level(
    lines: &[Line<'_>],
    index: &mut usize,
    depth: usize,
    warnings: &mut WarningCollector,
) -> Result<Sexp, ParseError> {
    let mut items = vec![Sexp::atom("multi")];

    while let Some(line) = lines.get(*index) {
        if line.depth < depth {
            break;
        }
        *index += 1;
        let number = line.number;
        let content = line.content;

        // `- else` folds into the preceding `if` list.
        if content.strip_prefix('-').map(str::trim) == Some("else") {
            let else_multi = tokenize_deeper(lines, index, depth, warnings)?;
            match items.last_mut() {
                Some(Sexp::List(list))
                    if list.first().and_then(Sexp::as_atom) == Some("if") && list.len() == 3 =>
                {
                    list.push(else_multi);
                }
                _ => {
                    warnings.add(
                        Warning::new(
                            Severity::Warning,
                            "`- else` without a preceding conditional, skipped",
                        )
                        .at_line(number),
                    );
                }
            }
            continue;
        }

        let children = tokenize_deeper(lines, index, depth, warnings)?;
        items.push(tokenize_line(content, children, number, warnings)?);
    }

    Ok(Sexp::list(items))
}

fn tokenize_deeper(
    lines: &[Line<'_>],
    index: &mut usize,
    depth: usize,
    warnings: &mut WarningCollector,
) -> Result<Sexp, ParseError> {
    match lines.get(*index) {
        Some(next) if next.depth > depth => tokenize_level(lines, index, depth + 1, warnings),
        _ => Ok(Sexp::list(vec![Sexp::atom("multi")])),
    }
}

fn line_sexp(number: usize) -> Sexp {
    Sexp::atom(number.to_string())
}

fn tokenize_line(
    content: &str,
    children: Sexp,
    number: usize,
    warnings: &mut WarningCollector,
) -> Result<Sexp, ParseError> {
    if let Some(text) = content.strip_prefix('|') {
        return Ok(Sexp::list(vec![
            Sexp::atom("static"),
            line_sexp(number),
            Sexp::atom(text.trim_start()),
        ]));
    }
    if let Some(text) = content.strip_prefix("/!") {
        return Ok(Sexp::list(vec![
            Sexp::atom("comment"),
            line_sexp(number),
            Sexp::atom("visible"),
            Sexp::atom(text.trim()),
        ]));
    }
    if let Some(text) = content.strip_prefix('/') {
        return Ok(Sexp::list(vec![
            Sexp::atom("comment"),
            line_sexp(number),
            Sexp::atom("hidden"),
            Sexp::atom(text.trim()),
        ]));
    }
    if let Some(code) = content.strip_prefix("==") {
        return Ok(Sexp::list(vec![
            Sexp::atom("output"),
            line_sexp(number),
            Sexp::atom("raw"),
            Sexp::atom(code.trim()),
        ]));
    }
    if let Some(code) = content.strip_prefix('=') {
        return Ok(Sexp::list(vec![
            Sexp::atom("output"),
            line_sexp(number),
            Sexp::atom("escape"),
            Sexp::atom(code.trim()),
        ]));
    }
    if let Some(code) = content.strip_prefix('-') {
        return Ok(tokenize_code(code.trim(), children, number));
    }
    if let Some(rest) = content.strip_prefix("doctype") {
        let kind = rest.trim();
        let text = if kind.is_empty() || kind == "html" || kind == "5" {
            "<!DOCTYPE html>".to_string()
        } else {
            format!("<!DOCTYPE {kind}>")
        };
        return Ok(Sexp::list(vec![
            Sexp::atom("static"),
            line_sexp(number),
            Sexp::atom(text),
        ]));
    }
    tokenize_tag_line(content, children, number, warnings)
}

fn tokenize_code(code: &str, children: Sexp, number: usize) -> Sexp {
    if let Some((keyword, condition)) = split_conditional(code) {
        return Sexp::list(vec![
            Sexp::atom("if"),
            Sexp::list(vec![
                Sexp::atom("cond"),
                line_sexp(number),
                Sexp::atom(keyword),
                Sexp::atom(condition),
            ]),
            children,
        ]);
    }
    if opens_loop(code) {
        let (collection, variable) =
            split_loop(code).unwrap_or_else(|| ("collection".to_string(), "item".to_string()));
        return Sexp::list(vec![
            Sexp::atom("each"),
            line_sexp(number),
            Sexp::atom(collection),
            Sexp::atom(variable),
            children,
        ]);
    }
    Sexp::list(vec![
        Sexp::atom("code"),
        line_sexp(number),
        Sexp::atom(code),
        children,
    ])
}

fn tokenize_tag_line(
    content: &str,
    children: Sexp,
    number: usize,
    warnings: &mut WarningCollector,
) -> Result<Sexp, ParseError> {
    let caps = TAG_LINE_RE.captures(content).ok_or_else(|| {
        ParseError::at(format!("Unrecognized line `{content}`"), number, 1)
    })?;

    let name = caps.name("name").map(|m| m.as_str());
    let shorthand = caps.name("shorthand").map(|m| m.as_str());
    if name.is_none() && shorthand.is_none() {
        return Err(ParseError::at(
            format!("Unrecognized line `{content}`"),
            number,
            1,
        ));
    }
    // A bare `.card` or `#main` implies a div.
    let name = name.unwrap_or("div");

    let mut attrs = vec![Sexp::atom("attrs")];
    if let Some(shorthand) = shorthand {
        let mut classes: Vec<&str> = Vec::new();
        let mut rest = shorthand;
        while !rest.is_empty() {
            let marker = rest.as_bytes()[0];
            let token_end = rest[1..]
                .find(['.', '#'])
                .map(|i| i + 1)
                .unwrap_or(rest.len());
            let token = &rest[1..token_end];
            match marker {
                b'.' => classes.push(token),
                _ => attrs.push(attr_sexp("id", token)),
            }
            rest = &rest[token_end..];
        }
        if !classes.is_empty() {
            attrs.push(attr_sexp("class", classes.join(" ")));
        }
    }

    let mut rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
    while let Some(attr) = ATTR_RE.captures(rest) {
        let key = attr.name("key").map(|m| m.as_str()).unwrap_or_default();
        let value = attr
            .name("quoted")
            .or_else(|| attr.name("bare"))
            .map(|m| m.as_str())
            .unwrap_or_default();
        attrs.push(attr_sexp(key, value));
        rest = &rest[attr.get(0).map(|m| m.end()).unwrap_or(rest.len())..];
    }

    let mut inner = match children {
        Sexp::List(items) => items,
        atom @ Sexp::Atom(_) => vec![Sexp::atom("multi"), atom],
    };

    // Trailing inline content: `p = expr` or `p text`.
    let inline = rest.trim();
    if !inline.is_empty() {
        let item = if let Some(code) = inline.strip_prefix("==") {
            Sexp::list(vec![
                Sexp::atom("output"),
                line_sexp(number),
                Sexp::atom("raw"),
                Sexp::atom(code.trim()),
            ])
        } else if let Some(code) = inline.strip_prefix('=') {
            Sexp::list(vec![
                Sexp::atom("output"),
                line_sexp(number),
                Sexp::atom("escape"),
                Sexp::atom(code.trim()),
            ])
        } else {
            Sexp::list(vec![
                Sexp::atom("static"),
                line_sexp(number),
                Sexp::atom(inline),
            ])
        };
        inner.insert(1, item);
    }

    if is_void_element(name) && inner.len() > 1 {
        warnings.add(
            Warning::new(
                Severity::Warning,
                format!("void element {name} cannot hold content, children dropped"),
            )
            .at_line(number),
        );
        inner.truncate(1);
    }

    Ok(Sexp::list(vec![
        Sexp::atom("html"),
        Sexp::atom("tag"),
        line_sexp(number),
        Sexp::atom(name),
        Sexp::list(attrs),
        Sexp::list(inner),
    ]))
}

fn attr_sexp(key: impl Into<String>, value: impl Into<String>) -> Sexp {
    Sexp::list(vec![
        Sexp::atom("attr"),
        Sexp::atom(key),
        Sexp::atom(value),
    ])
}

// ============================================================================
// STAGE 2: DECODER
// ============================================================================

fn decode_multi(sexp: &Sexp, warnings: &mut WarningCollector) -> Vec<Node> {
    let Sexp::List(items) = sexp else {
        return Vec::new();
    };
    items
        .iter()
        .skip(1)
        .filter_map(|item| decode(item, warnings))
        .collect()
}

fn atom_at(items: &[Sexp], index: usize) -> &str {
    items.get(index).and_then(Sexp::as_atom).unwrap_or_default()
}

fn pos_of(items: &[Sexp], index: usize) -> Option<Pos> {
    atom_at(items, index)
        .parse::<usize>()
        .ok()
        .map(|line| Pos::new(line, 1))
}

fn decode(sexp: &Sexp, warnings: &mut WarningCollector) -> Option<Node> {
    let Sexp::List(items) = sexp else {
        warnings.warn("stray atom in symbolic tree, skipped");
        return None;
    };
    match sexp.tag() {
        Some("static") => {
            let node = Node::text(atom_at(items, 2));
            Some(match pos_of(items, 1) {
                Some(pos) => node.at(pos),
                None => node,
            })
        }
        Some("output") => {
            let escaped = atom_at(items, 2) == "escape";
            let node = Node::expression(atom_at(items, 3), escaped);
            Some(match pos_of(items, 1) {
                Some(pos) => node.at(pos),
                None => node,
            })
        }
        Some("comment") => {
            let visible = atom_at(items, 2) == "visible";
            let node = Node::comment(atom_at(items, 3), visible);
            Some(match pos_of(items, 1) {
                Some(pos) => node.at(pos),
                None => node,
            })
        }
        Some("code") => {
            let children = items
                .get(3)
                .map(|multi| decode_multi(multi, warnings))
                .unwrap_or_default();
            let node = Node::block(atom_at(items, 2), children);
            Some(match pos_of(items, 1) {
                Some(pos) => node.at(pos),
                None => node,
            })
        }
        Some("if") => decode_if(items, warnings),
        Some("each") => {
            let body = items
                .get(4)
                .map(|multi| decode_multi(multi, warnings))
                .unwrap_or_default();
            Some(Node::Loop(Loop {
                collection: atom_at(items, 2).to_string(),
                variable: atom_at(items, 3).to_string(),
                body,
                pos: pos_of(items, 1),
            }))
        }
        Some("html") if atom_at(items, 1) == "tag" => decode_tag(items, warnings),
        other => {
            warnings.warn(format!(
                "unknown construct `{}` in symbolic tree, skipped",
                other.unwrap_or("?")
            ));
            None
        }
    }
}

fn decode_if(items: &[Sexp], warnings: &mut WarningCollector) -> Option<Node> {
    let Some(Sexp::List(cond_items)) = items.get(1) else {
        warnings.warn("malformed conditional in symbolic tree, skipped");
        return None;
    };
    let keyword = atom_at(cond_items, 2);
    let pos = pos_of(cond_items, 1);
    if keyword != "if" {
        warnings.add(
            Warning::new(
                Severity::Info,
                format!("`{keyword}` condition translated as a plain `if`"),
            )
            .at(pos),
        );
    }
    let true_branch = items
        .get(2)
        .map(|multi| decode_multi(multi, warnings))
        .unwrap_or_default();
    let false_branch = items
        .get(3)
        .map(|multi| decode_multi(multi, warnings))
        .unwrap_or_default();
    Some(Node::Conditional(Conditional {
        condition: atom_at(cond_items, 3).to_string(),
        true_branch,
        false_branch,
        pos,
    }))
}

fn decode_tag(items: &[Sexp], warnings: &mut WarningCollector) -> Option<Node> {
    let name = atom_at(items, 3);
    let mut attributes = AttrMap::new();
    if let Some(Sexp::List(attr_items)) = items.get(4) {
        for attr in attr_items.iter().skip(1) {
            if let Sexp::List(pair) = attr {
                attributes.insert(atom_at(pair, 1), atom_at(pair, 2));
            }
        }
    }
    let children = items
        .get(5)
        .map(|multi| decode_multi(multi, warnings))
        .unwrap_or_default();
    Some(Node::Element(Element {
        tag_name: name.to_string(),
        attributes,
        children,
        self_closing: is_void_element(name),
        pos: pos_of(items, 2),
    }))
}
