//! Just enough of a Ruby front end to read Phlex components: a lexer, a
//! recursive-descent parser for the statement shapes Phlex templates use,
//! and a bounded unparser that turns expression nodes back into source text.
//!
//! Anything outside the recognized grammar degrades to a [`RubyNode::Raw`]
//! carrying the source slice verbatim, never a hard failure; only lexical
//! problems (an unterminated string) abort the parse.

use crate::errors::ParseError;

// ============================================================================
// TOKENS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    Const(String),
    Ivar(String),
    Sym(String),
    /// `key:` in label position, keyword or not.
    Label(String),
    Str(String),
    Num(String),
    Kw(Kw),
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Pipe,
    Op(String),
    Newline,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kw {
    Class,
    Def,
    End,
    If,
    Elsif,
    Else,
    Unless,
    Do,
    True,
    False,
    Nil,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
    line: usize,
}

fn keyword(word: &str) -> Option<Kw> {
    Some(match word {
        "class" => Kw::Class,
        "def" => Kw::Def,
        "end" => Kw::End,
        "if" => Kw::If,
        "elsif" => Kw::Elsif,
        "else" => Kw::Else,
        "unless" => Kw::Unless,
        "do" => Kw::Do,
        "true" => Kw::True,
        "false" => Kw::False,
        "nil" => Kw::Nil,
        _ => return None,
    })
}

// ============================================================================
// LEXER
// ============================================================================

fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;

    let mut push = |kind: TokenKind, start: usize, end: usize, line: usize| {
        tokens.push(Token {
            kind,
            start,
            end,
            line,
        });
    };

    while i < source.len() {
        let c = bytes[i];
        match c {
            b'\n' => {
                push(TokenKind::Newline, i, i + 1, line);
                line += 1;
                i += 1;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            b'#' => {
                while i < source.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'"' | b'\'' => {
                let quote = c;
                let start = i;
                i += 1;
                let mut text = String::new();
                loop {
                    if i >= source.len() || bytes[i] == b'\n' {
                        return Err(ParseError::at("Unterminated string literal", line, 1));
                    }
                    if bytes[i] == quote {
                        i += 1;
                        break;
                    }
                    if bytes[i] == b'\\' && i + 1 < source.len() {
                        let escaped = bytes[i + 1];
                        match escaped {
                            b'n' if quote == b'"' => text.push('\n'),
                            b't' if quote == b'"' => text.push('\t'),
                            _ => text.push(escaped as char),
                        }
                        i += 2;
                        continue;
                    }
                    let ch_len = source[i..].chars().next().map(char::len_utf8).unwrap_or(1);
                    text.push_str(&source[i..i + ch_len]);
                    i += ch_len;
                }
                push(TokenKind::Str(text), start, i, line);
            }
            b'@' => {
                let start = i;
                i += 1;
                let name_start = i;
                while i < source.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                push(
                    TokenKind::Ivar(source[name_start..i].to_string()),
                    start,
                    i,
                    line,
                );
            }
            b':' => {
                if source[i..].starts_with("::") {
                    push(TokenKind::Op("::".into()), i, i + 2, line);
                    i += 2;
                } else if i + 1 < source.len() && is_ident_start(bytes[i + 1]) {
                    let start = i;
                    i += 1;
                    let name_start = i;
                    while i < source.len() && is_ident_char(bytes[i]) {
                        i += 1;
                    }
                    push(
                        TokenKind::Sym(source[name_start..i].to_string()),
                        start,
                        i,
                        line,
                    );
                } else {
                    push(TokenKind::Op(":".into()), i, i + 1, line);
                    i += 1;
                }
            }
            b'0'..=b'9' => {
                let start = i;
                while i < source.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.' || bytes[i] == b'_')
                {
                    // `1.upto` must not eat the dot.
                    if bytes[i] == b'.'
                        && !source[i + 1..].starts_with(|ch: char| ch.is_ascii_digit())
                    {
                        break;
                    }
                    i += 1;
                }
                push(TokenKind::Num(source[start..i].to_string()), start, i, line);
            }
            b'(' => {
                push(TokenKind::LParen, i, i + 1, line);
                i += 1;
            }
            b')' => {
                push(TokenKind::RParen, i, i + 1, line);
                i += 1;
            }
            b'{' => {
                push(TokenKind::LBrace, i, i + 1, line);
                i += 1;
            }
            b'}' => {
                push(TokenKind::RBrace, i, i + 1, line);
                i += 1;
            }
            b',' => {
                push(TokenKind::Comma, i, i + 1, line);
                i += 1;
            }
            b'.' => {
                push(TokenKind::Dot, i, i + 1, line);
                i += 1;
            }
            b'|' if !source[i..].starts_with("||") => {
                push(TokenKind::Pipe, i, i + 1, line);
                i += 1;
            }
            _ if is_ident_start(c) => {
                let start = i;
                while i < source.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                // Method names may end in ? or !.
                if i < source.len() && bytes[i] == b'?' {
                    i += 1;
                } else if i < source.len() && bytes[i] == b'!' && !source[i..].starts_with("!=") {
                    i += 1;
                }
                let word = &source[start..i];
                // `key:` is a label even when `key` is a keyword.
                if i < source.len() && bytes[i] == b':' && !source[i..].starts_with("::") {
                    i += 1;
                    push(TokenKind::Label(word.to_string()), start, i, line);
                } else if let Some(kw) = keyword(word) {
                    push(TokenKind::Kw(kw), start, i, line);
                } else if word.starts_with(|ch: char| ch.is_ascii_uppercase()) {
                    push(TokenKind::Const(word.to_string()), start, i, line);
                } else {
                    push(TokenKind::Ident(word.to_string()), start, i, line);
                }
            }
            _ => {
                let start = i;
                let two = source.get(i..i + 2).unwrap_or("");
                let op = match two {
                    "==" | "!=" | "<=" | ">=" | "&&" | "||" | "**" | "=>" | "<<" => two,
                    _ => &source[i..i + source[i..].chars().next().map(char::len_utf8).unwrap_or(1)],
                };
                i += op.len();
                push(TokenKind::Op(op.to_string()), start, i, line);
            }
        }
    }

    Ok(tokens)
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

// ============================================================================
// AST
// ============================================================================

/// A pared-down Ruby AST covering what Phlex view code actually contains.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RubyNode {
    Str(String),
    Num(String),
    Sym(String),
    True,
    False,
    Nil,
    Lvar(String),
    Ivar(String),
    Const(String),
    Hash(Vec<(RubyNode, RubyNode)>),
    Send {
        receiver: Option<Box<RubyNode>>,
        method: String,
        args: Vec<RubyNode>,
    },
    Block {
        call: Box<RubyNode>,
        params: Vec<String>,
        body: Vec<RubyNode>,
    },
    If {
        condition: Box<RubyNode>,
        then_branch: Vec<RubyNode>,
        else_branch: Vec<RubyNode>,
    },
    Def {
        name: String,
        body: Vec<RubyNode>,
    },
    Class {
        name: String,
        body: Vec<RubyNode>,
    },
    /// Source text the grammar above could not represent, kept verbatim.
    Raw(String),
}

// ============================================================================
// PARSER
// ============================================================================

pub(crate) fn parse_program(source: &str) -> Result<Vec<RubyNode>, ParseError> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        source,
        tokens,
        index: 0,
    };
    Ok(parser.parse_statements(&[]))
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    index: usize,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.index).map(|t| &t.kind)
    }

    fn bump(&mut self) -> Option<TokenKind> {
        let kind = self.tokens.get(self.index).map(|t| t.kind.clone());
        if kind.is_some() {
            self.index += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: Kw) -> bool {
        self.eat(&TokenKind::Kw(kw))
    }

    fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::Newline) {}
    }

    fn at_kw(&self, kw: Kw) -> bool {
        self.peek() == Some(&TokenKind::Kw(kw))
    }

    /// Raw source from the current token to the end of its line.
    fn raw_to_eol(&mut self) -> String {
        let start = self
            .tokens
            .get(self.index)
            .map(|t| t.start)
            .unwrap_or(self.source.len());
        let mut end = start;
        while let Some(token) = self.tokens.get(self.index) {
            if matches!(token.kind, TokenKind::Newline) {
                break;
            }
            end = token.end;
            self.index += 1;
        }
        self.source[start..end].trim().to_string()
    }

    fn parse_statements(&mut self, stop: &[Kw]) -> Vec<RubyNode> {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            while self.eat(&TokenKind::Op(";".into())) {
                self.skip_newlines();
            }
            match self.peek() {
                None => break,
                Some(TokenKind::Kw(kw)) if stop.contains(kw) => break,
                _ => {}
            }
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
        }
        statements
    }

    fn parse_statement(&mut self) -> Option<RubyNode> {
        match self.peek()? {
            TokenKind::Kw(Kw::Class) => Some(self.parse_class()),
            TokenKind::Kw(Kw::Def) => Some(self.parse_def()),
            TokenKind::Kw(Kw::If) => Some(self.parse_if(false)),
            TokenKind::Kw(Kw::Unless) => Some(self.parse_if(true)),
            _ => {
                let start = self.index;
                match self.parse_expression() {
                    Some(expr) if self.at_statement_end() => Some(expr),
                    _ => {
                        // Out-of-grammar statement, keep its text verbatim.
                        self.index = start;
                        let raw = self.raw_to_eol();
                        if raw.is_empty() {
                            None
                        } else {
                            Some(RubyNode::Raw(raw))
                        }
                    }
                }
            }
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(TokenKind::Newline)
                | Some(TokenKind::Kw(Kw::End))
                | Some(TokenKind::Kw(Kw::Else))
                | Some(TokenKind::Kw(Kw::Elsif))
                | Some(TokenKind::RBrace)
        ) || self.peek() == Some(&TokenKind::Op(";".into()))
    }

    fn parse_class(&mut self) -> RubyNode {
        self.eat_kw(Kw::Class);
        let mut name = String::new();
        while let Some(TokenKind::Const(part)) = self.peek() {
            if !name.is_empty() {
                name.push_str("::");
            }
            name.push_str(part);
            self.index += 1;
            if !self.eat(&TokenKind::Op("::".into())) {
                break;
            }
        }
        // Superclass is irrelevant to template extraction.
        if self.eat(&TokenKind::Op("<".into())) {
            self.raw_to_eol();
        }
        let body = self.parse_statements(&[Kw::End]);
        self.eat_kw(Kw::End);
        RubyNode::Class { name, body }
    }

    fn parse_def(&mut self) -> RubyNode {
        self.eat_kw(Kw::Def);
        let name = match self.peek() {
            Some(TokenKind::Ident(n)) => {
                let n = n.clone();
                self.index += 1;
                n
            }
            _ => String::new(),
        };
        // Parameter list does not affect extraction.
        self.raw_to_eol();
        let body = self.parse_statements(&[Kw::End]);
        self.eat_kw(Kw::End);
        RubyNode::Def { name, body }
    }

    fn parse_if(&mut self, negated: bool) -> RubyNode {
        self.bump();
        let condition = self
            .parse_expression()
            .unwrap_or_else(|| RubyNode::Raw(self.raw_to_eol()));
        let body = self.parse_statements(&[Kw::End, Kw::Else, Kw::Elsif]);
        let else_branch = if self.at_kw(Kw::Elsif) {
            vec![self.parse_if(false)]
        } else if self.eat_kw(Kw::Else) {
            self.parse_statements(&[Kw::End])
        } else {
            Vec::new()
        };
        self.eat_kw(Kw::End);
        if negated {
            // `unless` swaps the branches of a plain `if`.
            RubyNode::If {
                condition: Box::new(condition),
                then_branch: else_branch,
                else_branch: body,
            }
        } else {
            RubyNode::If {
                condition: Box::new(condition),
                then_branch: body,
                else_branch,
            }
        }
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn parse_expression(&mut self) -> Option<RubyNode> {
        let mut left = self.parse_postfix()?;
        while let Some(TokenKind::Op(op)) = self.peek() {
            if !is_binary_op(op) {
                break;
            }
            let op = op.clone();
            self.index += 1;
            let right = self.parse_postfix()?;
            left = RubyNode::Send {
                receiver: Some(Box::new(left)),
                method: op,
                args: vec![right],
            };
        }
        Some(left)
    }

    fn parse_postfix(&mut self) -> Option<RubyNode> {
        let mut node = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let method = match self.bump() {
                    Some(TokenKind::Ident(name)) => name,
                    Some(TokenKind::Kw(Kw::Class)) => "class".to_string(),
                    _ => return None,
                };
                let args = if self.eat(&TokenKind::LParen) {
                    let args = self.parse_args(&TokenKind::RParen);
                    self.eat(&TokenKind::RParen);
                    args
                } else {
                    Vec::new()
                };
                node = RubyNode::Send {
                    receiver: Some(Box::new(node)),
                    method,
                    args,
                };
                continue;
            }
            if let Some(with_block) = self.try_parse_block(&node) {
                node = with_block;
                continue;
            }
            break;
        }
        Some(node)
    }

    fn parse_primary(&mut self) -> Option<RubyNode> {
        let token = self.peek()?.clone();
        match token {
            TokenKind::Str(text) => {
                self.index += 1;
                Some(RubyNode::Str(text))
            }
            TokenKind::Num(text) => {
                self.index += 1;
                Some(RubyNode::Num(text))
            }
            TokenKind::Sym(name) => {
                self.index += 1;
                Some(RubyNode::Sym(name))
            }
            TokenKind::Kw(Kw::True) => {
                self.index += 1;
                Some(RubyNode::True)
            }
            TokenKind::Kw(Kw::False) => {
                self.index += 1;
                Some(RubyNode::False)
            }
            TokenKind::Kw(Kw::Nil) => {
                self.index += 1;
                Some(RubyNode::Nil)
            }
            TokenKind::Ivar(name) => {
                self.index += 1;
                Some(RubyNode::Ivar(name))
            }
            TokenKind::Const(_) => {
                let mut name = String::new();
                while let Some(TokenKind::Const(part)) = self.peek() {
                    if !name.is_empty() {
                        name.push_str("::");
                    }
                    name.push_str(part);
                    self.index += 1;
                    if !self.eat(&TokenKind::Op("::".into())) {
                        break;
                    }
                }
                Some(RubyNode::Const(name))
            }
            TokenKind::LParen => {
                self.index += 1;
                let inner = self.parse_expression();
                self.eat(&TokenKind::RParen);
                inner
            }
            TokenKind::LBrace => {
                self.index += 1;
                let pairs = self.parse_hash_pairs(&TokenKind::RBrace);
                self.eat(&TokenKind::RBrace);
                Some(RubyNode::Hash(pairs))
            }
            TokenKind::Op(op) if op == "!" => {
                self.index += 1;
                let operand = self.parse_postfix()?;
                Some(RubyNode::Send {
                    receiver: Some(Box::new(operand)),
                    method: "!".to_string(),
                    args: vec![],
                })
            }
            TokenKind::Ident(name) => {
                self.index += 1;
                self.parse_bare_call(name)
            }
            _ => None,
        }
    }

    /// A bare identifier: local variable or paren-less method call.
    fn parse_bare_call(&mut self, name: String) -> Option<RubyNode> {
        if self.eat(&TokenKind::LParen) {
            let args = self.parse_args(&TokenKind::RParen);
            self.eat(&TokenKind::RParen);
            return Some(RubyNode::Send {
                receiver: None,
                method: name,
                args,
            });
        }
        // Paren-less arguments: `plain "text"`, `h1 class: "title"`.
        if self.starts_argument() {
            let args = self.parse_args(&TokenKind::Newline);
            return Some(RubyNode::Send {
                receiver: None,
                method: name,
                args,
            });
        }
        Some(RubyNode::Lvar(name))
    }

    fn starts_argument(&self) -> bool {
        matches!(
            self.peek(),
            Some(TokenKind::Str(_))
                | Some(TokenKind::Num(_))
                | Some(TokenKind::Sym(_))
                | Some(TokenKind::Ivar(_))
                | Some(TokenKind::Const(_))
                | Some(TokenKind::Ident(_))
                | Some(TokenKind::Label(_))
                | Some(TokenKind::Kw(Kw::True))
                | Some(TokenKind::Kw(Kw::False))
                | Some(TokenKind::Kw(Kw::Nil))
        )
    }

    /// Call arguments up to (not consuming) `closer`. Trailing keyword
    /// arguments collapse into a single hash, matching Ruby semantics.
    fn parse_args(&mut self, closer: &TokenKind) -> Vec<RubyNode> {
        let mut args = Vec::new();
        let mut pairs: Vec<(RubyNode, RubyNode)> = Vec::new();
        loop {
            self.skip_newlines_unless(closer);
            match self.peek() {
                None => break,
                Some(kind) if kind == closer => break,
                Some(TokenKind::Label(_)) => {
                    if let Some(TokenKind::Label(key)) = self.bump() {
                        if let Some(value) = self.parse_expression() {
                            pairs.push((RubyNode::Sym(key), value));
                        }
                    }
                }
                Some(TokenKind::LBrace) => {
                    self.index += 1;
                    let inner = self.parse_hash_pairs(&TokenKind::RBrace);
                    self.eat(&TokenKind::RBrace);
                    args.push(RubyNode::Hash(inner));
                }
                _ => match self.parse_expression() {
                    Some(expr) => args.push(expr),
                    None => break,
                },
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        if !pairs.is_empty() {
            args.push(RubyNode::Hash(pairs));
        }
        args
    }

    fn skip_newlines_unless(&mut self, closer: &TokenKind) {
        if closer != &TokenKind::Newline {
            self.skip_newlines();
        }
    }

    fn parse_hash_pairs(&mut self, closer: &TokenKind) -> Vec<(RubyNode, RubyNode)> {
        let mut pairs = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                None => break,
                Some(kind) if kind == closer => break,
                Some(TokenKind::Label(_)) => {
                    if let Some(TokenKind::Label(key)) = self.bump() {
                        if let Some(value) = self.parse_expression() {
                            pairs.push((RubyNode::Sym(key), value));
                        }
                    }
                }
                _ => {
                    // `:key => value` and `"key" => value` rockets.
                    let Some(key) = self.parse_expression() else {
                        break;
                    };
                    if self.eat(&TokenKind::Op("=>".into())) {
                        if let Some(value) = self.parse_expression() {
                            pairs.push((key, value));
                        }
                    }
                }
            }
            self.skip_newlines();
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        pairs
    }

    /// `do |x| ... end` and `{ ... }` blocks attached to a call.
    fn try_parse_block(&mut self, call: &RubyNode) -> Option<RubyNode> {
        if !matches!(call, RubyNode::Send { .. } | RubyNode::Lvar(_)) {
            return None;
        }
        let (open_brace, open_do) = (
            self.peek() == Some(&TokenKind::LBrace),
            self.at_kw(Kw::Do),
        );
        if !open_brace && !open_do {
            return None;
        }
        self.index += 1;

        let mut params = Vec::new();
        self.skip_newlines();
        if self.eat(&TokenKind::Pipe) {
            while let Some(TokenKind::Ident(param)) = self.peek() {
                params.push(param.clone());
                self.index += 1;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.eat(&TokenKind::Pipe);
        }

        let body = if open_brace {
            let body = self.parse_brace_body();
            self.eat(&TokenKind::RBrace);
            body
        } else {
            let body = self.parse_statements(&[Kw::End]);
            self.eat_kw(Kw::End);
            body
        };

        // A bare identifier with a block is a call after all.
        let call = match call.clone() {
            RubyNode::Lvar(name) => RubyNode::Send {
                receiver: None,
                method: name,
                args: vec![],
            },
            other => other,
        };
        Some(RubyNode::Block {
            call: Box::new(call),
            params,
            body,
        })
    }

    fn parse_brace_body(&mut self) -> Vec<RubyNode> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            while self.eat(&TokenKind::Op(";".into())) {
                self.skip_newlines();
            }
            match self.peek() {
                None | Some(TokenKind::RBrace) => break,
                _ => {}
            }
            match self.parse_expression() {
                Some(expr) => body.push(expr),
                None => {
                    body.push(RubyNode::Raw(self.raw_to_eol()));
                }
            }
        }
        body
    }
}

fn is_binary_op(op: &str) -> bool {
    matches!(
        op,
        "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" | "+" | "-" | "*" | "/" | "%"
    )
}

// ============================================================================
// UNPARSER
// ============================================================================

/// Renders an expression node back to Ruby source. Total and bounded: every
/// variant has a rendering, string literals come back quoted.
pub(crate) fn unparse(node: &RubyNode) -> String {
    match node {
        RubyNode::Str(text) => format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\"")),
        RubyNode::Num(text) => text.clone(),
        RubyNode::Sym(name) => format!(":{name}"),
        RubyNode::True => "true".to_string(),
        RubyNode::False => "false".to_string(),
        RubyNode::Nil => "nil".to_string(),
        RubyNode::Lvar(name) | RubyNode::Const(name) => name.clone(),
        RubyNode::Ivar(name) => format!("@{name}"),
        RubyNode::Hash(pairs) => {
            let inner = pairs
                .iter()
                .map(|(k, v)| match k {
                    RubyNode::Sym(name) => format!("{name}: {}", unparse(v)),
                    other => format!("{} => {}", unparse(other), unparse(v)),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {inner} }}")
        }
        RubyNode::Send {
            receiver,
            method,
            args,
        } => {
            if method == "!" {
                let recv = receiver.as_deref().map(unparse).unwrap_or_default();
                return format!("!{recv}");
            }
            if is_binary_op(method) {
                let left = receiver.as_deref().map(unparse).unwrap_or_default();
                let right = args.first().map(unparse).unwrap_or_default();
                return format!("{left} {method} {right}");
            }
            let prefix = receiver
                .as_deref()
                .map(|r| format!("{}.", unparse(r)))
                .unwrap_or_default();
            if args.is_empty() {
                format!("{prefix}{method}")
            } else {
                let rendered = args.iter().map(unparse).collect::<Vec<_>>().join(", ");
                format!("{prefix}{method}({rendered})")
            }
        }
        RubyNode::Block { call, .. } => unparse(call),
        RubyNode::If { condition, .. } => unparse(condition),
        RubyNode::Def { name, .. } => format!("def {name}"),
        RubyNode::Class { name, .. } => format!("class {name}"),
        RubyNode::Raw(text) => text.clone(),
    }
}
