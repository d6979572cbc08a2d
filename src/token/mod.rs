//! Token and tree-node types shared by the lexer, tree builder, expression
//! reducer, and VM.

pub mod catalog;
pub mod kind;

pub use kind::TokenKind;

use crate::priority::Priority;

/// A single reserved token, plus whatever it absorbed from the rest of the
/// line (a function's argument tuple, a statement's trailing expression).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub arg: Option<Box<Node>>,
    /// Row this token was lexed on, for error messages and Goto targets.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Self {
            kind,
            arg: None,
            line,
        }
    }

    pub fn with_arg(kind: TokenKind, arg: Node, line: usize) -> Self {
        Self {
            kind,
            arg: Some(Box::new(arg)),
            line,
        }
    }

    pub fn priority(&self) -> Priority {
        self.kind.priority()
    }
}

/// One element of an [`Expression`] or [`Tuple`]: a leaf token, a nested
/// (already-reduced-to-one-item) expression, or a comma-delimited tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Tok(Token),
    Expr(Expression),
    Tup(Tuple),
}

impl Node {
    pub fn priority(&self) -> Priority {
        match self {
            Node::Tok(t) => t.priority(),
            Node::Expr(_) => Priority::None,
            Node::Tup(t) => t.kind.priority(),
        }
    }

    /// Collapse a length-1 [`Expression`] down to its sole content,
    /// recursively. Mirrors `pitybas/expression.py`'s `Base.flatten`.
    pub fn flatten(self) -> Node {
        match self {
            Node::Expr(mut e) if e.nodes.len() == 1 && e.bracket.is_none() => {
                e.nodes.pop().unwrap().flatten()
            }
            other => other,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Node::Tok(t) => Some(t),
            _ => None,
        }
    }
}

/// A run of operand/operator [`Node`]s awaiting reduction by
/// [`crate::expr`]. Corresponds to `pitybas/expression.py`'s `Expression`
/// (and, when `bracket` is `Some`, its `ParenExpr` subclass). `bracket`
/// holds the closing character expected (`)`), or `None` for a bare
/// top-level run of tokens (a statement's operand region).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    pub nodes: Vec<Node>,
    pub bracket: Option<char>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bracketed(close: char) -> Self {
        Self {
            nodes: Vec::new(),
            bracket: Some(close),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node, applying `pitybas/expression.py`'s `Base.append`
    /// rules: a lone leading `-` becomes `(-1) *`, and two adjacent
    /// operand-priority nodes get an implicit `*` between them (`+` if the
    /// second is a negative numeric literal, so `2 -3` parses as `2 + -3`).
    pub fn push(&mut self, node: Node) {
        use crate::priority::Priority;

        if self.nodes.len() == 1 {
            if let Node::Tok(t) = &self.nodes[0] {
                if t.kind == TokenKind::Minus {
                    let line = t.line;
                    self.nodes.clear();
                    self.nodes.push(Node::Tok(Token::new(
                        TokenKind::Value(crate::value::Value::Int(-1)),
                        line,
                    )));
                    self.nodes.push(Node::Tok(Token::new(TokenKind::Mult, line)));
                }
            }
        }

        if let Some(last) = self.nodes.last() {
            if last.priority() == Priority::None && node.priority() == Priority::None {
                let line = node_line(&node);
                let filler = if is_negative_literal(&node) {
                    TokenKind::Plus
                } else {
                    TokenKind::Mult
                };
                self.nodes.push(Node::Tok(Token::new(filler, line)));
            }
        }

        self.nodes.push(node);
    }
}

fn node_line(node: &Node) -> usize {
    match node {
        Node::Tok(t) => t.line,
        Node::Expr(e) => e.nodes.first().map(node_line).unwrap_or(0),
        Node::Tup(t) => t.items.first().map(node_line).unwrap_or(0),
    }
}

fn is_negative_literal(node: &Node) -> bool {
    match node {
        Node::Tok(Token {
            kind: TokenKind::Value(v),
            ..
        }) => match v {
            crate::value::Value::Int(i) => *i < 0,
            crate::value::Value::Float(f) => *f < 0.0,
            _ => false,
        },
        _ => false,
    }
}

/// What kind of comma-delimited container a [`Tuple`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleKind {
    /// A bare top-level tuple, e.g. `Disp A, B`'s `A, B`.
    Plain,
    /// A function call's argument list, `f(a, b)`.
    Arguments,
    /// A list literal, `{1, 2, 3}`.
    List,
    /// A matrix literal, outer level: rows.
    Matrix,
    /// A matrix literal, inner level: one row's elements.
    MatrixRow,
}

impl TupleKind {
    pub fn priority(self) -> Priority {
        match self {
            TupleKind::List | TupleKind::Matrix => Priority::None,
            TupleKind::Plain | TupleKind::Arguments | TupleKind::MatrixRow => Priority::Invalid,
        }
    }
}

/// A comma-delimited sequence of items. Each item is usually a
/// (post-flatten) `Expression`, except matrix rows, which are themselves
/// nested `Tuple`s of elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tuple {
    pub items: Vec<Node>,
    pub kind: TupleKind,
}

impl Default for TupleKind {
    fn default() -> Self {
        TupleKind::Plain
    }
}

impl Tuple {
    pub fn new(kind: TupleKind) -> Self {
        Self {
            items: Vec::new(),
            kind,
        }
    }
}
