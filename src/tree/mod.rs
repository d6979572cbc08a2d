//! Tree builder: groups the lexer's flat [`RawToken`] stream into rows of
//! [`Node`]s, managing the bracket/tuple/function-argument stack and
//! applying the implicit-multiplication and absorb rules described in
//! spec.md §4.2.
//!
//! Grounded on `pitybas/parse.py`'s `Parser.parse`/`Parser.post`/`Parser.add`,
//! adapted from "mutate a shared Python object in place" to "defer placement
//! of a function/absorbing token until its argument is fully parsed", since
//! Rust has no equivalent to rebinding a live reference already embedded in
//! the tree (see DESIGN.md).

use crate::error::ParseError;
use crate::lexer::{Lexer, RawToken};
use crate::token::kind::TokenKind;
use crate::token::{Expression, Node, Token, Tuple, TupleKind};

/// One `:`/newline-delimited statement, already reduced to its top-level
/// nodes (statements and/or a trailing expression/tuple).
pub type Row = Vec<Node>;

/// A fully built program: one [`Row`] per statement, in source order.
pub type Code = Vec<Row>;

/// A frame on the builder's open-bracket/tuple stack.
enum Frame {
    /// A parenthesized sub-expression, e.g. `(A+B)`.
    Expr(Expression),
    /// A comma-delimited tuple: function arguments, a list/matrix literal,
    /// or a bare top-level tuple promoted by a comma. `close` is the
    /// expected closing character (`None` for a bare promoted tuple, which
    /// has no bracket of its own). `owner`, when present, is the function
    /// (or indexing) token awaiting this tuple as its absorbed argument.
    Tup {
        tup: Tuple,
        close: Option<char>,
        owner: Option<Token>,
    },
}

pub struct Builder {
    lexer: Lexer,
    stack: Vec<Frame>,
    row: Row,
    code: Code,
    /// `true` when the next raw token may be an operand (start of row,
    /// right after an operator/open-bracket/comma) — controls whether a
    /// bare `-` fuses into a numeric literal in the lexer.
    operand_context: bool,
}

impl Builder {
    pub fn new(source: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            stack: Vec::new(),
            row: Vec::new(),
            code: Vec::new(),
            operand_context: true,
        }
    }

    pub fn build(source: &str) -> Result<Code, ParseError> {
        Builder::new(source).run()
    }

    fn line(&self) -> usize {
        self.lexer.line
    }

    pub fn run(mut self) -> Result<Code, ParseError> {
        loop {
            let raw = self.lexer.next_raw(self.operand_context)?;
            match raw {
                RawToken::Eof => {
                    self.close_all()?;
                    self.finish_row()?;
                    break;
                }
                RawToken::RowBreak => {
                    self.close_all()?;
                    self.finish_row()?;
                }
                RawToken::Open(c) => self.open(c)?,
                RawToken::Close(c) => self.close(c)?,
                RawToken::Comma => self.comma()?,
                RawToken::Number(v) => {
                    self.operand_context = false;
                    self.push_leaf(Node::Tok(Token::new(TokenKind::Value(v), self.line())))?;
                }
                RawToken::Str(s) => {
                    self.operand_context = false;
                    self.push_leaf(Node::Tok(Token::new(
                        TokenKind::Value(crate::value::Value::Str(s)),
                        self.line(),
                    )))?;
                }
                RawToken::ListName(name) => {
                    self.operand_context = false;
                    self.push_name_ref(TokenKind::ListRef(name), TokenKind::IndexList)?;
                }
                RawToken::MatrixName(name) => {
                    self.operand_context = false;
                    self.push_name_ref(TokenKind::MatrixRef(name), TokenKind::IndexMatrix)?;
                }
                RawToken::Reserved(kind) => self.reserved(kind)?,
            }
        }
        Ok(self.code)
    }

    /// A reference to a whole list/matrix (`∟L1`, `[A]`) becomes an
    /// indexing operation when immediately followed by `(` — mirrors how a
    /// function token opens argument mode, since `L1(3)` and `sin(3)` share
    /// the same "absorb one Arguments" shape.
    fn push_name_ref(
        &mut self,
        whole: TokenKind,
        indexed: impl FnOnce(String) -> TokenKind,
    ) -> Result<(), ParseError> {
        if self.lexer.peek_char() == Some('(') {
            let name = match &whole {
                TokenKind::ListRef(n) | TokenKind::MatrixRef(n) => n.clone(),
                _ => unreachable!(),
            };
            self.reserved(indexed(name))
        } else {
            self.push_leaf(Node::Tok(Token::new(whole, self.line())))
        }
    }

    fn reserved(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        self.operand_context = matches!(
            kind,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Mult
                | TokenKind::Div
                | TokenKind::Pow
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Xor
                | TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Le
                | TokenKind::Ge
                | TokenKind::Store
                | TokenKind::Not
        ) || kind.is_function();

        let token = Token::new(kind.clone(), self.line());

        if kind.is_function() {
            // The `(` is already consumed as part of the catalog spelling
            // (`sin(`, `For(`, ...); enter argument-collection mode and
            // defer placing this token until its Arguments frame closes.
            self.stack.push(Frame::Tup {
                tup: Tuple::new(TupleKind::Arguments),
                close: Some(')'),
                owner: Some(token),
            });
            Ok(())
        } else if kind == TokenKind::Store {
            // A store closes any brackets still open on its left (matches
            // `pitybas/parse.py`'s `if isinstance(result, tokens.Store):
            // self.close_brackets()`), so `(A+B→C` and `A+B→C` behave the
            // same — stores are always written at bracket-neutral depth.
            self.close_all()?;
            self.push_leaf(Node::Tok(token))
        } else {
            self.push_leaf(Node::Tok(token))
        }
    }

    fn open(&mut self, c: char) -> Result<(), ParseError> {
        self.operand_context = true;
        match c {
            '(' => {
                self.stack.push(Frame::Expr(Expression::bracketed(')')));
            }
            '{' => {
                self.stack.push(Frame::Tup {
                    tup: Tuple::new(TupleKind::List),
                    close: Some('}'),
                    owner: None,
                });
            }
            '[' => {
                let kind = if matches!(self.stack.last(), Some(Frame::Tup { tup, .. }) if tup.kind == TupleKind::Matrix)
                {
                    TupleKind::MatrixRow
                } else {
                    TupleKind::Matrix
                };
                self.stack.push(Frame::Tup {
                    tup: Tuple::new(kind),
                    close: Some(']'),
                    owner: None,
                });
            }
            _ => unreachable!("lexer only opens '(', '{', '['"),
        }
        Ok(())
    }

    fn comma(&mut self) -> Result<(), ParseError> {
        self.operand_context = true;
        match self.stack.last_mut() {
            Some(Frame::Tup { tup, .. }) => {
                finish_active_item(tup);
                tup.items.push(Node::Expr(Expression::new()));
                Ok(())
            }
            Some(Frame::Expr(e)) if e.bracket.is_some() => Err(ParseError::new(
                "comma inside a parenthesized expression",
                self.line(),
            )),
            _ => {
                let last = self
                    .row
                    .pop()
                    .ok_or_else(|| ParseError::new("comma with nothing to tuple", self.line()))?;
                let mut tup = Tuple::new(TupleKind::Plain);
                tup.items.push(last.flatten());
                tup.items.push(Node::Expr(Expression::new()));
                self.stack.push(Frame::Tup {
                    tup,
                    close: None,
                    owner: None,
                });
                Ok(())
            }
        }
    }

    fn close(&mut self, c: char) -> Result<(), ParseError> {
        self.operand_context = false;
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| ParseError::new(format!("unmatched closing '{c}'"), self.line()))?;
        match frame {
            Frame::Expr(mut e) => {
                if e.bracket != Some(c) {
                    return Err(ParseError::new(
                        format!("expected '{}' but found '{c}'", e.bracket.unwrap_or(' ')),
                        self.line(),
                    ));
                }
                e.bracket = None;
                self.push_leaf(Node::Expr(e).flatten())
            }
            Frame::Tup {
                mut tup,
                close,
                owner,
            } => {
                if close != Some(c) {
                    return Err(ParseError::new(
                        format!("expected '{}' but found '{c}'", close.unwrap_or(' ')),
                        self.line(),
                    ));
                }
                finish_active_item(&mut tup);
                match owner {
                    Some(mut token) => {
                        token.arg = Some(Box::new(Node::Tup(tup)));
                        self.push_leaf(Node::Tok(token))
                    }
                    None => {
                        if tup.kind == TupleKind::MatrixRow {
                            // Rows attach directly to the enclosing matrix,
                            // not via a comma — see `open`.
                            if let Some(Frame::Tup { tup: outer, .. }) = self.stack.last_mut() {
                                outer.items.push(Node::Tup(tup));
                                Ok(())
                            } else {
                                Err(ParseError::new(
                                    "matrix row outside of a matrix literal",
                                    self.line(),
                                ))
                            }
                        } else {
                            self.push_leaf(Node::Tup(tup))
                        }
                    }
                }
            }
        }
    }

    /// Unwind every remaining open frame (matches `Parser.close_brackets`),
    /// used at row boundaries where an unterminated bracket is forgiven the
    /// same way the original implementation forgives it.
    fn close_all(&mut self) -> Result<(), ParseError> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Expr(mut e) => {
                    e.bracket = None;
                    self.push_leaf(Node::Expr(e).flatten())?;
                }
                Frame::Tup {
                    mut tup, owner, ..
                } => {
                    finish_active_item(&mut tup);
                    match owner {
                        Some(mut token) => {
                            token.arg = Some(Box::new(Node::Tup(tup)));
                            self.push_leaf(Node::Tok(token))?;
                        }
                        None => self.push_leaf(Node::Tup(tup))?,
                    }
                }
            }
        }
        Ok(())
    }

    /// Append a completed node to whatever is currently accumulating it:
    /// the top-of-stack frame if any are open, else the current row.
    fn push_leaf(&mut self, node: Node) -> Result<(), ParseError> {
        match self.stack.last_mut() {
            Some(Frame::Expr(e)) => {
                e.push(node);
                Ok(())
            }
            Some(Frame::Tup { tup, .. }) => {
                if tup.items.is_empty() {
                    tup.items.push(Node::Expr(Expression::new()));
                }
                match tup.items.last_mut() {
                    Some(Node::Expr(e)) => {
                        e.push(node);
                        Ok(())
                    }
                    _ => unreachable!("active tuple item is always an Expression"),
                }
            }
            None => {
                self.row.push(node);
                Ok(())
            }
        }
    }

    fn finish_row(&mut self) -> Result<(), ParseError> {
        if self.row.is_empty() {
            self.operand_context = true;
            return Ok(());
        }
        let row = std::mem::take(&mut self.row);
        let grouped = group_expressions(row);
        let promoted = promote_tuples(grouped);
        let absorbed = absorb(promoted);
        self.code.push(absorbed);
        self.operand_context = true;
        Ok(())
    }
}

/// Flatten a freshly-closed tuple's last (still-active) item in place.
fn finish_active_item(tup: &mut Tuple) {
    if let Some(last) = tup.items.pop() {
        tup.items.push(last.flatten());
    }
}

/// Pass 1 of spec.md §4.2's `post` step: group maximal runs of
/// operand/operator-priority nodes into a single [`Expression`], leaving
/// `Priority::Invalid` nodes (statements, bare tuples) standing alone.
fn group_expressions(row: Row) -> Row {
    let mut out = Row::new();
    let mut current: Option<Expression> = None;
    for node in row {
        if node.priority() > crate::priority::Priority::Invalid {
            current.get_or_insert_with(Expression::new).push(node);
        } else {
            if let Some(e) = current.take() {
                out.push(Node::Expr(e).flatten());
            }
            out.push(node);
        }
    }
    if let Some(e) = current.take() {
        out.push(Node::Expr(e).flatten());
    }
    out
}

/// Pass 2: fold a dangling `Expression` directly preceding a `Tuple` into
/// the tuple's first element (spec.md §4.2 "Tuple promotion"), so
/// `Disp A+B, C` disp's two items (`A+B` and `C`), not an expression and a
/// tuple.
fn promote_tuples(row: Row) -> Row {
    let mut out: Row = Vec::with_capacity(row.len());
    let mut iter = row.into_iter().peekable();
    while let Some(node) = iter.next() {
        if let Node::Expr(e) = &node {
            if matches!(iter.peek(), Some(Node::Tup(_))) {
                let Some(Node::Tup(mut tup)) = iter.next() else {
                    unreachable!()
                };
                let mut merged = e.clone();
                if let Some(Node::Expr(first)) = tup.items.first().cloned() {
                    for n in first.nodes {
                        merged.push(n);
                    }
                } else if let Some(first) = tup.items.first().cloned() {
                    merged.push(first);
                }
                if tup.items.is_empty() {
                    tup.items.push(Node::Expr(merged).flatten());
                } else {
                    tup.items[0] = Node::Expr(merged).flatten();
                }
                out.push(Node::Tup(tup));
                continue;
            }
        }
        out.push(node);
    }
    out
}

/// Pass 3: let the row's leading statement token absorb the trailing
/// expression/tuple that belongs to it (spec.md §4.2 "Absorb pass").
fn absorb(mut row: Row) -> Row {
    if row.len() < 2 {
        return row;
    }
    let Node::Tok(head) = &row[0] else {
        return row;
    };
    if !head.kind.wants_line_absorb() {
        return row;
    }
    let arg = row.remove(1).flatten();
    if let Node::Tok(head) = &mut row[0] {
        head.arg = Some(Box::new(arg));
    }
    row
}
