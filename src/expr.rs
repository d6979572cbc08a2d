//! Expression reduction: turn a tree-builder [`Expression`] into a single
//! [`Value`], and resolve store (`→`) targets to an assignable location.
//!
//! The pipeline is `fill` → `validate` → `order` → `fold`, line-for-line
//! from `pitybas/expression.py`'s `Base.fill`/`validate`/`order`/`get`.

use crate::error::{ExecutionError, ExpressionError, InvalidOperationError};
use crate::priority::Priority;
use crate::token::{Expression, Node, Token, TokenKind, Tuple};
use crate::value::Value;
use crate::vm::Vm;

/// Reduce an already-flattened [`Node`] to a runtime [`Value`].
///
/// Dispatches on shape: a leaf token either yields its own value or is run
/// through [`get_leaf`]; an [`Expression`] is filled/validated/folded; a
/// [`Tuple`] has no single value (callers that want one per item should use
/// [`get_tuple`] instead) and is an error here.
pub fn get(node: &Node, vm: &mut Vm) -> crate::error::VmResult<Value> {
    match node {
        Node::Tok(t) => get_leaf(t, vm),
        Node::Expr(e) => get_expression(e, vm),
        Node::Tup(_) => Err(ExpressionError::new("tuple has no single value").into()),
    }
}

/// Entry point for callers (VM row dispatch, `stdlib` absorb handlers) that
/// don't know ahead of time whether `node` contains a top-level `→`. A bare
/// `Expression` with a `Store` token gets the assignment path; everything
/// else is a normal value fold.
pub fn eval(node: &Node, vm: &mut Vm) -> crate::error::VmResult<Value> {
    if let Node::Expr(e) = node {
        if e.nodes.iter().any(|n| matches!(n, Node::Tok(t) if t.kind == TokenKind::Store)) {
            return get_store(e, vm);
        }
    }
    get(node, vm)
}

/// Resolve each item of a [`Tuple`] independently (`Disp A, B`, function
/// call arguments, list/matrix literals).
pub fn get_tuple(tup: &Tuple, vm: &mut Vm) -> crate::error::VmResult<Vec<Value>> {
    tup.items.iter().map(|item| get(item, vm)).collect()
}

/// A store (`→`) target: where [`set`] should write the evaluated left side.
#[derive(Debug, Clone)]
pub enum Target {
    SimpleVar(char),
    StrVar(u8),
    ListRef(String),
    MatrixRef(String),
    IndexList(String, Box<Node>),
    IndexMatrix(String, Box<Node>, Box<Node>),
    /// `→dim(L1)`: storing resizes a list in place.
    DimList(String),
    DimMatrix(String),
    /// `→rand`: reseeds the shared random generator.
    Seed,
}

/// Write `value` into `target`, mirroring each leaf's own `set(vm, value)`
/// in `pitybas/tokens.py`.
pub fn set(target: &Target, value: Value, vm: &mut Vm) -> crate::error::VmResult<()> {
    match target {
        Target::SimpleVar(c) => vm.set_var(*c, value),
        Target::StrVar(n) => vm.set_str_var(*n, value.as_str()?.to_string()),
        Target::ListRef(name) => vm.set_list(name, value.as_list()?.to_vec()),
        Target::MatrixRef(name) => vm.set_matrix(name, value.as_matrix()?.to_vec()),
        Target::IndexList(name, idx) => {
            let i = get(idx, vm)?.as_i64()?;
            vm.set_list_index(name, i, value.as_f64()?)?;
        }
        Target::IndexMatrix(name, row, col) => {
            let r = get(row, vm)?.as_i64()?;
            let c = get(col, vm)?.as_i64()?;
            vm.set_matrix_index(name, r, c, value.as_f64()?)?;
        }
        Target::DimList(name) => {
            let n = value.as_i64()?;
            vm.resize_list(name, n);
        }
        Target::DimMatrix(name) => {
            let dims = value.as_list()?;
            if dims.len() != 2 {
                return Err(ExecutionError::new("dim( store to a matrix needs {rows, cols}").into());
            }
            vm.resize_matrix(name, dims[0] as i64, dims[1] as i64);
        }
        Target::Seed => vm.seed_rng(value.as_i64()?),
    }
    Ok(())
}

/// Resolve a (flattened) node to the store target it names, without
/// evaluating it as a value. Distinct from [`get`]: the right side of `→`
/// is a place, not an expression to run.
pub fn resolve_target(node: &Node, _vm: &mut Vm) -> crate::error::VmResult<Target> {
    let token = match node {
        Node::Tok(t) => t,
        _ => {
            return Err(ExpressionError::new("invalid store target").into());
        }
    };

    match &token.kind {
        TokenKind::SimpleVar(c) => Ok(Target::SimpleVar(*c)),
        TokenKind::StrVar(n) => Ok(Target::StrVar(*n)),
        TokenKind::ListRef(name) => Ok(Target::ListRef(name.clone())),
        TokenKind::MatrixRef(name) => Ok(Target::MatrixRef(name.clone())),
        TokenKind::IndexList(name) => {
            let arg = token
                .arg
                .as_ref()
                .ok_or_else(|| ExecutionError::new("list index store missing index"))?;
            let idx = single_arg(arg)?;
            Ok(Target::IndexList(name.clone(), Box::new(idx)))
        }
        TokenKind::IndexMatrix(name) => {
            let arg = token
                .arg
                .as_ref()
                .ok_or_else(|| ExecutionError::new("matrix index store missing indices"))?;
            let (row, col) = split_pair(arg)?;
            Ok(Target::IndexMatrix(name.clone(), Box::new(row), Box::new(col)))
        }
        TokenKind::DimFn => {
            let arg = token
                .arg
                .as_ref()
                .ok_or_else(|| ExecutionError::new("dim( store missing argument"))?;
            dim_target(arg)
        }
        TokenKind::RandBare => Ok(Target::Seed),
        TokenKind::ConstPi | TokenKind::ConstE | TokenKind::ConstAns => Err(
            InvalidOperationError::new(format!("cannot store to a constant: {:?}", token.kind)).into(),
        ),
        other => Err(ExpressionError::new(format!("{other:?} is not a valid store target")).into()),
    }
}

fn dim_target(arg: &Node) -> crate::error::VmResult<Target> {
    let inner_node = single_arg(arg)?.flatten();
    let Node::Tok(inner) = inner_node else {
        return Err(ExecutionError::new("dim( expects a list or matrix reference").into());
    };
    match inner.kind {
        TokenKind::ListRef(name) => Ok(Target::DimList(name)),
        TokenKind::MatrixRef(name) => Ok(Target::DimMatrix(name)),
        other => Err(ExecutionError::new(format!("dim( does not accept {other:?}")).into()),
    }
}

fn split_pair(arg: &Node) -> crate::error::VmResult<(Node, Node)> {
    match arg {
        Node::Tup(tup) if tup.items.len() == 2 => {
            Ok((tup.items[0].clone(), tup.items[1].clone()))
        }
        _ => Err(ExecutionError::new("matrix index needs exactly two arguments").into()),
    }
}

/// Pull the single item out of a one-element Arguments tuple (the shape
/// every unary function/index absorbs its argument as).
pub fn single_arg(arg: &Node) -> crate::error::VmResult<Node> {
    match arg {
        Node::Tup(tup) if tup.items.len() == 1 => Ok(tup.items[0].clone()),
        Node::Tup(_) => Err(ExecutionError::new("expected exactly one argument").into()),
        other => Ok(other.clone()),
    }
}

/// A leaf token: either a value outright, or a call into [`crate::stdlib`].
fn get_leaf(token: &Token, vm: &mut Vm) -> crate::error::VmResult<Value> {
    crate::stdlib::get(token, vm)
}

/// `Base.get`: fill, validate, then fold to one value via [`get`] on the
/// resulting single-element expression.
pub fn get_expression(expr: &Expression, vm: &mut Vm) -> crate::error::VmResult<Value> {
    let filled = fill(expr.nodes.clone())?;
    validate(&filled)?;
    let folded = fold(filled, vm)?;
    get(&folded, vm)
}

/// Evaluate the left side of `→` normally, then resolve the right side as a
/// store target and write through it. Returns the stored value (TI-BASIC's
/// `→` itself evaluates to what it stored).
pub fn get_store(expr: &Expression, vm: &mut Vm) -> crate::error::VmResult<Value> {
    let pos = expr
        .nodes
        .iter()
        .position(|n| matches!(n, Node::Tok(t) if t.kind == TokenKind::Store))
        .ok_or_else(|| ExpressionError::new("get_store called without a Store token"))?;

    let left = Expression {
        nodes: expr.nodes[..pos].to_vec(),
        bracket: None,
    };
    let value = get_expression(&left, vm)?;

    let mut remaining = expr.nodes[pos + 1..].to_vec();
    // Chained stores (`5→A→B`) resolve left to right: each target receives
    // the same value, and only the final target ends the chain.
    let mut targets = Vec::new();
    while let Some(next_store) = remaining
        .iter()
        .position(|n| matches!(n, Node::Tok(t) if t.kind == TokenKind::Store))
    {
        let before: Vec<Node> = remaining[..next_store].to_vec();
        if before.len() != 1 {
            return Err(ExpressionError::new("malformed chained store").into());
        }
        targets.push(before[0].clone());
        remaining = remaining[next_store + 1..].to_vec();
    }
    if remaining.len() != 1 {
        return Err(ExpressionError::new("store must end with exactly one target").into());
    }
    targets.push(remaining[0].clone());

    for target_node in &targets {
        let target = resolve_target(&target_node.clone().flatten(), vm)?;
        set(&target, value.clone(), vm)?;
    }

    Ok(value)
}

/// Unary-fill pass: postfix operators (`²`, `³`, `!`, transpose) pull a
/// sentinel right operand when none follows; `ᴇ` fills a missing left
/// operand with `1`. Mirrors `Base.fill`.
fn fill(nodes: Vec<Node>) -> crate::error::VmResult<Vec<Node>> {
    if nodes.is_empty() {
        return Ok(nodes);
    }

    // Each even index is expected to hold an operand. When it instead holds
    // an operator (true only for a postfix operator's vacated slot, or a
    // leading prefix like `ᴇ`), insert a sentinel operand ahead of it:
    // from the preceding postfix operator if it wants a right fill, else
    // from the current node itself if it wants a left fill.
    let mut new: Vec<Node> = Vec::with_capacity(nodes.len() + 2);
    for (i, node) in nodes.iter().enumerate() {
        if i % 2 == 0 && node.priority() != Priority::None {
            let mut left_fill = i > 0 && can_fill_right(&nodes[i - 1]);
            let right_fill = can_fill_left(node);

            if left_fill && right_fill && nodes[i - 1].priority() < node.priority() {
                left_fill = false;
            }

            if left_fill {
                new.push(filler_value());
            } else if right_fill {
                new.push(filler_one());
            }
        }

        new.push(node.clone());
    }

    if let Some(last) = new.last() {
        if last.priority() != Priority::None && can_fill_right(last) {
            new.push(filler_value());
        }
    }

    Ok(new)
}

fn filler_value() -> Node {
    Node::Tok(Token::new(TokenKind::Value(Value::Int(0)), 0))
}

fn filler_one() -> Node {
    Node::Tok(Token::new(TokenKind::Value(Value::Int(1)), 0))
}

fn can_fill_right(node: &Node) -> bool {
    matches!(node, Node::Tok(t) if t.kind.can_fill_right())
}

fn can_fill_left(node: &Node) -> bool {
    matches!(node, Node::Tok(t) if t.kind.can_fill_left())
}

/// Enforce `(operand, operator, operand, operator, ..., operand)` shape,
/// and that nothing but further stores follows a `Store` token. Mirrors
/// `Base.validate`.
fn validate(nodes: &[Node]) -> crate::error::VmResult<()> {
    if nodes.is_empty() {
        return Ok(());
    }

    for (i, node) in nodes.iter().enumerate() {
        let p = node.priority();
        if i % 2 == 0 && !p.is_operand() {
            return Err(ExpressionError::new(format!(
                "expected an operand at position {i}, got {node:?}"
            ))
            .into());
        }
        if i % 2 == 1 && !p.is_operator() {
            return Err(ExpressionError::new(format!(
                "expected an operator at position {i}, got {node:?}"
            ))
            .into());
        }
    }

    let mut found_store: Option<usize> = None;
    for (i, node) in nodes.iter().enumerate() {
        let is_store = matches!(node, Node::Tok(t) if t.kind == TokenKind::Store);
        if is_store {
            found_store = Some(i % 2);
        } else if let Some(parity) = found_store {
            if i % 2 == parity {
                return Err(ExpressionError::new(
                    "Store cannot be followed by non-Store tokens in expression",
                )
                .into());
            }
        }
    }

    Ok(())
}

/// Priority-bucketed index order the fold loop applies operators in.
/// Mirrors `Base.order`: stable within a bucket, buckets lowest-first.
fn order(nodes: &[Node]) -> Vec<usize> {
    let mut buckets: Vec<Vec<usize>> = Vec::new();
    for p in Priority::BINARY_ORDER {
        buckets.push(
            nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.priority() == p)
                .map(|(i, _)| i)
                .collect(),
        );
    }
    buckets.into_iter().flatten().collect()
}

/// Reduce `nodes` to a single-element vector by repeatedly applying the
/// operator at each ordered index to its immediate neighbors. Mirrors
/// `Base.get`'s fold loop, including its index-shift bookkeeping (operators
/// already folded shift everything after them left by two).
fn fold(nodes: Vec<Node>, vm: &mut Vm) -> crate::error::VmResult<Node> {
    if nodes.is_empty() {
        return Err(ExpressionError::new("empty expression").into());
    }
    if nodes.len() == 1 {
        return Ok(nodes.into_iter().next().unwrap());
    }

    let indices = order(&nodes);
    let mut expr = nodes;
    let mut processed: Vec<usize> = Vec::new();

    for orig_i in indices {
        let shift = processed.iter().filter(|&&p| p < orig_i).count();
        processed.push(orig_i);
        processed.push(orig_i + 1);

        let i = orig_i - shift;

        let right = expr.remove(i + 1);
        let left = expr.remove(i - 1);
        // the operator now sits at i - 1 after removing `left`
        let op_node = expr.remove(i - 1);
        let op_token = op_node
            .as_token()
            .cloned()
            .ok_or_else(|| ExpressionError::new("operator position did not hold a token"))?;

        let value = apply(&op_token, &left, &right, vm)?;
        expr.insert(i - 1, Node::Tok(Token::new(TokenKind::Value(value), op_token.line)));
    }

    Ok(expr.into_iter().next().unwrap())
}

/// Apply one binary operator to its (unevaluated) neighbors. `Store` gets
/// its own path via [`get_store`] upstream; everything else evaluates both
/// sides first and dispatches into [`crate::stdlib::binop`].
fn apply(op: &Token, left: &Node, right: &Node, vm: &mut Vm) -> crate::error::VmResult<Value> {
    if op.kind == TokenKind::Store {
        return Err(ExpressionError::new("Store must be handled by get_store, not fold").into());
    }
    let l = get(left, vm)?;
    let r = get(right, vm)?;
    crate::stdlib::binop(&op.kind, l, r)
}
