//! List and matrix operations: `dim(`, indexed get (`L1(i)`, `[A](r,c)`),
//! and postfix transpose (`_T`). Grounded on spec.md §4.5's "Lists"/
//! "Matrices" bullets — `original_source/pitybas` has no list/matrix
//! support to draw exact semantics from, so indexing is 1-based per
//! spec.md and out-of-range is an `ExecutionError`, matching every other
//! bounds check in `vm::Vm`.

use crate::error::{ExecutionError, VmResult};
use crate::token::{Node, Token, TokenKind};
use crate::value::Value;
use crate::vm::Vm;

/// `dim(list)` / `dim(matrix)`: length, or `{rows, cols}`.
pub fn dim_get(token: &Token, vm: &mut Vm) -> VmResult<Value> {
    let arg = token
        .arg
        .as_ref()
        .ok_or_else(|| ExecutionError::new("dim( called without an argument"))?;
    let inner = crate::expr::single_arg(arg)?.flatten();
    match &inner {
        Node::Tok(t) => match &t.kind {
            TokenKind::ListRef(name) => Ok(Value::Int(vm.list_len(name))),
            TokenKind::MatrixRef(name) => {
                let (rows, cols) = vm.matrix_dims(name);
                Ok(Value::List(vec![rows as f64, cols as f64]))
            }
            _ => dim_of_value(crate::expr::get(&inner, vm)?),
        },
        _ => dim_of_value(crate::expr::get(&inner, vm)?),
    }
}

fn dim_of_value(value: Value) -> VmResult<Value> {
    match value {
        Value::List(l) => Ok(Value::Int(l.len() as i64)),
        Value::Matrix(m) => {
            let cols = m.first().map(|r| r.len()).unwrap_or(0);
            Ok(Value::List(vec![m.len() as f64, cols as f64]))
        }
        other => Err(ExecutionError::new(format!("dim( does not accept {other}")).into()),
    }
}

/// `L1(i)`: 1-based indexed read.
pub fn index_list_get(name: &str, token: &Token, vm: &mut Vm) -> VmResult<Value> {
    let vals = crate::stdlib::args(token, vm)?;
    if vals.len() != 1 {
        return Err(ExecutionError::new("list index expects exactly one argument").into());
    }
    let idx = vals[0].as_i64()?;
    Ok(Value::from_f64(vm.get_list_index(name, idx)?))
}

/// `[A](row, col)`: 1-based indexed read.
pub fn index_matrix_get(name: &str, token: &Token, vm: &mut Vm) -> VmResult<Value> {
    let vals = crate::stdlib::args(token, vm)?;
    if vals.len() != 2 {
        return Err(ExecutionError::new("matrix index expects exactly two arguments").into());
    }
    let row = vals[0].as_i64()?;
    let col = vals[1].as_i64()?;
    Ok(Value::from_f64(vm.get_matrix_index(name, row, col)?))
}

/// Postfix `_T`: matrix transpose. The unary-fill sentinel right operand is
/// ignored, same as `²`/`³`/`!`.
pub fn transpose(value: Value) -> VmResult<Value> {
    let m = value.as_matrix()?;
    if m.is_empty() {
        return Ok(Value::Matrix(Vec::new()));
    }
    let rows = m.len();
    let cols = m[0].len();
    let mut out = vec![vec![0.0; rows]; cols];
    for (r, row) in m.iter().enumerate() {
        for (c, &x) in row.iter().enumerate() {
            out[c][r] = x;
        }
    }
    Ok(Value::Matrix(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_swaps_dimensions() {
        let m = Value::Matrix(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let t = transpose(m).unwrap();
        assert_eq!(
            t,
            Value::Matrix(vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]])
        );
    }
}
