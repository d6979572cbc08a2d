//! I/O statements: `Disp`, `Output(`, `Prompt`, `Input`, `Pause`, `Fix`.
//! Grounded on `original_source/pitybas/tokens.py`'s `Disp`/`Output`/
//! `Prompt`/`Input`/`Pause` `run` methods, routed through the `Io`
//! capability (`src/io/mod.rs`) instead of bare `print`/`input`.

use crate::error::{ExecutionError, VmResult};
use crate::token::{Node, Token, TokenKind};
use crate::value::Value;
use crate::vm::Vm;

/// `Disp` with no arguments blank-lines the screen; `Disp A, B, "hi"` shows
/// each item on its own line (spec.md §4.5: "list of items,
/// newline-separated"), one `Io::disp` call per item.
pub fn disp(token: &Token, vm: &mut Vm) -> VmResult<()> {
    match &token.arg {
        None => {
            vm.io_mut().disp(&Value::Str(String::new()));
            Ok(())
        }
        Some(arg) => {
            for item in flatten_args(arg) {
                let value = crate::expr::get(&item, vm)?;
                let value = apply_fixed(value, vm.fixed);
                vm.io_mut().disp(&value);
            }
            Ok(())
        }
    }
}

/// `Output(row, col, value)`: absolute-positioned write, 1-based.
pub fn output(token: &Token, vm: &mut Vm) -> VmResult<()> {
    let vals = crate::stdlib::args(token, vm)?;
    if vals.len() != 3 {
        return Err(ExecutionError::new("Output( expects (row, col, value)").into());
    }
    let row = vals[0].as_i64()?;
    let col = vals[1].as_i64()?;
    if row < 1 || col < 1 {
        return Err(ExecutionError::new("Output( row/col are 1-based").into());
    }
    let value = apply_fixed(vals[2].clone(), vm.fixed);
    vm.io_mut().output(row as usize, col as usize, &value);
    Ok(())
}

/// Round a numeric value to `vm.fixed` decimal places and render it with
/// that many digits (padding trailing zeros, unlike `Value`'s bare
/// `Display`), per spec.md §3/§4.5's "`fixed`: display rounding precision".
/// `fixed < 0` (the `Float` default) leaves `value` untouched. Non-numeric
/// values (strings, lists, matrices) are never affected.
fn apply_fixed(value: Value, fixed: i32) -> Value {
    if fixed < 0 {
        return value;
    }
    let n = fixed as usize;
    match value {
        Value::Int(i) => Value::Str(format!("{:.n$}", i as f64)),
        Value::Float(f) => Value::Str(format!("{:.n$}", f)),
        Value::Complex(c) if c.im >= 0.0 => Value::Str(format!("{:.n$}+{:.n$}i", c.re, c.im)),
        Value::Complex(c) => Value::Str(format!("{:.n$}{:.n$}i", c.re, c.im)),
        other => other,
    }
}

/// `Prompt A` / `Prompt A, B, C`: one line of input per named variable,
/// echoing `A=?` the way the real calculator does.
pub fn prompt(token: &Token, vm: &mut Vm) -> VmResult<()> {
    let arg = token
        .arg
        .as_ref()
        .ok_or_else(|| ExecutionError::new("Prompt without a variable"))?;
    for item in flatten_args(arg) {
        prompt_one(&item, vm)?;
    }
    Ok(())
}

fn prompt_one(node: &Node, vm: &mut Vm) -> VmResult<()> {
    let flat = node.clone().flatten();
    let Node::Tok(t) = &flat else {
        return Err(ExecutionError::new("Prompt target must be a variable").into());
    };
    let name = var_display_name(&t.kind)?;
    let text = vm
        .io_mut()
        .input(&format!("{name}=?"), matches!(t.kind, TokenKind::StrVar(_)))
        .map_err(|e| ExecutionError::new(format!("input failed: {e}")))?;
    parse_input_value(&t.kind, &text, vm)
}

/// `Input` (no args): prompt with a bare `?`. `Input "msg", A`: show `msg`
/// then read into `A`. `Input A`: same as `Prompt A` but with `?` instead
/// of `A=?`.
pub fn input_stmt(token: &Token, vm: &mut Vm) -> VmResult<()> {
    let Some(arg) = &token.arg else {
        vm.io_mut()
            .input("?", false)
            .map_err(|e| ExecutionError::new(format!("input failed: {e}")))?;
        return Ok(());
    };
    let items = flatten_args(arg);
    match items.as_slice() {
        [single] => prompt_with_message(single, "?", vm),
        [msg, var] => {
            let message = crate::expr::get(msg, vm)?.as_str()?.to_string();
            prompt_with_message(var, &message, vm)
        }
        _ => Err(ExecutionError::new("Input expects at most (message, variable)").into()),
    }
}

fn prompt_with_message(node: &Node, message: &str, vm: &mut Vm) -> VmResult<()> {
    let flat = node.clone().flatten();
    let Node::Tok(t) = &flat else {
        return Err(ExecutionError::new("Input target must be a variable").into());
    };
    let text = vm
        .io_mut()
        .input(message, matches!(t.kind, TokenKind::StrVar(_)))
        .map_err(|e| ExecutionError::new(format!("input failed: {e}")))?;
    parse_input_value(&t.kind, &text, vm)
}

fn var_display_name(kind: &TokenKind) -> VmResult<String> {
    match kind {
        TokenKind::SimpleVar(c) => Ok(c.to_string()),
        TokenKind::StrVar(n) => Ok(format!("Str{n}")),
        TokenKind::ListRef(name) => Ok(name.clone()),
        other => Err(ExecutionError::new(format!("{other:?} is not a promptable variable")).into()),
    }
}

fn parse_input_value(kind: &TokenKind, text: &str, vm: &mut Vm) -> VmResult<()> {
    match kind {
        TokenKind::SimpleVar(c) => {
            let value = text
                .trim()
                .parse::<f64>()
                .map_err(|_| ExecutionError::new(format!("not a number: {text}")))?;
            vm.set_var(*c, Value::from_f64(value));
            Ok(())
        }
        TokenKind::StrVar(n) => {
            vm.set_str_var(*n, text.to_string());
            Ok(())
        }
        other => Err(ExecutionError::new(format!("{other:?} is not a promptable variable")).into()),
    }
}

/// `Pause` alone blocks until Enter; `Pause value` shows `value` first.
pub fn pause(token: &Token, vm: &mut Vm) -> VmResult<()> {
    match &token.arg {
        None => {
            vm.io_mut().pause(None);
            Ok(())
        }
        Some(arg) => {
            let value = crate::expr::eval(arg, vm)?;
            let value = apply_fixed(value, vm.fixed);
            vm.io_mut().pause(Some(&value));
            Ok(())
        }
    }
}

/// `Fix n`: set the display's fixed-decimal count. `-1` means unfixed
/// (the default, also restored by `Float`); stored on the `Vm` for the
/// display layer to consult (spec.md §4.5).
pub fn fix(token: &Token, vm: &mut Vm) -> VmResult<()> {
    let arg = token
        .arg
        .as_ref()
        .ok_or_else(|| ExecutionError::new("Fix without an argument"))?;
    let n = crate::expr::eval(arg, vm)?.as_i64()?;
    if !(0..=9).contains(&n) {
        return Err(ExecutionError::new("Fix expects 0-9").into());
    }
    vm.fixed = n as i32;
    Ok(())
}

/// A comma-joined argument list splits into its individual nodes; a bare
/// single node is its own one-element list.
fn flatten_args(node: &Node) -> Vec<Node> {
    match node {
        Node::Tup(tup) => tup.items.clone(),
        other => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_display_name_formats_string_vars() {
        assert_eq!(var_display_name(&TokenKind::StrVar(1)).unwrap(), "Str1");
    }
}
