//! Control-flow statements: `If/Then/Else/End`, `While/Repeat/For/End`,
//! `Goto/Lbl`, `Menu`. Grounded line-for-line on
//! `original_source/pitybas/tokens.py`'s `If`/`Loop`/`While`/`Repeat`/`For`/
//! `End`/`Lbl`/`Goto` `run`/`resume` methods; `Menu` has no counterpart in
//! `original_source` and follows spec.md §4.4's description directly.

use crate::error::{ExecutionError, ExpressionError, VmResult};
use crate::io::MenuSection;
use crate::token::{Node, Token, TokenKind};
use crate::vm::{BlockEntry, BlockKind, Vm};

/// `If`: evaluate the condition, then either enter block form (cursor sits
/// on a `Then` right after the absorbed condition) or single-statement form
/// (the next statement runs inline, exactly once, iff the condition held).
///
/// Mirrors `If.run`: `vm.cur()` there is our `vm.cursor` right after the
/// `step()` that dispatched into this function already advanced past the
/// `If` token itself.
pub fn if_run(token: &Token, vm: &mut Vm) -> VmResult<()> {
    let cond = token
        .arg
        .as_ref()
        .ok_or_else(|| ExecutionError::new("If statement without condition"))?;
    let condition = crate::expr::eval(cond, vm)?.as_bool()?;

    let (if_line, if_col) = vm.running_top()?;
    let (end, els) = vm.find_end_and_else(if_line + 1, true)?;

    if cur_is_then(vm) {
        if condition {
            vm.push_block(BlockEntry {
                line: if_line,
                col: if_col,
                kind: BlockKind::If,
            });
            vm.inc(); // skip over Then, enter the body
            Ok(())
        } else if let Some((el_line, el_col)) = els {
            vm.push_block(BlockEntry {
                line: if_line,
                col: if_col,
                kind: BlockKind::If,
            });
            vm.goto(el_line, el_col)?;
            vm.inc(); // skip over Else, enter its body
            Ok(())
        } else if let Some((end_line, end_col)) = end {
            vm.goto(end_line, end_col)?;
            vm.inc();
            Ok(())
        } else {
            Err(ExecutionError::new("If/Then could not find a matching End").into())
        }
    } else if condition {
        vm.step()
    } else {
        vm.inc_row();
        Ok(())
    }
}

fn cur_is_then(vm: &Vm) -> bool {
    matches!(vm.peek_node(), Some(Node::Tok(t)) if t.kind == TokenKind::Then)
}

/// A standalone `Else` only ever runs reached by falling off the end of an
/// `If/Then` true-branch: pop that block, find the matching `End`, jump
/// past it.
pub fn else_run(vm: &mut Vm) -> VmResult<()> {
    vm.pop_block()?;
    let (end, _) = vm.find_end_and_else(vm.cursor.0, false)?;
    let (end_line, end_col) =
        end.ok_or_else(|| ExecutionError::new("Else could not find a matching End"))?;
    vm.goto(end_line, end_col)?;
    vm.inc();
    Ok(())
}

/// `End`: pop whatever block it closes and let that block decide what
/// happens next (a loop re-checks its condition; `If` just falls through).
pub fn end_run(vm: &mut Vm) -> VmResult<()> {
    let entry = vm.pop_block()?;
    vm.resume_block(entry)
}

/// First entry into a `While`/`Repeat`/`For` header. Re-winds the cursor to
/// the header's own position (undoing `step()`'s `inc()` past it) and
/// re-runs the same condition-check/push-or-skip logic `End` uses to
/// resume the loop — mirrors `Loop.run` calling straight into
/// `Loop.resume(vm, row, col)`.
pub fn loop_run(vm: &mut Vm) -> VmResult<()> {
    let (line, col) = vm.running_top()?;
    vm.goto(line, col)?;
    vm.run_loop_header(line, col)
}

/// `Menu(title, name1, label1, ..., nameN, labelN)`: present the choices
/// via the `Io` capability and `Goto` to whichever label was chosen.
pub fn menu_run(token: &Token, vm: &mut Vm) -> VmResult<()> {
    let vals = crate::stdlib::args(token, vm)?;
    if vals.len() < 3 || (vals.len() - 1) % 2 != 0 {
        return Err(ExecutionError::new(
            "Menu( expects (title, name, label, ...) in pairs",
        )
        .into());
    }
    let title = vals[0].to_string();
    let entries = vals[1..]
        .chunks(2)
        .map(|pair| (pair[0].to_string(), pair[1].to_string()))
        .collect();
    let section = MenuSection { title, entries };
    let chosen = vm
        .io_mut()
        .menu(std::slice::from_ref(&section))
        .map_err(|e| ExecutionError::new(format!("menu input failed: {e}")))?;
    vm.goto_to_label(&chosen)
}

/// Resolve a `Lbl`/`Goto` argument to the label string it names. Mirrors
/// `Lbl.guess_label`: a literal value's own text, a bare variable's own
/// letter (not its stored value), or — for anything else — the expression's
/// evaluated value, stringified.
pub fn guess_label(node: &Node, vm: &mut Vm) -> VmResult<String> {
    let flat = node.clone().flatten();
    match &flat {
        Node::Tok(t) => match &t.kind {
            TokenKind::Value(v) => Ok(v.to_string()),
            TokenKind::SimpleVar(c) => Ok(c.to_string()),
            _ => Ok(crate::expr::get(&flat, vm)?.to_string()),
        },
        Node::Expr(_) => Ok(crate::expr::get(&flat, vm)?.to_string()),
        Node::Tup(_) => Err(ExpressionError::new("a label cannot be a tuple").into()),
    }
}
