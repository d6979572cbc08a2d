//! Concrete `run`/`get` bodies for every [`TokenKind`], grouped by spec.md
//! §4.5's categories. [`run`] and [`get`] are the two entry points the VM
//! and expression reducer dispatch into; [`binop`] handles the binary
//! operator family (arithmetic, probability infix, boolean, logic).
//!
//! Grounded on `original_source/pitybas/tokens.py`'s per-class `run`/`get`
//! methods, translated from "virtual method on a token subclass" to "match
//! arm over `TokenKind`" per spec.md §9's suggested alternative (a).

pub mod arithmetic;
pub mod collections;
pub mod control;
pub mod io_ops;
pub mod logic;
pub mod probability;
pub mod trig;

use std::f64::consts::{E, PI};

use crate::error::{ExecutionError, VmResult};
use crate::token::{Token, TokenKind};
use crate::value::Value;
use crate::vm::Vm;

/// Evaluate a leaf token: a literal, a variable/constant read, a
/// list/matrix reference or index, or a function-form call (absorbed
/// `Arguments` already attached to `token.arg`).
pub fn get(token: &Token, vm: &mut Vm) -> VmResult<Value> {
    use TokenKind::*;
    match &token.kind {
        Value(v) => Ok(v.clone()),
        SimpleVar(c) => vm.get_var(*c),
        StrVar(n) => Ok(Value::Str(vm.get_str_var(*n)?)),
        ConstPi => Ok(Value::Float(PI)),
        ConstE => Ok(Value::Float(E)),
        ConstAns => Ok(vm.get_ans()),
        ListRef(name) => Ok(Value::List(vm.get_list(name)?)),
        MatrixRef(name) => Ok(Value::Matrix(vm.get_matrix(name)?)),
        GetKey => Ok(Value::Int(vm.io_mut().getkey() as i64)),
        RandBare => Ok(Value::from_f64(probability::uniform(vm))),

        Sqrt => arithmetic::sqrt(one_arg(token, vm)?),
        CubeRoot => arithmetic::cube_root(one_arg(token, vm)?),
        Abs => arithmetic::abs(one_arg(token, vm)?),
        IntFn => arithmetic::int_fn(one_arg(token, vm)?),
        IPart => arithmetic::i_part(one_arg(token, vm)?),
        FPart => arithmetic::f_part(one_arg(token, vm)?),
        Floor => arithmetic::floor(one_arg(token, vm)?),
        Ceiling => arithmetic::ceiling(one_arg(token, vm)?),
        ModFn => {
            let args = args(token, vm)?;
            two_arg_values(&args, "mod(").and_then(|(a, b)| arithmetic::mod_fn(a, b))
        }
        Round => {
            let args = args(token, vm)?;
            match args.len() {
                1 => arithmetic::round(args[0].clone(), None),
                2 => arithmetic::round(args[0].clone(), Some(args[1].clone())),
                n => Err(ExecutionError::new(format!("round( expects 1 or 2 arguments, got {n}")).into()),
            }
        }
        Not => logic::not(one_arg(token, vm)?),

        RandFn => probability::rand_fn(token, vm),
        RandInt => probability::rand_int(token, vm),
        RandNorm => probability::rand_norm(token, vm),
        RandBin | RandM => Err(ExecutionError::new(format!("{:?} is not implemented", token.kind)).into()),

        Sin => trig::sin(one_arg(token, vm)?),
        Cos => trig::cos(one_arg(token, vm)?),
        Tan => trig::tan(one_arg(token, vm)?),
        Sinh => trig::sinh(one_arg(token, vm)?),
        Cosh => trig::cosh(one_arg(token, vm)?),
        Tanh => trig::tanh(one_arg(token, vm)?),
        ASin => trig::asin(one_arg(token, vm)?),
        ACos => trig::acos(one_arg(token, vm)?),
        ATan => trig::atan(one_arg(token, vm)?),
        ASinh => trig::asinh(one_arg(token, vm)?),
        ACosh => trig::acosh(one_arg(token, vm)?),
        ATanh => trig::atanh(one_arg(token, vm)?),

        DimFn => collections::dim_get(token, vm),
        IndexList(name) => collections::index_list_get(name, token, vm),
        IndexMatrix(name) => collections::index_matrix_get(name, token, vm),

        NotImplemented(name) => Err(ExecutionError::new(format!("{name} is not implemented")).into()),

        other => Err(ExecutionError::new(format!("{other:?} cannot be evaluated as a value")).into()),
    }
}

/// Apply a binary operator to two already-evaluated operands. `Store` is
/// handled separately by [`crate::expr::get_store`] and never reaches here.
pub fn binop(kind: &TokenKind, left: Value, right: Value) -> VmResult<Value> {
    use TokenKind::*;
    match kind {
        Plus => arithmetic::plus(left, right),
        Minus => arithmetic::minus(left, right),
        Mult => arithmetic::mult(left, right),
        Div => arithmetic::div(left, right),
        Pow => arithmetic::pow(left, right),
        SciNotation => arithmetic::sci_notation(left, right),
        Square => arithmetic::square(left, right),
        Cube => arithmetic::cube(left, right),
        Factorial => arithmetic::factorial(left, right),
        Transpose => collections::transpose(left),
        NPr => probability::npr(left, right),
        NCr => probability::ncr(left, right),
        And => logic::and(left, right),
        Or => logic::or(left, right),
        Xor => logic::xor(left, right),
        Eq => logic::eq(left, right),
        Ne => logic::ne(left, right),
        Lt => logic::lt(left, right),
        Gt => logic::gt(left, right),
        Le => logic::le(left, right),
        Ge => logic::ge(left, right),
        other => Err(ExecutionError::new(format!("{other:?} is not a binary operator")).into()),
    }
}

/// Dispatch a statement token's `run`.
pub fn run(token: &Token, vm: &mut Vm) -> VmResult<()> {
    use TokenKind::*;
    match &token.kind {
        If => control::if_run(token, vm),
        Then => Err(ExecutionError::new("cannot execute a standalone Then").into()),
        Else => control::else_run(vm),
        End => control::end_run(vm),
        While | Repeat | For => control::loop_run(vm),
        Lbl => Ok(()),
        Goto => vm.goto_label(token),
        Menu => control::menu_run(token, vm),
        Pause => io_ops::pause(token, vm),
        Stop => Err(crate::error::Flow::Stop(None)),
        Return => Err(crate::error::Flow::Return),
        Break => vm.break_loop(),
        Continue => vm.continue_loop(),
        Disp => io_ops::disp(token, vm),
        Output => io_ops::output(token, vm),
        Prompt => io_ops::prompt(token, vm),
        InputStmt => io_ops::input_stmt(token, vm),
        ClrHome => {
            vm.io_mut().clear();
            Ok(())
        }
        Fix => io_ops::fix(token, vm),
        FloatCmd => {
            vm.fixed = -1;
            Ok(())
        }
        PrgmCall(name) => vm.call_prgm(name),
        NotImplemented(name) => Err(ExecutionError::new(format!("{name} is not implemented")).into()),
        Eof | ReplSentinel => Ok(()),
        other => Err(ExecutionError::new(format!("{other:?} cannot be run")).into()),
    }
}

/// Evaluate a function-form token's single absorbed argument.
pub(crate) fn one_arg(token: &Token, vm: &mut Vm) -> VmResult<Value> {
    let arg = token
        .arg
        .as_ref()
        .ok_or_else(|| ExecutionError::new(format!("{:?} called without arguments", token.kind)))?;
    let inner = crate::expr::single_arg(arg)?;
    crate::expr::get(&inner, vm)
}

/// Evaluate every item of a function-form token's absorbed `Arguments`.
pub(crate) fn args(token: &Token, vm: &mut Vm) -> VmResult<Vec<Value>> {
    let arg = token
        .arg
        .as_ref()
        .ok_or_else(|| ExecutionError::new(format!("{:?} called without arguments", token.kind)))?;
    match arg.as_ref() {
        crate::token::Node::Tup(tup) => crate::expr::get_tuple(tup, vm),
        other => Ok(vec![crate::expr::get(other, vm)?]),
    }
}

fn two_arg_values(args: &[Value], name: &str) -> VmResult<(Value, Value)> {
    if args.len() != 2 {
        return Err(ExecutionError::new(format!("{name} expects exactly two arguments")).into());
    }
    Ok((args[0].clone(), args[1].clone()))
}
