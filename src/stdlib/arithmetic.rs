//! Scalar arithmetic: the four basic operators, exponentiation, the
//! postfix `² ³ !` family, and the `int/iPart/fPart/floor/ceiling/round/
//! abs/mod/√/³√` function group. Grounded on `pitybas/tokens.py`'s
//! `AddSub`/`MultDiv`/`Exponent`/`Sqrt` classes; the functions the
//! truncated snapshot doesn't carry (`abs`, `round`, ...) follow the same
//! `Operator.op` shape with standard TI-83/84 semantics.

use crate::error::{ExecutionError, VmResult};
use crate::value::{numeric_binop, Value};

pub fn plus(l: Value, r: Value) -> VmResult<Value> {
    Ok(numeric_binop(&l, &r, |a, b| a + b, |a, b| a + b)?)
}

pub fn minus(l: Value, r: Value) -> VmResult<Value> {
    Ok(numeric_binop(&l, &r, |a, b| a - b, |a, b| a - b)?)
}

pub fn mult(l: Value, r: Value) -> VmResult<Value> {
    Ok(numeric_binop(&l, &r, |a, b| a * b, |a, b| a * b)?)
}

pub fn div(l: Value, r: Value) -> VmResult<Value> {
    Ok(numeric_binop(&l, &r, |a, b| a / b, |a, b| a / b)?)
}

pub fn pow(l: Value, r: Value) -> VmResult<Value> {
    if matches!(l, Value::Complex(_)) || matches!(r, Value::Complex(_)) {
        let base = l.as_complex()?;
        let exp = r.as_complex()?;
        return Ok(Value::Complex(base.powc(exp)).normalize());
    }
    let base = l.as_f64()?;
    let exp = r.as_f64()?;
    if base < 0.0 && exp.fract() != 0.0 {
        let c = num_complex::Complex64::new(base, 0.0).powf(exp);
        return Ok(Value::Complex(c).normalize());
    }
    Ok(Value::from_f64(base.powf(exp)))
}

/// `1ᴇ3` = `1 * 10^3`.
pub fn sci_notation(l: Value, r: Value) -> VmResult<Value> {
    let mantissa = l.as_f64()?;
    let exponent = r.as_f64()?;
    Ok(Value::from_f64(mantissa * 10f64.powf(exponent)))
}

/// Postfix `²`: `right` is the unary-fill sentinel and is ignored.
pub fn square(l: Value, _r: Value) -> VmResult<Value> {
    mult(l.clone(), l)
}

pub fn cube(l: Value, _r: Value) -> VmResult<Value> {
    let squared = square(l.clone(), Value::Int(0))?;
    mult(squared, l)
}

/// Non-negative integer factorial; TI-83/84 also extends `!` to the gamma
/// function for non-integers, which this interpreter does not implement.
pub fn factorial(l: Value, _r: Value) -> VmResult<Value> {
    let n = l.as_i64()?;
    if n < 0 {
        return Err(ExecutionError::new("factorial of a negative number").into());
    }
    let mut acc: i64 = 1;
    for i in 2..=n {
        acc = acc
            .checked_mul(i)
            .ok_or_else(|| ExecutionError::new("factorial overflow"))?;
    }
    Ok(Value::Int(acc))
}

pub fn sqrt(arg: Value) -> VmResult<Value> {
    let x = arg.as_f64()?;
    if x < 0.0 {
        let c = num_complex::Complex64::new(x, 0.0).sqrt();
        return Ok(Value::Complex(c).normalize());
    }
    Ok(Value::from_f64(x.sqrt()))
}

pub fn cube_root(arg: Value) -> VmResult<Value> {
    let x = arg.as_f64()?;
    Ok(Value::from_f64(x.signum() * x.abs().powf(1.0 / 3.0)))
}

pub fn abs(arg: Value) -> VmResult<Value> {
    match arg {
        Value::Complex(c) => Ok(Value::from_f64(c.norm())),
        other => Ok(Value::from_f64(other.as_f64()?.abs())),
    }
}

/// `int(`: truncate toward negative infinity (TI-83/84's `int`, distinct
/// from `iPart` which truncates toward zero).
pub fn int_fn(arg: Value) -> VmResult<Value> {
    Ok(Value::from_f64(arg.as_f64()?.floor()))
}

pub fn i_part(arg: Value) -> VmResult<Value> {
    Ok(Value::from_f64(arg.as_f64()?.trunc()))
}

pub fn f_part(arg: Value) -> VmResult<Value> {
    Ok(Value::from_f64(arg.as_f64()?.fract()))
}

pub fn floor(arg: Value) -> VmResult<Value> {
    Ok(Value::from_f64(arg.as_f64()?.floor()))
}

pub fn ceiling(arg: Value) -> VmResult<Value> {
    Ok(Value::from_f64(arg.as_f64()?.ceil()))
}

pub fn mod_fn(l: Value, r: Value) -> VmResult<Value> {
    let a = l.as_f64()?;
    let b = r.as_f64()?;
    if b == 0.0 {
        return Err(ExecutionError::new("mod( by zero").into());
    }
    Ok(Value::from_f64(a - b * (a / b).floor()))
}

pub fn round(value: Value, digits: Option<Value>) -> VmResult<Value> {
    let x = value.as_f64()?;
    let n = match digits {
        Some(d) => d.as_i64()?,
        None => 10,
    };
    let factor = 10f64.powi(n as i32);
    Ok(Value::from_f64((x * factor).round() / factor))
}
