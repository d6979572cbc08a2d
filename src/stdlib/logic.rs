//! Boolean and comparison operators: `and or xor not`, `= ≠ < > ≤ ≥`.
//! Every predicate returns `1`/`0` rather than a real boolean, matching
//! TI-83/84 (and `pitybas/tokens.py`'s `Bool`/`Logic` classes, which do the
//! same via their `run` wrapper converting a Python bool to `1`/`0`).

use crate::error::VmResult;
use crate::value::Value;

fn values_equal(l: &Value, r: &Value) -> VmResult<bool> {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        (Value::List(a), Value::List(b)) => Ok(a == b),
        (Value::Matrix(a), Value::Matrix(b)) => Ok(a == b),
        _ => Ok((l.as_f64()? - r.as_f64()?).abs() < 1e-12),
    }
}

fn to_flag(b: bool) -> Value {
    Value::Int(if b { 1 } else { 0 })
}

pub fn not(v: Value) -> VmResult<Value> {
    Ok(to_flag(!v.as_bool()?))
}

pub fn and(l: Value, r: Value) -> VmResult<Value> {
    Ok(to_flag(l.as_bool()? && r.as_bool()?))
}

pub fn or(l: Value, r: Value) -> VmResult<Value> {
    Ok(to_flag(l.as_bool()? || r.as_bool()?))
}

pub fn xor(l: Value, r: Value) -> VmResult<Value> {
    Ok(to_flag(l.as_bool()? ^ r.as_bool()?))
}

pub fn eq(l: Value, r: Value) -> VmResult<Value> {
    Ok(to_flag(values_equal(&l, &r)?))
}

pub fn ne(l: Value, r: Value) -> VmResult<Value> {
    Ok(to_flag(!values_equal(&l, &r)?))
}

pub fn lt(l: Value, r: Value) -> VmResult<Value> {
    Ok(to_flag(l.as_f64()? < r.as_f64()?))
}

pub fn gt(l: Value, r: Value) -> VmResult<Value> {
    Ok(to_flag(l.as_f64()? > r.as_f64()?))
}

pub fn le(l: Value, r: Value) -> VmResult<Value> {
    Ok(to_flag(l.as_f64()? <= r.as_f64()?))
}

pub fn ge(l: Value, r: Value) -> VmResult<Value> {
    Ok(to_flag(l.as_f64()? >= r.as_f64()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_compares_across_int_and_float() {
        assert_eq!(eq(Value::Int(2), Value::Float(2.0)).unwrap(), Value::Int(1));
    }

    #[test]
    fn string_equality_is_exact() {
        assert_eq!(
            eq(Value::Str("hi".into()), Value::Str("hi".into())).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            eq(Value::Str("hi".into()), Value::Str("ho".into())).unwrap(),
            Value::Int(0)
        );
    }
}
