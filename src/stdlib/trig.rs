//! Trigonometric and hyperbolic functions, plus their inverses. Radians
//! only — the source material has no degree-mode concept for this
//! dialect's `sin(`/`cos(`/`tan(` family (spec.md §4.5 lists no `Degree`
//! token), so these are plain `f64` trig calls.
//!
//! spec.md §9 resolves the `sin⁻¹`/`cos⁻¹`/`tan⁻¹` vs. `sinh`/`cosh`/`tanh`
//! naming collision: the unicode superscript `⁻¹` suffix means inverse, the
//! `h` suffix means hyperbolic — disambiguated at catalog-registration time
//! (`src/token/catalog.rs`) rather than here.

use crate::error::VmResult;
use crate::value::Value;

pub fn sin(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.sin()))
}

pub fn cos(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.cos()))
}

pub fn tan(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.tan()))
}

pub fn sinh(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.sinh()))
}

pub fn cosh(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.cosh()))
}

pub fn tanh(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.tanh()))
}

pub fn asin(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.asin()))
}

pub fn acos(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.acos()))
}

pub fn atan(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.atan()))
}

pub fn asinh(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.asinh()))
}

pub fn acosh(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.acosh()))
}

pub fn atanh(v: Value) -> VmResult<Value> {
    Ok(Value::from_f64(v.as_f64()?.atanh()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sin_of_zero_is_zero() {
        assert_eq!(sin(Value::Int(0)).unwrap(), Value::Int(0));
    }

    #[test]
    fn round_trip_asin_sin() {
        let x = 0.5;
        let s = sin(Value::Float(x)).unwrap().as_f64().unwrap();
        let back = asin(Value::Float(s)).unwrap().as_f64().unwrap();
        assert!((back - x).abs() < 1e-9);
    }
}
