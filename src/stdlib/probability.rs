//! Probability tokens: `nPr`, `nCr`, and the `rand`/`randInt`/`randNorm`
//! family. Grounded on spec.md §4.5 ("`rand` (both variable-form returning
//! a uniform scalar and function-form returning a list of n samples),
//! `randInt`, `randNorm`") since `original_source/pitybas` predates these
//! tokens; `rand = "0.8"` is the teacher-aligned crate for this (see
//! DESIGN.md).

use rand::Rng;

use crate::error::{ExecutionError, VmResult};
use crate::token::Token;
use crate::value::Value;
use crate::vm::Vm;

/// A single uniform sample in `[0, 1)` — backs both bare `rand` (a leaf
/// token) and `rand(` with no arguments.
pub fn uniform(vm: &mut Vm) -> f64 {
    vm.rng_mut().gen::<f64>()
}

fn box_muller(vm: &mut Vm) -> f64 {
    let u1 = uniform(vm).max(f64::MIN_POSITIVE);
    let u2 = uniform(vm);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// `rand(` with zero arguments is a single uniform sample; with one
/// argument `n`, a list of `n` uniform samples.
pub fn rand_fn(token: &Token, vm: &mut Vm) -> VmResult<Value> {
    let vals = crate::stdlib::args(token, vm)?;
    match vals.len() {
        0 => Ok(Value::from_f64(uniform(vm))),
        1 => {
            let n = vals[0].as_i64()?;
            if n < 0 {
                return Err(ExecutionError::new("rand( count must be >= 0").into());
            }
            Ok(Value::List((0..n).map(|_| uniform(vm)).collect()))
        }
        n => Err(ExecutionError::new(format!("rand( expects 0 or 1 arguments, got {n}")).into()),
    }
}

/// `randInt(low, high[, n])`: `n` defaults to 1, in which case a scalar
/// integer is returned rather than a one-element list.
pub fn rand_int(token: &Token, vm: &mut Vm) -> VmResult<Value> {
    let vals = crate::stdlib::args(token, vm)?;
    if vals.len() < 2 || vals.len() > 3 {
        return Err(ExecutionError::new("randInt( expects (low, high[, n])").into());
    }
    let low = vals[0].as_i64()?;
    let high = vals[1].as_i64()?;
    if low > high {
        return Err(ExecutionError::new("randInt( low must be <= high").into());
    }
    let n = if vals.len() == 3 { vals[2].as_i64()? } else { 1 };
    if n < 1 {
        return Err(ExecutionError::new("randInt( count must be >= 1").into());
    }
    let samples: Vec<i64> = (0..n).map(|_| vm.rng_mut().gen_range(low..=high)).collect();
    if n == 1 {
        Ok(Value::Int(samples[0]))
    } else {
        Ok(Value::List(samples.into_iter().map(|i| i as f64).collect()))
    }
}

/// `randNorm(mean, sd[, n])`, sampled via a Box-Muller transform over the
/// shared RNG (no extra distribution crate beyond `rand` itself).
pub fn rand_norm(token: &Token, vm: &mut Vm) -> VmResult<Value> {
    let vals = crate::stdlib::args(token, vm)?;
    if vals.len() < 2 || vals.len() > 3 {
        return Err(ExecutionError::new("randNorm( expects (mean, sd[, n])").into());
    }
    let mean = vals[0].as_f64()?;
    let sd = vals[1].as_f64()?;
    let n = if vals.len() == 3 { vals[2].as_i64()? } else { 1 };
    if n < 1 {
        return Err(ExecutionError::new("randNorm( count must be >= 1").into());
    }
    let samples: Vec<f64> = (0..n).map(|_| mean + sd * box_muller(vm)).collect();
    if n == 1 {
        Ok(Value::from_f64(samples[0]))
    } else {
        Ok(Value::List(samples))
    }
}

pub fn npr(l: Value, r: Value) -> VmResult<Value> {
    let n = l.as_i64()?;
    let k = r.as_i64()?;
    if k < 0 || k > n {
        return Err(ExecutionError::new("nPr: r out of range").into());
    }
    let mut acc: i64 = 1;
    for i in (n - k + 1)..=n {
        acc = acc
            .checked_mul(i)
            .ok_or_else(|| ExecutionError::new("nPr overflow"))?;
    }
    Ok(Value::Int(acc))
}

pub fn ncr(l: Value, r: Value) -> VmResult<Value> {
    let n = l.as_i64()?;
    let k = r.as_i64()?;
    if k < 0 || k > n {
        return Err(ExecutionError::new("nCr: r out of range").into());
    }
    let k = k.min(n - k);
    let mut acc: i64 = 1;
    for i in 0..k {
        acc = acc * (n - i) / (i + 1);
    }
    Ok(Value::Int(acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npr_matches_factorial_ratio() {
        assert_eq!(npr(Value::Int(5), Value::Int(2)).unwrap(), Value::Int(20));
    }

    #[test]
    fn ncr_is_symmetric() {
        let a = ncr(Value::Int(6), Value::Int(2)).unwrap();
        let b = ncr(Value::Int(6), Value::Int(4)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Value::Int(15));
    }
}
