//! The runtime value domain: integers, floats, complex numbers, strings,
//! lists, and matrices, plus the coercion rules spec.md §3/§4.3 describe.

use num_complex::Complex64;
use std::fmt;

const INT_EPSILON: f64 = 1e-14;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Complex(Complex64),
    Str(String),
    List(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

impl Value {
    pub fn as_f64(&self) -> Result<f64, crate::error::ExecutionError> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Complex(c) if c.im == 0.0 => Ok(c.re),
            other => Err(crate::error::ExecutionError::new(format!(
                "expected a number, got {other}"
            ))),
        }
    }

    pub fn as_i64(&self) -> Result<i64, crate::error::ExecutionError> {
        Ok(self.as_f64()? as i64)
    }

    pub fn as_bool(&self) -> Result<bool, crate::error::ExecutionError> {
        Ok(self.as_f64()? != 0.0)
    }

    pub fn as_complex(&self) -> Result<Complex64, crate::error::ExecutionError> {
        match self {
            Value::Int(i) => Ok(Complex64::new(*i as f64, 0.0)),
            Value::Float(f) => Ok(Complex64::new(*f, 0.0)),
            Value::Complex(c) => Ok(*c),
            other => Err(crate::error::ExecutionError::new(format!(
                "expected a number, got {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> Result<&str, crate::error::ExecutionError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(crate::error::ExecutionError::new(format!(
                "expected a string, got {other}"
            ))),
        }
    }

    pub fn as_list(&self) -> Result<&[f64], crate::error::ExecutionError> {
        match self {
            Value::List(l) => Ok(l),
            other => Err(crate::error::ExecutionError::new(format!(
                "expected a list, got {other}"
            ))),
        }
    }

    pub fn as_matrix(&self) -> Result<&[Vec<f64>], crate::error::ExecutionError> {
        match self {
            Value::Matrix(m) => Ok(m),
            other => Err(crate::error::ExecutionError::new(format!(
                "expected a matrix, got {other}"
            ))),
        }
    }

    /// Downcast a float to an integer when it is exactly integral within
    /// `INT_EPSILON`, and a complex with a negligible imaginary part down
    /// to a real. See spec.md §3 "Integer/float unification".
    pub fn normalize(self) -> Value {
        match self {
            Value::Complex(c) if c.im.abs() < INT_EPSILON => Value::Float(c.re).normalize(),
            Value::Float(f) if (f - f.round()).abs() < INT_EPSILON && f.is_finite() => {
                Value::Int(f.round() as i64)
            }
            other => other,
        }
    }

    pub fn from_f64(f: f64) -> Value {
        Value::Float(f).normalize()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Complex(c) => {
                if c.im >= 0.0 {
                    write!(f, "{}+{}i", c.re, c.im)
                } else {
                    write!(f, "{}{}i", c.re, c.im)
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::List(l) => {
                write!(f, "{{")?;
                for (i, x) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, "}}")
            }
            Value::Matrix(m) => {
                write!(f, "[")?;
                for row in m {
                    write!(f, "[")?;
                    for (i, x) in row.iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{x}")?;
                    }
                    write!(f, "]")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Arithmetic on the numeric subset of [`Value`], promoting to complex only
/// when one side already is complex (matches `pitybas`'s reliance on
/// Python's own numeric tower).
pub fn numeric_binop(
    left: &Value,
    right: &Value,
    real: impl Fn(f64, f64) -> f64,
    complex: impl Fn(Complex64, Complex64) -> Complex64,
) -> Result<Value, crate::error::ExecutionError> {
    if matches!(left, Value::Complex(_)) || matches!(right, Value::Complex(_)) {
        let l = left.as_complex()?;
        let r = right.as_complex()?;
        Ok(Value::Complex(complex(l, r)).normalize())
    } else {
        let l = left.as_f64()?;
        let r = right.as_f64()?;
        Ok(Value::from_f64(real(l, r)))
    }
}
