//! `pb` — a tree-walking interpreter for a TI-83/84 BASIC dialect.
//!
//! Data flow: [`lexer`] turns source text into a stream of raw tokens,
//! [`tree`] groups them into lines of [`token::Node`]s (with nested
//! sub-expressions, tuples, and absorbed arguments already resolved),
//! [`expr`] reduces a single `Expression` to a [`value::Value`], and
//! [`vm`] walks the resulting program with a small cursor-based machine.

pub mod error;
pub mod expr;
pub mod io;
pub mod lexer;
pub mod priority;
pub mod stdlib;
pub mod token;
pub mod tree;
pub mod value;
pub mod vm;

pub use error::{Flow, InterpError, VmResult};
pub use value::Value;
pub use vm::Vm;
