//! Error taxonomy.
//!
//! Mirrors `pitybas/common.py`'s `ParseError`/`ExecutionError`/`ExpressionError`
//! hierarchy and the teacher's hand-written `Display` + `std::error::Error`
//! style (`src/typechecker/error.rs`, `src/loader/loaderror.rs`) rather than
//! reaching for `thiserror`, which the teacher does not depend on.

use std::fmt;

/// Lexer/tree-builder failure: unterminated bracket, unknown token near a
/// position, malformed number.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParseError on line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Malformed expression shape: operand/operator alternation violated,
/// chained store.
#[derive(Debug, Clone)]
pub struct ExpressionError {
    pub message: String,
}

impl ExpressionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExpressionError: {}", self.message)
    }
}

impl std::error::Error for ExpressionError {}

/// Runtime failure: unknown Goto label, empty block-stack pop, wrong
/// argument arity, unsupported operand types, `prgm` not found.
#[derive(Debug, Clone)]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecutionError: {}", self.message)
    }
}

impl std::error::Error for ExecutionError {}

/// Attempt to assign to an immutable constant (`π`, `e`, `Ans` as a store
/// target, etc).
#[derive(Debug, Clone)]
pub struct InvalidOperationError {
    pub message: String,
}

impl InvalidOperationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for InvalidOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidOperation: {}", self.message)
    }
}

impl std::error::Error for InvalidOperationError {}

/// Top-level error used at the CLI boundary; the non-error control-flow
/// signals (`Stop`/`Return`) are *not* represented here, see [`Flow`].
#[derive(Debug, Clone)]
pub enum InterpError {
    Parse(ParseError),
    Expression(ExpressionError),
    Execution(ExecutionError),
    InvalidOperation(InvalidOperationError),
}

impl fmt::Display for InterpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpError::Parse(e) => write!(f, "{e}"),
            InterpError::Expression(e) => write!(f, "{e}"),
            InterpError::Execution(e) => write!(f, "{e}"),
            InterpError::InvalidOperation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InterpError {}

impl From<ParseError> for InterpError {
    fn from(e: ParseError) -> Self {
        InterpError::Parse(e)
    }
}

impl From<ExpressionError> for InterpError {
    fn from(e: ExpressionError) -> Self {
        InterpError::Expression(e)
    }
}

impl From<ExecutionError> for InterpError {
    fn from(e: ExecutionError) -> Self {
        InterpError::Execution(e)
    }
}

impl From<InvalidOperationError> for InterpError {
    fn from(e: InvalidOperationError) -> Self {
        InterpError::InvalidOperation(e)
    }
}

/// Non-local control flow threaded through the VM's `?`-propagation.
///
/// `Stop` and `Return` are not errors: `pitybas` raises them as Python
/// exceptions purely to unwind the call stack in an orderly way, and the
/// driver (or a `prgm<NAME>` caller) catches them without reporting a bug.
#[derive(Debug, Clone)]
pub enum Flow {
    /// Raised by `Stop` or by reaching EOF; carries an optional message.
    Stop(Option<String>),
    /// Raised by `Return`; unwinds to the nearest `prgm<NAME>` caller.
    Return,
    /// An actual error.
    Error(InterpError),
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Stop(Some(msg)) => write!(f, "Stop: {msg}"),
            Flow::Stop(None) => write!(f, "Stop"),
            Flow::Return => write!(f, "Return"),
            Flow::Error(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Flow {}

impl<E> From<E> for Flow
where
    E: Into<InterpError>,
{
    fn from(e: E) -> Self {
        Flow::Error(e.into())
    }
}

pub type VmResult<T> = Result<T, Flow>;
