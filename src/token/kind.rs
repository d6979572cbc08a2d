//! `TokenKind` — one variant per reserved-token runtime behavior.
//!
//! Rust has no runtime metaclass registration, so this replaces
//! `pitybas/tokens.py`'s `Tracker` metaclass (which derived `can_run`/
//! `can_get`/`can_set` from which methods a subclass defined) with the
//! alternative spec.md §9 names explicitly: a tagged enum plus free
//! functions that answer the same questions a lookup table would.

use crate::priority::Priority;
use crate::value::Value;

/// Every reserved token's runtime identity. Variants that need fixed data
/// (a variable letter, a list/matrix name) carry it inline.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // --- leaves -----------------------------------------------------
    Value(Value),
    SimpleVar(char),
    StrVar(u8),
    ConstPi,
    ConstE,
    ConstAns,
    ListRef(String),
    MatrixRef(String),
    GetKey,
    /// Bare `rand` with no trailing `(` — a single random value in `[0,1)`.
    RandBare,

    // --- binary operators --------------------------------------------
    Plus,
    Minus,
    Mult,
    Div,
    Pow,
    SciNotation,
    NPr,
    NCr,
    And,
    Or,
    Xor,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Store,

    // --- postfix unary -------------------------------------------------
    Square,
    Cube,
    Factorial,
    Transpose,

    // --- unary/n-ary functions (absorb one Arguments) ------------------
    Sqrt,
    CubeRoot,
    Abs,
    IntFn,
    IPart,
    FPart,
    Floor,
    Ceiling,
    ModFn,
    Round,
    Not,
    RandFn,
    RandInt,
    RandNorm,
    RandBin,
    RandM,
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    ASin,
    ACos,
    ATan,
    ASinh,
    ACosh,
    ATanh,
    DimFn,
    IndexList(String),
    IndexMatrix(String),

    // --- control flow (statements) -------------------------------------
    If,
    Then,
    Else,
    End,
    While,
    Repeat,
    For,
    Lbl,
    Goto,
    Menu,
    Pause,
    Stop,
    Return,
    Break,
    Continue,

    // --- I/O (statements) ----------------------------------------------
    Disp,
    Output,
    Prompt,
    InputStmt,
    ClrHome,
    Fix,
    FloatCmd,
    PrgmCall(String),

    // --- recognized-but-unimplemented (spec.md §1, "Non-goals") --------
    NotImplemented(&'static str),

    // --- sentinels -------------------------------------------------------
    Eof,
    ReplSentinel,
}

impl TokenKind {
    pub fn priority(&self) -> Priority {
        use TokenKind::*;
        match self {
            Plus | Minus => Priority::AddSub,
            Mult | Div => Priority::MultDiv,
            Pow | SciNotation | Square | Cube | Factorial | Transpose => Priority::Exponent,
            NPr | NCr => Priority::Prob,
            Lt | Gt | Le | Ge | Eq | Ne => Priority::Logic,
            And | Or | Xor => Priority::Bool,
            Store => Priority::Set,

            If | Then | Else | End | While | Repeat | For | Lbl | Goto | Menu | Pause | Stop
            | Return | Break | Continue | Disp | Output | Prompt | InputStmt | ClrHome | Fix
            | FloatCmd | PrgmCall(_) => Priority::Invalid,

            // every remaining variant is an operand (leaf or function-call value)
            _ => Priority::None,
        }
    }

    /// `true` for statement tokens that drive the VM cursor directly.
    pub fn can_run(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            If | Then
                | Else
                | End
                | While
                | Repeat
                | For
                | Lbl
                | Goto
                | Menu
                | Pause
                | Stop
                | Return
                | Break
                | Continue
                | Disp
                | Output
                | Prompt
                | InputStmt
                | ClrHome
                | Fix
                | FloatCmd
                | PrgmCall(_)
                | Eof
                | ReplSentinel
                | NotImplemented(_)
        )
    }

    /// `true` for tokens that produce a [`Value`] when resolved.
    pub fn can_get(&self) -> bool {
        use TokenKind::*;
        !matches!(
            self,
            If | Then
                | Else
                | End
                | While
                | Repeat
                | For
                | Lbl
                | Goto
                | Menu
                | Pause
                | Stop
                | Return
                | Break
                | Continue
                | Disp
                | Output
                | Prompt
                | InputStmt
                | ClrHome
                | Fix
                | FloatCmd
                | PrgmCall(_)
                | Eof
                | ReplSentinel
        )
    }

    /// `true` for tokens that may appear as a store (`→`) target.
    pub fn can_set(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            SimpleVar(_) | StrVar(_) | ListRef(_) | MatrixRef(_) | IndexList(_) | IndexMatrix(_)
        ) || matches!(self, DimFn)
    }

    /// Function-form tokens: registered in the catalog with a trailing
    /// `(` and expecting exactly one absorbed `Arguments` node.
    pub fn is_function(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Sqrt | CubeRoot
                | Abs
                | IntFn
                | IPart
                | FPart
                | Floor
                | Ceiling
                | ModFn
                | Round
                | Not
                | RandFn
                | RandInt
                | RandNorm
                | RandBin
                | RandM
                | Sin
                | Cos
                | Tan
                | Sinh
                | Cosh
                | Tanh
                | ASin
                | ACos
                | ATan
                | ASinh
                | ACosh
                | ATanh
                | DimFn
                | IndexList(_)
                | IndexMatrix(_)
                | For
                | Menu
                | Output
        )
    }

    /// Non-function statement tokens that absorb a trailing expression
    /// (or tuple) from the rest of the line (spec.md §4.2's absorb pass).
    /// `For`, `Menu`, and `Output` take their arguments through a
    /// parenthesized `Arguments` tuple instead (see [`Self::is_function`]).
    pub fn wants_line_absorb(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Disp | Prompt | InputStmt | If | While | Repeat | Lbl | Goto | Fix | Pause
        )
    }

    /// Postfix operators that fill a missing right operand with a sentinel.
    pub fn can_fill_right(&self) -> bool {
        matches!(
            self,
            TokenKind::Square | TokenKind::Cube | TokenKind::Factorial | TokenKind::Transpose
        )
    }

    /// Prefix operators that fill a missing left operand (leading `ᴇ`).
    pub fn can_fill_left(&self) -> bool {
        matches!(self, TokenKind::SciNotation)
    }

    /// Catalog display name, used for error messages and `-v` dumps.
    pub fn name(&self) -> String {
        format!("{self:?}")
    }
}
