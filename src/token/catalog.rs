//! The reserved-token table: every literal spelling the lexer can match,
//! built once and queried by greedy longest match.
//!
//! Mirrors the teacher's `LEX_MAP`/`terminal!` pattern (`src/lexer/mod.rs`,
//! pre-transform) and `agileandy-BBC-Basic-Rust-Interpreter`'s
//! `const KEYWORDS: &[(&str, u8)]` + `HashMap`-at-startup construction.

use super::kind::TokenKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Raw `(spelling, kind)` table. Function-form entries carry their
/// trailing `(` as part of the spelling — see [`TokenKind::is_function`].
fn entries() -> Vec<(&'static str, TokenKind)> {
    use TokenKind::*;
    vec![
        ("+", Plus),
        ("-", Minus),
        ("*", Mult),
        ("/", Div),
        ("^", Pow),
        ("ᴇ", SciNotation),
        ("nPr", NPr),
        ("nCr", NCr),
        ("and", And),
        ("or", Or),
        ("xor", Xor),
        ("=", Eq),
        ("≠", Ne),
        ("<", Lt),
        (">", Gt),
        ("≤", Le),
        ("≥", Ge),
        ("→", Store),
        ("²", Square),
        ("³", Cube),
        ("!", Factorial),
        ("ᵀ", Transpose),
        ("√(", Sqrt),
        ("³√(", CubeRoot),
        ("abs(", Abs),
        ("int(", IntFn),
        ("iPart(", IPart),
        ("fPart(", FPart),
        ("floor(", Floor),
        ("ceiling(", Ceiling),
        ("mod(", ModFn),
        ("round(", Round),
        ("not(", Not),
        ("rand(", RandFn),
        ("randInt(", RandInt),
        ("randNorm(", RandNorm),
        ("randBin(", RandBin),
        ("randM(", RandM),
        ("rand", RandBare),
        ("sin(", Sin),
        ("cos(", Cos),
        ("tan(", Tan),
        ("sinh(", Sinh),
        ("cosh(", Cosh),
        ("tanh(", Tanh),
        ("sin⁻¹(", ASin),
        ("cos⁻¹(", ACos),
        ("tan⁻¹(", ATan),
        ("sinh⁻¹(", ASinh),
        ("cosh⁻¹(", ACosh),
        ("tanh⁻¹(", ATanh),
        ("dim(", DimFn),
        ("π", ConstPi),
        ("e", ConstE),
        ("Ans", ConstAns),
        ("getKey", GetKey),
        ("If", If),
        ("Then", Then),
        ("Else", Else),
        ("End", End),
        ("While", While),
        ("Repeat", Repeat),
        ("For(", For),
        ("Lbl", Lbl),
        ("Goto", Goto),
        ("Menu(", Menu),
        ("Pause", Pause),
        ("Stop", Stop),
        ("Return", Return),
        ("Break", Break),
        ("Continue", Continue),
        ("Disp", Disp),
        ("Output(", Output),
        ("Prompt", Prompt),
        ("Input", InputStmt),
        ("ClrHome", ClrHome),
        ("Fix", Fix),
        ("Float", FloatCmd),
        ("ClrDraw", NotImplemented("ClrDraw")),
        ("FnOn", NotImplemented("FnOn")),
        ("FnOff", NotImplemented("FnOff")),
        ("DelVar", NotImplemented("DelVar")),
    ]
}

/// Spelling → kind, for greedy matching. `rand(` is registered separately
/// from bare `rand` so the longer spelling always wins the match.
pub static CATALOG: Lazy<HashMap<&'static str, TokenKind>> =
    Lazy::new(|| entries().into_iter().collect());

/// Spellings sorted by descending length, for longest-match scanning.
pub static KEYS_BY_LENGTH: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut keys: Vec<&'static str> = CATALOG.keys().copied().collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));
    keys
});

/// Does any reserved spelling start with `prefix`? Used to decide whether
/// it is still worth scanning more characters before giving up.
pub fn can_extend(prefix: &str) -> bool {
    KEYS_BY_LENGTH.iter().any(|k| k.starts_with(prefix))
}

/// Greedy longest-match lookup: given the remaining source starting at the
/// cursor, return the longest reserved spelling that is a prefix of it.
pub fn longest_match(remaining: &str) -> Option<(&'static str, &'static TokenKind)> {
    for key in KEYS_BY_LENGTH.iter() {
        if remaining.starts_with(key) {
            return CATALOG.get_key_value(key).map(|(k, v)| (*k, v));
        }
    }
    None
}

pub fn single_letter_var(c: char) -> Option<TokenKind> {
    if c.is_ascii_uppercase() || c == 'θ' {
        Some(TokenKind::SimpleVar(c))
    } else {
        None
    }
}
