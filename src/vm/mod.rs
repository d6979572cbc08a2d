//! The cursor-based execution engine: main loop, cursor advancement, block
//! stack protocol, end/label finders, `For` position tracking, and the
//! variable/list/matrix stores. Grounded on `original_source/pitybas/interpret.py`'s
//! `Interpreter` (`cur`/`inc`/`inc_row`/`push_block`/`pop_block`/`find`/`goto`/`run`),
//! generalized per spec.md §4.4 for `Break`/`Continue`, `Menu`, `prgm<NAME>`
//! sub-interpreter invocation, and REPL splice-and-resume (none of which the
//! truncated snapshot implements, but all of which spec.md names).

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{ExecutionError, Flow, VmResult};
use crate::io::Io;
use crate::io::simple::SimpleIo;
use crate::token::{Node, Token, TokenKind};
use crate::tree::{Builder, Code};
use crate::value::Value;

/// Which loop/conditional construct a [`BlockEntry`] belongs to. `If` never
/// re-enters its header on `End`/`Continue` (see [`Vm::resume_block`]);
/// `While`/`Repeat`/`For` do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    If,
    While,
    Repeat,
    For,
}

impl BlockKind {
    fn from_header(kind: &TokenKind) -> Option<BlockKind> {
        match kind {
            TokenKind::If => Some(BlockKind::If),
            TokenKind::While => Some(BlockKind::While),
            TokenKind::Repeat => Some(BlockKind::Repeat),
            TokenKind::For => Some(BlockKind::For),
            _ => None,
        }
    }
}

/// An open block on [`Vm::blocks`]: the `(line, col)` of its header token
/// plus which kind of header it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEntry {
    pub line: usize,
    pub col: usize,
    pub kind: BlockKind,
}

/// One entry of the `running` stack: the position and kind of a
/// currently-executing statement, used by loop headers to find their own
/// position and by the error reporter's history trace.
pub type RunningEntry = (usize, usize, TokenKind);

const DEFAULT_HISTORY_CAP: usize = 20;

pub struct Vm {
    pub code: Code,
    pub cursor: (usize, usize),

    vars: HashMap<char, Value>,
    str_vars: HashMap<u8, String>,
    lists: HashMap<String, Vec<f64>>,
    matrix: HashMap<String, Vec<Vec<f64>>>,
    ans: Value,

    pub blocks: Vec<BlockEntry>,
    pub running: Vec<RunningEntry>,
    history: VecDeque<RunningEntry>,
    history_cap: usize,

    /// `For` loop position, keyed by the header's `(line, col)` — the tree
    /// is reused across iterations, so per-loop mutable state lives here
    /// rather than on the (otherwise immutable) token.
    for_state: HashMap<(usize, usize), f64>,

    pub fixed: i32,
    serial: u64,
    repl_serial: u64,

    rng: StdRng,
    io: Box<dyn Io>,

    /// Directory `prgm<NAME>` resolves sibling `.bas` files relative to.
    pub base_dir: PathBuf,
}

impl Vm {
    /// Build a program from `source` and wrap it with the EOF sentinel
    /// spec.md §3 describes (`code: list<list<Token>> with a sentinel EOF
    /// token appended`).
    pub fn from_source(source: &str, io: Box<dyn Io>) -> Result<Self, crate::error::ParseError> {
        let code = Builder::build(source)?;
        Ok(Self::new(code, io))
    }

    pub fn new(mut code: Code, io: Box<dyn Io>) -> Self {
        let eof_line = code.len();
        code.push(vec![Node::Tok(Token::new(TokenKind::Eof, eof_line))]);
        Self {
            code,
            cursor: (0, 0),
            vars: HashMap::new(),
            str_vars: HashMap::new(),
            lists: HashMap::new(),
            matrix: HashMap::new(),
            ans: Value::Int(0),
            blocks: Vec::new(),
            running: Vec::new(),
            history: VecDeque::new(),
            history_cap: DEFAULT_HISTORY_CAP,
            for_state: HashMap::new(),
            fixed: -1,
            serial: 0,
            repl_serial: 0,
            rng: StdRng::from_entropy(),
            io,
            base_dir: PathBuf::from("."),
        }
    }

    /// Append the REPL sentinel row just before EOF, so `run`'s main loop
    /// falls into [`Vm::handle_repl`] once the supplied program runs out.
    pub fn enable_repl(&mut self) {
        let last = self.code.len() - 1;
        let line = self.code[last][0].as_token().map(|t| t.line).unwrap_or(last);
        self.code
            .insert(last, vec![Node::Tok(Token::new(TokenKind::ReplSentinel, line))]);
    }

    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap;
        self
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn io_mut(&mut self) -> &mut dyn Io {
        self.io.as_mut()
    }

    fn take_io(&mut self) -> Box<dyn Io> {
        std::mem::replace(&mut self.io, Box::new(SimpleIo::new()))
    }

    fn set_io(&mut self, io: Box<dyn Io>) {
        self.io = io;
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // --- variable / list / matrix stores --------------------------------

    pub fn get_var(&self, name: char) -> VmResult<Value> {
        Ok(self.vars.get(&name).cloned().unwrap_or(Value::Int(0)))
    }

    pub fn set_var(&mut self, name: char, value: Value) {
        self.vars.insert(name, value);
    }

    pub fn get_str_var(&self, n: u8) -> VmResult<String> {
        Ok(self.str_vars.get(&n).cloned().unwrap_or_default())
    }

    pub fn set_str_var(&mut self, n: u8, value: String) {
        self.str_vars.insert(n, value);
    }

    pub fn get_ans(&self) -> Value {
        self.ans.clone()
    }

    fn set_ans(&mut self, value: Value) {
        self.ans = value;
        self.serial += 1;
    }

    pub fn get_list(&self, name: &str) -> VmResult<Vec<f64>> {
        Ok(self.lists.get(name).cloned().unwrap_or_default())
    }

    pub fn set_list(&mut self, name: &str, values: Vec<f64>) {
        self.lists.insert(name.to_string(), values);
    }

    pub fn list_len(&self, name: &str) -> i64 {
        self.lists.get(name).map(|l| l.len() as i64).unwrap_or(0)
    }

    pub fn resize_list(&mut self, name: &str, n: i64) {
        let n = n.max(0) as usize;
        let list = self.lists.entry(name.to_string()).or_default();
        list.resize(n, 0.0);
    }

    pub fn get_list_index(&self, name: &str, idx: i64) -> VmResult<f64> {
        let list = self
            .lists
            .get(name)
            .ok_or_else(|| ExecutionError::new(format!("list {name} is not defined")))?;
        let i = idx - 1;
        list.get(i as usize)
            .copied()
            .ok_or_else(|| ExecutionError::new(format!("list index {idx} out of range")).into())
    }

    pub fn set_list_index(&mut self, name: &str, idx: i64, value: f64) -> VmResult<()> {
        if idx < 1 {
            return Err(ExecutionError::new("list index must be >= 1").into());
        }
        let list = self.lists.entry(name.to_string()).or_default();
        let i = idx as usize;
        if i > list.len() {
            list.resize(i, 0.0);
        }
        list[i - 1] = value;
        Ok(())
    }

    pub fn get_matrix(&self, name: &str) -> VmResult<Vec<Vec<f64>>> {
        Ok(self.matrix.get(name).cloned().unwrap_or_default())
    }

    pub fn set_matrix(&mut self, name: &str, values: Vec<Vec<f64>>) {
        self.matrix.insert(name.to_string(), values);
    }

    pub fn matrix_dims(&self, name: &str) -> (i64, i64) {
        match self.matrix.get(name) {
            Some(m) if !m.is_empty() => (m.len() as i64, m[0].len() as i64),
            _ => (0, 0),
        }
    }

    pub fn resize_matrix(&mut self, name: &str, rows: i64, cols: i64) {
        let rows = rows.max(0) as usize;
        let cols = cols.max(0) as usize;
        let m = self.matrix.entry(name.to_string()).or_default();
        m.resize(rows, vec![0.0; cols]);
        for row in m.iter_mut() {
            row.resize(cols, 0.0);
        }
    }

    pub fn get_matrix_index(&self, name: &str, row: i64, col: i64) -> VmResult<f64> {
        let m = self
            .matrix
            .get(name)
            .ok_or_else(|| ExecutionError::new(format!("matrix {name} is not defined")))?;
        let r = (row - 1) as usize;
        let c = (col - 1) as usize;
        m.get(r)
            .and_then(|row| row.get(c))
            .copied()
            .ok_or_else(|| ExecutionError::new(format!("matrix index ({row},{col}) out of range")).into())
    }

    pub fn set_matrix_index(&mut self, name: &str, row: i64, col: i64, value: f64) -> VmResult<()> {
        if row < 1 || col < 1 {
            return Err(ExecutionError::new("matrix index must be >= 1").into());
        }
        let (r, c) = (row as usize, col as usize);
        let m = self.matrix.entry(name.to_string()).or_default();
        if r > m.len() {
            m.resize(r, Vec::new());
        }
        if m[r - 1].len() < c {
            m[r - 1].resize(c, 0.0);
        }
        m[r - 1][c - 1] = value;
        Ok(())
    }

    pub fn seed_rng(&mut self, seed: i64) {
        self.set_seed(seed as u64);
    }

    // --- cursor / program shape ------------------------------------------

    fn cur_node(&self) -> Node {
        self.code[self.cursor.0][self.cursor.1].clone()
    }

    /// The node currently under the cursor, for statements that need to
    /// look ahead before deciding how to advance (e.g. `If` distinguishing
    /// its `Then` block form from its single-statement form).
    pub(crate) fn peek_node(&self) -> Option<Node> {
        Some(self.cur_node())
    }

    /// Advance the cursor one token; at end of row, advance to the next
    /// row. Rows past the last are clamped to the EOF sentinel's row.
    pub fn inc(&mut self) {
        self.cursor.1 += 1;
        if self.cursor.1 >= self.code[self.cursor.0].len() {
            self.cursor.1 = 0;
            self.inc_row();
        }
    }

    pub fn inc_row(&mut self) {
        self.cursor.0 = (self.cursor.0 + 1).min(self.code.len() - 1);
        self.cursor.1 = 0;
    }

    pub fn goto(&mut self, line: usize, col: usize) -> VmResult<()> {
        if line < self.code.len() && col < self.code[line].len() {
            self.cursor = (line, col);
            Ok(())
        } else {
            Err(ExecutionError::new(format!("cannot goto ({line}, {col})")).into())
        }
    }

    pub fn push_block(&mut self, entry: BlockEntry) {
        debug!("push block {:?} at ({}, {})", entry.kind, entry.line, entry.col);
        self.blocks.push(entry);
    }

    pub fn pop_block(&mut self) -> VmResult<BlockEntry> {
        self.blocks
            .pop()
            .ok_or_else(|| ExecutionError::new("tried to pop an empty block stack").into())
    }

    /// Header position of the statement currently executing — a loop
    /// header calls this from inside its own `run` to learn where it lives.
    pub fn running_top(&self) -> VmResult<(usize, usize)> {
        self.running
            .last()
            .map(|(l, c, _)| (*l, *c))
            .ok_or_else(|| ExecutionError::new("no statement is currently running").into())
    }

    fn push_history(&mut self, entry: RunningEntry) {
        if self.history.len() >= self.history_cap {
            self.history.pop_front();
        }
        self.history.push_back(entry);
    }

    /// The last `n` executed tokens, most recent last — used by the CLI's
    /// `-s`/crash report.
    pub fn history_tail(&self, n: usize) -> Vec<RunningEntry> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).cloned().collect()
    }

    pub fn vars_snapshot(&self) -> Vec<(char, Value)> {
        let mut v: Vec<_> = self.vars.iter().map(|(k, v)| (*k, v.clone())).collect();
        v.sort_by_key(|(k, _)| *k);
        v
    }

    /// Find the first row (scanning forward from `start_line`, inclusive)
    /// whose leading token satisfies `pred`; optionally wraps around to the
    /// start of the program. Mirrors `Interpreter.find`.
    pub fn find_forward(
        &self,
        start_line: usize,
        wrap: bool,
        pred: impl Fn(&TokenKind) -> bool,
    ) -> Option<(usize, usize, TokenKind)> {
        for i in start_line..self.code.len() {
            if let Some(Node::Tok(t)) = self.code[i].first() {
                if pred(&t.kind) {
                    return Some((i, 0, t.kind.clone()));
                }
            }
        }
        if wrap {
            for i in 0..start_line.min(self.code.len()) {
                if let Some(Node::Tok(t)) = self.code[i].first() {
                    if pred(&t.kind) {
                        return Some((i, 0, t.kind.clone()));
                    }
                }
            }
        }
        None
    }

    /// Nesting-aware end finder (spec.md §4.4): scans forward from
    /// `start_line`, treating `If` (only when immediately followed by a
    /// `Then` row — an `If` without `Then` never opens a block),
    /// `While`/`Repeat`/`For` as block openers and `End` as the closer.
    /// When `want_else` is set, also reports the first `Else` found at
    /// depth zero. Never wraps.
    pub fn find_end_and_else(
        &self,
        start_line: usize,
        want_else: bool,
    ) -> VmResult<(Option<(usize, usize)>, Option<(usize, usize)>)> {
        let mut depth = 0i32;
        let mut els = None;
        for i in start_line..self.code.len() {
            let Some(Node::Tok(t)) = self.code[i].first() else {
                continue;
            };
            match &t.kind {
                TokenKind::If => {
                    if matches!(
                        self.code.get(i + 1).and_then(|r| r.first()),
                        Some(Node::Tok(t2)) if t2.kind == TokenKind::Then
                    ) {
                        depth += 1;
                    }
                }
                TokenKind::While | TokenKind::Repeat | TokenKind::For => depth += 1,
                TokenKind::End => {
                    if depth == 0 {
                        return Ok((Some((i, 0)), els));
                    }
                    depth -= 1;
                }
                TokenKind::Else if want_else && depth == 0 && els.is_none() => {
                    els = Some((i, 0));
                }
                _ => {}
            }
        }
        Ok((None, els))
    }

    fn find_end_only(&self, start_line: usize) -> VmResult<(usize, usize)> {
        self.find_end_and_else(start_line, false)?
            .0
            .ok_or_else(|| ExecutionError::new("could not find matching End").into())
    }

    // --- block resume / Break / Continue -----------------------------------

    /// Re-enter a loop header's condition check, exactly as `End::run`
    /// does after popping the block. A no-op for `If` (its body simply
    /// falls through to whatever follows `End`).
    pub fn resume_block(&mut self, entry: BlockEntry) -> VmResult<()> {
        match entry.kind {
            BlockKind::If => Ok(()),
            BlockKind::While | BlockKind::Repeat | BlockKind::For => {
                self.goto(entry.line, entry.col)?;
                self.run_loop_header(entry.line, entry.col)
            }
        }
    }

    pub(crate) fn run_loop_header(&mut self, line: usize, col: usize) -> VmResult<()> {
        let Node::Tok(token) = self.code[line][col].clone() else {
            return Err(ExecutionError::new("loop header is not a token").into());
        };
        let keep_going = match &token.kind {
            TokenKind::While => {
                let cond = token
                    .arg
                    .as_ref()
                    .ok_or_else(|| ExecutionError::new("While statement without condition"))?;
                crate::expr::eval(cond, self)?.as_bool()?
            }
            TokenKind::Repeat => {
                let cond = token
                    .arg
                    .as_ref()
                    .ok_or_else(|| ExecutionError::new("Repeat statement without condition"))?;
                !crate::expr::eval(cond, self)?.as_bool()?
            }
            TokenKind::For => self.for_step(line, col, &token)?,
            other => return Err(ExecutionError::new(format!("{other:?} is not a loop header")).into()),
        };

        if keep_going {
            let kind = BlockKind::from_header(&token.kind)
                .ok_or_else(|| ExecutionError::new("not a block header"))?;
            self.push_block(BlockEntry { line, col, kind });
            self.inc();
        } else {
            self.for_state.remove(&(line, col));
            let (end_line, end_col) = self.find_end_only(line + 1)?;
            self.goto(end_line, end_col)?;
            self.inc();
        }
        Ok(())
    }

    fn for_step(&mut self, line: usize, col: usize, token: &Token) -> VmResult<bool> {
        let arg = token
            .arg
            .as_ref()
            .ok_or_else(|| ExecutionError::new("For( without arguments"))?;
        let items: Vec<Node> = match arg.as_ref() {
            Node::Tup(tup) => tup.items.clone(),
            other => vec![other.clone()],
        };
        if items.len() != 3 && items.len() != 4 {
            return Err(ExecutionError::new("For( expects (var, start, end[, step])").into());
        }

        let var_name = match items[0].clone().flatten() {
            Node::Tok(t) => match t.kind {
                TokenKind::SimpleVar(c) => c,
                other => return Err(ExecutionError::new(format!("For( variable must be a simple variable, got {other:?}")).into()),
            },
            _ => return Err(ExecutionError::new("For( variable must be a simple variable").into()),
        };

        let start = crate::expr::get(&items[1], self)?.as_f64()?;
        let end = crate::expr::get(&items[2], self)?.as_f64()?;
        let step = if items.len() == 4 {
            crate::expr::get(&items[3], self)?.as_f64()?
        } else {
            1.0
        };

        let key = (line, col);
        let pos = match self.for_state.get(&key) {
            Some(prev) => prev + step,
            None => start,
        };
        self.for_state.insert(key, pos);
        self.set_var(var_name, Value::from_f64(pos));

        Ok(if step >= 0.0 { pos <= end } else { pos >= end })
    }

    pub fn break_loop(&mut self) -> VmResult<()> {
        loop {
            let entry = self.pop_block()?;
            if entry.kind != BlockKind::If {
                self.for_state.remove(&(entry.line, entry.col));
                let (end_line, end_col) = self.find_end_only(entry.line + 1)?;
                self.goto(end_line, end_col)?;
                self.inc();
                return Ok(());
            }
        }
    }

    pub fn continue_loop(&mut self) -> VmResult<()> {
        loop {
            let entry = self.pop_block()?;
            if entry.kind != BlockKind::If {
                return self.resume_block(entry);
            }
        }
    }

    // --- Goto / Lbl --------------------------------------------------------

    pub fn goto_label(&mut self, token: &Token) -> VmResult<()> {
        let arg = token
            .arg
            .as_ref()
            .ok_or_else(|| ExecutionError::new("Goto without a label"))?;
        let target = crate::stdlib::control::guess_label(arg, self)?;
        self.goto_to_label(&target)
    }

    /// Scan forward (wrapping) from the cursor for a `Lbl` whose own name
    /// matches `target`, and jump there. Shared by `Goto` (whose target
    /// comes from an absorbed argument) and `Menu` (whose target is
    /// whatever label string the user picked at the prompt).
    pub fn goto_to_label(&mut self, target: &str) -> VmResult<()> {
        let n = self.code.len();
        let start = self.cursor.0;
        for offset in 0..n {
            let i = (start + offset) % n;
            let node = self.code[i].first().cloned();
            if let Some(Node::Tok(t)) = node {
                if t.kind == TokenKind::Lbl {
                    if let Some(arg2) = t.arg.clone() {
                        let candidate = crate::stdlib::control::guess_label(&arg2, self)?;
                        if candidate == target {
                            self.goto(i, 0)?;
                            return Ok(());
                        }
                    }
                }
            }
        }
        Err(ExecutionError::new(format!("Goto: no Lbl found for {target}")).into())
    }

    // --- prgm<NAME> ---------------------------------------------------------

    pub fn call_prgm(&mut self, name: &str) -> VmResult<()> {
        let path = self.resolve_prgm(name)?;
        let source = std::fs::read_to_string(&path)
            .map_err(|e| ExecutionError::new(format!("cannot read {}: {e}", path.display())))?;
        let code = Builder::build(&source)?;

        let io = self.take_io();
        let mut sub = Vm::new(code, io);
        sub.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| self.base_dir.clone());
        let result = sub.run_as_subprogram();
        self.set_io(sub.take_io());
        result
    }

    fn resolve_prgm(&self, name: &str) -> VmResult<PathBuf> {
        let entries = std::fs::read_dir(&self.base_dir)
            .map_err(|e| ExecutionError::new(format!("cannot read {}: {e}", self.base_dir.display())))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("bas") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem.eq_ignore_ascii_case(name) {
                    return Ok(path);
                }
            }
        }
        Err(ExecutionError::new(format!("prgm{name} not found in {}", self.base_dir.display())).into())
    }

    // --- REPL ----------------------------------------------------------------

    fn handle_repl(&mut self) -> VmResult<()> {
        loop {
            let line = match self.io.input(">>>", true) {
                Ok(l) => l,
                Err(_) => return Err(Flow::Stop(None)),
            };
            if line.trim().is_empty() {
                continue;
            }
            match Builder::build(&line) {
                Ok(rows) => {
                    let insert_at = self.cursor.0;
                    for (i, row) in rows.into_iter().enumerate() {
                        self.code.insert(insert_at + i, row);
                    }
                    self.repl_serial += 1;
                    return Ok(());
                }
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            }
        }
    }

    // --- main loop -----------------------------------------------------------

    /// Execute exactly one token/expression at the cursor: a statement's
    /// `run`, or a value-producing node's `eval` (writing the result to
    /// `Ans`). Public so `If`'s single-statement-body form can dispatch a
    /// single step without re-entering the whole loop.
    pub fn step(&mut self) -> VmResult<()> {
        let node = self.cur_node();
        match node {
            Node::Tok(t) if t.kind == TokenKind::Eof => Err(Flow::Stop(None)),
            Node::Tok(t) if t.kind == TokenKind::ReplSentinel => self.handle_repl(),
            Node::Tok(t) if t.kind.can_run() => {
                trace!("run {:?} at ({}, {})", t.kind, self.cursor.0, self.cursor.1);
                self.running.push((self.cursor.0, self.cursor.1, t.kind.clone()));
                self.push_history((self.cursor.0, self.cursor.1, t.kind.clone()));
                self.inc();
                let result = crate::stdlib::run(&t, self);
                self.running.pop();
                result
            }
            other => {
                let value = crate::expr::eval(&other, self)?;
                self.inc();
                self.set_ans(value);
                Ok(())
            }
        }
    }

    fn drive(&mut self, swallow_return: bool) -> VmResult<()> {
        loop {
            match self.step() {
                Ok(()) => continue,
                Err(Flow::Stop(_)) => return Ok(()),
                Err(Flow::Return) if swallow_return => return Ok(()),
                Err(Flow::Return) => return Err(Flow::Return),
                Err(e) => return Err(e),
            }
        }
    }

    /// Run to completion. `Stop`/`Return`/reaching EOF all end the program
    /// successfully; only a real [`crate::error::InterpError`] propagates.
    pub fn run(&mut self) -> VmResult<()> {
        self.drive(true)
    }

    /// Run to completion as a `prgm<NAME>` callee: `Stop` (or EOF) ends
    /// just this sub-interpreter, but `Return` propagates further up
    /// (spec.md §5: "`ReturnError` signals early exit from the outermost
    /// program when inside `prgm…` invocations").
    pub fn run_as_subprogram(&mut self) -> VmResult<()> {
        self.drive(false)
    }
}
