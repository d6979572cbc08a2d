//! 16x8 VT100 screen emulation, grounded on `pitybas/io/vt100.py`'s `VT`
//! class: a fixed character grid, scroll-on-overflow, and absolute
//! positioning via `output(row, col)`. Raw-mode keypolling and scoped
//! terminal setup/restore use `crossterm`, this pack's idiomatic choice
//! for terminal control (the teacher has no dependency of its own here).

use super::{Io, MenuSection};
use crate::value::Value;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::io::{self, Write};
use std::time::Duration;

const WIDTH: usize = 16;
const HEIGHT: usize = 8;

/// RAII guard: enables raw mode and hides the cursor on construction,
/// restores both on drop, so an abnormal exit (a propagating
/// `ExecutionError` or `^C`) still leaves the terminal usable.
pub struct Vt100Io {
    lines: Vec<Vec<char>>,
    row: usize,
    col: usize,
    pos_stack: Vec<(usize, usize)>,
    raw_mode: bool,
}

impl Vt100Io {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        print!("\x1b[?25l");
        io::stdout().flush()?;
        Ok(Self {
            lines: vec![vec![' '; WIDTH]; HEIGHT],
            row: 1,
            col: 1,
            pos_stack: Vec::new(),
            raw_mode: true,
        })
    }

    fn push_pos(&mut self) {
        self.pos_stack.push((self.row, self.col));
    }

    fn pop_pos(&mut self) {
        if let Some((r, c)) = self.pos_stack.pop() {
            self.row = r;
            self.col = c;
        }
    }

    fn move_to(&mut self, row: usize, col: usize) {
        self.row = row;
        self.col = col;
        print!("\x1b[{row};{col}H");
    }

    fn scroll(&mut self) {
        self.lines.remove(0);
        self.lines.push(vec![' '; WIDTH]);
        self.row = self.row.saturating_sub(1).max(1);
    }

    fn flush_screen(&mut self) {
        print!("\x1b[2J\x1b[H");
        let data: String = self
            .lines
            .iter()
            .map(|l| l.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\r\n");
        print!("{data}");
        let _ = io::stdout().flush();
    }

    fn wrap(&self, msg: &str) -> Vec<String> {
        let chars: Vec<char> = msg.chars().collect();
        let first_len = (WIDTH + 1).saturating_sub(self.col).min(chars.len());
        let mut lines = vec![chars[..first_len].iter().collect::<String>()];
        let mut rest = &chars[first_len..];
        while !rest.is_empty() {
            let n = rest.len().min(WIDTH);
            lines.push(rest[..n].iter().collect());
            rest = &rest[n..];
        }
        lines
    }

    fn write(&mut self, msg: &str) {
        let (mut row, mut col) = (self.row, self.col);
        print!("\x1b[{row};{col}H");
        for line in self.wrap(msg) {
            if row > HEIGHT {
                row -= 1;
                self.scroll();
                let (r, _) = (self.row, self.col);
                row = r;
                col = 1;
                self.flush_screen();
                self.move_to(row, 1);
            }
            for ch in line.chars() {
                if row >= 1 && row <= HEIGHT && col >= 1 && col <= WIDTH {
                    self.lines[row - 1][col - 1] = ch;
                }
                print!("{ch}");
                col += 1;
            }
            col = 1;
            row += 1;
            println!("\r");
        }
        self.row = row;
        self.col = col;
        let _ = io::stdout().flush();
    }

    fn output_at(&mut self, row: usize, col: usize, msg: &str) {
        print!("\x1b7");
        let old = (self.row, self.col);
        self.move_to(row.min(HEIGHT).max(1), col.min(WIDTH).max(1));
        self.write(msg);
        self.row = old.0;
        self.col = old.1;
        print!("\x1b8");
        let _ = io::stdout().flush();
    }

    fn getch(&self) -> io::Result<Option<String>> {
        if !event::poll(Duration::from_millis(100))? {
            return Ok(None);
        }
        if let Event::Key(key) = event::read()? {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "^C"));
            }
            return Ok(match key.code {
                KeyCode::Up => Some("up".to_string()),
                KeyCode::Down => Some("down".to_string()),
                KeyCode::Left => Some("left".to_string()),
                KeyCode::Right => Some("right".to_string()),
                KeyCode::Enter => Some("enter".to_string()),
                KeyCode::Char(c) => Some(c.to_string()),
                _ => None,
            });
        }
        Ok(None)
    }

    fn key_code(name: &str) -> u32 {
        match name {
            "left" => 24,
            "up" => 25,
            "right" => 26,
            "down" => 34,
            "A" => 41,
            "B" => 42,
            "C" => 43,
            "D" => 51,
            "E" => 52,
            "F" => 53,
            "G" => 54,
            "H" => 55,
            "I" => 61,
            "J" => 62,
            "K" => 63,
            "L" => 64,
            "M" => 65,
            "N" => 71,
            "O" => 72,
            "P" => 73,
            "Q" => 74,
            "R" => 75,
            "S" => 81,
            "T" => 82,
            "U" => 83,
            "V" => 84,
            "W" => 85,
            "X" => 91,
            "Y" => 92,
            "Z" => 93,
            "\"" => 95,
            " " => 102,
            ":" => 103,
            "?" => 104,
            "enter" => 105,
            _ => 0,
        }
    }
}

impl Drop for Vt100Io {
    fn drop(&mut self) {
        if self.raw_mode {
            print!("\x1b[?25h");
            let _ = io::stdout().flush();
            let _ = terminal::disable_raw_mode();
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Int(_) | Value::Float(_) | Value::Complex(_) => format!("{value:>16}"),
        other => format!("{other}"),
    }
}

impl Io for Vt100Io {
    fn clear(&mut self) {
        self.lines = vec![vec![' '; WIDTH]; HEIGHT];
        self.row = 1;
        self.col = 1;
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
    }

    fn disp(&mut self, value: &Value) {
        self.write(&display_value(value));
    }

    fn output(&mut self, row: usize, col: usize, value: &Value) {
        self.output_at(row, col, &value.to_string());
    }

    fn input(&mut self, prompt: &str, _is_str: bool) -> io::Result<String> {
        loop {
            self.push_pos();
            self.move_to(HEIGHT + 1, 1);
            terminal::disable_raw_mode()?;
            print!("\x1b[?25h");
            if !prompt.is_empty() {
                print!("{prompt} ");
            }
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            print!("\x1b[?25l");
            terminal::enable_raw_mode()?;
            self.flush_screen();
            self.pop_pos();
            return Ok(line.trim_end_matches(['\n', '\r']).to_string());
        }
    }

    fn getkey(&mut self) -> u32 {
        match self.getch() {
            Ok(Some(name)) => Self::key_code(&name),
            _ => 0,
        }
    }

    fn pause(&mut self, msg: Option<&Value>) {
        if let Some(m) = msg {
            self.disp(m);
        }
        let _ = self.input("[press enter]", true);
    }

    fn menu(&mut self, sections: &[MenuSection]) -> io::Result<String> {
        loop {
            self.clear();
            let mut lookup = Vec::new();
            let mut i = 1;
            for section in sections {
                self.write(&format!("-[ {} ]-", section.title));
                for (name, label) in &section.entries {
                    self.write(&format!("{i}: {name}"));
                    lookup.push(label.clone());
                    i += 1;
                }
            }
            let choice = self.input("choice?", true)?;
            if let Ok(n) = choice.parse::<usize>() {
                if n >= 1 && n <= lookup.len() {
                    self.flush_screen();
                    return Ok(lookup[n - 1].clone());
                }
            }
            self.write("invalid choice");
        }
    }
}
