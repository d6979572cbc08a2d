//! Line-oriented `IO` backend: plain stdin/stdout, one value per line.
//! Grounded on `pitybas/io/simple.py` — no screen model, no raw mode.

use super::{Io, MenuSection};
use crate::value::Value;
use std::io::{self, Write};

#[derive(Default)]
pub struct SimpleIo;

impl SimpleIo {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self, prompt: &str) -> io::Result<String> {
        if !prompt.is_empty() {
            print!("{prompt} ");
            io::stdout().flush()?;
        }
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

impl Io for SimpleIo {
    fn clear(&mut self) {
        println!("{}", "-".repeat(16));
    }

    fn disp(&mut self, value: &Value) {
        println!("{value}");
    }

    fn output(&mut self, _row: usize, _col: usize, value: &Value) {
        println!("{value}");
    }

    fn input(&mut self, prompt: &str, _is_str: bool) -> io::Result<String> {
        self.read_line(prompt)
    }

    fn getkey(&mut self) -> u32 {
        0
    }

    fn pause(&mut self, msg: Option<&Value>) {
        if let Some(m) = msg {
            self.disp(m);
        }
        let _ = self.read_line("[press enter]");
    }

    fn menu(&mut self, sections: &[MenuSection]) -> io::Result<String> {
        loop {
            let mut lookup = Vec::new();
            let mut i = 1;
            for section in sections {
                println!("-[ {} ]-", section.title);
                for (name, label) in &section.entries {
                    println!("{i}: {name}");
                    lookup.push(label.clone());
                    i += 1;
                }
            }
            let choice = self.read_line("choice?")?;
            println!();
            if let Ok(n) = choice.parse::<usize>() {
                if n >= 1 && n <= lookup.len() {
                    return Ok(lookup[n - 1].clone());
                }
            }
            println!("invalid choice");
        }
    }
}
