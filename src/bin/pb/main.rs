//! # pb
//!
//! This binary is a tree-walking interpreter for a TI-83/84 BASIC dialect.
//! It loads a `.bas` file and runs it, or falls into a REPL when given none.

mod cli;

use cli::*;

use std::fs;

use log::{error, info};
use pb::error::Flow;
use pb::io::simple::SimpleIo;
use pb::io::vt100::Vt100Io;
use pb::io::Io;
use pb::tree::Builder;
use pb::Vm;

fn make_io(backend: &IoBackend) -> Box<dyn Io> {
    match backend {
        IoBackend::Simple => Box::new(SimpleIo::new()),
        IoBackend::Vt100 => Box::new(Vt100Io::new().unwrap_or_else(|e| {
            eprintln!("failed to initialize vt100 IO: {e}");
            std::process::exit(1);
        })),
    }
}

fn main() {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let source = match &args.file {
        Some(path) => match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                error!("cannot read {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => String::new(),
    };

    if args.verbose {
        dump_tokens(&source);
    }

    let code = match Builder::build(&source) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    if args.ast {
        println!("{code:#?}");
        return;
    }

    let io = make_io(&args.io);
    let mut vm = Vm::new(code, io);

    if let Some(path) = &args.file {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            vm.base_dir = dir.to_path_buf();
        }
    }

    if args.file.is_none() {
        vm.enable_repl();
    }

    match vm.run() {
        Ok(()) => {
            if args.stacktrace {
                print_history(&vm, args.dump);
            }
        }
        Err(Flow::Error(e)) => {
            eprintln!("{e}");
            print_history(&vm, args.dump);
            std::process::exit(2);
        }
        Err(flow) => {
            info!("{flow}");
        }
    }
}

fn dump_tokens(source: &str) {
    use pb::lexer::{Lexer, RawToken};
    let mut lexer = Lexer::new(source);
    let mut operand_context = true;
    loop {
        match lexer.next_raw(operand_context) {
            Ok(RawToken::Eof) => {
                println!("{:?}", RawToken::Eof);
                break;
            }
            Ok(tok) => {
                operand_context = !matches!(
                    tok,
                    RawToken::Number(_) | RawToken::Close(_) | RawToken::ListName(_) | RawToken::MatrixName(_)
                );
                println!("{tok:?}");
            }
            Err(e) => {
                println!("<lex error: {e}>");
                break;
            }
        }
    }
}

fn print_history(vm: &Vm, with_vars: bool) {
    eprintln!("history:");
    for (line, col, kind) in vm.history_tail(6) {
        eprintln!("  ({line}, {col}) {kind:?}");
    }
    if with_vars {
        eprintln!("variables:");
        for (name, value) in vm.vars_snapshot() {
            eprintln!("  {name} = {value}");
        }
    }
}
