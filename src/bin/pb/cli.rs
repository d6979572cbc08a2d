//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for pb.

use clap::{Parser, ValueEnum};

/// Struct containing the CLI configuration for pb.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The program to run. With no file, starts a REPL.
    #[arg(index = 1)]
    pub file: Option<std::path::PathBuf>,

    /// Dump the token stream before running.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the parsed AST and exit.
    #[arg(short, long)]
    pub ast: bool,

    /// Print a history of the last executed tokens after a successful run.
    #[arg(short, long)]
    pub stacktrace: bool,

    /// Include a variable dump in crash/stacktrace output.
    #[arg(short, long)]
    pub dump: bool,

    /// Select the IO backend.
    #[arg(short, long, value_enum, default_value_t = IoBackend::Simple)]
    pub io: IoBackend,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short = 'l', long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum IoBackend {
    Simple,
    Vt100,
}

/// Enum for specifying the log level of pb.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// Also log warnings.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the VM.
    #[value(alias("2"))]
    Info,

    /// Log every statement the VM executes.
    #[value(alias("3"))]
    Debug,

    /// Log everything, including expression-level detail.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
