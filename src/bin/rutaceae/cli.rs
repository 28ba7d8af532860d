//! Everything needed for parsing the CLI arguments for Rutaceae.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
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

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a Rutaceae source file to a linked native executable.
    Build(BuildArgs),

    /// Compile and immediately execute a Rutaceae source file in-process via the JIT.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// The path to the rutaceae source file.
    #[arg(index = 1)]
    pub input: std::path::PathBuf,

    /// The path to the output executable.
    #[arg(short, long, default_value = "a.out")]
    pub output: std::path::PathBuf,

    /// Print the parsed AST and the generated LLVM IR before linking.
    #[arg(short, long)]
    pub verbose: bool,

    /// Also emit a PNG rendering of the parse tree. Accepted but not
    /// implemented (parse-tree visualization is out of scope).
    #[arg(long)]
    pub render_parse_tree: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// The path to the rutaceae source file.
    #[arg(index = 1)]
    pub input: std::path::PathBuf,

    /// Print the parsed AST and the generated LLVM IR before executing.
    #[arg(short, long)]
    pub verbose: bool,
}
