//! # Rutaceae
//!
//! This binary is the driver for the Rutaceae compiler. It wires the
//! `rutaceae` library's grammar/AST/codegen core to a CLI, a system linker,
//! and an in-process JIT. None of this file's logic feeds back into the
//! core's correctness; it exists so the crate is a complete, runnable
//! compiler.

mod cli;
mod commands;

use cli::*;

fn main() {
    let args = Cli::init();
    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let result = match &args.command {
        Commands::Build(build_args) => commands::build_executable(build_args).map(|_| 0),
        Commands::Run(run_args) => commands::run_jit(run_args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            log::error!("{err}");
            std::process::exit(exit_code_for(&err));
        }
    }
}

/// Maps a driver-level failure to a small stable exit code: 1 for a
/// compile (parse/build) failure, 2 for a linker failure, 3 for any other
/// I/O failure.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.chain().any(|cause| cause.downcast_ref::<std::io::Error>().is_some()) {
        3
    } else if err.to_string().contains("exited with status")
        || err.to_string().contains("system C compiler")
    {
        2
    } else {
        1
    }
}
