use std::fs;

use anyhow::{anyhow, Context as _};
use inkwell::context::Context;
use inkwell::execution_engine::JitFunction;
use inkwell::targets::{InitializationConfig, Target};
use inkwell::OptimizationLevel;
use log::info;

use rutaceae::{ast, codegen};

use crate::cli::RunArgs;

/// `run <input> [-v]`: runs the core pipeline, verifies the module,
/// then executes it in-process via an MCJIT execution engine, propagating
/// `main`'s return value as the process exit code.
pub fn run_jit(args: &RunArgs) -> anyhow::Result<i32> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("reading '{}'", args.input.display()))?;

    let context = Context::create();
    let module_name = args.input.to_string_lossy();

    let program = ast::parse_program(&source).map_err(|e| anyhow!(e))?;
    if args.verbose {
        info!("Parsed AST:\n{program:#?}");
    }

    let ctx = codegen::codegen_program(&context, &module_name, &program).map_err(|e| anyhow!(e))?;
    if args.verbose {
        info!("Generated IR:\n{}", ctx.module.print_to_string().to_string());
    }

    ctx.module
        .verify()
        .map_err(|e| anyhow!("module failed verification: {}", e.to_string()))?;

    Target::initialize_native(&InitializationConfig::default())
        .map_err(|e| anyhow!("failed to initialize native target: {e}"))?;

    let execution_engine = ctx
        .module
        .create_jit_execution_engine(OptimizationLevel::None)
        .map_err(|e| anyhow!("failed to create JIT execution engine: {}", e.to_string()))?;

    type MainFn = unsafe extern "C" fn() -> i32;
    let main_fn: JitFunction<MainFn> = unsafe {
        execution_engine
            .get_function("main")
            .map_err(|e| anyhow!("no 'main' function in module: {}", e.to_string()))?
    };

    let code = unsafe { main_fn.call() };
    Ok(code)
}
