use std::fs;
use std::process::Command;

use anyhow::{anyhow, Context as _};
use inkwell::context::Context;
use inkwell::targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine};
use inkwell::OptimizationLevel;
use log::info;

use rutaceae::{ast, codegen};

use crate::cli::BuildArgs;

/// `build <input> [-o <output>] [-v]`: runs the core pipeline,
/// verifies the module, emits a relocatable object file, then invokes the
/// system C compiler to link it into an executable.
pub fn build_executable(args: &BuildArgs) -> anyhow::Result<()> {
    if args.render_parse_tree {
        log::warn!("parse-tree rendering was requested but is not implemented");
    }

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

    let triple = TargetMachine::get_default_triple();
    let target = Target::from_triple(&triple).map_err(|e| anyhow!(e.to_string()))?;
    let cpu = TargetMachine::get_host_cpu_name().to_string();
    let features = TargetMachine::get_host_cpu_features().to_string();

    let target_machine = target
        .create_target_machine(
            &triple,
            &cpu,
            &features,
            OptimizationLevel::Default,
            RelocMode::Default,
            CodeModel::Default,
        )
        .ok_or_else(|| anyhow!("failed to create a target machine for '{triple}'"))?;

    ctx.module.set_triple(&triple);
    ctx.module
        .set_data_layout(&target_machine.get_target_data().get_data_layout());

    let object_path = args.output.with_extension("o");
    target_machine
        .write_to_file(&ctx.module, FileType::Object, &object_path)
        .map_err(|e| anyhow!("failed to emit object file: {}", e.to_string()))?;

    link(&object_path, &args.output)?;
    let _ = fs::remove_file(&object_path);

    Ok(())
}

/// Invokes the system C compiler (`cc`, falling back to `gcc`) to link the
/// object file into an executable linked against libc (for `printf`).
fn link(object_path: &std::path::Path, output_path: &std::path::Path) -> anyhow::Result<()> {
    for linker in ["cc", "gcc"] {
        let status = Command::new(linker)
            .arg(object_path)
            .arg("-o")
            .arg(output_path)
            .status();

        match status {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => {
                return Err(anyhow!("{linker} exited with status {status}"));
            }
            Err(_) => continue,
        }
    }

    Err(anyhow!("could not find a working system C compiler (tried 'cc' and 'gcc')"))
}
