use crate::ast::{FunctionDef, TypeTag};
use crate::error::CompileError;

use super::statement::codegen_block;
use super::CodegenContext;

/// Pass A: create the IR function and name its parameters, but do
/// not touch its body yet. Populates the function table so later bodies —
/// including ones appearing earlier in the source — can call it.
pub fn register_declaration<'ctx>(
    ctx: &CodegenContext<'ctx>,
    function: &FunctionDef,
) -> Result<(), CompileError> {
    let param_types: Vec<TypeTag> = function.params.iter().map(|p| p.ty).collect();
    let fn_type = ctx.build_function_type(&param_types, function.return_type);
    let fn_value = ctx.module.add_function(&function.name, fn_type, None);

    for (param_value, param) in fn_value.get_param_iter().zip(function.params.iter()) {
        param_value.set_name(&param.name);
    }

    ctx.register_function(&function.name, fn_value, param_types, function.return_type);
    Ok(())
}

/// Pass B: build the entry block, bind parameters into a fresh
/// scope, and lower the body.
pub fn codegen_function<'ctx>(
    ctx: &CodegenContext<'ctx>,
    function: &FunctionDef,
) -> Result<(), CompileError> {
    let (fn_value, _, _) = ctx
        .lookup_function(&function.name)
        .expect("every function was registered in the declare pass");

    ctx.set_current_function(fn_value);
    ctx.clear_const_names();

    let entry = ctx.context.append_basic_block(fn_value, "entry");
    ctx.builder.position_at_end(entry);

    ctx.push_scope();

    for (param_value, param) in fn_value.get_param_iter().zip(function.params.iter()) {
        let slot = ctx
            .builder
            .build_alloca(ctx.llvm_basic_type(param.ty), &param.name)
            .expect("alloca of a parameter slot never fails");
        ctx.builder
            .build_store(slot, param_value)
            .expect("store of an incoming parameter value never fails");
        ctx.declare_variable(&param.name, slot, param.ty);
    }

    codegen_block(ctx, &function.body)?;

    // Non-void functions are required by the language contract to end in an
    // explicit `return`; we do not synthesize one. Void functions
    // fall off the end into an implicit `ret void`.
    let still_open = ctx
        .builder
        .get_insert_block()
        .and_then(|b| b.get_terminator())
        .is_none();

    if still_open && function.return_type == TypeTag::Void {
        ctx.builder
            .build_return(None)
            .expect("ret void never fails to build");
    }

    ctx.pop_scope();

    Ok(())
}
