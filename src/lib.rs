//! Rutaceae: an ahead-of-time compiler for a small statically-typed
//! imperative language, targeting LLVM IR.
//!
//! This crate is the compiler core: a grammar front end ([`ast::parse_program`])
//! that turns source text into a typed AST, and a code generator
//! ([`codegen::codegen_program`]) that lowers that AST into an LLVM IR
//! module. Everything outside the core — CLI parsing, object emission,
//! linking, and JIT execution — lives in the `rutaceae` binary (`src/bin`)
//! and is built on top of this library.

pub mod ast;
pub mod codegen;
pub mod error;

use inkwell::context::Context;
use inkwell::module::Module;

use crate::error::CompileError;

/// Runs the whole pipeline — parse, build AST, emit IR — against a fresh
/// module owned by `context`. This is the crate's single public entry
/// point; callers that need the AST or the populated `CodegenContext`
/// individually can call [`ast::parse_program`] and [`codegen::codegen_program`]
/// directly instead.
pub fn compile_to_ir<'ctx>(
    context: &'ctx Context,
    module_name: &str,
    source: &str,
) -> Result<Module<'ctx>, CompileError> {
    let program = ast::parse_program(source)?;
    let ctx = codegen::codegen_program(context, module_name, &program)?;
    Ok(ctx.module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_a_main_function_returning_i32() {
        let context = Context::create();
        let module = compile_to_ir(&context, "test", "fn int main() { return 42; }").unwrap();
        let ir = module.print_to_string().to_string();
        assert!(ir.contains("define i32 @main()"));
        assert!(ir.contains("ret i32 42"));
    }

    #[test]
    fn forward_reference_compiles_with_two_pass_emission() {
        let context = Context::create();
        let source = "fn int a() { return b(); } fn int b() { return 0; }";
        let module = compile_to_ir(&context, "test", source).unwrap();
        let ir = module.print_to_string().to_string();
        assert!(ir.contains("declare i32 @b()") || ir.contains("define i32 @b()"));
        assert!(ir.contains("call i32 @b()"));
    }

    #[test]
    fn const_reassignment_is_rejected_before_codegen_finishes() {
        let context = Context::create();
        let source = "fn int main() { const x = 5; x = 6; return 0; }";
        let err = compile_to_ir(&context, "test", source).unwrap_err();
        assert_eq!(err.kind(), "MutabilityError");
    }

    #[test]
    fn undeclared_identifier_is_a_name_error() {
        let context = Context::create();
        let err = compile_to_ir(&context, "test", "fn int main() { return missing; }").unwrap_err();
        assert_eq!(err.kind(), "NameError");
    }

    #[test]
    fn wrong_argument_count_is_an_arity_error() {
        let context = Context::create();
        let source = "fn int add(int a, int b) { return a + b; } fn int main() { return add(1); }";
        let err = compile_to_ir(&context, "test", source).unwrap_err();
        assert_eq!(err.kind(), "ArityError");
    }

    #[test]
    fn int_plus_float_binary_op_promotes_to_double() {
        let context = Context::create();
        let source = "fn int main() { let f = 1.5; let i = 2; print(f + i); return 0; }";
        let module = compile_to_ir(&context, "test", source).unwrap();
        let ir = module.print_to_string().to_string();
        assert!(ir.contains("sitofp"));
        assert!(ir.contains("fadd"));
    }

    #[test]
    fn unannotated_let_copying_a_float_variable_infers_float() {
        let context = Context::create();
        let source = "fn int main() { let f = 1.5; let g = f; return 0; }";
        let module = compile_to_ir(&context, "test", source).unwrap();
        let ir = module.print_to_string().to_string();
        assert!(ir.contains("%g = alloca double"));
    }

    #[test]
    fn unannotated_let_from_a_comparison_infers_bool() {
        let context = Context::create();
        let source = "fn int main() { let x = 1; let y = 2; let b = (x < y); return 0; }";
        let module = compile_to_ir(&context, "test", source).unwrap();
        let ir = module.print_to_string().to_string();
        assert!(ir.contains("%b = alloca i1"));
    }

    #[test]
    fn if_else_where_both_arms_return_produces_a_verifiable_module() {
        let context = Context::create();
        let source = "fn int main() { if (true) { return 1; } else { return 2; } }";
        let module = compile_to_ir(&context, "test", source).unwrap();
        assert!(module.verify().is_ok());
        let ir = module.print_to_string().to_string();
        assert!(!ir.contains("if.merge:"));
    }
}
