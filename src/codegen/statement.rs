//! Statement lowering and block termination tracking.

use inkwell::values::BasicMetadataValueEnum;
use inkwell::IntPredicate;

use crate::ast::{Block, Declaration, Statement, TypeTag};
use crate::error::{CompileError, ControlError, MutabilityError, NameError, Position, TypeError};

use super::expression::{apply_binary_op, codegen_expression, codegen_global_string, Typed};
use super::CodegenContext;

/// Whether the block currently being built already has a terminator. Once
/// true, further statements in the same straight-line sequence are dead
/// code and are not lowered — emitting their instructions anyway would put
/// them after the block's terminator, which LLVM's verifier rejects (a
/// basic block has exactly one terminator, and it is always last).
fn block_is_terminated<'ctx>(ctx: &CodegenContext<'ctx>) -> bool {
    ctx.builder
        .get_insert_block()
        .and_then(|b| b.get_terminator())
        .is_some()
}

pub fn codegen_block<'ctx>(ctx: &CodegenContext<'ctx>, block: &Block) -> Result<(), CompileError> {
    for statement in &block.statements {
        if block_is_terminated(ctx) {
            break;
        }
        codegen_statement(ctx, statement)?;
    }
    Ok(())
}

fn codegen_statement<'ctx>(ctx: &CodegenContext<'ctx>, stmt: &Statement) -> Result<(), CompileError> {
    match stmt {
        Statement::Declaration(decl) => codegen_declaration(ctx, decl),
        Statement::Assignment {
            name,
            value,
            position,
        } => codegen_assignment(ctx, name, value, *position),
        Statement::CompoundAssign {
            name,
            op,
            value,
            position,
        } => codegen_compound_assign(ctx, name, op, value, *position),
        Statement::Increment { name, position } => codegen_step(ctx, name, *position, true),
        Statement::Decrement { name, position } => codegen_step(ctx, name, *position, false),
        Statement::If {
            condition,
            then_block,
            else_block,
            position,
        } => codegen_if(ctx, condition, then_block, else_block.as_ref(), *position),
        Statement::While {
            condition,
            body,
            position,
        } => codegen_while(ctx, condition, body, *position),
        Statement::For {
            init,
            condition,
            update,
            body,
            position,
        } => codegen_for(ctx, init.as_deref(), condition, update.as_deref(), body, *position),
        Statement::Break { position } => codegen_break(ctx, *position),
        Statement::Continue { position } => codegen_continue(ctx, *position),
        Statement::Return { value, position } => codegen_return(ctx, value.as_ref(), *position),
        Statement::Print { values, position } => codegen_print(ctx, values, *position),
    }
}

/// Coerces `value` into `target`, applying only the two widenings defined
/// for binary-op promotion (`int -> float`, `bool -> int`). Any other
/// mismatch is a `TypeError` rather than a silent conversion.
fn coerce_to<'ctx>(
    ctx: &CodegenContext<'ctx>,
    value: Typed<'ctx>,
    target: TypeTag,
    position: Position,
) -> Result<Typed<'ctx>, CompileError> {
    if value.ty == target {
        return Ok(value);
    }

    match (value.ty, target) {
        (TypeTag::Int, TypeTag::Float) => {
            let promoted = ctx
                .builder
                .build_signed_int_to_float(value.value.into_int_value(), ctx.context.f64_type(), "")
                .expect("sitofp never fails");
            Ok(Typed::new(promoted.into(), TypeTag::Float))
        }
        (TypeTag::Bool, TypeTag::Int) => {
            let promoted = ctx
                .builder
                .build_int_z_extend(value.value.into_int_value(), ctx.context.i32_type(), "")
                .expect("zext never fails");
            Ok(Typed::new(promoted.into(), TypeTag::Int))
        }
        (from, to) => Err(CompileError::Type(TypeError {
            position,
            message: format!("cannot store a value of type '{from}' into a slot of type '{to}'"),
        })),
    }
}

/// Declaration type inference (performed here rather than in the AST
/// builder): an explicit annotation wins; otherwise the slot type is
/// whatever IR type the (already-lowered) initializer produced, and an
/// absent initializer defaults to `int`.
fn infer_declaration_type<'ctx>(decl: &Declaration, init_value: Option<&Typed<'ctx>>) -> TypeTag {
    if let Some(ty) = decl.ty {
        return ty;
    }
    match init_value {
        Some(value) => value.ty,
        None => TypeTag::Int,
    }
}

fn codegen_declaration<'ctx>(ctx: &CodegenContext<'ctx>, decl: &Declaration) -> Result<(), CompileError> {
    let lowered_init = match &decl.init {
        Some(expr) => Some(codegen_expression(ctx, expr)?),
        None => None,
    };

    let slot_type = infer_declaration_type(decl, lowered_init.as_ref());

    let init_value = match lowered_init {
        Some(value) => Some(coerce_to(ctx, value, slot_type, decl.position)?),
        None => None,
    };

    let slot = ctx
        .builder
        .build_alloca(ctx.llvm_basic_type(slot_type), &decl.name)
        .expect("alloca never fails");

    if let Some(value) = init_value {
        ctx.builder
            .build_store(slot, value.value)
            .expect("store never fails");
    }

    if !ctx.declare_variable(&decl.name, slot, slot_type) {
        return Err(CompileError::Name(NameError {
            position: decl.position,
            name: decl.name.clone(),
            message: "already declared in this scope".to_string(),
        }));
    }

    if decl.is_const {
        ctx.mark_const(&decl.name);
    }

    Ok(())
}

fn require_mutable<'ctx>(
    ctx: &CodegenContext<'ctx>,
    name: &str,
    position: Position,
) -> Result<(inkwell::values::PointerValue<'ctx>, TypeTag), CompileError> {
    let slot = ctx.find_variable(name, position)?;
    if ctx.is_const(name) {
        return Err(CompileError::Mutability(MutabilityError {
            position,
            name: name.to_string(),
        }));
    }
    Ok(slot)
}

fn codegen_assignment<'ctx>(
    ctx: &CodegenContext<'ctx>,
    name: &str,
    expr: &crate::ast::Expression,
    position: Position,
) -> Result<(), CompileError> {
    let (ptr, ty) = require_mutable(ctx, name, position)?;
    let value = codegen_expression(ctx, expr)?;
    let coerced = coerce_to(ctx, value, ty, position)?;
    ctx.builder
        .build_store(ptr, coerced.value)
        .expect("store never fails");
    Ok(())
}

fn codegen_compound_assign<'ctx>(
    ctx: &CodegenContext<'ctx>,
    name: &str,
    op: &str,
    expr: &crate::ast::Expression,
    position: Position,
) -> Result<(), CompileError> {
    let (ptr, ty) = require_mutable(ctx, name, position)?;
    let current = ctx
        .builder
        .build_load(ctx.llvm_basic_type(ty), ptr, name)
        .expect("load never fails");
    let current = Typed::new(current, ty);

    let rhs = codegen_expression(ctx, expr)?;
    let base_op = &op[..op.len() - 1]; // "+=" -> "+"
    let result = apply_binary_op(ctx, base_op, current, rhs, position)?;
    let coerced = coerce_to(ctx, result, ty, position)?;

    ctx.builder
        .build_store(ptr, coerced.value)
        .expect("store never fails");
    Ok(())
}

fn codegen_step<'ctx>(
    ctx: &CodegenContext<'ctx>,
    name: &str,
    position: Position,
    increment: bool,
) -> Result<(), CompileError> {
    let (ptr, ty) = require_mutable(ctx, name, position)?;
    let current = ctx
        .builder
        .build_load(ctx.llvm_basic_type(ty), ptr, name)
        .expect("load never fails");

    let updated = match ty {
        TypeTag::Float => {
            let one = ctx.context.f64_type().const_float(1.0);
            if increment {
                ctx.builder
                    .build_float_add(current.into_float_value(), one, "")
                    .expect("fadd never fails")
                    .into()
            } else {
                ctx.builder
                    .build_float_sub(current.into_float_value(), one, "")
                    .expect("fsub never fails")
                    .into()
            }
        }
        TypeTag::Int => {
            let one = ctx.context.i32_type().const_int(1, false);
            if increment {
                ctx.builder
                    .build_int_add(current.into_int_value(), one, "")
                    .expect("add never fails")
                    .into()
            } else {
                ctx.builder
                    .build_int_sub(current.into_int_value(), one, "")
                    .expect("sub never fails")
                    .into()
            }
        }
        other => {
            return Err(CompileError::Type(TypeError {
                position,
                message: format!("'++'/'--' are not defined for type '{other}'"),
            }))
        }
    };

    ctx.builder.build_store(ptr, updated).expect("store never fails");
    Ok(())
}

/// Coerces a condition expression's value to `i1`: already `i1`
/// values pass through; anything else compares against zero of its type.
fn coerce_condition<'ctx>(
    ctx: &CodegenContext<'ctx>,
    value: Typed<'ctx>,
    position: Position,
) -> Result<inkwell::values::IntValue<'ctx>, CompileError> {
    match value.ty {
        TypeTag::Bool => Ok(value.value.into_int_value()),
        TypeTag::Int => {
            let zero = ctx.context.i32_type().const_zero();
            Ok(ctx
                .builder
                .build_int_compare(IntPredicate::NE, value.value.into_int_value(), zero, "")
                .expect("icmp never fails"))
        }
        TypeTag::Float => {
            let zero = ctx.context.f64_type().const_zero();
            Ok(ctx
                .builder
                .build_float_compare(
                    inkwell::FloatPredicate::ONE,
                    value.value.into_float_value(),
                    zero,
                    "",
                )
                .expect("fcmp never fails"))
        }
        other => Err(CompileError::Type(TypeError {
            position,
            message: format!("condition of type '{other}' cannot be used as a boolean"),
        })),
    }
}

fn codegen_if<'ctx>(
    ctx: &CodegenContext<'ctx>,
    condition: &crate::ast::Expression,
    then_block: &Block,
    else_block: Option<&Block>,
    position: Position,
) -> Result<(), CompileError> {
    let function = ctx.current_function();

    let cond_value = codegen_expression(ctx, condition)?;
    let cond = coerce_condition(ctx, cond_value, position)?;

    let then_bb = ctx.context.append_basic_block(function, "if.then");
    let merge_bb = ctx.context.append_basic_block(function, "if.merge");
    let else_bb = if else_block.is_some() {
        ctx.context.append_basic_block(function, "if.else")
    } else {
        merge_bb
    };

    ctx.builder
        .build_conditional_branch(cond, then_bb, else_bb)
        .expect("conditional branch never fails");

    ctx.builder.position_at_end(then_bb);
    ctx.push_scope();
    codegen_block(ctx, then_block)?;
    ctx.pop_scope();
    let then_falls_through = !block_is_terminated(ctx);
    if then_falls_through {
        ctx.builder
            .build_unconditional_branch(merge_bb)
            .expect("branch never fails");
    }

    let mut else_falls_through = true;
    if let Some(else_block) = else_block {
        ctx.builder.position_at_end(else_bb);
        ctx.push_scope();
        codegen_block(ctx, else_block)?;
        ctx.pop_scope();
        else_falls_through = !block_is_terminated(ctx);
        if else_falls_through {
            ctx.builder
                .build_unconditional_branch(merge_bb)
                .expect("branch never fails");
        }
    }

    // With no `else`, the conditional branch's false edge lands on
    // `merge_bb` directly, so it always has a predecessor. With an `else`,
    // `merge_bb` is only reached if at least one arm falls through; if both
    // `then` and `else` terminate (e.g. both `return`), nothing ever
    // branches to it, and an empty block with no predecessors and no
    // terminator would fail module verification. Drop it in that case
    // instead of leaving the builder positioned there.
    let merge_reachable = else_block.is_none() || then_falls_through || else_falls_through;
    if merge_reachable {
        ctx.builder.position_at_end(merge_bb);
    } else {
        let _ = merge_bb.remove_from_function();
    }
    Ok(())
}

fn codegen_while<'ctx>(
    ctx: &CodegenContext<'ctx>,
    condition: &crate::ast::Expression,
    body: &Block,
    position: Position,
) -> Result<(), CompileError> {
    let function = ctx.current_function();

    let condition_bb = ctx.context.append_basic_block(function, "while.condition");
    let body_bb = ctx.context.append_basic_block(function, "while.body");
    let exit_bb = ctx.context.append_basic_block(function, "while.exit");

    ctx.builder
        .build_unconditional_branch(condition_bb)
        .expect("branch never fails");

    ctx.builder.position_at_end(condition_bb);
    let cond_value = codegen_expression(ctx, condition)?;
    let cond = coerce_condition(ctx, cond_value, position)?;
    ctx.builder
        .build_conditional_branch(cond, body_bb, exit_bb)
        .expect("conditional branch never fails");

    ctx.push_loop_target(condition_bb, exit_bb);
    ctx.builder.position_at_end(body_bb);
    ctx.push_scope();
    codegen_block(ctx, body)?;
    ctx.pop_scope();
    if !block_is_terminated(ctx) {
        ctx.builder
            .build_unconditional_branch(condition_bb)
            .expect("branch never fails");
    }
    ctx.pop_loop_target();

    // Unlike `if.merge`, `while.exit` always has a predecessor: the
    // conditional branch out of `condition_bb` targets it directly,
    // independent of whether the body falls through. It can be left
    // without a terminator only if the loop is the last statement of a
    // non-void function, which is a missing-return source program, not a
    // block this generator must seal.
    ctx.builder.position_at_end(exit_bb);
    Ok(())
}

fn codegen_for<'ctx>(
    ctx: &CodegenContext<'ctx>,
    init: Option<&Statement>,
    condition: &crate::ast::Expression,
    update: Option<&Statement>,
    body: &Block,
    position: Position,
) -> Result<(), CompileError> {
    let function = ctx.current_function();

    // The init statement (if any) lives in the enclosing scope, not a
    // fresh one of its own (deliberately kept rather than changed).
    if let Some(init) = init {
        codegen_statement(ctx, init)?;
    }

    let condition_bb = ctx.context.append_basic_block(function, "for.condition");
    let body_bb = ctx.context.append_basic_block(function, "for.body");
    let update_bb = ctx.context.append_basic_block(function, "for.update");
    let exit_bb = ctx.context.append_basic_block(function, "for.exit");

    ctx.builder
        .build_unconditional_branch(condition_bb)
        .expect("branch never fails");

    ctx.builder.position_at_end(condition_bb);
    let cond_value = codegen_expression(ctx, condition)?;
    let cond = coerce_condition(ctx, cond_value, position)?;
    ctx.builder
        .build_conditional_branch(cond, body_bb, exit_bb)
        .expect("conditional branch never fails");

    ctx.push_loop_target(update_bb, exit_bb);

    ctx.builder.position_at_end(body_bb);
    ctx.push_scope();
    codegen_block(ctx, body)?;
    ctx.pop_scope();
    if !block_is_terminated(ctx) {
        ctx.builder
            .build_unconditional_branch(update_bb)
            .expect("branch never fails");
    }

    ctx.builder.position_at_end(update_bb);
    if let Some(update) = update {
        codegen_statement(ctx, update)?;
    }
    if !block_is_terminated(ctx) {
        ctx.builder
            .build_unconditional_branch(condition_bb)
            .expect("branch never fails");
    }

    ctx.pop_loop_target();

    // Same reasoning as `while.exit`: reached directly by `condition_bb`'s
    // conditional branch, so it is never predecessor-less.
    ctx.builder.position_at_end(exit_bb);
    Ok(())
}

fn codegen_break<'ctx>(ctx: &CodegenContext<'ctx>, position: Position) -> Result<(), CompileError> {
    let (_, break_target) = ctx.current_loop_target().ok_or_else(|| {
        CompileError::Control(ControlError {
            position,
            message: "'break' outside of a loop".to_string(),
        })
    })?;
    ctx.builder
        .build_unconditional_branch(break_target)
        .expect("branch never fails");
    Ok(())
}

fn codegen_continue<'ctx>(ctx: &CodegenContext<'ctx>, position: Position) -> Result<(), CompileError> {
    let (continue_target, _) = ctx.current_loop_target().ok_or_else(|| {
        CompileError::Control(ControlError {
            position,
            message: "'continue' outside of a loop".to_string(),
        })
    })?;
    ctx.builder
        .build_unconditional_branch(continue_target)
        .expect("branch never fails");
    Ok(())
}

fn codegen_return<'ctx>(
    ctx: &CodegenContext<'ctx>,
    value: Option<&crate::ast::Expression>,
    _position: Position,
) -> Result<(), CompileError> {
    match value {
        Some(expr) => {
            let value = codegen_expression(ctx, expr)?;
            ctx.builder
                .build_return(Some(&value.value))
                .expect("ret never fails");
        }
        None => {
            ctx.builder.build_return(None).expect("ret void never fails");
        }
    }
    Ok(())
}

/// Declares `printf(i8*, ...)` in the module if it isn't already present.
fn ensure_printf<'ctx>(ctx: &CodegenContext<'ctx>) -> inkwell::values::FunctionValue<'ctx> {
    if let Some(existing) = ctx.module.get_function("printf") {
        return existing;
    }
    let i8_ptr = ctx.context.ptr_type(inkwell::AddressSpace::default());
    let printf_type = ctx.context.i32_type().fn_type(&[i8_ptr.into()], true);
    ctx.module.add_function("printf", printf_type, None)
}

fn format_specifier(ty: TypeTag) -> &'static str {
    match ty {
        TypeTag::String => "%s",
        TypeTag::Bool | TypeTag::Int => "%d",
        TypeTag::Float => "%f",
        TypeTag::Void => unreachable!("void cannot be printed"),
    }
}

fn codegen_print<'ctx>(
    ctx: &CodegenContext<'ctx>,
    values: &[crate::ast::Expression],
    position: Position,
) -> Result<(), CompileError> {
    let printf = ensure_printf(ctx);
    let last = values.len().saturating_sub(1);

    for (i, expr) in values.iter().enumerate() {
        let value = codegen_expression(ctx, expr)?;
        if value.ty == TypeTag::Void {
            return Err(CompileError::Type(TypeError {
                position,
                message: "cannot print a void value".to_string(),
            }));
        }

        let terminator = if values.len() == 1 {
            "\n"
        } else if i == last {
            "\n"
        } else {
            " "
        };
        let format = format!("{}{terminator}", format_specifier(value.ty));
        let format_ptr = codegen_global_string(ctx, &format, ".fstr");

        let args: Vec<BasicMetadataValueEnum> = vec![format_ptr.into(), value.value.into()];
        ctx.builder
            .build_call(printf, &args, "")
            .expect("call to printf never fails to build");
    }

    Ok(())
}
