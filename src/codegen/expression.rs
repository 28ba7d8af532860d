//! Expression lowering.
//!
//! Every [`Expression`] lowers to a single [`BasicValueEnum`]. Operand
//! promotion happens once, at the binary-op and compound-assign call
//! sites, so the arithmetic/comparison dispatch below only ever sees a
//! pair of equally-typed operands.

use inkwell::values::BasicValueEnum;
use inkwell::{FloatPredicate, IntPredicate};

use crate::ast::{Expression, LiteralValue, TypeTag};
use crate::error::{ArityError, CompileError, Position, TypeError};

use super::CodegenContext;

/// An LLVM value paired with the source type tag it represents. Codegen
/// for statements needs the tag (to pick an alloca type, a format
/// specifier, promotion rules, ...); inkwell's `BasicValueEnum` alone
/// can't distinguish `int` from `bool`, both of which are integer types.
#[derive(Clone, Copy)]
pub struct Typed<'ctx> {
    pub value: BasicValueEnum<'ctx>,
    pub ty: TypeTag,
}

impl<'ctx> Typed<'ctx> {
    pub fn new(value: BasicValueEnum<'ctx>, ty: TypeTag) -> Self {
        Typed { value, ty }
    }
}

pub fn codegen_expression<'ctx>(
    ctx: &CodegenContext<'ctx>,
    expr: &Expression,
) -> Result<Typed<'ctx>, CompileError> {
    match expr {
        Expression::Literal { value, .. } => Ok(codegen_literal(ctx, value)),
        Expression::Identifier { name, position } => codegen_identifier(ctx, name, *position),
        Expression::Binary {
            op, left, right, ..
        } => codegen_binary(ctx, op, left, right, expr.position()),
        Expression::Unary { op, operand, .. } => codegen_unary(ctx, op, operand, expr.position()),
        Expression::Call { callee, args, .. } => codegen_call(ctx, callee, args, expr.position()),
        Expression::Cast { target, inner, .. } => codegen_cast(ctx, *target, inner, expr.position()),
    }
}

fn codegen_literal<'ctx>(ctx: &CodegenContext<'ctx>, value: &LiteralValue) -> Typed<'ctx> {
    match value {
        LiteralValue::Int(n) => Typed::new(
            ctx.context.i32_type().const_int(*n as u64, true).into(),
            TypeTag::Int,
        ),
        LiteralValue::Float(f) => Typed::new(
            ctx.context.f64_type().const_float(*f).into(),
            TypeTag::Float,
        ),
        LiteralValue::Bool(b) => Typed::new(
            ctx.context
                .bool_type()
                .const_int(*b as u64, false)
                .into(),
            TypeTag::Bool,
        ),
        LiteralValue::String(s) => Typed::new(codegen_string_literal(ctx, s), TypeTag::String),
    }
}

/// Materializes a string literal as a private global `[N x i8]` (with a
/// trailing NUL) and returns an `i8*` to its first element.
pub fn codegen_string_literal<'ctx>(ctx: &CodegenContext<'ctx>, s: &str) -> BasicValueEnum<'ctx> {
    codegen_global_string(ctx, s, ".str")
}

/// Shared by string literals (`.str.<n>`) and `print`'s format strings
/// (`.fstr.<n>`) — both mint a uniquely named private global.
pub fn codegen_global_string<'ctx>(
    ctx: &CodegenContext<'ctx>,
    s: &str,
    prefix: &str,
) -> BasicValueEnum<'ctx> {
    let name = ctx.fresh_global_name(prefix);
    let global = ctx
        .builder
        .build_global_string_ptr(s, &name)
        .expect("global string allocation never fails");
    global.as_pointer_value().into()
}

fn codegen_identifier<'ctx>(
    ctx: &CodegenContext<'ctx>,
    name: &str,
    position: Position,
) -> Result<Typed<'ctx>, CompileError> {
    let (ptr, ty) = ctx.find_variable(name, position)?;
    let loaded = ctx
        .builder
        .build_load(ctx.llvm_basic_type(ty), ptr, name)
        .expect("load of a declared slot never fails");
    Ok(Typed::new(loaded, ty))
}

/// Implicit promotion: `i32`+`double` promotes the `i32` via
/// `sitofp`; `i1`+`i32` zero-extends the `i1`. Any other mismatch errors.
pub fn promote_pair<'ctx>(
    ctx: &CodegenContext<'ctx>,
    left: Typed<'ctx>,
    right: Typed<'ctx>,
    position: Position,
) -> Result<(Typed<'ctx>, Typed<'ctx>), CompileError> {
    if left.ty == right.ty {
        return Ok((left, right));
    }

    match (left.ty, right.ty) {
        (TypeTag::Int, TypeTag::Float) => Ok((promote_int_to_float(ctx, left), right)),
        (TypeTag::Float, TypeTag::Int) => Ok((left, promote_int_to_float(ctx, right))),
        (TypeTag::Bool, TypeTag::Int) => Ok((promote_bool_to_int(ctx, left), right)),
        (TypeTag::Int, TypeTag::Bool) => Ok((left, promote_bool_to_int(ctx, right))),
        (lt, rt) => Err(CompileError::Type(TypeError {
            position,
            message: format!("cannot unify operand types '{lt}' and '{rt}'"),
        })),
    }
}

fn promote_int_to_float<'ctx>(ctx: &CodegenContext<'ctx>, value: Typed<'ctx>) -> Typed<'ctx> {
    let promoted = ctx
        .builder
        .build_signed_int_to_float(
            value.value.into_int_value(),
            ctx.context.f64_type(),
            "",
        )
        .expect("sitofp never fails");
    Typed::new(promoted.into(), TypeTag::Float)
}

fn promote_bool_to_int<'ctx>(ctx: &CodegenContext<'ctx>, value: Typed<'ctx>) -> Typed<'ctx> {
    let promoted = ctx
        .builder
        .build_int_z_extend(value.value.into_int_value(), ctx.context.i32_type(), "")
        .expect("zext never fails");
    Typed::new(promoted.into(), TypeTag::Int)
}

fn codegen_binary<'ctx>(
    ctx: &CodegenContext<'ctx>,
    op: &str,
    left: &Expression,
    right: &Expression,
    position: Position,
) -> Result<Typed<'ctx>, CompileError> {
    let left_val = codegen_expression(ctx, left)?;
    let right_val = codegen_expression(ctx, right)?;
    apply_binary_op(ctx, op, left_val, right_val, position)
}

/// Shared by `codegen_binary` and compound-assign lowering, both
/// of which promote their operands with the same rules and then pick an
/// instruction family off the (possibly promoted) operand type.
pub fn apply_binary_op<'ctx>(
    ctx: &CodegenContext<'ctx>,
    op: &str,
    left: Typed<'ctx>,
    right: Typed<'ctx>,
    position: Position,
) -> Result<Typed<'ctx>, CompileError> {
    if op == "&&" || op == "||" {
        return apply_logical_op(ctx, op, left, right, position);
    }

    let (left, right) = promote_pair(ctx, left, right, position)?;
    let is_float = left.ty == TypeTag::Float;

    let builder = &ctx.builder;
    match op {
        "+" if is_float => Ok(Typed::new(
            builder
                .build_float_add(left.value.into_float_value(), right.value.into_float_value(), "")
                .expect("fadd never fails")
                .into(),
            TypeTag::Float,
        )),
        "+" => Ok(Typed::new(
            builder
                .build_int_add(left.value.into_int_value(), right.value.into_int_value(), "")
                .expect("add never fails")
                .into(),
            left.ty,
        )),
        "-" if is_float => Ok(Typed::new(
            builder
                .build_float_sub(left.value.into_float_value(), right.value.into_float_value(), "")
                .expect("fsub never fails")
                .into(),
            TypeTag::Float,
        )),
        "-" => Ok(Typed::new(
            builder
                .build_int_sub(left.value.into_int_value(), right.value.into_int_value(), "")
                .expect("sub never fails")
                .into(),
            left.ty,
        )),
        "*" if is_float => Ok(Typed::new(
            builder
                .build_float_mul(left.value.into_float_value(), right.value.into_float_value(), "")
                .expect("fmul never fails")
                .into(),
            TypeTag::Float,
        )),
        "*" => Ok(Typed::new(
            builder
                .build_int_mul(left.value.into_int_value(), right.value.into_int_value(), "")
                .expect("mul never fails")
                .into(),
            left.ty,
        )),
        "/" if is_float => Ok(Typed::new(
            builder
                .build_float_div(left.value.into_float_value(), right.value.into_float_value(), "")
                .expect("fdiv never fails")
                .into(),
            TypeTag::Float,
        )),
        "/" => Ok(Typed::new(
            builder
                .build_int_signed_div(left.value.into_int_value(), right.value.into_int_value(), "")
                .expect("sdiv never fails")
                .into(),
            left.ty,
        )),
        "%" if is_float => Ok(Typed::new(
            builder
                .build_float_rem(left.value.into_float_value(), right.value.into_float_value(), "")
                .expect("frem never fails")
                .into(),
            TypeTag::Float,
        )),
        "%" => Ok(Typed::new(
            builder
                .build_int_signed_rem(left.value.into_int_value(), right.value.into_int_value(), "")
                .expect("srem never fails")
                .into(),
            left.ty,
        )),
        "==" | "!=" | "<" | "<=" | ">" | ">=" => {
            let result = if is_float {
                builder
                    .build_float_compare(
                        float_predicate(op),
                        left.value.into_float_value(),
                        right.value.into_float_value(),
                        "",
                    )
                    .expect("fcmp never fails")
            } else {
                builder
                    .build_int_compare(
                        int_predicate(op),
                        left.value.into_int_value(),
                        right.value.into_int_value(),
                        "",
                    )
                    .expect("icmp never fails")
            };
            Ok(Typed::new(result.into(), TypeTag::Bool))
        }
        other => Err(CompileError::Type(TypeError {
            position,
            message: format!("unknown binary operator '{other}'"),
        })),
    }
}

/// `&&`/`||` are not short-circuited: both operands are
/// always evaluated, then combined bitwise over `i1`.
fn apply_logical_op<'ctx>(
    ctx: &CodegenContext<'ctx>,
    op: &str,
    left: Typed<'ctx>,
    right: Typed<'ctx>,
    position: Position,
) -> Result<Typed<'ctx>, CompileError> {
    if left.ty != TypeTag::Bool || right.ty != TypeTag::Bool {
        return Err(CompileError::Type(TypeError {
            position,
            message: format!("operator '{op}' requires bool operands, found '{}' and '{}'", left.ty, right.ty),
        }));
    }

    let result = if op == "&&" {
        ctx.builder
            .build_and(left.value.into_int_value(), right.value.into_int_value(), "")
            .expect("and never fails")
    } else {
        ctx.builder
            .build_or(left.value.into_int_value(), right.value.into_int_value(), "")
            .expect("or never fails")
    };
    Ok(Typed::new(result.into(), TypeTag::Bool))
}

fn int_predicate(op: &str) -> IntPredicate {
    match op {
        "==" => IntPredicate::EQ,
        "!=" => IntPredicate::NE,
        "<" => IntPredicate::SLT,
        "<=" => IntPredicate::SLE,
        ">" => IntPredicate::SGT,
        ">=" => IntPredicate::SGE,
        other => unreachable!("unexpected comparison operator {other:?}"),
    }
}

fn float_predicate(op: &str) -> FloatPredicate {
    match op {
        "==" => FloatPredicate::OEQ,
        "!=" => FloatPredicate::ONE,
        "<" => FloatPredicate::OLT,
        "<=" => FloatPredicate::OLE,
        ">" => FloatPredicate::OGT,
        ">=" => FloatPredicate::OGE,
        other => unreachable!("unexpected comparison operator {other:?}"),
    }
}

fn codegen_unary<'ctx>(
    ctx: &CodegenContext<'ctx>,
    op: &str,
    operand: &Expression,
    position: Position,
) -> Result<Typed<'ctx>, CompileError> {
    let value = codegen_expression(ctx, operand)?;

    match (op, value.ty) {
        ("-", TypeTag::Float) => {
            let negated = ctx
                .builder
                .build_float_neg(value.value.into_float_value(), "")
                .expect("fneg never fails");
            Ok(Typed::new(negated.into(), TypeTag::Float))
        }
        ("-", TypeTag::Int) => {
            let zero = ctx.context.i32_type().const_zero();
            let negated = ctx
                .builder
                .build_int_sub(zero, value.value.into_int_value(), "")
                .expect("sub never fails");
            Ok(Typed::new(negated.into(), TypeTag::Int))
        }
        ("!", TypeTag::Bool) => {
            let one = ctx.context.bool_type().const_int(1, false);
            let negated = ctx
                .builder
                .build_xor(value.value.into_int_value(), one, "")
                .expect("xor never fails");
            Ok(Typed::new(negated.into(), TypeTag::Bool))
        }
        (op, ty) => Err(CompileError::Type(TypeError {
            position,
            message: format!("unary operator '{op}' is not defined for type '{ty}'"),
        })),
    }
}

fn codegen_call<'ctx>(
    ctx: &CodegenContext<'ctx>,
    callee: &str,
    args: &[Expression],
    position: Position,
) -> Result<Typed<'ctx>, CompileError> {
    let (fn_value, param_types, ret_type) = ctx.lookup_function(callee).ok_or_else(|| {
        CompileError::Name(crate::error::NameError {
            position,
            name: callee.to_string(),
            message: "call to undefined function".to_string(),
        })
    })?;

    if args.len() != param_types.len() {
        return Err(CompileError::Arity(ArityError {
            position,
            callee: callee.to_string(),
            expected: param_types.len(),
            found: args.len(),
        }));
    }

    let mut arg_values = Vec::with_capacity(args.len());
    for arg in args {
        arg_values.push(codegen_expression(ctx, arg)?.value.into());
    }

    let call = ctx
        .builder
        .build_call(fn_value, &arg_values, "")
        .expect("call never fails to build");

    match call.try_as_basic_value().left() {
        Some(value) => Ok(Typed::new(value, ret_type)),
        None => Ok(Typed::new(
            ctx.context.i32_type().const_zero().into(),
            TypeTag::Void,
        )),
    }
}

fn codegen_cast<'ctx>(
    ctx: &CodegenContext<'ctx>,
    target: TypeTag,
    inner: &Expression,
    position: Position,
) -> Result<Typed<'ctx>, CompileError> {
    let value = codegen_expression(ctx, inner)?;

    if value.ty == target {
        return Ok(value);
    }

    match (value.ty, target) {
        (TypeTag::Float, TypeTag::Int) => {
            let converted = ctx
                .builder
                .build_float_to_signed_int(value.value.into_float_value(), ctx.context.i32_type(), "")
                .expect("fptosi never fails");
            Ok(Typed::new(converted.into(), TypeTag::Int))
        }
        (TypeTag::Int, TypeTag::Float) => Ok(promote_int_to_float(ctx, value)),
        (TypeTag::Bool, TypeTag::Int) => Ok(promote_bool_to_int(ctx, value)),
        (TypeTag::Bool, TypeTag::Float) => {
            let converted = ctx
                .builder
                .build_unsigned_int_to_float(value.value.into_int_value(), ctx.context.f64_type(), "")
                .expect("uitofp never fails");
            Ok(Typed::new(converted.into(), TypeTag::Float))
        }
        (TypeTag::Int, TypeTag::Bool) => {
            let zero = ctx.context.i32_type().const_zero();
            let cmp = ctx
                .builder
                .build_int_compare(IntPredicate::NE, value.value.into_int_value(), zero, "")
                .expect("icmp never fails");
            Ok(Typed::new(cmp.into(), TypeTag::Bool))
        }
        (TypeTag::Float, TypeTag::Bool) => {
            let zero = ctx.context.f64_type().const_zero();
            let cmp = ctx
                .builder
                .build_float_compare(FloatPredicate::ONE, value.value.into_float_value(), zero, "")
                .expect("fcmp never fails");
            Ok(Typed::new(cmp.into(), TypeTag::Bool))
        }
        (from, to) => Err(CompileError::Type(TypeError {
            position,
            message: format!("unsupported cast from '{from}' to '{to}'"),
        })),
    }
}
