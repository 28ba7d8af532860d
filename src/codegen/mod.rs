//! LLVM IR code generation.
//!
//! [`CodegenContext`] owns the single IR module produced by one compilation
//! and all of the bookkeeping state the generator needs while walking the
//! AST: the function table (for forward references), the lexical scope
//! stack, the set of const-bound names, the loop-target stack for
//! `break`/`continue`, and a counter for minting unique global names.

mod expression;
mod function;
mod statement;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::{BasicMetadataTypeEnum, BasicTypeEnum, FunctionType};
use inkwell::values::{FunctionValue, PointerValue};
use inkwell::AddressSpace;

use crate::ast::{FunctionDef, Program, TypeTag};
use crate::error::{CompileError, NameError};

pub use self::function::{codegen_function, register_declaration};

/// A single lexical scope: source name -> (stack slot, declared type).
#[derive(Default)]
pub struct Scope<'ctx> {
    variables: HashMap<String, (PointerValue<'ctx>, TypeTag)>,
}

/// Everything the generator needs to lower one compilation unit.
pub struct CodegenContext<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,

    functions: RefCell<HashMap<String, (FunctionValue<'ctx>, Vec<TypeTag>, TypeTag)>>,
    scopes: RefCell<Vec<RefCell<Scope<'ctx>>>>,
    const_names: RefCell<HashSet<String>>,
    loop_targets: RefCell<Vec<(BasicBlock<'ctx>, BasicBlock<'ctx>)>>,
    global_counter: Cell<usize>,
    current_function: RefCell<Option<FunctionValue<'ctx>>>,
}

impl<'ctx> CodegenContext<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        CodegenContext {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            functions: RefCell::new(HashMap::new()),
            scopes: RefCell::new(vec![]),
            const_names: RefCell::new(HashSet::new()),
            loop_targets: RefCell::new(vec![]),
            global_counter: Cell::new(0),
            current_function: RefCell::new(None),
        }
    }

    // -- type mapping -----------------------------------------------------

    pub fn llvm_basic_type(&self, tag: TypeTag) -> BasicTypeEnum<'ctx> {
        match tag {
            TypeTag::Int => self.context.i32_type().into(),
            TypeTag::Bool => self.context.bool_type().into(),
            TypeTag::Float => self.context.f64_type().into(),
            TypeTag::String => self.context.ptr_type(AddressSpace::default()).into(),
            TypeTag::Void => unreachable!("void has no basic value representation"),
        }
    }

    pub fn llvm_metadata_type(&self, tag: TypeTag) -> BasicMetadataTypeEnum<'ctx> {
        self.llvm_basic_type(tag).into()
    }

    pub fn build_function_type(&self, params: &[TypeTag], ret: TypeTag) -> FunctionType<'ctx> {
        let param_types: Vec<BasicMetadataTypeEnum<'ctx>> =
            params.iter().map(|p| self.llvm_metadata_type(*p)).collect();

        match ret {
            TypeTag::Void => self.context.void_type().fn_type(&param_types, false),
            other => self.llvm_basic_type(other).fn_type(&param_types, false),
        }
    }

    // -- function table ---------------------------------------------------

    pub fn register_function(
        &self,
        name: &str,
        value: FunctionValue<'ctx>,
        params: Vec<TypeTag>,
        ret: TypeTag,
    ) {
        self.functions
            .borrow_mut()
            .insert(name.to_string(), (value, params, ret));
    }

    pub fn lookup_function(&self, name: &str) -> Option<(FunctionValue<'ctx>, Vec<TypeTag>, TypeTag)> {
        self.functions.borrow().get(name).cloned()
    }

    pub fn set_current_function(&self, f: FunctionValue<'ctx>) {
        *self.current_function.borrow_mut() = Some(f);
    }

    pub fn current_function(&self) -> FunctionValue<'ctx> {
        self.current_function
            .borrow()
            .expect("current_function is set before any statement is lowered")
    }

    // -- scope stack ------------------------------------------------------

    pub fn push_scope(&self) {
        self.scopes.borrow_mut().push(RefCell::new(Scope::default()));
    }

    pub fn pop_scope(&self) {
        self.scopes
            .borrow_mut()
            .pop()
            .expect("pop_scope called without a matching push_scope");
    }

    /// Declares `name` in the innermost scope. Returns `false` if `name` is
    /// already declared in that same scope (the caller turns this into a
    /// `NameError`).
    pub fn declare_variable(&self, name: &str, ptr: PointerValue<'ctx>, ty: TypeTag) -> bool {
        let scopes = self.scopes.borrow();
        let innermost = scopes
            .last()
            .expect("declare_variable called outside any scope");
        let mut scope = innermost.borrow_mut();
        if scope.variables.contains_key(name) {
            return false;
        }
        scope.variables.insert(name.to_string(), (ptr, ty));
        true
    }

    /// Looks up `name`, searching from the innermost scope outward.
    pub fn lookup_variable(&self, name: &str) -> Option<(PointerValue<'ctx>, TypeTag)> {
        for scope in self.scopes.borrow().iter().rev() {
            if let Some(entry) = scope.borrow().variables.get(name) {
                return Some(*entry);
            }
        }
        None
    }

    pub fn find_variable(&self, name: &str, position: crate::error::Position) -> Result<(PointerValue<'ctx>, TypeTag), CompileError> {
        self.lookup_variable(name).ok_or_else(|| {
            CompileError::Name(NameError {
                position,
                name: name.to_string(),
                message: "undefined identifier".to_string(),
            })
        })
    }

    // -- const set --------------------------------------------------------

    pub fn mark_const(&self, name: &str) {
        self.const_names.borrow_mut().insert(name.to_string());
    }

    pub fn is_const(&self, name: &str) -> bool {
        self.const_names.borrow().contains(name)
    }

    /// Consts are function-scoped in this design: cleared whenever a new
    /// function body starts lowering.
    pub fn clear_const_names(&self) {
        self.const_names.borrow_mut().clear();
    }

    // -- loop-target stack -------------------------------------------------

    pub fn push_loop_target(&self, continue_target: BasicBlock<'ctx>, break_target: BasicBlock<'ctx>) {
        self.loop_targets
            .borrow_mut()
            .push((continue_target, break_target));
    }

    pub fn pop_loop_target(&self) {
        self.loop_targets
            .borrow_mut()
            .pop()
            .expect("pop_loop_target called without a matching push_loop_target");
    }

    pub fn current_loop_target(&self) -> Option<(BasicBlock<'ctx>, BasicBlock<'ctx>)> {
        self.loop_targets.borrow().last().copied()
    }

    // -- global naming ------------------------------------------------------

    /// Mints a unique name of the form `.str.<n>` or `.fstr.<n>`.
    pub fn fresh_global_name(&self, prefix: &str) -> String {
        let n = self.global_counter.get();
        self.global_counter.set(n + 1);
        format!("{prefix}.{n}")
    }
}

/// Runs the full core pipeline (AST assumed already built) against a fresh
/// module, returning the populated context. The caller decides what to do
/// with the module afterward (print it, verify it, hand it to the JIT).
pub fn codegen_program<'ctx>(
    context: &'ctx Context,
    module_name: &str,
    program: &Program,
) -> Result<CodegenContext<'ctx>, CompileError> {
    let ctx = CodegenContext::new(context, module_name);

    // Pass A: declare every function so bodies may reference functions
    // defined later in the source (forward references, mutual recursion).
    for function in &program.functions {
        register_declaration(&ctx, function)?;
    }

    // Pass B: define bodies.
    for function in &program.functions {
        codegen_function(&ctx, function)?;
    }

    Ok(ctx)
}
