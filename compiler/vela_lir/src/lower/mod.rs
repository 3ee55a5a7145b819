//! Checked AST → LIR lowering.
//!
//! # Entry Point
//!
//! [`lower_module`] consumes a [`CheckOutput`] with no user errors and
//! produces a [`LirModule`].
//!
//! # Architecture
//!
//! - `ModuleLowerer`: borrows the checker's output, owns the output tables
//!   and the specialization worklist.
//! - `FunctionLowerer`: lowers one body; statements in `function.rs`,
//!   expressions and places in `expr.rs`, calls in `calls.rs`.
//! - `FunctionBuilder`: blocks and temporaries of the function being built.
//!
//! Every non-generic function with a body is lowered. Generic functions are
//! lowered once per distinct argument list some lowered body calls them
//! with, by draining a worklist; each request made from inside a
//! specialization is one level deeper, and the depth is bounded.

mod builder;
mod calls;
mod expr;
mod function;

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::FxHashMap;
use vela_ir::{DeclId, ExprArena, FunctionDecl, Item, Module, Name, Receiver, StmtId, StringInterner};
use vela_types::{
    CheckConfig, CheckOutput, FuncId, FunctionInfo, FunctionSig, Idx, InternalError, Pool,
    Scopes, Substitution, TypeData, TypeEngine, TypedModule,
};

use self::builder::FunctionBuilder;
use crate::ir::{GenericFunction, Param, Terminator, Value};
use crate::layout::normalize;
use crate::{CallGraph, Function, LayoutTable, LirModule, LowerConfig, LowerError};

/// Lower a checked module.
///
/// The module must have passed checking without user errors; anything the
/// checker left unresolved is reported as an internal error here. Types
/// created while lowering (specializations, pointers to `self`) are added
/// to `checked.pool`, which every [`Idx`] in the result refers to.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(functions = checked.typed.functions.len())
)]
pub fn lower_module(
    module: &Module,
    arena: &ExprArena,
    interner: &StringInterner,
    checked: &mut CheckOutput,
    config: &LowerConfig,
) -> Result<LirModule, LowerError> {
    let mut lowerer = ModuleLowerer::new(module, arena, interner, checked, config);
    lowerer.seed()?;
    while let Some(pending) = lowerer.queue.pop_front() {
        let function = lowerer.lower_function(&pending)?;
        lowerer.functions.insert(function.name, function);
    }
    tracing::debug!(
        functions = lowerer.functions.len(),
        layouts = lowerer.layouts.len(),
        "lowering complete"
    );
    Ok(lowerer.finish())
}

/// A function instance waiting to be lowered.
struct Pending {
    func: FuncId,
    args: Vec<Idx>,
    name: Name,
    depth: usize,
}

pub(crate) struct ModuleLowerer<'a> {
    // === Input ===
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    decls: FxHashMap<DeclId, &'a FunctionDecl>,
    typed: &'a TypedModule,
    pool: &'a mut Pool,
    scopes: &'a Scopes,
    config: LowerConfig,
    check_config: CheckConfig,

    // === Output ===
    functions: BTreeMap<Name, Function>,
    generic_functions: BTreeMap<DeclId, GenericFunction>,
    layouts: LayoutTable,
    call_graph: CallGraph,

    // === Specialization ===
    instances: FxHashMap<(FuncId, Vec<Idx>), Name>,
    queue: VecDeque<Pending>,
}

impl<'a> ModuleLowerer<'a> {
    fn new(
        module: &'a Module,
        arena: &'a ExprArena,
        interner: &'a StringInterner,
        checked: &'a mut CheckOutput,
        config: &LowerConfig,
    ) -> Self {
        let mut decls = FxHashMap::default();
        for item in &module.items {
            let methods: &[FunctionDecl] = match item {
                Item::Function(f) => std::slice::from_ref(f),
                Item::Struct(d) => &d.methods,
                Item::Enum(d) => &d.methods,
                Item::Conform(c) => &c.methods,
                Item::Alias(_) | Item::Standard(_) | Item::Const(_) => &[],
            };
            decls.extend(methods.iter().map(|f| (f.id, f)));
        }
        ModuleLowerer {
            arena,
            interner,
            decls,
            typed: &checked.typed,
            pool: &mut checked.pool,
            scopes: &checked.scopes,
            config: *config,
            check_config: config.check_config(),
            functions: BTreeMap::new(),
            generic_functions: BTreeMap::new(),
            layouts: LayoutTable::new(),
            call_graph: CallGraph::new(),
            instances: FxHashMap::default(),
            queue: VecDeque::new(),
        }
    }

    fn finish(self) -> LirModule {
        LirModule {
            functions: self.functions,
            generic_functions: self.generic_functions,
            layouts: self.layouts,
            call_graph: self.call_graph,
        }
    }

    /// Queue every non-generic function that has a body.
    fn seed(&mut self) -> Result<(), LowerError> {
        for index in 0..self.typed.functions.len() {
            let info = &self.typed.functions[index];
            if info.is_generic() || !info.has_body {
                continue;
            }
            let func = FuncId::new(u32::try_from(index).unwrap_or(u32::MAX));
            self.ensure_function(func, Vec::new(), 0)?;
        }
        Ok(())
    }

    fn engine(&mut self) -> TypeEngine<'_> {
        TypeEngine::new(self.pool, self.scopes, &self.check_config)
    }

    /// The concrete, alias-free form of a checked type under `subst`, with
    /// its layout (and those of everything it mentions) in the table.
    pub(crate) fn concrete(&mut self, ty: Idx, subst: &Substitution) -> Result<Idx, LowerError> {
        if ty.is_literal() || ty == Idx::UNRESOLVED || ty == Idx::PLACEHOLDER {
            return Err(LowerError::UnresolvedType { ty });
        }
        let mut engine = TypeEngine::new(self.pool, self.scopes, &self.check_config);
        let ty = engine.instantiate(ty, subst)?;
        let ty = normalize(&mut engine, ty)?;
        self.layouts.require(&mut engine, self.interner, ty)?;
        Ok(ty)
    }

    /// The mangled name of `func` at `args`, queueing its body for lowering
    /// the first time this instance is requested.
    pub(crate) fn ensure_function(
        &mut self,
        func: FuncId,
        args: Vec<Idx>,
        depth: usize,
    ) -> Result<Name, LowerError> {
        if let Some(&name) = self.instances.get(&(func, args.clone())) {
            return Ok(name);
        }
        let info = self.typed.function(func).clone();
        if depth > self.config.instantiation_depth_limit {
            tracing::debug!(?func, depth, "specialization depth limit reached");
            return Err(InternalError::ResolutionLimitExceeded {
                ty: info.sig,
                limit: self.config.instantiation_depth_limit,
            }
            .into());
        }
        let name = self.mangle(&info, &args)?;
        tracing::trace!(name = self.interner.lookup(name), depth, "function instance");

        if info.is_generic() {
            self.generic_functions
                .entry(info.decl)
                .or_insert_with(|| GenericFunction {
                    target: info.decl,
                    specializations: BTreeMap::new(),
                })
                .specializations
                .insert(args.clone(), name);
        }
        self.instances.insert((func, args.clone()), name);
        self.call_graph.add_node(name);
        if info.has_body {
            self.queue.push_back(Pending {
                func,
                args,
                name,
                depth,
            });
        }
        Ok(name)
    }

    /// `name`, `Owner.name`, `Pair<int>.name`, `name<int>`; overloaded
    /// names get their parameter list appended: `f(x: int)`.
    fn mangle(&mut self, info: &FunctionInfo, args: &[Idx]) -> Result<Name, LowerError> {
        let sig = self.signature(info)?;
        let own = sig.type_params.len();
        let split = info.generic_params.len().saturating_sub(own);
        let (owner_args, own_args) = args.split_at(split.min(args.len()));

        let mut text = String::new();
        if let Some(owner) = info.owner {
            let owner = if owner_args.is_empty() {
                owner
            } else {
                self.pool.specialize(owner, owner_args.to_vec())
            };
            self.pool.format_type_into(owner, self.interner, &mut text);
            text.push('.');
        }
        text.push_str(self.interner.lookup(info.name));
        if !own_args.is_empty() {
            text.push('<');
            for (i, arg) in own_args.iter().enumerate() {
                if i > 0 {
                    text.push(',');
                }
                self.pool.format_type_into(*arg, self.interner, &mut text);
            }
            text.push('>');
        }

        let overloaded = self
            .typed
            .functions
            .iter()
            .filter(|f| f.name == info.name && f.owner == info.owner)
            .count()
            > 1;
        if overloaded {
            let subst = Substitution::zip(&info.generic_params, args);
            text.push('(');
            for (i, param) in sig.params.iter().enumerate() {
                if i > 0 {
                    text.push_str(", ");
                }
                let label = param.label.map_or("_", |l| self.interner.lookup(l));
                text.push_str(label);
                text.push_str(": ");
                let ty = self.concrete(param.ty, &subst)?;
                self.pool.format_type_into(ty, self.interner, &mut text);
            }
            text.push(')');
        }
        Ok(self.interner.intern(&text))
    }

    fn signature(&self, info: &FunctionInfo) -> Result<FunctionSig, LowerError> {
        self.pool.function_sig(info.sig).cloned().ok_or_else(|| {
            inconsistent(format!("function {:?} has no signature", info.name))
        })
    }

    /// Whether a method receives `self` through a pointer: it mutates, or
    /// its owner is a struct.
    pub(crate) fn self_by_address(&self, info: &FunctionInfo) -> bool {
        if info.receiver == Some(Receiver::Mutating) {
            return true;
        }
        info.owner
            .and_then(|owner| self.pool.defined(owner))
            .is_some_and(|d| matches!(self.pool.get(d.underlying), TypeData::Struct(_)))
    }

    fn lower_function(&mut self, pending: &Pending) -> Result<Function, LowerError> {
        let info = self.typed.function(pending.func).clone();
        let _span = tracing::debug_span!(
            "lower_function",
            name = self.interner.lookup(pending.name)
        )
        .entered();

        let decl: &'a FunctionDecl = self
            .decls
            .get(&info.decl)
            .copied()
            .ok_or_else(|| inconsistent(format!("no declaration for {:?}", info.decl)))?;
        let Some(body) = &decl.body else {
            return Err(inconsistent(format!("{:?} has no body", info.decl)));
        };
        let subst = Substitution::zip(&info.generic_params, &pending.args);
        let sig = self.signature(&info)?;

        let mut params = Vec::with_capacity(sig.params.len() + 1);
        let mut self_ty = None;
        let by_address = self.self_by_address(&info);
        if let (Some(_), Some(owner)) = (info.receiver, info.owner) {
            let instance = self.pool.self_instance(owner);
            let ty = self.concrete(instance, &subst)?;
            let param_ty = if by_address { self.pool.pointer(ty) } else { ty };
            params.push(Param {
                name: self.interner.intern("self"),
                ty: param_ty,
            });
            self_ty = Some(ty);
        }
        for param in &sig.params {
            let ty = self.concrete(param.ty, &subst)?;
            params.push(Param {
                name: param.name,
                ty,
            });
        }
        let result = self.concrete(sig.result, &subst)?;

        let mut lowerer = FunctionLowerer {
            module: self,
            builder: FunctionBuilder::new(),
            subst,
            name: pending.name,
            depth: pending.depth,
            self_ty,
            self_by_address: by_address,
            self_offset: u32::from(info.receiver.is_some()),
            locals: FxHashMap::default(),
        };
        lowerer.lower_block(body)?;
        if !lowerer.builder.is_terminated() {
            let fall_through = if result == Idx::VOID {
                Terminator::Return(None)
            } else {
                Terminator::Unreachable
            };
            lowerer.builder.terminate(fall_through);
        }
        let builder = lowerer.builder;
        Ok(builder.finish(pending.name, info.decl, params, result))
    }
}

/// Lowers one function body into a [`FunctionBuilder`].
pub(crate) struct FunctionLowerer<'m, 'a> {
    module: &'m mut ModuleLowerer<'a>,
    builder: FunctionBuilder,
    /// Binds the instance's generic parameters (owner's, then own).
    subst: Substitution,
    /// Mangled name of the function being lowered; source of call edges.
    name: Name,
    depth: usize,
    /// Concrete type of `self`, for methods.
    self_ty: Option<Idx>,
    self_by_address: bool,
    /// 1 when parameter 0 is `self`.
    self_offset: u32,
    /// Stack slot (address value) of each `let`.
    locals: FxHashMap<StmtId, Value>,
}

impl FunctionLowerer<'_, '_> {
    fn concrete(&mut self, ty: Idx) -> Result<Idx, LowerError> {
        self.module.concrete(ty, &self.subst)
    }

    fn pointer_to(&mut self, ty: Idx) -> Idx {
        self.module.pool.pointer(ty)
    }
}

pub(crate) fn inconsistent(detail: String) -> LowerError {
    InternalError::InconsistentAnnotation { detail }.into()
}
