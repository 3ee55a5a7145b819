//! Module-level type checker.
//!
//! Checking runs in passes so that every declaration is visible before any
//! body refers to it:
//!
//! ```text
//! Pass 0: Registration
//!   0a: declaration-site types (structs, enums, aliases, standards) and
//!       their generic parameters get their pool handles and scope entries
//!   0b: type bodies: fields, variants, alias targets, constraints,
//!       standard requirements
//!
//! Pass 1: Signatures
//!   - functions and methods enter their scopes (overload sets form here)
//!   - `conform` blocks attach methods, then conformance is verified
//!   - constants
//!
//! Pass 2: Bodies
//!   - statements and expressions, annotating every node
//! ```
//!
//! User errors accumulate in `errors`. The first internal error is parked in
//! `internal` and ends checking at the next pass boundary.

mod api;
mod bodies;
mod registration;
mod signatures;
mod type_resolution;

pub use api::check_module;

use rustc_hash::FxHashMap;
use vela_ir::{DeclId, ExprArena, ExprId, Name, Span, StringInterner};

use crate::{
    CheckConfig, FuncId, Idx, InternalError, Pool, ScopeId, Scopes, TypeCheckError,
    TypeEngine, TypeErrorKind, TypeProblem, TypedModule,
};

/// State of the function whose body is being checked.
#[derive(Clone, Debug)]
struct FunctionContext {
    result: Idx,
}

pub(crate) struct ModuleChecker<'a> {
    // === Immutable Context ===
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    config: CheckConfig,

    // === Type Storage ===
    pool: Pool,
    scopes: Scopes,
    /// Basic type names.
    universe: ScopeId,
    /// Top-level declarations; child of `universe`.
    module_scope: ScopeId,
    /// Scope holding the generic parameters of each type declaration.
    type_scopes: FxHashMap<DeclId, ScopeId>,
    /// Scope holding the parameters and own generics of each function.
    function_scopes: FxHashMap<DeclId, (FuncId, ScopeId)>,
    /// Declaration spans, indexed by `FuncId`.
    function_spans: Vec<Span>,
    /// `conform` blocks whose conformance is verified after pass 1.
    pending_conformance: Vec<(Span, Idx, Idx)>,
    /// Generic argument constraints met before every method was attached:
    /// `(span, param, argument)`.
    deferred_constraints: Vec<(Span, Idx, Idx)>,
    /// Pass 1 is complete; conformance can be decided on the spot.
    signatures_done: bool,

    // === Name Cache ===
    self_name: Name,

    // === Output ===
    typed: TypedModule,
    errors: Vec<TypeCheckError>,
    internal: Option<InternalError>,

    // === Scope Context ===
    current: Option<FunctionContext>,
}

impl<'a> ModuleChecker<'a> {
    pub(crate) fn new(
        arena: &'a ExprArena,
        interner: &'a StringInterner,
        config: &CheckConfig,
    ) -> Self {
        let mut scopes = Scopes::new();
        let universe = scopes.push(None);
        let module_scope = scopes.push(Some(universe));
        ModuleChecker {
            arena,
            interner,
            config: *config,
            pool: Pool::new(),
            scopes,
            universe,
            module_scope,
            type_scopes: FxHashMap::default(),
            function_scopes: FxHashMap::default(),
            function_spans: Vec::new(),
            pending_conformance: Vec::new(),
            deferred_constraints: Vec::new(),
            signatures_done: false,
            self_name: interner.intern("self"),
            typed: TypedModule {
                expr_types: vec![Idx::UNRESOLVED; arena.expr_count()],
                ..TypedModule::default()
            },
            errors: Vec::new(),
            internal: None,
            current: None,
        }
    }

    // ========================================
    // Engine access
    // ========================================

    fn engine(&mut self) -> TypeEngine<'_> {
        TypeEngine::new(&mut self.pool, &self.scopes, &self.config)
    }

    /// `validate` with problems reported at `span`. Returns the resolved
    /// type, or `expected` when validation failed.
    fn check_assignable(&mut self, span: Span, expected: Idx, provided: Idx) -> Idx {
        match self.engine().validate(expected, provided) {
            Ok(resolved) => resolved,
            Err(problem) => {
                self.report_problem(span, problem);
                expected
            }
        }
    }

    /// Conformance of `candidate` to the constraints of type parameter
    /// `param`, reported at `span`. Before pass 1 completes the check is
    /// deferred and optimistically passes.
    fn check_constraints(&mut self, span: Span, param: Idx, candidate: Idx) -> bool {
        if !self.signatures_done {
            self.deferred_constraints.push((span, param, candidate));
            return true;
        }
        let constraints = self
            .pool
            .type_param(param)
            .map(|p| p.constraints.clone())
            .unwrap_or_default();
        if constraints.is_empty() {
            return true;
        }
        match self.engine().conforms(&constraints, candidate) {
            Ok(()) => true,
            Err(problem) => {
                self.report_problem(span, problem);
                false
            }
        }
    }

    // ========================================
    // Diagnostics
    // ========================================

    fn error(&mut self, span: Span, kind: TypeErrorKind) {
        self.errors.push(TypeCheckError::new(span, kind));
    }

    fn report_problem(&mut self, span: Span, problem: TypeProblem) {
        match problem {
            TypeProblem::Mismatch { expected, found } => {
                self.errors
                    .push(TypeCheckError::mismatch(span, expected, found));
            }
            TypeProblem::NonConformance {
                candidate,
                standard,
                method,
            } => self.error(
                span,
                TypeErrorKind::NonConformance {
                    candidate,
                    standard,
                    method,
                },
            ),
            TypeProblem::Internal(err) => self.internal_error(err),
        }
    }

    fn internal_error(&mut self, err: InternalError) {
        tracing::debug!(%err, "internal error during checking");
        if self.internal.is_none() {
            self.internal = Some(err);
        }
    }

    /// Record an internal error from a query that cannot fail for user
    /// reasons, yielding `fallback` in its place.
    fn or_internal<T>(&mut self, result: Result<T, InternalError>, fallback: T) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                self.internal_error(err);
                fallback
            }
        }
    }

    // ========================================
    // Annotations
    // ========================================

    fn set_type(&mut self, expr: ExprId, ty: Idx) {
        if let Some(slot) = self.typed.expr_types.get_mut(expr.index()) {
            *slot = ty;
        }
    }

    fn expr_type(&self, expr: ExprId) -> Idx {
        self.typed.expr_type(expr)
    }

    fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    pub(crate) fn finish(self) -> Result<crate::CheckOutput, InternalError> {
        if let Some(err) = self.internal {
            return Err(err);
        }
        Ok(crate::CheckOutput {
            typed: self.typed,
            pool: self.pool,
            scopes: self.scopes,
            errors: self.errors,
        })
    }
}

#[cfg(test)]
mod tests;
