//! Pass 1: function signatures, `conform` blocks and constants.
//!
//! Every function and method enters its scope before any body is checked,
//! which is what lets bodies call forward and recurse mutually.

use vela_ir::{
    ConformDecl, ConstDecl, DeclId, ExprKind, FunctionDecl, Item, Literal, Module, ParsedTypeKind,
    UnaryOp,
};

use super::ModuleChecker;
use crate::{
    DefineError, FuncId, FunctionInfo, FunctionSig, FunctionSymbol, Idx, OverloadKey, ScopeId,
    Symbol, TypeCheckError, TypeData, TypeErrorKind, Var,
};

impl ModuleChecker<'_> {
    /// Build the signature type of `decl` in a fresh scope chained to
    /// `parent`. Returns the signature, that scope, and the function's own
    /// generic parameters.
    pub(super) fn build_signature(
        &mut self,
        decl: &FunctionDecl,
        parent: ScopeId,
    ) -> (Idx, ScopeId, Vec<Idx>) {
        let scope = self.scopes.push(Some(parent));
        let own = self.declare_generic_params(scope, &decl.generics);
        self.resolve_generic_constraints(scope, &decl.generics);

        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = match &param.ty {
                Some(parsed) => self.resolve_type(scope, parsed),
                None => {
                    self.error(
                        param.span,
                        TypeErrorKind::MissingTypeAnnotation { name: param.name },
                    );
                    Idx::UNRESOLVED
                }
            };
            params.push(Var::param(param.name, param.label, ty));
        }
        let result = match &decl.result {
            Some(parsed) => self.resolve_type(scope, parsed),
            None => Idx::VOID,
        };

        let sig = self.pool.function(FunctionSig {
            type_params: own.clone(),
            params,
            result,
            scope: Some(scope),
        });
        (sig, scope, own)
    }

    /// Build `decl`'s signature and define it in `define_in`.
    fn register_function(
        &mut self,
        decl: &FunctionDecl,
        owner: Option<Idx>,
        define_in: ScopeId,
        parent: ScopeId,
        owner_generics: &[Idx],
    ) -> FuncId {
        let (sig, scope, own) = self.build_signature(decl, parent);
        let raw = u32::try_from(self.typed.functions.len()).unwrap_or(u32::MAX);
        let id = FuncId::new(raw);

        let mut generic_params = owner_generics.to_vec();
        generic_params.extend(own);
        self.typed.functions.push(FunctionInfo {
            name: decl.name,
            decl: decl.id,
            owner,
            receiver: decl.receiver,
            sig,
            generic_params,
            has_body: decl.body.is_some(),
        });
        self.function_scopes.insert(decl.id, (id, scope));
        self.function_spans.push(decl.span);

        let key = self.overload_key(sig);
        let symbol = Symbol::Function(FunctionSymbol { id, sig, key });
        match self.scopes.define(define_in, decl.name, symbol) {
            Ok(()) => {}
            Err(DefineError::Redeclaration) => {
                self.error(decl.span, TypeErrorKind::Redeclaration { name: decl.name });
            }
            Err(DefineError::DuplicateOverload { existing }) => {
                tracing::trace!(?existing, "duplicate overload");
                let mut err = TypeCheckError::new(
                    decl.span,
                    TypeErrorKind::DuplicateOverload { name: decl.name },
                );
                if let Some(&previous) = self.function_spans.get(existing.index()) {
                    err = err.with_previous(previous);
                }
                self.errors.push(err);
            }
        }
        id
    }

    fn overload_key(&mut self, sig: Idx) -> OverloadKey {
        let Some(s) = self.pool.function_sig(sig).cloned() else {
            return OverloadKey::new(Vec::new(), []);
        };
        let labels = s.params.iter().map(|p| p.label).collect();
        let shapes = {
            let engine = self.engine();
            s.params
                .iter()
                .map(|p| engine.param_shape(p.ty, &s.type_params))
                .collect::<Result<Vec<_>, _>>()
        };
        let shapes = self.or_internal(shapes, Vec::new());
        OverloadKey::from_shapes(labels, shapes)
    }

    /// Pass 1.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn collect_signatures(&mut self, module: &Module) {
        for item in &module.items {
            match item {
                Item::Function(f) => {
                    self.register_function(f, None, self.module_scope, self.module_scope, &[]);
                }
                Item::Struct(d) => self.register_methods(d.id, &d.methods),
                Item::Enum(d) => self.register_methods(d.id, &d.methods),
                Item::Conform(c) => self.register_conform(c),
                Item::Const(c) => self.register_const(c),
                Item::Alias(_) | Item::Standard(_) => {}
            }
        }
        self.signatures_done = true;
    }

    fn register_methods(&mut self, decl: DeclId, methods: &[FunctionDecl]) {
        let (Some(owner), Some(&scope)) = (self.pool.declared(decl), self.type_scopes.get(&decl))
        else {
            return;
        };
        let Some(defined) = self.pool.defined(owner) else {
            return;
        };
        let (members, generics) = (defined.members, defined.type_params.clone());
        for method in methods {
            self.register_function(method, Some(owner), members, scope, &generics);
        }
    }

    /// Attach the methods of a `conform` block to its target and queue the
    /// conformance check.
    fn register_conform(&mut self, c: &ConformDecl) {
        // A generic type is extended through its bare name; its methods see
        // the declaration's own parameters.
        let bare_generic = match &c.target.kind {
            ParsedTypeKind::Named { name, args } if args.is_empty() => {
                match self.scopes.resolve(self.module_scope, *name) {
                    Some(Symbol::Type(ty)) if !self.generic_params_of(*ty).is_empty() => Some(*ty),
                    _ => None,
                }
            }
            _ => None,
        };
        let target = match bare_generic {
            Some(ty) => ty,
            None => self.resolve_type(self.module_scope, &c.target),
        };
        if target == Idx::UNRESOLVED {
            return;
        }
        let target = {
            let stripped = self.engine().strip_aliases(target);
            self.or_internal(stripped, Idx::UNRESOLVED)
        };
        if target == Idx::UNRESOLVED {
            return;
        }

        let (owner, members, parent, generics) = match self.pool.get(target) {
            TypeData::Defined(d) => {
                let parent = self
                    .type_scopes
                    .get(&d.decl)
                    .copied()
                    .unwrap_or(self.module_scope);
                (target, d.members, parent, d.type_params.clone())
            }
            TypeData::Specialized { instance_of, args } => {
                let found = args.len();
                if let Some(name) = self.pool.defined(*instance_of).map(|d| d.name) {
                    self.errors.push(
                        crate::TypeCheckError::new(
                            c.target.span,
                            TypeErrorKind::GenericArityMismatch {
                                name,
                                expected: 0,
                                found,
                            },
                        )
                        .with_note("extend a generic type through its bare name"),
                    );
                }
                return;
            }
            _ => {
                let members = self.scopes.ensure_extension_scope(target);
                (target, members, self.module_scope, Vec::new())
            }
        };

        for method in &c.methods {
            self.register_function(method, Some(owner), members, parent, &generics);
        }

        if let Some(parsed) = &c.standard {
            let standard = self.resolve_type(self.module_scope, parsed);
            if standard == Idx::UNRESOLVED {
                return;
            }
            if self.pool.standard(standard).is_none() {
                if let Some(name) = parsed.head_name() {
                    self.errors.push(
                        crate::TypeCheckError::new(parsed.span, TypeErrorKind::UnknownType { name })
                            .with_note("a type can only conform to a standard"),
                    );
                }
                return;
            }
            let candidate = self.pool.self_instance(owner);
            self.pending_conformance.push((c.span, candidate, standard));
        }
    }

    fn register_const(&mut self, c: &ConstDecl) {
        let expr = self.arena.expr(c.value);
        let value = match &expr.kind {
            ExprKind::Literal(lit) => Some(*lit),
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => match self.arena.expr(*operand).kind {
                ExprKind::Literal(Literal::Int(v)) => v.checked_neg().map(Literal::Int),
                ExprKind::Literal(Literal::Float(bits)) => {
                    Some(Literal::float(-f64::from_bits(bits)))
                }
                _ => None,
            },
            _ => None,
        };
        let Some(value) = value else {
            self.error(c.span, TypeErrorKind::ConstNotLiteral { name: c.name });
            return;
        };

        let literal_ty = literal_type(value);
        let ty = match &c.ty {
            Some(parsed) => {
                let declared = self.resolve_type(self.module_scope, parsed);
                self.check_assignable(expr.span, declared, literal_ty);
                declared
            }
            None if value == Literal::Nil => {
                self.error(c.span, TypeErrorKind::MissingTypeAnnotation { name: c.name });
                Idx::UNRESOLVED
            }
            None => crate::default_literal(literal_ty),
        };
        let settled = self.settle_literal(literal_ty, ty);
        self.set_type(c.value, settled);
        if let ExprKind::Unary { operand, .. } = &expr.kind {
            self.set_type(*operand, settled);
        }

        if self
            .scopes
            .define(self.module_scope, c.name, Symbol::Const { ty, value })
            .is_err()
        {
            self.error(c.span, TypeErrorKind::Redeclaration { name: c.name });
        }
    }

    /// Verify queued generic-argument constraints and `conform` blocks now
    /// that every method is attached.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn check_pending_conformance(&mut self) {
        for (span, param, candidate) in std::mem::take(&mut self.deferred_constraints) {
            self.check_constraints(span, param, candidate);
        }
        for (span, candidate, standard) in std::mem::take(&mut self.pending_conformance) {
            if let Err(problem) = self.engine().conforms(&[standard], candidate) {
                self.report_problem(span, problem);
            }
        }
    }
}

/// The type a literal has before context settles it.
pub(super) fn literal_type(lit: Literal) -> Idx {
    match lit {
        Literal::Int(_) => Idx::INT_LITERAL,
        Literal::Float(_) => Idx::FLOAT_LITERAL,
        Literal::Bool(_) => Idx::BOOL,
        Literal::Str(_) => Idx::STRING,
        Literal::Char(_) => Idx::CHAR,
        Literal::Nil => Idx::NIL_LITERAL,
    }
}
