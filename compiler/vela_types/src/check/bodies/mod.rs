//! Pass 2: function bodies.
//!
//! Statements are checked here; expressions in `expr`, calls and overload
//! resolution in `calls`.

mod calls;
mod expr;

use vela_ir::{
    ensure_sufficient_stack, Block, ExprId, ExprKind, FunctionDecl, Item, Module, Name,
    ParsedType, Receiver, Span, StmtId, StmtKind, UnaryOp,
};

use super::{FunctionContext, ModuleChecker};
use crate::{
    Binding, Idx, LocalKind, MemberResolution, ScopeId, Symbol, TypeCheckError, TypeErrorKind,
    VarSymbol,
};

/// Why a place expression is being inspected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PlaceUse {
    /// Target of an assignment or receiver of a mutating method.
    Write,
    /// Operand of `&`.
    Address,
}

impl ModuleChecker<'_> {
    #[tracing::instrument(level = "debug", skip_all)]
    pub(in crate::check) fn check_bodies(&mut self, module: &Module) {
        for item in &module.items {
            let methods: &[FunctionDecl] = match item {
                Item::Function(f) => std::slice::from_ref(f),
                Item::Struct(d) => &d.methods,
                Item::Enum(d) => &d.methods,
                Item::Conform(c) => &c.methods,
                Item::Alias(_) | Item::Standard(_) | Item::Const(_) => &[],
            };
            for decl in methods {
                self.check_function_body(decl);
                if self.internal.is_some() {
                    return;
                }
            }
        }
    }

    fn check_function_body(&mut self, decl: &FunctionDecl) {
        let Some(body) = &decl.body else {
            return;
        };
        let Some(&(id, fn_scope)) = self.function_scopes.get(&decl.id) else {
            return;
        };
        let info = self.typed.function(id).clone();
        let Some(sig) = self.pool.function_sig(info.sig).cloned() else {
            return;
        };
        let _span = tracing::debug_span!("check_body", name = self.name_str(decl.name)).entered();

        let body_scope = self.scopes.push(Some(fn_scope));
        if let (Some(receiver), Some(owner)) = (info.receiver, info.owner) {
            let self_var = VarSymbol {
                ty: self.pool.self_instance(owner),
                mutable: receiver == Receiver::Mutating,
                kind: LocalKind::SelfParam,
            };
            // The body scope is fresh; `self` cannot collide.
            let _ = self
                .scopes
                .define(body_scope, self.self_name, Symbol::Var(self_var));
        }
        for ((index, param), param_decl) in sig.params.iter().enumerate().zip(&decl.params) {
            let var = VarSymbol {
                ty: param.ty,
                mutable: false,
                kind: LocalKind::Param(u32::try_from(index).unwrap_or(u32::MAX)),
            };
            if self
                .scopes
                .define(body_scope, param.name, Symbol::Var(var))
                .is_err()
            {
                self.error(
                    param_decl.span,
                    TypeErrorKind::Redeclaration { name: param.name },
                );
            }
        }

        self.current = Some(FunctionContext { result: sig.result });
        let returns = self.check_stmts(body_scope, &body.stmts);
        if !returns && sig.result != Idx::VOID && sig.result != Idx::UNRESOLVED {
            self.errors.push(
                TypeCheckError::mismatch(body.span, sig.result, Idx::VOID)
                    .with_note("the function can reach its end without returning a value"),
            );
        }
        self.current = None;
    }

    /// Check statements in order. Returns whether control definitely
    /// leaves through a `return`.
    fn check_stmts(&mut self, scope: ScopeId, stmts: &[StmtId]) -> bool {
        let mut returns = false;
        for &stmt in stmts {
            returns |= self.check_stmt(scope, stmt);
        }
        returns
    }

    fn check_block(&mut self, parent: ScopeId, block: &Block) -> bool {
        let scope = self.scopes.push(Some(parent));
        self.check_stmts(scope, &block.stmts)
    }

    fn check_stmt(&mut self, scope: ScopeId, id: StmtId) -> bool {
        let arena = self.arena;
        let stmt = arena.stmt(id);
        ensure_sufficient_stack(|| match &stmt.kind {
            StmtKind::Let {
                name,
                mutable,
                ty,
                init,
            } => {
                self.check_let(scope, id, stmt.span, *name, *mutable, ty.as_ref(), *init);
                false
            }
            StmtKind::Expr(expr) => {
                self.infer_root(scope, *expr, Idx::PLACEHOLDER);
                false
            }
            StmtKind::Assign { target, value } => {
                self.check_assign(scope, *target, *value);
                false
            }
            StmtKind::Return(value) => {
                self.check_return(scope, stmt.span, *value);
                true
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.infer_root(scope, *cond, Idx::BOOL);
                let then_returns = self.check_block(scope, then_block);
                let else_returns = match else_block {
                    Some(block) => self.check_block(scope, block),
                    None => false,
                };
                then_returns && else_returns
            }
            StmtKind::While { cond, body } => {
                self.infer_root(scope, *cond, Idx::BOOL);
                self.check_block(scope, body);
                false
            }
            StmtKind::Block(block) => self.check_block(scope, block),
        })
    }

    #[expect(clippy::too_many_arguments, reason = "mirrors the fields of StmtKind::Let")]
    fn check_let(
        &mut self,
        scope: ScopeId,
        id: StmtId,
        span: Span,
        name: Name,
        mutable: bool,
        ty: Option<&ParsedType>,
        init: Option<ExprId>,
    ) {
        let declared = ty.map(|parsed| self.resolve_type(scope, parsed));
        let local_ty = match (declared, init) {
            (None, None) => {
                self.error(span, TypeErrorKind::MissingTypeAnnotation { name });
                Idx::UNRESOLVED
            }
            (Some(declared), None) => declared,
            (declared, Some(init)) => {
                let found = self.infer_root(scope, init, declared.unwrap_or(Idx::PLACEHOLDER));
                match declared {
                    Some(declared) => declared,
                    None if matches!(
                        self.arena.expr(init).kind,
                        ExprKind::Literal(vela_ir::Literal::Nil)
                    ) =>
                    {
                        self.error(span, TypeErrorKind::MissingTypeAnnotation { name });
                        Idx::UNRESOLVED
                    }
                    None => found,
                }
            }
        };

        self.typed.local_types.insert(id, local_ty);
        let var = VarSymbol {
            ty: local_ty,
            mutable,
            kind: LocalKind::Local(id),
        };
        if self.scopes.define(scope, name, Symbol::Var(var)).is_err() {
            self.error(span, TypeErrorKind::Redeclaration { name });
        }
    }

    fn check_assign(&mut self, scope: ScopeId, target: ExprId, value: ExprId) {
        let target_ty = self.check_expr(scope, target, Idx::PLACEHOLDER);
        if let Some(kind) = self.place_error(scope, target, PlaceUse::Write) {
            let span = self.arena.expr(target).span;
            self.error(span, kind);
        }
        self.infer_root(scope, value, target_ty);
    }

    fn check_return(&mut self, scope: ScopeId, span: Span, value: Option<ExprId>) {
        let result = self.current.as_ref().map_or(Idx::VOID, |c| c.result);
        match value {
            Some(value) => {
                self.infer_root(scope, value, result);
            }
            None if result != Idx::VOID && result != Idx::UNRESOLVED => {
                self.errors
                    .push(TypeCheckError::mismatch(span, result, Idx::VOID));
            }
            None => {}
        }
    }

    // ========================================
    // Expression roots and literal finalization
    // ========================================

    /// Check an expression root against `expected` and settle its literal
    /// types. Returns the final type of the root.
    pub(super) fn infer_root(&mut self, scope: ScopeId, expr: ExprId, expected: Idx) -> Idx {
        let found = self.check_expr(scope, expr, expected);
        let span = self.arena.expr(expr).span;
        let resolved = self.check_assignable(span, expected, found);
        self.finalize_literals(expr, resolved);
        self.expr_type(expr)
    }

    /// Replace literal types left on `expr` (and the arithmetic chain
    /// feeding it) with `target`, or with the default when `target` cannot
    /// hold the literal.
    pub(super) fn finalize_literals(&mut self, expr: ExprId, target: Idx) {
        let ty = self.expr_type(expr);
        if !ty.is_literal() {
            return;
        }
        let settled = self.settle_literal(ty, target);
        self.set_type(expr, settled);
        match &self.arena.expr(expr).kind {
            ExprKind::Binary { op, lhs, rhs } if op.is_arithmetic() || op.is_bitwise() => {
                let (lhs, rhs) = (*lhs, *rhs);
                self.finalize_literals(lhs, settled);
                self.finalize_literals(rhs, settled);
            }
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => {
                let operand = *operand;
                self.finalize_literals(operand, settled);
            }
            _ => {}
        }
    }

    pub(super) fn settle_literal(&mut self, literal: Idx, target: Idx) -> Idx {
        let stripped = {
            let stripped = self.engine().strip_aliases(target);
            self.or_internal(stripped, target)
        };
        match literal {
            Idx::INT_LITERAL if self.pool.is_numeric(stripped) => stripped,
            Idx::INT_LITERAL => Idx::INT,
            Idx::FLOAT_LITERAL if self.pool.is_floating(stripped) => stripped,
            Idx::FLOAT_LITERAL => Idx::DOUBLE,
            Idx::NIL_LITERAL if self.pool.is_pointer(stripped) => stripped,
            Idx::NIL_LITERAL => self.pool.pointer(Idx::VOID),
            other => other,
        }
    }

    // ========================================
    // Places
    // ========================================

    /// Why `expr` cannot be written (or have its address taken), if it
    /// cannot. Nodes already reported as unresolved pass.
    fn place_error(&self, scope: ScopeId, expr: ExprId, usage: PlaceUse) -> Option<TypeErrorKind> {
        let invalid = || match usage {
            PlaceUse::Write => TypeErrorKind::InvalidAssignTarget,
            PlaceUse::Address => TypeErrorKind::InvalidOperand {
                op: UnaryOp::AddressOf.as_symbol(),
                ty: self.expr_type(expr),
            },
        };
        match &self.arena.expr(expr).kind {
            ExprKind::Ident(name) => match self.typed.binding(expr) {
                Some(Binding::Local(_)) => {
                    let mutable = matches!(
                        self.scopes.resolve(scope, *name),
                        Some(Symbol::Var(v)) if v.mutable
                    );
                    (usage == PlaceUse::Write && !mutable)
                        .then_some(TypeErrorKind::AssignToImmutable { name: *name })
                }
                Some(Binding::SelfParam) => {
                    let mutable = matches!(
                        self.scopes.resolve(scope, *name),
                        Some(Symbol::Var(v)) if v.mutable
                    );
                    match (mutable, usage) {
                        (true, _) => None,
                        (false, PlaceUse::Write) => {
                            Some(TypeErrorKind::AssignToImmutable { name: *name })
                        }
                        (false, PlaceUse::Address) => Some(invalid()),
                    }
                }
                Some(Binding::Param(_)) => Some(match usage {
                    PlaceUse::Write => TypeErrorKind::AssignToImmutable { name: *name },
                    PlaceUse::Address => invalid(),
                }),
                Some(Binding::Function(_) | Binding::Const { .. }) => Some(invalid()),
                None => None,
            },
            ExprKind::Member { base, .. } => match self.typed.member(expr) {
                Some(MemberResolution::Field {
                    through_pointer: true,
                    ..
                }) => None,
                Some(MemberResolution::Field { .. }) => self.place_error(scope, *base, usage),
                Some(MemberResolution::Method | MemberResolution::Variant { .. }) => {
                    Some(invalid())
                }
                None => None,
            },
            ExprKind::Unary {
                op: UnaryOp::Deref, ..
            } => None,
            _ => Some(invalid()),
        }
    }
}
