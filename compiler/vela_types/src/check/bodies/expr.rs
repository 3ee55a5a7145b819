//! Expression checking.

use rustc_hash::FxHashSet;
use vela_ir::{
    ensure_sufficient_stack, BinaryOp, ExprId, ExprKind, FieldInit, Name, ParsedType, Span,
    UnaryOp,
};

use super::PlaceUse;
use crate::check::signatures::literal_type;
use crate::check::type_resolution::OwnerType;
use crate::check::ModuleChecker;
use crate::{
    default_literal, BasicKind, Binding, Field, Idx, LocalKind, MemberResolution, ScopeId,
    Substitution, Symbol, TypeCheckError, TypeData, TypeErrorKind, Variant,
};

impl ModuleChecker<'_> {
    /// Check `id` with `expected` as inference context and record its type.
    /// Literal types are left unsettled; the root settles them.
    pub(in crate::check) fn check_expr(&mut self, scope: ScopeId, id: ExprId, expected: Idx) -> Idx {
        let ty = ensure_sufficient_stack(|| self.infer_expr(scope, id, expected));
        self.set_type(id, ty);
        ty
    }

    fn infer_expr(&mut self, scope: ScopeId, id: ExprId, expected: Idx) -> Idx {
        let arena = self.arena;
        let expr = arena.expr(id);
        match &expr.kind {
            ExprKind::Literal(lit) => literal_type(*lit),
            ExprKind::Ident(name) => self.infer_ident(scope, id, expr.span, *name, expected),
            ExprKind::Binary { op, lhs, rhs } => {
                self.infer_binary(scope, expr.span, *op, *lhs, *rhs, expected)
            }
            ExprKind::Unary { op, operand } => {
                self.infer_unary(scope, expr.span, *op, *operand, expected)
            }
            ExprKind::Call {
                callee,
                type_args,
                args,
            } => self.infer_call(scope, id, expr.span, *callee, type_args, args, expected),
            ExprKind::Member { base, name } => {
                self.infer_member(scope, id, expr.span, *base, *name)
            }
            ExprKind::TypeMember { ty, member } => {
                self.infer_type_member(scope, id, expr.span, ty, *member, expected)
            }
            ExprKind::StructLit { ty, fields } => {
                self.infer_struct_lit(scope, expr.span, ty, fields, expected)
            }
        }
    }

    // ========================================
    // Names
    // ========================================

    fn infer_ident(
        &mut self,
        scope: ScopeId,
        id: ExprId,
        span: Span,
        name: Name,
        expected: Idx,
    ) -> Idx {
        match self.scopes.resolve(scope, name).cloned() {
            Some(Symbol::Var(var)) => {
                let binding = match var.kind {
                    LocalKind::Local(stmt) => Binding::Local(stmt),
                    LocalKind::Param(index) => Binding::Param(index),
                    LocalKind::SelfParam => Binding::SelfParam,
                };
                self.typed.bindings.insert(id, binding);
                var.ty
            }
            Some(Symbol::Const { ty, value }) => {
                self.typed.bindings.insert(id, Binding::Const { value, ty });
                ty
            }
            Some(symbol @ (Symbol::Function(_) | Symbol::FunctionSet(_))) => {
                let all = symbol.functions();
                let chosen: Vec<_> = if all.len() == 1 {
                    all.to_vec()
                } else {
                    all.iter()
                        .filter(|f| {
                            self.pool.function_sig(expected).is_some()
                                && self.engine().validate(expected, f.sig).is_ok()
                        })
                        .cloned()
                        .collect()
                };
                match chosen.as_slice() {
                    [only] => {
                        if self.typed.function(only.id).is_generic() {
                            self.error(span, TypeErrorKind::BareGenericReference { name });
                            return Idx::UNRESOLVED;
                        }
                        self.typed.bindings.insert(id, Binding::Function(only.id));
                        only.sig
                    }
                    _ => {
                        self.errors.push(
                            TypeCheckError::new(
                                span,
                                TypeErrorKind::AmbiguousCall {
                                    name,
                                    candidates: all.len(),
                                },
                            )
                            .with_note("annotate the expected function type to pick an overload"),
                        );
                        Idx::UNRESOLVED
                    }
                }
            }
            Some(Symbol::Type(_)) | None => {
                self.error(span, TypeErrorKind::UnresolvedIdentifier { name });
                Idx::UNRESOLVED
            }
        }
    }

    // ========================================
    // Operators
    // ========================================

    fn infer_binary(
        &mut self,
        scope: ScopeId,
        span: Span,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        expected: Idx,
    ) -> Idx {
        if op.is_logical() {
            self.infer_root(scope, lhs, Idx::BOOL);
            self.infer_root(scope, rhs, Idx::BOOL);
            return Idx::BOOL;
        }

        let operand_hint = if op.is_comparison() {
            Idx::PLACEHOLDER
        } else {
            expected
        };
        let l = self.check_expr(scope, lhs, operand_hint);
        let r = self.check_expr(scope, rhs, operand_hint);
        if l == Idx::UNRESOLVED || r == Idx::UNRESOLVED {
            return if op.is_comparison() {
                Idx::BOOL
            } else {
                Idx::UNRESOLVED
            };
        }
        let unified = match self.engine().validate(l, r) {
            Ok(unified) => unified,
            Err(problem) => {
                self.report_problem(span, problem);
                self.finalize_literals(lhs, Idx::PLACEHOLDER);
                self.finalize_literals(rhs, Idx::PLACEHOLDER);
                return if op.is_comparison() {
                    Idx::BOOL
                } else {
                    Idx::UNRESOLVED
                };
            }
        };

        if op.is_comparison() {
            let target = default_literal(unified);
            self.finalize_literals(lhs, target);
            self.finalize_literals(rhs, target);
            let operand = self.expr_type(lhs);
            if !self.supports_comparison(op, operand) {
                self.error(
                    span,
                    TypeErrorKind::InvalidOperand {
                        op: op.as_symbol(),
                        ty: operand,
                    },
                );
            }
            return Idx::BOOL;
        }

        if !self.supports_arithmetic(op, unified) {
            self.error(
                span,
                TypeErrorKind::InvalidOperand {
                    op: op.as_symbol(),
                    ty: unified,
                },
            );
            return Idx::UNRESOLVED;
        }
        if !unified.is_literal() {
            self.finalize_literals(lhs, unified);
            self.finalize_literals(rhs, unified);
        }
        unified
    }

    fn operand_kind(&mut self, ty: Idx) -> Option<BasicKind> {
        let stripped = self.engine().strip_aliases(ty);
        let stripped = self.or_internal(stripped, ty);
        self.pool.basic_kind(stripped)
    }

    fn supports_arithmetic(&mut self, op: BinaryOp, ty: Idx) -> bool {
        let Some(kind) = self.operand_kind(ty) else {
            return false;
        };
        if op.is_bitwise() {
            return kind.is_integer() || kind == BasicKind::IntegerLiteral;
        }
        kind.is_numeric()
            || matches!(kind, BasicKind::IntegerLiteral | BasicKind::FloatLiteral)
            || (op == BinaryOp::Add && kind == BasicKind::String)
    }

    fn supports_comparison(&mut self, op: BinaryOp, ty: Idx) -> bool {
        let stripped = self.engine().strip_aliases(ty);
        let stripped = self.or_internal(stripped, ty);
        let Some(kind) = self.pool.basic_kind(stripped) else {
            return matches!(op, BinaryOp::Eq | BinaryOp::NotEq) && self.pool.is_pointer(stripped);
        };
        match op {
            BinaryOp::Eq | BinaryOp::NotEq => {
                !matches!(kind, BasicKind::Void | BasicKind::Any)
            }
            _ => kind.is_numeric() || matches!(kind, BasicKind::Char | BasicKind::String),
        }
    }

    fn infer_unary(
        &mut self,
        scope: ScopeId,
        span: Span,
        op: UnaryOp,
        operand: ExprId,
        expected: Idx,
    ) -> Idx {
        match op {
            UnaryOp::Not => {
                self.infer_root(scope, operand, Idx::BOOL);
                Idx::BOOL
            }
            UnaryOp::Neg => {
                let ty = self.check_expr(scope, operand, expected);
                if ty == Idx::UNRESOLVED {
                    return ty;
                }
                match self.operand_kind(ty) {
                    Some(kind)
                        if kind.is_numeric()
                            || matches!(
                                kind,
                                BasicKind::IntegerLiteral | BasicKind::FloatLiteral
                            ) =>
                    {
                        ty
                    }
                    _ => {
                        self.error(span, TypeErrorKind::InvalidOperand { op: op.as_symbol(), ty });
                        Idx::UNRESOLVED
                    }
                }
            }
            UnaryOp::AddressOf => {
                let ty = self.check_expr(scope, operand, Idx::PLACEHOLDER);
                self.finalize_literals(operand, Idx::PLACEHOLDER);
                if ty == Idx::UNRESOLVED {
                    return ty;
                }
                if let Some(kind) = self.place_error(scope, operand, PlaceUse::Address) {
                    self.error(span, kind);
                    return Idx::UNRESOLVED;
                }
                let settled = self.expr_type(operand);
                self.pool.pointer(settled)
            }
            UnaryOp::Deref => {
                let ty = self.check_expr(scope, operand, Idx::PLACEHOLDER);
                if ty == Idx::UNRESOLVED {
                    return ty;
                }
                let stripped = self.engine().strip_aliases(ty);
                let stripped = self.or_internal(stripped, ty);
                match self.pool.pointee(stripped) {
                    Some(pointee) => pointee,
                    None => {
                        self.error(span, TypeErrorKind::InvalidOperand { op: op.as_symbol(), ty });
                        Idx::UNRESOLVED
                    }
                }
            }
        }
    }

    // ========================================
    // Members
    // ========================================

    /// Look through aliases and one level of pointer. Returns the type to
    /// search members on and whether a pointer was crossed.
    pub(super) fn auto_deref(&mut self, ty: Idx) -> (Idx, bool) {
        let stripped = self.engine().strip_aliases(ty);
        let stripped = self.or_internal(stripped, ty);
        match self.pool.pointee(stripped) {
            Some(pointee) => (pointee, true),
            None => (ty, false),
        }
    }

    fn infer_member(
        &mut self,
        scope: ScopeId,
        id: ExprId,
        span: Span,
        base: ExprId,
        name: Name,
    ) -> Idx {
        let base_ty = self.infer_root(scope, base, Idx::PLACEHOLDER);
        if base_ty == Idx::UNRESOLVED {
            return base_ty;
        }
        let (target, through_pointer) = self.auto_deref(base_ty);
        let field = self.engine().resolve_field(target, name);
        match self.or_internal(field, None) {
            Some((index, ty)) => {
                self.typed.members.insert(
                    id,
                    MemberResolution::Field {
                        index,
                        owner: target,
                        through_pointer,
                    },
                );
                ty
            }
            None => {
                let is_struct = {
                    let fields = self.engine().struct_fields(target);
                    self.or_internal(fields, None).is_some()
                };
                let kind = if is_struct {
                    TypeErrorKind::UnknownField {
                        ty: target,
                        field: name,
                    }
                } else {
                    TypeErrorKind::UnknownMember {
                        ty: target,
                        member: name,
                    }
                };
                self.error(span, kind);
                Idx::UNRESOLVED
            }
        }
    }

    /// The declared variant `name` of enum `owner` with its position.
    pub(super) fn find_variant(&self, owner: Idx, name: Name) -> Option<(u32, Variant)> {
        let underlying = self.pool.defined(owner)?.underlying;
        let TypeData::Enum(variants) = self.pool.get(underlying) else {
            return None;
        };
        let index = variants.iter().position(|v| v.name == name)?;
        Some((u32::try_from(index).ok()?, variants[index].clone()))
    }

    fn infer_type_member(
        &mut self,
        scope: ScopeId,
        id: ExprId,
        span: Span,
        ty: &ParsedType,
        member: Name,
        expected: Idx,
    ) -> Idx {
        let Some(owner) = self.resolve_owner(scope, ty) else {
            return Idx::UNRESOLVED;
        };
        let Some((index, variant)) = self.find_variant(owner.ty, member) else {
            self.error(
                span,
                TypeErrorKind::UnknownMember {
                    ty: owner.ty,
                    member,
                },
            );
            return Idx::UNRESOLVED;
        };
        if variant.has_payload() {
            self.errors.push(
                TypeCheckError::new(
                    span,
                    TypeErrorKind::UnresolvedCall {
                        name: member,
                        arg_types: Vec::new(),
                    },
                )
                .with_note(format!(
                    "variant `{}` carries {} payload field(s)",
                    self.name_str(member),
                    variant.fields.len()
                )),
            );
            return Idx::UNRESOLVED;
        }
        let bindings = owner.bindings.clone();
        let Some(enum_ty) = self.complete_owner(&owner, bindings, expected, span) else {
            return Idx::UNRESOLVED;
        };
        self.typed
            .members
            .insert(id, MemberResolution::Variant { enum_ty, index });
        enum_ty
    }

    /// Bind free parameters of `owner` from the expected type, when that is
    /// a use of the same declaration. Runs before argument inference so
    /// context wins over literal defaults.
    pub(super) fn seed_from_expected(
        &mut self,
        owner: &OwnerType,
        subst: &mut Substitution,
        expected: Idx,
    ) {
        if owner.free.is_empty() || expected == Idx::PLACEHOLDER {
            return;
        }
        let Ok(canon) = self.engine().resolve_canonical(expected) else {
            return;
        };
        if canon.ty != owner.ty {
            return;
        }
        for &param in &owner.free {
            if let (false, Some(bound)) = (subst.contains(param), canon.bindings.get(param)) {
                subst.insert(param, bound);
            }
        }
    }

    /// Bind every free parameter of `owner` (from `subst`, then from the
    /// expected type) and return the concrete owner type.
    pub(super) fn complete_owner(
        &mut self,
        owner: &OwnerType,
        mut subst: Substitution,
        expected: Idx,
        span: Span,
    ) -> Option<Idx> {
        self.seed_from_expected(owner, &mut subst, expected);
        if let Some(&missing) = owner.free.iter().find(|p| !subst.contains(**p)) {
            let name = self
                .pool
                .defined(owner.ty)
                .map_or_else(|| self.interner.intern("?"), |d| d.name);
            let param = self
                .pool
                .type_param(missing)
                .map_or_else(|| self.interner.intern("?"), |p| p.name);
            self.error(span, TypeErrorKind::CannotInferTypeArgument { name, param });
            return None;
        }

        let params = self.generic_params_of(owner.ty);
        if params.is_empty() {
            return Some(owner.ty);
        }
        let args = subst.args_for(&params)?;
        for &param in &owner.free {
            if let Some(arg) = subst.get(param) {
                self.check_constraints(span, param, arg);
            }
        }
        Some(self.pool.specialize(owner.ty, args))
    }

    // ========================================
    // Struct literals
    // ========================================

    fn infer_struct_lit(
        &mut self,
        scope: ScopeId,
        span: Span,
        ty: &ParsedType,
        inits: &[FieldInit],
        expected: Idx,
    ) -> Idx {
        let owner = self.resolve_owner(scope, ty);
        let declared = owner.as_ref().and_then(|o| self.declared_fields(o.ty));
        let (Some(owner), Some(declared)) = (owner.clone(), declared) else {
            if let (Some(_), Some(name)) = (owner, ty.head_name()) {
                self.errors.push(
                    TypeCheckError::new(ty.span, TypeErrorKind::UnknownType { name })
                        .with_note("struct literals construct struct types only"),
                );
            }
            for init in inits {
                self.infer_root(scope, init.value, Idx::PLACEHOLDER);
            }
            return Idx::UNRESOLVED;
        };

        let generic = !owner.free.is_empty();
        let mut seen = FxHashSet::default();
        let mut matched: Vec<(&FieldInit, Idx, Idx)> = Vec::with_capacity(inits.len());
        for init in inits {
            if !seen.insert(init.name) {
                self.error(init.span, TypeErrorKind::Redeclaration { name: init.name });
                self.infer_root(scope, init.value, Idx::PLACEHOLDER);
                continue;
            }
            let Some(field) = declared.iter().find(|f| f.name == init.name) else {
                self.error(
                    init.span,
                    TypeErrorKind::UnknownField {
                        ty: owner.ty,
                        field: init.name,
                    },
                );
                self.infer_root(scope, init.value, Idx::PLACEHOLDER);
                continue;
            };
            let hint = if generic {
                Idx::PLACEHOLDER
            } else {
                let instantiated = self.engine().instantiate(field.ty, &owner.bindings);
                self.or_internal(instantiated, Idx::UNRESOLVED)
            };
            let found = self.check_expr(scope, init.value, hint);
            matched.push((init, field.ty, found));
        }

        let mut subst = owner.bindings.clone();
        if generic {
            self.seed_from_expected(&owner, &mut subst, expected);
            for &(_, field_ty, found) in &matched {
                let inferred = self
                    .engine()
                    .infer_bindings(&owner.free, field_ty, found, &mut subst);
                self.or_internal(inferred, ());
            }
        }
        let Some(struct_ty) = self.complete_owner(&owner, subst.clone(), expected, span) else {
            for &(init, _, _) in &matched {
                self.finalize_literals(init.value, Idx::PLACEHOLDER);
            }
            return Idx::UNRESOLVED;
        };
        let bindings = {
            let defined = self.engine().defined_of(struct_ty);
            self.or_internal(defined, None)
                .map(|(_, bindings)| bindings)
                .unwrap_or(subst)
        };

        for (init, field_ty, found) in matched {
            let target = {
                let instantiated = self.engine().instantiate(field_ty, &bindings);
                self.or_internal(instantiated, Idx::UNRESOLVED)
            };
            let resolved = self.check_assignable(init.span, target, found);
            self.finalize_literals(init.value, resolved);
        }
        for field in &declared {
            if !seen.contains(&field.name) {
                self.error(
                    span,
                    TypeErrorKind::MissingField {
                        ty: struct_ty,
                        field: field.name,
                    },
                );
            }
        }
        struct_ty
    }

    /// Unsubstituted fields of a struct declaration.
    fn declared_fields(&self, ty: Idx) -> Option<Vec<Field>> {
        let underlying = self.pool.defined(ty)?.underlying;
        match self.pool.get(underlying) {
            TypeData::Struct(fields) => Some(fields.clone()),
            _ => None,
        }
    }
}
