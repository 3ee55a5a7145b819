//! Calls and overload resolution.
//!
//! Arguments are checked once, without context, before any candidate is
//! tried. Each candidate then gets a fresh substitution seeded with the
//! bindings its owner already fixes; the remaining generic parameters are
//! inferred from the arguments (and from the expected result), after which
//! every argument must validate against the instantiated parameter. Exactly
//! one surviving candidate is a resolution.

use vela_ir::{CallArg, ExprId, ExprKind, Name, ParsedType, Receiver, Span};

use crate::check::ModuleChecker;
use crate::{
    default_literal, Binding, CallKind, CallResolution, FuncId, Idx, InternalError,
    MemberResolution, ScopeId, Substitution, Symbol, TypeCheckError, TypeErrorKind,
    TypeProblem,
};

use super::PlaceUse;

/// A checked call argument.
#[derive(Copy, Clone, Debug)]
struct ArgInfo {
    label: Option<Name>,
    ty: Idx,
    expr: ExprId,
    span: Span,
}

/// One overload under consideration. Constrained-method requirements have
/// no function id.
#[derive(Copy, Clone, Debug)]
struct Candidate {
    func: Option<FuncId>,
    sig: Idx,
}

/// The candidate overload resolution settled on.
#[derive(Clone, Debug)]
struct OverloadMatch {
    func: Option<FuncId>,
    /// Instantiated signature.
    sig: Idx,
    params: Vec<Idx>,
    result: Idx,
    subst: Substitution,
}

/// Why a candidate was dropped.
#[derive(Clone, Debug)]
enum Rejection {
    Arity { expected: usize, found: usize },
    Labels,
    TypeArgCount { expected: usize, found: usize },
    CannotInfer(Idx),
    Constraint(TypeProblem),
    Argument { index: usize, expected: Idx, found: Idx },
}

/// Where resolution stands before candidates are tried: bindings the owner
/// fixes, owner parameters still free, and explicit type arguments.
struct CallSite<'c> {
    name: Name,
    span: Span,
    fixed: &'c Substitution,
    free_owner: &'c [Idx],
    explicit: &'c [Idx],
    expected: Idx,
}

impl ModuleChecker<'_> {
    #[expect(clippy::too_many_arguments, reason = "matches ExprKind::Call structure")]
    pub(super) fn infer_call(
        &mut self,
        scope: ScopeId,
        id: ExprId,
        span: Span,
        callee: ExprId,
        type_args: &[ParsedType],
        args: &[CallArg],
        expected: Idx,
    ) -> Idx {
        let explicit: Vec<Idx> = type_args
            .iter()
            .map(|parsed| self.resolve_type(scope, parsed))
            .collect();
        let arena = self.arena;
        let callee_expr = arena.expr(callee);
        let arg_infos = self.check_args(scope, args);
        if explicit.contains(&Idx::UNRESOLVED) {
            self.settle_args(&arg_infos);
            return Idx::UNRESOLVED;
        }

        let result = match &callee_expr.kind {
            ExprKind::Ident(name) => {
                self.call_named(scope, id, span, callee, *name, &explicit, &arg_infos, expected)
            }
            ExprKind::Member { base, name } => self.call_method(
                scope, id, span, callee, *base, *name, &explicit, &arg_infos, expected,
            ),
            ExprKind::TypeMember { ty, member } => self.call_type_member(
                scope, id, span, callee, ty, *member, &explicit, &arg_infos, expected,
            ),
            _ => {
                let callee_ty = self.infer_root(scope, callee, Idx::PLACEHOLDER);
                let name = self.interner.intern("<callee>");
                self.call_indirect(id, span, name, callee_ty, &arg_infos)
            }
        };
        match result {
            Some(ty) => ty,
            None => {
                self.settle_args(&arg_infos);
                Idx::UNRESOLVED
            }
        }
    }

    fn check_args(&mut self, scope: ScopeId, args: &[CallArg]) -> Vec<ArgInfo> {
        args.iter()
            .map(|arg| ArgInfo {
                label: arg.label,
                ty: self.check_expr(scope, arg.value, Idx::PLACEHOLDER),
                expr: arg.value,
                span: arg.span,
            })
            .collect()
    }

    /// Give arguments of a failed call their default literal types.
    fn settle_args(&mut self, args: &[ArgInfo]) {
        for arg in args {
            self.finalize_literals(arg.expr, Idx::PLACEHOLDER);
        }
    }

    // ========================================
    // Callee forms
    // ========================================

    #[expect(clippy::too_many_arguments, reason = "call context plus callee parts")]
    fn call_named(
        &mut self,
        scope: ScopeId,
        id: ExprId,
        span: Span,
        callee: ExprId,
        name: Name,
        explicit: &[Idx],
        args: &[ArgInfo],
        expected: Idx,
    ) -> Option<Idx> {
        match self.scopes.resolve(scope, name).cloned() {
            Some(Symbol::Var(_) | Symbol::Const { .. }) => {
                let callee_ty = self.infer_root(scope, callee, Idx::PLACEHOLDER);
                self.call_indirect(id, span, name, callee_ty, args)
            }
            Some(symbol @ (Symbol::Function(_) | Symbol::FunctionSet(_))) => {
                let candidates = symbol
                    .functions()
                    .iter()
                    .map(|f| Candidate {
                        func: Some(f.id),
                        sig: f.sig,
                    })
                    .collect();
                let empty = Substitution::new();
                let site = CallSite {
                    name,
                    span,
                    fixed: &empty,
                    free_owner: &[],
                    explicit,
                    expected,
                };
                let chosen = self.resolve_overload(&site, candidates, args)?;
                let func = chosen.func?;
                self.typed.bindings.insert(callee, Binding::Function(func));
                self.set_type(callee, chosen.sig);
                self.record_call(id, CallKind::Function(func), func, &chosen.subst);
                Some(chosen.result)
            }
            Some(Symbol::Type(ty)) => {
                self.errors.push(
                    TypeCheckError::new(span, TypeErrorKind::NotCallable { ty })
                        .with_note("values of a struct type are built with a struct literal"),
                );
                None
            }
            None => {
                self.error(span, TypeErrorKind::UnresolvedIdentifier { name });
                None
            }
        }
    }

    #[expect(clippy::too_many_arguments, reason = "call context plus callee parts")]
    fn call_method(
        &mut self,
        scope: ScopeId,
        id: ExprId,
        span: Span,
        callee: ExprId,
        base: ExprId,
        name: Name,
        explicit: &[Idx],
        args: &[ArgInfo],
        expected: Idx,
    ) -> Option<Idx> {
        let base_ty = self.infer_root(scope, base, Idx::PLACEHOLDER);
        if base_ty == Idx::UNRESOLVED {
            return None;
        }
        let (receiver, through_pointer) = self.auto_deref(base_ty);

        let lookup = match self.engine().lookup_methods(receiver, name) {
            Ok(lookup) => lookup,
            Err(problem) => {
                self.report_problem(span, problem);
                return None;
            }
        };
        let Some(lookup) = lookup else {
            return self.call_field_value(id, span, callee, receiver, through_pointer, name, args);
        };
        self.typed.members.insert(callee, MemberResolution::Method);

        if !lookup.requirements.is_empty() {
            let candidates = lookup
                .requirements
                .iter()
                .map(|&sig| Candidate { func: None, sig })
                .collect();
            let empty = Substitution::new();
            let site = CallSite {
                name,
                span,
                fixed: &empty,
                free_owner: &[],
                explicit,
                expected,
            };
            let chosen = self.resolve_overload(&site, candidates, args)?;
            self.set_type(callee, chosen.sig);
            self.typed.calls.insert(
                id,
                CallResolution {
                    kind: CallKind::ConstrainedMethod { name },
                    type_args: Vec::new(),
                },
            );
            return Some(chosen.result);
        }

        let candidates: Vec<Candidate> = lookup
            .candidates
            .iter()
            .filter(|f| self.typed.function(f.id).is_method())
            .map(|f| Candidate {
                func: Some(f.id),
                sig: f.sig,
            })
            .collect();
        if candidates.is_empty() {
            self.errors.push(
                TypeCheckError::new(
                    span,
                    TypeErrorKind::UnknownMember {
                        ty: receiver,
                        member: name,
                    },
                )
                .with_note("static methods are called through the type name"),
            );
            return None;
        }
        let site = CallSite {
            name,
            span,
            fixed: &lookup.bindings,
            free_owner: &[],
            explicit,
            expected,
        };
        let chosen = self.resolve_overload(&site, candidates, args)?;
        let func = chosen.func?;

        if self.typed.function(func).receiver == Some(Receiver::Mutating) && !through_pointer {
            if let Some(kind) = self.place_error(scope, base, PlaceUse::Write) {
                let base_span = self.arena.expr(base).span;
                self.errors.push(
                    TypeCheckError::new(base_span, kind).with_note(format!(
                        "`{}` mutates its receiver",
                        self.name_str(name)
                    )),
                );
            }
        }

        self.set_type(callee, chosen.sig);
        self.record_call(id, CallKind::Method(func), func, &chosen.subst);
        Some(chosen.result)
    }

    /// `value.field(args)` where the field holds a function.
    #[expect(clippy::too_many_arguments, reason = "call context plus field parts")]
    fn call_field_value(
        &mut self,
        id: ExprId,
        span: Span,
        callee: ExprId,
        receiver: Idx,
        through_pointer: bool,
        name: Name,
        args: &[ArgInfo],
    ) -> Option<Idx> {
        let field = self.engine().resolve_field(receiver, name);
        let Some((index, field_ty)) = self.or_internal(field, None) else {
            self.error(
                span,
                TypeErrorKind::UnknownMember {
                    ty: receiver,
                    member: name,
                },
            );
            return None;
        };
        self.typed.members.insert(
            callee,
            MemberResolution::Field {
                index,
                owner: receiver,
                through_pointer,
            },
        );
        self.set_type(callee, field_ty);
        self.call_indirect(id, span, name, field_ty, args)
    }

    #[expect(clippy::too_many_arguments, reason = "call context plus callee parts")]
    fn call_type_member(
        &mut self,
        scope: ScopeId,
        id: ExprId,
        span: Span,
        callee: ExprId,
        ty: &ParsedType,
        member: Name,
        explicit: &[Idx],
        args: &[ArgInfo],
        expected: Idx,
    ) -> Option<Idx> {
        let owner = self.resolve_owner(scope, ty)?;

        if let Some((index, variant)) = self.find_variant(owner.ty, member) {
            let labels_ok = variant
                .fields
                .iter()
                .zip(args)
                .all(|(field, arg)| !matches!(arg.label, Some(label) if label != field.name));
            if variant.fields.len() != args.len() || !labels_ok {
                self.errors.push(
                    TypeCheckError::new(
                        span,
                        TypeErrorKind::UnresolvedCall {
                            name: member,
                            arg_types: self.display_arg_types(args),
                        },
                    )
                    .with_note(format!(
                        "variant `{}` carries {} payload field(s)",
                        self.name_str(member),
                        variant.fields.len()
                    )),
                );
                return None;
            }
            let mut subst = owner.bindings.clone();
            self.seed_from_expected(&owner, &mut subst, expected);
            for (field, arg) in variant.fields.iter().zip(args) {
                let inferred = self
                    .engine()
                    .infer_bindings(&owner.free, field.ty, arg.ty, &mut subst);
                self.or_internal(inferred, ());
            }
            let enum_ty = self.complete_owner(&owner, subst, expected, span)?;
            let variants = self.engine().enum_variants(enum_ty);
            let payload = self
                .or_internal(variants, None)
                .and_then(|vs| vs.into_iter().nth(index as usize))
                .map(|v| v.fields)
                .unwrap_or_default();
            for (field, arg) in payload.iter().zip(args) {
                let resolved = self.check_assignable(arg.span, field.ty, arg.ty);
                self.finalize_literals(arg.expr, resolved);
            }
            self.set_type(callee, enum_ty);
            self.typed.calls.insert(
                id,
                CallResolution {
                    kind: CallKind::VariantConstruct {
                        enum_ty,
                        variant: index,
                    },
                    type_args: Vec::new(),
                },
            );
            return Some(enum_ty);
        }

        let lookup = match self.engine().lookup_methods(owner.ty, member) {
            Ok(lookup) => lookup,
            Err(problem) => {
                self.report_problem(span, problem);
                return None;
            }
        };
        let candidates: Vec<Candidate> = lookup
            .iter()
            .flat_map(|l| &l.candidates)
            .filter(|f| !self.typed.function(f.id).is_method())
            .map(|f| Candidate {
                func: Some(f.id),
                sig: f.sig,
            })
            .collect();
        if candidates.is_empty() {
            self.error(
                span,
                TypeErrorKind::UnknownMember {
                    ty: owner.ty,
                    member,
                },
            );
            return None;
        }
        let site = CallSite {
            name: member,
            span,
            fixed: &owner.bindings,
            free_owner: &owner.free,
            explicit,
            expected,
        };
        let chosen = self.resolve_overload(&site, candidates, args)?;
        let func = chosen.func?;
        self.set_type(callee, chosen.sig);
        self.record_call(id, CallKind::Function(func), func, &chosen.subst);
        Some(chosen.result)
    }

    /// A call through a function-typed value.
    fn call_indirect(
        &mut self,
        id: ExprId,
        span: Span,
        name: Name,
        callee_ty: Idx,
        args: &[ArgInfo],
    ) -> Option<Idx> {
        if callee_ty == Idx::UNRESOLVED {
            return None;
        }
        let function = {
            let stripped = self.engine().strip_aliases(callee_ty);
            let stripped = self.or_internal(stripped, callee_ty);
            match self.engine().materialize_function(stripped) {
                Ok(function) => function,
                Err(TypeProblem::Internal(err)) => {
                    self.internal_error(err);
                    return None;
                }
                Err(_) => stripped,
            }
        };
        let Some(sig) = self.pool.function_sig(function).cloned() else {
            self.error(span, TypeErrorKind::NotCallable { ty: callee_ty });
            return None;
        };
        let labels_ok = sig
            .params
            .iter()
            .zip(args)
            .all(|(param, arg)| param.label == arg.label);
        if sig.arity() != args.len() || !labels_ok || !sig.type_params.is_empty() {
            self.error(
                span,
                TypeErrorKind::UnresolvedCall {
                    name,
                    arg_types: self.display_arg_types(args),
                },
            );
            return None;
        }
        for (param, arg) in sig.params.iter().zip(args) {
            let resolved = self.check_assignable(arg.span, param.ty, arg.ty);
            self.finalize_literals(arg.expr, resolved);
        }
        self.typed.calls.insert(
            id,
            CallResolution {
                kind: CallKind::Indirect,
                type_args: Vec::new(),
            },
        );
        Some(sig.result)
    }

    fn record_call(&mut self, id: ExprId, kind: CallKind, func: FuncId, subst: &Substitution) {
        let type_args = subst
            .args_for(&self.typed.function(func).generic_params)
            .unwrap_or_default();
        self.typed
            .calls
            .insert(id, CallResolution { kind, type_args });
    }

    fn display_arg_types(&self, args: &[ArgInfo]) -> Vec<Idx> {
        args.iter().map(|a| default_literal(a.ty)).collect()
    }

    // ========================================
    // Overload resolution
    // ========================================

    fn resolve_overload(
        &mut self,
        site: &CallSite<'_>,
        candidates: Vec<Candidate>,
        args: &[ArgInfo],
    ) -> Option<OverloadMatch> {
        let mut matches = Vec::new();
        let mut rejections = Vec::new();
        for candidate in &candidates {
            match self.try_candidate(site, *candidate, args) {
                Ok(Ok(found)) => matches.push(found),
                Ok(Err(rejection)) => rejections.push(rejection),
                Err(err) => {
                    self.internal_error(err);
                    return None;
                }
            }
        }
        tracing::trace!(
            name = self.name_str(site.name),
            considered = candidates.len(),
            matched = matches.len(),
            "overload resolution"
        );

        if matches.len() > 1 {
            self.error(
                site.span,
                TypeErrorKind::AmbiguousCall {
                    name: site.name,
                    candidates: matches.len(),
                },
            );
            return None;
        }
        let Some(chosen) = matches.pop() else {
            self.report_no_match(site, candidates.len(), rejections, args);
            return None;
        };

        for (&param, arg) in chosen.params.iter().zip(args) {
            let resolved = self.check_assignable(arg.span, param, arg.ty);
            self.finalize_literals(arg.expr, resolved);
        }
        Some(chosen)
    }

    fn report_no_match(
        &mut self,
        site: &CallSite<'_>,
        considered: usize,
        rejections: Vec<Rejection>,
        args: &[ArgInfo],
    ) {
        if let [only] = rejections.as_slice() {
            match only {
                Rejection::CannotInfer(param) => {
                    let param = self
                        .pool
                        .type_param(*param)
                        .map_or(site.name, |p| p.name);
                    self.error(
                        site.span,
                        TypeErrorKind::CannotInferTypeArgument {
                            name: site.name,
                            param,
                        },
                    );
                    return;
                }
                Rejection::Constraint(problem) => {
                    self.report_problem(site.span, problem.clone());
                    return;
                }
                _ => {}
            }
        }

        let mut err = TypeCheckError::new(
            site.span,
            TypeErrorKind::UnresolvedCall {
                name: site.name,
                arg_types: self.display_arg_types(args),
            },
        );
        match rejections.as_slice() {
            [only] => err = err.with_note(self.describe_rejection(only)),
            _ => {
                err = err.with_note(format!("{considered} candidates considered"));
            }
        }
        self.errors.push(err);
    }

    fn describe_rejection(&self, rejection: &Rejection) -> String {
        match rejection {
            Rejection::Arity { expected, found } => {
                format!("expected {expected} argument(s), found {found}")
            }
            Rejection::Labels => "argument labels do not match".to_string(),
            Rejection::TypeArgCount { expected, found } => {
                format!("expected {expected} type argument(s), found {found}")
            }
            Rejection::CannotInfer(_) => "a type argument cannot be inferred".to_string(),
            Rejection::Constraint(_) => "a type argument does not meet its constraints".to_string(),
            Rejection::Argument {
                index,
                expected,
                found,
            } => format!(
                "argument {}: expected `{}`, found `{}`",
                index + 1,
                self.pool.format_type(*expected, self.interner),
                self.pool.format_type(default_literal(*found), self.interner)
            ),
        }
    }

    /// Try one candidate. The outer error is an internal failure; the inner
    /// one a reason the candidate does not apply.
    fn try_candidate(
        &mut self,
        site: &CallSite<'_>,
        candidate: Candidate,
        args: &[ArgInfo],
    ) -> Result<Result<OverloadMatch, Rejection>, InternalError> {
        let Some(sig) = self.pool.function_sig(candidate.sig).cloned() else {
            return Ok(Err(Rejection::Arity {
                expected: 0,
                found: args.len(),
            }));
        };
        if sig.arity() != args.len() {
            return Ok(Err(Rejection::Arity {
                expected: sig.arity(),
                found: args.len(),
            }));
        }
        if sig
            .params
            .iter()
            .zip(args)
            .any(|(param, arg)| param.label != arg.label)
        {
            return Ok(Err(Rejection::Labels));
        }

        let mut subst = site.fixed.clone();
        let mut free: Vec<Idx> = site
            .free_owner
            .iter()
            .copied()
            .filter(|p| !subst.contains(*p))
            .collect();
        if site.explicit.is_empty() {
            free.extend(sig.type_params.iter().copied());
        } else {
            if site.explicit.len() != sig.type_params.len() {
                return Ok(Err(Rejection::TypeArgCount {
                    expected: sig.type_params.len(),
                    found: site.explicit.len(),
                }));
            }
            for (&param, &arg) in sig.type_params.iter().zip(site.explicit) {
                subst.insert(param, arg);
            }
        }

        if !free.is_empty() {
            if site.expected != Idx::PLACEHOLDER {
                self.engine()
                    .infer_bindings(&free, sig.result, site.expected, &mut subst)?;
            }
            for (param, arg) in sig.params.iter().zip(args) {
                self.engine()
                    .infer_bindings(&free, param.ty, arg.ty, &mut subst)?;
            }
            if let Some(&missing) = free.iter().find(|p| !subst.contains(**p)) {
                return Ok(Err(Rejection::CannotInfer(missing)));
            }
        }

        let mut bound = free;
        if !site.explicit.is_empty() {
            bound.extend(sig.type_params.iter().copied());
        }
        for param in bound {
            let constraints = self
                .pool
                .type_param(param)
                .map(|p| p.constraints.clone())
                .unwrap_or_default();
            let Some(arg) = subst.get(param) else {
                continue;
            };
            if constraints.is_empty() {
                continue;
            }
            match self.engine().conforms(&constraints, arg) {
                Ok(()) => {}
                Err(TypeProblem::Internal(err)) => return Err(err),
                Err(problem) => return Ok(Err(Rejection::Constraint(problem))),
            }
        }

        let instantiated = if subst.is_empty() {
            candidate.sig
        } else {
            self.engine().instantiate(candidate.sig, &subst)?
        };
        let Some(inst) = self.pool.function_sig(instantiated).cloned() else {
            return Err(InternalError::InconsistentAnnotation {
                detail: "instantiated signature is not a function".to_string(),
            });
        };
        for (index, (param, arg)) in inst.params.iter().zip(args).enumerate() {
            match self.engine().validate(param.ty, arg.ty) {
                Ok(_) => {}
                Err(TypeProblem::Internal(err)) => return Err(err),
                Err(_) => {
                    return Ok(Err(Rejection::Argument {
                        index,
                        expected: param.ty,
                        found: arg.ty,
                    }))
                }
            }
        }

        Ok(Ok(OverloadMatch {
            func: candidate.func,
            sig: instantiated,
            params: inst.params.iter().map(|p| p.ty).collect(),
            result: inst.result,
            subst,
        }))
    }
}
