//! Resolution of written type annotations to pool types.

use vela_ir::{ParsedType, ParsedTypeKind};

use super::ModuleChecker;
use crate::{Idx, ScopeId, Substitution, Symbol, TypeData, TypeErrorKind};

/// The type a `Type.member` path or struct literal names, with whatever
/// generic bindings its annotation (or an alias) supplied.
#[derive(Clone, Debug)]
pub(super) struct OwnerType {
    /// Canonical declaration, or the structural type for extension owners.
    pub ty: Idx,
    pub bindings: Substitution,
    /// Type parameters of `ty` the annotation left unbound; call-site
    /// inference must fill them.
    pub free: Vec<Idx>,
}

impl ModuleChecker<'_> {
    /// Resolve an annotation. Failures are reported and yield
    /// [`Idx::UNRESOLVED`].
    pub(super) fn resolve_type(&mut self, scope: ScopeId, parsed: &ParsedType) -> Idx {
        match &parsed.kind {
            ParsedTypeKind::Named { name, args } => {
                let Some(Symbol::Type(ty)) = self.scopes.resolve(scope, *name).cloned() else {
                    self.error(parsed.span, TypeErrorKind::UnknownType { name: *name });
                    return Idx::UNRESOLVED;
                };
                let params = self.generic_params_of(ty);
                if args.is_empty() {
                    if !params.is_empty() {
                        self.error(
                            parsed.span,
                            TypeErrorKind::BareGenericReference { name: *name },
                        );
                        return Idx::UNRESOLVED;
                    }
                    return ty;
                }
                if params.len() != args.len() {
                    self.error(
                        parsed.span,
                        TypeErrorKind::GenericArityMismatch {
                            name: *name,
                            expected: params.len(),
                            found: args.len(),
                        },
                    );
                    return Idx::UNRESOLVED;
                }
                let mut resolved = Vec::with_capacity(args.len());
                for arg in args {
                    resolved.push(self.resolve_type(scope, arg));
                }
                if resolved.contains(&Idx::UNRESOLVED) {
                    return Idx::UNRESOLVED;
                }
                for ((param, arg), parsed_arg) in params.iter().zip(&resolved).zip(args) {
                    self.check_constraints(parsed_arg.span, *param, *arg);
                }
                self.pool.specialize(ty, resolved)
            }
            ParsedTypeKind::Pointer(inner) => {
                let inner = self.resolve_type(scope, inner);
                if inner == Idx::UNRESOLVED {
                    return inner;
                }
                self.pool.pointer(inner)
            }
            ParsedTypeKind::Array(elem) => {
                let elem = self.resolve_type(scope, elem);
                if elem == Idx::UNRESOLVED {
                    return elem;
                }
                self.pool.array(elem)
            }
            ParsedTypeKind::Map(key, value) => {
                let key = self.resolve_type(scope, key);
                let value = self.resolve_type(scope, value);
                if key == Idx::UNRESOLVED || value == Idx::UNRESOLVED {
                    return Idx::UNRESOLVED;
                }
                self.pool.map(key, value)
            }
        }
    }

    /// Resolve a constraint list; every entry must name a standard.
    pub(super) fn resolve_constraints(
        &mut self,
        scope: ScopeId,
        constraints: &[ParsedType],
    ) -> Vec<Idx> {
        let mut out = Vec::with_capacity(constraints.len());
        for parsed in constraints {
            let ty = self.resolve_type(scope, parsed);
            if ty == Idx::UNRESOLVED {
                continue;
            }
            if self.pool.standard(ty).is_some() {
                if !out.contains(&ty) {
                    out.push(ty);
                }
            } else if let Some(name) = parsed.head_name() {
                self.errors.push(
                    crate::TypeCheckError::new(parsed.span, TypeErrorKind::UnknownType { name })
                        .with_note("constraints must name a standard"),
                );
            }
        }
        out
    }

    /// Resolve the owner of a `Type.member` path or struct literal. Unlike
    /// [`Self::resolve_type`], a generic type may be named bare: its
    /// parameters are returned as `free` for inference.
    pub(super) fn resolve_owner(&mut self, scope: ScopeId, parsed: &ParsedType) -> Option<OwnerType> {
        let bare_generic = match &parsed.kind {
            ParsedTypeKind::Named { name, args } if args.is_empty() => {
                match self.scopes.resolve(scope, *name) {
                    Some(Symbol::Type(ty)) if !self.generic_params_of(*ty).is_empty() => Some(*ty),
                    _ => None,
                }
            }
            _ => None,
        };
        let ty = match bare_generic {
            Some(generic) => generic,
            None => self.resolve_type(scope, parsed),
        };
        if ty == Idx::UNRESOLVED {
            return None;
        }

        let canon = match self.engine().resolve_canonical(ty) {
            Ok(canon) => canon,
            Err(problem) => {
                self.report_problem(parsed.span, problem);
                return None;
            }
        };
        let free = self
            .generic_params_of(canon.ty)
            .into_iter()
            .filter(|p| !canon.bindings.contains(*p))
            .collect();
        Some(OwnerType {
            ty: canon.ty,
            bindings: canon.bindings,
            free,
        })
    }

    pub(super) fn generic_params_of(&self, ty: Idx) -> Vec<Idx> {
        match self.pool.get(ty) {
            TypeData::Defined(d) => d.type_params.clone(),
            _ => Vec::new(),
        }
    }
}
