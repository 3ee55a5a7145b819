//! Bidirectional type compatibility.

use super::TypeEngine;
use crate::{BasicKind, FunctionSig, Idx, Substitution, TypeData, TypeProblem};

impl TypeEngine<'_> {
    /// Check that a value of type `provided` may be used where `expected`
    /// is required, returning the type the use resolves to.
    ///
    /// Checks run in a fixed order: identity, the unresolved and placeholder
    /// markers, the `any` top type, a type parameter on the expected side,
    /// alias/specialization canonicalization, literal widening, then the
    /// structural rules.
    pub fn validate(&mut self, expected: Idx, provided: Idx) -> Result<Idx, TypeProblem> {
        tracing::trace!(?expected, ?provided, "validate");

        if expected == provided {
            return Ok(expected);
        }
        if expected == Idx::UNRESOLVED || provided == Idx::UNRESOLVED {
            return Ok(expected);
        }
        if expected == Idx::PLACEHOLDER {
            return Ok(provided);
        }
        if expected == Idx::ANY {
            return Ok(expected);
        }
        if let Some(wanted) = self.pool.type_param(expected).map(|tp| tp.constraints.clone()) {
            return self.validate_type_param(&wanted, expected, provided);
        }

        if self.is_specialized_function(expected) || self.is_specialized_function(provided) {
            let e = self.materialize_function(expected)?;
            let p = self.materialize_function(provided)?;
            return vela_ir::ensure_sufficient_stack(|| self.validate(e, p))
                .map_err(|err| outer(err, expected, provided))
                .map(|_| expected);
        }
        if self.needs_canonical(expected) || self.needs_canonical(provided) {
            return self.validate_canonical(expected, provided);
        }
        if let Some(widened) = widen_literal(
            self.pool.basic_kind(expected),
            self.pool.basic_kind(provided),
            expected,
            provided,
        ) {
            return Ok(widened);
        }

        let mismatch = TypeProblem::Mismatch {
            expected,
            found: provided,
        };
        let e = self.pool.get(expected).clone();
        let p = self.pool.get(provided).clone();
        match (&e, &p) {
            (TypeData::Pointer(_), TypeData::Basic(BasicKind::NilLiteral)) => Ok(expected),
            (TypeData::Basic(BasicKind::NilLiteral), TypeData::Pointer(_)) => Ok(provided),
            (TypeData::Pointer(ep), TypeData::Pointer(pp))
            | (TypeData::Array(ep), TypeData::Array(pp)) => {
                self.validate_inner(*ep, *pp, expected, provided)?;
                Ok(expected)
            }
            (TypeData::Map(ek, ev), TypeData::Map(pk, pv)) => {
                self.validate_inner(*ek, *pk, expected, provided)?;
                self.validate_inner(*ev, *pv, expected, provided)?;
                Ok(expected)
            }
            (TypeData::Function(es), TypeData::Function(ps)) => {
                self.validate_signature(es, ps, expected, provided)?;
                Ok(expected)
            }
            _ => Err(mismatch),
        }
    }

    /// A type parameter on the expected side: a provided parameter must
    /// carry every wanted constraint, any other type (specializations
    /// included) must conform to them.
    fn validate_type_param(
        &mut self,
        wanted: &[Idx],
        expected: Idx,
        provided: Idx,
    ) -> Result<Idx, TypeProblem> {
        let core = self.strip_aliases(provided)?;
        match self.pool.type_param(core) {
            Some(other) if wanted.iter().all(|c| other.constraints.contains(c)) => Ok(expected),
            Some(_) => Err(TypeProblem::Mismatch {
                expected,
                found: provided,
            }),
            None => {
                self.conforms(wanted, provided)?;
                Ok(expected)
            }
        }
    }

    /// Validate a component and report failure against the enclosing pair.
    fn validate_inner(
        &mut self,
        expected: Idx,
        provided: Idx,
        outer_expected: Idx,
        outer_provided: Idx,
    ) -> Result<(), TypeProblem> {
        vela_ir::ensure_sufficient_stack(|| self.validate(expected, provided))
            .map(|_| ())
            .map_err(|err| outer(err, outer_expected, outer_provided))
    }

    fn validate_signature(
        &mut self,
        expected: &FunctionSig,
        provided: &FunctionSig,
        outer_expected: Idx,
        outer_provided: Idx,
    ) -> Result<(), TypeProblem> {
        if expected.arity() != provided.arity() {
            return Err(TypeProblem::Mismatch {
                expected: outer_expected,
                found: outer_provided,
            });
        }
        for (e, p) in expected.params.iter().zip(&provided.params) {
            self.validate_inner(e.ty, p.ty, outer_expected, outer_provided)?;
        }
        self.validate_inner(
            expected.result,
            provided.result,
            outer_expected,
            outer_provided,
        )
    }

    fn needs_canonical(&self, ty: Idx) -> bool {
        matches!(
            self.pool.get(ty),
            TypeData::Alias(_) | TypeData::Specialized { .. }
        )
    }

    fn is_specialized_function(&self, ty: Idx) -> bool {
        matches!(self.pool.get(ty), TypeData::SpecializedFunction { .. })
    }

    /// Compare through aliases and specializations: equal declarations with
    /// pairwise-valid bindings, then the constraints collected on the
    /// expected side.
    fn validate_canonical(&mut self, expected: Idx, provided: Idx) -> Result<Idx, TypeProblem> {
        let mismatch = TypeProblem::Mismatch {
            expected,
            found: provided,
        };
        let ce = self.resolve_canonical(expected)?;
        let cp = self.resolve_canonical(provided)?;

        let wanted = self.pool.type_param(ce.ty).map(|tp| tp.constraints.clone());
        let resolved = if let Some(wanted) = wanted {
            self.validate_type_param(&wanted, ce.ty, provided)
                .map_err(|err| outer(err, expected, provided))?
        } else if ce.bindings.is_empty() && cp.bindings.is_empty() {
            vela_ir::ensure_sufficient_stack(|| self.validate(ce.ty, cp.ty))
                .map_err(|err| outer(err, expected, provided))?
        } else if ce.ty == cp.ty {
            let params = self.declared_params(ce.ty);
            for param in params {
                match (ce.bindings.get(param), cp.bindings.get(param)) {
                    (Some(e), Some(p)) => self.validate_inner(e, p, expected, provided)?,
                    _ => return Err(mismatch),
                }
            }
            ce.ty
        } else {
            return Err(mismatch);
        };

        if !ce.constraints.is_empty() {
            self.conforms(&ce.constraints, provided)?;
        }

        // Keep the alias the caller wrote; otherwise report what the
        // comparison settled on.
        Ok(if ce.ty == expected { resolved } else { expected })
    }

    fn declared_params(&self, generic: Idx) -> Vec<Idx> {
        match self.pool.get(generic) {
            TypeData::Defined(d) => d.type_params.clone(),
            TypeData::Function(sig) => sig.type_params.clone(),
            _ => Vec::new(),
        }
    }

    /// The concrete `Function` a specialized signature stands for; other
    /// types are returned unchanged.
    pub fn materialize_function(&mut self, ty: Idx) -> Result<Idx, TypeProblem> {
        let TypeData::SpecializedFunction { signature, args } = self.pool.get(ty) else {
            return Ok(ty);
        };
        if let Some(done) = self.pool.materialized(ty) {
            return Ok(done);
        }
        let signature = *signature;
        let args = args.clone();
        let params = self.declared_params(signature);
        let subst = Substitution::zip(&params, &args);
        let function = self.instantiate(signature, &subst)?;
        self.pool.record_materialized(ty, function);
        Ok(function)
    }
}

/// Re-target a component mismatch at the enclosing types. Internal errors
/// and conformance failures pass through untouched.
fn outer(err: TypeProblem, expected: Idx, provided: Idx) -> TypeProblem {
    match err {
        TypeProblem::Mismatch { .. } => TypeProblem::Mismatch {
            expected,
            found: provided,
        },
        other => other,
    }
}

/// Literal widening: an integer literal meets any numeric type, a float
/// literal meets `float`/`double`, and the two literal kinds meet at the
/// float literal.
pub(crate) fn widen_literal(
    e: Option<BasicKind>,
    p: Option<BasicKind>,
    expected: Idx,
    provided: Idx,
) -> Option<Idx> {
    let (e, p) = (e?, p?);
    match (e, p) {
        (BasicKind::IntegerLiteral, BasicKind::FloatLiteral)
        | (BasicKind::FloatLiteral, BasicKind::IntegerLiteral) => Some(Idx::FLOAT_LITERAL),
        (BasicKind::IntegerLiteral, k) if k.is_numeric() => Some(provided),
        (k, BasicKind::IntegerLiteral) if k.is_numeric() => Some(expected),
        (BasicKind::FloatLiteral, k) if k.is_floating() => Some(provided),
        (k, BasicKind::FloatLiteral) if k.is_floating() => Some(expected),
        _ => None,
    }
}
