//! Generic argument inference by structural matching.

use super::TypeEngine;
use crate::{Idx, InternalError, Substitution, TypeData};

/// The concrete type a literal settles on when nothing constrains it.
pub fn default_literal(ty: Idx) -> Idx {
    match ty {
        Idx::INT_LITERAL => Idx::INT,
        Idx::FLOAT_LITERAL => Idx::DOUBLE,
        other => other,
    }
}

impl TypeEngine<'_> {
    /// Bind the members of `params` that occur in `pattern` to the matching
    /// parts of `actual`. Existing bindings in `out` win; parts that do not
    /// line up are skipped and left for validation to report.
    pub fn infer_bindings(
        &mut self,
        params: &[Idx],
        pattern: Idx,
        actual: Idx,
        out: &mut Substitution,
    ) -> Result<(), InternalError> {
        self.infer_in(params, pattern, actual, out, 0)
    }

    fn infer_in(
        &mut self,
        params: &[Idx],
        pattern: Idx,
        actual: Idx,
        out: &mut Substitution,
        depth: usize,
    ) -> Result<(), InternalError> {
        if depth > self.limit
            || matches!(
                actual,
                Idx::UNRESOLVED | Idx::PLACEHOLDER | Idx::NIL_LITERAL
            )
        {
            return Ok(());
        }
        if params.contains(&pattern) {
            if !out.contains(pattern) {
                out.insert(pattern, default_literal(actual));
            }
            return Ok(());
        }

        let pattern = self.strip_aliases(pattern)?;
        let actual = self.strip_aliases(actual)?;
        let (p, a) = (self.pool.get(pattern).clone(), self.pool.get(actual).clone());
        match (p, a) {
            (TypeData::Pointer(p), TypeData::Pointer(a)) | (TypeData::Array(p), TypeData::Array(a)) => {
                self.infer_in(params, p, a, out, depth + 1)
            }
            (TypeData::Map(pk, pv), TypeData::Map(ak, av)) => {
                self.infer_in(params, pk, ak, out, depth + 1)?;
                self.infer_in(params, pv, av, out, depth + 1)
            }
            (
                TypeData::Specialized {
                    instance_of: pi,
                    args: pa,
                },
                TypeData::Specialized {
                    instance_of: ai,
                    args: aa,
                },
            ) if pi == ai => {
                for (p, a) in pa.into_iter().zip(aa) {
                    self.infer_in(params, p, a, out, depth + 1)?;
                }
                Ok(())
            }
            (TypeData::Function(ps), TypeData::Function(as_)) if ps.arity() == as_.arity() => {
                for (p, a) in ps.params.iter().zip(&as_.params) {
                    self.infer_in(params, p.ty, a.ty, out, depth + 1)?;
                }
                self.infer_in(params, ps.result, as_.result, out, depth + 1)
            }
            _ => Ok(()),
        }
    }
}
