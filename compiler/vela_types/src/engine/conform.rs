//! Structural conformance to standards.

use vela_ir::Name;

use super::TypeEngine;
use crate::{Idx, TypeProblem};

impl TypeEngine<'_> {
    /// Check that `candidate` offers every method each standard in
    /// `constraints` requires, with a compatible signature.
    ///
    /// Matching is by name and signature only; a `conform` declaration is
    /// how methods get attached, not a precondition.
    pub fn conforms(&mut self, constraints: &[Idx], candidate: Idx) -> Result<(), TypeProblem> {
        for &standard in constraints {
            let Some(methods) = self.pool.standard(standard).map(|s| s.methods.clone()) else {
                continue;
            };
            for (method, required) in methods {
                if !self.has_conforming_method(candidate, method, required)? {
                    tracing::trace!(?candidate, ?standard, ?method, "non-conformance");
                    return Err(TypeProblem::NonConformance {
                        candidate,
                        standard,
                        method,
                    });
                }
            }
        }
        Ok(())
    }

    fn has_conforming_method(
        &mut self,
        candidate: Idx,
        method: Name,
        required: Idx,
    ) -> Result<bool, TypeProblem> {
        let Some(lookup) = self.lookup_methods(candidate, method)? else {
            return Ok(false);
        };
        let mut found = lookup.requirements.clone();
        for symbol in &lookup.candidates {
            found.push(self.method_signature(&lookup, symbol)?);
        }
        for sig in found {
            match self.validate(required, sig) {
                Ok(_) => return Ok(true),
                Err(TypeProblem::Internal(err)) => return Err(err.into()),
                Err(_) => {}
            }
        }
        Ok(false)
    }
}
