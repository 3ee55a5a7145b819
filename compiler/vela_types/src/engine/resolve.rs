//! Canonical resolution: unwinding aliases and specializations.

use rustc_hash::FxHashSet;

use super::TypeEngine;
use crate::{Idx, InternalError, Substitution, TypeData, TypeProblem};

/// A type with every alias and specialization layer peeled off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canonical {
    /// The declaration (or structural type) at the bottom of the chain.
    pub ty: Idx,
    /// Standards collected from aliases on the way down, first mention first.
    pub constraints: Vec<Idx>,
    /// Generic parameter bindings collected from specializations.
    pub bindings: Substitution,
}

impl TypeEngine<'_> {
    /// Unwind `ty` until it is neither an alias nor a specialization.
    ///
    /// Each alias contributes its constraints; each specialization binds the
    /// declaration's parameters to its arguments. A parameter bound twice
    /// must validate against its earlier binding.
    pub fn resolve_canonical(&mut self, ty: Idx) -> Result<Canonical, TypeProblem> {
        let mut current = ty;
        let mut constraints: Vec<Idx> = Vec::new();
        let mut bindings = Substitution::new();
        let mut visited: FxHashSet<Idx> = FxHashSet::default();

        for _ in 0..self.limit {
            match self.pool.get(current) {
                TypeData::Alias(alias) => {
                    if !visited.insert(current) {
                        tracing::debug!(?current, "alias cycle detected");
                        return Err(InternalError::CyclicAlias { alias: current }.into());
                    }
                    for &standard in &alias.constraints {
                        if !constraints.contains(&standard) {
                            constraints.push(standard);
                        }
                    }
                    current = alias.target;
                }
                TypeData::Specialized { instance_of, args } => {
                    let generic = *instance_of;
                    let args = args.clone();
                    let params = self
                        .pool
                        .defined(generic)
                        .map(|d| d.type_params.clone())
                        .unwrap_or_default();
                    self.bind_all(&mut bindings, &params, &args)?;
                    current = generic;
                }
                TypeData::SpecializedFunction { signature, args } => {
                    let generic = *signature;
                    let args = args.clone();
                    let params = self
                        .pool
                        .function_sig(generic)
                        .map(|s| s.type_params.clone())
                        .unwrap_or_default();
                    self.bind_all(&mut bindings, &params, &args)?;
                    current = generic;
                }
                _ => {
                    return Ok(Canonical {
                        ty: current,
                        constraints,
                        bindings,
                    })
                }
            }
        }

        Err(InternalError::ResolutionLimitExceeded {
            ty,
            limit: self.limit,
        }
        .into())
    }

    fn bind_all(
        &mut self,
        bindings: &mut Substitution,
        params: &[Idx],
        args: &[Idx],
    ) -> Result<(), TypeProblem> {
        for (&param, &arg) in params.iter().zip(args) {
            match bindings.get(param) {
                Some(existing) => {
                    self.validate(existing, arg)?;
                }
                None => bindings.insert(param, arg),
            }
        }
        Ok(())
    }

    /// Follow aliases only, keeping specializations intact.
    pub fn strip_aliases(&self, ty: Idx) -> Result<Idx, InternalError> {
        let mut current = ty;
        for _ in 0..self.limit {
            match self.pool.alias(current) {
                Some(alias) if alias.target != current => current = alias.target,
                Some(_) => return Err(InternalError::CyclicAlias { alias: current }),
                None => return Ok(current),
            }
        }
        Err(InternalError::ResolutionLimitExceeded {
            ty,
            limit: self.limit,
        })
    }
}
