//! Generic substitution.
//!
//! Defined types are never deep-copied: instantiating one yields an interned
//! `Specialized` handle, and member queries substitute through it lazily.
//! Structural types (pointers, arrays, maps, struct and enum bodies,
//! signatures) are rebuilt with every component substituted, keeping field
//! order exactly.

use vela_ir::ensure_sufficient_stack;

use super::TypeEngine;
use crate::{Field, FunctionSig, Idx, InternalError, Substitution, TypeData, Var, Variant};

/// How a type parameter missing from the substitution is treated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    /// Every parameter reached must be bound.
    Total,
    /// Unbound parameters stay as they are (composition of maps).
    Partial,
}

impl TypeEngine<'_> {
    /// Substitute `subst` through `ty`.
    ///
    /// A type parameter reached without a binding is an internal error:
    /// callers build total maps by zipping a declaration's parameters with
    /// its arguments.
    pub fn instantiate(&mut self, ty: Idx, subst: &Substitution) -> Result<Idx, InternalError> {
        self.instantiate_in(ty, subst, Mode::Total, 0)
    }

    /// `apply(old, new)`: rebind every value of `old` through `new`, then add
    /// the entries of `new` that `old` does not mention.
    pub fn compose(
        &mut self,
        old: &Substitution,
        new: &Substitution,
    ) -> Result<Substitution, InternalError> {
        self.compose_in(old, new, 0)
    }

    fn compose_in(
        &mut self,
        old: &Substitution,
        new: &Substitution,
        depth: usize,
    ) -> Result<Substitution, InternalError> {
        let mut out = Substitution::new();
        for (param, value) in old.iter() {
            let value = self.instantiate_in(value, new, Mode::Partial, depth + 1)?;
            out.insert(param, value);
        }
        for (param, value) in new.iter() {
            if !out.contains(param) {
                out.insert(param, value);
            }
        }
        Ok(out)
    }

    fn instantiate_in(
        &mut self,
        ty: Idx,
        subst: &Substitution,
        mode: Mode,
        depth: usize,
    ) -> Result<Idx, InternalError> {
        if subst.is_empty() || !self.pool.is_generic(ty) {
            return Ok(ty);
        }
        if depth > self.limit {
            return Err(InternalError::ResolutionLimitExceeded {
                ty,
                limit: self.limit,
            });
        }
        tracing::trace!(?ty, bindings = subst.len(), "instantiate");

        let data = self.pool.get(ty).clone();
        ensure_sufficient_stack(|| match data {
            TypeData::Basic(_) | TypeData::Standard(_) => Ok(ty),
            TypeData::TypeParam(_) => match (subst.get(ty), mode) {
                (Some(bound), _) => Ok(bound),
                (None, Mode::Partial) => Ok(ty),
                (None, Mode::Total) => Err(InternalError::UnboundTypeParameter { param: ty }),
            },
            TypeData::Pointer(inner) => {
                let inner = self.instantiate_in(inner, subst, mode, depth + 1)?;
                Ok(self.pool.pointer(inner))
            }
            TypeData::Array(elem) => {
                let elem = self.instantiate_in(elem, subst, mode, depth + 1)?;
                Ok(self.pool.array(elem))
            }
            TypeData::Map(key, value) => {
                let key = self.instantiate_in(key, subst, mode, depth + 1)?;
                let value = self.instantiate_in(value, subst, mode, depth + 1)?;
                Ok(self.pool.map(key, value))
            }
            TypeData::Struct(fields) => {
                let fields = self.instantiate_fields(&fields, subst, mode, depth)?;
                Ok(self.pool.struct_type(fields))
            }
            TypeData::Enum(variants) => {
                let mut out = Vec::with_capacity(variants.len());
                for variant in variants {
                    out.push(Variant {
                        name: variant.name,
                        discriminant: variant.discriminant,
                        fields: self.instantiate_fields(&variant.fields, subst, mode, depth)?,
                    });
                }
                Ok(self.pool.enum_type(out))
            }
            TypeData::Defined(defined) => {
                let mut args = Vec::with_capacity(defined.type_params.len());
                for &param in &defined.type_params {
                    args.push(self.instantiate_in(param, subst, mode, depth + 1)?);
                }
                Ok(self.pool.specialize(ty, args))
            }
            TypeData::Alias(alias) => self.instantiate_in(alias.target, subst, mode, depth + 1),
            TypeData::Function(sig) => {
                let sig = self.instantiate_sig(&sig, subst, mode, depth)?;
                Ok(self.pool.function(sig))
            }
            TypeData::Specialized { instance_of, args } => {
                let params = self
                    .pool
                    .defined(instance_of)
                    .map(|d| d.type_params.clone())
                    .unwrap_or_default();
                let args = self.recompose(&params, &args, subst, depth)?;
                Ok(self.pool.specialize(instance_of, args))
            }
            TypeData::SpecializedFunction { signature, args } => {
                let params = self
                    .pool
                    .function_sig(signature)
                    .map(|s| s.type_params.clone())
                    .unwrap_or_default();
                let args = self.recompose(&params, &args, subst, depth)?;
                Ok(self.pool.specialize(signature, args))
            }
        })
    }

    /// New arguments for an existing specialization: its own bindings
    /// composed with `subst`, read back in declared parameter order.
    fn recompose(
        &mut self,
        params: &[Idx],
        args: &[Idx],
        subst: &Substitution,
        depth: usize,
    ) -> Result<Vec<Idx>, InternalError> {
        let old = Substitution::zip(params, args);
        let composed = self.compose_in(&old, subst, depth + 1)?;
        params
            .iter()
            .map(|&p| {
                composed
                    .get(p)
                    .ok_or(InternalError::UnboundTypeParameter { param: p })
            })
            .collect()
    }

    fn instantiate_fields(
        &mut self,
        fields: &[Field],
        subst: &Substitution,
        mode: Mode,
        depth: usize,
    ) -> Result<Vec<Field>, InternalError> {
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            out.push(Field {
                name: field.name,
                ty: self.instantiate_in(field.ty, subst, mode, depth + 1)?,
            });
        }
        Ok(out)
    }

    fn instantiate_sig(
        &mut self,
        sig: &FunctionSig,
        subst: &Substitution,
        mode: Mode,
        depth: usize,
    ) -> Result<FunctionSig, InternalError> {
        // A function's own parameters stay generic unless this map binds them.
        let mut scoped = subst.clone();
        for &own in &sig.type_params {
            if !scoped.contains(own) {
                scoped.insert(own, own);
            }
        }
        let mut params = Vec::with_capacity(sig.params.len());
        for param in &sig.params {
            params.push(Var {
                ty: self.instantiate_in(param.ty, &scoped, mode, depth + 1)?,
                ..*param
            });
        }
        let result = self.instantiate_in(sig.result, &scoped, mode, depth + 1)?;
        let type_params = sig
            .type_params
            .iter()
            .copied()
            .filter(|p| !subst.contains(*p))
            .collect();
        Ok(FunctionSig {
            type_params,
            params,
            result,
            scope: sig.scope,
        })
    }
}
