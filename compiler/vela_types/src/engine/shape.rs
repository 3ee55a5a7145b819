//! Overload shapes of parameter types.

use vela_ir::ensure_sufficient_stack;

use super::TypeEngine;
use crate::{Idx, InternalError, ParamShape, TypeData};

impl TypeEngine<'_> {
    /// The shape of `ty` as a parameter of a function declaring the generic
    /// parameters `own`. Aliases are followed at every level.
    pub fn param_shape(&self, ty: Idx, own: &[Idx]) -> Result<ParamShape, InternalError> {
        self.param_shape_in(ty, own, 0)
    }

    fn param_shape_in(
        &self,
        ty: Idx,
        own: &[Idx],
        depth: usize,
    ) -> Result<ParamShape, InternalError> {
        if depth > self.limit {
            return Err(InternalError::ResolutionLimitExceeded {
                ty,
                limit: self.limit,
            });
        }
        let ty = self.strip_aliases(ty)?;
        tracing::trace!(?ty, kind = self.pool.get(ty).kind_name(), "param shape");
        let shape = |inner: Idx| self.param_shape_in(inner, own, depth + 1);

        ensure_sufficient_stack(|| match self.pool.get(ty) {
            TypeData::TypeParam(tp) => Ok(match own.iter().position(|&p| p == ty) {
                Some(position) => ParamShape::Generic {
                    position,
                    constraints: tp.constraints.clone(),
                },
                None => ParamShape::of(ty),
            }),
            TypeData::Pointer(inner) => Ok(ParamShape::Pointer(Box::new(shape(*inner)?))),
            TypeData::Array(elem) => Ok(ParamShape::Array(Box::new(shape(*elem)?))),
            TypeData::Map(key, value) => Ok(ParamShape::Map(
                Box::new(shape(*key)?),
                Box::new(shape(*value)?),
            )),
            TypeData::Specialized { instance_of, args } => Ok(ParamShape::Specialized {
                generic: *instance_of,
                args: args.iter().map(|&a| shape(a)).collect::<Result<_, _>>()?,
            }),
            // A generic signature's own parameters are not positional here.
            TypeData::Function(sig) if sig.type_params.is_empty() => Ok(ParamShape::Function {
                labels: sig.params.iter().map(|p| p.label).collect(),
                params: sig
                    .params
                    .iter()
                    .map(|p| shape(p.ty))
                    .collect::<Result<_, _>>()?,
                result: Box::new(shape(sig.result)?),
            }),
            _ => Ok(ParamShape::of(ty)),
        })
    }
}
