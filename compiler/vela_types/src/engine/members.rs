//! Member queries: fields, variants and methods of a (possibly specialized)
//! type, substituted at query time.

use vela_ir::Name;

use super::TypeEngine;
use crate::{
    Field, FunctionSymbol, Idx, InternalError, Substitution, TypeData, TypeProblem, Variant,
};

/// The methods a receiver type offers under one name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodLookup {
    /// The declaration (or extended structural type) owning the methods.
    pub owner: Idx,
    /// Bindings to substitute through each candidate's signature.
    pub bindings: Substitution,
    /// Methods found in the owner's member scope.
    pub candidates: Vec<FunctionSymbol>,
    /// For a type-parameter receiver: the requirement signatures its
    /// constraints declare under the name.
    pub requirements: Vec<Idx>,
}

impl MethodLookup {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.requirements.is_empty()
    }
}

impl TypeEngine<'_> {
    /// The generic (or plain) defined type behind `ty` with its bindings.
    pub fn defined_of(&mut self, ty: Idx) -> Result<Option<(Idx, Substitution)>, InternalError> {
        let canon = self.resolve_canonical(ty).map_err(TypeProblem::into_internal)?;
        Ok(match self.pool.get(canon.ty) {
            TypeData::Defined(_) => Some((canon.ty, canon.bindings)),
            _ => None,
        })
    }

    /// Fields of a struct type in declaration order, substituted.
    pub fn struct_fields(&mut self, ty: Idx) -> Result<Option<Vec<Field>>, InternalError> {
        let Some((defined, bindings)) = self.defined_of(ty)? else {
            return Ok(None);
        };
        let underlying = self.underlying(defined);
        let TypeData::Struct(fields) = self.pool.get(underlying) else {
            return Ok(None);
        };
        let fields = fields.clone();
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            out.push(Field {
                name: field.name,
                ty: self.instantiate(field.ty, &bindings)?,
            });
        }
        Ok(Some(out))
    }

    /// Variants of an enum type in declaration order, payloads substituted.
    pub fn enum_variants(&mut self, ty: Idx) -> Result<Option<Vec<Variant>>, InternalError> {
        let Some((defined, bindings)) = self.defined_of(ty)? else {
            return Ok(None);
        };
        let underlying = self.underlying(defined);
        let TypeData::Enum(variants) = self.pool.get(underlying) else {
            return Ok(None);
        };
        let variants = variants.clone();
        let mut out = Vec::with_capacity(variants.len());
        for variant in variants {
            let mut fields = Vec::with_capacity(variant.fields.len());
            for field in &variant.fields {
                fields.push(Field {
                    name: field.name,
                    ty: self.instantiate(field.ty, &bindings)?,
                });
            }
            out.push(Variant { fields, ..variant });
        }
        Ok(Some(out))
    }

    /// Position and substituted type of the field `name`.
    pub fn resolve_field(
        &mut self,
        ty: Idx,
        name: Name,
    ) -> Result<Option<(u32, Idx)>, InternalError> {
        let Some(fields) = self.struct_fields(ty)? else {
            return Ok(None);
        };
        Ok(fields
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| Some((u32::try_from(i).ok()?, fields[i].ty))))
    }

    /// Methods named `name` on `receiver`.
    ///
    /// Defined types are searched in their member scope, type parameters in
    /// the standards they are constrained by, and everything else in the
    /// extension scope `conform` blocks attach to it.
    pub fn lookup_methods(
        &mut self,
        receiver: Idx,
        name: Name,
    ) -> Result<Option<MethodLookup>, TypeProblem> {
        let canon = self.resolve_canonical(receiver)?;
        let (candidates, requirements) = match self.pool.get(canon.ty) {
            TypeData::Defined(d) => (self.scoped_methods(Some(d.members), name), Vec::new()),
            TypeData::TypeParam(tp) => {
                let mut required = Vec::new();
                for &standard in &tp.constraints {
                    if let Some(s) = self.pool.standard(standard) {
                        required.extend(
                            s.methods
                                .iter()
                                .filter(|(method, _)| *method == name)
                                .map(|(_, sig)| *sig),
                        );
                    }
                }
                (Vec::new(), required)
            }
            _ => (
                self.scoped_methods(self.scopes.extension_scope(canon.ty), name),
                Vec::new(),
            ),
        };
        let lookup = MethodLookup {
            owner: canon.ty,
            bindings: canon.bindings,
            candidates,
            requirements,
        };
        Ok((!lookup.is_empty()).then_some(lookup))
    }

    /// A candidate's signature with the receiver's bindings substituted.
    pub fn method_signature(
        &mut self,
        lookup: &MethodLookup,
        method: &FunctionSymbol,
    ) -> Result<Idx, InternalError> {
        self.instantiate(method.sig, &lookup.bindings)
    }

    fn scoped_methods(&self, scope: Option<crate::ScopeId>, name: Name) -> Vec<FunctionSymbol> {
        scope
            .and_then(|s| self.scopes.resolve_in_current(s, name))
            .map(|symbol| symbol.functions().to_vec())
            .unwrap_or_default()
    }

    fn underlying(&self, defined: Idx) -> Idx {
        self.pool
            .defined(defined)
            .map_or(Idx::UNRESOLVED, |d| d.underlying)
    }
}
