//! Pass 0: declaration-site types.
//!
//! 0a gives every struct, enum, alias and standard (and every generic
//! parameter of a type) its pool handle before anything is resolved, so
//! declarations may refer to each other in any order. 0b then resolves the
//! bodies against those handles.

use rustc_hash::FxHashSet;
use vela_ir::{DeclId, FieldDecl, GenericParam, Item, Module, Name, Span};

use super::ModuleChecker;
use crate::{
    AliasType, BasicKind, DefinedType, Field, Idx, ScopeId, Standard, Symbol,
    TypeData, TypeErrorKind, TypeParam, Variant,
};

/// Enum tags are stored in a single byte.
const MAX_DISCRIMINANT: i64 = u8::MAX as i64;

impl ModuleChecker<'_> {
    pub(super) fn register_basic_types(&mut self) {
        for kind in BasicKind::ALL.iter().copied().filter(|k| k.is_nameable()) {
            let name = self.interner.intern(kind.name());
            // The universe starts empty and basic names are distinct.
            let _ = self
                .scopes
                .define(self.universe, name, Symbol::Type(kind.idx()));
        }
    }

    /// Pass 0a.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn register_types(&mut self, module: &Module) {
        for item in &module.items {
            match item {
                Item::Struct(d) => self.declare_defined(d.id, d.name, &d.generics, d.span),
                Item::Enum(d) => self.declare_defined(d.id, d.name, &d.generics, d.span),
                Item::Alias(d) => {
                    let (name, decl) = (d.name, d.id);
                    let idx = self.pool.declare(decl, || {
                        TypeData::Alias(AliasType {
                            name,
                            decl,
                            target: Idx::UNRESOLVED,
                            constraints: Vec::new(),
                        })
                    });
                    self.define_type(name, idx, d.span);
                }
                Item::Standard(d) => {
                    let (name, decl) = (d.name, d.id);
                    let idx = self.pool.declare(decl, || {
                        TypeData::Standard(Standard {
                            name,
                            decl,
                            methods: Vec::new(),
                        })
                    });
                    self.define_type(name, idx, d.span);
                }
                Item::Function(_) | Item::Conform(_) | Item::Const(_) => {}
            }
        }
    }

    fn declare_defined(&mut self, decl: DeclId, name: Name, generics: &[GenericParam], span: Span) {
        let generics_scope = self.scopes.push(Some(self.module_scope));
        self.type_scopes.insert(decl, generics_scope);
        let type_params = self.declare_generic_params(generics_scope, generics);
        let members = self.scopes.push(None);
        let idx = self.pool.declare(decl, || {
            TypeData::Defined(DefinedType {
                name,
                decl,
                type_params,
                underlying: Idx::UNRESOLVED,
                members,
            })
        });
        self.define_type(name, idx, span);
    }

    /// Give each generic parameter its handle and define it in `scope`.
    /// Constraints are resolved separately, once every standard exists.
    pub(super) fn declare_generic_params(
        &mut self,
        scope: ScopeId,
        generics: &[GenericParam],
    ) -> Vec<Idx> {
        let mut params = Vec::with_capacity(generics.len());
        for gp in generics {
            let (name, decl) = (gp.name, gp.id);
            let idx = self.pool.declare(decl, || {
                TypeData::TypeParam(TypeParam {
                    name,
                    decl,
                    constraints: Vec::new(),
                })
            });
            if self.scopes.define(scope, name, Symbol::Type(idx)).is_ok() {
                params.push(idx);
            } else {
                self.error(gp.span, TypeErrorKind::Redeclaration { name });
            }
        }
        params
    }

    pub(super) fn resolve_generic_constraints(
        &mut self,
        scope: ScopeId,
        generics: &[GenericParam],
    ) {
        for gp in generics {
            let Some(param) = self.pool.declared(gp.id) else {
                continue;
            };
            let constraints = self.resolve_constraints(scope, &gp.constraints);
            self.pool.set_type_param_constraints(param, constraints);
        }
    }

    fn define_type(&mut self, name: Name, idx: Idx, span: Span) {
        if self
            .scopes
            .define(self.module_scope, name, Symbol::Type(idx))
            .is_err()
        {
            self.error(span, TypeErrorKind::Redeclaration { name });
        }
    }

    /// Pass 0b.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn resolve_type_bodies(&mut self, module: &Module) {
        for item in &module.items {
            let (decl, generics) = match item {
                Item::Struct(d) => (d.id, &d.generics),
                Item::Enum(d) => (d.id, &d.generics),
                _ => continue,
            };
            if let Some(&scope) = self.type_scopes.get(&decl) {
                self.resolve_generic_constraints(scope, generics);
            }
        }

        for item in &module.items {
            match item {
                Item::Struct(d) => {
                    let Some((defined, scope)) = self.defined_and_scope(d.id) else {
                        continue;
                    };
                    let fields = self.resolve_fields(scope, &d.fields);
                    let underlying = self.pool.struct_type(fields);
                    self.pool.set_underlying(defined, underlying);
                }
                Item::Enum(d) => {
                    let Some((defined, scope)) = self.defined_and_scope(d.id) else {
                        continue;
                    };
                    let mut seen = FxHashSet::default();
                    let mut next = 0i64;
                    let mut variants = Vec::with_capacity(d.variants.len());
                    for v in &d.variants {
                        if !seen.insert(v.name) {
                            self.error(v.span, TypeErrorKind::Redeclaration { name: v.name });
                            continue;
                        }
                        let discriminant = v.discriminant.unwrap_or(next);
                        if !(0..=MAX_DISCRIMINANT).contains(&discriminant) {
                            self.error(
                                v.span,
                                TypeErrorKind::DiscriminantOutOfRange {
                                    variant: v.name,
                                    value: discriminant,
                                },
                            );
                        }
                        next = discriminant.checked_add(1).unwrap_or(discriminant);
                        variants.push(Variant {
                            name: v.name,
                            discriminant,
                            fields: self.resolve_fields(scope, &v.fields),
                        });
                    }
                    let underlying = self.pool.enum_type(variants);
                    self.pool.set_underlying(defined, underlying);
                }
                Item::Alias(d) => {
                    let Some(alias) = self.pool.declared(d.id) else {
                        continue;
                    };
                    let target = self.resolve_type(self.module_scope, &d.target);
                    let constraints = self.resolve_constraints(self.module_scope, &d.constraints);
                    self.pool.set_alias_target(alias, target, constraints);
                }
                Item::Standard(d) => {
                    let Some(standard) = self.pool.declared(d.id) else {
                        continue;
                    };
                    let mut methods: Vec<(Name, Idx)> = Vec::with_capacity(d.methods.len());
                    for m in &d.methods {
                        let (sig, _, _) = self.build_signature(m, self.module_scope);
                        if methods.iter().any(|(name, _)| *name == m.name) {
                            self.error(m.span, TypeErrorKind::Redeclaration { name: m.name });
                            continue;
                        }
                        methods.push((m.name, sig));
                    }
                    self.pool.set_standard_methods(standard, methods);
                }
                Item::Function(_) | Item::Conform(_) | Item::Const(_) => {}
            }
        }

        // Alias chains are complete now; a cycle is a defect to report
        // before anything walks it.
        for item in &module.items {
            if let Item::Alias(d) = item {
                if let Some(alias) = self.pool.declared(d.id) {
                    if let Err(problem) = self.engine().resolve_canonical(alias) {
                        self.report_problem(d.span, problem);
                    }
                }
            }
        }
    }

    fn defined_and_scope(&self, decl: DeclId) -> Option<(Idx, ScopeId)> {
        let defined = self.pool.declared(decl)?;
        let scope = *self.type_scopes.get(&decl)?;
        Some((defined, scope))
    }

    fn resolve_fields(&mut self, scope: ScopeId, decls: &[FieldDecl]) -> Vec<Field> {
        let mut seen = FxHashSet::default();
        let mut fields = Vec::with_capacity(decls.len());
        for f in decls {
            if !seen.insert(f.name) {
                self.error(f.span, TypeErrorKind::Redeclaration { name: f.name });
                continue;
            }
            let ty = self.resolve_type(scope, &f.ty);
            fields.push(Field { name: f.name, ty });
        }
        fields
    }
}
