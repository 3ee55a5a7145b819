#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vela_ir::{DeclId, StringInterner};

use super::*;
use crate::{
    AliasType, BasicKind, CheckConfig, DefinedType, Field, FuncId, FunctionSig, FunctionSymbol,
    Idx, InternalError, OverloadKey, ParamShape, Pool, ScopeId, Scopes, Standard, Substitution,
    Symbol, TypeData, TypeParam, TypeProblem, Var,
};

struct Fixture {
    pool: Pool,
    scopes: Scopes,
    interner: StringInterner,
    config: CheckConfig,
    next_decl: u32,
    next_func: u32,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            pool: Pool::new(),
            scopes: Scopes::new(),
            interner: StringInterner::new(),
            config: CheckConfig::default(),
            next_decl: 0,
            next_func: 0,
        }
    }

    fn engine(&mut self) -> TypeEngine<'_> {
        TypeEngine::new(&mut self.pool, &self.scopes, &self.config)
    }

    fn decl(&mut self) -> DeclId {
        self.next_decl += 1;
        DeclId::new(self.next_decl)
    }

    fn type_param(&mut self, name: &str, constraints: Vec<Idx>) -> Idx {
        let decl = self.decl();
        let name = self.interner.intern(name);
        self.pool.declare(decl, || {
            TypeData::TypeParam(TypeParam {
                name,
                decl,
                constraints,
            })
        })
    }

    /// A struct declaration with its members scope.
    fn structure(&mut self, name: &str, type_params: Vec<Idx>, fields: &[(&str, Idx)]) -> Idx {
        let decl = self.decl();
        let name = self.interner.intern(name);
        let members = self.scopes.push(None);
        let defined = self.pool.declare(decl, || {
            TypeData::Defined(DefinedType {
                name,
                decl,
                type_params,
                underlying: Idx::UNRESOLVED,
                members,
            })
        });
        let fields = fields
            .iter()
            .map(|(n, ty)| Field {
                name: self.interner.intern(n),
                ty: *ty,
            })
            .collect();
        let body = self.pool.struct_type(fields);
        self.pool.set_underlying(defined, body);
        defined
    }

    fn alias(&mut self, name: &str, target: Idx, constraints: Vec<Idx>) -> Idx {
        let decl = self.decl();
        let name = self.interner.intern(name);
        self.pool.declare(decl, || {
            TypeData::Alias(AliasType {
                name,
                decl,
                target,
                constraints,
            })
        })
    }

    fn sig(&mut self, params: &[Idx], result: Idx) -> Idx {
        let params = params
            .iter()
            .enumerate()
            .map(|(i, ty)| Var::param(self.interner.intern(&format!("p{i}")), None, *ty))
            .collect();
        self.pool.function(FunctionSig {
            type_params: Vec::new(),
            params,
            result,
            scope: None,
        })
    }

    fn standard(&mut self, name: &str, methods: &[(&str, Idx)]) -> Idx {
        let decl = self.decl();
        let name = self.interner.intern(name);
        let methods = methods
            .iter()
            .map(|(n, sig)| (self.interner.intern(n), *sig))
            .collect();
        self.pool.declare(decl, || {
            TypeData::Standard(Standard {
                name,
                decl,
                methods,
            })
        })
    }

    fn attach_method(&mut self, scope: ScopeId, name: &str, sig: Idx) {
        let id = FuncId::new(self.next_func);
        self.next_func += 1;
        let key = OverloadKey::new(
            self.pool
                .function_sig(sig)
                .map(|s| s.params.iter().map(|p| p.label).collect())
                .unwrap_or_default(),
            self.pool
                .function_sig(sig)
                .map(|s| s.params.iter().map(|p| p.ty).collect::<Vec<_>>())
                .unwrap_or_default(),
        );
        let name = self.interner.intern(name);
        self.scopes
            .define(scope, name, Symbol::Function(FunctionSymbol { id, sig, key }))
            .unwrap();
    }

    fn members_of(&self, defined: Idx) -> ScopeId {
        self.pool.defined(defined).unwrap().members
    }
}

// === Validation ===

#[test]
fn identity_and_markers_validate() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine();
    assert_eq!(engine.validate(Idx::INT, Idx::INT), Ok(Idx::INT));
    assert_eq!(engine.validate(Idx::UNRESOLVED, Idx::STRING), Ok(Idx::UNRESOLVED));
    assert_eq!(engine.validate(Idx::STRING, Idx::UNRESOLVED), Ok(Idx::STRING));
    assert_eq!(engine.validate(Idx::PLACEHOLDER, Idx::I16), Ok(Idx::I16));
    assert_eq!(engine.validate(Idx::ANY, Idx::BOOL), Ok(Idx::ANY));
}

#[test]
fn any_is_not_accepted_where_a_concrete_type_is_expected() {
    let mut fx = Fixture::new();
    assert_eq!(
        fx.engine().validate(Idx::INT, Idx::ANY),
        Err(TypeProblem::Mismatch {
            expected: Idx::INT,
            found: Idx::ANY
        })
    );
}

#[test]
fn integer_literal_widens_to_every_numeric_type() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine();
    for kind in BasicKind::ALL.into_iter().filter(|k| k.is_numeric()) {
        assert_eq!(engine.validate(kind.idx(), Idx::INT_LITERAL), Ok(kind.idx()));
        assert_eq!(engine.validate(Idx::INT_LITERAL, kind.idx()), Ok(kind.idx()));
    }
    assert!(engine.validate(Idx::STRING, Idx::INT_LITERAL).is_err());
}

#[test]
fn float_literal_widens_to_floating_types_only() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine();
    assert_eq!(engine.validate(Idx::FLOAT, Idx::FLOAT_LITERAL), Ok(Idx::FLOAT));
    assert_eq!(engine.validate(Idx::DOUBLE, Idx::FLOAT_LITERAL), Ok(Idx::DOUBLE));
    assert!(engine.validate(Idx::INT, Idx::FLOAT_LITERAL).is_err());
    assert_eq!(
        engine.validate(Idx::INT_LITERAL, Idx::FLOAT_LITERAL),
        Ok(Idx::FLOAT_LITERAL)
    );
}

#[test]
fn nil_meets_any_pointer() {
    let mut fx = Fixture::new();
    let ptr = fx.pool.pointer(Idx::I8);
    let mut engine = fx.engine();
    assert_eq!(engine.validate(ptr, Idx::NIL_LITERAL), Ok(ptr));
    assert_eq!(engine.validate(Idx::NIL_LITERAL, ptr), Ok(ptr));
    assert!(engine.validate(Idx::INT, Idx::NIL_LITERAL).is_err());
}

#[test]
fn component_mismatch_is_reported_on_the_outer_types() {
    let mut fx = Fixture::new();
    let pi8 = fx.pool.pointer(Idx::I8);
    let pu8 = fx.pool.pointer(Idx::U8);
    assert_eq!(
        fx.engine().validate(pi8, pu8),
        Err(TypeProblem::Mismatch {
            expected: pi8,
            found: pu8
        })
    );
}

#[test]
fn function_types_compare_by_shape() {
    let mut fx = Fixture::new();
    let a = fx.sig(&[Idx::INT], Idx::BOOL);
    let b = fx.sig(&[Idx::INT], Idx::BOOL);
    let c = fx.sig(&[Idx::INT, Idx::INT], Idx::BOOL);
    let mut engine = fx.engine();
    assert_eq!(engine.validate(a, b), Ok(a));
    assert!(engine.validate(a, c).is_err());
}

#[test]
fn alias_validates_through_to_its_target_and_keeps_its_name() {
    let mut fx = Fixture::new();
    let byte_count = fx.alias("ByteCount", Idx::U64, Vec::new());
    let mut engine = fx.engine();
    assert_eq!(engine.validate(byte_count, Idx::U64), Ok(byte_count));
    assert_eq!(engine.validate(Idx::U64, byte_count), Ok(Idx::U64));
    assert_eq!(engine.validate(byte_count, Idx::INT_LITERAL), Ok(byte_count));
    assert!(engine.validate(byte_count, Idx::STRING).is_err());
}

#[test]
fn specializations_compare_their_bindings() {
    let mut fx = Fixture::new();
    let t = fx.type_param("T", Vec::new());
    let pair = fx.structure("Pair", vec![t], &[("first", t), ("second", t)]);
    let pair_int = fx.pool.specialize(pair, vec![Idx::INT]);
    let pair_i8 = fx.pool.specialize(pair, vec![Idx::I8]);
    let alias = fx.alias("IntPair", pair_int, Vec::new());

    let mut engine = fx.engine();
    assert_eq!(engine.validate(pair_int, alias), Ok(pair_int));
    assert_eq!(
        engine.validate(pair_int, pair_i8),
        Err(TypeProblem::Mismatch {
            expected: pair_int,
            found: pair_i8
        })
    );
}

#[test]
fn parameter_accepts_a_parameter_with_at_least_its_constraints() {
    let mut fx = Fixture::new();
    let describe_req = fx.sig(&[], Idx::STRING);
    let shows = fx.standard("Shows", &[("describe", describe_req)]);
    let size_req = fx.sig(&[], Idx::INT);
    let sized = fx.standard("Sized", &[("size", size_req)]);
    let t = fx.type_param("T", vec![shows]);
    let u = fx.type_param("U", vec![shows, sized]);

    let mut engine = fx.engine();
    assert_eq!(engine.validate(t, u), Ok(t));
    assert_eq!(
        engine.validate(u, t),
        Err(TypeProblem::Mismatch {
            expected: u,
            found: t
        })
    );
}

#[test]
fn constrained_parameter_accepts_only_conforming_types() {
    let mut fx = Fixture::new();
    let describe_req = fx.sig(&[], Idx::STRING);
    let shows = fx.standard("Shows", &[("describe", describe_req)]);
    let t = fx.type_param("T", vec![shows]);
    let point = fx.structure("Point", Vec::new(), &[("x", Idx::INT)]);
    let plain = fx.structure("Plain", Vec::new(), &[]);
    let describe_impl = fx.sig(&[], Idx::STRING);
    let members = fx.members_of(point);
    fx.attach_method(members, "describe", describe_impl);
    let describe = fx.interner.intern("describe");

    let mut engine = fx.engine();
    assert_eq!(engine.validate(t, point), Ok(t));
    assert_eq!(
        engine.validate(t, plain),
        Err(TypeProblem::NonConformance {
            candidate: plain,
            standard: shows,
            method: describe
        })
    );
}

#[test]
fn parameter_accepts_a_specialized_type() {
    let mut fx = Fixture::new();
    let u = fx.type_param("U", Vec::new());
    let list = fx.structure("List", vec![u], &[("head", u)]);
    let list_int = fx.pool.specialize(list, vec![Idx::INT]);
    let plain = fx.structure("Plain", Vec::new(), &[]);
    let t = fx.type_param("T", Vec::new());
    let elem = fx.alias("Elem", t, Vec::new());

    let describe_req = fx.sig(&[], Idx::STRING);
    let shows = fx.standard("Shows", &[("describe", describe_req)]);
    let shown = fx.type_param("S", vec![shows]);
    let describe_impl = fx.sig(&[], Idx::STRING);
    let members = fx.members_of(list);
    fx.attach_method(members, "describe", describe_impl);

    let mut engine = fx.engine();
    assert_eq!(engine.validate(t, plain), Ok(t));
    assert_eq!(engine.validate(t, list_int), Ok(t));
    assert_eq!(engine.validate(elem, list_int), Ok(elem));
    assert_eq!(engine.validate(shown, list_int), Ok(shown));
}

// === Canonical resolution ===

#[test]
fn canonical_collects_constraints_and_bindings() {
    let mut fx = Fixture::new();
    let shows = fx.standard("Shows", &[]);
    let t = fx.type_param("T", Vec::new());
    let boxed = fx.structure("Box", vec![t], &[("value", t)]);
    let box_int = fx.pool.specialize(boxed, vec![Idx::INT]);
    let inner = fx.alias("Inner", box_int, vec![shows]);
    let outer = fx.alias("Outer", inner, vec![shows]);

    let canon = fx.engine().resolve_canonical(outer).unwrap();
    assert_eq!(canon.ty, boxed);
    assert_eq!(canon.constraints, vec![shows]);
    assert_eq!(canon.bindings.get(t), Some(Idx::INT));
}

#[test]
fn alias_cycle_is_an_internal_error() {
    let mut fx = Fixture::new();
    let a = fx.alias("A", Idx::UNRESOLVED, Vec::new());
    let b = fx.alias("B", a, Vec::new());
    fx.pool.set_alias_target(a, b, Vec::new());

    let err = fx.engine().resolve_canonical(a).unwrap_err();
    assert!(matches!(
        err,
        TypeProblem::Internal(InternalError::CyclicAlias { .. })
    ));
}

#[test]
fn resolution_stops_at_the_configured_limit() {
    let mut fx = Fixture::new();
    fx.config = CheckConfig {
        resolution_limit: 3,
    };
    let mut ty = Idx::INT;
    for i in 0..5 {
        ty = fx.alias(&format!("A{i}"), ty, Vec::new());
    }
    let err = fx.engine().resolve_canonical(ty).unwrap_err();
    assert!(matches!(
        err,
        TypeProblem::Internal(InternalError::ResolutionLimitExceeded { limit: 3, .. })
    ));
}

#[test]
fn param_shapes_follow_aliases_and_number_own_parameters() {
    let mut fx = Fixture::new();
    let t = fx.type_param("T", Vec::new());
    let outer = fx.type_param("O", Vec::new());
    let meters = fx.alias("Meters", Idx::INT, Vec::new());
    let ptr_meters = fx.pool.pointer(meters);
    let elem = fx.alias("Elem", t, Vec::new());

    let engine = fx.engine();
    assert_eq!(
        engine.param_shape(ptr_meters, &[]),
        Ok(ParamShape::Pointer(Box::new(ParamShape::Type(Idx::INT))))
    );
    assert_eq!(
        engine.param_shape(elem, &[outer, t]),
        Ok(ParamShape::Generic {
            position: 1,
            constraints: Vec::new()
        })
    );
    assert_eq!(engine.param_shape(outer, &[t]), Ok(ParamShape::Type(outer)));
    assert_eq!(
        engine.param_shape(Idx::FLOAT_LITERAL, &[]),
        Ok(ParamShape::Type(Idx::DOUBLE))
    );
}

// === Instantiation ===

#[test]
fn instantiate_rebuilds_structure() {
    let mut fx = Fixture::new();
    let t = fx.type_param("T", Vec::new());
    let ptr_t = fx.pool.pointer(t);
    let map = fx.pool.map(Idx::STRING, ptr_t);
    let subst = Substitution::zip(&[t], &[Idx::I32]);

    let result = fx.engine().instantiate(map, &subst).unwrap();
    let ptr_i32 = fx.pool.pointer(Idx::I32);
    assert_eq!(result, fx.pool.map(Idx::STRING, ptr_i32));
}

#[test]
fn instantiating_a_generic_declaration_specializes_it() {
    let mut fx = Fixture::new();
    let t = fx.type_param("T", Vec::new());
    let u = fx.type_param("U", Vec::new());
    let boxed = fx.structure("Box", vec![t], &[("value", t)]);
    let box_u = fx.pool.specialize(boxed, vec![u]);
    let subst = Substitution::zip(&[u], &[Idx::BOOL]);

    let result = fx.engine().instantiate(box_u, &subst).unwrap();
    assert_eq!(result, fx.pool.specialize(boxed, vec![Idx::BOOL]));
}

#[test]
fn unbound_parameter_is_an_internal_error() {
    let mut fx = Fixture::new();
    let t = fx.type_param("T", Vec::new());
    let u = fx.type_param("U", Vec::new());
    let ptr_t = fx.pool.pointer(t);
    let subst = Substitution::zip(&[u], &[Idx::INT]);

    assert_eq!(
        fx.engine().instantiate(ptr_t, &subst),
        Err(InternalError::UnboundTypeParameter { param: t })
    );
}

#[test]
fn compose_rebinds_old_values_then_adds_new_entries() {
    let mut fx = Fixture::new();
    let t = fx.type_param("T", Vec::new());
    let u = fx.type_param("U", Vec::new());
    let v = fx.type_param("V", Vec::new());
    let ptr_u = fx.pool.pointer(u);
    let old = Substitution::zip(&[t], &[ptr_u]);
    let new = Substitution::zip(&[u, v], &[Idx::CHAR, Idx::BOOL]);

    let composed = fx.engine().compose(&old, &new).unwrap();
    let ptr_char = fx.pool.pointer(Idx::CHAR);
    assert_eq!(composed.get(t), Some(ptr_char));
    assert_eq!(composed.get(u), Some(Idx::CHAR));
    assert_eq!(composed.get(v), Some(Idx::BOOL));
}

#[test]
fn specialized_function_materializes_once() {
    let mut fx = Fixture::new();
    let t = fx.type_param("T", Vec::new());
    let generic = fx.pool.function(FunctionSig {
        type_params: vec![t],
        params: vec![Var::param(fx.interner.intern("x"), None, t)],
        result: t,
        scope: None,
    });
    let spec = fx.pool.specialize(generic, vec![Idx::INT]);
    let concrete = fx.sig(&[Idx::INT], Idx::INT);

    let mut engine = fx.engine();
    let first = engine.materialize_function(spec).unwrap();
    let second = engine.materialize_function(spec).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.validate(concrete, spec), Ok(concrete));
}

// === Members and conformance ===

#[test]
fn fields_are_substituted_at_query_time() {
    let mut fx = Fixture::new();
    let t = fx.type_param("T", Vec::new());
    let pair = fx.structure("Pair", vec![t], &[("first", t), ("second", Idx::BOOL)]);
    let pair_i8 = fx.pool.specialize(pair, vec![Idx::I8]);
    let second = fx.interner.intern("second");
    let first = fx.interner.intern("first");

    let mut engine = fx.engine();
    assert_eq!(engine.resolve_field(pair_i8, first).unwrap(), Some((0, Idx::I8)));
    assert_eq!(engine.resolve_field(pair_i8, second).unwrap(), Some((1, Idx::BOOL)));
}

#[test]
fn conformance_is_structural() {
    let mut fx = Fixture::new();
    let describe_req = fx.sig(&[], Idx::STRING);
    let shows = fx.standard("Shows", &[("describe", describe_req)]);
    let point = fx.structure("Point", Vec::new(), &[("x", Idx::INT)]);
    let plain = fx.structure("Plain", Vec::new(), &[]);
    let describe_impl = fx.sig(&[], Idx::STRING);
    let members = fx.members_of(point);
    fx.attach_method(members, "describe", describe_impl);
    let describe = fx.interner.intern("describe");

    let mut engine = fx.engine();
    assert_eq!(engine.conforms(&[shows], point), Ok(()));
    assert_eq!(
        engine.conforms(&[shows], plain),
        Err(TypeProblem::NonConformance {
            candidate: plain,
            standard: shows,
            method: describe
        })
    );
}

#[test]
fn conformance_rejects_a_method_with_the_wrong_signature() {
    let mut fx = Fixture::new();
    let describe_req = fx.sig(&[], Idx::STRING);
    let shows = fx.standard("Shows", &[("describe", describe_req)]);
    let point = fx.structure("Point", Vec::new(), &[]);
    let wrong = fx.sig(&[Idx::INT], Idx::STRING);
    let members = fx.members_of(point);
    fx.attach_method(members, "describe", wrong);

    assert!(matches!(
        fx.engine().conforms(&[shows], point),
        Err(TypeProblem::NonConformance { .. })
    ));
}

#[test]
fn extension_methods_make_basic_types_conform() {
    let mut fx = Fixture::new();
    let describe_req = fx.sig(&[], Idx::STRING);
    let shows = fx.standard("Shows", &[("describe", describe_req)]);
    let scope = fx.scopes.ensure_extension_scope(Idx::INT);
    let describe_impl = fx.sig(&[], Idx::STRING);
    fx.attach_method(scope, "describe", describe_impl);

    let mut engine = fx.engine();
    assert_eq!(engine.conforms(&[shows], Idx::INT), Ok(()));
    assert!(engine.conforms(&[shows], Idx::BOOL).is_err());
}

#[test]
fn constrained_parameter_offers_requirement_signatures() {
    let mut fx = Fixture::new();
    let describe_req = fx.sig(&[], Idx::STRING);
    let shows = fx.standard("Shows", &[("describe", describe_req)]);
    let t = fx.type_param("T", vec![shows]);
    let describe = fx.interner.intern("describe");

    let lookup = fx.engine().lookup_methods(t, describe).unwrap().unwrap();
    assert_eq!(lookup.requirements, vec![describe_req]);
    assert!(lookup.candidates.is_empty());
}

#[test]
fn infer_bindings_matches_structure_and_defaults_literals() {
    let mut fx = Fixture::new();
    let t = fx.type_param("T", Vec::new());
    let u = fx.type_param("U", Vec::new());
    let ptr_t = fx.pool.pointer(t);
    let ptr_char = fx.pool.pointer(Idx::CHAR);
    let mut out = Substitution::new();

    let mut engine = fx.engine();
    engine.infer_bindings(&[t, u], ptr_t, ptr_char, &mut out).unwrap();
    engine.infer_bindings(&[t, u], u, Idx::INT_LITERAL, &mut out).unwrap();
    assert_eq!(out.get(t), Some(Idx::CHAR));
    assert_eq!(out.get(u), Some(Idx::INT));
}

fn numeric_kind() -> impl Strategy<Value = BasicKind> {
    prop::sample::select(
        BasicKind::ALL
            .into_iter()
            .filter(|k| k.is_numeric())
            .collect::<Vec<_>>(),
    )
}

proptest! {
    #[test]
    fn literal_widening_is_symmetric(kind in numeric_kind()) {
        let mut fx = Fixture::new();
        let mut engine = fx.engine();
        let forward = engine.validate(kind.idx(), Idx::INT_LITERAL);
        let backward = engine.validate(Idx::INT_LITERAL, kind.idx());
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn specialization_is_deterministic(args in prop::collection::vec(numeric_kind(), 1..4)) {
        let mut fx = Fixture::new();
        let params: Vec<Idx> = (0..args.len())
            .map(|i| fx.type_param(&format!("T{i}"), Vec::new()))
            .collect();
        let generic = fx.structure("G", params, &[]);
        let args: Vec<Idx> = args.into_iter().map(BasicKind::idx).collect();
        let a = fx.pool.specialize(generic, args.clone());
        let b = fx.pool.specialize(generic, args);
        prop_assert_eq!(a, b);
    }
}
