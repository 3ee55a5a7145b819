#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use vela_ir::{AstBuilder, BinaryOp, ExprArena, Item, Module, Receiver, StringInterner, UnaryOp};

use crate::{
    check_module, CallKind, CheckConfig, CheckOutput, Idx, MemberResolution, TypeErrorKind,
};

fn check_built(module: &Module, arena: &ExprArena, interner: &StringInterner) -> CheckOutput {
    check_module(module, arena, interner, &CheckConfig::default()).unwrap()
}

/// Build a module with `build` and check it.
fn check<T>(
    interner: &StringInterner,
    build: impl FnOnce(&mut AstBuilder<'_>) -> T,
) -> (CheckOutput, T) {
    let mut b = AstBuilder::new(interner);
    let extra = build(&mut b);
    let (module, arena) = b.finish();
    (check_built(&module, &arena, interner), extra)
}

fn kinds(out: &CheckOutput) -> Vec<&TypeErrorKind> {
    out.errors.iter().map(|e| &e.kind).collect()
}

fn push_main(b: &mut AstBuilder<'_>, body: Vec<vela_ir::StmtId>) {
    let main = b.function("main", Vec::new(), None, body);
    b.push_item(Item::Function(main));
}

// === Literals ===

#[test]
fn literals_settle_to_their_context() {
    let interner = StringInterner::new();
    let (out, (x, y, z, one)) = check(&interner, |b| {
        let five = b.int(5);
        let x = b.let_("x", None, Some(five));
        let i8_ty = b.ty("i8");
        let three = b.int(3);
        let y = b.let_("y", Some(i8_ty), Some(three));
        let y_ref = b.ident("y");
        let one = b.int(1);
        let sum = b.binary(BinaryOp::Add, y_ref, one);
        let z = b.let_("z", None, Some(sum));
        push_main(b, vec![x, y, z]);
        (x, y, z, one)
    });

    assert_eq!(kinds(&out), Vec::<&TypeErrorKind>::new());
    assert_eq!(out.typed.local_type(x), Some(Idx::INT));
    assert_eq!(out.typed.local_type(y), Some(Idx::I8));
    assert_eq!(out.typed.local_type(z), Some(Idx::I8));
    assert_eq!(out.typed.expr_type(one), Idx::I8);
}

#[test]
fn mixed_literal_comparison_settles_both_sides_to_double() {
    let interner = StringInterner::new();
    let (out, (lhs, rhs, flag)) = check(&interner, |b| {
        let lhs = b.int(1);
        let rhs = b.float(2.5);
        let cmp = b.binary(BinaryOp::Lt, lhs, rhs);
        let flag = b.let_("flag", None, Some(cmp));
        push_main(b, vec![flag]);
        (lhs, rhs, flag)
    });

    assert!(!out.has_errors());
    assert_eq!(out.typed.local_type(flag), Some(Idx::BOOL));
    assert_eq!(out.typed.expr_type(lhs), Idx::DOUBLE);
    assert_eq!(out.typed.expr_type(rhs), Idx::DOUBLE);
}

#[test]
fn integer_literal_does_not_fit_a_string() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let string = b.ty("string");
        let five = b.int(5);
        let s = b.let_("s", Some(string), Some(five));
        push_main(b, vec![s]);
    });

    assert_eq!(out.errors.len(), 1);
    assert!(matches!(
        out.errors[0].kind,
        TypeErrorKind::Mismatch {
            expected: Idx::STRING,
            ..
        }
    ));
}

#[test]
fn unannotated_nil_needs_a_type() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let nil = b.nil();
        let p = b.let_("p", None, Some(nil));
        push_main(b, vec![p]);
    });

    assert!(matches!(
        kinds(&out).as_slice(),
        [TypeErrorKind::MissingTypeAnnotation { .. }]
    ));
}

// === Overloads ===

#[test]
fn missing_labelled_argument_reports_no_overload() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let int = b.ty("int");
        let double = b.ty("double");
        let station = b.param("station", int);
        let frequency = b.param("frequency", double);
        let ping = b.function("ping", vec![station, frequency], None, Vec::new());
        b.push_item(Item::Function(ping));

        let four = b.int(4);
        let call = b.call("ping", vec![(Some("station"), four)]);
        let stmt = b.expr_stmt(call);
        push_main(b, vec![stmt]);
    });

    assert_eq!(out.errors.len(), 1);
    assert_eq!(
        out.errors[0].kind,
        TypeErrorKind::UnresolvedCall {
            name: interner.intern("ping"),
            arg_types: vec![Idx::INT],
        }
    );
    assert_eq!(
        out.errors[0].message(&out.pool, &interner),
        "no overload of `ping` accepts arguments (int)"
    );
}

#[test]
fn identical_overloads_are_rejected() {
    let interner = StringInterner::new();
    let (out, spans) = check(&interner, |b| {
        let mut spans = Vec::new();
        for _ in 0..2 {
            let int = b.ty("int");
            let x = b.param("x", int);
            let f = b.function("f", vec![x], None, Vec::new());
            spans.push(f.span);
            b.push_item(Item::Function(f));
        }
        spans
    });

    assert_eq!(
        kinds(&out),
        vec![&TypeErrorKind::DuplicateOverload {
            name: interner.intern("f")
        }]
    );
    assert_eq!(out.errors[0].span, spans[1]);
    assert_eq!(out.errors[0].previous, Some(spans[0]));
}

#[test]
fn aliases_do_not_distinguish_overloads() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let int = b.ty("int");
        let meters = b.alias_decl("Meters", int, Vec::new());
        b.push_item(Item::Alias(meters));

        for ty in ["int", "Meters"] {
            let ty = b.ty(ty);
            let x = b.param("x", ty);
            let f = b.function("f", vec![x], None, Vec::new());
            b.push_item(Item::Function(f));
        }
        for ty in ["int", "Meters"] {
            let ty = b.ty(ty);
            let ptr = b.ptr_ty(ty);
            let p = b.param("p", ptr);
            let g = b.function("g", vec![p], None, Vec::new());
            b.push_item(Item::Function(g));
        }
    });

    assert_eq!(
        kinds(&out),
        vec![
            &TypeErrorKind::DuplicateOverload {
                name: interner.intern("f")
            },
            &TypeErrorKind::DuplicateOverload {
                name: interner.intern("g")
            },
        ]
    );
}

/// `fn name<first, second>(a: a_ty, b: b_ty)`
fn push_generic_pair(
    b: &mut AstBuilder<'_>,
    name: &str,
    generics: [&str; 2],
    params: [&str; 2],
) {
    let a_ty = b.ty(params[0]);
    let a = b.param("a", a_ty);
    let b_ty = b.ty(params[1]);
    let second = b.param("b", b_ty);
    let mut f = b.function(name, vec![a, second], None, Vec::new());
    f.generics = generics
        .iter()
        .map(|g| b.generic_param(g, Vec::new()))
        .collect();
    b.push_item(Item::Function(f));
}

#[test]
fn generic_overloads_compare_parameters_by_position() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        push_generic_pair(b, "same", ["T", "U"], ["T", "U"]);
        push_generic_pair(b, "same", ["U", "T"], ["U", "T"]);
        push_generic_pair(b, "swapped", ["T", "U"], ["T", "U"]);
        push_generic_pair(b, "swapped", ["T", "U"], ["U", "T"]);
    });

    assert_eq!(
        kinds(&out),
        vec![&TypeErrorKind::DuplicateOverload {
            name: interner.intern("same")
        }]
    );
}

#[test]
fn generic_constraints_distinguish_overloads() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        push_shows(b, true);
        for (param, constraints) in [("T", vec!["Shows"]), ("U", Vec::new())] {
            let ty = b.ty(param);
            let a = b.param("a", ty);
            let mut f = b.function("f", vec![a], None, Vec::new());
            let constraints = constraints.into_iter().map(|c| b.ty(c)).collect();
            f.generics = vec![b.generic_param(param, constraints)];
            b.push_item(Item::Function(f));
        }
    });

    assert_eq!(kinds(&out), Vec::<&TypeErrorKind>::new());
}

#[test]
fn labels_select_the_overload() {
    let interner = StringInterner::new();
    let (out, (by_y, call)) = check(&interner, |b| {
        let int = b.ty("int");
        let x = b.param("x", int);
        let by_x = b.function("f", vec![x], None, Vec::new());
        let int = b.ty("int");
        let y = b.param("y", int);
        let by_y = b.function("f", vec![y], None, Vec::new());
        let by_y_id = by_y.id;
        b.push_item(Item::Function(by_x));
        b.push_item(Item::Function(by_y));

        let two = b.int(2);
        let call = b.call("f", vec![(Some("y"), two)]);
        let stmt = b.expr_stmt(call);
        push_main(b, vec![stmt]);
        (by_y_id, call)
    });

    assert!(!out.has_errors());
    let expected = out.typed.function_by_decl(by_y).unwrap();
    assert_eq!(out.typed.call(call).unwrap().kind, CallKind::Function(expected));
}

#[test]
fn literal_matching_two_overloads_is_ambiguous() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        for ty in ["int", "i8"] {
            let ty = b.ty(ty);
            let x = b.param("x", ty);
            let f = b.function("f", vec![x], None, Vec::new());
            b.push_item(Item::Function(f));
        }
        let one = b.int(1);
        let call = b.call("f", vec![(Some("x"), one)]);
        let stmt = b.expr_stmt(call);
        push_main(b, vec![stmt]);
    });

    assert!(matches!(
        kinds(&out).as_slice(),
        [TypeErrorKind::AmbiguousCall { candidates: 2, .. }]
    ));
}

// === Generics ===

/// `fn first<T>(a: T, b: T) -> T { return a; }`
fn push_first(b: &mut AstBuilder<'_>) {
    let t = b.ty("T");
    let a = b.param("a", t);
    let t = b.ty("T");
    let bp = b.param("b", t);
    let a_ref = b.ident("a");
    let ret = b.ret(Some(a_ref));
    let result = b.ty("T");
    let mut first = b.function("first", vec![a, bp], Some(result), vec![ret]);
    first.generics = vec![b.generic_param("T", Vec::new())];
    b.push_item(Item::Function(first));
}

#[test]
fn type_arguments_are_inferred_from_arguments() {
    let interner = StringInterner::new();
    let (out, (v, call)) = check(&interner, |b| {
        push_first(b);
        let one = b.int(1);
        let two = b.int(2);
        let call = b.call("first", vec![(Some("a"), one), (Some("b"), two)]);
        let v = b.let_("v", None, Some(call));
        push_main(b, vec![v]);
        (v, call)
    });

    assert!(!out.has_errors());
    assert_eq!(out.typed.local_type(v), Some(Idx::INT));
    assert_eq!(out.typed.call(call).unwrap().type_args, vec![Idx::INT]);
}

#[test]
fn expected_type_drives_inference_before_literals_default() {
    let interner = StringInterner::new();
    let (out, call) = check(&interner, |b| {
        push_first(b);
        let one = b.int(1);
        let two = b.int(2);
        let call = b.call("first", vec![(Some("a"), one), (Some("b"), two)]);
        let double = b.ty("double");
        let v = b.let_("v", Some(double), Some(call));
        push_main(b, vec![v]);
        call
    });

    assert!(!out.has_errors());
    assert_eq!(out.typed.call(call).unwrap().type_args, vec![Idx::DOUBLE]);
}

#[test]
fn uninferable_type_argument_is_reported() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let result = b.ty("T");
        let mut make = b.function("make", Vec::new(), Some(result), Vec::new());
        make.body = None;
        make.generics = vec![b.generic_param("T", Vec::new())];
        b.push_item(Item::Function(make));

        let call = b.call("make", Vec::new());
        let x = b.let_("x", None, Some(call));
        let call = b.call("make", Vec::new());
        let int = b.ty("int");
        let y = b.let_("y", Some(int), Some(call));
        push_main(b, vec![x, y]);
    });

    assert!(matches!(
        kinds(&out).as_slice(),
        [TypeErrorKind::CannotInferTypeArgument { .. }]
    ));
}

#[test]
fn generic_function_cannot_be_named_bare() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        push_first(b);
        let f = b.ident("first");
        let stmt = b.expr_stmt(f);
        push_main(b, vec![stmt]);
    });

    assert_eq!(
        kinds(&out),
        vec![&TypeErrorKind::BareGenericReference {
            name: interner.intern("first")
        }]
    );
}

/// `struct Pair<T> { first: T, second: T }`
fn push_pair(b: &mut AstBuilder<'_>) -> vela_ir::DeclId {
    let t = b.ty("T");
    let first = b.field("first", t);
    let t = b.ty("T");
    let second = b.field("second", t);
    let generics = vec![b.generic_param("T", Vec::new())];
    let pair = b.struct_decl("Pair", generics, vec![first, second], Vec::new());
    let id = pair.id;
    b.push_item(Item::Struct(pair));
    id
}

#[test]
fn generic_struct_literal_infers_its_arguments() {
    let interner = StringInterner::new();
    let (mut out, (pair, p, f)) = check(&interner, |b| {
        let pair = push_pair(b);
        let one = b.int(1);
        let two = b.int(2);
        let ty = b.ty("Pair");
        let lit = b.struct_lit(ty, vec![("first", one), ("second", two)]);
        let p = b.let_("p", None, Some(lit));
        let p_ref = b.ident("p");
        let first = b.member(p_ref, "first");
        let f = b.let_("f", None, Some(first));
        push_main(b, vec![p, f]);
        (pair, p, f)
    });

    assert!(!out.has_errors());
    let pair = out.pool.declared(pair).unwrap();
    let pair_int = out.pool.specialize(pair, vec![Idx::INT]);
    assert_eq!(out.typed.local_type(p), Some(pair_int));
    assert_eq!(out.typed.local_type(f), Some(Idx::INT));
}

#[test]
fn struct_literal_reports_missing_and_unknown_fields() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let int = b.ty("int");
        let x = b.field("x", int);
        let int = b.ty("int");
        let y = b.field("y", int);
        let point = b.struct_decl("Point", Vec::new(), vec![x, y], Vec::new());
        b.push_item(Item::Struct(point));

        let one = b.int(1);
        let two = b.int(2);
        let ty = b.ty("Point");
        let lit = b.struct_lit(ty, vec![("x", one), ("z", two)]);
        let p = b.let_("p", None, Some(lit));
        push_main(b, vec![p]);
    });

    let found = kinds(&out);
    assert_eq!(found.len(), 2);
    assert!(matches!(found[0], TypeErrorKind::UnknownField { .. }));
    assert!(matches!(
        found[1],
        TypeErrorKind::MissingField { field, .. } if *field == interner.intern("y")
    ));
}

#[test]
fn annotations_check_generic_arity() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        push_pair(b);
        let int = b.ty("int");
        let int2 = b.ty("int");
        let two_args = b.generic_ty("Pair", vec![int, int2]);
        let a = b.let_("a", Some(two_args), None);
        let bare = b.ty("Pair");
        let c = b.let_("c", Some(bare), None);
        push_main(b, vec![a, c]);
    });

    let found = kinds(&out);
    assert!(found.iter().any(|k| matches!(
        k,
        TypeErrorKind::GenericArityMismatch {
            expected: 1,
            found: 2,
            ..
        }
    )));
    assert!(found
        .iter()
        .any(|k| matches!(k, TypeErrorKind::BareGenericReference { .. })));
}

// === Enums ===

/// `enum Opt<T> { None, Some(T) }`
fn push_opt(b: &mut AstBuilder<'_>) -> vela_ir::DeclId {
    let none = b.variant("None", Vec::new());
    let t = b.ty("T");
    let some = b.tuple_variant("Some", vec![t]);
    let generics = vec![b.generic_param("T", Vec::new())];
    let opt = b.enum_decl("Opt", generics, vec![none, some], Vec::new());
    let id = opt.id;
    b.push_item(Item::Enum(opt));
    id
}

#[test]
fn variants_take_their_arguments_from_the_annotation() {
    let interner = StringInterner::new();
    let (mut out, (opt, five, construct, none)) = check(&interner, |b| {
        let opt = push_opt(b);

        let i8_ty = b.ty("i8");
        let ann = b.generic_ty("Opt", vec![i8_ty]);
        let five = b.int(5);
        let some_ty = b.ty("Opt");
        let callee = b.type_member(some_ty, "Some");
        let construct = b.call_expr(callee, Vec::new(), vec![(None, five)]);
        let a = b.let_("a", Some(ann), Some(construct));

        let i8_ty = b.ty("i8");
        let ann = b.generic_ty("Opt", vec![i8_ty]);
        let none_ty = b.ty("Opt");
        let none = b.type_member(none_ty, "None");
        let n = b.let_("n", Some(ann), Some(none));
        push_main(b, vec![a, n]);
        (opt, five, construct, none)
    });

    assert_eq!(kinds(&out), Vec::<&TypeErrorKind>::new());
    let opt = out.pool.declared(opt).unwrap();
    let opt_i8 = out.pool.specialize(opt, vec![Idx::I8]);
    assert_eq!(out.typed.expr_type(five), Idx::I8);
    assert_eq!(
        out.typed.call(construct).unwrap().kind,
        CallKind::VariantConstruct {
            enum_ty: opt_i8,
            variant: 1
        }
    );
    assert_eq!(
        out.typed.member(none),
        Some(MemberResolution::Variant {
            enum_ty: opt_i8,
            index: 0
        })
    );
}

#[test]
fn payload_free_variant_without_context_cannot_infer() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        push_opt(b);
        let ty = b.ty("Opt");
        let none = b.type_member(ty, "None");
        let n = b.let_("n", None, Some(none));
        push_main(b, vec![n]);
    });

    assert!(matches!(
        kinds(&out).as_slice(),
        [TypeErrorKind::CannotInferTypeArgument { .. }]
    ));
}

#[test]
fn discriminants_must_fit_in_a_byte() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let mut a = b.variant("A", Vec::new());
        a.discriminant = Some(300);
        let int = b.ty("int");
        let p = b.tuple_variant("P", vec![int]);
        let big = b.enum_decl("Big", Vec::new(), vec![a, p], Vec::new());
        b.push_item(Item::Enum(big));
    });

    assert_eq!(
        kinds(&out),
        vec![
            &TypeErrorKind::DiscriminantOutOfRange {
                variant: interner.intern("A"),
                value: 300
            },
            &TypeErrorKind::DiscriminantOutOfRange {
                variant: interner.intern("P"),
                value: 301
            },
        ]
    );
    assert_eq!(
        out.errors[0].message(&out.pool, &interner),
        "discriminant 300 of variant `A` does not fit in a byte (0..=255)"
    );
}

#[test]
fn implicit_discriminant_past_the_last_byte_is_reported() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let mut low = b.variant("Low", Vec::new());
        low.discriminant = Some(-1);
        let mut a = b.variant("A", Vec::new());
        a.discriminant = Some(254);
        let last = b.variant("Last", Vec::new());
        let over = b.variant("Over", Vec::new());
        let mut max = b.variant("Max", Vec::new());
        max.discriminant = Some(i64::MAX);
        let after = b.variant("After", Vec::new());
        let tag = b.enum_decl("Tag", Vec::new(), vec![low, a, last, over, max, after], Vec::new());
        b.push_item(Item::Enum(tag));
    });

    let reported: Vec<(&str, i64)> = kinds(&out)
        .into_iter()
        .map(|k| match k {
            TypeErrorKind::DiscriminantOutOfRange { variant, value } => {
                (interner.lookup(*variant), *value)
            }
            other => panic!("unexpected error {other:?}"),
        })
        .collect();
    assert_eq!(
        reported,
        vec![("Low", -1), ("Over", 256), ("Max", i64::MAX), ("After", i64::MAX)]
    );
}

// === Standards and conformance ===

/// `standard Shows { fn describe() -> string }` and `struct Point { x: int }`,
/// with `conform Point to Shows` when `conform` is set.
fn push_shows(b: &mut AstBuilder<'_>, conform: bool) {
    let string = b.ty("string");
    let describe = b.signature("describe", Vec::new(), Some(string));
    let shows = b.standard_decl("Shows", vec![describe]);
    b.push_item(Item::Standard(shows));

    let int = b.ty("int");
    let x = b.field("x", int);
    let point = b.struct_decl("Point", Vec::new(), vec![x], Vec::new());
    b.push_item(Item::Struct(point));

    let methods = if conform {
        let text = b.string("point");
        let ret = b.ret(Some(text));
        let string = b.ty("string");
        vec![b.method("describe", Receiver::Value, Vec::new(), Some(string), vec![ret])]
    } else {
        Vec::new()
    };
    let target = b.ty("Point");
    let standard = b.ty("Shows");
    let block = b.conform_decl(target, Some(standard), methods);
    b.push_item(Item::Conform(block));
}

#[test]
fn conform_block_must_supply_every_requirement() {
    let interner = StringInterner::new();
    let (ok, ()) = check(&interner, |b| push_shows(b, true));
    assert!(!ok.has_errors());

    let (missing, ()) = check(&interner, |b| push_shows(b, false));
    assert!(matches!(
        kinds(&missing).as_slice(),
        [TypeErrorKind::NonConformance { method, .. }] if *method == interner.intern("describe")
    ));
}

/// `fn show<T: Shows>(v: T) -> string { return v.describe(); }`
fn push_show(b: &mut AstBuilder<'_>) -> vela_ir::ExprId {
    let t = b.ty("T");
    let v = b.param("v", t);
    let v_ref = b.ident("v");
    let call = b.method_call(v_ref, "describe", Vec::new());
    let ret = b.ret(Some(call));
    let string = b.ty("string");
    let mut show = b.function("show", vec![v], Some(string), vec![ret]);
    let shows = b.ty("Shows");
    show.generics = vec![b.generic_param("T", vec![shows])];
    b.push_item(Item::Function(show));
    call
}

#[test]
fn constrained_receivers_call_requirements() {
    let interner = StringInterner::new();
    let (out, inner) = check(&interner, |b| {
        push_shows(b, true);
        let inner = push_show(b);
        let one = b.int(1);
        let ty = b.ty("Point");
        let point = b.struct_lit(ty, vec![("x", one)]);
        let call = b.call("show", vec![(Some("v"), point)]);
        let stmt = b.expr_stmt(call);
        push_main(b, vec![stmt]);
        inner
    });

    assert_eq!(kinds(&out), Vec::<&TypeErrorKind>::new());
    assert_eq!(out.typed.expr_type(inner), Idx::STRING);
    assert_eq!(
        out.typed.call(inner).unwrap().kind,
        CallKind::ConstrainedMethod {
            name: interner.intern("describe")
        }
    );
}

#[test]
fn unmet_constraint_rejects_the_call() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        push_shows(b, true);
        push_show(b);
        let five = b.int(5);
        let call = b.call("show", vec![(Some("v"), five)]);
        let stmt = b.expr_stmt(call);
        push_main(b, vec![stmt]);
    });

    assert!(matches!(
        kinds(&out).as_slice(),
        [TypeErrorKind::NonConformance {
            candidate: Idx::INT,
            ..
        }]
    ));
}

// === Mutability and places ===

#[test]
fn immutable_bindings_reject_assignment() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let one = b.int(1);
        let x = b.let_("x", None, Some(one));
        let target = b.ident("x");
        let two = b.int(2);
        let assign_x = b.assign(target, two);

        let one = b.int(1);
        let y = b.let_mut("y", None, Some(one));
        let target = b.ident("y");
        let two = b.int(2);
        let assign_y = b.assign(target, two);
        push_main(b, vec![x, assign_x, y, assign_y]);
    });

    assert_eq!(
        kinds(&out),
        vec![&TypeErrorKind::AssignToImmutable {
            name: interner.intern("x")
        }]
    );
}

#[test]
fn mutating_methods_need_a_mutable_receiver() {
    let interner = StringInterner::new();
    let build = |b: &mut AstBuilder<'_>, mutable: bool| {
        // self.n = self.n + 1
        let self_ref = b.ident("self");
        let target = b.member(self_ref, "n");
        let self_ref = b.ident("self");
        let n = b.member(self_ref, "n");
        let one = b.int(1);
        let sum = b.binary(BinaryOp::Add, n, one);
        let assign = b.assign(target, sum);
        let bump = b.method("bump", Receiver::Mutating, Vec::new(), None, vec![assign]);
        let int = b.ty("int");
        let n = b.field("n", int);
        let counter = b.struct_decl("Counter", Vec::new(), vec![n], vec![bump]);
        b.push_item(Item::Struct(counter));

        let zero = b.int(0);
        let ty = b.ty("Counter");
        let lit = b.struct_lit(ty, vec![("n", zero)]);
        let c = if mutable {
            b.let_mut("c", None, Some(lit))
        } else {
            b.let_("c", None, Some(lit))
        };
        let c_ref = b.ident("c");
        let call = b.method_call(c_ref, "bump", Vec::new());
        let stmt = b.expr_stmt(call);
        push_main(b, vec![c, stmt]);
    };

    let (ok, ()) = check(&interner, |b| build(b, true));
    assert_eq!(kinds(&ok), Vec::<&TypeErrorKind>::new());

    let (frozen, ()) = check(&interner, |b| build(b, false));
    assert_eq!(
        kinds(&frozen),
        vec![&TypeErrorKind::AssignToImmutable {
            name: interner.intern("c")
        }]
    );
}

#[test]
fn pointers_write_through_dereference() {
    let interner = StringInterner::new();
    let (mut out, p) = check(&interner, |b| {
        let one = b.int(1);
        let x = b.let_mut("x", None, Some(one));
        let x_ref = b.ident("x");
        let addr = b.unary(UnaryOp::AddressOf, x_ref);
        let p = b.let_("p", None, Some(addr));
        let p_ref = b.ident("p");
        let deref = b.unary(UnaryOp::Deref, p_ref);
        let three = b.int(3);
        let store = b.assign(deref, three);
        push_main(b, vec![x, p, store]);
        p
    });

    assert_eq!(kinds(&out), Vec::<&TypeErrorKind>::new());
    let ptr_int = out.pool.pointer(Idx::INT);
    assert_eq!(out.typed.local_type(p), Some(ptr_int));
}

#[test]
fn literals_have_no_address() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let five = b.int(5);
        let addr = b.unary(UnaryOp::AddressOf, five);
        let p = b.let_("p", None, Some(addr));
        push_main(b, vec![p]);
    });

    assert!(matches!(
        kinds(&out).as_slice(),
        [TypeErrorKind::InvalidOperand { op: "&", .. }]
    ));
}

// === Functions and constants ===

#[test]
fn every_path_must_return_a_value() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let int = b.ty("int");
        let empty = b.function("empty", Vec::new(), Some(int), Vec::new());
        b.push_item(Item::Function(empty));

        let boolean = b.ty("bool");
        let c = b.param("c", boolean);
        let cond = b.ident("c");
        let one = b.int(1);
        let then_ret = b.ret(Some(one));
        let two = b.int(2);
        let else_ret = b.ret(Some(two));
        let branch = b.if_(cond, vec![then_ret], Some(vec![else_ret]));
        let int = b.ty("int");
        let both = b.function("both", vec![c], Some(int), vec![branch]);
        b.push_item(Item::Function(both));
    });

    assert_eq!(
        kinds(&out),
        vec![&TypeErrorKind::Mismatch {
            expected: Idx::INT,
            found: Idx::VOID
        }]
    );
}

#[test]
fn constants_take_their_annotation() {
    let interner = StringInterner::new();
    let (out, limit) = check(&interner, |b| {
        let i16_ty = b.ty("i16");
        let ten = b.int(10);
        let c = b.const_decl("LIMIT", Some(i16_ty), ten);
        b.push_item(Item::Const(c));

        let value = b.ident("LIMIT");
        let limit = b.let_("limit", None, Some(value));
        push_main(b, vec![limit]);
        limit
    });

    assert!(!out.has_errors());
    assert_eq!(out.typed.local_type(limit), Some(Idx::I16));
}

#[test]
fn constants_must_be_literals() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let one = b.int(1);
        let two = b.int(2);
        let sum = b.binary(BinaryOp::Add, one, two);
        let c = b.const_decl("SUM", None, sum);
        b.push_item(Item::Const(c));
    });

    assert_eq!(
        kinds(&out),
        vec![&TypeErrorKind::ConstNotLiteral {
            name: interner.intern("SUM")
        }]
    );
}

#[test]
fn unknown_names_are_reported() {
    let interner = StringInterner::new();
    let (out, ()) = check(&interner, |b| {
        let foo = b.ty("Foo");
        let one = b.int(1);
        let a = b.let_("a", Some(foo), Some(one));
        let missing = b.ident("missing");
        let c = b.let_("c", None, Some(missing));
        push_main(b, vec![a, c]);
    });

    let found = kinds(&out);
    assert!(matches!(found[0], TypeErrorKind::UnknownType { .. }));
    assert!(found
        .iter()
        .any(|k| matches!(k, TypeErrorKind::UnresolvedIdentifier { .. })));
}

#[test]
fn alias_cycles_abort_checking() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let to_b = b.ty("B");
    let a = b.alias_decl("A", to_b, Vec::new());
    let to_a = b.ty("A");
    let bb = b.alias_decl("B", to_a, Vec::new());
    b.push_item(Item::Alias(a));
    b.push_item(Item::Alias(bb));
    let (module, arena) = b.finish();

    assert!(check_module(&module, &arena, &interner, &CheckConfig::default()).is_err());
}
