#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use vela_diagnostic::{ColorMode, ErrorCode};
use vela_ir::{AstBuilder, Item, StmtId, StringInterner};
use vela_lir::{LowerConfig, Member, TypeLayout};
use vela_types::Idx;

use crate::{compile_module, render_diagnostics, CompileConfig, CompileOutput, ErrorPhase};

fn compile_with<T>(
    interner: &StringInterner,
    config: &CompileConfig,
    build: impl FnOnce(&mut AstBuilder<'_>) -> T,
) -> (CompileOutput, T) {
    let mut b = AstBuilder::new(interner);
    let extra = build(&mut b);
    let (module, arena) = b.finish();
    (compile_module(&module, &arena, interner, config), extra)
}

fn compile<T>(
    interner: &StringInterner,
    build: impl FnOnce(&mut AstBuilder<'_>) -> T,
) -> (CompileOutput, T) {
    compile_with(interner, &CompileConfig::default(), build)
}

fn push_main(b: &mut AstBuilder<'_>, body: Vec<StmtId>) {
    let main = b.function("main", Vec::new(), None, body);
    b.push_item(Item::Function(main));
}

/// `ping(station: int, frequency: double)` and a `main` calling it with
/// only `station`.
fn push_bad_ping(b: &mut AstBuilder<'_>) {
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
}

// compile_module

#[test]
fn pair_of_ints_compiles_to_a_sixteen_byte_composite() {
    let interner = StringInterner::new();
    let (output, pair) = compile(&interner, |b| {
        let t = b.ty("T");
        let first = b.field("first", t);
        let t = b.ty("T");
        let second = b.field("second", t);
        let generics = vec![b.generic_param("T", Vec::new())];
        let decl = b.struct_decl("Pair", generics, vec![first, second], Vec::new());
        let id = decl.id;
        b.push_item(Item::Struct(decl));

        let one = b.int(1);
        let two = b.int(2);
        let ty = b.ty("Pair");
        let lit = b.struct_lit(ty, vec![("first", one), ("second", two)]);
        let p = b.let_("p", None, Some(lit));
        push_main(b, vec![p]);
        id
    });

    assert!(
        output.success(),
        "expected success, got phase={:?}, diagnostics={:?}",
        output.error_phase,
        output.diagnostics
    );
    assert!(output.diagnostics.is_empty());
    let lir = output.lir.as_ref().unwrap();
    let mut pool = output.pool.unwrap();
    let pair = pool.declared(pair).unwrap();
    let pair_int = pool.specialize(pair, vec![Idx::INT]);

    let layout = lir.layouts.get(pair_int).unwrap();
    assert_eq!(
        layout.base().members,
        vec![Member::Type(Idx::INT), Member::Type(Idx::INT)]
    );
    assert_eq!(layout.size(), 16);
    assert!(lir.layouts.generic(pair).is_some());
}

#[test]
fn optional_byte_variants_share_the_base_size() {
    let interner = StringInterner::new();
    let (output, opt) = compile(&interner, |b| {
        let none = b.variant("None", Vec::new());
        let t = b.ty("T");
        let some = b.tuple_variant("Some", vec![t]);
        let generics = vec![b.generic_param("T", Vec::new())];
        let decl = b.enum_decl("Opt", generics, vec![none, some], Vec::new());
        let id = decl.id;
        b.push_item(Item::Enum(decl));

        let i8_ty = b.ty("i8");
        let ann = b.generic_ty("Opt", vec![i8_ty]);
        let seven = b.int(7);
        let opt_ty = b.ty("Opt");
        let callee = b.type_member(opt_ty, "Some");
        let construct = b.call_expr(callee, Vec::new(), vec![(None, seven)]);
        let a = b.let_("a", Some(ann), Some(construct));
        push_main(b, vec![a]);
        id
    });

    assert!(output.success(), "{:?}", output.diagnostics);
    let lir = output.lir.as_ref().unwrap();
    let mut pool = output.pool.unwrap();
    let opt = pool.declared(opt).unwrap();
    let opt_i8 = pool.specialize(opt, vec![Idx::I8]);

    let Some(TypeLayout::Enum { base, variants }) = lir.layouts.get(opt_i8) else {
        panic!("Opt<i8> should be laid out as a tagged union");
    };
    assert_eq!(base.members, vec![Member::Type(Idx::BYTE), Member::Padding(1)]);
    assert_eq!(base.size, 2);
    assert_eq!(variants[0], None);
    let some = variants[1].as_ref().unwrap();
    assert_eq!(
        some.composite.members,
        vec![Member::Type(Idx::BYTE), Member::Type(Idx::I8)]
    );
    assert_eq!(some.composite.size, base.size);
}

#[test]
fn unresolved_call_stops_before_lowering() {
    let interner = StringInterner::new();
    let (output, ()) = compile(&interner, push_bad_ping);

    assert!(!output.success());
    assert_eq!(output.error_phase, Some(ErrorPhase::TypeCheck));
    assert!(output.lir.is_none());
    assert!(output.pool.is_some());
    let codes: Vec<ErrorCode> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2006]);
    assert_eq!(
        output.diagnostics[0].message,
        "no overload of `ping` accepts arguments (int)"
    );
}

#[test]
fn oversized_discriminant_never_reaches_lowering() {
    let interner = StringInterner::new();
    let (output, ()) = compile(&interner, |b| {
        let mut a = b.variant("A", Vec::new());
        a.discriminant = Some(300);
        let int = b.ty("int");
        let p = b.tuple_variant("P", vec![int]);
        let big = b.enum_decl("Big", Vec::new(), vec![a, p], Vec::new());
        b.push_item(Item::Enum(big));

        let ty = b.ty("Big");
        let member = b.type_member(ty, "A");
        let x = b.let_("x", None, Some(member));
        push_main(b, vec![x]);
    });

    assert_eq!(output.error_phase, Some(ErrorPhase::TypeCheck));
    assert!(output.lir.is_none());
    let codes: Vec<ErrorCode> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2021, ErrorCode::E2021]);
}

#[test]
fn lowering_defects_report_the_internal_phase() {
    let interner = StringInterner::new();
    let config = CompileConfig {
        lower: LowerConfig {
            instantiation_depth_limit: 0,
            ..LowerConfig::default()
        },
        ..CompileConfig::default()
    };
    let (output, ()) = compile_with(&interner, &config, |b| {
        let t = b.ty("T");
        let a = b.unlabeled_param("a", t);
        let a_ref = b.ident("a");
        let ret = b.ret(Some(a_ref));
        let result = b.ty("T");
        let mut id = b.function("id", vec![a], Some(result), vec![ret]);
        id.generics = vec![b.generic_param("T", Vec::new())];
        b.push_item(Item::Function(id));

        let one = b.int(1);
        let call = b.call("id", vec![(None, one)]);
        let stmt = b.expr_stmt(call);
        push_main(b, vec![stmt]);
    });

    assert_eq!(output.error_phase, Some(ErrorPhase::Internal));
    assert!(output.lir.is_none());
    assert_eq!(output.diagnostics.len(), 1);
    let diag = &output.diagnostics[0];
    assert_eq!(diag.code, ErrorCode::E9002);
    assert!(diag.message.starts_with("internal compiler error"));
}

#[test]
fn successful_compile_exposes_the_call_graph() {
    let interner = StringInterner::new();
    let (output, ()) = compile(&interner, |b| {
        let helper = b.function("helper", Vec::new(), None, Vec::new());
        b.push_item(Item::Function(helper));
        let call = b.call("helper", Vec::new());
        let stmt = b.expr_stmt(call);
        push_main(b, vec![stmt]);
    });

    assert!(output.success(), "{:?}", output.diagnostics);
    let lir = output.lir.unwrap();
    let nested: Vec<&str> = lir
        .nested_functions(interner.intern("main"))
        .into_iter()
        .map(|n| interner.lookup(n))
        .collect();
    assert_eq!(nested, vec!["helper"]);
}

#[test]
fn empty_module_compiles_to_empty_lir() {
    let interner = StringInterner::new();
    let (output, ()) = compile(&interner, |_| {});

    assert!(output.success());
    let lir = output.lir.unwrap();
    assert!(lir.functions.is_empty());
    assert!(lir.layouts.is_empty());
}

// render_diagnostics

#[test]
fn render_shows_code_message_and_location() {
    let interner = StringInterner::new();
    let (output, ()) = compile(&interner, push_bad_ping);

    let rendered = render_diagnostics("", "main.vela", &output.diagnostics, ColorMode::Never);
    assert!(
        rendered.starts_with("error[E2006]: no overload of `ping` accepts arguments (int)\n"),
        "{rendered}"
    );
    assert!(rendered.contains("--> main.vela:1:1: no matching overload"), "{rendered}");
    assert!(rendered.ends_with("\nerror: aborting due to previous error\n"), "{rendered}");
}

#[test]
fn render_points_back_at_the_earlier_overload() {
    let interner = StringInterner::new();
    let (output, ()) = compile(&interner, |b| {
        for _ in 0..2 {
            let int = b.ty("int");
            let x = b.param("x", int);
            let f = b.function("f", vec![x], None, Vec::new());
            b.push_item(Item::Function(f));
        }
    });

    let rendered = render_diagnostics("", "main.vela", &output.diagnostics, ColorMode::Never);
    assert!(rendered.starts_with("error[E2005]: "), "{rendered}");
    assert!(rendered.contains(": previously declared here\n"), "{rendered}");
}

#[test]
fn render_empty_diagnostics_is_empty() {
    let rendered = render_diagnostics("", "main.vela", &[], ColorMode::Never);
    assert!(rendered.is_empty());
}

#[test]
fn init_tracing_is_idempotent() {
    crate::init_tracing();
    crate::init_tracing();
}
