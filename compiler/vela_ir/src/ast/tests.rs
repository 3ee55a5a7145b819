use pretty_assertions::assert_eq;

use super::*;
use crate::StringInterner;

#[test]
fn builder_hands_out_distinct_spans() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let one = b.int(1);
    let two = b.int(2);

    let arena = b.arena();
    assert_ne!(arena.expr(one).span, arena.expr(two).span);
}

#[test]
fn call_records_labels_in_order() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let four = b.int(4);
    let yes = b.bool(true);
    let call = b.call("ping", vec![(Some("station"), four), (None, yes)]);

    let (_, arena) = b.finish();
    let ExprKind::Call { callee, args, .. } = &arena.expr(call).kind else {
        panic!("expected a call");
    };
    assert_eq!(arena.expr(*callee).kind, ExprKind::Ident(interner.intern("ping")));
    assert_eq!(args.len(), 2);
    assert_eq!(args[0].label, Some(interner.intern("station")));
    assert_eq!(args[0].value, four);
    assert_eq!(args[1].label, None);
}

#[test]
fn method_call_is_call_on_member() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let base = b.ident("point");
    let call = b.method_call(base, "length", Vec::new());

    let arena = b.arena();
    let ExprKind::Call { callee, .. } = &arena.expr(call).kind else {
        panic!("expected a call");
    };
    assert_eq!(
        arena.expr(*callee).kind,
        ExprKind::Member {
            base,
            name: interner.intern("length"),
        }
    );
}

#[test]
fn tuple_variant_fields_are_positional() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let t = b.ty("T");
    let bool_ty = b.ty("bool");
    let variant = b.tuple_variant("Some", vec![t, bool_ty]);

    let names: Vec<_> = variant
        .fields
        .iter()
        .map(|f| interner.lookup(f.name))
        .collect();
    assert_eq!(names, vec!["_0", "_1"]);
}

#[test]
fn declarations_get_fresh_ids() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let t = b.generic_param("T", Vec::new());
    let ft = b.ty("T");
    let field = b.field("value", ft);
    let decl = b.struct_decl("Box", vec![t.clone()], vec![field], Vec::new());
    let f = b.function("main", Vec::new(), None, Vec::new());

    assert_ne!(t.id, decl.id);
    assert_ne!(decl.id, f.id);
}

#[test]
fn finish_keeps_item_order() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let first = b.function("first", Vec::new(), None, Vec::new());
    let target = b.ty("int");
    let second = b.alias_decl("Count", target, Vec::new());
    b.push_item(Item::Function(first));
    b.push_item(Item::Alias(second));

    let (module, _) = b.finish();
    assert!(matches!(module.items[0], Item::Function(_)));
    assert!(matches!(module.items[1], Item::Alias(_)));
}

#[test]
fn if_builds_both_blocks() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let cond = b.bool(true);
    let one = b.int(1);
    let then_stmt = b.expr_stmt(one);
    let ret = b.ret(None);
    let stmt = b.if_(cond, vec![then_stmt], Some(vec![ret]));

    let arena = b.arena();
    let StmtKind::If {
        then_block,
        else_block,
        ..
    } = &arena.stmt(stmt).kind
    else {
        panic!("expected an if");
    };
    assert_eq!(then_block.stmts, vec![then_stmt]);
    assert_eq!(else_block.as_ref().map(|b| b.stmts.clone()), Some(vec![ret]));
}

#[test]
fn binary_op_classification() {
    assert!(BinaryOp::Add.is_arithmetic());
    assert!(BinaryOp::Lt.is_comparison());
    assert!(BinaryOp::And.is_logical());
    assert!(BinaryOp::Shl.is_bitwise());
    assert!(!BinaryOp::Eq.is_arithmetic());
    assert_eq!(BinaryOp::NotEq.to_string(), "!=");
}

#[test]
fn float_literal_round_trips_bits() {
    let lit = Literal::float(2.5);
    assert_eq!(lit.as_f64(), Some(2.5));
    assert_eq!(Literal::Int(3).as_f64(), None);
}

#[test]
fn parsed_type_head_name() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let int = b.ty("int");
    let pair = b.generic_ty("Pair", vec![int.clone()]);
    let ptr = b.ptr_ty(int);

    assert_eq!(pair.head_name(), Some(interner.intern("Pair")));
    assert_eq!(ptr.head_name(), None);
}
