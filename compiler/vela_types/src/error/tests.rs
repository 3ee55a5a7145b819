use pretty_assertions::assert_eq;
use vela_diagnostic::Label;

use super::*;

#[test]
fn mismatch_renders_type_names() {
    let pool = Pool::new();
    let interner = StringInterner::new();
    let err = TypeCheckError::mismatch(Span::new(3, 7), Idx::INT, Idx::STRING);

    let diag = err.to_diagnostic(&pool, &interner);
    assert_eq!(diag.code, ErrorCode::E2001);
    assert_eq!(diag.message, "type mismatch: expected `int`, found `string`");
    assert_eq!(
        diag.labels,
        vec![Label::primary(Span::new(3, 7), "type mismatch here")]
    );
}

#[test]
fn previous_declaration_becomes_a_secondary_label() {
    let pool = Pool::new();
    let interner = StringInterner::new();
    let err = TypeCheckError::new(
        Span::new(20, 30),
        TypeErrorKind::DuplicateOverload {
            name: interner.intern("f"),
        },
    )
    .with_previous(Span::new(0, 10));

    let diag = err.to_diagnostic(&pool, &interner);
    assert_eq!(diag.code, ErrorCode::E2005);
    assert_eq!(
        diag.labels,
        vec![
            Label::primary(Span::new(20, 30), "redeclared here"),
            Label::secondary(Span::new(0, 10), "previously declared here"),
        ]
    );
}

#[test]
fn unresolved_call_lists_argument_types() {
    let mut pool = Pool::new();
    let interner = StringInterner::new();
    let ptr = pool.pointer(Idx::I8);
    let err = TypeCheckError::new(
        Span::new(0, 4),
        TypeErrorKind::UnresolvedCall {
            name: interner.intern("ping"),
            arg_types: vec![Idx::INT, ptr],
        },
    )
    .with_note("closest candidate takes 2 arguments");

    let diag = err.to_diagnostic(&pool, &interner);
    assert_eq!(diag.code, ErrorCode::E2006);
    assert_eq!(diag.message, "no overload of `ping` accepts arguments (int, *i8)");
    assert_eq!(diag.notes, vec!["closest candidate takes 2 arguments".to_string()]);
}

#[test]
fn every_user_error_is_in_the_type_range() {
    let interner = StringInterner::new();
    let n = interner.intern("x");
    let kinds = vec![
        TypeErrorKind::UnknownType { name: n },
        TypeErrorKind::Redeclaration { name: n },
        TypeErrorKind::DuplicateOverload { name: n },
        TypeErrorKind::AmbiguousCall {
            name: n,
            candidates: 2,
        },
        TypeErrorKind::InvalidAssignTarget,
        TypeErrorKind::InvalidOperand {
            op: "-",
            ty: Idx::BOOL,
        },
    ];
    for kind in kinds {
        let code = TypeCheckError::new(Span::DUMMY, kind).code();
        assert!(code.as_str().starts_with("E2"), "{code}");
    }
}

#[test]
fn internal_errors_use_internal_codes() {
    let err = InternalError::UnboundTypeParameter {
        param: Idx::from_raw(40),
    };
    assert_eq!(err.code(), ErrorCode::E9001);
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E9001);
    assert!(diag.message.starts_with("internal compiler error: type parameter Idx(40)"));

    let limit = InternalError::ResolutionLimitExceeded {
        ty: Idx::from_raw(33),
        limit: 64,
    };
    assert_eq!(limit.to_string(), "resolution of Idx(33) did not settle within 64 steps");
}
