//! Type checking errors.
//!
//! Two families:
//! - [`TypeCheckError`]: a mistake in the program. Accumulated, never aborts
//!   checking, rendered as an E2xxx [`Diagnostic`].
//! - [`InternalError`]: a broken invariant inside the compiler. Propagated
//!   with `?` and fails the whole compilation with an E9xxx diagnostic.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::{Name, Span, StringInterner};

use crate::{Idx, Pool};

/// A compiler defect detected while checking or lowering.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    #[error("type parameter {param:?} has no binding in the substitution")]
    UnboundTypeParameter { param: Idx },
    #[error("resolution of {ty:?} did not settle within {limit} steps")]
    ResolutionLimitExceeded { ty: Idx, limit: usize },
    #[error("alias {alias:?} resolves to itself")]
    CyclicAlias { alias: Idx },
    #[error("inconsistent checker annotation: {detail}")]
    InconsistentAnnotation { detail: String },
}

impl InternalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            InternalError::UnboundTypeParameter { .. } => ErrorCode::E9001,
            InternalError::ResolutionLimitExceeded { .. } => ErrorCode::E9002,
            InternalError::CyclicAlias { .. } => ErrorCode::E9003,
            InternalError::InconsistentAnnotation { .. } => ErrorCode::E9004,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(format!("internal compiler error: {self}"))
            .with_note("this is a bug in the compiler, not in the program being compiled")
    }
}

/// Why a `validate` or conformance query failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeProblem {
    Mismatch {
        expected: Idx,
        found: Idx,
    },
    NonConformance {
        candidate: Idx,
        standard: Idx,
        method: Name,
    },
    Internal(InternalError),
}

impl TypeProblem {
    /// For queries on types the checker already accepted: any failure
    /// means its annotations disagree with the pool.
    pub fn into_internal(self) -> InternalError {
        match self {
            TypeProblem::Internal(err) => err,
            other => InternalError::InconsistentAnnotation {
                detail: format!("{other:?}"),
            },
        }
    }
}

impl From<InternalError> for TypeProblem {
    fn from(err: InternalError) -> Self {
        TypeProblem::Internal(err)
    }
}

/// What went wrong in the program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeErrorKind {
    Mismatch {
        expected: Idx,
        found: Idx,
    },
    UnknownType {
        name: Name,
    },
    UnresolvedIdentifier {
        name: Name,
    },
    Redeclaration {
        name: Name,
    },
    DuplicateOverload {
        name: Name,
    },
    UnresolvedCall {
        name: Name,
        arg_types: Vec<Idx>,
    },
    AmbiguousCall {
        name: Name,
        candidates: usize,
    },
    NonConformance {
        candidate: Idx,
        standard: Idx,
        method: Name,
    },
    UnknownField {
        ty: Idx,
        field: Name,
    },
    UnknownMember {
        ty: Idx,
        member: Name,
    },
    GenericArityMismatch {
        name: Name,
        expected: usize,
        found: usize,
    },
    BareGenericReference {
        name: Name,
    },
    NotCallable {
        ty: Idx,
    },
    MissingTypeAnnotation {
        name: Name,
    },
    AssignToImmutable {
        name: Name,
    },
    InvalidAssignTarget,
    CannotInferTypeArgument {
        name: Name,
        param: Name,
    },
    MissingField {
        ty: Idx,
        field: Name,
    },
    InvalidOperand {
        op: &'static str,
        ty: Idx,
    },
    ConstNotLiteral {
        name: Name,
    },
    DiscriminantOutOfRange {
        variant: Name,
        value: i64,
    },
}

/// A user-facing type error at a source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeCheckError {
    pub span: Span,
    pub kind: TypeErrorKind,
    /// Extra context rendered as notes.
    pub notes: Vec<String>,
    /// Where the conflicting earlier declaration is.
    pub previous: Option<Span>,
}

impl TypeCheckError {
    pub fn new(span: Span, kind: TypeErrorKind) -> Self {
        TypeCheckError {
            span,
            kind,
            notes: Vec::new(),
            previous: None,
        }
    }

    pub fn mismatch(span: Span, expected: Idx, found: Idx) -> Self {
        Self::new(span, TypeErrorKind::Mismatch { expected, found })
    }

    #[must_use]
    pub fn with_previous(mut self, span: Span) -> Self {
        self.previous = Some(span);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        match &self.kind {
            TypeErrorKind::Mismatch { .. } => ErrorCode::E2001,
            TypeErrorKind::UnknownType { .. } => ErrorCode::E2002,
            TypeErrorKind::UnresolvedIdentifier { .. } => ErrorCode::E2003,
            TypeErrorKind::Redeclaration { .. } => ErrorCode::E2004,
            TypeErrorKind::DuplicateOverload { .. } => ErrorCode::E2005,
            TypeErrorKind::UnresolvedCall { .. } => ErrorCode::E2006,
            TypeErrorKind::AmbiguousCall { .. } => ErrorCode::E2007,
            TypeErrorKind::NonConformance { .. } => ErrorCode::E2008,
            TypeErrorKind::UnknownField { .. } => ErrorCode::E2009,
            TypeErrorKind::UnknownMember { .. } => ErrorCode::E2010,
            TypeErrorKind::GenericArityMismatch { .. } => ErrorCode::E2011,
            TypeErrorKind::BareGenericReference { .. } => ErrorCode::E2012,
            TypeErrorKind::NotCallable { .. } => ErrorCode::E2013,
            TypeErrorKind::MissingTypeAnnotation { .. } => ErrorCode::E2014,
            TypeErrorKind::AssignToImmutable { .. } => ErrorCode::E2015,
            TypeErrorKind::InvalidAssignTarget => ErrorCode::E2016,
            TypeErrorKind::CannotInferTypeArgument { .. } => ErrorCode::E2017,
            TypeErrorKind::MissingField { .. } => ErrorCode::E2018,
            TypeErrorKind::InvalidOperand { .. } => ErrorCode::E2019,
            TypeErrorKind::ConstNotLiteral { .. } => ErrorCode::E2020,
            TypeErrorKind::DiscriminantOutOfRange { .. } => ErrorCode::E2021,
        }
    }

    /// Render the message with type names resolved through `pool`.
    pub fn message(&self, pool: &Pool, interner: &StringInterner) -> String {
        let ty = |idx: Idx| pool.format_type(idx, interner);
        let name = |n: Name| interner.lookup(n);
        match &self.kind {
            TypeErrorKind::Mismatch { expected, found } => format!(
                "type mismatch: expected `{}`, found `{}`",
                ty(*expected),
                ty(*found)
            ),
            TypeErrorKind::UnknownType { name: n } => format!("unknown type `{}`", name(*n)),
            TypeErrorKind::UnresolvedIdentifier { name: n } => {
                format!("cannot find `{}` in this scope", name(*n))
            }
            TypeErrorKind::Redeclaration { name: n } => {
                format!("`{}` is already declared in this scope", name(*n))
            }
            TypeErrorKind::DuplicateOverload { name: n } => format!(
                "an overload of `{}` with the same parameters and labels already exists",
                name(*n)
            ),
            TypeErrorKind::UnresolvedCall { name: n, arg_types } => {
                let args: Vec<String> = arg_types.iter().map(|a| ty(*a)).collect();
                format!(
                    "no overload of `{}` accepts arguments ({})",
                    name(*n),
                    args.join(", ")
                )
            }
            TypeErrorKind::AmbiguousCall {
                name: n,
                candidates,
            } => format!(
                "call to `{}` is ambiguous: {candidates} overloads match",
                name(*n)
            ),
            TypeErrorKind::NonConformance {
                candidate,
                standard,
                method,
            } => format!(
                "`{}` does not conform to `{}`: method `{}` is missing or has a different signature",
                ty(*candidate),
                ty(*standard),
                name(*method)
            ),
            TypeErrorKind::UnknownField { ty: t, field } => {
                format!("`{}` has no field `{}`", ty(*t), name(*field))
            }
            TypeErrorKind::UnknownMember { ty: t, member } => {
                format!("`{}` has no member `{}`", ty(*t), name(*member))
            }
            TypeErrorKind::GenericArityMismatch {
                name: n,
                expected,
                found,
            } => format!(
                "`{}` takes {expected} generic argument(s) but {found} were given",
                name(*n)
            ),
            TypeErrorKind::BareGenericReference { name: n } => format!(
                "generic type `{}` must be given type arguments here",
                name(*n)
            ),
            TypeErrorKind::NotCallable { ty: t } => {
                format!("expression of type `{}` cannot be called", ty(*t))
            }
            TypeErrorKind::MissingTypeAnnotation { name: n } => {
                format!("cannot determine the type of `{}`", name(*n))
            }
            TypeErrorKind::AssignToImmutable { name: n } => {
                format!("cannot assign to immutable binding `{}`", name(*n))
            }
            TypeErrorKind::InvalidAssignTarget => "invalid assignment target".to_string(),
            TypeErrorKind::CannotInferTypeArgument { name: n, param } => format!(
                "cannot infer generic argument `{}` of `{}`",
                name(*param),
                name(*n)
            ),
            TypeErrorKind::MissingField { ty: t, field } => format!(
                "missing field `{}` in literal of `{}`",
                name(*field),
                ty(*t)
            ),
            TypeErrorKind::InvalidOperand { op, ty: t } => {
                format!("operator `{op}` cannot be applied to `{}`", ty(*t))
            }
            TypeErrorKind::ConstNotLiteral { name: n } => {
                format!("initializer of constant `{}` must be a literal", name(*n))
            }
            TypeErrorKind::DiscriminantOutOfRange { variant, value } => format!(
                "discriminant {value} of variant `{}` does not fit in a byte (0..=255)",
                name(*variant)
            ),
        }
    }

    pub fn to_diagnostic(&self, pool: &Pool, interner: &StringInterner) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code())
            .with_message(self.message(pool, interner))
            .with_label(self.span, self.label());
        if let Some(previous) = self.previous {
            diag = diag.with_secondary_label(previous, "previously declared here");
        }
        for note in &self.notes {
            diag = diag.with_note(note.clone());
        }
        diag
    }

    fn label(&self) -> &'static str {
        match &self.kind {
            TypeErrorKind::Mismatch { .. } => "type mismatch here",
            TypeErrorKind::UnknownType { .. } => "not a known type",
            TypeErrorKind::UnresolvedIdentifier { .. } => "not found in this scope",
            TypeErrorKind::Redeclaration { .. } | TypeErrorKind::DuplicateOverload { .. } => {
                "redeclared here"
            }
            TypeErrorKind::UnresolvedCall { .. } => "no matching overload",
            TypeErrorKind::AmbiguousCall { .. } => "ambiguous call",
            TypeErrorKind::NonConformance { .. } => "conformance required here",
            TypeErrorKind::UnknownField { .. } | TypeErrorKind::UnknownMember { .. } => {
                "unknown member"
            }
            TypeErrorKind::GenericArityMismatch { .. } => "wrong number of generic arguments",
            TypeErrorKind::BareGenericReference { .. } => "type arguments required",
            TypeErrorKind::NotCallable { .. } => "not a function",
            TypeErrorKind::MissingTypeAnnotation { .. } => "type annotation needed",
            TypeErrorKind::AssignToImmutable { .. } => "cannot assign",
            TypeErrorKind::InvalidAssignTarget => "cannot be assigned to",
            TypeErrorKind::CannotInferTypeArgument { .. } => "cannot infer",
            TypeErrorKind::MissingField { .. } => "missing field",
            TypeErrorKind::InvalidOperand { .. } => "invalid operand",
            TypeErrorKind::ConstNotLiteral { .. } => "not a literal",
            TypeErrorKind::DiscriminantOutOfRange { .. } => "discriminant out of range",
        }
    }
}

#[cfg(test)]
mod tests;
