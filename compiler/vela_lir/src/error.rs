//! Lowering failures.
//!
//! Lowering only runs on modules the checker accepted, so every failure here
//! is a compiler defect: an annotation the checker should never have left
//! behind, or a type whose layout cannot exist. None of them is recoverable.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::StringInterner;
use vela_types::{Idx, InternalError, Pool};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    /// A literal marker, placeholder or unresolved type reached lowering.
    #[error("unresolved type {ty:?} reached lowering")]
    UnresolvedType { ty: Idx },
    /// Member access or variant construction on a type without a composite.
    #[error("type {ty:?} has no composite layout")]
    MissingLayout { ty: Idx },
    /// A struct or enum containing itself by value.
    #[error("type {ty:?} contains itself by value")]
    RecursiveLayout { ty: Idx },
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl LowerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LowerError::UnresolvedType { .. } => ErrorCode::E3001,
            LowerError::MissingLayout { .. } | LowerError::RecursiveLayout { .. } => {
                ErrorCode::E3002
            }
            LowerError::Internal(err) => err.code(),
        }
    }

    /// Render with type names resolved through `pool`.
    pub fn to_diagnostic(&self, pool: &Pool, interner: &StringInterner) -> Diagnostic {
        let message = match self {
            LowerError::Internal(err) => return err.to_diagnostic(),
            LowerError::UnresolvedType { ty } => format!(
                "unresolved type `{}` reached lowering",
                pool.format_type(*ty, interner)
            ),
            LowerError::MissingLayout { ty } => format!(
                "type `{}` has no composite layout",
                pool.format_type(*ty, interner)
            ),
            LowerError::RecursiveLayout { ty } => format!(
                "type `{}` contains itself by value and has no finite size",
                pool.format_type(*ty, interner)
            ),
        };
        Diagnostic::error(self.code())
            .with_message(format!("internal compiler error: {message}"))
            .with_note("this is a bug in the compiler, not in the program being compiled")
    }
}

impl From<vela_types::TypeProblem> for LowerError {
    fn from(problem: vela_types::TypeProblem) -> Self {
        LowerError::Internal(problem.into_internal())
    }
}
