//! Result types for the compiler pipeline.

use vela_diagnostic::Diagnostic;
use vela_lir::LirModule;
use vela_types::Pool;

/// Which phase stopped the compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPhase {
    /// User errors found by the type checker.
    TypeCheck,
    /// A compiler defect in checking or lowering.
    Internal,
}

/// Result of compiling one module.
#[derive(Debug)]
pub struct CompileOutput {
    /// Diagnostics from the phase that failed; empty on success.
    pub diagnostics: Vec<Diagnostic>,
    /// The lowered module, present only when every phase succeeded.
    pub lir: Option<LirModule>,
    /// Types referenced by `lir`. Present whenever checking got far enough
    /// to build one, including when it reported user errors.
    pub pool: Option<Pool>,
    pub error_phase: Option<ErrorPhase>,
}

impl CompileOutput {
    pub fn success(&self) -> bool {
        self.error_phase.is_none()
    }

    pub(crate) fn failed(
        phase: ErrorPhase,
        diagnostics: Vec<Diagnostic>,
        pool: Option<Pool>,
    ) -> Self {
        CompileOutput {
            diagnostics,
            lir: None,
            pool,
            error_phase: Some(phase),
        }
    }
}
