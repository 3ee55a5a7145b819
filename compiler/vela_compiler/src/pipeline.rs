//! Compilation pipeline: check → lower.
//!
//! Lowering runs only on a module with no user errors; an error anywhere
//! short-circuits with the diagnostics of the phase that produced it.

use vela_ir::{ExprArena, Module, StringInterner};
use vela_lir::LowerConfig;
use vela_types::CheckConfig;

use crate::output::{CompileOutput, ErrorPhase};

/// Configuration for a compilation run.
#[derive(Clone, Debug, Default)]
pub struct CompileConfig {
    pub check: CheckConfig,
    pub lower: LowerConfig,
}

/// Type check `module` and lower it to LIR.
#[tracing::instrument(level = "debug", skip_all, fields(items = module.items.len()))]
pub fn compile_module(
    module: &Module,
    arena: &ExprArena,
    interner: &StringInterner,
    config: &CompileConfig,
) -> CompileOutput {
    // Type check
    let mut checked = match vela_types::check_module(module, arena, interner, &config.check) {
        Ok(checked) => checked,
        Err(err) => {
            tracing::debug!(%err, "checking aborted");
            return CompileOutput::failed(ErrorPhase::Internal, vec![err.to_diagnostic()], None);
        }
    };
    if checked.has_errors() {
        let diagnostics = checked
            .errors
            .iter()
            .map(|err| err.to_diagnostic(&checked.pool, interner))
            .collect();
        tracing::debug!(errors = checked.errors.len(), "skipping lowering");
        return CompileOutput::failed(ErrorPhase::TypeCheck, diagnostics, Some(checked.pool));
    }

    // Lower
    match vela_lir::lower_module(module, arena, interner, &mut checked, &config.lower) {
        Ok(lir) => CompileOutput {
            diagnostics: Vec::new(),
            lir: Some(lir),
            pool: Some(checked.pool),
            error_phase: None,
        },
        Err(err) => {
            tracing::debug!(%err, "lowering aborted");
            let diagnostic = err.to_diagnostic(&checked.pool, interner);
            CompileOutput::failed(ErrorPhase::Internal, vec![diagnostic], Some(checked.pool))
        }
    }
}
