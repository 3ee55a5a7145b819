//! Public entry point for module-level type checking.

use vela_ir::{ExprArena, Module, StringInterner};

use super::ModuleChecker;
use crate::{CheckConfig, CheckOutput, InternalError};

/// Type check a module.
///
/// User errors are collected in [`CheckOutput::errors`]; checking always
/// covers the whole module. An internal compiler error aborts checking and
/// is returned as `Err`.
#[tracing::instrument(level = "debug", skip_all, fields(items = module.items.len()))]
pub fn check_module(
    module: &Module,
    arena: &ExprArena,
    interner: &StringInterner,
    config: &CheckConfig,
) -> Result<CheckOutput, InternalError> {
    let mut checker = ModuleChecker::new(arena, interner, config);

    checker.register_basic_types();
    checker.register_types(module);
    checker.resolve_type_bodies(module);
    if checker.internal.is_some() {
        return checker.finish();
    }

    checker.collect_signatures(module);
    checker.check_pending_conformance();
    if checker.internal.is_some() {
        return checker.finish();
    }

    checker.check_bodies(module);

    tracing::debug!(
        errors = checker.errors.len(),
        functions = checker.typed.functions.len(),
        "check complete"
    );
    checker.finish()
}
