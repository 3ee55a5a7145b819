//! Portable Vela compiler driver.
//!
//! Runs the middle tier of the compiler over an already parsed module:
//! type checking, then lowering to LIR. No filesystem access and no
//! incremental state; the input comes in as an AST and everything the caller
//! needs comes out in a [`CompileOutput`].
//!
//! # Architecture
//!
//! ```text
//! vela_ir, vela_diagnostic, vela_types, vela_lir
//!                    ↓
//!              vela_compiler  ← this crate
//! ```

mod output;
mod pipeline;

pub use output::{CompileOutput, ErrorPhase};
pub use pipeline::{compile_module, CompileConfig};

use std::sync::Once;

use vela_diagnostic::{ColorMode, Diagnostic, DiagnosticEmitter, Severity, TerminalEmitter};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for compiler debug output.
///
/// Reads the filter from `VELA_LOG`, falling back to `RUST_LOG`; does
/// nothing when neither is set. Safe to call more than once.
/// Enable with e.g. `VELA_LOG=vela_lir=debug` or `VELA_LOG=vela_types=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let directives = std::env::var("VELA_LOG").or_else(|_| std::env::var("RUST_LOG"));
        if let Ok(directives) = directives {
            let filter = EnvFilter::new(directives);
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Render diagnostics to a string, with spans shown as `path:line:col`
/// against `source`, followed by an error count summary.
pub fn render_diagnostics(
    source: &str,
    file_path: &str,
    diagnostics: &[Diagnostic],
    color: ColorMode,
) -> String {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), color, false)
        .with_source(file_path, source);
    emitter.emit_all(diagnostics);
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    emitter.emit_summary(errors, warnings);
    String::from_utf8_lossy(&emitter.into_inner()).into_owned()
}

#[cfg(test)]
mod tests;
