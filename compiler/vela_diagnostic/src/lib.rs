//! Diagnostic system for Vela.
//!
//! Every user-facing problem becomes a [`Diagnostic`]: an [`ErrorCode`] for
//! searchability, a message saying what went wrong, and labeled spans saying
//! where. Internal compiler errors use the E9xxx range so tooling can tell
//! them apart from mistakes in the program being compiled.

mod diagnostic;
pub mod emitter;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
pub use error_code::ErrorCode;
