//! Type system for Vela.
//!
//! - [`Pool`]/[`Idx`]: the type universe. Every type lives in one arena and
//!   is compared by handle.
//! - [`Scopes`]: lexical scopes and overload sets.
//! - [`TypeEngine`]: canonical resolution, validation, conformance and
//!   instantiation over a pool.
//! - [`check_module`]: the multi-pass checker producing a [`TypedModule`].
//!
//! User errors ([`TypeCheckError`]) are collected and never stop checking.
//! Compiler defects ([`InternalError`]) abort the module.

mod basic;
mod check;
mod config;
mod data;
mod engine;
mod error;
mod idx;
mod output;
mod pool;
mod scope;
mod subst;

pub use basic::BasicKind;
pub use check::check_module;
pub use config::CheckConfig;
pub use data::{
    AliasType, DefinedType, Field, FunctionSig, Standard, TypeData, TypeParam, Var, Variant,
};
pub use engine::{default_literal, Canonical, MethodLookup, TypeEngine};
pub use error::{InternalError, TypeCheckError, TypeErrorKind, TypeProblem};
pub use idx::Idx;
pub use output::{
    Binding, CallKind, CallResolution, CheckOutput, FunctionInfo, MemberResolution, TypedModule,
};
pub use pool::Pool;
pub use scope::{
    DefineError, FuncId, FunctionSymbol, LocalKind, OverloadKey, ParamShape, ScopeId, Scopes,
    Symbol, VarSymbol,
};
pub use subst::Substitution;

// Handles are copied everywhere; keep them small.
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{FuncId, ScopeId};
    const _: () = assert!(std::mem::size_of::<ScopeId>() == 4);
    const _: () = assert!(std::mem::size_of::<FuncId>() == 4);
}
