//! Lowering from checked Vela to LIR.
//!
//! - [`lower_module`]: checked module in, [`LirModule`] out. Generic
//!   functions are specialized for every argument list reachable from the
//!   module's non-generic code.
//! - [`LayoutTable`]: composite layouts of every struct and enum type the
//!   lowered code mentions, tagged unions included.
//! - [`CallGraph`]: direct calls and function references between lowered
//!   functions.
//!
//! Lowering runs only on modules without type errors. Every [`LowerError`]
//! is a compiler defect.

mod call_graph;
mod config;
mod error;
mod ir;
mod layout;
mod lower;

pub use call_graph::CallGraph;
pub use config::LowerConfig;
pub use error::LowerError;
pub use ir::{
    Block, BlockId, Function, GenericFunction, Instr, LirModule, Param, TempId, Terminator, Value,
};
pub use layout::{basic_size, Composite, GenericType, LayoutTable, Member, TypeLayout, VariantLayout};
pub use lower::lower_module;

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{BlockId, TempId};
    const _: () = assert!(std::mem::size_of::<TempId>() == 4);
    const _: () = assert!(std::mem::size_of::<BlockId>() == 4);
}
