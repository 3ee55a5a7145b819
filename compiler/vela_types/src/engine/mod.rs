//! The type engine: canonical resolution, validation, conformance and
//! instantiation over one [`Pool`].
//!
//! The engine borrows the pool mutably (instantiation interns new
//! specializations) and the scope arena immutably (member lookup during
//! conformance). The checker builds a short-lived engine for each query;
//! the LIR builder holds one for a whole function.

mod conform;
mod infer;
mod instantiate;
mod members;
mod resolve;
mod shape;
mod validate;

pub use infer::default_literal;
pub use members::MethodLookup;
pub use resolve::Canonical;

use crate::{CheckConfig, Pool, Scopes};

pub struct TypeEngine<'a> {
    pool: &'a mut Pool,
    scopes: &'a Scopes,
    limit: usize,
}

impl<'a> TypeEngine<'a> {
    pub fn new(pool: &'a mut Pool, scopes: &'a Scopes, config: &CheckConfig) -> Self {
        TypeEngine {
            pool,
            scopes,
            limit: config.resolution_limit,
        }
    }

    pub fn pool(&self) -> &Pool {
        self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool {
        self.pool
    }

    pub fn scopes(&self) -> &Scopes {
        self.scopes
    }

    /// Step bound shared by alias unwinding and nested instantiation.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests;
