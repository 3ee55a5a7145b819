//! Checker configuration.

/// Limits applied while checking one module.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CheckConfig {
    /// Maximum alias/specialization unwinding steps in `resolve_canonical`,
    /// and maximum nesting depth of one instantiation request.
    pub resolution_limit: usize,
}

impl CheckConfig {
    pub const DEFAULT_RESOLUTION_LIMIT: usize = 64;
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            resolution_limit: Self::DEFAULT_RESOLUTION_LIMIT,
        }
    }
}
