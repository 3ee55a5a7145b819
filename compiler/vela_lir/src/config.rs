//! Lowering configuration.

use vela_types::CheckConfig;

/// Limits applied while lowering one module.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LowerConfig {
    /// Maximum chain of specializations requested from inside other
    /// specializations (`f<T>` calling `f<Pair<T>>` calling ...).
    pub instantiation_depth_limit: usize,
    /// Step bound for alias and specialization unwinding while lowering.
    pub resolution_limit: usize,
}

impl LowerConfig {
    pub const DEFAULT_INSTANTIATION_DEPTH_LIMIT: usize = 64;

    pub(crate) fn check_config(&self) -> CheckConfig {
        CheckConfig {
            resolution_limit: self.resolution_limit,
        }
    }
}

impl Default for LowerConfig {
    fn default() -> Self {
        LowerConfig {
            instantiation_depth_limit: Self::DEFAULT_INSTANTIATION_DEPTH_LIMIT,
            resolution_limit: CheckConfig::DEFAULT_RESOLUTION_LIMIT,
        }
    }
}
