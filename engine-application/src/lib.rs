// Engine Application Layer

pub mod commands;
pub mod metrics;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use commands::*;
pub use metrics::Metrics;
pub use state::EngineState;
