//! Decision pipeline: window → trend → evaluate → liquidate.

pub mod cycle;
pub mod evaluator;
pub mod executor;
pub mod trend;
pub mod window;
