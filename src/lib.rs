// Main library entry point
// The actual engine is provided by the member crates:
// - message: the Part/Batch data model
// - gate: batching policy, processors, check expressions, scheduling

pub mod config;
pub mod logging;

pub use gate::{Batcher, PolicyConfig, PolicyError, ProcessorConfig, Registries};
pub use message::{Batch, Part};
