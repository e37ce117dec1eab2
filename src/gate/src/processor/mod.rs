//! Flush-time batch transformations.
//!
//! A processor takes one batch and returns zero or more batches; the
//! policy flattens whatever comes back. Processors run in declared order
//! at the moment a batch is flushed.

mod archive;
mod filter;
mod registry;
mod replace;
mod split;

pub use archive::{ArchiveConfig, ArchiveFormat, ArchiveProcessor};
pub use filter::{FilterConfig, FilterProcessor};
pub use registry::ProcessorRegistry;
pub use replace::{ReplaceConfig, ReplaceProcessor};
pub use split::SplitProcessor;

use message::Batch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for processor construction and execution.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("unknown processor kind `{0}`")]
    UnknownKind(String),
    #[error("invalid processor config: {0}")]
    InvalidConfig(String),
    #[error("{processor}: {message}")]
    Processing {
        processor: &'static str,
        message: String,
    },
    #[error("archive: malformed json payload: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

/// A transformation applied to a batch at flush time.
pub trait Processor: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Transform a batch into zero or more batches. Parts within each
    /// returned batch keep their relative order.
    fn process(&self, batch: Batch) -> Result<Vec<Batch>, ProcessorError>;

    /// Release any resources held by the processor. Called once when the
    /// owning policy closes.
    fn close(&mut self) {}
}

/// Declarative processor configuration: a `type` discriminator plus the
/// matching variant's fields. Serialization omits inactive arms.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessorConfig {
    Archive(ArchiveConfig),
    Split,
    Replace(ReplaceConfig),
    Filter(FilterConfig),
}

impl ProcessorConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessorConfig::Archive(_) => "archive",
            ProcessorConfig::Split => "split",
            ProcessorConfig::Replace(_) => "replace",
            ProcessorConfig::Filter(_) => "filter",
        }
    }
}
