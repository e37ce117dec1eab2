use super::{Processor, ProcessorError};
use message::Batch;

/// Splits a batch into one single-part batch per part. Flattened back by
/// the policy this preserves payload order, so splitting a single-part
/// batch is a no-op.
#[derive(Debug)]
pub struct SplitProcessor;

impl Processor for SplitProcessor {
    fn name(&self) -> &'static str {
        "split"
    }

    fn process(&self, batch: Batch) -> Result<Vec<Batch>, ProcessorError> {
        Ok(batch
            .into_iter()
            .map(|part| Batch::from_parts(vec![part]))
            .collect())
    }
}
