use super::{Processor, ProcessorError};
use crate::check::{CheckContext, CheckEvaluator, CheckFuncRegistry};
use message::Batch;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    pub check: String,
}

/// Keeps only the parts satisfying a check expression, evaluated per
/// part with that part as the one under examination. Evaluation errors
/// drop the part.
#[derive(Debug)]
pub struct FilterProcessor {
    check: CheckEvaluator,
}

impl FilterProcessor {
    pub fn new(config: &FilterConfig, funcs: &CheckFuncRegistry) -> Result<Self, ProcessorError> {
        if config.check.is_empty() {
            return Err(ProcessorError::InvalidConfig(
                "filter requires a non-empty `check` expression".to_string(),
            ));
        }
        let check = CheckEvaluator::compile(&config.check, funcs).map_err(|err| {
            ProcessorError::InvalidConfig(format!("filter check failed to compile: {err}"))
        })?;
        Ok(Self { check })
    }
}

impl Processor for FilterProcessor {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn process(&self, batch: Batch) -> Result<Vec<Batch>, ProcessorError> {
        let parts = batch.into_parts();
        let mut keep = Vec::with_capacity(parts.len());
        for index in 0..parts.len() {
            let ctx = CheckContext::new(&parts, index);
            match self.check.test(&ctx) {
                Ok(hit) => keep.push(hit),
                Err(err) => {
                    tracing::warn!(
                        check = self.check.source(),
                        error = %err,
                        "filter check evaluation failed, dropping part"
                    );
                    keep.push(false);
                }
            }
        }
        let mut iter = keep.into_iter();
        let retained: Vec<_> = parts.into_iter().filter(|_| iter.next().unwrap_or(false)).collect();
        if retained.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Batch::from_parts(retained)])
    }
}
