use super::{Processor, ProcessorError};
use bytes::Bytes;
use message::Batch;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceConfig {
    pub find: String,
    pub replace: String,
}

/// Rewrites every occurrence of `find` in each part's payload. One part
/// in, one part out; metadata is untouched.
#[derive(Debug)]
pub struct ReplaceProcessor {
    find: Vec<u8>,
    replace: Vec<u8>,
}

impl ReplaceProcessor {
    pub fn new(config: &ReplaceConfig) -> Result<Self, ProcessorError> {
        if config.find.is_empty() {
            return Err(ProcessorError::InvalidConfig(
                "replace requires a non-empty `find` pattern".to_string(),
            ));
        }
        Ok(Self {
            find: config.find.clone().into_bytes(),
            replace: config.replace.clone().into_bytes(),
        })
    }

    fn rewrite(&self, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(payload.len());
        let mut i = 0;
        while i < payload.len() {
            if payload[i..].starts_with(&self.find) {
                out.extend_from_slice(&self.replace);
                i += self.find.len();
            } else {
                out.push(payload[i]);
                i += 1;
            }
        }
        out
    }
}

impl Processor for ReplaceProcessor {
    fn name(&self) -> &'static str {
        "replace"
    }

    fn process(&self, batch: Batch) -> Result<Vec<Batch>, ProcessorError> {
        let mut parts = batch.into_parts();
        for part in &mut parts {
            if part.payload().windows(self.find.len()).any(|w| w == self.find) {
                let rewritten = self.rewrite(part.payload());
                part.set_payload(Bytes::from(rewritten));
            }
        }
        Ok(vec![Batch::from_parts(parts)])
    }
}
