use super::{Processor, ProcessorError};
use bytes::{BufMut, Bytes, BytesMut};
use message::{Batch, Part};
use serde::{Deserialize, Serialize};

/// Formats the archive processor can collapse a batch into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    /// Payloads joined with a single newline byte, no trailing newline.
    Lines,
    /// Each payload parsed as JSON and collected into a JSON array.
    JsonArray,
    /// Length-delimited framing: big-endian u32 payload length, then the
    /// payload bytes, repeated per part.
    Binary,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    pub format: ArchiveFormat,
}

/// Collapses the N parts of a batch into a single part whose payload
/// encodes all originals. The archived part keeps the first part's
/// metadata.
#[derive(Debug)]
pub struct ArchiveProcessor {
    format: ArchiveFormat,
}

impl ArchiveProcessor {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            format: config.format,
        }
    }

    fn archive(&self, parts: &[Part]) -> Result<Bytes, ProcessorError> {
        match self.format {
            ArchiveFormat::Lines => {
                let mut joined = BytesMut::new();
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        joined.put_u8(b'\n');
                    }
                    joined.extend_from_slice(part.payload());
                }
                Ok(joined.freeze())
            }
            ArchiveFormat::JsonArray => {
                let mut values = Vec::with_capacity(parts.len());
                for part in parts {
                    let value: serde_json::Value = serde_json::from_slice(part.payload())?;
                    values.push(value);
                }
                let encoded = serde_json::to_vec(&serde_json::Value::Array(values))?;
                Ok(Bytes::from(encoded))
            }
            ArchiveFormat::Binary => {
                let mut framed = BytesMut::new();
                for part in parts {
                    framed.put_u32(part.len() as u32);
                    framed.extend_from_slice(part.payload());
                }
                Ok(framed.freeze())
            }
        }
    }
}

impl Processor for ArchiveProcessor {
    fn name(&self) -> &'static str {
        "archive"
    }

    fn process(&self, batch: Batch) -> Result<Vec<Batch>, ProcessorError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let payload = self.archive(batch.parts())?;
        let mut archived = Part::new(payload);
        *archived.metadata_mut() = batch.parts()[0].metadata().clone();
        Ok(vec![Batch::from_parts(vec![archived])])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(payloads: &[&'static str]) -> Batch {
        payloads.iter().map(|p| Part::new(*p)).collect()
    }

    #[test]
    fn lines_joins_without_trailing_newline() {
        let processor = ArchiveProcessor::new(&ArchiveConfig {
            format: ArchiveFormat::Lines,
        });
        let out = processor.process(batch(&["foo", "bar"])).expect("process");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 1);
        assert_eq!(out[0].parts()[0].payload().as_ref(), b"foo\nbar");
    }

    #[test]
    fn lines_single_part_is_unchanged() {
        let processor = ArchiveProcessor::new(&ArchiveConfig {
            format: ArchiveFormat::Lines,
        });
        let out = processor.process(batch(&["solo"])).expect("process");
        assert_eq!(out[0].parts()[0].payload().as_ref(), b"solo");
    }

    #[test]
    fn archived_part_keeps_first_metadata() {
        let processor = ArchiveProcessor::new(&ArchiveConfig {
            format: ArchiveFormat::Lines,
        });
        let input = Batch::from_parts(vec![
            Part::new("a").with_metadata("origin", "first"),
            Part::new("b").with_metadata("origin", "second"),
        ]);
        let out = processor.process(input).expect("process");
        assert_eq!(
            out[0].parts()[0].metadata().get("origin").map(String::as_str),
            Some("first")
        );
    }

    #[test]
    fn json_array_collects_payloads() {
        let processor = ArchiveProcessor::new(&ArchiveConfig {
            format: ArchiveFormat::JsonArray,
        });
        let out = processor
            .process(batch(&[r#"{"a":1}"#, r#"{"b":2}"#]))
            .expect("process");
        assert_eq!(out[0].parts()[0].payload().as_ref(), br#"[{"a":1},{"b":2}]"#);
    }

    #[test]
    fn json_array_rejects_non_json_payload() {
        let processor = ArchiveProcessor::new(&ArchiveConfig {
            format: ArchiveFormat::JsonArray,
        });
        let err = processor.process(batch(&["not json"])).unwrap_err();
        assert!(matches!(err, ProcessorError::MalformedJson(_)));
    }

    #[test]
    fn binary_frames_each_part() {
        let processor = ArchiveProcessor::new(&ArchiveConfig {
            format: ArchiveFormat::Binary,
        });
        let out = processor.process(batch(&["ab", "c"])).expect("process");
        let expected: &[u8] = &[0, 0, 0, 2, b'a', b'b', 0, 0, 0, 1, b'c'];
        assert_eq!(out[0].parts()[0].payload().as_ref(), expected);
    }

    #[test]
    fn empty_batch_produces_nothing() {
        let processor = ArchiveProcessor::new(&ArchiveConfig {
            format: ArchiveFormat::Lines,
        });
        assert!(processor.process(Batch::new()).expect("process").is_empty());
    }
}
