use bytes::Bytes;
use std::collections::HashMap;

/// A single message: an opaque payload plus string metadata.
///
/// Parts are created by inputs and only replaced (never mutated in place)
/// by processors, so cloning one is cheap: the payload is a shared
/// [`Bytes`] handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Part {
    payload: Bytes,
    metadata: HashMap<String, String>,
}

impl Part {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            metadata: HashMap::new(),
        }
    }

    /// Builder-style metadata attachment.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Replace the payload, keeping metadata.
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.metadata
    }

    /// Encoded byte length of this part, as counted by size-based triggers.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_length_matches_bytes() {
        let part = Part::new("foo bar");
        assert_eq!(part.len(), 7);
        assert!(!part.is_empty());
        assert_eq!(part.payload().as_ref(), b"foo bar");
    }

    #[test]
    fn empty_part() {
        let part = Part::new(Bytes::new());
        assert_eq!(part.len(), 0);
        assert!(part.is_empty());
    }

    #[test]
    fn metadata_round_trip() {
        let mut part = Part::new("x").with_metadata("topic", "orders");
        assert_eq!(part.metadata().get("topic").map(String::as_str), Some("orders"));
        part.metadata_mut().insert("key".to_string(), "1".to_string());
        assert_eq!(part.metadata().len(), 2);
    }

    #[test]
    fn set_payload_keeps_metadata() {
        let mut part = Part::new("old").with_metadata("k", "v");
        part.set_payload("new value");
        assert_eq!(part.payload().as_ref(), b"new value");
        assert_eq!(part.metadata().get("k").map(String::as_str), Some("v"));
    }
}
