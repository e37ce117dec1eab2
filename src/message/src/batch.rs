use crate::Part;
use bytes::Bytes;

/// An ordered sequence of [`Part`]s traveling together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    parts: Vec<Part>,
}

impl Batch {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// A batch is empty iff it holds zero parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn push(&mut self, part: Part) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Part> {
        self.parts.iter()
    }

    /// Sum of the payload lengths of all parts.
    pub fn byte_total(&self) -> usize {
        self.parts.iter().map(Part::len).sum()
    }

    /// The payloads of all parts, in insertion order.
    pub fn all_bytes(&self) -> Vec<Bytes> {
        self.parts.iter().map(|p| p.payload().clone()).collect()
    }
}

impl FromIterator<Part> for Batch {
    fn from_iter<I: IntoIterator<Item = Part>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Batch {
    type Item = Part;
    type IntoIter = std::vec::IntoIter<Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}
