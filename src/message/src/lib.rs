//! Message data model shared by the batching engine and its callers.

mod batch;
mod part;

pub use batch::Batch;
pub use part::Part;
