//! Per-value row index shared by query execution and subscription matching.
//!
//! Nothing here locks. The owning table has to serialize every mutation of a
//! column's index together with the row change it reflects.

pub mod column;
pub mod tag;

pub use column::ColumnIndex;
pub use tag::{TagId, TagIter, Tags};
