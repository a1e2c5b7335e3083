//! Relation, member and segment models.

pub mod segment;
pub mod types;

pub use segment::*;
pub use types::*;
