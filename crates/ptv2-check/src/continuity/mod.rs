//! Route continuity verification.
//!
//! A PTv2 route lists its ways in travel order. Two consecutive ways are
//! connected when their [`ConnectorSet`]s share a node; every consecutive pair
//! that shares none is a gap. Node order inside a way is irrelevant and no
//! travel direction is inferred for the route as a whole.

pub mod connectors;
pub mod gaps;
pub mod members;

pub use connectors::ConnectorSet;
pub use gaps::{find_gaps, gap_positions, is_connected, GapPosition};
pub use members::{path_segments, MemberObject};
