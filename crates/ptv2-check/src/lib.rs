//! # ptv2-check
//!
//! Continuity checks for OpenStreetMap public transport routes tagged with the
//! PTv2 scheme.
//!
//! A route relation lists the ways a vehicle travels along, in order. This
//! crate counts the places where two consecutive ways do not touch. Ways are
//! compared without regard to their drawing direction, and roundabouts
//! (`junction=roundabout` on a closed way) connect at any of their nodes.
//!
//! ## Example
//!
//! ```
//! use ptv2_check::prelude::*;
//!
//! let nodes = |ids: &[i64]| ids.iter().copied().map(NodeId).collect::<Vec<_>>();
//! let approach = PathSegment::new(WayId(1), nodes(&[1, 2, 3, 4]), false).unwrap();
//! let roundabout = PathSegment::new(WayId(2), nodes(&[4, 5, 6, 7, 4]), true).unwrap();
//! let exit = PathSegment::new(WayId(3), nodes(&[7, 8, 9]), false).unwrap();
//!
//! let relation = RouteRelation::new(
//!     RelationId(1),
//!     vec![
//!         Member::node(100, "platform"),
//!         Member::way(1, ""),
//!         Member::way(2, ""),
//!         Member::way(3, ""),
//!     ],
//!     Tags::new(),
//! );
//! let resolved = vec![
//!     Some(MemberObject::Point(ElementRef::Node(NodeId(100)))),
//!     Some(MemberObject::Segment(&approach)),
//!     Some(MemberObject::Segment(&roundabout)),
//!     Some(MemberObject::Segment(&exit)),
//! ];
//!
//! assert_eq!(find_gaps(&relation, &resolved), 0);
//! ```

pub mod check;
pub mod continuity;
pub mod identifiers;
pub mod models;
pub mod resolve;

// Re-exports for convenience
pub mod prelude {
    pub use crate::check::RouteCheck;
    pub use crate::continuity::{
        find_gaps, gap_positions, is_connected, path_segments, ConnectorSet, GapPosition,
        MemberObject,
    };
    pub use crate::identifiers::*;
    pub use crate::models::*;
    pub use crate::resolve::{missing_members, resolve_member, resolve_members, ElementSource};
}

pub use prelude::*;
