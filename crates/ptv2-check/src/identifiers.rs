//! Typed identifiers for OSM elements.
//!
//! OSM ids are plain 64-bit integers in every element table, so a node id and a
//! way id with the same value refer to unrelated objects. The newtypes keep
//! them apart at compile time and format without any shared buffer.

use std::fmt;

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub i64);

        impl $name {
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

impl_identifier!(NodeId);
impl_identifier!(WayId);
impl_identifier!(RelationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        assert_eq!(NodeId::new(7), NodeId::from(7));
        assert_ne!(NodeId::new(7), NodeId::new(8));
    }

    #[test]
    fn test_identifier_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(WayId::new(42), "way");

        assert_eq!(map.get(&WayId::new(42)), Some(&"way"));
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(NodeId::new(1234567890123).to_string(), "1234567890123");
        assert_eq!(format!("{}", RelationId::new(-5)), "-5");
    }
}
