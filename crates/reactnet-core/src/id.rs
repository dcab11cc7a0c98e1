use serde::{Deserialize, Serialize};

/// Identifies a stream connecting two units of the network. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamId(pub u32);

/// Identifies a keyword rule inside its grammar (declaration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeywordId(pub u16);

/// Index of a species in the thermodynamic model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesIndex(pub usize);

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl TryFrom<i64> for StreamId {
    type Error = std::num::TryFromIntError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(StreamId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_id_equality() {
        let a = StreamId(0);
        let b = StreamId(0);
        let c = StreamId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn stream_id_from_negative_fails() {
        assert!(StreamId::try_from(-1i64).is_err());
        assert_eq!(StreamId::try_from(7i64).unwrap(), StreamId(7));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(StreamId(0), "feed");
        map.insert(StreamId(1), "product");
        assert_eq!(map[&StreamId(0)], "feed");
    }
}
