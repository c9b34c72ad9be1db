use std::fmt;

/// Runtime identity of a node inside its owning [`Document`](crate::Document).
///
/// Keys are minted by the document when a node is attached and are never
/// written to the persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u64);

impl NodeKey {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(NodeKey::from_raw(5).to_string(), "k5");
    }

    #[test]
    fn test_ordering_follows_allocation() {
        assert!(NodeKey::from_raw(1) < NodeKey::from_raw(2));
    }
}
