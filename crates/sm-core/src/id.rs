use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for graph node names.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An interned graph node name.
///
/// Nodes are owned by the host graph; the session manager only ever refers to
/// them by name. Interning keeps the name `Copy` and makes equality O(1), which
/// matters because tree rebuilds compare node names constantly.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a node name, or return the existing id if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to the node name.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique name with a prefix (e.g. `sourceGroup000001`).
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{prefix}{n:06}");
            if INTERNER.get(&candidate).is_none() {
                return Self::intern(&candidate);
            }
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("sourceGroup000001");
        let b = NodeId::intern("sourceGroup000001");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "sourceGroup000001");
    }

    #[test]
    fn names_outlive_their_ids() {
        let names: Vec<&'static str> = [Some(NodeId::intern("folderGroup000009")), None]
            .into_iter()
            .map(|p| p.map(|id| id.as_str()).unwrap_or(""))
            .collect();
        assert_eq!(names, vec!["folderGroup000009", ""]);
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = NodeId::with_prefix("folderGroup");
        let b = NodeId::with_prefix("folderGroup");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("folderGroup"));
    }

    #[test]
    fn prefixed_ids_skip_interned_names() {
        NodeId::intern("retimeGroup000001");
        NodeId::intern("retimeGroup000002");
        let fresh = NodeId::with_prefix("retimeGroup");
        assert_ne!(fresh.as_str(), "retimeGroup000001");
        assert_ne!(fresh.as_str(), "retimeGroup000002");
    }

    #[test]
    fn ordering_follows_names() {
        let mut ids = vec![NodeId::intern("b"), NodeId::intern("a"), NodeId::intern("c")];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
