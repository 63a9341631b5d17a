//! Dotted property paths: `<nodeOrNamespace>.<component>.<name>`.
//!
//! The first segment is a node name, or a `#`-prefixed namespace such as
//! `#Session`. Node names never contain dots; component and property names
//! may not either, so splitting on the first two dots is unambiguous.

use crate::id::NodeId;
use std::fmt;

/// Namespace holding per-session UI state.
pub const SESSION: &str = "#Session";

/// Component holding the session manager's per-node UI state.
pub const SM_STATE: &str = "sm_state";

pub const SORT_KEY: &str = "sortKey";
pub const SORT_KEY_PARENT: &str = "sortKeyParent";
pub const EXPAND_STATE: &str = "expandState";
pub const EXPANDED_SUB_STATE: &str = "expandedSubState";
pub const TOOL_TIP: &str = "toolTip";
pub const TAB: &str = "tab";
pub const COMPONENT_HASH: &str = "componentHash";
pub const COMPONENT_OF_NODE: &str = "componentOfNode";
pub const COMPONENT_SUB_TYPE: &str = "componentSubType";
pub const COMPONENT_FOLDER_OF_NODE: &str = "componentFolderOfNode";

/// A parsed property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    pub owner: String,
    pub component: String,
    pub name: String,
}

impl PropertyPath {
    pub fn new(owner: &str, component: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            component: component.to_string(),
            name: name.to_string(),
        }
    }

    /// Path of a property on a node.
    pub fn of(node: NodeId, component: &str, name: &str) -> Self {
        Self::new(node.as_str(), component, name)
    }

    /// Split a dotted path. Returns `None` for fewer than three segments.
    pub fn parse(path: &str) -> Option<Self> {
        let mut parts = path.splitn(3, '.');
        let owner = parts.next()?;
        let component = parts.next()?;
        let name = parts.next()?;
        if owner.is_empty() || component.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(owner, component, name))
    }

    /// Owning node, if the path is not namespaced.
    pub fn node(&self) -> Option<NodeId> {
        if self.owner.starts_with('#') {
            None
        } else {
            Some(NodeId::intern(&self.owner))
        }
    }

    pub fn is(&self, component: &str, name: &str) -> bool {
        self.component == component && self.name == name
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.owner, self.component, self.name)
    }
}

/// `<node>.sm_state.<name>`
pub fn sm_state(node: NodeId, name: &str) -> String {
    format!("{node}.{SM_STATE}.{name}")
}

/// `<node>.ui.name`
pub fn ui_name(node: NodeId) -> String {
    format!("{node}.ui.name")
}

/// `<source>.request.imageComponent`
pub fn image_component_request(source: NodeId) -> String {
    format!("{source}.request.imageComponent")
}

/// `#Session.sm_view.<CATEGORY>`: expansion flag of a category row.
pub fn category_expanded(label: &str) -> String {
    format!("{SESSION}.sm_view.{label}")
}

/// `<node>.transform.<name>` on a 2D transform node.
pub fn transform(node: NodeId, name: &str) -> String {
    format!("{node}.transform.{name}")
}

/// `<node>.tag.<name>`
pub fn tag(node: NodeId, name: &str) -> String {
    format!("{node}.tag.{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_node_path() {
        let p = PropertyPath::parse("sourceGroup1.ui.name").unwrap();
        assert_eq!(p.owner, "sourceGroup1");
        assert!(p.is("ui", "name"));
        assert_eq!(p.node(), Some(NodeId::intern("sourceGroup1")));
    }

    #[test]
    fn parse_namespace_path() {
        let p = PropertyPath::parse("#Session.sm_view.FOLDERS").unwrap();
        assert_eq!(p.node(), None);
        assert_eq!(p.to_string(), "#Session.sm_view.FOLDERS");
    }

    #[test]
    fn parse_rejects_short_paths() {
        assert!(PropertyPath::parse("node.ui").is_none());
        assert!(PropertyPath::parse("node..name").is_none());
        assert!(PropertyPath::parse("").is_none());
    }

    #[test]
    fn builders() {
        let n = NodeId::intern("stack1");
        assert_eq!(sm_state(n, SORT_KEY), "stack1.sm_state.sortKey");
        assert_eq!(ui_name(n), "stack1.ui.name");
        assert_eq!(transform(n, "scale"), "stack1.transform.scale");
        assert_eq!(category_expanded("SOURCES"), "#Session.sm_view.SOURCES");
    }
}
