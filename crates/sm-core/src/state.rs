//! Persisted ordering and expansion state of the session tree.
//!
//! All of it lives in `<node>.sm_state.*` properties on the graph nodes
//! themselves, so it travels with the session. Every accessor is best-effort:
//! a node deleted mid-operation or a property of the wrong type reads as the
//! default and writes are dropped.

use crate::facade::GraphFacade;
use crate::id::NodeId;
use crate::model::NodeType;
use crate::props::{self, *};

/// Sort key of a node that was never placed explicitly. Sorts last.
pub const UNDEFINED_SORT_KEY: i32 = i32::MAX - 100;

/// Sort key of category rows. Sorts after everything else in its tier.
pub const CATEGORY_SORT_KEY: i32 = i32::MAX;

/// Membership key of the top level.
pub const TOP_LEVEL: &str = "";

fn parent_key(parent: Option<NodeId>) -> &'static str {
    parent.map(|p| p.as_str()).unwrap_or(TOP_LEVEL)
}

// ─── Sort keys ───────────────────────────────────────────────────────────

/// Key of `node` among the children of `parent` (`None` = top level).
pub fn sort_key(graph: &dyn GraphFacade, node: NodeId, parent: Option<NodeId>) -> i32 {
    let parents_path = sm_state(node, SORT_KEY_PARENT);
    let keys_path = sm_state(node, SORT_KEY);
    if !graph.property_exists(&parents_path) || !graph.property_exists(&keys_path) {
        return UNDEFINED_SORT_KEY;
    }
    let (Ok(parents), Ok(keys)) = (
        graph.string_property(&parents_path),
        graph.int_property(&keys_path),
    ) else {
        return UNDEFINED_SORT_KEY;
    };
    if parents.len() != keys.len() {
        return UNDEFINED_SORT_KEY;
    }
    let parent = parent_key(parent);
    parents
        .iter()
        .position(|p| p == parent)
        .map(|i| keys[i])
        .unwrap_or(UNDEFINED_SORT_KEY)
}

/// Upsert the key of `node` under `parent`, keeping entries for other parents.
pub fn set_sort_key(graph: &mut dyn GraphFacade, node: NodeId, parent: Option<NodeId>, value: i32) {
    let parents_path = sm_state(node, SORT_KEY_PARENT);
    let keys_path = sm_state(node, SORT_KEY);
    let parent = parent_key(parent).to_string();

    if graph.property_exists(&parents_path)
        && graph.property_exists(&keys_path)
        && let (Ok(mut parents), Ok(mut keys)) = (
            graph.string_property(&parents_path),
            graph.int_property(&keys_path),
        )
    {
        if parents.len() == keys.len() {
            let result = match parents.iter().position(|p| *p == parent) {
                Some(i) => {
                    keys[i] = value;
                    graph.set_int_property(&keys_path, keys)
                }
                None => {
                    parents.push(parent);
                    keys.push(value);
                    graph
                        .set_string_property(&parents_path, parents)
                        .and_then(|()| graph.set_int_property(&keys_path, keys))
                }
            };
            if let Err(e) = result {
                log::debug!("sort key of {node}: {e}");
            }
            return;
        }
        log::warn!("sort key arrays of {node} out of step, resetting");
    }

    let result = graph
        .set_string_property(&parents_path, vec![parent])
        .and_then(|()| graph.set_int_property(&keys_path, vec![value]));
    if let Err(e) = result {
        log::debug!("sort key of {node}: {e}");
    }
}

// ─── Membership sets ─────────────────────────────────────────────────────

fn has_member(graph: &dyn GraphFacade, path: &str, key: &str) -> bool {
    if !graph.property_exists(path) {
        return false;
    }
    graph
        .string_property(path)
        .map(|members| members.iter().any(|m| m == key))
        .unwrap_or(false)
}

fn set_member(graph: &mut dyn GraphFacade, path: &str, key: &str, present: bool) {
    let members = if graph.property_exists(path) {
        match graph.string_property(path) {
            Ok(members) => Some(members),
            Err(e) => {
                log::debug!("{path}: {e}");
                return;
            }
        }
    } else {
        None
    };

    let result = match members {
        Some(mut members) => {
            let has = members.iter().any(|m| m == key);
            if has && !present {
                members.retain(|m| m != key);
                graph.set_string_property(path, members)
            } else if !has && present {
                members.push(key.to_string());
                graph.set_string_property(path, members)
            } else {
                Ok(())
            }
        }
        None if present => graph.set_string_property(path, vec![key.to_string()]),
        // Nothing to remove from a set that does not exist yet.
        None => Ok(()),
    };
    if let Err(e) = result {
        log::debug!("{path}: {e}");
    }
}

/// Is `node` shown expanded when listed under `parent`?
pub fn is_expanded_in_parent(graph: &dyn GraphFacade, node: NodeId, parent: Option<NodeId>) -> bool {
    has_member(graph, &sm_state(node, EXPAND_STATE), parent_key(parent))
}

pub fn set_expanded_in_parent(
    graph: &mut dyn GraphFacade,
    node: NodeId,
    parent: Option<NodeId>,
    expanded: bool,
) {
    set_member(
        graph,
        &sm_state(node, EXPAND_STATE),
        parent_key(parent),
        expanded,
    );
}

/// Is the sub-component with identity `hash` of `node` expanded?
pub fn is_sub_component_expanded(graph: &dyn GraphFacade, node: NodeId, hash: &str) -> bool {
    has_member(graph, &sm_state(node, EXPANDED_SUB_STATE), hash)
}

pub fn set_sub_component_expanded(
    graph: &mut dyn GraphFacade,
    node: NodeId,
    hash: &str,
    expanded: bool,
) {
    set_member(graph, &sm_state(node, EXPANDED_SUB_STATE), hash, expanded);
}

// ─── Categories ──────────────────────────────────────────────────────────

/// Expansion flag of a category row, created expanded on first read.
pub fn category_expanded(graph: &mut dyn GraphFacade, label: &str) -> bool {
    let path = props::category_expanded(label);
    if !graph.property_exists(&path)
        && let Err(e) = graph.set_int_property(&path, vec![1])
    {
        log::debug!("{path}: {e}");
        return true;
    }
    graph
        .int_property(&path)
        .ok()
        .and_then(|v| v.first().copied())
        .map(|v| v == 1)
        .unwrap_or(true)
}

pub fn set_category_expanded(graph: &mut dyn GraphFacade, label: &str, expanded: bool) {
    let path = props::category_expanded(label);
    if let Err(e) = graph.set_int_property(&path, vec![i32::from(expanded)]) {
        log::debug!("{path}: {e}");
    }
}

// ─── Tooltip and tab ─────────────────────────────────────────────────────

/// Tooltip of a node, with tabs flattened to spaces.
pub fn tool_tip(graph: &dyn GraphFacade, node: NodeId) -> Option<String> {
    let path = sm_state(node, TOOL_TIP);
    if !graph.property_exists(&path) {
        return None;
    }
    graph
        .first_string(&path)
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('\t', " "))
}

pub fn set_tool_tip(graph: &mut dyn GraphFacade, node: NodeId, text: &str) {
    if let Err(e) = graph.set_string_property(&sm_state(node, TOOL_TIP), vec![text.to_string()]) {
        log::debug!("tooltip of {node}: {e}");
    }
}

pub fn save_tab(graph: &mut dyn GraphFacade, node: NodeId, tab: i32) {
    if let Err(e) = graph.set_int_property(&sm_state(node, TAB), vec![tab]) {
        log::debug!("tab of {node}: {e}");
    }
}

/// Tab to show for `node`: the saved one, else the media tab for sources.
pub fn restore_tab(graph: &dyn GraphFacade, node: NodeId) -> Option<i32> {
    let path = sm_state(node, TAB);
    if graph.property_exists(&path) {
        return graph
            .int_property(&path)
            .ok()
            .and_then(|v| v.first().copied());
    }
    match graph.node_type(node) {
        Ok(NodeType::SourceGroup) => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;

    fn graph() -> (MemoryGraph, NodeId, NodeId) {
        let mut g = MemoryGraph::new();
        let n = g.add_node(NodeType::SourceGroup, "stateNode");
        let p = g.add_node(NodeType::FolderGroup, "stateFolder");
        (g, n, p)
    }

    #[test]
    fn sort_key_defaults_to_undefined() {
        let (g, n, p) = graph();
        assert_eq!(sort_key(&g, n, Some(p)), UNDEFINED_SORT_KEY);
        assert_eq!(UNDEFINED_SORT_KEY, 2_147_483_547);
    }

    #[test]
    fn sort_key_per_parent() {
        let (mut g, n, p) = graph();
        set_sort_key(&mut g, n, Some(p), 3);
        set_sort_key(&mut g, n, None, -7);
        set_sort_key(&mut g, n, Some(p), 4);
        assert_eq!(sort_key(&g, n, Some(p)), 4);
        assert_eq!(sort_key(&g, n, None), -7);
    }

    #[test]
    fn desynced_arrays_reset() {
        let (mut g, n, p) = graph();
        g.set_string_property(&sm_state(n, SORT_KEY_PARENT), vec!["a".into(), "b".into()])
            .unwrap();
        g.set_int_property(&sm_state(n, SORT_KEY), vec![1]).unwrap();
        assert_eq!(sort_key(&g, n, None), UNDEFINED_SORT_KEY);

        set_sort_key(&mut g, n, Some(p), 9);
        assert_eq!(
            g.string_property(&sm_state(n, SORT_KEY_PARENT)).unwrap(),
            vec!["stateFolder".to_string()]
        );
        assert_eq!(sort_key(&g, n, Some(p)), 9);
    }

    #[test]
    fn wrong_type_reads_default() {
        let (mut g, n, _) = graph();
        g.set_int_property(&sm_state(n, EXPAND_STATE), vec![1]).unwrap();
        assert!(!is_expanded_in_parent(&g, n, None));
        // writes are dropped, not panics
        set_expanded_in_parent(&mut g, n, None, true);
        assert!(!is_expanded_in_parent(&g, n, None));
    }

    #[test]
    fn missing_node_is_harmless() {
        let (mut g, _, _) = graph();
        let ghost = NodeId::intern("stateGhost");
        set_sort_key(&mut g, ghost, None, 1);
        assert_eq!(sort_key(&g, ghost, None), UNDEFINED_SORT_KEY);
        assert!(tool_tip(&g, ghost).is_none());
    }

    #[test]
    fn tooltip_flattens_tabs() {
        let (mut g, n, _) = graph();
        set_tool_tip(&mut g, n, "a\tb");
        assert_eq!(tool_tip(&g, n).as_deref(), Some("a b"));
    }

    #[test]
    fn category_flag_created_expanded() {
        let (mut g, _, _) = graph();
        assert!(category_expanded(&mut g, "STACKS"));
        set_category_expanded(&mut g, "STACKS", false);
        assert!(!category_expanded(&mut g, "STACKS"));
    }

    #[test]
    fn tab_restore_defaults_sources_to_media_tab() {
        let (mut g, n, p) = graph();
        assert_eq!(restore_tab(&g, n), Some(1));
        assert_eq!(restore_tab(&g, p), None);
        save_tab(&mut g, p, 0);
        assert_eq!(restore_tab(&g, p), Some(0));
    }
}
