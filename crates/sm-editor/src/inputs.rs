//! Inputs list reconciler.
//!
//! A flat, ordered mirror of the view node's direct inputs. The graph side
//! refreshes it wholesale; user edits to the rows (drops, removals, drags)
//! are flushed back to the graph by a debounced rebuild that reads the final
//! row order at fire time.

use crate::debounce::Debouncer;
use crate::guard::UpdateGuard;
use crate::sync::SessionManager;
use crate::tree::{Icon, ItemId, ItemKind};
use sm_core::props::sm_state;
use sm_core::state;
use sm_core::subcomponent::{self, SubComponent};
use sm_core::{GraphFacade, NodeId, SubComponentKind, ops, props};
use std::ops::Range;
use std::time::{Duration, Instant};

// ─── Rows ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    /// Input node, or the owning source of a sub-component row.
    pub node: NodeId,
    pub text: String,
    pub icon: Icon,
    /// Set for sub-components dropped from the tree and not yet resolved.
    pub sub: Option<SubComponent>,
}

impl InputRow {
    pub fn for_node(graph: &dyn GraphFacade, node: NodeId) -> Self {
        Self {
            node,
            text: graph.display_name(node),
            icon: icon_for_node(graph, node),
            sub: None,
        }
    }
}

/// Type icon, overridden by the kind of a materialized sub-component.
pub fn icon_for_node(graph: &dyn GraphFacade, node: NodeId) -> Icon {
    let kind = graph
        .int_property(&sm_state(node, props::COMPONENT_SUB_TYPE))
        .ok()
        .and_then(|v| v.first().copied())
        .map(SubComponentKind::from_i32);
    match kind {
        Some(k @ (SubComponentKind::View | SubComponentKind::Layer | SubComponentKind::Channel)) => {
            Icon::Component(k)
        }
        _ => graph.node_type(node).map(Icon::Node).unwrap_or_default(),
    }
}

// ─── List ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct InputsList {
    rows: Vec<InputRow>,
    /// Selected row indices, ascending.
    selection: Vec<usize>,
    owner: Option<NodeId>,
    enabled: bool,
    pub(crate) lock: UpdateGuard,
    pub(crate) timer: Debouncer,
}

impl InputsList {
    pub fn new(debounce: Duration) -> Self {
        Self {
            rows: Vec::new(),
            selection: Vec::new(),
            owner: None,
            enabled: true,
            lock: UpdateGuard::new(),
            timer: Debouncer::new("inputs", debounce),
        }
    }

    pub fn rows(&self) -> &[InputRow] {
        &self.rows
    }

    pub fn texts(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.text.as_str()).collect()
    }

    /// Node whose inputs are listed.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn select(&mut self, rows: &[usize]) {
        self.selection = rows
            .iter()
            .copied()
            .filter(|r| *r < self.rows.len())
            .collect();
        self.selection.sort_unstable();
        self.selection.dedup();
    }

    /// Is a flush of user edits waiting for its quiet period?
    pub fn is_flush_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Rebuild the rows from the graph. Rows of still-listed nodes stay
    /// selected.
    pub fn refresh(&mut self, graph: &dyn GraphFacade, node: NodeId) {
        if self.lock.is_held() {
            return;
        }
        let _lock = self.lock.hold();
        let mut selected: Vec<NodeId> = self
            .selection
            .iter()
            .filter_map(|i| self.rows.get(*i).map(|r| r.node))
            .collect();
        self.rows = ops::node_inputs(graph, node)
            .into_iter()
            .map(|n| InputRow::for_node(graph, n))
            .collect();
        self.owner = Some(node);
        self.selection.clear();
        for (i, row) in self.rows.iter().enumerate() {
            if let Some(pos) = selected.iter().position(|n| *n == row.node) {
                selected.remove(pos);
                self.selection.push(i);
            }
        }
    }

    // ─── User edits ──────────────────────────────────────────────────────

    pub fn insert_rows(&mut self, graph: &dyn GraphFacade, at: usize, rows: Vec<InputRow>) {
        let at = at.min(self.rows.len());
        let count = rows.len();
        self.rows.splice(at..at, rows);
        self.selection = (at..at + count).collect();
        self.rows_changed(graph);
    }

    pub fn remove_rows(&mut self, graph: &dyn GraphFacade, range: Range<usize>) {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        self.rows.drain(start..end);
        self.selection.clear();
        self.rows_changed(graph);
    }

    /// Drag `rows` within the list so they land before row `to`.
    pub fn move_rows(&mut self, graph: &dyn GraphFacade, rows: &[usize], to: usize) {
        let mut picked: Vec<usize> = rows.iter().copied().filter(|r| *r < self.rows.len()).collect();
        picked.sort_unstable();
        picked.dedup();
        if picked.is_empty() {
            return;
        }
        let to = to.min(self.rows.len());
        let before = picked.iter().filter(|r| **r < to).count();
        let mut moved = Vec::with_capacity(picked.len());
        for r in picked.iter().rev() {
            moved.push(self.rows.remove(*r));
        }
        moved.reverse();
        let at = to - before;
        let count = moved.len();
        self.rows.splice(at..at, moved);
        self.selection = (at..at + count).collect();
        self.rows_changed(graph);
    }

    fn remove_selected(&mut self) {
        for r in self.selection.iter().rev() {
            if *r < self.rows.len() {
                self.rows.remove(*r);
            }
        }
        self.selection.clear();
    }

    fn rows_changed(&mut self, graph: &dyn GraphFacade) {
        if self.lock.is_held() || graph.view_node().is_none() {
            return;
        }
        self.timer.schedule();
    }

    pub(crate) fn flush_due(&mut self, now: Instant) -> bool {
        self.timer.fire_due(now)
    }

    /// New node order after moving the selection one row up or down, and
    /// the rows to select afterwards. `None` when a selected row is already
    /// at the edge.
    ///
    /// Each selected run swaps with the unselected row in front of it, so
    /// discontiguous selections move as well and no row is lost.
    fn reorder_plan(&self, up: bool) -> Option<(Vec<NodeId>, Vec<usize>)> {
        let (&min, &max) = (self.selection.first()?, self.selection.last()?);
        let n = self.rows.len();
        if (up && min == 0) || (!up && max + 1 >= n) {
            return None;
        }
        let mut order: Vec<usize> = (0..n).collect();
        let mut selected: Vec<bool> = (0..n).map(|i| self.selection.contains(&i)).collect();
        if up {
            for i in 1..n {
                if selected[i] && !selected[i - 1] {
                    order.swap(i - 1, i);
                    selected.swap(i - 1, i);
                }
            }
        } else {
            for i in (0..n - 1).rev() {
                if selected[i] && !selected[i + 1] {
                    order.swap(i, i + 1);
                    selected.swap(i, i + 1);
                }
            }
        }
        let nodes = order.iter().map(|i| self.rows[*i].node).collect();
        let reselect = selected
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.then_some(i))
            .collect();
        Some((nodes, reselect))
    }
}

// ─── Session manager operations ──────────────────────────────────────────

impl SessionManager {
    /// Copy tree rows into the inputs list before row `at`. The tree is left
    /// untouched; the graph follows once the edit settles.
    pub fn drop_on_inputs(&mut self, graph: &dyn GraphFacade, items: &[ItemId], at: usize) {
        if !self.inputs.is_enabled() {
            return;
        }
        let rows: Vec<InputRow> = items
            .iter()
            .filter_map(|id| self.tree.item(*id))
            .filter_map(|item| {
                let node = item.node?;
                match &item.kind {
                    ItemKind::Node => Some(InputRow::for_node(graph, node)),
                    ItemKind::SubComponent(sub) => Some(InputRow {
                        node,
                        text: item.text.clone(),
                        icon: Icon::Component(sub.kind),
                        sub: Some(sub.clone()),
                    }),
                    _ => None,
                }
            })
            .collect();
        if rows.is_empty() {
            return;
        }
        self.inputs.insert_rows(graph, at, rows);
    }

    /// Write the list order back as the view node's inputs, materializing
    /// sub-component rows. A rejected order resyncs the list from the graph.
    pub fn rebuild_inputs_from_list(&mut self, graph: &mut dyn GraphFacade) {
        if self.inputs.lock.is_held() {
            return;
        }
        let Some(view) = graph.view_node() else {
            return;
        };
        self.inputs.timer.cancel();
        let rows = self.inputs.rows().to_vec();

        let nodes = self.with_updates_suspended(graph, |_, g| {
            let mut nodes = Vec::with_capacity(rows.len());
            for row in &rows {
                match &row.sub {
                    Some(sub) => match subcomponent::resolve_or_materialize(g, sub, row.node) {
                        Ok(n) => nodes.push(n),
                        Err(e) => log::debug!("component {}: {e}", sub.hash()),
                    },
                    None => nodes.push(row.node),
                }
            }
            if g.view_node() != Some(view)
                && let Err(e) = g.set_view_node(view)
            {
                log::debug!("restore view {view}: {e}");
            }
            nodes
        });

        if !ops::set_inputs_checked(graph, view, &nodes) {
            self.update_inputs(graph, view);
        }
    }

    /// Drop the selected rows from the view node's inputs.
    pub fn delete_selected_inputs(&mut self, graph: &mut dyn GraphFacade) {
        if self.inputs.lock.is_held() || graph.view_node().is_none() {
            return;
        }
        if self.inputs.selection().is_empty() {
            return;
        }
        self.inputs.remove_selected();
        self.rebuild_inputs_from_list(graph);
    }

    /// Move the selected rows one place up or down.
    pub fn reorder_selected_inputs(&mut self, graph: &mut dyn GraphFacade, up: bool) {
        let Some(view) = graph.view_node() else {
            return;
        };
        let Some((nodes, reselect)) = self.inputs.reorder_plan(up) else {
            log::trace!("reorder refused at the list edge");
            return;
        };
        if ops::set_inputs_checked(graph, view, &nodes) {
            self.inputs.refresh(graph, view);
            self.inputs.select(&reselect);
        } else {
            self.update_inputs(graph, view);
        }
    }

    /// Order the view node's inputs by display name. Folders also persist
    /// the new order as sort keys.
    pub fn sort_inputs(&mut self, graph: &mut dyn GraphFacade, ascending: bool) {
        let Some(view) = graph.view_node() else {
            return;
        };
        let mut named: Vec<(String, NodeId)> = ops::node_inputs(graph, view)
            .into_iter()
            .map(|n| (graph.display_name(n), n))
            .collect();
        if ascending {
            named.sort_by(|a, b| a.0.cmp(&b.0));
        } else {
            named.sort_by(|a, b| b.0.cmp(&a.0));
        }
        let sorted: Vec<NodeId> = named.into_iter().map(|(_, n)| n).collect();

        if !ops::set_inputs_checked(graph, view, &sorted) {
            self.update_inputs(graph, view);
            return;
        }
        self.inputs.refresh(graph, view);
        if graph.node_type(view).is_ok_and(|t| t.is_folder()) {
            for (i, node) in sorted.iter().enumerate() {
                state::set_sort_key(graph, *node, Some(view), i as i32);
            }
            self.update_tree(graph);
        }
    }

    /// Double-click on an inputs row: view it.
    pub fn view_input_row(&mut self, graph: &mut dyn GraphFacade, row: usize) {
        let Some(input) = self.inputs.rows().get(row).cloned() else {
            return;
        };
        self.view_component(graph, input.node, input.sub.as_ref());
    }

    pub(crate) fn poll_inputs(&mut self, graph: &mut dyn GraphFacade, now: Instant) {
        if self.inputs.flush_due(now) {
            self.rebuild_inputs_from_list(graph);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sm_core::{MemoryGraph, NodeType};

    fn list_of(names: &[&str]) -> (MemoryGraph, NodeId, InputsList) {
        let mut g = MemoryGraph::new();
        let v = g.add_node(NodeType::StackGroup, "listV");
        let inputs: Vec<NodeId> = names
            .iter()
            .map(|n| g.add_node(NodeType::SourceGroup, n))
            .collect();
        g.connect(v, &inputs).unwrap();
        g.set_view(v);
        let mut list = InputsList::new(Duration::from_millis(100));
        list.refresh(&g, v);
        (g, v, list)
    }

    fn names(nodes: &[NodeId]) -> Vec<&str> {
        nodes.iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn refresh_mirrors_graph_order() {
        let (_, v, list) = list_of(&["listA", "listB", "listC"]);
        assert_eq!(list.texts(), vec!["listA", "listB", "listC"]);
        assert_eq!(list.owner(), Some(v));
    }

    #[test]
    fn refresh_keeps_selected_nodes() {
        let (mut g, v, mut list) = list_of(&["listA", "listB", "listC"]);
        list.select(&[2]);
        let reordered = [NodeId::intern("listC"), NodeId::intern("listA"), NodeId::intern("listB")];
        g.set_inputs(v, &reordered).unwrap();
        list.refresh(&g, v);
        assert_eq!(list.selection(), &[0]);
    }

    #[test]
    fn reorder_up_contiguous() {
        let (_, _, mut list) = list_of(&["listA", "listB", "listC", "listD"]);
        list.select(&[1, 2]);
        let (nodes, reselect) = list.reorder_plan(true).unwrap();
        assert_eq!(names(&nodes), vec!["listB", "listC", "listA", "listD"]);
        assert_eq!(reselect, vec![0, 1]);
    }

    #[test]
    fn reorder_down_discontiguous_keeps_every_row() {
        let (_, _, mut list) = list_of(&["listA", "listB", "listC", "listD"]);
        list.select(&[0, 2]);
        let (nodes, reselect) = list.reorder_plan(false).unwrap();
        assert_eq!(names(&nodes), vec!["listB", "listA", "listD", "listC"]);
        assert_eq!(reselect, vec![1, 3]);
    }

    #[test]
    fn reorder_refused_at_edges() {
        let (_, _, mut list) = list_of(&["listA", "listB"]);
        list.select(&[0]);
        assert_eq!(list.reorder_plan(true), None);
        list.select(&[1]);
        assert_eq!(list.reorder_plan(false), None);
        list.select(&[]);
        assert_eq!(list.reorder_plan(true), None);
    }

    #[test]
    fn user_edits_schedule_a_flush() {
        let (g, _, mut list) = list_of(&["listA", "listB"]);
        assert!(!list.is_flush_pending());
        list.remove_rows(&g, 1..2);
        assert!(list.is_flush_pending());
        assert_eq!(list.texts(), vec!["listA"]);
    }

    #[test]
    fn move_rows_lands_before_target() {
        let (g, _, mut list) = list_of(&["listA", "listB", "listC", "listD"]);
        list.move_rows(&g, &[0], 3);
        assert_eq!(list.texts(), vec!["listB", "listC", "listA", "listD"]);
        assert_eq!(list.selection(), &[2]);
        list.move_rows(&g, &[3], 0);
        assert_eq!(list.texts(), vec!["listD", "listB", "listC", "listA"]);
    }

    #[test]
    fn locked_list_ignores_refresh() {
        let (mut g, v, mut list) = list_of(&["listA"]);
        let extra = g.add_node(NodeType::SourceGroup, "listE");
        g.connect(v, &[NodeId::intern("listA"), extra]).unwrap();
        let hold = list.lock.hold();
        list.refresh(&g, v);
        assert_eq!(list.texts(), vec!["listA"]);
        drop(hold);
        list.refresh(&g, v);
        assert_eq!(list.texts(), vec!["listA", "listE"]);
    }
}
