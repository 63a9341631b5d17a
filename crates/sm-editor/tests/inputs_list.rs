//! Integration tests: the inputs list of the viewed node.

use pretty_assertions::assert_eq;
use sm_core::{GraphFacade, MemoryGraph, NodeId, NodeType, SessionConfig, state};
use sm_editor::{ItemId, SessionManager};
use std::time::{Duration, Instant};

fn settle(g: &mut MemoryGraph, sm: &mut SessionManager) {
    for _ in 0..16 {
        let events = g.drain_events();
        if events.is_empty() && !sm.has_pending_timers() {
            return;
        }
        for event in &events {
            sm.handle_event(g, event);
        }
        sm.poll_timers(g, Instant::now() + Duration::from_secs(1));
    }
}

fn row(sm: &SessionManager, text: &str) -> ItemId {
    sm.tree
        .pre_order()
        .into_iter()
        .find(|id| sm.tree.item(*id).is_some_and(|i| i.text == text))
        .unwrap_or_else(|| panic!("no row {text}: {:#?}", sm.tree.outline()))
}

fn inputs(g: &MemoryGraph, node: NodeId) -> Vec<NodeId> {
    g.connections(node).unwrap().inputs
}

/// A stack `V` of sources named `names`, viewed and settled.
fn stack(prefix: &str, names: &[&str]) -> (MemoryGraph, SessionManager, NodeId, Vec<NodeId>) {
    let mut g = MemoryGraph::new();
    let sources: Vec<NodeId> = names
        .iter()
        .map(|n| g.add_node(NodeType::SourceGroup, &format!("{prefix}{n}")))
        .collect();
    let v = g.add_node(NodeType::StackGroup, &format!("{prefix}V"));
    g.connect(v, &sources).unwrap();
    g.set_view(v);
    let mut sm = SessionManager::new(SessionConfig::default());
    sm.activate(&mut g);
    settle(&mut g, &mut sm);
    g.clear_logs();
    (g, sm, v, sources)
}

// ─── Debounced edits ─────────────────────────────────────────────────────

#[test]
fn removed_row_reaches_graph_after_quiet_period() {
    let (mut g, mut sm, v, ins) = stack("inFlush", &["A", "B"]);

    sm.inputs.remove_rows(&g, 1..2);
    assert!(sm.inputs.is_flush_pending());
    assert!(g.set_inputs_calls().is_empty());

    sm.poll_timers(&mut g, Instant::now() + Duration::from_secs(1));
    assert_eq!(g.set_inputs_calls(), &[(v, vec![ins[0]])]);

    settle(&mut g, &mut sm);
    assert_eq!(sm.inputs.texts(), vec!["inFlushA"]);
    assert_eq!(g.set_inputs_calls().len(), 1);
}

#[test]
fn burst_of_edits_is_written_once() {
    let (mut g, mut sm, v, ins) = stack("inBurst", &["A", "B", "C"]);

    sm.inputs.remove_rows(&g, 0..1);
    sm.inputs.move_rows(&g, &[1], 0);
    assert_eq!(sm.inputs.texts(), vec!["inBurstC", "inBurstB"]);

    settle(&mut g, &mut sm);
    assert_eq!(g.set_inputs_calls(), &[(v, vec![ins[2], ins[1]])]);
    assert_eq!(inputs(&g, v), vec![ins[2], ins[1]]);
}

// ─── Commands ────────────────────────────────────────────────────────────

#[test]
fn reorder_moves_selection_and_stops_at_edge() {
    let (mut g, mut sm, v, ins) = stack("inOrder", &["A", "B"]);

    sm.inputs.select(&[0]);
    sm.reorder_selected_inputs(&mut g, true);
    assert!(g.set_inputs_calls().is_empty());

    sm.inputs.select(&[1]);
    sm.reorder_selected_inputs(&mut g, true);
    assert_eq!(inputs(&g, v), vec![ins[1], ins[0]]);
    assert_eq!(sm.inputs.texts(), vec!["inOrderB", "inOrderA"]);
    assert_eq!(sm.inputs.selection(), &[0]);
}

#[test]
fn sort_by_name_both_ways() {
    let (mut g, mut sm, v, ins) = stack("inSort", &["A", "C", "B"]);

    sm.sort_inputs(&mut g, true);
    assert_eq!(inputs(&g, v), vec![ins[0], ins[2], ins[1]]);
    sm.sort_inputs(&mut g, false);
    assert_eq!(inputs(&g, v), vec![ins[1], ins[2], ins[0]]);
    assert_eq!(sm.inputs.texts(), vec!["inSortC", "inSortB", "inSortA"]);
}

#[test]
fn sorting_a_folder_persists_keys() {
    let mut g = MemoryGraph::new();
    let x = g.add_node(NodeType::SourceGroup, "inKeysX");
    let y = g.add_node(NodeType::SourceGroup, "inKeysY");
    let f = g.add_node(NodeType::FolderGroup, "inKeysF");
    g.connect(f, &[x, y]).unwrap();
    g.set_view(f);
    let mut sm = SessionManager::new(SessionConfig::default());
    sm.activate(&mut g);
    settle(&mut g, &mut sm);

    sm.sort_inputs(&mut g, false);
    assert_eq!(state::sort_key(&g, y, Some(f)), 0);
    assert_eq!(state::sort_key(&g, x, Some(f)), 1);
    settle(&mut g, &mut sm);
    assert_eq!(
        sm.tree.outline(),
        vec!["FOLDERS", "  inKeysF ✔", "    inKeysY", "    inKeysX"]
    );
}

#[test]
fn delete_selected_writes_immediately() {
    let (mut g, mut sm, v, ins) = stack("inDelete", &["A", "B", "C"]);

    sm.inputs.select(&[0, 2]);
    sm.delete_selected_inputs(&mut g);
    assert_eq!(g.set_inputs_calls(), &[(v, vec![ins[1]])]);
    assert!(!sm.inputs.is_flush_pending());

    settle(&mut g, &mut sm);
    assert_eq!(sm.inputs.texts(), vec!["inDeleteB"]);
}

#[test]
fn rejected_order_alerts_and_resyncs() {
    let (mut g, mut sm, v, _) = stack("inReject", &["A", "B"]);

    let own = row(&sm, "inRejectV");
    sm.drop_on_inputs(&g, &[own], 0);
    assert_eq!(sm.inputs.texts(), vec!["inRejectV", "inRejectA", "inRejectB"]);

    settle(&mut g, &mut sm);
    assert!(g.set_inputs_calls().is_empty());
    assert_eq!(g.alerts().len(), 1);
    assert_eq!(sm.inputs.texts(), vec!["inRejectA", "inRejectB"]);
    assert_eq!(inputs(&g, v).len(), 2);
}

#[test]
fn double_click_views_input() {
    let (mut g, mut sm, _, ins) = stack("inView", &["A", "B"]);
    sm.view_input_row(&mut g, 1);
    assert_eq!(g.view_node(), Some(ins[1]));

    settle(&mut g, &mut sm);
    assert!(!sm.inputs.is_enabled());
}

#[test]
fn source_view_disables_list() {
    let mut g = MemoryGraph::new();
    let a = g.add_node(NodeType::SourceGroup, "inSourceA");
    let b = g.add_node(NodeType::SourceGroup, "inSourceB");
    g.set_view(a);
    let mut sm = SessionManager::new(SessionConfig::default());
    sm.activate(&mut g);
    settle(&mut g, &mut sm);
    assert!(!sm.inputs.is_enabled());

    let other = row(&sm, "inSourceB");
    sm.drop_on_inputs(&g, &[other], 0);
    assert!(sm.inputs.texts().is_empty());
    assert!(!sm.inputs.is_flush_pending());
    assert!(inputs(&g, b).is_empty());
}
