//! Integration tests: folder, node and source commands issued from the tree.

use pretty_assertions::assert_eq;
use sm_core::{GraphFacade, MemoryGraph, NodeId, NodeType, SessionConfig, state};
use sm_editor::{GeneratedImage, ItemId, NewFolder, Pattern, SessionManager, ViewStep};
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

fn row_under(sm: &SessionManager, node: NodeId, parent: NodeId) -> ItemId {
    sm.tree
        .items_of_node(node)
        .into_iter()
        .find(|id| sm.tree.parent_node(*id) == Some(parent))
        .unwrap_or_else(|| panic!("no {node} under {parent}: {:#?}", sm.tree.outline()))
}

fn inputs(g: &MemoryGraph, node: NodeId) -> Vec<NodeId> {
    g.connections(node).unwrap().inputs
}

fn start(mut g: MemoryGraph) -> (MemoryGraph, SessionManager) {
    let mut sm = SessionManager::new(SessionConfig::default());
    sm.activate(&mut g);
    settle(&mut g, &mut sm);
    (g, sm)
}

/// Two loose sources A and B, A viewed.
fn two_sources(prefix: &str) -> (MemoryGraph, SessionManager, NodeId, NodeId) {
    let mut g = MemoryGraph::new();
    let a = g.add_node(NodeType::SourceGroup, &format!("{prefix}A"));
    let b = g.add_node(NodeType::SourceGroup, &format!("{prefix}B"));
    g.set_view(a);
    let (g, sm) = start(g);
    (g, sm, a, b)
}

// ─── Folders ─────────────────────────────────────────────────────────────

#[test]
fn copy_folder_collects_selection() {
    let (mut g, mut sm, a, b) = two_sources("cmdCopy");
    let rows = [row(&sm, "cmdCopyA"), row(&sm, "cmdCopyB")];
    sm.tree.set_selection(&rows);

    let folder = sm.new_folder(&mut g, NewFolder::Copy).unwrap();
    assert_eq!(inputs(&g, folder), vec![a, b]);
    assert_eq!(g.display_name(folder), "Folder of cmdCopyA and cmdCopyB");
    assert_eq!(g.view_node(), Some(folder));

    settle(&mut g, &mut sm);
    assert_eq!(
        sm.tree.outline(),
        vec![
            "FOLDERS",
            "  Folder of cmdCopyA and cmdCopyB ✔",
            "    cmdCopyA",
            "    cmdCopyB",
        ]
    );
}

#[test]
fn move_folder_takes_place_of_selection() {
    let mut g = MemoryGraph::new();
    let x = g.add_node(NodeType::SourceGroup, "cmdMoveX");
    let y = g.add_node(NodeType::SourceGroup, "cmdMoveY");
    let f = g.add_node(NodeType::FolderGroup, "cmdMoveF");
    g.connect(f, &[x, y]).unwrap();
    g.set_view(f);
    state::set_sort_key(&mut g, x, Some(f), 5);
    let (mut g, mut sm) = start(g);

    sm.tree.set_selection(&[row_under(&sm, x, f)]);
    let folder = sm.new_folder(&mut g, NewFolder::Move).unwrap();
    assert_eq!(inputs(&g, folder), vec![x]);
    assert_eq!(inputs(&g, f), vec![y, folder]);
    assert_eq!(state::sort_key(&g, folder, Some(f)), 5);

    settle(&mut g, &mut sm);
    let outline = sm.tree.outline();
    assert!(outline.contains(&"    Folder of cmdMoveX ✔".to_string()));
    assert!(outline.contains(&"      cmdMoveX".to_string()));
}

#[test]
fn empty_folder_without_selection() {
    let (mut g, mut sm, a, _) = two_sources("cmdEmpty");
    sm.tree.set_selection(&[]);

    let folder = sm.new_folder(&mut g, NewFolder::Empty).unwrap();
    assert!(inputs(&g, folder).is_empty());
    assert_eq!(g.display_name(folder), "Empty Folder");
    assert_eq!(g.view_node(), Some(a));

    settle(&mut g, &mut sm);
    assert!(sm.tree.outline().contains(&"  Empty Folder".to_string()));
}

#[test]
fn refused_folder_is_discarded() {
    let mut g = MemoryGraph::new();
    let x = g.add_node(NodeType::SourceGroup, "cmdTwiceX");
    let f1 = g.add_node(NodeType::FolderGroup, "cmdTwiceF1");
    let f2 = g.add_node(NodeType::FolderGroup, "cmdTwiceF2");
    g.connect(f1, &[x]).unwrap();
    g.connect(f2, &[x]).unwrap();
    g.set_view(f1);
    let (mut g, mut sm) = start(g);
    let count = g.view_nodes().len();

    // the same node under both folders
    sm.tree
        .set_selection(&[row_under(&sm, x, f1), row_under(&sm, x, f2)]);
    assert_eq!(sm.new_folder(&mut g, NewFolder::Copy), None);
    assert_eq!(g.view_nodes().len(), count);
    assert_eq!(g.alerts().len(), 1);
    assert_eq!(g.view_node(), Some(f1));
}

// ─── Nodes ───────────────────────────────────────────────────────────────

#[test]
fn new_stack_of_selection() {
    let (mut g, mut sm, a, b) = two_sources("cmdStack");
    let rows = [row(&sm, "cmdStackA"), row(&sm, "cmdStackB")];
    sm.tree.set_selection(&rows);

    let stack = sm.add_node_of_type(&mut g, &NodeType::StackGroup).unwrap();
    assert_eq!(g.node_type(stack).unwrap(), NodeType::StackGroup);
    assert_eq!(inputs(&g, stack), vec![a, b]);
    assert_eq!(g.display_name(stack), "Stack of cmdStackA and cmdStackB");
    assert_eq!(g.view_node(), Some(stack));

    settle(&mut g, &mut sm);
    assert_eq!(
        sm.tree.outline(),
        vec![
            "SOURCES",
            "  cmdStackA",
            "  cmdStackB",
            "STACKS",
            "  Stack of cmdStackA and cmdStackB ✔",
        ]
    );
    assert_eq!(sm.inputs.texts(), vec!["cmdStackA", "cmdStackB"]);
}

#[test]
fn delete_shared_node_only_leaves_folder() {
    let mut g = MemoryGraph::new();
    let x = g.add_node(NodeType::SourceGroup, "cmdDelX");
    let s = g.add_node(NodeType::SourceGroup, "cmdDelS");
    let f1 = g.add_node(NodeType::FolderGroup, "cmdDelF1");
    let f2 = g.add_node(NodeType::FolderGroup, "cmdDelF2");
    g.connect(f1, &[x]).unwrap();
    g.connect(f2, &[x]).unwrap();
    g.set_view(f1);
    let (mut g, mut sm) = start(g);

    sm.tree.set_selection(&[row_under(&sm, x, f2)]);
    sm.delete_selected(&mut g);
    assert!(g.node_exists(x));
    assert_eq!(inputs(&g, f1), vec![x]);
    assert!(inputs(&g, f2).is_empty());

    settle(&mut g, &mut sm);
    sm.tree.set_selection(&[row(&sm, "cmdDelS")]);
    sm.delete_selected(&mut g);
    assert!(!g.node_exists(s));

    settle(&mut g, &mut sm);
    assert_eq!(
        sm.tree.outline(),
        vec!["FOLDERS", "  cmdDelF1 ✔", "    cmdDelX", "  cmdDelF2"]
    );
}

#[test]
fn navigate_walks_view_history() {
    let (mut g, mut sm, a, b) = two_sources("cmdNav");
    g.set_view_node(b).unwrap();
    settle(&mut g, &mut sm);
    assert!(sm.nav().has_previous);
    assert!(!sm.nav().has_next);

    sm.navigate(&mut g, ViewStep::Previous);
    assert_eq!(g.view_node(), Some(a));
    settle(&mut g, &mut sm);
    assert!(sm.nav().has_next);
    assert_eq!(sm.nav().label, "cmdNavA");
    assert!(sm.tree.outline().contains(&"  cmdNavA ✔".to_string()));

    sm.navigate(&mut g, ViewStep::Next);
    assert_eq!(g.view_node(), Some(b));
}

// ─── Generated sources ───────────────────────────────────────────────────

#[test]
fn generated_source_is_named_after_pattern() {
    let (mut g, mut sm, _, _) = two_sources("cmdGen");
    let image = GeneratedImage::new(Pattern::ColorBars);

    let group = sm.add_generated_source(&mut g, &image).unwrap();
    assert_eq!(g.display_name(group), "SMPTEColorBars");
    let source = g.source_node_of_group(group).unwrap();
    assert_eq!(g.media_info(source).unwrap()[0].file, image.media_spec());

    settle(&mut g, &mut sm);
    assert!(sm.tree.outline().contains(&"  SMPTEColorBars".to_string()));
}
