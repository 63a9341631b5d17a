//! Tree model synchronizer.
//!
//! `SessionManager` keeps the session tree and the inputs list in step with
//! the host graph:
//!
//! - **Graph → tree**: structural events rebuild the whole tree; renames and
//!   sort-key writes schedule a lazy rebuild; image requests only refresh
//!   the selection dots of the affected source.
//! - **Tree → graph**: drops and renames are reconciled into connection and
//!   name changes, validated before they are committed.
//!
//! Programmatic edits run inside `with_updates_suspended`. Handlers that
//! see events emitted in such a window skip rebuilding the tree and the
//! inputs list but still do their other bookkeeping.

use crate::debounce::Debouncer;
use crate::editors::{EditorHost, EditorRegistry, LOAD_UI_EVENT, PanelHandle};
use crate::guard::UpdateGuard;
use crate::inputs::{InputsList, icon_for_node};
use crate::tree::*;
use sm_core::props::{self, PropertyPath, sm_state};
use sm_core::state::{self, CATEGORY_SORT_KEY, UNDEFINED_SORT_KEY};
use sm_core::subcomponent::{self, SubComponent, SubComponentTree};
use sm_core::{
    Category, EventKind, GraphError, GraphEvent, GraphFacade, NodeId, NodeType, Propagation,
    SessionConfig, SubComponentKind, ops,
};
use std::path::PathBuf;
use std::time::Instant;

/// Status-column mark of the current view node.
pub const VIEW_MARK: &str = "✔";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    /// Connect to the target as well; the former parent keeps the node.
    Copy,
    /// Reparent: connect to the target and leave the former parent.
    Move,
}

/// Label and availability of the view navigation buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavState {
    pub label: String,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, Default)]
struct DragState {
    items: Vec<ItemId>,
    paths: Vec<NodePath>,
}

pub struct SessionManager {
    pub tree: TreeModel,
    pub inputs: InputsList,
    config: SessionConfig,
    pub(crate) updates: UpdateGuard,
    /// The event being handled was emitted while updates were suspended.
    replaying_muted: bool,
    /// Event windows of drops, whose folder changes need no lazy rebuild.
    dropping: UpdateGuard,
    editors: EditorRegistry,
    ui_created: bool,
    active: bool,
    progressive_loading: bool,
    quitting: bool,
    drag: Option<DragState>,
    drop_action: Option<DropAction>,
    tree_timer: Debouncer,
    sort_timer: Debouncer,
    sort_folders: Vec<NodeId>,
    shown_view: Option<NodeId>,
    nav: NavState,
    tab: i32,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            tree: TreeModel::new(),
            inputs: InputsList::new(config.inputs_debounce()),
            updates: UpdateGuard::new(),
            replaying_muted: false,
            dropping: UpdateGuard::new(),
            editors: EditorRegistry::new(config.support_dir.clone()),
            ui_created: false,
            active: false,
            progressive_loading: false,
            quitting: false,
            drag: None,
            drop_action: None,
            tree_timer: Debouncer::new("tree", config.tree_update_delay()),
            sort_timer: Debouncer::new("folder-sort", config.folder_sort_delay()),
            sort_folders: Vec::new(),
            shown_view: None,
            nav: NavState::default(),
            tab: 0,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    /// Current tab of the node panel.
    pub fn tab(&self) -> i32 {
        self.tab
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn editors(&self) -> &EditorRegistry {
        &self.editors
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Show the manager: build the tree and ask the panels for their editor.
    pub fn activate(&mut self, graph: &mut dyn GraphFacade) {
        self.active = true;
        self.ui_created = true;
        self.update_tree(graph);
        if let Some(view) = graph.view_node() {
            let enabled = !graph.node_type(view).is_ok_and(|t| t.is_source());
            self.inputs.set_enabled(enabled);
            self.update_nav(graph);
        }
        self.editors.hide_all();
        let view = graph.view_node().map(|n| n.to_string()).unwrap_or_default();
        graph.send_internal_event(LOAD_UI_EVENT, &view);
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.inputs.timer.cancel();
        self.tree_timer.cancel();
        self.sort_timer.cancel();
        self.updates.clear_muted();
        self.dropping.clear_muted();
    }

    /// Whether events already emitted are still waiting to be recognised as
    /// this manager's own.
    pub fn has_muted_events(&self) -> bool {
        self.updates.has_muted() || self.dropping.has_muted()
    }

    /// Run `f` with updates suspended. Events `f` causes are muted for this
    /// manager even when the host delivers them after `f` returns.
    pub fn with_updates_suspended<R>(
        &mut self,
        graph: &mut dyn GraphFacade,
        f: impl FnOnce(&mut Self, &mut dyn GraphFacade) -> R,
    ) -> R {
        let start = graph.event_cursor();
        let hold = self.updates.hold();
        let out = f(self, graph);
        drop(hold);
        self.updates.mute(start..graph.event_cursor());
        out
    }

    fn updates_suspended(&self) -> bool {
        self.updates.is_held() || self.replaying_muted
    }

    // ─── Rebuild ─────────────────────────────────────────────────────────

    /// Rebuild the whole tree from the graph.
    pub fn update_tree(&mut self, graph: &mut dyn GraphFacade) {
        if !self.ui_created || self.updates_suspended() || self.quitting {
            return;
        }
        self.tree_timer.cancel();
        self.tree.clear();
        let Some(view) = graph.view_node() else {
            return;
        };

        let categories: Vec<(Category, ItemId)> = Category::ALL
            .iter()
            .map(|c| {
                let mut item = TreeItem::new(c.label(), ItemKind::Category(*c));
                item.sort_key = CATEGORY_SORT_KEY;
                if *c == Category::Folders {
                    item.flags.drop_target = true;
                }
                (*c, self.tree.insert(item))
            })
            .collect();

        for node in graph.view_nodes() {
            if ops::folder_output_count(graph, node) > 0 {
                continue;
            }
            let Ok(node_type) = graph.node_type(node) else {
                continue;
            };
            let category = node_type.category();
            if let Some((_, cat_item)) = categories.iter().find(|(c, _)| *c == category) {
                self.new_node_row(graph, node, *cat_item, None);
            }
        }

        for (category, item) in categories {
            if self.tree.children(item).is_empty() {
                continue;
            }
            let expanded = state::category_expanded(graph, category.label());
            if let Some(row) = self.tree.item_mut(item) {
                row.expanded = expanded;
            }
            self.tree.attach(item, None, usize::MAX);
        }

        self.tree.sort();
        self.shown_view = Some(view);
        self.select_viewable_node(graph);
        log::debug!("tree rebuilt: {} rows", self.tree.pre_order().len());
    }

    /// Rebuild once the tree quiet period elapses.
    pub fn schedule_tree_update(&mut self) {
        self.tree_timer.schedule();
    }

    fn new_node_row(
        &mut self,
        graph: &dyn GraphFacade,
        node: NodeId,
        parent_item: ItemId,
        parent_node: Option<NodeId>,
    ) {
        let node_type = match graph.node_type(node) {
            Ok(t) => t,
            Err(e) => {
                log::debug!("row for {node}: {e}");
                return;
            }
        };
        let mut item = TreeItem::new(graph.display_name(node), ItemKind::Node);
        item.node = Some(node);
        item.parent_node = parent_node;
        item.icon = icon_for_node(graph, node);
        item.sort_key = state::sort_key(graph, node, parent_node);
        item.tooltip = state::tool_tip(graph, node);
        item.flags = ItemFlags::node(node_type.is_folder());
        item.expanded = state::is_expanded_in_parent(graph, node, parent_node);
        if graph.view_node() == Some(node) {
            item.status = VIEW_MARK.to_string();
        }
        let id = self.tree.append(Some(parent_item), item);

        if node_type.is_folder() {
            for input in ops::node_inputs(graph, node) {
                self.new_node_row(graph, input, id, Some(node));
            }
        }
        if node_type == NodeType::SourceGroup {
            self.add_sub_component_rows(graph, node, id);
        }
    }

    fn add_sub_component_rows(&mut self, graph: &dyn GraphFacade, group: NodeId, parent: ItemId) {
        if graph.property_exists(&sm_state(group, props::COMPONENT_HASH)) {
            let owner = graph
                .first_string(&sm_state(group, props::COMPONENT_OF_NODE))
                .map(|o| graph.display_name(NodeId::intern(&o)))
                .unwrap_or_default();
            let mut item = TreeItem::new(format!("(subcomponent of {owner})"), ItemKind::Placeholder);
            item.node = Some(group);
            item.parent_node = Some(group);
            item.sort_key = UNDEFINED_SORT_KEY;
            item.italic = true;
            self.tree.append(Some(parent), item);
            return;
        }

        let Some(source) = graph.source_node_of_group(group) else {
            return;
        };
        let media = match graph.media_info(source) {
            Ok(media) => media,
            Err(e) => {
                log::debug!("media of {source}: {e}");
                return;
            }
        };
        let request = graph
            .string_property(&props::image_component_request(source))
            .unwrap_or_default();
        for outline in subcomponent::media_outline(&media) {
            self.sub_component_row(graph, group, parent, &outline, &request);
        }
    }

    fn sub_component_row(
        &mut self,
        graph: &dyn GraphFacade,
        group: NodeId,
        parent: ItemId,
        outline: &SubComponentTree,
        request: &[String],
    ) {
        let sub = &outline.sub;
        let mut item = TreeItem::new(sub.label(), ItemKind::SubComponent(sub.clone()));
        item.node = Some(group);
        item.parent_node = Some(group);
        item.icon = Icon::Component(sub.kind);
        item.sort_key = UNDEFINED_SORT_KEY;
        item.flags = ItemFlags::sub_component();
        item.expanded = state::is_sub_component_expanded(graph, group, &sub.hash());
        if sub.kind == SubComponentKind::Media {
            item.tooltip = Some(sub.media.clone());
        } else {
            item.selection_dot = Some(request == sub.request_value().as_slice());
        }
        let id = self.tree.append(Some(parent), item);
        for child in &outline.children {
            self.sub_component_row(graph, group, id, child, request);
        }
    }

    /// Select the first row of the view node and list its inputs.
    pub fn select_viewable_node(&mut self, graph: &dyn GraphFacade) {
        let Some(view) = graph.view_node() else {
            return;
        };
        self.tree.clear_selection();
        if let Some(first) = self.tree.items_of_node(view).first() {
            self.tree.select(*first);
            self.update_inputs(graph, view);
        }
    }

    fn set_node_status(&mut self, node: NodeId, status: &str) {
        for id in self.tree.items_of_node(node) {
            if let Some(item) = self.tree.item_mut(id) {
                item.status = status.to_string();
            }
        }
    }

    fn refresh_selection_dots(&mut self, graph: &dyn GraphFacade, path: &str, source: NodeId) {
        let Some(group) = graph.node_group(source) else {
            return;
        };
        let request = graph.string_property(path).unwrap_or_default();
        for id in self.tree.sub_items_of_node(group) {
            if let Some(item) = self.tree.item_mut(id)
                && let ItemKind::SubComponent(sub) = &item.kind
                && sub.kind != SubComponentKind::Media
            {
                item.selection_dot = Some(request == sub.request_value());
            }
        }
    }

    /// Refresh the inputs list for `node`.
    pub fn update_inputs(&mut self, graph: &dyn GraphFacade, node: NodeId) {
        if self.updates_suspended() || self.progressive_loading {
            return;
        }
        self.inputs.refresh(graph, node);
    }

    fn update_nav(&mut self, graph: &dyn GraphFacade) {
        let Some(view) = graph.view_node() else {
            return;
        };
        self.nav = NavState {
            label: graph.display_name(view),
            has_previous: graph.previous_view_node().is_some(),
            has_next: graph.next_view_node().is_some(),
        };
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// React to one graph event. Events must arrive in emission order.
    pub fn handle_event(&mut self, graph: &mut dyn GraphFacade, event: &GraphEvent) -> Propagation {
        if !self.active {
            return Propagation::Continue;
        }
        self.replaying_muted = self.updates.is_muted(event.seq);
        let in_drop = self.dropping.is_held() || self.dropping.is_muted(event.seq);

        match &event.kind {
            EventKind::NodeCreated(_)
            | EventKind::SourceModified(_)
            | EventKind::SourceGroupComplete(_)
            | EventKind::AfterNodeDelete(_)
            | EventKind::AfterClearSession => self.update_tree(graph),
            EventKind::BeforeProgressiveLoading => self.progressive_loading = true,
            EventKind::AfterProgressiveLoading => {
                self.progressive_loading = false;
                self.update_tree(graph);
                if let Some(view) = graph.view_node() {
                    self.update_inputs(graph, view);
                }
            }
            EventKind::BeforeViewChange => self.before_view_change(graph),
            EventKind::AfterViewChange => self.after_view_change(graph),
            EventKind::InputsChanged(node) => self.inputs_changed(graph, *node, in_drop),
            EventKind::PropertyChanged(path) => self.property_changed(graph, path),
            EventKind::BeforeSessionDeletion => {
                self.quitting = true;
                self.deactivate();
            }
            EventKind::ViewEditModeActivated => {
                let view = graph.view_node().map(|n| n.to_string()).unwrap_or_default();
                graph.send_internal_event(LOAD_UI_EVENT, &view);
            }
        }

        self.replaying_muted = false;
        Propagation::Continue
    }

    fn before_view_change(&mut self, graph: &mut dyn GraphFacade) {
        self.editors.hide_all();
        if let Some(old) = self.shown_view.take() {
            if graph.node_exists(old) {
                state::save_tab(graph, old, self.tab);
            }
            self.set_node_status(old, "");
        }
    }

    fn after_view_change(&mut self, graph: &mut dyn GraphFacade) {
        let Some(view) = graph.view_node() else {
            return;
        };
        if self.tree.is_empty() {
            self.update_tree(graph);
        }
        if let Some(old) = self.shown_view.replace(view)
            && old != view
        {
            self.set_node_status(old, "");
        }
        self.select_viewable_node(graph);
        self.set_node_status(view, VIEW_MARK);
        self.update_nav(graph);
        if let Some(tab) = state::restore_tab(graph, view) {
            self.tab = tab;
        }
        let enabled = !graph.node_type(view).is_ok_and(|t| t.is_source());
        self.inputs.set_enabled(enabled);
        graph.send_internal_event(LOAD_UI_EVENT, view.as_str());
    }

    fn inputs_changed(&mut self, graph: &dyn GraphFacade, node: NodeId, in_drop: bool) {
        let Some(view) = graph.view_node() else {
            return;
        };
        if node == view {
            self.update_inputs(graph, node);
        }
        if !in_drop && graph.node_type(node).is_ok_and(|t| t.is_folder()) {
            self.schedule_tree_update();
        }
    }

    fn property_changed(&mut self, graph: &dyn GraphFacade, path: &str) {
        let Some(parsed) = PropertyPath::parse(path) else {
            return;
        };
        if parsed.is("ui", "name") {
            self.schedule_tree_update();
            self.update_nav(graph);
        } else if parsed.is(props::SM_STATE, props::SORT_KEY)
            || parsed.is(props::SM_STATE, props::SORT_KEY_PARENT)
        {
            self.schedule_tree_update();
        } else if parsed.is("request", "imageComponent")
            && let Some(source) = parsed.node()
        {
            self.refresh_selection_dots(graph, path, source);
        }
    }

    // ─── Timers ──────────────────────────────────────────────────────────

    /// Run every debounced action whose quiet period has elapsed by `now`.
    pub fn poll_timers(&mut self, graph: &mut dyn GraphFacade, now: Instant) {
        if self.quitting {
            return;
        }
        self.poll_inputs(graph, now);
        if self.sort_timer.fire_due(now) {
            for folder in std::mem::take(&mut self.sort_folders) {
                self.assign_sort_order(graph, folder);
            }
        }
        if self.tree_timer.fire_due(now) {
            self.update_tree(graph);
        }
    }

    pub fn has_pending_timers(&self) -> bool {
        self.inputs.is_flush_pending() || self.tree_timer.is_pending() || self.sort_timer.is_pending()
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    /// Start dragging `items`. FOLDERS accepts the drop only when every
    /// dragged row is a folder.
    pub fn begin_drag(&mut self, graph: &dyn GraphFacade, items: &[ItemId]) {
        let items: Vec<ItemId> = items
            .iter()
            .copied()
            .filter(|id| self.tree.item(*id).is_some_and(|i| i.flags.draggable))
            .collect();
        let paths: Vec<NodePath> = items.iter().map(|id| self.tree.node_path(*id)).collect();
        let only_folders = paths.iter().all(|p| {
            p.first()
                .is_some_and(|n| graph.node_type(*n).is_ok_and(|t| t.is_folder()))
        });
        if let Some(folders) = self.tree.category_item(Category::Folders)
            && let Some(item) = self.tree.item_mut(folders)
        {
            item.flags.drop_target = only_folders;
        }
        self.drag = Some(DragState { items, paths });
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
        if let Some(folders) = self.tree.category_item(Category::Folders)
            && let Some(item) = self.tree.item_mut(folders)
        {
            item.flags.drop_target = true;
        }
    }

    /// Drop the dragged rows under `target` at `row`. Returns false when the
    /// target refuses the drop.
    pub fn drop_on_tree(
        &mut self,
        graph: &mut dyn GraphFacade,
        target: ItemId,
        row: usize,
        action: DropAction,
    ) -> bool {
        let Some(drag) = self.drag.clone() else {
            return false;
        };
        if !self.tree.item(target).is_some_and(|t| t.flags.drop_target) {
            self.end_drag();
            return false;
        }

        let start = graph.event_cursor();
        let hold = self.dropping.hold();
        self.drop_action = Some(action);
        for (offset, item) in drag.items.iter().enumerate() {
            let at = row.saturating_add(offset);
            let dropped = match action {
                DropAction::Move => {
                    self.tree.move_item(*item, Some(target), at);
                    Some(*item)
                }
                DropAction::Copy => self.tree.copy_item(*item, Some(target), at),
            };
            if let Some(dropped) = dropped
                && self.tree.parent(dropped) == Some(target)
            {
                self.item_changed(graph, dropped, &drag.paths);
            }
        }
        self.drop_action = None;
        drop(hold);
        self.dropping.mute(start..graph.event_cursor());
        self.end_drag();
        true
    }

    /// Reconcile a row whose parentage or text changed.
    fn item_changed(&mut self, graph: &mut dyn GraphFacade, id: ItemId, dragged: &[NodePath]) {
        let Some(item) = self.tree.item(id).cloned() else {
            return;
        };
        let Some(node) = item.node else {
            return;
        };
        let parent = self.tree.parent_node(id);

        match self.drop_action {
            Some(action) => {
                let node = match &item.kind {
                    ItemKind::Node => node,
                    ItemKind::SubComponent(sub) => {
                        let sub = sub.clone();
                        let resolved = self.with_updates_suspended(graph, |_, g| {
                            subcomponent::resolve_or_materialize(g, &sub, node)
                        });
                        match resolved {
                            Ok(n) => n,
                            Err(e) => {
                                log::debug!("component {}: {e}", sub.hash());
                                return;
                            }
                        }
                    }
                    _ => return,
                };
                let parent = parent.filter(|p| graph.node_exists(*p));
                if let Some(p) = parent
                    && !ops::has_input(graph, Some(p), node)
                    && !ops::add_input(graph, p, node)
                {
                    // refused: the graph stays as it was and the row reverts
                    self.schedule_tree_update();
                    return;
                }
                if action == DropAction::Move && item.kind == ItemKind::Node {
                    for path in dragged.iter().filter(|p| p.first() == Some(&node)) {
                        if let Some(former) = path.get(1).copied()
                            && graph.node_exists(former)
                            && parent != Some(former)
                        {
                            ops::remove_input(graph, former, node);
                        }
                    }
                }
                if let Some(row) = self.tree.item_mut(id) {
                    row.parent_node = parent;
                }
                if let Some(p) = parent {
                    self.schedule_folder_sort(graph, p);
                }
            }
            None => {
                if item.kind == ItemKind::Node {
                    let text = item.text.clone();
                    self.with_updates_suspended(graph, |_, g| {
                        if let Err(e) = g.set_display_name(node, &text) {
                            log::debug!("rename {node}: {e}");
                        }
                    });
                }
            }
        }
    }

    /// Edit the text of a node row; the graph name follows.
    pub fn rename_item(&mut self, graph: &mut dyn GraphFacade, id: ItemId, text: &str) {
        let Some(item) = self.tree.item_mut(id) else {
            return;
        };
        if !item.flags.editable {
            return;
        }
        item.text = text.to_string();
        self.item_changed(graph, id, &[]);
    }

    fn schedule_folder_sort(&mut self, graph: &dyn GraphFacade, folder: NodeId) {
        if !graph.node_type(folder).is_ok_and(|t| t.is_folder()) {
            return;
        }
        if !self.sort_folders.contains(&folder) {
            self.sort_folders.push(folder);
        }
        self.sort_timer.schedule();
    }

    /// Persist the row order under `folder` as sort keys.
    fn assign_sort_order(&mut self, graph: &mut dyn GraphFacade, folder: NodeId) {
        let Some(item) = self.tree.items_of_node(folder).first().copied() else {
            return;
        };
        let children: Vec<Option<NodeId>> = self
            .tree
            .children(item)
            .iter()
            .map(|c| self.tree.item(*c).and_then(|i| i.node))
            .collect();
        for (i, child) in children.into_iter().enumerate() {
            if let Some(child) = child {
                state::set_sort_key(graph, child, Some(folder), i as i32);
            }
        }
    }

    // ─── Row interaction ─────────────────────────────────────────────────

    /// Expand or collapse a row and persist it.
    pub fn set_item_expanded(&mut self, graph: &mut dyn GraphFacade, id: ItemId, expanded: bool) {
        let parent = self.tree.parent_node(id);
        let Some(item) = self.tree.item_mut(id) else {
            return;
        };
        item.expanded = expanded;
        match (&item.kind, item.node) {
            (ItemKind::SubComponent(sub), Some(node)) => {
                let hash = sub.hash();
                state::set_sub_component_expanded(graph, node, &hash, expanded);
            }
            (ItemKind::Node, Some(node)) if graph.node_exists(node) => {
                state::set_expanded_in_parent(graph, node, parent, expanded);
            }
            (ItemKind::Category(c), _) => {
                state::set_category_expanded(graph, c.label(), expanded);
            }
            _ => {}
        }
    }

    /// Double-click: view the row's node, and select its sub-component.
    pub fn view_by_item(&mut self, graph: &mut dyn GraphFacade, id: ItemId) {
        let Some(item) = self.tree.item(id) else {
            return;
        };
        let Some(node) = item.node else {
            return;
        };
        let sub = item.sub_component().cloned();
        self.view_component(graph, node, sub.as_ref());
    }

    /// Single click. A click in the selection-dot column of a view, layer or
    /// channel row views it.
    pub fn item_pressed(&mut self, graph: &mut dyn GraphFacade, id: ItemId, column: usize) {
        let kind = self
            .tree
            .item(id)
            .map(|i| i.kind.sub_component_kind())
            .unwrap_or_default();
        if column == 1
            && matches!(
                kind,
                SubComponentKind::View | SubComponentKind::Layer | SubComponentKind::Channel
            )
        {
            self.view_by_item(graph, id);
        }
    }

    /// Make `node` the view node when it is not already, then issue the
    /// image request of `sub`. Re-issuing the active request on an unchanged
    /// view clears it.
    pub(crate) fn view_component(
        &mut self,
        graph: &mut dyn GraphFacade,
        node: NodeId,
        sub: Option<&SubComponent>,
    ) {
        self.with_updates_suspended(graph, |_, g| {
            let mut view_changed = false;
            if g.view_node() != Some(node) {
                match g.set_view_node(node) {
                    Ok(()) => view_changed = true,
                    Err(e) => log::debug!("view {node}: {e}"),
                }
            }
            if let Some(sub) = sub.filter(|s| s.kind != SubComponentKind::Media) {
                let value = sub.request_value();
                let current = g.image_request();
                let next = if !view_changed && current == value {
                    Vec::new()
                } else {
                    value
                };
                if next != current
                    && let Err(e) = g.set_image_request(&next)
                {
                    log::debug!("image request: {e}");
                }
            }
        });
        if let Some(view) = graph.view_node() {
            self.update_inputs(graph, view);
        }
        self.update_nav(graph);
    }

    /// Switch the node panel tab and remember it for the view node.
    pub fn set_tab(&mut self, graph: &mut dyn GraphFacade, tab: i32) {
        self.tab = tab;
        if let Some(view) = graph.view_node() {
            state::save_tab(graph, view, tab);
        }
    }
}

// ─── Editor host ─────────────────────────────────────────────────────────

impl EditorHost for SessionManager {
    fn is_ready(&self) -> bool {
        self.ui_created
    }

    fn add_editor(&mut self, label: &str, panel: PanelHandle) -> Result<(), GraphError> {
        if !self.is_ready() {
            return Err(GraphError::Resource(format!(
                "editor {label} registered before the session manager exists"
            )));
        }
        self.editors.add(label, panel);
        Ok(())
    }

    fn use_editor(&mut self, label: &str) {
        self.editors.show(label);
    }

    fn reload_editor_tab(&mut self, graph: &mut dyn GraphFacade) {
        self.editors.hide_all();
        let view = graph.view_node().map(|n| n.to_string()).unwrap_or_default();
        graph.send_internal_event(LOAD_UI_EVENT, &view);
    }

    fn aux_file_path(&self, file_name: &str) -> Result<PathBuf, GraphError> {
        self.editors.resolve(file_name)
    }
}
