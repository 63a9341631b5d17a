//! Session tree view model.
//!
//! An arena of typed rows: the six category headers, node rows (folders
//! nest their inputs), sub-component rows of source media and inert
//! placeholder rows. Rows carry everything the toolkit needs to draw them;
//! the synchronizer fills the arena from the graph and reads it back after
//! drops and renames.

use smallvec::SmallVec;
use sm_core::subcomponent::SubComponent;
use sm_core::{Category, NodeId, NodeType, SubComponentKind};

pub type ItemId = usize;

/// Nodes from a row up to the top level: the row's own node first, then the
/// nodes of its ancestors. Categories contribute nothing and consecutive
/// repeats (sub-component rows of one source) collapse.
pub type NodePath = SmallVec<[NodeId; 4]>;

// ─── Rows ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Category(Category),
    Node,
    SubComponent(SubComponent),
    Placeholder,
}

impl ItemKind {
    pub fn sub_component_kind(&self) -> SubComponentKind {
        match self {
            ItemKind::SubComponent(sub) => sub.kind,
            _ => SubComponentKind::NotASubComponent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    pub enabled: bool,
    pub selectable: bool,
    pub draggable: bool,
    pub drop_target: bool,
    pub editable: bool,
}

impl ItemFlags {
    pub const INERT: Self = Self {
        enabled: true,
        selectable: false,
        draggable: false,
        drop_target: false,
        editable: false,
    };

    /// Ordinary node row; folders also accept drops.
    pub fn node(folder: bool) -> Self {
        Self {
            enabled: true,
            selectable: true,
            draggable: true,
            drop_target: folder,
            editable: true,
        }
    }

    pub fn sub_component() -> Self {
        Self {
            enabled: true,
            selectable: true,
            draggable: true,
            drop_target: false,
            editable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Icon {
    #[default]
    None,
    Node(NodeType),
    Component(SubComponentKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeItem {
    pub text: String,
    pub kind: ItemKind,
    /// Owning node. Sub-component and placeholder rows carry their source.
    pub node: Option<NodeId>,
    /// Believed structural parent; may lag the graph during a drop.
    pub parent_node: Option<NodeId>,
    pub sort_key: i32,
    pub flags: ItemFlags,
    pub tooltip: Option<String>,
    pub icon: Icon,
    /// Selection-indicator column of sub-component rows.
    pub selection_dot: Option<bool>,
    /// Status column (current view check mark).
    pub status: String,
    pub expanded: bool,
    pub italic: bool,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
}

impl TreeItem {
    pub fn new(text: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            text: text.into(),
            kind,
            node: None,
            parent_node: None,
            sort_key: 0,
            flags: ItemFlags::INERT,
            tooltip: None,
            icon: Icon::None,
            selection_dot: None,
            status: String::new(),
            expanded: false,
            italic: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn sub_component(&self) -> Option<&SubComponent> {
        match &self.kind {
            ItemKind::SubComponent(sub) => Some(sub),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self.kind {
            ItemKind::Category(c) => Some(c),
            _ => None,
        }
    }
}

// ─── Model ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TreeModel {
    items: Vec<TreeItem>,
    roots: Vec<ItemId>,
    selection: Vec<ItemId>,
}

impl TreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.roots.clear();
        self.selection.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Store a detached row.
    pub fn insert(&mut self, item: TreeItem) -> ItemId {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Store a row as the last child of `parent`, or as the last root.
    pub fn append(&mut self, parent: Option<ItemId>, item: TreeItem) -> ItemId {
        let id = self.insert(item);
        self.attach(id, parent, usize::MAX);
        id
    }

    /// Link a detached row under `parent` at `row` (clamped).
    pub fn attach(&mut self, id: ItemId, parent: Option<ItemId>, row: usize) {
        if let Some(item) = self.items.get_mut(id) {
            item.parent = parent;
        }
        let siblings = match parent {
            Some(p) => match self.items.get_mut(p) {
                Some(item) => &mut item.children,
                None => return,
            },
            None => &mut self.roots,
        };
        siblings.insert(row.min(siblings.len()), id);
    }

    fn detach(&mut self, id: ItemId) {
        let parent = self.items.get(id).and_then(|i| i.parent);
        let siblings = match parent {
            Some(p) => match self.items.get_mut(p) {
                Some(item) => &mut item.children,
                None => return,
            },
            None => &mut self.roots,
        };
        siblings.retain(|c| *c != id);
        if let Some(item) = self.items.get_mut(id) {
            item.parent = None;
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&TreeItem> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut TreeItem> {
        self.items.get_mut(id)
    }

    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.items
            .get(id)
            .map(|i| i.children.as_slice())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.items.get(id).and_then(|i| i.parent)
    }

    /// Node of the parent row; `None` under a category or at the top.
    pub fn parent_node(&self, id: ItemId) -> Option<NodeId> {
        self.parent(id)
            .and_then(|p| self.item(p))
            .and_then(|p| p.node)
    }

    /// Category row of `category`, if it made it into the model.
    pub fn category_item(&self, category: Category) -> Option<ItemId> {
        self.roots
            .iter()
            .copied()
            .find(|r| self.item(*r).and_then(TreeItem::category) == Some(category))
    }

    // ─── Structure edits ─────────────────────────────────────────────────

    /// Relink `id` (with its subtree) under `parent` at `row`.
    pub fn move_item(&mut self, id: ItemId, parent: Option<ItemId>, row: usize) {
        if parent.is_some_and(|p| p == id || self.is_ancestor(id, p)) {
            return;
        }
        self.detach(id);
        self.attach(id, parent, row);
    }

    /// Deep-copy the subtree at `id` under `parent` at `row`.
    pub fn copy_item(&mut self, id: ItemId, parent: Option<ItemId>, row: usize) -> Option<ItemId> {
        let mut copy = self.items.get(id)?.clone();
        let children = std::mem::take(&mut copy.children);
        copy.parent = None;
        let new_id = self.insert(copy);
        self.attach(new_id, parent, row);
        for (i, child) in children.into_iter().enumerate() {
            self.copy_item(child, Some(new_id), i);
        }
        Some(new_id)
    }

    fn is_ancestor(&self, ancestor: ItemId, mut id: ItemId) -> bool {
        while let Some(p) = self.parent(id) {
            if p == ancestor {
                return true;
            }
            id = p;
        }
        false
    }

    /// Stable sort of every level by ascending sort key.
    pub fn sort(&mut self) {
        let mut roots = std::mem::take(&mut self.roots);
        self.sort_level(&mut roots);
        self.roots = roots;
    }

    fn sort_level(&mut self, level: &mut Vec<ItemId>) {
        level.sort_by_key(|id| self.items.get(*id).map_or(i32::MAX, |i| i.sort_key));
        for id in level.iter().copied() {
            let Some(item) = self.items.get_mut(id) else {
                continue;
            };
            let mut children = std::mem::take(&mut item.children);
            self.sort_level(&mut children);
            if let Some(item) = self.items.get_mut(id) {
                item.children = children;
            }
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Attached rows in display order.
    pub fn pre_order(&self) -> Vec<ItemId> {
        let mut out = Vec::with_capacity(self.items.len());
        let mut stack: Vec<ItemId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Node rows of `node`, in display order.
    pub fn items_of_node(&self, node: NodeId) -> Vec<ItemId> {
        self.pre_order()
            .into_iter()
            .filter(|id| {
                self.item(*id)
                    .is_some_and(|i| i.kind == ItemKind::Node && i.node == Some(node))
            })
            .collect()
    }

    /// Sub-component rows listed under source `node`.
    pub fn sub_items_of_node(&self, node: NodeId) -> Vec<ItemId> {
        self.pre_order()
            .into_iter()
            .filter(|id| {
                self.item(*id)
                    .is_some_and(|i| i.sub_component().is_some() && i.node == Some(node))
            })
            .collect()
    }

    pub fn node_path(&self, id: ItemId) -> NodePath {
        let mut path = NodePath::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Some(node) = self.item(current).and_then(|i| i.node)
                && path.last() != Some(&node)
            {
                path.push(node);
            }
            cursor = self.parent(current);
        }
        path
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selection(&self) -> &[ItemId] {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select(&mut self, id: ItemId) {
        let selectable = self.item(id).is_some_and(|i| i.flags.selectable);
        if selectable && !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    pub fn set_selection(&mut self, ids: &[ItemId]) {
        self.selection.clear();
        for id in ids {
            self.select(*id);
        }
    }

    /// Owning nodes of the selected rows.
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection
            .iter()
            .filter_map(|id| self.item(*id).and_then(|i| i.node))
            .collect()
    }

    // ─── Display ─────────────────────────────────────────────────────────

    /// Indented text rendering: one line per row, with the selection dot
    /// (`●` chosen, `○` not) and the status column appended.
    pub fn outline(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for root in &self.roots {
            self.outline_into(*root, 0, &mut lines);
        }
        lines
    }

    fn outline_into(&self, id: ItemId, depth: usize, lines: &mut Vec<String>) {
        let Some(item) = self.item(id) else {
            return;
        };
        let mut line = format!("{}{}", "  ".repeat(depth), item.text);
        match item.selection_dot {
            Some(true) => line.push_str(" ●"),
            Some(false) => line.push_str(" ○"),
            None => {}
        }
        if !item.status.is_empty() {
            line.push(' ');
            line.push_str(&item.status);
        }
        lines.push(line);
        for child in &item.children {
            self.outline_into(*child, depth + 1, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(text: &str, node: &str, key: i32) -> TreeItem {
        let mut item = TreeItem::new(text, ItemKind::Node);
        item.node = Some(NodeId::intern(node));
        item.sort_key = key;
        item.flags = ItemFlags::node(false);
        item
    }

    #[test]
    fn sort_is_stable_and_recursive() {
        let mut t = TreeModel::new();
        let cat = t.append(None, TreeItem::new("STACKS", ItemKind::Category(Category::Stacks)));
        t.append(Some(cat), row("b", "treeB", 5));
        t.append(Some(cat), row("a", "treeA", 1));
        t.append(Some(cat), row("c", "treeC", 5));
        t.sort();
        assert_eq!(t.outline(), vec!["STACKS", "  a", "  b", "  c"]);
    }

    #[test]
    fn move_relinks_subtree() {
        let mut t = TreeModel::new();
        let f1 = t.append(None, row("f1", "treeF1", 0));
        let f2 = t.append(None, row("f2", "treeF2", 0));
        let x = t.append(Some(f1), row("x", "treeX", 0));
        t.append(Some(x), row("y", "treeY", 0));
        t.move_item(x, Some(f2), 0);
        assert_eq!(t.outline(), vec!["f1", "f2", "  x", "    y"]);
        assert_eq!(t.parent_node(x), Some(NodeId::intern("treeF2")));
    }

    #[test]
    fn move_into_own_subtree_is_refused() {
        let mut t = TreeModel::new();
        let f1 = t.append(None, row("f1", "treeF1", 0));
        let x = t.append(Some(f1), row("x", "treeX", 0));
        t.move_item(f1, Some(x), 0);
        assert_eq!(t.outline(), vec!["f1", "  x"]);
    }

    #[test]
    fn copy_leaves_source_row() {
        let mut t = TreeModel::new();
        let f1 = t.append(None, row("f1", "treeF1", 0));
        let f2 = t.append(None, row("f2", "treeF2", 0));
        let x = t.append(Some(f1), row("x", "treeX", 0));
        let copy = t.copy_item(x, Some(f2), 0).unwrap();
        assert_ne!(copy, x);
        assert_eq!(t.outline(), vec!["f1", "  x", "f2", "  x"]);
        assert_eq!(t.items_of_node(NodeId::intern("treeX")).len(), 2);
    }

    #[test]
    fn node_path_skips_categories_and_repeats() {
        let mut t = TreeModel::new();
        let cat = t.append(None, TreeItem::new("FOLDERS", ItemKind::Category(Category::Folders)));
        let f = t.append(Some(cat), row("f", "treeF", 0));
        let s = t.append(Some(f), row("s", "treeS", 0));
        let mut sub = TreeItem::new("R", ItemKind::Placeholder);
        sub.node = Some(NodeId::intern("treeS"));
        let leaf = t.append(Some(s), sub);
        let path: Vec<_> = t.node_path(leaf).into_iter().collect();
        assert_eq!(path, vec![NodeId::intern("treeS"), NodeId::intern("treeF")]);
    }

    #[test]
    fn categories_are_not_selectable() {
        let mut t = TreeModel::new();
        let cat = t.append(None, TreeItem::new("OTHER", ItemKind::Category(Category::Other)));
        t.select(cat);
        assert!(t.selection().is_empty());
    }
}
