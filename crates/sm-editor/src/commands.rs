//! Structural commands issued from the session tree.
//!
//! Each command reads the tree selection, makes its graph edits (muting
//! the ones whose events would otherwise rebuild the tree mid-command) and
//! leaves the rebuild to the queued events or a scheduled update.

use crate::sync::SessionManager;
use crate::tree::{ItemKind, NodePath};
use sm_core::subcomponent;
use sm_core::{GraphError, GraphFacade, NodeId, NodeType, ops, state};

/// How a new folder treats the selected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewFolder {
    /// Create it empty.
    Empty,
    /// Collect the selection and detach it from its former parents.
    Move,
    /// Collect the selection and leave the former parents alone.
    Copy,
}

impl NewFolder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "empty" => Some(NewFolder::Empty),
            "move" => Some(NewFolder::Move),
            "copy" => Some(NewFolder::Copy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStep {
    Next,
    Previous,
}

// ─── Generated images ────────────────────────────────────────────────────

/// Synthetic media the host can render without a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    SrgbColorChart,
    AcesColorChart,
    ColorBars,
    Black,
    Solid,
    Blank,
}

impl Pattern {
    fn protocol(self) -> &'static str {
        match self {
            Pattern::SrgbColorChart => "srgbcolorchart",
            Pattern::AcesColorChart => "acescolorchart",
            Pattern::ColorBars => "smptebars",
            Pattern::Black => "black",
            Pattern::Solid => "solid",
            Pattern::Blank => "blank",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Pattern::SrgbColorChart => "SRGBMacbethColorChart",
            Pattern::AcesColorChart => "ACESMacbethColorChart",
            Pattern::ColorBars => "SMPTEColorBars",
            Pattern::Black => "Black",
            Pattern::Solid => "SolidColor",
            Pattern::Blank => "Blank",
        }
    }
}

/// Parameters of a generated source.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub pattern: Pattern,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Length in frames.
    pub length: u32,
    /// RGB in `0.0..=1.0`; only solid images use it.
    pub color: [f64; 3],
    pub name: String,
}

impl GeneratedImage {
    pub fn new(pattern: Pattern) -> Self {
        let color = if pattern == Pattern::Solid {
            [0.5, 0.5, 0.5]
        } else {
            [0.0, 0.0, 0.0]
        };
        Self {
            pattern,
            width: 1920,
            height: 1080,
            fps: 24.0,
            length: 24,
            color,
            name: pattern.default_name().to_string(),
        }
    }

    /// Media name the host decodes into frames.
    pub fn media_spec(&self) -> String {
        let [red, green, blue] = self.color;
        format!(
            "{},width={},height={},fps={},start=1,end={},red={red},green={green},blue={blue}.movieproc",
            self.pattern.protocol(),
            self.width,
            self.height,
            self.fps,
            self.length,
        )
    }
}

// ─── Commands ────────────────────────────────────────────────────────────

impl SessionManager {
    /// Create a folder from the selection and view it. Returns the folder,
    /// or `None` when the graph refused the selection.
    pub fn new_folder(&mut self, graph: &mut dyn GraphFacade, mode: NewFolder) -> Option<NodeId> {
        let paths: Vec<NodePath> = self
            .tree
            .selection()
            .iter()
            .map(|id| self.tree.node_path(*id))
            .filter(|p| !p.is_empty())
            .collect();
        let nodes: Vec<NodeId> = paths.iter().map(|p| p[0]).collect();

        let folder = match graph.create_node(&NodeType::FolderGroup, "Folder") {
            Ok(folder) => folder,
            Err(e) => {
                log::warn!("cannot create folder: {e}");
                return None;
            }
        };

        if let Some(first) = paths.first().cloned() {
            if mode != NewFolder::Empty && !ops::set_inputs_checked(graph, folder, &nodes) {
                if let Err(e) = graph.delete_node(folder) {
                    log::debug!("discard {folder}: {e}");
                }
                return None;
            }

            self.with_updates_suspended(graph, |_, g| {
                if mode == NewFolder::Move {
                    for path in &paths {
                        if let Some(former) = path.get(1).copied()
                            && g.node_exists(former)
                        {
                            ops::remove_input(g, former, path[0]);
                        }
                    }
                }
                if let Some(container) = first.get(1).copied()
                    && g.node_exists(container)
                {
                    ops::add_input(g, container, folder);
                    let key = state::sort_key(g, first[0], Some(container));
                    state::set_sort_key(g, folder, Some(container), key);
                }
            });
        }

        let named: &[NodeId] = if mode == NewFolder::Empty { &[] } else { &nodes };
        self.with_updates_suspended(graph, |_, g| rename_by_type(g, folder, named));

        if !paths.is_empty()
            && let Err(e) = graph.set_view_node(folder)
        {
            log::debug!("view {folder}: {e}");
        }
        Some(folder)
    }

    /// Create a node of `node_type` fed by the selection and view it.
    pub fn add_node_of_type(
        &mut self,
        graph: &mut dyn GraphFacade,
        node_type: &NodeType,
    ) -> Option<NodeId> {
        let inputs = self.selected_converted(graph);
        let node = match graph.create_node(node_type, "") {
            Ok(node) => node,
            Err(e) => {
                log::warn!("cannot create {node_type}: {e}");
                return None;
            }
        };
        if !ops::set_inputs_checked(graph, node, &inputs) {
            if let Err(e) = graph.delete_node(node) {
                log::debug!("discard {node}: {e}");
            }
            return None;
        }
        rename_by_type(graph, node, &inputs);
        if let Err(e) = graph.set_view_node(node) {
            log::debug!("view {node}: {e}");
        }
        Some(node)
    }

    /// Add a generated source named after its pattern settings.
    pub fn add_generated_source(
        &mut self,
        graph: &mut dyn GraphFacade,
        image: &GeneratedImage,
    ) -> Result<NodeId, GraphError> {
        let group = graph.add_source(&[image.media_spec()])?;
        graph.set_display_name(group, &image.name)?;
        Ok(group)
    }

    /// Delete the selected rows. A node listed in several folders is only
    /// taken out of the folder it was selected under.
    pub fn delete_selected(&mut self, graph: &mut dyn GraphFacade) {
        let targets: Vec<(NodeId, Option<NodeId>)> = self
            .tree
            .selection()
            .iter()
            .filter_map(|id| {
                let item = self.tree.item(*id)?;
                (item.kind == ItemKind::Node)
                    .then_some(item.node)
                    .flatten()
                    .map(|n| (n, self.tree.parent_node(*id)))
            })
            .collect();

        for (node, parent) in targets {
            if !graph.node_exists(node) {
                continue;
            }
            let parent_is_folder = parent
                .filter(|p| graph.node_exists(*p))
                .is_some_and(|p| graph.node_type(p).is_ok_and(|t| t.is_folder()));
            match parent {
                Some(folder) if parent_is_folder && ops::folder_output_count(graph, node) > 1 => {
                    ops::remove_input(graph, folder, node);
                }
                _ => self.with_updates_suspended(graph, |_, g| {
                    if let Err(e) = g.delete_node(node) {
                        log::debug!("delete {node}: {e}");
                    }
                }),
            }
        }
        self.schedule_tree_update();
    }

    /// Step through the view history.
    pub fn navigate(&mut self, graph: &mut dyn GraphFacade, step: ViewStep) {
        self.with_updates_suspended(graph, |_, g| {
            let target = match step {
                ViewStep::Next => g.next_view_node(),
                ViewStep::Previous => g.previous_view_node(),
            };
            if let Some(target) = target
                && let Err(e) = g.set_view_node(target)
            {
                log::debug!("navigate to {target}: {e}");
            }
        });
        if let Some(view) = graph.view_node() {
            self.update_inputs(graph, view);
        }
    }

    /// Nodes of the selected rows; sub-components are resolved to their
    /// source node, which is created on first use.
    fn selected_converted(&mut self, graph: &mut dyn GraphFacade) -> Vec<NodeId> {
        let selected: Vec<(NodeId, ItemKind)> = self
            .tree
            .selection()
            .iter()
            .filter_map(|id| self.tree.item(*id))
            .filter_map(|item| item.node.map(|n| (n, item.kind.clone())))
            .collect();

        let mut nodes = Vec::with_capacity(selected.len());
        for (node, kind) in selected {
            if !graph.node_exists(node) {
                continue;
            }
            match kind {
                ItemKind::SubComponent(sub) => {
                    let resolved = self.with_updates_suspended(graph, |_, g| {
                        subcomponent::resolve_or_materialize(g, &sub, node)
                    });
                    match resolved {
                        Ok(n) => nodes.push(n),
                        Err(e) => log::debug!("component {}: {e}", sub.hash()),
                    }
                }
                ItemKind::Node => nodes.push(node),
                _ => {}
            }
        }
        nodes
    }
}

/// Name a container after its type and inputs: `Empty Stack`,
/// `Stack of A`, `Stack of A and B`, `Stack of 5 views`.
pub fn rename_by_type(graph: &mut dyn GraphFacade, node: NodeId, inputs: &[NodeId]) {
    let base = match graph.node_type(node) {
        Ok(t) => t.base_name().to_string(),
        Err(e) => {
            log::debug!("rename {node}: {e}");
            return;
        }
    };
    let name = match inputs {
        [] => format!("Empty {base}"),
        [a] => format!("{base} of {}", graph.display_name(*a)),
        [a, b] => format!(
            "{base} of {} and {}",
            graph.display_name(*a),
            graph.display_name(*b)
        ),
        _ => format!("{base} of {} views", inputs.len()),
    };
    if let Err(e) = graph.set_display_name(node, &name) {
        log::debug!("rename {node}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sm_core::MemoryGraph;

    #[test]
    fn names_follow_input_count() {
        let mut g = MemoryGraph::new();
        let s = g.add_node(NodeType::StackGroup, "cmdStack");
        let ins: Vec<NodeId> = ["cmdA", "cmdB", "cmdC"]
            .iter()
            .map(|n| g.add_node(NodeType::SourceGroup, n))
            .collect();

        rename_by_type(&mut g, s, &[]);
        assert_eq!(g.display_name(s), "Empty Stack");
        rename_by_type(&mut g, s, &ins[..1]);
        assert_eq!(g.display_name(s), "Stack of cmdA");
        rename_by_type(&mut g, s, &ins[..2]);
        assert_eq!(g.display_name(s), "Stack of cmdA and cmdB");
        rename_by_type(&mut g, s, &ins);
        assert_eq!(g.display_name(s), "Stack of 3 views");
    }

    #[test]
    fn generated_media_spec() {
        let mut image = GeneratedImage::new(Pattern::Solid);
        image.width = 640;
        image.height = 480;
        image.length = 48;
        image.color = [1.0, 0.25, 0.0];
        assert_eq!(
            image.media_spec(),
            "solid,width=640,height=480,fps=24,start=1,end=48,red=1,green=0.25,blue=0.movieproc"
        );
    }

    #[test]
    fn folder_modes_parse() {
        assert_eq!(NewFolder::from_name("move"), Some(NewFolder::Move));
        assert_eq!(NewFolder::from_name("Folder"), None);
    }
}
