//! In-memory host graph.
//!
//! `MemoryGraph` implements both facades on top of a petgraph DAG so the
//! editor engine can run without a media application: integration tests use
//! it to observe exactly which graph calls the engine makes, and the
//! `sm-tree` tool loads session snapshots into it.

use crate::facade::*;
use crate::id::NodeId;
use crate::model::*;
use crate::props::{self, PropertyPath};
use kurbo::{Point, Rect};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap};

// ─── Nodes ───────────────────────────────────────────────────────────────

/// One node of the session.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub id: NodeId,
    pub node_type: NodeType,
    /// Ordered inputs. Edges mirror this list.
    pub inputs: Vec<NodeId>,
    /// Media of a file or image source.
    pub media: Vec<MediaInfo>,
    /// Owning group of a member node.
    pub group: Option<NodeId>,
    /// Listed among the view nodes.
    pub viewable: bool,
}

impl NodeEntry {
    fn new(id: NodeId, node_type: NodeType) -> Self {
        Self {
            id,
            node_type,
            inputs: Vec::new(),
            media: Vec::new(),
            group: None,
            viewable: true,
        }
    }
}

/// Untransformed screen placement of an image, in pixels, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

// ─── Graph ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MemoryGraph {
    /// Edges run from an input to the node consuming it.
    pub graph: StableDiGraph<NodeEntry, ()>,
    id_index: HashMap<NodeId, NodeIndex>,
    properties: BTreeMap<String, PropertyValue>,

    view: Option<NodeId>,
    history: Vec<NodeId>,
    history_pos: usize,

    events: Vec<GraphEvent>,
    next_seq: u64,

    set_inputs_log: Vec<(NodeId, Vec<NodeId>)>,
    view_log: Vec<NodeId>,
    alerts: Vec<(String, String)>,
    feedback: Vec<String>,
    internal_events: Vec<(String, String)>,

    /// Transform node placed in front of each input.
    transforms: HashMap<NodeId, NodeId>,
    placements: HashMap<NodeId, ImagePlacement>,
    aspects: HashMap<NodeId, f64>,
    cursor: Cursor,
    redraws: usize,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            id_index: HashMap::new(),
            properties: BTreeMap::new(),
            view: None,
            history: Vec::new(),
            history_pos: 0,
            events: Vec::new(),
            next_seq: 0,
            set_inputs_log: Vec::new(),
            view_log: Vec::new(),
            alerts: Vec::new(),
            feedback: Vec::new(),
            internal_events: Vec::new(),
            transforms: HashMap::new(),
            placements: HashMap::new(),
            aspects: HashMap::new(),
            cursor: Cursor::Arrow,
            redraws: 0,
        }
    }

    pub fn get_by_id(&self, id: NodeId) -> Option<&NodeEntry> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    fn entry(&self, id: NodeId) -> Result<&NodeEntry, GraphError> {
        self.get_by_id(id).ok_or(GraphError::NodeNotFound(id))
    }

    fn insert(&mut self, entry: NodeEntry) -> NodeId {
        let id = entry.id;
        let idx = self.graph.add_node(entry);
        self.id_index.insert(id, idx);
        id
    }

    fn emit(&mut self, kind: EventKind) {
        self.events.push(GraphEvent {
            seq: self.next_seq,
            kind,
        });
        self.next_seq += 1;
    }

    fn unique_id(&self, node_type: &NodeType, hint: &str) -> NodeId {
        if !hint.is_empty() && !self.id_index.contains_key(&NodeId::intern(hint)) {
            return NodeId::intern(hint);
        }
        let mut chars = node_type.type_name().chars();
        let prefix: String = chars
            .next()
            .map(|c| c.to_ascii_lowercase())
            .into_iter()
            .chain(chars)
            .collect();
        NodeId::with_prefix(&prefix)
    }

    // ─── Session building ────────────────────────────────────────────────

    /// Add a viewable node without emitting events.
    pub fn add_node(&mut self, node_type: NodeType, name: &str) -> NodeId {
        self.insert(NodeEntry::new(NodeId::intern(name), node_type))
    }

    /// Add a source group `name` reading `media` through an inner file source.
    pub fn add_source_node(&mut self, name: &str, media: Vec<MediaInfo>) -> NodeId {
        let group = self.add_node(NodeType::SourceGroup, name);
        let mut source = NodeEntry::new(NodeId::intern(&format!("{name}_source")), NodeType::FileSource);
        source.media = media;
        source.group = Some(group);
        source.viewable = false;
        self.insert(source);
        group
    }

    /// Validated connection without events or call logging.
    pub fn connect(&mut self, node: NodeId, inputs: &[NodeId]) -> Result<(), GraphError> {
        if let Some(reason) = self.test_inputs(node, inputs) {
            return Err(GraphError::InputsRejected { node, reason });
        }
        self.replace_inputs(node, inputs);
        Ok(())
    }

    /// Make `node` the view node without events.
    pub fn set_view(&mut self, node: NodeId) {
        self.view = Some(node);
        self.history.truncate(self.history_pos + 1);
        if self.history.last() != Some(&node) {
            self.history.push(node);
        }
        self.history_pos = self.history.len() - 1;
    }

    /// Write a property without events.
    pub fn insert_property(&mut self, path: &str, value: PropertyValue) {
        self.properties.insert(path.to_string(), value);
    }

    /// Place the image of `input` on screen behind a fresh transform node.
    pub fn place_image(&mut self, input: NodeId, placement: ImagePlacement) -> NodeId {
        let tform = NodeId::intern(&format!("{input}_tform"));
        let mut entry = NodeEntry::new(tform, NodeType::Transform2D);
        entry.viewable = false;
        self.insert(entry);
        self.transforms.insert(input, tform);
        self.placements.insert(tform, placement);
        if placement.height != 0.0 {
            self.aspects.insert(tform, placement.width / placement.height);
        }
        tform
    }

    pub fn set_node_aspect(&mut self, node: NodeId, aspect: f64) {
        self.aspects.insert(node, aspect);
    }

    // ─── Observation ─────────────────────────────────────────────────────

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    /// Every committed `set_inputs` call.
    pub fn set_inputs_calls(&self) -> &[(NodeId, Vec<NodeId>)] {
        &self.set_inputs_log
    }

    /// Every `set_view_node` call.
    pub fn view_changes(&self) -> &[NodeId] {
        &self.view_log
    }

    pub fn alerts(&self) -> &[(String, String)] {
        &self.alerts
    }

    pub fn feedback(&self) -> &[String] {
        &self.feedback
    }

    pub fn internal_events(&self) -> &[(String, String)] {
        &self.internal_events
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    pub fn clear_logs(&mut self) {
        self.set_inputs_log.clear();
        self.view_log.clear();
        self.alerts.clear();
        self.feedback.clear();
        self.internal_events.clear();
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn replace_inputs(&mut self, node: NodeId, inputs: &[NodeId]) {
        let Some(&idx) = self.id_index.get(&node) else {
            return;
        };
        let old: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.id())
            .collect();
        for edge in old {
            self.graph.remove_edge(edge);
        }
        for input in inputs {
            if let Some(&from) = self.id_index.get(input) {
                self.graph.add_edge(from, idx, ());
            }
        }
        self.graph[idx].inputs = inputs.to_vec();
    }

    fn remove_entry(&mut self, node: NodeId) {
        if let Some(idx) = self.id_index.remove(&node) {
            self.graph.remove_node(idx);
        }
        let prefix = format!("{node}.");
        self.properties.retain(|path, _| !path.starts_with(&prefix));
        self.history.retain(|n| *n != node);
        self.history_pos = self.history_pos.min(self.history.len().saturating_sub(1));
    }

    /// Sources displayed by the current view, upstream first.
    fn viewed_sources(&self) -> Vec<NodeId> {
        let Some(view) = self.view else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![view];
        let mut seen = Vec::new();
        while let Some(n) = stack.pop() {
            if seen.contains(&n) {
                continue;
            }
            seen.push(n);
            let Some(entry) = self.get_by_id(n) else {
                continue;
            };
            if entry.node_type == NodeType::SourceGroup
                && let Some(source) = self.source_node_of_group(n)
            {
                out.push(source);
            }
            stack.extend(entry.inputs.iter().rev());
        }
        out
    }

    fn float_pair(&self, path: &str, default: [f64; 2]) -> [f64; 2] {
        match self.properties.get(path) {
            Some(PropertyValue::Float(v)) if v.len() >= 2 => [f64::from(v[0]), f64::from(v[1])],
            _ => default,
        }
    }

    fn tags_of(&self, tform: NodeId) -> Vec<(String, String)> {
        ["tmanip", "tmanip_state"]
            .into_iter()
            .filter_map(|name| {
                let value = self.first_string(&props::tag(tform, name))?;
                Some((name.to_string(), value))
            })
            .collect()
    }

    /// Transform nodes of the images drawn for the current view.
    fn drawn(&self) -> Vec<NodeId> {
        let Some(view) = self.view else {
            return Vec::new();
        };
        self.get_by_id(view)
            .map(|e| {
                e.inputs
                    .iter()
                    .filter_map(|i| self.transforms.get(i).copied())
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ─── Graph facade ────────────────────────────────────────────────────────

impl GraphFacade for MemoryGraph {
    fn node_exists(&self, node: NodeId) -> bool {
        self.id_index.contains_key(&node)
    }

    fn node_type(&self, node: NodeId) -> Result<NodeType, GraphError> {
        Ok(self.entry(node)?.node_type.clone())
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.graph.node_indices().map(|i| self.graph[i].id).collect()
    }

    fn view_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .map(|i| &self.graph[i])
            .filter(|e| e.viewable)
            .map(|e| e.id)
            .collect()
    }

    fn create_node(&mut self, node_type: &NodeType, name_hint: &str) -> Result<NodeId, GraphError> {
        let id = self.unique_id(node_type, name_hint);
        self.insert(NodeEntry::new(id, node_type.clone()));
        self.emit(EventKind::NodeCreated(id));
        Ok(id)
    }

    fn delete_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        let idx = *self.id_index.get(&node).ok_or(GraphError::NodeNotFound(node))?;
        let consumers: Vec<NodeId> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|i| self.graph[i].id)
            .collect();
        let members: Vec<NodeId> = self
            .graph
            .node_indices()
            .filter(|i| self.graph[*i].group == Some(node))
            .map(|i| self.graph[i].id)
            .collect();

        for member in members {
            self.remove_entry(member);
        }
        self.remove_entry(node);
        self.transforms.retain(|input, _| *input != node);

        for consumer in consumers {
            if let Some(&cidx) = self.id_index.get(&consumer) {
                self.graph[cidx].inputs.retain(|n| *n != node);
                self.emit(EventKind::InputsChanged(consumer));
            }
        }
        self.emit(EventKind::AfterNodeDelete(node));

        if self.view == Some(node) {
            self.emit(EventKind::BeforeViewChange);
            self.view = self.view_nodes().first().copied();
            self.emit(EventKind::AfterViewChange);
        }
        Ok(())
    }

    fn connections(&self, node: NodeId) -> Result<Connections, GraphError> {
        let idx = *self.id_index.get(&node).ok_or(GraphError::NodeNotFound(node))?;
        let entry = &self.graph[idx];
        let mut outputs: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        outputs.sort();
        outputs.dedup();
        Ok(Connections {
            inputs: entry.inputs.clone(),
            outputs: outputs.into_iter().map(|i| self.graph[i].id).collect(),
        })
    }

    fn test_inputs(&self, node: NodeId, inputs: &[NodeId]) -> Option<String> {
        let Some(&idx) = self.id_index.get(&node) else {
            return Some(format!("no node named '{node}'"));
        };
        let node_type = &self.graph[idx].node_type;
        if node_type.is_source() && !inputs.is_empty() {
            return Some(format!("{node_type} nodes take no inputs"));
        }
        for (i, input) in inputs.iter().enumerate() {
            let Some(&from) = self.id_index.get(input) else {
                return Some(format!("no node named '{input}'"));
            };
            if *input == node {
                return Some(format!("'{node}' cannot be an input of itself"));
            }
            if inputs[..i].contains(input) {
                return Some(format!("'{input}' is connected more than once"));
            }
            if petgraph::algo::has_path_connecting(&self.graph, idx, from, None) {
                return Some(format!(
                    "connecting '{input}' to '{node}' would create a cycle"
                ));
            }
        }
        None
    }

    fn set_inputs(&mut self, node: NodeId, inputs: &[NodeId]) -> Result<(), GraphError> {
        self.connect(node, inputs)?;
        self.set_inputs_log.push((node, inputs.to_vec()));
        self.emit(EventKind::InputsChanged(node));
        Ok(())
    }

    fn node_group(&self, node: NodeId) -> Option<NodeId> {
        self.get_by_id(node)?.group
    }

    fn source_node_of_group(&self, group: NodeId) -> Option<NodeId> {
        self.graph
            .node_indices()
            .map(|i| &self.graph[i])
            .find(|e| {
                e.group == Some(group)
                    && matches!(e.node_type, NodeType::FileSource | NodeType::ImageSource)
            })
            .map(|e| e.id)
    }

    fn add_source(&mut self, media: &[String]) -> Result<NodeId, GraphError> {
        let group = self.unique_id(&NodeType::SourceGroup, "");
        let known: Vec<MediaInfo> = media
            .iter()
            .map(|file| {
                self.graph
                    .node_indices()
                    .flat_map(|i| self.graph[i].media.iter())
                    .find(|m| &m.file == file)
                    .cloned()
                    .unwrap_or_else(|| MediaInfo {
                        file: file.clone(),
                        views: Vec::new(),
                    })
            })
            .collect();
        self.insert(NodeEntry::new(group, NodeType::SourceGroup));
        let mut source = NodeEntry::new(
            NodeId::intern(&format!("{group}_source")),
            NodeType::FileSource,
        );
        source.media = known;
        source.group = Some(group);
        source.viewable = false;
        self.insert(source);
        self.emit(EventKind::NodeCreated(group));
        self.emit(EventKind::SourceGroupComplete(group));
        Ok(group)
    }

    fn media_info(&self, source: NodeId) -> Result<Vec<MediaInfo>, GraphError> {
        Ok(self.entry(source)?.media.clone())
    }

    fn property_exists(&self, path: &str) -> bool {
        self.properties.contains_key(path)
    }

    fn property(&self, path: &str) -> Result<PropertyValue, GraphError> {
        self.properties
            .get(path)
            .cloned()
            .ok_or_else(|| GraphError::PropertyNotFound(path.to_string()))
    }

    fn set_property(
        &mut self,
        path: &str,
        value: PropertyValue,
        create: bool,
    ) -> Result<(), GraphError> {
        let parsed = PropertyPath::parse(path)
            .ok_or_else(|| GraphError::PropertyNotFound(path.to_string()))?;
        if let Some(owner) = parsed.node()
            && !self.node_exists(owner)
        {
            return Err(GraphError::NodeNotFound(owner));
        }
        match self.properties.get(path) {
            Some(existing) if existing.kind() != value.kind() => {
                return Err(GraphError::PropertyType {
                    path: path.to_string(),
                    expected: existing.kind(),
                    found: value.kind(),
                });
            }
            None if !create => return Err(GraphError::PropertyNotFound(path.to_string())),
            _ => {}
        }
        self.properties.insert(path.to_string(), value);
        self.emit(EventKind::PropertyChanged(path.to_string()));
        Ok(())
    }

    fn delete_property(&mut self, path: &str) -> Result<(), GraphError> {
        self.properties
            .remove(path)
            .ok_or_else(|| GraphError::PropertyNotFound(path.to_string()))?;
        self.emit(EventKind::PropertyChanged(path.to_string()));
        Ok(())
    }

    fn view_node(&self) -> Option<NodeId> {
        self.view
    }

    fn set_view_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        if !self.node_exists(node) {
            return Err(GraphError::NodeNotFound(node));
        }
        self.view_log.push(node);
        self.emit(EventKind::BeforeViewChange);
        if self.history_pos > 0 && self.history.get(self.history_pos - 1) == Some(&node) {
            self.history_pos -= 1;
            self.view = Some(node);
        } else if self.history.get(self.history_pos + 1) == Some(&node) {
            self.history_pos += 1;
            self.view = Some(node);
        } else {
            self.set_view(node);
        }
        self.emit(EventKind::AfterViewChange);
        Ok(())
    }

    fn next_view_node(&self) -> Option<NodeId> {
        self.history.get(self.history_pos + 1).copied()
    }

    fn previous_view_node(&self) -> Option<NodeId> {
        self.history_pos
            .checked_sub(1)
            .and_then(|i| self.history.get(i))
            .copied()
    }

    fn display_name(&self, node: NodeId) -> String {
        self.first_string(&props::ui_name(node))
            .unwrap_or_else(|| node.to_string())
    }

    fn set_display_name(&mut self, node: NodeId, name: &str) -> Result<(), GraphError> {
        self.set_string_property(&props::ui_name(node), vec![name.to_string()])
    }

    fn image_request(&self) -> Vec<String> {
        self.viewed_sources()
            .first()
            .and_then(|s| {
                self.string_property(&props::image_component_request(*s))
                    .ok()
            })
            .unwrap_or_default()
    }

    fn set_image_request(&mut self, value: &[String]) -> Result<(), GraphError> {
        for source in self.viewed_sources() {
            self.set_string_property(&props::image_component_request(source), value.to_vec())?;
        }
        Ok(())
    }

    fn alert(&mut self, title: &str, message: &str) {
        self.alerts.push((title.to_string(), message.to_string()));
    }

    fn display_feedback(&mut self, message: &str) {
        self.feedback.push(message.to_string());
    }

    fn send_internal_event(&mut self, name: &str, contents: &str) {
        self.internal_events
            .push((name.to_string(), contents.to_string()));
    }

    fn event_cursor(&self) -> u64 {
        self.next_seq
    }
}

// ─── Render facade ───────────────────────────────────────────────────────

impl RenderFacade for MemoryGraph {
    fn images_at_pixel(&self, point: Point) -> Vec<ImageHit> {
        self.rendered_images()
            .into_iter()
            .filter(|img| {
                self.image_geometry(img.index).is_some_and(|q| {
                    Rect::from_points(q[0], q[2]).contains(point)
                })
            })
            .map(|img| ImageHit {
                index: img.index,
                inside: true,
                tags: img.tags,
            })
            .collect()
    }

    fn rendered_images(&self) -> Vec<RenderedImage> {
        self.drawn()
            .into_iter()
            .enumerate()
            .map(|(index, tform)| RenderedImage {
                index,
                tags: self.tags_of(tform),
            })
            .collect()
    }

    fn image_geometry(&self, index: usize) -> Option<Quad> {
        let tform = *self.drawn().get(index)?;
        let base = self.placements.get(&tform)?;
        let [tx, ty] = self.float_pair(&props::transform(tform, "translate"), [0.0, 0.0]);
        let [sx, sy] = self.float_pair(&props::transform(tform, "scale"), [1.0, 1.0]);
        let cx = base.center.x + tx * base.height;
        let cy = base.center.y + ty * base.height;
        let hw = base.width * sx / 2.0;
        let hh = base.height * sy / 2.0;
        Some([
            Point::new(cx - hw, cy - hh),
            Point::new(cx + hw, cy - hh),
            Point::new(cx + hw, cy + hh),
            Point::new(cx - hw, cy + hh),
        ])
    }

    fn transform_nodes_of_view(&self) -> Result<Vec<NodeId>, GraphError> {
        let view = self
            .view
            .ok_or_else(|| GraphError::Resource("no view node".into()))?;
        self.entry(view)?;
        Ok(self.drawn())
    }

    fn node_aspect(&self, node: NodeId) -> f64 {
        self.aspects.get(&node).copied().unwrap_or(1.0)
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn events_carry_increasing_sequence() {
        let mut g = MemoryGraph::new();
        let a = g.add_node(NodeType::SourceGroup, "memA");
        let s = g.add_node(NodeType::StackGroup, "memS");
        let start = g.event_cursor();
        g.set_inputs(s, &[a]).unwrap();
        g.set_display_name(s, "Stack").unwrap();
        let events = g.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].seq, start);
        assert_eq!(events[0].kind, EventKind::InputsChanged(s));
        assert_eq!(events[1].kind, EventKind::PropertyChanged("memS.ui.name".into()));
        assert_eq!(g.event_cursor(), start + 2);
    }

    #[test]
    fn delete_detaches_from_consumers() {
        let mut g = MemoryGraph::new();
        let a = g.add_node(NodeType::SourceGroup, "memDelA");
        let s = g.add_node(NodeType::StackGroup, "memDelS");
        g.connect(s, &[a]).unwrap();
        g.delete_node(a).unwrap();
        assert!(g.connections(s).unwrap().inputs.is_empty());
        assert!(!g.node_exists(a));
    }

    #[test]
    fn outputs_follow_edges() {
        let mut g = MemoryGraph::new();
        let a = g.add_node(NodeType::SourceGroup, "memOutA");
        let s = g.add_node(NodeType::StackGroup, "memOutS");
        let f = g.add_node(NodeType::FolderGroup, "memOutF");
        g.connect(s, &[a]).unwrap();
        g.connect(f, &[a, s]).unwrap();
        assert_eq!(g.connections(a).unwrap().outputs, vec![s, f]);
        g.connect(f, &[s]).unwrap();
        assert_eq!(g.connections(a).unwrap().outputs, vec![s]);
    }

    #[test]
    fn property_type_is_enforced() {
        let mut g = MemoryGraph::new();
        let a = g.add_node(NodeType::SourceGroup, "memPropA");
        g.set_int_property("memPropA.sm_state.sortKey", vec![1]).unwrap();
        assert!(matches!(
            g.set_string_property("memPropA.sm_state.sortKey", vec![]),
            Err(GraphError::PropertyType { .. })
        ));
        assert!(matches!(
            g.set_property("memPropA.ui.name", PropertyValue::String(vec![]), false),
            Err(GraphError::PropertyNotFound(_))
        ));
        assert_eq!(g.display_name(a), "memPropA");
    }

    #[test]
    fn view_history_navigation() {
        let mut g = MemoryGraph::new();
        let a = g.add_node(NodeType::SourceGroup, "memNavA");
        let b = g.add_node(NodeType::SourceGroup, "memNavB");
        g.set_view_node(a).unwrap();
        g.set_view_node(b).unwrap();
        assert_eq!(g.previous_view_node(), Some(a));
        assert_eq!(g.next_view_node(), None);
        g.set_view_node(a).unwrap();
        assert_eq!(g.next_view_node(), Some(b));
        assert_eq!(g.previous_view_node(), None);
    }

    #[test]
    fn image_quads_follow_transform() {
        let mut g = MemoryGraph::new();
        let a = g.add_node(NodeType::SourceGroup, "memImgA");
        let l = g.add_node(NodeType::LayoutGroup, "memImgL");
        g.connect(l, &[a]).unwrap();
        g.set_view(l);
        let t = g.place_image(
            a,
            ImagePlacement {
                center: Point::new(100.0, 100.0),
                width: 200.0,
                height: 100.0,
            },
        );
        assert_eq!(g.image_geometry(0).unwrap()[0], Point::new(0.0, 50.0));
        g.set_float_property(&props::transform(t, "translate"), vec![0.5, 0.0])
            .unwrap();
        assert_eq!(g.image_geometry(0).unwrap()[0], Point::new(50.0, 50.0));
        assert_eq!(g.images_at_pixel(Point::new(60.0, 60.0)).len(), 1);
        assert!(g.images_at_pixel(Point::new(10.0, 60.0)).is_empty());
        assert_eq!(g.node_aspect(t), 2.0);
    }
}
