//! Serialized sessions.
//!
//! A snapshot lists nodes with their inputs, media and properties, plus the
//! view node and optional on-screen image placements. It loads from JSON or
//! MessagePack into a `MemoryGraph`.

use crate::facade::{GraphError, GraphFacade};
use crate::id::NodeId;
use crate::memory::{ImagePlacement, MemoryGraph};
use crate::model::*;
use crate::props;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub view: Option<String>,
    pub nodes: Vec<NodeSnapshot>,
    /// Extra properties by full path, including `#Session` ones.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub images: Vec<ImageSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Media of a source group.
    #[serde(default)]
    pub media: Vec<MediaInfo>,
}

/// On-screen placement of one input of the view node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSnapshot {
    pub input: String,
    pub center: [f64; 2],
    pub width: f64,
    pub height: f64,
}

impl SessionSnapshot {
    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("invalid session JSON: {e}"))
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, String> {
        rmp_serde::from_slice(bytes).map_err(|e| format!("invalid session MessagePack: {e}"))
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, String> {
        rmp_serde::to_vec_named(self).map_err(|e| format!("cannot encode session: {e}"))
    }

    /// Load a snapshot file. `.json` files are JSON, anything else MessagePack.
    pub fn load(path: &Path) -> Result<Self, String> {
        let bytes =
            std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            let text = String::from_utf8(bytes)
                .map_err(|e| format!("{} is not UTF-8: {e}", path.display()))?;
            Self::from_json(&text)
        } else {
            Self::from_msgpack(&bytes)
        }
    }

    /// Build the session. No events are emitted.
    pub fn to_graph(&self) -> Result<MemoryGraph, GraphError> {
        let mut graph = MemoryGraph::new();

        for node in &self.nodes {
            let node_type = NodeType::from_name(&node.node_type);
            let id = if node_type == NodeType::SourceGroup {
                graph.add_source_node(&node.name, node.media.clone())
            } else {
                graph.add_node(node_type, &node.name)
            };
            if let Some(name) = &node.display_name {
                graph.insert_property(
                    &props::ui_name(id),
                    PropertyValue::String(vec![name.clone()]),
                );
            }
        }

        for node in &self.nodes {
            if node.inputs.is_empty() {
                continue;
            }
            let inputs: Vec<NodeId> = node.inputs.iter().map(|n| NodeId::intern(n)).collect();
            graph.connect(NodeId::intern(&node.name), &inputs)?;
        }

        for (path, value) in &self.properties {
            graph.insert_property(path, value.clone());
        }

        if let Some(view) = &self.view {
            let view = NodeId::intern(view);
            if !graph.node_exists(view) {
                return Err(GraphError::NodeNotFound(view));
            }
            graph.set_view(view);
        }

        for image in &self.images {
            let input = NodeId::intern(&image.input);
            if !graph.node_exists(input) {
                return Err(GraphError::NodeNotFound(input));
            }
            graph.place_image(
                input,
                ImagePlacement {
                    center: Point::new(image.center[0], image.center[1]),
                    width: image.width,
                    height: image.height,
                },
            );
        }

        Ok(graph)
    }
}

impl MemoryGraph {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Result<Self, GraphError> {
        snapshot.to_graph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: &str = r##"{
        "view": "snapStack",
        "nodes": [
            { "name": "snapA", "type": "SourceGroup", "display_name": "plate",
              "media": [ { "file": "/shots/plate.exr" } ] },
            { "name": "snapStack", "type": "StackGroup", "inputs": ["snapA"] }
        ],
        "properties": {
            "#Session.sm_view.STACKS": { "kind": "int", "values": [0] }
        }
    }"##;

    #[test]
    fn json_session_loads() {
        let snap = SessionSnapshot::from_json(SESSION).unwrap();
        let g = snap.to_graph().unwrap();
        let stack = NodeId::intern("snapStack");
        let a = NodeId::intern("snapA");
        assert_eq!(g.view_node(), Some(stack));
        assert_eq!(g.connections(stack).unwrap().inputs, vec![a]);
        assert_eq!(g.display_name(a), "plate");
        let source = g.source_node_of_group(a).unwrap();
        assert_eq!(g.media_info(source).unwrap()[0].file, "/shots/plate.exr");
        assert_eq!(g.int_property("#Session.sm_view.STACKS").unwrap(), vec![0]);
    }

    #[test]
    fn msgpack_matches_json() {
        let snap = SessionSnapshot::from_json(SESSION).unwrap();
        let bytes = snap.to_msgpack().unwrap();
        assert_eq!(SessionSnapshot::from_msgpack(&bytes).unwrap(), snap);
    }

    #[test]
    fn rejected_connections_fail_the_load() {
        let snap = SessionSnapshot::from_json(
            r#"{ "nodes": [
                { "name": "snapLoopA", "type": "StackGroup", "inputs": ["snapLoopB"] },
                { "name": "snapLoopB", "type": "StackGroup", "inputs": ["snapLoopA"] }
            ] }"#,
        )
        .unwrap();
        assert!(matches!(
            snap.to_graph(),
            Err(GraphError::InputsRejected { .. })
        ));
    }
}
