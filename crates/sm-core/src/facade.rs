//! The contract the session manager consumes from the hosting application.
//!
//! The host owns the node graph, its properties, the current view and the
//! event loop. Everything the engine needs goes through `GraphFacade`; the
//! transform manipulator additionally needs viewer queries from
//! `RenderFacade`. Both are implemented by `MemoryGraph` for tests and tools.

use crate::id::NodeId;
use crate::model::*;
use kurbo::Point;
use std::fmt;

// ─── Errors ──────────────────────────────────────────────────────────────

/// Failures reported by the host graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The node does not exist (or vanished mid-operation).
    NodeNotFound(NodeId),
    /// No property at this path.
    PropertyNotFound(String),
    /// The property exists with a different element type.
    PropertyType {
        path: String,
        expected: PropertyKind,
        found: PropertyKind,
    },
    /// The proposed input set was refused.
    InputsRejected { node: NodeId, reason: String },
    /// A bundled resource or host facility is unavailable.
    Resource(String),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::NodeNotFound(node) => write!(f, "no node named '{node}'"),
            GraphError::PropertyNotFound(path) => write!(f, "no property '{path}'"),
            GraphError::PropertyType {
                path,
                expected,
                found,
            } => write!(f, "property '{path}' is {found}, expected {expected}"),
            GraphError::InputsRejected { node, reason } => {
                write!(f, "inputs of '{node}' rejected: {reason}")
            }
            GraphError::Resource(what) => write!(f, "resource unavailable: {what}"),
        }
    }
}

impl std::error::Error for GraphError {}

// ─── Events ──────────────────────────────────────────────────────────────

/// What happened in the host.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    NodeCreated(NodeId),
    SourceModified(NodeId),
    SourceGroupComplete(NodeId),
    BeforeProgressiveLoading,
    AfterProgressiveLoading,
    AfterNodeDelete(NodeId),
    AfterClearSession,
    BeforeViewChange,
    AfterViewChange,
    /// The input list of this node changed.
    InputsChanged(NodeId),
    /// A property changed; carries the full dotted path.
    PropertyChanged(String),
    BeforeSessionDeletion,
    ViewEditModeActivated,
}

/// An event delivered by the host, stamped with its emission sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEvent {
    pub seq: u64,
    pub kind: EventKind,
}

/// Whether other subscribers should also see an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Not fully handled: keep dispatching.
    Continue,
    Stop,
}

// ─── Graph facade ────────────────────────────────────────────────────────

pub trait GraphFacade {
    fn node_exists(&self, node: NodeId) -> bool;

    fn node_type(&self, node: NodeId) -> Result<NodeType, GraphError>;

    /// Every node in the session.
    fn nodes(&self) -> Vec<NodeId>;

    /// Top-level nodes that can be viewed.
    fn view_nodes(&self) -> Vec<NodeId>;

    fn create_node(&mut self, node_type: &NodeType, name_hint: &str) -> Result<NodeId, GraphError>;

    fn delete_node(&mut self, node: NodeId) -> Result<(), GraphError>;

    fn connections(&self, node: NodeId) -> Result<Connections, GraphError>;

    /// Would this input list be accepted? `Some(reason)` if not.
    fn test_inputs(&self, node: NodeId, inputs: &[NodeId]) -> Option<String>;

    fn set_inputs(&mut self, node: NodeId, inputs: &[NodeId]) -> Result<(), GraphError>;

    /// Group owning a member node (a source's source group).
    fn node_group(&self, node: NodeId) -> Option<NodeId>;

    /// The file/image source inside a source group.
    fn source_node_of_group(&self, group: NodeId) -> Option<NodeId>;

    /// Create a source group reading `media`; returns the group.
    fn add_source(&mut self, media: &[String]) -> Result<NodeId, GraphError>;

    /// Media structure of a source node.
    fn media_info(&self, source: NodeId) -> Result<Vec<MediaInfo>, GraphError>;

    fn property_exists(&self, path: &str) -> bool;

    fn property(&self, path: &str) -> Result<PropertyValue, GraphError>;

    /// Write a property. Without `create`, a missing property is an error.
    fn set_property(
        &mut self,
        path: &str,
        value: PropertyValue,
        create: bool,
    ) -> Result<(), GraphError>;

    fn delete_property(&mut self, path: &str) -> Result<(), GraphError>;

    fn view_node(&self) -> Option<NodeId>;

    fn set_view_node(&mut self, node: NodeId) -> Result<(), GraphError>;

    fn next_view_node(&self) -> Option<NodeId>;

    fn previous_view_node(&self) -> Option<NodeId>;

    /// Human-readable name of a node (falls back to the node name).
    fn display_name(&self, node: NodeId) -> String;

    fn set_display_name(&mut self, node: NodeId, name: &str) -> Result<(), GraphError>;

    /// Current `imageComponent` request of the displayed sources.
    fn image_request(&self) -> Vec<String>;

    fn set_image_request(&mut self, value: &[String]) -> Result<(), GraphError>;

    /// Blocking, user-facing error alert.
    fn alert(&mut self, title: &str, message: &str);

    /// Transient on-screen feedback.
    fn display_feedback(&mut self, message: &str);

    fn send_internal_event(&mut self, name: &str, contents: &str);

    /// Sequence number the next emitted event will carry.
    fn event_cursor(&self) -> u64;

    // ─── Typed property access ───────────────────────────────────────────

    fn string_property(&self, path: &str) -> Result<Vec<String>, GraphError> {
        match self.property(path)? {
            PropertyValue::String(v) => Ok(v),
            other => Err(GraphError::PropertyType {
                path: path.to_string(),
                expected: PropertyKind::String,
                found: other.kind(),
            }),
        }
    }

    fn int_property(&self, path: &str) -> Result<Vec<i32>, GraphError> {
        match self.property(path)? {
            PropertyValue::Int(v) => Ok(v),
            other => Err(GraphError::PropertyType {
                path: path.to_string(),
                expected: PropertyKind::Int,
                found: other.kind(),
            }),
        }
    }

    fn float_property(&self, path: &str) -> Result<Vec<f32>, GraphError> {
        match self.property(path)? {
            PropertyValue::Float(v) => Ok(v),
            other => Err(GraphError::PropertyType {
                path: path.to_string(),
                expected: PropertyKind::Float,
                found: other.kind(),
            }),
        }
    }

    fn set_string_property(&mut self, path: &str, value: Vec<String>) -> Result<(), GraphError> {
        self.set_property(path, PropertyValue::String(value), true)
    }

    fn set_int_property(&mut self, path: &str, value: Vec<i32>) -> Result<(), GraphError> {
        self.set_property(path, PropertyValue::Int(value), true)
    }

    fn set_float_property(&mut self, path: &str, value: Vec<f32>) -> Result<(), GraphError> {
        self.set_property(path, PropertyValue::Float(value), true)
    }

    /// First element of a string property, if it exists and has one.
    fn first_string(&self, path: &str) -> Option<String> {
        self.string_property(path).ok()?.into_iter().next()
    }
}

// ─── Render facade ───────────────────────────────────────────────────────

/// Viewer queries used by direct manipulation.
pub trait RenderFacade: GraphFacade {
    /// Images under a screen point, topmost first.
    fn images_at_pixel(&self, point: Point) -> Vec<ImageHit>;

    /// Images drawn in the current frame.
    fn rendered_images(&self) -> Vec<RenderedImage>;

    /// Screen-space corners of a rendered image.
    fn image_geometry(&self, index: usize) -> Option<Quad>;

    /// Transform nodes closest to each input of the view node, in input order.
    fn transform_nodes_of_view(&self) -> Result<Vec<NodeId>, GraphError>;

    /// Pixel-aspect-corrected width / height of a node's image.
    fn node_aspect(&self, node: NodeId) -> f64;

    fn set_cursor(&mut self, cursor: Cursor);

    fn redraw(&mut self);
}
