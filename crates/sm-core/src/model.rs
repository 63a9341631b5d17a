//! Typed data model shared by the facade and the editor engine.
//!
//! The host graph is a DAG of processing nodes (sources, sequences, stacks,
//! folders, ...). Edges run from an input node to the node consuming it, and
//! every node keeps its inputs in an explicit order. The session manager never
//! owns node storage: everything here is either a value copied out of the
//! facade or a descriptor handed back to it.

use crate::id::NodeId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Node types ──────────────────────────────────────────────────────────

/// Type tag of a graph node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    FileSource,
    ImageSource,
    SourceGroup,
    SequenceGroup,
    StackGroup,
    SwitchGroup,
    LayoutGroup,
    FolderGroup,
    RetimeGroup,
    Transform2D,
    Other(String),
}

impl NodeType {
    /// Host-facing type name (`"StackGroup"`, ...).
    pub fn type_name(&self) -> &str {
        match self {
            NodeType::FileSource => "FileSource",
            NodeType::ImageSource => "ImageSource",
            NodeType::SourceGroup => "SourceGroup",
            NodeType::SequenceGroup => "SequenceGroup",
            NodeType::StackGroup => "StackGroup",
            NodeType::SwitchGroup => "SwitchGroup",
            NodeType::LayoutGroup => "LayoutGroup",
            NodeType::FolderGroup => "FolderGroup",
            NodeType::RetimeGroup => "RetimeGroup",
            NodeType::Transform2D => "Transform2D",
            NodeType::Other(name) => name,
        }
    }

    /// Parse a type name; unknown names become `Other`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "FileSource" => NodeType::FileSource,
            "ImageSource" => NodeType::ImageSource,
            "SourceGroup" => NodeType::SourceGroup,
            "SequenceGroup" => NodeType::SequenceGroup,
            "StackGroup" => NodeType::StackGroup,
            "SwitchGroup" => NodeType::SwitchGroup,
            "LayoutGroup" => NodeType::LayoutGroup,
            "FolderGroup" => NodeType::FolderGroup,
            "RetimeGroup" => NodeType::RetimeGroup,
            "Transform2D" => NodeType::Transform2D,
            other => NodeType::Other(other.to_string()),
        }
    }

    /// Name used when auto-naming containers: `StackGroup` → `Stack`.
    pub fn base_name(&self) -> &str {
        let name = self.type_name();
        name.strip_suffix("Group")
            .filter(|s| !s.is_empty())
            .unwrap_or(name)
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, NodeType::FolderGroup)
    }

    /// Source-like nodes: they take no user-editable inputs.
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            NodeType::FileSource | NodeType::ImageSource | NodeType::SourceGroup
        )
    }

    /// Which top-level category a node of this type is listed under.
    pub fn category(&self) -> Category {
        match self {
            NodeType::SourceGroup | NodeType::FileSource | NodeType::ImageSource => {
                Category::Sources
            }
            NodeType::SequenceGroup => Category::Sequences,
            NodeType::StackGroup => Category::Stacks,
            NodeType::LayoutGroup => Category::Layouts,
            NodeType::FolderGroup => Category::Folders,
            _ => Category::Other,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

// ─── Categories ──────────────────────────────────────────────────────────

/// The six fixed top-level groupings of the session tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Folders,
    Sources,
    Sequences,
    Stacks,
    Layouts,
    Other,
}

impl Category {
    /// Insertion order of the category rows.
    pub const ALL: [Category; 6] = [
        Category::Folders,
        Category::Sources,
        Category::Sequences,
        Category::Stacks,
        Category::Layouts,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Folders => "FOLDERS",
            Category::Sources => "SOURCES",
            Category::Sequences => "SEQUENCES",
            Category::Stacks => "STACKS",
            Category::Layouts => "LAYOUTS",
            Category::Other => "OTHER",
        }
    }

    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }
}

// ─── Sub-components ──────────────────────────────────────────────────────

/// Kind of a tree item with respect to media sub-components.
///
/// The numeric values are persisted in `sm_state.componentSubType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubComponentKind {
    #[default]
    NotASubComponent,
    Media,
    View,
    Layer,
    Channel,
}

impl SubComponentKind {
    pub fn as_i32(self) -> i32 {
        match self {
            SubComponentKind::NotASubComponent => 0,
            SubComponentKind::Media => 1,
            SubComponentKind::View => 2,
            SubComponentKind::Layer => 3,
            SubComponentKind::Channel => 4,
        }
    }

    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => SubComponentKind::Media,
            2 => SubComponentKind::View,
            3 => SubComponentKind::Layer,
            4 => SubComponentKind::Channel,
            _ => SubComponentKind::NotASubComponent,
        }
    }

    /// Kind named by the first element of an `imageComponent` request.
    pub fn from_request_name(name: &str) -> Self {
        match name {
            "view" => SubComponentKind::View,
            "layer" => SubComponentKind::Layer,
            "channel" => SubComponentKind::Channel,
            _ => SubComponentKind::NotASubComponent,
        }
    }

    /// Human label used in synthesized node names.
    pub fn label(self) -> &'static str {
        match self {
            SubComponentKind::NotASubComponent => "",
            SubComponentKind::Media => "Media",
            SubComponentKind::View => "View",
            SubComponentKind::Layer => "Layer",
            SubComponentKind::Channel => "Channel",
        }
    }
}

// ─── Media descriptors ───────────────────────────────────────────────────

/// One channel of a layer (or a layer-less channel of a view).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub channels: Vec<ChannelInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub layers: Vec<LayerInfo>,
    /// Channels that belong to the view but to no layer.
    #[serde(default)]
    pub no_layer_channels: Vec<ChannelInfo>,
}

/// Structure of one media file of a source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    pub file: String,
    #[serde(default)]
    pub views: Vec<ViewInfo>,
}

impl ChannelInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl LayerInfo {
    pub fn new(name: &str, channels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            channels: channels.iter().map(|c| ChannelInfo::new(c)).collect(),
        }
    }
}

// ─── Properties ──────────────────────────────────────────────────────────

/// An array-valued node property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum PropertyValue {
    String(Vec<String>),
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Float(_) => PropertyKind::Float,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PropertyValue::String(v) => v.len(),
            PropertyValue::Int(v) => v.len(),
            PropertyValue::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    String,
    Int,
    Float,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::String => "string",
            PropertyKind::Int => "int",
            PropertyKind::Float => "float",
        };
        f.write_str(name)
    }
}

// ─── Connections ─────────────────────────────────────────────────────────

/// Ordered inputs and outputs of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Connections {
    pub inputs: Vec<NodeId>,
    pub outputs: Vec<NodeId>,
}

// ─── Viewer-side records ─────────────────────────────────────────────────

/// Screen-space quadrilateral of a rendered image.
///
/// Corner order is `[a, b, c, d]` going around the image: `b - a` runs along
/// the image width and `d - a` along its height.
pub type Quad = [Point; 4];

/// An image under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHit {
    pub index: usize,
    pub inside: bool,
    pub tags: Vec<(String, String)>,
}

/// An image drawn in the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub index: usize,
    pub tags: Vec<(String, String)>,
}

/// Look up a tag value by name.
pub fn tag_value<'a>(tags: &'a [(String, String)], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Pointer cursor glyphs requested from the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Arrow,
    OpenHand,
    ClosedHand,
    /// `\` diagonal: top-left / bottom-right corners.
    SizeFDiag,
    /// `/` diagonal: top-right / bottom-left corners.
    SizeBDiag,
    WhatsThis,
}
