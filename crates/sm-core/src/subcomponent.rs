//! Identity and materialization of media sub-components.
//!
//! A multi-part media file exposes views, layers and channels. In the tree
//! they are virtual rows until the user drags or selects one somewhere that
//! needs a real node; then a dedicated source group is created for it and
//! tagged with the sub-component's identity hash so later lookups find it
//! again instead of creating a duplicate.

use crate::facade::{GraphError, GraphFacade};
use crate::id::NodeId;
use crate::model::{MediaInfo, NodeType, SubComponentKind};
use crate::ops::node_inputs;
use crate::props::{self, *};
use crate::state;
use std::path::Path;

/// Separator between identity segments.
pub const SEPARATOR: &str = "!~";

/// Stand-in for a segment that applies but has an empty name.
pub const EMPTY_NAME: &str = "@.";

fn encode(segment: &str) -> &str {
    if segment.is_empty() { EMPTY_NAME } else { segment }
}

/// Identity of a (media, view, layer) triple.
///
/// `None` means the segment does not apply; `Some("")` means it applies but
/// is unnamed. The two hash differently.
pub fn hash(media: &str, view: Option<&str>, layer: Option<&str>) -> String {
    let view = view.map(encode);
    let layer = layer.map(encode);
    match (view, layer) {
        (None, None) => format!("{media}{SEPARATOR}{SEPARATOR}"),
        (None, Some(l)) => format!("{media}{SEPARATOR}{l}{SEPARATOR}"),
        (Some(v), None) => format!("{media}{SEPARATOR}{SEPARATOR}{v}"),
        (Some(v), Some(l)) => format!("{media}{SEPARATOR}{l}{SEPARATOR}{v}"),
    }
}

// ─── Descriptor ──────────────────────────────────────────────────────────

/// A view, layer or channel of one media file, or the file itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubComponent {
    pub kind: SubComponentKind,
    pub media: String,
    pub view: Option<String>,
    pub layer: Option<String>,
    pub channel: Option<String>,
}

impl SubComponent {
    pub fn media(file: &str) -> Self {
        Self {
            kind: SubComponentKind::Media,
            media: file.to_string(),
            view: None,
            layer: None,
            channel: None,
        }
    }

    pub fn view(file: &str, view: &str) -> Self {
        Self {
            kind: SubComponentKind::View,
            view: Some(view.to_string()),
            ..Self::media(file)
        }
    }

    pub fn layer(file: &str, view: Option<&str>, layer: &str) -> Self {
        Self {
            kind: SubComponentKind::Layer,
            view: view.map(str::to_string),
            layer: Some(layer.to_string()),
            ..Self::media(file)
        }
    }

    pub fn channel(file: &str, view: Option<&str>, layer: Option<&str>, channel: &str) -> Self {
        Self {
            kind: SubComponentKind::Channel,
            view: view.map(str::to_string),
            layer: layer.map(str::to_string),
            channel: Some(channel.to_string()),
            ..Self::media(file)
        }
    }

    /// Identity key. Channels extend their layer-level key with the channel
    /// name so sibling channels stay distinct.
    pub fn hash(&self) -> String {
        let view = self.view.as_deref();
        let layer = self.layer.as_deref();
        match self.kind {
            SubComponentKind::Media | SubComponentKind::NotASubComponent => {
                hash(&self.media, None, None)
            }
            SubComponentKind::View => hash(&self.media, view, None),
            SubComponentKind::Layer => hash(&self.media, view, layer),
            SubComponentKind::Channel => {
                let channel = self.channel.as_deref().unwrap_or_default();
                format!(
                    "{}{SEPARATOR}{}",
                    hash(&self.media, view, layer),
                    encode(channel)
                )
            }
        }
    }

    /// The name this descriptor selects at its own level.
    pub fn value(&self) -> &str {
        let value = match self.kind {
            SubComponentKind::View => self.view.as_deref(),
            SubComponentKind::Layer => self.layer.as_deref(),
            SubComponentKind::Channel => self.channel.as_deref(),
            _ => Some(self.media.as_str()),
        };
        value.unwrap_or_default()
    }

    pub fn is_unnamed(&self) -> bool {
        self.value().is_empty()
    }

    /// Value or `default` for an unnamed component.
    pub fn display_value(&self) -> &str {
        if self.is_unnamed() { "default" } else { self.value() }
    }

    /// Row text: the file name for media, else the component name.
    pub fn label(&self) -> String {
        if self.kind == SubComponentKind::Media {
            return Path::new(&self.media)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.media.clone());
        }
        self.display_value().to_string()
    }

    /// Value of `<source>.request.imageComponent` that displays this component.
    pub fn request_value(&self) -> Vec<String> {
        let view = self.view.clone().unwrap_or_default();
        let layer = self.layer.clone().unwrap_or_default();
        match self.kind {
            SubComponentKind::View => vec!["view".into(), view],
            SubComponentKind::Layer => vec!["layer".into(), view, layer],
            SubComponentKind::Channel => vec![
                "channel".into(),
                view,
                layer,
                self.channel.clone().unwrap_or_default(),
            ],
            _ => Vec::new(),
        }
    }

    /// Name of the node created for this component under `owner_name`.
    pub fn node_name(&self, owner_name: &str) -> String {
        format!(
            "{owner_name} ({} {})",
            self.kind.label(),
            self.display_value()
        )
    }
}

// ─── Media structure ─────────────────────────────────────────────────────

/// Nested sub-components of one media file, as listed in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SubComponentTree {
    pub sub: SubComponent,
    pub children: Vec<SubComponentTree>,
}

impl SubComponentTree {
    fn leaf(sub: SubComponent) -> Self {
        Self {
            sub,
            children: Vec::new(),
        }
    }
}

/// Lay out the sub-components of a source's media.
///
/// A view gets its own row only when the file has several views and the view
/// is named. A layer gets a row when it is named, or unnamed among siblings;
/// a lone unnamed layer hands its channels to its parent. Every channel gets
/// a row. Layer-less channels of a view with layers are gathered under an
/// extra unnamed layer.
pub fn media_outline(media: &[MediaInfo]) -> Vec<SubComponentTree> {
    media.iter().map(file_outline).collect()
}

fn file_outline(info: &MediaInfo) -> SubComponentTree {
    let file = info.file.as_str();
    let mut root = SubComponentTree::leaf(SubComponent::media(file));

    for v in &info.views {
        let named_view = info.views.len() > 1 && !v.name.is_empty();
        let view = named_view.then_some(v.name.as_str());
        let mut top = Vec::new();

        for l in &v.layers {
            let unnamed = l.name.is_empty();
            let layer_row = !unnamed || v.layers.len() > 1;
            let layer = layer_row.then_some(l.name.as_str());
            let channels = l
                .channels
                .iter()
                .map(|c| SubComponentTree::leaf(SubComponent::channel(file, view, layer, &c.name)));
            if layer_row {
                top.push(SubComponentTree {
                    sub: SubComponent::layer(file, view, &l.name),
                    children: channels.collect(),
                });
            } else {
                top.extend(channels);
            }
        }

        let loose = v
            .no_layer_channels
            .iter()
            .map(|c| SubComponentTree::leaf(SubComponent::channel(file, view, None, &c.name)));
        if !v.layers.is_empty() && !v.no_layer_channels.is_empty() {
            let loose = v.no_layer_channels.iter().map(|c| {
                SubComponentTree::leaf(SubComponent::channel(file, view, Some(""), &c.name))
            });
            top.push(SubComponentTree {
                sub: SubComponent::layer(file, view, ""),
                children: loose.collect(),
            });
        } else {
            top.extend(loose);
        }

        match view {
            Some(name) => root.children.push(SubComponentTree {
                sub: SubComponent::view(file, name),
                children: top,
            }),
            None => root.children.extend(top),
        }
    }
    root
}

// ─── Resolution ──────────────────────────────────────────────────────────

/// Materialized node for `hash` owned by `owner`, and the owner's component
/// folder, if either exists.
pub fn resolve(
    graph: &dyn GraphFacade,
    hash: &str,
    owner: NodeId,
) -> (Option<NodeId>, Option<NodeId>) {
    let mut component = None;
    let mut folder = None;
    for n in graph.nodes() {
        match graph.node_type(n) {
            Ok(NodeType::SourceGroup) if component.is_none() => {
                let tagged = graph.first_string(&sm_state(n, COMPONENT_HASH));
                let of = graph.first_string(&sm_state(n, COMPONENT_OF_NODE));
                if tagged.as_deref() == Some(hash) && of.as_deref() == Some(owner.as_str()) {
                    component = Some(n);
                }
            }
            Ok(NodeType::FolderGroup) if folder.is_none() => {
                let of = graph.first_string(&sm_state(n, COMPONENT_FOLDER_OF_NODE));
                if of.as_deref() == Some(owner.as_str()) {
                    folder = Some(n);
                }
            }
            _ => {}
        }
    }
    (component, folder)
}

/// The owner's component folder, created if missing.
fn component_folder(
    graph: &mut dyn GraphFacade,
    owner: NodeId,
    folder: Option<NodeId>,
) -> Result<NodeId, GraphError> {
    if let Some(folder) = folder {
        return Ok(folder);
    }
    let folder = graph.create_node(&NodeType::FolderGroup, &format!("{owner}_components"))?;
    let owner_name = graph.display_name(owner);
    graph.set_display_name(folder, &format!("Components of {owner_name}"))?;
    graph.set_string_property(
        &sm_state(folder, COMPONENT_FOLDER_OF_NODE),
        vec![owner.to_string()],
    )?;
    state::set_expanded_in_parent(graph, folder, None, false);
    Ok(folder)
}

/// Create a source group standing for `sub` of `owner` and file it in the
/// owner's component folder. Callers check `resolve` first. On failure the
/// group is deleted again.
pub fn materialize(
    graph: &mut dyn GraphFacade,
    sub: &SubComponent,
    owner: NodeId,
    folder: Option<NodeId>,
) -> Result<NodeId, GraphError> {
    let group = graph.add_source(std::slice::from_ref(&sub.media))?;
    if let Err(e) = file_component(graph, sub, owner, folder, group) {
        if let Err(cleanup) = graph.delete_node(group) {
            log::debug!("discard {group}: {cleanup}");
        }
        return Err(e);
    }

    let created = graph.display_name(group);
    graph.display_feedback(&format!("NOTE: Created {created}"));
    log::debug!("materialized {} as {group}", sub.hash());
    Ok(group)
}

fn file_component(
    graph: &mut dyn GraphFacade,
    sub: &SubComponent,
    owner: NodeId,
    folder: Option<NodeId>,
    group: NodeId,
) -> Result<(), GraphError> {
    let owner_name = graph.display_name(owner);
    let folder = component_folder(graph, owner, folder)?;

    let mut inputs = node_inputs(graph, folder);
    inputs.push(group);
    graph.set_inputs(folder, &inputs)?;

    graph.set_string_property(&sm_state(group, COMPONENT_OF_NODE), vec![owner.to_string()])?;
    graph.set_string_property(&sm_state(group, COMPONENT_HASH), vec![sub.hash()])?;
    graph.set_int_property(
        &sm_state(group, COMPONENT_SUB_TYPE),
        vec![sub.kind.as_i32()],
    )?;
    graph.set_display_name(group, &sub.node_name(&owner_name))?;

    if sub.kind != SubComponentKind::Media
        && let Some(source) = graph.source_node_of_group(group)
    {
        graph.set_string_property(&props::image_component_request(source), sub.request_value())?;
    }
    Ok(())
}

/// Existing node for `sub` of `owner`, or a freshly materialized one.
pub fn resolve_or_materialize(
    graph: &mut dyn GraphFacade,
    sub: &SubComponent,
    owner: NodeId,
) -> Result<NodeId, GraphError> {
    match resolve(graph, &sub.hash(), owner) {
        (Some(node), _) => Ok(node),
        (None, folder) => materialize(graph, sub, owner, folder),
    }
}
