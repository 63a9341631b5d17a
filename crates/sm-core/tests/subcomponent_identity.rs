//! Integration tests: materializing sub-components and finding them again.

use pretty_assertions::assert_eq;
use sm_core::props::{self, sm_state};
use sm_core::subcomponent::{self, SubComponent};
use sm_core::*;

fn session() -> (MemoryGraph, NodeId) {
    let mut g = MemoryGraph::new();
    let owner = g.add_source_node(
        "idShot",
        vec![MediaInfo {
            file: "/shots/idShot.exr".into(),
            views: vec![ViewInfo {
                name: "".into(),
                layers: vec![
                    LayerInfo::new("diffuse", &["R", "G", "B"]),
                    LayerInfo::new("specular", &["R", "G", "B"]),
                ],
                no_layer_channels: vec![],
            }],
        }],
    );
    g.set_display_name(owner, "Shot 10").unwrap();
    g.set_view(owner);
    g.drain_events();
    (g, owner)
}

#[test]
fn resolve_before_materialize_finds_nothing() {
    let (g, owner) = session();
    let sub = SubComponent::layer("/shots/idShot.exr", None, "diffuse");
    assert_eq!(subcomponent::resolve(&g, &sub.hash(), owner), (None, None));
}

#[test]
fn materialize_then_resolve_round_trips() {
    let (mut g, owner) = session();
    let sub = SubComponent::layer("/shots/idShot.exr", None, "diffuse");
    let node = subcomponent::materialize(&mut g, &sub, owner, None).unwrap();

    let (found, folder) = subcomponent::resolve(&g, &sub.hash(), owner);
    assert_eq!(found, Some(node));
    let folder = folder.unwrap();
    assert_eq!(g.connections(folder).unwrap().inputs, vec![node]);
    assert_eq!(g.display_name(folder), "Components of Shot 10");
    assert_eq!(g.display_name(node), "Shot 10 (Layer diffuse)");
    assert_eq!(
        g.int_property(&sm_state(node, props::COMPONENT_SUB_TYPE)).unwrap(),
        vec![SubComponentKind::Layer.as_i32()]
    );

    let source = g.source_node_of_group(node).unwrap();
    assert_eq!(
        g.string_property(&props::image_component_request(source)).unwrap(),
        vec!["layer", "", "diffuse"]
    );
    assert_eq!(g.feedback(), &["NOTE: Created Shot 10 (Layer diffuse)".to_string()]);
}

#[test]
fn second_component_reuses_folder() {
    let (mut g, owner) = session();
    let diffuse = SubComponent::layer("/shots/idShot.exr", None, "diffuse");
    let red = SubComponent::channel("/shots/idShot.exr", None, Some("specular"), "R");
    let a = subcomponent::resolve_or_materialize(&mut g, &diffuse, owner).unwrap();
    let b = subcomponent::resolve_or_materialize(&mut g, &red, owner).unwrap();
    let again = subcomponent::resolve_or_materialize(&mut g, &diffuse, owner).unwrap();

    assert_eq!(again, a);
    let (_, folder) = subcomponent::resolve(&g, &red.hash(), owner);
    assert_eq!(g.connections(folder.unwrap()).unwrap().inputs, vec![a, b]);
    let folders = g
        .nodes()
        .into_iter()
        .filter(|n| g.node_type(*n).is_ok_and(|t| t.is_folder()))
        .count();
    assert_eq!(folders, 1);
}

#[test]
fn materialized_source_inherits_media_structure() {
    let (mut g, owner) = session();
    let sub = SubComponent::media("/shots/idShot.exr");
    let node = subcomponent::materialize(&mut g, &sub, owner, None).unwrap();
    let source = g.source_node_of_group(node).unwrap();
    assert_eq!(g.media_info(source).unwrap()[0].views[0].layers.len(), 2);
    // media components select nothing
    assert!(!g.property_exists(&props::image_component_request(source)));
    assert_eq!(g.display_name(node), "Shot 10 (Media /shots/idShot.exr)");
}

#[test]
fn components_are_scoped_to_their_owner() {
    let (mut g, owner) = session();
    let other = g.add_source_node("idOther", vec![]);
    let sub = SubComponent::layer("/shots/idShot.exr", None, "diffuse");
    subcomponent::materialize(&mut g, &sub, owner, None).unwrap();
    assert_eq!(subcomponent::resolve(&g, &sub.hash(), other), (None, None));
}

#[test]
fn failed_filing_leaves_no_stray_group() {
    let (mut g, owner) = session();
    let before = g.nodes().len();
    let sub = SubComponent::layer("/shots/idShot.exr", None, "specular");
    let missing = NodeId::intern("idMissingFolder");

    assert!(subcomponent::materialize(&mut g, &sub, owner, Some(missing)).is_err());
    assert_eq!(g.nodes().len(), before);
    assert!(g.feedback().is_empty());
}
