//! Validated connection edits.
//!
//! Every structural change the session manager makes to an input list goes
//! through `set_inputs_checked`: the facade's pre-check runs first and a
//! refusal is surfaced once as a user-facing alert, leaving the graph as it
//! was.

use crate::facade::GraphFacade;
use crate::id::NodeId;

/// Title of the alert shown when a connection is refused.
pub const REJECTED_TITLE: &str = "Some inputs are not allowed here";

/// Direct inputs of `node`, or empty if the node is gone.
pub fn node_inputs(graph: &dyn GraphFacade, node: NodeId) -> Vec<NodeId> {
    match graph.connections(node) {
        Ok(c) => c.inputs,
        Err(e) => {
            log::debug!("inputs of {node}: {e}");
            Vec::new()
        }
    }
}

/// Direct outputs of `node`, or empty if the node is gone.
pub fn node_outputs(graph: &dyn GraphFacade, node: NodeId) -> Vec<NodeId> {
    graph
        .connections(node)
        .map(|c| c.outputs)
        .unwrap_or_default()
}

/// Replace the inputs of `node` after validating them. Returns whether the
/// new list was committed.
pub fn set_inputs_checked(graph: &mut dyn GraphFacade, node: NodeId, inputs: &[NodeId]) -> bool {
    if let Some(reason) = graph.test_inputs(node, inputs) {
        log::warn!("refused inputs for {node}: {reason}");
        graph.alert(REJECTED_TITLE, &reason);
        return false;
    }
    match graph.set_inputs(node, inputs) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("set inputs of {node}: {e}");
            false
        }
    }
}

/// Append `input` to the inputs of `node`. A missing `node` is not an error.
pub fn add_input(graph: &mut dyn GraphFacade, node: NodeId, input: NodeId) -> bool {
    if !graph.node_exists(node) {
        return true;
    }
    let mut inputs = node_inputs(graph, node);
    inputs.push(input);
    set_inputs_checked(graph, node, &inputs)
}

/// Drop every occurrence of `input` from the inputs of `node`.
pub fn remove_input(graph: &mut dyn GraphFacade, node: NodeId, input: NodeId) -> bool {
    if !graph.node_exists(node) {
        return true;
    }
    let inputs: Vec<NodeId> = node_inputs(graph, node)
        .into_iter()
        .filter(|n| *n != input)
        .collect();
    set_inputs_checked(graph, node, &inputs)
}

/// Does `node` already consume `input`? A missing parent counts as yes so
/// callers never try to connect to nothing.
pub fn has_input(graph: &dyn GraphFacade, node: Option<NodeId>, input: NodeId) -> bool {
    match node {
        None => true,
        Some(node) => graph
            .connections(node)
            .map(|c| c.inputs.contains(&input))
            .unwrap_or(false),
    }
}

/// Number of folders `node` feeds.
pub fn folder_output_count(graph: &dyn GraphFacade, node: NodeId) -> usize {
    node_outputs(graph, node)
        .into_iter()
        .filter(|o| graph.node_type(*o).is_ok_and(|t| t.is_folder()))
        .count()
}
