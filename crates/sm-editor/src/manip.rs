//! Direct manipulation of 2D transforms in the viewer.
//!
//! Every input of the view node is drawn through its own transform node.
//! The manipulator tags those transform nodes so the renderer reports which
//! image is which, then turns pointer gestures over an image into edits of
//! its `transform.translate` and `transform.scale`:
//!
//! - **idle**: nothing under the pointer.
//! - **hover**: the pointer is over a tagged image; a corner or the body is
//!   grabbed on press.
//! - **editing**: button down; each drag step is applied incrementally and
//!   the down point follows the pointer.

use crate::hit::{self, Control, Grab};
use crate::input::InputEvent;
use sm_core::props::{tag, transform};
use sm_core::{
    Cursor, EventKind, GraphEvent, NodeId, Point, Propagation, RenderFacade, SessionConfig,
    Vec2, tag_value,
};

const MANIP_TAG: &str = "tmanip";
const STATE_TAG: &str = "tmanip_state";

const HOVER: &str = "hover";
const EDITING: &str = "editing";

/// A transform node and the view input drawn through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditNodePair {
    pub transform: NodeId,
    pub input: NodeId,
}

#[derive(Debug, Clone)]
pub struct TransformManip {
    edit_nodes: Vec<EditNodePair>,
    current: Option<NodeId>,
    grab: Grab,
    down: Point,
    editing: bool,
    did_drag: bool,
    active: bool,
    grab_radius: f64,
    min_scale: f64,
}

impl TransformManip {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            edit_nodes: Vec::new(),
            current: None,
            grab: Grab {
                control: Control::None,
                corner: None,
                center: Point::ZERO,
            },
            down: Point::ZERO,
            editing: false,
            did_drag: false,
            active: false,
            grab_radius: config.corner_grab_radius,
            min_scale: config.min_scale,
        }
    }

    pub fn edit_nodes(&self) -> &[EditNodePair] {
        &self.edit_nodes
    }

    /// Transform node under the pointer.
    pub fn hovered(&self) -> Option<NodeId> {
        self.current
    }

    pub fn control(&self) -> Control {
        self.grab.control
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Whether the current gesture has moved anything yet.
    pub fn did_drag(&self) -> bool {
        self.did_drag
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    pub fn activate(&mut self, host: &mut dyn RenderFacade) {
        self.active = true;
        self.find_editing_nodes(host, true);
    }

    pub fn deactivate(&mut self, host: &mut dyn RenderFacade) {
        host.set_cursor(Cursor::Arrow);
        self.remove_tags(host);
        self.active = false;
        self.current = None;
        self.editing = false;
    }

    /// React to graph events: the edit set follows the view node and its
    /// inputs.
    pub fn handle_event(&mut self, host: &mut dyn RenderFacade, event: &GraphEvent) -> Propagation {
        if !self.active {
            return Propagation::Continue;
        }
        match &event.kind {
            EventKind::InputsChanged(node) if host.view_node() == Some(*node) => {
                self.find_editing_nodes(host, false);
            }
            EventKind::AfterViewChange => self.find_editing_nodes(host, true),
            EventKind::BeforeViewChange => self.remove_tags(host),
            _ => {}
        }
        Propagation::Continue
    }

    /// Pair every transform node of the view with the input it draws and tag
    /// it. With `set_states` off, only untagged nodes get fresh tags. A count
    /// mismatch means the graph is mid-change: the set stays empty.
    pub fn find_editing_nodes(&mut self, host: &mut dyn RenderFacade, set_states: bool) {
        self.edit_nodes.clear();
        let Some(view) = host.view_node() else {
            return;
        };
        let transforms = match host.transform_nodes_of_view() {
            Ok(t) => t,
            Err(e) => {
                log::debug!("transforms of {view}: {e}");
                return;
            }
        };
        let inputs = match host.connections(view) {
            Ok(c) => c.inputs,
            Err(e) => {
                log::debug!("inputs of {view}: {e}");
                return;
            }
        };
        if transforms.len() != inputs.len() {
            log::trace!(
                "{} transforms for {} inputs of {view}",
                transforms.len(),
                inputs.len()
            );
            return;
        }

        for (transform, input) in transforms.into_iter().zip(inputs) {
            self.edit_nodes.push(EditNodePair { transform, input });
            if set_states || !host.property_exists(&tag(transform, MANIP_TAG)) {
                set_tag(host, transform, MANIP_TAG, transform.as_str());
                set_tag(host, transform, STATE_TAG, "");
            }
        }
    }

    /// Drop the manipulation tags of every known transform node.
    pub fn remove_tags(&mut self, host: &mut dyn RenderFacade) {
        for pair in &self.edit_nodes {
            for name in [MANIP_TAG, STATE_TAG] {
                let path = tag(pair.transform, name);
                if host.property_exists(&path)
                    && let Err(e) = host.delete_property(&path)
                {
                    log::debug!("{path}: {e}");
                }
            }
        }
    }

    /// Scale every image to fill the view's aspect, centered and unrotated.
    pub fn fit_all(&mut self, host: &mut dyn RenderFacade) {
        let aspect = host.view_node().map_or(1.0, |v| host.node_aspect(v));
        for pair in &self.edit_nodes {
            let input_aspect = host.node_aspect(pair.transform);
            let s = if input_aspect != 0.0 {
                aspect / input_aspect
            } else {
                1.0
            };
            write_transform(host, pair.transform, [0.0, 0.0], [s, s]);
        }
        host.redraw();
    }

    /// Put every image back to its untransformed placement.
    pub fn reset_all(&mut self, host: &mut dyn RenderFacade) {
        for pair in &self.edit_nodes {
            write_transform(host, pair.transform, [0.0, 0.0], [1.0, 1.0]);
        }
        host.redraw();
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, host: &mut dyn RenderFacade, event: &InputEvent) -> Propagation {
        if !self.active {
            return Propagation::Continue;
        }
        let p = event.position();
        match event {
            InputEvent::PointerMove { .. } => {
                self.hover(host, p);
                Propagation::Continue
            }
            InputEvent::PointerDown { .. } => self.press(host, p),
            InputEvent::PointerDrag { .. } => self.drag(host, p),
            InputEvent::PointerUp { .. } => self.release(host),
        }
    }

    fn hover(&mut self, host: &mut dyn RenderFacade, p: Point) {
        let last = self.current.take();
        self.grab.control = Control::None;
        host.set_cursor(Cursor::Arrow);

        let hit = host
            .images_at_pixel(p)
            .into_iter()
            .filter(|h| h.inside)
            .find_map(|h| tag_value(&h.tags, MANIP_TAG).map(|v| (h.index, v.to_string())));
        if let Some((index, value)) = hit {
            self.current = self
                .edit_nodes
                .iter()
                .find(|pair| pair.transform.as_str() == value)
                .map(|pair| pair.transform);
            if let Some(node) = self.current {
                set_tag(host, node, STATE_TAG, HOVER);
            }
            if let Some(quad) = host.image_geometry(index) {
                self.grab = hit::classify(&quad, p, self.grab_radius);
            }
            host.set_cursor(self.grab.control.cursor());
        }

        if last != self.current {
            if let Some(last) = last {
                set_tag(host, last, STATE_TAG, "");
            }
            host.redraw();
        }
    }

    fn press(&mut self, host: &mut dyn RenderFacade, p: Point) -> Propagation {
        let Some(node) = self.current else {
            return Propagation::Continue;
        };
        host.set_cursor(Cursor::ClosedHand);
        set_tag(host, node, STATE_TAG, EDITING);
        if active_image(host).is_none() {
            return Propagation::Stop;
        }
        self.down = p;
        self.did_drag = false;
        self.editing = true;
        host.redraw();
        Propagation::Stop
    }

    /// One incremental drag step, measured against the image's current quad.
    fn drag(&mut self, host: &mut dyn RenderFacade, p: Point) -> Propagation {
        let Some(node) = self.current else {
            return Propagation::Continue;
        };
        host.set_cursor(Cursor::ClosedHand);
        let Some(quad) = active_image(host).and_then(|i| host.image_geometry(i)) else {
            return Propagation::Stop;
        };

        let [tx, ty] = read_pair(host, &transform(node, "translate"), [0.0, 0.0]);
        let [sx, sy] = read_pair(host, &transform(node, "scale"), [1.0, 1.0]);

        let [a, b, _, d] = quad;
        let center = hit::quad_center(&quad);
        let corner = self.grab.corner.map_or(center, |i| quad[i]);

        let ip = p - self.down;
        let ba = (b - a).hypot();
        let da = (d - a).hypot();
        let aspect = if da != 0.0 { ba / da } else { 1.0 };
        let to_x = |v: f64| if ba != 0.0 { v / ba * sx * aspect } else { 0.0 };
        let to_y = |v: f64| if da != 0.0 { v / da * sy } else { 0.0 };

        let (translate, scale) = if self.grab.control.is_corner() {
            let dir = unit(corner - center);
            let diag_dist = (p - center).dot(dir);
            let down_dist = (self.down - center).dot(dir);
            let diff = diag_dist - down_dist;
            let scl = if down_dist != 0.0 {
                (diag_dist - diff / 2.0) / down_dist
            } else {
                1.0
            };
            let sv = dir * diff;
            let new_sx = (sx * scl).max(self.min_scale);
            let new_sy = if sx != 0.0 { sy * new_sx / sx } else { new_sx };
            (
                [tx + to_x(sv.x) / 2.0, ty + to_y(sv.y) / 2.0],
                [new_sx, new_sy],
            )
        } else {
            ([tx + to_x(ip.x), ty + to_y(ip.y)], [sx, sy])
        };

        write_pair(host, &transform(node, "translate"), translate);
        if self.grab.control.is_corner() {
            write_pair(host, &transform(node, "scale"), scale);
        }
        self.down = p;
        self.did_drag = true;
        host.redraw();
        Propagation::Stop
    }

    fn release(&mut self, host: &mut dyn RenderFacade) -> Propagation {
        let was_editing = self.editing;
        if was_editing {
            if let Some(node) = self.current {
                set_tag(host, node, STATE_TAG, HOVER);
            }
            host.set_cursor(Cursor::OpenHand);
        } else {
            host.set_cursor(Cursor::Arrow);
        }
        self.editing = false;
        self.did_drag = false;
        if was_editing {
            Propagation::Stop
        } else {
            Propagation::Continue
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Index of the image whose transform is hovered or being edited.
fn active_image(host: &dyn RenderFacade) -> Option<usize> {
    host.rendered_images()
        .into_iter()
        .find(|img| tag_value(&img.tags, STATE_TAG).is_some_and(|v| !v.is_empty()))
        .map(|img| img.index)
}

fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len == 0.0 { Vec2::ZERO } else { v / len }
}

fn set_tag(host: &mut dyn RenderFacade, node: NodeId, name: &str, value: &str) {
    let path = tag(node, name);
    if let Err(e) = host.set_string_property(&path, vec![value.to_string()]) {
        log::debug!("{path}: {e}");
    }
}

fn read_pair(host: &dyn RenderFacade, path: &str, default: [f64; 2]) -> [f64; 2] {
    match host.float_property(path) {
        Ok(v) if v.len() >= 2 => [f64::from(v[0]), f64::from(v[1])],
        _ => default,
    }
}

fn write_pair(host: &mut dyn RenderFacade, path: &str, value: [f64; 2]) {
    if let Err(e) = host.set_float_property(path, vec![value[0] as f32, value[1] as f32]) {
        log::debug!("{path}: {e}");
    }
}

fn write_transform(host: &mut dyn RenderFacade, node: NodeId, translate: [f64; 2], scale: [f64; 2]) {
    write_pair(host, &transform(node, "translate"), translate);
    write_pair(host, &transform(node, "scale"), scale);
    let rotate = transform(node, "rotate");
    if let Err(e) = host.set_float_property(&rotate, vec![0.0]) {
        log::debug!("{rotate}: {e}");
    }
}
