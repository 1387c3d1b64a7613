//! Edition mode: free editing of the graph topology and layout.
//!
//! Every operation is guarded by the active-mode check and silently
//! no-ops when edition is not the installed mode — handlers are only
//! unregistered on transition, never destroyed, so a stray queued event
//! must not be able to mutate anything.

use std::rc::Rc;

use ratatui::style::Color;

use crate::engine::mode::{Mode, ModeGuard};
use crate::engine::surface::{Gesture, GestureKind, PointerButton};
use crate::engine::Context;
use crate::graph::model::{EdgeId, Graph, NodeAttrs, NodeId};

const SELECTED_NODE_COLOR: Color = Color::Cyan;
const SELECTED_EDGE_COLOR: Color = Color::Cyan;

/// The single active selection. Selecting one kind replaces the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Node(NodeId),
    Edge(EdgeId),
}

/// `node` is non-`None` only while `dragging` is set; pointer-up or mode
/// exit resets both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragSession {
    pub dragging: bool,
    pub node: Option<NodeId>,
}

#[derive(Debug, Default)]
pub struct EditionState {
    pub selection: Option<Selection>,
    pub drag: DragSession,
}

fn active(ctx: &Context) -> bool {
    ctx.active.get() == Some(Mode::Edition)
}

/// True when some node other than `except` sits exactly on `(x, y)`.
///
/// The no-two-nodes-on-one-integer-coordinate rule is a business rule of
/// edition mode, not an error: colliding creations and moves are ignored.
fn occupied(graph: &Graph, x: f64, y: f64, except: Option<NodeId>) -> bool {
    graph.node_ids().into_iter().any(|id| {
        if Some(id) == except {
            return false;
        }
        let attrs = graph.node(id).expect("id comes from node_ids");
        attrs.x == x && attrs.y == y
    })
}

/// Create a node at the graph point under `(vx, vy)`, rounded to the
/// nearest integer coordinates, and select it. Aborts silently when the
/// rounded coordinate pair is already taken.
pub fn create_node(ctx: &Context, vx: f64, vy: f64) {
    if !active(ctx) {
        return;
    }
    let (gx, gy) = ctx.surface.borrow().camera.viewport_to_graph(vx, vy);
    let (gx, gy) = (gx.round(), gy.round());

    let mut graph = ctx.graph.borrow_mut();
    if occupied(&graph, gx, gy, None) {
        return;
    }
    let mut attrs = NodeAttrs::at(gx, gy);
    attrs.label = format!("{}", graph.node_count() + 1);
    let id = graph.add_node(attrs);
    drop(graph);

    ctx.edition.borrow_mut().selection = Some(Selection::Node(id));
}

pub fn reset_selection(ctx: &Context) {
    if !active(ctx) {
        return;
    }
    ctx.edition.borrow_mut().selection = None;
}

pub fn select_node(ctx: &Context, node: NodeId) {
    if !active(ctx) {
        return;
    }
    let mut state = ctx.edition.borrow_mut();
    state.selection = None;
    state.selection = Some(Selection::Node(node));
}

pub fn select_edge(ctx: &Context, edge: EdgeId) {
    if !active(ctx) {
        return;
    }
    let mut state = ctx.edition.borrow_mut();
    state.selection = None;
    state.selection = Some(Selection::Edge(edge));
}

/// Link the currently selected node to `target`. Requires a node
/// selection and `target` different from it (no self-loops).
pub fn create_edge(ctx: &Context, target: NodeId) {
    if !active(ctx) {
        return;
    }
    let Some(Selection::Node(source)) = ctx.edition.borrow().selection else {
        return;
    };
    if source == target {
        return;
    }
    ctx.graph.borrow_mut().add_edge(source, target);
}

/// Delete the selected entity. Node deletion cascades incident edges;
/// the selection is cleared either way.
pub fn delete_selection(ctx: &Context) {
    if !active(ctx) {
        return;
    }
    let mut state = ctx.edition.borrow_mut();
    match state.selection.take() {
        Some(Selection::Node(node)) => {
            ctx.graph.borrow_mut().drop_node(node);
        }
        Some(Selection::Edge(edge)) => {
            ctx.graph.borrow_mut().drop_edge(edge);
        }
        None => {}
    }
}

/// Begin dragging `node`. Only the primary pointer button starts a drag;
/// the node is also selected.
pub fn start_dragging(ctx: &Context, node: NodeId, button: PointerButton) {
    if !active(ctx) {
        return;
    }
    if button != PointerButton::Primary {
        return;
    }
    let mut state = ctx.edition.borrow_mut();
    state.selection = Some(Selection::Node(node));
    state.drag = DragSession {
        dragging: true,
        node: Some(node),
    };
}

/// Move the dragged node to the rounded graph point under `(vx, vy)`.
/// Moves onto an occupied integer coordinate are silently ignored; the
/// dragged node's own cell does not count as occupied.
pub fn drag_node(ctx: &Context, vx: f64, vy: f64) {
    if !active(ctx) {
        return;
    }
    let drag = ctx.edition.borrow().drag;
    if !drag.dragging {
        return;
    }
    let Some(node) = drag.node else {
        return;
    };

    let (gx, gy) = ctx.surface.borrow().camera.viewport_to_graph(vx, vy);
    let (gx, gy) = (gx.round(), gy.round());

    let mut graph = ctx.graph.borrow_mut();
    if occupied(&graph, gx, gy, Some(node)) {
        return;
    }
    if let Some(attrs) = graph.node_mut(node) {
        attrs.x = gx;
        attrs.y = gy;
    }
}

/// End any drag in progress, unconditionally.
pub fn stop_dragging(ctx: &Context) {
    if !active(ctx) {
        return;
    }
    ctx.edition.borrow_mut().drag = DragSession::default();
}

/// Install edition mode: reset local state, bind the gesture handlers and
/// the selection-highlight reducers, and hand back the release token.
pub fn setup(ctx: &Context) -> ModeGuard {
    {
        let mut state = ctx.edition.borrow_mut();
        state.selection = None;
        state.drag = DragSession::default();
    }

    let mut surface = ctx.surface.borrow_mut();
    let mut bindings = Vec::new();

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::DoubleClickEmpty,
        Rc::new(move |g| {
            if let Gesture::DoubleClickEmpty { x, y } = *g {
                create_node(&c, x, y);
                return true;
            }
            false
        }),
    ));

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::ClickNode,
        Rc::new(move |g| {
            if let Gesture::ClickNode { node } = *g {
                select_node(&c, node);
            }
            false
        }),
    ));

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::ClickEdge,
        Rc::new(move |g| {
            if let Gesture::ClickEdge { edge } = *g {
                select_edge(&c, edge);
            }
            false
        }),
    ));

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::ClickEmpty,
        Rc::new(move |_| {
            reset_selection(&c);
            false
        }),
    ));

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::RightClickNode,
        Rc::new(move |g| {
            if let Gesture::RightClickNode { node } = *g {
                create_edge(&c, node);
                return true;
            }
            false
        }),
    ));

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::DownNode,
        Rc::new(move |g| {
            if let Gesture::DownNode { node, button } = *g {
                start_dragging(&c, node, button);
                return button == PointerButton::Primary;
            }
            false
        }),
    ));

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::PointerMove,
        Rc::new(move |g| {
            if let Gesture::PointerMove { x, y } = *g {
                let dragging = c.edition.borrow().drag.dragging;
                drag_node(&c, x, y);
                return dragging;
            }
            false
        }),
    ));

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::PointerUp,
        Rc::new(move |_| {
            stop_dragging(&c);
            false
        }),
    ));

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::KeyPress,
        Rc::new(move |g| {
            if let Gesture::KeyPress { key } = *g {
                if key == crossterm::event::KeyCode::Delete {
                    delete_selection(&c);
                }
            }
            false
        }),
    ));

    let state = ctx.edition.clone();
    surface.set_node_reducer(Rc::new(move |node, mut display| {
        if state.borrow().selection == Some(Selection::Node(node)) {
            display.color = SELECTED_NODE_COLOR;
        }
        display
    }));

    let state = ctx.edition.clone();
    surface.set_edge_reducer(Rc::new(move |edge, mut display| {
        if state.borrow().selection == Some(Selection::Edge(edge)) {
            display.color = SELECTED_EDGE_COLOR;
        }
        display
    }));

    drop(surface);

    let reset = ctx.edition.clone();
    ModeGuard::new(bindings)
        .with_reducers(true, true)
        .with_restore(move |_| {
            let mut state = reset.borrow_mut();
            state.selection = None;
            state.drag = DragSession::default();
        })
}
