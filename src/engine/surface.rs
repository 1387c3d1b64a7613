//! The interaction surface: an abstract gesture dispatch table plus the
//! camera and the per-node/per-edge visual override hooks ("reducers").
//!
//! The surface knows nothing about modes. Components subscribe handlers
//! for gesture kinds and get back binding ids; a mode's teardown token
//! removes exactly the ids it installed, so two modes can never react to
//! the same gesture at once.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crossterm::event::KeyCode;
use ratatui::style::Color;

use crate::graph::model::{EdgeId, Figure, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    DoubleClickEmpty,
    ClickNode,
    ClickEdge,
    ClickEmpty,
    RightClickNode,
    DownNode,
    PointerMove,
    PointerUp,
    KeyPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// One discrete input event, already translated out of terminal terms.
/// Pointer coordinates are viewport coordinates (terminal cells).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    DoubleClickEmpty { x: f64, y: f64 },
    ClickNode { node: NodeId },
    ClickEdge { edge: EdgeId },
    ClickEmpty,
    RightClickNode { node: NodeId },
    DownNode { node: NodeId, button: PointerButton },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    KeyPress { key: KeyCode },
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Self::DoubleClickEmpty { .. } => GestureKind::DoubleClickEmpty,
            Self::ClickNode { .. } => GestureKind::ClickNode,
            Self::ClickEdge { .. } => GestureKind::ClickEdge,
            Self::ClickEmpty => GestureKind::ClickEmpty,
            Self::RightClickNode { .. } => GestureKind::RightClickNode,
            Self::DownNode { .. } => GestureKind::DownNode,
            Self::PointerMove { .. } => GestureKind::PointerMove,
            Self::PointerUp => GestureKind::PointerUp,
            Self::KeyPress { .. } => GestureKind::KeyPress,
        }
    }
}

/// A gesture handler. Returning `true` consumes the gesture, suppressing
/// the surface host's default behavior (pan-on-drag).
pub type Handler = Rc<dyn Fn(&Gesture) -> bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

/// Base display attributes for a node before reducers run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDisplay {
    pub color: Color,
    pub size: f64,
    pub figure: Figure,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDisplay {
    pub color: Color,
}

pub type NodeReducer = Rc<dyn Fn(NodeId, NodeDisplay) -> NodeDisplay>;
pub type EdgeReducer = Rc<dyn Fn(EdgeId, EdgeDisplay) -> EdgeDisplay>;

pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 8.0;

/// Viewport transform: `viewport = graph * zoom + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn viewport_to_graph(&self, vx: f64, vy: f64) -> (f64, f64) {
        ((vx - self.x) / self.zoom, (vy - self.y) / self.zoom)
    }

    pub fn graph_to_viewport(&self, gx: f64, gy: f64) -> (f64, f64) {
        (gx * self.zoom + self.x, gy * self.zoom + self.y)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Zoom by `factor`, keeping the graph point under `(vx, vy)` fixed.
    pub fn zoom_at(&mut self, vx: f64, vy: f64, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = new_zoom / self.zoom;
        self.x = vx - (vx - self.x) * ratio;
        self.y = vy - (vy - self.y) * ratio;
        self.zoom = new_zoom;
    }
}

#[derive(Default)]
pub struct Surface {
    next_binding: u64,
    bindings: HashMap<GestureKind, Vec<(BindingId, Handler)>>,
    node_reducer: Option<NodeReducer>,
    edge_reducer: Option<EdgeReducer>,
    pub camera: Camera,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `kind`. The returned id unsubscribes it.
    pub fn on(&mut self, kind: GestureKind, handler: Handler) -> BindingId {
        let id = BindingId(self.next_binding);
        self.next_binding += 1;
        self.bindings.entry(kind).or_default().push((id, handler));
        id
    }

    pub fn off(&mut self, id: BindingId) -> bool {
        for handlers in self.bindings.values_mut() {
            if let Some(pos) = handlers.iter().position(|(b, _)| *b == id) {
                handlers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Total number of installed gesture bindings, across all kinds.
    pub fn binding_count(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    /// Snapshot of the handlers currently bound to `kind`.
    ///
    /// Cloned out so the caller can release its borrow of the surface
    /// before invoking them; handlers are free to re-borrow it.
    pub fn handlers_for(&self, kind: GestureKind) -> Vec<Handler> {
        self.bindings
            .get(&kind)
            .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }

    pub fn set_node_reducer(&mut self, reducer: NodeReducer) {
        self.node_reducer = Some(reducer);
    }

    pub fn clear_node_reducer(&mut self) {
        self.node_reducer = None;
    }

    pub fn set_edge_reducer(&mut self, reducer: EdgeReducer) {
        self.edge_reducer = Some(reducer);
    }

    pub fn clear_edge_reducer(&mut self) {
        self.edge_reducer = None;
    }

    /// Run the node reducer over `base`, or pass `base` through untouched.
    pub fn node_display(&self, node: NodeId, base: NodeDisplay) -> NodeDisplay {
        match &self.node_reducer {
            Some(reduce) => reduce(node, base),
            None => base,
        }
    }

    pub fn edge_display(&self, edge: EdgeId, base: EdgeDisplay) -> EdgeDisplay {
        match &self.edge_reducer {
            Some(reduce) => reduce(edge, base),
            None => base,
        }
    }
}

/// Dispatch one gesture to every handler bound to its kind.
///
/// Returns `true` when any handler consumed it. The surface borrow is
/// released before handlers run, so they may freely re-borrow the surface
/// (e.g. for camera conversion) or the graph.
pub fn dispatch(surface: &Rc<RefCell<Surface>>, gesture: &Gesture) -> bool {
    let handlers = surface.borrow().handlers_for(gesture.kind());
    let mut consumed = false;
    for handler in handlers {
        consumed |= handler(gesture);
    }
    consumed
}
