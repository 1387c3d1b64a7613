use std::collections::BTreeMap;

/// Key of a node. Allocated by the graph, never reused within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Key of an edge. Allocated by the graph, never reused within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

/// Display shape hint for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Figure {
    #[default]
    Circle,
    Square,
}

pub const DEFAULT_NODE_SIZE: f64 = 2.0;

/// Per-node attributes.
///
/// `x`/`y` are graph-space coordinates; nodes created or moved by the
/// edition component always carry integer values. `possible_fox` is
/// transient: it is `Some` only while simulation mode is active and is
/// stripped back to `None` when that mode exits.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAttrs {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub figure: Figure,
    pub label: String,
    pub possible_fox: Option<bool>,
}

impl NodeAttrs {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            size: DEFAULT_NODE_SIZE,
            figure: Figure::default(),
            label: String::new(),
            possible_fox: None,
        }
    }

    pub fn labelled(x: f64, y: f64, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::at(x, y)
        }
    }
}

/// A mutable undirected graph with id-keyed nodes and edges.
///
/// The model itself enforces very little: self-loops and isolated nodes
/// are legal here, and the no-self-loop rule is owned by the edition
/// component. The only model-level refusals are edges with a missing
/// endpoint and exact duplicates of an existing endpoint pair.
#[derive(Debug, Default)]
pub struct Graph {
    next_node: u64,
    next_edge: u64,
    nodes: BTreeMap<NodeId, NodeAttrs>,
    edges: BTreeMap<EdgeId, (NodeId, NodeId)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, returning its freshly allocated id.
    pub fn add_node(&mut self, attrs: NodeAttrs) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, attrs);
        id
    }

    /// Insert an undirected edge between `a` and `b`.
    ///
    /// Returns `None` without touching the graph when either endpoint is
    /// missing or an edge between the pair (in either order) already exists.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
            return None;
        }
        if self.edge_between(a, b).is_some() {
            return None;
        }
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(id, (a, b));
        Some(id)
    }

    /// Remove a node and every edge incident to it.
    pub fn drop_node(&mut self, id: NodeId) -> bool {
        if self.nodes.remove(&id).is_none() {
            return false;
        }
        self.edges.retain(|_, &mut (a, b)| a != id && b != id);
        true
    }

    pub fn drop_edge(&mut self, id: EdgeId) -> bool {
        self.edges.remove(&id).is_some()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeAttrs> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeAttrs> {
        self.nodes.get_mut(&id)
    }

    /// All node ids, in stable (ascending) order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys().copied().collect()
    }

    pub fn edge_endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edges.get(&id).copied()
    }

    /// The edge joining `a` and `b` in either orientation, if any.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.edges
            .iter()
            .find(|&(_, &(s, t))| (s == a && t == b) || (s == b && t == a))
            .map(|(&id, _)| id)
    }

    /// Ids adjacent to `id`. A self-loop reports the node once.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &(a, b) in self.edges.values() {
            if a == id && !out.contains(&b) {
                out.push(b);
            } else if b == id && !out.contains(&a) {
                out.push(a);
            }
        }
        out
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
