//! Simulation mode: the fox hunt itself.
//!
//! Each probe advances the day and recomputes, for every node, whether
//! the fox could still be there. The rule is deliberately the literal
//! observed one: a node stays possible when some neighbor other than the
//! probed node was possible the previous day, and the probed node's own
//! new value follows the same formula over its own neighbors.

use std::collections::HashMap;
use std::rc::Rc;

use ratatui::style::Color;

use crate::engine::mode::{Mode, ModeGuard};
use crate::engine::surface::{EdgeDisplay, Gesture, GestureKind};
use crate::engine::Context;
use crate::graph::model::{Graph, NodeId};

const POSSIBLE_COLOR: Color = Color::Yellow;
const ELIMINATED_COLOR: Color = Color::Red;
const NEUTRAL_EDGE_COLOR: Color = Color::DarkGray;

/// Day-indexed history of possibility snapshots.
///
/// Strictly append/pop: snapshot `i` derives only from snapshot `i - 1`
/// (or the all-true day-0 state) and the probe made on day `i`. The day
/// counter is the history length.
#[derive(Debug, Default)]
pub struct SimulationState {
    pub history: Vec<HashMap<NodeId, bool>>,
}

impl SimulationState {
    pub fn day(&self) -> usize {
        self.history.len()
    }
}

fn active(ctx: &Context) -> bool {
    ctx.active.get() == Some(Mode::Simulation)
}

fn set_all_flags(graph: &mut Graph, value: Option<bool>) {
    for id in graph.node_ids() {
        if let Some(attrs) = graph.node_mut(id) {
            attrs.possible_fox = value;
        }
    }
}

/// Write the latest snapshot's flags into the graph, or the all-true
/// day-0 state when the history is empty.
fn apply_current(ctx: &Context) {
    let mut graph = ctx.graph.borrow_mut();
    let sim = ctx.simulation.borrow();
    match sim.history.last() {
        None => set_all_flags(&mut graph, Some(true)),
        Some(snapshot) => {
            for (&node, &possible) in snapshot {
                if let Some(attrs) = graph.node_mut(node) {
                    attrs.possible_fox = Some(possible);
                }
            }
        }
    }
}

/// Probe `probed`, producing the next day.
///
/// Two phases: compute the full next-day mapping from the current flags,
/// then apply it — neighbors must all be read at day `t` before any
/// day `t + 1` value lands. A probe on an empty graph still advances the
/// day; an isolated node's empty neighbor set yields `false`.
pub fn probe(ctx: &Context, probed: NodeId) {
    if !active(ctx) {
        return;
    }

    let mut graph = ctx.graph.borrow_mut();
    let mut next: HashMap<NodeId, bool> = HashMap::new();
    for node in graph.node_ids() {
        let possible = graph.neighbors(node).into_iter().any(|neighbor| {
            // The probed node cannot act as a source for its neighbors.
            if neighbor == probed {
                return false;
            }
            graph
                .node(neighbor)
                .and_then(|attrs| attrs.possible_fox)
                .unwrap_or(false)
        });
        next.insert(node, possible);
    }
    for (&node, &possible) in &next {
        if let Some(attrs) = graph.node_mut(node) {
            attrs.possible_fox = Some(possible);
        }
    }
    drop(graph);

    ctx.simulation.borrow_mut().history.push(next);
}

/// Pop the latest day and restore the snapshot beneath it (or the
/// all-true day-0 state). A no-op at day 0.
pub fn undo(ctx: &Context) {
    if !active(ctx) {
        return;
    }
    ctx.simulation.borrow_mut().history.pop();
    apply_current(ctx);
}

/// Forget every probe and return to day 0.
pub fn reset(ctx: &Context) {
    if !active(ctx) {
        return;
    }
    ctx.simulation.borrow_mut().history.clear();
    apply_current(ctx);
}

/// Install simulation mode: all-true flags, empty history, the probe
/// binding and the possibility reducers. The release token strips the
/// transient flags from every node.
pub fn setup(ctx: &Context) -> ModeGuard {
    set_all_flags(&mut ctx.graph.borrow_mut(), Some(true));
    ctx.simulation.borrow_mut().history.clear();

    let mut surface = ctx.surface.borrow_mut();
    let mut bindings = Vec::new();

    let c = ctx.clone();
    bindings.push(surface.on(
        GestureKind::ClickNode,
        Rc::new(move |g| {
            if let Gesture::ClickNode { node } = *g {
                probe(&c, node);
            }
            false
        }),
    ));

    let graph = ctx.graph.clone();
    surface.set_node_reducer(Rc::new(move |node, mut display| {
        let eliminated = graph
            .borrow()
            .node(node)
            .map(|attrs| attrs.possible_fox == Some(false))
            .unwrap_or(false);
        display.color = if eliminated {
            ELIMINATED_COLOR
        } else {
            POSSIBLE_COLOR
        };
        display
    }));

    surface.set_edge_reducer(Rc::new(|_, _| EdgeDisplay {
        color: NEUTRAL_EDGE_COLOR,
    }));

    drop(surface);

    let graph = ctx.graph.clone();
    ModeGuard::new(bindings)
        .with_reducers(true, true)
        .with_restore(move |_| set_all_flags(&mut graph.borrow_mut(), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mode::ModeController;
    use crate::graph::model::NodeAttrs;

    /// Path graph A - B - C with simulation installed.
    fn path_ctx() -> (Context, ModeController, NodeId, NodeId, NodeId) {
        let mut g = Graph::new();
        let a = g.add_node(NodeAttrs::at(0.0, 0.0));
        let b = g.add_node(NodeAttrs::at(1.0, 0.0));
        let c = g.add_node(NodeAttrs::at(2.0, 0.0));
        g.add_edge(a, b).unwrap();
        g.add_edge(b, c).unwrap();
        let ctx = Context::new(g);
        let controller = ModeController::new(ctx.clone());
        (ctx, controller, a, b, c)
    }

    fn flag(ctx: &Context, id: NodeId) -> Option<bool> {
        ctx.graph.borrow().node(id).unwrap().possible_fox
    }

    #[test]
    fn probing_the_middle_of_a_path_isolates_it() {
        let (ctx, _controller, a, b, c) = path_ctx();

        probe(&ctx, b);
        assert_eq!(flag(&ctx, a), Some(false));
        assert_eq!(flag(&ctx, b), Some(true));
        assert_eq!(flag(&ctx, c), Some(false));
        assert_eq!(ctx.simulation.borrow().day(), 1);
    }

    #[test]
    fn probe_sequence_undo_and_reset_follow_the_specified_scenario() {
        let (ctx, _controller, a, b, c) = path_ctx();

        probe(&ctx, b);
        probe(&ctx, a);
        assert_eq!(flag(&ctx, a), Some(true));
        assert_eq!(flag(&ctx, b), Some(false));
        assert_eq!(flag(&ctx, c), Some(true));
        assert_eq!(ctx.simulation.borrow().day(), 2);

        undo(&ctx);
        assert_eq!(flag(&ctx, a), Some(false));
        assert_eq!(flag(&ctx, b), Some(true));
        assert_eq!(flag(&ctx, c), Some(false));
        assert_eq!(ctx.simulation.borrow().day(), 1);

        reset(&ctx);
        assert_eq!(flag(&ctx, a), Some(true));
        assert_eq!(flag(&ctx, b), Some(true));
        assert_eq!(flag(&ctx, c), Some(true));
        assert_eq!(ctx.simulation.borrow().day(), 0);
    }

    #[test]
    fn undo_past_day_zero_keeps_the_all_true_state() {
        let (ctx, _controller, a, b, c) = path_ctx();
        probe(&ctx, b);
        undo(&ctx);
        undo(&ctx);
        assert_eq!(ctx.simulation.borrow().day(), 0);
        for id in [a, b, c] {
            assert_eq!(flag(&ctx, id), Some(true));
        }
    }

    #[test]
    fn day_counter_always_equals_history_length() {
        let (ctx, _controller, a, b, _c) = path_ctx();
        for _ in 0..3 {
            probe(&ctx, a);
            probe(&ctx, b);
        }
        assert_eq!(ctx.simulation.borrow().day(), 6);
        undo(&ctx);
        assert_eq!(ctx.simulation.borrow().day(), 5);
        reset(&ctx);
        assert_eq!(ctx.simulation.borrow().day(), 0);
    }

    #[test]
    fn undo_restores_the_exact_prior_snapshot() {
        let (ctx, _controller, a, b, c) = path_ctx();
        probe(&ctx, b);
        let day1: Vec<Option<bool>> = [a, b, c].iter().map(|&id| flag(&ctx, id)).collect();
        probe(&ctx, c);
        undo(&ctx);
        let restored: Vec<Option<bool>> = [a, b, c].iter().map(|&id| flag(&ctx, id)).collect();
        assert_eq!(restored, day1);
    }

    #[test]
    fn isolated_nodes_are_eliminated_by_any_probe() {
        let mut g = Graph::new();
        let lone = g.add_node(NodeAttrs::at(0.0, 0.0));
        let other = g.add_node(NodeAttrs::at(1.0, 0.0));
        let ctx = Context::new(g);
        let _controller = ModeController::new(ctx.clone());

        probe(&ctx, other);
        // An empty neighbor set yields false; not an error.
        assert_eq!(flag(&ctx, lone), Some(false));
        assert_eq!(ctx.simulation.borrow().day(), 1);
    }

    #[test]
    fn probing_an_empty_graph_still_advances_the_day() {
        let ctx = Context::new(Graph::new());
        let _controller = ModeController::new(ctx.clone());
        probe(&ctx, NodeId(0));
        assert_eq!(ctx.simulation.borrow().day(), 1);
    }

    #[test]
    fn reprobing_the_same_node_keeps_appending_snapshots() {
        let (ctx, _controller, _a, b, _c) = path_ctx();
        probe(&ctx, b);
        probe(&ctx, b);
        probe(&ctx, b);
        assert_eq!(ctx.simulation.borrow().day(), 3);
    }

    #[test]
    fn probed_node_derives_its_own_value_from_its_own_neighbors() {
        // Two connected nodes, both possible: probing one leaves it
        // possible (its neighbor was a valid source) while the neighbor
        // is eliminated (its only source was the probed node).
        let mut g = Graph::new();
        let a = g.add_node(NodeAttrs::at(0.0, 0.0));
        let b = g.add_node(NodeAttrs::at(1.0, 0.0));
        g.add_edge(a, b).unwrap();
        let ctx = Context::new(g);
        let _controller = ModeController::new(ctx.clone());

        probe(&ctx, a);
        assert_eq!(flag(&ctx, a), Some(true));
        assert_eq!(flag(&ctx, b), Some(false));
    }

    #[test]
    fn operations_are_noops_while_edition_is_active() {
        let (ctx, mut controller, _a, b, _c) = path_ctx();
        controller.change_mode(Mode::Edition);

        probe(&ctx, b);
        undo(&ctx);
        reset(&ctx);
        assert_eq!(ctx.simulation.borrow().day(), 0);
        assert_eq!(flag(&ctx, b), None, "flags stay stripped outside simulation");
    }
}
