//! The mode state machine.
//!
//! Exactly one of the two modes is active at a time. Every transition —
//! including re-entry into the current mode — releases the outgoing
//! mode's guard before running the incoming setup, so gesture bindings
//! and reducers can never accumulate across switches.

use crate::engine::surface::BindingId;
use crate::engine::{Context, edition, simulation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Edition,
    Simulation,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Edition => "Edition",
            Self::Simulation => "Simulation",
        }
    }
}

/// Capability token returned by a mode's `setup`.
///
/// Holds exactly the bindings and reducers that setup installed, plus an
/// optional restore step for transient attributes the mode wrote into the
/// graph. `release` is the single teardown operation; dropping the guard
/// without releasing it is a bug the controller never commits.
pub struct ModeGuard {
    bindings: Vec<BindingId>,
    node_reducer: bool,
    edge_reducer: bool,
    restore: Option<Box<dyn FnOnce(&Context)>>,
}

impl ModeGuard {
    pub fn new(bindings: Vec<BindingId>) -> Self {
        Self {
            bindings,
            node_reducer: false,
            edge_reducer: false,
            restore: None,
        }
    }

    pub fn with_reducers(mut self, node: bool, edge: bool) -> Self {
        self.node_reducer = node;
        self.edge_reducer = edge;
        self
    }

    pub fn with_restore(mut self, restore: impl FnOnce(&Context) + 'static) -> Self {
        self.restore = Some(Box::new(restore));
        self
    }

    /// Remove every binding and reducer this guard owns, then run the
    /// restore step. Bindings go first: once they are out of the dispatch
    /// table no stray event can reach the mode being torn down.
    pub fn release(mut self, ctx: &Context) {
        {
            let mut surface = ctx.surface.borrow_mut();
            for id in self.bindings.drain(..) {
                surface.off(id);
            }
            if self.node_reducer {
                surface.clear_node_reducer();
            }
            if self.edge_reducer {
                surface.clear_edge_reducer();
            }
        }
        if let Some(restore) = self.restore.take() {
            restore(ctx);
        }
    }
}

pub struct ModeController {
    ctx: Context,
    current: Mode,
    guard: Option<ModeGuard>,
}

impl ModeController {
    /// Build the controller and install the initial mode (simulation)
    /// through the same transition path as every later switch.
    pub fn new(ctx: Context) -> Self {
        let mut controller = Self {
            ctx,
            current: Mode::Simulation,
            guard: None,
        };
        controller.change_mode(Mode::Simulation);
        controller
    }

    pub fn mode(&self) -> Mode {
        self.current
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    /// Switch to `target`. Re-entering the current mode is permitted and
    /// performs a full teardown/re-setup — an idempotent-safe reset.
    pub fn change_mode(&mut self, target: Mode) {
        if let Some(guard) = self.guard.take() {
            guard.release(&self.ctx);
        }
        self.current = target;
        self.ctx.active.set(Some(target));
        self.guard = Some(match target {
            Mode::Edition => edition::setup(&self.ctx),
            Mode::Simulation => simulation::setup(&self.ctx),
        });
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.current {
            Mode::Edition => Mode::Simulation,
            Mode::Simulation => Mode::Edition,
        };
        self.change_mode(next);
    }

    /// Release the active mode without installing another. Used on exit
    /// so transient graph attributes are stripped and the dispatch table
    /// is left empty.
    pub fn shutdown(&mut self) {
        if let Some(guard) = self.guard.take() {
            guard.release(&self.ctx);
        }
        self.ctx.active.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{Graph, NodeAttrs};

    fn three_node_path() -> Graph {
        let mut g = Graph::new();
        let a = g.add_node(NodeAttrs::at(0.0, 0.0));
        let b = g.add_node(NodeAttrs::at(1.0, 0.0));
        let c = g.add_node(NodeAttrs::at(2.0, 0.0));
        g.add_edge(a, b).unwrap();
        g.add_edge(b, c).unwrap();
        g
    }

    #[test]
    fn initial_mode_is_simulation_with_flags_installed() {
        let ctx = Context::new(three_node_path());
        let controller = ModeController::new(ctx.clone());
        assert_eq!(controller.mode(), Mode::Simulation);

        let graph = ctx.graph.borrow();
        for id in graph.node_ids() {
            assert_eq!(graph.node(id).unwrap().possible_fox, Some(true));
        }
    }

    #[test]
    fn bindings_do_not_accumulate_across_transitions() {
        let ctx = Context::new(three_node_path());
        let mut controller = ModeController::new(ctx.clone());

        controller.change_mode(Mode::Edition);
        let fresh_edition = ctx.surface.borrow().binding_count();
        assert!(fresh_edition > 0);

        controller.change_mode(Mode::Simulation);
        controller.change_mode(Mode::Edition);
        assert_eq!(
            ctx.surface.borrow().binding_count(),
            fresh_edition,
            "edition -> simulation -> edition must equal one fresh edition setup"
        );
    }

    #[test]
    fn reentering_the_current_mode_resets_instead_of_stacking() {
        let ctx = Context::new(three_node_path());
        let mut controller = ModeController::new(ctx.clone());
        let fresh = ctx.surface.borrow().binding_count();

        controller.change_mode(Mode::Simulation);
        controller.change_mode(Mode::Simulation);
        assert_eq!(ctx.surface.borrow().binding_count(), fresh);
    }

    #[test]
    fn leaving_simulation_strips_possibility_flags() {
        let ctx = Context::new(three_node_path());
        let mut controller = ModeController::new(ctx.clone());

        controller.change_mode(Mode::Edition);
        let graph = ctx.graph.borrow();
        for id in graph.node_ids() {
            assert_eq!(
                graph.node(id).unwrap().possible_fox,
                None,
                "possible_fox is transient and must not survive simulation mode"
            );
        }
    }

    #[test]
    fn toggle_alternates_between_the_two_modes() {
        let ctx = Context::new(Graph::new());
        let mut controller = ModeController::new(ctx);
        assert_eq!(controller.mode(), Mode::Simulation);
        controller.toggle_mode();
        assert_eq!(controller.mode(), Mode::Edition);
        controller.toggle_mode();
        assert_eq!(controller.mode(), Mode::Simulation);
    }

    #[test]
    fn shutdown_empties_the_dispatch_table_and_restores_the_graph() {
        let ctx = Context::new(three_node_path());
        let mut controller = ModeController::new(ctx.clone());
        assert!(ctx.surface.borrow().binding_count() > 0);

        controller.shutdown();
        assert_eq!(ctx.surface.borrow().binding_count(), 0);
        let graph = ctx.graph.borrow();
        for id in graph.node_ids() {
            assert_eq!(graph.node(id).unwrap().possible_fox, None);
        }
    }
}
