//! The interaction engine: shared context, mode state machine, and the
//! edition and simulation components.

pub mod edition;
pub mod mode;
pub mod simulation;
pub mod surface;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::edition::EditionState;
use crate::engine::mode::Mode;
use crate::engine::simulation::SimulationState;
use crate::engine::surface::Surface;

/// The shared handles every component operates through.
///
/// Single-threaded by design: every handler runs synchronously inside the
/// event loop, so `Rc<RefCell<_>>` sharing is sufficient and no borrow is
/// ever held across events. The context is owned by the mode controller
/// and cloned into gesture handlers and reducers.
#[derive(Clone)]
pub struct Context {
    pub graph: Rc<RefCell<crate::graph::model::Graph>>,
    pub surface: Rc<RefCell<Surface>>,
    pub edition: Rc<RefCell<EditionState>>,
    pub simulation: Rc<RefCell<SimulationState>>,
    /// The currently active mode, if any. Every component operation
    /// checks this first and silently no-ops when its mode is inactive.
    pub active: Rc<Cell<Option<Mode>>>,
}

impl Context {
    pub fn new(graph: crate::graph::model::Graph) -> Self {
        Self {
            graph: Rc::new(RefCell::new(graph)),
            surface: Rc::new(RefCell::new(Surface::new())),
            edition: Rc::new(RefCell::new(EditionState::default())),
            simulation: Rc::new(RefCell::new(SimulationState::default())),
            active: Rc::new(Cell::new(None)),
        }
    }
}
