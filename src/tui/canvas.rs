//! The interactive board: terminal lifecycle, event loop, and the
//! translation of raw mouse/key events into abstract gestures.
//!
//! The terminal only reports presses, releases and drags, so clicks,
//! double clicks and drag sessions are synthesised here before being
//! handed to the interaction surface. Gestures the active mode does not
//! consume fall back to the surface default: panning the camera.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};

use crate::engine::mode::{Mode, ModeController};
use crate::engine::surface::{self, Gesture, PointerButton, MAX_ZOOM, MIN_ZOOM};
use crate::engine::{simulation, Context};
use crate::graph::model::{EdgeId, Graph, NodeAttrs, NodeId};
use crate::parser::config::{self, Config};
use crate::tui::input::{self, Action};
use crate::tui::render::{self, ViewData};
use crate::tui::settings::{self, SettingsEvent, SettingsPanelState};

/// Cells of slack around a node's center that still count as a hit.
const NODE_HIT_RADIUS: f64 = 1.5;
const EDGE_HIT_RADIUS: f64 = 0.75;
/// Presses further apart than this are a drag, not a click.
const CLICK_SLOP: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
struct Press {
    x: f64,
    y: f64,
    node: Option<NodeId>,
    moved: bool,
    last: (f64, f64),
}

struct App {
    ctx: Context,
    controller: ModeController,
    config: Config,
    config_path: Option<PathBuf>,
    status: Option<String>,
    show_help: bool,
    show_settings: bool,
    settings_state: SettingsPanelState,
    board_area: Rect,
    camera_fitted: bool,
    press: Option<Press>,
    last_empty_click: Option<(Instant, f64, f64)>,
}

impl App {
    fn new(graph: Graph, config: Config, config_path: Option<PathBuf>) -> Self {
        let ctx = Context::new(graph);
        let controller = ModeController::new(ctx.clone());
        Self {
            ctx,
            controller,
            config,
            config_path,
            status: None,
            show_help: false,
            show_settings: false,
            settings_state: SettingsPanelState::default(),
            board_area: Rect::default(),
            camera_fitted: false,
            press: None,
            last_empty_click: None,
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        if !self.camera_fitted {
            // The board area is only known on the first draw.
            let [_, board, _] = ratatui::layout::Layout::vertical([
                ratatui::layout::Constraint::Length(1),
                ratatui::layout::Constraint::Min(0),
                ratatui::layout::Constraint::Length(1),
            ])
            .areas(frame.area());
            self.fit_camera(board);
            self.camera_fitted = true;
        }

        let day = if self.config.show_day && self.controller.mode() == Mode::Simulation {
            Some(self.ctx.simulation.borrow().day())
        } else {
            None
        };
        let hints = match self.controller.mode() {
            Mode::Simulation => "[click] probe  [u] undo  [r] reset  [m] mode  [?] help  [q] quit",
            Mode::Edition => {
                "[2xclick] add  [click] select  [right-click] link  [drag] move  [Del] delete  [m] mode"
            }
        };

        let graph = self.ctx.graph.borrow();
        let surface = self.ctx.surface.borrow();
        let data = ViewData {
            graph: &graph,
            surface: &surface,
            mode_label: self.controller.mode().label(),
            day,
            hints,
            message: self.status.as_deref(),
            show_help: self.show_help,
        };
        self.board_area = render::draw(frame, &data);
        drop(surface);
        drop(graph);

        if self.show_settings {
            settings::draw(frame, &self.settings_state, &self.config);
        }
    }

    /// Center the camera on the graph's bounding box, zoomed to fit.
    fn fit_camera(&mut self, area: Rect) {
        let graph = self.ctx.graph.borrow();
        let ids = graph.node_ids();
        let mut camera = surface::Camera::default();
        if !ids.is_empty() && area.width > 0 && area.height > 0 {
            let mut min = (f64::INFINITY, f64::INFINITY);
            let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for &id in &ids {
                let attrs = graph.node(id).expect("id comes from node_ids");
                min = (min.0.min(attrs.x), min.1.min(attrs.y));
                max = (max.0.max(attrs.x), max.1.max(attrs.y));
            }
            let span = ((max.0 - min.0).max(1.0), (max.1 - min.1).max(1.0));
            let zoom = ((area.width as f64 - 8.0) / span.0)
                .min((area.height as f64 - 2.0) / span.1)
                .clamp(MIN_ZOOM, MAX_ZOOM);
            let center = ((min.0 + max.0) / 2.0, (min.1 + max.1) / 2.0);
            camera.zoom = zoom;
            camera.x = area.width as f64 / 2.0 - center.0 * zoom;
            camera.y = area.height as f64 / 2.0 - center.1 * zoom;
        }
        drop(graph);
        self.ctx.surface.borrow_mut().camera = camera;
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        self.status = None;

        if self.show_settings {
            match settings::handle_key(key, &mut self.settings_state, &mut self.config) {
                SettingsEvent::Changed => self.persist_config()?,
                SettingsEvent::Close => self.show_settings = false,
                SettingsEvent::None => {}
            }
            return Ok(false);
        }

        match input::action_for_key(key) {
            Action::Quit => return Ok(true),
            Action::ToggleMode => {
                self.controller.toggle_mode();
                self.status = Some(format!("mode: {}", self.controller.mode().label()));
            }
            Action::UndoDay => simulation::undo(&self.ctx),
            Action::ResetDays => simulation::reset(&self.ctx),
            Action::ZoomIn => self.zoom_at_center(1.2),
            Action::ZoomOut => self.zoom_at_center(1.0 / 1.2),
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::OpenSettings => self.show_settings = true,
            Action::Forward(code) => {
                surface::dispatch(&self.ctx.surface, &Gesture::KeyPress { key: code });
            }
        }
        Ok(false)
    }

    fn zoom_at_center(&mut self, factor: f64) {
        let (cx, cy) = (
            self.board_area.width as f64 / 2.0,
            self.board_area.height as f64 / 2.0,
        );
        self.ctx.surface.borrow_mut().camera.zoom_at(cx, cy, factor);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let vx = mouse.column as f64 - self.board_area.x as f64;
        let vy = mouse.row as f64 - self.board_area.y as f64;
        let inside = mouse.column >= self.board_area.x
            && mouse.row >= self.board_area.y
            && mouse.column < self.board_area.x + self.board_area.width
            && mouse.row < self.board_area.y + self.board_area.height;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => {
                let node = self.node_at(vx, vy);
                if let Some(node) = node {
                    surface::dispatch(
                        &self.ctx.surface,
                        &Gesture::DownNode {
                            node,
                            button: PointerButton::Primary,
                        },
                    );
                }
                self.press = Some(Press {
                    x: vx,
                    y: vy,
                    node,
                    moved: false,
                    last: (vx, vy),
                });
            }
            MouseEventKind::Down(MouseButton::Right) if inside => {
                if let Some(node) = self.node_at(vx, vy) {
                    surface::dispatch(&self.ctx.surface, &Gesture::RightClickNode { node });
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(mut press) = self.press else {
                    return;
                };
                if (vx - press.x).abs() >= CLICK_SLOP || (vy - press.y).abs() >= CLICK_SLOP {
                    press.moved = true;
                }
                let consumed =
                    surface::dispatch(&self.ctx.surface, &Gesture::PointerMove { x: vx, y: vy });
                if !consumed {
                    // Default behavior: drag pans the camera.
                    let (dx, dy) = (vx - press.last.0, vy - press.last.1);
                    self.ctx.surface.borrow_mut().camera.pan(dx, dy);
                }
                press.last = (vx, vy);
                self.press = Some(press);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                surface::dispatch(&self.ctx.surface, &Gesture::PointerUp);
                if let Some(press) = self.press.take() {
                    if !press.moved && inside {
                        self.synthesise_click(press, vx, vy);
                    }
                }
            }
            MouseEventKind::ScrollUp if inside => {
                self.ctx.surface.borrow_mut().camera.zoom_at(vx, vy, 1.1);
            }
            MouseEventKind::ScrollDown if inside => {
                self.ctx
                    .surface
                    .borrow_mut()
                    .camera
                    .zoom_at(vx, vy, 1.0 / 1.1);
            }
            _ => {}
        }
    }

    /// Turn a press/release pair into a click gesture: node and edge
    /// clicks directly, empty-area clicks with double-click detection.
    fn synthesise_click(&mut self, press: Press, vx: f64, vy: f64) {
        if let Some(node) = press.node {
            surface::dispatch(&self.ctx.surface, &Gesture::ClickNode { node });
            self.last_empty_click = None;
            return;
        }
        if let Some(edge) = self.edge_at(vx, vy) {
            surface::dispatch(&self.ctx.surface, &Gesture::ClickEdge { edge });
            self.last_empty_click = None;
            return;
        }

        let window = Duration::from_millis(self.config.double_click_ms);
        let is_double = self
            .last_empty_click
            .map(|(at, px, py)| {
                at.elapsed() <= window && (vx - px).abs() <= CLICK_SLOP && (vy - py).abs() <= CLICK_SLOP
            })
            .unwrap_or(false);
        if is_double {
            self.last_empty_click = None;
            surface::dispatch(&self.ctx.surface, &Gesture::DoubleClickEmpty { x: vx, y: vy });
        } else {
            self.last_empty_click = Some((Instant::now(), vx, vy));
            surface::dispatch(&self.ctx.surface, &Gesture::ClickEmpty);
        }
    }

    fn node_at(&self, vx: f64, vy: f64) -> Option<NodeId> {
        let graph = self.ctx.graph.borrow();
        let camera = self.ctx.surface.borrow().camera;
        let mut found = None;
        for id in graph.node_ids() {
            let attrs = graph.node(id).expect("id comes from node_ids");
            let (nx, ny) = camera.graph_to_viewport(attrs.x, attrs.y);
            let (dx, dy) = (nx - vx, ny - vy);
            if (dx * dx + dy * dy).sqrt() <= NODE_HIT_RADIUS {
                found = Some(id);
            }
        }
        found
    }

    fn edge_at(&self, vx: f64, vy: f64) -> Option<EdgeId> {
        let graph = self.ctx.graph.borrow();
        let camera = self.ctx.surface.borrow().camera;
        let mut best: Option<(f64, EdgeId)> = None;
        for edge in graph.edge_ids() {
            let (a, b) = graph.edge_endpoints(edge).expect("edge id is live");
            let (Some(na), Some(nb)) = (graph.node(a), graph.node(b)) else {
                continue;
            };
            let pa = camera.graph_to_viewport(na.x, na.y);
            let pb = camera.graph_to_viewport(nb.x, nb.y);
            let dist = segment_distance((vx, vy), pa, pb);
            if dist <= EDGE_HIT_RADIUS && best.map(|(d, _)| dist < d).unwrap_or(true) {
                best = Some((dist, edge));
            }
        }
        best.map(|(_, edge)| edge)
    }

    fn persist_config(&self) -> Result<()> {
        if let Some(path) = &self.config_path {
            fs::write(path, config::serialize(&self.config))?;
        }
        Ok(())
    }
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// A small board to play on without a graph file.
pub fn demo_graph() -> Graph {
    let mut g = Graph::new();
    let den = g.add_node(NodeAttrs::labelled(0.0, 0.0, "den"));
    let birch = g.add_node(NodeAttrs::labelled(8.0, 0.0, "birch"));
    let creek = g.add_node(NodeAttrs::labelled(16.0, 3.0, "creek"));
    let burrow = g.add_node(NodeAttrs::labelled(4.0, 6.0, "burrow"));
    let meadow = g.add_node(NodeAttrs::labelled(12.0, 7.0, "meadow"));
    let stump = g.add_node(NodeAttrs::labelled(8.0, 11.0, "stump"));
    g.add_edge(den, birch);
    g.add_edge(birch, creek);
    g.add_edge(den, burrow);
    g.add_edge(birch, meadow);
    g.add_edge(creek, meadow);
    g.add_edge(burrow, meadow);
    g.add_edge(burrow, stump);
    g.add_edge(meadow, stump);
    g
}

pub fn run(graph: Graph, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(graph, config, config_path);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.draw(f))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
                    continue;
                }
                if app.handle_key(key)? {
                    break;
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => {}
        }
    }

    // Strips transient attributes and empties the dispatch table.
    app.controller.shutdown();
    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), column, row));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), column, row));
    }

    /// App with an identity camera and a known board area.
    fn test_app(graph: Graph) -> App {
        let mut app = App::new(graph, Config::default(), None);
        app.board_area = Rect::new(0, 0, 60, 30);
        app.camera_fitted = true;
        app
    }

    #[test]
    fn clicking_a_node_probes_it_in_simulation_mode() {
        let mut g = Graph::new();
        let a = g.add_node(NodeAttrs::at(2.0, 2.0));
        let b = g.add_node(NodeAttrs::at(10.0, 2.0));
        g.add_edge(a, b);
        let mut app = test_app(g);
        assert_eq!(app.controller.mode(), Mode::Simulation);

        click(&mut app, 2, 2);
        assert_eq!(app.ctx.simulation.borrow().day(), 1);
        let graph = app.ctx.graph.borrow();
        assert_eq!(graph.node(b).unwrap().possible_fox, Some(false));
    }

    #[test]
    fn double_clicking_empty_space_creates_a_node_in_edition_mode() {
        let mut app = test_app(Graph::new());
        app.controller.change_mode(Mode::Edition);

        click(&mut app, 20, 10);
        assert_eq!(app.ctx.graph.borrow().node_count(), 0, "single click only resets");
        click(&mut app, 20, 10);
        let graph = app.ctx.graph.borrow();
        assert_eq!(graph.node_count(), 1);
        let attrs = graph.node(graph.node_ids()[0]).unwrap();
        assert_eq!((attrs.x, attrs.y), (20.0, 10.0));
    }

    #[test]
    fn unconsumed_drags_pan_the_camera() {
        let mut app = test_app(demo_graph());
        // Simulation installs no pointer handlers, so drags fall through.
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 30, 20));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 33, 21));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 33, 21));

        let camera = app.ctx.surface.borrow().camera;
        assert_eq!((camera.x, camera.y), (3.0, 1.0));
        assert_eq!(app.ctx.simulation.borrow().day(), 0, "a pan is not a probe");
    }

    #[test]
    fn dragging_a_node_in_edition_mode_moves_it_without_panning() {
        let mut g = Graph::new();
        let a = g.add_node(NodeAttrs::at(5.0, 5.0));
        let mut app = test_app(g);
        app.controller.change_mode(Mode::Edition);

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 5));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 9, 7));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 9, 7));

        let graph = app.ctx.graph.borrow();
        assert_eq!((graph.node(a).unwrap().x, graph.node(a).unwrap().y), (9.0, 7.0));
        drop(graph);
        let camera = app.ctx.surface.borrow().camera;
        assert_eq!((camera.x, camera.y), (0.0, 0.0), "consumed drags must not pan");
        assert!(!app.ctx.edition.borrow().drag.dragging);
    }

    #[test]
    fn right_clicking_links_the_selection_to_the_target() {
        let mut g = Graph::new();
        let a = g.add_node(NodeAttrs::at(2.0, 2.0));
        let b = g.add_node(NodeAttrs::at(12.0, 2.0));
        let mut app = test_app(g);
        app.controller.change_mode(Mode::Edition);

        click(&mut app, 2, 2); // select a
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Right), 12, 2));
        assert!(app.ctx.graph.borrow().edge_between(a, b).is_some());
    }

    #[test]
    fn scroll_zooms_at_the_cursor() {
        let mut app = test_app(demo_graph());
        let before = app.ctx.surface.borrow().camera.viewport_to_graph(10.0, 10.0);
        app.handle_mouse(mouse(MouseEventKind::ScrollUp, 10, 10));
        let camera = app.ctx.surface.borrow().camera;
        assert!(camera.zoom > 1.0);
        let after = camera.viewport_to_graph(10.0, 10.0);
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
    }

    #[test]
    fn demo_graph_is_connected_enough_to_hunt() {
        let g = demo_graph();
        assert_eq!(g.node_count(), 6);
        assert!(g.edge_count() >= g.node_count(), "the demo board has cycles");
        for id in g.node_ids() {
            assert!(!g.neighbors(id).is_empty(), "no isolated demo nodes");
        }
    }
}
