//! Drawing: status bar, board, hint line, help overlay.
//!
//! The board is painted cell by cell straight into the frame buffer;
//! every node and edge style passes through the reducers installed on
//! the interaction surface, so the active mode fully owns the look.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::engine::surface::{EdgeDisplay, NodeDisplay, Surface};
use crate::graph::model::{Figure, Graph};

const NEUTRAL_NODE_COLOR: Color = Color::White;
const NEUTRAL_EDGE_COLOR: Color = Color::Gray;
const LABEL_COLOR: Color = Color::DarkGray;

pub struct ViewData<'a> {
    pub graph: &'a Graph,
    pub surface: &'a Surface,
    pub mode_label: &'a str,
    /// Day counter, shown when simulating (and not hidden by config).
    pub day: Option<usize>,
    pub hints: &'a str,
    pub message: Option<&'a str>,
    pub show_help: bool,
}

/// Draw the whole view and return the board area, which the event loop
/// uses to translate mouse coordinates into viewport coordinates.
pub fn draw(frame: &mut Frame, data: &ViewData) -> Rect {
    let [status_area, board_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(status_line(data), status_area);
    draw_board(frame.buffer_mut(), board_area, data.graph, data.surface);

    let hint = match data.message {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            data.hints.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(hint), hint_area);

    if data.show_help {
        draw_help(frame);
    }

    board_area
}

fn status_line(data: &ViewData) -> Paragraph<'static> {
    let mut spans = vec![
        Span::styled(
            " foxhunt ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  mode: "),
        Span::styled(
            data.mode_label.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(day) = data.day {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("day #{day}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    Paragraph::new(Line::from(spans))
}

fn draw_board(buf: &mut Buffer, area: Rect, graph: &Graph, surface: &Surface) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let camera = surface.camera;

    // Edges underneath, nodes and labels on top.
    for edge in graph.edge_ids() {
        let Some((a, b)) = graph.edge_endpoints(edge) else {
            continue;
        };
        let (Some(na), Some(nb)) = (graph.node(a), graph.node(b)) else {
            continue;
        };
        let display = surface.edge_display(
            edge,
            EdgeDisplay {
                color: NEUTRAL_EDGE_COLOR,
            },
        );
        let (ax, ay) = camera.graph_to_viewport(na.x, na.y);
        let (bx, by) = camera.graph_to_viewport(nb.x, nb.y);
        draw_segment(buf, area, (ax, ay), (bx, by), display.color);
    }

    for id in graph.node_ids() {
        let Some(attrs) = graph.node(id) else {
            continue;
        };
        let display = surface.node_display(
            id,
            NodeDisplay {
                color: NEUTRAL_NODE_COLOR,
                size: attrs.size,
                figure: attrs.figure,
            },
        );
        let (vx, vy) = camera.graph_to_viewport(attrs.x, attrs.y);
        let symbol = match display.figure {
            Figure::Circle => '●',
            Figure::Square => '■',
        };
        put_cell(buf, area, vx.round() as i64, vy.round() as i64, symbol, display.color);

        for (offset, ch) in attrs.label.chars().take(8).enumerate() {
            put_cell(
                buf,
                area,
                vx.round() as i64 + 2 + offset as i64,
                vy.round() as i64,
                ch,
                LABEL_COLOR,
            );
        }
    }
}

/// Bresenham between two viewport points, clipped to `area`.
fn draw_segment(buf: &mut Buffer, area: Rect, from: (f64, f64), to: (f64, f64), color: Color) {
    let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_cell(buf, area, x0, y0, '·', color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn put_cell(buf: &mut Buffer, area: Rect, vx: i64, vy: i64, ch: char, color: Color) {
    if vx < 0 || vy < 0 || vx >= area.width as i64 || vy >= area.height as i64 {
        return;
    }
    let x = area.x + vx as u16;
    let y = area.y + vy as u16;
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_fg(color);
    }
}

fn draw_help(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 56, 60);
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(Span::styled(
            "foxhunt — keys",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  m / Tab       switch between simulation and edition"),
        Line::from("  q             quit"),
        Line::from("  + / -         zoom    scroll: zoom at cursor"),
        Line::from("  ?             toggle this help"),
        Line::from("  s             settings"),
        Line::from(""),
        Line::from(Span::styled("simulation", Style::default().fg(Color::Yellow))),
        Line::from("  click node    probe it (the fox moves each day)"),
        Line::from("  u             undo one day"),
        Line::from("  r             reset to day 0"),
        Line::from(""),
        Line::from(Span::styled("edition", Style::default().fg(Color::Cyan))),
        Line::from("  double-click  create a node"),
        Line::from("  click         select node or edge"),
        Line::from("  right-click   link selected node to target"),
        Line::from("  drag node     move it (grid cells are exclusive)"),
        Line::from("  Delete        delete the selection"),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

pub fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(vertical[1])[1]
}
