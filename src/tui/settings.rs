use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};
use ratatui::Frame;

use crate::parser::config::Config;
use crate::tui::render::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    None,
    Changed,
    Close,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPanelState {
    pub selected_row: usize,
}

const SETTINGS_ROW_COUNT: usize = 2;
const DOUBLE_CLICK_STEP_MS: u64 = 50;
const DOUBLE_CLICK_MIN_MS: u64 = 100;
const DOUBLE_CLICK_MAX_MS: u64 = 1000;

pub fn handle_key(
    key: KeyEvent,
    state: &mut SettingsPanelState,
    config: &mut Config,
) -> SettingsEvent {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') | KeyCode::Char('s') => {
            SettingsEvent::Close
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected_row = state.selected_row.saturating_sub(1);
            SettingsEvent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.selected_row = (state.selected_row + 1).min(SETTINGS_ROW_COUNT - 1);
            SettingsEvent::None
        }
        KeyCode::Left | KeyCode::Char('h') => adjust(config, state.selected_row, -1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter | KeyCode::Char(' ') => {
            adjust(config, state.selected_row, 1)
        }
        _ => SettingsEvent::None,
    }
}

fn adjust(config: &mut Config, row: usize, direction: i64) -> SettingsEvent {
    match row {
        0 => {
            let step = DOUBLE_CLICK_STEP_MS as i64 * direction;
            let next = (config.double_click_ms as i64 + step)
                .clamp(DOUBLE_CLICK_MIN_MS as i64, DOUBLE_CLICK_MAX_MS as i64);
            if next as u64 == config.double_click_ms {
                return SettingsEvent::None;
            }
            config.double_click_ms = next as u64;
            SettingsEvent::Changed
        }
        1 => {
            config.show_day = !config.show_day;
            SettingsEvent::Changed
        }
        _ => SettingsEvent::None,
    }
}

pub fn draw(frame: &mut Frame, state: &SettingsPanelState, config: &Config) {
    let area = centered_rect(frame.area(), 52, 36);
    frame.render_widget(Clear, area);

    let title = Line::from(vec![
        Span::styled(
            "Settings",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[Esc] close", Style::default().fg(Color::Gray)),
    ]);

    let rows = [
        (
            "double-click window",
            format!("{} ms", config.double_click_ms),
        ),
        (
            "show day counter",
            if config.show_day { "on" } else { "off" }.to_string(),
        ),
    ];

    let mut lines = vec![Line::from("")];
    for (idx, (name, value)) in rows.iter().enumerate() {
        let selected = idx == state.selected_row;
        let marker = if selected { "› " } else { "  " };
        let style = if selected {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{name:<22}"), style),
            Span::styled(value.clone(), Style::default().fg(Color::Yellow)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  ↑/↓ select   ←/→ adjust",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .padding(Padding::horizontal(1));
    let inner: Rect = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner);
}
