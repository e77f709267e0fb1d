//! Top-level UI layout — one blotter panel at a time plus a status bar.

pub mod blotter_panel;
pub mod form;
pub mod help_panel;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    draw_panel(f, main_area, app);
    status_bar::render(f, status_area, app);

    // Overlays on top.
    match &app.overlay {
        Overlay::Welcome => form::render_welcome(f, main_area, &app.theme),
        Overlay::Form(state) => form::render_form(f, main_area, state, &app.theme),
        Overlay::None => {}
    }
}

/// Draw the active panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;
    let theme = &app.theme;

    let title = match panel {
        Panel::Desk => format!(
            " {} blotter [1] ",
            app.desk.session.app_name()
        ),
        Panel::Combined => format!(
            " {} blotter [2] ",
            app.combined.session.app_name()
        ),
        Panel::Help => " Help [3] ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(theme.background));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Desk => blotter_panel::render(f, inner, &app.desk, theme),
        Panel::Combined => blotter_panel::render(f, inner, &app.combined, theme),
        Panel::Help => help_panel::render(f, inner, theme),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside_the_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 50, area);
        assert!(popup.x >= area.x && popup.y >= area.y);
        assert!(popup.right() <= area.right() && popup.bottom() <= area.bottom());
        assert_eq!(popup.width, 50);
        assert_eq!(popup.height, 20);
    }
}
