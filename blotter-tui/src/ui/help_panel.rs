//! Help panel — keyboard reference.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, theme: &Theme) {
    let accent = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(theme.warning);
    let text = Style::default().fg(theme.text_primary);

    let entry = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {k:<12}"), key),
            Span::styled(desc, text),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("Navigation", accent)),
        entry("1 / 2 / 3", "Desk blotter / Combined blotter / Help"),
        entry("Tab", "Next panel (Shift-Tab: previous)"),
        entry("j / k", "Move the cursor down / up"),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("Orders", accent)),
        entry("n", "New order (entry form)"),
        entry("Space", "Select/deselect the row, put its instrument in focus"),
        entry("Esc", "Clear the selection"),
        entry("e", "Execute selection (or cursor row): simulated fills"),
        entry("s", "Send selection (or cursor row) to the combined app"),
        entry("x / Del", "Remove selection (or cursor row)"),
        Line::from(""),
        Line::from(Span::styled("Fills", accent)),
        Line::from(Span::styled(
            "  Executed orders advance by 25% of the target per tick and",
            text,
        )),
        Line::from(Span::styled(
            "  finish FILLED; progress is broadcast to every listening app.",
            text,
        )),
    ];

    let para = Paragraph::new(lines);
    f.render_widget(para, area);
}
