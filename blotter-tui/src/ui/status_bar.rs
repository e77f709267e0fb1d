//! Bottom status bar — last session/status message, panel hints.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        " 1:Desk 2:Combined 3:Help  n:new e:exec s:send x:del q:quit",
        Style::default().fg(theme.muted),
    ));
    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => Style::default().fg(theme.accent),
            StatusLevel::Warning => Style::default().fg(theme.warning),
            StatusLevel::Error => Style::default().fg(theme.negative),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    let para = Paragraph::new(Line::from(spans));
    f.render_widget(para, area);
}
