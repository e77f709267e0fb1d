//! Overlay widgets — order entry form and the first-run welcome.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{FormField, FormState};
use crate::theme::Theme;
use crate::ui::centered_rect;

/// First-run welcome overlay.
pub fn render_welcome(f: &mut Frame, area: Rect, theme: &Theme) {
    let popup = centered_rect(60, 45, area);
    f.render_widget(Clear, popup);

    let accent = Style::default().fg(theme.accent);
    let accent_bold = accent.add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(theme.muted);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(accent)
        .title(" Order Blotter ")
        .title_style(accent_bold);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Getting started:", accent_bold)),
        Line::from(""),
        Line::from(Span::styled("  1. Press n to draft an order", muted)),
        Line::from(Span::styled("  2. Press e to execute it and watch it fill", muted)),
        Line::from(Span::styled("  3. Press s to send it to the combined blotter", muted)),
        Line::from(Span::styled("  4. Press 2 to watch the combined side", muted)),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to dismiss...",
            Style::default().fg(theme.neutral),
        )),
    ];

    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

/// Modal order entry form.
pub fn render_form(f: &mut Frame, area: Rect, form: &FormState, theme: &Theme) {
    let popup = centered_rect(55, 80, area);
    f.render_widget(Clear, popup);

    let accent = Style::default().fg(theme.accent);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(accent)
        .title(" New Order [Enter]submit [Esc]cancel ")
        .title_style(accent.add_modifier(Modifier::BOLD));

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines: Vec<Line> = vec![Line::from("")];
    for (i, field) in FormField::ALL.iter().enumerate() {
        lines.push(field_line(form, *field, i == form.cursor, theme));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab/↑↓ move   ←/→ change option   type to edit",
        Style::default().fg(theme.muted),
    )));

    let para = Paragraph::new(lines);
    f.render_widget(para, inner);
}

fn field_line<'a>(form: &'a FormState, field: FormField, active: bool, theme: &Theme) -> Line<'a> {
    let marker = if active { "▸ " } else { "  " };
    let label_style = if active {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_secondary)
    };
    let value_style = if active {
        Style::default().fg(theme.text_primary).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_primary)
    };

    let value = if field.is_select() {
        format!("◂ {} ▸", form.field_value(field))
    } else if active {
        // Trailing block as a crude cursor.
        format!("{}█", form.field_value(field))
    } else {
        form.field_value(field)
    };

    let mut spans = vec![
        Span::raw(marker),
        Span::styled(format!("{:<17}", field.label()), label_style),
        Span::styled(value, value_style),
    ];

    if let Some(message) = form.error_for(field) {
        spans.push(Span::styled(
            format!("  — {message}"),
            Style::default().fg(theme.negative),
        ));
    }

    Line::from(spans)
}
