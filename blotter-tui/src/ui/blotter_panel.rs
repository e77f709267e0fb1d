//! Blotter panel — the order table, most recent order first.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::BlotterState;
use crate::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, blotter: &BlotterState, theme: &Theme) {
    let snapshot = blotter.session.store().snapshot();

    if snapshot.is_empty() {
        let hint = Paragraph::new(Span::styled(
            "No orders yet — press n to create one.",
            Style::default().fg(theme.muted),
        ));
        f.render_widget(hint, area);
        return;
    }

    let header_cells = [
        "Sel", "ID", "Ticker", "Side", "Exec", "Price", "Amount", "Trade", "Settle", "Status",
    ]
    .iter()
    .map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells).height(1);

    let rows = snapshot.iter().enumerate().map(|(i, order)| {
        let is_cursor = i == blotter.cursor;
        let is_selected = blotter.selected.contains(&order.order_id);
        let row_style = if is_cursor {
            Style::default()
                .bg(theme.neutral)
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_primary)
        };

        let marker = if is_selected { "[x]" } else { "[ ]" };
        let executing = blotter.session.is_executing(order.order_id);
        let status_label = if executing {
            format!("{}*", order.status)
        } else {
            order.status.to_string()
        };

        let cells = vec![
            Cell::from(marker),
            Cell::from(order.order_id.to_string()),
            Cell::from(order.ticker.clone()),
            Cell::from(order.transaction_type.label())
                .style(Style::default().fg(theme.side_color(order.transaction_type))),
            Cell::from(format!(
                "{}/{}",
                order.executed_quantity, order.target_quantity
            ))
            .style(Style::default().fg(theme.progress_color(order.fill_fraction()))),
            Cell::from(format!("{:.2}", order.target_price)),
            Cell::from(format!("{:.2}", order.target_amount)),
            Cell::from(order.trade_date.format("%Y-%m-%d").to_string()),
            Cell::from(order.settlement_date.format("%Y-%m-%d").to_string()),
            Cell::from(status_label)
                .style(Style::default().fg(theme.status_color(order.status))),
        ];

        Row::new(cells).style(row_style).height(1)
    });

    let widths = [
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Length(11),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(8),
    ];

    let table = Table::new(rows, widths).header(header).column_spacing(1);
    f.render_widget(table, area);
}
