use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use laadjefiets_core::models::TOP_UP_AMOUNTS;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(6)])
        .split(area);

    let balance = app
        .balance
        .as_ref()
        .map(|b| b.display())
        .unwrap_or_else(|| "Laden...".to_string());

    let balance_block = Block::default()
        .title(" Tegoed ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let balance_lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Huidig saldo: ", styles::muted_style()),
            Span::styled(balance, styles::title_style()),
        ]),
    ];
    frame.render_widget(Paragraph::new(balance_lines).block(balance_block), chunks[0]);

    let mut amount_spans = vec![Span::raw("  ")];
    for (i, amount) in TOP_UP_AMOUNTS.iter().enumerate() {
        let label = format!(" € {} ", amount);
        if i == app.top_up_selection {
            amount_spans.push(Span::styled(label, styles::selected_style()));
        } else {
            amount_spans.push(Span::styled(label, styles::list_item_style()));
        }
        amount_spans.push(Span::raw("  "));
    }

    let mut lines = vec![Line::from(""), Line::from(amount_spans), Line::from("")];
    if let Some(ref balance) = app.balance {
        lines.push(Line::from(vec![
            Span::styled("  Saldo na opwaarderen: ", styles::muted_style()),
            Span::styled(balance.preview_after(app.selected_top_up()), styles::highlight_style()),
        ]));
    }

    let block = Block::default()
        .title(" Opwaarderen ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}
