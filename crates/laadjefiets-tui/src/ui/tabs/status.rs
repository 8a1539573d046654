use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use chrono::Local;

use crate::app::App;
use crate::ui::styles;

/// Render the service status board
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Service"),
        Cell::from("Status"),
        Cell::from("Laatst gecontroleerd"),
        Cell::from("Melding"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .status
        .services()
        .iter()
        .map(|service| {
            let state = if service.checking {
                Span::styled(format!("{}...", service.state.label()), styles::muted_style())
            } else {
                Span::styled(service.state.label(), styles::service_state_style(service.state))
            };
            let checked = service
                .last_checked
                .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(service.name.clone()),
                Cell::from(state),
                Cell::from(checked),
                Cell::from(Span::styled(
                    service.last_error.clone().unwrap_or_default(),
                    styles::error_style(),
                )),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(18),
        Constraint::Length(12),
        Constraint::Length(22),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(" Systeemstatus ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    frame.render_widget(table, area);
}
