use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_location_table(frame, app, chunks[0]);
    render_location_sockets(frame, app, chunks[1]);
}

fn render_location_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([Cell::from("Naam"), Cell::from("Adres"), Cell::from("Tarief")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .locations
        .iter()
        .map(|location| {
            Row::new(vec![
                Cell::from(location.name.clone()),
                Cell::from(location.address_display().to_string()),
                Cell::from(location.tariff_display()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(35),
        Constraint::Fill(2),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Locaties ({}) ", app.locations.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.locations.is_empty() {
        state.select(Some(app.location_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_location_sockets(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    let selected = app.selected_location();
    let sockets = match (selected, app.location_sockets.as_ref()) {
        (Some(location), Some((id, sockets))) if *id == location.id => Some(sockets),
        _ => None,
    };

    match (selected, sockets) {
        (None, _) => lines.push(Line::from(Span::styled("Geen locaties", styles::muted_style()))),
        (Some(_), None) => lines.push(Line::from(Span::styled(
            "Enter: laadpalen tonen",
            styles::muted_style(),
        ))),
        (Some(_), Some(sockets)) if sockets.is_empty() => lines.push(Line::from(Span::styled(
            "Geen laadpalen op deze locatie",
            styles::muted_style(),
        ))),
        (Some(_), Some(sockets)) => {
            for socket in sockets {
                let status = socket.status_display();
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<24}", socket.display_name()), styles::list_item_style()),
                    Span::styled(status.to_string(), styles::socket_status_style(status)),
                ]));
            }
        }
    }

    let block = Block::default()
        .title(" Laadpalen op locatie ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
