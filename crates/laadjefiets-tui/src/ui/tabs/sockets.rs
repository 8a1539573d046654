use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use laadjefiets_core::models::ChargingSession;
use laadjefiets_core::utils::{format_date, format_energy, format_optional_datetime, truncate_string};

use crate::app::{App, SocketScope};
use crate::ui::styles;

/// Render the Sockets tab: sockets on the left, session history on the right.
/// Admins can switch the list to every socket in the network, with owners.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_socket_table(frame, app, chunks[0]);
    render_session_detail(frame, app, chunks[1]);
}

fn render_socket_table(frame: &mut Frame, app: &App, area: Rect) {
    let network = app.socket_scope == SocketScope::All;
    let third_column = if network { "Eigenaar" } else { "Locatie" };

    let header = Row::new([
        Cell::from("Naam"),
        Cell::from("ID"),
        Cell::from(third_column),
        Cell::from("Status"),
        Cell::from("Sinds"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .sockets
        .iter()
        .map(|socket| {
            let status = socket.status_display();
            let third = if network {
                app.socket_owners
                    .get(&socket.socket_id)
                    .map(|owner| owner.username_display().to_string())
                    .unwrap_or_else(|| "-".to_string())
            } else {
                socket.location_display().to_string()
            };
            Row::new(vec![
                Cell::from(truncate_string(&socket.display_name(), 24)),
                Cell::from(socket.socket_id.clone()),
                Cell::from(third),
                Cell::from(Span::styled(status.to_string(), styles::socket_status_style(status))),
                Cell::from(socket.created_at.as_deref().map(format_date).unwrap_or_default()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Length(10),
        Constraint::Fill(2),
        Constraint::Length(12),
        Constraint::Length(10),
    ];

    let title = if network {
        format!(" Alle laadpalen ({}) ", app.sockets.len())
    } else {
        format!(" Laadpalen ({}) ", app.sockets.len())
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.sockets.is_empty() {
        state.select(Some(app.socket_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn session_lines(session: &ChargingSession) -> Vec<Line<'static>> {
    let state = if session.is_active() {
        Span::styled("actief", styles::highlight_style())
    } else {
        Span::styled("afgerond", styles::muted_style())
    };
    vec![
        Line::from(vec![
            Span::styled(format!("Sessie #{} ", session.id), styles::list_item_style()),
            state,
        ]),
        Line::from(vec![
            Span::styled("  Start:   ", styles::muted_style()),
            Span::raw(format_optional_datetime(session.start_time.as_deref(), "-")),
        ]),
        Line::from(vec![
            Span::styled("  Stop:    ", styles::muted_style()),
            Span::raw(format_optional_datetime(session.stop_time.as_deref(), "Nog actief")),
        ]),
        Line::from(vec![
            Span::styled("  Energie: ", styles::muted_style()),
            Span::raw(format_energy(session.final_energy)),
        ]),
    ]
}

fn render_session_detail(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    match (app.selected_socket(), app.session_info.as_ref()) {
        (None, _) => {
            lines.push(Line::from(Span::styled("Geen laadpalen", styles::muted_style())));
        }
        (Some(socket), Some((socket_id, info))) if *socket_id == socket.socket_id => {
            lines.push(Line::from(Span::styled(
                socket.display_name(),
                styles::highlight_style(),
            )));
            if let Some(owner) = app.socket_owners.get(&socket.socket_id) {
                lines.push(Line::from(vec![
                    Span::styled("Klant: ", styles::muted_style()),
                    Span::raw(format!(
                        "{} ({})",
                        owner.username_display(),
                        owner.email_display()
                    )),
                ]));
            }
            lines.push(Line::from(""));
            if info.data.is_empty() {
                lines.push(Line::from(Span::styled(
                    "Nog geen laadsessies",
                    styles::muted_style(),
                )));
            }
            for session in &info.data {
                lines.extend(session_lines(session));
                lines.push(Line::from(""));
            }
        }
        (Some(socket), _) => {
            lines.push(Line::from(Span::styled(
                socket.display_name(),
                styles::highlight_style(),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Enter: laadsessies tonen",
                styles::muted_style(),
            )));
        }
    }

    let block = Block::default()
        .title(" Laadsessies ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
