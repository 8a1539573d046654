use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use laadjefiets_core::utils::format_date;

use crate::app::App;
use crate::ui::styles;

/// Render the admin user list, filtered by the search query
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let users = app.visible_users();

    let header = Row::new([
        Cell::from("Gebruiker"),
        Cell::from("Email"),
        Cell::from("Rol"),
        Cell::from("Aangemaakt"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = users
        .iter()
        .map(|user| {
            let role_style = if user.role.is_admin() {
                styles::highlight_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(user.username.clone()),
                Cell::from(user.email_display().to_string()),
                Cell::from(user.role.as_str()).style(role_style),
                Cell::from(user.created_at.as_deref().map(format_date).unwrap_or_default()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(25),
        Constraint::Fill(2),
        Constraint::Length(10),
        Constraint::Length(12),
    ];

    let title = if app.search_query.is_empty() {
        format!(" Gebruikers ({}) ", users.len())
    } else {
        format!(" Gebruikers ({}/{}) - \"{}\" ", users.len(), app.users.len(), app.search_query)
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
    if !users.is_empty() {
        state.select(Some(app.user_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
