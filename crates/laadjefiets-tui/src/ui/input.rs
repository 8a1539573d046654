//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes and background work.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_password_char, can_add_username_char, App, AppState, LoginFocus, Tab,
    PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // The backend notice is modal
    if app.status.backend_offline() && app.state != AppState::ConfirmingQuit {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => app.status.dismiss_backend_notice(),
            KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
            _ => {}
        }
        return Ok(false);
    }

    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::EditingForm => {
            handle_form_input(app, key);
            return Ok(false);
        }
        AppState::Normal | AppState::LoggingIn | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            if let Some(tab) = Tab::visible(app.is_admin).get(index) {
                app.switch_tab(*tab);
            }
            return Ok(false);
        }
        KeyCode::Tab => {
            app.switch_tab(app.current_tab.next(app.is_admin));
            return Ok(false);
        }
        KeyCode::BackTab => {
            app.switch_tab(app.current_tab.prev(app.is_admin));
            return Ok(false);
        }
        KeyCode::Char('r') => {
            app.refresh_current_tab();
            return Ok(false);
        }
        KeyCode::Char('o') => {
            app.logout().await;
            return Ok(false);
        }
        KeyCode::Char('X') => {
            app.request_delete_account();
            return Ok(false);
        }
        _ => {}
    }

    match app.current_tab {
        Tab::Credits => handle_credits_input(app, key),
        _ => handle_list_input(app, key),
    }

    Ok(false)
}

fn handle_list_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Left => app.switch_tab(app.current_tab.prev(app.is_admin)),
        KeyCode::Right => app.switch_tab(app.current_tab.next(app.is_admin)),
        KeyCode::Enter => match app.current_tab {
            Tab::Sockets => app.load_session_info(),
            Tab::Locations => app.load_location_sockets(),
            _ => {}
        },
        KeyCode::Char('s') if app.current_tab == Tab::Sockets => app.toggle_session(true),
        KeyCode::Char('x') if app.current_tab == Tab::Sockets => app.toggle_session(false),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('D') if app.current_tab == Tab::Sockets => app.request_delete_all_sockets(),
        KeyCode::Char('a') if app.current_tab == Tab::Sockets => app.toggle_socket_scope(),
        KeyCode::Char('n') => app.open_create_form(),
        KeyCode::Char('e') if app.current_tab == Tab::Users => app.open_edit_user_form(),
        KeyCode::Char('/') if app.current_tab == Tab::Users => {
            app.search_query.clear();
            app.user_selection = 0;
            app.state = AppState::Searching;
        }
        KeyCode::Esc => {
            app.session_info = None;
            app.location_sockets = None;
            app.search_query.clear();
        }
        _ => {}
    }
}

fn handle_credits_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(-1),
        KeyCode::Right | KeyCode::Char('l') => app.move_selection(1),
        KeyCode::Enter => app.top_up(),
        _ => {}
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    let Some(form) = app.form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Enter if form.on_last_field() => app.submit_form(),
        KeyCode::Enter | KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.user_selection = 0;
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.state = AppState::Normal,
        KeyCode::Backspace => {
            app.search_query.pop();
            app.user_selection = 0;
        }
        KeyCode::Char(c) if !c.is_control() => {
            app.search_query.push(c);
            app.user_selection = 0;
        }
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.attempt_login().await,
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::app::PendingDelete;
    use crossterm::event::KeyModifiers;
    use laadjefiets_core::api::ApiClient;
    use laadjefiets_core::auth::MemoryTokenStore;
    use laadjefiets_core::models::HealthReport;
    use laadjefiets_core::status::{StatusUpdate, BACKEND};
    use laadjefiets_core::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let client = ApiClient::new(
            "http://127.0.0.1:1/api",
            Arc::new(MemoryTokenStore::with_token("abc")),
        )
        .unwrap();
        App::with_client(Config::default(), client)
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let mut app = test_app();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);

        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap());
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).await.unwrap());
    }

    #[tokio::test]
    async fn test_number_keys_switch_visible_tabs() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.current_tab, Tab::Credits);

        // Users tab is hidden for non-admins
        handle_input(&mut app, key(KeyCode::Char('5'))).await.unwrap();
        assert_eq!(app.current_tab, Tab::Credits);

        app.is_admin = true;
        handle_input(&mut app, key(KeyCode::Char('5'))).await.unwrap();
        assert_eq!(app.current_tab, Tab::Users);
    }

    #[tokio::test]
    async fn test_search_typing_and_escape() {
        let mut app = test_app();
        app.is_admin = true;
        app.switch_tab(Tab::Users);

        handle_input(&mut app, key(KeyCode::Char('/'))).await.unwrap();
        assert_eq!(app.state, AppState::Searching);
        for c in "imad".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        assert_eq!(app.search_query, "imad");

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.search_query.is_empty());
    }

    #[tokio::test]
    async fn test_login_form_navigation_and_typing() {
        let mut app = test_app();
        app.start_login();
        assert_eq!(app.login_focus, LoginFocus::Username);

        handle_input(&mut app, key(KeyCode::Char('m'))).await.unwrap();
        handle_input(&mut app, key(KeyCode::Tab)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Char('x'))).await.unwrap();
        handle_input(&mut app, key(KeyCode::Backspace)).await.unwrap();

        assert_eq!(app.login_username, "m");
        assert!(app.login_password.is_empty());
        assert_eq!(app.login_focus, LoginFocus::Password);
    }

    #[tokio::test]
    async fn test_empty_login_sets_error_without_request() {
        let mut app = test_app();
        app.start_login();
        app.login_focus = LoginFocus::Button;

        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.login_error.is_some());
    }

    #[tokio::test]
    async fn test_credits_arrows_change_amount() {
        let mut app = test_app();
        app.switch_tab(Tab::Credits);
        handle_input(&mut app, key(KeyCode::Right)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Right)).await.unwrap();
        assert_eq!(app.selected_top_up(), 20);
        handle_input(&mut app, key(KeyCode::Left)).await.unwrap();
        assert_eq!(app.selected_top_up(), 10);
    }

    #[tokio::test]
    async fn test_backend_notice_blocks_keys_but_allows_quit() {
        let mut app = test_app();
        app.status.apply(StatusUpdate::from_result(
            BACKEND,
            Ok(HealthReport {
                status: "offline".to_string(),
            }),
        ));

        handle_input(&mut app, key(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.current_tab, Tab::Sockets);

        handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).await.unwrap());
    }

    #[tokio::test]
    async fn test_escape_dismisses_backend_notice() {
        let mut app = test_app();
        app.status.apply(StatusUpdate::from_result(
            BACKEND,
            Ok(HealthReport {
                status: "offline".to_string(),
            }),
        ));

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert!(!app.status.backend_offline());
    }

    #[tokio::test]
    async fn test_create_form_typing_and_escape() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.state, AppState::EditingForm);

        for c in "B7".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        // Enter moves on until the last field
        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();

        let form = app.form.as_ref().unwrap();
        assert_eq!(form.fields[0].value, "B7");
        assert_eq!(form.fields[1].value, "q");
        assert_eq!(app.state, AppState::EditingForm);

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert!(app.form.is_none());
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_delete_all_sockets_asks_confirmation() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('D'))).await.unwrap();
        assert_eq!(app.state, AppState::ConfirmingDelete);
        assert_eq!(app.pending_delete, Some(PendingDelete::AllSockets));

        handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending_delete.is_none());
    }
}
