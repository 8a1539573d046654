//! Laadjefiets console - a terminal admin console for the Laadjefiets
//! charging-socket network.
//!
//! Run without arguments for the interactive console. `--status`, `--register`,
//! `--login` and `--logout` run a single action and exit.

mod app;
mod form;
mod ui;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use laadjefiets_core::models::{Credentials, Registration};
use laadjefiets_core::status::StatusBoard;
use laadjefiets_core::{ApiClient, Config};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "laadjefiets.log";

fn env_filter() -> EnvFilter {
    // RUST_LOG controls the level (e.g. RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr; used by the one-shot commands.
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Resolved without loading the config, so logging can start first.
fn log_dir() -> PathBuf {
    Config::cache_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Log to a file in the cache directory so log lines never reach the terminal.
/// The returned guard flushes the writer on drop.
fn init_file_tracing() -> Result<WorkerGuard> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &log_dir, LOG_FILE,
    ));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--status") => {
            init_stderr_tracing();
            return print_status().await;
        }
        Some("--register") => {
            init_stderr_tracing();
            return register_interactive().await;
        }
        Some("--login") => {
            init_stderr_tracing();
            return login_interactive().await;
        }
        Some("--logout") => {
            init_stderr_tracing();
            return logout().await;
        }
        Some("--help") | Some("-h") => {
            print_usage();
            return Ok(());
        }
        Some(other) => {
            print_usage();
            anyhow::bail!("Unknown argument: {}", other);
        }
        None => {}
    }

    // Before App::new so config warnings reach the log
    let _guard = init_file_tracing()?;
    info!("Laadjefiets console starting");
    let mut app = App::new()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Laadjefiets console shutting down");
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: laadjefiets [--status | --register | --login | --logout]");
    eprintln!();
    eprintln!("  (no arguments)  start the interactive console");
    eprintln!("  --status        check every service once and print the result as JSON");
    eprintln!("  --register      create a new account");
    eprintln!("  --login         log in and store the token");
    eprintln!("  --logout        end the session and remove the stored token");
}

fn client_from_config() -> Result<(Config, ApiClient)> {
    let config = Config::load().context("Failed to load config")?;
    let client = ApiClient::from_config(&config)?;
    Ok((config, client))
}

/// Run one round of health checks and print the board as JSON.
async fn print_status() -> Result<()> {
    let (_, client) = client_from_config()?;
    let mut board = StatusBoard::new();
    board.refresh(&client).await;

    println!("{}", serde_json::to_string_pretty(board.services())?);
    if board.backend_offline() {
        eprintln!("Backend is offline");
    }
    Ok(())
}

/// Prompt for credentials and store the returned token.
async fn login_interactive() -> Result<()> {
    let (mut config, client) = client_from_config()?;

    let username = match config.last_username.as_deref() {
        Some(last) => {
            print!("Username [{}]: ", last);
            io::stdout().flush()?;
            let input = read_line()?;
            if input.is_empty() {
                last.to_string()
            } else {
                input
            }
        }
        None => {
            print!("Username: ");
            io::stdout().flush()?;
            read_line()?
        }
    };
    let password = rpassword::prompt_password("Password: ")?;

    let response = client
        .user()
        .login(&Credentials {
            username: username.clone(),
            password,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Login failed: {}", e.message()))?;

    config.last_username = Some(username);
    config.save().context("Failed to save config")?;

    match response.user {
        Some(user) => println!("Logged in as {} ({})", user.username, user.role.as_str()),
        None => println!("Login successful"),
    }
    Ok(())
}

/// Create an account. Registration does not log in; run `--login` afterwards.
async fn register_interactive() -> Result<()> {
    let (_, client) = client_from_config()?;

    print!("Email: ");
    io::stdout().flush()?;
    let email = read_line()?;
    let password = rpassword::prompt_password("Password: ")?;
    let repeat = rpassword::prompt_password("Repeat password: ")?;

    let registration = registration_from_input(email, password, &repeat)?;
    let response = client
        .user()
        .register(&registration)
        .await
        .map_err(|e| anyhow::anyhow!("Registration failed: {}", e.message()))?;

    match response.get("message").and_then(|m| m.as_str()) {
        Some(message) => println!("{}", message),
        None => println!("Account created for {}", registration.email),
    }
    Ok(())
}

fn registration_from_input(email: String, password: String, repeat: &str) -> Result<Registration> {
    let email = email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        anyhow::bail!("A valid email address is required");
    }
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    if password != repeat {
        anyhow::bail!("Passwords do not match");
    }
    Ok(Registration { email, password })
}

async fn logout() -> Result<()> {
    let (_, client) = client_from_config()?;
    if !client.has_token() {
        println!("Not logged in");
        return Ok(());
    }

    match client.user().logout().await {
        Ok(()) => println!("Logged out"),
        Err(e) => println!("Logout request failed ({}); local token removed", e.message()),
    }
    Ok(())
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll with a timeout so background results are picked up
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
