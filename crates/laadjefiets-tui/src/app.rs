//! Application state for the Laadjefiets console.
//!
//! `App` owns the API client, the per-tab data and the UI state. Network work
//! runs in tokio tasks held by a `TaskGroup`; results come back over an mpsc
//! channel and are applied on the UI loop by `check_background_tasks`.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use laadjefiets_core::api::endpoints::{status_cache_key, SOCKETS_CACHE_KEY, USERS_DETAILS_CACHE_KEY};
use laadjefiets_core::api::{ApiClient, ApiError, ApiResult};
use laadjefiets_core::models::{
    CreditBalance, Credentials, Location, ServiceState, SessionInfo, Socket, SocketOwner, User,
    TOP_UP_AMOUNTS,
};
use laadjefiets_core::status::{self, StatusBoard, StatusUpdate, BACKEND};
use laadjefiets_core::tasks::TaskGroup;
use laadjefiets_core::Config;

use crate::form::{Form, FormSubmission};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background result channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

const MAX_USERNAME_LENGTH: usize = 50;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// How long a toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

pub const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const PROFILE_POLL_INTERVAL: Duration = Duration::from_secs(30);

const STATUS_POLLER: &str = "status-poll";
const PROFILE_POLLER: &str = "profile-poll";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs. `Users` is only reachable for admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Sockets,
    Locations,
    Credits,
    Status,
    Users,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Sockets => "Laadpalen",
            Tab::Locations => "Locaties",
            Tab::Credits => "Tegoed",
            Tab::Status => "Status",
            Tab::Users => "Gebruikers",
        }
    }

    /// Tabs shown in the tab bar, in order.
    pub fn visible(is_admin: bool) -> Vec<Tab> {
        let mut tabs = vec![Tab::Sockets, Tab::Locations, Tab::Credits, Tab::Status];
        if is_admin {
            tabs.push(Tab::Users);
        }
        tabs
    }

    /// Next visible tab (wrapping around)
    pub fn next(&self, is_admin: bool) -> Self {
        let tabs = Self::visible(is_admin);
        let idx = tabs.iter().position(|t| t == self).unwrap_or(0);
        tabs[(idx + 1) % tabs.len()]
    }

    /// Previous visible tab (wrapping around)
    pub fn prev(&self, is_admin: bool) -> Self {
        let tabs = Self::visible(is_admin);
        let idx = tabs.iter().position(|t| t == self).unwrap_or(0);
        tabs[(idx + tabs.len() - 1) % tabs.len()]
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    ConfirmingDelete,
    ConfirmingQuit,
    EditingForm,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Which sockets the Sockets tab lists. `All` is the admin network view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SocketScope {
    #[default]
    Own,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// A transient notification shown in the status bar.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    created_at: Instant,
}

impl Toast {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) >= TOAST_DURATION
    }
}

/// Item awaiting delete confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingDelete {
    Socket { socket_id: String, label: String },
    AllSockets,
    Location { id: i64, name: String },
    User { id: i64, username: String },
    Account,
}

impl PendingDelete {
    pub fn label(&self) -> String {
        match self {
            PendingDelete::Socket { label, .. } => label.clone(),
            PendingDelete::AllSockets => "Alle laadpalen".to_string(),
            PendingDelete::Location { name, .. } => name.clone(),
            PendingDelete::User { username, .. } => username.clone(),
            PendingDelete::Account => "Je account".to_string(),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background tasks back to the UI loop.
#[derive(Debug)]
enum BackgroundResult {
    Profile(User),
    Admin(bool),
    Sockets(SocketScope, Vec<Socket>),
    Owners(Vec<SocketOwner>),
    Owner(String, SocketOwner),
    Locations(Vec<Location>),
    LocationDetail(Location),
    LocationSockets(i64, Vec<Socket>),
    Balance(CreditBalance),
    Users(Vec<User>),
    SessionInfo(String, SessionInfo),
    StatusChecking,
    Status(StatusUpdate),
    /// A mutation went through; show `message` and reload `reload`.
    Mutated { message: String, reload: Tab },
    AccountDeleted,
    Failed { context: &'static str, error: ApiError },
}

impl BackgroundResult {
    /// Health results do not depend on who is signed in.
    fn is_session_scoped(&self) -> bool {
        !matches!(
            self,
            BackgroundResult::StatusChecking | BackgroundResult::Status(_)
        )
    }
}

/// A result tagged with the login session that asked for it.
#[derive(Debug)]
struct Tagged {
    session: u64,
    result: BackgroundResult,
}

/// Sending half of the result channel, bound to one login session.
#[derive(Debug, Clone)]
struct ResultSender {
    session: u64,
    tx: mpsc::Sender<Tagged>,
}

impl ResultSender {
    async fn send(
        &self,
        result: BackgroundResult,
    ) -> Result<(), mpsc::error::SendError<Tagged>> {
        self.tx
            .send(Tagged {
                session: self.session,
                result,
            })
            .await
    }
}

fn outcome<T>(
    context: &'static str,
    result: ApiResult<T>,
    on_ok: impl FnOnce(T) -> BackgroundResult,
) -> BackgroundResult {
    match result {
        Ok(value) => on_ok(value),
        Err(error) => BackgroundResult::Failed { context, error },
    }
}

/// Every socket in the network plus who owns each one.
async fn fetch_all_sockets(client: &ApiClient, tx: &ResultSender) {
    let sockets = match client.sockets().get_all_admin().await {
        Ok(sockets) => sockets,
        Err(error) => {
            let _ = tx
                .send(BackgroundResult::Failed {
                    context: "Alle laadpalen laden",
                    error,
                })
                .await;
            return;
        }
    };
    let ids: Vec<String> = sockets.iter().map(|s| s.socket_id.clone()).collect();
    if tx
        .send(BackgroundResult::Sockets(SocketScope::All, sockets))
        .await
        .is_err()
        || ids.is_empty()
    {
        return;
    }

    let owners = outcome(
        "Eigenaren laden",
        client.sockets().owners(&ids).await,
        BackgroundResult::Owners,
    );
    let _ = tx.send(owners).await;
}

/// Fetch the data behind a tab and send it to the UI loop.
async fn fetch_tab(client: ApiClient, tab: Tab, scope: SocketScope, tx: ResultSender) {
    let result = match tab {
        Tab::Sockets if scope == SocketScope::All => {
            fetch_all_sockets(&client, &tx).await;
            return;
        }
        Tab::Sockets => outcome(
            "Laadpalen laden",
            client.sockets().get_all().await,
            |sockets| BackgroundResult::Sockets(SocketScope::Own, sockets),
        ),
        Tab::Locations => {
            let user = match client.user().get().await {
                Ok(user) => user,
                Err(error) => {
                    let _ = tx
                        .send(BackgroundResult::Failed {
                            context: "Profiel laden",
                            error,
                        })
                        .await;
                    return;
                }
            };
            outcome(
                "Locaties laden",
                client.locations().for_user(user.id).await,
                BackgroundResult::Locations,
            )
        }
        Tab::Credits => outcome(
            "Tegoed laden",
            client.credits().balance().await,
            BackgroundResult::Balance,
        ),
        Tab::Users => outcome(
            "Gebruikers laden",
            client.users().get_all_with_details().await,
            BackgroundResult::Users,
        ),
        Tab::Status => {
            let _ = tx.send(BackgroundResult::StatusChecking).await;
            let keys = StatusBoard::new().keys();
            for update in status::check_all(&client, &keys).await {
                if tx.send(BackgroundResult::Status(update)).await.is_err() {
                    return;
                }
            }
            return;
        }
    };
    let _ = tx.send(result).await;
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub config: Config,
    client: ApiClient,

    pub state: AppState,
    pub current_tab: Tab,
    pub search_query: String,

    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    pub user: Option<User>,
    pub is_admin: bool,

    pub sockets: Vec<Socket>,
    pub socket_selection: usize,
    pub socket_scope: SocketScope,
    pub socket_owners: HashMap<String, SocketOwner>,
    pub session_info: Option<(String, SessionInfo)>,

    pub locations: Vec<Location>,
    pub location_selection: usize,
    pub location_sockets: Option<(i64, Vec<Socket>)>,

    pub balance: Option<CreditBalance>,
    pub top_up_selection: usize,

    pub users: Vec<User>,
    pub user_selection: usize,

    pub status: StatusBoard,
    pub pending_delete: Option<PendingDelete>,
    pub form: Option<Form>,
    pub toasts: Vec<Toast>,

    /// Bumped on logout, 401 and account deletion; older results are dropped.
    session: u64,
    tx: mpsc::Sender<Tagged>,
    rx: mpsc::Receiver<Tagged>,
    tasks: TaskGroup,
}

impl App {
    /// Create the app from the on-disk configuration.
    pub fn new() -> anyhow::Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        let client = ApiClient::from_config(&config)?;
        debug!(base_url = client.base_url(), "API client configured");
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: Config, client: ApiClient) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let login_username = config.last_username.clone().unwrap_or_default();

        Self {
            config,
            client,

            state: AppState::Normal,
            current_tab: Tab::Sockets,
            search_query: String::new(),

            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,

            user: None,
            is_admin: false,

            sockets: Vec::new(),
            socket_selection: 0,
            socket_scope: SocketScope::Own,
            socket_owners: HashMap::new(),
            session_info: None,

            locations: Vec::new(),
            location_selection: 0,
            location_sockets: None,

            balance: None,
            top_up_selection: 0,

            users: Vec::new(),
            user_selection: 0,

            status: StatusBoard::new(),
            pending_delete: None,
            form: None,
            toasts: Vec::new(),

            session: 0,
            tx,
            rx,
            tasks: TaskGroup::new(),
        }
    }

    /// Start pollers and either load data or show the login overlay.
    pub fn start(&mut self) {
        self.start_status_poller();
        if self.is_authenticated() {
            self.on_authenticated();
        } else {
            self.start_login();
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.client.has_token()
    }

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Gebruikersnaam en wachtwoord verplicht".to_string());
            return;
        }

        self.login_error = None;

        let credentials = Credentials {
            username: username.clone(),
            password,
        };
        match self.client.user().login(&credentials).await {
            Ok(response) => {
                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                if let Some(user) = response.user {
                    self.set_profile(user);
                }
                self.push_toast(ToastKind::Success, "Ingelogd");
                self.on_authenticated();
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_password.clear();
                self.login_error = Some(e.message());
            }
        }
    }

    /// End the session on the backend and return to the login overlay.
    pub async fn logout(&mut self) {
        if let Err(e) = self.client.user().logout().await {
            self.push_toast(ToastKind::Error, format!("Uitloggen: {}", e.message()));
        }
        self.reset_session();
        self.login_error = None;
        self.start_login();
        info!("Logged out");
    }

    fn on_authenticated(&mut self) {
        self.start_profile_poller();
        for tab in [Tab::Sockets, Tab::Locations, Tab::Credits] {
            self.reload(tab);
        }
    }

    /// The backend rejected our token: drop it and ask for a new login.
    fn handle_unauthorized(&mut self) {
        if let Err(e) = self.client.discard_session() {
            warn!(error = %e, "Failed to clear stored token");
        }
        self.reset_session();
        self.login_error = Some("Sessie verlopen, log opnieuw in".to_string());
        self.start_login();
    }

    /// Forget everything tied to the signed-in account. Requests still in
    /// flight are aborted, and anything they already queued is ignored.
    fn reset_session(&mut self) {
        self.session += 1;
        self.tasks.abort_all_except(STATUS_POLLER);
        self.client.debouncer().cancel_all();

        self.user = None;
        self.is_admin = false;
        self.sockets.clear();
        self.socket_scope = SocketScope::Own;
        self.socket_owners.clear();
        self.session_info = None;
        self.locations.clear();
        self.location_sockets = None;
        self.balance = None;
        self.users.clear();
        self.pending_delete = None;
        self.form = None;
        if self.current_tab == Tab::Users {
            self.current_tab = Tab::Sockets;
        }
        self.clamp_selections();
    }

    fn set_profile(&mut self, user: User) {
        let changed = self.user.as_ref().map(|u| u.id) != Some(user.id);
        self.user = Some(user);
        if changed {
            self.check_admin();
        }
    }

    fn check_admin(&mut self) {
        let Some(user_id) = self.user.as_ref().map(|u| u.id) else {
            return;
        };
        let client = self.client.clone();
        self.spawn_request("admin-check", async move {
            outcome(
                "Rol controleren",
                client.user().is_admin(user_id).await,
                BackgroundResult::Admin,
            )
        });
    }

    // =========================================================================
    // Background work
    // =========================================================================

    fn sender(&self) -> ResultSender {
        ResultSender {
            session: self.session,
            tx: self.tx.clone(),
        }
    }

    fn spawn_request<F>(&mut self, name: &str, request: F)
    where
        F: std::future::Future<Output = BackgroundResult> + Send + 'static,
    {
        let tx = self.sender();
        self.tasks.spawn(name, async move {
            let _ = tx.send(request.await).await;
        });
    }

    fn start_status_poller(&mut self) {
        let client = self.client.clone();
        let tx = self.sender();
        let keys = self.status.keys();
        self.tasks
            .spawn_interval(STATUS_POLLER, STATUS_POLL_INTERVAL, move || {
                let client = client.clone();
                let tx = tx.clone();
                let keys = keys.clone();
                async move {
                    for update in status::check_all(&client, &keys).await {
                        let _ = tx.send(BackgroundResult::Status(update)).await;
                    }
                }
            });
    }

    fn start_profile_poller(&mut self) {
        self.tasks.cancel(PROFILE_POLLER);
        let client = self.client.clone();
        let tx = self.sender();
        self.tasks
            .spawn_interval(PROFILE_POLLER, PROFILE_POLL_INTERVAL, move || {
                let client = client.clone();
                let tx = tx.clone();
                async move {
                    let result = outcome(
                        "Profiel laden",
                        client.user().get().await,
                        BackgroundResult::Profile,
                    );
                    let _ = tx.send(result).await;
                }
            });
    }

    /// Load the data behind `tab` in the background.
    pub fn reload(&mut self, tab: Tab) {
        let tx = self.sender();
        let scope = self.socket_scope;
        self.tasks
            .spawn(tab.title(), fetch_tab(self.client.clone(), tab, scope, tx));
    }

    /// User-requested refresh of the current tab. Repeated presses within the
    /// debounce window collapse into one request.
    pub fn refresh_current_tab(&mut self) {
        let tab = self.current_tab;
        match tab {
            Tab::Sockets => self.client.cache().clear(SOCKETS_CACHE_KEY),
            Tab::Users => self.client.cache().clear(USERS_DETAILS_CACHE_KEY),
            Tab::Status => {
                for key in self.status.keys() {
                    self.client.cache().clear(&status_cache_key(&key));
                }
            }
            Tab::Locations | Tab::Credits => {}
        }

        let client = self.client.clone();
        let tx = self.sender();
        let scope = self.socket_scope;
        self.client
            .debounce(&format!("refresh:{}", tab.title()), move || {
                fetch_tab(client, tab, scope, tx)
            });
        self.push_toast(ToastKind::Info, format!("{} verversen...", tab.title()));
    }

    /// Drain finished background results and expire old toasts.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(tagged) = self.rx.try_recv() {
            results.push(tagged);
        }

        for Tagged { session, result } in results {
            // A reset earlier in this batch also makes later results stale
            if session != self.session && result.is_session_scoped() {
                debug!(?result, "Dropping result from an earlier session");
                continue;
            }
            self.process_result(result);
        }

        let now = Instant::now();
        self.toasts.retain(|t| !t.is_expired(now));
    }

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Profile(user) => self.set_profile(user),
            BackgroundResult::Admin(is_admin) => {
                self.is_admin = is_admin;
                if is_admin {
                    self.reload(Tab::Users);
                } else {
                    if self.current_tab == Tab::Users {
                        self.current_tab = Tab::Sockets;
                    }
                    if self.socket_scope == SocketScope::All {
                        self.socket_scope = SocketScope::Own;
                        self.reload(Tab::Sockets);
                    }
                }
            }
            BackgroundResult::Sockets(scope, sockets) => {
                // The view may have been toggled while this was loading
                if scope == self.socket_scope {
                    self.sockets = sockets;
                    self.clamp_selections();
                }
            }
            BackgroundResult::Owners(owners) => {
                for owner in owners {
                    if let Some(socket_id) = owner.socket_id.clone() {
                        self.socket_owners.insert(socket_id, owner);
                    }
                }
            }
            BackgroundResult::Owner(socket_id, owner) => {
                self.socket_owners.insert(socket_id, owner);
            }
            BackgroundResult::Locations(locations) => {
                self.locations = locations;
                self.clamp_selections();
            }
            BackgroundResult::LocationDetail(location) => {
                if let Some(existing) = self.locations.iter_mut().find(|l| l.id == location.id) {
                    *existing = location;
                }
            }
            BackgroundResult::LocationSockets(location_id, sockets) => {
                self.location_sockets = Some((location_id, sockets));
            }
            BackgroundResult::Balance(balance) => self.balance = Some(balance),
            BackgroundResult::Users(users) => {
                self.users = users;
                self.clamp_selections();
            }
            BackgroundResult::SessionInfo(socket_id, info) => {
                self.session_info = Some((socket_id, info));
            }
            BackgroundResult::StatusChecking => self.status.mark_all_checking(),
            BackgroundResult::Status(update) => {
                if update.key == BACKEND && update.state != ServiceState::Online {
                    debug!(error = ?update.error, "Backend reported offline");
                }
                self.status.apply(update);
            }
            BackgroundResult::Mutated { message, reload } => {
                self.push_toast(ToastKind::Success, message);
                self.reload(reload);
            }
            BackgroundResult::AccountDeleted => {
                info!("Account deleted");
                self.reset_session();
                self.login_username.clear();
                self.login_error = Some("Account verwijderd".to_string());
                self.start_login();
            }
            BackgroundResult::Failed { context, error } => {
                if error.is_unauthorized() {
                    warn!(context, "Token rejected by backend");
                    self.handle_unauthorized();
                } else {
                    warn!(context, error = %error, "Background request failed");
                    self.push_toast(ToastKind::Error, format!("{}: {}", context, error.message()));
                }
            }
        }
    }

    pub fn push_toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toasts.push(Toast {
            message: message.into(),
            kind,
            created_at: Instant::now(),
        });
    }

    /// Most recent toast still on screen.
    pub fn current_toast(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub fn selected_socket(&self) -> Option<&Socket> {
        self.sockets.get(self.socket_selection)
    }

    pub fn selected_location(&self) -> Option<&Location> {
        self.locations.get(self.location_selection)
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.visible_users().get(self.user_selection).copied()
    }

    pub fn selected_top_up(&self) -> u32 {
        TOP_UP_AMOUNTS[self.top_up_selection.min(TOP_UP_AMOUNTS.len() - 1)]
    }

    /// Users filtered by the search query.
    pub fn visible_users(&self) -> Vec<&User> {
        if self.search_query.is_empty() {
            self.users.iter().collect()
        } else {
            self.users
                .iter()
                .filter(|u| u.matches(&self.search_query))
                .collect()
        }
    }

    /// Start or stop charging on the selected socket.
    pub fn toggle_session(&mut self, start: bool) {
        let user_id = self.user.as_ref().map(|u| u.id);
        let socket_id = self.selected_socket().map(|s| s.socket_id.clone());
        let (Some(user_id), Some(socket_id)) = (user_id, socket_id) else {
            self.push_toast(ToastKind::Error, "Geen laadpaal geselecteerd");
            return;
        };
        let client = self.client.clone();

        self.spawn_request("session", async move {
            let sessions = client.sessions();
            let (result, fallback) = if start {
                (sessions.start(user_id, &socket_id).await, "Laadsessie gestart")
            } else {
                (sessions.stop(user_id, &socket_id).await, "Laadsessie gestopt")
            };
            outcome("Laadsessie", result, |ack| BackgroundResult::Mutated {
                message: ack.message.unwrap_or_else(|| fallback.to_string()),
                reload: Tab::Sockets,
            })
        });
    }

    /// Session history for the selected socket. In the network view the
    /// owner is looked up as well.
    pub fn load_session_info(&mut self) {
        let Some(socket_id) = self.selected_socket().map(|s| s.socket_id.clone()) else {
            return;
        };

        if self.socket_scope == SocketScope::All {
            let client = self.client.clone();
            let socket_id = socket_id.clone();
            self.spawn_request("socket-owner", async move {
                let result = client.sockets().owner(&socket_id).await;
                outcome("Eigenaar laden", result, |owner| {
                    BackgroundResult::Owner(socket_id, owner)
                })
            });
        }

        let client = self.client.clone();
        self.spawn_request("session-info", async move {
            let result = client.sessions().info(&socket_id).await;
            outcome("Sessies laden", result, |info| {
                BackgroundResult::SessionInfo(socket_id, info)
            })
        });
    }

    /// Refresh the selected location and list the sockets placed there.
    pub fn load_location_sockets(&mut self) {
        let Some(location_id) = self.selected_location().map(|l| l.id) else {
            return;
        };

        let client = self.client.clone();
        self.spawn_request("location-detail", async move {
            outcome(
                "Locatie laden",
                client.locations().get(location_id).await,
                BackgroundResult::LocationDetail,
            )
        });

        let client = self.client.clone();
        self.spawn_request("location-sockets", async move {
            outcome(
                "Laadpalen laden",
                client.locations().sockets(location_id).await,
                |sockets| BackgroundResult::LocationSockets(location_id, sockets),
            )
        });
    }

    /// Switch the Sockets tab between own sockets and the admin network view.
    pub fn toggle_socket_scope(&mut self) {
        if !self.is_admin {
            return;
        }
        self.socket_scope = match self.socket_scope {
            SocketScope::Own => SocketScope::All,
            SocketScope::All => SocketScope::Own,
        };
        self.sockets.clear();
        self.session_info = None;
        self.socket_selection = 0;
        self.tasks.cancel(Tab::Sockets.title());
        self.reload(Tab::Sockets);
    }

    // =========================================================================
    // Forms
    // =========================================================================

    /// Open the create form for the current tab, if it has one.
    pub fn open_create_form(&mut self) {
        let form = match self.current_tab {
            Tab::Sockets => Form::new_socket(),
            Tab::Locations => Form::new_location(),
            _ => return,
        };
        self.form = Some(form);
        self.state = AppState::EditingForm;
    }

    pub fn open_edit_user_form(&mut self) {
        if !self.is_admin || self.current_tab != Tab::Users {
            return;
        }
        let Some(form) = self.selected_user().map(Form::edit_user) else {
            return;
        };
        self.form = Some(form);
        self.state = AppState::EditingForm;
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Validate the open form and send it. Invalid input keeps the form open.
    pub fn submit_form(&mut self) {
        let user_id = self.user.as_ref().map(|u| u.id);
        let Some(form) = self.form.as_mut() else {
            self.state = AppState::Normal;
            return;
        };
        let submission = match form.submission(user_id) {
            Ok(submission) => submission,
            Err(message) => {
                form.error = Some(message);
                return;
            }
        };
        self.form = None;
        self.state = AppState::Normal;

        let client = self.client.clone();
        self.spawn_request("form", async move {
            match submission {
                FormSubmission::Socket(socket) => {
                    let fallback = format!("Laadpaal {} toegevoegd", socket.socket_id);
                    outcome(
                        "Laadpaal toevoegen",
                        client.sockets().create(&socket).await,
                        |ack| BackgroundResult::Mutated {
                            message: ack.message.unwrap_or(fallback),
                            reload: Tab::Sockets,
                        },
                    )
                }
                FormSubmission::Location(location) => outcome(
                    "Locatie toevoegen",
                    client.locations().create(&location).await,
                    |created| BackgroundResult::Mutated {
                        message: format!("{} toegevoegd", created.name),
                        reload: Tab::Locations,
                    },
                ),
                FormSubmission::User(id, update) => outcome(
                    "Gebruiker bijwerken",
                    client.users().update(id, &update).await,
                    |ack| BackgroundResult::Mutated {
                        message: ack
                            .message
                            .unwrap_or_else(|| "Gebruiker bijgewerkt".to_string()),
                        reload: Tab::Users,
                    },
                ),
            }
        });
    }

    pub fn top_up(&mut self) {
        let amount = self.selected_top_up();
        let client = self.client.clone();
        let tx = self.sender();
        self.tasks.spawn("top-up", async move {
            match client.credits().add(amount).await {
                Ok(balance) => {
                    let _ = tx.send(BackgroundResult::Balance(balance)).await;
                    let _ = tx
                        .send(BackgroundResult::Mutated {
                            message: format!("€ {} toegevoegd", amount),
                            reload: Tab::Credits,
                        })
                        .await;
                }
                Err(error) => {
                    let _ = tx
                        .send(BackgroundResult::Failed {
                            context: "Tegoed opwaarderen",
                            error,
                        })
                        .await;
                }
            }
        });
    }

    /// Ask for confirmation before deleting the selected socket, location or user.
    pub fn request_delete(&mut self) {
        let pending = match self.current_tab {
            Tab::Sockets => self.selected_socket().map(|s| PendingDelete::Socket {
                socket_id: s.socket_id.clone(),
                label: s.display_name(),
            }),
            Tab::Locations => self.selected_location().map(|l| PendingDelete::Location {
                id: l.id,
                name: l.name.clone(),
            }),
            Tab::Users => self.selected_user().map(|u| PendingDelete::User {
                id: u.id,
                username: u.username.clone(),
            }),
            _ => None,
        };
        if let Some(pending) = pending {
            self.ask_delete(pending);
        }
    }

    /// Delete every socket of the signed-in account.
    pub fn request_delete_all_sockets(&mut self) {
        if self.current_tab == Tab::Sockets && self.socket_scope == SocketScope::Own {
            self.ask_delete(PendingDelete::AllSockets);
        }
    }

    pub fn request_delete_account(&mut self) {
        if self.user.is_some() {
            self.ask_delete(PendingDelete::Account);
        }
    }

    fn ask_delete(&mut self, pending: PendingDelete) {
        self.pending_delete = Some(pending);
        self.state = AppState::ConfirmingDelete;
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(pending) = self.pending_delete.take() else {
            return;
        };
        let client = self.client.clone();
        let label = pending.label();

        self.spawn_request("delete", async move {
            match pending {
                PendingDelete::Socket { socket_id, .. } => outcome(
                    "Laadpaal verwijderen",
                    client.sockets().delete(&socket_id).await,
                    |_| BackgroundResult::Mutated {
                        message: format!("{} verwijderd", label),
                        reload: Tab::Sockets,
                    },
                ),
                PendingDelete::AllSockets => outcome(
                    "Laadpalen verwijderen",
                    client.sockets().delete_all().await,
                    |_| BackgroundResult::Mutated {
                        message: "Alle laadpalen verwijderd".to_string(),
                        reload: Tab::Sockets,
                    },
                ),
                PendingDelete::Location { id, .. } => outcome(
                    "Locatie verwijderen",
                    client.locations().delete(id).await,
                    |ack| BackgroundResult::Mutated {
                        message: ack.message.unwrap_or_else(|| format!("{} verwijderd", label)),
                        reload: Tab::Locations,
                    },
                ),
                PendingDelete::User { id, .. } => outcome(
                    "Gebruiker verwijderen",
                    client.users().delete(id).await,
                    |ack| BackgroundResult::Mutated {
                        message: ack.message.unwrap_or_else(|| format!("{} verwijderd", label)),
                        reload: Tab::Users,
                    },
                ),
                PendingDelete::Account => outcome(
                    "Account verwijderen",
                    client.user().delete().await,
                    |_| BackgroundResult::AccountDeleted,
                ),
            }
        });
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn current_len(&self) -> usize {
        match self.current_tab {
            Tab::Sockets => self.sockets.len(),
            Tab::Locations => self.locations.len(),
            Tab::Credits => TOP_UP_AMOUNTS.len(),
            Tab::Users => self.visible_users().len(),
            Tab::Status => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Sockets => Some(&mut self.socket_selection),
            Tab::Locations => Some(&mut self.location_selection),
            Tab::Credits => Some(&mut self.top_up_selection),
            Tab::Users => Some(&mut self.user_selection),
            Tab::Status => None,
        }
    }

    /// Move the current tab's selection by `delta` rows, clamped to the list.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.current_len();
        if let Some(selection) = self.selection_mut() {
            if len == 0 {
                *selection = 0;
            } else {
                let next = (*selection as isize + delta).clamp(0, len as isize - 1);
                *selection = next as usize;
            }
        }
    }

    pub fn select_first(&mut self) {
        if let Some(selection) = self.selection_mut() {
            *selection = 0;
        }
    }

    pub fn select_last(&mut self) {
        let last = self.current_len().saturating_sub(1);
        if let Some(selection) = self.selection_mut() {
            *selection = last;
        }
    }

    fn clamp_selections(&mut self) {
        self.socket_selection = self.socket_selection.min(self.sockets.len().saturating_sub(1));
        self.location_selection = self
            .location_selection
            .min(self.locations.len().saturating_sub(1));
        self.user_selection = self
            .user_selection
            .min(self.visible_users().len().saturating_sub(1));
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if tab == Tab::Users && !self.is_admin {
            return;
        }
        self.current_tab = tab;
        self.search_query.clear();
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use laadjefiets_core::auth::{MemoryTokenStore, TokenStore};
    use laadjefiets_core::api::StatusCode;
    use laadjefiets_core::models::HealthReport;

    fn unauthorized() -> ApiError {
        ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message": "Token expired"}"#)
    }

    fn test_app(token: Option<&str>) -> (App, Arc<MemoryTokenStore>) {
        let store = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        let client = ApiClient::new("http://127.0.0.1:1/api", store.clone()).unwrap();
        (App::with_client(Config::default(), client), store)
    }

    fn user(id: i64, username: &str) -> User {
        serde_json::from_value(serde_json::json!({"id": id, "username": username})).unwrap()
    }

    #[test]
    fn test_tab_cycle_skips_users_for_non_admin() {
        assert_eq!(Tab::Status.next(false), Tab::Sockets);
        assert_eq!(Tab::Status.next(true), Tab::Users);
        assert_eq!(Tab::Sockets.prev(false), Tab::Status);
        assert_eq!(Tab::Sockets.prev(true), Tab::Users);
        assert_eq!(Tab::visible(false).len(), 4);
    }

    #[tokio::test]
    async fn test_switch_to_users_requires_admin() {
        let (mut app, _) = test_app(Some("abc"));
        app.switch_tab(Tab::Users);
        assert_eq!(app.current_tab, Tab::Sockets);

        app.is_admin = true;
        app.switch_tab(Tab::Users);
        assert_eq!(app.current_tab, Tab::Users);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toasts_expire_after_five_seconds() {
        let (mut app, _) = test_app(None);
        app.push_toast(ToastKind::Info, "Hallo");

        tokio::time::advance(Duration::from_secs(4)).await;
        app.check_background_tasks();
        assert_eq!(app.current_toast().map(|t| t.message.as_str()), Some("Hallo"));

        tokio::time::advance(Duration::from_secs(1)).await;
        app.check_background_tasks();
        assert!(app.current_toast().is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_result_returns_to_login() {
        let (mut app, store) = test_app(Some("stale"));
        app.user = Some(user(3, "imad"));
        app.is_admin = true;
        app.current_tab = Tab::Users;

        app.process_result(BackgroundResult::Failed {
            context: "Laadpalen laden",
            error: unauthorized(),
        });

        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.current_tab, Tab::Sockets);
        assert!(app.user.is_none());
        assert!(!app.is_admin);
        assert_eq!(store.load().unwrap(), None);
        assert!(app.login_error.is_some());
    }

    #[tokio::test]
    async fn test_other_failures_become_error_toasts() {
        let (mut app, _) = test_app(Some("abc"));
        let error = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        app.process_result(BackgroundResult::Failed {
            context: "Tegoed laden",
            error,
        });

        let toast = app.current_toast().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Tegoed laden: Unknown error");
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_backend_offline_status_raises_notice() {
        let (mut app, _) = test_app(None);
        let update = StatusUpdate::from_result(
            BACKEND,
            Ok(HealthReport {
                status: "offline".to_string(),
            }),
        );
        app.process_result(BackgroundResult::Status(update));

        assert!(app.status.backend_offline());
        assert_eq!(app.status.get(BACKEND).unwrap().state, ServiceState::Offline);
    }

    #[tokio::test]
    async fn test_selection_is_clamped_when_list_shrinks() {
        let (mut app, _) = test_app(Some("abc"));
        let socket = |id: &str| -> Socket {
            serde_json::from_value(serde_json::json!({"socket_id": id})).unwrap()
        };
        app.process_result(BackgroundResult::Sockets(SocketScope::Own, vec![socket("A"), socket("B"), socket("C")]));
        app.move_selection(PAGE_SCROLL_SIZE as isize);
        assert_eq!(app.socket_selection, 2);

        app.process_result(BackgroundResult::Sockets(SocketScope::Own, vec![socket("A")]));
        assert_eq!(app.socket_selection, 0);
        assert_eq!(app.selected_socket().unwrap().socket_id, "A");
    }

    #[tokio::test]
    async fn test_user_search_filters_list() {
        let (mut app, _) = test_app(Some("abc"));
        app.users = vec![user(1, "imad"), user(2, "matthijs")];
        app.search_query = "matt".to_string();

        assert_eq!(app.visible_users().len(), 1);
        assert_eq!(app.selected_user().unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_request_delete_needs_selection() {
        let (mut app, _) = test_app(Some("abc"));
        app.request_delete();
        assert_eq!(app.state, AppState::Normal);

        app.sockets = vec![serde_json::from_value(serde_json::json!({"socket_id": "7"})).unwrap()];
        app.request_delete();
        assert_eq!(app.state, AppState::ConfirmingDelete);
        assert_eq!(app.pending_delete.as_ref().unwrap().label(), "Laadstation 7");

        app.cancel_delete();
        assert!(app.pending_delete.is_none());
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_top_up_selection() {
        let (mut app, _) = test_app(None);
        app.current_tab = Tab::Credits;
        assert_eq!(app.selected_top_up(), 5);
        app.move_selection(2);
        assert_eq!(app.selected_top_up(), 20);
        app.select_last();
        assert_eq!(app.selected_top_up(), 50);
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(!can_add_username_char(MAX_USERNAME_LENGTH, 'a'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(MAX_PASSWORD_LENGTH - 1, '!'));
        assert!(!can_add_password_char(MAX_PASSWORD_LENGTH, 'a'));
    }

    #[tokio::test]
    async fn test_results_from_previous_session_are_dropped() {
        let (mut app, store) = test_app(Some("stale"));
        app.user = Some(user(3, "imad"));

        let tx = app.sender();
        tx.send(BackgroundResult::Admin(true)).await.unwrap();
        tx.send(BackgroundResult::Users(vec![user(1, "admin")])).await.unwrap();
        tx.send(BackgroundResult::Status(StatusUpdate::from_result(
            "mysql",
            Ok(HealthReport {
                status: "online".to_string(),
            }),
        )))
        .await
        .unwrap();

        app.process_result(BackgroundResult::Failed {
            context: "Laadpalen laden",
            error: unauthorized(),
        });
        app.check_background_tasks();

        assert_eq!(app.state, AppState::LoggingIn);
        assert!(!app.is_admin);
        assert!(app.users.is_empty());
        assert_eq!(store.load().unwrap(), None);
        // Health results are not tied to the account
        assert_eq!(app.status.get("mysql").unwrap().state, ServiceState::Online);
    }

    #[tokio::test]
    async fn test_reset_mid_batch_drops_the_rest_of_the_batch() {
        let (mut app, _) = test_app(Some("stale"));
        let tx = app.sender();
        tx.send(BackgroundResult::Failed {
            context: "Tegoed laden",
            error: unauthorized(),
        })
        .await
        .unwrap();
        tx.send(BackgroundResult::Admin(true)).await.unwrap();

        app.check_background_tasks();

        assert_eq!(app.state, AppState::LoggingIn);
        assert!(!app.is_admin);
    }

    #[tokio::test]
    async fn test_account_deleted_returns_to_empty_login() {
        let (mut app, _) = test_app(Some("abc"));
        app.user = Some(user(3, "imad"));
        app.login_username = "imad".to_string();

        app.request_delete_account();
        assert_eq!(app.pending_delete, Some(PendingDelete::Account));

        app.process_result(BackgroundResult::AccountDeleted);
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.user.is_none());
        assert!(app.login_username.is_empty());
        assert_eq!(app.login_error.as_deref(), Some("Account verwijderd"));
    }

    #[tokio::test]
    async fn test_socket_scope_toggle_is_admin_only_and_ignores_stale_lists() {
        let (mut app, _) = test_app(Some("abc"));
        let socket = |id: &str| -> Socket {
            serde_json::from_value(serde_json::json!({"socket_id": id})).unwrap()
        };

        app.toggle_socket_scope();
        assert_eq!(app.socket_scope, SocketScope::Own);

        app.is_admin = true;
        app.toggle_socket_scope();
        assert_eq!(app.socket_scope, SocketScope::All);

        app.process_result(BackgroundResult::Sockets(SocketScope::Own, vec![socket("A")]));
        assert!(app.sockets.is_empty());

        app.process_result(BackgroundResult::Sockets(
            SocketScope::All,
            vec![socket("A"), socket("B")],
        ));
        let owner: SocketOwner = serde_json::from_value(serde_json::json!({
            "socket_id": "B", "username": "matthijs"
        }))
        .unwrap();
        app.process_result(BackgroundResult::Owners(vec![owner]));
        assert_eq!(app.sockets.len(), 2);
        assert_eq!(app.socket_owners["B"].username_display(), "matthijs");

        // Delete-all only applies to the own list
        app.request_delete_all_sockets();
        assert!(app.pending_delete.is_none());

        // Losing admin falls back to the own list
        app.process_result(BackgroundResult::Admin(false));
        assert_eq!(app.socket_scope, SocketScope::Own);
    }

    #[tokio::test]
    async fn test_location_delete_and_detail_refresh() {
        let (mut app, _) = test_app(Some("abc"));
        let location = |id: i64, name: &str| -> Location {
            serde_json::from_value(serde_json::json!({"id": id, "name": name})).unwrap()
        };
        app.process_result(BackgroundResult::Locations(vec![location(1, "Thuis")]));
        app.switch_tab(Tab::Locations);

        app.process_result(BackgroundResult::LocationDetail(location(1, "Thuis (oprit)")));
        assert_eq!(app.selected_location().unwrap().name, "Thuis (oprit)");

        app.request_delete();
        assert_eq!(
            app.pending_delete,
            Some(PendingDelete::Location {
                id: 1,
                name: "Thuis (oprit)".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_form_stays_open_with_error() {
        let (mut app, _) = test_app(Some("abc"));
        app.switch_tab(Tab::Locations);
        app.open_create_form();
        assert_eq!(app.state, AppState::EditingForm);

        app.submit_form();
        assert_eq!(app.state, AppState::EditingForm);
        assert_eq!(
            app.form.as_ref().and_then(|f| f.error.as_deref()),
            Some("Niet ingelogd")
        );

        app.cancel_form();
        assert!(app.form.is_none());
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_edit_user_form_needs_admin_and_selection() {
        let (mut app, _) = test_app(Some("abc"));
        app.users = vec![user(2, "matthijs")];
        app.open_edit_user_form();
        assert!(app.form.is_none());

        app.is_admin = true;
        app.switch_tab(Tab::Users);
        app.open_edit_user_form();
        assert_eq!(app.state, AppState::EditingForm);
        assert_eq!(app.form.as_ref().unwrap().title(), "matthijs bewerken");
    }
}
