//! Service health board.
//!
//! Tracks the health of the backend and the services behind it. The backend
//! is checked first; the rest are checked concurrently afterwards. Any
//! failure to reach a health endpoint counts as offline.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

use crate::api::endpoints::status_cache_key;
use crate::api::{ApiClient, ApiResult};
use crate::models::{HealthReport, ServiceState};

pub const BACKEND: &str = "backend";

/// Services shown on the status board, in display order.
pub const WATCHED_SERVICES: [(&str, &str); 4] = [
    (BACKEND, "Backend"),
    ("mysql", "MySQL"),
    ("amafamily", "Server Imad"),
    ("broncofanclub", "Server Matthijs"),
];

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub key: String,
    pub name: String,
    pub state: ServiceState,
    pub last_checked: Option<DateTime<Utc>>,
    pub checking: bool,
    pub last_error: Option<String>,
}

/// Result of one health check.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub key: String,
    pub state: ServiceState,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn from_result(key: &str, result: ApiResult<HealthReport>) -> Self {
        let (state, error) = match result {
            Ok(report) => (ServiceState::from(&report), None),
            Err(e) => (ServiceState::Offline, Some(e.message())),
        };
        Self {
            key: key.to_string(),
            state,
            error,
            checked_at: Utc::now(),
        }
    }
}

pub async fn check_service(client: &ApiClient, key: &str) -> StatusUpdate {
    let mut update = StatusUpdate::from_result(key, client.status().check(key).await);
    // A cached answer was checked when it was stored, not now
    if let Some(age) = client.cache().fresh_age(&status_cache_key(key)) {
        if let Ok(age) = chrono::Duration::from_std(age) {
            update.checked_at = update.checked_at - age;
        }
    }
    debug!(service = key, state = ?update.state, "Health checked");
    update
}

/// Check the backend first, then every other service concurrently.
pub async fn check_all(client: &ApiClient, keys: &[String]) -> Vec<StatusUpdate> {
    let mut updates = Vec::with_capacity(keys.len());

    if keys.iter().any(|k| k == BACKEND) {
        updates.push(check_service(client, BACKEND).await);
    }

    let others = keys
        .iter()
        .filter(|k| k.as_str() != BACKEND)
        .map(|k| check_service(client, k));
    updates.extend(join_all(others).await);

    updates
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusBoard {
    services: Vec<ServiceStatus>,
    backend_offline_notice: bool,
    notice_dismissed: bool,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::with_services(&WATCHED_SERVICES)
    }

    pub fn with_services(services: &[(&str, &str)]) -> Self {
        Self {
            services: services
                .iter()
                .map(|(key, name)| ServiceStatus {
                    key: key.to_string(),
                    name: name.to_string(),
                    state: ServiceState::Checking,
                    last_checked: None,
                    checking: false,
                    last_error: None,
                })
                .collect(),
            backend_offline_notice: false,
            notice_dismissed: false,
        }
    }

    pub fn services(&self) -> &[ServiceStatus] {
        &self.services
    }

    pub fn keys(&self) -> Vec<String> {
        self.services.iter().map(|s| s.key.clone()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&ServiceStatus> {
        self.services.iter().find(|s| s.key == key)
    }

    pub fn mark_all_checking(&mut self) {
        for service in &mut self.services {
            service.checking = true;
        }
    }

    /// Apply a check result.
    ///
    /// A backend result that is not online raises the offline notice unless it
    /// was dismissed; an online backend clears it and re-arms it.
    pub fn apply(&mut self, update: StatusUpdate) {
        if update.key == BACKEND {
            if update.state == ServiceState::Online {
                self.backend_offline_notice = false;
                self.notice_dismissed = false;
            } else if !self.notice_dismissed {
                self.backend_offline_notice = true;
            }
        }

        match self.services.iter_mut().find(|s| s.key == update.key) {
            Some(service) => {
                service.state = update.state;
                service.last_error = update.error;
                service.last_checked = Some(update.checked_at);
                service.checking = false;
            }
            None => debug!(service = %update.key, "Ignoring update for unknown service"),
        }
    }

    pub fn backend_offline(&self) -> bool {
        self.backend_offline_notice
    }

    /// Hide the notice until the backend has been seen online again.
    pub fn dismiss_backend_notice(&mut self) {
        if self.backend_offline_notice {
            self.backend_offline_notice = false;
            self.notice_dismissed = true;
        }
    }

    /// Run one full round against the backend and apply the results.
    pub async fn refresh(&mut self, client: &ApiClient) {
        self.mark_all_checking();
        for update in check_all(client, &self.keys()).await {
            self.apply(update);
        }
    }
}
