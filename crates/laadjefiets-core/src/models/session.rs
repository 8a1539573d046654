use serde::{Deserialize, Serialize};

use super::de;

/// A start/stop charging-session record. Managed server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingSession {
    pub id: i64,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub stop_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub total_energy_begin: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub total_energy_end: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub final_energy: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ChargingSession {
    pub fn is_active(&self) -> bool {
        self.stop_time.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub data: Vec<ChargingSession>,
}

impl SessionInfo {
    /// Most recent session, assuming the backend lists newest first.
    pub fn latest(&self) -> Option<&ChargingSession> {
        self.data.first()
    }
}

/// Body sent with start/stop requests.
#[derive(Debug, Clone, Serialize)]
pub struct SessionCommand<'a> {
    pub socket_id: &'a str,
}
