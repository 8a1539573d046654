use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
}

impl HealthReport {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Checking,
    Online,
    Offline,
}

impl ServiceState {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceState::Checking => "Checking",
            ServiceState::Online => "Online",
            ServiceState::Offline => "Offline",
        }
    }
}

impl From<&HealthReport> for ServiceState {
    fn from(report: &HealthReport) -> Self {
        if report.is_online() {
            ServiceState::Online
        } else {
            ServiceState::Offline
        }
    }
}
