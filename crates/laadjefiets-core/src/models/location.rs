use serde::{Deserialize, Serialize};

use super::de;

/// A named site grouping one or more sockets, with its own tariff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::f64_lenient")]
    pub tariff_per_kwh: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Location {
    pub fn tariff_display(&self) -> String {
        format!("€{:.2} per kWh", self.tariff_per_kwh)
    }

    pub fn address_display(&self) -> &str {
        self.address.as_deref().unwrap_or("-")
    }
}

/// Body of `POST /locations`.
#[derive(Debug, Clone, Serialize)]
pub struct NewLocation {
    pub user_id: i64,
    pub name: String,
    pub address: String,
    pub tariff_per_kwh: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocationList {
    Bare(Vec<Location>),
    Data { data: Vec<Location> },
}

impl LocationList {
    pub fn into_vec(self) -> Vec<Location> {
        match self {
            LocationList::Bare(locations) | LocationList::Data { data: locations } => locations,
        }
    }
}

/// `GET /locations/:id` wraps the record in `{data: ...}` on newer backends.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocationEnvelope {
    Data { data: Location },
    Bare(Location),
}

impl LocationEnvelope {
    pub fn into_inner(self) -> Location {
        match self {
            LocationEnvelope::Data { data } | LocationEnvelope::Bare(data) => data,
        }
    }
}
