use serde::{Deserialize, Serialize};

use super::de;

/// A charging socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Socket {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(deserialize_with = "de::string_or_number")]
    pub socket_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Socket {
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Laadstation {}", self.socket_id),
        }
    }

    pub fn location_display(&self) -> &str {
        self.location.as_deref().unwrap_or("Onbekend")
    }

    pub fn status_display(&self) -> &str {
        self.status.as_deref().unwrap_or("Onbekend")
    }
}

/// Body of `POST /socket/new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSocket {
    pub socket_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
}

/// Socket list responses come in three shapes depending on the endpoint revision.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SocketList {
    Bare(Vec<Socket>),
    Data { data: Vec<Socket> },
    Sockets { sockets: Vec<Socket> },
}

impl SocketList {
    pub fn into_vec(self) -> Vec<Socket> {
        match self {
            SocketList::Bare(sockets)
            | SocketList::Data { data: sockets }
            | SocketList::Sockets { sockets } => sockets,
        }
    }
}

/// Customer a socket belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocketOwner {
    #[serde(default, deserialize_with = "de_opt_socket_id")]
    pub socket_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SocketOwner {
    pub fn username_display(&self) -> &str {
        self.username.as_deref().unwrap_or("Geen klant")
    }

    pub fn email_display(&self) -> &str {
        self.email.as_deref().unwrap_or("Geen email")
    }
}

fn de_opt_socket_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "de::string_or_number")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}

/// `POST /socketbelongsto/bulk` answers with a list or a `{data: [...]}` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SocketOwnerList {
    Bare(Vec<SocketOwner>),
    Data { data: Vec<SocketOwner> },
}

impl SocketOwnerList {
    pub fn into_vec(self) -> Vec<SocketOwner> {
        match self {
            SocketOwnerList::Bare(owners) | SocketOwnerList::Data { data: owners } => owners,
        }
    }
}
