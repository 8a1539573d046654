use serde::{Deserialize, Serialize};

/// Account role as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Reseller,
    #[default]
    User,
    #[serde(other)]
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Reseller => "Reseller",
            Role::User => "User",
            Role::Other => "Other",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Parses the role names an admin can assign. `Other` is never assignable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "reseller" => Ok(Role::Reseller),
            "user" => Ok(Role::User),
            other => Err(format!("Onbekende rol: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    pub fn email_display(&self) -> &str {
        self.email.as_deref().unwrap_or("-")
    }

    /// Case-insensitive match on username or email, used by the user list search.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.username.to_lowercase().contains(&query)
            || self
                .email
                .as_deref()
                .map(|e| e.to_lowercase().contains(&query))
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
}

/// Admin edit of another account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminCheck {
    #[serde(default)]
    pub role: Role,
}

/// `GET /users` may answer with a bare list or a `{data: [...]}` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserList {
    Bare(Vec<User>),
    Data { data: Vec<User> },
    Users { users: Vec<User> },
}

impl UserList {
    pub fn into_vec(self) -> Vec<User> {
        match self {
            UserList::Bare(users) | UserList::Data { data: users } | UserList::Users { users } => {
                users
            }
        }
    }
}
