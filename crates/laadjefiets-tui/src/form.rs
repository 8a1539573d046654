//! Small text forms shown as overlays: new socket, new location and the admin
//! user editor. A form only collects and validates input; `App` sends it.

use laadjefiets_core::models::{NewLocation, NewSocket, Role, User, UserUpdate};

const MAX_FIELD_LENGTH: usize = 80;

#[derive(Debug, Clone)]
pub enum FormKind {
    NewSocket,
    NewLocation,
    EditUser(User),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
}

impl FormField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            secret: false,
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            secret: true,
        }
    }
}

/// A validated form, ready to send.
#[derive(Debug, Clone)]
pub enum FormSubmission {
    Socket(NewSocket),
    Location(NewLocation),
    User(i64, UserUpdate),
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl Form {
    fn with_fields(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    pub fn new_socket() -> Self {
        Self::with_fields(
            FormKind::NewSocket,
            vec![
                FormField::new("Laadpaal-ID", ""),
                FormField::new("Naam", ""),
                FormField::new("Locatie-ID", ""),
            ],
        )
    }

    pub fn new_location() -> Self {
        Self::with_fields(
            FormKind::NewLocation,
            vec![
                FormField::new("Naam", ""),
                FormField::new("Adres", ""),
                FormField::new("Tarief/kWh", ""),
            ],
        )
    }

    /// Prefilled with the current values; only changed fields are sent.
    pub fn edit_user(user: &User) -> Self {
        Self::with_fields(
            FormKind::EditUser(user.clone()),
            vec![
                FormField::new("Gebruiker", user.username.clone()),
                FormField::new("Email", user.email.clone().unwrap_or_default()),
                FormField::new("Rol", user.role.as_str()),
                FormField::secret("Wachtwoord"),
            ],
        )
    }

    pub fn title(&self) -> String {
        match &self.kind {
            FormKind::NewSocket => "Nieuwe laadpaal".to_string(),
            FormKind::NewLocation => "Nieuwe locatie".to_string(),
            FormKind::EditUser(user) => format!("{} bewerken", user.username),
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn on_last_field(&self) -> bool {
        self.focus + 1 == self.fields.len()
    }

    pub fn push_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if let Some(field) = self.fields.get_mut(self.focus) {
            if field.value.chars().count() < MAX_FIELD_LENGTH {
                field.value.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.trim()).unwrap_or_default()
    }

    /// Validate the input. `user_id` is the signed-in account, needed for new locations.
    pub fn submission(&self, user_id: Option<i64>) -> Result<FormSubmission, String> {
        match &self.kind {
            FormKind::NewSocket => {
                let socket_id = self.value(0);
                if socket_id.is_empty() {
                    return Err("Laadpaal-ID is verplicht".to_string());
                }
                let location_id = match self.value(2) {
                    "" => None,
                    raw => Some(
                        raw.parse::<i64>()
                            .map_err(|_| "Locatie-ID moet een getal zijn".to_string())?,
                    ),
                };
                Ok(FormSubmission::Socket(NewSocket {
                    socket_id: socket_id.to_string(),
                    name: non_empty(self.value(1)),
                    location_id,
                }))
            }
            FormKind::NewLocation => {
                let user_id = user_id.ok_or_else(|| "Niet ingelogd".to_string())?;
                let name = self.value(0);
                let address = self.value(1);
                if name.is_empty() || address.is_empty() {
                    return Err("Naam en adres zijn verplicht".to_string());
                }
                let tariff_per_kwh = parse_tariff(self.value(2))?;
                Ok(FormSubmission::Location(NewLocation {
                    user_id,
                    name: name.to_string(),
                    address: address.to_string(),
                    tariff_per_kwh,
                }))
            }
            FormKind::EditUser(user) => {
                let username = self.value(0);
                if username.is_empty() {
                    return Err("Gebruikersnaam mag niet leeg zijn".to_string());
                }
                let role: Role = self.value(2).parse()?;
                let email = self.value(1);

                let update = UserUpdate {
                    username: (username != user.username).then(|| username.to_string()),
                    email: (email != user.email.as_deref().unwrap_or_default())
                        .then(|| email.to_string()),
                    role: (role != user.role).then_some(role),
                    password: non_empty(self.value(3)),
                };
                if update.username.is_none()
                    && update.email.is_none()
                    && update.role.is_none()
                    && update.password.is_none()
                {
                    return Err("Geen wijzigingen".to_string());
                }
                Ok(FormSubmission::User(user.id, update))
            }
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Accepts both `0.35` and `0,35`.
fn parse_tariff(value: &str) -> Result<f64, String> {
    match value.replace(',', ".").parse::<f64>() {
        Ok(tariff) if tariff >= 0.0 && tariff.is_finite() => Ok(tariff),
        _ => Err("Tarief moet een positief getal zijn".to_string()),
    }
}
