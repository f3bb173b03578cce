#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub client_id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
}

/// Fields to change on an existing client. `None` leaves the column as it is.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<PhoneReplacement>,
}

impl ClientUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }
}

/// Replace `old`, which must already belong to the client, with `new`.
#[derive(Debug, Clone)]
pub struct PhoneReplacement {
    pub old: String,
    pub new: String,
}

/// Search filters. A client matches when name, surname and email are all
/// equal, or when one of its phones equals `phone`.
#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}
