use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

use super::nullable_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    pub id: i64,
    pub phone_number: Option<String>,
    pub client_id: i64,
}

impl<'r> FromRow<'r, AnyRow> for Phone {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            phone_number: nullable_text(row, "phone_number")?,
            client_id: row.try_get("client_id")?,
        })
    }
}

/// One row of `clients LEFT JOIN phones`. A client without phones shows up
/// once with `phone_number` set to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPhone {
    pub client_id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl<'r> FromRow<'r, AnyRow> for ClientPhone {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            client_id: row.try_get("client_id")?,
            name: row.try_get("name")?,
            surname: row.try_get("surname")?,
            email: row.try_get("email")?,
            phone_number: nullable_text(row, "phone_number")?,
        })
    }
}
