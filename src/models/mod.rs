mod client;
mod phone;

use sqlx::any::AnyRow;
use sqlx::{Row, TypeInfo, ValueRef};

pub use client::{Client, ClientQuery, ClientUpdate, PhoneReplacement};
pub use phone::{ClientPhone, Phone};

/// Read a text column that may hold NULL.
///
/// `AnyValueRef::is_null` always answers false, so `Option<String>` cannot
/// see a NULL through the Any driver. The value's type name still can.
pub(crate) fn nullable_text(row: &AnyRow, column: &str) -> Result<Option<String>, sqlx::Error> {
    let raw = row.try_get_raw(column)?;

    if raw.type_info().name() == "NULL" {
        return Ok(None);
    }

    row.try_get::<String, _>(column).map(Some)
}
