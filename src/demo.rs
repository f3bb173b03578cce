use tracing::info;

use crate::cli::{print_rows, report};
use crate::db::Database;
use crate::error::Result;
use crate::models::{ClientQuery, ClientUpdate, PhoneReplacement};

const SEED: [(&str, &str, &str, &str); 5] = [
    ("name_1", "surname_1", "1@email.com", "123-456"),
    ("name_2", "surname_2", "2@email.com", "234-567"),
    ("name_3", "surname_3", "3@email.com", "345-678"),
    ("name_4", "surname_4", "4@email.com", "456-789"),
    ("name_5", "surname_5", "5@email.com", "567-890"),
];

/// Recreate the tables and exercise every store operation on a small data set.
pub async fn run(db: &mut Database) -> Result<()> {
    db.reset_schema().await?;

    let mut ids = Vec::with_capacity(SEED.len());
    for (name, surname, email, phone) in SEED {
        ids.push(db.add_client(name, surname, email, Some(phone)).await?);
    }
    info!(clients = ids.len(), "demo data seeded");

    report(db.add_phone_number(ids[1], "654-321").await)?;
    report(db.add_phone_number(ids[4], "543-210").await)?;
    report(db.delete_phone(ids[0], "123-456").await)?;
    db.delete_client(ids[3]).await?;

    let by_identity = ClientQuery {
        name: Some("name_1".to_string()),
        surname: Some("surname_1".to_string()),
        email: Some("1@email.com".to_string()),
        phone: None,
    };
    print_rows(&db.find_client(&by_identity).await?);

    let by_phone = ClientQuery {
        phone: Some("345-678".to_string()),
        ..Default::default()
    };
    print_rows(&db.find_client(&by_phone).await?);

    let rename = ClientUpdate {
        name: Some("name_6".to_string()),
        surname: Some("surname_6".to_string()),
        email: Some("6@email.com".to_string()),
        phone: Some(PhoneReplacement {
            old: "345-678".to_string(),
            new: "678-901".to_string(),
        }),
    };
    report(db.update_client(ids[2], &rename).await)?;

    let new_phone = ClientUpdate {
        phone: Some(PhoneReplacement {
            old: "234-567".to_string(),
            new: "789-012".to_string(),
        }),
        ..Default::default()
    };
    report(db.update_client(ids[1], &new_phone).await)?;

    print_rows(&db.list_clients().await?);

    Ok(())
}
