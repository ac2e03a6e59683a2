use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    auth::{UserID, get_or_create_user},
    database_id::{GoalId, SheetId, TransactionId},
    db::initialize,
    ledger::TransactionType,
};

/// An in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");
    connection
}

pub(crate) fn create_test_user(email: &str, connection: &Connection) -> UserID {
    get_or_create_user(email, OffsetDateTime::now_utc(), connection)
        .expect("Could not create test user")
        .id
}

/// Insert a transaction directly, skipping the ownership checks of
/// [create_transaction](crate::transaction::create_transaction).
pub(crate) fn insert_test_transaction(
    sheet_id: SheetId,
    goal_id: Option<GoalId>,
    transaction_type: TransactionType,
    nominal: i64,
    connection: &Connection,
) -> TransactionId {
    connection
        .execute(
            "INSERT INTO \"transaction\"
                (sheet_id, financial_goal_id, type, nominal, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, '', ?5, ?5)",
            (
                sheet_id,
                goal_id,
                transaction_type,
                nominal,
                OffsetDateTime::now_utc(),
            ),
        )
        .expect("Could not insert test transaction");

    connection.last_insert_rowid()
}
