//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    auth::{create_one_time_code_table, create_user_table},
    goal::create_goal_table,
    sheet::create_sheet_table,
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist yet.
///
/// Foreign key enforcement is switched on for `connection` since SQLite
/// leaves it off by default.
///
/// # Errors
/// Returns an error if there is an SQL error, in which case no tables are created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_one_time_code_table(&transaction)?;
    create_sheet_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
