//! Database operations for transactions.
//!
//! Transactions do not store a user ID, ownership is checked through the sheet they belong to.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    database_id::{GoalId, SheetId, TransactionId},
    sheet::get_sheet,
    transaction::{Transaction, TransactionFields},
};

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            sheet_id INTEGER NOT NULL,
            financial_goal_id INTEGER,
            type TEXT NOT NULL CHECK (type IN ('in', 'out')),
            nominal INTEGER NOT NULL CHECK (nominal BETWEEN 0 AND 1000000000000000),
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(sheet_id) REFERENCES sheet(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(financial_goal_id) REFERENCES financial_goal(id)
                ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_sheet_id ON \"transaction\"(sheet_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_goal_created
            ON \"transaction\"(financial_goal_id, created_at, id);",
    )?;

    Ok(())
}

/// Check that `goal_id`, if any, is one of the user's goals.
fn check_goal(
    goal_id: Option<GoalId>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(id) = goal_id else {
        return Ok(());
    };

    let is_users_goal: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM financial_goal WHERE id = ?1 AND user_id = ?2)",
        (id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if is_users_goal {
        Ok(())
    } else {
        Err(Error::InvalidGoal(goal_id))
    }
}

/// Record a transaction in one of the user's sheets.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeNominal] if the nominal amount is below zero,
/// - [Error::AmountOutOfRange] if the nominal amount is above [MAX_AMOUNT](crate::MAX_AMOUNT),
/// - [Error::NotFound] if the sheet does not exist or belongs to another user,
/// - [Error::InvalidGoal] if the goal ID does not refer to one of the user's goals,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    sheet_id: SheetId,
    user_id: UserID,
    fields: TransactionFields,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    fields.validate()?;
    get_sheet(sheet_id, user_id, connection)?;
    check_goal(fields.goal_id, user_id, connection)?;

    connection.execute(
        "INSERT INTO \"transaction\"
            (sheet_id, financial_goal_id, type, nominal, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        (
            sheet_id,
            fields.goal_id,
            fields.transaction_type,
            fields.nominal,
            &fields.description,
            now,
        ),
    )?;

    Ok(Transaction {
        id: connection.last_insert_rowid(),
        sheet_id,
        goal_id: fields.goal_id,
        transaction_type: fields.transaction_type,
        nominal: fields.nominal,
        description: fields.description,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction in one of the user's sheets,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT t.id, t.sheet_id, t.financial_goal_id, t.type, t.nominal, t.description,
                t.created_at, t.updated_at
            FROM \"transaction\" t
            INNER JOIN sheet ON sheet.id = t.sheet_id
            WHERE t.id = :id AND sheet.user_id = :user_id",
        )?
        .query_row(
            &[(":id", &transaction_id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// The transactions recorded in a sheet, newest first.
pub fn get_sheet_transactions(
    sheet_id: SheetId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, sheet_id, financial_goal_id, type, nominal, description,
                created_at, updated_at
            FROM \"transaction\" WHERE sheet_id = ?1
            ORDER BY created_at DESC, id DESC",
        )?
        .query_map([sheet_id], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// The transactions linked to a goal, oldest first.
///
/// This is the order the goal's ledger is replayed in, ties on the creation
/// time are broken by ID.
pub fn get_goal_transactions(
    goal_id: GoalId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, sheet_id, financial_goal_id, type, nominal, description,
                created_at, updated_at
            FROM \"transaction\" WHERE financial_goal_id = ?1
            ORDER BY created_at ASC, id ASC",
        )?
        .query_map([goal_id], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Change the editable fields of a transaction. The sheet it belongs to stays the same.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeNominal] if the nominal amount is below zero,
/// - [Error::AmountOutOfRange] if the nominal amount is above [MAX_AMOUNT](crate::MAX_AMOUNT),
/// - [Error::InvalidGoal] if the goal ID does not refer to one of the user's goals,
/// - [Error::UpdateMissingTransaction] if the transaction is not in one of the user's sheets,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    fields: TransactionFields,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    fields.validate()?;
    check_goal(fields.goal_id, user_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
        SET financial_goal_id = ?1, type = ?2, nominal = ?3, description = ?4, updated_at = ?5
        WHERE id = ?6 AND sheet_id IN (SELECT id FROM sheet WHERE user_id = ?7)",
        (
            fields.goal_id,
            fields.transaction_type,
            fields.nominal,
            &fields.description,
            now,
            transaction_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction from one of the user's sheets.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction is not in one of the user's sheets.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\"
        WHERE id = ?1 AND sheet_id IN (SELECT id FROM sheet WHERE user_id = ?2)",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        sheet_id: row.get(1)?,
        goal_id: row.get(2)?,
        transaction_type: row.get(3)?,
        nominal: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
