//! Database operations for sheets.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    database_id::SheetId,
    sheet::{Sheet, SheetSummary, SheetTotals},
    title::Title,
};

/// Initialize the sheet table and indexes.
pub fn create_sheet_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS sheet (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_sheet_user_id ON sheet(user_id);",
    )?;

    Ok(())
}

/// Create a sheet owned by `user_id` and return it with its generated ID.
pub fn create_sheet(
    user_id: UserID,
    title: Title,
    description: Option<String>,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Sheet, Error> {
    connection.execute(
        "INSERT INTO sheet (user_id, title, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)",
        (user_id.as_i64(), title.as_ref(), &description, now),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Sheet {
        id,
        user_id,
        title,
        description,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve a single sheet by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the sheet does not exist or belongs to another user.
pub fn get_sheet(sheet_id: SheetId, user_id: UserID, connection: &Connection) -> Result<Sheet, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, description, created_at, updated_at
            FROM sheet WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &sheet_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's sheets with their totals, newest first.
pub fn get_sheet_summaries(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<SheetSummary>, Error> {
    connection
        .prepare(
            "SELECT sheet.id, sheet.user_id, sheet.title, sheet.description,
                sheet.created_at, sheet.updated_at,
                COALESCE(SUM(CASE WHEN t.type = 'in' THEN t.nominal END), 0),
                COALESCE(SUM(CASE WHEN t.type = 'out' THEN t.nominal END), 0)
            FROM sheet
            LEFT JOIN \"transaction\" t ON t.sheet_id = sheet.id
            WHERE sheet.user_id = ?1
            GROUP BY sheet.id
            ORDER BY sheet.created_at DESC, sheet.id DESC",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(SheetSummary {
                sheet: map_row(row)?,
                totals: SheetTotals {
                    total_in: row.get(6)?,
                    total_out: row.get(7)?,
                },
            })
        })?
        .map(|maybe_summary| maybe_summary.map_err(|error| error.into()))
        .collect()
}

/// Sum the `in` and `out` transactions of a sheet.
pub fn get_sheet_totals(sheet_id: SheetId, connection: &Connection) -> Result<SheetTotals, Error> {
    connection
        .query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'in' THEN nominal END), 0),
                COALESCE(SUM(CASE WHEN type = 'out' THEN nominal END), 0)
            FROM \"transaction\" WHERE sheet_id = ?1",
            [sheet_id],
            |row| {
                Ok(SheetTotals {
                    total_in: row.get(0)?,
                    total_out: row.get(1)?,
                })
            },
        )
        .map_err(|error| error.into())
}

/// Update a sheet's title and description.
///
/// # Errors
///
/// Returns [Error::UpdateMissingSheet] if the sheet does not exist or belongs to another user.
pub fn update_sheet(
    sheet_id: SheetId,
    user_id: UserID,
    title: Title,
    description: Option<String>,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE sheet SET title = ?1, description = ?2, updated_at = ?3
        WHERE id = ?4 AND user_id = ?5",
        (title.as_ref(), description, now, sheet_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingSheet);
    }

    Ok(())
}

/// Delete a sheet and all of its transactions.
///
/// # Errors
///
/// Returns [Error::DeleteMissingSheet] if the sheet does not exist or belongs to another user.
pub fn delete_sheet(sheet_id: SheetId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "DELETE FROM \"transaction\" WHERE sheet_id IN
            (SELECT id FROM sheet WHERE id = ?1 AND user_id = ?2)",
        (sheet_id, user_id.as_i64()),
    )?;
    let rows_affected = transaction.execute(
        "DELETE FROM sheet WHERE id = ?1 AND user_id = ?2",
        (sheet_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingSheet);
    }

    transaction.commit()?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Sheet, rusqlite::Error> {
    let raw_title: String = row.get(2)?;

    Ok(Sheet {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: Title::new_unchecked(&raw_title),
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
