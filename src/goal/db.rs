//! Database operations for financial goals.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    database_id::GoalId,
    goal::{Goal, GoalSummary, GoalType, check_target_amount},
    ledger::LedgerTransaction,
    title::Title,
    transaction::get_goal_transactions,
};

/// Initialize the financial goal table and indexes.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS financial_goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            target_amount INTEGER NOT NULL
                CHECK (target_amount BETWEEN -1000000000000000 AND 1000000000000000),
            type TEXT NOT NULL CHECK (type IN ('debt', 'saving')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_financial_goal_user_id ON financial_goal(user_id);",
    )?;

    Ok(())
}

/// The fields needed to create a goal.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub title: Title,
    pub description: Option<String>,
    pub target_amount: i64,
    pub goal_type: GoalType,
}

/// Create a goal owned by `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::AmountOutOfRange] if the target amount is too large in size.
pub fn create_goal(
    user_id: UserID,
    new_goal: NewGoal,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Goal, Error> {
    check_target_amount(new_goal.target_amount)?;

    connection.execute(
        "INSERT INTO financial_goal
            (user_id, title, description, target_amount, type, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        (
            user_id.as_i64(),
            new_goal.title.as_ref(),
            &new_goal.description,
            new_goal.target_amount,
            new_goal.goal_type,
            now,
        ),
    )?;

    Ok(Goal {
        id: connection.last_insert_rowid(),
        user_id,
        title: new_goal.title,
        description: new_goal.description,
        target_amount: new_goal.target_amount,
        goal_type: new_goal.goal_type,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve a single goal by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist or belongs to another user.
pub fn get_goal(goal_id: GoalId, user_id: UserID, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, description, target_amount, type, created_at, updated_at
            FROM financial_goal WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &goal_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's goals, newest first.
pub fn get_goals(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, description, target_amount, type, created_at, updated_at
            FROM financial_goal WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC",
        )?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Retrieve all of a user's goals with the balance left after replaying each goal's transactions.
pub fn get_goal_summaries(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<GoalSummary>, Error> {
    get_goals(user_id, connection)?
        .into_iter()
        .map(|goal| -> Result<GoalSummary, Error> {
            let transactions = get_goal_transactions(goal.id, connection)?;
            let ledger = goal.ledger(transactions.iter().map(LedgerTransaction::from));

            Ok(GoalSummary {
                current_balance: ledger.final_balance,
                transaction_count: ledger.entries.len(),
                goal,
            })
        })
        .collect()
}

/// Update a goal's title and description.
///
/// # Errors
///
/// Returns [Error::UpdateMissingGoal] if the goal does not exist or belongs to another user.
pub fn update_goal(
    goal_id: GoalId,
    user_id: UserID,
    title: Title,
    description: Option<String>,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE financial_goal SET title = ?1, description = ?2, updated_at = ?3
        WHERE id = ?4 AND user_id = ?5",
        (title.as_ref(), description, now, goal_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    Ok(())
}

/// Delete a goal. Its transactions are kept and no longer count towards any goal.
///
/// # Errors
///
/// Returns [Error::DeleteMissingGoal] if the goal does not exist or belongs to another user.
pub fn delete_goal(goal_id: GoalId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "UPDATE \"transaction\" SET financial_goal_id = NULL
        WHERE financial_goal_id IN
            (SELECT id FROM financial_goal WHERE id = ?1 AND user_id = ?2)",
        (goal_id, user_id.as_i64()),
    )?;

    let rows_affected = transaction.execute(
        "DELETE FROM financial_goal WHERE id = ?1 AND user_id = ?2",
        (goal_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    transaction.commit()?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    let raw_title: String = row.get(2)?;

    Ok(Goal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: Title::new_unchecked(&raw_title),
        description: row.get(3)?,
        target_amount: row.get(4)?,
        goal_type: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
