//! Generation, storage and verification of the six digit codes users log in with.

use rand::{Rng, rngs::OsRng};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::Error;

/// How long a one-time code can be used for after it is sent.
pub const ONE_TIME_CODE_DURATION: Duration = Duration::minutes(10);
/// The number of wrong guesses allowed before a code is thrown away.
pub const MAX_CODE_ATTEMPTS: i64 = 5;
/// The period over which code requests for one email address are counted.
pub const CODE_REQUEST_WINDOW: Duration = Duration::hours(1);
/// The number of codes that can be sent to one email address per [CODE_REQUEST_WINDOW].
pub const MAX_CODE_REQUESTS: i64 = 5;

/// A freshly generated six digit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    /// Generate a random code using the operating system's random number generator.
    pub fn generate() -> Self {
        let number: u32 = OsRng.gen_range(0..1_000_000);
        Self(format!("{number:06}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Only the hash of a code is stored, salted with the email it was sent to.
fn hash_code(email: &str, code: &str) -> String {
    format!("{:x}", Sha256::digest(format!("{email}:{code}")))
}

/// Create the tables holding the outstanding code and the recent requests
/// for each email address.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_one_time_code_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS one_time_code (
                email TEXT PRIMARY KEY,
                code_hash TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0
                );

        CREATE TABLE IF NOT EXISTS one_time_code_request (
                email TEXT PRIMARY KEY,
                window_started_at TEXT NOT NULL,
                request_count INTEGER NOT NULL
                );",
    )?;

    Ok(())
}

/// Count a code request for `email`, starting a new window once the last one is over.
fn record_code_request(
    email: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let window: Option<(OffsetDateTime, i64)> = connection
        .query_row(
            "SELECT window_started_at, request_count FROM one_time_code_request WHERE email = ?1",
            (email,),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match window {
        Some((started_at, count)) if now < started_at + CODE_REQUEST_WINDOW => {
            if count >= MAX_CODE_REQUESTS {
                tracing::warn!("Refusing to send another one-time code to {email}");
                return Err(Error::TooManyCodeRequests);
            }

            connection.execute(
                "UPDATE one_time_code_request SET request_count = request_count + 1
                WHERE email = ?1",
                (email,),
            )?;
        }
        _ => {
            connection.execute(
                "INSERT OR REPLACE INTO one_time_code_request
                    (email, window_started_at, request_count)
                VALUES (?1, ?2, 1)",
                (email, now),
            )?;
        }
    }

    Ok(())
}

/// Store `code` for `email`, replacing any code that was sent earlier.
///
/// The code expires [ONE_TIME_CODE_DURATION] after `now`. At most
/// [MAX_CODE_REQUESTS] codes are stored for an email address per
/// [CODE_REQUEST_WINDOW].
///
/// # Errors
///
/// Returns:
/// - [Error::TooManyCodeRequests] if the request limit has been reached,
/// - [Error::SqlError] if the code could not be saved.
pub fn store_one_time_code(
    email: &str,
    code: &OneTimeCode,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    record_code_request(email, now, connection)?;

    connection.execute(
        "INSERT OR REPLACE INTO one_time_code (email, code_hash, expires_at, attempts)
        VALUES (?1, ?2, ?3, 0)",
        (
            email,
            hash_code(email, code.as_str()),
            now + ONE_TIME_CODE_DURATION,
        ),
    )?;

    Ok(())
}

fn delete_one_time_code(email: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute("DELETE FROM one_time_code WHERE email = ?1", (email,))?;

    Ok(())
}

/// Check `code` against the code stored for `email`.
///
/// A correct code is consumed. A wrong code uses up one attempt and the
/// code is discarded once [MAX_CODE_ATTEMPTS] wrong guesses have been made.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidOneTimeCode] if no code was requested or `code` is wrong,
/// - [Error::OneTimeCodeExpired] if the stored code is past its expiry,
/// - [Error::TooManyCodeAttempts] if this guess used up the last attempt,
/// - [Error::SqlError] if the database could not be queried.
pub fn verify_one_time_code(
    email: &str,
    code: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let stored: Option<(String, OffsetDateTime, i64)> = connection
        .query_row(
            "SELECT code_hash, expires_at, attempts FROM one_time_code WHERE email = ?1",
            (email,),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let Some((code_hash, expires_at, attempts)) = stored else {
        return Err(Error::InvalidOneTimeCode);
    };

    if expires_at <= now {
        delete_one_time_code(email, connection)?;
        return Err(Error::OneTimeCodeExpired);
    }

    if attempts >= MAX_CODE_ATTEMPTS {
        delete_one_time_code(email, connection)?;
        return Err(Error::TooManyCodeAttempts);
    }

    if hash_code(email, code.trim()) == code_hash {
        delete_one_time_code(email, connection)?;
        return Ok(());
    }

    if attempts + 1 >= MAX_CODE_ATTEMPTS {
        tracing::warn!("Discarding one-time code for {email} after {MAX_CODE_ATTEMPTS} attempts");
        delete_one_time_code(email, connection)?;
        return Err(Error::TooManyCodeAttempts);
    }

    connection.execute(
        "UPDATE one_time_code SET attempts = attempts + 1 WHERE email = ?1",
        (email,),
    )?;

    Err(Error::InvalidOneTimeCode)
}
