//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, database_id::GoalId, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The auth token cookie is missing from the cookie jar in the request,
    /// or it could not be decrypted.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token in the cookie could not be parsed or has expired.
    #[error("the auth token is invalid or has expired")]
    InvalidToken,

    /// The email address entered at log-in is not a valid address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The one-time code does not match the code that was sent, or no code
    /// was requested for the email address.
    #[error("the one-time code is incorrect")]
    InvalidOneTimeCode,

    /// The one-time code was correct once, but it is too old now.
    #[error("the one-time code has expired")]
    OneTimeCodeExpired,

    /// The user guessed wrong too many times and the code was discarded.
    #[error("too many incorrect attempts for the one-time code")]
    TooManyCodeAttempts,

    /// Too many one-time codes were requested for one email address in a
    /// short time.
    #[error("too many one-time codes were requested")]
    TooManyCodeRequests,

    /// The mailer could not deliver the one-time code.
    ///
    /// The error string should only be logged on the server.
    #[error("could not send the one-time code: {0}")]
    EmailDeliveryError(String),

    /// A sheet or goal was given a title that is empty or only whitespace.
    #[error("title cannot be empty")]
    EmptyTitle,

    /// A transaction was given a negative nominal amount.
    ///
    /// The direction of a transaction is given by its type, so the nominal
    /// amount is always a magnitude.
    #[error("{0} is negative, the nominal amount must be zero or more")]
    NegativeNominal(i64),

    /// A nominal or target amount is larger in size than [MAX_AMOUNT](crate::MAX_AMOUNT).
    #[error("{0} is too large, amounts can be at most 1,000,000,000,000,000 in size")]
    AmountOutOfRange(i64),

    /// The goal ID used for a transaction does not refer to one of the
    /// user's goals.
    #[error("the goal ID does not refer to a valid goal")]
    InvalidGoal(Option<GoalId>),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a sheet that does not exist
    #[error("tried to update a sheet that is not in the database")]
    UpdateMissingSheet,

    /// Tried to delete a sheet that does not exist
    #[error("tried to delete a sheet that is not in the database")]
    DeleteMissingSheet,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::EmptyTitle => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Missing title".to_owned(),
                    details: "Enter a title that is not just spaces.".to_owned(),
                },
            ),
            Error::NegativeNominal(nominal) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!(
                        "{nominal} is negative. Enter the amount as a positive number and \
                        choose \"In\" or \"Out\" for the direction."
                    ),
                },
            ),
            Error::AmountOutOfRange(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!(
                        "{amount} is too large. Enter an amount no bigger than \
                        1,000,000,000,000,000."
                    ),
                },
            ),
            Error::InvalidGoal(goal_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid goal".to_owned(),
                    details: format!("Could not find a goal with the ID {goal_id:?}"),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The item could not be found. \
                    Try refreshing the page to see if it has been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingSheet => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update sheet".to_owned(),
                    details: "The sheet could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingSheet => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete sheet".to_owned(),
                    details: "The sheet could not be found. \
                    Try refreshing the page to see if the sheet has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingGoal => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update goal".to_owned(),
                    details: "The goal could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingGoal => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete goal".to_owned(),
                    details: "The goal could not be found. \
                    Try refreshing the page to see if the goal has already been deleted."
                        .to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn not_found_renders_404_page() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        for error in [
            Error::EmptyTitle,
            Error::NegativeNominal(-1),
            Error::AmountOutOfRange(i64::MAX),
            Error::InvalidGoal(Some(3)),
        ] {
            let response = error.into_alert_response();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn unexpected_errors_are_hidden_from_alerts() {
        let response = Error::DatabaseLockError.into_alert_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
