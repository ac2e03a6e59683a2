//! Sheet deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, auth::UserID, database_id::SheetId, sheet::delete_sheet,
};

/// The state needed to delete a sheet.
#[derive(Debug, Clone)]
pub struct DeleteSheetState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteSheetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a sheet and its transactions, responds with an alert.
pub async fn delete_sheet_endpoint(
    Path(sheet_id): Path<SheetId>,
    State(state): State<DeleteSheetState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_sheet(sheet_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Alert::SuccessSimple {
            message: "Sheet deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            if error != Error::DeleteMissingSheet {
                tracing::error!("Could not delete sheet {sheet_id}: {error}");
            }
            error.into_alert_response()
        }
    }
}
