//! Goal deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, auth::UserID, database_id::GoalId, goal::delete_goal,
};

/// The state needed to delete a goal.
#[derive(Debug, Clone)]
pub struct DeleteGoalState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a goal, responds with an alert.
///
/// The goal's transactions are kept and unlinked from the goal.
pub async fn delete_goal_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<DeleteGoalState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_goal(goal_id, user_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Goal deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            if error != Error::DeleteMissingGoal {
                tracing::error!("Could not delete goal {goal_id}: {error}");
            }
            error.into_alert_response()
        }
    }
}
