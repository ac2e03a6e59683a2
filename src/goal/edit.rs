//! Goal editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::GoalId,
    endpoints::{self, format_endpoint},
    goal::{
        EditGoalFormData, Goal,
        form::{EditGoalFormValues, edit_goal_form},
        get_goal, update_goal,
    },
    html::{FORM_CONTAINER_STYLE, base, currency},
    navigation::NavBar,
    title::{Title, optional_text},
};

/// The state needed for the edit goal page and endpoint.
#[derive(Debug, Clone)]
pub struct EditGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the goal editing page.
pub async fn get_edit_goal_page(
    Path(goal_id): Path<GoalId>,
    State(state): State<EditGoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = get_goal(goal_id, user_id, &connection)?;

    Ok(edit_goal_view(&goal).into_response())
}

fn edit_goal_view(goal: &Goal) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_GOAL_VIEW).into_html();
    let update_endpoint = format_endpoint(endpoints::GOAL_API, goal.id);
    let form = edit_goal_form(
        &update_endpoint,
        &EditGoalFormValues {
            title: goal.title.as_ref(),
            description: goal.description.as_deref().unwrap_or_default(),
            error_message: None,
        },
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-2" { "Edit Goal" }
            p class="mb-4 text-sm text-gray-600 dark:text-gray-400"
            {
                (goal.goal_type.label()) " starting at " (currency(goal.target_amount))
            }
            (form)
        }
    };

    base("Edit Goal", &content)
}

/// Handle goal update form submission, redirecting to the goal on success.
pub async fn update_goal_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<EditGoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<EditGoalFormData>,
) -> Response {
    let description = optional_text(form.description.as_deref());

    let title = match Title::new(&form.title) {
        Ok(title) => title,
        Err(error) => {
            return edit_goal_form(
                &format_endpoint(endpoints::GOAL_API, goal_id),
                &EditGoalFormValues {
                    title: &form.title,
                    description: description.as_deref().unwrap_or_default(),
                    error_message: Some(&format!("Error: {error}")),
                },
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_goal(
        goal_id,
        user_id,
        title,
        description,
        OffsetDateTime::now_utc(),
        &connection,
    ) {
        Ok(()) => (
            HxRedirect(format_endpoint(endpoints::GOAL_VIEW, goal_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingGoal) => Error::UpdateMissingGoal.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating goal {goal_id}: {error}");
            error.into_alert_response()
        }
    }
}
