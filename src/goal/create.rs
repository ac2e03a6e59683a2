//! Goal creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
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
    endpoints::{self, format_endpoint},
    goal::{
        CreateGoalFormData, NewGoal, check_target_amount, create_goal,
        form::{CreateGoalFormValues, create_goal_form},
    },
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    title::{Title, optional_text},
};

/// The state needed for creating a goal.
#[derive(Debug, Clone)]
pub struct CreateGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the goal creation page.
pub async fn get_new_goal_page() -> Response {
    new_goal_view().into_response()
}

fn new_goal_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_GOAL_VIEW).into_html();
    let form = create_goal_form(endpoints::GOALS_API, &CreateGoalFormValues::default());

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "New Goal" }
            (form)
        }
    };

    base("New Goal", &content)
}

/// Handle goal creation form submission, redirecting to the new goal on success.
pub async fn create_goal_endpoint(
    State(state): State<CreateGoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CreateGoalFormData>,
) -> Response {
    let description = optional_text(form.description.as_deref());

    let validated = Title::new(&form.title)
        .and_then(|title| check_target_amount(form.target_amount).map(|()| title));

    let title = match validated {
        Ok(title) => title,
        Err(error) => {
            return create_goal_form(
                endpoints::GOALS_API,
                &CreateGoalFormValues {
                    title: &form.title,
                    description: description.as_deref().unwrap_or_default(),
                    target_amount: Some(form.target_amount),
                    goal_type: form.goal_type,
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

    let new_goal = NewGoal {
        title,
        description,
        target_amount: form.target_amount,
        goal_type: form.goal_type,
    };

    match create_goal(user_id, new_goal, OffsetDateTime::now_utc(), &connection) {
        Ok(goal) => (
            HxRedirect(format_endpoint(endpoints::GOAL_VIEW, goal.id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a goal: {error}");
            error.into_alert_response()
        }
    }
}
