//! Sheet creation page and endpoint.

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
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    sheet::{
        SheetFormData, create_sheet,
        form::{SheetFormAction, SheetFormValues, sheet_form},
    },
    title::{Title, optional_text},
};

/// The state needed for creating a sheet.
#[derive(Debug, Clone)]
pub struct CreateSheetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateSheetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the sheet creation page.
pub async fn get_new_sheet_page() -> Response {
    new_sheet_view().into_response()
}

fn new_sheet_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_SHEET_VIEW).into_html();
    let form = new_sheet_form_view("", "", None);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "New Sheet" }
            (form)
        }
    };

    base("New Sheet", &content)
}

fn new_sheet_form_view(title: &str, description: &str, error_message: Option<&str>) -> Markup {
    sheet_form(
        SheetFormAction::Create {
            endpoint: endpoints::SHEETS_API,
        },
        &SheetFormValues {
            title,
            description,
            error_message,
        },
    )
}

/// Handle sheet creation form submission, redirecting to the new sheet on success.
pub async fn create_sheet_endpoint(
    State(state): State<CreateSheetEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<SheetFormData>,
) -> Response {
    let description = optional_text(form.description.as_deref());

    let title = match Title::new(&form.title) {
        Ok(title) => title,
        Err(error) => {
            return new_sheet_form_view(
                &form.title,
                description.as_deref().unwrap_or_default(),
                Some(&format!("Error: {error}")),
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

    match create_sheet(
        user_id,
        title,
        description,
        OffsetDateTime::now_utc(),
        &connection,
    ) {
        Ok(sheet) => (
            HxRedirect(format_endpoint(endpoints::SHEET_VIEW, sheet.id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a sheet: {error}");

            error.into_alert_response()
        }
    }
}
