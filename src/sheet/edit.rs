//! Sheet editing page and endpoint.

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
    database_id::SheetId,
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    sheet::{
        Sheet, SheetFormData,
        form::{SheetFormAction, SheetFormValues, sheet_form},
        get_sheet, update_sheet,
    },
    title::{Title, optional_text},
};

/// The state needed for the edit sheet page and endpoint.
#[derive(Debug, Clone)]
pub struct EditSheetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditSheetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the sheet editing page.
pub async fn get_edit_sheet_page(
    Path(sheet_id): Path<SheetId>,
    State(state): State<EditSheetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let sheet = get_sheet(sheet_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve sheet {sheet_id}: {error}");
        }
    })?;

    Ok(edit_sheet_view(&sheet).into_response())
}

fn edit_sheet_view(sheet: &Sheet) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_SHEET_VIEW).into_html();
    let update_endpoint = format_endpoint(endpoints::SHEET_API, sheet.id);
    let form = sheet_form(
        SheetFormAction::Update {
            endpoint: &update_endpoint,
        },
        &SheetFormValues {
            title: sheet.title.as_ref(),
            description: sheet.description.as_deref().unwrap_or_default(),
            error_message: None,
        },
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Edit Sheet" }
            (form)
        }
    };

    base("Edit Sheet", &content)
}

/// Handle sheet update form submission, redirecting to the sheet on success.
pub async fn update_sheet_endpoint(
    Path(sheet_id): Path<SheetId>,
    State(state): State<EditSheetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<SheetFormData>,
) -> Response {
    let description = optional_text(form.description.as_deref());
    let update_endpoint = format_endpoint(endpoints::SHEET_API, sheet_id);

    let title = match Title::new(&form.title) {
        Ok(title) => title,
        Err(error) => {
            return sheet_form(
                SheetFormAction::Update {
                    endpoint: &update_endpoint,
                },
                &SheetFormValues {
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

    match update_sheet(
        sheet_id,
        user_id,
        title,
        description,
        OffsetDateTime::now_utc(),
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(format_endpoint(endpoints::SHEET_VIEW, sheet_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingSheet) => Error::UpdateMissingSheet.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating sheet {sheet_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
