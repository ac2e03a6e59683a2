//! The page and endpoint for recording a new transaction in a sheet.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::SheetId,
    endpoints::{self, format_endpoint},
    goal::{Goal, get_goals},
    html::{FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    sheet::{Sheet, get_sheet},
    transaction::{
        TransactionFields, TransactionFormData, create_transaction,
        form::{TransactionFormAction, TransactionFormValues, transaction_form},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for adding a transaction to a sheet.
pub async fn get_new_transaction_page(
    Path(sheet_id): Path<SheetId>,
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let sheet = get_sheet(sheet_id, user_id, &connection)?;
    let goals = get_goals(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get goals for user {user_id}: {error}"))?;

    Ok(new_transaction_view(&sheet, &goals).into_response())
}

fn new_transaction_view(sheet: &Sheet, goals: &[Goal]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let create_endpoint = format_endpoint(endpoints::SHEET_TRANSACTIONS_API, sheet.id);
    let sheet_url = format_endpoint(endpoints::SHEET_VIEW, sheet.id);
    let form = transaction_form(
        TransactionFormAction::Create {
            endpoint: &create_endpoint,
        },
        &TransactionFormValues::default(),
        goals,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-2" { "New Transaction" }
            p class="mb-4 text-sm" { "In " (link(&sheet_url, sheet.title.as_ref())) }

            (form)
        }
    };

    base("New Transaction", &content)
}

/// A route handler for creating a new transaction, redirects to the sheet on success.
///
/// An invalid nominal amount or goal re-renders the form with an error message.
pub async fn create_transaction_endpoint(
    Path(sheet_id): Path<SheetId>,
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let fields = TransactionFields::from(form);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(
        sheet_id,
        user_id,
        fields.clone(),
        OffsetDateTime::now_utc(),
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(format_endpoint(endpoints::SHEET_VIEW, sheet_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::NegativeNominal(_) | Error::AmountOutOfRange(_) | Error::InvalidGoal(_)),
        ) => {
            let goals = match get_goals(user_id, &connection) {
                Ok(goals) => goals,
                Err(error) => return error.into_alert_response(),
            };
            let create_endpoint = format_endpoint(endpoints::SHEET_TRANSACTIONS_API, sheet_id);

            transaction_form(
                TransactionFormAction::Create {
                    endpoint: &create_endpoint,
                },
                &TransactionFormValues {
                    transaction_type: fields.transaction_type,
                    nominal: Some(fields.nominal),
                    description: &fields.description,
                    goal_id: fields.goal_id,
                    error_message: Some(&format!("Error: {error}")),
                },
                &goals,
            )
            .into_response()
        }
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while creating a transaction in sheet {sheet_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod new_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use time::OffsetDateTime;

    use crate::{
        endpoints::{self, format_endpoint},
        sheet::create_sheet,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            create_test_user, get_test_connection, must_get_form, parse_html_document,
        },
        title::Title,
    };

    use super::{CreateTransactionState, get_new_transaction_page};

    #[tokio::test]
    async fn render_page() {
        let connection = get_test_connection();
        let user_id = create_test_user("budi@example.com", &connection);
        let sheet = create_sheet(
            user_id,
            Title::new_unchecked("Maret"),
            None,
            OffsetDateTime::now_utc(),
            &connection,
        )
        .unwrap();
        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_new_transaction_page(Path(sheet.id), State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::SHEET_TRANSACTIONS_API, sheet.id),
            "hx-post",
        );
        assert_form_input(&form, "nominal", "number");
        assert_form_input(&form, "type", "radio");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn other_users_sheet_is_not_found() {
        let connection = get_test_connection();
        let owner = create_test_user("budi@example.com", &connection);
        let other = create_test_user("sari@example.com", &connection);
        let sheet = create_sheet(
            owner,
            Title::new_unchecked("Maret"),
            None,
            OffsetDateTime::now_utc(),
            &connection,
        )
        .unwrap();
        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_new_transaction_page(Path(sheet.id), State(state), Extension(other))
            .await
            .unwrap_err()
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
