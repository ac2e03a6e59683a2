//! The page and endpoint for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    goal::{Goal, get_goals},
    html::{FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    transaction::{
        Transaction, TransactionFields, TransactionFormData,
        form::{TransactionFormAction, TransactionFormValues, transaction_form},
        get_transaction, update_transaction,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing a transaction.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    let goals = get_goals(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get goals for user {user_id}: {error}"))?;

    Ok(edit_transaction_view(&transaction, &goals).into_response())
}

fn edit_transaction_view(transaction: &Transaction, goals: &[Goal]) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let update_endpoint = format_endpoint(endpoints::TRANSACTION_API, transaction.id);
    let sheet_url = format_endpoint(endpoints::SHEET_VIEW, transaction.sheet_id);
    let form = transaction_form(
        TransactionFormAction::Update {
            endpoint: &update_endpoint,
        },
        &TransactionFormValues {
            transaction_type: transaction.transaction_type,
            nominal: Some(transaction.nominal),
            description: &transaction.description,
            goal_id: transaction.goal_id,
            error_message: None,
        },
        goals,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-2" { "Edit Transaction" }
            p class="mb-4 text-sm" { (link(&sheet_url, "Back to sheet")) }

            (form)
        }
    };

    base("Edit Transaction", &content)
}

/// A route handler for updating a transaction, redirects to the transaction's sheet on success.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
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

    let sheet_id = match get_transaction(transaction_id, user_id, &connection) {
        Ok(transaction) => transaction.sheet_id,
        Err(Error::NotFound) => return Error::UpdateMissingTransaction.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not get transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    match update_transaction(
        transaction_id,
        user_id,
        fields.clone(),
        OffsetDateTime::now_utc(),
        &connection,
    ) {
        Ok(()) => (
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
            let update_endpoint = format_endpoint(endpoints::TRANSACTION_API, transaction_id);

            transaction_form(
                TransactionFormAction::Update {
                    endpoint: &update_endpoint,
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
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        auth::UserID,
        database_id::{SheetId, TransactionId},
        endpoints::{self, format_endpoint},
        goal::{GoalType, NewGoal, create_goal},
        ledger::TransactionType,
        sheet::create_sheet,
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, create_test_user, get_test_connection,
            insert_test_transaction, must_get_form, parse_html_document, parse_html_fragment,
        },
        title::Title,
        transaction::{TransactionFormData, get_transaction},
    };

    use super::{EditTransactionState, get_edit_transaction_page, update_transaction_endpoint};

    fn get_test_state() -> (EditTransactionState, UserID, SheetId, TransactionId) {
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
        let transaction_id =
            insert_test_transaction(sheet.id, None, TransactionType::Out, 45_000, &connection);

        (
            EditTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
            sheet.id,
            transaction_id,
        )
    }

    #[tokio::test]
    async fn edit_page_is_prefilled() {
        let (state, user_id, _, transaction_id) = get_test_state();

        let response =
            get_edit_transaction_page(Path(transaction_id), State(state), Extension(user_id))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::TRANSACTION_API, transaction_id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "nominal", "number", "45000");
        let checked = form
            .select(&Selector::parse("input[name=type][checked]").unwrap())
            .next()
            .and_then(|input| input.value().attr("value"));
        assert_eq!(checked, Some("out"));
    }

    #[tokio::test]
    async fn edit_page_for_other_users_transaction_is_not_found() {
        let (state, _, _, transaction_id) = get_test_state();
        let other = create_test_user("sari@example.com", &state.db_connection.lock().unwrap());

        let response =
            get_edit_transaction_page(Path(transaction_id), State(state), Extension(other))
                .await
                .unwrap_err()
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn can_update_transaction_and_link_goal() {
        let (state, user_id, sheet_id, transaction_id) = get_test_state();
        let goal = create_goal(
            user_id,
            NewGoal {
                title: Title::new_unchecked("Cicilan motor"),
                description: None,
                target_amount: 12_000_000,
                goal_type: GoalType::Debt,
            },
            OffsetDateTime::now_utc(),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = TransactionFormData {
            transaction_type: TransactionType::Out,
            nominal: 1_000_000,
            description: "Cicilan April".to_owned(),
            goal_id: Some(goal.id),
        };

        let response = update_transaction_endpoint(
            Path(transaction_id),
            State(state.clone()),
            Extension(user_id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, &format_endpoint(endpoints::SHEET_VIEW, sheet_id));
        let transaction =
            get_transaction(transaction_id, user_id, &state.db_connection.lock().unwrap())
                .unwrap();
        assert_eq!(transaction.nominal, 1_000_000);
        assert_eq!(transaction.goal_id, Some(goal.id));
        assert_eq!(transaction.description, "Cicilan April");
    }

    #[tokio::test]
    async fn negative_nominal_rerenders_form_with_error() {
        let (state, user_id, _, transaction_id) = get_test_state();
        let form = TransactionFormData {
            transaction_type: TransactionType::Out,
            nominal: -1,
            description: String::new(),
            goal_id: None,
        };

        let response = update_transaction_endpoint(
            Path(transaction_id),
            State(state),
            Extension(user_id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_form_error_message(
            &must_get_form(&html),
            "Error: -1 is negative, the nominal amount must be zero or more",
        );
    }

    #[tokio::test]
    async fn update_missing_transaction_returns_not_found() {
        let (state, user_id, _, _) = get_test_state();
        let form = TransactionFormData {
            transaction_type: TransactionType::Out,
            nominal: 1,
            description: String::new(),
            goal_id: None,
        };

        let response =
            update_transaction_endpoint(Path(999), State(state), Extension(user_id), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
