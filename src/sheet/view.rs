//! The page showing a single sheet and its transactions.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::{GoalId, SheetId},
    endpoints::{self, format_endpoint},
    goal::get_goals,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, currency, edit_delete_action_links, format_date_time, link, summary_card,
    },
    navigation::NavBar,
    sheet::{Sheet, SheetTotals, get_sheet, get_sheet_totals},
    timezone::get_local_offset,
    transaction::{Transaction, TransactionType, get_sheet_transactions},
};

/// The state needed for the sheet page.
#[derive(Debug, Clone)]
pub struct SheetPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for SheetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders a sheet with its totals and transactions, newest first.
pub async fn get_sheet_page(
    Path(sheet_id): Path<SheetId>,
    State(state): State<SheetPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let sheet = get_sheet(sheet_id, user_id, &connection)?;
    let transactions = get_sheet_transactions(sheet_id, &connection).inspect_err(|error| {
        tracing::error!("could not get transactions for sheet {sheet_id}: {error}")
    })?;
    let totals = get_sheet_totals(sheet_id, &connection)?;
    let goal_titles: HashMap<GoalId, String> = get_goals(user_id, &connection)?
        .into_iter()
        .map(|goal| (goal.id, goal.title.to_string()))
        .collect();

    Ok(sheet_view(&sheet, totals, &transactions, &goal_titles, local_offset).into_response())
}

fn transaction_row(
    transaction: &Transaction,
    goal_titles: &HashMap<GoalId, String>,
    local_offset: UtcOffset,
) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION_API, transaction.id);
    let amount_style = match transaction.transaction_type {
        TransactionType::In => "px-6 py-4 text-right text-green-700 dark:text-green-400",
        TransactionType::Out => "px-6 py-4 text-right",
    };
    let goal = transaction.goal_id.and_then(|goal_id| {
        goal_titles
            .get(&goal_id)
            .map(|title| (format_endpoint(endpoints::GOAL_VIEW, goal_id), title))
    });

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE) { (format_date_time(transaction.created_at, local_offset)) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(amount_style) data-type=(transaction.transaction_type.as_str())
            {
                (transaction.transaction_type.mark().as_str()) " " (currency(transaction.nominal))
            }
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some((goal_url, title)) = goal {
                    (link(&goal_url, title))
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        "Are you sure you want to delete this transaction? This cannot be undone.",
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    }
}

fn sheet_view(
    sheet: &Sheet,
    totals: SheetTotals,
    transactions: &[Transaction],
    goal_titles: &HashMap<GoalId, String>,
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::SHEET_VIEW).into_html();
    let new_transaction_url = format_endpoint(endpoints::NEW_TRANSACTION_VIEW, sheet.id);
    let edit_url = format_endpoint(endpoints::EDIT_SHEET_VIEW, sheet.id);

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-2"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { (sheet.title.as_ref()) }

                        @if let Some(description) = &sheet.description {
                            p class="text-sm text-gray-600 dark:text-gray-400" { (description) }
                        }
                    }

                    div class="flex gap-4"
                    {
                        a href=(edit_url) class=(LINK_STYLE) { "Edit Sheet" }
                        a href=(new_transaction_url) class=(LINK_STYLE) { "New Transaction" }
                    }
                }

                div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    (summary_card("In", totals.total_in))
                    (summary_card("Out", totals.total_out))
                    (summary_card("Net", totals.net()))
                }

                div class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class="px-6 py-3 text-right" { "Nominal" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Goal" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction, goal_titles, local_offset))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions yet. Add one "
                                        (link(&new_transaction_url, "here"))
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base(sheet.title.as_ref(), &content)
}
