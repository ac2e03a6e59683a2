//! The page showing a goal and the ledger of how its balance got to where it is.

use std::sync::{Arc, Mutex};

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
    database_id::{GoalId, TransactionId},
    endpoints::{self, format_endpoint},
    goal::{Goal, get_goal},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, currency, format_date_time, link, summary_card,
    },
    ledger::{Ledger, LedgerEntry, LedgerTransaction},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{Transaction, get_goal_transactions},
};

/// The state needed for the goal page.
#[derive(Debug, Clone)]
pub struct GoalPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for GoalPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders a goal with its ledger, oldest transaction first.
pub async fn get_goal_page(
    Path(goal_id): Path<GoalId>,
    State(state): State<GoalPageState>,
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

    let goal = get_goal(goal_id, user_id, &connection)?;
    let transactions = get_goal_transactions(goal_id, &connection).inspect_err(|error| {
        tracing::error!("could not get transactions for goal {goal_id}: {error}")
    })?;
    let ledger = goal.ledger(transactions.iter().map(LedgerTransaction::from));

    Ok(goal_view(&goal, &ledger, &transactions, local_offset).into_response())
}

fn ledger_row(
    entry: &LedgerEntry<TransactionId>,
    transaction: &Transaction,
    local_offset: UtcOffset,
) -> Markup {
    let sheet_url = format_endpoint(endpoints::SHEET_VIEW, transaction.sheet_id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-ledger-row=(entry.source_id)
        {
            td class=(TABLE_CELL_STYLE) { (format_date_time(transaction.created_at, local_offset)) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class="px-6 py-4 text-right" data-column="previous"
            {
                (currency(entry.previous_balance))
            }
            td class="px-6 py-4 text-right whitespace-nowrap" data-column="nominal"
            {
                span data-mark=(entry.mark.as_str()) { (entry.mark.as_str()) }
                " "
                (currency(entry.nominal))
            }
            td class="px-6 py-4 text-right font-medium" data-column="resulting"
            {
                (currency(entry.resulting_balance))
            }
            td class=(TABLE_CELL_STYLE) { (link(&sheet_url, "Open sheet")) }
        }
    }
}

fn goal_view(
    goal: &Goal,
    ledger: &Ledger<TransactionId>,
    transactions: &[Transaction],
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();
    let edit_url = format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id);

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
                        h1 class="text-xl font-bold" { (goal.title.as_ref()) }
                        p class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            (goal.goal_type.label())
                            @if let Some(description) = &goal.description {
                                " · " (description)
                            }
                        }
                    }

                    a href=(edit_url) class=(LINK_STYLE) { "Edit Goal" }
                }

                div class="grid grid-cols-2 sm:grid-cols-4 gap-4"
                {
                    (summary_card("Starting amount", ledger.starting_balance))
                    (summary_card("In", ledger.total_in))
                    (summary_card("Out", ledger.total_out))
                    (summary_card("Balance", ledger.final_balance))
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
                                th scope="col" class="px-6 py-3 text-right" { "Before" }
                                th scope="col" class="px-6 py-3 text-right" { "Change" }
                                th scope="col" class="px-6 py-3 text-right" { "After" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Sheet" }
                            }
                        }

                        tbody
                        {
                            @for (entry, transaction) in ledger.entries.iter().zip(transactions) {
                                (ledger_row(entry, transaction, local_offset))
                            }

                            @if ledger.entries.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions are linked to this goal yet. \
                                        Pick this goal when adding a transaction to a sheet."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base(goal.title.as_ref(), &content)
}
