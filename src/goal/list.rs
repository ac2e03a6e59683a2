//! Displays the user's financial goals and where each one stands.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    goal::{GoalSummary, get_goal_summaries},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, currency, edit_delete_action_links, link,
    },
    navigation::NavBar,
};

/// The state needed for the goals page.
#[derive(Debug, Clone)]
pub struct GoalsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the goals page with each goal's current balance.
pub async fn get_goals_page(
    State(state): State<GoalsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_goal_summaries(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get goals for user {user_id}: {error}"))?;

    Ok(goals_view(&goals).into_response())
}

fn goal_row(summary: &GoalSummary) -> Markup {
    let goal = &summary.goal;
    let view_url = format_endpoint(endpoints::GOAL_VIEW, goal.id);
    let edit_url = format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id);
    let delete_url = format_endpoint(endpoints::GOAL_API, goal.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-goal-row="true"
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (link(&view_url, goal.title.as_ref()))
            }

            td class=(TABLE_CELL_STYLE) { (goal.goal_type.label()) }
            td class="px-6 py-4 text-right" data-column="target" { (currency(goal.target_amount)) }
            td class="px-6 py-4 text-right" data-column="balance" { (currency(summary.current_balance)) }
            td class="px-6 py-4 text-right" { (summary.transaction_count) }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &format!(
                            "Are you sure you want to delete the goal '{}'? \
                            Its transactions will be kept but no longer linked to a goal.",
                            goal.title
                        ),
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    }
}

fn goals_view(goals: &[GoalSummary]) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Goals" }

                    a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "New Goal" }
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class="px-6 py-3 text-right" { "Starting amount" }
                                th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                th scope="col" class="px-6 py-3 text-right" { "Transactions" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for summary in goals {
                                (goal_row(summary))
                            }

                            @if goals.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No goals yet. Create a goal "
                                        (link(endpoints::NEW_GOAL_VIEW, "here"))
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

    base("Goals", &content)
}

#[cfg(test)]
mod goals_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        goal::{GoalType, NewGoal, create_goal},
        ledger::TransactionType,
        sheet::create_sheet,
        test_utils::{
            assert_valid_html, create_test_user, get_test_connection, insert_test_transaction,
            parse_html_document,
        },
        title::Title,
    };

    use super::{GoalsPageState, get_goals_page};

    #[tokio::test]
    async fn shows_current_balance_of_each_goal() {
        let connection = get_test_connection();
        let user_id = create_test_user("budi@example.com", &connection);
        let now = OffsetDateTime::now_utc();
        let sheet = create_sheet(user_id, Title::new_unchecked("Maret"), None, now, &connection)
            .unwrap();
        let goal = create_goal(
            user_id,
            NewGoal {
                title: Title::new_unchecked("Pinjaman"),
                description: None,
                target_amount: 5_000_000,
                goal_type: GoalType::Debt,
            },
            now,
            &connection,
        )
        .unwrap();
        insert_test_transaction(
            sheet.id,
            Some(goal.id),
            TransactionType::Out,
            1_000_000,
            &connection,
        );
        let state = GoalsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_goals_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let rows: Vec<_> = html
            .select(&Selector::parse("tr[data-goal-row]").unwrap())
            .collect();
        assert_eq!(rows.len(), 1);
        let amount = |column: &str| {
            rows[0]
                .select(
                    &Selector::parse(&format!("td[data-column={column}] [data-amount]")).unwrap(),
                )
                .next()
                .and_then(|element| element.value().attr("data-amount"))
                .map(str::to_owned)
        };
        assert_eq!(amount("target").as_deref(), Some("5000000"));
        assert_eq!(amount("balance").as_deref(), Some("4000000"));
    }

    #[tokio::test]
    async fn does_not_show_other_users_goals() {
        let connection = get_test_connection();
        let user_id = create_test_user("budi@example.com", &connection);
        let other = create_test_user("sari@example.com", &connection);
        create_goal(
            other,
            NewGoal {
                title: Title::new_unchecked("Rahasia"),
                description: None,
                target_amount: 1,
                goal_type: GoalType::Saving,
            },
            OffsetDateTime::now_utc(),
            &connection,
        )
        .unwrap();
        let state = GoalsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_goals_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(
            html.select(&Selector::parse("tr[data-goal-row]").unwrap())
                .count(),
            0
        );
    }
}
