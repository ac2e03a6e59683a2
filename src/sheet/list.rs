//! Displays the user's sheets and how much money moved through each.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, currency, edit_delete_action_links, format_date_time, link,
    },
    navigation::NavBar,
    sheet::{SheetSummary, get_sheet_summaries},
    timezone::get_local_offset,
};

/// The state needed for the [get_sheets_page](crate::sheet::get_sheets_page) route handler.
#[derive(Debug, Clone)]
pub struct SheetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for SheetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the sheets page showing all of the user's sheets.
pub async fn get_sheets_page(
    State(state): State<SheetsPageState>,
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

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;
    let sheets = get_sheet_summaries(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get sheets for user {user_id}: {error}"))?;

    Ok(sheets_view(&user.email, &sheets, local_offset).into_response())
}

fn sheets_view(email: &str, sheets: &[SheetSummary], local_offset: UtcOffset) -> Markup {
    let nav_bar = NavBar::new(endpoints::SHEETS_VIEW).into_html();

    let table_row = |summary: &SheetSummary| {
        let sheet = &summary.sheet;
        let view_url = format_endpoint(endpoints::SHEET_VIEW, sheet.id);
        let edit_url = format_endpoint(endpoints::EDIT_SHEET_VIEW, sheet.id);
        let delete_url = format_endpoint(endpoints::SHEET_API, sheet.id);

        html!(
            tr class=(TABLE_ROW_STYLE) data-sheet-row="true"
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (link(&view_url, sheet.title.as_ref()))
                }

                td class="px-6 py-4 text-right" { (currency(summary.totals.total_in)) }
                td class="px-6 py-4 text-right" { (currency(summary.totals.total_out)) }
                td class="px-6 py-4 text-right" { (currency(summary.totals.net())) }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_date_time(sheet.created_at, local_offset))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &format!(
                                "Are you sure you want to delete the sheet '{}' and all of its \
                                transactions? This cannot be undone.",
                                sheet.title
                            ),
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Sheets" }
                        p class="text-sm text-gray-600 dark:text-gray-400" data-signed-in-as=(email)
                        {
                            "Signed in as " (email)
                        }
                    }

                    a href=(endpoints::NEW_SHEET_VIEW) class=(LINK_STYLE)
                    {
                        "New Sheet"
                    }
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
                                th scope="col" class="px-6 py-3 text-right" { "In" }
                                th scope="col" class="px-6 py-3 text-right" { "Out" }
                                th scope="col" class="px-6 py-3 text-right" { "Net" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for summary in sheets {
                                (table_row(summary))
                            }

                            @if sheets.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No sheets yet. Create a sheet "
                                        (link(endpoints::NEW_SHEET_VIEW, "here"))
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Sheets", &content)
}

#[cfg(test)]
mod sheets_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        endpoints::{self, format_endpoint},
        ledger::{MAX_AMOUNT, TransactionType},
        sheet::create_sheet,
        test_utils::{
            assert_valid_html, create_test_user, get_test_connection, insert_test_transaction,
            parse_html_document,
        },
        title::Title,
    };

    use super::{SheetsPageState, get_sheets_page};

    #[tokio::test]
    async fn lists_only_the_users_sheets_with_totals() {
        let connection = get_test_connection();
        let user_id = create_test_user("budi@example.com", &connection);
        let other = create_test_user("sari@example.com", &connection);
        let sheet = create_sheet(
            user_id,
            Title::new_unchecked("Maret 2025"),
            None,
            OffsetDateTime::now_utc(),
            &connection,
        )
        .unwrap();
        create_sheet(
            other,
            Title::new_unchecked("Rahasia"),
            None,
            OffsetDateTime::now_utc(),
            &connection,
        )
        .unwrap();
        insert_test_transaction(sheet.id, None, TransactionType::In, 2_000_000, &connection);
        insert_test_transaction(sheet.id, None, TransactionType::Out, 500_000, &connection);
        let state = SheetsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Asia/Jakarta".to_owned(),
        };

        let response = get_sheets_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let rows: Vec<_> = html
            .select(&Selector::parse("tr[data-sheet-row]").unwrap())
            .collect();
        assert_eq!(rows.len(), 1);

        let link = rows[0]
            .select(&Selector::parse("a").unwrap())
            .next()
            .unwrap();
        assert_eq!(
            link.value().attr("href"),
            Some(format_endpoint(endpoints::SHEET_VIEW, sheet.id).as_str())
        );
        assert_eq!(link.text().collect::<String>().trim(), "Maret 2025");

        let amounts: Vec<_> = rows[0]
            .select(&Selector::parse("[data-amount]").unwrap())
            .map(|element| element.value().attr("data-amount").unwrap().to_owned())
            .collect();
        assert_eq!(amounts, vec!["2000000", "500000", "1500000"]);

        let signed_in_as = html
            .select(&Selector::parse("[data-signed-in-as]").unwrap())
            .next()
            .and_then(|element| element.value().attr("data-signed-in-as"));
        assert_eq!(signed_in_as, Some("budi@example.com"));
    }

    #[tokio::test]
    async fn renders_totals_of_largest_amounts() {
        let connection = get_test_connection();
        let user_id = create_test_user("budi@example.com", &connection);
        let sheet = create_sheet(
            user_id,
            Title::new_unchecked("Warisan"),
            None,
            OffsetDateTime::now_utc(),
            &connection,
        )
        .unwrap();
        for _ in 0..5 {
            insert_test_transaction(sheet.id, None, TransactionType::In, MAX_AMOUNT, &connection);
        }
        for _ in 0..2 {
            insert_test_transaction(sheet.id, None, TransactionType::Out, MAX_AMOUNT, &connection);
        }
        let state = SheetsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Asia/Jakarta".to_owned(),
        };

        let response = get_sheets_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let amounts: Vec<_> = html
            .select(&Selector::parse("tr[data-sheet-row] [data-amount]").unwrap())
            .map(|element| element.value().attr("data-amount").unwrap().to_owned())
            .collect();
        assert_eq!(
            amounts,
            vec!["5000000000000000", "2000000000000000", "3000000000000000"]
        );
    }

    #[tokio::test]
    async fn shows_link_to_create_page_when_empty() {
        let connection = get_test_connection();
        let user_id = create_test_user("budi@example.com", &connection);
        let state = SheetsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_sheets_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let selector = Selector::parse(&format!(
            "td a[href=\"{}\"]",
            endpoints::NEW_SHEET_VIEW
        ))
        .unwrap();
        assert_eq!(html.select(&selector).count(), 1);
    }
}
