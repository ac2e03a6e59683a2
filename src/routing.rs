//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, request_code_endpoint,
        verify_code_endpoint,
    },
    endpoints,
    goal::{
        create_goal_endpoint, delete_goal_endpoint, get_edit_goal_page, get_goal_page,
        get_goals_page, get_new_goal_page, update_goal_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    sheet::{
        create_sheet_endpoint, delete_sheet_endpoint, get_edit_sheet_page, get_new_sheet_page,
        get_sheet_page, get_sheets_page, update_sheet_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_edit_transaction_page,
        get_new_transaction_page, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::REQUEST_CODE_API, post(request_code_endpoint))
        .route(endpoints::VERIFY_CODE_API, post(verify_code_endpoint))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::SHEETS_VIEW, get(get_sheets_page))
        .route(endpoints::NEW_SHEET_VIEW, get(get_new_sheet_page))
        .route(endpoints::SHEET_VIEW, get(get_sheet_page))
        .route(endpoints::EDIT_SHEET_VIEW, get(get_edit_sheet_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::NEW_GOAL_VIEW, get(get_new_goal_page))
        .route(endpoints::GOAL_VIEW, get(get_goal_page))
        .route(endpoints::EDIT_GOAL_VIEW, get(get_edit_goal_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::SHEETS_API, post(create_sheet_endpoint))
            .route(
                endpoints::SHEET_API,
                put(update_sheet_endpoint).delete(delete_sheet_endpoint),
            )
            .route(
                endpoints::SHEET_TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::TRANSACTION_API,
                put(update_transaction_endpoint).delete(delete_transaction_endpoint),
            )
            .route(endpoints::GOALS_API, post(create_goal_endpoint))
            .route(
                endpoints::GOAL_API,
                put(update_goal_endpoint).delete(delete_goal_endpoint),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the sheets page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::SHEETS_VIEW)
}


#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        AppState,
        auth::{COOKIE_TOKEN, RecordingMailer},
        endpoints::{self, format_endpoint},
    };

    use super::build_router;

    const EMAIL: &str = "budi@example.com";

    fn get_test_server() -> (TestServer, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "foobar",
            "Asia/Jakarta",
            mailer.clone(),
        )
        .unwrap();
        let server = TestServer::new(build_router(state));

        (server, mailer)
    }

    async fn log_in(server: &TestServer, mailer: &RecordingMailer) -> Cookie<'static> {
        server
            .post(endpoints::REQUEST_CODE_API)
            .form(&vec![("email", EMAIL)])
            .await
            .assert_status_ok();
        let code = mailer.last_code_for(EMAIL).expect("no code was sent");

        let response = server
            .post(endpoints::VERIFY_CODE_API)
            .form(&vec![("email", EMAIL), ("code", code.as_str())])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::SHEETS_VIEW);
        response.cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn coffee_is_a_teapot() {
        let (server, _) = get_test_server();

        server
            .get(endpoints::COFFEE)
            .await
            .assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (server, _) = get_test_server();

        server
            .get("/definitely/not/a/page")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn private_page_redirects_to_log_in() {
        let (server, _) = get_test_server();

        let response = server.get(endpoints::GOALS_VIEW).await;

        response.assert_status_see_other();
        let expected_query =
            serde_urlencoded::to_string([("redirect_url", endpoints::GOALS_VIEW)]).unwrap();
        assert_eq!(
            response.header("location"),
            format!("{}?{}", endpoints::LOG_IN_VIEW, expected_query)
        );
    }

    #[tokio::test]
    async fn private_api_without_cookie_hx_redirects_to_log_in() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::SHEETS_API)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", endpoints::NEW_SHEET_VIEW)
            .form(&vec![("title", "Maret")])
            .await;

        let expected_query =
            serde_urlencoded::to_string([("redirect_url", endpoints::NEW_SHEET_VIEW)]).unwrap();
        assert_eq!(
            response.header("hx-redirect"),
            format!("{}?{}", endpoints::LOG_IN_VIEW, expected_query)
        );
    }

    #[tokio::test]
    async fn logged_in_user_can_track_a_debt_through_a_sheet() {
        let (server, mailer) = get_test_server();
        let cookie = log_in(&server, &mailer).await;

        let response = server
            .post(endpoints::SHEETS_API)
            .add_cookie(cookie.clone())
            .form(&vec![("title", "Maret")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        let sheet_url = response.header("hx-redirect").to_str().unwrap().to_owned();
        assert_eq!(sheet_url, format_endpoint(endpoints::SHEET_VIEW, 1));

        let response = server
            .post(endpoints::GOALS_API)
            .add_cookie(cookie.clone())
            .form(&vec![
                ("title", "Pinjaman"),
                ("target_amount", "1000000"),
                ("type", "debt"),
            ])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        let goal_url = response.header("hx-redirect").to_str().unwrap().to_owned();

        let response = server
            .post(&format_endpoint(endpoints::SHEET_TRANSACTIONS_API, 1))
            .add_cookie(cookie.clone())
            .form(&vec![
                ("type", "out"),
                ("nominal", "250000"),
                ("description", "Cicilan pertama"),
                ("goal_id", "1"),
            ])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), sheet_url.as_str());

        let response = server.get(&sheet_url).add_cookie(cookie.clone()).await;
        response.assert_status_ok();
        assert!(response.text().contains("Cicilan pertama"));

        let response = server.get(&goal_url).add_cookie(cookie).await;
        response.assert_status_ok();
        let html = Html::parse_document(&response.text());
        let balance = html
            .select(&Selector::parse("[data-summary=\"Balance\"] [data-amount]").unwrap())
            .next()
            .and_then(|element| element.value().attr("data-amount"))
            .map(str::to_owned);
        assert_eq!(balance, Some("750000".to_owned()));
    }

    #[tokio::test]
    async fn other_users_sheet_is_not_found() {
        let (server, mailer) = get_test_server();
        let cookie = log_in(&server, &mailer).await;
        server
            .post(endpoints::SHEETS_API)
            .add_cookie(cookie)
            .form(&vec![("title", "Maret")])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        server
            .post(endpoints::REQUEST_CODE_API)
            .form(&vec![("email", "sari@example.com")])
            .await
            .assert_status_ok();
        let code = mailer.last_code_for("sari@example.com").unwrap();
        let other_cookie = server
            .post(endpoints::VERIFY_CODE_API)
            .form(&vec![("email", "sari@example.com"), ("code", code.as_str())])
            .await
            .cookie(COOKIE_TOKEN);

        server
            .get(&format_endpoint(endpoints::SHEET_VIEW, 1))
            .add_cookie(other_cookie)
            .await
            .assert_status_not_found();
    }
}
