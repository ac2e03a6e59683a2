//! Authentication middleware that validates cookies, extends sessions, and handles redirects.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How far into the future each authenticated request pushes the cookie expiry.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How an unauthenticated client is sent to the log-in page.
#[derive(Debug, Clone, Copy)]
enum LogInRedirect {
    /// A 303 redirect, for full page loads.
    Page,
    /// An `HX-Redirect` header, for requests made by htmx.
    Htmx,
}

impl LogInRedirect {
    fn respond(self, log_in_url: String) -> Response {
        match self {
            LogInRedirect::Page => Redirect::to(&log_in_url).into_response(),
            LogInRedirect::Htmx => (HxRedirect(log_in_url), StatusCode::OK).into_response(),
        }
    }
}

/// The log-in URL that brings the user back to the page they were after.
fn log_in_url_for(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to sheets."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to sheets.");
        }

        build_log_in_redirect_url_from_target(endpoints::SHEETS_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

/// Copy the `Set-Cookie` headers produced by `jar` onto `response`.
fn append_cookies(response: &mut Response, jar: PrivateCookieJar) {
    let jar_response = jar.into_response();

    for value in jar_response.headers().get_all(SET_COOKIE) {
        response.headers_mut().append(SET_COOKIE, value.clone());
    }
}

/// Let the request through with a `UserID` extension if the auth cookie is
/// valid, and push the cookie expiry forward afterwards.
async fn guard(
    state: AuthState,
    request: Request,
    next: Next,
    redirect: LogInRedirect,
) -> Response {
    let log_in_url = log_in_url_for(&request);
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Error getting local timezone. Redirecting to log in page.");
        return redirect.respond(log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return redirect.respond(log_in_url);
        }
    };
    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(error) => {
            tracing::debug!("Rejected auth cookie: {error}");
            return redirect.respond(log_in_url);
        }
    };

    parts.extensions.insert(user_id);
    let mut response = next.run(Request::from_parts(parts, body)).await;

    match extend_auth_cookie_duration_if_needed(jar, state.cookie_duration, local_offset) {
        Ok(jar) => append_cookies(&mut response, jar),
        Err(error) => tracing::error!("Could not extend the auth cookie, leaving it as is: {error}"),
    }

    response
}

/// Guard for pages: unauthenticated requests get a 303 redirect to the log-in page.
///
/// Route handlers receive the user with `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, LogInRedirect::Page).await
}

/// Guard for `/api` routes: unauthenticated requests get an `HX-Redirect` to
/// the log-in page that returns to the page the request came from.
///
/// Route handlers receive the user with `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, LogInRedirect::Htmx).await
}
