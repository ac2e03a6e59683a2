//! This file defines the routes for displaying the log-in page and handling the
//! two steps of logging in: requesting a one-time code and verifying it.
//! The rest of the auth module handles the lower level cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{
        Mailer, OneTimeCode, get_or_create_user, invalidate_auth_cookie, normalize_email,
        parse_redirect_url, set_auth_cookie, store_one_time_code, verify_one_time_code,
    },
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base, log_in_card, submit_button},
    timezone::get_local_offset,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";
pub const INCORRECT_CODE_ERROR_MSG: &str = "Incorrect code. Check your email and try again.";
pub const EXPIRED_CODE_ERROR_MSG: &str = "That code has expired. Request a new one.";
pub const TOO_MANY_ATTEMPTS_ERROR_MSG: &str =
    "Too many incorrect attempts. Request a new code.";
pub const DELIVERY_ERROR_MSG: &str = "Could not send the code. Please try again later.";
pub const TOO_MANY_REQUESTS_ERROR_MSG: &str =
    "Too many codes have been sent to this address. Wait an hour and try again.";

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
    /// Delivers one-time codes to users.
    pub mailer: Arc<dyn Mailer>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
            mailer: state.mailer.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// Fields shared by both log-in forms so that they survive the round trip.
struct CarriedFields<'a> {
    redirect_url: Option<&'a str>,
    remember_me: bool,
}

fn error_message(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p class="text-red-500 text-base" { (message) }
        }
    }
}

fn email_form(email: &str, message: Option<&str>, carried: &CarriedFields) -> Markup {
    html! {
        form
            hx-post=(endpoints::REQUEST_CODE_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = carried.redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    value=(email)
                    placeholder="nama@contoh.com"
                    autocomplete="email"
                    required
                    autofocus
                    tabindex="0"
                    class=(FORM_TEXT_INPUT_STYLE);

                (error_message(message))
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    checked[carried.remember_me]
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            (submit_button("Send me a code"))
        }
    }
}

fn code_form(email: &str, message: Option<&str>, carried: &CarriedFields) -> Markup {
    html! {
        form
            hx-post=(endpoints::VERIFY_CODE_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#code, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            input type="hidden" name="email" value=(email);

            @if let Some(redirect_url) = carried.redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            @if carried.remember_me {
                input type="hidden" name="remember_me" value="on";
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "We sent a six digit code to " strong { (email) } "."
            }

            div
            {
                label for="code" class=(FORM_LABEL_STYLE) { "Code" }

                input
                    type="text"
                    name="code"
                    id="code"
                    inputmode="numeric"
                    pattern="[0-9]{6}"
                    maxlength="6"
                    autocomplete="one-time-code"
                    required
                    autofocus
                    tabindex="0"
                    class=(FORM_TEXT_INPUT_STYLE);

                (error_message(message))
            }

            (submit_button("Log in"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Wrong address? "
                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                    "Use a different email"
                }
            }
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let carried = CarriedFields {
        redirect_url: redirect_url.as_deref(),
        remember_me: false,
    };
    let content = log_in_card("Log in to your account", &email_form("", None, &carried));

    base("Log In", &content).into_response()
}

/// The data submitted when asking for a one-time code.
#[derive(Clone, Serialize, Deserialize)]
pub struct RequestCodeData {
    pub email: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set.
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Handler for one-time code requests via the POST method.
///
/// Generates a code for the email address, stores its hash and hands the code
/// to the mailer. Responds with the code-entry form, or the email form with an
/// error message if the address is invalid or the code could not be sent.
pub async fn request_code_endpoint(
    State(state): State<LogInState>,
    Form(form): Form<RequestCodeData>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "code request form");
    let carried = CarriedFields {
        redirect_url: redirect_url.as_deref(),
        remember_me: form.remember_me.is_some(),
    };
    let email = normalize_email(&form.email);

    if !EmailAddress::is_valid(&email) {
        let message = Error::InvalidEmail(form.email.trim().to_owned()).to_string();
        return email_form(form.email.trim(), Some(&message), &carried).into_response();
    }

    let code = OneTimeCode::generate();
    let stored = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            store_one_time_code(&email, &code, OffsetDateTime::now_utc(), &connection)
        });

    match stored {
        Ok(()) => {}
        Err(Error::TooManyCodeRequests) => {
            return email_form(&email, Some(TOO_MANY_REQUESTS_ERROR_MSG), &carried)
                .into_response();
        }
        Err(error) => {
            tracing::error!("Could not store one-time code for {email}: {error}");
            return email_form(&email, Some(INTERNAL_ERROR_MSG), &carried).into_response();
        }
    }

    if let Err(error) = state.mailer.send_one_time_code(&email, code.as_str()) {
        tracing::error!("Could not send one-time code to {email}: {error}");
        return email_form(&email, Some(DELIVERY_ERROR_MSG), &carried).into_response();
    }

    code_form(&email, None, &carried).into_response()
}

/// The data submitted when entering a one-time code.
#[derive(Clone, Serialize, Deserialize)]
pub struct VerifyCodeData {
    pub email: String,
    pub code: String,
    /// See [RequestCodeData::remember_me].
    pub remember_me: Option<String>,
    pub redirect_url: Option<String>,
}

/// Handler for one-time code verification via the POST method.
///
/// On success the user is created if this is their first log-in, the auth
/// cookie is set and the client is redirected to the page they originally
/// wanted, or the sheets page. Otherwise the appropriate form is returned with
/// an error message explaining the problem.
pub async fn verify_code_endpoint(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(form): Form<VerifyCodeData>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "code verify form");
    let carried = CarriedFields {
        redirect_url: redirect_url.as_deref(),
        remember_me: form.remember_me.is_some(),
    };
    let email = normalize_email(&form.email);
    let now = OffsetDateTime::now_utc();

    let user = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            verify_one_time_code(&email, &form.code, now, &connection)?;
            get_or_create_user(&email, now, &connection)
        });

    let user = match user {
        Ok(user) => user,
        Err(Error::InvalidOneTimeCode) => {
            return code_form(&email, Some(INCORRECT_CODE_ERROR_MSG), &carried).into_response();
        }
        Err(Error::OneTimeCodeExpired) => {
            return email_form(&email, Some(EXPIRED_CODE_ERROR_MSG), &carried).into_response();
        }
        Err(Error::TooManyCodeAttempts) => {
            return email_form(&email, Some(TOO_MANY_ATTEMPTS_ERROR_MSG), &carried)
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying one-time code: {error}");
            return code_form(&email, Some(INTERNAL_ERROR_MSG), &carried).into_response();
        }
    };

    let cookie_duration = if carried.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let redirect_url = carried.redirect_url.unwrap_or(endpoints::SHEETS_VIEW);

    set_auth_cookie(jar.clone(), user.id, cookie_duration, local_offset)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}
