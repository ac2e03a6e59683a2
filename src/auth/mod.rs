//! Email one-time code log-in, the session cookie and the middleware that guards private pages.

mod cookie;
mod log_in;
mod log_out;
mod mailer;
mod middleware;
mod one_time_code;
mod redirect;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, request_code_endpoint, verify_code_endpoint};
pub use log_out::get_log_out;
pub use mailer::{LogMailer, Mailer};
pub use middleware::{auth_guard, auth_guard_hx};
pub use one_time_code::{
    OneTimeCode, create_one_time_code_table, store_one_time_code, verify_one_time_code,
};
pub(crate) use redirect::parse_redirect_url;
pub(super) use token::Token;
pub use user::{UserID, create_user_table, get_or_create_user, get_user_by_id, normalize_email};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use mailer::RecordingMailer;

#[cfg(test)]
pub use one_time_code::{MAX_CODE_ATTEMPTS, MAX_CODE_REQUESTS};

#[cfg(test)]
pub use middleware::AuthState;
