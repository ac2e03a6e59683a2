//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/sheets/{sheet_id}', use [format_endpoint].

/// The root route which redirects to the sheets page.
pub const ROOT: &str = "/";
/// The page listing the user's sheets.
pub const SHEETS_VIEW: &str = "/sheets";
/// The page for creating a new sheet.
pub const NEW_SHEET_VIEW: &str = "/sheets/new";
/// The page showing a sheet and its transactions.
pub const SHEET_VIEW: &str = "/sheets/{sheet_id}";
/// The page for editing a sheet.
pub const EDIT_SHEET_VIEW: &str = "/sheets/{sheet_id}/edit";
/// The page for adding a transaction to a sheet.
pub const NEW_TRANSACTION_VIEW: &str = "/sheets/{sheet_id}/transactions/new";
/// The page for editing a transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page listing the user's financial goals.
pub const GOALS_VIEW: &str = "/goals";
/// The page for creating a new financial goal.
pub const NEW_GOAL_VIEW: &str = "/goals/new";
/// The page showing a goal and its ledger.
pub const GOAL_VIEW: &str = "/goals/{goal_id}";
/// The page for editing a goal.
pub const EDIT_GOAL_VIEW: &str = "/goals/{goal_id}/edit";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for requesting a one-time log-in code by email.
pub const REQUEST_CODE_API: &str = "/api/log_in/code";
/// The route for verifying a one-time log-in code.
pub const VERIFY_CODE_API: &str = "/api/log_in/verify";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create a sheet.
pub const SHEETS_API: &str = "/api/sheets";
/// The route to update or delete a sheet.
pub const SHEET_API: &str = "/api/sheets/{sheet_id}";
/// The route to create a transaction in a sheet.
pub const SHEET_TRANSACTIONS_API: &str = "/api/sheets/{sheet_id}/transactions";
/// The route to update or delete a transaction.
pub const TRANSACTION_API: &str = "/api/transactions/{transaction_id}";
/// The route to create a goal.
pub const GOALS_API: &str = "/api/goals";
/// The route to update or delete a goal.
pub const GOAL_API: &str = "/api/goals/{goal_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/sheets/{sheet_id}', '{sheet_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
