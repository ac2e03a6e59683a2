//! Alert fragments for telling the user whether an HTMX request worked.
//!
//! Alerts are swapped into the `#alert-container` element of the base page.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A success or error message, optionally with more details.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    SuccessSimple { message: String },
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    fn is_success(&self) -> bool {
        matches!(self, Alert::Success { .. } | Alert::SuccessSimple { .. })
    }

    fn message(&self) -> &str {
        match self {
            Alert::Success { message, .. }
            | Alert::SuccessSimple { message }
            | Alert::Error { message, .. }
            | Alert::ErrorSimple { message } => message,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Alert::Success { details, .. } | Alert::Error { details, .. } => Some(details),
            _ => None,
        }
    }

    pub fn into_html(self) -> Html<String> {
        Html(self.markup().into_string())
    }

    fn markup(&self) -> Markup {
        let style = if self.is_success() {
            "flex items-start p-4 mb-4 text-sm text-green-800 rounded-lg \
            bg-green-50 dark:bg-gray-800 dark:text-green-400 border \
            border-green-300 dark:border-green-800"
        } else {
            "flex items-start p-4 mb-4 text-sm text-red-800 rounded-lg \
            bg-red-50 dark:bg-gray-800 dark:text-red-400 border border-red-300 \
            dark:border-red-800"
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="font-semibold" { (self.message()) }

                        @if let Some(details) = self.details() {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-3 bg-transparent cursor-pointer"
                        aria-label="Close"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
