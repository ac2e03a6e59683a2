//! The form fields shared by the create and edit sheet pages.

use maud::{Markup, html};

use crate::html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, submit_button};

/// Which HTMX verb the form submits with.
pub enum SheetFormAction<'a> {
    Create { endpoint: &'a str },
    Update { endpoint: &'a str },
}

pub struct SheetFormValues<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub error_message: Option<&'a str>,
}

pub fn sheet_form(action: SheetFormAction<'_>, values: &SheetFormValues<'_>) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        SheetFormAction::Create { endpoint } => (Some(endpoint), None, "Create Sheet"),
        SheetFormAction::Update { endpoint } => (None, Some(endpoint), "Save Sheet"),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="title" class=(FORM_LABEL_STYLE) { "Title" }

                input
                    id="title"
                    type="text"
                    name="title"
                    placeholder="e.g. Maret 2025"
                    value=(values.title)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                textarea
                    id="description"
                    name="description"
                    rows="3"
                    placeholder="Optional notes about this period"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (values.description)
                }
            }

            @if let Some(error_message) = values.error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            (submit_button(button_text))
        }
    }
}
