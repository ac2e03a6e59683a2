//! The forms for creating and editing goals.
//!
//! The target amount and type are only part of the create form since they
//! cannot be changed once transactions have been replayed against them.

use maud::{Markup, html};

use crate::{
    goal::GoalType,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, submit_button,
    },
    ledger::MAX_AMOUNT,
};

pub struct CreateGoalFormValues<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub target_amount: Option<i64>,
    pub goal_type: GoalType,
    pub error_message: Option<&'a str>,
}

impl Default for CreateGoalFormValues<'_> {
    fn default() -> Self {
        Self {
            title: "",
            description: "",
            target_amount: None,
            goal_type: GoalType::Debt,
            error_message: None,
        }
    }
}

pub struct EditGoalFormValues<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub error_message: Option<&'a str>,
}

fn title_and_description_fields(title: &str, description: &str) -> Markup {
    html! {
        div
        {
            label for="title" class=(FORM_LABEL_STYLE) { "Title" }

            input
                id="title"
                type="text"
                name="title"
                placeholder="e.g. Cicilan motor"
                value=(title)
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
                class=(FORM_TEXT_INPUT_STYLE)
            {
                (description)
            }
        }
    }
}

fn error_paragraph(error_message: Option<&str>) -> Markup {
    html! {
        @if let Some(error_message) = error_message {
            p class="text-red-600 dark:text-red-400" { (error_message) }
        }
    }
}

pub fn create_goal_form(endpoint: &str, values: &CreateGoalFormValues<'_>) -> Markup {
    html! {
        form
            hx-post=(endpoint)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            (title_and_description_fields(values.title, values.description))

            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for goal_type in [GoalType::Debt, GoalType::Saving] {
                        div class="flex items-center gap-3"
                        {
                            input
                                name="type"
                                id={ "goal-type-" (goal_type.as_str()) }
                                type="radio"
                                value=(goal_type.as_str())
                                checked[goal_type == values.goal_type]
                                required
                                tabindex="0"
                                class=(FORM_RADIO_INPUT_STYLE);

                            label
                                for={ "goal-type-" (goal_type.as_str()) }
                                class=(FORM_RADIO_LABEL_STYLE)
                            {
                                (goal_type.label())
                            }
                        }
                    }
                }
            }

            div
            {
                label for="target_amount" class=(FORM_LABEL_STYLE) { "Starting amount (Rp)" }

                input
                    id="target_amount"
                    type="number"
                    name="target_amount"
                    step="1"
                    min=(-MAX_AMOUNT)
                    max=(MAX_AMOUNT)
                    placeholder="e.g. 12000000"
                    value=[values.target_amount]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                span class="block mt-1 text-xs text-gray-500 dark:text-gray-400"
                {
                    "For a debt, the amount owed before any repayments. \
                    This cannot be changed later."
                }
            }

            (error_paragraph(values.error_message))

            (submit_button("Create Goal"))
        }
    }
}

pub fn edit_goal_form(endpoint: &str, values: &EditGoalFormValues<'_>) -> Markup {
    html! {
        form
            hx-put=(endpoint)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            (title_and_description_fields(values.title, values.description))

            (error_paragraph(values.error_message))

            (submit_button("Save Goal"))
        }
    }
}
