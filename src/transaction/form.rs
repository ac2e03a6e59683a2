//! The form shared by the create and edit transaction pages.

use maud::{Markup, html};

use crate::{
    database_id::GoalId,
    goal::Goal,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, submit_button,
    },
    ledger::{MAX_AMOUNT, TransactionType},
};

/// Which HTMX verb the form submits with.
pub enum TransactionFormAction<'a> {
    Create { endpoint: &'a str },
    Update { endpoint: &'a str },
}

pub struct TransactionFormValues<'a> {
    pub transaction_type: TransactionType,
    pub nominal: Option<i64>,
    pub description: &'a str,
    pub goal_id: Option<GoalId>,
    pub error_message: Option<&'a str>,
}

impl Default for TransactionFormValues<'_> {
    fn default() -> Self {
        Self {
            transaction_type: TransactionType::Out,
            nominal: None,
            description: "",
            goal_id: None,
            error_message: None,
        }
    }
}

fn type_radio(value: TransactionType, label: &str, checked: bool) -> Markup {
    let id = format!("transaction-type-{}", value.as_str());

    html! {
        div class="flex items-center gap-3"
        {
            input
                name="type"
                id=(id)
                type="radio"
                value=(value.as_str())
                checked[checked]
                required
                tabindex="0"
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    }
}

pub fn transaction_form(
    action: TransactionFormAction<'_>,
    values: &TransactionFormValues<'_>,
    goals: &[Goal],
) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        TransactionFormAction::Create { endpoint } => {
            (Some(endpoint), None, "Create Transaction")
        }
        TransactionFormAction::Update { endpoint } => {
            (None, Some(endpoint), "Save Transaction")
        }
    };
    let is_in = values.transaction_type == TransactionType::In;

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Direction" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    (type_radio(TransactionType::Out, "Out (expense or repayment)", !is_in))
                    (type_radio(TransactionType::In, "In (income or new debt)", is_in))
                }
            }

            div
            {
                label for="nominal" class=(FORM_LABEL_STYLE) { "Nominal (Rp)" }

                input
                    name="nominal"
                    id="nominal"
                    type="number"
                    step="1"
                    min="0"
                    max=(MAX_AMOUNT)
                    placeholder="0"
                    required
                    autofocus
                    value=[values.nominal]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="e.g. Gaji, Listrik, Cicilan"
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !goals.is_empty() {
                div
                {
                    label for="goal_id" class=(FORM_LABEL_STYLE) { "Goal" }

                    select name="goal_id" id="goal_id" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "No goal" }

                        @for goal in goals {
                            option value=(goal.id) selected[Some(goal.id) == values.goal_id]
                            {
                                (goal.title.as_ref())
                            }
                        }
                    }
                }
            }

            @if let Some(error_message) = values.error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            (submit_button(button_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::OffsetDateTime;

    use crate::{
        auth::UserID,
        goal::{Goal, GoalType},
        ledger::TransactionType,
        title::Title,
    };

    use super::{TransactionFormAction, TransactionFormValues, transaction_form};

    fn render(values: &TransactionFormValues<'_>, goals: &[Goal]) -> Html {
        let markup = transaction_form(
            TransactionFormAction::Create { endpoint: "/api" },
            values,
            goals,
        );
        Html::parse_fragment(&markup.into_string())
    }

    fn goal(id: i64, title: &str) -> Goal {
        let now = OffsetDateTime::now_utc();

        Goal {
            id,
            user_id: UserID::new(1),
            title: Title::new_unchecked(title),
            description: None,
            target_amount: 0,
            goal_type: GoalType::Saving,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn checks_selected_type() {
        for (transaction_type, want) in [(TransactionType::In, "in"), (TransactionType::Out, "out")]
        {
            let html = render(
                &TransactionFormValues {
                    transaction_type,
                    ..Default::default()
                },
                &[],
            );

            let checked: Vec<_> = html
                .select(&Selector::parse("input[type=radio][name=type][checked]").unwrap())
                .map(|input| input.value().attr("value").unwrap())
                .collect();
            assert_eq!(checked, vec![want]);
        }
    }

    #[test]
    fn hides_goal_select_without_goals() {
        let html = render(&TransactionFormValues::default(), &[]);

        assert!(
            html.select(&Selector::parse("select").unwrap())
                .next()
                .is_none()
        );
    }

    #[test]
    fn selects_current_goal() {
        let goals = [goal(1, "Dana darurat"), goal(2, "KPR")];
        let html = render(
            &TransactionFormValues {
                goal_id: Some(2),
                ..Default::default()
            },
            &goals,
        );

        let selected: Vec<_> = html
            .select(&Selector::parse("select[name=goal_id] option[selected]").unwrap())
            .map(|option| option.value().attr("value").unwrap())
            .collect();
        assert_eq!(selected, vec!["2"]);

        let options = html
            .select(&Selector::parse("select[name=goal_id] option").unwrap())
            .count();
        assert_eq!(options, 3, "want a \"No goal\" option plus one per goal");
    }
}
