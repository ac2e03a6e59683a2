//! Core financial goal domain types.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    database_id::{GoalId, TransactionId},
    ledger::{Ledger, LedgerTransaction, MAX_AMOUNT, reconstruct_ledger},
    title::Title,
};

/// What the balance of a goal represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Money owed, e.g. a loan. The target amount is the principal before any repayments.
    Debt,
    /// Money being put aside.
    Saving,
}

impl GoalType {
    /// The string stored in the database and sent in HTML forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Debt => "debt",
            GoalType::Saving => "saving",
        }
    }

    /// The name shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            GoalType::Debt => "Debt",
            GoalType::Saving => "Saving",
        }
    }
}

impl Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for GoalType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GoalType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "debt" => Ok(GoalType::Debt),
            "saving" => Ok(GoalType::Saving),
            other => Err(FromSqlError::Other(
                format!("invalid goal type {other:?}").into(),
            )),
        }
    }
}

/// A financial goal whose balance is tracked through the transactions linked to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: GoalId,
    /// The user that owns the goal.
    pub user_id: UserID,
    pub title: Title,
    pub description: Option<String>,
    /// The balance before any transactions, e.g. the amount owed on a loan.
    ///
    /// This is fixed when the goal is created.
    pub target_amount: i64,
    pub goal_type: GoalType,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Goal {
    /// Replay `transactions`, oldest first, on top of the goal's target amount.
    pub fn ledger<I>(&self, transactions: I) -> Ledger<TransactionId>
    where
        I: IntoIterator<Item = LedgerTransaction<TransactionId>>,
    {
        reconstruct_ledger(self.target_amount, transactions)
    }
}

/// Check that a goal's target amount is no further than [MAX_AMOUNT] from zero.
///
/// # Errors
///
/// Returns [Error::AmountOutOfRange] if the amount is too large in size.
pub fn check_target_amount(target_amount: i64) -> Result<(), Error> {
    if target_amount.unsigned_abs() > MAX_AMOUNT.unsigned_abs() {
        Err(Error::AmountOutOfRange(target_amount))
    } else {
        Ok(())
    }
}

/// A goal together with its current balance, used for the list of goals.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalSummary {
    pub goal: Goal,
    pub current_balance: i64,
    /// The number of transactions linked to the goal.
    pub transaction_count: usize,
}

/// Form data for creating a goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGoalFormData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_amount: i64,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
}

/// Form data for editing a goal.
///
/// The target amount and type cannot be changed after creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditGoalFormData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::{
        Error,
        auth::UserID,
        ledger::{LedgerTransaction, MAX_AMOUNT, TransactionType},
        title::Title,
    };

    use super::{CreateGoalFormData, Goal, GoalType, check_target_amount};

    fn loan(target_amount: i64) -> Goal {
        let now = OffsetDateTime::now_utc();

        Goal {
            id: 1,
            user_id: UserID::new(1),
            title: Title::new_unchecked("KPR"),
            description: None,
            target_amount,
            goal_type: GoalType::Debt,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn ledger_starts_at_target_amount() {
        let goal = loan(5_000_000);

        let ledger = goal.ledger([LedgerTransaction {
            id: 7,
            transaction_type: TransactionType::Out,
            nominal: 1_000_000,
        }]);

        assert_eq!(ledger.starting_balance, 5_000_000);
        assert_eq!(ledger.entries[0].previous_balance, 5_000_000);
        assert_eq!(ledger.final_balance, 4_000_000);
    }

    #[test]
    fn ledger_without_transactions_keeps_target_amount() {
        let goal = loan(1_000);

        assert_eq!(goal.ledger([]).final_balance, 1_000);
    }

    #[test]
    fn target_amount_may_reach_the_limit_either_way() {
        assert_eq!(check_target_amount(MAX_AMOUNT), Ok(()));
        assert_eq!(check_target_amount(-MAX_AMOUNT), Ok(()));
        assert_eq!(check_target_amount(0), Ok(()));
    }

    #[test]
    fn target_amount_past_the_limit_is_rejected() {
        assert_eq!(
            check_target_amount(MAX_AMOUNT + 1),
            Err(Error::AmountOutOfRange(MAX_AMOUNT + 1))
        );
        assert_eq!(
            check_target_amount(i64::MAX),
            Err(Error::AmountOutOfRange(i64::MAX))
        );
        assert_eq!(
            check_target_amount(i64::MIN),
            Err(Error::AmountOutOfRange(i64::MIN))
        );
    }

    #[test]
    fn ledger_of_largest_goal_stays_consistent() {
        let goal = loan(MAX_AMOUNT);

        let ledger = goal.ledger([
            LedgerTransaction {
                id: 1,
                transaction_type: TransactionType::In,
                nominal: MAX_AMOUNT,
            },
            LedgerTransaction {
                id: 2,
                transaction_type: TransactionType::In,
                nominal: MAX_AMOUNT,
            },
        ]);

        assert_eq!(ledger.final_balance, 3 * MAX_AMOUNT);
        assert_eq!(ledger.total_in, 2 * MAX_AMOUNT);
    }

    #[test]
    fn form_type_field_is_lowercase() {
        let form: CreateGoalFormData =
            serde_urlencoded::from_str("title=Dana+darurat&target_amount=0&type=saving").unwrap();

        assert_eq!(form.goal_type, GoalType::Saving);
        assert_eq!(form.description, None);
    }

    #[test]
    fn form_rejects_unknown_type() {
        let result: Result<CreateGoalFormData, _> =
            serde_urlencoded::from_str("title=Liburan&target_amount=0&type=wish");

        assert!(result.is_err());
    }
}
