//! Core transaction domain types.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{GoalId, SheetId, TransactionId},
    ledger::{LedgerTransaction, MAX_AMOUNT},
};

pub use crate::ledger::TransactionType;

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "in" => Ok(TransactionType::In),
            "out" => Ok(TransactionType::Out),
            other => Err(FromSqlError::Other(
                format!("invalid transaction type {other:?}").into(),
            )),
        }
    }
}

/// Money coming into or going out of a sheet, optionally counted towards a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    /// The sheet the transaction was recorded in.
    pub sheet_id: SheetId,
    /// The goal whose balance this transaction changes, if any.
    pub goal_id: Option<GoalId>,
    pub transaction_type: TransactionType,
    /// The amount in whole Rupiah, never negative.
    pub nominal: i64,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<&Transaction> for LedgerTransaction<TransactionId> {
    fn from(transaction: &Transaction) -> Self {
        LedgerTransaction {
            id: transaction.id,
            transaction_type: transaction.transaction_type,
            nominal: transaction.nominal,
        }
    }
}

/// The user editable fields of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    pub goal_id: Option<GoalId>,
    pub transaction_type: TransactionType,
    pub nominal: i64,
    pub description: String,
}

impl TransactionFields {
    /// Check the fields that do not need the database.
    ///
    /// # Errors
    ///
    /// Returns [Error::NegativeNominal] if the nominal amount is below zero,
    /// or [Error::AmountOutOfRange] if it is above [MAX_AMOUNT].
    pub fn validate(&self) -> Result<(), Error> {
        if self.nominal < 0 {
            return Err(Error::NegativeNominal(self.nominal));
        }

        if self.nominal > MAX_AMOUNT {
            return Err(Error::AmountOutOfRange(self.nominal));
        }

        Ok(())
    }
}

/// Form data for transaction creation and editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionFormData {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub nominal: i64,
    #[serde(default)]
    pub description: String,
    /// An empty string in the form means no goal.
    #[serde(default)]
    pub goal_id: Option<GoalId>,
}

impl From<TransactionFormData> for TransactionFields {
    fn from(form: TransactionFormData) -> Self {
        Self {
            goal_id: form.goal_id,
            transaction_type: form.transaction_type,
            nominal: form.nominal,
            description: form.description.trim().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        ledger::{MAX_AMOUNT, TransactionType},
    };

    use super::{TransactionFields, TransactionFormData};

    fn fields(nominal: i64) -> TransactionFields {
        TransactionFields {
            goal_id: None,
            transaction_type: TransactionType::Out,
            nominal,
            description: String::new(),
        }
    }

    #[test]
    fn negative_nominal_is_rejected() {
        assert_eq!(fields(-1).validate(), Err(Error::NegativeNominal(-1)));
    }

    #[test]
    fn zero_nominal_is_allowed() {
        assert_eq!(fields(0).validate(), Ok(()));
    }

    #[test]
    fn largest_nominal_is_allowed() {
        assert_eq!(fields(MAX_AMOUNT).validate(), Ok(()));
    }

    #[test]
    fn nominal_above_limit_is_rejected() {
        assert_eq!(
            fields(MAX_AMOUNT + 1).validate(),
            Err(Error::AmountOutOfRange(MAX_AMOUNT + 1))
        );
        assert_eq!(
            fields(i64::MAX).validate(),
            Err(Error::AmountOutOfRange(i64::MAX))
        );
    }

    #[test]
    fn form_type_must_be_in_or_out() {
        let result: Result<TransactionFormData, _> =
            serde_urlencoded::from_str("type=sideways&nominal=10");

        assert!(result.is_err());
    }

    #[test]
    fn form_trims_description() {
        let form: TransactionFormData =
            serde_urlencoded::from_str("type=in&nominal=10&description=+Gaji+").unwrap();

        let fields = TransactionFields::from(form);

        assert_eq!(fields.transaction_type, TransactionType::In);
        assert_eq!(fields.description, "Gaji");
        assert_eq!(fields.goal_id, None);
    }
}
