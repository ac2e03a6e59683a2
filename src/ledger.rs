//! Reconstructs the running balance of a financial goal from its transactions.
//!
//! The ledger is a pure function of a starting amount and a chronologically
//! ordered list of transactions. The step-by-step entries and the aggregate
//! totals are produced by the same pass over the same input, so the audit
//! trail shown to the user and the summary numbers always agree.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The largest amount, in Rupiah, accepted for a nominal or a target amount.
///
/// Sums of many bounded amounts stay far inside `i64`, so sheet totals and
/// ledger balances never overflow for realistic histories.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// The direction money moves in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. salary, or an increase in what is owed.
    In,
    /// Money going out, e.g. a purchase, or a repayment of a debt.
    Out,
}

impl TransactionType {
    /// The string stored in the database and sent in HTML forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "in",
            TransactionType::Out => "out",
        }
    }

    /// The sign shown next to a nominal amount.
    pub fn mark(&self) -> Mark {
        match self {
            TransactionType::In => Mark::Plus,
            TransactionType::Out => Mark::Minus,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sign indicator for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// `+`, the balance went up.
    #[serde(rename = "+")]
    Plus,
    /// `-`, the balance went down.
    #[serde(rename = "-")]
    Minus,
}

impl Mark {
    /// The sign as a single character string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Plus => "+",
            Mark::Minus => "-",
        }
    }
}

impl Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of a transaction the ledger needs.
///
/// `nominal` must be non-negative. Callers validate this when the
/// transaction is created, the ledger does not check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction<Id> {
    /// Identifies the source transaction, e.g. its database ID.
    pub id: Id,
    /// Whether the money came in or went out.
    pub transaction_type: TransactionType,
    /// The magnitude of the transaction in whole Rupiah.
    pub nominal: i64,
}

/// The effect of a single transaction on the running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry<Id> {
    /// The transaction that produced this entry.
    pub source_id: Id,
    /// The balance before the transaction was applied.
    pub previous_balance: i64,
    /// The magnitude of the transaction.
    pub nominal: i64,
    /// `+` for money in, `-` for money out.
    pub mark: Mark,
    /// The balance after the transaction was applied.
    pub resulting_balance: i64,
}

impl<Id> LedgerEntry<Id> {
    /// The signed change in balance, i.e. `resulting_balance - previous_balance`.
    pub fn delta(&self) -> i64 {
        match self.mark {
            Mark::Plus => self.nominal,
            Mark::Minus => -self.nominal,
        }
    }
}

/// The replayable history of a balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ledger<Id> {
    /// The balance before any transactions.
    pub starting_balance: i64,
    /// One entry per transaction, in the order they were given.
    pub entries: Vec<LedgerEntry<Id>>,
    /// The balance after all transactions.
    pub final_balance: i64,
    /// The sum of the nominal amounts of all `in` transactions.
    pub total_in: i64,
    /// The sum of the nominal amounts of all `out` transactions.
    pub total_out: i64,
}

/// Walk `transactions` in order, starting from `starting_amount`, and record
/// the balance before and after each one.
///
/// `transactions` must already be sorted by creation time, oldest first.
/// An empty list produces an empty ledger whose final balance is
/// `starting_amount`. Balances and totals saturate at the `i64` limits.
pub fn reconstruct_ledger<Id, I>(starting_amount: i64, transactions: I) -> Ledger<Id>
where
    I: IntoIterator<Item = LedgerTransaction<Id>>,
{
    let transactions = transactions.into_iter();
    let mut entries = Vec::with_capacity(transactions.size_hint().0);
    let mut balance = starting_amount;
    let mut total_in: i64 = 0;
    let mut total_out: i64 = 0;

    for transaction in transactions {
        let previous_balance = balance;

        match transaction.transaction_type {
            TransactionType::In => {
                balance = balance.saturating_add(transaction.nominal);
                total_in = total_in.saturating_add(transaction.nominal);
            }
            TransactionType::Out => {
                balance = balance.saturating_sub(transaction.nominal);
                total_out = total_out.saturating_add(transaction.nominal);
            }
        }

        entries.push(LedgerEntry {
            source_id: transaction.id,
            previous_balance,
            nominal: transaction.nominal,
            mark: transaction.transaction_type.mark(),
            resulting_balance: balance,
        });
    }

    Ledger {
        starting_balance: starting_amount,
        entries,
        final_balance: balance,
        total_in,
        total_out,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Ledger, LedgerEntry, LedgerTransaction, MAX_AMOUNT, Mark, TransactionType,
        reconstruct_ledger,
    };

    fn transaction(
        id: &'static str,
        transaction_type: TransactionType,
        nominal: i64,
    ) -> LedgerTransaction<&'static str> {
        LedgerTransaction {
            id,
            transaction_type,
            nominal,
        }
    }

    /// A fixed but irregular sequence used by the property style tests.
    fn sample_transactions() -> Vec<LedgerTransaction<&'static str>> {
        vec![
            transaction("a", TransactionType::Out, 250_000),
            transaction("b", TransactionType::In, 1_000_000),
            transaction("c", TransactionType::Out, 0),
            transaction("d", TransactionType::Out, 3_750_000),
            transaction("e", TransactionType::In, 42),
            transaction("f", TransactionType::Out, 999_999),
        ]
    }

    #[test]
    fn empty_transactions_give_empty_ledger() {
        let ledger = reconstruct_ledger::<&str, _>(1000, vec![]);

        assert_eq!(
            ledger,
            Ledger {
                starting_balance: 1000,
                entries: vec![],
                final_balance: 1000,
                total_in: 0,
                total_out: 0,
            }
        );
    }

    #[test]
    fn single_payment_reduces_debt() {
        let ledger = reconstruct_ledger(
            5_000_000,
            vec![transaction("t1", TransactionType::Out, 1_000_000)],
        );

        assert_eq!(
            ledger.entries,
            vec![LedgerEntry {
                source_id: "t1",
                previous_balance: 5_000_000,
                nominal: 1_000_000,
                mark: Mark::Minus,
                resulting_balance: 4_000_000,
            }]
        );
        assert_eq!(ledger.final_balance, 4_000_000);
    }

    #[test]
    fn mixed_sequence() {
        let ledger = reconstruct_ledger(
            1_000_000,
            vec![
                transaction("a", TransactionType::In, 500_000),
                transaction("b", TransactionType::Out, 200_000),
            ],
        );

        assert_eq!(
            ledger.entries,
            vec![
                LedgerEntry {
                    source_id: "a",
                    previous_balance: 1_000_000,
                    nominal: 500_000,
                    mark: Mark::Plus,
                    resulting_balance: 1_500_000,
                },
                LedgerEntry {
                    source_id: "b",
                    previous_balance: 1_500_000,
                    nominal: 200_000,
                    mark: Mark::Minus,
                    resulting_balance: 1_300_000,
                },
            ]
        );
        assert_eq!(ledger.final_balance, 1_300_000);
        assert_eq!(ledger.total_in, 500_000);
        assert_eq!(ledger.total_out, 200_000);
    }

    #[test]
    fn zero_nominal_is_a_no_op() {
        let with_zero = reconstruct_ledger(
            100,
            vec![
                transaction("a", TransactionType::In, 10),
                transaction("zero", TransactionType::Out, 0),
                transaction("b", TransactionType::Out, 30),
            ],
        );
        let without_zero = reconstruct_ledger(
            100,
            vec![
                transaction("a", TransactionType::In, 10),
                transaction("b", TransactionType::Out, 30),
            ],
        );

        let zero_entry = &with_zero.entries[1];
        assert_eq!(zero_entry.previous_balance, zero_entry.resulting_balance);
        assert_eq!(zero_entry.delta(), 0);
        assert_eq!(with_zero.entries[2], without_zero.entries[1]);
        assert_eq!(with_zero.final_balance, without_zero.final_balance);
    }

    #[test]
    fn final_balance_matches_totals() {
        for starting_amount in [0, 1, -5_000, 10_000_000] {
            let transactions = sample_transactions();
            let want_in: i64 = transactions
                .iter()
                .filter(|t| t.transaction_type == TransactionType::In)
                .map(|t| t.nominal)
                .sum();
            let want_out: i64 = transactions
                .iter()
                .filter(|t| t.transaction_type == TransactionType::Out)
                .map(|t| t.nominal)
                .sum();

            let ledger = reconstruct_ledger(starting_amount, transactions);

            assert_eq!(ledger.total_in, want_in);
            assert_eq!(ledger.total_out, want_out);
            assert_eq!(
                ledger.final_balance,
                starting_amount + want_in - want_out,
                "final balance disagrees with totals for starting amount {starting_amount}"
            );
        }
    }

    #[test]
    fn entries_chain_from_starting_amount() {
        let starting_amount = 2_500_000;
        let ledger = reconstruct_ledger(starting_amount, sample_transactions());

        assert_eq!(ledger.entries.len(), sample_transactions().len());
        assert_eq!(ledger.entries[0].previous_balance, starting_amount);

        for window in ledger.entries.windows(2) {
            assert_eq!(window[0].resulting_balance, window[1].previous_balance);
        }

        for entry in &ledger.entries {
            assert_eq!(
                entry.resulting_balance,
                entry.previous_balance + entry.delta()
            );
        }

        assert_eq!(
            ledger.entries.last().map(|entry| entry.resulting_balance),
            Some(ledger.final_balance)
        );
    }

    #[test]
    fn entries_keep_input_order() {
        let ledger = reconstruct_ledger(0, sample_transactions());

        let got: Vec<_> = ledger.entries.iter().map(|entry| entry.source_id).collect();

        assert_eq!(got, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn reconstruction_is_repeatable() {
        let first = reconstruct_ledger(777, sample_transactions());
        let second = reconstruct_ledger(777, sample_transactions());

        assert_eq!(first, second);
    }

    #[test]
    fn balance_can_go_negative() {
        let ledger = reconstruct_ledger(100, vec![transaction("a", TransactionType::Out, 150)]);

        assert_eq!(ledger.final_balance, -50);
    }

    #[test]
    fn balance_saturates_near_the_upper_limit() {
        let ledger = reconstruct_ledger(i64::MAX, vec![transaction("a", TransactionType::In, 1)]);

        assert_eq!(ledger.final_balance, i64::MAX);
        assert_eq!(ledger.total_in, 1);
        assert_eq!(ledger.entries[0].resulting_balance, i64::MAX);
    }

    #[test]
    fn balance_saturates_near_the_lower_limit() {
        let ledger = reconstruct_ledger(
            i64::MIN + 1,
            vec![
                transaction("a", TransactionType::Out, 5),
                transaction("b", TransactionType::Out, i64::MAX),
            ],
        );

        assert_eq!(ledger.final_balance, i64::MIN);
        assert_eq!(ledger.total_out, i64::MAX);
    }

    #[test]
    fn bounded_amounts_keep_the_consistency_law() {
        let transactions = (0..1_000)
            .map(|i| {
                let transaction_type = if i % 3 == 0 {
                    TransactionType::Out
                } else {
                    TransactionType::In
                };
                LedgerTransaction {
                    id: i,
                    transaction_type,
                    nominal: MAX_AMOUNT,
                }
            })
            .collect::<Vec<_>>();

        let ledger = reconstruct_ledger(-MAX_AMOUNT, transactions);

        assert_eq!(
            ledger.final_balance,
            ledger.starting_balance + ledger.total_in - ledger.total_out
        );
        assert_eq!(ledger.total_in, 666 * MAX_AMOUNT);
        assert_eq!(ledger.total_out, 334 * MAX_AMOUNT);
    }

    #[test]
    fn marks_serialize_as_signs() {
        assert_eq!(serde_json::to_string(&Mark::Plus).unwrap(), "\"+\"");
        assert_eq!(serde_json::to_string(&Mark::Minus).unwrap(), "\"-\"");
        assert_eq!(
            serde_json::to_string(&TransactionType::In).unwrap(),
            "\"in\""
        );
        assert_eq!(
            serde_json::from_str::<TransactionType>("\"out\"").unwrap(),
            TransactionType::Out
        );
    }
}
