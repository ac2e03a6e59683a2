//! Income and expense records.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validation of its fields
//! - Database functions for storing and querying transactions, including the
//!   oldest-first listing that goal ledgers are replayed from
//! - View handlers for the create and edit pages and the HTMX endpoints

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;

pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_goal_transactions,
    get_sheet_transactions, get_transaction, update_transaction,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{Transaction, TransactionFields, TransactionFormData, TransactionType};
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
