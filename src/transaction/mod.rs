//! Transactions and the rules for how they move account balances.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - [record_transaction], which stores a transaction and applies it to its account
//! - Route handlers for recording, editing, deleting and listing transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    Transaction, TransactionBuilder, TransactionType, create_transaction_table,
    get_recent_transactions,
};
pub use create_endpoint::{
    TransactionForm, TransactionState, create_transaction_endpoint, record_transaction,
};
pub use delete_endpoint::{delete_transaction, delete_transaction_endpoint};
pub use edit_endpoint::{edit_transaction_endpoint, update_transaction};
pub use list_endpoint::get_recent_transactions_endpoint;

#[cfg(test)]
pub use core::{count_transactions, get_transaction};
