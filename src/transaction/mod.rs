//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated `NewTransaction` input
//! - Database functions for storing, querying and paging through transactions
//! - The balance bookkeeping that runs whenever a transaction is created
//! - Route handlers for the transaction API

mod balance;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod query;
mod validation;

pub use balance::apply_to_balance;
pub use core::{
    NewTransaction, Transaction, TransactionData, TransactionType, create_transaction_table,
};
pub use create_endpoint::{create_transaction, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;

pub(crate) use query::{TransactionFilter, query_transactions};
