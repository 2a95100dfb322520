//! The transaction ledger for the application.
//!
//! This module contains everything related to ledger transactions:
//! - The `Transaction` model and the database functions for storing and
//!   querying ledger rows
//! - The ledger mutations (create, update, delete) that keep the derived
//!   balance in step with the rows
//! - The paginated statement query and the trailing-window summary
//! - The route handlers for the transaction, balance, and summary endpoints

mod balance;
mod core;
mod create_transaction_endpoint;
mod delete_transaction_endpoint;
mod get_transaction_endpoint;
mod ledger;
mod list_transactions_endpoint;
mod statement;
mod summary;
mod update_transaction_endpoint;

pub use balance::{audit_balance_endpoint, create_balance_table, get_balance_endpoint};
pub use core::create_transaction_table;
pub use create_transaction_endpoint::create_transaction_endpoint;
pub use delete_transaction_endpoint::delete_transaction_endpoint;
pub use get_transaction_endpoint::get_transaction_endpoint;
pub use list_transactions_endpoint::list_transactions_endpoint;
pub use summary::summary_endpoint;
pub use update_transaction_endpoint::update_transaction_endpoint;

#[cfg(test)]
pub use balance::{audit_balance, get_balance};
#[cfg(test)]
pub use core::{get_transaction, insert_transaction_row, signed_delta};
