//! The API endpoint URIs.

/// The route to create and list transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the per-category summary over the trailing window.
pub const TRANSACTIONS_SUMMARY: &str = "/api/transactions/summary";
/// The route to list the registered categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to read the current account balance.
pub const BALANCE: &str = "/api/balance";
/// The route that checks the balance scalar against the ledger.
pub const BALANCE_AUDIT: &str = "/api/balance/audit";
