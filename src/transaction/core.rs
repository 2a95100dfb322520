//! Defines the transaction model and the database functions for storing and
//! retrieving ledger rows.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, Direction},
    database_id::TransactionId,
    owner::OwnerId,
    timestamp,
};

/// A ledger entry: an amount of money that entered or left an owner's
/// account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The owner whose ledger this row belongs to.
    pub owner_id: OwnerId,
    /// The amount of money moved. Always positive; the sign of the balance
    /// contribution comes from `direction`.
    pub amount: f64,
    /// The code of the category the transaction was recorded under.
    pub category: String,
    /// The flow direction the category had when this row was written.
    ///
    /// Snapshotting the direction on the row keeps every past contribution
    /// reversible even after the category is retired from the registry.
    pub direction: Direction,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The signed balance contribution of an amount moving in `direction`.
pub fn signed_delta(direction: Direction, amount: f64) -> f64 {
    direction.sign() * amount
}

/// The response body for endpoints returning a single transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// The transaction that was created, updated, or fetched.
    pub transaction: Transaction,
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // No foreign key on category: registry rows may be retired while ledger
    // rows still reference their code.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                direction TEXT NOT NULL CHECK(direction IN ('inflow', 'outflow')),
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // The statement reads newest-first within an owner, the summary and
    // period filter scan by timestamp, and the category filter groups by
    // code.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_created
                ON \"transaction\" (owner_id, created_at, id)",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_category
                ON \"transaction\" (owner_id, category)",
        (),
    )?;

    Ok(())
}

/// Insert a ledger row for `owner_id` and return the stored transaction.
///
/// The row records `category`'s current direction alongside the code. This
/// only writes the row; callers that must keep the balance in step go
/// through the ledger mutations instead.
///
/// # Errors
/// This function will return a [Error::Upstream] if there is an SQL error.
pub fn insert_transaction_row(
    owner_id: OwnerId,
    amount: f64,
    category: &Category,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (owner_id, amount, category, direction, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                RETURNING id, owner_id, amount, category, direction, created_at",
        )?
        .query_row(
            (
                owner_id,
                amount,
                &category.code,
                category.direction,
                timestamp::to_db_string(created_at),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction with `transaction_id` from the database.
///
/// Rows belonging to a different owner are reported as missing.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no such row in `owner_id`'s ledger,
/// - or [Error::Upstream] if there is some other SQL error.
pub fn get_transaction(
    owner_id: OwnerId,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, owner_id, amount, category, direction, created_at
                FROM \"transaction\"
                WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row((transaction_id, owner_id), map_transaction_row)?;

    Ok(transaction)
}

/// Convert a database row into a [Transaction].
///
/// The row must contain the columns `id`, `owner_id`, `amount`, `category`,
/// `direction`, and `created_at`, in that order.
///
/// # Errors
/// Returns an error if the row does not match the expected schema.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_created_at: String = row.get(5)?;
    let created_at = timestamp::parse_db_string(&raw_created_at).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        direction: row.get(4)?,
        created_at,
    })
}
