//! The derived account balance: one scalar per owner, kept in step with the
//! ledger by the mutations in [crate::transaction::ledger].

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, owner::{CurrentOwner, OwnerId}};

/// How far the stored scalar may drift from the ledger sum before the audit
/// reports a failure. Covers float rounding from incremental updates.
const AUDIT_TOLERANCE: f64 = 1e-6;

/// Create the balance table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_balance_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS balance (
                owner_id INTEGER PRIMARY KEY,
                balance REAL NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// The current balance for `owner_id`.
///
/// An owner with no ledger activity has a balance of zero.
///
/// # Errors
/// This function will return a [Error::Upstream] if there is an SQL error.
pub fn get_balance(owner_id: OwnerId, connection: &Connection) -> Result<f64, Error> {
    match connection.query_row(
        "SELECT balance FROM balance WHERE owner_id = ?1",
        [owner_id],
        |row| row.get(0),
    ) {
        Ok(balance) => Ok(balance),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0.0),
        Err(error) => Err(error.into()),
    }
}

/// Add `delta` to `owner_id`'s balance, creating the row at zero first if the
/// owner has none yet.
///
/// # Errors
/// This function will return a [Error::Upstream] if there is an SQL error.
pub fn apply_delta(owner_id: OwnerId, delta: f64, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO balance (owner_id, balance) VALUES (?1, ?2)
                ON CONFLICT(owner_id) DO UPDATE SET balance = balance + excluded.balance",
        (owner_id, delta),
    )?;

    Ok(())
}

/// Check `owner_id`'s stored balance against the signed sum over their
/// ledger rows, returning the balance when they agree.
///
/// Mutations write the row and the balance in one database transaction, so
/// disagreement means the store was modified outside the ledger.
///
/// # Errors
/// This function will return a:
/// - [Error::PartialFailure] if the stored balance drifted from the ledger,
/// - or [Error::Upstream] if there is an SQL error.
pub fn audit_balance(owner_id: OwnerId, connection: &Connection) -> Result<f64, Error> {
    let stored = get_balance(owner_id, connection)?;

    let derived: f64 = connection.query_row(
        "SELECT COALESCE(SUM(CASE direction WHEN 'outflow' THEN -amount ELSE amount END), 0.0)
                FROM \"transaction\"
                WHERE owner_id = ?1",
        [owner_id],
        |row| row.get(0),
    )?;

    if (stored - derived).abs() > AUDIT_TOLERANCE {
        return Err(Error::PartialFailure(format!(
            "stored balance {stored} does not match ledger sum {derived} for owner {owner_id}"
        )));
    }

    Ok(stored)
}

/// The state needed to serve the balance endpoints.
#[derive(Debug, Clone)]
pub struct BalanceState {
    /// The database connection holding the balance table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BalanceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for the balance endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// The owner's current balance.
    pub balance: f64,
}

/// A route handler reading the current account balance.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_balance_endpoint(
    State(state): State<BalanceState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Json<BalanceResponse>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let balance = get_balance(owner_id, &connection)?;

    Ok(Json(BalanceResponse { balance }))
}

/// A route handler checking the stored balance against the ledger.
///
/// Responds with the balance when the two agree and a `partial_failure`
/// error when they do not.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn audit_balance_endpoint(
    State(state): State<BalanceState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Json<BalanceResponse>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let balance = audit_balance(owner_id, &connection)?;

    Ok(Json(BalanceResponse { balance }))
}
