//! The route handler for reading a single transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::TransactionId, owner::CurrentOwner};

use super::core::{TransactionResponse, get_transaction};

/// The state needed to read a transaction.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection holding the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler reading one of the current owner's transactions.
///
/// Transactions belonging to other owners respond `404 Not Found`, exactly
/// like transactions that do not exist.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    CurrentOwner(owner_id): CurrentOwner,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<TransactionResponse>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let transaction = get_transaction(owner_id, transaction_id, &connection)?;

    Ok(Json(TransactionResponse { transaction }))
}
