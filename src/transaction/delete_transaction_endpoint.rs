//! The route handler for deleting a transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::TransactionId, owner::CurrentOwner};

use super::ledger::{LedgerState, delete_transaction};

/// The response body for a successful deletion.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTransactionResponse {
    /// Always `true`; a failed deletion responds with an error body instead.
    pub success: bool,
}

/// A route handler deleting one of the current owner's transactions and
/// reversing its balance contribution.
///
/// Deleting is not repeatable: a second request for the same ID responds
/// `404 Not Found`.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<LedgerState>,
    CurrentOwner(owner_id): CurrentOwner,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<DeleteTransactionResponse>, Error> {
    let connection = state.db_connection.lock().unwrap();

    delete_transaction(owner_id, transaction_id, &state.events, &connection)?;

    Ok(Json(DeleteTransactionResponse { success: true }))
}
