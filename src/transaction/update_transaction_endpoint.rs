//! The route handler for updating a transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::{Error, database_id::TransactionId, owner::CurrentOwner};

use super::{core::TransactionResponse, ledger::{LedgerState, update_transaction}};

/// The request body for updating a transaction.
///
/// Both fields must be supplied; an update is a full replacement of the
/// transaction's amount and category.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    /// The new amount. Must be a positive, finite number.
    pub amount: Option<f64>,
    /// The code of a registered category.
    pub category: Option<String>,
}

/// A route handler replacing the amount and category of one of the current
/// owner's transactions.
///
/// The balance is adjusted by the difference between the old and new
/// contributions.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_transaction_endpoint(
    State(state): State<LedgerState>,
    CurrentOwner(owner_id): CurrentOwner,
    Path(transaction_id): Path<TransactionId>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<TransactionResponse>, Error> {
    let amount = request
        .amount
        .ok_or_else(|| Error::InvalidInput("amount is required".to_owned()))?;
    let category = request
        .category
        .ok_or_else(|| Error::InvalidInput("category is required".to_owned()))?;

    let connection = state.db_connection.lock().unwrap();

    let transaction = update_transaction(
        owner_id,
        transaction_id,
        amount,
        &category,
        &state.events,
        &connection,
    )?;

    Ok(Json(TransactionResponse { transaction }))
}
