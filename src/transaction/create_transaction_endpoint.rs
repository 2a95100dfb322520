//! The route handler for recording a new transaction.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{Error, owner::CurrentOwner};

use super::{core::TransactionResponse, ledger::{LedgerState, create_transaction}};

/// The request body for creating a transaction.
///
/// The fields are optional so that a missing field reports as invalid input
/// rather than a generic body-deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// The amount of money moved. Must be a positive, finite number.
    pub amount: Option<f64>,
    /// The code of a registered category.
    pub category: Option<String>,
}

/// A route handler recording a new transaction for the current owner.
///
/// Responds with `201 Created` and the stored transaction, including its
/// assigned ID and timestamp.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction_endpoint(
    State(state): State<LedgerState>,
    CurrentOwner(owner_id): CurrentOwner,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), Error> {
    let amount = request
        .amount
        .ok_or_else(|| Error::InvalidInput("amount is required".to_owned()))?;
    let category = request
        .category
        .ok_or_else(|| Error::InvalidInput("category is required".to_owned()))?;

    let connection = state.db_connection.lock().unwrap();

    let transaction =
        create_transaction(owner_id, amount, &category, &state.events, &connection)?;

    Ok((StatusCode::CREATED, Json(TransactionResponse { transaction })))
}
