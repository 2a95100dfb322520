//! The ledger mutations: create, update, and delete a transaction while
//! keeping the owner's balance in step.
//!
//! Every mutation writes the ledger row and the balance delta inside one
//! database transaction, so a failure at any point leaves both untouched.
//! Validation and category resolution happen before anything is written.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    category::resolve_category,
    database_id::TransactionId,
    events::{LedgerEvent, LedgerEventKind, LedgerEvents},
    owner::OwnerId,
};

use super::{
    balance::apply_delta,
    core::{Transaction, get_transaction, insert_transaction_row, map_transaction_row, signed_delta},
};

/// How many times a mutation is replayed when the store reports itself busy
/// before giving up with [Error::Conflict].
const BUSY_RETRY_ATTEMPTS: u32 = 3;

/// Record a new transaction for `owner_id` and apply its contribution to the
/// balance.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if `amount` is not a positive, finite number,
/// - [Error::InvalidCategory] if `category_code` is not in the registry,
/// - [Error::Conflict] if the store stayed busy for the whole retry window,
/// - or [Error::Upstream] if there is some other SQL error.
pub fn create_transaction(
    owner_id: OwnerId,
    amount: f64,
    category_code: &str,
    events: &LedgerEvents,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(amount)?;

    let transaction = with_busy_retry(|| {
        let category = resolve_category(category_code, connection)?;

        let write = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
        let transaction = insert_transaction_row(
            owner_id,
            amount,
            &category,
            OffsetDateTime::now_utc(),
            &write,
        )?;
        apply_delta(owner_id, signed_delta(category.direction, amount), &write)?;
        write.commit()?;

        Ok(transaction)
    })?;

    events.publish(LedgerEvent {
        owner_id,
        kind: LedgerEventKind::Created,
        transaction_id: transaction.id,
    });

    Ok(transaction)
}

/// Replace the amount and category of `owner_id`'s transaction
/// `transaction_id`, reconciling the balance.
///
/// The old contribution is reversed using the direction snapshot stored on
/// the row, so rows recorded under a since-retired category still reconcile.
/// The new contribution uses the direction the registry holds for the new
/// category now.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if `amount` is not a positive, finite number,
/// - [Error::InvalidCategory] if `category_code` is not in the registry,
/// - [Error::NotFound] if there is no such row in `owner_id`'s ledger,
/// - [Error::Conflict] if the store stayed busy for the whole retry window,
/// - or [Error::Upstream] if there is some other SQL error.
pub fn update_transaction(
    owner_id: OwnerId,
    transaction_id: TransactionId,
    amount: f64,
    category_code: &str,
    events: &LedgerEvents,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(amount)?;

    let transaction = with_busy_retry(|| {
        let write = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

        let prior = get_transaction(owner_id, transaction_id, &write)?;
        let category = resolve_category(category_code, &write)?;

        let old_delta = signed_delta(prior.direction, prior.amount);
        let new_delta = signed_delta(category.direction, amount);

        let updated = write
            .prepare(
                "UPDATE \"transaction\"
                    SET amount = ?1, category = ?2, direction = ?3
                    WHERE id = ?4 AND owner_id = ?5
                    RETURNING id, owner_id, amount, category, direction, created_at",
            )?
            .query_row(
                (
                    amount,
                    &category.code,
                    category.direction,
                    transaction_id,
                    owner_id,
                ),
                map_transaction_row,
            )?;

        apply_delta(owner_id, new_delta - old_delta, &write)?;
        write.commit()?;

        Ok(updated)
    })?;

    events.publish(LedgerEvent {
        owner_id,
        kind: LedgerEventKind::Updated,
        transaction_id,
    });

    Ok(transaction)
}

/// Remove `owner_id`'s transaction `transaction_id` and reverse its balance
/// contribution.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no such row in `owner_id`'s ledger,
/// - [Error::Conflict] if the store stayed busy for the whole retry window,
/// - or [Error::Upstream] if there is some other SQL error.
pub fn delete_transaction(
    owner_id: OwnerId,
    transaction_id: TransactionId,
    events: &LedgerEvents,
    connection: &Connection,
) -> Result<(), Error> {
    with_busy_retry(|| {
        let write = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

        let prior = get_transaction(owner_id, transaction_id, &write)?;

        write.execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
            (transaction_id, owner_id),
        )?;

        apply_delta(owner_id, -signed_delta(prior.direction, prior.amount), &write)?;
        write.commit()?;

        Ok(())
    })?;

    events.publish(LedgerEvent {
        owner_id,
        kind: LedgerEventKind::Deleted,
        transaction_id,
    });

    Ok(())
}

fn validate_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() {
        return Err(Error::InvalidInput(format!(
            "amount must be a finite number, got {amount}"
        )));
    }

    if amount <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "amount must be positive, got {amount}"
        )));
    }

    Ok(())
}

/// Run `operation`, replaying it while the store reports itself busy, up to
/// [BUSY_RETRY_ATTEMPTS] times in total.
fn with_busy_retry<T>(mut operation: impl FnMut() -> Result<T, Error>) -> Result<T, Error> {
    let mut attempt = 1;

    loop {
        match operation() {
            Err(Error::Conflict) if attempt < BUSY_RETRY_ATTEMPTS => {
                tracing::debug!("the store was busy on attempt {attempt}, replaying the mutation");
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// The state needed to run ledger mutations from a route handler.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The database connection holding the ledger and balance tables.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The channel ledger mutations are announced on.
    pub events: LedgerEvents,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            events: state.events.clone(),
        }
    }
}
