//! The route handler for the paginated statement.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{AppState, Error, owner::CurrentOwner, pagination::{PageSelection, PaginationConfig}};

use super::{
    core::Transaction,
    statement::{StatementFilters, list_statement},
};

/// The state needed to serve the statement.
#[derive(Debug, Clone)]
pub struct StatementState {
    /// The timezone used for the period filter's day boundary.
    pub local_timezone: String,
    /// The config that controls how to page statement data.
    pub pagination_config: PaginationConfig,
    /// The database connection holding the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StatementState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters a statement request may carry.
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    /// The 1-based page number. Defaults to the first page.
    pub page: Option<u64>,
    /// The number of transactions per page.
    pub limit: Option<u64>,
    /// Only include transactions recorded under this category code.
    pub category: Option<String>,
    /// Only include transactions from the last N whole days.
    pub period: Option<u32>,
}

/// The response body for the statement endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    /// The transactions on this page, newest first.
    pub transactions: Vec<Transaction>,
    /// Whether rows matching the same filters remain beyond this page.
    pub has_more: bool,
}

/// A route handler listing one page of the current owner's statement.
///
/// Out-of-range paging values are clamped to the configured defaults rather
/// than rejected.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_transactions_endpoint(
    State(state): State<StatementState>,
    CurrentOwner(owner_id): CurrentOwner,
    Query(query): Query<StatementQuery>,
) -> Result<Json<StatementResponse>, Error> {
    let selection = PageSelection::normalize(query.page, query.limit, &state.pagination_config);
    let filters = StatementFilters {
        category: query.category,
        period_days: query.period,
    };

    let connection = state.db_connection.lock().unwrap();

    let page = list_statement(
        owner_id,
        selection,
        &filters,
        &state.local_timezone,
        OffsetDateTime::now_utc(),
        &connection,
    )?;

    Ok(Json(StatementResponse {
        transactions: page.transactions,
        has_more: page.has_more,
    }))
}
