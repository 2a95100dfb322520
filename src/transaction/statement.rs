//! The paginated statement: an owner's ledger rows, newest first, optionally
//! narrowed by category and by a trailing period of whole days.

use rusqlite::{Connection, params_from_iter, types::Value};
use time::OffsetDateTime;

use crate::{
    Error, owner::OwnerId, pagination::PageSelection, timestamp, timezone::start_of_day_days_ago,
};

use super::core::{Transaction, map_transaction_row};

/// The optional filters a statement request may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementFilters {
    /// Only include transactions recorded under this category code.
    pub category: Option<String>,
    /// Only include transactions from the last N whole days, counted from
    /// the start of the day N days ago in the application timezone.
    pub period_days: Option<u32>,
}

/// One page of an owner's statement.
#[derive(Debug, PartialEq)]
pub struct StatementPage {
    /// The transactions on this page, newest first.
    pub transactions: Vec<Transaction>,
    /// Whether rows matching the same filters remain beyond this page.
    pub has_more: bool,
}

/// Retrieve one page of `owner_id`'s statement.
///
/// Rows are ordered newest first, with the row ID breaking timestamp ties,
/// so repeated requests page through the same sequence. `has_more` is
/// computed against the count of rows matching the filters, not the whole
/// ledger. The period lower bound is inclusive.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTimezone] if `timezone` is not a canonical timezone name,
/// - [Error::InvalidInput] if the period is out of the representable range,
/// - or [Error::Upstream] if there is an SQL error.
pub fn list_statement(
    owner_id: OwnerId,
    selection: PageSelection,
    filters: &StatementFilters,
    timezone: &str,
    now_utc: OffsetDateTime,
    connection: &Connection,
) -> Result<StatementPage, Error> {
    let mut where_clauses = vec!["owner_id = ?1".to_owned()];
    let mut query_parameters = vec![Value::Integer(owner_id.as_i64())];

    if let Some(category) = &filters.category {
        where_clauses.push(format!("category = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(category.clone()));
    }

    if let Some(days) = filters.period_days {
        let since = start_of_day_days_ago(timezone, days, now_utc)?;
        where_clauses.push(format!("created_at >= ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(timestamp::to_db_string(since)));
    }

    let where_clause = where_clauses.join(" AND ");

    // SQLite hands COUNT back as an i64; it cannot be negative.
    let total: i64 = connection.query_row(
        &format!("SELECT COUNT(id) FROM \"transaction\" WHERE {where_clause}"),
        params_from_iter(query_parameters.iter()),
        |row| row.get(0),
    )?;
    let total = u64::try_from(total).unwrap_or_default();

    let transactions = connection
        .prepare(&format!(
            "SELECT id, owner_id, amount, category, direction, created_at
                FROM \"transaction\"
                WHERE {where_clause}
                ORDER BY created_at DESC, id DESC
                LIMIT {} OFFSET {}",
            selection.limit,
            selection.offset()
        ))?
        .query_map(params_from_iter(query_parameters.iter()), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StatementPage {
        transactions,
        has_more: selection.has_more(total),
    })
}
