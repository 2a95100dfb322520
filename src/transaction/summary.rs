//! A per-category summary of an owner's recent activity: how many
//! transactions each category saw over the trailing window and the net
//! signed amount across all of them.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    owner::{CurrentOwner, OwnerId},
    timestamp,
    timezone::start_of_day_days_ago,
};

/// How many whole days the summary looks back.
pub const SUMMARY_WINDOW_DAYS: u32 = 30;

/// The activity in one category over the summary window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    /// The category code.
    pub category: String,
    /// How many transactions were recorded under the category.
    pub count: u64,
    /// The sum of the (unsigned) amounts recorded under the category.
    pub total_amount: f64,
}

/// An owner's ledger activity over the trailing summary window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsSummary {
    /// The total number of transactions in the window.
    pub total_transactions: u64,
    /// The signed sum of all contributions in the window.
    pub net_amount: f64,
    /// The per-category breakdown, ascending by category code.
    pub categories: Vec<CategorySummary>,
}

/// Summarize `owner_id`'s ledger over the trailing [SUMMARY_WINDOW_DAYS]
/// whole days, counted in `timezone`.
///
/// The net amount uses the direction snapshots stored on the rows, so it
/// agrees with the balance contributions the rows actually made.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTimezone] if `timezone` is not a canonical timezone name,
/// - or [Error::Upstream] if there is an SQL error.
pub fn summarize_transactions(
    owner_id: OwnerId,
    timezone: &str,
    now_utc: OffsetDateTime,
    connection: &Connection,
) -> Result<TransactionsSummary, Error> {
    let since = start_of_day_days_ago(timezone, SUMMARY_WINDOW_DAYS, now_utc)?;

    let rows = connection
        .prepare(
            "SELECT category,
                    COUNT(id),
                    SUM(amount),
                    SUM(CASE direction WHEN 'outflow' THEN -amount ELSE amount END)
                FROM \"transaction\"
                WHERE owner_id = ?1 AND created_at >= ?2
                GROUP BY category
                ORDER BY category ASC",
        )?
        .query_map((owner_id, timestamp::to_db_string(since)), |row| {
            Ok((
                CategorySummary {
                    category: row.get(0)?,
                    // SQLite hands COUNT back as an i64; it cannot be negative.
                    count: u64::try_from(row.get::<_, i64>(1)?).unwrap_or_default(),
                    total_amount: row.get(2)?,
                },
                row.get::<_, f64>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut summary = TransactionsSummary {
        total_transactions: 0,
        net_amount: 0.0,
        categories: Vec::with_capacity(rows.len()),
    };

    for (category_summary, net) in rows {
        summary.total_transactions += category_summary.count;
        summary.net_amount += net;
        summary.categories.push(category_summary);
    }

    Ok(summary)
}

/// The state needed to serve the summary endpoint.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The timezone used for the window's day boundary.
    pub local_timezone: String,
    /// The database connection holding the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler summarizing the owner's recent ledger activity.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn summary_endpoint(
    State(state): State<SummaryState>,
    CurrentOwner(owner_id): CurrentOwner,
) -> Result<Json<TransactionsSummary>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let summary = summarize_transactions(
        owner_id,
        &state.local_timezone,
        OffsetDateTime::now_utc(),
        &connection,
    )?;

    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        category::resolve_category, db::initialize, owner::OwnerId, timezone::DEFAULT_TIMEZONE,
        transaction::insert_transaction_row,
    };

    use super::{CategorySummary, summarize_transactions};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn seed_transaction(
        conn: &Connection,
        owner: OwnerId,
        amount: f64,
        category_code: &str,
        created_at: OffsetDateTime,
    ) {
        let category = resolve_category(category_code, conn).unwrap();
        insert_transaction_row(owner, amount, &category, created_at, conn).unwrap();
    }

    #[test]
    fn empty_ledger_summarizes_to_zero() {
        let conn = get_test_connection();
        let now = datetime!(2026-01-10 15:00:00 UTC);

        let summary =
            summarize_transactions(OwnerId::new(1), DEFAULT_TIMEZONE, now, &conn).unwrap();

        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.net_amount, 0.0);
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn groups_by_category_with_signed_net() {
        let conn = get_test_connection();
        let owner = OwnerId::new(1);
        let now = datetime!(2026-01-10 15:00:00 UTC);
        seed_transaction(&conn, owner, 100.0, "deposito", datetime!(2026-01-05 12:00:00 UTC));
        seed_transaction(&conn, owner, 50.0, "deposito", datetime!(2026-01-06 12:00:00 UTC));
        seed_transaction(&conn, owner, 30.0, "pix", datetime!(2026-01-07 12:00:00 UTC));

        let summary = summarize_transactions(owner, DEFAULT_TIMEZONE, now, &conn).unwrap();

        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.net_amount, 120.0);
        assert_eq!(
            summary.categories,
            vec![
                CategorySummary {
                    category: "deposito".to_owned(),
                    count: 2,
                    total_amount: 150.0
                },
                CategorySummary {
                    category: "pix".to_owned(),
                    count: 1,
                    total_amount: 30.0
                },
            ]
        );
    }

    #[test]
    fn ignores_transactions_outside_the_window() {
        let conn = get_test_connection();
        let owner = OwnerId::new(1);
        let now = datetime!(2026-01-31 15:00:00 UTC);
        seed_transaction(&conn, owner, 100.0, "deposito", datetime!(2026-01-30 12:00:00 UTC));
        seed_transaction(&conn, owner, 999.0, "deposito", datetime!(2025-11-01 12:00:00 UTC));

        let summary = summarize_transactions(owner, DEFAULT_TIMEZONE, now, &conn).unwrap();

        assert_eq!(summary.total_transactions, 1);
        assert_eq!(summary.net_amount, 100.0);
    }

    #[test]
    fn summary_is_scoped_to_the_owner() {
        let conn = get_test_connection();
        let now = datetime!(2026-01-10 15:00:00 UTC);
        seed_transaction(
            &conn,
            OwnerId::new(1),
            100.0,
            "deposito",
            datetime!(2026-01-05 12:00:00 UTC),
        );
        seed_transaction(
            &conn,
            OwnerId::new(2),
            50.0,
            "pix",
            datetime!(2026-01-05 12:00:00 UTC),
        );

        let summary =
            summarize_transactions(OwnerId::new(1), DEFAULT_TIMEZONE, now, &conn).unwrap();

        assert_eq!(summary.total_transactions, 1);
        assert_eq!(summary.net_amount, 100.0);
    }
}
