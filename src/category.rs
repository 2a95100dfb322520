//! The category registry: reference data mapping a category code to a
//! display label and a flow direction.
//!
//! Categories are provisioned out-of-band (seeded at database
//! initialization) and are read-only to the ledger. The sign of every
//! balance delta is derived from the direction resolved here, never from
//! category names hardcoded at call sites.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a category's amounts add to or subtract from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Amounts add to the balance (deposits, investment income).
    Inflow,
    /// Amounts subtract from the balance (PIX payments, currency exchange).
    Outflow,
}

impl Direction {
    /// The direction as its stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inflow => "inflow",
            Direction::Outflow => "outflow",
        }
    }

    /// The sign this direction applies to an amount.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Inflow => 1.0,
            Direction::Outflow => -1.0,
        }
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "inflow" => Ok(Direction::Inflow),
            "outflow" => Ok(Direction::Outflow),
            other => Err(FromSqlError::Other(
                format!("unknown direction \"{other}\"").into(),
            )),
        }
    }
}

/// One row of the category registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The unique category code, e.g. "pix".
    pub code: String,
    /// The human-readable display label, e.g. "PIX".
    pub label: String,
    /// The flow direction amounts in this category take.
    pub direction: Direction,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the category table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                code TEXT PRIMARY KEY,
                label TEXT NOT NULL UNIQUE,
                direction TEXT NOT NULL CHECK(direction IN ('inflow', 'outflow'))
                )",
        (),
    )?;

    Ok(())
}

/// Insert the Bytebank transaction kinds if they are not already present.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn seed_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "INSERT OR IGNORE INTO category (code, label, direction) VALUES
                ('pix', 'PIX', 'outflow'),
                ('cambio', 'Câmbio', 'outflow'),
                ('aplicacao', 'Aplicação', 'inflow'),
                ('deposito', 'Depósito', 'inflow')",
        (),
    )?;

    Ok(())
}

/// Resolve a category `code` to its registry row.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if `code` is not in the registry,
/// - or [Error::Upstream] if there is some other SQL error.
pub fn resolve_category(code: &str, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT code, label, direction FROM category WHERE code = :code")?
        .query_row(&[(":code", &code)], map_category_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::InvalidCategory(code.to_owned()),
            error => error.into(),
        })
}

/// List all registered categories, ascending by label.
///
/// # Errors
/// This function will return a [Error::Upstream] if there is an SQL error.
pub fn list_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT code, label, direction FROM category ORDER BY label ASC")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        code: row.get(0)?,
        label: row.get(1)?,
        direction: row.get(2)?,
    })
}

// ============================================================================
// ENDPOINT
// ============================================================================

/// The state needed to list categories.
#[derive(Debug, Clone)]
pub struct CategoriesState {
    /// The database connection holding the category registry.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for the category listing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    /// All registered categories, ascending by label.
    pub categories: Vec<Category>,
}

/// A route handler listing all registered categories.
///
/// Used by clients to populate selection inputs; the order (ascending by
/// label) is part of the contract.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_categories_endpoint(
    State(state): State<CategoriesState>,
) -> Result<Json<CategoriesResponse>, Error> {
    let connection = state.db_connection.lock().unwrap();

    let categories = list_categories(&connection)?;

    Ok(Json(CategoriesResponse { categories }))
}

// ============================================================================
// TESTS
// ============================================================================
