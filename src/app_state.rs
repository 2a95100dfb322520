//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, events::LedgerEvents, pagination::PaginationConfig};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The timezone used for statement day boundaries, as a canonical
    /// timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,

    /// The config that controls how to page statement data.
    pub pagination_config: PaginationConfig,

    /// The database connection.
    ///
    /// The mutex is also the per-owner serialization point for ledger
    /// mutations: a mutation holds it for its whole read-modify-write, so
    /// no two mutations can interleave on a stale balance.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The channel ledger mutations are announced on.
    pub events: LedgerEvents,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models and seeding the category registry.
    /// `local_timezone` should be a valid, canonical timezone name, e.g.
    /// "America/Sao_Paulo".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
            events: LedgerEvents::new(),
        })
    }
}
