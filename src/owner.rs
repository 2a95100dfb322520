//! The account owner identity and the extractor that resolves it.
//!
//! Authentication is not this service's job. A fronting auth layer validates
//! the session and forwards the resolved account owner in the `x-owner-id`
//! header; every query and mutation in the core is scoped by that ID.

use std::fmt::Display;

use axum::{extract::FromRequestParts, http::request::Parts};
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The header carrying the resolved owner identity.
pub const OWNER_ID_HEADER: &str = "x-owner-id";

/// The ID of the account that owns a set of ledger rows and a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Wrap a raw database ID as an owner ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The owner ID as the underlying integer type.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for OwnerId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for OwnerId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(OwnerId)
    }
}

/// The owner identity attached to the current request.
///
/// Handlers receive this as an extractor argument. Requests without a
/// parseable `x-owner-id` header are rejected with [Error::Unauthorized]
/// before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct CurrentOwner(pub OwnerId);

impl<S> FromRequestParts<S> for CurrentOwner
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OWNER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::Unauthorized)?;

        let id: i64 = raw.parse().map_err(|_| {
            tracing::warn!("Rejecting request with unparseable {OWNER_ID_HEADER} header");
            Error::Unauthorized
        })?;

        Ok(CurrentOwner(OwnerId::new(id)))
    }
}
