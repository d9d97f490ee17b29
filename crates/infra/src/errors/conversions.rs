//! Conversions from external infrastructure errors into domain errors.

use guildlink_domain::GuildLinkError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GuildLinkError);

impl From<InfraError> for GuildLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GuildLinkError> for InfraError {
    fn from(value: GuildLinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoGuildLinkError {
    fn into_guildlink(self) -> GuildLinkError;
}

/// `true` for SQLite `UNIQUE` constraint failures (extended code 2067).
pub fn is_unique_violation(err: &SqlError) -> bool {
    matches!(
        err,
        SqlError::SqliteFailure(inner, _)
            if inner.code == rusqlite::ffi::ErrorCode::ConstraintViolation
                && inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → GuildLinkError */
/* -------------------------------------------------------------------------- */

impl IntoGuildLinkError for SqlError {
    fn into_guildlink(self) -> GuildLinkError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        GuildLinkError::StoreUnavailable("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        GuildLinkError::StoreUnavailable("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        GuildLinkError::InvalidInput(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::CannotOpen, _) => {
                        GuildLinkError::StoreUnavailable(format!("cannot open database: {message}"))
                    }
                    _ => GuildLinkError::StoreUnavailable(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => GuildLinkError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                GuildLinkError::StoreUnavailable(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                GuildLinkError::StoreUnavailable(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => GuildLinkError::Config(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => GuildLinkError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_guildlink())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → GuildLinkError */
/* -------------------------------------------------------------------------- */

impl IntoGuildLinkError for r2d2::Error {
    fn into_guildlink(self) -> GuildLinkError {
        GuildLinkError::StoreUnavailable(format!("connection pool: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_guildlink())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → GuildLinkError */
/* -------------------------------------------------------------------------- */

impl IntoGuildLinkError for std::io::Error {
    fn into_guildlink(self) -> GuildLinkError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => GuildLinkError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => {
                GuildLinkError::Persistence(format!("permission denied: {self}"))
            }
            _ => GuildLinkError::Persistence(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_guildlink())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → GuildLinkError */
/* -------------------------------------------------------------------------- */

impl IntoGuildLinkError for serde_json::Error {
    fn into_guildlink(self) -> GuildLinkError {
        use serde_json::error::Category;

        match self.classify() {
            Category::Io => GuildLinkError::Persistence(self.to_string()),
            Category::Syntax | Category::Data | Category::Eof => {
                GuildLinkError::InvalidInput(format!("malformed JSON: {self}"))
            }
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_guildlink())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
