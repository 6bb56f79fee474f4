// sqlx::Error -> AppError (orphan rule: cannot impl From here)

use walkin_core::error::AppError;

/// Convert sqlx::Error to AppError::Store with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            // SQLite error codes: https://www.sqlite.org/rescode.html
            Some(code) => match code.as_ref() {
                "5" => AppError::Store(format!(
                    "Database locked (SQLITE_BUSY): {}",
                    db_err.message()
                )),
                "13" => AppError::Store(format!("Database full: {}", db_err.message())),
                "787" | "3850" => AppError::Store(format!(
                    "Foreign key constraint violation: {} ({})",
                    db_err.message(),
                    code
                )),
                other => AppError::Store(format!(
                    "Database error [{}]: {}",
                    other,
                    db_err.message()
                )),
            },
            None => AppError::Store(format!("Database error: {}", db_err.message())),
        },
        sqlx::Error::RowNotFound => AppError::Store("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => AppError::Store(format!("Column not found: {}", col)),
        sqlx::Error::ColumnDecode { index, source } => {
            AppError::Store(format!("Cannot decode column {}: {}", index, source))
        }
        // Connection, pool, protocol errors
        _ => AppError::Store(err.to_string()),
    }
}
