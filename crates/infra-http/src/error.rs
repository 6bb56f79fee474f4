// reqwest::Error -> AppError (orphan rule: cannot impl From here)

use walkin_core::error::AppError;

pub(crate) fn map_http_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Store(format!("Request timed out: {}", err))
    } else if err.is_connect() {
        AppError::Store(format!("Connection failed: {}", err))
    } else if err.is_decode() {
        AppError::Store(format!("Unexpected response body: {}", err))
    } else {
        AppError::Store(err.to_string())
    }
}

/// Non-2xx answer from a PostgREST table endpoint
pub(crate) fn rows_error(table: &str, status: u16, body: &str) -> AppError {
    AppError::Store(format!(
        "PostgREST {} returned HTTP {}: {}",
        table,
        status,
        body.trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_error_message() {
        let err = rows_error("barbers", 401, "{\"message\":\"JWT expired\"}\n");
        assert_eq!(
            err.to_string(),
            "Queue store error: PostgREST barbers returned HTTP 401: {\"message\":\"JWT expired\"}"
        );
    }
}
