use axum::http::Uri;

use crate::error::AppError;

/// Answer for any path or method no route matched.
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}
