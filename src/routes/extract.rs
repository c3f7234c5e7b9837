use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections answer with the API's `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
