//! Request body extractor that reports bad JSON in the API error format

use axum::extract::FromRequest;
use payscope_common::errors::AppError;

/// `axum::Json` with rejections mapped to `AppError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
