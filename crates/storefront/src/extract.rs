//! Extractors whose rejections render as JSON [`AppError`]s.
//!
//! Axum's own `Json`, `Query` and `Path` reject with plain-text bodies; these
//! wrappers keep every error response in the `{"error": ...}` shape.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
