//! Extractor wrappers whose rejections use the JSON error envelope.
//!
//! axum's stock `Json`, `Query` and `Path` reject with plain-text bodies;
//! these route the rejection through [`AppError`] so malformed input
//! becomes a 400 with the usual `{ success: false, ... }` shape.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
