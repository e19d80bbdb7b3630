//! Extractors whose rejections render as error envelopes.
//!
//! axum's stock `Json`, `Query`, `Path` and `Multipart` reject with plain-text bodies;
//! these wrappers route the rejection through [`AppError`] instead.

use axum::extract::{FromRequest, FromRequestParts, Multipart};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `multipart/form-data` body; a missing or bad boundary is a `400` envelope.
#[derive(FromRequest)]
#[from_request(rejection(AppError))]
pub struct ApiMultipart(pub Multipart);
