//! Atelier Core - Shared domain types.
//!
//! This crate provides the types shared by every Atelier component:
//! - `api` - REST backend for content, clients and appointments
//! - `site` - Public server-rendered marketing site
//! - `cli` - Migrations, admin accounts and seed data
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no database access and
//! no HTTP clients. Database mappings are compiled in behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, phones, slugs, prices, statuses and the
//!   appointment time slot rules
//! - `telemetry` - Log subscriber, Sentry and graceful shutdown for the
//!   server binaries (`telemetry` feature)

#![cfg_attr(not(test), forbid(unsafe_code))]

#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod types;

pub use types::*;
