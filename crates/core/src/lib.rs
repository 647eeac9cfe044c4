//! BrandBazaar Core - Shared types library.
//!
//! This crate provides common types used across all BrandBazaar components:
//! - `storefront` - Customer-facing JSON API
//! - `admin` - Back-office JSON API
//! - `cli` - Command-line tools for migrations, seeding, and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types, validation, and pure domain rules - no
//! I/O, no database access, no HTTP. This keeps it lightweight and lets both
//! binaries agree on the same request/response contracts.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, money, statuses, and levels
//! - [`dto`] - Request/response payloads exchanged over the REST API
//! - [`validation`] - Field-level validation errors and the [`Validate`] trait
//! - [`pagination`] - Page requests and paginated responses
//! - [`pricing`] - Shipping, order totals, and XP awards
//! - [`raffle`] - Raffle eligibility and winner-selection rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod dto;
pub mod pagination;
pub mod pricing;
pub mod raffle;
pub mod types;
pub mod validation;

pub use pagination::{PageRequest, Paginated};
pub use types::*;
pub use validation::{Validate, ValidationErrors};
