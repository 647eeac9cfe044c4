//! Business logic shared by the storefront and back office.
//!
//! Services own transactions that span several repositories. Simple reads go
//! straight to the repositories in `crate::db`.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod raffle;
