//! Request and response payloads for the REST API.
//!
//! Request types implement [`Validate`](crate::Validate); response types are
//! plain serializable views. Everything is camelCase on the wire.

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod order;
pub mod product;
pub mod raffle;
pub mod review;

pub use account::*;
pub use admin::*;
pub use auth::*;
pub use cart::*;
pub use order::*;
pub use product::*;
pub use raffle::*;
pub use review::*;
