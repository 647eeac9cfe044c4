//! Domain models for the storefront.
//!
//! Most models decode straight from rows (`FromRow`, camelCase columns) and
//! convert into the API views defined in `brandbazaar_core::dto`.

pub mod account;
pub mod order;
pub mod product;
pub mod raffle;
pub mod review;
pub mod session;
pub mod user;

pub use account::{Address, PaymentMethod};
pub use order::{Order, OrderItem};
pub use product::{Product, ProductListing, Variant, VariantWithProduct};
pub use raffle::{Raffle, RaffleEntry, RaffleListing};
pub use review::Review;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
