//! Core types for BrandBazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod level;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use level::{LevelProgress, LevelTier};
pub use money::{Money, MoneyError};
pub use status::*;
