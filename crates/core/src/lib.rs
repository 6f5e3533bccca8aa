//! `forgepos-core`: shared building blocks for the point-of-sale workspace.
//!
//! This crate contains **pure** primitives (no infrastructure concerns).

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::DomainError;
pub use id::{ProductId, SupplierId, VariantId};
