//! Offerdesk shared types
//!
//! Canonical domain types for onboarding offers, used by the client library
//! and by any presentation layer built on top of it. Field names follow the
//! remote offers API so these types can be (de)serialized straight from the
//! wire.

pub mod ids;
pub mod offer;
pub mod stats;
pub mod user;

pub use ids::{InvalidId, OfferId, UserId};
pub use offer::{NewOfferInput, OfferAdditions, OfferRecord, OfferStatus, OfferType};
pub use stats::{DashboardStats, MonthlyTotals};
pub use user::UserSummary;
