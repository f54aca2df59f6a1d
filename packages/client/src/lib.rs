//! Offerdesk client - Offer list query pipeline for the onboarding dashboard.
//!
//! This crate provides the client side of the onboarding offers dashboard:
//! an offer list that combines debounced search, type and status filters and
//! pagination against a remote offers API or an in-memory stand-in, plus the
//! session and offer form the dashboard needs around it.
//!
//! # Example
//!
//! ```
//! use offerdesk_client::criteria::QueryCriteria;
//! use offerdesk_client::source::InMemoryOfferSource;
//! use offerdesk_shared::OfferStatus;
//!
//! let source = InMemoryOfferSource::with_sample_data();
//! let criteria = QueryCriteria::new(5).with_status(Some(OfferStatus::Accepted));
//! let result = criteria.apply(&source.offers());
//! assert_eq!(result.total_count, 3);
//! ```
//!
//! # Architecture
//!
//! - [`pipeline`]: Query pipeline owning search, filter and page state
//! - [`criteria`]: Query criteria and the filter/paginate contract
//! - [`source`]: Offer sources (HTTP and in-memory) and the user directory
//! - [`session`]: Bearer token session and the auth provider trait
//! - [`forms`]: Offer form validation
//! - [`debounce`]: Single-slot debounce timer
//! - [`config`]: Environment-driven configuration
//! - [`error`]: Error types and Result alias

pub mod config;
pub mod criteria;
pub mod debounce;
pub mod error;
pub mod forms;
pub mod pipeline;
pub mod session;
pub mod source;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use config::ClientConfig;
pub use criteria::{QueryCriteria, QueryResult};
pub use error::{ClientError, MutationError, Result, SourceError};
pub use forms::{FormError, OfferForm};
pub use pipeline::{OfferQueryPipeline, PipelineState, QueryStatus};
pub use session::{AccessToken, AuthProvider, Session, SessionUser};
pub use source::{
    lookup_users, HttpOfferSource, InMemoryOfferSource, InMemoryUserDirectory, LoginResponse,
    OfferSource, UserDirectory,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
