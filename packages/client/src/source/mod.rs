//! Offer data sources and the user directory.
//!
//! [`OfferSource`] is the seam between the query pipeline and whatever serves
//! offers: the remote API ([`HttpOfferSource`]) or the in-memory stand-in
//! ([`InMemoryOfferSource`]). Both honour the filter and pagination contract
//! defined by [`QueryCriteria`](crate::criteria::QueryCriteria).

mod http;
mod memory;

use async_trait::async_trait;

use offerdesk_shared::{NewOfferInput, OfferId, OfferRecord, UserSummary};

use crate::criteria::{QueryCriteria, QueryResult};
use crate::error::SourceError;
use crate::session::AccessToken;

pub use http::{HttpOfferSource, LoginResponse};
pub use memory::{InMemoryOfferSource, InMemoryUserDirectory};

/// Minimum number of characters before the user picker queries the directory.
pub const MIN_USER_SEARCH_LEN: usize = 2;

/// Trait for offer data sources, enabling mocking in tests.
///
/// Every call carries the session token, if any; sources attach it to the
/// request and never store it.
#[async_trait]
pub trait OfferSource: Send + Sync {
    /// One page of offers matching `criteria`.
    async fn query(
        &self,
        criteria: &QueryCriteria,
        token: Option<&AccessToken>,
    ) -> Result<QueryResult, SourceError>;

    async fn get(&self, id: OfferId, token: Option<&AccessToken>)
        -> Result<OfferRecord, SourceError>;

    async fn create(
        &self,
        offer: &NewOfferInput,
        token: Option<&AccessToken>,
    ) -> Result<OfferRecord, SourceError>;

    /// Replace the offer stored under `id`.
    async fn update(
        &self,
        id: OfferId,
        offer: &NewOfferInput,
        token: Option<&AccessToken>,
    ) -> Result<OfferRecord, SourceError>;

    async fn remove(&self, id: OfferId, token: Option<&AccessToken>) -> Result<(), SourceError>;
}

/// Lookup of users an offer can be sent to.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn search(&self, text: &str) -> Result<Vec<UserSummary>, SourceError>;
}

/// Search the directory for the user picker.
///
/// Text shorter than [`MIN_USER_SEARCH_LEN`] characters (after trimming)
/// returns no users without querying the directory.
pub async fn lookup_users<D>(directory: &D, text: &str) -> Result<Vec<UserSummary>, SourceError>
where
    D: UserDirectory + ?Sized,
{
    let text = text.trim();
    if text.chars().count() < MIN_USER_SEARCH_LEN {
        return Ok(Vec::new());
    }
    directory.search(text).await
}
