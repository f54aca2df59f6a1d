use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use offerdesk_shared::{
    NewOfferInput, OfferId, OfferRecord, OfferStatus, OfferType, UserId, UserSummary,
};

use crate::criteria::{QueryCriteria, QueryResult};
use crate::error::SourceError;
use crate::session::AccessToken;
use crate::source::{OfferSource, UserDirectory};

/// Offer source backed by a vector, with the same contract as the remote API.
///
/// Offers keep insertion order. New offers start out `pending` and take the
/// name and email of the referenced user.
#[derive(Debug, Default)]
pub struct InMemoryOfferSource {
    state: Mutex<Store>,
    users: Vec<UserSummary>,
    require_token: bool,
}

#[derive(Debug, Default)]
struct Store {
    offers: Vec<OfferRecord>,
    last_id: u64,
}

impl InMemoryOfferSource {
    pub fn new(offers: Vec<OfferRecord>, users: Vec<UserSummary>) -> Self {
        let last_id = offers.iter().map(|o| o.id.get()).max().unwrap_or(0);
        Self {
            state: Mutex::new(Store { offers, last_id }),
            users,
            require_token: false,
        }
    }

    /// The dashboard's sample offers and users.
    pub fn with_sample_data() -> Self {
        Self::new(sample_offers(), sample_users())
    }

    /// Reject every call made without a token, like the remote API does.
    pub fn require_token(mut self) -> Self {
        self.require_token = true;
        self
    }

    /// Snapshot of all stored offers in insertion order.
    pub fn offers(&self) -> Vec<OfferRecord> {
        self.store().offers.clone()
    }

    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn authorize(&self, token: Option<&AccessToken>) -> Result<(), SourceError> {
        if self.require_token && token.is_none() {
            return Err(SourceError::Unauthorized);
        }
        Ok(())
    }

    fn find_user(&self, user_id: UserId) -> Result<&UserSummary, SourceError> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or(SourceError::UnknownUser(user_id))
    }
}

#[async_trait]
impl OfferSource for InMemoryOfferSource {
    async fn query(
        &self,
        criteria: &QueryCriteria,
        token: Option<&AccessToken>,
    ) -> Result<QueryResult, SourceError> {
        self.authorize(token)?;
        Ok(criteria.apply(&self.store().offers))
    }

    async fn get(
        &self,
        id: OfferId,
        token: Option<&AccessToken>,
    ) -> Result<OfferRecord, SourceError> {
        self.authorize(token)?;
        self.store()
            .offers
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(SourceError::NotFound(id))
    }

    async fn create(
        &self,
        offer: &NewOfferInput,
        token: Option<&AccessToken>,
    ) -> Result<OfferRecord, SourceError> {
        self.authorize(token)?;
        let user = self.find_user(offer.user_id)?;

        let mut store = self.store();
        store.last_id += 1;
        let id = OfferId::new(store.last_id)
            .map_err(|e| SourceError::Decode(format!("invalid offer id: {e}")))?;

        let record = OfferRecord {
            id,
            user_name: user.name.clone(),
            email: user.email.clone(),
            phone: None,
            company: None,
            job_title: None,
            status: OfferStatus::Pending,
            offer_type: offer.offer_type,
            price: offer.price,
        };
        store.offers.push(record.clone());

        tracing::debug!(offer_id = %id, user_id = %offer.user_id, "offer created in memory");
        Ok(record)
    }

    async fn update(
        &self,
        id: OfferId,
        offer: &NewOfferInput,
        token: Option<&AccessToken>,
    ) -> Result<OfferRecord, SourceError> {
        self.authorize(token)?;
        let user = self.find_user(offer.user_id)?;

        let mut store = self.store();
        let existing = store
            .offers
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(SourceError::NotFound(id))?;

        *existing = OfferRecord {
            id,
            user_name: user.name.clone(),
            email: user.email.clone(),
            phone: existing.phone.take(),
            company: existing.company.take(),
            job_title: existing.job_title.take(),
            status: existing.status,
            offer_type: offer.offer_type,
            price: offer.price,
        };

        Ok(existing.clone())
    }

    async fn remove(&self, id: OfferId, token: Option<&AccessToken>) -> Result<(), SourceError> {
        self.authorize(token)?;
        let mut store = self.store();
        let before = store.offers.len();
        store.offers.retain(|o| o.id != id);
        if store.offers.len() == before {
            return Err(SourceError::NotFound(id));
        }
        Ok(())
    }
}

/// User directory backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Vec<UserSummary>,
}

impl InMemoryUserDirectory {
    pub fn new(users: Vec<UserSummary>) -> Self {
        Self { users }
    }

    pub fn with_sample_data() -> Self {
        Self::new(sample_users())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn search(&self, text: &str) -> Result<Vec<UserSummary>, SourceError> {
        let needle = text.to_lowercase();
        Ok(self
            .users
            .iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

const SAMPLE_OFFERS: &[(u64, &str, &str, &str, &str, &str, OfferStatus, OfferType, f64)] = &[
    (
        1,
        "Sharon Flores",
        "ihenderson@yahoo.com",
        "+1-411-953-1969x21957",
        "Conley, Rodriguez and Kerr",
        "Printmaker",
        OfferStatus::Accepted,
        OfferType::Yearly,
        4366.0,
    ),
    (
        2,
        "Danielle Reed",
        "xmorales@ryan.com",
        "(754)912-6038",
        "Smith-Howard",
        "Housing manager/officer",
        OfferStatus::Accepted,
        OfferType::Monthly,
        6293.0,
    ),
    (
        3,
        "Jose Hogan",
        "suzanne60@phillips.com",
        "+1-130-026-7796x674",
        "White, Oconnor and Wu",
        "Surveyor, land/geomatics",
        OfferStatus::Rejected,
        OfferType::Yearly,
        1422.0,
    ),
    (
        4,
        "Zachary Rice",
        "valentineamy@rivas.info",
        "+1-267-312-3505x77215",
        "Ochoa, Morales and Jimenez",
        "Contracting civil engineer",
        OfferStatus::Pending,
        OfferType::PayAsYouGo,
        7026.0,
    ),
    (
        5,
        "Thomas Herrera",
        "monroezachary@walls.com",
        "448-539-3421",
        "Jordan, Perkins and Stafford",
        "Geophysicist/field seismologist",
        OfferStatus::Accepted,
        OfferType::Monthly,
        5749.0,
    ),
];

fn sample_offers() -> Vec<OfferRecord> {
    SAMPLE_OFFERS
        .iter()
        .filter_map(|&(id, name, email, phone, company, title, status, offer_type, price)| {
            Some(OfferRecord {
                id: OfferId::new(id).ok()?,
                user_name: name.into(),
                email: email.into(),
                phone: Some(phone.into()),
                company: Some(company.into()),
                job_title: Some(title.into()),
                status,
                offer_type,
                price,
            })
        })
        .collect()
}

fn sample_users() -> Vec<UserSummary> {
    SAMPLE_OFFERS
        .iter()
        .filter_map(|&(id, name, email, ..)| {
            Some(UserSummary {
                id: UserId::new(id).ok()?,
                name: name.into(),
                email: email.into(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use offerdesk_shared::OfferAdditions;
    use pretty_assertions::assert_eq;

    fn input(user_id: u64, price: f64) -> NewOfferInput {
        NewOfferInput {
            offer_type: OfferType::Yearly,
            user_id: UserId::new(user_id).unwrap(),
            expired_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            price,
            additions: OfferAdditions::default(),
        }
    }

    #[tokio::test]
    async fn test_sample_data_filters() {
        let source = InMemoryOfferSource::with_sample_data();

        let criteria = QueryCriteria::new(5).with_status(Some(OfferStatus::Accepted));
        let result = source.query(&criteria, None).await.unwrap();
        assert_eq!(result.total_count, 3);

        let criteria = QueryCriteria::new(5).with_search("GEOPHYSICIST");
        let result = source.query(&criteria, None).await.unwrap();
        assert_eq!(result.items[0].user_name, "Thomas Herrera");
    }

    #[tokio::test]
    async fn test_create_assigns_next_id_and_appends() {
        let source = InMemoryOfferSource::with_sample_data();

        let created = source.create(&input(2, 99.0), None).await.unwrap();
        assert_eq!(created.id.get(), 6);
        assert_eq!(created.user_name, "Danielle Reed");
        assert_eq!(created.status, OfferStatus::Pending);
        assert_eq!(source.offers().last().map(|o| o.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_user() {
        let source = InMemoryOfferSource::with_sample_data();
        let err = source.create(&input(42, 1.0), None).await.unwrap_err();
        assert!(matches!(err, SourceError::UnknownUser(id) if id.get() == 42));
        assert_eq!(source.offers().len(), 5);
    }

    #[tokio::test]
    async fn test_update_replaces_record_in_place() {
        let source = InMemoryOfferSource::with_sample_data();
        let id = OfferId::new(3).unwrap();

        let updated = source.update(id, &input(1, 10.0), None).await.unwrap();
        assert_eq!(updated.user_name, "Sharon Flores");
        assert_eq!(updated.price, 10.0);
        assert_eq!(updated.status, OfferStatus::Rejected);
        assert_eq!(source.offers()[2], updated);
    }

    #[tokio::test]
    async fn test_remove_missing_offer_is_not_found() {
        let source = InMemoryOfferSource::with_sample_data();
        let id = OfferId::new(5).unwrap();

        source.remove(id, None).await.unwrap();
        let err = source.remove(id, None).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
        assert!(matches!(source.get(id, None).await, Err(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_required_token() {
        let source = InMemoryOfferSource::with_sample_data().require_token();
        let criteria = QueryCriteria::default();

        let err = source.query(&criteria, None).await.unwrap_err();
        assert!(matches!(err, SourceError::Unauthorized));

        let token = AccessToken::new("t");
        assert!(source.query(&criteria, Some(&token)).await.is_ok());
    }

    #[tokio::test]
    async fn test_user_directory_search() {
        let directory = InMemoryUserDirectory::with_sample_data();
        let users = directory.search("ryan").await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Danielle Reed");
    }
}
