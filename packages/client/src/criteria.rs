//! Offer list query criteria and the filter/paginate contract shared by all
//! offer sources.

use offerdesk_shared::{OfferRecord, OfferStatus, OfferType};

use crate::config::DEFAULT_PAGE_SIZE;

/// The committed search, filter and page state of an offer list.
///
/// `None` filters match any value. The `with_*` methods that change the
/// result set (search, type, status, page size) reset `page` to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCriteria {
    pub search: String,
    pub offer_type: Option<OfferType>,
    pub status: Option<OfferStatus>,
    /// 1-indexed.
    pub page: usize,
    pub page_size: usize,
}

impl Default for QueryCriteria {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryCriteria {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            offer_type: None,
            status: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self.page = 1;
        self
    }

    pub fn with_type(mut self, offer_type: Option<OfferType>) -> Self {
        self.offer_type = offer_type;
        self.page = 1;
        self
    }

    pub fn with_status(mut self, status: Option<OfferStatus>) -> Self {
        self.status = status;
        self.page = 1;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// The search term to apply, or `None` when the search box is empty.
    ///
    /// The text is used as typed; surrounding whitespace is part of the term.
    pub fn search_term(&self) -> Option<&str> {
        (!self.search.is_empty()).then_some(self.search.as_str())
    }

    /// Index of the first record on the current page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.page_size)
    }

    /// Whether `offer` passes every active filter.
    ///
    /// The search term matches case-insensitively as a substring of the user
    /// name, email, company, or job title.
    pub fn matches(&self, offer: &OfferRecord) -> bool {
        if let Some(offer_type) = self.offer_type {
            if offer.offer_type != offer_type {
                return false;
            }
        }

        if let Some(status) = self.status {
            if offer.status != status {
                return false;
            }
        }

        match self.search_term() {
            Some(term) => {
                let needle = term.to_lowercase();
                [
                    Some(offer.user_name.as_str()),
                    Some(offer.email.as_str()),
                    offer.company.as_deref(),
                    offer.job_title.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    /// Filter `records` and cut out the requested page, keeping source order.
    pub fn apply<'a, I>(&self, records: I) -> QueryResult
    where
        I: IntoIterator<Item = &'a OfferRecord>,
    {
        let matching: Vec<&OfferRecord> =
            records.into_iter().filter(|offer| self.matches(offer)).collect();

        let items = matching
            .iter()
            .skip(self.offset())
            .take(self.page_size)
            .map(|offer| (*offer).clone())
            .collect();

        QueryResult {
            items,
            total_count: matching.len(),
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// One page of offers as returned by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Current page, in source order.
    pub items: Vec<OfferRecord>,
    /// Number of records matching the criteria before pagination.
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

impl QueryResult {
    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count, self.page_size)
    }
}

/// Number of pages needed for `total_count` records; never less than 1.
pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    total_count.div_ceil(page_size.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use offerdesk_shared::OfferId;
    use pretty_assertions::assert_eq;

    fn offer(id: u64, name: &str, offer_type: OfferType, status: OfferStatus) -> OfferRecord {
        OfferRecord {
            id: OfferId::new(id).unwrap(),
            user_name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            company: None,
            job_title: None,
            status,
            offer_type,
            price: 100.0,
        }
    }

    #[test]
    fn test_changing_result_set_resets_page() {
        let criteria = QueryCriteria::new(5).with_page(3);
        assert_eq!(criteria.clone().with_search("x").page, 1);
        assert_eq!(criteria.clone().with_type(Some(OfferType::Yearly)).page, 1);
        assert_eq!(criteria.clone().with_status(None).page, 1);
        assert_eq!(criteria.clone().with_page_size(10).page, 1);
        assert_eq!(criteria.with_page(0).page, 1);
    }

    #[test]
    fn test_search_and_type_combine_with_and() {
        let records = vec![
            offer(1, "Alice", OfferType::Monthly, OfferStatus::Accepted),
            offer(2, "Bob", OfferType::Yearly, OfferStatus::Pending),
        ];

        let criteria = QueryCriteria::new(5)
            .with_search("a")
            .with_type(Some(OfferType::Monthly));
        let result = criteria.apply(&records);

        assert_eq!(result.total_count, 1);
        assert_eq!(result.items[0].user_name, "Alice");
    }

    #[test]
    fn test_search_matches_company_and_job_title() {
        let mut with_company = offer(1, "Zed", OfferType::Monthly, OfferStatus::Accepted);
        with_company.company = Some("Smith-Howard".into());
        let mut with_title = offer(2, "Yan", OfferType::Monthly, OfferStatus::Accepted);
        with_title.job_title = Some("Geophysicist".into());
        let records = vec![with_company, with_title];

        assert_eq!(QueryCriteria::new(5).with_search("HOWARD").apply(&records).total_count, 1);
        assert_eq!(QueryCriteria::new(5).with_search("physic").apply(&records).total_count, 1);
        assert_eq!(QueryCriteria::new(5).with_search("nobody").apply(&records).total_count, 0);
    }

    #[test]
    fn test_empty_search_is_no_filter() {
        let records = vec![offer(1, "Alice", OfferType::Monthly, OfferStatus::Accepted)];
        let result = QueryCriteria::new(5).with_search("").apply(&records);
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn test_search_whitespace_is_significant() {
        let records = vec![
            offer(1, "Ann Smith", OfferType::Monthly, OfferStatus::Accepted),
            offer(2, "Annabel Lee", OfferType::Monthly, OfferStatus::Accepted),
        ];

        let result = QueryCriteria::new(5).with_search("ann ").apply(&records);
        assert_eq!(result.total_count, 1);
        assert_eq!(result.items[0].user_name, "Ann Smith");

        let result = QueryCriteria::new(5).with_search("   ").apply(&records);
        assert_eq!(result.total_count, 0);
    }

    #[test]
    fn test_pagination_slices_in_source_order() {
        let records: Vec<OfferRecord> = (1..=7)
            .map(|i| offer(i, &format!("User{i}"), OfferType::Monthly, OfferStatus::Accepted))
            .collect();

        let first = QueryCriteria::new(5).apply(&records);
        assert_eq!(first.total_count, 7);
        assert_eq!(
            first.items.iter().map(|o| o.id.get()).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );

        let second = QueryCriteria::new(5).with_page(2).apply(&records);
        assert_eq!(
            second.items.iter().map(|o| o.id.get()).collect::<Vec<_>>(),
            vec![6, 7]
        );
        assert_eq!(second.total_pages(), 2);
    }

    #[test]
    fn test_total_pages_never_zero() {
        assert_eq!(total_pages(0, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
    }
}
