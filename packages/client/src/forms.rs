//! Create/edit offer form and its validation.
//!
//! A form only turns into a [`NewOfferInput`] once every required field is
//! present and well-formed, so incomplete data never reaches a data source.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use offerdesk_shared::{NewOfferInput, OfferAdditions, OfferRecord, OfferType, UserId};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("missing field: {0}")]
    Missing(&'static str),
}

/// Values entered in the offer form.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct OfferForm {
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    /// Selected user; `None` until one is picked.
    #[validate(
        required(message = "Please select a user"),
        range(min = 1, message = "Please select a user")
    )]
    pub user_id: Option<u64>,
    /// Expiry date as entered, `YYYY-MM-DD`.
    #[validate(
        required(message = "Please select an expiry date"),
        custom(function = "validate_iso_date")
    )]
    pub expired_date: Option<String>,
    #[validate(
        required(message = "Please enter a price"),
        custom(function = "validate_price")
    )]
    pub price: Option<f64>,
    #[serde(default)]
    pub additions: OfferAdditions,
}

impl Default for OfferForm {
    fn default() -> Self {
        Self {
            offer_type: OfferType::Monthly,
            user_id: None,
            expired_date: None,
            price: None,
            additions: OfferAdditions::default(),
        }
    }
}

impl OfferForm {
    /// Prefill an edit form from an existing offer.
    ///
    /// Listed offers carry neither the user id nor the expiry date, so those
    /// have to be picked again before the form validates.
    pub fn from_record(record: &OfferRecord) -> Self {
        Self {
            offer_type: record.offer_type,
            price: Some(record.price),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id.get());
        self
    }

    pub fn with_expired_date(mut self, date: NaiveDate) -> Self {
        self.expired_date = Some(date.format(DATE_FORMAT).to_string());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_additions(mut self, additions: OfferAdditions) -> Self {
        self.additions = additions;
        self
    }

    /// Validate the form and build the request body.
    pub fn to_new_offer(&self) -> Result<NewOfferInput, FormError> {
        self.validate()?;

        let user_id = self
            .user_id
            .and_then(|id| UserId::new(id).ok())
            .ok_or(FormError::Missing("user_id"))?;

        let expired_date = self
            .expired_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok())
            .ok_or(FormError::Missing("expired_date"))?;

        let price = self.price.ok_or(FormError::Missing("price"))?;

        Ok(NewOfferInput {
            offer_type: self.offer_type,
            user_id,
            expired_date,
            price,
            additions: self.additions,
        })
    }
}

fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("iso_date")
                .with_message(Cow::Borrowed("Expiry date must be a YYYY-MM-DD date"))
        })
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("price")
            .with_message(Cow::Borrowed("Price must be a non-negative amount")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete_form() -> OfferForm {
        OfferForm::default()
            .with_user(UserId::new(3).unwrap())
            .with_expired_date(NaiveDate::from_ymd_opt(2026, 11, 30).unwrap())
            .with_price(49.0)
    }

    fn failing_fields(err: FormError) -> Vec<String> {
        match err {
            FormError::Validation(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|k| k.to_string())
                    .collect();
                fields.sort();
                fields
            }
            other => vec![other.to_string()],
        }
    }

    #[test]
    fn test_complete_form_builds_input() {
        let input = complete_form().to_new_offer().unwrap();
        assert_eq!(input.offer_type, OfferType::Monthly);
        assert_eq!(input.user_id.get(), 3);
        assert_eq!(input.expired_date.to_string(), "2026-11-30");
        assert_eq!(input.price, 49.0);
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let err = OfferForm::default().to_new_offer().unwrap_err();
        assert_eq!(
            failing_fields(err),
            vec!["expired_date", "price", "user_id"]
        );
    }

    #[test]
    fn test_malformed_date_rejected() {
        let mut form = complete_form();
        form.expired_date = Some("30/11/2026".into());
        assert_eq!(failing_fields(form.to_new_offer().unwrap_err()), vec!["expired_date"]);
    }

    #[test]
    fn test_negative_or_nan_price_rejected() {
        let form = complete_form().with_price(-1.0);
        assert_eq!(failing_fields(form.to_new_offer().unwrap_err()), vec!["price"]);

        let form = complete_form().with_price(f64::NAN);
        assert_eq!(failing_fields(form.to_new_offer().unwrap_err()), vec!["price"]);
    }

    #[test]
    fn test_zero_price_is_allowed() {
        let input = complete_form().with_price(0.0).to_new_offer().unwrap();
        assert_eq!(input.price, 0.0);
    }

    #[test]
    fn test_zero_user_rejected() {
        let mut form = complete_form();
        form.user_id = Some(0);
        assert_eq!(failing_fields(form.to_new_offer().unwrap_err()), vec!["user_id"]);
    }
}
