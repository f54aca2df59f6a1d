use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::ids::{OfferId, UserId};

/// Billing plan of an offer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OfferType {
    Yearly,
    Monthly,
    PayAsYouGo,
}

/// Lifecycle status of an offer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OfferStatus {
    Accepted,
    Rejected,
    Pending,
}

/// An offer as listed by the offers API.
///
/// Records are owned by the data source. Edits replace the record at the
/// source; clients refetch instead of patching fields locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: OfferId,
    pub user_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "jobTitle", default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub status: OfferStatus,
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub price: f64,
}

/// Optional terms attached to an offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferAdditions {
    pub refundable: bool,
    pub on_demand: bool,
    pub negotiable: bool,
}

/// Request body for creating or replacing an offer.
///
/// `expired_date` serializes as an ISO calendar date (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOfferInput {
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub user_id: UserId,
    pub expired_date: NaiveDate,
    pub price: f64,
    pub additions: OfferAdditions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_decode_api_record() {
        let json = r#"{
            "id": 4,
            "user_name": "Zachary Rice",
            "email": "valentineamy@rivas.info",
            "phone": "+1-267-312-3505x77215",
            "company": "Ochoa, Morales and Jimenez",
            "jobTitle": "Contracting civil engineer",
            "status": "pending",
            "type": "pay_as_you_go",
            "price": 7026
        }"#;

        let record: OfferRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.get(), 4);
        assert_eq!(record.job_title.as_deref(), Some("Contracting civil engineer"));
        assert_eq!(record.status, OfferStatus::Pending);
        assert_eq!(record.offer_type, OfferType::PayAsYouGo);
        assert_eq!(record.price, 7026.0);
    }

    #[test]
    fn test_decode_record_without_metadata() {
        let json = r#"{"id": 9, "user_name": "Ann", "email": "ann@example.com",
                       "status": "accepted", "type": "monthly", "price": 10.5}"#;

        let record: OfferRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.company, None);
        assert_eq!(record.job_title, None);
        assert_eq!(record.phone, None);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(OfferType::PayAsYouGo.to_string(), "pay_as_you_go");
        assert_eq!(OfferType::from_str("yearly").unwrap(), OfferType::Yearly);
        assert_eq!(OfferStatus::Rejected.as_ref(), "rejected");
        assert!(OfferStatus::from_str("all").is_err());
    }

    #[test]
    fn test_new_offer_body_shape() {
        let input = NewOfferInput {
            offer_type: OfferType::Monthly,
            user_id: UserId::new(2).unwrap(),
            expired_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            price: 120.0,
            additions: OfferAdditions {
                refundable: true,
                on_demand: false,
                negotiable: true,
            },
        };

        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "monthly",
                "user_id": 2,
                "expired_date": "2026-12-31",
                "price": 120.0,
                "additions": {"refundable": true, "on_demand": false, "negotiable": true}
            })
        );
    }
}
