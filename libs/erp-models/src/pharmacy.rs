//! Pharmacy search results

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::Address;

/// One opening interval on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningTime {
    pub day: Weekday,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opens: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes: Option<NaiveTime>,
}

/// Opening hours grouped as a flat interval list (a weekday may appear more
/// than once, e.g. split morning/afternoon hours).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpeningHours(pub Vec<OpeningTime>);

impl OpeningHours {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Service a pharmacy offers, classified by `type.coding.code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PharmacyService {
    /// Messenger/courier delivery ("498")
    Delivery { opening_hours: OpeningHours },
    /// Mail-order / online pharmacy ("MOBL")
    Online,
    /// On-site pickup ("OUTPHARM")
    Pickup { opening_hours: OpeningHours },
}

/// Telecom data; URLs are sanitized during extraction (malformed values
/// degrade to an empty string instead of failing the pharmacy).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyContact {
    pub phone: String,
    pub mail: String,
    pub url: String,
}

/// Geographic position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// One pharmacy from a search result bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub contact: PharmacyContact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub services: Vec<PharmacyService>,
}

/// A pharmacy search page: the successfully extracted entries plus the
/// server-reported total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacySearchResult {
    pub total: Option<u64>,
    pub pharmacies: Vec<Pharmacy>,
}
