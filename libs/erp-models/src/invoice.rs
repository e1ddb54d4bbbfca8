//! PKV dispense/billing records (DAV Abgabedaten)

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::prescription::Organization;

/// Product coding system a billing line was matched against.
///
/// Resolution priority during extraction is PZN, then TA1, then HMNR; the
/// first matching system wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "system", content = "code", rename_all = "camelCase")]
pub enum ItemCode {
    Pzn(String),
    Ta1(String),
    Hmnr(String),
}

impl ItemCode {
    pub fn code(&self) -> &str {
        match self {
            ItemCode::Pzn(c) | ItemCode::Ta1(c) | ItemCode::Hmnr(c) => c,
        }
    }
}


/// Price of one billing line: gross amount plus VAT percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComponent {
    pub value: Decimal,
    /// VAT percentage (MwSt-Satz)
    pub tax: Decimal,
}

/// One billing line of the dispense data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeableItem {
    pub code: ItemCode,
    pub text: String,
    pub factor: Decimal,
    pub price: PriceComponent,
    /// Partial quantity dispensing (Teilmengenabgabe) detected on this line
    pub partial_quantity_delivery: bool,
    /// PZN of the donor package, only present for partial quantity lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spender_pzn: Option<String>,
}

/// The invoice part of a PKV dispense bundle.
///
/// `chargeable_items` is non-empty when extraction succeeds. Depending on the
/// first line's code, additional data is interpreted as separate delivery
/// items (`additional_dispense_items`) or as human-readable production /
/// compounding narratives (`additional_information`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub total_additional_fee: Decimal,
    pub total_brutto_amount: Decimal,
    pub currency: String,
    pub chargeable_items: Vec<ChargeableItem>,
    pub additional_dispense_items: Vec<ChargeableItem>,
    pub additional_information: Vec<String>,
}

/// Fully extracted PKV dispense bundle (DAV-PKV-PR-ERP-AbgabedatenBundle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceData {
    pub pharmacy: Organization,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_handed_over: Option<DateTime<FixedOffset>>,
    pub invoice: Invoice,
}

/// GEM_ERPCHRG ChargeItem wrapper referencing the three signed bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeItem {
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
    pub entered_date: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription_bundle_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_bundle_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispense_bundle_reference: Option<String>,
}
