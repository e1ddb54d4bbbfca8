//! Shared value types

use serde::{Deserialize, Serialize};

/// Postal address as carried by KBV resources.
///
/// `line` keeps the original order of address lines; street and house number
/// are not split out because the source format does not reliably separate
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// FHIR Quantity with the value kept in source form.
///
/// KBV packaging sizes are free-form strings ("12", "2x25", "N1"); parsing
/// them to numbers would lose information the UI needs verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// FHIR Ratio (numerator/denominator pair).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numerator: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator: Option<Quantity>,
}

impl Ratio {
    pub fn of(value: &str, unit: Option<&str>, denominator: &str) -> Self {
        Ratio {
            numerator: Some(Quantity {
                value: Some(value.to_string()),
                unit: unit.map(str::to_string),
            }),
            denominator: Some(Quantity {
                value: Some(denominator.to_string()),
                unit: None,
            }),
        }
    }
}
