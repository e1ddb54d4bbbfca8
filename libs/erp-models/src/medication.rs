//! Medication variants
//!
//! KBV prescribes one of four medication profiles (PZN, compounding,
//! ingredient, free text); dispenses may additionally carry a contained ePA
//! medication (epa-medication 1.4). Each variant populates a different field
//! subset, so the union is a tagged enum rather than one sparse struct.

use serde::{Deserialize, Serialize};

use crate::types::Ratio;

/// Medication category (Arzneimittelkategorie).
///
/// Wire codes: "00" → `ArzneiUndVerbandmittel`, "01" → `Btm`, "02" → `Amvv`,
/// "03" → `Sonstiges` (KBV 1.1.0 / ePA only); anything else is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MedicationCategory {
    ArzneiUndVerbandmittel,
    Btm,
    Amvv,
    Sonstiges,
    #[default]
    Unknown,
}

/// Product codes a medication may carry.
///
/// At most one code per coding system is expected; the codes are mutually
/// independent options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationIdentifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pzn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snomed: Option<String>,
}

/// One compounding/ingredient component.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub text: String,
    /// Dose form free text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    /// Substance number (ASK)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Free-form amount ("2 Tropfen")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<Ratio>,
}

/// Finished product identified by PZN.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PznMedication {
    pub category: MedicationCategory,
    pub vaccine: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Dose form code (KBV_CS_SFHIR_KBV_DARREICHUNGSFORM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    /// Standard package size code (Normgröße)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norm_size_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Ratio>,
    pub pzn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

/// Pharmacy-compounded preparation (Rezeptur).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundingMedication {
    pub category: MedicationCategory,
    pub vaccine: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Dose form free text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_instructions: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

/// Prescription by active ingredient (Wirkstoffverordnung).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientMedication {
    pub category: MedicationCategory,
    pub vaccine: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norm_size_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Ratio>,
    pub ingredients: Vec<Ingredient>,
}

/// Free-text prescription.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeTextMedication {
    pub category: MedicationCategory,
    pub vaccine: bool,
    pub text: String,
}

/// Medication contained in a dispense, conforming to epa-medication 1.4.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpaMedication {
    pub category: MedicationCategory,
    pub vaccine: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Ratio>,
    pub identifier: MedicationIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    pub ingredients: Vec<Ingredient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
}

/// Closed union over all supported medication profiles.
///
/// `Unknown` is the graceful fallback for unrecognized profiles or versions;
/// orchestrators never abort a bundle because of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Medication {
    Pzn(PznMedication),
    Compounding(CompoundingMedication),
    Ingredient(IngredientMedication),
    FreeText(FreeTextMedication),
    Epa(EpaMedication),
    Unknown,
}

impl Medication {
    pub fn category(&self) -> MedicationCategory {
        match self {
            Medication::Pzn(m) => m.category,
            Medication::Compounding(m) => m.category,
            Medication::Ingredient(m) => m.category,
            Medication::FreeText(m) => m.category,
            Medication::Epa(m) => m.category,
            Medication::Unknown => MedicationCategory::Unknown,
        }
    }

    pub fn is_vaccine(&self) -> bool {
        match self {
            Medication::Pzn(m) => m.vaccine,
            Medication::Compounding(m) => m.vaccine,
            Medication::Ingredient(m) => m.vaccine,
            Medication::FreeText(m) => m.vaccine,
            Medication::Epa(m) => m.vaccine,
            Medication::Unknown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn union_serializes_with_kind_tag() {
        let medication = Medication::FreeText(FreeTextMedication {
            category: MedicationCategory::ArzneiUndVerbandmittel,
            vaccine: false,
            text: "Metformin 850mg".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&medication).unwrap(),
            json!({
                "kind": "freeText",
                "category": "ArzneiUndVerbandmittel",
                "vaccine": false,
                "text": "Metformin 850mg"
            })
        );
        assert_eq!(
            serde_json::to_value(Medication::Unknown).unwrap(),
            json!({ "kind": "unknown" })
        );
    }

    #[test]
    fn category_and_vaccine_delegate_through_the_union() {
        let medication = Medication::Pzn(PznMedication {
            category: MedicationCategory::Btm,
            vaccine: true,
            pzn: "03879429".to_string(),
            ..Default::default()
        });
        assert_eq!(medication.category(), MedicationCategory::Btm);
        assert!(medication.is_vaccine());
        assert_eq!(Medication::Unknown.category(), MedicationCategory::Unknown);
        assert!(!Medication::Unknown.is_vaccine());
    }
}
