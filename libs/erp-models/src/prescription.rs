//! Prescription participants and the MedicationRequest record
//!
//! These records are produced from KBV prescription bundles (profile
//! `KBV_PR_ERP_Bundle`, versions 1.0.2 and 1.1.0).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::medication::Medication;
use crate::types::{Address, Ratio};

/// Prescribing or dispensing organization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Establishment number (Betriebsstättennummer)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bsnr: Option<String>,
    /// Institution identifier (Institutionskennzeichen)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iknr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
}

/// Insured person.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    /// KVNR; the identifier system (gkv vs pkv) is chosen during extraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_identifier: Option<String>,
}

/// Prescribing practitioner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Job title / qualification text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    /// Lifetime physician number (LANR)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practitioner_identifier: Option<String>,
}

/// Coverage data of the insured person.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceInformation {
    /// Insurer display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Insured-person status code (Versichertenart)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    /// Coverage kind code: "GKV", "PKV", "BG", "SEL", ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_type: Option<String>,
}

/// Accident cause attached to a prescription (Unfallkennzeichen).
///
/// Wire codes: "1" → `Accident`, "2" → `WorkAccident`, "4" →
/// `OccupationalDisease`; anything else maps to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccidentType {
    /// Unfall
    Accident,
    /// Arbeitsunfall
    WorkAccident,
    /// Berufskrankheit
    OccupationalDisease,
    #[default]
    None,
}

/// Repeat-prescription metadata (Mehrfachverordnung).
///
/// When `indicator` is false the remaining fields carry no meaning even if
/// the source document populated them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplePrescriptionInfo {
    pub indicator: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbering: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

/// The prescription proper (KBV profile `KBV_PR_ERP_Prescription`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    pub accident_type: AccidentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_accident: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accident_location: Option<String>,
    /// Emergency services fee flag (Notdienstgebühr); absent when the
    /// prescription does not carry the extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_fee: Option<bool>,
    pub substitution_allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub multiple_prescription_info: MultiplePrescriptionInfo,
    /// Federal relief act flag (Bundesversorgungsgesetz)
    pub bvg: bool,
    /// Co-payment status code ("0", "1", "2")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_fee: Option<String>,
    /// Prescribed package count
    pub quantity: i64,
}

/// Fully extracted KBV prescription bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionBundle {
    pub patient: Patient,
    pub practitioner: Practitioner,
    pub organization: Organization,
    pub coverage: InsuranceInformation,
    pub medication: Medication,
    pub medication_request: MedicationRequest,
}
