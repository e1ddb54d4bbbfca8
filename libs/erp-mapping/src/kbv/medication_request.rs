//! MedicationRequest extraction (KBV_PR_ERP_Prescription)
//!
//! Everything on a prescription besides the medication reference is
//! business-optional: a missing extension never fails the extraction, it
//! falls back to the documented default (`substitution_allowed = false`,
//! `bvg = false`, `emergency_fee` absent). Present-but-malformed dates do
//! fail hard.

use erx_fhir_json::Contained;
use serde_json::Value;

use crate::error::Result;
use crate::primitives::{extension_with_url, optional_date, parse_fhir_date, scalar_to_string};
use crate::profiles::KbvMedicationVersion;
use crate::systems::{
    EXT_ACCIDENT_V102, EXT_ACCIDENT_V110, EXT_BVG, EXT_CO_PAYMENT, EXT_EMERGENCY_FEE,
    EXT_MULTIPLE_PRESCRIPTION,
};
use erx_models::{AccidentType, MedicationRequest, MultiplePrescriptionInfo, Ratio};

/// Maps the accident marker code (Unfallkennzeichen).
fn accident_type_from_code(code: Option<&str>) -> AccidentType {
    match code {
        Some("1") => AccidentType::Accident,
        Some("2") => AccidentType::WorkAccident,
        Some("4") => AccidentType::OccupationalDisease,
        _ => AccidentType::None,
    }
}

struct AccidentInfo {
    kind: AccidentType,
    date: Option<chrono::NaiveDate>,
    location: Option<String>,
}

/// Accident extension; both the outer url and the nested urls were renamed
/// between 1.0.2 (`KBV_EX_ERP_Accident`, lowercase members) and 1.1.0
/// (`KBV_EX_FOR_Accident`, capitalized members).
fn accident(resource: &Value, version: KbvMedicationVersion) -> Result<AccidentInfo> {
    let (url, kind_key, date_key, location_key) = match version {
        KbvMedicationVersion::V1_0_2 => {
            (EXT_ACCIDENT_V102, "unfallkennzeichen", "unfalltag", "unfallbetrieb")
        }
        KbvMedicationVersion::V1_1_0 => {
            (EXT_ACCIDENT_V110, "Unfallkennzeichen", "Unfalltag", "Unfallbetrieb")
        }
    };

    let Some(ext) = extension_with_url(resource, url) else {
        return Ok(AccidentInfo {
            kind: AccidentType::None,
            date: None,
            location: None,
        });
    };

    let code = extension_with_url(ext, kind_key).and_then(|e| e.contained_str_or_null("valueCoding.code"));
    let date = extension_with_url(ext, date_key)
        .and_then(|e| e.contained_str_or_null("valueDate"))
        .map(|s| parse_fhir_date(s, "extension.valueDate"))
        .transpose()?;
    let location = extension_with_url(ext, location_key)
        .and_then(|e| e.contained_str_or_null("valueString"))
        .map(str::to_string);

    Ok(AccidentInfo {
        kind: accident_type_from_code(code),
        date,
        location,
    })
}

/// Repeat-prescription extension (Mehrfachverordnung). The nested member urls
/// are stable across versions.
fn multiple_prescription(resource: &Value) -> Result<MultiplePrescriptionInfo> {
    let Some(ext) = extension_with_url(resource, EXT_MULTIPLE_PRESCRIPTION) else {
        return Ok(MultiplePrescriptionInfo::default());
    };

    let indicator = extension_with_url(ext, "Kennzeichen")
        .and_then(|e| e.contained_bool_or_null("valueBoolean"))
        .unwrap_or(false);

    let numbering = extension_with_url(ext, "Nummerierung").and_then(|e| {
        let numerator = e
            .contained_or_null("valueRatio.numerator.value")
            .and_then(scalar_to_string)?;
        let denominator = e
            .contained_or_null("valueRatio.denominator.value")
            .and_then(scalar_to_string)?;
        Some(Ratio::of(&numerator, None, &denominator))
    });

    let period = extension_with_url(ext, "Zeitraum");
    let start = period
        .map(|e| optional_date(e, "valuePeriod.start"))
        .transpose()?
        .flatten();
    let end = period
        .map(|e| optional_date(e, "valuePeriod.end"))
        .transpose()?
        .flatten();

    Ok(MultiplePrescriptionInfo {
        indicator,
        numbering,
        start,
        end,
    })
}

/// Extracts the prescription resource.
pub fn extract_medication_request(
    resource: &Value,
    version: KbvMedicationVersion,
) -> Result<MedicationRequest> {
    let accident = accident(resource, version)?;

    let additional_fee = extension_with_url(resource, EXT_CO_PAYMENT)
        .and_then(|ext| ext.contained_str_or_null("valueCoding.code"));

    let emergency_fee =
        extension_with_url(resource, EXT_EMERGENCY_FEE).and_then(|ext| ext.contained_bool_or_null("valueBoolean"));

    let bvg = extension_with_url(resource, EXT_BVG)
        .and_then(|ext| ext.contained_bool_or_null("valueBoolean"))
        .unwrap_or(false);

    Ok(MedicationRequest {
        accident_type: accident.kind,
        date_of_accident: accident.date,
        accident_location: accident.location,
        emergency_fee,
        substitution_allowed: resource
            .contained_bool_or_null("substitution.allowedBoolean")
            .unwrap_or(false),
        dosage_instruction: resource
            .find_all("dosageInstruction.text")
            .find_map(Value::as_str)
            .map(str::to_string),
        note: resource
            .find_all("note.text")
            .find_map(Value::as_str)
            .map(str::to_string),
        multiple_prescription_info: multiple_prescription(resource)?,
        bvg,
        additional_fee: additional_fee.map(str::to_string),
        quantity: resource
            .contained_int_or_null("dispenseRequest.quantity.value")
            .unwrap_or(1),
    })
}
