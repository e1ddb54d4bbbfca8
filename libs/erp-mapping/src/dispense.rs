//! MedicationDispense extraction (GEM_ERP_PR_MedicationDispense)
//!
//! A dispense carries its medication as the first `contained` resource; the
//! medication itself is a KBV profile (or, from workflow 1.4 on, an ePA
//! medication) and is delegated to the medication dispatcher.

use erx_fhir_json::Contained;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::kbv::extract_medication;
use crate::primitives::{identifier_value, optional_instant};
use crate::profiles::{classify, resource_profile, ProfileKind};
use crate::systems::SYSTEM_PRESCRIPTION_ID;
use erx_models::{Medication, MedicationDispense};

/// Extracts a single dispense. The prescription id is mandatory; a missing
/// or unrecognized contained medication degrades to [`Medication::Unknown`].
pub fn extract_medication_dispense(resource: &Value) -> Result<MedicationDispense> {
    match classify(resource) {
        Some(ProfileKind::MedicationDispense(_)) => {}
        _ => {
            return Err(Error::UnrecognizedProfile(
                resource_profile(resource).unwrap_or("<none>").to_string(),
            ))
        }
    }

    let dispense_id = identifier_value(resource, SYSTEM_PRESCRIPTION_ID)
        .ok_or_else(|| Error::missing("identifier(PrescriptionId)"))?
        .to_string();

    let medication = match resource.find_all("contained").next() {
        Some(contained) => extract_medication(contained)?,
        None => Medication::Unknown,
    };

    Ok(MedicationDispense {
        dispense_id,
        patient_identifier: resource
            .contained_str_or_null("subject.identifier.value")
            .map(str::to_string),
        medication,
        performer: resource
            .find_all("performer.actor.identifier.value")
            .find_map(Value::as_str)
            .map(str::to_string),
        was_substituted: resource
            .contained_bool_or_null("substitution.wasSubstituted")
            .unwrap_or(false),
        dosage_instruction: resource
            .find_all("dosageInstruction.text")
            .find_map(Value::as_str)
            .map(str::to_string),
        when_handed_over: optional_instant(resource, "whenHandedOver")?,
    })
}

/// Extracts every dispense from a search bundle, skipping entries with
/// unrecognized profiles.
pub fn extract_medication_dispenses(bundle: &Value) -> Result<Vec<MedicationDispense>> {
    let mut dispenses = Vec::new();
    for resource in bundle.find_all("entry.resource") {
        match classify(resource) {
            Some(ProfileKind::MedicationDispense(_)) => {
                dispenses.push(extract_medication_dispense(resource)?);
            }
            other => {
                debug!(?other, "skipping dispense bundle entry");
            }
        }
    }
    Ok(dispenses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dispense() -> Value {
        json!({
            "meta": { "profile": ["https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_PR_MedicationDispense|1.2"] },
            "identifier": [{
                "system": "https://gematik.de/fhir/erp/NamingSystem/GEM_ERP_NS_PrescriptionId",
                "value": "160.000.033.491.280.78"
            }],
            "contained": [{
                "resourceType": "Medication",
                "meta": { "profile": ["https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Medication_PZN|1.1.0"] },
                "code": {
                    "coding": [{ "system": "http://fhir.de/CodeSystem/ifa/pzn", "code": "06313728" }],
                    "text": "Sumatriptan-1a Pharma 100 mg Tabletten"
                }
            }],
            "subject": { "identifier": { "value": "X234567890" } },
            "performer": [{ "actor": { "identifier": { "value": "3-SMC-B-Testkarte-883110000123465" } } }],
            "substitution": { "wasSubstituted": true },
            "dosageInstruction": [{ "text": "1-0-1" }],
            "whenHandedOver": "2022-02-28"
        })
    }

    #[test]
    fn extracts_dispense_with_contained_medication() {
        let dispense = extract_medication_dispense(&dispense()).unwrap();
        assert_eq!(dispense.dispense_id, "160.000.033.491.280.78");
        assert_eq!(dispense.patient_identifier.as_deref(), Some("X234567890"));
        assert!(dispense.was_substituted);
        assert_eq!(dispense.dosage_instruction.as_deref(), Some("1-0-1"));
        match dispense.medication {
            Medication::Pzn(pzn) => assert_eq!(pzn.pzn, "06313728"),
            other => panic!("expected PZN medication, got {other:?}"),
        }
        // Date-only handover timestamps are accepted.
        assert_eq!(
            dispense.when_handed_over.unwrap().to_rfc3339(),
            "2022-02-28T00:00:00+00:00"
        );
    }

    #[test]
    fn missing_contained_medication_degrades_to_unknown() {
        let mut resource = dispense();
        resource.as_object_mut().unwrap().remove("contained");
        let dispense = extract_medication_dispense(&resource).unwrap();
        assert_eq!(dispense.medication, Medication::Unknown);
    }

    #[test]
    fn missing_prescription_id_fails() {
        let mut resource = dispense();
        resource.as_object_mut().unwrap().remove("identifier");
        assert_eq!(
            extract_medication_dispense(&resource),
            Err(Error::missing("identifier(PrescriptionId)"))
        );
    }
}
