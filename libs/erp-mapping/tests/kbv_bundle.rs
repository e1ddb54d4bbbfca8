//! End-to-end extraction of complete KBV prescription bundles.

use erx_mapping::{extract_prescription_bundle, Error};
use erx_models::{AccidentType, Medication, MedicationCategory};
use serde_json::{json, Value};

fn bundle_v110() -> Value {
    serde_json::from_str(include_str!("fixtures/kbv_bundle_v110.json"))
        .expect("fixture is valid JSON")
}

#[test]
fn extracts_complete_pkv_bundle() {
    let bundle = extract_prescription_bundle(&bundle_v110()).unwrap();

    assert_eq!(bundle.patient.name.as_deref(), Some("Paulus Privatus"));
    // 1.1.0 probes the GKV system first and falls back to PKV.
    assert_eq!(bundle.patient.insurance_identifier.as_deref(), Some("P123464117"));
    assert_eq!(bundle.practitioner.practitioner_identifier.as_deref(), Some("582369858"));
    assert_eq!(bundle.organization.bsnr.as_deref(), Some("721111100"));
    assert_eq!(bundle.coverage.coverage_type.as_deref(), Some("PKV"));

    let Medication::Pzn(medication) = &bundle.medication else {
        panic!("expected PZN medication, got {:?}", bundle.medication);
    };
    assert_eq!(medication.pzn, "00814665");
    assert_eq!(medication.category, MedicationCategory::ArzneiUndVerbandmittel);
    assert_eq!(medication.form.as_deref(), Some("FTA"));
    assert_eq!(medication.norm_size_code.as_deref(), Some("N1"));

    assert!(bundle.medication_request.substitution_allowed);
    assert_eq!(bundle.medication_request.emergency_fee, Some(false));
    assert_eq!(bundle.medication_request.accident_type, AccidentType::None);
    assert_eq!(bundle.medication_request.quantity, 1);
}

#[test]
fn extraction_is_deterministic() {
    let input = bundle_v110();
    assert_eq!(
        extract_prescription_bundle(&input).unwrap(),
        extract_prescription_bundle(&input).unwrap()
    );
}

#[test]
fn missing_medication_names_the_absent_resource() {
    let mut input = bundle_v110();
    input["entry"].as_array_mut().unwrap().remove(1);
    assert_eq!(
        extract_prescription_bundle(&input),
        Err(Error::MissingResource("Medication"))
    );
}

#[test]
fn foreign_bundle_profile_is_rejected() {
    let input = json!({
        "resourceType": "Bundle",
        "meta": { "profile": ["https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Bundle|0.9.0"] }
    });
    assert!(matches!(
        extract_prescription_bundle(&input),
        Err(Error::UnrecognizedProfile(_))
    ));

    assert_eq!(
        extract_prescription_bundle(&json!({ "resourceType": "Bundle" })),
        Err(Error::UnrecognizedProfile("<none>".to_string()))
    );
}

#[test]
fn extracts_legacy_102_bundle() {
    let input = json!({
        "resourceType": "Bundle",
        "meta": { "profile": ["https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Bundle|1.0.2"] },
        "entry": [
            {
                "resource": {
                    "resourceType": "MedicationRequest",
                    "meta": { "profile": ["https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Prescription|1.0.2"] },
                    "extension": [{
                        "url": "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Accident",
                        "extension": [
                            { "url": "unfallkennzeichen", "valueCoding": { "code": "2" } },
                            { "url": "unfallbetrieb", "valueString": "Arbeitsplatz" }
                        ]
                    }]
                }
            },
            {
                "resource": {
                    "resourceType": "Medication",
                    "meta": { "profile": ["https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Medication_PZN|1.0.2"] },
                    "extension": [{
                        "url": "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Medication_Category",
                        "valueCoding": {
                            "system": "https://fhir.kbv.de/CodeSystem/KBV_CS_ERP_Medication_Category",
                            "code": "00"
                        }
                    }],
                    "code": { "coding": [{ "system": "http://fhir.de/CodeSystem/ifa/pzn", "code": "06313728" }] },
                    "amount": { "numerator": { "value": 12, "unit": "TAB" }, "denominator": { "value": 1 } }
                }
            },
            {
                "resource": {
                    "resourceType": "Patient",
                    "meta": { "profile": ["https://fhir.kbv.de/StructureDefinition/KBV_PR_FOR_Patient|1.0.3"] },
                    "name": [{ "use": "official", "family": "Königsstein", "given": ["Ludger"] }],
                    "identifier": [{
                        "system": "http://fhir.de/NamingSystem/gkv/kvid-10",
                        "value": "X234567890"
                    }]
                }
            },
            {
                "resource": {
                    "resourceType": "Practitioner",
                    "meta": { "profile": ["https://fhir.kbv.de/StructureDefinition/KBV_PR_FOR_Practitioner|1.0.3"] },
                    "name": [{ "use": "official", "family": "Topp-Glücklich", "given": ["Hans"], "prefix": ["Dr. med."] }]
                }
            },
            {
                "resource": {
                    "resourceType": "Organization",
                    "meta": { "profile": ["https://fhir.kbv.de/StructureDefinition/KBV_PR_FOR_Organization|1.0.3"] },
                    "name": "Hausarztpraxis Dr. Topp-Glücklich"
                }
            },
            {
                "resource": {
                    "resourceType": "Coverage",
                    "meta": { "profile": ["https://fhir.kbv.de/StructureDefinition/KBV_PR_FOR_Coverage|1.0.3"] },
                    "extension": [{
                        "url": "http://fhir.de/StructureDefinition/gkv/versichertenart",
                        "valueCoding": { "code": "1" }
                    }],
                    "type": {
                        "coding": [{
                            "system": "http://fhir.de/CodeSystem/versicherungsart-de-basis",
                            "code": "GKV"
                        }]
                    },
                    "payor": [{ "display": "AOK Rheinland/Hamburg" }]
                }
            }
        ]
    });

    let bundle = extract_prescription_bundle(&input).unwrap();
    // 1.0.3 patients accept the legacy GKV naming system.
    assert_eq!(bundle.patient.insurance_identifier.as_deref(), Some("X234567890"));
    assert_eq!(bundle.coverage.status_code.as_deref(), Some("1"));
    assert_eq!(bundle.medication_request.accident_type, AccidentType::WorkAccident);
    assert_eq!(bundle.medication_request.accident_location.as_deref(), Some("Arbeitsplatz"));

    let Medication::Pzn(medication) = &bundle.medication else {
        panic!("expected PZN medication");
    };
    // 1.0.2 reads the amount from the plain numerator/denominator pair.
    let amount = medication.amount.as_ref().unwrap();
    assert_eq!(amount.numerator.as_ref().unwrap().value.as_deref(), Some("12"));
}
