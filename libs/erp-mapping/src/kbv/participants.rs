//! Organization, Patient, Practitioner and Coverage extraction

use erx_fhir_json::{filter_with, or, string_value, Contained};
use serde_json::Value;

use crate::error::Result;
use crate::primitives::{
    address, coding_code, human_name, identifier_value, optional_date, telecom_value,
};
use crate::profiles::KbvForVersion;
use crate::systems::{
    CS_COVERAGE_KIND, EXT_COVERAGE_STATUS, SYSTEM_BSNR, SYSTEM_GKV_KVID, SYSTEM_GKV_KVID_LEGACY,
    SYSTEM_IKNR, SYSTEM_IKNR_SID, SYSTEM_LANR, SYSTEM_PKV_KVID,
};
use erx_models::{InsuranceInformation, Organization, Patient, Practitioner};

/// Extracts a prescribing organization (KBV_PR_FOR_Organization).
///
/// The IKNR naming system moved from `NamingSystem` to `sid` between profile
/// generations; both spellings are accepted.
pub fn extract_organization(resource: &Value) -> Result<Organization> {
    let iknr = filter_with(
        resource.find_all("identifier"),
        "system",
        or(string_value(SYSTEM_IKNR), string_value(SYSTEM_IKNR_SID)),
    )
    .next()
    .and_then(|id| id.contained_str_or_null("value"));

    Ok(Organization {
        name: resource.contained_str_or_null("name").map(str::to_string),
        address: address(resource),
        bsnr: identifier_value(resource, SYSTEM_BSNR).map(str::to_string),
        iknr: iknr.map(str::to_string),
        phone: telecom_value(resource, "phone").map(str::to_string),
        mail: telecom_value(resource, "email").map(str::to_string),
    })
}

/// Extracts the insured person (KBV_PR_FOR_Patient).
///
/// The KVNR identifier system depends on the profile generation: 1.0.3 only
/// knows the GKV system, 1.1.0 distinguishes GKV and PKV insurance and the
/// bundle may carry either system. GKV is probed first, PKV second.
pub fn extract_patient(resource: &Value, version: KbvForVersion) -> Result<Patient> {
    let insurance_identifier = match version {
        KbvForVersion::V1_0_3 => filter_with(
            resource.find_all("identifier"),
            "system",
            or(
                string_value(SYSTEM_GKV_KVID),
                string_value(SYSTEM_GKV_KVID_LEGACY),
            ),
        )
        .next()
        .and_then(|id| id.contained_str_or_null("value")),
        KbvForVersion::V1_1_0 => identifier_value(resource, SYSTEM_GKV_KVID)
            .or_else(|| identifier_value(resource, SYSTEM_PKV_KVID)),
    };

    Ok(Patient {
        name: human_name(resource),
        address: address(resource),
        birth_date: optional_date(resource, "birthDate")?,
        insurance_identifier: insurance_identifier.map(str::to_string),
    })
}

/// Extracts the prescribing practitioner (KBV_PR_FOR_Practitioner).
pub fn extract_practitioner(resource: &Value) -> Result<Practitioner> {
    let qualification = resource
        .find_all("qualification.code.text")
        .find_map(Value::as_str);

    Ok(Practitioner {
        name: human_name(resource),
        qualification: qualification.map(str::to_string),
        practitioner_identifier: identifier_value(resource, SYSTEM_LANR).map(str::to_string),
    })
}

/// Extracts coverage data (KBV_PR_FOR_Coverage).
pub fn extract_coverage(resource: &Value) -> Result<InsuranceInformation> {
    let status_code = filter_with(
        resource.find_all("extension"),
        "url",
        string_value(EXT_COVERAGE_STATUS),
    )
    .next()
    .and_then(|ext| ext.contained_str_or_null("valueCoding.code"));

    Ok(InsuranceInformation {
        name: resource
            .find_all("payor.display")
            .find_map(Value::as_str)
            .map(str::to_string),
        status_code: status_code.map(str::to_string),
        coverage_type: coding_code(resource, "type.coding", CS_COVERAGE_KIND).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn organization_pulls_bsnr_and_contacts() {
        let resource = json!({
            "name": "Hausarztpraxis Dr. Topp-Glücklich",
            "identifier": [
                { "system": "https://fhir.kbv.de/NamingSystem/KBV_NS_Base_BSNR", "value": "031234567" }
            ],
            "telecom": [
                { "system": "phone", "value": "0301234567" },
                { "system": "email", "value": "praxis@topp-gluecklich.example" }
            ],
            "address": [{ "line": ["Musterstr. 2"], "postalCode": "10623", "city": "Berlin" }]
        });

        let org = extract_organization(&resource).unwrap();
        assert_eq!(org.name.as_deref(), Some("Hausarztpraxis Dr. Topp-Glücklich"));
        assert_eq!(org.bsnr.as_deref(), Some("031234567"));
        assert_eq!(org.iknr, None);
        assert_eq!(org.phone.as_deref(), Some("0301234567"));
        assert_eq!(org.mail.as_deref(), Some("praxis@topp-gluecklich.example"));
        assert_eq!(org.address.unwrap().city.as_deref(), Some("Berlin"));
    }

    #[test]
    fn organization_accepts_both_iknr_spellings() {
        for system in ["http://fhir.de/NamingSystem/arge-ik/iknr", "http://fhir.de/sid/arge-ik/iknr"] {
            let resource = json!({ "identifier": [{ "system": system, "value": "300500345" }] });
            let org = extract_organization(&resource).unwrap();
            assert_eq!(org.iknr.as_deref(), Some("300500345"));
        }
    }

    #[test]
    fn patient_v103_reads_gkv_kvnr() {
        let resource = json!({
            "name": [{ "use": "official", "family": "Königsstein", "given": ["Ludger"] }],
            "birthDate": "1935-06-22",
            "identifier": [{
                "type": { "coding": [{ "code": "GKV" }] },
                "system": "http://fhir.de/NamingSystem/gkv/kvid-10",
                "value": "X234567890"
            }]
        });

        let patient = extract_patient(&resource, KbvForVersion::V1_0_3).unwrap();
        assert_eq!(patient.name.as_deref(), Some("Ludger Königsstein"));
        assert_eq!(patient.insurance_identifier.as_deref(), Some("X234567890"));
    }

    #[test]
    fn patient_v110_falls_back_to_pkv_system() {
        let resource = json!({
            "identifier": [{
                "type": { "coding": [{ "code": "PKV" }] },
                "system": "http://fhir.de/sid/pkv/kvid-10",
                "value": "P123464117"
            }]
        });

        let patient = extract_patient(&resource, KbvForVersion::V1_1_0).unwrap();
        assert_eq!(patient.insurance_identifier.as_deref(), Some("P123464117"));
    }

    #[test]
    fn practitioner_reads_lanr_and_qualification() {
        let resource = json!({
            "name": [{ "use": "official", "family": "Topp-Glücklich", "given": ["Hans"], "prefix": ["Dr. med."] }],
            "identifier": [{ "system": "https://fhir.kbv.de/NamingSystem/KBV_NS_Base_ANR", "value": "838382202" }],
            "qualification": [
                { "code": { "coding": [{ "code": "00" }] } },
                { "code": { "text": "Hausarzt" } }
            ]
        });

        let practitioner = extract_practitioner(&resource).unwrap();
        assert_eq!(practitioner.name.as_deref(), Some("Dr. med. Hans Topp-Glücklich"));
        assert_eq!(practitioner.practitioner_identifier.as_deref(), Some("838382202"));
        assert_eq!(practitioner.qualification.as_deref(), Some("Hausarzt"));
    }

    #[test]
    fn coverage_reads_type_status_and_payor() {
        let resource = json!({
            "extension": [{
                "url": "http://fhir.de/StructureDefinition/gkv/versichertenart",
                "valueCoding": { "code": "1" }
            }],
            "type": { "coding": [{ "system": "http://fhir.de/CodeSystem/versicherungsart-de-basis", "code": "PKV" }] },
            "payor": [{ "display": "Allianz Private Krankenversicherung" }]
        });

        let coverage = extract_coverage(&resource).unwrap();
        assert_eq!(coverage.coverage_type.as_deref(), Some("PKV"));
        assert_eq!(coverage.status_code.as_deref(), Some("1"));
        assert_eq!(coverage.name.as_deref(), Some("Allianz Private Krankenversicherung"));
    }
}
