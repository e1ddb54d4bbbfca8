//! KBV prescription bundle orchestration

use erx_fhir_json::Contained;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::kbv::{
    extract_coverage, extract_medication, extract_medication_request, extract_organization,
    extract_patient, extract_practitioner,
};
use crate::profiles::{classify, resource_profile, ProfileKind};
use erx_models::PrescriptionBundle;

/// Extracts a complete KBV prescription bundle (KBV_PR_ERP_Bundle 1.0.2 or
/// 1.1.0).
///
/// Every sub-resource slot is mandatory; an absent slot fails the whole
/// bundle with [`Error::MissingResource`] naming the missing kind. Entries
/// with unrecognized profiles are skipped.
pub fn extract_prescription_bundle(bundle: &Value) -> Result<PrescriptionBundle> {
    match classify(bundle) {
        Some(ProfileKind::KbvBundle(_)) => {}
        _ => {
            return Err(Error::UnrecognizedProfile(
                resource_profile(bundle).unwrap_or("<none>").to_string(),
            ))
        }
    }

    let mut patient = None;
    let mut practitioner = None;
    let mut organization = None;
    let mut coverage = None;
    let mut medication = None;
    let mut medication_request = None;

    for resource in bundle.find_all("entry.resource") {
        match classify(resource) {
            Some(ProfileKind::KbvPatient(version)) => {
                patient = Some(extract_patient(resource, version)?);
            }
            Some(ProfileKind::KbvPractitioner(_)) => {
                practitioner = Some(extract_practitioner(resource)?);
            }
            Some(ProfileKind::KbvOrganization(_)) => {
                organization = Some(extract_organization(resource)?);
            }
            Some(ProfileKind::KbvCoverage(_)) => {
                coverage = Some(extract_coverage(resource)?);
            }
            Some(
                ProfileKind::KbvMedicationPzn(_)
                | ProfileKind::KbvMedicationCompounding(_)
                | ProfileKind::KbvMedicationIngredient(_)
                | ProfileKind::KbvMedicationFreeText(_),
            ) => {
                medication = Some(extract_medication(resource)?);
            }
            Some(ProfileKind::KbvPrescription(version)) => {
                medication_request = Some(extract_medication_request(resource, version)?);
            }
            other => {
                debug!(?other, "skipping bundle entry");
            }
        }
    }

    Ok(PrescriptionBundle {
        patient: patient.ok_or(Error::MissingResource("Patient"))?,
        practitioner: practitioner.ok_or(Error::MissingResource("Practitioner"))?,
        organization: organization.ok_or(Error::MissingResource("Organization"))?,
        coverage: coverage.ok_or(Error::MissingResource("Coverage"))?,
        medication: medication.ok_or(Error::MissingResource("Medication"))?,
        medication_request: medication_request
            .ok_or(Error::MissingResource("MedicationRequest"))?,
    })
}
