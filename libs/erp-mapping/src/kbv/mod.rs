//! Extractors for KBV prescription bundles (KBV_PR_ERP_Bundle 1.0.2 / 1.1.0)

mod bundle;
mod medication;
mod medication_request;
mod participants;

pub use bundle::extract_prescription_bundle;
pub use medication::extract_medication;
pub use medication_request::extract_medication_request;
pub use participants::{
    extract_coverage, extract_organization, extract_patient, extract_practitioner,
};
