//! Extraction and mapping of German e-prescription FHIR bundles.
//!
//! The e-prescription backends (prescription server, pharmacy directory)
//! speak FHIR JSON across several concurrently live profile generations.
//! This crate walks the untyped [`serde_json::Value`] trees and maps them
//! into the typed records of [`erx_models`], pinning every version-dependent
//! difference (extension URLs, naming systems, member casing) in one place.
//!
//! All extractors are pure functions over a borrowed bundle; no I/O, no
//! mutation of the input. Mandatory data fails extraction with a precise
//! [`Error`]; business-optional data degrades to `None` or a documented
//! default.
//!
//! Entry points, one per bundle/resource kind:
//!
//! - [`extract_prescription_bundle`] for KBV prescription bundles
//! - [`extract_invoice_bundle`] and [`extract_charge_item`] for PKV charges
//! - [`extract_task`] / [`extract_tasks`] for workflow Tasks
//! - [`extract_communication`] / [`extract_communications`]
//! - [`extract_audit_event`] / [`extract_audit_events`]
//! - [`extract_medication_dispense`] / [`extract_medication_dispenses`]
//! - [`extract_pharmacies`] for directory search pages

mod audit_event;
mod communication;
mod dispense;
mod error;
mod invoice;
mod kbv;
mod pharmacy;
mod primitives;
pub mod profiles;
pub mod systems;
mod task;

pub use audit_event::{extract_audit_event, extract_audit_events};
pub use communication::{extract_communication, extract_communications};
pub use dispense::{extract_medication_dispense, extract_medication_dispenses};
pub use error::{Error, Result};
pub use invoice::{extract_charge_item, extract_invoice_bundle};
pub use kbv::{
    extract_coverage, extract_medication, extract_medication_request, extract_organization,
    extract_patient, extract_practitioner, extract_prescription_bundle,
};
pub use pharmacy::{extract_pharmacies, extract_pharmacy};
pub use profiles::{
    classify, profile_matches, resource_profile, AuditEventVersion, DavVersion, KbvBundleVersion,
    KbvForVersion, KbvMedicationVersion, ProfileKind, WorkflowVersion,
};
pub use task::{extract_task, extract_tasks};
