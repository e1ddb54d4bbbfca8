//! Profile/version classification
//!
//! A FHIR resource announces its schema variant through `meta.profile`, a
//! canonical StructureDefinition URL with a `|version` suffix. Behavior
//! genuinely differs per version, so versions are enumerated explicitly and
//! compared as exact strings; no semantic-version ordering is implied.
//!
//! Classification resolves each resource once into the closed [`ProfileKind`]
//! enumeration, which orchestrators then match exhaustively. Unrecognized
//! profiles are `None` here; whether that skips the resource or degrades to
//! an `Unknown` domain variant is the caller's decision.

use erx_fhir_json::Contained;
use serde_json::Value;

// --- KBV prescription bundle profiles ---

pub const KBV_BUNDLE: &str = "https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Bundle";
pub const KBV_ORGANIZATION: &str = "https://fhir.kbv.de/StructureDefinition/KBV_PR_FOR_Organization";
pub const KBV_PATIENT: &str = "https://fhir.kbv.de/StructureDefinition/KBV_PR_FOR_Patient";
pub const KBV_PRACTITIONER: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_PR_FOR_Practitioner";
pub const KBV_COVERAGE: &str = "https://fhir.kbv.de/StructureDefinition/KBV_PR_FOR_Coverage";
pub const KBV_MEDICATION_PZN: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Medication_PZN";
pub const KBV_MEDICATION_COMPOUNDING: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Medication_Compounding";
pub const KBV_MEDICATION_INGREDIENT: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Medication_Ingredient";
pub const KBV_MEDICATION_FREE_TEXT: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Medication_FreeText";
pub const KBV_PRESCRIPTION: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_PR_ERP_Prescription";

// --- gematik workflow profiles ---

pub const GEM_TASK: &str = "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_PR_Task";
pub const GEM_COMMUNICATION_DISP_REQ: &str =
    "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_PR_Communication_DispReq";
pub const GEM_COMMUNICATION_REPLY: &str =
    "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_PR_Communication_Reply";
pub const GEM_AUDIT_EVENT: &str =
    "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_PR_AuditEvent";
pub const GEM_MEDICATION_DISPENSE: &str =
    "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_PR_MedicationDispense";
pub const GEM_CHARGE_ITEM: &str =
    "https://gematik.de/fhir/erpchrg/StructureDefinition/GEM_ERPCHRG_PR_ChargeItem";

// --- ePA medication (contained in newer dispenses) ---

pub const EPA_MEDICATION: &str =
    "https://gematik.de/fhir/epa-medication/StructureDefinition/epa-medication";

// --- DAV PKV dispense data (Abgabedaten) ---

pub const DAV_BUNDLE: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-AbgabedatenBundle";
pub const DAV_PHARMACY: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-Apotheke";
pub const DAV_DISPENSE_INFORMATION: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-Abgabeinformationen";
pub const DAV_INVOICE_LINES: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-Abrechnungszeilen";
pub const DAV_ADDITIONAL_UNIT: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-ZusatzdatenEinheit";
pub const DAV_ADDITIONAL_PRODUCTION: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-ZusatzdatenHerstellung";

/// KBV prescription bundle version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KbvBundleVersion {
    V1_0_2,
    V1_1_0,
}

impl KbvBundleVersion {
    fn from_code(version: &str) -> Option<Self> {
        match version {
            "1.0.2" => Some(KbvBundleVersion::V1_0_2),
            "1.1.0" => Some(KbvBundleVersion::V1_1_0),
            _ => None,
        }
    }
}

/// Version of the KBV FOR profiles (Organization/Patient/Practitioner/Coverage).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KbvForVersion {
    V1_0_3,
    V1_1_0,
}

impl KbvForVersion {
    fn from_code(version: &str) -> Option<Self> {
        match version {
            "1.0.3" => Some(KbvForVersion::V1_0_3),
            "1.1.0" => Some(KbvForVersion::V1_1_0),
            _ => None,
        }
    }
}

/// Version of the KBV medication and prescription profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KbvMedicationVersion {
    V1_0_2,
    V1_1_0,
}

impl KbvMedicationVersion {
    fn from_code(version: &str) -> Option<Self> {
        match version {
            "1.0.2" => Some(KbvMedicationVersion::V1_0_2),
            "1.1.0" => Some(KbvMedicationVersion::V1_1_0),
            _ => None,
        }
    }
}

/// gematik workflow profile version (Task, Communication, MedicationDispense).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowVersion {
    V1_2,
    V1_3,
    V1_4,
}

impl WorkflowVersion {
    fn from_code(version: &str) -> Option<Self> {
        match version {
            "1.2" => Some(WorkflowVersion::V1_2),
            "1.3" => Some(WorkflowVersion::V1_3),
            "1.4" => Some(WorkflowVersion::V1_4),
            _ => None,
        }
    }
}

/// AuditEvent profile version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventVersion {
    V1_1_1,
    V1_2,
}

impl AuditEventVersion {
    fn from_code(version: &str) -> Option<Self> {
        match version {
            "1.1.1" => Some(AuditEventVersion::V1_1_1),
            "1.2" => Some(AuditEventVersion::V1_2),
            _ => None,
        }
    }
}

/// DAV PKV dispense data version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DavVersion {
    V1_1,
    V1_2,
    V1_3,
}

impl DavVersion {
    fn from_code(version: &str) -> Option<Self> {
        match version {
            "1.1" => Some(DavVersion::V1_1),
            "1.2" => Some(DavVersion::V1_2),
            "1.3" => Some(DavVersion::V1_3),
            _ => None,
        }
    }
}

/// Closed enumeration of every (resource kind, version) pair the mapping
/// layer supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    KbvBundle(KbvBundleVersion),
    KbvOrganization(KbvForVersion),
    KbvPatient(KbvForVersion),
    KbvPractitioner(KbvForVersion),
    KbvCoverage(KbvForVersion),
    KbvMedicationPzn(KbvMedicationVersion),
    KbvMedicationCompounding(KbvMedicationVersion),
    KbvMedicationIngredient(KbvMedicationVersion),
    KbvMedicationFreeText(KbvMedicationVersion),
    KbvPrescription(KbvMedicationVersion),
    Task(WorkflowVersion),
    CommunicationDispReq(WorkflowVersion),
    CommunicationReply(WorkflowVersion),
    AuditEvent(AuditEventVersion),
    MedicationDispense(WorkflowVersion),
    EpaMedication,
    ChargeItem,
    DavBundle(DavVersion),
    DavPharmacy(DavVersion),
    DavDispenseInformation(DavVersion),
    DavInvoiceLines(DavVersion),
    DavAdditionalUnit(DavVersion),
    DavAdditionalProduction(DavVersion),
}

/// First `meta.profile` entry of a resource, if any.
pub fn resource_profile(resource: &Value) -> Option<&str> {
    resource.find_all("meta.profile").next()?.as_str()
}

/// Tests whether `profile` equals `{base}|{version}` for any listed version.
pub fn profile_matches(profile: &str, base: &str, versions: &[&str]) -> bool {
    let Some((profile_base, profile_version)) = profile.split_once('|') else {
        return false;
    };
    profile_base == base && versions.contains(&profile_version)
}

/// Classifies a resource by its first `meta.profile` entry.
///
/// Returns `None` for unknown bases, unsupported versions, and unversioned
/// profile strings.
pub fn classify(resource: &Value) -> Option<ProfileKind> {
    let profile = resource_profile(resource)?;
    let (base, version) = profile.split_once('|')?;

    match base {
        KBV_BUNDLE => KbvBundleVersion::from_code(version).map(ProfileKind::KbvBundle),
        KBV_ORGANIZATION => KbvForVersion::from_code(version).map(ProfileKind::KbvOrganization),
        KBV_PATIENT => KbvForVersion::from_code(version).map(ProfileKind::KbvPatient),
        KBV_PRACTITIONER => KbvForVersion::from_code(version).map(ProfileKind::KbvPractitioner),
        KBV_COVERAGE => KbvForVersion::from_code(version).map(ProfileKind::KbvCoverage),
        KBV_MEDICATION_PZN => {
            KbvMedicationVersion::from_code(version).map(ProfileKind::KbvMedicationPzn)
        }
        KBV_MEDICATION_COMPOUNDING => {
            KbvMedicationVersion::from_code(version).map(ProfileKind::KbvMedicationCompounding)
        }
        KBV_MEDICATION_INGREDIENT => {
            KbvMedicationVersion::from_code(version).map(ProfileKind::KbvMedicationIngredient)
        }
        KBV_MEDICATION_FREE_TEXT => {
            KbvMedicationVersion::from_code(version).map(ProfileKind::KbvMedicationFreeText)
        }
        KBV_PRESCRIPTION => {
            KbvMedicationVersion::from_code(version).map(ProfileKind::KbvPrescription)
        }
        GEM_TASK => WorkflowVersion::from_code(version).map(ProfileKind::Task),
        GEM_COMMUNICATION_DISP_REQ => {
            WorkflowVersion::from_code(version).map(ProfileKind::CommunicationDispReq)
        }
        GEM_COMMUNICATION_REPLY => {
            WorkflowVersion::from_code(version).map(ProfileKind::CommunicationReply)
        }
        GEM_AUDIT_EVENT => AuditEventVersion::from_code(version).map(ProfileKind::AuditEvent),
        GEM_MEDICATION_DISPENSE => {
            WorkflowVersion::from_code(version).map(ProfileKind::MedicationDispense)
        }
        GEM_CHARGE_ITEM => (version == "1.0").then_some(ProfileKind::ChargeItem),
        EPA_MEDICATION => (version == "1.4").then_some(ProfileKind::EpaMedication),
        DAV_BUNDLE => DavVersion::from_code(version).map(ProfileKind::DavBundle),
        DAV_PHARMACY => DavVersion::from_code(version).map(ProfileKind::DavPharmacy),
        DAV_DISPENSE_INFORMATION => {
            DavVersion::from_code(version).map(ProfileKind::DavDispenseInformation)
        }
        DAV_INVOICE_LINES => DavVersion::from_code(version).map(ProfileKind::DavInvoiceLines),
        DAV_ADDITIONAL_UNIT => DavVersion::from_code(version).map(ProfileKind::DavAdditionalUnit),
        DAV_ADDITIONAL_PRODUCTION => {
            DavVersion::from_code(version).map(ProfileKind::DavAdditionalProduction)
        }
        _ => None,
    }
}
