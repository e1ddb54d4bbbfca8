//! Coding systems, naming systems, and extension URLs
//!
//! These must match the wire format bit-exactly; extraction filters identifier
//! and coding arrays against them.

// --- product coding systems ---

pub const SYSTEM_PZN: &str = "http://fhir.de/CodeSystem/ifa/pzn";
pub const SYSTEM_TA1: &str = "http://TA1.abda.de";
pub const SYSTEM_HMNR: &str = "http://fhir.de/sid/gkv/hmnr";
pub const SYSTEM_ATC: &str = "http://fhir.de/CodeSystem/bfarm/atc";
pub const SYSTEM_ASK: &str = "http://fhir.de/CodeSystem/ask";
pub const SYSTEM_SNOMED: &str = "http://snomed.info/sct";

// --- person/organization identifier systems ---

pub const SYSTEM_GKV_KVID: &str = "http://fhir.de/sid/gkv/kvid-10";
pub const SYSTEM_GKV_KVID_LEGACY: &str = "http://fhir.de/NamingSystem/gkv/kvid-10";
pub const SYSTEM_PKV_KVID: &str = "http://fhir.de/sid/pkv/kvid-10";
pub const SYSTEM_BSNR: &str = "https://fhir.kbv.de/NamingSystem/KBV_NS_Base_BSNR";
pub const SYSTEM_LANR: &str = "https://fhir.kbv.de/NamingSystem/KBV_NS_Base_ANR";
pub const SYSTEM_IKNR: &str = "http://fhir.de/NamingSystem/arge-ik/iknr";
pub const SYSTEM_IKNR_SID: &str = "http://fhir.de/sid/arge-ik/iknr";
pub const SYSTEM_TELEMATIK_ID: &str = "https://gematik.de/fhir/sid/telematik-id";

// --- workflow naming systems ---

pub const SYSTEM_PRESCRIPTION_ID: &str =
    "https://gematik.de/fhir/erp/NamingSystem/GEM_ERP_NS_PrescriptionId";
pub const SYSTEM_PRESCRIPTION_ID_LEGACY: &str =
    "https://gematik.de/fhir/NamingSystem/PrescriptionID";
pub const SYSTEM_ACCESS_CODE: &str =
    "https://gematik.de/fhir/erp/NamingSystem/GEM_ERP_NS_AccessCode";
pub const SYSTEM_ORDER_ID: &str = "https://gematik.de/fhir/NamingSystem/OrderID";

// --- KBV code systems ---

pub const CS_MEDICATION_CATEGORY: &str =
    "https://fhir.kbv.de/CodeSystem/KBV_CS_ERP_Medication_Category";
pub const CS_DOSE_FORM: &str = "https://fhir.kbv.de/CodeSystem/KBV_CS_SFHIR_KBV_DARREICHUNGSFORM";
pub const CS_COVERAGE_KIND: &str = "http://fhir.de/CodeSystem/versicherungsart-de-basis";

// --- KBV extensions ---

pub const EXT_MEDICATION_CATEGORY: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Medication_Category";
pub const EXT_VACCINE: &str = "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Medication_Vaccine";
pub const EXT_PACKAGING_SIZE: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Medication_PackagingSize";
pub const EXT_COMPOUNDING_INSTRUCTION: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Medication_CompoundingInstruction";
pub const EXT_MEDICATION_PACKAGING: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Medication_Packaging";
pub const EXT_INGREDIENT_FORM: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Medication_Ingredient_Form";
pub const EXT_INGREDIENT_AMOUNT: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Medication_Ingredient_Amount";
pub const EXT_NORM_SIZE: &str = "http://fhir.de/StructureDefinition/normgroesse";
pub const EXT_EMERGENCY_FEE: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_EmergencyServicesFee";
pub const EXT_BVG: &str = "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_BVG";
pub const EXT_CO_PAYMENT: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_EX_FOR_StatusCoPayment";
pub const EXT_ACCIDENT_V102: &str = "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Accident";
pub const EXT_ACCIDENT_V110: &str = "https://fhir.kbv.de/StructureDefinition/KBV_EX_FOR_Accident";
pub const EXT_MULTIPLE_PRESCRIPTION: &str =
    "https://fhir.kbv.de/StructureDefinition/KBV_EX_ERP_Multiple_Prescription";
pub const EXT_COVERAGE_STATUS: &str = "http://fhir.de/StructureDefinition/gkv/versichertenart";

// --- gematik workflow extensions ---

pub const EXT_EXPIRY_DATE: &str =
    "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_EX_ExpiryDate";
pub const EXT_ACCEPT_DATE: &str =
    "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_EX_AcceptDate";
pub const EXT_LAST_MEDICATION_DISPENSE: &str =
    "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_EX_LastMedicationDispense";

// --- ePA medication extensions ---

pub const EPA_EXT_DRUG_CATEGORY: &str =
    "https://gematik.de/fhir/epa-medication/StructureDefinition/drug-category-extension";
pub const EPA_EXT_VACCINE: &str =
    "https://gematik.de/fhir/epa-medication/StructureDefinition/medication-id-vaccine-extension";
pub const EPA_EXT_MANUFACTURING_INSTRUCTIONS: &str =
    "https://gematik.de/fhir/epa-medication/StructureDefinition/medication-manufacturing-instructions-extension";
pub const EPA_EXT_PACKAGING: &str =
    "https://gematik.de/fhir/epa-medication/StructureDefinition/medication-formulation-packaging-extension";

// --- DAV PKV extensions ---

pub const DAV_EXT_TOTAL_CO_PAYMENT: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-EX-ERP-Gesamtzuzahlung";
pub const DAV_EXT_VAT_RATE: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-EX-ERP-MwStSatz";
pub const DAV_EXT_ADDITIONAL_ATTRIBUTES: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-EX-ERP-Zusatzattribute";
pub const DAV_EXT_COUNTER: &str =
    "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-EX-ERP-Zaehler";

// Nested extension URLs inside DAV-EX-ERP-Zusatzattribute. Relative by
// convention in the Abgabedaten profiles.
pub const DAV_NESTED_PARTIAL_QUANTITY: &str = "Teilmengenabgabe";
pub const DAV_NESTED_KEY: &str = "Schluessel";
pub const DAV_NESTED_SPENDER_PZN: &str = "Spender-PZN";

// --- TA1 special billing codes driving additional-data interpretation ---

/// Separate delivery items (auseinzelbare Packung)
pub const TA1_SEPARATE_DELIVERY: &str = "02567053";
/// Cytostatic preparation; additional data carries per-step production
/// narratives
pub const TA1_CYTOSTATIC: &str = "09999092";
