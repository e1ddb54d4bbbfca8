//! Domain records for the German e-prescription ("E-Rezept") workflow
//!
//! This crate holds the plain, immutable value records that the FHIR mapping
//! layer (`erx-mapping`) produces: prescription participants, medication
//! variants, dispense and invoice data, workflow resources (Task,
//! Communication, AuditEvent) and pharmacy search results.
//!
//! # Design Philosophy
//!
//! - **Immutable values**: every record is fully constructed in one
//!   extraction call; there is no partial-build state and no further mutation
//! - **Explicit absence**: optional fields are `Option<_>`, never sentinel
//!   strings, except where the wire format itself uses a deliberate
//!   placeholder (e.g. a `"-"` city in some KBV fixtures)
//! - **Tagged unions over builder injection**: variant-rich resources
//!   (medication, chargeable item codes, pharmacy services) are closed enums
//!   so version dispatch stays compiler-checked
//! - **Currency-safe money**: all money and tax values are `rust_decimal`
//!   decimals, never floats

pub mod invoice;
pub mod medication;
pub mod pharmacy;
pub mod prescription;
pub mod types;
pub mod workflow;

pub use invoice::*;
pub use medication::*;
pub use pharmacy::*;
pub use prescription::*;
pub use types::*;
pub use workflow::*;
