//! Path-based navigation primitives for untyped FHIR JSON
//!
//! FHIR documents are deeply nested, loosely typed JSON trees. This crate
//! provides a small query micro-language over `serde_json::Value` so that
//! resource extractors stay declarative instead of repeating traversal code:
//!
//! - `contained*` accessors descend through nested keys with explicit
//!   present/absent semantics (`Result` vs `Option`)
//! - `find_all` walks a dotted path and flattens one level per array it
//!   crosses (e.g. `entry.resource.identifier`)
//! - `filter_with` narrows a node sequence by a predicate on a sub-path value
//!
//! Everything here is pure: the tree is never mutated and there is no shared
//! state between calls.
//!
//! # Example
//!
//! ```rust
//! use erx_fhir_json::{Contained, filter_with, string_value};
//! use serde_json::json;
//!
//! let bundle = json!({
//!     "entry": [
//!         { "resource": { "resourceType": "Patient", "id": "p1" } },
//!         { "resource": { "resourceType": "Organization", "id": "o1" } }
//!     ]
//! });
//!
//! let patients: Vec<_> = filter_with(
//!     bundle.find_all("entry.resource"),
//!     "resourceType",
//!     string_value("Patient"),
//! )
//! .collect();
//!
//! assert_eq!(patients.len(), 1);
//! assert_eq!(patients[0].contained_str("id").unwrap(), "p1");
//! ```

pub mod error;
pub mod navigation;
pub mod predicates;

pub use error::{Error, Result};
pub use navigation::{filter_with, Contained, FindAll};
pub use predicates::{not, or, string_value};
