//! AuditEvent extraction (GEM_ERP_PR_AuditEvent, versions 1.1.1 and 1.2)

use erx_fhir_json::{filter_with, string_value, Contained};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::primitives::{required_instant, strip_xhtml};
use crate::profiles::{classify, resource_profile, AuditEventVersion, ProfileKind};
use crate::systems::{SYSTEM_PRESCRIPTION_ID, SYSTEM_PRESCRIPTION_ID_LEGACY};
use erx_models::AuditEvent;

/// Extracts one audit log entry. The human-readable description lives in the
/// XHTML narrative and is mandatory; the linked prescription id uses the
/// legacy naming-system URL up to profile 1.1.1 and the current one from 1.2.
pub fn extract_audit_event(resource: &Value) -> Result<AuditEvent> {
    let version = match classify(resource) {
        Some(ProfileKind::AuditEvent(version)) => version,
        _ => {
            return Err(Error::UnrecognizedProfile(
                resource_profile(resource).unwrap_or("<none>").to_string(),
            ))
        }
    };

    let prescription_id_system = match version {
        AuditEventVersion::V1_1_1 => SYSTEM_PRESCRIPTION_ID_LEGACY,
        AuditEventVersion::V1_2 => SYSTEM_PRESCRIPTION_ID,
    };
    let task_id = filter_with(
        resource.find_all("entity.what.identifier"),
        "system",
        string_value(prescription_id_system),
    )
    .next()
    .and_then(|id| id.contained_str_or_null("value"))
    .map(str::to_string);

    let narrative = resource.contained_str("text.div")?;

    Ok(AuditEvent {
        id: resource.contained_str_or_null("id").map(str::to_string),
        task_id,
        description: strip_xhtml(narrative),
        timestamp: required_instant(resource, "recorded")?,
    })
}

/// Extracts every audit log entry from a search bundle, skipping entries with
/// unrecognized profiles.
pub fn extract_audit_events(bundle: &Value) -> Result<Vec<AuditEvent>> {
    let mut events = Vec::new();
    for resource in bundle.find_all("entry.resource") {
        match classify(resource) {
            Some(ProfileKind::AuditEvent(_)) => events.push(extract_audit_event(resource)?),
            other => {
                debug!(?other, "skipping audit event bundle entry");
            }
        }
    }
    Ok(events)
}
