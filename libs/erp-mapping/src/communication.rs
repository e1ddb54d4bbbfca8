//! Communication extraction (GEM_ERP_PR_Communication_DispReq / _Reply)

use erx_fhir_json::Contained;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::primitives::{identifier_value, required_instant, task_id_from_reference};
use crate::profiles::{classify, resource_profile, ProfileKind};
use crate::systems::SYSTEM_ORDER_ID;
use erx_models::{Communication, CommunicationProfile};

/// Extracts a single Communication (dispense request or pharmacy reply).
///
/// `sent` and the first recipient identifier are mandatory; the sender is
/// absent on freshly posted messages, so it stays optional.
pub fn extract_communication(resource: &Value) -> Result<Communication> {
    let profile = match classify(resource) {
        Some(ProfileKind::CommunicationDispReq(_)) => CommunicationProfile::DispReq,
        Some(ProfileKind::CommunicationReply(_)) => CommunicationProfile::Reply,
        _ => {
            return Err(Error::UnrecognizedProfile(
                resource_profile(resource).unwrap_or("<none>").to_string(),
            ))
        }
    };

    let task_id = resource
        .find_all("basedOn.reference")
        .filter_map(Value::as_str)
        .find_map(task_id_from_reference);

    let recipient = resource
        .find_all("recipient.identifier.value")
        .find_map(Value::as_str)
        .ok_or_else(|| Error::missing("recipient.identifier.value"))?
        .to_string();

    Ok(Communication {
        profile,
        id: resource.contained_str_or_null("id").map(str::to_string),
        task_id,
        order_id: identifier_value(resource, SYSTEM_ORDER_ID).map(str::to_string),
        sent: required_instant(resource, "sent")?,
        sender: resource
            .contained_str_or_null("sender.identifier.value")
            .map(str::to_string),
        recipient,
        payload: resource
            .find_all("payload.contentString")
            .find_map(Value::as_str)
            .map(str::to_string),
    })
}

/// Extracts every Communication from a search bundle, skipping entries with
/// unrecognized profiles.
pub fn extract_communications(bundle: &Value) -> Result<Vec<Communication>> {
    let mut communications = Vec::new();
    for resource in bundle.find_all("entry.resource") {
        match classify(resource) {
            Some(ProfileKind::CommunicationDispReq(_) | ProfileKind::CommunicationReply(_)) => {
                communications.push(extract_communication(resource)?);
            }
            other => {
                debug!(?other, "skipping communication bundle entry");
            }
        }
    }
    Ok(communications)
}
