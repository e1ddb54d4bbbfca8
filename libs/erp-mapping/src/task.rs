//! Task extraction (GEM_ERP_PR_Task, versions 1.2 - 1.4)

use erx_fhir_json::Contained;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::primitives::{
    extension_with_url, identifier_value, optional_date, optional_instant, required_instant,
};
use crate::profiles::{classify, resource_profile, ProfileKind};
use crate::systems::{
    EXT_ACCEPT_DATE, EXT_EXPIRY_DATE, EXT_LAST_MEDICATION_DISPENSE, SYSTEM_ACCESS_CODE,
    SYSTEM_PRESCRIPTION_ID,
};
use erx_models::{TaskData, TaskStatus};

/// Extracts a workflow Task. The prescription id, `authoredOn` and
/// `lastModified` are mandatory; the flow-dependent dates (expiry, accept,
/// last medication dispense) are carried as extensions and optional.
pub fn extract_task(resource: &Value) -> Result<TaskData> {
    match classify(resource) {
        Some(ProfileKind::Task(_)) => {}
        _ => {
            return Err(Error::UnrecognizedProfile(
                resource_profile(resource).unwrap_or("<none>").to_string(),
            ))
        }
    }

    let task_id = identifier_value(resource, SYSTEM_PRESCRIPTION_ID)
        .ok_or_else(|| Error::missing("identifier(PrescriptionId)"))?
        .to_string();

    let expires_on = extension_with_url(resource, EXT_EXPIRY_DATE)
        .map(|ext| optional_date(ext, "valueDate"))
        .transpose()?
        .flatten();
    let accept_until = extension_with_url(resource, EXT_ACCEPT_DATE)
        .map(|ext| optional_date(ext, "valueDate"))
        .transpose()?
        .flatten();
    let last_medication_dispense = extension_with_url(resource, EXT_LAST_MEDICATION_DISPENSE)
        .map(|ext| optional_instant(ext, "valueInstant"))
        .transpose()?
        .flatten();

    Ok(TaskData {
        task_id,
        access_code: identifier_value(resource, SYSTEM_ACCESS_CODE).map(str::to_string),
        status: TaskStatus::from_code(resource.contained_str_or_null("status").unwrap_or("")),
        authored_on: required_instant(resource, "authoredOn")?,
        last_modified: required_instant(resource, "lastModified")?,
        expires_on,
        accept_until,
        last_medication_dispense,
        prescription_bundle_reference: resource
            .find_all("input.valueReference.reference")
            .find_map(Value::as_str)
            .map(str::to_string),
    })
}

/// Extracts every Task from a search bundle. Entries with unrecognized
/// profiles are skipped; a recognized Task that fails extraction fails the
/// whole call.
pub fn extract_tasks(bundle: &Value) -> Result<Vec<TaskData>> {
    let mut tasks = Vec::new();
    for resource in bundle.find_all("entry.resource") {
        match classify(resource) {
            Some(ProfileKind::Task(_)) => tasks.push(extract_task(resource)?),
            other => {
                debug!(?other, "skipping task bundle entry");
            }
        }
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn task_resource() -> Value {
        json!({
            "meta": { "profile": ["https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_PR_Task|1.3"] },
            "identifier": [
                {
                    "system": "https://gematik.de/fhir/erp/NamingSystem/GEM_ERP_NS_PrescriptionId",
                    "value": "160.000.033.491.280.78"
                },
                {
                    "system": "https://gematik.de/fhir/erp/NamingSystem/GEM_ERP_NS_AccessCode",
                    "value": "777bea0e13cc9c42ceec14aec3ddee2263325dc2c6c699db115f58fe423607ea"
                }
            ],
            "extension": [
                {
                    "url": "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_EX_ExpiryDate",
                    "valueDate": "2022-06-02"
                },
                {
                    "url": "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_EX_AcceptDate",
                    "valueDate": "2022-04-02"
                },
                {
                    "url": "https://gematik.de/fhir/erp/StructureDefinition/GEM_ERP_EX_LastMedicationDispense",
                    "valueInstant": "2022-05-20T11:20:10+02:00"
                }
            ],
            "status": "in-progress",
            "authoredOn": "2022-03-18T15:26:00+00:00",
            "lastModified": "2022-03-18T15:29:00+00:00",
            "input": [{
                "type": { "coding": [{ "code": "2" }] },
                "valueReference": { "reference": "Bundle/6ea6f0ae-1b1f-4b2c-a882-4b1d2b3f4c5d" }
            }]
        })
    }

    #[test]
    fn extracts_task_with_all_dates() {
        let task = extract_task(&task_resource()).unwrap();
        assert_eq!(task.task_id, "160.000.033.491.280.78");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.access_code.is_some());
        assert_eq!(task.expires_on, NaiveDate::from_ymd_opt(2022, 6, 2));
        assert_eq!(task.accept_until, NaiveDate::from_ymd_opt(2022, 4, 2));
        assert_eq!(
            task.last_medication_dispense.unwrap().to_rfc3339(),
            "2022-05-20T11:20:10+02:00"
        );
        assert_eq!(
            task.prescription_bundle_reference.as_deref(),
            Some("Bundle/6ea6f0ae-1b1f-4b2c-a882-4b1d2b3f4c5d")
        );
    }

    #[test]
    fn missing_last_modified_fails() {
        let mut resource = task_resource();
        resource.as_object_mut().unwrap().remove("lastModified");
        assert_eq!(extract_task(&resource), Err(Error::missing("lastModified")));
    }

    #[test]
    fn unknown_status_maps_to_other() {
        let mut resource = task_resource();
        resource["status"] = json!("paused");
        assert_eq!(extract_task(&resource).unwrap().status, TaskStatus::Other);
    }

    #[test]
    fn bundle_skips_foreign_entries() {
        let bundle = json!({
            "entry": [
                { "resource": task_resource() },
                { "resource": { "resourceType": "OperationOutcome" } }
            ]
        });
        let tasks = extract_tasks(&bundle).unwrap();
        assert_eq!(tasks.len(), 1);
    }
}
