//! Workflow resources: Task, Communication, AuditEvent, MedicationDispense

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::medication::Medication;

/// E-prescription task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Ready,
    InProgress,
    Completed,
    Cancelled,
    Accepted,
    Draft,
    Failed,
    OnHold,
    Requested,
    Received,
    Rejected,
    /// Any status string outside the closed set above
    Other,
}

impl TaskStatus {
    /// Maps the FHIR status string onto the closed set.
    pub fn from_code(code: &str) -> TaskStatus {
        match code {
            "ready" => TaskStatus::Ready,
            "in-progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            "cancelled" => TaskStatus::Cancelled,
            "accepted" => TaskStatus::Accepted,
            "draft" => TaskStatus::Draft,
            "failed" => TaskStatus::Failed,
            "on-hold" => TaskStatus::OnHold,
            "requested" => TaskStatus::Requested,
            "received" => TaskStatus::Received,
            "rejected" => TaskStatus::Rejected,
            _ => TaskStatus::Other,
        }
    }
}

/// E-prescription task (GEM_ERP_PR_Task).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
    /// Prescription id ("160.xxx.xxx.xxx.xxx.xx")
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
    pub status: TaskStatus,
    pub authored_on: DateTime<FixedOffset>,
    pub last_modified: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_until: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_medication_dispense: Option<DateTime<FixedOffset>>,
    /// Reference to the signed KBV prescription bundle carried as task input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription_bundle_reference: Option<String>,
}

/// Which communication profile a message conforms to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommunicationProfile {
    /// Dispense request sent by the insured to a pharmacy
    DispReq,
    /// Pharmacy reply
    Reply,
}

/// Message exchanged between insured person and pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub profile: CommunicationProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub sent: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

/// Server-side audit log entry (GEM_ERP_PR_AuditEvent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Absent for audit entries not related to a task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Human-readable narrative, XHTML wrapper stripped
    pub description: String,
    pub timestamp: DateTime<FixedOffset>,
}

/// Dispense record with its contained medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDispense {
    pub dispense_id: String,
    /// KVNR of the insured person
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_identifier: Option<String>,
    /// `Medication::Unknown` when the contained resource is absent or
    /// unrecognized
    pub medication: Medication,
    /// Telematik-ID of the dispensing pharmacy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    pub was_substituted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_handed_over: Option<DateTime<FixedOffset>>,
}
