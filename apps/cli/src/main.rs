//! erx - extract typed records from e-prescription FHIR bundles
//!
//! Reads a FHIR JSON document, detects its kind by profile, and prints the
//! extracted record(s) as pretty JSON. Useful for inspecting fixtures and
//! server responses without a running app.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use erx_mapping::{
    classify, extract_audit_events, extract_charge_item, extract_communications,
    extract_invoice_bundle, extract_medication_dispenses, extract_pharmacies,
    extract_prescription_bundle, extract_tasks, resource_profile, ProfileKind,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "erx", version, about = "E-prescription FHIR bundle extraction")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the typed record(s) from a FHIR JSON file
    Extract {
        /// Path to the FHIR JSON document
        file: PathBuf,
        /// Force the document kind instead of detecting it by profile
        #[arg(long, value_enum)]
        kind: Option<Kind>,
    },
    /// Print the recognized profile kind of a FHIR JSON file
    Classify {
        /// Path to the FHIR JSON document
        file: PathBuf,
    },
}

/// Document kinds the `--kind` override accepts.
#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Prescription,
    Invoice,
    ChargeItem,
    Tasks,
    Communications,
    AuditEvents,
    Dispenses,
    Pharmacies,
}

fn load(path: &PathBuf) -> anyhow::Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn extract_as(document: &Value, kind: Kind) -> anyhow::Result<()> {
    match kind {
        Kind::Prescription => print_json(&extract_prescription_bundle(document)?),
        Kind::Invoice => print_json(&extract_invoice_bundle(document)?),
        Kind::ChargeItem => print_json(&extract_charge_item(document)?),
        Kind::Tasks => print_json(&extract_tasks(document)?),
        Kind::Communications => print_json(&extract_communications(document)?),
        Kind::AuditEvents => print_json(&extract_audit_events(document)?),
        Kind::Dispenses => print_json(&extract_medication_dispenses(document)?),
        Kind::Pharmacies => {
            let result = extract_pharmacies(document, |index, error| {
                tracing::warn!(index, %error, "skipped pharmacy entry");
            });
            print_json(&result)
        }
    }
}

/// Dispatches on the document's profile. Search bundles (Task, Communication,
/// AuditEvent, MedicationDispense, pharmacy Locations) carry no bundle-level
/// profile, so their entries decide.
fn extract(document: &Value) -> anyhow::Result<()> {
    match classify(document) {
        Some(ProfileKind::KbvBundle(_)) => {
            return print_json(&extract_prescription_bundle(document)?);
        }
        Some(ProfileKind::DavBundle(_)) => {
            return print_json(&extract_invoice_bundle(document)?);
        }
        Some(ProfileKind::ChargeItem) => {
            return print_json(&extract_charge_item(document)?);
        }
        _ => {}
    }

    // Unprofiled bundle: probe the first recognizable entry.
    let entry_kind = document
        .get("entry")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("resource"))
        .find_map(classify);

    match entry_kind {
        Some(ProfileKind::Task(_)) => print_json(&extract_tasks(document)?),
        Some(ProfileKind::CommunicationDispReq(_) | ProfileKind::CommunicationReply(_)) => {
            print_json(&extract_communications(document)?)
        }
        Some(ProfileKind::AuditEvent(_)) => print_json(&extract_audit_events(document)?),
        Some(ProfileKind::MedicationDispense(_)) => {
            print_json(&extract_medication_dispenses(document)?)
        }
        _ if has_locations(document) => {
            let result = extract_pharmacies(document, |index, error| {
                tracing::warn!(index, %error, "skipped pharmacy entry");
            });
            print_json(&result)
        }
        _ => bail!(
            "unrecognized document (profile: {})",
            resource_profile(document).unwrap_or("<none>")
        ),
    }
}

fn has_locations(document: &Value) -> bool {
    document
        .get("entry")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("resource"))
        .any(|resource| resource.get("resourceType").and_then(Value::as_str) == Some("Location"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract { file, kind } => {
            let document = load(&file)?;
            match kind {
                Some(kind) => extract_as(&document, kind),
                None => extract(&document),
            }
        }
        Command::Classify { file } => {
            let document = load(&file)?;
            match classify(&document) {
                Some(kind) => println!("{kind:?}"),
                None => println!(
                    "unrecognized (profile: {})",
                    resource_profile(&document).unwrap_or("<none>")
                ),
            }
            Ok(())
        }
    }
}
