//! Pharmacy directory search results (Apo-VZD)
//!
//! Directory bundles are plain FHIR without custom profiles: each pharmacy is
//! a `Location` entry whose offered services are `contained`
//! `HealthcareService` resources. Directory data quality is mixed, so a
//! broken entry never fails the page; it is reported through a callback and
//! the remaining entries are kept.

use chrono::{NaiveTime, Weekday};
use erx_fhir_json::Contained;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::primitives::{address, telecom_value};
use erx_models::{
    OpeningHours, OpeningTime, Pharmacy, PharmacyContact, PharmacySearchResult, PharmacyService,
    Position,
};

/// The directory almost exclusively emits opening times on the half-hour
/// grid. The grid is matched by exact string comparison before any parsing,
/// so a `chrono` format quirk can never reject the common case.
#[rustfmt::skip]
const HALF_HOUR_GRID: [(&str, u32, u32); 48] = [
    ("00:00:00", 0, 0),  ("00:30:00", 0, 30),  ("01:00:00", 1, 0),  ("01:30:00", 1, 30),
    ("02:00:00", 2, 0),  ("02:30:00", 2, 30),  ("03:00:00", 3, 0),  ("03:30:00", 3, 30),
    ("04:00:00", 4, 0),  ("04:30:00", 4, 30),  ("05:00:00", 5, 0),  ("05:30:00", 5, 30),
    ("06:00:00", 6, 0),  ("06:30:00", 6, 30),  ("07:00:00", 7, 0),  ("07:30:00", 7, 30),
    ("08:00:00", 8, 0),  ("08:30:00", 8, 30),  ("09:00:00", 9, 0),  ("09:30:00", 9, 30),
    ("10:00:00", 10, 0), ("10:30:00", 10, 30), ("11:00:00", 11, 0), ("11:30:00", 11, 30),
    ("12:00:00", 12, 0), ("12:30:00", 12, 30), ("13:00:00", 13, 0), ("13:30:00", 13, 30),
    ("14:00:00", 14, 0), ("14:30:00", 14, 30), ("15:00:00", 15, 0), ("15:30:00", 15, 30),
    ("16:00:00", 16, 0), ("16:30:00", 16, 30), ("17:00:00", 17, 0), ("17:30:00", 17, 30),
    ("18:00:00", 18, 0), ("18:30:00", 18, 30), ("19:00:00", 19, 0), ("19:30:00", 19, 30),
    ("20:00:00", 20, 0), ("20:30:00", 20, 30), ("21:00:00", 21, 0), ("21:30:00", 21, 30),
    ("22:00:00", 22, 0), ("22:30:00", 22, 30), ("23:00:00", 23, 0), ("23:30:00", 23, 30),
];

fn lookup_half_hour(input: &str) -> Option<NaiveTime> {
    HALF_HOUR_GRID
        .iter()
        .find(|(s, _, _)| *s == input)
        .and_then(|(_, h, m)| NaiveTime::from_hms_opt(*h, *m, 0))
}

/// Parses a time of day: half-hour grid first, then `HH:MM:SS`, then
/// `HH:MM`.
fn parse_time_of_day(input: &str, path: &str) -> Result<NaiveTime> {
    if let Some(time) = lookup_half_hour(input) {
        return Ok(time);
    }
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| Error::malformed(path, format!("not a time of day: {input:?}")))
}

fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Contact URLs in the directory range from proper URLs to free text;
/// anything that is not recognizably a URL degrades to an empty string.
fn sanitize_url(input: &str) -> String {
    if input.starts_with("http") {
        input.to_string()
    } else {
        String::new()
    }
}

/// Opening hours of one HealthcareService: every `availableTime` interval,
/// fanned out over its `daysOfWeek`. Unknown weekday codes are dropped.
fn opening_hours(service: &Value) -> Result<OpeningHours> {
    let mut times = Vec::new();
    for available in service.find_all("availableTime") {
        let opens = available
            .contained_str_or_null("availableStartTime")
            .map(|s| parse_time_of_day(s, "availableTime.availableStartTime"))
            .transpose()?;
        let closes = available
            .contained_str_or_null("availableEndTime")
            .map(|s| parse_time_of_day(s, "availableTime.availableEndTime"))
            .transpose()?;
        for day in available
            .find_all("daysOfWeek")
            .filter_map(Value::as_str)
            .filter_map(weekday_from_code)
        {
            times.push(OpeningTime { day, opens, closes });
        }
    }
    Ok(OpeningHours(times))
}

fn service_kind(service: &Value) -> Option<&str> {
    service.find_all("type.coding.code").find_map(Value::as_str)
}

/// Extracts one pharmacy from a `Location` entry.
pub fn extract_pharmacy(location: &Value) -> Result<Pharmacy> {
    let name = location.contained_str("name")?.to_string();

    let position = match (
        location.contained_f64_or_null("position.latitude"),
        location.contained_f64_or_null("position.longitude"),
    ) {
        (Some(latitude), Some(longitude)) => Some(Position {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let mut services = Vec::new();
    for contained in location.find_all("contained") {
        if contained.contained_str_or_null("resourceType") != Some("HealthcareService") {
            continue;
        }
        match service_kind(contained) {
            Some("498") => services.push(PharmacyService::Delivery {
                opening_hours: opening_hours(contained)?,
            }),
            Some("MOBL") => services.push(PharmacyService::Online),
            Some("OUTPHARM") => services.push(PharmacyService::Pickup {
                opening_hours: opening_hours(contained)?,
            }),
            _ => {}
        }
    }

    Ok(Pharmacy {
        id: location.contained_str_or_null("id").map(str::to_string),
        name,
        address: address(location),
        contact: PharmacyContact {
            phone: telecom_value(location, "phone").unwrap_or("").to_string(),
            mail: telecom_value(location, "email").unwrap_or("").to_string(),
            url: sanitize_url(telecom_value(location, "url").unwrap_or("")),
        },
        position,
        services,
    })
}

/// Extracts a pharmacy search page.
///
/// Extraction is per-entry: a failing entry is logged, reported through
/// `on_error` with its entry index, and skipped; the rest of the page
/// survives.
pub fn extract_pharmacies(
    bundle: &Value,
    mut on_error: impl FnMut(usize, Error),
) -> PharmacySearchResult {
    let mut pharmacies = Vec::new();
    for (index, resource) in bundle.find_all("entry.resource").enumerate() {
        if resource.contained_str_or_null("resourceType") != Some("Location") {
            continue;
        }
        match extract_pharmacy(resource) {
            Ok(pharmacy) => pharmacies.push(pharmacy),
            Err(error) => {
                warn!(index, %error, "skipping malformed pharmacy entry");
                on_error(index, error);
            }
        }
    }

    PharmacySearchResult {
        total: bundle.contained_int_or_null("total").and_then(|t| u64::try_from(t).ok()),
        pharmacies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn half_hour_grid_short_circuits_parsing() {
        assert_eq!(
            parse_time_of_day("09:30:00", "t").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        // Off-grid but well-formed times still parse.
        assert_eq!(
            parse_time_of_day("09:31:00", "t").unwrap(),
            NaiveTime::from_hms_opt(9, 31, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("09:31", "t").unwrap(),
            NaiveTime::from_hms_opt(9, 31, 0).unwrap()
        );
        assert!(parse_time_of_day("9 Uhr 30", "t").is_err());
    }

    #[test]
    fn sanitizes_contact_urls() {
        assert_eq!(sanitize_url("https://apotheke.example"), "https://apotheke.example");
        assert_eq!(sanitize_url("www.apotheke.example"), "");
        assert_eq!(sanitize_url(""), "");
    }

    fn location() -> Value {
        json!({
            "resourceType": "Location",
            "id": "d1883b24",
            "name": "Adler-Apotheke",
            "telecom": [
                { "system": "phone", "value": "0301234567" },
                { "system": "email", "value": "info@adler.example" },
                { "system": "url", "value": "www.adler.example" }
            ],
            "address": { "line": ["Taunusstraße 89"], "postalCode": "63225", "city": "Langen" },
            "position": { "longitude": 8.668330, "latitude": 49.993160 },
            "contained": [
                {
                    "resourceType": "HealthcareService",
                    "type": [{ "coding": [{ "code": "OUTPHARM" }] }],
                    "availableTime": [
                        {
                            "daysOfWeek": ["mon", "tue"],
                            "availableStartTime": "08:00:00",
                            "availableEndTime": "18:30:00"
                        }
                    ]
                },
                {
                    "resourceType": "HealthcareService",
                    "type": [{ "coding": [{ "code": "MOBL" }] }]
                }
            ]
        })
    }

    #[test]
    fn extracts_pharmacy_with_services() {
        let pharmacy = extract_pharmacy(&location()).unwrap();
        assert_eq!(pharmacy.name, "Adler-Apotheke");
        assert_eq!(pharmacy.contact.phone, "0301234567");
        // Non-URL contact entries degrade to empty.
        assert_eq!(pharmacy.contact.url, "");
        assert_eq!(pharmacy.position.as_ref().map(|p| p.latitude), Some(49.993160));
        assert_eq!(pharmacy.services.len(), 2);
        match &pharmacy.services[0] {
            PharmacyService::Pickup { opening_hours } => {
                assert_eq!(opening_hours.0.len(), 2);
                assert_eq!(opening_hours.0[0].day, Weekday::Mon);
                assert_eq!(opening_hours.0[0].opens, NaiveTime::from_hms_opt(8, 0, 0));
                assert_eq!(opening_hours.0[1].day, Weekday::Tue);
            }
            other => panic!("expected pickup service, got {other:?}"),
        }
        assert_eq!(pharmacy.services[1], PharmacyService::Online);
    }

    #[test]
    fn broken_entry_reports_and_keeps_the_rest() {
        let bundle = json!({
            "total": 2,
            "entry": [
                { "resource": { "resourceType": "Location" } },
                { "resource": location() }
            ]
        });

        let mut failed = Vec::new();
        let result = extract_pharmacies(&bundle, |index, error| failed.push((index, error)));

        assert_eq!(result.total, Some(2));
        assert_eq!(result.pharmacies.len(), 1);
        assert_eq!(result.pharmacies[0].name, "Adler-Apotheke");
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, 0);
        assert_eq!(failed[0].1, Error::missing("name"));
    }
}
