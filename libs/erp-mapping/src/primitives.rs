//! Shared extraction helpers
//!
//! HumanName/address/identifier/extension plumbing used by every resource
//! extractor, plus lenient FHIR temporal parsing. All helpers are pure
//! functions over a borrowed JSON node.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use erx_fhir_json::{filter_with, string_value, Contained};
use serde_json::Value;

use crate::error::{Error, Result};
use erx_models::Address;

/// First `extension` element of `node` with the given `url`.
pub(crate) fn extension_with_url<'a>(node: &'a Value, url: &str) -> Option<&'a Value> {
    filter_with(node.find_all("extension"), "url", string_value(url)).next()
}

/// Value of the first identifier whose `system` matches.
pub(crate) fn identifier_value<'a>(resource: &'a Value, system: &str) -> Option<&'a str> {
    filter_with(resource.find_all("identifier"), "system", string_value(system))
        .next()?
        .contained_str_or_null("value")
}

/// First coding of a CodeableConcept at `path` whose `system` matches,
/// returning its `code`.
pub(crate) fn coding_code<'a>(node: &'a Value, path: &str, system: &str) -> Option<&'a str> {
    filter_with(node.find_all(path), "system", string_value(system))
        .next()?
        .contained_str_or_null("code")
}

/// Value of the first `telecom` entry with the given system ("phone",
/// "email", "url").
pub(crate) fn telecom_value<'a>(resource: &'a Value, system: &str) -> Option<&'a str> {
    filter_with(resource.find_all("telecom"), "system", string_value(system))
        .next()?
        .contained_str_or_null("value")
}

/// Official-use HumanName composed as "prefix given family", skipping absent
/// parts. Falls back to the first name entry when no official one exists.
pub(crate) fn human_name(resource: &Value) -> Option<String> {
    let name = filter_with(resource.find_all("name"), "use", string_value("official"))
        .next()
        .or_else(|| resource.find_all("name").next())?;

    let mut parts: Vec<&str> = Vec::new();
    for prefix in name.find_all("prefix") {
        if let Some(p) = prefix.as_str() {
            parts.push(p);
        }
    }
    for given in name.find_all("given") {
        if let Some(g) = given.as_str() {
            parts.push(g);
        }
    }
    if let Some(family) = name.contained_str_or_null("family") {
        parts.push(family);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// First `address` element mapped to its line list, postal code, and city.
pub(crate) fn address(resource: &Value) -> Option<Address> {
    let addr = resource.find_all("address").next()?;
    Some(Address {
        line: addr
            .find_all("line")
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        postal_code: addr.contained_str_or_null("postalCode").map(str::to_string),
        city: addr.contained_str_or_null("city").map(str::to_string),
    })
}

/// Renders a JSON scalar (string or number) in source form.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses a FHIR date, accepting the partial forms `YYYY` and `YYYY-MM`
/// (coerced to the first day of the period). Malformed input is a hard
/// failure.
pub(crate) fn parse_fhir_date(input: &str, path: &str) -> Result<NaiveDate> {
    let s = input.trim();
    let normalized = match s.len() {
        4 => format!("{s}-01-01"),
        7 => format!("{s}-01"),
        10 => s.to_string(),
        _ => return Err(Error::malformed(path, format!("not a FHIR date: {input:?}"))),
    };
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .map_err(|_| Error::malformed(path, format!("not a FHIR date: {input:?}")))
}

/// Parses a FHIR instant/dateTime. Date-only values are accepted and placed
/// at midnight UTC; everything else must be RFC 3339.
pub(crate) fn parse_instant(input: &str, path: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input.trim()) {
        return Ok(dt);
    }
    let date = parse_fhir_date(input, path)
        .map_err(|_| Error::malformed(path, format!("not a FHIR instant: {input:?}")))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::malformed(path, format!("not a FHIR instant: {input:?}")))?;
    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc.fix()))
}

/// Required timestamp at `path`.
pub(crate) fn required_instant(node: &Value, path: &str) -> Result<DateTime<FixedOffset>> {
    parse_instant(node.contained_str(path)?, path)
}

/// Optional timestamp at `path`; present-but-malformed still fails hard.
pub(crate) fn optional_instant(node: &Value, path: &str) -> Result<Option<DateTime<FixedOffset>>> {
    node.contained_str_or_null(path)
        .map(|s| parse_instant(s, path))
        .transpose()
}

/// Optional date at `path`; present-but-malformed still fails hard.
pub(crate) fn optional_date(node: &Value, path: &str) -> Result<Option<NaiveDate>> {
    node.contained_str_or_null(path)
        .map(|s| parse_fhir_date(s, path))
        .transpose()
}

/// Extracts the text content of an XHTML narrative `div`, stripping all tags.
pub(crate) fn strip_xhtml(div: &str) -> String {
    let mut text = String::with_capacity(div.len());
    let mut in_tag = false;
    for ch in div.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.trim().to_string()
}

/// Task id referenced as `Task/<id>` (optionally followed by `/$accept?...`).
pub(crate) fn task_id_from_reference(reference: &str) -> Option<String> {
    let (_, rest) = reference.split_once("Task/")?;
    let id: String = rest
        .chars()
        .take_while(|c| *c != '/' && *c != '$' && *c != '?')
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
