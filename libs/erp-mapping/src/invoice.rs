//! PKV dispense data extraction (DAV Abgabedaten, versions 1.1 - 1.3)
//!
//! An Abgabedaten bundle carries the dispensing pharmacy, dispense
//! information, the billing lines (Abrechnungszeilen) and optional additional
//! data (Zusatzdaten). How the additional data is interpreted depends on the
//! billing code of the FIRST line item. This is an implicit convention of the
//! Abgabedaten specification, not a data-driven discriminant: a TA1 code
//! 02567053 marks separately delivered partial packages, 09999092 marks a
//! cytostatic preparation whose production steps become narrative lines, and
//! any other code treats the additional units as compounding components.

use erx_fhir_json::Contained;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::primitives::{
    coding_code, extension_with_url, identifier_value, optional_instant, required_instant,
};
use crate::kbv::extract_organization;
use crate::profiles::{classify, resource_profile, ProfileKind};
use crate::systems::{
    DAV_EXT_ADDITIONAL_ATTRIBUTES, DAV_EXT_COUNTER, DAV_EXT_TOTAL_CO_PAYMENT, DAV_EXT_VAT_RATE,
    DAV_NESTED_KEY, DAV_NESTED_PARTIAL_QUANTITY, DAV_NESTED_SPENDER_PZN, SYSTEM_ACCESS_CODE,
    SYSTEM_HMNR, SYSTEM_PRESCRIPTION_ID, SYSTEM_PZN, SYSTEM_TA1, TA1_CYTOSTATIC,
    TA1_SEPARATE_DELIVERY,
};
use erx_models::{
    ChargeItem, ChargeableItem, Invoice, InvoiceData, ItemCode, PriceComponent,
};

fn decimal_at(node: &Value, path: &str) -> Result<Decimal> {
    match node.contained_or_null(path) {
        None => Err(Error::missing(path)),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .map_err(|e| Error::malformed(path, e.to_string())),
        Some(Value::String(s)) => {
            Decimal::from_str(s).map_err(|e| Error::malformed(path, e.to_string()))
        }
        Some(_) => Err(Error::TypeMismatch {
            path: path.to_string(),
            expected: "number",
        }),
    }
}

/// Resolves the billing code of a line item. Priority order is PZN, then
/// TA1, then HMNR; the first matching coding system wins.
fn item_code(line: &Value) -> Option<ItemCode> {
    let code_with = |system: &str| {
        coding_code(line, "chargeItemCodeableConcept.coding", system).map(str::to_string)
    };
    code_with(SYSTEM_PZN)
        .map(ItemCode::Pzn)
        .or_else(|| code_with(SYSTEM_TA1).map(ItemCode::Ta1))
        .or_else(|| code_with(SYSTEM_HMNR).map(ItemCode::Hmnr))
}

fn line_text(line: &Value) -> Option<String> {
    line.contained_str_or_null("chargeItemCodeableConcept.text")
        .or_else(|| {
            line.find_all("chargeItemCodeableConcept.coding.display")
                .find_map(Value::as_str)
        })
        .map(str::to_string)
}

/// Extracts one billing line. Price amount, factor and VAT rate are
/// mandatory; their absence fails the line (and with it the bundle).
fn chargeable_item(line: &Value) -> Result<ChargeableItem> {
    let code =
        item_code(line).ok_or_else(|| Error::missing("lineItem.chargeItemCodeableConcept.coding"))?;

    let price_component = line
        .find_all("priceComponent")
        .next()
        .ok_or_else(|| Error::missing("lineItem.priceComponent"))?;
    let value = decimal_at(price_component, "amount.value")?;
    let factor = decimal_at(price_component, "factor")?;
    let tax = extension_with_url(price_component, DAV_EXT_VAT_RATE)
        .ok_or_else(|| Error::missing("lineItem.priceComponent.extension(MwStSatz)"))
        .and_then(|ext| decimal_at(ext, "valueDecimal"))?;

    // Partial quantity dispensing is flagged through a nested extension
    // chain; the donor PZN is only read when the flag is actually set.
    let partial = extension_with_url(line, DAV_EXT_ADDITIONAL_ATTRIBUTES)
        .and_then(|attrs| extension_with_url(attrs, DAV_NESTED_PARTIAL_QUANTITY));
    let partial_quantity_delivery = partial
        .and_then(|p| extension_with_url(p, DAV_NESTED_KEY))
        .and_then(|key| key.contained_bool_or_null("valueBoolean"))
        .unwrap_or(false);
    let spender_pzn = if partial_quantity_delivery {
        partial
            .and_then(|p| extension_with_url(p, DAV_NESTED_SPENDER_PZN))
            .and_then(|ext| ext.contained_str_or_null("valueString"))
            .map(str::to_string)
    } else {
        None
    };

    Ok(ChargeableItem {
        code,
        text: line_text(line).unwrap_or_default(),
        factor,
        price: PriceComponent { value, tax },
        partial_quantity_delivery,
        spender_pzn,
    })
}

/// Ordering counter of a Zusatzdaten resource.
fn counter(resource: &Value) -> Option<i64> {
    extension_with_url(resource, DAV_EXT_COUNTER)
        .and_then(|ext| ext.contained_int_or_null("valuePositiveInt"))
}

/// Builds the per-step narratives of a cytostatic preparation:
/// `"Herstellung {n} - {timestamp}: {joined items}"`, one line per
/// production step in counter order. The timestamp is kept verbatim.
fn production_narratives(productions: &[&Value], units: &[&Value]) -> Result<Vec<String>> {
    let mut steps: Vec<(i64, &Value)> = productions
        .iter()
        .enumerate()
        .map(|(idx, p)| (counter(p).unwrap_or(idx as i64 + 1), *p))
        .collect();
    steps.sort_by_key(|(n, _)| *n);

    let mut narratives = Vec::with_capacity(steps.len());
    for (n, production) in steps {
        let timestamp = production.contained_str("whenPrepared")?;
        let items: Vec<String> = units
            .iter()
            .filter(|unit| counter(unit) == Some(n))
            .flat_map(|unit| unit.find_all("lineItem"))
            .filter_map(line_text)
            .collect();
        narratives.push(format!("Herstellung {n} - {timestamp}: {}", items.join(", ")));
    }
    Ok(narratives)
}

/// Compounding fallback: one free-text component line per additional unit.
fn compounding_components(units: &[&Value]) -> Vec<String> {
    units
        .iter()
        .filter_map(|unit| {
            let texts: Vec<String> = unit.find_all("lineItem").filter_map(line_text).collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.join(", "))
            }
        })
        .collect()
}

/// Extracts a complete PKV dispense bundle
/// (DAV-PKV-PR-ERP-AbgabedatenBundle).
pub fn extract_invoice_bundle(bundle: &Value) -> Result<InvoiceData> {
    match classify(bundle) {
        Some(ProfileKind::DavBundle(_)) => {}
        _ => {
            return Err(Error::UnrecognizedProfile(
                resource_profile(bundle).unwrap_or("<none>").to_string(),
            ))
        }
    }

    let mut pharmacy = None;
    let mut when_handed_over = None;
    let mut lines_resource = None;
    let mut units: Vec<&Value> = Vec::new();
    let mut productions: Vec<&Value> = Vec::new();

    for resource in bundle.find_all("entry.resource") {
        match classify(resource) {
            Some(ProfileKind::DavPharmacy(_)) => {
                pharmacy = Some(extract_organization(resource)?);
            }
            Some(ProfileKind::DavDispenseInformation(_)) => {
                when_handed_over = optional_instant(resource, "whenHandedOver")?;
            }
            Some(ProfileKind::DavInvoiceLines(_)) => {
                lines_resource = Some(resource);
            }
            Some(ProfileKind::DavAdditionalUnit(_)) => units.push(resource),
            Some(ProfileKind::DavAdditionalProduction(_)) => productions.push(resource),
            other => {
                debug!(?other, "skipping dispense bundle entry");
            }
        }
    }

    let pharmacy = pharmacy.ok_or(Error::MissingResource("Apotheke"))?;
    let lines = lines_resource.ok_or(Error::MissingResource("Abrechnungszeilen"))?;

    let chargeable_items: Vec<ChargeableItem> = lines
        .find_all("lineItem")
        .map(chargeable_item)
        .collect::<Result<_>>()?;
    if chargeable_items.is_empty() {
        return Err(Error::missing("lineItem"));
    }

    let total_brutto_amount = decimal_at(lines, "totalGross.value")?;
    let currency = lines.contained_str("totalGross.currency")?.to_string();
    let total_additional_fee = lines
        .contained_or_null("totalGross")
        .and_then(|total| extension_with_url(total, DAV_EXT_TOTAL_CO_PAYMENT))
        .map(|ext| decimal_at(ext, "valueMoney.value"))
        .transpose()?
        .unwrap_or(Decimal::ZERO);

    // The first line's billing code decides how the Zusatzdaten entries are
    // read. Preserved exactly as specified by the Abgabedaten convention.
    let (additional_dispense_items, additional_information) = match &chargeable_items[0].code {
        ItemCode::Ta1(code) if code == TA1_SEPARATE_DELIVERY => {
            let items = units
                .iter()
                .flat_map(|unit| unit.find_all("lineItem"))
                .map(chargeable_item)
                .collect::<Result<Vec<_>>>()?;
            (items, Vec::new())
        }
        ItemCode::Ta1(code) if code == TA1_CYTOSTATIC => {
            (Vec::new(), production_narratives(&productions, &units)?)
        }
        _ => (Vec::new(), compounding_components(&units)),
    };

    Ok(InvoiceData {
        pharmacy,
        when_handed_over,
        invoice: Invoice {
            total_additional_fee,
            total_brutto_amount,
            currency,
            chargeable_items,
            additional_dispense_items,
            additional_information,
        },
    })
}

/// Extracts a GEM_ERPCHRG ChargeItem, the wrapper that references the three
/// signed bundles of a PKV charge.
pub fn extract_charge_item(resource: &Value) -> Result<ChargeItem> {
    match classify(resource) {
        Some(ProfileKind::ChargeItem) => {}
        _ => {
            return Err(Error::UnrecognizedProfile(
                resource_profile(resource).unwrap_or("<none>").to_string(),
            ))
        }
    }

    let reference_with_display = |display: &str| {
        resource
            .find_all("supportingInformation")
            .find(|info| info.contained_str_or_null("display") == Some(display))
            .and_then(|info| info.contained_str_or_null("reference"))
            .map(str::to_string)
    };

    Ok(ChargeItem {
        task_id: identifier_value(resource, SYSTEM_PRESCRIPTION_ID)
            .ok_or_else(|| Error::missing("identifier(PrescriptionId)"))?
            .to_string(),
        access_code: identifier_value(resource, SYSTEM_ACCESS_CODE).map(str::to_string),
        entered_date: required_instant(resource, "enteredDate")?,
        prescription_bundle_reference: reference_with_display("E-Rezept"),
        receipt_bundle_reference: reference_with_display("Quittung"),
        dispense_bundle_reference: reference_with_display("Abgabedatensatz"),
    })
}
