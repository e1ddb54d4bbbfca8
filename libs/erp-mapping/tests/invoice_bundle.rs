//! End-to-end extraction of PKV dispense bundles, covering all three
//! interpretations of the additional data (Zusatzdaten).

use erx_mapping::extract_invoice_bundle;
use erx_models::ItemCode;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn line_item(system: &str, code: &str, text: &str, value: f64) -> Value {
    json!({
        "chargeItemCodeableConcept": {
            "coding": [{ "system": system, "code": code }],
            "text": text
        },
        "priceComponent": [{
            "extension": [{
                "url": "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-EX-ERP-MwStSatz",
                "valueDecimal": 19.0
            }],
            "factor": 1,
            "amount": { "value": value, "currency": "EUR" }
        }]
    })
}

fn bundle_with(first_line: Value, extra_entries: Vec<Value>) -> Value {
    let mut entries = vec![
        json!({
            "resource": {
                "resourceType": "Organization",
                "meta": { "profile": ["http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-Apotheke|1.2"] },
                "name": "Adler-Apotheke",
                "identifier": [{ "system": "http://fhir.de/sid/arge-ik/iknr", "value": "308412345" }],
                "address": [{ "line": ["Taunusstraße 89"], "postalCode": "63225", "city": "Langen" }]
            }
        }),
        json!({
            "resource": {
                "resourceType": "MedicationDispense",
                "meta": { "profile": ["http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-Abgabeinformationen|1.2"] },
                "whenHandedOver": "2023-02-17"
            }
        }),
        json!({
            "resource": {
                "resourceType": "Invoice",
                "meta": { "profile": ["http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-Abrechnungszeilen|1.2"] },
                "lineItem": [first_line],
                "totalGross": {
                    "extension": [{
                        "url": "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-EX-ERP-Gesamtzuzahlung",
                        "valueMoney": { "value": 5.0, "currency": "EUR" }
                    }],
                    "value": 51.48,
                    "currency": "EUR"
                }
            }
        }),
    ];
    entries.extend(extra_entries.into_iter().map(|resource| json!({ "resource": resource })));

    json!({
        "resourceType": "Bundle",
        "meta": { "profile": ["http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-AbgabedatenBundle|1.2"] },
        "entry": entries
    })
}

fn unit(counter: i64, lines: Vec<Value>) -> Value {
    json!({
        "resourceType": "Invoice",
        "meta": { "profile": ["http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-ZusatzdatenEinheit|1.2"] },
        "extension": [{
            "url": "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-EX-ERP-Zaehler",
            "valuePositiveInt": counter
        }],
        "lineItem": lines
    })
}

fn production(counter: i64, when_prepared: &str) -> Value {
    json!({
        "resourceType": "MedicationDispense",
        "meta": { "profile": ["http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-PKV-PR-ERP-ZusatzdatenHerstellung|1.2"] },
        "extension": [{
            "url": "http://fhir.abda.de/eRezeptAbgabedaten/StructureDefinition/DAV-EX-ERP-Zaehler",
            "valuePositiveInt": counter
        }],
        "whenPrepared": when_prepared
    })
}

#[test]
fn plain_dispense_without_additional_data() {
    let input = bundle_with(
        line_item("http://fhir.de/CodeSystem/ifa/pzn", "00814665", "Januvia® 50 mg", 51.48),
        vec![],
    );
    let data = extract_invoice_bundle(&input).unwrap();

    assert_eq!(data.pharmacy.name.as_deref(), Some("Adler-Apotheke"));
    assert_eq!(data.pharmacy.iknr.as_deref(), Some("308412345"));
    assert_eq!(
        data.when_handed_over.unwrap().to_rfc3339(),
        "2023-02-17T00:00:00+00:00"
    );

    let invoice = &data.invoice;
    assert_eq!(invoice.total_brutto_amount, dec!(51.48));
    assert_eq!(invoice.total_additional_fee, dec!(5.0));
    assert_eq!(invoice.currency, "EUR");
    assert_eq!(invoice.chargeable_items.len(), 1);
    assert_eq!(invoice.chargeable_items[0].code, ItemCode::Pzn("00814665".to_string()));
    assert!(invoice.additional_dispense_items.is_empty());
    assert!(invoice.additional_information.is_empty());
}

#[test]
fn separate_delivery_collects_additional_items() {
    let input = bundle_with(
        line_item("http://TA1.abda.de", "02567053", "Auseinzelung", 12.04),
        vec![unit(
            1,
            vec![line_item("http://fhir.de/CodeSystem/ifa/pzn", "17717446", "Teilpackung", 6.02)],
        )],
    );
    let invoice = extract_invoice_bundle(&input).unwrap().invoice;

    assert_eq!(invoice.additional_dispense_items.len(), 1);
    assert_eq!(
        invoice.additional_dispense_items[0].code,
        ItemCode::Pzn("17717446".to_string())
    );
    assert!(invoice.additional_information.is_empty());
}

#[test]
fn cytostatic_builds_production_narratives() {
    let input = bundle_with(
        line_item("http://TA1.abda.de", "09999092", "Zytostatikum", 245.54),
        vec![
            // Deliberately out of order: step 2 first.
            production(2, "2023-02-17T10:15:00+01:00"),
            production(1, "2023-02-16T08:30:00+01:00"),
            unit(
                1,
                vec![
                    line_item("http://fhir.de/CodeSystem/ifa/pzn", "01131365", "NaCl 0,9%", 3.63),
                    line_item("http://fhir.de/CodeSystem/ifa/pzn", "09477471", "5-FU 1000mg", 42.77),
                ],
            ),
            unit(
                2,
                vec![line_item("http://fhir.de/CodeSystem/ifa/pzn", "09477471", "5-FU 500mg", 24.12)],
            ),
        ],
    );
    let invoice = extract_invoice_bundle(&input).unwrap().invoice;

    assert!(invoice.additional_dispense_items.is_empty());
    assert_eq!(
        invoice.additional_information,
        vec![
            "Herstellung 1 - 2023-02-16T08:30:00+01:00: NaCl 0,9%, 5-FU 1000mg".to_string(),
            "Herstellung 2 - 2023-02-17T10:15:00+01:00: 5-FU 500mg".to_string(),
        ]
    );
}

#[test]
fn compounding_joins_unit_components() {
    let input = bundle_with(
        line_item("http://TA1.abda.de", "09999011", "Rezeptur", 31.70),
        vec![unit(
            1,
            vec![
                line_item("http://fhir.de/CodeSystem/ifa/pzn", "03110083", "Hydrocortison", 2.76),
                line_item("http://fhir.de/CodeSystem/ifa/pzn", "06460518", "Basiscreme", 5.84),
            ],
        )],
    );
    let invoice = extract_invoice_bundle(&input).unwrap().invoice;

    assert!(invoice.additional_dispense_items.is_empty());
    assert_eq!(
        invoice.additional_information,
        vec!["Hydrocortison, Basiscreme".to_string()]
    );
}
