//! Medication extraction for all supported profiles
//!
//! Dispatch is by profile + version: the four KBV variants (PZN, compounding,
//! ingredient, free text) in 1.0.2 and 1.1.0, plus contained ePA medications
//! (epa-medication 1.4). An unrecognized medication profile degrades to
//! [`Medication::Unknown`] instead of failing the surrounding bundle.

use erx_fhir_json::{filter_with, string_value, Contained};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::primitives::{coding_code, extension_with_url, scalar_to_string};
use crate::profiles::{classify, KbvMedicationVersion, ProfileKind};
use crate::systems::{
    CS_DOSE_FORM, CS_MEDICATION_CATEGORY, EPA_EXT_DRUG_CATEGORY,
    EPA_EXT_MANUFACTURING_INSTRUCTIONS, EPA_EXT_PACKAGING, EPA_EXT_VACCINE,
    EXT_COMPOUNDING_INSTRUCTION, EXT_INGREDIENT_AMOUNT, EXT_INGREDIENT_FORM,
    EXT_MEDICATION_CATEGORY, EXT_MEDICATION_PACKAGING, EXT_NORM_SIZE, EXT_PACKAGING_SIZE,
    EXT_VACCINE, SYSTEM_ASK, SYSTEM_ATC, SYSTEM_PZN, SYSTEM_SNOMED,
};
use erx_models::{
    CompoundingMedication, EpaMedication, FreeTextMedication, Ingredient, IngredientMedication,
    Medication, MedicationCategory, MedicationIdentifier, PznMedication, Ratio,
};

/// Maps the two-character category code onto the closed category set.
///
/// "03" (Sonstiges) only exists from profile generation 1.1.0 on; in 1.0.2
/// documents it falls through to `Unknown` like any other unlisted code.
fn category_from_code(code: Option<&str>, sonstiges_supported: bool) -> MedicationCategory {
    match code {
        Some("00") => MedicationCategory::ArzneiUndVerbandmittel,
        Some("01") => MedicationCategory::Btm,
        Some("02") => MedicationCategory::Amvv,
        Some("03") if sonstiges_supported => MedicationCategory::Sonstiges,
        _ => MedicationCategory::Unknown,
    }
}

/// Category lookup path differs per version: 1.0.2 filters the extension list
/// by the `valueCoding.system`, 1.1.0 by the extension `url`.
fn kbv_category(resource: &Value, version: KbvMedicationVersion) -> MedicationCategory {
    let code = match version {
        KbvMedicationVersion::V1_0_2 => filter_with(
            resource.find_all("extension"),
            "valueCoding.system",
            string_value(CS_MEDICATION_CATEGORY),
        )
        .next()
        .and_then(|ext| ext.contained_str_or_null("valueCoding.code")),
        KbvMedicationVersion::V1_1_0 => extension_with_url(resource, EXT_MEDICATION_CATEGORY)
            .and_then(|ext| ext.contained_str_or_null("valueCoding.code")),
    };
    category_from_code(code, version == KbvMedicationVersion::V1_1_0)
}

fn kbv_vaccine(resource: &Value) -> bool {
    extension_with_url(resource, EXT_VACCINE)
        .and_then(|ext| ext.contained_bool_or_null("valueBoolean"))
        .unwrap_or(false)
}

/// Packaging amount.
///
/// 1.0.2 carries plain numerator/denominator nodes; 1.1.0 moved the free-form
/// size onto a numerator extension (the numeric value is no longer present).
fn kbv_amount(resource: &Value, version: KbvMedicationVersion) -> Option<Ratio> {
    match version {
        KbvMedicationVersion::V1_0_2 => {
            let value = resource
                .contained_or_null("amount.numerator.value")
                .and_then(scalar_to_string)?;
            let unit = resource.contained_str_or_null("amount.numerator.unit");
            let denominator = resource
                .contained_or_null("amount.denominator.value")
                .and_then(scalar_to_string)
                .unwrap_or_else(|| "1".to_string());
            Some(Ratio::of(&value, unit, &denominator))
        }
        KbvMedicationVersion::V1_1_0 => {
            let numerator = resource.contained_or_null("amount.numerator")?;
            let value = extension_with_url(numerator, EXT_PACKAGING_SIZE)?
                .contained_str_or_null("valueString")?;
            let unit = numerator.contained_str_or_null("unit");
            Some(Ratio::of(value, unit, "1"))
        }
    }
}

fn strength_ratio(node: &Value) -> Option<Ratio> {
    let numerator = node
        .contained_or_null("strength.numerator.value")
        .and_then(scalar_to_string)?;
    let unit = node.contained_str_or_null("strength.numerator.unit");
    let denominator = node
        .contained_or_null("strength.denominator.value")
        .and_then(scalar_to_string)
        .unwrap_or_else(|| "1".to_string());
    Some(Ratio::of(&numerator, unit, &denominator))
}

fn kbv_ingredient(node: &Value) -> Result<Ingredient> {
    let text = node
        .contained_str("itemCodeableConcept.text")
        .map_err(|_| Error::missing("ingredient.itemCodeableConcept.text"))?;

    let amount = node
        .contained_or_null("strength")
        .and_then(|strength| extension_with_url(strength, EXT_INGREDIENT_AMOUNT))
        .and_then(|ext| ext.contained_str_or_null("valueString"));

    Ok(Ingredient {
        text: text.to_string(),
        form: extension_with_url(node, EXT_INGREDIENT_FORM)
            .and_then(|ext| ext.contained_str_or_null("valueString"))
            .map(str::to_string),
        number: coding_code(node, "itemCodeableConcept.coding", SYSTEM_ASK).map(str::to_string),
        amount: amount.map(str::to_string),
        strength: strength_ratio(node),
    })
}

fn kbv_ingredients(resource: &Value) -> Result<Vec<Ingredient>> {
    resource.find_all("ingredient").map(kbv_ingredient).collect()
}

fn norm_size(resource: &Value) -> Option<String> {
    extension_with_url(resource, EXT_NORM_SIZE)
        .and_then(|ext| ext.contained_str_or_null("valueCode"))
        .map(str::to_string)
}

fn pzn(resource: &Value, version: KbvMedicationVersion) -> Result<PznMedication> {
    let pzn = coding_code(resource, "code.coding", SYSTEM_PZN)
        .ok_or_else(|| Error::missing("code.coding.code"))?;

    Ok(PznMedication {
        category: kbv_category(resource, version),
        vaccine: kbv_vaccine(resource),
        text: resource.contained_str_or_null("code.text").map(str::to_string),
        form: coding_code(resource, "form.coding", CS_DOSE_FORM).map(str::to_string),
        norm_size_code: norm_size(resource),
        amount: kbv_amount(resource, version),
        pzn: pzn.to_string(),
        lot_number: resource
            .contained_str_or_null("batch.lotNumber")
            .map(str::to_string),
        expiration_date: resource
            .contained_str_or_null("batch.expirationDate")
            .map(str::to_string),
    })
}

fn compounding(resource: &Value, version: KbvMedicationVersion) -> Result<CompoundingMedication> {
    Ok(CompoundingMedication {
        category: kbv_category(resource, version),
        vaccine: kbv_vaccine(resource),
        text: resource.contained_str_or_null("code.text").map(str::to_string),
        form: resource.contained_str_or_null("form.text").map(str::to_string),
        amount: kbv_amount(resource, version),
        packaging: extension_with_url(resource, EXT_MEDICATION_PACKAGING)
            .and_then(|ext| ext.contained_str_or_null("valueString"))
            .map(str::to_string),
        manufacturing_instructions: extension_with_url(resource, EXT_COMPOUNDING_INSTRUCTION)
            .and_then(|ext| ext.contained_str_or_null("valueString"))
            .map(str::to_string),
        ingredients: kbv_ingredients(resource)?,
    })
}

fn ingredient(resource: &Value, version: KbvMedicationVersion) -> Result<IngredientMedication> {
    Ok(IngredientMedication {
        category: kbv_category(resource, version),
        vaccine: kbv_vaccine(resource),
        form: resource.contained_str_or_null("form.text").map(str::to_string),
        norm_size_code: norm_size(resource),
        amount: kbv_amount(resource, version),
        ingredients: kbv_ingredients(resource)?,
    })
}

fn free_text(resource: &Value, version: KbvMedicationVersion) -> Result<FreeTextMedication> {
    Ok(FreeTextMedication {
        category: kbv_category(resource, version),
        vaccine: kbv_vaccine(resource),
        text: resource.contained_str("code.text")?.to_string(),
    })
}

fn epa_ingredient(node: &Value) -> Result<Ingredient> {
    let text = node
        .contained_str("itemCodeableConcept.text")
        .map_err(|_| Error::missing("ingredient.itemCodeableConcept.text"))?;
    Ok(Ingredient {
        text: text.to_string(),
        form: None,
        number: coding_code(node, "itemCodeableConcept.coding", SYSTEM_ASK).map(str::to_string),
        amount: None,
        strength: strength_ratio(node),
    })
}

fn epa(resource: &Value) -> Result<EpaMedication> {
    let category = extension_with_url(resource, EPA_EXT_DRUG_CATEGORY)
        .and_then(|ext| ext.contained_str_or_null("valueCoding.code"));

    let amount = resource
        .contained_or_null("amount.numerator.value")
        .and_then(scalar_to_string)
        .map(|value| {
            let unit = resource.contained_str_or_null("amount.numerator.unit");
            let denominator = resource
                .contained_or_null("amount.denominator.value")
                .and_then(scalar_to_string)
                .unwrap_or_else(|| "1".to_string());
            Ratio::of(&value, unit, &denominator)
        });

    Ok(EpaMedication {
        category: category_from_code(category, true),
        vaccine: extension_with_url(resource, EPA_EXT_VACCINE)
            .and_then(|ext| ext.contained_bool_or_null("valueBoolean"))
            .unwrap_or(false),
        text: resource.contained_str_or_null("code.text").map(str::to_string),
        form: resource
            .find_all("form.coding.code")
            .find_map(Value::as_str)
            .map(str::to_string),
        amount,
        identifier: MedicationIdentifier {
            pzn: coding_code(resource, "code.coding", SYSTEM_PZN).map(str::to_string),
            atc: coding_code(resource, "code.coding", SYSTEM_ATC).map(str::to_string),
            ask: coding_code(resource, "code.coding", SYSTEM_ASK).map(str::to_string),
            snomed: coding_code(resource, "code.coding", SYSTEM_SNOMED).map(str::to_string),
        },
        manufacturing_instructions: extension_with_url(resource, EPA_EXT_MANUFACTURING_INSTRUCTIONS)
            .and_then(|ext| ext.contained_str_or_null("valueString"))
            .map(str::to_string),
        packaging: extension_with_url(resource, EPA_EXT_PACKAGING)
            .and_then(|ext| ext.contained_str_or_null("valueString"))
            .map(str::to_string),
        ingredients: resource.find_all("ingredient").map(epa_ingredient).collect::<Result<_>>()?,
        lot_number: resource
            .contained_str_or_null("batch.lotNumber")
            .map(str::to_string),
    })
}

/// Extracts any supported medication resource, dispatching on its profile.
pub fn extract_medication(resource: &Value) -> Result<Medication> {
    match classify(resource) {
        Some(ProfileKind::KbvMedicationPzn(v)) => pzn(resource, v).map(Medication::Pzn),
        Some(ProfileKind::KbvMedicationCompounding(v)) => {
            compounding(resource, v).map(Medication::Compounding)
        }
        Some(ProfileKind::KbvMedicationIngredient(v)) => {
            ingredient(resource, v).map(Medication::Ingredient)
        }
        Some(ProfileKind::KbvMedicationFreeText(v)) => {
            free_text(resource, v).map(Medication::FreeText)
        }
        Some(ProfileKind::EpaMedication) => epa(resource).map(Medication::Epa),
        _ => Ok(Medication::Unknown),
    }
}
