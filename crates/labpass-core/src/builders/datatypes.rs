use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codes::{
    IDENTIFIER_TYPE_SYSTEM, IDENTIFIER_USE_OFFICIAL, PASSPORT_TYPE_CODE, PASSPORT_TYPE_DISPLAY,
    SUBJECT_INFO_EXTENSION_URL, SUBJECT_INFO_IDENTIFIER_EXTENSION_URL,
    SUBJECT_INFO_NAME_EXTENSION_URL,
};
use crate::model::{
    CodeableConcept, Coding, Extension, ExtensionValue, Identifier, Patient, Period, Reference,
};
use crate::time::FhirDate;

/// Passport details as supplied by configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passport {
    pub country: String,
    pub number: String,
    pub expiration: FhirDate,
}

impl Passport {
    /// Read the passport fields back out of an identifier built by
    /// [`build_passport_identifier`].
    pub fn from_identifier(identifier: &Identifier) -> Option<Self> {
        Some(Self {
            country: identifier.assigner.as_ref()?.display.clone()?,
            number: identifier.value.clone()?,
            expiration: identifier.period.as_ref()?.end?,
        })
    }
}

pub fn build_coded_concept(
    system: &str,
    code: &str,
    display: Option<&str>,
    extension: Option<Extension>,
) -> CodeableConcept {
    CodeableConcept {
        coding: vec![Coding {
            extension: extension.into_iter().collect(),
            system: system.to_string(),
            code: code.to_string(),
            display: display.map(str::to_string),
        }],
        text: None,
    }
}

pub fn passport_type() -> CodeableConcept {
    build_coded_concept(
        IDENTIFIER_TYPE_SYSTEM,
        PASSPORT_TYPE_CODE,
        Some(PASSPORT_TYPE_DISPLAY),
        None,
    )
}

pub fn build_passport_identifier(country: &str, number: &str, expiration: FhirDate) -> Identifier {
    Identifier {
        use_: Some(IDENTIFIER_USE_OFFICIAL.to_string()),
        type_: Some(passport_type()),
        value: Some(number.to_string()),
        period: Some(Period {
            start: None,
            end: Some(expiration),
        }),
        assigner: Some(Reference::display_only(country)),
    }
}

fn is_passport(identifier: &Identifier) -> bool {
    identifier
        .type_
        .as_ref()
        .is_some_and(|t| t.has_coding(IDENTIFIER_TYPE_SYSTEM, PASSPORT_TYPE_CODE))
}

/// Passport identifiers of `patient`, in their original order
pub fn extract_passport_identifiers(patient: &Patient) -> Vec<Identifier> {
    patient
        .identifier
        .iter()
        .filter(|i| is_passport(i))
        .cloned()
        .collect()
}

/// Patient name and passports, for attaching to a reference whose target
/// does not travel with the document.
pub fn build_subject_info_extension(patient: &Patient) -> Extension {
    let mut parts = Vec::new();

    if let Some(name) = patient.name.first() {
        parts.push(Extension::with_value(
            SUBJECT_INFO_NAME_EXTENSION_URL,
            ExtensionValue::HumanName(name.clone()),
        ));
    }

    let passports = extract_passport_identifiers(patient);
    debug!(passports = passports.len(), "building subject info extension");
    parts.extend(passports.into_iter().map(|identifier| {
        Extension::with_value(
            SUBJECT_INFO_IDENTIFIER_EXTENSION_URL,
            ExtensionValue::Identifier(identifier),
        )
    }));

    Extension::nested(SUBJECT_INFO_EXTENSION_URL, parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HumanName;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;
    use std::str::FromStr;

    fn expiration() -> FhirDate {
        FhirDate::from_str("2030-01-01").unwrap()
    }

    #[test]
    fn coded_concept_wraps_exactly_one_coding() {
        let concept = build_coded_concept("http://loinc.org", "94564-2", None, None);
        assert_eq!(concept.coding.len(), 1);
        assert_json_eq!(
            serde_json::to_value(&concept).unwrap(),
            json!({"coding": [{"system": "http://loinc.org", "code": "94564-2"}]})
        );
    }

    #[test]
    fn coded_concept_carries_coding_extension() {
        let ext = Extension::with_value("x", ExtensionValue::String("y".into()));
        let concept = build_coded_concept("s", "c", Some("d"), Some(ext.clone()));
        assert_eq!(concept.coding[0].extension, vec![ext]);
        assert_eq!(concept.coding[0].display.as_deref(), Some("d"));
    }

    #[test]
    fn passport_identifier_shape() {
        let identifier = build_passport_identifier("US", "X123", expiration());
        assert_json_eq!(
            serde_json::to_value(&identifier).unwrap(),
            json!({
                "use": "official",
                "type": {"coding": [{
                    "system": "http://hl7.org/fhir/v2/0203",
                    "code": "PPN",
                    "display": "Passport number"
                }]},
                "value": "X123",
                "period": {"end": "2030-01-01"},
                "assigner": {"display": "US"}
            })
        );
        assert_eq!(
            Passport::from_identifier(&identifier),
            Some(Passport {
                country: "US".into(),
                number: "X123".into(),
                expiration: expiration(),
            })
        );
    }

    #[test]
    fn extract_skips_non_passport_identifiers() {
        let other = Identifier {
            use_: None,
            type_: Some(build_coded_concept(IDENTIFIER_TYPE_SYSTEM, "DL", None, None)),
            value: Some("D-1".into()),
            period: None,
            assigner: None,
        };
        let patient = Patient {
            identifier: vec![
                build_passport_identifier("US", "A", expiration()),
                other,
                build_passport_identifier("FR", "B", expiration()),
            ],
            name: vec![HumanName::new("Ada", "Lovelace")],
            ..Default::default()
        };

        let numbers: Vec<_> = extract_passport_identifiers(&patient)
            .into_iter()
            .filter_map(|i| i.value)
            .collect();
        assert_eq!(numbers, ["A", "B"]);
    }

    #[test]
    fn extract_from_patient_without_identifiers_is_empty() {
        assert!(extract_passport_identifiers(&Patient::default()).is_empty());
    }

    #[test]
    fn subject_info_has_name_then_one_entry_per_passport() {
        let patient = Patient {
            identifier: vec![
                build_passport_identifier("US", "A", expiration()),
                build_passport_identifier("FR", "B", expiration()),
            ],
            name: vec![HumanName::new("Ada", "Lovelace")],
            ..Default::default()
        };
        let ext = build_subject_info_extension(&patient);

        assert_eq!(ext.url, SUBJECT_INFO_EXTENSION_URL);
        assert!(ext.value.is_none());
        assert_eq!(ext.extension.len(), 3);
        assert_eq!(ext.extension[0].url, SUBJECT_INFO_NAME_EXTENSION_URL);
        assert_eq!(
            ext.extension[0].value,
            Some(ExtensionValue::HumanName(HumanName::new("Ada", "Lovelace")))
        );
        assert!(
            ext.extension[1..]
                .iter()
                .all(|e| e.url == SUBJECT_INFO_IDENTIFIER_EXTENSION_URL)
        );
    }
}
