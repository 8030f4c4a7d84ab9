//! DSTU2 complex datatypes used by the composed resources.

use serde::{Deserialize, Serialize};

use crate::fhir_reference::ReferenceTarget;
use crate::time::FhirDate;

/// Coding - a code defined by a terminology system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    pub system: String,

    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// CodeableConcept - a classification carrying one coding in this system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default)]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Whether any coding matches `system` and `code`
    pub fn has_coding(&self, system: &str, code: &str) -> bool {
        self.coding
            .iter()
            .any(|c| c.system == system && c.code == code)
    }
}

/// HumanName (DSTU2: `family` is a list)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

impl HumanName {
    /// Blank parts are left out.
    pub fn new(given: impl Into<String>, family: impl Into<String>) -> Self {
        let part = |s: String| Some(s).filter(|s| !s.trim().is_empty());
        Self {
            family: part(family.into()).into_iter().collect(),
            given: part(given.into()).into_iter().collect(),
        }
    }

    /// Given names followed by family names, space separated
    pub fn display(&self) -> String {
        self.given
            .iter()
            .chain(self.family.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<FhirDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<FhirDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigner: Option<Reference>,
}

/// Reference - `#id` into `contained` or `Type/id` on the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    pub fn to(target: &ReferenceTarget) -> Self {
        Self {
            reference: Some(target.to_string()),
            ..Default::default()
        }
    }

    pub fn display_only(display: impl Into<String>) -> Self {
        Self {
            display: Some(display.into()),
            ..Default::default()
        }
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extension.push(extension);
        self
    }

    /// Extension attached to this reference with the given url
    pub fn extension(&self, url: &str) -> Option<&Extension> {
        self.extension.iter().find(|e| e.url == url)
    }
}

/// Quantity - numeric result with a UCUM unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// The typed `value[x]` carried by an extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtensionValue {
    #[serde(rename = "valueString")]
    String(String),
    #[serde(rename = "valueDate")]
    Date(FhirDate),
    #[serde(rename = "valueHumanName")]
    HumanName(HumanName),
    #[serde(rename = "valueIdentifier")]
    Identifier(Identifier),
}

/// Extension - either a typed value or a list of nested extensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub url: String,

    #[serde(flatten)]
    pub value: Option<ExtensionValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
}

impl Extension {
    pub fn with_value(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            value: Some(value),
            extension: Vec::new(),
        }
    }

    pub fn nested(url: impl Into<String>, extension: Vec<Extension>) -> Self {
        Self {
            url: url.into(),
            value: None,
            extension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn human_name_display_joins_given_then_family() {
        let name = HumanName::new("Ada", "Lovelace");
        assert_eq!(name.display(), "Ada Lovelace");
        assert_eq!(
            serde_json::to_value(&name).unwrap(),
            json!({"family": ["Lovelace"], "given": ["Ada"]})
        );
    }

    #[test]
    fn human_name_omits_blank_parts() {
        let name = HumanName::new("", "Lovelace");
        assert!(name.given.is_empty());
        assert_eq!(
            serde_json::to_value(&name).unwrap(),
            json!({"family": ["Lovelace"]})
        );
        assert_eq!(HumanName::new("Ada", " ").display(), "Ada");
    }

    #[test]
    fn extension_value_is_flattened_into_value_x() {
        let ext = Extension::with_value("country", ExtensionValue::String("US".into()));
        assert_eq!(
            serde_json::to_value(&ext).unwrap(),
            json!({"url": "country", "valueString": "US"})
        );

        let date = Extension::with_value(
            "expiration",
            ExtensionValue::Date(FhirDate::from_str("2030-01-01").unwrap()),
        );
        assert_eq!(
            serde_json::to_value(&date).unwrap(),
            json!({"url": "expiration", "valueDate": "2030-01-01"})
        );
    }

    #[test]
    fn nested_extension_has_no_value() {
        let ext = Extension::nested(
            "outer",
            vec![Extension::with_value("inner", ExtensionValue::String("x".into()))],
        );
        let value = serde_json::to_value(&ext).unwrap();
        assert_eq!(
            value,
            json!({"url": "outer", "extension": [{"url": "inner", "valueString": "x"}]})
        );

        let back: Extension = serde_json::from_value(value).unwrap();
        assert_eq!(back, ext);
    }

    #[test]
    fn extension_deserializes_human_name_value() {
        let ext: Extension = serde_json::from_value(json!({
            "url": "name",
            "valueHumanName": {"family": ["Lee"], "given": ["Sam"]}
        }))
        .unwrap();
        assert_eq!(
            ext.value,
            Some(ExtensionValue::HumanName(HumanName::new("Sam", "Lee")))
        );
    }

    #[test]
    fn reference_to_target() {
        let r = Reference::to(&ReferenceTarget::contained("1"));
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({"reference": "#1"}));
    }
}
