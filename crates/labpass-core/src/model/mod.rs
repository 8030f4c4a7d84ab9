//! Typed FHIR DSTU2 model for the resources LabPass composes.
//!
//! Every resource is serialised through [`Resource`], which adds the
//! `resourceType` discriminator both at the top level and inside
//! `contained` lists.

pub mod datatypes;
pub mod resources;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub use datatypes::{
    CodeableConcept, Coding, Extension, ExtensionValue, HumanName, Identifier, Period, Quantity,
    Reference,
};
pub use resources::{
    DiagnosticReport, Observation, ObservationValue, Organization, Patient, Practitioner,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Patient(Patient),
    Organization(Organization),
    Practitioner(Practitioner),
    Observation(Observation),
    DiagnosticReport(DiagnosticReport),
}

impl Resource {
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Patient(_) => Patient::RESOURCE_TYPE,
            Self::Organization(_) => Organization::RESOURCE_TYPE,
            Self::Practitioner(_) => Practitioner::RESOURCE_TYPE,
            Self::Observation(_) => Observation::RESOURCE_TYPE,
            Self::DiagnosticReport(_) => DiagnosticReport::RESOURCE_TYPE,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Patient(r) => r.id(),
            Self::Organization(r) => r.id(),
            Self::Practitioner(r) => r.id(),
            Self::Observation(r) => r.id(),
            Self::DiagnosticReport(r) => r.id(),
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// A resource type that can be uploaded, contained and referenced.
pub trait FhirResource: Clone + Into<Resource> + TryFrom<Resource, Error = CoreError> {
    const RESOURCE_TYPE: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// The server-assigned id, or `MissingIdentity` naming what it was needed for.
    fn require_id(&self, role: &str) -> Result<&str> {
        self.id()
            .ok_or_else(|| CoreError::missing_identity(Self::RESOURCE_TYPE, role))
    }
}

macro_rules! impl_fhir_resource {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl FhirResource for $ty {
                const RESOURCE_TYPE: &'static str = stringify!($ty);

                fn id(&self) -> Option<&str> {
                    self.id.as_deref()
                }

                fn set_id(&mut self, id: String) {
                    self.id = Some(id);
                }
            }

            impl From<$ty> for Resource {
                fn from(resource: $ty) -> Self {
                    Resource::$ty(resource)
                }
            }

            impl TryFrom<Resource> for $ty {
                type Error = CoreError;

                fn try_from(resource: Resource) -> Result<Self> {
                    match resource {
                        Resource::$ty(inner) => Ok(inner),
                        other => Err(CoreError::invalid_resource(format!(
                            "expected {}, got {}",
                            stringify!($ty),
                            other.resource_type()
                        ))),
                    }
                }
            }
        )+
    };
}

impl_fhir_resource!(Patient, Organization, Practitioner, Observation, DiagnosticReport);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_type_is_written_as_discriminator() {
        let org = Organization {
            id: Some("org1".into()),
            name: Some("LabCo".into()),
        };
        let value = Resource::from(org.clone()).to_value().unwrap();
        assert_eq!(
            value,
            json!({"resourceType": "Organization", "id": "org1", "name": "LabCo"})
        );

        let back = Organization::try_from(Resource::from_value(value).unwrap()).unwrap();
        assert_eq!(back, org);
    }

    #[test]
    fn try_from_wrong_variant_is_invalid_resource() {
        let resource = Resource::from(Practitioner::default());
        let err = Organization::try_from(resource).unwrap_err();
        assert!(matches!(err, CoreError::InvalidResource { .. }));
        assert!(err.to_string().contains("expected Organization, got Practitioner"));
    }

    #[test]
    fn require_id_reports_missing_identity() {
        let patient = Patient::default();
        let err = patient.require_id("observation subject").unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingIdentity { ref resource_type, .. } if resource_type == "Patient"
        ));

        let mut patient = patient;
        patient.set_id("p1".into());
        assert_eq!(patient.require_id("observation subject").unwrap(), "p1");
    }

    #[test]
    fn server_response_with_unknown_fields_parses() {
        let value = json!({
            "resourceType": "Patient",
            "id": "565010",
            "meta": {"versionId": "1", "lastUpdated": "2021-01-05T10:00:00Z"},
            "text": {"status": "generated", "div": "<div/>"},
            "name": [{"family": ["Lovelace"], "given": ["Ada"]}]
        });
        let patient = Patient::try_from(Resource::from_value(value).unwrap()).unwrap();
        assert_eq!(patient.id.as_deref(), Some("565010"));
        assert_eq!(patient.name[0].display(), "Ada Lovelace");
    }
}
