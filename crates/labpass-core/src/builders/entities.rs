use tracing::debug;

use super::datatypes::{Passport, build_passport_identifier};
use crate::error::{CoreError, Result};
use crate::id::validate_id;
use crate::model::{HumanName, Organization, Patient, Practitioner};

/// Patient with one name and one passport identifier per entry.
///
/// The id stays empty until the store assigns one.
pub fn build_patient(given: &str, family: &str, passports: &[Passport]) -> Result<Patient> {
    if given.trim().is_empty() && family.trim().is_empty() {
        return Err(CoreError::invalid_resource("patient needs a given or family name"));
    }

    debug!(passports = passports.len(), "building patient");
    Ok(Patient {
        id: None,
        extension: Vec::new(),
        identifier: passports
            .iter()
            .map(|p| build_passport_identifier(&p.country, &p.number, p.expiration))
            .collect(),
        name: vec![HumanName::new(given, family)],
    })
}

pub fn build_organization(id: &str, name: &str) -> Result<Organization> {
    validate_id(id)?;
    Ok(Organization {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
    })
}

pub fn build_practitioner(id: &str, given: &str, family: &str) -> Result<Practitioner> {
    validate_id(id)?;
    Ok(Practitioner {
        id: Some(id.to_string()),
        name: Some(HumanName::new(given, family)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::extract_passport_identifiers;
    use crate::codes::{IDENTIFIER_TYPE_SYSTEM, PASSPORT_TYPE_CODE};
    use crate::time::FhirDate;
    use std::str::FromStr;

    fn passport(country: &str, number: &str, expiration: &str) -> Passport {
        Passport {
            country: country.into(),
            number: number.into(),
            expiration: FhirDate::from_str(expiration).unwrap(),
        }
    }

    #[test]
    fn family_only_patient_serializes_without_given() {
        let patient = build_patient("", "Lovelace", &[]).unwrap();
        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["name"], serde_json::json!([{"family": ["Lovelace"]}]));
    }

    #[test]
    fn patient_has_one_name_and_one_identifier_per_passport() {
        let passports = vec![
            passport("US", "X123", "2030-01-01"),
            passport("United States of America", "12345678-90", "2024-12-04"),
        ];
        let patient = build_patient("Ada", "Lovelace", &passports).unwrap();

        assert!(patient.id.is_none());
        assert_eq!(patient.name.len(), 1);
        assert_eq!(patient.name[0].display(), "Ada Lovelace");
        assert_eq!(patient.identifier.len(), passports.len());
        assert!(patient.identifier.iter().all(|i| {
            i.type_
                .as_ref()
                .is_some_and(|t| t.has_coding(IDENTIFIER_TYPE_SYSTEM, PASSPORT_TYPE_CODE))
        }));
    }

    #[test]
    fn passports_round_trip_through_patient() {
        let passports = vec![
            passport("US", "X123", "2030-01-01"),
            passport("FR", "F-9", "2027-06-30"),
            passport("JP", "J1", "2029-02-28"),
        ];
        let patient = build_patient("Ada", "Lovelace", &passports).unwrap();

        let extracted: Vec<Passport> = extract_passport_identifiers(&patient)
            .iter()
            .filter_map(Passport::from_identifier)
            .collect();
        assert_eq!(extracted, passports);
    }

    #[test]
    fn patient_without_passports() {
        let patient = build_patient("Test", "Patient", &[]).unwrap();
        assert!(patient.identifier.is_empty());
        assert_eq!(patient.name.len(), 1);
    }

    #[test]
    fn patient_requires_a_name() {
        assert!(build_patient(" ", "", &[]).is_err());
    }

    #[test]
    fn organization_and_practitioner_require_ids() {
        let org = build_organization("org1", "LabCo").unwrap();
        assert_eq!(org.id.as_deref(), Some("org1"));
        assert_eq!(org.name.as_deref(), Some("LabCo"));

        let tech = build_practitioner("tech1", "Sam", "Lee").unwrap();
        assert_eq!(tech.name.unwrap().display(), "Sam Lee");

        assert!(matches!(
            build_organization("", "LabCo"),
            Err(CoreError::InvalidId(_))
        ));
        assert!(matches!(
            build_practitioner("", "Sam", "Lee"),
            Err(CoreError::InvalidId(_))
        ));
    }
}
