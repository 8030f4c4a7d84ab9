//! Lab result and diagnostic report composition.
//!
//! Two linkage choices decide the document shape:
//!
//! - [`PatientLinkage`]: whether an Observation embeds its patient in
//!   `contained` or points at `Patient/<id>` and carries the subject-info
//!   extension on that reference.
//! - [`ObservationLinkage`]: whether a DiagnosticReport embeds copies of its
//!   Observations or points at `Observation/<id>`.
//!
//! A [`Recipe`] pairs the two. Performers (facility, administrator) are
//! always contained and the report's own subject is always referenced.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builders::{build_coded_concept, build_subject_info_extension};
use crate::codes::{
    DIAGNOSTIC_REPORT_CATEGORY_CODE, DIAGNOSTIC_REPORT_CATEGORY_SYSTEM, INTERPRETATION_SYSTEM,
    LAB_RESULT_CATEGORY_CODE, LAB_RESULT_CATEGORY_SYSTEM, LOINC_SYSTEM, STATUS_FINAL,
    TEST_IDENTIFIER_EXTENSION_URL, TEST_MANUFACTURER_MODEL_CODE, TEST_MANUFACTURER_MODEL_SYSTEM,
};
use crate::error::{CoreError, Result};
use crate::fhir_reference::ReferenceTarget;
use crate::model::{
    DiagnosticReport, Extension, ExtensionValue, FhirResource, Observation, ObservationValue,
    Organization, Patient, Practitioner, Reference, Resource,
};
use crate::time::FhirDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatientLinkage {
    Contained,
    Referenced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObservationLinkage {
    Contained,
    Referenced,
}

impl fmt::Display for PatientLinkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contained => write!(f, "contained"),
            Self::Referenced => write!(f, "referenced"),
        }
    }
}

impl fmt::Display for ObservationLinkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contained => write!(f, "contained"),
            Self::Referenced => write!(f, "referenced"),
        }
    }
}

/// A supported pairing of patient and observation linkage.
///
/// Contained observations whose patient is also contained would nest the
/// patient two levels deep; that pairing is rejected by [`Recipe::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Recipe {
    patient: PatientLinkage,
    observations: ObservationLinkage,
}

impl Recipe {
    pub const CONTAINED_LABS: Recipe = Recipe {
        patient: PatientLinkage::Referenced,
        observations: ObservationLinkage::Contained,
    };

    pub const REFERENCED_LABS_CONTAINED_PATIENT: Recipe = Recipe {
        patient: PatientLinkage::Contained,
        observations: ObservationLinkage::Referenced,
    };

    pub const REFERENCED_LABS_REFERENCED_PATIENT: Recipe = Recipe {
        patient: PatientLinkage::Referenced,
        observations: ObservationLinkage::Referenced,
    };

    pub const ALL: [Recipe; 3] = [
        Self::CONTAINED_LABS,
        Self::REFERENCED_LABS_CONTAINED_PATIENT,
        Self::REFERENCED_LABS_REFERENCED_PATIENT,
    ];

    pub fn new(patient: PatientLinkage, observations: ObservationLinkage) -> Result<Self> {
        if patient == PatientLinkage::Contained && observations == ObservationLinkage::Contained {
            return Err(CoreError::UnsupportedRecipe {
                patient: patient.to_string(),
                observations: observations.to_string(),
            });
        }
        Ok(Self {
            patient,
            observations,
        })
    }

    pub fn patient(&self) -> PatientLinkage {
        self.patient
    }

    pub fn observations(&self) -> ObservationLinkage {
        self.observations
    }

    /// Whether lab results are uploaded on their own before the report
    pub fn uploads_observations(&self) -> bool {
        self.observations == ObservationLinkage::Referenced
    }

    /// Directory the run's snapshots are written under
    pub fn output_dir_name(&self) -> &'static str {
        match (self.patient, self.observations) {
            (_, ObservationLinkage::Contained) => "dr_with_contained_labs",
            (PatientLinkage::Contained, ObservationLinkage::Referenced) => {
                "dr_with_referenced_labs_with_contained_patient"
            }
            (PatientLinkage::Referenced, ObservationLinkage::Referenced) => {
                "dr_with_referenced_labs_with_referenced_patient"
            }
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} observations + {} patient",
            self.observations, self.patient
        )
    }
}

/// What to measure and report for one lab result
#[derive(Debug, Clone, PartialEq)]
pub struct LabResultInput {
    /// LOINC code
    pub code: String,
    pub display: Option<String>,
    pub value: ObservationValue,
    pub interpretation: String,
    pub test_identifier: String,
    pub effective: FhirDateTime,
    pub issued: FhirDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportInput {
    /// LOINC code
    pub code: String,
    pub display: Option<String>,
    pub effective: FhirDateTime,
    pub issued: FhirDateTime,
}

fn contained_reference<R: FhirResource>(resource: &R, role: &str) -> Result<(Reference, Resource)> {
    let id = resource.require_id(role)?;
    let reference = Reference::to(&ReferenceTarget::contained(id));
    Ok((reference, resource.clone().into()))
}

/// `Patient/<id>` carrying the subject-info extension
fn referenced_subject(patient: &Patient, role: &str) -> Result<Reference> {
    let id = patient.require_id(role)?;
    Ok(
        Reference::to(&ReferenceTarget::resource(Patient::RESOURCE_TYPE, id))
            .with_extension(build_subject_info_extension(patient)),
    )
}

/// Build one lab result for `patient` under the given linkage.
///
/// The patient must already carry its server-assigned id in both linkages:
/// it is either the external path or the local fragment.
pub fn compose_lab_result(
    patient: &Patient,
    facility: &Organization,
    administrator: &Practitioner,
    input: &LabResultInput,
    linkage: PatientLinkage,
) -> Result<Observation> {
    let mut contained = Vec::with_capacity(3);

    let subject = match linkage {
        PatientLinkage::Contained => {
            let (reference, resource) = contained_reference(patient, "contained lab result subject")?;
            contained.push(resource);
            reference
        }
        PatientLinkage::Referenced => referenced_subject(patient, "lab result subject")?,
    };

    let (facility_ref, facility_res) = contained_reference(facility, "lab result performer")?;
    let (admin_ref, admin_res) = contained_reference(administrator, "lab result performer")?;
    contained.push(facility_res);
    contained.push(admin_res);

    let test_identifier = Extension::with_value(
        TEST_IDENTIFIER_EXTENSION_URL,
        ExtensionValue::String(input.test_identifier.clone()),
    );

    debug!(code = %input.code, %linkage, "composed lab result");

    Ok(Observation {
        id: None,
        contained,
        extension: Vec::new(),
        status: STATUS_FINAL.to_string(),
        category: Some(build_coded_concept(
            LAB_RESULT_CATEGORY_SYSTEM,
            LAB_RESULT_CATEGORY_CODE,
            None,
            None,
        )),
        code: build_coded_concept(LOINC_SYSTEM, &input.code, input.display.as_deref(), None),
        subject: Some(subject),
        effective_date_time: Some(input.effective),
        issued: Some(input.issued),
        performer: vec![facility_ref, admin_ref],
        value: input.value.clone(),
        interpretation: Some(build_coded_concept(
            INTERPRETATION_SYSTEM,
            &input.interpretation,
            None,
            None,
        )),
        method: Some(build_coded_concept(
            TEST_MANUFACTURER_MODEL_SYSTEM,
            TEST_MANUFACTURER_MODEL_CODE,
            None,
            Some(test_identifier),
        )),
    })
}

/// Build the report over `results` under the given linkage.
///
/// With [`ObservationLinkage::Referenced`] every result must already have
/// been uploaded; this is checked before anything is built.
pub fn compose_diagnostic_report(
    patient: &Patient,
    facility: &Organization,
    input: &ReportInput,
    results: &[Observation],
    linkage: ObservationLinkage,
) -> Result<DiagnosticReport> {
    let subject = referenced_subject(patient, "diagnostic report subject")?;
    let (performer, facility_res) = contained_reference(facility, "diagnostic report performer")?;

    let mut contained = Vec::with_capacity(results.len() + 1);
    contained.push(facility_res);

    let result = match linkage {
        ObservationLinkage::Contained => results
            .iter()
            .enumerate()
            .map(|(index, observation)| {
                let mut copy = observation.clone();
                copy.set_id((index + 1).to_string());
                let (reference, resource) = contained_reference(&copy, "contained result")?;
                contained.push(resource);
                Ok(reference)
            })
            .collect::<Result<Vec<_>>>()?,
        ObservationLinkage::Referenced => results
            .iter()
            .map(|observation| {
                let id = observation.require_id("diagnostic report result")?;
                Ok(Reference::to(&ReferenceTarget::resource(
                    Observation::RESOURCE_TYPE,
                    id,
                )))
            })
            .collect::<Result<Vec<_>>>()?,
    };

    debug!(code = %input.code, results = result.len(), %linkage, "composed diagnostic report");

    Ok(DiagnosticReport {
        id: None,
        contained,
        status: STATUS_FINAL.to_string(),
        category: Some(build_coded_concept(
            DIAGNOSTIC_REPORT_CATEGORY_SYSTEM,
            DIAGNOSTIC_REPORT_CATEGORY_CODE,
            None,
            None,
        )),
        code: build_coded_concept(LOINC_SYSTEM, &input.code, input.display.as_deref(), None),
        subject,
        effective_date_time: Some(input.effective),
        issued: Some(input.issued),
        performer: Some(performer),
        result,
    })
}
