pub mod builders;
pub mod codes;
pub mod composer;
pub mod error;
pub mod fhir_reference;
pub mod id;
pub mod model;
pub mod store;
pub mod time;

pub use composer::{
    LabResultInput, ObservationLinkage, PatientLinkage, Recipe, ReportInput,
    compose_diagnostic_report, compose_lab_result,
};
pub use error::{CoreError, ErrorCategory, Result};
pub use id::{generate_id, validate_id};
pub use model::{FhirResource, Resource};
pub use store::{MemoryStore, ResourceStore, Uploaded, upload};
pub use time::{FhirDate, FhirDateTime, now_utc};
