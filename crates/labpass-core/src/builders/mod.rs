//! Value-object and entity builders. All pure.

pub mod datatypes;
pub mod entities;

pub use datatypes::{
    Passport, build_coded_concept, build_passport_identifier, build_subject_info_extension,
    extract_passport_identifiers, passport_type,
};
pub use entities::{build_organization, build_patient, build_practitioner};
