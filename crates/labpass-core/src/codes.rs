//! Fixed code systems, codes and extension URLs used by the composed resources.

pub const SUBJECT_INFO_EXTENSION_URL: &str =
    "http://commonpass.org/fhir/StructureDefinition/subject-info";
pub const SUBJECT_INFO_NAME_EXTENSION_URL: &str =
    "http://commonpass.org/fhir/StructureDefinition/subject-name-info";
pub const SUBJECT_INFO_IDENTIFIER_EXTENSION_URL: &str =
    "http://commonpass.org/fhir/StructureDefinition/subject-identifier-info";

pub const IDENTIFIER_TYPE_SYSTEM: &str = "http://hl7.org/fhir/v2/0203";
pub const PASSPORT_TYPE_CODE: &str = "PPN";
pub const PASSPORT_TYPE_DISPLAY: &str = "Passport number";
pub const IDENTIFIER_USE_OFFICIAL: &str = "official";

pub const STATUS_FINAL: &str = "final";

pub const LAB_RESULT_CATEGORY_SYSTEM: &str = "http://hl7.org/fhir/observation-category";
pub const LAB_RESULT_CATEGORY_CODE: &str = "laboratory";

pub const DIAGNOSTIC_REPORT_CATEGORY_SYSTEM: &str = "http://hl7.org/fhir/DiagnosticReport-category";
pub const DIAGNOSTIC_REPORT_CATEGORY_CODE: &str = "LAB";

pub const LOINC_SYSTEM: &str = "http://loinc.org";
pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";

pub const INTERPRETATION_SYSTEM: &str = "http://hl7.org/fhir/v2/0078";
pub const INTERPRETATION_NORMAL: &str = "N";

pub const TEST_MANUFACTURER_MODEL_SYSTEM: &str =
    "http://commonpass.org/fhir/StructureDefinition/test-manufacturer-model";
pub const TEST_MANUFACTURER_MODEL_CODE: &str = "MANUFACTURER_AND_MODEL";

pub const TEST_IDENTIFIER_EXTENSION_URL: &str =
    "http://commonpass.org/fhir/StructureDefinition/test-identifier";
pub const DEFAULT_TEST_IDENTIFIER: &str = "0123456789";
