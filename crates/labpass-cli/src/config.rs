//! Run configuration: one document describing the people, facility and
//! tests to compose, plus where to publish and where to write snapshots.
//!
//! Loaded from a TOML or JSON file and overlaid with `LABPASS__*`
//! environment variables, e.g. `LABPASS__BASE_URL=http://localhost:8080`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use labpass_core::builders::Passport;
use labpass_core::codes::{DEFAULT_TEST_IDENTIFIER, INTERPRETATION_NORMAL, UCUM_SYSTEM};
use labpass_core::model::{ObservationValue, Quantity};
use labpass_core::{
    CoreError, FhirDateTime, LabResultInput, ReportInput, Result, builders, validate_id,
};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Unprotected base endpoint of the FHIR server
    pub base_url: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    pub patient: PatientConfig,
    pub organization: OrganizationConfig,
    pub practitioner: PractitionerConfig,
    pub diagnostic_report: ReportConfig,
    #[serde(default)]
    pub lab_results: Vec<LabResultConfig>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientConfig {
    pub given: String,
    pub family: String,
    #[serde(default)]
    pub passports: Vec<Passport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationConfig {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PractitionerConfig {
    pub id: String,
    pub given: String,
    pub family: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub code: String,
    pub display: Option<String>,
    pub effective: Option<String>,
    pub issued: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityConfig {
    pub value: f64,
    pub unit: String,
    pub system: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodedConfig {
    pub system: String,
    pub code: String,
    pub display: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabResultConfig {
    pub code: String,
    pub display: Option<String>,
    pub interpretation: Option<String>,
    pub test_identifier: Option<String>,
    pub value_string: Option<String>,
    pub value_quantity: Option<QuantityConfig>,
    pub value_coded: Option<CodedConfig>,
    pub effective: Option<String>,
    pub issued: Option<String>,
}

fn timestamp(raw: Option<&str>, default: FhirDateTime, field: &str) -> Result<FhirDateTime> {
    match raw {
        Some(s) => FhirDateTime::from_str(s)
            .map_err(|e| CoreError::configuration(format!("{field}: {e}"))),
        None => Ok(default),
    }
}

impl LabResultConfig {
    /// The single result value; string wins over quantity, quantity over coded.
    pub fn value(&self) -> Option<ObservationValue> {
        if let Some(s) = self.value_string.as_ref().filter(|s| !s.is_empty()) {
            return Some(ObservationValue::String(s.clone()));
        }
        if let Some(q) = &self.value_quantity {
            return Some(ObservationValue::Quantity(Quantity {
                value: q.value,
                unit: Some(q.unit.clone()),
                system: Some(q.system.clone().unwrap_or_else(|| UCUM_SYSTEM.to_string())),
                code: Some(q.code.clone().unwrap_or_else(|| q.unit.clone())),
            }));
        }
        self.value_coded.as_ref().map(|c| {
            ObservationValue::CodeableConcept(builders::build_coded_concept(
                &c.system,
                &c.code,
                c.display.as_deref(),
                None,
            ))
        })
    }

    pub fn to_input(&self, now: FhirDateTime) -> Result<LabResultInput> {
        let value = self.value().ok_or_else(|| {
            CoreError::configuration(format!(
                "lab result {} needs value_string, value_quantity or value_coded",
                self.code
            ))
        })?;
        Ok(LabResultInput {
            code: self.code.clone(),
            display: self.display.clone(),
            value,
            interpretation: self
                .interpretation
                .clone()
                .unwrap_or_else(|| INTERPRETATION_NORMAL.to_string()),
            test_identifier: self
                .test_identifier
                .clone()
                .unwrap_or_else(|| DEFAULT_TEST_IDENTIFIER.to_string()),
            effective: timestamp(self.effective.as_deref(), now, "lab_results.effective")?,
            issued: timestamp(self.issued.as_deref(), now, "lab_results.issued")?,
        })
    }
}

impl ReportConfig {
    pub fn to_input(&self, now: FhirDateTime) -> Result<ReportInput> {
        Ok(ReportInput {
            code: self.code.clone(),
            display: self.display.clone(),
            effective: timestamp(
                self.effective.as_deref(),
                now,
                "diagnostic_report.effective",
            )?,
            issued: timestamp(self.issued.as_deref(), now, "diagnostic_report.issued")?,
        })
    }
}

impl RunConfig {
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| CoreError::configuration(format!("base_url '{}': {e}", self.base_url)))
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.output_dir.as_os_str().is_empty() {
            return Err(CoreError::configuration("output_dir must not be empty"));
        }
        if self.patient.given.trim().is_empty() && self.patient.family.trim().is_empty() {
            return Err(CoreError::configuration("patient needs a given or family name"));
        }
        validate_id(&self.organization.id)
            .map_err(|e| CoreError::configuration(format!("organization.id: {e}")))?;
        validate_id(&self.practitioner.id)
            .map_err(|e| CoreError::configuration(format!("practitioner.id: {e}")))?;
        if self.diagnostic_report.code.trim().is_empty() {
            return Err(CoreError::configuration("diagnostic_report.code must not be empty"));
        }
        if self.lab_results.is_empty() {
            return Err(CoreError::configuration("at least one lab result is required"));
        }
        // Timestamps and values are checked by building the inputs once.
        let now = labpass_core::now_utc();
        for lab in &self.lab_results {
            if lab.code.trim().is_empty() {
                return Err(CoreError::configuration("lab_results.code must not be empty"));
            }
            lab.to_input(now)?;
        }
        self.diagnostic_report.to_input(now)?;
        Ok(())
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
}

pub fn load_config(path: &Path, overrides: &ConfigOverrides) -> Result<RunConfig> {
    use config::{Config, Environment, File};

    let cfg = Config::builder()
        .add_source(File::from(path.to_path_buf()))
        // Environment variable overrides, e.g. LABPASS__OUTPUT_DIR=runs
        .add_source(
            Environment::with_prefix("LABPASS")
                .try_parsing(true)
                .separator("__"),
        )
        .build()
        .map_err(|e| CoreError::configuration(format!("config build error: {e}")))?;
    let mut run: RunConfig = cfg
        .try_deserialize()
        .map_err(|e| CoreError::configuration(format!("config deserialize error: {e}")))?;

    if let Some(base_url) = &overrides.base_url {
        run.base_url = base_url.clone();
    }
    if let Some(output_dir) = &overrides.output_dir {
        run.output_dir = output_dir.clone();
    }

    run.validate()?;
    Ok(run)
}

/// Server for one-off reads: `--server`/`LABPASS_URL`, else the run config's `base_url`.
pub fn resolve_server(cli_server: Option<&str>, config_path: Option<&Path>) -> Result<Url> {
    if let Some(s) = cli_server {
        return Url::parse(s)
            .map_err(|e| CoreError::configuration(format!("server '{s}': {e}")));
    }
    if let Some(path) = config_path {
        return load_config(path, &ConfigOverrides::default())?.base_url();
    }
    Err(CoreError::configuration(
        "No server URL configured. Use --server, set LABPASS_URL, or pass --config <file>",
    ))
}
