//! Drives one recipe end to end: build, snapshot, upload, snapshot.
//!
//! Uploads are strictly sequential: patient, then each lab result in input
//! order (referenced recipes only), then the report. The first failure
//! aborts the run; snapshots already written stay on disk.

use anyhow::{Context, Result, bail};
use labpass_core::builders::{build_organization, build_patient, build_practitioner};
use labpass_core::fhir_reference::{ReferenceTarget, parse_reference};
use labpass_core::model::{Observation, Patient};
use labpass_core::{
    FhirResource, LabResultInput, Recipe, Resource, ResourceStore, compose_diagnostic_report,
    compose_lab_result, now_utc, upload,
};
use serde_json::Value;
use tracing::info;

use crate::config::RunConfig;
use crate::snapshot::{
    DIAGNOSTIC_REPORT_ROLE, PATIENT_ROLE, SnapshotWriter, Stage, lab_result_role,
};

/// Server-assigned ids of everything a run uploaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub patient_id: String,
    pub lab_result_ids: Vec<String>,
    pub diagnostic_report_id: String,
}

fn to_value<R: FhirResource>(resource: &R) -> Result<Value> {
    Ok(Into::<Resource>::into(resource.clone()).to_value()?)
}

/// Check that a reference we are about to publish points at an id we uploaded.
fn ensure_points_at(reference: Option<&str>, expected: &ReferenceTarget) -> Result<()> {
    let reference = reference.context("reference has no target")?;
    let target = parse_reference(reference, None)?;
    if &target != expected {
        bail!("reference {reference} does not point at {expected}");
    }
    Ok(())
}

pub async fn run_recipe(
    store: &dyn ResourceStore,
    config: &RunConfig,
    recipe: Recipe,
    snapshots: &SnapshotWriter,
) -> Result<RunSummary> {
    // Everything derived from configuration is checked and built before the
    // first call to the store.
    config.validate().context("Invalid run configuration")?;
    let now = now_utc();
    let lab_inputs = config
        .lab_results
        .iter()
        .map(|lab| lab.to_input(now))
        .collect::<labpass_core::Result<Vec<LabResultInput>>>()
        .context("Invalid lab result configuration")?;
    let report_input = config
        .diagnostic_report
        .to_input(now)
        .context("Invalid diagnostic report configuration")?;
    let patient = build_patient(
        &config.patient.given,
        &config.patient.family,
        &config.patient.passports,
    )
    .context("Invalid patient configuration")?;
    let facility = build_organization(&config.organization.id, &config.organization.name)
        .context("Invalid organization configuration")?;
    let administrator = build_practitioner(
        &config.practitioner.id,
        &config.practitioner.given,
        &config.practitioner.family,
    )
    .context("Invalid practitioner configuration")?;

    info!(%recipe, labs = lab_inputs.len(), "starting run");

    snapshots.write(Stage::PreUpload, PATIENT_ROLE, &to_value(&patient)?)?;
    let uploaded = upload(store, &patient)
        .await
        .context("Failed to upload Patient")?;
    snapshots.write(Stage::PostUpload, PATIENT_ROLE, &uploaded.document)?;
    let patient: Patient = uploaded.resource;
    let patient_id = patient.require_id("run subject")?.to_string();

    let mut results: Vec<Observation> = Vec::with_capacity(lab_inputs.len());
    let mut lab_result_ids = Vec::new();
    for (index, input) in lab_inputs.iter().enumerate() {
        let role = lab_result_role(index);
        let observation =
            compose_lab_result(&patient, &facility, &administrator, input, recipe.patient())
                .with_context(|| format!("Failed to compose {role}"))?;
        snapshots.write(Stage::PreUpload, &role, &to_value(&observation)?)?;

        if recipe.uploads_observations() {
            let uploaded = upload(store, &observation)
                .await
                .with_context(|| format!("Failed to upload {role}"))?;
            snapshots.write(Stage::PostUpload, &role, &uploaded.document)?;
            lab_result_ids.push(uploaded.resource.require_id(&role)?.to_string());
            results.push(uploaded.resource);
        } else {
            results.push(observation);
        }
    }

    let report = compose_diagnostic_report(
        &patient,
        &facility,
        &report_input,
        &results,
        recipe.observations(),
    )
    .context("Failed to compose diagnostic report")?;

    ensure_points_at(
        report.subject.reference.as_deref(),
        &ReferenceTarget::resource(Patient::RESOURCE_TYPE, &patient_id),
    )?;
    for (reference, id) in report.result.iter().zip(&lab_result_ids) {
        ensure_points_at(
            reference.reference.as_deref(),
            &ReferenceTarget::resource(Observation::RESOURCE_TYPE, id),
        )?;
    }

    snapshots.write(Stage::PreUpload, DIAGNOSTIC_REPORT_ROLE, &to_value(&report)?)?;
    let uploaded = upload(store, &report)
        .await
        .context("Failed to upload DiagnosticReport")?;
    snapshots.write(Stage::PostUpload, DIAGNOSTIC_REPORT_ROLE, &uploaded.document)?;
    let diagnostic_report_id = uploaded
        .resource
        .require_id("uploaded diagnostic report")?
        .to_string();

    info!(%recipe, report = %diagnostic_report_id, "run complete");

    Ok(RunSummary {
        patient_id,
        lab_result_ids,
        diagnostic_report_id,
    })
}
