use anyhow::{Context, Result};
use colored::Colorize;
use labpass_core::{MemoryStore, Recipe, ResourceStore};
use tracing::info;

use crate::cli::RunArgs;
use crate::client::FhirClient;
use crate::config::{ConfigOverrides, load_config};
use crate::output::print_success;
use crate::pipeline::run_recipe;
use crate::snapshot::SnapshotWriter;

pub async fn run(cli_server: Option<&str>, args: &RunArgs) -> Result<()> {
    let overrides = ConfigOverrides {
        base_url: cli_server.map(str::to_string),
        output_dir: args.output.clone(),
    };
    let config = load_config(&args.config, &overrides)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;
    let recipe = Recipe::from(args.recipe);

    let store: Box<dyn ResourceStore> = if args.dry_run {
        info!("dry run: uploading into the in-memory store");
        Box::new(MemoryStore::new())
    } else {
        Box::new(FhirClient::new(&config.base_url()?))
    };

    let snapshots = SnapshotWriter::new(&config.output_dir, recipe);
    let summary = run_recipe(store.as_ref(), &config, recipe, &snapshots).await?;

    print_success(&format!("{recipe} published"));
    println!("{}: Patient/{}", "Patient".cyan(), summary.patient_id);
    for id in &summary.lab_result_ids {
        println!("{}: Observation/{id}", "Lab result".cyan());
    }
    println!(
        "{}: DiagnosticReport/{}",
        "Report".cyan(),
        summary.diagnostic_report_id
    );
    println!("{}: {}", "Snapshots".cyan(), snapshots.root().display());
    Ok(())
}
