use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use labpass_core::Recipe;

#[derive(Parser)]
#[command(name = "labpass")]
#[command(about = "Compose synthetic lab results and publish them to a FHIR server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server base URL (overrides the config file and LABPASS_URL env var)
    #[arg(short, long, global = true, env = "LABPASS_URL")]
    pub server: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build, upload and snapshot one recipe
    Run(RunArgs),
    /// Read a resource by reference (e.g. Patient/123)
    Get(GetArgs),
    /// List the supported recipes
    Recipes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecipeArg {
    /// Report with contained lab results, referenced patient
    ContainedLabs,
    /// Report with referenced lab results, each containing the patient
    ReferencedLabsContainedPatient,
    /// Report with referenced lab results, each referencing the patient
    ReferencedLabsReferencedPatient,
}

impl From<RecipeArg> for Recipe {
    fn from(arg: RecipeArg) -> Self {
        match arg {
            RecipeArg::ContainedLabs => Recipe::CONTAINED_LABS,
            RecipeArg::ReferencedLabsContainedPatient => Recipe::REFERENCED_LABS_CONTAINED_PATIENT,
            RecipeArg::ReferencedLabsReferencedPatient => {
                Recipe::REFERENCED_LABS_REFERENCED_PATIENT
            }
        }
    }
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to the run configuration (TOML or JSON)
    #[arg(short, long, default_value = "labpass.toml")]
    pub config: PathBuf,
    #[arg(short, long, value_enum, default_value = "referenced-labs-referenced-patient")]
    pub recipe: RecipeArg,
    /// Snapshot directory (overrides output_dir from the config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Upload into an in-memory store instead of the server
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct GetArgs {
    /// Resource reference (e.g. Patient/123)
    pub reference: String,
    /// Take the server from this run configuration when --server is not given
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
