//! JSON snapshots of each resource before and after upload.
//!
//! Layout: `<output_dir>/<recipe dir>/<pre_upload|post_upload>/<role>.json`.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use labpass_core::Recipe;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PreUpload,
    PostUpload,
}

impl Stage {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::PreUpload => "pre_upload",
            Self::PostUpload => "post_upload",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

pub const PATIENT_ROLE: &str = "patient";
pub const DIAGNOSTIC_REPORT_ROLE: &str = "diagnostic_report";

/// File stem for the `index`-th (zero-based) lab result
pub fn lab_result_role(index: usize) -> String {
    format!("lab_result_{}", index + 1)
}

pub struct SnapshotWriter {
    root: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: &Path, recipe: Recipe) -> Self {
        Self {
            root: output_dir.join(recipe.output_dir_name()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, stage: Stage, role: &str) -> PathBuf {
        self.root.join(stage.dir_name()).join(format!("{role}.json"))
    }

    /// Pretty-print `document` to its slot, replacing any earlier run's file.
    pub fn write(&self, stage: Stage, role: &str, document: &Value) -> Result<PathBuf> {
        let path = self.path(stage, role);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(document)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        debug!(path = %path.display(), "wrote snapshot");
        Ok(path)
    }
}
