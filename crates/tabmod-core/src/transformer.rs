//! The load, transform, export sequence over one table.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tabmod_ingest::load_table;
use tabmod_model::Config;
use tabmod_output::{export_table, resolve_output_path};
use tabmod_transform::{RuleOutcome, apply_rules};
use tracing::info;

use crate::error::{PipelineError, Result};

/// Owns the configuration and the table for a single run.
///
/// Call [`load`](Self::load) first; [`apply_transformations`](Self::apply_transformations)
/// and [`export`](Self::export) fail with [`PipelineError::MissingInput`] otherwise.
#[derive(Debug)]
pub struct Transformer {
    config: Config,
    table: Option<DataFrame>,
    input_path: Option<PathBuf>,
    outcome: RuleOutcome,
}

impl Transformer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            table: None,
            input_path: None,
            outcome: RuleOutcome::default(),
        }
    }

    /// Read the configuration document at `path`.
    pub fn from_config_path(path: &Path) -> Result<Self> {
        Ok(Self::new(Config::from_path(path)?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The current table, if one is loaded.
    pub fn table(&self) -> Option<&DataFrame> {
        self.table.as_ref()
    }

    /// Result of the last [`apply_transformations`](Self::apply_transformations) call.
    pub fn outcome(&self) -> &RuleOutcome {
        &self.outcome
    }

    /// Load `input`, replacing any previous table, and remember its path for
    /// output naming.
    pub fn load(&mut self, input: &Path) -> Result<&DataFrame> {
        let df = load_table(input, &self.config.load_options)?;
        self.input_path = Some(input.to_path_buf());
        self.outcome = RuleOutcome::default();
        Ok(self.table.insert(df))
    }

    /// Apply the configured rules to the loaded table.
    pub fn apply_transformations(&mut self) -> Result<&RuleOutcome> {
        let df = self.table.as_mut().ok_or(PipelineError::MissingInput)?;
        self.outcome = apply_rules(df, &self.config.transformations)?;
        Ok(&self.outcome)
    }

    /// Write the table. Without `output`, a `_mod` name next to the input is
    /// derived.
    pub fn export(&self, output: Option<&Path>) -> Result<PathBuf> {
        let df = self.table.as_ref().ok_or(PipelineError::MissingInput)?;
        let export = &self.config.export;
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => resolve_output_path(self.input_path.as_deref(), export)?,
        };
        Ok(export_table(df, export, &self.outcome.annotations, &path)?)
    }

    /// Load, transform and export in one call.
    pub fn process(&mut self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        self.load(input)?;
        self.apply_transformations()?;
        let path = self.export(output)?;
        info!(output = %path.display(), "processing complete");
        Ok(path)
    }
}
