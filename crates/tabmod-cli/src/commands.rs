//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use tabmod_core::Transformer;
use tabmod_model::Config;
use tracing::{info, warn};

const CONFIG_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// What a `run` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub rules_applied: usize,
    pub warnings: usize,
}

/// Load `input`, apply the rules in `config` and write the result.
pub fn run_process(input: &Path, config: &Path, output: Option<&Path>) -> Result<RunSummary> {
    if !input.is_file() {
        bail!("input file not found: {}", input.display());
    }
    if !config.is_file() {
        bail!("configuration file not found: {}", config.display());
    }

    let mut transformer = Transformer::from_config_path(config)?;
    let written = transformer
        .process(input, output)
        .with_context(|| format!("failed to process {}", input.display()))?;

    let (rows, columns) = transformer.table().map_or((0, 0), |df| df.shape());
    let outcome = transformer.outcome();
    let summary = RunSummary {
        output: written,
        rows,
        columns,
        rules_applied: outcome.applied,
        warnings: outcome.warnings.len(),
    };
    info!(
        rows = summary.rows,
        columns = summary.columns,
        rules = summary.rules_applied,
        warnings = summary.warnings,
        "processing complete"
    );
    Ok(summary)
}

/// One configuration file found by [`list_configs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub name: String,
    pub path: PathBuf,
    /// Rule count and export format; `None` when the file does not parse.
    pub details: Option<(usize, &'static str)>,
}

/// Configuration files in `dir`, sorted by name.
pub fn list_configs(dir: &Path) -> Result<Vec<ConfigEntry>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read configuration directory {}", dir.display()))?;
    let mut configs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || !is_config_file(&path) {
            continue;
        }
        let Some(name) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
        else {
            continue;
        };
        let details = match Config::from_path(&path) {
            Ok(config) => Some((config.transformations.len(), config.export.format.as_str())),
            Err(error) => {
                warn!("{error}");
                None
            }
        };
        configs.push(ConfigEntry {
            name,
            path,
            details,
        });
    }
    configs.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    Ok(configs)
}

/// Print the configurations in `dir` as a table.
pub fn run_configs(dir: &Path) -> Result<()> {
    let configs = list_configs(dir)?;
    if configs.is_empty() {
        println!("No configurations found in {}", dir.display());
        return Ok(());
    }
    println!("{}", configs_table(&configs));
    Ok(())
}

pub fn configs_table(configs: &[ConfigEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Rules"),
        header_cell("Export"),
    ]);
    apply_table_style(&mut table);
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for config in configs {
        let (rules, format) = match config.details {
            Some((rules, format)) => (rules.to_string(), format.to_string()),
            None => ("-".to_string(), "invalid".to_string()),
        };
        table.add_row(vec![Cell::new(&config.name), Cell::new(rules), Cell::new(format)]);
    }
    table
}

/// Path of the configuration called `name` in `dir`.
pub fn find_config(dir: &Path, name: &str) -> Result<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|path| path.is_file())
        .with_context(|| format!("configuration '{name}' not found in {}", dir.display()))
}

/// Print the configuration called `name` as stored on disk.
pub fn run_show_config(dir: &Path, name: &str) -> Result<()> {
    let path = find_config(dir, name)?;
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    println!("# {}", path.display());
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn is_config_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            CONFIG_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}
