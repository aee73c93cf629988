//! Output path resolution.
//!
//! Derived names never overwrite an existing file: `<stem>_mod<ext>`,
//! `<stem>_mod2<ext>`, `<stem>_mod3<ext>`, ... are probed in order.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Local;
use tabmod_model::ExportConfig;
use tracing::debug;

use crate::error::{OutputError, Result};

/// Upper bound on probed candidates before giving up.
pub const MAX_NAME_ATTEMPTS: usize = 10_000;

/// Choose the output path for an export.
///
/// With an input path, the name derives from its directory and stem. Without
/// one, the `export.filename` template (default `output.<format>`) is used with
/// `{date}` replaced by the local date as `YYYYMMDD`.
pub fn resolve_output_path(input: Option<&Path>, export: &ExportConfig) -> Result<PathBuf> {
    match input {
        Some(input) => derive_modified_path(input, export.format.extension()),
        None => {
            let template = export
                .filename
                .clone()
                .unwrap_or_else(|| format!("output.{}", export.format.as_str()));
            Ok(PathBuf::from(render_template(&template)))
        }
    }
}

fn render_template(template: &str) -> String {
    template.replace("{date}", &Local::now().format("%Y%m%d").to_string())
}

/// First free and writable `<stem>_mod[N].<extension>` next to `input`.
pub fn derive_modified_path(input: &Path, extension: &str) -> Result<PathBuf> {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    for attempt in 1..=MAX_NAME_ATTEMPTS {
        let suffix = if attempt == 1 {
            "_mod".to_string()
        } else {
            format!("_mod{attempt}")
        };
        let candidate = dir.join(format!("{stem}{suffix}.{extension}"));
        if candidate.exists() {
            continue;
        }
        match probe_writable(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(error) => debug!(path = %candidate.display(), %error, "output candidate not writable"),
        }
    }

    Err(OutputError::WriteFailure {
        path: dir.join(format!("{stem}_mod.{extension}")),
        reason: format!("no writable name after {MAX_NAME_ATTEMPTS} attempts"),
    })
}

fn probe_writable(path: &Path) -> std::io::Result<()> {
    File::create(path)?;
    fs::remove_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_without_date_is_verbatim() {
        assert_eq!(render_template("export.txt"), "export.txt");
    }

    #[test]
    fn template_expands_date() {
        let rendered = render_template("report_{date}.xlsx");
        let date = rendered
            .strip_prefix("report_")
            .and_then(|rest| rest.strip_suffix(".xlsx"))
            .unwrap();
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|ch| ch.is_ascii_digit()));
    }
}
