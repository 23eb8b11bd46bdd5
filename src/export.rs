//! Export functionality for parsed dumps
//!
//! Writes a parsed [`DumpDocument`] next to its input file (or into an
//! output directory) as pretty JSON and/or a flat CSV table of the
//! categorized settings.

use crate::types::*;
use crate::Result;
use std::path::{Path, PathBuf};

/// Export options for controlling output formats
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub json: bool,
    pub csv: bool,
    pub output_dir: Option<String>,
}

/// Paths written by an export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub json_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
}

/// Compute `(json_path, csv_path)` for an input file.
///
/// The output directory defaults to the input's parent directory.
pub fn compute_export_paths(input_path: &Path, export_options: &ExportOptions) -> (PathBuf, PathBuf) {
    let base_name = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dump");

    let output_dir = match &export_options.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    (
        output_dir.join(format!("{base_name}.dump.json")),
        output_dir.join(format!("{base_name}.settings.csv")),
    )
}

/// Export a parsed dump according to `export_options`
pub fn export_document(
    doc: &DumpDocument,
    input_path: &Path,
    export_options: &ExportOptions,
) -> Result<ExportReport> {
    let (json_path, csv_path) = compute_export_paths(input_path, export_options);
    let mut report = ExportReport::default();

    if export_options.json {
        ensure_parent_dir(&json_path)?;
        export_to_json(doc, &json_path)?;
        report.json_path = Some(json_path);
    }

    if export_options.csv {
        ensure_parent_dir(&csv_path)?;
        export_to_csv(doc, &csv_path)?;
        report.csv_path = Some(csv_path);
    }

    Ok(report)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write the whole document as pretty-printed JSON
#[cfg(feature = "json")]
pub fn export_to_json(doc: &DumpDocument, output_path: &Path) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, doc)?;
    Ok(())
}

#[cfg(not(feature = "json"))]
pub fn export_to_json(_doc: &DumpDocument, _output_path: &Path) -> Result<()> {
    Err(crate::DumpError::Export(
        "JSON export requires the `json` feature".to_string(),
    ))
}

/// One row of the settings CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingRow<'a> {
    pub scope: &'static str,
    pub context: &'a str,
    pub category: SettingCategory,
    pub key: &'a str,
    pub value: &'a str,
}

/// Flatten the categorized settings: profiles first, then rate-profiles,
/// each in numeric context order
pub fn setting_rows(doc: &DumpDocument) -> Vec<SettingRow<'_>> {
    let scopes = [
        ("profile", &doc.settings.profiles, &doc.stats.profiles_detected),
        (
            "rateprofile",
            &doc.settings.rateprofiles,
            &doc.stats.rateprofiles_detected,
        ),
    ];

    let mut rows = Vec::new();
    for (scope, contexts, order) in scopes {
        for context in order {
            let Some(buckets) = contexts.get(context) else {
                continue;
            };
            for (category, key, value) in buckets.iter() {
                rows.push(SettingRow {
                    scope,
                    context: context.as_str(),
                    category,
                    key: key.as_str(),
                    value: value.as_str(),
                });
            }
        }
    }
    rows
}

/// Write the categorized settings as `scope,context,category,key,value`
#[cfg(feature = "csv")]
pub fn export_to_csv(doc: &DumpDocument, output_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(["scope", "context", "category", "key", "value"])?;
    for row in setting_rows(doc) {
        writer.write_record([
            row.scope,
            row.context,
            row.category.as_str(),
            row.key,
            row.value,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(not(feature = "csv"))]
pub fn export_to_csv(_doc: &DumpDocument, _output_path: &Path) -> Result<()> {
    Err(crate::DumpError::Export(
        "CSV export requires the `csv` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_dump_text;

    #[test]
    fn test_compute_export_paths_defaults_to_input_dir() {
        let (json, csv) =
            compute_export_paths(Path::new("/data/quad/diff_all.txt"), &ExportOptions::default());
        assert_eq!(json, PathBuf::from("/data/quad/diff_all.dump.json"));
        assert_eq!(csv, PathBuf::from("/data/quad/diff_all.settings.csv"));
    }

    #[test]
    fn test_compute_export_paths_with_output_dir() {
        let opts = ExportOptions {
            output_dir: Some("/tmp/out".to_string()),
            ..ExportOptions::default()
        };
        let (json, _) = compute_export_paths(Path::new("backup.gz"), &opts);
        assert_eq!(json, PathBuf::from("/tmp/out/backup.dump.json"));
    }

    #[test]
    fn test_setting_rows_order() {
        let doc = parse_dump_text(
            "profile 10\nset p_roll = 50\nprofile 2\nset p_roll = 40\nrateprofile 1\nset roll_expo = 5\n",
        );
        let rows: Vec<_> = setting_rows(&doc)
            .into_iter()
            .map(|row| (row.scope, row.context, row.key, row.value))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("profile", "2", "p_roll", "40"),
                ("profile", "10", "p_roll", "50"),
                ("rateprofile", "1", "roll_expo", "5"),
            ]
        );
    }
}
