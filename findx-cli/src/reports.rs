//! Loading report pools from disk.

use std::io::BufReader;

use camino::Utf8Path;
use findx_core::Report;
use findx_fs::open_utf8_file;

use crate::CliError;

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match findx_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load a JSON array of reports.
pub(crate) fn load_reports(path: &Utf8Path) -> Result<Vec<Report>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenReports {
        path: path.to_path_buf(),
        source,
    })?;
    let reports: Vec<Report> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            CliError::ParseReports {
                path: path.to_path_buf(),
                source,
            }
        })?;
    log::debug!("loaded {} reports from {path}", reports.len());
    Ok(reports)
}

/// Find the report with identifier `id`.
pub(crate) fn find_report<'a>(
    reports: &'a [Report],
    id: &str,
    path: &Utf8Path,
) -> Result<&'a Report, CliError> {
    reports
        .iter()
        .find(|report| report.id == id)
        .ok_or_else(|| CliError::UnknownReport {
            id: id.to_owned(),
            path: path.to_path_buf(),
        })
}
