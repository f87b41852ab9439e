use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dicom_object::{open_file, DefaultDicomObject};
use glob::Pattern;
use log::{debug, info, warn};
use walkdir::WalkDir;

use super::Series;
use crate::error::{CinecatError, Result};
use crate::extraction::tags::{get_string_value, is_presentation_state, SERIES_INSTANCE_UID};

/// Default pattern for DICOM files in a directory scan
pub const DEFAULT_PATTERN: &str = "*.dcm";

/// Reads a series from a single DICOM file
///
/// An enhanced multi-frame file holds the whole series; a legacy file holds
/// one frame of it.
///
/// # Errors
///
/// [`CinecatError::InvalidInput`] if `path` is not an existing regular file,
/// or any error from decoding and series construction.
pub fn read_file(path: &Path) -> Result<Series> {
    if !path.is_file() {
        return Err(CinecatError::InvalidInput(format!(
            "{} must be a path to a regular file",
            path.display()
        )));
    }
    let dcm = open_file(path)?;
    Series::new(vec![dcm])
}

/// Reads every series found below a directory
///
/// Files whose trailing path components match `pattern` are decoded,
/// presentation states are dropped and the rest is grouped by
/// SeriesInstanceUID. Each series is keyed by the smallest path of its group.
/// A group that does not form a valid series is skipped with a warning.
///
/// # Errors
///
/// [`CinecatError::InvalidInput`] if `dir` is not an existing directory,
/// [`CinecatError::InvalidArgument`] for an invalid glob pattern. When every
/// group is rejected, the error of the first one in UID order.
pub fn read_dir(dir: &Path, pattern: &str) -> Result<BTreeMap<PathBuf, Series>> {
    if !dir.is_dir() {
        return Err(CinecatError::InvalidInput(format!(
            "{} must be a path to an existing directory",
            dir.display()
        )));
    }

    let files = collect_matching_files(dir, pattern)?;
    info!("Found {} files matching '{}'", files.len(), pattern);

    let mut groups: BTreeMap<String, Vec<(PathBuf, DefaultDicomObject)>> = BTreeMap::new();
    for path in files {
        let dcm = match open_file(&path) {
            Ok(dcm) => dcm,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if is_presentation_state(&dcm) {
            debug!("Skipping presentation state {}", path.display());
            continue;
        }
        let Some(uid) = get_string_value(&dcm, SERIES_INSTANCE_UID) else {
            warn!("Skipping {}: no SeriesInstanceUID", path.display());
            continue;
        };
        groups.entry(uid).or_default().push((path, dcm));
    }

    let mut series_by_file = BTreeMap::new();
    let mut first_error = None;
    for (uid, members) in groups {
        let Some(main_path) = members.iter().map(|(path, _)| path.clone()).min() else {
            continue;
        };
        let datasets = members.into_iter().map(|(_, dcm)| dcm).collect();
        let series = match Series::new(datasets) {
            Ok(series) => series,
            Err(e) => {
                warn!("Skipping series {} at {}: {}", uid, main_path.display(), e);
                first_error.get_or_insert(e);
                continue;
            }
        };
        info!(
            "Series {} with {} datasets at {}",
            uid,
            series.len(),
            main_path.display()
        );
        series_by_file.insert(main_path, series);
    }

    match first_error {
        Some(e) if series_by_file.is_empty() => Err(e),
        _ => Ok(series_by_file),
    }
}

/// Recursively lists regular files under `dir` matching `pattern`, sorted
///
/// A pattern of N path components is matched against the last N components
/// of each file's path relative to `dir`.
pub fn collect_matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let glob = Pattern::new(pattern)?;
    let depth = Path::new(pattern).components().count().max(1);

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let components: Vec<_> = relative.components().collect();
        let tail: PathBuf = components[components.len().saturating_sub(depth)..]
            .iter()
            .collect();
        if glob.matches_path(&tail) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
