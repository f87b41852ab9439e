use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{CinecatError, Result};
use crate::extraction::tags::{get_int_value, NUMBER_OF_FRAMES};
use crate::extraction::timing::{frame_duration, MAX_FRAME_DURATION_MS};
use crate::extraction::{dicom_window, frame_duration_or_default, is_phase, resolve_windowing};
use crate::render::{render, select_frames, write_frames};
use crate::series::assemble::DEFAULT_PATTERN;
use crate::series::{read_dir, read_file, Series};
use crate::types::{FrameRange, ImageType, OutputFormat, Window, Windowing, WindowingMode};

/// Settings for converting DICOM series to animations or image stacks
///
/// # Example
///
/// ```
/// use cinecat_core::{ConvertOptions, OutputFormat, WindowingMode};
///
/// let options = ConvertOptions {
///     format: OutputFormat::Apng,
///     duration: Some(40),
///     windowing: "40,400".parse::<WindowingMode>().unwrap(),
///     ..ConvertOptions::default()
/// };
/// assert_eq!(options.pattern, "*.dcm");
/// assert!(options.frames.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Glob for files considered in a directory scan
    pub pattern: String,

    /// Output path for single-file input; ignored for directories
    pub out_file: Option<PathBuf>,

    /// Output format when the path does not name one
    pub format: OutputFormat,

    /// Frame duration in ms; derived from the DICOM data when absent
    pub duration: Option<u32>,

    /// How the display window is chosen
    pub windowing: WindowingMode,

    /// Subset of frames to write
    pub frames: Option<FrameRange>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            out_file: None,
            format: OutputFormat::default(),
            duration: None,
            windowing: WindowingMode::default(),
            frames: None,
        }
    }
}

/// Converts a DICOM file or every series below a directory
///
/// A directory yields one output per series, next to the series' first file
/// and named after it with the extension of `options.format`. A file yields
/// `options.out_file`, or the input path with the format's extension.
///
/// Returns the paths written.
///
/// # Errors
///
/// [`CinecatError::InvalidInput`] if `path` is neither a file nor a
/// directory. A series that fails is skipped with a warning; the first
/// failure is returned only when no output was written.
pub fn convert(path: &Path, options: &ConvertOptions) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        if let Some(out_file) = &options.out_file {
            warn!(
                "Ignoring output file {} for directory input",
                out_file.display()
            );
        }
        let all_series = read_dir(path, &options.pattern)?;
        if all_series.is_empty() {
            info!(
                "No DICOM series matching '{}' found in {}",
                options.pattern,
                path.display()
            );
            return Ok(Vec::new());
        }

        let mut written = Vec::with_capacity(all_series.len());
        let mut first_error = None;
        for (main_path, series) in &all_series {
            let out_path = main_path.with_extension(options.format.extension());
            match write_series(series, &out_path, options) {
                Ok(()) => written.push(out_path),
                Err(e) => {
                    warn!(
                        "Skipping series {} at {}: {}",
                        series.series_instance_uid(),
                        main_path.display(),
                        e
                    );
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) if written.is_empty() => Err(e),
            _ => Ok(written),
        }
    } else if path.is_file() {
        let series = read_file(path)?;
        let out_path = options
            .out_file
            .clone()
            .unwrap_or_else(|| path.with_extension(options.format.extension()));
        write_series(&series, &out_path, options)?;
        Ok(vec![out_path])
    } else {
        Err(CinecatError::InvalidInput(format!(
            "{} is neither a file nor a directory",
            path.display()
        )))
    }
}

/// Renders one series and encodes it to `out_path`
///
/// The format follows the extension of `out_path`. Missing parent
/// directories are created.
pub fn write_series(series: &Series, out_path: &Path, options: &ConvertOptions) -> Result<()> {
    if options.duration == Some(0) {
        return Err(CinecatError::InvalidArgument(
            "frame duration must be a positive number of milliseconds".to_string(),
        ));
    }
    OutputFormat::from_path(out_path)?;

    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let stack = select_frames(series.pixel_array()?, options.frames)?;

    let window = match resolve_windowing(series, options.windowing)? {
        Windowing::Window(window) => Some(window),
        Windowing::FullRange => None,
        Windowing::Unresolved => {
            warn!(
                "No windowing information in series {}. Using the full value range.",
                series.series_instance_uid()
            );
            None
        }
    };
    let frames = render(&stack, window);

    let duration = options
        .duration
        .unwrap_or_else(|| frame_duration_or_default(series));

    write_frames(&frames, out_path, duration)
}

/// Metadata overview of one series
///
/// Fields that cannot be resolved for the series are `None`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct SeriesSummary {
    /// File the series is reported under
    pub path: PathBuf,

    pub series_instance_uid: String,

    pub sop_class_uid: Option<String>,

    /// Number of datasets in the series
    pub datasets: usize,

    /// Total number of frames over all datasets
    pub frames: usize,

    pub rows: Option<u16>,

    pub columns: Option<u16>,

    pub bits_stored: Option<u16>,

    pub image_type: Option<ImageType>,

    /// Whether the series holds phase or velocity images
    pub is_phase: Option<bool>,

    /// Window resolved from the DICOM data
    pub window: Option<Window>,

    /// Frame duration in ms derived from the DICOM timestamps
    pub frame_duration_ms: Option<u32>,
}

impl SeriesSummary {
    pub fn from_series(path: &Path, series: &Series) -> Self {
        let frames = series
            .datasets()
            .iter()
            .map(|dcm| {
                get_int_value(dcm, NUMBER_OF_FRAMES)
                    .and_then(|n| usize::try_from(n).ok())
                    .unwrap_or(1)
            })
            .sum();

        Self {
            path: path.to_path_buf(),
            series_instance_uid: series.series_instance_uid().to_string(),
            sop_class_uid: series.sop_class_uid().ok(),
            datasets: series.len(),
            frames,
            rows: series.rows().ok(),
            columns: series.columns().ok(),
            bits_stored: series.bits_stored().ok(),
            image_type: series.image_type().ok(),
            is_phase: is_phase(series).ok(),
            window: dicom_window(series).ok().flatten(),
            frame_duration_ms: frame_duration(series)
                .ok()
                .filter(|ms| *ms > 0 && *ms <= MAX_FRAME_DURATION_MS),
        }
    }
}

/// Summarizes a DICOM file or every series below a directory
///
/// # Errors
///
/// [`CinecatError::InvalidInput`] if `path` is neither a file nor a
/// directory, or any error from reading the series.
pub fn summarize(path: &Path, pattern: &str) -> Result<Vec<SeriesSummary>> {
    let all_series: BTreeMap<PathBuf, Series> = if path.is_dir() {
        read_dir(path, pattern)?
    } else if path.is_file() {
        BTreeMap::from([(path.to_path_buf(), read_file(path)?)])
    } else {
        return Err(CinecatError::InvalidInput(format!(
            "{} is neither a file nor a directory",
            path.display()
        )));
    };

    Ok(all_series
        .iter()
        .map(|(path, series)| SeriesSummary::from_series(path, series))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::tags::{IMAGE_TYPE, SAMPLES_PER_PIXEL, WINDOW_CENTER, WINDOW_WIDTH};
    use crate::testing::{
        file_object, put_str, put_strs, put_u16, timed_image, with_pixels, MR_IMAGE_STORAGE,
    };
    use dicom_core::VR;
    use dicom_object::InMemDicomObject;
    use std::fs::File;
    use tempfile::TempDir;

    fn write_dataset(path: &Path, obj: InMemDicomObject, instance_uid: &str) {
        file_object(obj, instance_uid).write_to_file(path).unwrap();
    }

    /// Two single-frame datasets of series 1.2.3, one second apart
    fn write_series_files(dir: &Path) {
        write_dataset(
            &dir.join("b.dcm"),
            with_pixels(timed_image("1.2.3", "20240101120001.000", 2), [5, 6, 7, 8]),
            "1.2.826.0.2",
        );
        let mut first = with_pixels(timed_image("1.2.3", "20240101120000.000", 1), [1, 2, 3, 4]);
        put_str(&mut first, WINDOW_CENTER, VR::DS, "4");
        put_str(&mut first, WINDOW_WIDTH, VR::DS, "8");
        write_dataset(&dir.join("a.dcm"), first, "1.2.826.0.1");
    }

    fn tiff_pages(path: &Path) -> usize {
        let mut decoder = tiff::decoder::Decoder::new(File::open(path).unwrap()).unwrap();
        let mut pages = 1;
        while decoder.more_images() {
            decoder.next_image().unwrap();
            pages += 1;
        }
        pages
    }

    #[test]
    fn test_convert_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_series_files(dir);

        let options = ConvertOptions {
            format: OutputFormat::Tiff,
            out_file: Some(dir.join("ignored.gif")),
            ..ConvertOptions::default()
        };
        let written = convert(dir, &options).unwrap();

        assert_eq!(written, vec![dir.join("a.tiff")]);
        assert_eq!(tiff_pages(&written[0]), 2);
        assert!(!dir.join("ignored.gif").exists());
    }

    #[test]
    fn test_convert_directory_skips_failing_series() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_series_files(dir);
        // no pixel data, so rendering fails
        write_dataset(
            &dir.join("m.dcm"),
            timed_image("1.2.5", "20240101120000.000", 1),
            "1.2.826.0.5",
        );
        let mut rgb = with_pixels(timed_image("1.2.9", "20240101120000.000", 1), [1, 2, 3, 4]);
        put_u16(&mut rgb, SAMPLES_PER_PIXEL, 3);
        write_dataset(&dir.join("z.dcm"), rgb, "1.2.826.0.9");

        let written = convert(dir, &ConvertOptions::default()).unwrap();

        assert_eq!(written, vec![dir.join("a.gif")]);
        assert!(dir.join("a.gif").is_file());
        assert!(!dir.join("m.gif").exists());
        assert!(!dir.join("z.gif").exists());
    }

    #[test]
    fn test_convert_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let written = convert(temp_dir.path(), &ConvertOptions::default()).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_convert_file_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_series_files(dir);

        let out_file = dir.join("out").join("nested").join("cine.GIF");
        let options = ConvertOptions {
            out_file: Some(out_file.clone()),
            format: OutputFormat::Tiff,
            ..ConvertOptions::default()
        };
        let written = convert(&dir.join("b.dcm"), &options).unwrap();

        assert_eq!(written, vec![out_file.clone()]);
        assert!(out_file.is_file());
    }

    #[test]
    fn test_convert_file_default_output() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_series_files(dir);

        let options = ConvertOptions {
            format: OutputFormat::Apng,
            ..ConvertOptions::default()
        };
        let written = convert(&dir.join("a.dcm"), &options).unwrap();
        assert_eq!(written, vec![dir.join("a.apng")]);
        assert!(dir.join("a.apng").is_file());
    }

    #[test]
    fn test_convert_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = convert(&temp_dir.path().join("nope"), &ConvertOptions::default());
        assert!(matches!(result, Err(CinecatError::InvalidInput(_))));
    }

    #[test]
    fn test_write_series_validates_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_series_files(dir);
        let series = read_file(&dir.join("a.dcm")).unwrap();

        let zero = ConvertOptions {
            duration: Some(0),
            ..ConvertOptions::default()
        };
        let out = dir.join("sub").join("x.gif");
        assert!(matches!(
            write_series(&series, &out, &zero),
            Err(CinecatError::InvalidArgument(_))
        ));
        assert!(!dir.join("sub").exists());

        let mp4 = dir.join("sub").join("x.mp4");
        assert!(matches!(
            write_series(&series, &mp4, &ConvertOptions::default()),
            Err(CinecatError::UnsupportedFormat(_))
        ));
        assert!(!dir.join("sub").exists());
    }

    #[test]
    fn test_write_series_frame_range() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_series_files(dir);
        let all_series = read_dir(dir, DEFAULT_PATTERN).unwrap();
        let series = &all_series[&dir.join("a.dcm")];

        let options = ConvertOptions {
            frames: Some("2".parse().unwrap()),
            ..ConvertOptions::default()
        };
        let out = dir.join("second.tif");
        write_series(series, &out, &options).unwrap();
        assert_eq!(tiff_pages(&out), 1);

        let options = ConvertOptions {
            frames: Some("2-3".parse().unwrap()),
            ..ConvertOptions::default()
        };
        assert!(matches!(
            write_series(series, &dir.join("bad.tif"), &options),
            Err(CinecatError::FrameRange(_))
        ));
    }

    #[test]
    fn test_summary() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_series_files(dir);

        let summaries = summarize(dir, DEFAULT_PATTERN).unwrap();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.path, dir.join("a.dcm"));
        assert_eq!(summary.series_instance_uid, "1.2.3");
        assert_eq!(summary.sop_class_uid.as_deref(), Some(MR_IMAGE_STORAGE));
        assert_eq!(summary.datasets, 2);
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.rows, Some(2));
        assert_eq!(summary.columns, Some(2));
        assert_eq!(summary.bits_stored, Some(12));
        assert_eq!(summary.image_type, None);
        assert_eq!(summary.is_phase, Some(false));
        // only one dataset carries a window
        assert_eq!(summary.window, None);
        assert_eq!(summary.frame_duration_ms, Some(1000));
    }

    #[test]
    fn test_summary_of_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("x.dcm");
        let mut obj = timed_image("1.2.9", "20240101120000.000", 1);
        put_strs(&mut obj, IMAGE_TYPE, VR::CS, &["ORIGINAL", "PRIMARY", "P"]);
        write_dataset(&path, obj, "1.2.826.0.9");

        let summaries = summarize(&path, DEFAULT_PATTERN).unwrap();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.is_phase, Some(true));
        assert_eq!(summary.window, Some(Window::new(2048.0, 4096.0)));
        assert_eq!(summary.frame_duration_ms, None);
        assert_eq!(
            summary.image_type.as_ref().and_then(|t| t.flavor.as_deref()),
            Some("P")
        );
    }
}
