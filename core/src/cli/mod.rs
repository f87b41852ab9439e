pub mod report;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::api::ConvertOptions;
use crate::series::assemble::DEFAULT_PATTERN;
use crate::types::{FrameRange, OutputFormat, WindowingMode};

/// Command-line arguments for cinecat
#[derive(Parser, Debug)]
#[command(name = "cinecat")]
#[command(about = "Convert DICOM cine series to animated GIF, APNG or multi-page TIFF")]
#[command(version)]
pub struct Cli {
    /// DICOM file, or directory searched recursively for DICOM files
    #[arg(value_name = "DCM_PATH")]
    pub dcm_path: PathBuf,

    /// Glob pattern for DICOM files in a directory
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Output file for a single DICOM file; its extension selects the format
    #[arg(short, long, value_name = "OUT_FILE")]
    pub out_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "gif")]
    pub format: FormatArg,

    /// Frame duration in milliseconds [default: from DICOM timing, else 100]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub duration: Option<u32>,

    /// Windowing: "dicom", "full" or "CENTER,WIDTH"
    #[arg(short, long, default_value = "dicom", allow_hyphen_values = true)]
    pub windowing: WindowingMode,

    /// Frames to keep, 1-based and inclusive, e.g. "5", "10-20", "10-" or "-20"
    #[arg(long, allow_hyphen_values = true)]
    pub frames: Option<FrameRange>,

    /// Print series metadata instead of converting
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "text")]
    pub info: Option<InfoFormat>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Conversion settings named by the arguments
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            pattern: self.pattern.clone(),
            out_file: self.out_file.clone(),
            format: self.format.into(),
            duration: self.duration,
            windowing: self.windowing,
            frames: self.frames,
        }
    }
}

/// Output container options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Animated GIF
    Gif,
    /// Animated PNG
    Apng,
    /// Multi-page TIFF
    Tiff,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Gif => OutputFormat::Gif,
            FormatArg::Apng => OutputFormat::Apng,
            FormatArg::Tiff => OutputFormat::Tiff,
        }
    }
}

/// Series report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InfoFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Window;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["cinecat", "series/"]).unwrap();
        assert_eq!(cli.dcm_path, PathBuf::from("series/"));
        assert_eq!(cli.info, None);
        assert!(!cli.verbose);
        assert_eq!(cli.convert_options(), ConvertOptions::default());
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "cinecat", "a.dcm", "-p", "*.ima", "-o", "out/cine.apng", "-f", "apng", "-d", "40",
            "-w", "40,400", "--frames", "2-10", "-v",
        ])
        .unwrap();

        let options = cli.convert_options();
        assert_eq!(options.pattern, "*.ima");
        assert_eq!(options.out_file, Some(PathBuf::from("out/cine.apng")));
        assert_eq!(options.format, OutputFormat::Apng);
        assert_eq!(options.duration, Some(40));
        assert_eq!(
            options.windowing,
            WindowingMode::Explicit(Window::new(40.0, 400.0))
        );
        assert_eq!(options.frames, Some(FrameRange::new(Some(2), Some(10))));
        assert!(cli.verbose);
    }

    #[rstest]
    #[case(&["cinecat", "x", "--info"], Some(InfoFormat::Text))]
    #[case(&["cinecat", "x", "--info", "json"], Some(InfoFormat::Json))]
    #[case(&["cinecat", "--info", "text", "x"], Some(InfoFormat::Text))]
    #[case(&["cinecat", "x"], None)]
    fn test_info_flag(#[case] args: &[&str], #[case] expected: Option<InfoFormat>) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.info, expected);
    }

    #[test]
    fn test_open_frame_range() {
        let cli = Cli::try_parse_from(["cinecat", "x", "--frames", "-20"]).unwrap();
        assert_eq!(cli.frames, Some(FrameRange::new(None, Some(20))));
    }

    #[rstest]
    #[case(&["cinecat", "x", "-d", "0"])]
    #[case(&["cinecat", "x", "-f", "mp4"])]
    #[case(&["cinecat", "x", "-w", "bright"])]
    #[case(&["cinecat", "x", "--frames", "a-b"])]
    fn test_rejected_arguments(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
