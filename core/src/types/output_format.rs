use std::fmt;
use std::path::Path;

use crate::error::{CinecatError, Result};

/// Output container, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum OutputFormat {
    /// Animated GIF
    #[default]
    Gif,
    /// Animated PNG
    Apng,
    /// Multi-page TIFF
    Tiff,
}

/// Extensions accepted for output files
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["gif", "apng", "tiff", "tif"];

impl OutputFormat {
    /// Resolves the format from an output path's extension
    ///
    /// # Errors
    ///
    /// Returns [`CinecatError::UnsupportedFormat`] for any extension other
    /// than `.gif`, `.apng`, `.tiff` or `.tif`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "gif" => Ok(OutputFormat::Gif),
            "apng" => Ok(OutputFormat::Apng),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            _ => Err(CinecatError::UnsupportedFormat(format!(
                "'.{}' (supported: {})",
                ext,
                SUPPORTED_EXTENSIONS
                    .iter()
                    .map(|e| format!(".{}", e))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Gif => "gif",
            OutputFormat::Apng => "apng",
            OutputFormat::Tiff => "tiff",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
