use thiserror::Error;

/// Result type for cinecat operations
pub type Result<T> = std::result::Result<T, CinecatError>;

/// Error types for cinecat operations
#[derive(Error, Debug)]
pub enum CinecatError {
    /// Input path does not exist or is of the wrong kind
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Field missing from at least one dataset
    #[error("Tag missing in at least one dataset: {0}")]
    MissingTag(String),

    /// Field expected to be uniform differs across the series
    #[error("Tag {0} is not consistent across the series")]
    InconsistentTag(String),

    /// Decoded pixel data contradicts Rows/Columns
    #[error("Unexpected pixel array shape: {0}")]
    ShapeMismatch(String),

    /// No timestamp source produced usable deltas
    #[error("Frame timing unavailable: {0}")]
    TimingUnavailable(String),

    /// Requested frames outside of the frame stack
    #[error("Invalid frame range: {0}")]
    FrameRange(String),

    /// Output extension not supported
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Only single channel images are supported
    #[error("Only single channel images are supported, found SamplesPerPixel={0}")]
    UnsupportedSamplesPerPixel(u16),

    /// Invalid tag value
    #[error("Invalid tag value: {0}")]
    InvalidValue(String),

    /// Invalid caller supplied argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Pixel data decoding error
    #[error("Pixel data error: {0}")]
    PixelDataError(String),

    /// Output encoding error
    #[error("Encoding error: {0}")]
    EncodeError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CinecatError {
    /// Whether a tiered resolver may move on to its next strategy
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CinecatError::MissingTag(_) | CinecatError::InconsistentTag(_)
        )
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for CinecatError {
    fn from(e: dicom_object::ReadError) -> Self {
        CinecatError::DicomError(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for CinecatError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        CinecatError::InvalidValue(format!("{}", e))
    }
}

impl From<dicom_pixeldata::Error> for CinecatError {
    fn from(e: dicom_pixeldata::Error) -> Self {
        CinecatError::PixelDataError(format!("{}", e))
    }
}

impl From<ndarray::ShapeError> for CinecatError {
    fn from(e: ndarray::ShapeError) -> Self {
        CinecatError::ShapeMismatch(format!("{}", e))
    }
}

// Encoder errors
impl From<image::ImageError> for CinecatError {
    fn from(e: image::ImageError) -> Self {
        CinecatError::EncodeError(format!("{}", e))
    }
}

impl From<png::EncodingError> for CinecatError {
    fn from(e: png::EncodingError) -> Self {
        CinecatError::EncodeError(format!("{}", e))
    }
}

impl From<tiff::TiffError> for CinecatError {
    fn from(e: tiff::TiffError) -> Self {
        CinecatError::EncodeError(format!("{}", e))
    }
}

// Directory scanning
impl From<glob::PatternError> for CinecatError {
    fn from(e: glob::PatternError) -> Self {
        CinecatError::InvalidArgument(format!("invalid glob pattern: {}", e))
    }
}

impl From<walkdir::Error> for CinecatError {
    fn from(e: walkdir::Error) -> Self {
        CinecatError::IoError(e.into())
    }
}
