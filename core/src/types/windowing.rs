use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::CinecatError;

/// Display window (center, width) over raw sample intensities
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Window {
    pub center: f64,
    pub width: f64,
}

impl Window {
    /// Creates a new Window
    pub fn new(center: f64, width: f64) -> Self {
        Self { center, width }
    }

    /// Lower bound of the displayed range
    pub fn lower(&self) -> f64 {
        self.center - self.width / 2.0
    }

    /// Upper bound of the displayed range
    pub fn upper(&self) -> f64 {
        self.center + self.width / 2.0
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "center={} width={}", self.center, self.width)
    }
}

/// How the caller wants the display window chosen
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WindowingMode {
    /// Resolve from DICOM metadata
    #[default]
    Dicom,
    /// Use the full dynamic range of the data
    Full,
    /// Use the given window as is
    Explicit(Window),
}

impl FromStr for WindowingMode {
    type Err = CinecatError;

    /// Parses `dicom`, `full` or `CENTER,WIDTH`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"^\s*([-+]?\d+(?:\.\d+)?)\s*,\s*([-+]?\d+(?:\.\d+)?)\s*$")
                .expect("Failed to compile regex")
        });

        match s.trim().to_lowercase().as_str() {
            "dicom" => return Ok(WindowingMode::Dicom),
            "full" => return Ok(WindowingMode::Full),
            _ => {}
        }

        let invalid = || {
            CinecatError::InvalidArgument(format!(
                "windowing must be 'dicom', 'full', or two comma-separated numbers, got '{}'",
                s
            ))
        };
        let caps = re.captures(s).ok_or_else(invalid)?;
        let center: f64 = caps[1].parse().map_err(|_| invalid())?;
        let width: f64 = caps[2].parse().map_err(|_| invalid())?;
        if width <= 0.0 {
            return Err(CinecatError::InvalidArgument(format!(
                "window width must be positive, got {}",
                width
            )));
        }
        Ok(WindowingMode::Explicit(Window::new(center, width)))
    }
}

impl fmt::Display for WindowingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowingMode::Dicom => write!(f, "dicom"),
            WindowingMode::Full => write!(f, "full"),
            WindowingMode::Explicit(w) => write!(f, "{},{}", w.center, w.width),
        }
    }
}

/// Outcome of windowing resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Windowing {
    /// Clip to this window before normalizing
    Window(Window),
    /// Normalize over the data's own range
    FullRange,
    /// Metadata carried no usable window
    Unresolved,
}

impl Windowing {
    /// Window to clip with, if any
    pub fn window(&self) -> Option<Window> {
        match self {
            Windowing::Window(w) => Some(*w),
            Windowing::FullRange | Windowing::Unresolved => None,
        }
    }
}
