use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{CinecatError, Result};

/// Inclusive, 1-based range of frames to keep
///
/// Either bound may be open: `start` defaults to the first frame and `end`
/// to the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl FrameRange {
    /// Creates a new FrameRange
    pub fn new(start: Option<usize>, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Resolves the range against a stack of `num_frames` frames
    ///
    /// Returns the zero-based, half-open index range of the selected frames.
    ///
    /// # Errors
    ///
    /// Returns [`CinecatError::FrameRange`] if the range is empty or reaches
    /// outside `1..=num_frames`.
    pub fn select(&self, num_frames: usize) -> Result<Range<usize>> {
        let start = self.start.unwrap_or(1);
        let end = self.end.unwrap_or(num_frames);

        if start == 0 {
            return Err(CinecatError::FrameRange(
                "frame numbers are 1-based, got 0".to_string(),
            ));
        }
        if start > end {
            return Err(CinecatError::FrameRange(format!(
                "start frame {} is after end frame {}",
                start, end
            )));
        }
        if end > num_frames {
            return Err(CinecatError::FrameRange(format!(
                "frames {} requested but the series has {} frames",
                self, num_frames
            )));
        }

        Ok(start - 1..end)
    }
}

impl FromStr for FrameRange {
    type Err = CinecatError;

    /// Parses `N`, `A-B`, `A-` or `-B`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"^\s*(?:(\d+)|(\d*)\s*-\s*(\d*))\s*$").expect("Failed to compile regex")
        });

        let invalid = || {
            CinecatError::InvalidArgument(format!(
                "frame range must be a number or range like '10-20', got '{}'",
                s
            ))
        };
        let caps = re.captures(s).ok_or_else(invalid)?;
        let number = |idx: usize| -> std::result::Result<Option<usize>, CinecatError> {
            match caps.get(idx).map(|m| m.as_str()).filter(|m| !m.is_empty()) {
                Some(m) => m.parse().map(Some).map_err(|_| invalid()),
                None => Ok(None),
            }
        };

        if let Some(single) = number(1)? {
            return Ok(FrameRange::new(Some(single), Some(single)));
        }
        Ok(FrameRange::new(number(2)?, number(3)?))
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(a), Some(b)) if a == b => write!(f, "{}", a),
            (a, b) => {
                if let Some(a) = a {
                    write!(f, "{}", a)?;
                }
                write!(f, "-")?;
                if let Some(b) = b {
                    write!(f, "{}", b)?;
                }
                Ok(())
            }
        }
    }
}
