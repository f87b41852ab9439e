use std::fmt;

/// ImageType values that mark a phase or velocity reconstruction
pub const PHASE_IMAGE_TYPES: [&str; 3] = ["P", "PHASE", "VELOCITY"];

/// DICOM ImageType field decomposed into its components
///
/// The ImageType field contains information about:
/// - `pixels`: First element (e.g., "ORIGINAL", "DERIVED")
/// - `exam`: Second element (e.g., "PRIMARY", "SECONDARY")
/// - `flavor`: Third element (optional, e.g. "M", "P", "VELOCITY")
/// - `extras`: Additional elements beyond the first three
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ImageType {
    pub pixels: String,
    pub exam: String,
    pub flavor: Option<String>,
    pub extras: Option<Vec<String>>,
}

impl ImageType {
    /// Creates a new ImageType
    pub fn new(
        pixels: String,
        exam: String,
        flavor: Option<String>,
        extras: Option<Vec<String>>,
    ) -> Self {
        Self {
            pixels,
            exam,
            flavor,
            extras,
        }
    }

    /// Builds an ImageType from the multi-valued element
    pub fn from_values(values: &[String]) -> Self {
        let pixels = values.first().cloned().unwrap_or_default();
        let exam = values.get(1).cloned().unwrap_or_default();
        let flavor = values.get(2).cloned();
        let extras = if values.len() > 3 {
            Some(values[3..].to_vec())
        } else {
            None
        };

        ImageType::new(pixels, exam, flavor, extras)
    }

    /// Returns a simple string representation
    ///
    /// Format: "pixels|exam|flavor|extra1|extra2|..."
    /// Empty flavor is represented as ''
    pub fn simple_repr(&self) -> String {
        let mut parts = vec![self.pixels.clone(), self.exam.clone()];

        if let Some(ref flavor) = self.flavor {
            parts.push(if flavor.is_empty() {
                "''".to_string()
            } else {
                flavor.clone()
            });
        }

        if let Some(ref extras) = self.extras {
            parts.extend(extras.iter().filter(|e| !e.is_empty()).cloned());
        }

        parts.join("|")
    }

    /// Checks if the image type contains a specific value
    pub fn contains(&self, val: &str) -> bool {
        self.pixels == val
            || self.exam == val
            || self.flavor.as_ref().is_some_and(|f| f == val)
            || self
                .extras
                .as_ref()
                .is_some_and(|e| e.iter().any(|x| x == val))
    }

    /// Whether any component names a phase or velocity image
    pub fn is_phase(&self) -> bool {
        PHASE_IMAGE_TYPES.iter().any(|t| self.contains(t))
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_repr())
    }
}
