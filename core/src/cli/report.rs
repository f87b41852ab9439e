use crate::api::SeriesSummary;
use std::fmt;

const UNKNOWN: &str = "unknown";

/// Text report formatter for series summaries
pub struct TextReport<'a> {
    summary: &'a SeriesSummary,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(summary: &'a SeriesSummary) -> Self {
        Self { summary }
    }
}

fn or_unknown<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        writeln!(f, "Series {}", s.path.display())?;
        writeln!(f, "{}", "=".repeat(7 + s.path.display().to_string().len()))?;
        writeln!(f)?;
        writeln!(f, "Series UID:     {}", s.series_instance_uid)?;
        writeln!(f, "SOP Class UID:  {}", or_unknown(&s.sop_class_uid))?;
        writeln!(f, "Datasets:       {}", s.datasets)?;
        writeln!(f, "Frames:         {}", s.frames)?;
        writeln!(
            f,
            "Size:           {} x {}",
            or_unknown(&s.columns),
            or_unknown(&s.rows)
        )?;
        writeln!(f, "Bits Stored:    {}", or_unknown(&s.bits_stored))?;
        writeln!(f, "Image Type:     {}", or_unknown(&s.image_type))?;
        writeln!(f, "Phase:          {}", or_unknown(&s.is_phase))?;
        writeln!(f, "Window:         {}", or_unknown(&s.window))?;
        writeln!(
            f,
            "Frame Duration: {}",
            s.frame_duration_ms
                .map(|ms| format!("{} ms", ms))
                .unwrap_or_else(|| UNKNOWN.to_string())
        )?;

        Ok(())
    }
}
