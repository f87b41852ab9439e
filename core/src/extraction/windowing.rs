use log::debug;

use super::accessor::Field;
use super::strategy::{attempt, first_resolved, Step};
use crate::error::{CinecatError, Result};
use crate::series::Series;
use crate::types::{Window, Windowing, WindowingMode};

/// Sources of a DICOM display window, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSource {
    /// Full unsigned range of a phase or velocity image
    PhaseRange,
    /// Top-level WindowCenter/WindowWidth of every dataset
    Legacy,
    /// FrameVOILUTSequence of every frame of an enhanced object
    PerFrame,
}

/// Strategy order for [`WindowingMode::Dicom`]
///
/// Phase images come first: their stored windows describe a magnitude
/// display.
pub const WINDOW_SOURCES: [WindowSource; 3] = [
    WindowSource::PhaseRange,
    WindowSource::Legacy,
    WindowSource::PerFrame,
];

/// Resolves the display window for a series
///
/// # Algorithm
///
/// 1. An explicit window is returned unchanged
/// 2. `Full` yields [`Windowing::FullRange`]
/// 3. `Dicom` tries [`WINDOW_SOURCES`] in order and yields
///    [`Windowing::Unresolved`] when none applies
pub fn resolve_windowing(series: &Series, mode: WindowingMode) -> Result<Windowing> {
    match mode {
        WindowingMode::Explicit(window) => Ok(Windowing::Window(window)),
        WindowingMode::Full => Ok(Windowing::FullRange),
        WindowingMode::Dicom => {
            let resolved = first_resolved(&WINDOW_SOURCES, |source| window_from(series, source))?;
            Ok(match resolved {
                Some((source, window)) => {
                    debug!("Window {} from {:?}", window, source);
                    Windowing::Window(window)
                }
                None => Windowing::Unresolved,
            })
        }
    }
}

fn window_from(series: &Series, source: WindowSource) -> Result<Step<Window>> {
    match source {
        WindowSource::PhaseRange => {
            if !is_phase(series)? {
                return Ok(Step::Next);
            }
            let bits = series.bits_stored()?;
            let width = 2f64.powi(i32::from(bits));
            Ok(Step::Resolved(Window::new(width / 2.0, width)))
        }
        WindowSource::Legacy => mean_window(series, Field::WindowCenter, Field::WindowWidth),
        WindowSource::PerFrame => {
            mean_window(series, Field::FrameWindowCenter, Field::FrameWindowWidth)
        }
    }
}

/// Classifies a series as a phase (or velocity) image
///
/// ComplexImageComponent decides when it is present and uniform; otherwise
/// ImageType must name P, PHASE or VELOCITY. The Phase Contrast flag is not
/// consulted since magnitude images of a flow study carry it too.
pub fn is_phase(series: &Series) -> Result<bool> {
    if let Step::Resolved(component) = attempt(series.complex_image_component())? {
        return Ok(component == "PHASE");
    }
    if let Step::Resolved(image_type) = attempt(series.image_type())? {
        return Ok(image_type.is_phase());
    }
    Ok(false)
}

fn mean_window(series: &Series, center: Field, width: Field) -> Result<Step<Window>> {
    let centers = match attempt(flattened_numbers(series, center))? {
        Step::Resolved(values) => values,
        Step::Next => return Ok(Step::Next),
    };
    let widths = match attempt(flattened_numbers(series, width))? {
        Step::Resolved(values) => values,
        Step::Next => return Ok(Step::Next),
    };

    match (mean(&centers), mean(&widths)) {
        (Some(c), Some(w)) => Ok(Step::Resolved(Window::new(c.round(), w.round()))),
        _ => Ok(Step::Next),
    }
}

fn flattened_numbers(series: &Series, field: Field) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for value in series.all_values(field)? {
        out.extend(value.numbers()?);
    }
    Ok(out)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Convenience for reports: the DICOM window if one resolves
pub fn dicom_window(series: &Series) -> Result<Option<Window>> {
    match resolve_windowing(series, WindowingMode::Dicom) {
        Ok(windowing) => Ok(windowing.window()),
        Err(e @ CinecatError::InvalidValue(_)) => {
            debug!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
