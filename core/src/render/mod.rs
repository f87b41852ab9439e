//! Turning a raw pixel stack into 8-bit display frames.

pub mod encode;

use log::debug;
use ndarray::{s, Array3};

use crate::error::Result;
use crate::types::{FrameRange, Window};

pub use encode::write_frames;

/// Clips every sample to the window's `[lower, upper]` interval
///
/// A zero or negative width collapses everything onto one value instead of
/// panicking.
pub fn apply_windowing(stack: &Array3<f64>, window: Window) -> Array3<f64> {
    let (lower, upper) = (window.lower(), window.upper());
    stack.mapv(|x| x.max(lower).min(upper))
}

/// Linearly maps the stack's value range onto 0..=255
///
/// Scaled values are truncated toward zero. A stack with a single distinct
/// value maps to all zeros.
pub fn normalize(stack: &Array3<f64>) -> Array3<u8> {
    let min = stack.iter().copied().fold(f64::INFINITY, f64::min);
    let max = stack.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range.is_nan() || range <= 0.0 {
        return Array3::zeros(stack.raw_dim());
    }
    stack.mapv(|x| ((x - min) / range * 255.0) as u8)
}

/// Windowing (if any) followed by normalization
pub fn render(stack: &Array3<f64>, window: Option<Window>) -> Array3<u8> {
    match window {
        Some(window) => {
            debug!("Applying window {}", window);
            normalize(&apply_windowing(stack, window))
        }
        None => normalize(stack),
    }
}

/// Keeps the frames named by `range`, or the whole stack for `None`
pub fn select_frames(stack: Array3<f64>, range: Option<FrameRange>) -> Result<Array3<f64>> {
    let Some(range) = range else {
        return Ok(stack);
    };
    let frames = range.select(stack.dim().0)?;
    debug!("Selecting frames {}..{} of {}", frames.start, frames.end, stack.dim().0);
    Ok(stack.slice_move(s![frames, .., ..]))
}
