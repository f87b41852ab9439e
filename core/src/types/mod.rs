//! Core type definitions for series conversion
//!
//! This module provides the value types shared by the series engine and the CLI:
//! - [`ImageType`]: Decomposed DICOM ImageType field
//! - [`Window`], [`WindowingMode`], [`Windowing`]: Display windowing requests and results
//! - [`FrameRange`]: 1-based inclusive frame selection
//! - [`OutputFormat`]: Output container chosen by file extension

mod frame_range;
mod image_type;
mod output_format;
mod windowing;

pub use frame_range::FrameRange;
pub use image_type::{ImageType, PHASE_IMAGE_TYPES};
pub use output_format::{OutputFormat, SUPPORTED_EXTENSIONS};
pub use windowing::{Window, Windowing, WindowingMode};
