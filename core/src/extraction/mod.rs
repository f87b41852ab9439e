pub mod accessor;
pub mod strategy;
pub mod tags;
pub mod timing;
pub mod windowing;

pub use accessor::{Field, FieldValue};
pub use strategy::Step;
pub use timing::{
    frame_duration, frame_duration_or_default, DEFAULT_FRAME_DURATION_MS, MAX_FRAME_DURATION_MS,
};
pub use windowing::{dicom_window, is_phase, resolve_windowing};
