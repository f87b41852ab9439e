use chrono::{NaiveDateTime, NaiveTime};
use log::{debug, warn};

use super::accessor::Field;
use super::strategy::{attempt, first_resolved, Step};
use crate::error::{CinecatError, Result};
use crate::series::Series;

/// Frame duration used when none can be determined
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

/// Longest frame duration accepted from metadata
pub const MAX_FRAME_DURATION_MS: u32 = 10_000;

/// Sources of per-frame timestamps, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    /// Legacy cine: TriggerTime of every dataset
    TriggerTime,
    /// Enhanced cine: per-frame NominalCardiacTriggerDelayTime of the first dataset
    CardiacTriggerDelay,
    /// AcquisitionDateTime of every dataset
    AcquisitionDateTime,
}

pub const TIMESTAMP_SOURCES: [TimestampSource; 3] = [
    TimestampSource::TriggerTime,
    TimestampSource::CardiacTriggerDelay,
    TimestampSource::AcquisitionDateTime,
];

/// Determines the frame duration of a series in milliseconds
///
/// Timestamps come from the first source in [`TIMESTAMP_SOURCES`] present
/// in the series. The duration is the mean of the positive differences
/// between consecutive timestamps, rounded to a multiple of 10 ms.
///
/// # Errors
///
/// [`CinecatError::TimingUnavailable`] if no source is present or the
/// timestamps yield no positive difference.
pub fn frame_duration(series: &Series) -> Result<u32> {
    let (source, stamps) = first_resolved(&TIMESTAMP_SOURCES, |source| {
        timestamps_from(series, source)
    })?
    .ok_or_else(|| {
        CinecatError::TimingUnavailable("no timestamp information found".to_string())
    })?;

    debug!("{} timestamps from {:?}", stamps.len(), source);
    mean_frame_interval(&stamps)
}

/// [`frame_duration`] with the fallback policy applied
///
/// Unresolvable, non-positive or implausibly long durations are replaced by
/// [`DEFAULT_FRAME_DURATION_MS`] with a warning.
pub fn frame_duration_or_default(series: &Series) -> u32 {
    match frame_duration(series) {
        Ok(ms) if ms > 0 && ms <= MAX_FRAME_DURATION_MS => ms,
        Ok(ms) => {
            warn!(
                "Determined frame duration {} ms is out of range. Using {} ms instead.",
                ms, DEFAULT_FRAME_DURATION_MS
            );
            DEFAULT_FRAME_DURATION_MS
        }
        Err(e) => {
            warn!(
                "Frame duration could not be determined from DICOM data ({}). Using {} ms instead.",
                e, DEFAULT_FRAME_DURATION_MS
            );
            DEFAULT_FRAME_DURATION_MS
        }
    }
}

/// Mean positive step between consecutive timestamps, rounded to 10 ms
pub fn mean_frame_interval(stamps: &[f64]) -> Result<u32> {
    if stamps.len() < 2 {
        return Err(CinecatError::TimingUnavailable(
            "not enough timestamps to determine duration".to_string(),
        ));
    }

    let deltas: Vec<f64> = stamps
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .collect();
    if deltas.is_empty() {
        return Err(CinecatError::TimingUnavailable(
            "no positive timestamp differences".to_string(),
        ));
    }

    let mean = deltas.iter().sum::<f64>() / deltas.len() as f64;
    Ok(((mean / 10.0).round() * 10.0) as u32)
}

fn timestamps_from(series: &Series, source: TimestampSource) -> Result<Step<Vec<f64>>> {
    match source {
        TimestampSource::TriggerTime => attempt(trigger_times(series)),
        TimestampSource::CardiacTriggerDelay => attempt(cardiac_trigger_delays(series)),
        TimestampSource::AcquisitionDateTime => attempt(acquisition_offsets(series)),
    }
}

fn trigger_times(series: &Series) -> Result<Vec<f64>> {
    series
        .all_values(Field::TriggerTime)?
        .iter()
        .map(|value| {
            value.numbers()?.first().copied().ok_or_else(|| {
                CinecatError::InvalidValue(format!("empty {}", Field::TriggerTime))
            })
        })
        .collect()
}

/// Enhanced cine objects of one series share a delay schedule, so the first
/// dataset is representative.
fn cardiac_trigger_delays(series: &Series) -> Result<Vec<f64>> {
    let values = series.all_values(Field::NominalCardiacTriggerDelayTime)?;
    match values.first() {
        Some(first) => first.numbers(),
        None => Ok(Vec::new()),
    }
}

/// Milliseconds since midnight of the first dataset's acquisition date
fn acquisition_offsets(series: &Series) -> Result<Vec<f64>> {
    let stamps = series
        .all_values(Field::AcquisitionDateTime)?
        .iter()
        .map(|value| {
            let text = value.first_string().unwrap_or_default();
            parse_date_time(&text)
        })
        .collect::<Result<Vec<_>>>()?;

    let Some(first) = stamps.first() else {
        return Ok(Vec::new());
    };
    let midnight = first.date().and_time(NaiveTime::MIN);
    Ok(stamps
        .iter()
        .map(|t| {
            let elapsed = *t - midnight;
            elapsed
                .num_microseconds()
                .map(|us| us as f64 / 1000.0)
                .unwrap_or(elapsed.num_milliseconds() as f64)
        })
        .collect())
}

/// Parses a DICOM DT value (`YYYYMMDDHHMMSS[.FFFFFF]`)
pub fn parse_date_time(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y%m%d%H%M%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y%m%d%H%M%S"))
        .map_err(|e| {
            CinecatError::InvalidValue(format!("AcquisitionDateTime '{}': {}", text, e))
        })
}
