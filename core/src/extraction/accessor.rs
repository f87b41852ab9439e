//! Typed access to metadata fields spread over one or more datasets.
//!
//! Every field the converter reads is a [`Field`] variant with a fixed tag
//! path. Paths longer than one tag descend into sequences: every item of the
//! sequence is visited and the leaf values are flattened into one list per
//! top-level dataset.

use std::fmt;

use dicom_core::value::PrimitiveValue;
use dicom_core::Tag;
use dicom_object::InMemDicomObject;

use super::tags::{
    describe_path, ACQUISITION_DATE_TIME, BITS_STORED, CARDIAC_SYNCHRONIZATION_SEQUENCE, COLUMNS,
    COMPLEX_IMAGE_COMPONENT, FRAME_VOI_LUT_SEQUENCE, IMAGE_TYPE, INSTANCE_NUMBER,
    NOMINAL_CARDIAC_TRIGGER_DELAY_TIME, PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, ROWS,
    SAMPLES_PER_PIXEL, SERIES_INSTANCE_UID, SOP_CLASS_UID, TRIGGER_TIME, WINDOW_CENTER,
    WINDOW_WIDTH,
};
use crate::error::{CinecatError, Result};

/// Metadata fields known to the series engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    SeriesInstanceUid,
    SopClassUid,
    SamplesPerPixel,
    Rows,
    Columns,
    BitsStored,
    ImageType,
    ComplexImageComponent,
    WindowCenter,
    WindowWidth,
    /// Window center of every frame of an enhanced object
    FrameWindowCenter,
    /// Window width of every frame of an enhanced object
    FrameWindowWidth,
    TriggerTime,
    /// Cardiac trigger delay of every frame of an enhanced object
    NominalCardiacTriggerDelayTime,
    AcquisitionDateTime,
    InstanceNumber,
}

impl Field {
    /// Tag path from the top-level dataset down to the leaf element
    pub fn path(self) -> &'static [Tag] {
        match self {
            Field::SeriesInstanceUid => &[SERIES_INSTANCE_UID],
            Field::SopClassUid => &[SOP_CLASS_UID],
            Field::SamplesPerPixel => &[SAMPLES_PER_PIXEL],
            Field::Rows => &[ROWS],
            Field::Columns => &[COLUMNS],
            Field::BitsStored => &[BITS_STORED],
            Field::ImageType => &[IMAGE_TYPE],
            Field::ComplexImageComponent => &[COMPLEX_IMAGE_COMPONENT],
            Field::WindowCenter => &[WINDOW_CENTER],
            Field::WindowWidth => &[WINDOW_WIDTH],
            Field::FrameWindowCenter => &[
                PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
                FRAME_VOI_LUT_SEQUENCE,
                WINDOW_CENTER,
            ],
            Field::FrameWindowWidth => &[
                PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
                FRAME_VOI_LUT_SEQUENCE,
                WINDOW_WIDTH,
            ],
            Field::TriggerTime => &[TRIGGER_TIME],
            Field::NominalCardiacTriggerDelayTime => &[
                PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
                CARDIAC_SYNCHRONIZATION_SEQUENCE,
                NOMINAL_CARDIAC_TRIGGER_DELAY_TIME,
            ],
            Field::AcquisitionDateTime => &[ACQUISITION_DATE_TIME],
            Field::InstanceNumber => &[INSTANCE_NUMBER],
        }
    }

    /// Whether the field holds numbers rather than text
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            Field::SeriesInstanceUid
                | Field::SopClassUid
                | Field::ImageType
                | Field::ComplexImageComponent
                | Field::AcquisitionDateTime
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", describe_path(self.path()))
    }
}

/// Value of a field in one top-level dataset
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Element found directly in the dataset
    Single(PrimitiveValue),
    /// Leaf values collected from every item of a nested sequence path
    Flattened(Vec<PrimitiveValue>),
}

impl FieldValue {
    fn primitives(&self) -> &[PrimitiveValue] {
        match self {
            FieldValue::Single(value) => std::slice::from_ref(value),
            FieldValue::Flattened(values) => values,
        }
    }

    /// All values rendered as trimmed strings
    pub fn strings(&self) -> Vec<String> {
        self.primitives()
            .iter()
            .flat_map(|value| value.to_multi_str().into_owned())
            .map(|s| s.trim_end_matches('\0').trim().to_string())
            .collect()
    }

    /// First value as a trimmed string
    pub fn first_string(&self) -> Option<String> {
        self.strings().into_iter().next()
    }

    /// All values converted to floating point
    pub fn numbers(&self) -> Result<Vec<f64>> {
        let mut out = Vec::new();
        for value in self.primitives() {
            out.extend(value.to_multi_float64()?);
        }
        Ok(out)
    }

    /// First value converted to an integer
    pub fn to_int(&self) -> Result<i64> {
        let first = self
            .primitives()
            .first()
            .ok_or_else(|| CinecatError::InvalidValue("empty value".to_string()))?;
        Ok(first.to_int::<i64>()?)
    }

    /// Whether two datasets agree on their value of `field`
    ///
    /// Numeric fields compare by value, so DS "40" matches "40.0" and IS "1"
    /// matches "01". Everything else compares by trimmed strings.
    pub fn agrees_with(&self, other: &FieldValue, field: Field) -> bool {
        let same_shape = matches!(
            (self, other),
            (FieldValue::Single(_), FieldValue::Single(_))
                | (FieldValue::Flattened(_), FieldValue::Flattened(_))
        );
        if !same_shape {
            return false;
        }
        if field.is_numeric() {
            if let (Ok(a), Ok(b)) = (self.numbers(), other.numbers()) {
                return a == b;
            }
        }
        self.strings() == other.strings()
    }
}

/// Collects one value of `field` per dataset, without checking consistency
pub fn all_values<'a, I>(datasets: I, field: Field) -> Result<Vec<FieldValue>>
where
    I: IntoIterator<Item = &'a InMemDicomObject>,
{
    datasets
        .into_iter()
        .map(|dcm| value_in(dcm, field.path(), field))
        .collect()
}

/// Collects `field` and requires every dataset to agree on it
pub fn common_value<'a, I>(datasets: I, field: Field) -> Result<FieldValue>
where
    I: IntoIterator<Item = &'a InMemDicomObject>,
{
    let mut values = all_values(datasets, field)?.into_iter();
    let first = values
        .next()
        .ok_or_else(|| CinecatError::MissingTag(field.to_string()))?;
    if values.any(|v| !v.agrees_with(&first, field)) {
        return Err(CinecatError::InconsistentTag(field.to_string()));
    }
    Ok(first)
}

fn value_in(dcm: &InMemDicomObject, path: &[Tag], field: Field) -> Result<FieldValue> {
    if path.len() > 1 {
        let mut leaves = Vec::new();
        collect_leaves(dcm, path, field, &mut leaves)?;
        return Ok(FieldValue::Flattened(leaves));
    }

    let (tag, _) = split_path(path, field)?;
    let elem = dcm
        .element(tag)
        .map_err(|_| CinecatError::MissingTag(field.to_string()))?;
    match elem.value().primitive() {
        Some(value) if is_blank(value) => Err(CinecatError::MissingTag(field.to_string())),
        Some(value) => Ok(FieldValue::Single(value.clone())),
        None => Err(CinecatError::InvalidValue(format!(
            "{} is a sequence, not a value",
            field
        ))),
    }
}

fn collect_leaves(
    dcm: &InMemDicomObject,
    path: &[Tag],
    field: Field,
    out: &mut Vec<PrimitiveValue>,
) -> Result<()> {
    let (tag, rest) = split_path(path, field)?;
    let elem = dcm
        .element(tag)
        .map_err(|_| CinecatError::MissingTag(field.to_string()))?;

    if !rest.is_empty() {
        if let Some(items) = elem.items() {
            for item in items {
                collect_leaves(item, rest, field, out)?;
            }
            return Ok(());
        }
    }

    match elem.value().primitive() {
        Some(value) if is_blank(value) => Err(CinecatError::MissingTag(field.to_string())),
        Some(value) => {
            out.push(value.clone());
            Ok(())
        }
        None => Err(CinecatError::InvalidValue(format!(
            "{} is a sequence, not a value",
            field
        ))),
    }
}

/// Zero-length elements and all-blank strings count as absent.
fn is_blank(value: &PrimitiveValue) -> bool {
    match value {
        PrimitiveValue::Empty => true,
        PrimitiveValue::Str(_) | PrimitiveValue::Strs(_) => value
            .to_multi_str()
            .iter()
            .all(|s| s.trim_end_matches('\0').trim().is_empty()),
        _ => false,
    }
}

fn split_path(path: &[Tag], field: Field) -> Result<(Tag, &[Tag])> {
    path.split_first()
        .map(|(tag, rest)| (*tag, rest))
        .ok_or_else(|| CinecatError::MissingTag(field.to_string()))
}
