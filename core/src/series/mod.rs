//! Logical image series built from one or more DICOM datasets.

pub mod assemble;
pub mod pixels;

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

use dicom_object::{DefaultDicomObject, InMemDicomObject};
use ndarray::Array3;

use crate::error::{CinecatError, Result};
use crate::extraction::accessor::{self, Field, FieldValue};
use crate::extraction::tags::{
    get_int_value, get_string_value, ACQUISITION_DATE_TIME, INSTANCE_NUMBER,
};
use crate::types::ImageType;

pub use assemble::{read_dir, read_file};

/// One temporally ordered image series
///
/// Datasets are sorted by (AcquisitionDateTime, InstanceNumber) on
/// construction. Fields read through [`Series::common_value`] must be
/// identical in every dataset and are memoized per [`Field`].
#[derive(Debug)]
pub struct Series {
    datasets: Vec<DefaultDicomObject>,
    series_instance_uid: String,
    cache: RefCell<HashMap<Field, FieldValue>>,
}

impl Series {
    /// Creates a series from datasets already known to share a SeriesInstanceUID
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `datasets` is empty
    /// - SeriesInstanceUID or SamplesPerPixel is missing or differs between datasets
    /// - SamplesPerPixel is not 1
    pub fn new(mut datasets: Vec<DefaultDicomObject>) -> Result<Self> {
        if datasets.is_empty() {
            return Err(CinecatError::InvalidInput(
                "a series needs at least one dataset".to_string(),
            ));
        }

        // stable, so ties keep their input order
        datasets.sort_by(|a, b| compare_acquisition(a, b));

        let mut series = Self {
            datasets,
            series_instance_uid: String::new(),
            cache: RefCell::new(HashMap::new()),
        };
        series.series_instance_uid = series
            .common_value(Field::SeriesInstanceUid)?
            .first_string()
            .unwrap_or_default();

        let samples_per_pixel = series.samples_per_pixel()?;
        if samples_per_pixel != 1 {
            return Err(CinecatError::UnsupportedSamplesPerPixel(samples_per_pixel));
        }

        Ok(series)
    }

    /// Datasets in temporal order
    pub fn datasets(&self) -> &[DefaultDicomObject] {
        &self.datasets
    }

    /// Number of constituent datasets
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Always false; a series holds at least one dataset
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    fn objects(&self) -> impl Iterator<Item = &InMemDicomObject> {
        self.datasets.iter().map(|d| &**d)
    }

    /// Value of `field` shared by every dataset
    ///
    /// # Errors
    ///
    /// [`CinecatError::MissingTag`] if a dataset lacks the field,
    /// [`CinecatError::InconsistentTag`] if datasets disagree.
    pub fn common_value(&self, field: Field) -> Result<FieldValue> {
        if let Some(value) = self.cache.borrow().get(&field) {
            return Ok(value.clone());
        }
        let value = accessor::common_value(self.objects(), field)?;
        self.cache.borrow_mut().insert(field, value.clone());
        Ok(value)
    }

    /// Value of `field` in every dataset, in series order
    pub fn all_values(&self, field: Field) -> Result<Vec<FieldValue>> {
        accessor::all_values(self.objects(), field)
    }

    /// SeriesInstanceUID shared by all datasets
    pub fn series_instance_uid(&self) -> &str {
        &self.series_instance_uid
    }

    /// SOPClassUID shared by all datasets
    pub fn sop_class_uid(&self) -> Result<String> {
        let field = Field::SopClassUid;
        self.common_value(field)?
            .first_string()
            .ok_or_else(|| CinecatError::InvalidValue(format!("{} is empty", field)))
    }

    pub fn samples_per_pixel(&self) -> Result<u16> {
        self.common_u16(Field::SamplesPerPixel)
    }

    pub fn rows(&self) -> Result<u16> {
        self.common_u16(Field::Rows)
    }

    pub fn columns(&self) -> Result<u16> {
        self.common_u16(Field::Columns)
    }

    pub fn bits_stored(&self) -> Result<u16> {
        self.common_u16(Field::BitsStored)
    }

    /// Decomposed ImageType shared by all datasets
    pub fn image_type(&self) -> Result<ImageType> {
        let values = self.common_value(Field::ImageType)?.strings();
        Ok(ImageType::from_values(&values))
    }

    /// ComplexImageComponent shared by all datasets (e.g. "MAGNITUDE", "PHASE")
    pub fn complex_image_component(&self) -> Result<String> {
        let field = Field::ComplexImageComponent;
        self.common_value(field)?
            .first_string()
            .ok_or_else(|| CinecatError::InvalidValue(format!("{} is empty", field)))
    }

    fn common_u16(&self, field: Field) -> Result<u16> {
        let value = self.common_value(field)?.to_int()?;
        u16::try_from(value).map_err(|_| {
            CinecatError::InvalidValue(format!("{} out of range: {}", field, value))
        })
    }

    /// Decoded frames of every dataset, stacked in series order
    ///
    /// The stack is recomputed on every call.
    pub fn pixel_array(&self) -> Result<Array3<f64>> {
        let rows = usize::from(self.rows()?);
        let columns = usize::from(self.columns()?);
        let arrays = self
            .datasets
            .iter()
            .map(pixels::decode_frames)
            .collect::<Result<Vec<_>>>()?;
        pixels::stack_frames(arrays, rows, columns)
    }
}

/// Orders datasets by AcquisitionDateTime, then InstanceNumber
///
/// Absent values sort before present ones.
fn compare_acquisition(a: &InMemDicomObject, b: &InMemDicomObject) -> Ordering {
    let key = |dcm: &InMemDicomObject| {
        (
            get_string_value(dcm, ACQUISITION_DATE_TIME),
            get_int_value(dcm, INSTANCE_NUMBER),
        )
    };
    key(a).cmp(&key(b))
}
