use dicom_object::DefaultDicomObject;
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use log::debug;
use ndarray::{concatenate, Array3, ArrayD, ArrayView3, Axis, Ix3};

use crate::error::{CinecatError, Result};
use crate::extraction::tags::{get_int_value, NUMBER_OF_FRAMES};

/// Decodes the pixel data of one dataset into raw stored values
///
/// Objects without NumberOfFrames yield a 2-D (row × column) array,
/// multi-frame objects a 3-D (frame × row × column) array.
pub fn decode_frames(dcm: &DefaultDicomObject) -> Result<ArrayD<f64>> {
    let decoded = dcm.decode_pixel_data()?;
    let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
    // frame × row × column × sample
    let samples = decoded.to_ndarray_with_options::<f64>(&options)?;
    let frames = samples.index_axis_move(Axis(3), 0);

    if get_int_value(dcm, NUMBER_OF_FRAMES).is_none() && frames.len_of(Axis(0)) == 1 {
        return Ok(frames.index_axis_move(Axis(0), 0).into_dyn());
    }
    Ok(frames.into_dyn())
}

/// Stacks per-dataset arrays into one frame × row × column array
///
/// 2-D arrays count as a single frame. Every array must end in
/// (`rows`, `columns`).
///
/// # Errors
///
/// [`CinecatError::ShapeMismatch`] for arrays that are neither 2-D nor 3-D
/// or whose trailing dimensions differ from (`rows`, `columns`).
pub fn stack_frames(arrays: Vec<ArrayD<f64>>, rows: usize, columns: usize) -> Result<Array3<f64>> {
    let mut stacks = Vec::with_capacity(arrays.len());
    for array in arrays {
        let array = match array.ndim() {
            2 => array.insert_axis(Axis(0)),
            3 => array,
            ndim => {
                return Err(CinecatError::ShapeMismatch(format!(
                    "unexpected number of dimensions in pixel array: ndim={}",
                    ndim
                )))
            }
        };
        let array = array.into_dimensionality::<Ix3>()?;
        let (_, r, c) = array.dim();
        if (r, c) != (rows, columns) {
            return Err(CinecatError::ShapeMismatch(format!(
                "{:?}, expected ({}, {}) for Rows and Columns",
                array.shape(),
                rows,
                columns
            )));
        }
        stacks.push(array);
    }

    if stacks.is_empty() {
        return Err(CinecatError::ShapeMismatch("no pixel data".to_string()));
    }

    let views: Vec<ArrayView3<f64>> = stacks.iter().map(|a| a.view()).collect();
    let stack = concatenate(Axis(0), &views)?;
    debug!("stacked {} frames of {}x{}", stack.len_of(Axis(0)), rows, columns);
    Ok(stack)
}
