use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use log::info;
use ndarray::{Array3, ArrayView2, Axis};
use tiff::encoder::{colortype, TiffEncoder};

use crate::error::{CinecatError, Result};
use crate::types::OutputFormat;

/// Writes 8-bit frames to `path` in the format named by its extension
///
/// GIF and APNG outputs loop forever and show each frame for `duration_ms`;
/// TIFF outputs hold one page per frame.
///
/// # Errors
///
/// - [`CinecatError::UnsupportedFormat`] for an unknown extension
/// - [`CinecatError::InvalidArgument`] for an empty stack, a zero duration or
///   an APNG duration above `u16::MAX` ms
/// - encoder and I/O errors
pub fn write_frames(frames: &Array3<u8>, path: &Path, duration_ms: u32) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    let (count, rows, columns) = frames.dim();
    if count == 0 {
        return Err(CinecatError::InvalidArgument("no frames to write".to_string()));
    }
    if duration_ms == 0 {
        return Err(CinecatError::InvalidArgument(
            "frame duration must be positive".to_string(),
        ));
    }
    let width = dimension(columns)?;
    let height = dimension(rows)?;

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Gif => write_gif(&mut writer, frames, width, height, duration_ms)?,
        OutputFormat::Apng => write_apng(&mut writer, frames, width, height, duration_ms)?,
        OutputFormat::Tiff => write_tiff(&mut writer, frames, width, height)?,
    }
    writer.flush()?;

    info!(
        "Wrote {} frames of {}x{} to {} ({})",
        count,
        width,
        height,
        path.display(),
        format
    );
    Ok(())
}

fn dimension(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| CinecatError::InvalidArgument(format!("image dimension {} too large", len)))
}

/// Row-major bytes of one frame
fn frame_bytes(frame: ArrayView2<u8>) -> Vec<u8> {
    frame.iter().copied().collect()
}

fn write_gif<W: Write>(
    writer: W,
    frames: &Array3<u8>,
    width: u32,
    height: u32,
    duration_ms: u32,
) -> Result<()> {
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;
    for frame in frames.axis_iter(Axis(0)) {
        let rgba = RgbaImage::from_fn(width, height, |x, y| {
            let v = frame[[y as usize, x as usize]];
            Rgba([v, v, v, 255])
        });
        let delay = Delay::from_numer_denom_ms(duration_ms, 1);
        encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
    }
    Ok(())
}

fn write_apng<W: Write>(
    writer: W,
    frames: &Array3<u8>,
    width: u32,
    height: u32,
    duration_ms: u32,
) -> Result<()> {
    let delay = u16::try_from(duration_ms).map_err(|_| {
        CinecatError::InvalidArgument(format!(
            "APNG frame duration must not exceed {} ms, got {}",
            u16::MAX,
            duration_ms
        ))
    })?;
    let count = u32::try_from(frames.dim().0)
        .map_err(|_| CinecatError::InvalidArgument("too many frames".to_string()))?;

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    // zero plays forever
    encoder.set_animated(count, 0)?;
    encoder.set_frame_delay(delay, 1000)?;

    let mut png_writer = encoder.write_header()?;
    for frame in frames.axis_iter(Axis(0)) {
        png_writer.write_image_data(&frame_bytes(frame))?;
    }
    png_writer.finish()?;
    Ok(())
}

fn write_tiff<W: Write + std::io::Seek>(
    writer: W,
    frames: &Array3<u8>,
    width: u32,
    height: u32,
) -> Result<()> {
    let mut encoder = TiffEncoder::new(writer)?;
    for frame in frames.axis_iter(Axis(0)) {
        encoder.write_image::<colortype::Gray8>(width, height, &frame_bytes(frame))?;
    }
    Ok(())
}
