use std::io::{Seek, Write};

use anyhow::Context;
use image::RgbaImage;
use tiff::{
    TiffResult,
    encoder::{
        Rational, TiffEncoder, colortype,
        compression::{Compression, Deflate},
    },
    tags::ResolutionUnit,
};

use crate::{
    foundation::core::Resolution,
    foundation::error::MergeResult,
    render::pipeline::Artifact,
};

/// Per-page compression for multi-page TIFF output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCompression {
    /// Lossless deflate (zlib).
    #[default]
    Deflate,
    Uncompressed,
}

/// Write every frame of `artifact` as one RGBA8 page, flattened composite first.
///
/// All pages carry the artifact's resolution in inches.
pub fn write_artifact_tiff<W: Write + Seek>(
    writer: W,
    artifact: &Artifact,
    compression: PageCompression,
) -> MergeResult<()> {
    let mut enc = TiffEncoder::new(writer).context("create tiff encoder")?;
    for (idx, frame) in artifact.frames().enumerate() {
        let res = artifact.resolution;
        let written = match compression {
            PageCompression::Deflate => write_page(&mut enc, frame, res, Deflate::default()),
            PageCompression::Uncompressed => write_page(
                &mut enc,
                frame,
                res,
                tiff::encoder::compression::Uncompressed,
            ),
        };
        written.with_context(|| format!("write tiff page {idx}"))?;
    }
    Ok(())
}

fn write_page<W: Write + Seek, D: Compression>(
    enc: &mut TiffEncoder<W>,
    frame: &RgbaImage,
    resolution: Resolution,
    compression: D,
) -> TiffResult<()> {
    let mut page = enc.new_image_with_compression::<colortype::RGBA8, D>(
        frame.width(),
        frame.height(),
        compression,
    )?;
    page.resolution_unit(ResolutionUnit::Inch);
    page.x_resolution(dpi_rational(resolution.x));
    page.y_resolution(dpi_rational(resolution.y));
    page.write_data(frame.as_raw())
}

/// Whole-number DPI is stored exactly; fractional values keep three decimals.
fn dpi_rational(dpi: f64) -> Rational {
    if !dpi.is_finite() || dpi <= 0.0 {
        return Rational {
            n: Resolution::DEFAULT_DPI as u32,
            d: 1,
        };
    }
    if dpi.fract() == 0.0 && dpi <= f64::from(u32::MAX) {
        return Rational {
            n: dpi as u32,
            d: 1,
        };
    }
    let scaled = (dpi * 1000.0).round();
    if scaled <= f64::from(u32::MAX) {
        Rational {
            n: scaled as u32,
            d: 1000,
        }
    } else {
        Rational {
            n: u32::MAX,
            d: 1,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/multipage.rs"]
mod tests;
