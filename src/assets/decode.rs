use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use anyhow::Context;
use tiff::{
    ColorType,
    decoder::{Decoder, DecodingResult, Limits, ifd::Value},
    tags::{ResolutionUnit, Tag},
};

use crate::{
    composition::model::Part,
    foundation::core::{Resolution, Size},
    foundation::error::{MergeError, MergeResult},
};

/// Pixel layout of a source image, as reported by its header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// 3-channel, 8 bits per channel, no alpha.
    Rgb8,
    /// 3-channel, 16 bits per channel, no alpha. Reduced to 8 bits on decode.
    Rgb16,
    /// 4-channel, 8 bits per channel.
    Rgba8,
    /// Anything else, described for diagnostics.
    Other(String),
}

impl PixelLayout {
    fn from_color_type(ct: ColorType) -> Self {
        match ct {
            ColorType::RGB(8) => PixelLayout::Rgb8,
            ColorType::RGB(16) => PixelLayout::Rgb16,
            ColorType::RGBA(8) => PixelLayout::Rgba8,
            other => PixelLayout::Other(format!("{other:?}")),
        }
    }

    /// Accepted input layouts: 3-channel RGB without alpha.
    pub fn is_rgb(&self) -> bool {
        matches!(self, PixelLayout::Rgb8 | PixelLayout::Rgb16)
    }
}

/// Header-only view of a source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartHeader {
    pub size: Size,
    pub layout: PixelLayout,
}

/// Read the first image header without decoding pixel data.
pub fn probe_part<R: Read + Seek>(reader: R) -> MergeResult<PartHeader> {
    let mut dec = open_decoder(reader)?;
    let (width, height) = dec.dimensions().context("read tiff dimensions")?;
    let ct = dec.colortype().context("read tiff color type")?;
    Ok(PartHeader {
        size: Size::new(width, height),
        layout: PixelLayout::from_color_type(ct),
    })
}

/// Decode the first image into RGBA8 with opaque alpha.
///
/// 16-bit samples keep their high byte.
pub fn decode_part<R: Read + Seek>(reader: R) -> MergeResult<Part> {
    let mut dec = open_decoder(reader)?;
    let (width, height) = dec.dimensions().context("read tiff dimensions")?;
    let ct = dec.colortype().context("read tiff color type")?;
    let layout = PixelLayout::from_color_type(ct);
    if !layout.is_rgb() {
        return Err(MergeError::codec(format!(
            "expected RGB pixels, found {layout:?}"
        )));
    }

    let resolution = read_resolution(&mut dec)?;

    let rgb = match dec.read_image().context("decode tiff image")? {
        DecodingResult::U8(samples) => samples,
        DecodingResult::U16(samples) => samples.into_iter().map(|v| (v >> 8) as u8).collect(),
        _ => {
            return Err(MergeError::codec(format!(
                "{layout:?} decoded to unexpected samples"
            )));
        }
    };
    let rgb = image::RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
        MergeError::codec(format!("pixel buffer too small for {width}x{height} RGB"))
    })?;
    let rgba = image::DynamicImage::ImageRgb8(rgb).into_rgba8();

    let part = Part::new(rgba);
    Ok(match resolution {
        Some(r) => part.with_resolution(r),
        None => part,
    })
}

pub fn probe_part_file(path: &Path) -> MergeResult<PartHeader> {
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    probe_part(BufReader::new(f)).map_err(|e| with_path(e, path))
}

pub fn decode_part_file(path: &Path) -> MergeResult<Part> {
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    decode_part(BufReader::new(f)).map_err(|e| with_path(e, path))
}

/// No decode buffer cap. Large scans are bounded by the canvas size check in layout.
fn decoder_limits() -> Limits {
    Limits::unlimited()
}

fn open_decoder<R: Read + Seek>(reader: R) -> MergeResult<Decoder<R>> {
    let dec = Decoder::new(reader).context("read tiff header")?;
    Ok(dec.with_limits(decoder_limits()))
}

fn with_path(err: MergeError, path: &Path) -> MergeError {
    match err {
        MergeError::Other(e) => MergeError::Other(e.context(format!("'{}'", path.display()))),
        MergeError::Codec(msg) => MergeError::Codec(format!("'{}': {msg}", path.display())),
        other => other,
    }
}

/// Resolution in dots per inch, when the file carries a usable one.
///
/// A missing unit tag is read as inches. Unit "none" and zero values count as absent.
fn read_resolution<R: Read + Seek>(dec: &mut Decoder<R>) -> MergeResult<Option<Resolution>> {
    let x = dec
        .find_tag(Tag::XResolution)
        .context("read XResolution")?
        .and_then(value_as_f64);
    let y = dec
        .find_tag(Tag::YResolution)
        .context("read YResolution")?
        .and_then(value_as_f64);
    let (Some(x), Some(y)) = (x, y) else {
        return Ok(None);
    };
    if x <= 0.0 || y <= 0.0 {
        return Ok(None);
    }

    let unit = dec
        .find_tag(Tag::ResolutionUnit)
        .context("read ResolutionUnit")?
        .and_then(value_as_u16)
        .map(ResolutionUnit::from_u16);
    Ok(match unit {
        None | Some(Some(ResolutionUnit::Inch)) => Some(Resolution::new(x, y)),
        Some(Some(ResolutionUnit::Centimeter)) => Some(Resolution::from_dots_per_cm(x, y)),
        Some(_) => None,
    })
}

fn value_as_f64(v: Value) -> Option<f64> {
    match v {
        Value::Rational(n, d) if d != 0 => Some(f64::from(n) / f64::from(d)),
        Value::Float(f) => Some(f64::from(f)),
        Value::Double(f) => Some(f),
        Value::Short(s) => Some(f64::from(s)),
        Value::Unsigned(u) => Some(f64::from(u)),
        _ => None,
    }
}

fn value_as_u16(v: Value) -> Option<u16> {
    match v {
        Value::Short(s) => Some(s),
        Value::Unsigned(u) => u16::try_from(u).ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
