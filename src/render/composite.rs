use image::RgbaImage;

use crate::foundation::core::Offset;
use crate::foundation::error::{MergeError, MergeResult};

/// Straight (non-premultiplied) RGBA8.
pub type StraightRgba8 = [u8; 4];

/// Porter-Duff "over" for straight-alpha pixels.
pub fn over(dst: StraightRgba8, src: StraightRgba8) -> StraightRgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let da = u32::from(dst[3]);
    // dst contribution scaled to 255*255 units.
    let dw = da * (255 - sa);
    let out_a = sa * 255 + dw;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * dw;
        out[i] = ((num + out_a / 2) / out_a).min(255) as u8;
    }
    out[3] = ((out_a + 127) / 255).min(255) as u8;
    out
}

/// Paste `src` onto `dst` at `at`, blending with the source's own alpha and clipping to
/// `dst` bounds.
pub fn paste_over(dst: &mut RgbaImage, src: &RgbaImage, at: Offset) {
    let Some((x0, y0, x1, y1)) = clip_rect(dst, src, at) else {
        return;
    };
    for y in y0..y1 {
        let sy = (i64::from(y) - at.y) as u32;
        for x in x0..x1 {
            let sx = (i64::from(x) - at.x) as u32;
            let s = src.get_pixel(sx, sy).0;
            let d = dst.get_pixel_mut(x, y);
            d.0 = over(d.0, s);
        }
    }
}

/// `over` applied in place to two equally sized images; `src` ends up on top.
pub fn over_in_place(dst: &mut RgbaImage, src: &RgbaImage) -> MergeResult<()> {
    if dst.dimensions() != src.dimensions() {
        return Err(MergeError::validation(format!(
            "over_in_place expects equal sizes, got {:?} and {:?}",
            dst.dimensions(),
            src.dimensions()
        )));
    }
    for (d, s) in dst.pixels_mut().zip(src.pixels()) {
        d.0 = over(d.0, s.0);
    }
    Ok(())
}

fn clip_rect(dst: &RgbaImage, src: &RgbaImage, at: Offset) -> Option<(u32, u32, u32, u32)> {
    let x0 = at.x.max(0);
    let y0 = at.y.max(0);
    let x1 = (at.x + i64::from(src.width())).min(i64::from(dst.width()));
    let y1 = (at.y + i64::from(src.height())).min(i64::from(dst.height()));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    // All four bounds are within [0, dst dimension] here.
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
