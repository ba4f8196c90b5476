//! CPU compositor
//!
//! Flattens the background and the perspective-warped overlay into a single
//! RGBA image. Every background pixel inside the quad's bounds is mapped back
//! through the inverse homography and bilinearly sampled from the overlay.

use image::RgbaImage;
use rayon::prelude::*;

use crate::warp::{Homography, OverlaySize, Point, Quad, WarpError};

use super::ExportError;

/// Composite `overlay` onto a copy of `background`, warped onto `quad`.
///
/// `quad` is in the background image's pixel space.
pub fn flatten(
    background: &RgbaImage,
    overlay: &RgbaImage,
    quad: &Quad,
) -> Result<RgbaImage, ExportError> {
    if background.width() == 0 || background.height() == 0 {
        return Err(ExportError::NoBackground);
    }
    let size = OverlaySize::from(overlay.dimensions());
    if !size.is_loaded() {
        return Err(ExportError::NoOverlay);
    }
    let homography = Homography::from_rect(size, quad.corners())?;
    if homography.folds(size) {
        return Err(WarpError::FoldedQuad.into());
    }
    let inverse = homography.inverse().ok_or(WarpError::DegenerateConfiguration)?;

    let mut out = background.clone();
    let (width, height) = out.dimensions();

    let (min, max) = quad.bounds();
    let x0 = min.x.floor().max(0.0) as u32;
    let y0 = min.y.floor().max(0.0) as u32;
    let x1 = (max.x.ceil().max(0.0) as u32).min(width);
    let y1 = (max.y.ceil().max(0.0) as u32).min(height);
    if x0 >= x1 || y0 >= y1 {
        return Ok(out);
    }

    let row_bytes = width as usize * 4;
    let raw: &mut [u8] = &mut out;

    // Process rows in parallel using rayon.
    raw.par_chunks_mut(row_bytes)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .for_each(|(y, row)| {
            for x in x0..x1 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let Some(source) = inverse.map_point(center) else {
                    continue;
                };
                let inside = (0.0..=size.width).contains(&source.x)
                    && (0.0..=size.height).contains(&source.y);
                if !inside {
                    continue;
                }

                let src = bilinear_sample(overlay, source.x - 0.5, source.y - 0.5);
                let px = x as usize * 4;
                blend_over(&mut row[px..px + 4], src);
            }
        });

    Ok(out)
}

/// Straight-alpha "over" blend of `src` onto `dst`
fn blend_over(dst: &mut [u8], src: [f32; 4]) {
    let sa = src[3] / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let blended = (src[c] * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Bilinear interpolation against a transparent border
fn bilinear_sample(img: &RgbaImage, x: f64, y: f64) -> [f32; 4] {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;
    let (w, h) = (img.width() as i64, img.height() as i64);

    let sample = |sx: i64, sy: i64| -> [f32; 4] {
        if sx < 0 || sy < 0 || sx >= w || sy >= h {
            [0.0; 4]
        } else {
            let p = img.get_pixel(sx as u32, sy as u32);
            [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
        }
    };

    let tl = sample(x0, y0);
    let tr = sample(x0 + 1, y0);
    let bl = sample(x0, y0 + 1);
    let br = sample(x0 + 1, y0 + 1);

    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = lerp(tl[c], tr[c], fx);
        let bot = lerp(bl[c], br[c], fx);
        out[c] = lerp(top, bot, fy);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_overlay_painted_inside_quad_only() {
        let background = RgbaImage::from_pixel(100, 100, BLUE);
        let overlay = RgbaImage::from_pixel(10, 20, RED);
        let quad = Quad::from_rect(Point::new(20.0, 30.0), Point::new(40.0, 40.0));

        let out = flatten(&background, &overlay, &quad).unwrap();
        assert_eq!(*out.get_pixel(40, 50), RED);
        assert_eq!(*out.get_pixel(25, 35), RED);
        assert_eq!(*out.get_pixel(5, 5), BLUE);
        assert_eq!(*out.get_pixel(70, 50), BLUE);
        assert_eq!(*out.get_pixel(40, 80), BLUE);
        // Background itself is untouched
        assert_eq!(*background.get_pixel(40, 50), BLUE);
    }

    #[test]
    fn test_transparent_overlay_keeps_background() {
        let background = RgbaImage::from_pixel(50, 50, BLUE);
        let overlay = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 0]));
        let quad = Quad::from_rect(Point::new(5.0, 5.0), Point::new(30.0, 30.0));

        let out = flatten(&background, &overlay, &quad).unwrap();
        assert_eq!(out, background);
    }

    #[test]
    fn test_quad_outside_image_is_noop() {
        let background = RgbaImage::from_pixel(20, 20, BLUE);
        let overlay = RgbaImage::from_pixel(4, 4, RED);
        let quad = Quad::from_rect(Point::new(-100.0, -100.0), Point::new(10.0, 10.0));

        let out = flatten(&background, &overlay, &quad).unwrap();
        assert_eq!(out, background);
    }

    #[test]
    fn test_concave_quad_is_an_error() {
        let background = RgbaImage::from_pixel(600, 600, BLUE);
        let overlay = RgbaImage::from_pixel(40, 80, RED);
        let quad = Quad::new([
            Point::new(300.0, 450.0),
            Point::new(350.0, 150.0),
            Point::new(350.0, 550.0),
            Point::new(150.0, 550.0),
        ])
        .unwrap();

        assert!(matches!(
            flatten(&background, &overlay, &quad),
            Err(ExportError::Warp(WarpError::FoldedQuad))
        ));
    }

    #[test]
    fn test_degenerate_quad_is_an_error() {
        let background = RgbaImage::from_pixel(20, 20, BLUE);
        let overlay = RgbaImage::from_pixel(4, 4, RED);
        let quad = Quad::new([
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 15.0),
            Point::new(2.0, 15.0),
        ])
        .unwrap();

        assert!(matches!(
            flatten(&background, &overlay, &quad),
            Err(ExportError::Warp(WarpError::DegenerateConfiguration))
        ));
    }

    #[test]
    fn test_empty_overlay_is_an_error() {
        let background = RgbaImage::from_pixel(20, 20, BLUE);
        let overlay = RgbaImage::new(0, 0);
        assert!(matches!(
            flatten(&background, &overlay, &Quad::default()),
            Err(ExportError::NoOverlay)
        ));
    }

    #[test]
    fn test_empty_background_is_an_error() {
        let background = RgbaImage::new(0, 0);
        let overlay = RgbaImage::from_pixel(4, 4, RED);
        assert!(matches!(
            flatten(&background, &overlay, &Quad::default()),
            Err(ExportError::NoBackground)
        ));
    }

    #[test]
    fn test_half_transparent_blend() {
        let mut dst = [0u8, 0, 255, 255];
        blend_over(&mut dst, [255.0, 0.0, 0.0, 127.5]);
        assert_eq!(dst, [128, 0, 128, 255]);
    }
}
