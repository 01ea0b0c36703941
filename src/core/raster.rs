//! Minimal rasterization helpers for drawing strokes and disks into an image buffer,
//! working in fractional pixel coordinates.

use image::{ImageBuffer, Pixel};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Style used to draw a line segment. The color is supplied separately by the caller.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub opacity: f32, // [0 = invisible, 1 = opaque]
    pub radius_pixels: f64,
}

/// Blend `color` over `pixel`, channel by channel.
pub fn blend_pixel<P>(pixel: &mut P, color: &P, opacity: f32)
where
    P: Pixel<Subpixel = u8>,
{
    let weight_color = opacity.clamp(0.0, 1.0);
    let weight_pixel = 1.0 - weight_color;
    pixel.apply2(color, |background: u8, foreground: u8| -> u8 {
        ((background as f32) * weight_pixel + (foreground as f32) * weight_color).round() as u8
    });
}

/// Blend a single pixel, silently ignoring coordinates that fall outside the image.
pub fn plot<P>(
    image: &mut ImageBuffer<P, Vec<u8>>,
    x: i64,
    y: i64,
    color: &P,
    opacity: f32,
) where
    P: Pixel<Subpixel = u8>,
{
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    blend_pixel(image.get_pixel_mut(x as u32, y as u32), color, opacity);
}

/// Fill all pixels whose centers are within `radius` of `center`.
pub fn draw_disk<P>(
    image: &mut ImageBuffer<P, Vec<u8>>,
    center: &Vector2<f64>,
    radius: f64,
    color: &P,
    opacity: f32,
) where
    P: Pixel<Subpixel = u8>,
{
    if radius <= 0.5 {
        plot(
            image,
            center[0].round() as i64,
            center[1].round() as i64,
            color,
            opacity,
        );
        return;
    }
    let radius_squared = radius * radius;
    let x_low = (center[0] - radius).floor() as i64;
    let x_upp = (center[0] + radius).ceil() as i64;
    let y_low = (center[1] - radius).floor() as i64;
    let y_upp = (center[1] + radius).ceil() as i64;
    for x in x_low..=x_upp {
        for y in y_low..=y_upp {
            let dx = x as f64 - center[0];
            let dy = y as f64 - center[1];
            if dx * dx + dy * dy <= radius_squared {
                plot(image, x, y, color, opacity);
            }
        }
    }
}

/// Draw a segment from `from` to `to` by stamping the stroke at (at most) one-pixel
/// spacing along the segment. The end point itself is not drawn, so that a polyline
/// does not blend its joints twice.
pub fn draw_segment<P>(
    image: &mut ImageBuffer<P, Vec<u8>>,
    from: &Vector2<f64>,
    to: &Vector2<f64>,
    color: &P,
    stroke: &Stroke,
) where
    P: Pixel<Subpixel = u8>,
{
    let delta = to - from;
    let sample_count = delta[0].abs().max(delta[1].abs()).ceil().max(1.0) as usize;
    let scale = 1.0 / (sample_count as f64);
    for i in 0..sample_count {
        let point = from + delta * (scale * i as f64);
        draw_disk(image, &point, stroke.radius_pixels, color, stroke.opacity);
    }
}

/// Draw a connected sequence of segments through `points`.
pub fn draw_polyline<P>(
    image: &mut ImageBuffer<P, Vec<u8>>,
    points: &[Vector2<f64>],
    color: &P,
    stroke: &Stroke,
) where
    P: Pixel<Subpixel = u8>,
{
    for pair in points.windows(2) {
        draw_segment(image, &pair[0], &pair[1], color, stroke);
    }
    if let Some(last) = points.last() {
        draw_disk(image, last, stroke.radius_pixels, color, stroke.opacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    fn opaque_hairline() -> Stroke {
        Stroke {
            opacity: 1.0,
            radius_pixels: 0.0,
        }
    }

    #[test]
    fn test_blend_pixel() {
        let mut pixel = WHITE;
        blend_pixel(&mut pixel, &Rgb([0, 0, 0]), 0.2);
        assert_eq!(pixel, Rgb([204, 204, 204]));

        let mut pixel = WHITE;
        blend_pixel(&mut pixel, &RED, 1.0);
        assert_eq!(pixel, RED);

        let mut pixel = WHITE;
        blend_pixel(&mut pixel, &RED, 0.0);
        assert_eq!(pixel, WHITE);
    }

    #[test]
    fn test_plot_outside_image_is_ignored() {
        let mut image = RgbImage::from_pixel(4, 4, WHITE);
        plot(&mut image, -1, 2, &RED, 1.0);
        plot(&mut image, 2, 4, &RED, 1.0);
        assert!(image.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_horizontal_polyline_covers_every_pixel() {
        let mut image = RgbImage::from_pixel(10, 3, WHITE);
        let points = [Vector2::new(1.0, 1.0), Vector2::new(8.0, 1.0)];
        draw_polyline(&mut image, &points, &RED, &opaque_hairline());

        for x in 0..10 {
            let expected = if (1..=8).contains(&x) { RED } else { WHITE };
            assert_eq!(*image.get_pixel(x, 1), expected, "x = {}", x);
            assert_eq!(*image.get_pixel(x, 0), WHITE);
            assert_eq!(*image.get_pixel(x, 2), WHITE);
        }
    }

    #[test]
    fn test_diagonal_segment_has_no_gaps() {
        let mut image = RgbImage::from_pixel(20, 20, WHITE);
        let points = [Vector2::new(0.0, 0.0), Vector2::new(19.0, 19.0)];
        draw_polyline(&mut image, &points, &RED, &opaque_hairline());
        for i in 0..20 {
            assert_eq!(*image.get_pixel(i, i), RED);
        }
    }

    #[test]
    fn test_disk_is_symmetric() {
        let mut image = RgbImage::from_pixel(11, 11, WHITE);
        draw_disk(&mut image, &Vector2::new(5.0, 5.0), 2.0, &RED, 1.0);
        let painted = image.pixels().filter(|p| **p == RED).count();
        assert_eq!(painted, 13); // (0,0), 4 x (1,0), 4 x (2,0), 4 x (1,1)
        assert_eq!(*image.get_pixel(7, 5), RED);
        assert_eq!(*image.get_pixel(3, 5), RED);
        assert_eq!(*image.get_pixel(7, 7), WHITE);
    }
}
