use image::{Rgb, RgbImage};
use num::Complex;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::core::{
    color_map::{viridis_keyframes, ColorMap, ColorMapKeyFrame, ColorMapper},
    file_io::FilePrefix,
    image_utils::{create_buffer, write_image_to_file},
    interpolation::LinearInterpolator,
    stopwatch::Stopwatch,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConvergenceParams {
    pub max_iter_count: u32,
    pub escape_radius: f64,
}

impl Default for ConvergenceParams {
    fn default() -> Self {
        ConvergenceParams {
            max_iter_count: 200,
            escape_radius: 1e6,
        }
    }
}

/// Iterates the quadratic map `z := z*z + c`, starting from `z = 0`.
/// @return: the first iteration at which `|z|` exceeds the escape radius, or `None`
/// if the sequence stays bounded for all iterations in `[1, max_iter_count)`.
pub fn escape_time(point: Complex<f64>, params: &ConvergenceParams) -> Option<u32> {
    let mut z = Complex::new(0.0, 0.0);
    for iter_count in 1..params.max_iter_count {
        z = z * z + point;
        if z.norm() > params.escape_radius {
            return Some(iter_count);
        }
    }
    None
}

/// Escape count for every sample point, stored as `heights[i_real][j_imag]`.
/// Cells that never escaped hold `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    pub heights: Vec<Vec<Option<u32>>>,
}

impl HeightGrid {
    /// (real axis count, imaginary axis count)
    pub fn dimensions(&self) -> (usize, usize) {
        let n_imag = self.heights.first().map_or(0, |column| column.len());
        (self.heights.len(), n_imag)
    }

    pub fn get(&self, i: usize, j: usize) -> Option<u32> {
        self.heights[i][j]
    }

    pub fn max_count(&self) -> Option<u32> {
        self.heights.iter().flatten().flatten().copied().max()
    }

    pub fn bounded_fraction(&self) -> f64 {
        let (n_real, n_imag) = self.dimensions();
        let total = n_real * n_imag;
        if total == 0 {
            return 0.0;
        }
        let bounded = self.heights.iter().flatten().filter(|h| h.is_none()).count();
        (bounded as f64) / (total as f64)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContourColorMapParams {
    pub keyframes: Vec<ColorMapKeyFrame>,
    pub contour_level_count: u32,
    pub background_color_rgb: [u8; 3], // points that never escape
}

impl Default for ContourColorMapParams {
    fn default() -> Self {
        let keyframes = viridis_keyframes();
        let background_color_rgb = keyframes[0].rgb_raw;
        ContourColorMapParams {
            keyframes,
            contour_level_count: 8,
            background_color_rgb,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MandelbrotParams {
    pub real_range: [f64; 2],
    pub imag_range: [f64; 2],
    pub resolution: nalgebra::Vector2<u32>,
    pub convergence_params: ConvergenceParams,
    pub color_map: ContourColorMapParams,
}

impl Default for MandelbrotParams {
    fn default() -> Self {
        MandelbrotParams {
            real_range: [-2.0, 1.0],
            imag_range: [-1.0, 1.0],
            resolution: nalgebra::Vector2::new(1000, 1000),
            convergence_params: ConvergenceParams::default(),
            color_map: ContourColorMapParams::default(),
        }
    }
}

impl MandelbrotParams {
    /// Sample point for grid cell (i, j). The grid covers the half-open region
    /// `[a, b) x [c, d)`, so the upper bounds themselves are never sampled.
    pub fn sample_point(&self, i: usize, j: usize) -> Complex<f64> {
        let [a, b] = self.real_range;
        let [c, d] = self.imag_range;
        let x = a + (i as f64) * (b - a) / (self.resolution[0] as f64);
        let y = c + (j as f64) * (d - c) / (self.resolution[1] as f64);
        Complex::new(x, y)
    }

    /// Pixel count of the rendered image, chosen to keep equal aspect in the complex plane.
    pub fn image_dimensions(&self) -> (u32, u32) {
        let real_span = self.real_range[1] - self.real_range[0];
        let imag_span = self.imag_range[1] - self.imag_range[0];
        more_asserts::assert_gt!(real_span, 0.0);
        more_asserts::assert_gt!(imag_span, 0.0);
        let width = self.resolution[0];
        let aspect_ratio = imag_span / real_span;
        let height = ((width as f64) * aspect_ratio).round().max(1.0) as u32;
        (width, height)
    }
}

/// Evaluates the escape time at every grid point. Columns are computed in parallel.
pub fn compute_height_grid(params: &MandelbrotParams) -> HeightGrid {
    more_asserts::assert_gt!(params.resolution[0], 0);
    more_asserts::assert_gt!(params.resolution[1], 0);
    more_asserts::assert_gt!(params.real_range[1] - params.real_range[0], 0.0);
    more_asserts::assert_gt!(params.imag_range[1] - params.imag_range[0], 0.0);
    let mut heights = create_buffer(None, &params.resolution);
    heights.par_iter_mut().enumerate().for_each(|(i, column)| {
        column.iter_mut().enumerate().for_each(|(j, cell)| {
            *cell = escape_time(params.sample_point(i, j), &params.convergence_params);
        });
    });
    HeightGrid { heights }
}

/// Maps an escape count onto one of `level_count` equal-width bands over `[0, max_count]`.
pub fn contour_level(count: u32, max_count: u32, level_count: u32) -> u32 {
    if max_count == 0 || level_count == 0 {
        return 0;
    }
    let scaled = (count as u64) * (level_count as u64) / (max_count as u64);
    (scaled as u32).min(level_count - 1)
}

/// Filled-contour rendering of the height grid, with the imaginary axis pointing up.
pub fn draw_height_grid(grid: &HeightGrid, params: &MandelbrotParams) -> RgbImage {
    let color_params = &params.color_map;
    more_asserts::assert_ge!(color_params.contour_level_count, 2);
    let color_map = ColorMap::new(&color_params.keyframes, LinearInterpolator);
    let level_scale = 1.0 / ((color_params.contour_level_count - 1) as f32);
    let level_colors: Vec<Rgb<u8>> = (0..color_params.contour_level_count)
        .map(|level| color_map.compute_pixel(level as f32 * level_scale))
        .collect();
    let background = Rgb(color_params.background_color_rgb);
    let max_count = grid.max_count().unwrap_or(0);

    let (n_real, n_imag) = grid.dimensions();
    let (width, height) = params.image_dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let i = ((x as usize) * n_real / (width as usize)).min(n_real - 1);
        let alpha = ((height - 1 - y) as f64 + 0.5) / (height as f64);
        let j = ((alpha * n_imag as f64) as usize).min(n_imag - 1);
        match grid.get(i, j) {
            Some(count) => {
                let level = contour_level(count, max_count, color_params.contour_level_count);
                level_colors[level as usize]
            }
            None => background,
        }
    })
}

pub fn render_mandelbrot(
    params: &MandelbrotParams,
    file_prefix: FilePrefix,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stopwatch = Stopwatch::new("Mandelbrot Stopwatch".to_owned());

    stopwatch.record_split("setup".to_owned());

    let grid = compute_height_grid(params);
    let elapsed = stopwatch.record_split("compute escape times".to_owned());
    println!(
        "INFO:  Finished on resolution of {}x{}. Elapsed time: {:.1} sec.",
        params.resolution[0],
        params.resolution[1],
        elapsed.as_secs_f64()
    );

    let image = draw_height_grid(&grid, params);
    stopwatch.record_split("apply color map".to_owned());

    write_image_to_file(file_prefix.full_path_with_suffix(".png"), |f| image.save(f))?;
    stopwatch.record_split("write PNG".to_owned());

    let mut diagnostics_file = file_prefix.create_file_with_suffix("_diagnostics.txt")?;
    stopwatch.display(&mut diagnostics_file)?;
    writeln!(diagnostics_file, "max escape count: {:?}", grid.max_count())?;
    writeln!(
        diagnostics_file,
        "bounded fraction: {:.6}",
        grid.bounded_fraction()
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(real: f64, imag: f64) -> Option<u32> {
        escape_time(Complex::new(real, imag), &ConvergenceParams::default())
    }

    #[test]
    fn test_origin_never_escapes() {
        assert_eq!(escape(0.0, 0.0), None);
    }

    #[test]
    fn test_far_point_escapes_quickly() {
        // 10 --> 110 --> 12110 --> 1.5e8
        assert_eq!(escape(10.0, 0.0), Some(4));
    }

    #[test]
    fn test_escape_time_regression() {
        assert_eq!(escape(2.0, 0.0), Some(5));
        assert_eq!(escape(1.0, 1.0), Some(6));
        assert_eq!(escape(0.5, 0.0), Some(9));
        assert_eq!(escape(-2.0, 0.0), None); // lands on the fixed point z = 2
        assert_eq!(escape(-1.0, 0.0), None); // period-2 orbit
    }

    #[test]
    fn test_escape_time_respects_iteration_bound() {
        let params = ConvergenceParams {
            max_iter_count: 4,
            escape_radius: 1e6,
        };
        assert_eq!(escape_time(Complex::new(10.0, 0.0), &params), None);
        let params = ConvergenceParams {
            max_iter_count: 5,
            escape_radius: 1e6,
        };
        assert_eq!(escape_time(Complex::new(10.0, 0.0), &params), Some(4));
    }

    fn tiny_params(n_real: u32, n_imag: u32) -> MandelbrotParams {
        MandelbrotParams {
            resolution: nalgebra::Vector2::new(n_real, n_imag),
            ..Default::default()
        }
    }

    #[test]
    fn test_grid_dimensions_match_resolution() {
        for (n_real, n_imag) in [(1, 1), (7, 3), (16, 40)] {
            let grid = compute_height_grid(&tiny_params(n_real, n_imag));
            assert_eq!(grid.dimensions(), (n_real as usize, n_imag as usize));
        }
    }

    #[test]
    fn test_grid_matches_pointwise_evaluation() {
        let params = tiny_params(24, 16);
        let grid = compute_height_grid(&params);
        for i in 0..24 {
            for j in 0..16 {
                assert_eq!(
                    grid.get(i, j),
                    escape_time(params.sample_point(i, j), &params.convergence_params)
                );
            }
        }
        // (-2, -1) is the first sample and is outside the set:
        assert!(grid.get(0, 0).is_some());
        assert!(grid.max_count().is_some());
        let bounded = grid.bounded_fraction();
        assert!(bounded > 0.0 && bounded < 1.0);
    }

    #[test]
    fn test_sample_points_cover_half_open_region() {
        let params = tiny_params(4, 2);
        assert_eq!(params.sample_point(0, 0), Complex::new(-2.0, -1.0));
        assert_eq!(params.sample_point(3, 1), Complex::new(0.25, 0.0));
    }

    #[test]
    fn test_contour_level() {
        assert_eq!(contour_level(0, 100, 8), 0);
        assert_eq!(contour_level(12, 100, 8), 0);
        assert_eq!(contour_level(13, 100, 8), 1);
        assert_eq!(contour_level(99, 100, 8), 7);
        assert_eq!(contour_level(100, 100, 8), 7);
        assert_eq!(contour_level(5, 0, 8), 0);

        let mut previous = 0;
        for count in 0..=100 {
            let level = contour_level(count, 100, 8);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_draw_height_grid() {
        let params = tiny_params(30, 20);
        let grid = compute_height_grid(&params);
        let image = draw_height_grid(&grid, &params);
        assert_eq!(image.dimensions(), params.image_dimensions());
        assert_eq!(image.dimensions(), (30, 20));

        // The center of the main cardioid, (-0.25, 0), is in the set.
        let background = Rgb(params.color_map.background_color_rgb);
        assert_eq!(*image.get_pixel(17, 10), background);
    }

    #[test]
    fn test_imaginary_axis_points_up() {
        let mut params = tiny_params(4, 4);
        params.real_range = [0.0, 1.0];
        params.imag_range = [0.0, 1.0];
        params.color_map.background_color_rgb = [0, 0, 0];
        // Only the lowest imaginary row (j = 0) stays bounded.
        let heights = (0..4)
            .map(|_| (0..4).map(|j| if j == 0 { None } else { Some(10) }).collect())
            .collect();
        let image = draw_height_grid(&HeightGrid { heights }, &params);
        assert_eq!(image.dimensions(), (4, 4));

        let background = Rgb([0, 0, 0]);
        for x in 0..4 {
            assert_eq!(*image.get_pixel(x, 3), background, "bottom row, x = {}", x);
            for y in 0..3 {
                assert_ne!(*image.get_pixel(x, y), background, "x = {}, y = {}", x, y);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_empty_real_range_is_rejected() {
        let mut params = tiny_params(10, 10);
        params.real_range = [0.5, 0.5];
        params.image_dimensions();
    }

    #[test]
    #[should_panic]
    fn test_empty_imag_range_is_rejected() {
        let mut params = tiny_params(10, 10);
        params.imag_range = [1.0, 1.0];
        compute_height_grid(&params);
    }

    #[test]
    fn test_default_image_keeps_equal_aspect() {
        assert_eq!(MandelbrotParams::default().image_dimensions(), (1000, 667));
    }
}
