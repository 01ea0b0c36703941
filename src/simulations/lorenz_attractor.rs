use image::{Rgb, RgbImage, Rgba, RgbaImage};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::core::{
    animation::{write_gif_animation, AnimationParams},
    file_io::FilePrefix,
    image_utils::{write_image_to_file, FitImage, PixelMapper, ViewRectangle},
    ode_solvers::rk4_trajectory,
    raster::{draw_polyline, Stroke},
    stopwatch::Stopwatch,
};

/// The classical chaotic system of Edward Lorenz (1963), "Deterministic Nonperiodic Flow".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LorenzSystem {
    pub sigma: f64,
    pub beta: f64,
    pub rho: f64,
}

impl Default for LorenzSystem {
    fn default() -> Self {
        LorenzSystem {
            sigma: 10.0,
            beta: 8.0 / 3.0,
            rho: 28.0,
        }
    }
}

impl LorenzSystem {
    pub fn dynamics(&self) -> impl Fn(f64, Vector3<f64>) -> Vector3<f64> {
        let LorenzSystem { sigma, beta, rho } = *self;
        move |_, u: Vector3<f64>| {
            Vector3::new(
                sigma * (u[1] - u[0]),
                u[0] * (rho - u[2]) - u[1],
                u[0] * u[1] - beta * u[2],
            )
        }
    }
}

/// Orthographic camera, parameterized the same way as most 3D plotting tools:
/// the view direction is set by the elevation above the x-y plane and the
/// azimuth about the z axis.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Camera {
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
}

impl Camera {
    /// Projects a point onto the view plane: x is screen-right and y is screen-up.
    pub fn project(&self, point: &Vector3<f64>) -> Vector2<f64> {
        let (sin_az, cos_az) = self.azimuth_deg.to_radians().sin_cos();
        let (sin_el, cos_el) = self.elevation_deg.to_radians().sin_cos();
        let screen_x = -sin_az * point[0] + cos_az * point[1];
        let screen_y = -sin_el * (cos_az * point[0] + sin_az * point[1]) + cos_el * point[2];
        Vector2::new(screen_x, screen_y)
    }

    pub fn rotated(&self, azimuth_delta_deg: f64) -> Camera {
        Camera {
            elevation_deg: self.elevation_deg,
            azimuth_deg: self.azimuth_deg + azimuth_delta_deg,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RotationAnimation {
    pub frame_count: u32,
    pub animation: AnimationParams,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LorenzRenderParams {
    pub fit_image: FitImage,
    pub camera: Camera,
    pub line_color_rgb: [u8; 3],
    pub background_color_rgb: [u8; 3],
    pub stroke: Stroke,
    pub rotation: Option<RotationAnimation>,
}

impl Default for LorenzRenderParams {
    fn default() -> Self {
        LorenzRenderParams {
            fit_image: FitImage {
                resolution: Vector2::new(1000, 1000),
                padding_scale: 1.1,
            },
            camera: Camera {
                elevation_deg: 30.0,
                azimuth_deg: -60.0,
            },
            line_color_rgb: [255, 0, 0],
            background_color_rgb: [255, 255, 255],
            stroke: Stroke {
                opacity: 0.35,
                radius_pixels: 0.0,
            },
            rotation: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LorenzParams {
    pub system: LorenzSystem,
    pub initial_state: [f64; 3],
    pub time_step: f64,
    pub final_time: f64,
    pub render: LorenzRenderParams,
}

impl Default for LorenzParams {
    fn default() -> Self {
        LorenzParams {
            system: LorenzSystem::default(),
            initial_state: [1.0, 1.0, 1.0],
            time_step: 0.01,
            final_time: 80.0,
            render: LorenzRenderParams::default(),
        }
    }
}

impl LorenzParams {
    /// Number of points in the trajectory, including the initial condition.
    pub fn step_count(&self) -> usize {
        more_asserts::assert_gt!(self.time_step, 0.0);
        (self.final_time / self.time_step) as usize
    }

    pub fn compute_trajectory(&self) -> Vec<Vector3<f64>> {
        let [x0, y0, z0] = self.initial_state;
        rk4_trajectory(
            self.time_step,
            0.0,
            self.step_count(),
            Vector3::new(x0, y0, z0),
            &self.system.dynamics(),
        )
    }
}

/// Draws the projected trajectory as a single polyline, automatically fitting the view.
pub fn draw_trajectory(
    trajectory: &[Vector3<f64>],
    camera: &Camera,
    render: &LorenzRenderParams,
) -> RgbImage {
    let resolution = render.fit_image.resolution;
    let mut image = RgbImage::from_pixel(
        resolution[0],
        resolution[1],
        Rgb(render.background_color_rgb),
    );
    if trajectory.is_empty() {
        return image;
    }

    let projected: Vec<Vector2<f64>> = trajectory.iter().map(|p| camera.project(p)).collect();
    let image_specification = render
        .fit_image
        .image_specification(&ViewRectangle::from_vertices(&projected));
    let pixel_mapper = PixelMapper::new(&image_specification);
    let pixels: Vec<Vector2<f64>> = projected
        .iter()
        .map(|p| pixel_mapper.inverse_map(p))
        .collect();

    draw_polyline(
        &mut image,
        &pixels,
        &Rgb(render.line_color_rgb),
        &render.stroke,
    );
    image
}

pub fn render_lorenz_attractor(
    params: &LorenzParams,
    file_prefix: FilePrefix,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stopwatch = Stopwatch::new("Lorenz Attractor Stopwatch".to_owned());

    stopwatch.record_split("setup".to_owned());

    let trajectory = params.compute_trajectory();
    stopwatch.record_split("simulation".to_owned());

    let image = draw_trajectory(&trajectory, &params.render.camera, &params.render);
    stopwatch.record_split("rasterize".to_owned());

    write_image_to_file(file_prefix.full_path_with_suffix(".png"), |f| image.save(f))?;
    stopwatch.record_split("write PNG".to_owned());

    if let Some(rotation) = &params.render.rotation {
        more_asserts::assert_gt!(rotation.frame_count, 0);
        let azimuth_step = 360.0 / (rotation.frame_count as f64);
        let frames = (0..rotation.frame_count).map(|i| {
            let camera = params.render.camera.rotated(azimuth_step * (i as f64));
            to_rgba(&draw_trajectory(&trajectory, &camera, &params.render))
        });
        write_gif_animation(
            file_prefix.full_path_with_suffix("_rotation.gif"),
            &rotation.animation,
            frames,
        )?;
        stopwatch.record_split("rotation animation".to_owned());
    }

    let mut diagnostics_file = file_prefix.create_file_with_suffix("_diagnostics.txt")?;
    stopwatch.display(&mut diagnostics_file)?;
    writeln!(diagnostics_file, "trajectory point count: {}", trajectory.len())?;
    if let Some(last) = trajectory.last() {
        writeln!(
            diagnostics_file,
            "final state: [{:.6}, {:.6}, {:.6}]",
            last[0], last[1], last[2]
        )?;
    }

    Ok(())
}

fn to_rgba(image: &RgbImage) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([r, g, b]) = *image.get_pixel(x, y);
        Rgba([r, g, b, 255])
    })
}
