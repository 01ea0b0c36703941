use image::{Rgba, RgbaImage};
use nalgebra::{Vector2, Vector4};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::core::{
    animation::{write_gif_animation, AnimationParams},
    file_io::FilePrefix,
    image_utils::{ImageSpecification, PixelMapper},
    ode_solvers::rk4_advance,
    raster::{draw_disk, draw_polyline, Stroke},
    stopwatch::Stopwatch,
};

/// State of a double pendulum in canonical coordinates: `[theta1, theta2, p1, p2]`.
/// Angles are measured from the downward vertical.
pub type PendulumState = Vector4<f64>;

/// Physical properties of an ideal double pendulum (point masses on massless rods).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DoublePendulumModel {
    pub masses: [f64; 2],
    pub lengths: [f64; 2],
    pub gravity: f64,
}

impl Default for DoublePendulumModel {
    fn default() -> Self {
        DoublePendulumModel {
            masses: [0.1, 0.1],
            lengths: [0.3, 0.3],
            gravity: 9.8,
        }
    }
}

impl DoublePendulumModel {
    /// Hamilton's equations of motion.
    pub fn slope(&self, state: &PendulumState) -> PendulumState {
        let [m1, m2] = self.masses;
        let [l1, l2] = self.lengths;
        let g = self.gravity;
        let (theta1, theta2, p1, p2) = (state[0], state[1], state[2], state[3]);

        let delta = theta1 - theta2;
        let (sin_delta, cos_delta) = delta.sin_cos();
        let inertia = m1 + m2 * sin_delta * sin_delta;

        let a1 = (p1 * p2 * sin_delta) / (l1 * l2 * inertia);
        let a2 = (p1 * p1 * m2 * l2 * l2 - 2.0 * p1 * p2 * m2 * l1 * l2 * cos_delta
            + p2 * p2 * (m1 + m2) * l1 * l1)
            * (2.0 * delta).sin()
            / (2.0 * l1 * l1 * l2 * l2 * inertia * inertia);

        let theta1_dot = (p1 * l2 - p2 * l1 * cos_delta) / (l1 * l1 * l2 * inertia);
        let theta2_dot =
            (p2 * (m1 + m2) * l1 - p1 * m2 * l2 * cos_delta) / (m2 * l1 * l2 * l2 * inertia);
        let p1_dot = -(m1 + m2) * g * l1 * theta1.sin() - a1 + a2;
        let p2_dot = -m2 * g * l2 * theta2.sin() + a1 - a2;

        Vector4::new(theta1_dot, theta2_dot, p1_dot, p2_dot)
    }

    /// Total mechanical energy, which is conserved by the true dynamics.
    pub fn hamiltonian(&self, state: &PendulumState) -> f64 {
        let [m1, m2] = self.masses;
        let [l1, l2] = self.lengths;
        let g = self.gravity;
        let (theta1, theta2, p1, p2) = (state[0], state[1], state[2], state[3]);

        let delta = theta1 - theta2;
        let sin_delta = delta.sin();
        let kinetic = (m2 * l2 * l2 * p1 * p1 + (m1 + m2) * l1 * l1 * p2 * p2
            - 2.0 * m2 * l1 * l2 * p1 * p2 * delta.cos())
            / (2.0 * m2 * l1 * l1 * l2 * l2 * (m1 + m2 * sin_delta * sin_delta));
        let potential = -(m1 + m2) * g * l1 * theta1.cos() - m2 * g * l2 * theta2.cos();
        kinetic + potential
    }

    /// Potential energy of the pendulum balanced straight up, at rest.
    pub fn reference_energy(&self) -> f64 {
        let [m1, m2] = self.masses;
        let [l1, l2] = self.lengths;
        m1 * l1 * self.gravity + m2 * (l1 + l2) * self.gravity
    }

    /// Pivot, first bob, and second bob, in that order.
    pub fn positions(&self, state: &PendulumState) -> [Vector2<f64>; 3] {
        let [l1, l2] = self.lengths;
        let pivot = Vector2::new(0.0, 0.0);
        let bob1 = pivot + l1 * Vector2::new(state[0].sin(), -state[0].cos());
        let bob2 = bob1 + l2 * Vector2::new(state[1].sin(), -state[1].cos());
        [pivot, bob1, bob2]
    }

    pub fn dynamics(&self) -> impl Fn(f64, PendulumState) -> PendulumState + '_ {
        move |_, state: PendulumState| self.slope(&state)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PendulumAnimationParams {
    pub image_specification: ImageSpecification,
    pub background_color_rgb: [u8; 3],
    pub pendulum_colors_rgb: [[u8; 3]; 2],
    pub rod: Stroke,
    pub bob_radius_pixels: f64,
    pub animation: AnimationParams,
}

impl Default for PendulumAnimationParams {
    fn default() -> Self {
        PendulumAnimationParams {
            image_specification: ImageSpecification {
                resolution: Vector2::new(400, 400),
                center: Vector2::new(0.0, 0.0),
                width: 1.5,
            },
            background_color_rgb: [255, 255, 255],
            pendulum_colors_rgb: [[31, 119, 180], [255, 127, 14]],
            rod: Stroke {
                opacity: 1.0,
                radius_pixels: 1.0,
            },
            bob_radius_pixels: 5.0,
            animation: AnimationParams::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DoublePendulumParams {
    pub model: DoublePendulumModel,
    pub time_step: f64,
    pub initial_angles_deg: [f64; 2],
    pub initial_momenta: [f64; 2],
    pub perturbation: f64, // added to the first angle of the second pendulum
    pub steps_per_frame: u32,
    pub frame_count: u32,
    pub animation: PendulumAnimationParams,
}

impl Default for DoublePendulumParams {
    fn default() -> Self {
        DoublePendulumParams {
            model: DoublePendulumModel::default(),
            time_step: 0.001,
            initial_angles_deg: [179.0, 180.0],
            initial_momenta: [0.0, 0.0],
            perturbation: 1e-4,
            steps_per_frame: 10,
            frame_count: 2000,
            animation: PendulumAnimationParams::default(),
        }
    }
}

impl DoublePendulumParams {
    /// The nominal pendulum, and its perturbed twin.
    pub fn initial_states(&self) -> [PendulumState; 2] {
        use std::f64::consts::PI;
        let theta1 = self.initial_angles_deg[0] * PI / 180.0;
        let theta2 = self.initial_angles_deg[1] * PI / 180.0;
        let [p1, p2] = self.initial_momenta;
        [
            Vector4::new(theta1, theta2, p1, p2),
            Vector4::new(theta1 + self.perturbation, theta2, p1, p2),
        ]
    }

    /// Simulation time covered by a single animation frame.
    pub fn frame_duration(&self) -> f64 {
        self.time_step * (self.steps_per_frame as f64)
    }

    /// Advance both pendulums through one animation frame.
    pub fn step_frame(&self, states: &[PendulumState; 2], t: f64) -> [PendulumState; 2] {
        let dynamics = self.model.dynamics();
        [
            rk4_advance(self.time_step, t, self.steps_per_frame, states[0], &dynamics),
            rk4_advance(self.time_step, t, self.steps_per_frame, states[1], &dynamics),
        ]
    }

    /// Returns the pair of states shown in each frame. The first entry is the initial condition.
    pub fn simulate_frames(&self) -> Vec<[PendulumState; 2]> {
        more_asserts::assert_gt!(self.time_step, 0.0);
        let mut frames = Vec::with_capacity(self.frame_count as usize);
        let mut states = self.initial_states();
        for i in 0..self.frame_count {
            frames.push(states);
            states = self.step_frame(&states, (i as f64) * self.frame_duration());
        }
        frames
    }
}

pub fn draw_frame(
    model: &DoublePendulumModel,
    states: &[PendulumState; 2],
    params: &PendulumAnimationParams,
    pixel_mapper: &PixelMapper,
) -> RgbaImage {
    let [r, g, b] = params.background_color_rgb;
    let mut image = RgbaImage::from_pixel(
        params.image_specification.resolution[0],
        params.image_specification.resolution[1],
        Rgba([r, g, b, 255]),
    );

    for (state, [r, g, b]) in states.iter().zip(params.pendulum_colors_rgb.iter()) {
        let color = Rgba([*r, *g, *b, 255]);
        let pixels: Vec<Vector2<f64>> = model
            .positions(state)
            .iter()
            .map(|p| pixel_mapper.inverse_map(p))
            .collect();
        draw_polyline(&mut image, &pixels, &color, &params.rod);
        for bob in pixels.iter().skip(1) {
            draw_disk(&mut image, bob, params.bob_radius_pixels, &color, 1.0);
        }
    }
    image
}

pub fn render_double_pendulum(
    params: &DoublePendulumParams,
    file_prefix: FilePrefix,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stopwatch = Stopwatch::new("Double Pendulum Stopwatch".to_owned());

    more_asserts::assert_gt!(params.frame_count, 0);
    let pixel_mapper = PixelMapper::new(&params.animation.image_specification);
    stopwatch.record_split("setup".to_owned());

    let frames = params.simulate_frames();
    stopwatch.record_split("simulation".to_owned());

    write_gif_animation(
        file_prefix.full_path_with_suffix(".gif"),
        &params.animation.animation,
        frames
            .iter()
            .map(|states| draw_frame(&params.model, states, &params.animation, &pixel_mapper)),
    )?;
    stopwatch.record_split("write GIF".to_owned());

    let mut diagnostics_file = file_prefix.create_file_with_suffix("_diagnostics.txt")?;
    stopwatch.display(&mut diagnostics_file)?;

    let model = &params.model;
    writeln!(
        diagnostics_file,
        "reference energy: {:.8}",
        model.reference_energy()
    )?;
    if let (Some(first), Some(last)) = (frames.first(), frames.last()) {
        for (i, (initial, fin)) in first.iter().zip(last.iter()).enumerate() {
            let energy_begin = model.hamiltonian(initial);
            let energy_end = model.hamiltonian(fin);
            writeln!(
                diagnostics_file,
                "pendulum {}: energy {:.8} --> {:.8} (drift: {:.3e})",
                i,
                energy_begin,
                energy_end,
                energy_end - energy_begin
            )?;
        }
        writeln!(
            diagnostics_file,
            "final separation (max norm): {:.6e}",
            (last[0] - last[1]).amax()
        )?;
    }

    Ok(())
}
