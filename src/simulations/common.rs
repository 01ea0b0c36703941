use serde::{Deserialize, Serialize};

use super::{
    double_pendulum::DoublePendulumParams, lorenz_attractor::LorenzParams,
    mandelbrot::MandelbrotParams,
};

#[derive(Serialize, Deserialize, Debug)]
pub enum SimulationParams {
    DoublePendulum(Box<DoublePendulumParams>),
    LorenzAttractor(Box<LorenzParams>),
    Mandelbrot(Box<MandelbrotParams>),
}

impl SimulationParams {
    /// Name of the output sub-directory for this simulation.
    pub fn name(&self) -> &'static str {
        match self {
            SimulationParams::DoublePendulum(_) => "double_pendulum",
            SimulationParams::LorenzAttractor(_) => "lorenz_attractor",
            SimulationParams::Mandelbrot(_) => "mandelbrot",
        }
    }
}
