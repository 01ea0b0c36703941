use crate::cli::args::SimulationKind;
use crate::core::file_io::{serialize_to_json, FilePrefix};
use crate::simulations::{
    common::SimulationParams, double_pendulum::render_double_pendulum,
    double_pendulum::DoublePendulumParams, lorenz_attractor::render_lorenz_attractor,
    lorenz_attractor::LorenzParams, mandelbrot::render_mandelbrot, mandelbrot::MandelbrotParams,
};

pub fn read_simulation_params(
    params_path: &str,
) -> Result<SimulationParams, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(params_path)
        .map_err(|err| format!("Unable to read param file `{}`: {}", params_path, err))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn default_simulation_params(kind: SimulationKind) -> SimulationParams {
    match kind {
        SimulationKind::DoublePendulum => {
            SimulationParams::DoublePendulum(Box::new(DoublePendulumParams::default()))
        }
        SimulationKind::LorenzAttractor => {
            SimulationParams::LorenzAttractor(Box::new(LorenzParams::default()))
        }
        SimulationKind::Mandelbrot => {
            SimulationParams::Mandelbrot(Box::new(MandelbrotParams::default()))
        }
    }
}

pub fn render_simulation(
    params: &SimulationParams,
    mut file_prefix: FilePrefix,
) -> Result<(), Box<dyn std::error::Error>> {
    file_prefix.create_and_step_into_sub_directory(params.name())?;
    serialize_to_json(file_prefix.full_path_with_suffix(".json"), params)?;
    match params {
        SimulationParams::DoublePendulum(inner_params) => {
            render_double_pendulum(inner_params, file_prefix)
        }
        SimulationParams::LorenzAttractor(inner_params) => {
            render_lorenz_attractor(inner_params, file_prefix)
        }
        SimulationParams::Mandelbrot(inner_params) => render_mandelbrot(inner_params, file_prefix),
    }
}
