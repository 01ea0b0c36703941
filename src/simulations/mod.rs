pub mod common;
pub mod double_pendulum;
pub mod lorenz_attractor;
pub mod mandelbrot;
