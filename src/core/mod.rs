pub mod animation;
pub mod color_map;
pub mod file_io;
pub mod image_utils;
pub mod interpolation;
pub mod ode_solvers;
pub mod raster;
pub mod stopwatch;
