//! Explicit ODE solvers

use nalgebra::SVector;

/// Single step of the classical 4th-order Runge-Kutta method.
pub fn rk4_method_step<F, const D: usize>(
    dt: f64,
    t: f64,
    x: SVector<f64, D>,
    dynamics: &F,
) -> SVector<f64, D>
where
    F: Fn(f64, SVector<f64, D>) -> SVector<f64, D>,
{
    let t_mid = t + 0.5 * dt;
    let t_next = t + dt;
    let k1 = dynamics(t, x) * dt;
    let k2 = dynamics(t_mid, x + k1 * 0.5) * dt;
    let k3 = dynamics(t_mid, x + k2 * 0.5) * dt;
    let k4 = dynamics(t_next, x + k3) * dt;
    const ONE_BY_SIX: f64 = 1.0 / 6.0;
    let x_delta = (k1 + k2 * 2.0 + k3 * 2.0 + k4) * ONE_BY_SIX;
    x + x_delta
}

/// Takes `n_steps` fixed steps of size `dt`, starting at `t_begin`.
pub fn rk4_advance<F, const D: usize>(
    dt: f64,
    t_begin: f64,
    n_steps: u32,
    x0: SVector<f64, D>,
    dynamics: &F,
) -> SVector<f64, D>
where
    F: Fn(f64, SVector<f64, D>) -> SVector<f64, D>,
{
    let mut x = x0;
    let mut t = t_begin;
    for _ in 0..n_steps {
        x = rk4_method_step(dt, t, x, dynamics);
        t += dt;
    }
    x
}

pub fn rk4_simulate<F, const D: usize>(
    t_begin: f64,
    t_final: f64,
    n_steps: u32,
    x0: SVector<f64, D>,
    dynamics: &F,
) -> SVector<f64, D>
where
    F: Fn(f64, SVector<f64, D>) -> SVector<f64, D>,
{
    let dt = (t_final - t_begin) / (n_steps as f64);
    let mut x = x0;
    for i_step in 0..n_steps {
        let alpha = (i_step as f64) / (n_steps as f64);
        let t = t_begin + alpha * (t_final - t_begin);
        x = rk4_method_step(dt, t, x, dynamics);
    }
    x
}

/// Returns `point_count` states: the initial state, followed by one state per step.
pub fn rk4_trajectory<F, const D: usize>(
    dt: f64,
    t_begin: f64,
    point_count: usize,
    x0: SVector<f64, D>,
    dynamics: &F,
) -> Vec<SVector<f64, D>>
where
    F: Fn(f64, SVector<f64, D>) -> SVector<f64, D>,
{
    let mut trajectory = Vec::with_capacity(point_count);
    if point_count == 0 {
        return trajectory;
    }
    trajectory.push(x0);
    let mut t = t_begin;
    for i in 1..point_count {
        let x_next = rk4_method_step(dt, t, trajectory[i - 1], dynamics);
        trajectory.push(x_next);
        t += dt;
    }
    trajectory
}
