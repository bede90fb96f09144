//! Convergence controls and iteration diagnostics of the Newton solvers

use std::sync::atomic::{AtomicU32, Ordering};

/// Tunable limits of an iterative solver.
///
/// `criterion` is the linear threshold: the summed absolute strut error for parallel
/// machines, the largest linear joint correction for serial chains. `angular_criterion`
/// (radians) only applies to revolute joints of serial chains. `max_error` is the divergence
/// ceiling of parallel machines; serial chains do not use it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    pub iteration_limit: u32,
    pub criterion: f64,
    pub angular_criterion: f64,
    pub max_error: f64,
}

impl Default for Convergence {
    /// Limits for the hexapod and pentapod forward solvers.
    fn default() -> Self {
        Convergence {
            iteration_limit: 120,
            criterion: 1e-9,
            angular_criterion: 1e-9,
            max_error: 500.0,
        }
    }
}

impl Convergence {
    /// Limits for the serial chain inverse solver.
    pub fn serial() -> Self {
        Convergence {
            iteration_limit: 100,
            criterion: 1e-6,
            angular_criterion: 1e-6,
            max_error: f64::INFINITY,
        }
    }
}

/// Iterations consumed by the most recent call and the worst seen since the last reset.
///
/// Updated with relaxed atomics so the solver can write it through a shared reference while
/// an operator display reads it. Failed calls are recorded too.
#[derive(Debug, Default)]
pub struct IterationStats {
    last: AtomicU32,
    worst: AtomicU32,
}

impl IterationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, iterations: u32) {
        self.last.store(iterations, Ordering::Relaxed);
        self.worst.fetch_max(iterations, Ordering::Relaxed);
    }

    pub fn last(&self) -> u32 {
        self.last.load(Ordering::Relaxed)
    }

    pub fn worst(&self) -> u32 {
        self.worst.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.last.store(0, Ordering::Relaxed);
        self.worst.store(0, Ordering::Relaxed);
    }
}

/// Output of an iterative solve together with the iterations it took.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solved<T> {
    pub value: T,
    pub iterations: u32,
}
