//! Forward and inverse kinematics for CNC machines and robots, written for use inside a
//! periodic motion control loop.
//!
//! Every machine topology implements the same [`Kinematics`](kinematic_traits::Kinematics)
//! trait: joint positions to a world pose (`forward`), a world pose to joint positions
//! (`inverse`), plus `_continuing` variants that take the previous cycle's result as their
//! starting point. Ambiguous geometries report and accept branch flags, so the controller
//! keeps the same elbow or platform side over successive calls.
//!
//! # Features
//!
//! - Closed form: trivial (identity) machines with gantry support, CoreXY, rotated XY, SCARA,
//!   Scorbot, PUMA arms with all eight branches, rotary and linear delta, tripod, tilting rotary
//!   tables (XYZAC and XYZBC), 5-axis spindle head, pivoting head over a rotary table, rose
//!   engine.
//! - Newton-Raphson forward kinematics of hexapods (Stewart platforms, with optional strut
//!   screw lead correction) and pentapods, with a bounded iteration count, divergence detection
//!   and iteration statistics.
//! - Generic serial chains in modified Denavit-Hartenberg form, iterative inverse kinematics with
//!   least-squares or minimum-norm pseudo-inverse for chains with other than six joints.
//! - Jacobian utilities: joint velocities from a Cartesian velocity, joint torques from a
//!   wrench.
//! - Geometry that the controller may change at runtime (tool length, for example) without
//!   any call ever seeing a half-written table.
//! - Configuration from YAML with a `deg(angle)` extension (feature `allow_filesystem`).
//!
//! # Units
//!
//! Lengths are in machine units (whatever the geometry tables use), angles at the interface
//! are in degrees. Link twists of serial chains are stored in radians.
//!
//! # Errors
//!
//! No call panics on bad input. Unreachable targets, singular configurations, failed or
//! diverging iterations and invalid input are returned as
//! [`KinematicsError`](kinematics_error::KinematicsError); what to do next is up to the caller.
//!
//! ```
//! use rs_cnc_kinematics::kinematic_traits::{ForwardFlags, InverseFlags, Joints, Kinematics};
//! use rs_cnc_kinematics::topology::Topology;
//!
//! let machine = Topology::from_name("scarakins").expect("known topology");
//! let (pose, iflags) = machine
//!     .forward(&Joints::from([10.0, 45.0, 20.0, 0.0]), ForwardFlags::empty())
//!     .expect("closed form");
//! let (joints, _) = machine.inverse(&pose, iflags).expect("reachable");
//! assert!((joints[1] - 45.0).abs() < 1e-9);
//! ```

pub mod kinematic_traits;
pub mod kinematics_error;
pub mod pose;

pub mod linalg;
pub mod convergence;
pub mod shared;

pub mod parameters;
pub mod parameters_machines;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;
#[cfg(feature = "allow_filesystem")]
pub mod parameter_error;

pub mod trivial;
pub mod corexy;
pub mod rotated_xy;
pub mod scara;
pub mod scorbot;
pub mod puma;
pub mod rotary_delta;
pub mod linear_delta;
pub mod tripod;
pub mod trunnion;
pub mod five_axis;
pub mod pivot_head;
pub mod rose;

pub mod hexapod;
pub mod pentapod;
pub mod serial;
pub mod jacobian;

pub mod topology;

pub mod utils;

#[cfg(test)]
mod tests;
