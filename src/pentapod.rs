//! Five-strut parallel kinematics.
//!
//! Every strut ends on a ring turning freely around the tool axis, so the platform has five
//! degrees of freedom: position and the two tilts `a` (about X) and `b` (about Y). The roll `c`
//! is not constrained and is carried through from the estimate. A strut attaches to the point
//! of its ring nearest to its base joint.

extern crate nalgebra as na;

use na::{Matrix5, UnitQuaternion, Vector3, Vector5};
use tracing::debug;

use crate::convergence::{Convergence, IterationStats, Solved};
use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::kinematics_error::KinematicsError;
use crate::linalg::{invert, multiply, SINGULAR_EPSILON};
use crate::parameters::PentapodParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

/// Tool axis orientation, tilts in radians: `Ry(b) * Rx(a)`.
fn tool_rotation(a: f64, b: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(a, b, 0.0)
}

/// Ring attachment point of every strut, base frame.
fn ring_points(
    parameters: &PentapodParameters,
    translation: &Vector3<f64>,
    a: f64,
    b: f64,
) -> Result<[Vector3<f64>; 5], KinematicsError> {
    let axis = tool_rotation(a, b) * Vector3::z();
    let mut points = [Vector3::zeros(); 5];
    for i in 0..5 {
        let center = translation + axis * parameters.ring_position[i];
        let towards_base = parameters.base[i] - center;
        let in_plane = towards_base - axis * towards_base.dot(&axis);
        let distance = in_plane.norm();
        if distance < SINGULAR_EPSILON {
            // Base joint on the tool axis: every ring point is equally near
            return Err(KinematicsError::Singular);
        }
        points[i] = center + in_plane * (parameters.ring_radius[i] / distance);
    }
    Ok(points)
}

/// Strut lengths for the given pose (`a`, `b` in degrees, `c` ignored).
pub fn inverse_kinematics(parameters: &PentapodParameters, pose: &Pose) -> Result<[f64; 5], KinematicsError> {
    let points = ring_points(parameters, &pose.tran, pose.a.to_radians(), pose.b.to_radians())?;
    Ok(std::array::from_fn(|i| (points[i] - parameters.base[i]).norm()))
}

/// Inverse Jacobian: row `i` maps (dx, dy, dz, da, db) onto the rate of change of strut `i`.
/// The ring points are extremal, so sliding along a ring does not change the length to first
/// order and only the rigid motion of the attachment point counts.
pub fn inverse_jacobian(parameters: &PentapodParameters, pose: &Pose) -> Result<Matrix5<f64>, KinematicsError> {
    let (a, b) = (pose.a.to_radians(), pose.b.to_radians());
    let points = ring_points(parameters, &pose.tran, a, b)?;
    Ok(jacobian_rows(parameters, &points, &pose.tran, b))
}

fn jacobian_rows(parameters: &PentapodParameters, points: &[Vector3<f64>; 5], translation: &Vector3<f64>, b: f64) -> Matrix5<f64> {
    // Rotating `a` turns the platform about the X axis already tilted by `b`
    let a_axis = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), b) * Vector3::x();
    let b_axis = Vector3::y();
    let mut jacobian = Matrix5::zeros();
    for i in 0..5 {
        let strut = points[i] - parameters.base[i];
        let direction = strut / strut.norm();
        let moment = (points[i] - translation).cross(&direction);
        jacobian[(i, 0)] = direction.x;
        jacobian[(i, 1)] = direction.y;
        jacobian[(i, 2)] = direction.z;
        jacobian[(i, 3)] = moment.dot(&a_axis);
        jacobian[(i, 4)] = moment.dot(&b_axis);
    }
    jacobian
}

/// Pose producing the given strut lengths, starting from `estimate`. Same iteration and
/// termination rules as the hexapod.
pub fn forward_kinematics(
    parameters: &PentapodParameters,
    convergence: &Convergence,
    struts: &[f64; 5],
    estimate: &Pose,
) -> Result<Solved<Pose>, KinematicsError> {
    if struts.iter().any(|&l| !l.is_finite() || l <= 0.0) {
        return Err(KinematicsError::InvalidInput("strut length must be positive and finite"));
    }

    let mut translation = estimate.tran;
    let mut a = estimate.a.to_radians();
    let mut b = estimate.b.to_radians();

    for iteration in 1..=convergence.iteration_limit {
        let points = ring_points(parameters, &translation, a, b)?;
        let errors = Vector5::from_fn(|i, _| (points[i] - parameters.base[i]).norm() - struts[i]);
        let residual: f64 = errors.iter().map(|e| e.abs()).sum();

        if residual > convergence.max_error {
            debug!(iteration, residual, limit = convergence.max_error, "pentapod forward kinematics diverging");
            return Err(KinematicsError::Diverging {
                error: residual,
                limit: convergence.max_error,
                iterations: iteration,
            });
        }

        let jacobian = jacobian_rows(parameters, &points, &translation, b);
        let inverse = invert(&jacobian).inspect_err(|_| {
            debug!(iteration, residual, "pentapod inverse Jacobian is singular");
        })?;
        let correction = multiply(&inverse, &errors);

        translation -= correction.fixed_rows::<3>(0);
        a -= correction[3];
        b -= correction[4];

        if residual <= convergence.criterion {
            let pose = Pose {
                tran: translation,
                a: a.to_degrees(),
                b: b.to_degrees(),
                ..*estimate
            };
            return Ok(Solved { value: pose, iterations: iteration });
        }
    }

    debug!(iterations = convergence.iteration_limit, "pentapod forward kinematics did not converge");
    Err(KinematicsError::NoConvergence { iterations: convergence.iteration_limit })
}

#[derive(Debug)]
pub struct Pentapod {
    parameters: SharedParameters<PentapodParameters>,
    convergence: SharedParameters<Convergence>,
    stats: IterationStats,
}

impl Pentapod {
    pub fn new(parameters: PentapodParameters) -> Self {
        Self::with_convergence(parameters, Convergence::default())
    }

    pub fn with_convergence(parameters: PentapodParameters, convergence: Convergence) -> Self {
        Pentapod {
            parameters: SharedParameters::new(parameters),
            convergence: SharedParameters::new(convergence),
            stats: IterationStats::new(),
        }
    }

    pub fn parameters(&self) -> &SharedParameters<PentapodParameters> {
        &self.parameters
    }

    pub fn convergence(&self) -> &SharedParameters<Convergence> {
        &self.convergence
    }

    pub fn stats(&self) -> &IterationStats {
        &self.stats
    }

    fn solve(&self, joints: &Joints, estimate: Option<&Pose>) -> ForwardResult {
        check_joints(joints)?;
        if let Some(estimate) = estimate {
            check_pose(estimate)?;
        }
        joints.expect_len(5)?;
        let parameters = self.parameters.snapshot();
        let convergence = self.convergence.snapshot();
        let struts: [f64; 5] = std::array::from_fn(|i| joints[i]);
        let estimate = estimate.unwrap_or(&parameters.home);

        let result = forward_kinematics(&parameters, &convergence, &struts, estimate);
        match &result {
            Ok(solved) => self.stats.record(solved.iterations),
            Err(KinematicsError::NoConvergence { iterations })
            | Err(KinematicsError::Diverging { iterations, .. }) => self.stats.record(*iterations),
            Err(_) => {}
        }
        result.map(|solved| (solved.value, InverseFlags::empty()))
    }
}

impl Kinematics for Pentapod {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        self.solve(joints, None)
    }

    fn forward_continuing(&self, joints: &Joints, previous: &Pose, _fflags: ForwardFlags) -> ForwardResult {
        self.solve(joints, Some(previous))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let parameters = self.parameters.snapshot();
        let struts = inverse_kinematics(&parameters, pose)?;
        Ok((Joints::from(struts), ForwardFlags::empty()))
    }

    fn home_joints(&self) -> Option<Joints> {
        let parameters = self.parameters.snapshot();
        inverse_kinematics(&parameters, &parameters.home).ok().map(Joints::from)
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn target() -> Pose {
        Pose::new(15.0, -10.0, -480.0, 6.0, -4.0, 0.0)
    }

    #[test]
    fn test_inverse_at_home() {
        let struts = inverse_kinematics(&PentapodParameters::default(), &Pose::from_xyz(0.0, 0.0, -500.0))
            .expect("regular pose");
        let long = 474.23622805517505;
        let short = 406.07881008493905;
        for (s, e) in struts.iter().zip([long, short, long, short, long]) {
            assert_abs_diff_eq!(*s, e, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_forward_from_home() {
        let parameters = PentapodParameters::default();
        let struts = inverse_kinematics(&parameters, &target()).expect("regular pose");
        assert_abs_diff_eq!(struts[0], 453.49537304359836, epsilon = 1e-9);
        let solved = forward_kinematics(&parameters, &Convergence::default(), &struts, &parameters.home)
            .expect("converges");
        assert!(solved.iterations >= 4 && solved.iterations <= 8, "{} iterations", solved.iterations);
        assert!(solved.value.approx_eq(&target(), 1e-8, 1e-8), "{:?}", solved.value);
    }

    #[test]
    fn test_roll_is_carried_through() {
        let parameters = PentapodParameters::default();
        let struts = inverse_kinematics(&parameters, &target()).expect("regular pose");
        let seed = Pose { c: 33.0, ..target() };
        let solved = forward_kinematics(&parameters, &Convergence::default(), &struts, &seed)
            .expect("converges");
        assert_eq!(solved.iterations, 1);
        assert_eq!(solved.value.c, 33.0);
    }

    #[test]
    fn test_short_struts_diverge() {
        let pentapod = Pentapod::new(PentapodParameters::default());
        let result = pentapod.forward(&Joints::from([1.0; 5]), ForwardFlags::empty());
        assert!(matches!(result, Err(KinematicsError::Diverging { iterations: 1, .. })));
        assert_eq!(pentapod.stats().last(), 1);
    }

    #[test]
    fn test_base_joint_on_tool_axis() {
        let mut parameters = PentapodParameters::default();
        parameters.base[2] = Vector3::new(0.0, 0.0, 0.0);
        let result = inverse_kinematics(&parameters, &Pose::from_xyz(0.0, 0.0, -500.0));
        assert_eq!(result, Err(KinematicsError::Singular));
    }

    #[test]
    fn test_round_trip_through_trait() {
        let pentapod = Pentapod::new(PentapodParameters::default());
        let (joints, fflags) = pentapod.inverse(&target(), InverseFlags::empty()).expect("regular pose");
        assert_eq!(joints.len(), 5);
        let (pose, _) = pentapod.forward(&joints, fflags).expect("converges");
        assert!(pose.approx_eq(&target(), 1e-8, 1e-8));
        assert_eq!(pentapod.joint_count(), 5);
    }
}
