//! Stewart platform (hexapod) kinematics.
//!
//! Inverse kinematics is closed form: each strut length is the distance between its base joint
//! and the transformed platform joint. Forward kinematics has no closed form and is solved with
//! Newton-Raphson iteration, refining a pose estimate with the analytic inverse Jacobian until
//! the strut lengths of the estimate match the measured ones.
//!
//! With a non-zero `screw_lead`, a strut that twists between its joint axes reads a length
//! shifted by the lead times the number of turns. Both directions account for it.

extern crate nalgebra as na;

use std::f64::consts::TAU;

use na::{Isometry3, Matrix6, Translation3, UnitQuaternion, Vector3, Vector6};
use tracing::debug;

use crate::convergence::{Convergence, IterationStats, Solved};
use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::kinematics_error::KinematicsError;
use crate::linalg::{invert, multiply};
use crate::parameters::HexapodParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

/// Strut lengths for the given platform pose.
pub fn inverse_kinematics(parameters: &HexapodParameters, pose: &Pose) -> [f64; 6] {
    let platform = parameters.effective_platform();
    let rotation = pose.rotation();
    let struts = strut_vectors(&parameters.base, &platform, &rotation, &pose.tran);
    strut_lengths(parameters, &rotation, &struts)
}

/// Lengths as the strut encoders read them: joint distance plus the screw lead correction.
fn strut_lengths(
    parameters: &HexapodParameters,
    rotation: &UnitQuaternion<f64>,
    struts: &[Vector3<f64>; 6],
) -> [f64; 6] {
    std::array::from_fn(|i| {
        let length = struts[i].norm();
        if parameters.screw_lead == 0.0 {
            return length;
        }
        let twist = strut_twist(&struts[i], &parameters.base_normal[i], &(rotation * parameters.platform_normal[i]));
        length + parameters.screw_lead * twist / TAU
    })
}

/// Signed angle around the strut between the base and platform joint axes, both projected
/// onto the plane normal to the strut. Radians.
fn strut_twist(strut: &Vector3<f64>, base_normal: &Vector3<f64>, platform_normal: &Vector3<f64>) -> f64 {
    let direction = strut.normalize();
    let base = base_normal - direction * base_normal.dot(&direction);
    let platform = platform_normal - direction * platform_normal.dot(&direction);
    direction.dot(&base.cross(&platform)).atan2(base.dot(&platform))
}

/// Inverse Jacobian at the given pose: row `i` maps a platform twist (linear, angular) onto
/// the rate of change of strut `i`.
pub fn inverse_jacobian(parameters: &HexapodParameters, pose: &Pose) -> Matrix6<f64> {
    let platform = parameters.effective_platform();
    let rotation = pose.rotation();
    let struts = strut_vectors(&parameters.base, &platform, &rotation, &pose.tran);
    jacobian_rows(&platform, &rotation, &struts)
}

/// Platform pose producing the given strut lengths, starting from `estimate`.
///
/// Each iteration computes the strut errors of the current estimate, stops with `Diverging`
/// if their absolute sum exceeds `max_error`, and otherwise corrects the estimate by the
/// inverse Jacobian applied to the errors. Converged once the summed error is not above
/// `criterion`. Extra axes (u, v, w) of the estimate are carried through.
pub fn forward_kinematics(
    parameters: &HexapodParameters,
    convergence: &Convergence,
    struts: &[f64; 6],
    estimate: &Pose,
) -> Result<Solved<Pose>, KinematicsError> {
    if struts.iter().any(|&l| !l.is_finite() || l <= 0.0) {
        return Err(KinematicsError::InvalidInput("strut length must be positive and finite"));
    }

    let platform = parameters.effective_platform();
    let mut translation = estimate.tran;
    let mut rotation = estimate.rotation();

    for iteration in 1..=convergence.iteration_limit {
        let vectors = strut_vectors(&parameters.base, &platform, &rotation, &translation);
        let lengths = strut_lengths(parameters, &rotation, &vectors);
        let errors = Vector6::from_fn(|i, _| lengths[i] - struts[i]);
        let residual: f64 = errors.iter().map(|e| e.abs()).sum();

        if residual > convergence.max_error {
            debug!(iteration, residual, limit = convergence.max_error, "hexapod forward kinematics diverging");
            return Err(KinematicsError::Diverging {
                error: residual,
                limit: convergence.max_error,
                iterations: iteration,
            });
        }

        // The screw correction is left out of the Jacobian, it varies slowly with the pose
        let jacobian = jacobian_rows(&platform, &rotation, &vectors);
        let inverse = invert(&jacobian).inspect_err(|_| {
            debug!(iteration, residual, "hexapod inverse Jacobian is singular");
        })?;
        let correction = multiply(&inverse, &errors);

        translation -= correction.fixed_rows::<3>(0);
        rotation = UnitQuaternion::from_scaled_axis(-correction.fixed_rows::<3>(3)) * rotation;

        if residual <= convergence.criterion {
            let isometry = Isometry3::from_parts(Translation3::from(translation), rotation);
            return Ok(Solved {
                value: estimate.with_isometry(&isometry),
                iterations: iteration,
            });
        }
    }

    debug!(iterations = convergence.iteration_limit, "hexapod forward kinematics did not converge");
    Err(KinematicsError::NoConvergence { iterations: convergence.iteration_limit })
}

/// Base-frame vectors from every base joint to its platform joint.
fn strut_vectors(
    base: &[Vector3<f64>; 6],
    platform: &[Vector3<f64>; 6],
    rotation: &UnitQuaternion<f64>,
    translation: &Vector3<f64>,
) -> [Vector3<f64>; 6] {
    std::array::from_fn(|i| rotation * platform[i] + translation - base[i])
}

fn jacobian_rows(
    platform: &[Vector3<f64>; 6],
    rotation: &UnitQuaternion<f64>,
    struts: &[Vector3<f64>; 6],
) -> Matrix6<f64> {
    let mut jacobian = Matrix6::zeros();
    for i in 0..6 {
        let direction = struts[i] / struts[i].norm();
        let moment = (rotation * platform[i]).cross(&direction);
        for k in 0..3 {
            jacobian[(i, k)] = direction[k];
            jacobian[(i, k + 3)] = moment[k];
        }
    }
    jacobian
}

/// Hexapod with shared, runtime adjustable geometry and convergence limits.
#[derive(Debug)]
pub struct Hexapod {
    parameters: SharedParameters<HexapodParameters>,
    convergence: SharedParameters<Convergence>,
    stats: IterationStats,
}

impl Hexapod {
    pub fn new(parameters: HexapodParameters) -> Self {
        Self::with_convergence(parameters, Convergence::default())
    }

    pub fn with_convergence(parameters: HexapodParameters, convergence: Convergence) -> Self {
        Hexapod {
            parameters: SharedParameters::new(parameters),
            convergence: SharedParameters::new(convergence),
            stats: IterationStats::new(),
        }
    }

    pub fn parameters(&self) -> &SharedParameters<HexapodParameters> {
        &self.parameters
    }

    pub fn convergence(&self) -> &SharedParameters<Convergence> {
        &self.convergence
    }

    /// Iterations used by forward kinematics.
    pub fn stats(&self) -> &IterationStats {
        &self.stats
    }

    fn solve(&self, joints: &Joints, estimate: Option<&Pose>) -> ForwardResult {
        check_joints(joints)?;
        if let Some(estimate) = estimate {
            check_pose(estimate)?;
        }
        joints.expect_len(6)?;
        let parameters = self.parameters.snapshot();
        let convergence = self.convergence.snapshot();
        let struts: [f64; 6] = std::array::from_fn(|i| joints[i]);
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

impl Kinematics for Hexapod {
    /// Starts the iteration from the home pose.
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        self.solve(joints, None)
    }

    fn forward_continuing(&self, joints: &Joints, previous: &Pose, _fflags: ForwardFlags) -> ForwardResult {
        self.solve(joints, Some(previous))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let parameters = self.parameters.snapshot();
        let struts = inverse_kinematics(&parameters, pose);
        Ok((Joints::from(struts), ForwardFlags::empty()))
    }

    fn home_joints(&self) -> Option<Joints> {
        let parameters = self.parameters.snapshot();
        Some(Joints::from(inverse_kinematics(&parameters, &parameters.home)))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const HOME_STRUT: f64 = 451.17180776206743;

    fn target() -> Pose {
        Pose::new(10.0, -20.0, 380.0, 5.0, -3.0, 8.0)
    }

    #[test]
    fn test_inverse_at_home() {
        let struts = inverse_kinematics(&HexapodParameters::default(), &Pose::from_xyz(0.0, 0.0, 400.0));
        for s in struts {
            assert_abs_diff_eq!(s, HOME_STRUT, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_inverse_tilted() {
        let expected = [
            418.8149462852658, 449.11288036478044, 448.06439871661996,
            450.4993422344462, 409.0545047754048, 433.36804058999326,
        ];
        let struts = inverse_kinematics(&HexapodParameters::default(), &target());
        for (s, e) in struts.iter().zip(expected) {
            assert_abs_diff_eq!(*s, e, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_exact_estimate_converges_in_one_iteration() {
        let parameters = HexapodParameters::default();
        let struts = inverse_kinematics(&parameters, &target());
        let solved = forward_kinematics(&parameters, &Convergence::default(), &struts, &target())
            .expect("exact estimate");
        assert_eq!(solved.iterations, 1);
        assert!(solved.value.approx_eq(&target(), 1e-9, 1e-9));
    }

    #[test]
    fn test_forward_from_home_estimate() {
        let parameters = HexapodParameters::default();
        let struts = inverse_kinematics(&parameters, &target());
        let solved = forward_kinematics(&parameters, &Convergence::default(), &struts, &parameters.home)
            .expect("converges");
        assert!(solved.iterations >= 3 && solved.iterations <= 7, "{} iterations", solved.iterations);
        assert!(solved.value.approx_eq(&target(), 1e-8, 1e-8), "{:?}", solved.value);
    }

    #[test]
    fn test_short_struts_diverge_under_default_ceiling() {
        let parameters = HexapodParameters::default();
        let result = forward_kinematics(&parameters, &Convergence::default(), &[1.0; 6], &parameters.home);
        match result {
            Err(KinematicsError::Diverging { error, limit, iterations }) => {
                assert_eq!(iterations, 1);
                assert_eq!(limit, 500.0);
                assert_abs_diff_eq!(error, 2701.030846572405, epsilon = 1e-6);
            }
            other => panic!("expected divergence, got {:?}", other),
        }
    }

    #[test]
    fn test_short_struts_exhaust_iterations() {
        let parameters = HexapodParameters::default();
        let convergence = Convergence { max_error: 1e12, ..Convergence::default() };
        let result = forward_kinematics(&parameters, &convergence, &[1.0; 6], &parameters.home);
        assert_eq!(result, Err(KinematicsError::NoConvergence { iterations: 120 }));
    }

    #[test]
    fn test_unreachable_struts_stop_at_iteration_limit() {
        // Shorter than the platform lying flat on the base (208.7), yet the summed error of the
        // first estimates stays under the default ceiling
        let convergence = Convergence { iteration_limit: 4, ..Convergence::default() };
        let hexapod = Hexapod::with_convergence(HexapodParameters::default(), convergence);
        let result = hexapod.forward_continuing(
            &Joints::from([200.0; 6]),
            &Pose::from_xyz(0.0, 0.0, 100.0),
            ForwardFlags::empty(),
        );
        assert_eq!(result, Err(KinematicsError::NoConvergence { iterations: 4 }));
        assert_eq!(hexapod.stats().last(), 4);

        // One more iteration crosses the ceiling
        hexapod.convergence().replace(Convergence::default());
        let result = hexapod.forward_continuing(
            &Joints::from([200.0; 6]),
            &Pose::from_xyz(0.0, 0.0, 100.0),
            ForwardFlags::empty(),
        );
        assert!(matches!(result, Err(KinematicsError::Diverging { iterations: 5, .. })), "{:?}", result);
    }

    #[test]
    fn test_screw_lead_at_home() {
        let parameters = HexapodParameters { screw_lead: 5.0, ..HexapodParameters::default() };
        let struts = inverse_kinematics(&parameters, &parameters.home);
        // Joint axes 69.85 degrees apart around each strut, alternating in sign
        let correction = 0.9701316680663453;
        for (i, s) in struts.iter().enumerate() {
            let expected = if i % 2 == 0 { HOME_STRUT - correction } else { HOME_STRUT + correction };
            assert_abs_diff_eq!(*s, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_screw_lead_round_trip() {
        let parameters = HexapodParameters { screw_lead: 5.0, ..HexapodParameters::default() };
        let expected = [
            417.89330626223256, 450.11573280512044, 447.2947687751664,
            451.6003704832558, 408.2782901431411, 434.5606371811209,
        ];
        let struts = inverse_kinematics(&parameters, &target());
        for (s, e) in struts.iter().zip(expected) {
            assert_abs_diff_eq!(*s, e, epsilon = 1e-9);
        }
        let solved = forward_kinematics(&parameters, &Convergence::default(), &struts, &parameters.home)
            .expect("converges");
        assert!(solved.value.approx_eq(&target(), 1e-8, 1e-8), "{:?}", solved.value);
    }

    #[test]
    fn test_normals_unused_without_screw_lead() {
        let mut parameters = HexapodParameters::default();
        parameters.base_normal = [Vector3::x(); 6];
        parameters.platform_normal = [Vector3::y(); 6];
        let struts = inverse_kinematics(&parameters, &target());
        assert_eq!(struts, inverse_kinematics(&HexapodParameters::default(), &target()));
    }

    #[test]
    fn test_non_finite_pose_rejected() {
        let hexapod = Hexapod::new(HexapodParameters::default());
        let result = hexapod.inverse(&Pose::from_xyz(f64::NAN, 0.0, 400.0), InverseFlags::empty());
        assert!(matches!(result, Err(KinematicsError::InvalidInput(_))));
        let mut estimate = target();
        estimate.a = f64::INFINITY;
        let joints = Joints::from([HOME_STRUT; 6]);
        let result = hexapod.forward_continuing(&joints, &estimate, ForwardFlags::empty());
        assert!(matches!(result, Err(KinematicsError::InvalidInput(_))));
    }

    #[test]
    fn test_non_positive_strut_rejected() {
        let parameters = HexapodParameters::default();
        let mut struts = [HOME_STRUT; 6];
        struts[4] = 0.0;
        let result = forward_kinematics(&parameters, &Convergence::default(), &struts, &parameters.home);
        assert!(matches!(result, Err(KinematicsError::InvalidInput(_))));
        struts[4] = f64::NAN;
        let result = forward_kinematics(&parameters, &Convergence::default(), &struts, &parameters.home);
        assert!(matches!(result, Err(KinematicsError::InvalidInput(_))));
    }

    #[test]
    fn test_coplanar_platform_is_singular() {
        // Platform in the base plane: no strut has a vertical component
        let jacobian = inverse_jacobian(&HexapodParameters::default(), &Pose::from_xyz(0.0, 0.0, 0.0));
        assert_eq!(invert(&jacobian), Err(KinematicsError::Singular));
    }

    #[test]
    fn test_tool_offset_change_is_seen_by_next_call() {
        let hexapod = Hexapod::new(HexapodParameters::default());
        hexapod.parameters().update(|p| p.tool_offset = 100.0);
        let (joints, _) = hexapod
            .inverse(&Pose::from_xyz(0.0, 0.0, 300.0), InverseFlags::empty())
            .expect("closed form");
        for s in joints.iter() {
            assert_abs_diff_eq!(*s, HOME_STRUT, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_kinematics_round_trip_and_stats() {
        let hexapod = Hexapod::new(HexapodParameters::default());
        let (joints, fflags) = hexapod.inverse(&target(), InverseFlags::empty()).expect("closed form");
        let (pose, _) = hexapod.forward(&joints, fflags).expect("converges");
        assert!(pose.approx_eq(&target(), 1e-8, 1e-8));
        let from_home = hexapod.stats().last();
        assert!(from_home > 1);

        hexapod.forward_continuing(&joints, &target(), fflags).expect("converges");
        assert_eq!(hexapod.stats().last(), 1);
        assert_eq!(hexapod.stats().worst(), from_home);
    }

    #[test]
    fn test_home() {
        let hexapod = Hexapod::new(HexapodParameters::default());
        let (pose, joints) = hexapod
            .home(&Pose::from_xyz(0.0, 0.0, 390.0), &Joints::from([0.0; 6]))
            .expect("home converges");
        assert_abs_diff_eq!(joints[0], HOME_STRUT, epsilon = 1e-9);
        assert!(pose.approx_eq(&Pose::from_xyz(0.0, 0.0, 400.0), 1e-8, 1e-8));
    }

    #[test]
    fn test_wrong_joint_count() {
        let hexapod = Hexapod::new(HexapodParameters::default());
        let result = hexapod.forward(&Joints::from([HOME_STRUT; 5]), ForwardFlags::empty());
        assert!(matches!(result, Err(KinematicsError::InvalidInput(_))));
    }
}
