//! Generic serial manipulator (genser) kinematics.
//!
//! Forward kinematics composes one modified Denavit-Hartenberg transform per link. Inverse
//! kinematics has no closed form for a general chain and is solved with Newton-Raphson
//! iteration on the joint vector, using the geometric Jacobian and its (pseudo) inverse.
//!
//! The orientation error is the rotation vector of `target * current⁻¹`, which takes the short
//! way around. Near a 180 degree error the axis of that vector is poorly defined and the
//! iteration may need more steps; no special handling is applied.

extern crate nalgebra as na;

use na::{Isometry3, SMatrix, Vector3, Vector6};
use tracing::debug;

use crate::convergence::{Convergence, IterationStats, Solved};
use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
    MAX_JOINTS,
};
use crate::kinematics_error::KinematicsError;
use crate::linalg::pseudo_inverse;
use crate::parameters::SerialParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose, wrap_degrees_near};

/// Geometric Jacobian storage: rows are (vx, vy, vz, wx, wy, wz), one column per joint.
pub type JacobianMatrix = SMatrix<f64, 6, MAX_JOINTS>;

/// Joint variables as the solver uses them: radians for revolute joints, length for
/// prismatic ones.
type Internal = [f64; MAX_JOINTS];

fn checked_count(parameters: &SerialParameters) -> Result<usize, KinematicsError> {
    let n = parameters.joint_count;
    if n == 0 || n > MAX_JOINTS {
        return Err(KinematicsError::InvalidInput("serial chain needs 1 to MAX_JOINTS links"));
    }
    Ok(n)
}

fn to_internal(parameters: &SerialParameters, joints: &Joints) -> Result<Internal, KinematicsError> {
    let n = checked_count(parameters)?;
    joints.expect_len(n)?;
    check_joints(joints)?;
    let mut q = [0.0; MAX_JOINTS];
    for i in 0..n {
        q[i] = if parameters.prismatic[i] { joints[i] } else { joints[i].to_radians() };
    }
    Ok(q)
}

/// Transform of one link for the given joint variable.
fn link(parameters: &SerialParameters, i: usize, q: f64) -> Isometry3<f64> {
    let (theta, d) = if parameters.prismatic[i] {
        (0.0, parameters.d[i] + q)
    } else {
        (q, parameters.d[i])
    };
    Isometry3::new(Vector3::zeros(), Vector3::x() * parameters.alpha[i])
        * Isometry3::translation(parameters.a[i], 0.0, 0.0)
        * Isometry3::new(Vector3::zeros(), Vector3::z() * theta)
        * Isometry3::translation(0.0, 0.0, d)
}

fn frames_internal(parameters: &SerialParameters, n: usize, q: &Internal) -> [Isometry3<f64>; MAX_JOINTS] {
    let mut frames = [Isometry3::identity(); MAX_JOINTS];
    let mut current = Isometry3::identity();
    for i in 0..n {
        current *= link(parameters, i, q[i]);
        frames[i] = current;
    }
    frames
}

fn jacobian_internal(parameters: &SerialParameters, n: usize, frames: &[Isometry3<f64>; MAX_JOINTS]) -> JacobianMatrix {
    let tip = frames[n - 1].translation.vector;
    let mut jacobian = JacobianMatrix::zeros();
    for i in 0..n {
        // Joint i moves along or around the Z axis of its own frame
        let axis = frames[i].rotation * Vector3::z();
        let (linear, angular) = if parameters.prismatic[i] {
            (axis, Vector3::zeros())
        } else {
            (axis.cross(&(tip - frames[i].translation.vector)), axis)
        };
        jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&linear);
        jacobian.fixed_view_mut::<3, 1>(3, i).copy_from(&angular);
    }
    jacobian
}

/// Base frame transform of every link after its joint moved. Entries past the joint count
/// are identity.
pub fn link_frames(parameters: &SerialParameters, joints: &Joints) -> Result<[Isometry3<f64>; MAX_JOINTS], KinematicsError> {
    let q = to_internal(parameters, joints)?;
    Ok(frames_internal(parameters, parameters.joint_count, &q))
}

/// Transform of the last link.
pub fn forward_kinematics(parameters: &SerialParameters, joints: &Joints) -> Result<Isometry3<f64>, KinematicsError> {
    let frames = link_frames(parameters, joints)?;
    Ok(frames[parameters.joint_count - 1])
}

/// Geometric Jacobian at the given joints, per radian for revolute joints.
pub fn geometric_jacobian(parameters: &SerialParameters, joints: &Joints) -> Result<JacobianMatrix, KinematicsError> {
    let q = to_internal(parameters, joints)?;
    let n = parameters.joint_count;
    Ok(jacobian_internal(parameters, n, &frames_internal(parameters, n, &q)))
}

/// Joints placing the last link at `target`, iterating from `seed`.
///
/// Each step maps the 6-D pose error through the (pseudo) inverse Jacobian and adds the
/// result to the joints. Converged once every correction is below `criterion` (prismatic) or
/// `angular_criterion` (revolute, radians). Revolute results are wrapped to within 180 degrees
/// of the seed.
pub fn inverse_kinematics(
    parameters: &SerialParameters,
    convergence: &Convergence,
    target: &Isometry3<f64>,
    seed: &Joints,
) -> Result<Solved<Joints>, KinematicsError> {
    let n = checked_count(parameters)?;
    let mut q = to_internal(parameters, seed)?;

    for iteration in 1..=convergence.iteration_limit {
        let frames = frames_internal(parameters, n, &q);
        let current = &frames[n - 1];
        let linear = target.translation.vector - current.translation.vector;
        let angular = (target.rotation * current.rotation.inverse()).scaled_axis();
        let error = Vector6::new(linear.x, linear.y, linear.z, angular.x, angular.y, angular.z);

        let jacobian = jacobian_internal(parameters, n, &frames);
        let inverse = pseudo_inverse(&jacobian, n).inspect_err(|_| {
            debug!(iteration, "serial chain Jacobian is singular");
        })?;
        let correction = inverse * error;

        let mut settled = true;
        for i in 0..n {
            q[i] += correction[i];
            let threshold = if parameters.prismatic[i] {
                convergence.criterion
            } else {
                convergence.angular_criterion
            };
            let small = correction[i].abs() < threshold;
            settled &= small;
        }

        if settled {
            let mut joints = *seed;
            for i in 0..n {
                joints[i] = if parameters.prismatic[i] {
                    q[i]
                } else {
                    wrap_degrees_near(q[i].to_degrees(), seed[i])
                };
            }
            return Ok(Solved { value: joints, iterations: iteration });
        }
    }

    debug!(iterations = convergence.iteration_limit, "serial chain inverse kinematics did not converge");
    Err(KinematicsError::NoConvergence { iterations: convergence.iteration_limit })
}

#[derive(Debug)]
pub struct Serial {
    parameters: SharedParameters<SerialParameters>,
    convergence: SharedParameters<Convergence>,
    stats: IterationStats,
}

impl Serial {
    pub fn new(parameters: SerialParameters) -> Self {
        Self::with_convergence(parameters, Convergence::serial())
    }

    pub fn with_convergence(parameters: SerialParameters, convergence: Convergence) -> Self {
        Serial {
            parameters: SharedParameters::new(parameters),
            convergence: SharedParameters::new(convergence),
            stats: IterationStats::new(),
        }
    }

    pub fn parameters(&self) -> &SharedParameters<SerialParameters> {
        &self.parameters
    }

    pub fn convergence(&self) -> &SharedParameters<Convergence> {
        &self.convergence
    }

    /// Iterations used by inverse kinematics.
    pub fn stats(&self) -> &IterationStats {
        &self.stats
    }

    fn solve(&self, pose: &Pose, seed: Option<&Joints>) -> InverseResult {
        check_pose(pose)?;
        let parameters = self.parameters.snapshot();
        let convergence = self.convergence.snapshot();
        let home = home_of(&parameters)?;
        let seed = seed.unwrap_or(&home);

        let result = inverse_kinematics(&parameters, &convergence, &pose.to_isometry(), seed);
        match &result {
            Ok(solved) => self.stats.record(solved.iterations),
            Err(KinematicsError::NoConvergence { iterations }) => self.stats.record(*iterations),
            Err(_) => {}
        }
        result.map(|solved| (solved.value, ForwardFlags::empty()))
    }
}

fn home_of(parameters: &SerialParameters) -> Result<Joints, KinematicsError> {
    let n = checked_count(parameters)?;
    Joints::from_slice(&parameters.home[..n])
}

impl Kinematics for Serial {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        let parameters = self.parameters.snapshot();
        let isometry = forward_kinematics(&parameters, joints)?;
        Ok((Pose::from_isometry(&isometry), InverseFlags::empty()))
    }

    /// Iterates from the home joints.
    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        self.solve(pose, None)
    }

    fn inverse_continuing(&self, pose: &Pose, previous: &Joints, _iflags: InverseFlags) -> InverseResult {
        self.solve(pose, Some(previous))
    }

    fn home_joints(&self) -> Option<Joints> {
        home_of(&self.parameters.snapshot()).ok()
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        self.parameters.snapshot().joint_count
    }
}
