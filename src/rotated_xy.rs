//! Cartesian machine with rotated X and Y joint axes (rotatekins).
//!
//! The X and Y joints move along axes turned by `angle` around Z against the world frame.
//! Joints after the first two drive Z, A, B, C, U, V and W directly.

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
    MAX_JOINTS,
};
use crate::kinematics_error::KinematicsError;
use crate::parameters::RotatedXyParameters;
use crate::pose::{Axis, Pose};
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

#[derive(Debug)]
pub struct RotatedXy {
    parameters: SharedParameters<RotatedXyParameters>,
}

impl RotatedXy {
    pub fn new(parameters: RotatedXyParameters) -> Self {
        RotatedXy { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<RotatedXyParameters> {
        &self.parameters
    }

    fn checked(&self) -> Result<RotatedXyParameters, KinematicsError> {
        let p = self.parameters.snapshot();
        if !(2..=MAX_JOINTS).contains(&p.joint_count) {
            return Err(KinematicsError::InvalidInput("rotated XY needs 2 to MAX_JOINTS joints"));
        }
        if !p.angle.is_finite() {
            return Err(KinematicsError::InvalidInput("rotation angle is not finite"));
        }
        Ok(p)
    }
}

impl Kinematics for RotatedXy {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        let p = self.checked()?;
        joints.expect_len(p.joint_count)?;
        let (sin, cos) = p.angle.to_radians().sin_cos();
        let mut pose = Pose::default();
        pose.tran.x = joints[0] * cos - joints[1] * sin;
        pose.tran.y = joints[0] * sin + joints[1] * cos;
        for i in 2..p.joint_count {
            pose.set_axis(Axis::ALL[i], joints[i]);
        }
        Ok((pose, InverseFlags::empty()))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let p = self.checked()?;
        let (sin, cos) = p.angle.to_radians().sin_cos();
        let mut joints = Joints::zeros(p.joint_count)?;
        joints[0] = pose.tran.x * cos + pose.tran.y * sin;
        joints[1] = pose.tran.y * cos - pose.tran.x * sin;
        for i in 2..p.joint_count {
            joints[i] = pose.axis(Axis::ALL[i]);
        }
        Ok((joints, ForwardFlags::empty()))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        self.parameters.snapshot().joint_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_x_joint_moves_diagonally() {
        let kins = RotatedXy::new(RotatedXyParameters::default());
        let (pose, _) = kins
            .forward(&Joints::from([100.0, 0.0, 5.0]), ForwardFlags::empty())
            .expect("closed form");
        let half = 100.0 * std::f64::consts::FRAC_1_SQRT_2;
        assert_abs_diff_eq!(pose.tran.x, half, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.tran.y, half, epsilon = 1e-9);
        assert_eq!(pose.tran.z, 5.0);
    }

    #[test]
    fn test_quarter_turn() {
        let kins = RotatedXy::new(RotatedXyParameters { angle: 90.0, joint_count: 2 });
        let (joints, _) = kins
            .inverse(&Pose::from_xyz(0.0, 30.0, 0.0), InverseFlags::empty())
            .expect("closed form");
        assert_abs_diff_eq!(joints[0], 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(joints[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trip_with_extra_joints() {
        let kins = RotatedXy::new(RotatedXyParameters { angle: -30.0, joint_count: 4 });
        let joints = Joints::from([12.0, -7.5, 3.0, 45.0]);
        let (pose, iflags) = kins.forward(&joints, ForwardFlags::empty()).expect("closed form");
        assert_eq!(pose.a, 45.0);
        let (back, _) = kins.inverse(&pose, iflags).expect("closed form");
        for (found, expected) in back.iter().zip(joints.iter()) {
            assert_abs_diff_eq!(*found, *expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invalid_configuration() {
        let kins = RotatedXy::new(RotatedXyParameters { angle: 45.0, joint_count: 1 });
        assert!(kins.inverse(&Pose::default(), InverseFlags::empty()).is_err());
        let kins = RotatedXy::new(RotatedXyParameters { angle: f64::NAN, joint_count: 3 });
        assert!(matches!(
            kins.forward(&Joints::from([1.0, 2.0, 3.0]), ForwardFlags::empty()),
            Err(KinematicsError::InvalidInput(_))
        ));
    }
}
