//! Rose engine lathe attachment (rosekins).
//!
//! Joints are `[radius, z, c]`: the cutter slides radially while the workpiece spindle turns
//! through C (degrees, unbounded). World X and Y are the cutter position in the plane of the
//! workpiece, so a straight line in XY becomes a coordinated radius and spindle move.
//!
//! Inverse kinematics only sees the angle modulo a turn. [`Kinematics::inverse_continuing`]
//! picks the C closest to the previous joints, which keeps the spindle turning through many
//! revolutions without a jump; plain [`Kinematics::inverse`] stays within ±180 degrees.

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::pose::Pose;
use crate::utils::{check_joints, check_pose, wrap_degrees_near};

/// Below this radius the angle of the cutter is undefined and the previous C is kept.
const CENTER_RADIUS: f64 = 1e-9;

#[derive(Debug, Default)]
pub struct Rose;

impl Rose {
    pub fn new() -> Self {
        Rose
    }

    fn solve(&self, pose: &Pose, previous_c: f64) -> Joints {
        let radius = pose.tran.x.hypot(pose.tran.y);
        let c = if radius < CENTER_RADIUS {
            previous_c
        } else {
            wrap_degrees_near(pose.tran.y.atan2(pose.tran.x).to_degrees(), previous_c)
        };
        Joints::from([radius, pose.tran.z, c])
    }
}

/// Completed spindle revolutions for a C joint position, negative below zero.
pub fn revolutions(c: f64) -> i64 {
    (c / 360.0).floor() as i64
}

impl Kinematics for Rose {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(3)?;
        let (sin, cos) = joints[2].to_radians().sin_cos();
        Ok((Pose::from_xyz(joints[0] * cos, joints[0] * sin, joints[1]), InverseFlags::empty()))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        Ok((self.solve(pose, 0.0), ForwardFlags::empty()))
    }

    fn inverse_continuing(&self, pose: &Pose, previous: &Joints, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        check_joints(previous)?;
        previous.expect_len(3)?;
        Ok((self.solve(pose, previous[2]), ForwardFlags::empty()))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        3
    }
}
