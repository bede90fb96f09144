//! Tripod (tripodkins): three struts of variable length from fixed base anchors to one apex.
//!
//! The anchors are A = (0, 0, 0), B = (Bx, 0, 0) and C = (Cx, Cy, 0). Any strut lengths that
//! meet describe two apexes mirrored in the base plane; forward kinematics takes the one above
//! unless [`ForwardFlags::BELOW_BASE`] is set.

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::kinematics_error::KinematicsError;
use crate::parameters::TripodParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

#[derive(Debug)]
pub struct Tripod {
    parameters: SharedParameters<TripodParameters>,
}

impl Tripod {
    pub fn new(parameters: TripodParameters) -> Self {
        Tripod { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<TripodParameters> {
        &self.parameters
    }
}

impl Kinematics for Tripod {
    fn forward(&self, joints: &Joints, fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(3)?;
        let p = self.parameters.snapshot();
        if p.bx == 0.0 || p.cy == 0.0 {
            return Err(KinematicsError::InvalidInput("tripod anchors are collinear"));
        }

        let (l0, l1, l2) = (joints[0] * joints[0], joints[1] * joints[1], joints[2] * joints[2]);
        let x = (l0 - l1 + p.bx * p.bx) / (2.0 * p.bx);
        let y = (l0 - l2 + p.cx * p.cx + p.cy * p.cy - 2.0 * p.cx * x) / (2.0 * p.cy);
        let z_sq = l0 - x * x - y * y;
        if z_sq < 0.0 {
            return Err(KinematicsError::Unreachable("struts do not meet"));
        }

        let mut z = z_sq.sqrt();
        if fflags.contains(ForwardFlags::BELOW_BASE) {
            z = -z;
        }
        Ok((Pose::from_xyz(x, y, z), InverseFlags::empty()))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let p = self.parameters.snapshot();
        let apex = pose.tran;
        let joints = Joints::from([
            apex.norm(),
            (apex.x - p.bx).hypot(apex.y).hypot(apex.z),
            (apex.x - p.cx).hypot(apex.y - p.cy).hypot(apex.z),
        ]);

        let mut fflags = ForwardFlags::empty();
        if apex.z < 0.0 {
            fflags |= ForwardFlags::BELOW_BASE;
        }
        Ok((joints, fflags))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        3
    }
}
