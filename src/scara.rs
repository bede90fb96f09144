//! SCARA arm (scarakins).
//!
//! Joints: shoulder and elbow angles (degrees), spindle travel (positive moves the tool
//! down) and roll (degrees). The elbow configuration is ambiguous in inverse kinematics and is
//! chosen with [`InverseFlags::ELBOW_NEGATIVE`]; forward kinematics reports the flag matching
//! the joints it was given.

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::linalg::two_link_inverse;
use crate::parameters::ScaraParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

#[derive(Debug)]
pub struct Scara {
    parameters: SharedParameters<ScaraParameters>,
}

impl Scara {
    pub fn new(parameters: ScaraParameters) -> Self {
        Scara { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<ScaraParameters> {
        &self.parameters
    }
}

impl Kinematics for Scara {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(4)?;
        let p = self.parameters.snapshot();

        let a0 = joints[0].to_radians();
        let a1 = a0 + joints[1].to_radians();
        let a3 = a1 + joints[3].to_radians();

        let x = p.d2 * a0.cos() + p.d4 * a1.cos() + p.d6 * a3.cos();
        let y = p.d2 * a0.sin() + p.d4 * a1.sin() + p.d6 * a3.sin();
        let z = p.d1 + p.d3 - joints[2] - p.d5;
        let c = a3.to_degrees();

        let mut iflags = InverseFlags::empty();
        if joints[1] < 0.0 {
            iflags |= InverseFlags::ELBOW_NEGATIVE;
        }
        Ok((Pose::new(x, y, z, 0.0, 0.0, c), iflags))
    }

    fn inverse(&self, pose: &Pose, iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let p = self.parameters.snapshot();

        // Wrist center: remove the tool offset that turns with the roll
        let a3 = pose.c.to_radians();
        let x = pose.tran.x - p.d6 * a3.cos();
        let y = pose.tran.y - p.d6 * a3.sin();

        let (q0, q1) = two_link_inverse(x, y, p.d2, p.d4, iflags.contains(InverseFlags::ELBOW_NEGATIVE))?;
        let j0 = q0.to_degrees();
        let j1 = q1.to_degrees();
        let j2 = p.d1 + p.d3 - p.d5 - pose.tran.z;
        let j3 = pose.c - j0 - j1;

        Ok((Joints::from([j0, j1, j2, j3]), ForwardFlags::empty()))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        4
    }
}
