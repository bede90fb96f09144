//! Scorbot-style educational arm (scorbot-kins).
//!
//! The base joint turns the vertical plane the arm works in. Inside that plane shoulder and
//! elbow form the same two-link problem as a SCARA, followed by the wrist pitch. Joint 4 is
//! the wrist roll. World `a` is the tool pitch (shoulder + elbow + wrist pitch), world `b` the
//! roll.

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::linalg::{two_link_forward, two_link_inverse};
use crate::parameters::ScorbotParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

#[derive(Debug)]
pub struct Scorbot {
    parameters: SharedParameters<ScorbotParameters>,
}

impl Scorbot {
    pub fn new(parameters: ScorbotParameters) -> Self {
        Scorbot { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<ScorbotParameters> {
        &self.parameters
    }
}

impl Kinematics for Scorbot {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(5)?;
        let p = self.parameters.snapshot();

        let (r, h) = two_link_forward(joints[1].to_radians(), joints[2].to_radians(), p.l1, p.l2);
        let reach = p.l0_horizontal + r;
        let base = joints[0].to_radians();

        let mut pose = Pose::from_xyz(reach * base.cos(), reach * base.sin(), p.l0_vertical + h);
        pose.a = joints[1] + joints[2] + joints[3];
        pose.b = joints[4];

        let mut iflags = InverseFlags::empty();
        if joints[2] < 0.0 {
            iflags |= InverseFlags::ELBOW_NEGATIVE;
        }
        Ok((pose, iflags))
    }

    fn inverse(&self, pose: &Pose, iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let p = self.parameters.snapshot();

        let base = pose.tran.y.atan2(pose.tran.x);
        let r = pose.tran.x.hypot(pose.tran.y) - p.l0_horizontal;
        let h = pose.tran.z - p.l0_vertical;
        let (shoulder, elbow) = two_link_inverse(r, h, p.l1, p.l2, iflags.contains(InverseFlags::ELBOW_NEGATIVE))?;

        let j1 = shoulder.to_degrees();
        let j2 = elbow.to_degrees();
        let joints = Joints::from([base.to_degrees(), j1, j2, pose.a - j1 - j2, pose.b]);
        Ok((joints, ForwardFlags::empty()))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        5
    }
}
