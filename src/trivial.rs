//! Machines whose joints map one to one onto world axes (trivkins)

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
    MAX_JOINTS,
};
use crate::parameters::TrivialParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

/// Identity kinematics with a configurable joint to axis assignment. When several joints
/// drive the same axis (a gantry), forward kinematics reads the first of them and inverse
/// kinematics commands all of them.
#[derive(Debug)]
pub struct Trivial {
    parameters: SharedParameters<TrivialParameters>,
}

impl Trivial {
    pub fn new(parameters: TrivialParameters) -> Self {
        Trivial { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<TrivialParameters> {
        &self.parameters
    }
}

impl Kinematics for Trivial {
    fn forward(&self, joints: &Joints, fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        let parameters = self.parameters.snapshot();
        joints.expect_len(parameters.joint_count)?;
        let mut pose = Pose::default();
        let mut assigned = [false; MAX_JOINTS];
        for (joint, axis) in joints.iter().zip(parameters.axes.iter()) {
            if !assigned[axis.index()] {
                assigned[axis.index()] = true;
                pose.set_axis(*axis, *joint);
            }
        }
        Ok((pose, InverseFlags::from_bits_retain(fflags.bits())))
    }

    fn inverse(&self, pose: &Pose, iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let parameters = self.parameters.snapshot();
        let mut joints = Joints::zeros(parameters.joint_count)?;
        for (joint, axis) in joints.iter_mut().zip(parameters.axes.iter()) {
            *joint = pose.axis(*axis);
        }
        Ok((joints, ForwardFlags::from_bits_retain(iflags.bits())))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Identity
    }

    fn joint_count(&self) -> usize {
        self.parameters.snapshot().joint_count
    }
}

impl Default for Trivial {
    fn default() -> Self {
        Trivial::new(TrivialParameters::default())
    }
}
