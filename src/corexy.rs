//! CoreXY gantry (corexykins).
//!
//! Both belt motors move the carriage: X = (A + B) / 2, Y = (A - B) / 2. Joints after the two
//! motors drive Z, A, B, C, U, V and W directly.

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
    MAX_JOINTS,
};
use crate::kinematics_error::KinematicsError;
use crate::parameters::CoreXyParameters;
use crate::pose::{Axis, Pose};
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

#[derive(Debug)]
pub struct CoreXy {
    parameters: SharedParameters<CoreXyParameters>,
}

impl CoreXy {
    pub fn new(parameters: CoreXyParameters) -> Self {
        CoreXy { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<CoreXyParameters> {
        &self.parameters
    }

    fn checked_count(&self) -> Result<usize, KinematicsError> {
        let n = self.parameters.snapshot().joint_count;
        if !(2..=MAX_JOINTS).contains(&n) {
            return Err(KinematicsError::InvalidInput("CoreXY needs 2 to MAX_JOINTS joints"));
        }
        Ok(n)
    }
}

impl Kinematics for CoreXy {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        let n = self.checked_count()?;
        joints.expect_len(n)?;
        let mut pose = Pose::default();
        pose.tran.x = 0.5 * (joints[0] + joints[1]);
        pose.tran.y = 0.5 * (joints[0] - joints[1]);
        for i in 2..n {
            pose.set_axis(Axis::ALL[i], joints[i]);
        }
        Ok((pose, InverseFlags::empty()))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let n = self.checked_count()?;
        let mut joints = Joints::zeros(n)?;
        joints[0] = pose.tran.x + pose.tran.y;
        joints[1] = pose.tran.x - pose.tran.y;
        for i in 2..n {
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
