//! Gantry with a spindle head tilting around a pivot and a rotary table (maxkins).
//!
//! Joints are `[x, y, z, b, c]`. The head tilts in B around a pivot `pivot_length` above the tool
//! tip, the C table turns the work under the gantry. Positions are given in the table frame,
//! so X and Y of the pose turn with C.

extern crate nalgebra as na;

use na::{Rotation2, Vector2};

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::parameters::PivotHeadParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

#[derive(Debug)]
pub struct PivotHead {
    parameters: SharedParameters<PivotHeadParameters>,
}

impl PivotHead {
    pub fn new(parameters: PivotHeadParameters) -> Self {
        PivotHead { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<PivotHeadParameters> {
        &self.parameters
    }
}

/// Head tilt and table turn in radians, in the legacy sense.
fn angles(p: &PivotHeadParameters, b: f64, c: f64) -> (f64, f64) {
    let sense = if p.conventional_directions { -1.0 } else { 1.0 };
    ((sense * b).to_radians(), (sense * c).to_radians())
}

impl Kinematics for PivotHead {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(5)?;
        let p = self.parameters.snapshot();
        let (b, c) = (joints[3], joints[4]);
        let (tilt, turn) = angles(&p, b, c);
        let (sin, cos) = tilt.sin_cos();

        // Tool tip in the machine frame, then seen from the table
        let machine = Vector2::new(joints[0] - p.pivot_length * sin, joints[1]);
        let table = Rotation2::new(turn) * machine;

        let mut pose = Pose::from_xyz(table.x, table.y, joints[2] + p.pivot_length * (1.0 - cos));
        pose.b = b;
        pose.c = c;
        Ok((pose, InverseFlags::empty()))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let p = self.parameters.snapshot();
        let (tilt, turn) = angles(&p, pose.b, pose.c);
        let (sin, cos) = tilt.sin_cos();

        let machine = Rotation2::new(-turn) * Vector2::new(pose.tran.x, pose.tran.y);
        let joints = Joints::from([
            machine.x + p.pivot_length * sin,
            machine.y,
            pose.tran.z - p.pivot_length * (1.0 - cos),
            pose.b,
            pose.c,
        ]);
        Ok((joints, ForwardFlags::empty()))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        5
    }
}
