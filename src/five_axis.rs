//! Spindle head with a tilting B axis and a rotating C axis (5axiskins).
//!
//! Joints are `[x, y, z, b, c, w]`: the head carriage, the two head rotations (degrees) and a
//! quill extension W along the spindle. The tool tip lies on a sphere of radius
//! `pivot_length + w` around the pivot point.

extern crate nalgebra as na;

use na::Vector3;

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::parameters::FiveAxisParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

#[derive(Debug)]
pub struct FiveAxis {
    parameters: SharedParameters<FiveAxisParameters>,
}

impl FiveAxis {
    pub fn new(parameters: FiveAxisParameters) -> Self {
        FiveAxis { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<FiveAxisParameters> {
        &self.parameters
    }
}

/// Spherical to rectangular, angles in degrees.
fn spherical(radius: f64, theta: f64, phi: f64) -> Vector3<f64> {
    let (sin_t, cos_t) = theta.to_radians().sin_cos();
    let (sin_p, cos_p) = phi.to_radians().sin_cos();
    Vector3::new(radius * sin_p * cos_t, radius * sin_p * sin_t, radius * cos_p)
}

/// Tool tip relative to the pivot, less the pivot height.
fn tip_offset(p: &FiveAxisParameters, b: f64, c: f64, w: f64) -> Vector3<f64> {
    let r = spherical(p.pivot_length + w, c, 180.0 - b);
    Vector3::new(r.x, r.y, r.z + p.pivot_length)
}

impl Kinematics for FiveAxis {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(6)?;
        let p = self.parameters.snapshot();
        let (b, c, w) = (joints[3], joints[4], joints[5]);
        let tip = Vector3::new(joints[0], joints[1], joints[2]) + tip_offset(&p, b, c, w);

        let mut pose = Pose::from_xyz(tip.x, tip.y, tip.z);
        pose.b = b;
        pose.c = c;
        pose.w = w;
        Ok((pose, InverseFlags::empty()))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let p = self.parameters.snapshot();
        let carriage = pose.tran - tip_offset(&p, pose.b, pose.c, pose.w);
        let joints = Joints::from([carriage.x, carriage.y, carriage.z, pose.b, pose.c, pose.w]);
        Ok((joints, ForwardFlags::empty()))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        6
    }
}
