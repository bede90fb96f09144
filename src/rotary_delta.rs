//! Rotary delta robot (rotarydeltakins).
//!
//! Three motors sit on the base platform at 0, 120 and 240 degrees around Z, their axes
//! tangent to the circle of `platform_radius`. Each motor swings a thigh; positive angles move
//! it down. The shins are parallelograms, so the effector keeps its orientation and only
//! translates. Z is negative below the base.

extern crate nalgebra as na;

use na::{Rotation3, Vector3};

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::kinematics_error::KinematicsError;
use crate::linalg::sphere_intersection_lower;
use crate::parameters::RotaryDeltaParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

const LEG_ANGLES: [f64; 3] = [0.0, 120.0, 240.0];

#[derive(Debug)]
pub struct RotaryDelta {
    parameters: SharedParameters<RotaryDeltaParameters>,
}

impl RotaryDelta {
    pub fn new(parameters: RotaryDeltaParameters) -> Self {
        RotaryDelta { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<RotaryDeltaParameters> {
        &self.parameters
    }
}

fn leg_rotation(angle: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle.to_radians())
}

/// Thigh angle (degrees) of the leg lying along +X that places the effector center at `target`,
/// given in the frame of that leg.
fn leg_inverse(p: &RotaryDeltaParameters, target: &Vector3<f64>) -> Result<f64, KinematicsError> {
    // Shin attachment on the effector, relative to the motor axis
    let ex = target.x + p.foot_radius - p.platform_radius;
    let ey = target.y;
    let ez = target.z;

    // The shin projects onto the thigh plane as a circle of this radius
    let projected_sq = p.shin_length * p.shin_length - ey * ey;
    if projected_sq < 0.0 {
        return Err(KinematicsError::Unreachable("effector beyond the shin reach"));
    }

    let d = ex.hypot(ez);
    if d == 0.0 {
        return Err(KinematicsError::Singular);
    }
    let a = (p.thigh_length * p.thigh_length - projected_sq + d * d) / (2.0 * d);
    let h_sq = p.thigh_length * p.thigh_length - a * a;
    if h_sq < 0.0 {
        return Err(KinematicsError::Unreachable("thigh and shin do not meet"));
    }
    let h = h_sq.sqrt();

    // Two knee positions; the one further out is the physical one
    let (ux, uz) = (ex / d, ez / d);
    let first = (a * ux - h * uz, a * uz + h * ux);
    let second = (a * ux + h * uz, a * uz - h * ux);
    let (kx, kz) = if first.0 >= second.0 { first } else { second };

    Ok((-kz).atan2(kx).to_degrees())
}

impl Kinematics for RotaryDelta {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(3)?;
        let p = self.parameters.snapshot();

        // Knees moved inwards by the foot radius: the effector center is where all three
        // shins, taken as spheres around these points, meet
        let mut centers = [Vector3::zeros(); 3];
        for (center, (angle, joint)) in centers.iter_mut().zip(LEG_ANGLES.iter().zip(joints.iter())) {
            let (sin, cos) = joint.to_radians().sin_cos();
            let knee = Vector3::new(p.platform_radius + p.thigh_length * cos - p.foot_radius, 0.0, -p.thigh_length * sin);
            *center = leg_rotation(*angle) * knee;
        }

        let effector = sphere_intersection_lower(&centers, p.shin_length)?;
        Ok((Pose::from_xyz(effector.x, effector.y, effector.z), InverseFlags::empty()))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let p = self.parameters.snapshot();
        let mut joints = Joints::zeros(3)?;
        for (joint, angle) in joints.iter_mut().zip(LEG_ANGLES) {
            let local = leg_rotation(-angle) * pose.tran;
            *joint = leg_inverse(&p, &local)?;
        }
        Ok((joints, ForwardFlags::empty()))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        3
    }
}
