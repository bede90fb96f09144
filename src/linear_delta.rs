//! Linear delta printer (lineardeltakins).
//!
//! Three vertical towers at 90, 210 and 330 degrees around Z. The carriage positions are the
//! joints; each carriage holds a pair of rods of `rod_length` ending on the effector. Joint
//! zero puts the carriage level with an effector at Z = 0.

extern crate nalgebra as na;

use na::{Vector2, Vector3};

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::kinematics_error::KinematicsError;
use crate::linalg::sphere_intersection_lower;
use crate::parameters::LinearDeltaParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

const TOWER_ANGLES: [f64; 3] = [90.0, 210.0, 330.0];

#[derive(Debug)]
pub struct LinearDelta {
    parameters: SharedParameters<LinearDeltaParameters>,
}

impl LinearDelta {
    pub fn new(parameters: LinearDeltaParameters) -> Self {
        LinearDelta { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<LinearDeltaParameters> {
        &self.parameters
    }
}

fn towers(radius: f64) -> [Vector2<f64>; 3] {
    TOWER_ANGLES.map(|angle| {
        let (sin, cos) = f64::to_radians(angle).sin_cos();
        Vector2::new(radius * cos, radius * sin)
    })
}

impl Kinematics for LinearDelta {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(3)?;
        let p = self.parameters.snapshot();
        let towers = towers(p.radius);
        let carriages = [0, 1, 2].map(|i| Vector3::new(towers[i].x, towers[i].y, joints[i]));
        let effector = sphere_intersection_lower(&carriages, p.rod_length)?;
        Ok((Pose::from_xyz(effector.x, effector.y, effector.z), InverseFlags::empty()))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let p = self.parameters.snapshot();
        let mut joints = Joints::zeros(3)?;
        for (joint, tower) in joints.iter_mut().zip(towers(p.radius)) {
            let horizontal = (pose.tran.xy() - tower).norm_squared();
            let vertical_sq = p.rod_length * p.rod_length - horizontal;
            if vertical_sq < 0.0 {
                return Err(KinematicsError::Unreachable("effector too far from a tower"));
            }
            *joint = pose.tran.z + vertical_sq.sqrt();
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn delta() -> LinearDelta {
        LinearDelta::new(LinearDeltaParameters::default())
    }

    #[test]
    fn test_center_carriage_height() {
        let (joints, _) = delta().inverse(&Pose::default(), InverseFlags::empty()).expect("reachable");
        let expected = (270.0f64 * 270.0 - 130.0 * 130.0).sqrt();
        for joint in joints.iter() {
            assert_abs_diff_eq!(*joint, expected, epsilon = 1e-9);
            assert_abs_diff_eq!(*joint, 236.64319132398464, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_round_trip() {
        let kins = delta();
        let (joints, _) = kins.inverse(&Pose::from_xyz(20.0, -35.0, -10.0), InverseFlags::empty()).expect("reachable");
        assert_abs_diff_eq!(joints[0], 202.77922830953213, epsilon = 1e-9);
        assert_abs_diff_eq!(joints[1], 223.28452134747587, epsilon = 1e-9);
        assert_abs_diff_eq!(joints[2], 241.84982052739105, epsilon = 1e-9);

        let (pose, _) = kins.forward(&joints, ForwardFlags::empty()).expect("reachable");
        assert_abs_diff_eq!(pose.tran.x, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.tran.y, -35.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.tran.z, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unequal_carriages() {
        let (pose, _) = delta()
            .forward(&Joints::from([100.0, 150.0, 120.0]), ForwardFlags::empty())
            .expect("reachable");
        assert_abs_diff_eq!(pose.tran.x, -32.19160405460547, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.tran.y, -40.80283705789947, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.tran.z, -106.61580646543999, epsilon = 1e-9);
    }

    #[test]
    fn test_outside_rod_reach() {
        let result = delta().inverse(&Pose::from_xyz(400.0, 0.0, 0.0), InverseFlags::empty());
        assert!(matches!(result, Err(KinematicsError::Unreachable(_))));
    }

    #[test]
    fn test_nan_height_is_invalid_not_unreachable() {
        let result = delta().inverse(&Pose::from_xyz(0.0, 0.0, f64::NAN), InverseFlags::empty());
        assert!(matches!(result, Err(KinematicsError::InvalidInput(_))));
    }
}
