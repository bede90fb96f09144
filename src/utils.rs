//! Helper functions

use crate::kinematic_traits::Joints;
use crate::kinematics_error::KinematicsError;
use crate::pose::Pose;

/// Checks if all joint values are finite
pub fn is_valid(joints: &Joints) -> bool {
    joints.iter().all(|&q| q.is_finite())
}

/// `InvalidInput` unless every joint is finite.
pub(crate) fn check_joints(joints: &Joints) -> Result<(), KinematicsError> {
    if is_valid(joints) {
        Ok(())
    } else {
        Err(KinematicsError::InvalidInput("joint value is not finite"))
    }
}

/// `InvalidInput` unless every pose axis is finite.
pub(crate) fn check_pose(pose: &Pose) -> Result<(), KinematicsError> {
    if pose.is_finite() {
        Ok(())
    } else {
        Err(KinematicsError::InvalidInput("pose value is not finite"))
    }
}

/// Angle (degrees) equivalent to `angle` modulo full turns and within 180 degrees of
/// `reference`.
pub fn wrap_degrees_near(angle: f64, reference: f64) -> f64 {
    let mut difference = (angle - reference) % 360.0;
    if difference > 180.0 {
        difference -= 360.0;
    } else if difference <= -180.0 {
        difference += 360.0;
    }
    reference + difference
}

/// Print joint values.
pub fn dump_joints(joints: &Joints) {
    let mut row_str = String::new();
    for joint in joints.iter() {
        row_str.push_str(&format!("{:5.2} ", joint));
    }
    println!("[{}]", row_str.trim_end());
}

/// Print the pose, translation first, then the angles and the extra axes.
pub fn dump_pose(pose: &Pose) {
    println!(
        "x: {:.3}, y: {:.3}, z: {:.3}, a: {:.3}, b: {:.3}, c: {:.3}, u: {:.3}, v: {:.3}, w: {:.3}",
        pose.tran.x, pose.tran.y, pose.tran.z, pose.a, pose.b, pose.c, pose.u, pose.v, pose.w
    );
}

/// formatting for YAML output
pub(crate) fn deg(x: &f64) -> String {
    if *x == 0.0 {
        return "0".to_string();
    }
    format!("deg({:.4})", x.to_degrees())
}
