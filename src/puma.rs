//! PUMA-type arm (pumakins), closed form.
//!
//! Six revolute joints in modified Denavit-Hartenberg form with twists 0, -90, 0, -90, 90 and
//! -90 degrees: a base rotation, shoulder and elbow (upper arm `a2`, forearm `d4` with the
//! offsets `a3` and `d3`) and a spherical wrist whose three axes meet at the wrist center. The
//! controlled point is `d6` past the wrist center along the last joint axis.
//!
//! A pose is reached by up to eight joint sets. Inverse kinematics picks one with
//! [`InverseFlags::SHOULDER_RIGHT`], [`InverseFlags::ELBOW_DOWN`] and
//! [`InverseFlags::WRIST_FLIP`]; forward kinematics reports the flags of the joints it was given.

extern crate nalgebra as na;

use std::f64::consts::FRAC_PI_2;

use na::{Isometry3, Rotation3, Translation3, UnitQuaternion, Vector3};

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::kinematics_error::KinematicsError;
use crate::parameters::PumaParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose, wrap_degrees_near};

/// Below this sine of joint 5 the axes of joints 4 and 6 are taken as aligned.
const WRIST_SINGULAR_SINE: f64 = 1.0e-9;

fn rx(angle: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle)
}

fn rz(angle: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle)
}

/// Orientation of the forearm frame (link 3), radians.
fn arm_rotation(theta1: f64, theta23: f64) -> Rotation3<f64> {
    rz(theta1) * rx(-FRAC_PI_2) * rz(theta23)
}

/// Wrist from the forearm frame up to, not including, joint 6.
fn wrist_rotation(theta4: f64, theta5: f64) -> Rotation3<f64> {
    rx(-FRAC_PI_2) * rz(theta4) * rx(FRAC_PI_2) * rz(theta5) * rx(-FRAC_PI_2)
}

#[derive(Debug)]
pub struct Puma {
    parameters: SharedParameters<PumaParameters>,
}

impl Puma {
    pub fn new(parameters: PumaParameters) -> Self {
        Puma { parameters: SharedParameters::new(parameters) }
    }

    pub fn parameters(&self) -> &SharedParameters<PumaParameters> {
        &self.parameters
    }

    /// Joint angles in degrees, not yet wrapped. `wrist_hint` (degrees) is used for joint 4
    /// when the wrist is singular.
    fn solve(&self, pose: &Pose, iflags: InverseFlags, wrist_hint: f64) -> Result<[f64; 6], KinematicsError> {
        check_pose(pose)?;
        let p = self.parameters.snapshot();
        if p.a2 == 0.0 {
            return Err(KinematicsError::InvalidInput("upper arm length must not be zero"));
        }
        let rotation = pose.rotation().to_rotation_matrix();
        let wrist = pose.tran - rotation * Vector3::new(0.0, 0.0, p.d6);
        let (px, py, pz) = (wrist.x, wrist.y, wrist.z);

        let planar = px * px + py * py - p.d3 * p.d3;
        if planar < 0.0 {
            return Err(KinematicsError::Unreachable("wrist center within the shoulder offset"));
        }
        let reach = if iflags.contains(InverseFlags::SHOULDER_RIGHT) { -planar.sqrt() } else { planar.sqrt() };
        let theta1 = py.atan2(px) - p.d3.atan2(reach);

        let k = (px * px + py * py + pz * pz - p.a2 * p.a2 - p.a3 * p.a3 - p.d3 * p.d3 - p.d4 * p.d4)
            / (2.0 * p.a2);
        let elbow = p.a3 * p.a3 + p.d4 * p.d4 - k * k;
        if elbow < 0.0 {
            return Err(KinematicsError::Unreachable("wrist center out of reach"));
        }
        let elbow = if iflags.contains(InverseFlags::ELBOW_DOWN) { -elbow.sqrt() } else { elbow.sqrt() };
        let theta3 = p.a3.atan2(p.d4) - k.atan2(elbow);

        let (s1, c1) = theta1.sin_cos();
        let (s3, c3) = theta3.sin_cos();
        let radial = c1 * px + s1 * py;
        let theta23 = ((-p.a3 - p.a2 * c3) * pz - radial * (p.d4 - p.a2 * s3))
            .atan2((p.a2 * s3 - p.d4) * pz + (p.a3 + p.a2 * c3) * radial);
        let theta2 = theta23 - theta3;

        // Wrist orientation in the forearm frame
        let local = arm_rotation(theta1, theta23).transpose() * rotation;
        let (y, x) = (local[(2, 2)], -local[(0, 2)]);
        let theta4 = if y.abs() < WRIST_SINGULAR_SINE && x.abs() < WRIST_SINGULAR_SINE {
            wrist_hint.to_radians()
        } else {
            y.atan2(x)
        };
        let (s4, c4) = theta4.sin_cos();
        let theta5 = (s4 * local[(2, 2)] - c4 * local[(0, 2)]).atan2(local[(1, 2)]);
        let last = wrist_rotation(theta4, theta5).transpose() * local;
        let theta6 = last[(1, 0)].atan2(last[(0, 0)]);

        let mut angles = [theta1, theta2, theta3, theta4, theta5, theta6].map(f64::to_degrees);
        if iflags.contains(InverseFlags::WRIST_FLIP) {
            angles[3] += 180.0;
            angles[4] = -angles[4];
            angles[5] += 180.0;
        }
        Ok(angles)
    }
}

impl Kinematics for Puma {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(6)?;
        let p = self.parameters.snapshot();
        let t: [f64; 6] = std::array::from_fn(|i| joints[i].to_radians());
        let (s1, c1) = t[0].sin_cos();
        let (s2, c2) = t[1].sin_cos();
        let (s3, c3) = t[2].sin_cos();
        let (s23, c23) = (t[1] + t[2]).sin_cos();

        // Distance of the wrist center from the base axis, in the arm plane
        let reach = p.a2 * c2 + p.a3 * c23 - p.d4 * s23;
        let wrist = Vector3::new(
            c1 * reach - p.d3 * s1,
            s1 * reach + p.d3 * c1,
            -p.a3 * s23 - p.a2 * s2 - p.d4 * c23,
        );
        let rotation = arm_rotation(t[0], t[1] + t[2]) * wrist_rotation(t[3], t[4]) * rz(t[5]);
        let tip = wrist + rotation * Vector3::new(0.0, 0.0, p.d6);

        let mut iflags = InverseFlags::empty();
        if reach < 0.0 {
            iflags |= InverseFlags::SHOULDER_RIGHT;
        }
        if p.d4 * c3 + p.a3 * s3 < 0.0 {
            iflags |= InverseFlags::ELBOW_DOWN;
        }
        let s5 = t[4].sin();
        if s5.abs() < WRIST_SINGULAR_SINE {
            iflags |= InverseFlags::WRIST_SINGULAR;
        } else if s5 < 0.0 {
            iflags |= InverseFlags::WRIST_FLIP;
        }

        let isometry = Isometry3::from_parts(Translation3::from(tip), UnitQuaternion::from_rotation_matrix(&rotation));
        Ok((Pose::from_isometry(&isometry), iflags))
    }

    /// Joints wrapped into (-180, 180].
    fn inverse(&self, pose: &Pose, iflags: InverseFlags) -> InverseResult {
        let angles = self.solve(pose, iflags, 0.0)?;
        let joints = Joints::from(angles.map(|angle| wrap_degrees_near(angle, 0.0)));
        Ok((joints, ForwardFlags::empty()))
    }

    /// Joints wrapped to within half a turn of `previous`. At a singular wrist joint 4 keeps
    /// its previous value.
    fn inverse_continuing(&self, pose: &Pose, previous: &Joints, iflags: InverseFlags) -> InverseResult {
        check_joints(previous)?;
        previous.expect_len(6)?;
        let angles = self.solve(pose, iflags, previous[3])?;
        let joints = Joints::from(std::array::from_fn::<f64, 6, _>(|i| wrap_degrees_near(angles[i], previous[i])));
        Ok((joints, ForwardFlags::empty()))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::SerialParameters;
    use crate::serial::forward_kinematics;
    use approx::assert_abs_diff_eq;

    const JOINTS: [f64; 6] = [10.0, -20.0, 30.0, 15.0, 40.0, -25.0];

    fn puma() -> Puma {
        Puma::new(PumaParameters::default())
    }

    fn assert_joints(found: &Joints, expected: &[f64], epsilon: f64) {
        for (f, e) in found.iter().zip(expected) {
            assert_abs_diff_eq!(*f, *e, epsilon = epsilon);
        }
    }

    #[test]
    fn test_forward() {
        let (pose, iflags) = puma().forward(&Joints::from(JOINTS), ForwardFlags::empty()).expect("closed form");
        let expected = Pose::new(
            192.21413689678008, 116.7976506238147, -345.2608322867096,
            -156.50369197331355, 45.166450605873635, 28.912818545398743,
        );
        assert!(pose.approx_eq(&expected, 1e-9, 1e-9), "{:?}", pose);
        assert_eq!(iflags, InverseFlags::empty());
    }

    #[test]
    fn test_wrist_center_matches_serial_chain() {
        let kins = Puma::new(PumaParameters { d6: 0.0, ..PumaParameters::default() });
        let (pose, _) = kins.forward(&Joints::from(JOINTS), ForwardFlags::empty()).expect("closed form");
        let chain = forward_kinematics(&SerialParameters::default(), &Joints::from(JOINTS)).expect("chain");
        assert!(pose.approx_eq(&Pose::from_isometry(&chain), 1e-9, 1e-9), "{:?}", pose);
        assert_abs_diff_eq!(pose.tran.x, 245.55788793732586, epsilon = 1e-9);
    }

    #[test]
    fn test_every_branch_reaches_the_pose() {
        let kins = puma();
        let (pose, _) = kins.forward(&Joints::from(JOINTS), ForwardFlags::empty()).expect("closed form");
        for bits in 0..8u32 {
            let iflags = InverseFlags::from_bits_retain(bits << 1);
            let (joints, _) = kins.inverse(&pose, iflags).expect("reachable");
            let (back, reported) = kins.forward(&joints, ForwardFlags::empty()).expect("closed form");
            assert!(back.approx_eq(&pose, 1e-8, 1e-8), "{:?}: {:?}", iflags, back);
            assert_eq!(reported, iflags);
        }
    }

    #[test]
    fn test_branch_solutions() {
        let kins = puma();
        let (pose, _) = kins.forward(&Joints::from(JOINTS), ForwardFlags::empty()).expect("closed form");

        let (joints, _) = kins.inverse(&pose, InverseFlags::empty()).expect("reachable");
        assert_joints(&joints, &JOINTS, 1e-9);

        let (joints, _) = kins.inverse(&pose, InverseFlags::SHOULDER_RIGHT).expect("reachable");
        let expected = [-140.048758985, 62.196244702, 30.0, -140.446904421, 125.898872575, 34.905695974];
        assert_joints(&joints, &expected, 1e-8);

        let (joints, _) = kins.inverse(&pose, InverseFlags::ELBOW_DOWN).expect("reachable");
        let expected = [10.0, 117.803755298, 164.250032698, 11.924332234, 126.372539369, -6.262266412];
        assert_joints(&joints, &expected, 1e-8);

        let (joints, _) = kins.inverse(&pose, InverseFlags::WRIST_FLIP).expect("reachable");
        assert_joints(&joints, &[10.0, -20.0, 30.0, -165.0, -40.0, 155.0], 1e-9);
    }

    #[test]
    fn test_flipped_wrist_reported() {
        let joints = Joints::from([-35.0, 20.0, -40.0, 60.0, -30.0, 90.0]);
        let (pose, iflags) = puma().forward(&joints, ForwardFlags::empty()).expect("closed form");
        assert_eq!(iflags, InverseFlags::WRIST_FLIP);
        assert_abs_diff_eq!(pose.tran.x, 434.6990707863604, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.tran.y, -255.9281082197311, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.tran.z, -512.3625693320375, epsilon = 1e-9);
        let (back, _) = puma().inverse(&pose, iflags).expect("reachable");
        assert_joints(&back, &joints, 1e-9);
    }

    #[test]
    fn test_singular_wrist_keeps_previous_joint_4() {
        let kins = puma();
        let (pose, iflags) = kins.forward(&Joints::from([0.0; 6]), ForwardFlags::empty()).expect("closed form");
        assert_abs_diff_eq!(pose.tran.x, 350.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.tran.y, 70.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.tran.z, -470.0, epsilon = 1e-9);
        assert_eq!(iflags, InverseFlags::WRIST_SINGULAR);

        let previous = Joints::from([0.0, 0.0, 0.0, 25.0, 0.0, 0.0]);
        let (joints, _) = kins.inverse_continuing(&pose, &previous, iflags).expect("reachable");
        assert_joints(&joints, &[0.0, 0.0, 0.0, 25.0, 0.0, -25.0], 1e-9);
    }

    #[test]
    fn test_continuing_stays_near_previous_turn() {
        let kins = puma();
        let (pose, iflags) = kins.forward(&Joints::from(JOINTS), ForwardFlags::empty()).expect("closed form");
        let previous = Joints::from([370.0, -20.0, 30.0, 15.0, 40.0, -385.0]);
        let (joints, _) = kins.inverse_continuing(&pose, &previous, iflags).expect("reachable");
        assert_joints(&joints, &[370.0, -20.0, 30.0, 15.0, 40.0, -385.0], 1e-9);
    }

    #[test]
    fn test_unreachable() {
        let kins = puma();
        let result = kins.inverse(&Pose::from_xyz(2000.0, 0.0, 0.0), InverseFlags::empty());
        assert!(matches!(result, Err(KinematicsError::Unreachable(_))));
        // Wrist center on the base axis, closer than the shoulder offset
        let result = kins.inverse(&Pose::from_xyz(0.0, 0.0, -200.0), InverseFlags::empty());
        assert!(matches!(result, Err(KinematicsError::Unreachable(_))));
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let kins = puma();
        let mut joints = Joints::from(JOINTS);
        joints[4] = f64::NAN;
        assert!(matches!(kins.forward(&joints, ForwardFlags::empty()), Err(KinematicsError::InvalidInput(_))));
        let result = kins.inverse(&Pose::from_xyz(300.0, f64::INFINITY, -300.0), InverseFlags::empty());
        assert!(matches!(result, Err(KinematicsError::InvalidInput(_))));
    }
}
