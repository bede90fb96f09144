//! Geometry tables of the supported machine topologies.
//!
//! All tables are plain `Copy` values so a solver can take one consistent snapshot per call.
//! Lengths are in machine units. Angles stored here are in radians unless the field says
//! otherwise. See [parameters_machines.rs](parameters_machines.rs) for the stock values.

extern crate nalgebra as na;

use na::Vector3;

use crate::kinematic_traits::MAX_JOINTS;
use crate::kinematics_error::KinematicsError;
use crate::pose::{Axis, Pose};
use crate::utils::deg;

/// Joint to axis assignment of a machine where joints map straight onto world axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrivialParameters {
    /// World axis driven by each joint. Several joints may drive the same axis (gantry).
    pub axes: [Axis; MAX_JOINTS],

    /// Number of joints actually used.
    pub joint_count: usize,
}

impl TrivialParameters {
    /// Assignment from the coordinate letters, one per joint, like `"XYYZ"` for a gantry
    /// with two Y motors. Whitespace is ignored.
    pub fn from_coordinates(coordinates: &str) -> Result<Self, KinematicsError> {
        let mut axes = [Axis::X; MAX_JOINTS];
        let mut joint_count = 0;
        for letter in coordinates.chars().filter(|c| !c.is_whitespace()) {
            if joint_count == MAX_JOINTS {
                return Err(KinematicsError::InvalidInput("too many coordinate letters"));
            }
            axes[joint_count] = Axis::from_letter(letter)
                .ok_or(KinematicsError::InvalidInput("unknown coordinate letter"))?;
            joint_count += 1;
        }
        if joint_count == 0 {
            return Err(KinematicsError::InvalidInput("no coordinate letters"));
        }
        Ok(TrivialParameters { axes, joint_count })
    }
}

/// CoreXY gantry. Joints 0 and 1 are the belt motors, the rest map onto Z, A, B, C, U, V, W.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreXyParameters {
    /// Number of joints, at least 2.
    pub joint_count: usize,
}

/// SCARA arm: two horizontal links, a vertical spindle and a roll axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaraParameters {
    /// Height of the first link above the base.
    pub d1: f64,

    /// Length of the first (inner) link.
    pub d2: f64,

    /// Vertical offset between the first and the second link.
    pub d3: f64,

    /// Length of the second (outer) link.
    pub d4: f64,

    /// Vertical distance from the spindle end to the tool tip.
    pub d5: f64,

    /// Horizontal offset of the tool from the spindle axis, rotating with the roll joint.
    pub d6: f64,
}

/// Scorbot-style arm: base rotation, shoulder, elbow, wrist pitch and wrist roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorbotParameters {
    /// Horizontal offset of the shoulder from the base axis.
    pub l0_horizontal: f64,

    /// Height of the shoulder above the base.
    pub l0_vertical: f64,

    /// Upper arm length.
    pub l1: f64,

    /// Forearm length.
    pub l2: f64,
}

/// PUMA-type arm, six revolute joints with a spherical wrist. Link twists are fixed at
/// 0, -90, 0, -90, 90 and -90 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumaParameters {
    /// Upper arm length, must not be zero.
    pub a2: f64,

    /// Forearm offset along the upper arm direction.
    pub a3: f64,

    /// Sideways offset of the forearm from the shoulder.
    pub d3: f64,

    /// Forearm length, elbow to wrist center.
    pub d4: f64,

    /// Distance from the wrist center to the controlled point, along the last joint axis.
    pub d6: f64,
}

/// Rotary delta: three motor-driven thighs at 0, 120 and 240 degrees around Z, each joined to
/// the effector platform by a parallelogram shin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotaryDeltaParameters {
    /// Distance from the center to the motor axes.
    pub platform_radius: f64,

    pub thigh_length: f64,

    pub shin_length: f64,

    /// Distance from the effector center to the shin attachment points.
    pub foot_radius: f64,
}

/// Linear delta: three vertical towers at 90, 210 and 330 degrees, carriages joined to the
/// effector by rods of equal length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDeltaParameters {
    /// Horizontal distance from the center to each tower, effector offset already subtracted.
    pub radius: f64,

    pub rod_length: f64,
}

/// Tripod: three struts from the base anchors A=(0,0,0), B=(bx,0,0), C=(cx,cy,0) to one apex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripodParameters {
    pub bx: f64,
    pub cx: f64,
    pub cy: f64,
}

/// Tilting rotary table (trunnion) carrying a rotary table, XYZAC or XYZBC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrunnionParameters {
    /// Intersection of the tilt axis with the rotary axis at zero positions, machine frame.
    pub rotation_point: Vector3<f64>,

    /// Offset of the rotary (C) axis from the rotation point. Only the components normal to
    /// the tilt axis are used: Y and Z for XYZAC, X and Z for XYZBC.
    pub axis_offset: Vector3<f64>,

    /// Tool length, added to Z.
    pub tool_offset: f64,

    /// Positive rotations follow the right hand rule around the machine axes. When false the
    /// table rotates the other way, as on most table-tilting machines.
    pub conventional_directions: bool,
}

/// Spindle head with a tilting B axis and rotating C axis around a pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveAxisParameters {
    /// Distance from the B axis to the spindle nose.
    pub pivot_length: f64,
}

/// XYZ gantry with a spindle head tilting in B around a pivot and a rotary C table under the
/// work (maxkins).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotHeadParameters {
    /// Distance from the B pivot down to the tool tip.
    pub pivot_length: f64,

    /// Reverses the sense of both B and C against the legacy machine layout, where positive
    /// B tilts the tool tip towards -X and positive C turns the table clockwise seen from above.
    pub conventional_directions: bool,
}

/// Cartesian machine whose X and Y joints run along axes rotated against the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedXyParameters {
    /// Rotation of the joint axes around Z, degrees.
    pub angle: f64,

    /// Number of joints, at least 2. Joints past the second map onto Z, A, B, C, U, V, W.
    pub joint_count: usize,
}

/// Stewart platform with six struts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexapodParameters {
    /// Strut joints on the base, base frame.
    pub base: [Vector3<f64>; 6],

    /// Strut joints on the platform, platform frame with the origin at the spindle nose.
    pub platform: [Vector3<f64>; 6],

    /// Distance from the spindle nose to the tool holder, along the platform Z axis.
    pub spindle_offset: f64,

    /// Tool length, along the platform Z axis.
    pub tool_offset: f64,

    /// Axis of each base joint, unit vectors in the base frame.
    pub base_normal: [Vector3<f64>; 6],

    /// Axis of each platform joint, unit vectors in the platform frame.
    pub platform_normal: [Vector3<f64>; 6],

    /// Strut length change per full turn of the strut screw. When a strut twists between its
    /// joint axes the nut turns on the screw, so the measured length differs from the distance
    /// between the joints. Zero disables the correction and the normals are unused.
    pub screw_lead: f64,

    /// Pose after homing. Also the initial estimate when no previous pose is known.
    pub home: Pose,
}

impl HexapodParameters {
    /// Platform joint positions relative to the controlled point (the tool tip).
    pub fn effective_platform(&self) -> [Vector3<f64>; 6] {
        let shift = Vector3::new(0.0, 0.0, self.spindle_offset + self.tool_offset);
        self.platform.map(|p| p + shift)
    }
}

/// Five-strut parallel machine: each strut ends on a ring that turns freely around the tool
/// axis, so the spindle roll is not constrained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PentapodParameters {
    /// Strut joints on the base, base frame.
    pub base: [Vector3<f64>; 5],

    /// Radius of the ring each strut is attached to.
    pub ring_radius: [f64; 5],

    /// Position of each ring center along the tool axis, measured from the tool tip.
    pub ring_position: [f64; 5],

    /// Pose after homing (x, y, z, a, b). Also the initial estimate when no previous pose is known.
    pub home: Pose,
}

/// Serial chain in modified Denavit-Hartenberg form. Link `i` is `Rx(alpha) * Tx(a) * Rz(theta) *
/// Tz(d)` with the joint variable added to `theta` (revolute) or to `d` (prismatic).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SerialParameters {
    pub a: [f64; MAX_JOINTS],

    /// Link twists, radians.
    pub alpha: [f64; MAX_JOINTS],

    pub d: [f64; MAX_JOINTS],

    /// Joints that slide along their Z axis instead of rotating around it.
    pub prismatic: [bool; MAX_JOINTS],

    pub joint_count: usize,

    /// Joints after homing (degrees or length). Also the initial estimate when no previous
    /// joints are known, so it must not be a singular configuration.
    pub home: [f64; MAX_JOINTS],
}

impl SerialParameters {
    /// Convert to string yaml representation (quick viewing, etc).
    pub fn to_yaml(&self) -> String {
        let n = self.joint_count.min(MAX_JOINTS);
        let join = |values: Vec<String>| values.join(", ");
        format!(
            "kinematics: genserkins\n\
             geometry:\n  \
               a: [{}]\n  \
               alpha: [{}]\n  \
               d: [{}]\n  \
               prismatic: [{}]\n  \
               home: [{}]\n",
            join(self.a[..n].iter().map(|x| x.to_string()).collect()),
            join(self.alpha[..n].iter().map(deg).collect()),
            join(self.d[..n].iter().map(|x| x.to_string()).collect()),
            join(self.prismatic[..n].iter().map(|x| x.to_string()).collect()),
            join(self.home[..n].iter().map(|x| x.to_string()).collect()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_with_gantry() {
        let p = TrivialParameters::from_coordinates("XYYZ").expect("valid coordinates");
        assert_eq!(p.joint_count, 4);
        assert_eq!(p.axes[2], Axis::Y);
        assert_eq!(p.axes[3], Axis::Z);
    }

    #[test]
    fn test_coordinates_rejected() {
        assert!(TrivialParameters::from_coordinates("XYQ").is_err());
        assert!(TrivialParameters::from_coordinates("").is_err());
        assert!(TrivialParameters::from_coordinates("XYZABCUVWX").is_err());
    }

    #[test]
    fn test_tool_offset_shifts_platform() {
        let mut p = HexapodParameters::default();
        p.spindle_offset = 10.0;
        p.tool_offset = 5.0;
        let effective = p.effective_platform();
        assert_eq!(effective[3].z, p.platform[3].z + 15.0);
        assert_eq!(effective[3].x, p.platform[3].x);
    }

    #[test]
    fn test_serial_yaml_uses_degrees() {
        let yaml = SerialParameters::default().to_yaml();
        assert!(yaml.contains("alpha: [0, deg(-90.0000)"), "{}", yaml);
        assert!(yaml.starts_with("kinematics: genserkins"));
    }
}
