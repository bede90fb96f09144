//! Tilting rotary table (xyzac-trt-kins, xyzbc-trt-kins).
//!
//! The spindle moves along X, Y and Z; the workpiece sits on a rotary C table that is itself
//! carried by a trunnion tilting around X (A) or Y (B). World coordinates are in the frame of the
//! workpiece, so tilting or turning the table moves the machine axes needed to keep the tool on the
//! same workpiece point.
//!
//! Joints are `[x, y, z, tilt, c]`, the tilt being A or B depending on the machine.

extern crate nalgebra as na;

use na::{Rotation3, Vector3};

use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::parameters::TrunnionParameters;
use crate::pose::Pose;
use crate::shared::SharedParameters;
use crate::utils::{check_joints, check_pose};

/// Machine axis the trunnion tilts around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiltAxis {
    /// Tilt around X (XYZAC).
    A,
    /// Tilt around Y (XYZBC).
    B,
}

#[derive(Debug)]
pub struct Trunnion {
    tilt_axis: TiltAxis,
    parameters: SharedParameters<TrunnionParameters>,
}

impl Trunnion {
    pub fn new(tilt_axis: TiltAxis, parameters: TrunnionParameters) -> Self {
        Trunnion { tilt_axis, parameters: SharedParameters::new(parameters) }
    }

    pub fn xyzac(parameters: TrunnionParameters) -> Self {
        Self::new(TiltAxis::A, parameters)
    }

    pub fn xyzbc(parameters: TrunnionParameters) -> Self {
        Self::new(TiltAxis::B, parameters)
    }

    pub fn tilt_axis(&self) -> TiltAxis {
        self.tilt_axis
    }

    pub fn parameters(&self) -> &SharedParameters<TrunnionParameters> {
        &self.parameters
    }

    fn tilt(&self, degrees: f64) -> Rotation3<f64> {
        let axis = match self.tilt_axis {
            TiltAxis::A => Vector3::x_axis(),
            TiltAxis::B => Vector3::y_axis(),
        };
        Rotation3::from_axis_angle(&axis, degrees.to_radians())
    }

    /// Rotary axis offset with the component along the tilt axis removed.
    fn axis_offset(&self, p: &TrunnionParameters) -> Vector3<f64> {
        let mut offset = p.axis_offset;
        match self.tilt_axis {
            TiltAxis::A => offset.x = 0.0,
            TiltAxis::B => offset.y = 0.0,
        }
        offset
    }
}

fn turn(degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians())
}

impl Kinematics for Trunnion {
    fn forward(&self, joints: &Joints, _fflags: ForwardFlags) -> ForwardResult {
        check_joints(joints)?;
        joints.expect_len(5)?;
        let p = self.parameters.snapshot();
        let sign = if p.conventional_directions { 1.0 } else { -1.0 };
        let offset = self.axis_offset(&p);
        let tool = Vector3::new(0.0, 0.0, p.tool_offset);

        let (tilt, c) = (joints[3], joints[4]);
        let spindle = Vector3::new(joints[0], joints[1], joints[2]);
        let on_table = self.tilt(-sign * tilt) * (spindle - p.rotation_point - tool) - offset;
        let workpiece = p.rotation_point + offset + turn(-sign * c) * on_table;

        let mut pose = Pose::from_xyz(workpiece.x, workpiece.y, workpiece.z);
        match self.tilt_axis {
            TiltAxis::A => pose.a = tilt,
            TiltAxis::B => pose.b = tilt,
        }
        pose.c = c;
        Ok((pose, InverseFlags::empty()))
    }

    fn inverse(&self, pose: &Pose, _iflags: InverseFlags) -> InverseResult {
        check_pose(pose)?;
        let p = self.parameters.snapshot();
        let sign = if p.conventional_directions { 1.0 } else { -1.0 };
        let offset = self.axis_offset(&p);
        let tool = Vector3::new(0.0, 0.0, p.tool_offset);

        let tilt = match self.tilt_axis {
            TiltAxis::A => pose.a,
            TiltAxis::B => pose.b,
        };
        let on_table = turn(sign * pose.c) * (pose.tran - p.rotation_point - offset);
        let spindle = p.rotation_point + self.tilt(sign * tilt) * (offset + on_table) + tool;

        Ok((Joints::from([spindle.x, spindle.y, spindle.z, tilt, pose.c]), ForwardFlags::empty()))
    }

    fn kind(&self) -> KinematicsType {
        KinematicsType::Both
    }

    fn joint_count(&self) -> usize {
        5
    }
}
