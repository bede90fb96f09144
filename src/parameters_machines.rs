//! Stock geometry of each topology

extern crate nalgebra as na;

use std::f64::consts::FRAC_PI_2;

use na::Vector3;

use crate::kinematic_traits::MAX_JOINTS;
use crate::parameters::{
    CoreXyParameters, FiveAxisParameters, HexapodParameters, LinearDeltaParameters,
    PentapodParameters, PivotHeadParameters, PumaParameters, RotaryDeltaParameters,
    RotatedXyParameters, ScaraParameters, ScorbotParameters, SerialParameters,
    TrivialParameters, TripodParameters, TrunnionParameters,
};
use crate::pose::{Axis, Pose};

/// Point on a horizontal circle, angle in degrees.
fn on_circle(radius: f64, angle: f64, z: f64) -> Vector3<f64> {
    let (sin, cos) = angle.to_radians().sin_cos();
    Vector3::new(radius * cos, radius * sin, z)
}

impl Default for TrivialParameters {
    /// One joint per axis, X to W.
    fn default() -> Self {
        TrivialParameters { axes: Axis::ALL, joint_count: MAX_JOINTS }
    }
}

impl Default for CoreXyParameters {
    fn default() -> Self {
        CoreXyParameters { joint_count: 3 }
    }
}

impl Default for RotatedXyParameters {
    fn default() -> Self {
        RotatedXyParameters { angle: 45.0, joint_count: 3 }
    }
}

impl Default for ScaraParameters {
    fn default() -> Self {
        ScaraParameters {
            d1: 490.0,
            d2: 340.0,
            d3: 50.0,
            d4: 250.0,
            d5: 50.0,
            d6: 50.0,
        }
    }
}

impl Default for ScorbotParameters {
    fn default() -> Self {
        ScorbotParameters {
            l0_horizontal: 16.0,
            l0_vertical: 358.5,
            l1: 221.0,
            l2: 221.0,
        }
    }
}

impl Default for PumaParameters {
    /// Same links as the stock serial chain, with the tool 70 past the wrist center.
    fn default() -> Self {
        PumaParameters { a2: 300.0, a3: 50.0, d3: 70.0, d4: 400.0, d6: 70.0 }
    }
}

impl Default for RotaryDeltaParameters {
    fn default() -> Self {
        RotaryDeltaParameters {
            platform_radius: 100.0,
            thigh_length: 100.0,
            shin_length: 250.0,
            foot_radius: 40.0,
        }
    }
}

impl Default for LinearDeltaParameters {
    fn default() -> Self {
        LinearDeltaParameters { radius: 130.0, rod_length: 270.0 }
    }
}

impl Default for TripodParameters {
    fn default() -> Self {
        TripodParameters { bx: 400.0, cx: 200.0, cy: 350.0 }
    }
}

impl Default for TrunnionParameters {
    fn default() -> Self {
        TrunnionParameters {
            rotation_point: Vector3::zeros(),
            axis_offset: Vector3::zeros(),
            tool_offset: 0.0,
            conventional_directions: false,
        }
    }
}

impl Default for FiveAxisParameters {
    fn default() -> Self {
        FiveAxisParameters { pivot_length: 250.0 }
    }
}

impl Default for PivotHeadParameters {
    fn default() -> Self {
        // 0.666 inch
        PivotHeadParameters { pivot_length: 16.9164, conventional_directions: false }
    }
}

impl Default for HexapodParameters {
    /// Prototype platform: base joints in pairs on a circle of radius 300, platform joints on a
    /// circle of radius 150, pairs rotated by 60 degrees against the base.
    fn default() -> Self {
        let base_angles = [-10.0, 10.0, 110.0, 130.0, 230.0, 250.0];
        let platform_angles = [-50.0, 50.0, 70.0, 170.0, 190.0, 290.0];
        HexapodParameters {
            base: base_angles.map(|a| on_circle(300.0, a, 0.0)),
            platform: platform_angles.map(|a| on_circle(150.0, a, 0.0)),
            spindle_offset: 0.0,
            tool_offset: 0.0,
            base_normal: [Vector3::z(); 6],
            platform_normal: platform_angles.map(|a| on_circle(1.0, a, 0.0)),
            screw_lead: 0.0,
            home: Pose::from_xyz(0.0, 0.0, 400.0),
        }
    }
}

impl Default for PentapodParameters {
    fn default() -> Self {
        PentapodParameters {
            base: [0.0, 72.0, 144.0, 216.0, 288.0].map(|a| on_circle(400.0, a, 0.0)),
            ring_radius: [80.0; 5],
            ring_position: [150.0, 250.0, 150.0, 250.0, 150.0],
            home: Pose::from_xyz(0.0, 0.0, -500.0),
        }
    }
}

impl Default for SerialParameters {
    /// Six revolute joints in the layout of a PUMA-like arm.
    fn default() -> Self {
        let mut a = [0.0; MAX_JOINTS];
        let mut alpha = [0.0; MAX_JOINTS];
        let mut d = [0.0; MAX_JOINTS];
        a[..6].copy_from_slice(&[0.0, 0.0, 300.0, 50.0, 0.0, 0.0]);
        alpha[..6].copy_from_slice(&[0.0, -FRAC_PI_2, 0.0, -FRAC_PI_2, FRAC_PI_2, -FRAC_PI_2]);
        d[..6].copy_from_slice(&[0.0, 0.0, 70.0, 400.0, 0.0, 0.0]);
        // Elbow and wrist bent so the Jacobian is regular
        let mut home = [0.0; MAX_JOINTS];
        home[..6].copy_from_slice(&[0.0, -30.0, 30.0, 0.0, 30.0, 0.0]);
        SerialParameters {
            a,
            alpha,
            d,
            prismatic: [false; MAX_JOINTS],
            joint_count: 6,
            home,
        }
    }
}
