//! World-space pose and velocity screw

extern crate nalgebra as na;

use na::{Isometry3, Translation3, UnitQuaternion, Vector3, Vector6};

/// Cartesian pose of the controlled point as the motion controller sees it: translation,
/// three orientation angles and three extra linear axes.
///
/// Orientation angles `a`, `b`, `c` are in degrees and are interpreted as roll (about X),
/// pitch (about Y) and yaw (about Z), composed as `Rz(c) * Ry(b) * Rx(a)`. Closed-form machines
/// that have rotary axes (trunnion tables, spindle heads) carry the rotary axis positions in
/// these fields directly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub tran: Vector3<f64>,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

/// World axes in the order the controller indexes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
    A = 3,
    B = 4,
    C = 5,
    U = 6,
    V = 7,
    W = 8,
}

impl Axis {
    pub const ALL: [Axis; 9] = [Axis::X, Axis::Y, Axis::Z, Axis::A, Axis::B, Axis::C, Axis::U, Axis::V, Axis::W];

    /// Axis named by the coordinate letter, case insensitive.
    pub fn from_letter(letter: char) -> Option<Axis> {
        match letter.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            'A' => Some(Axis::A),
            'B' => Some(Axis::B),
            'C' => Some(Axis::C),
            'U' => Some(Axis::U),
            'V' => Some(Axis::V),
            'W' => Some(Axis::W),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl Pose {
    /// Pose with translation and orientation (degrees), extra axes at zero.
    pub fn new(x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) -> Self {
        Pose { tran: Vector3::new(x, y, z), a, b, c, ..Default::default() }
    }

    /// Pure translation.
    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, 0.0, 0.0, 0.0)
    }

    /// Rotation described by the a, b, c angles.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.a.to_radians(), self.b.to_radians(), self.c.to_radians())
    }

    /// Rigid transform of this pose; extra axes are dropped.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.tran), self.rotation())
    }

    /// Pose of the rigid transform, extra axes at zero.
    pub fn from_isometry(isometry: &Isometry3<f64>) -> Self {
        Self::default().with_isometry(isometry)
    }

    /// Copy of this pose with translation and orientation taken from the transform, extra axes kept.
    pub fn with_isometry(&self, isometry: &Isometry3<f64>) -> Self {
        let (roll, pitch, yaw) = isometry.rotation.euler_angles();
        Pose {
            tran: isometry.translation.vector,
            a: roll.to_degrees(),
            b: pitch.to_degrees(),
            c: yaw.to_degrees(),
            ..*self
        }
    }

    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.tran.x,
            Axis::Y => self.tran.y,
            Axis::Z => self.tran.z,
            Axis::A => self.a,
            Axis::B => self.b,
            Axis::C => self.c,
            Axis::U => self.u,
            Axis::V => self.v,
            Axis::W => self.w,
        }
    }

    pub fn set_axis(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.tran.x = value,
            Axis::Y => self.tran.y = value,
            Axis::Z => self.tran.z = value,
            Axis::A => self.a = value,
            Axis::B => self.b = value,
            Axis::C => self.c = value,
            Axis::U => self.u = value,
            Axis::V => self.v = value,
            Axis::W => self.w = value,
        }
    }

    /// True if no axis is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        Axis::ALL.iter().all(|&axis| self.axis(axis).is_finite())
    }

    /// Compares all nine axes, linear ones with `linear_tolerance`, angles (degrees) with
    /// `angular_tolerance`.
    pub fn approx_eq(&self, other: &Pose, linear_tolerance: f64, angular_tolerance: f64) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let tolerance = match axis {
                Axis::A | Axis::B | Axis::C => angular_tolerance,
                _ => linear_tolerance,
            };
            (self.axis(axis) - other.axis(axis)).abs() <= tolerance
        })
    }
}

/// Velocity (or force) screw: linear part and angular part, both in the base frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Screw {
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
}

impl Screw {
    pub fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Screw { linear, angular }
    }

    /// Stacks linear over angular.
    pub fn to_vector6(&self) -> Vector6<f64> {
        Vector6::new(
            self.linear.x, self.linear.y, self.linear.z,
            self.angular.x, self.angular.y, self.angular.z,
        )
    }

    pub fn from_vector6(v: &Vector6<f64>) -> Self {
        Screw {
            linear: Vector3::new(v[0], v[1], v[2]),
            angular: Vector3::new(v[3], v[4], v[5]),
        }
    }
}
