//! The calling contract shared by all machine topologies

use std::fmt;
use std::ops::{Deref, DerefMut};

use bitflags::bitflags;

use crate::kinematics_error::KinematicsError;
use crate::pose::Pose;

/// Largest number of joints any topology may have.
pub const MAX_JOINTS: usize = 9;

/// Joint vector: ordered actuator positions (lengths in machine units, angles in degrees).
/// This is a fixed capacity value type, it lives on the stack and is copied by each call.
/// ```
/// use rs_cnc_kinematics::kinematic_traits::Joints;
///
/// let joints = Joints::from([0.0, 60.0, 0.0, 0.0]);
/// assert_eq!(joints.len(), 4);
/// assert_eq!(joints[1], 60.0);
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct Joints {
    values: [f64; MAX_JOINTS],
    len: usize,
}

impl Joints {
    /// Joint vector of the given length, all zeros.
    pub fn zeros(len: usize) -> Result<Self, KinematicsError> {
        if len > MAX_JOINTS {
            return Err(KinematicsError::InvalidInput("too many joints"));
        }
        Ok(Joints { values: [0.0; MAX_JOINTS], len })
    }

    /// Copies joint values from the slice. Fails if the slice is longer than `MAX_JOINTS`.
    pub fn from_slice(values: &[f64]) -> Result<Self, KinematicsError> {
        let mut joints = Self::zeros(values.len())?;
        joints.values[..values.len()].copy_from_slice(values);
        Ok(joints)
    }

    /// Joint vector from the array, capacity checked at compile time.
    pub fn from_array<const N: usize>(values: [f64; N]) -> Self {
        const { assert!(N <= MAX_JOINTS, "joint vector exceeds MAX_JOINTS") };
        let mut joints = Joints { values: [0.0; MAX_JOINTS], len: N };
        joints.values[..N].copy_from_slice(&values);
        joints
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values[..self.len]
    }

    /// Fails with `InvalidInput` unless this vector has exactly `expected` joints.
    pub(crate) fn expect_len(&self, expected: usize) -> Result<(), KinematicsError> {
        if self.len != expected {
            return Err(KinematicsError::InvalidInput("joint count does not match the topology"));
        }
        Ok(())
    }
}

impl<const N: usize> From<[f64; N]> for Joints {
    fn from(values: [f64; N]) -> Self {
        Joints::from_array(values)
    }
}

impl Deref for Joints {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        self.as_slice()
    }
}

impl DerefMut for Joints {
    fn deref_mut(&mut self) -> &mut [f64] {
        self.as_mut_slice()
    }
}

impl fmt::Debug for Joints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

bitflags! {
    /// Flags passed into forward kinematics to pick one of several poses matching the same joints.
    /// Bits not named here are carried through untouched.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ForwardFlags: u32 {
        /// The platform (or apex) is below the base plane.
        const BELOW_BASE = 0b0000_0001;

        const _ = !0;
    }
}

bitflags! {
    /// Flags passed into inverse kinematics to pick one of several joint configurations
    /// reaching the same pose. Bits not named here are carried through untouched.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InverseFlags: u32 {
        /// Two-link arms (SCARA, Scorbot): the elbow angle is negative.
        const ELBOW_NEGATIVE = 0b0000_0001;

        /// PUMA arm: the wrist center is behind the shoulder, reached over the base axis.
        const SHOULDER_RIGHT = 0b0000_0010;

        /// PUMA arm: elbow below the line from the shoulder to the wrist center.
        const ELBOW_DOWN = 0b0000_0100;

        /// PUMA arm: joint 5 negative, joints 4 and 6 turned by half a turn.
        const WRIST_FLIP = 0b0000_1000;

        /// Reported by PUMA forward kinematics when joint 5 is zero and joints 4 and 6 turn
        /// around the same axis. Ignored on input.
        const WRIST_SINGULAR = 0b0001_0000;

        const _ = !0;
    }
}

/// Which operations a topology provides and how they relate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KinematicsType {
    /// Joints map one to one onto world axes.
    Identity,
    ForwardOnly,
    InverseOnly,
    /// Both directions are implemented and are exact inverses of each other.
    Both,
}

/// Result of forward kinematics: the pose and the inverse flags describing its branch.
pub type ForwardResult = Result<(Pose, InverseFlags), KinematicsError>;

/// Result of inverse kinematics: the joints and the forward flags describing their branch.
pub type InverseResult = Result<(Joints, ForwardFlags), KinematicsError>;

/// Four-operation surface implemented by every machine topology.
///
/// Flags returned by one call are valid input for the next, so the controller can keep
/// the branch stable over successive servo cycles without re-deriving it.
pub trait Kinematics {
    /// Joint space to world space.
    fn forward(&self, joints: &Joints, fflags: ForwardFlags) -> ForwardResult;

    /// Forward kinematics starting from the previously known pose. Iterative solvers use
    /// `previous` as the initial estimate, closed-form ones ignore it.
    fn forward_continuing(&self, joints: &Joints, previous: &Pose, fflags: ForwardFlags) -> ForwardResult {
        let _ = previous;
        self.forward(joints, fflags)
    }

    /// World space to joint space.
    fn inverse(&self, pose: &Pose, iflags: InverseFlags) -> InverseResult;

    /// Inverse kinematics starting from the previously known joints. Iterative solvers use
    /// `previous` as the initial estimate, revolution tracking uses it to stay continuous.
    fn inverse_continuing(&self, pose: &Pose, previous: &Joints, iflags: InverseFlags) -> InverseResult {
        let _ = previous;
        self.inverse(pose, iflags)
    }

    /// Joint configuration the machine is at after homing, if the topology defines one.
    /// `None` means every joint homes on its own and the current joints are kept.
    fn home_joints(&self) -> Option<Joints> {
        None
    }

    /// Forward kinematics applied at the home joint configuration. The seed pose is the
    /// initial estimate for iterative solvers; the seed joints are used as the home configuration
    /// when the topology does not define one.
    fn home(&self, seed_pose: &Pose, seed_joints: &Joints) -> Result<(Pose, Joints), KinematicsError> {
        let joints = self.home_joints().unwrap_or(*seed_joints);
        let (pose, _) = self.forward_continuing(&joints, seed_pose, ForwardFlags::empty())?;
        Ok((pose, joints))
    }

    fn kind(&self) -> KinematicsType;

    /// Number of joints this topology expects and produces.
    fn joint_count(&self) -> usize;
}
