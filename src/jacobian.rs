extern crate nalgebra as na;

use na::{SVector, Vector6};

use crate::kinematic_traits::{Joints, MAX_JOINTS};
use crate::kinematics_error::KinematicsError;
use crate::linalg::pseudo_inverse;
use crate::parameters::SerialParameters;
use crate::pose::Screw;
use crate::serial::{geometric_jacobian, JacobianMatrix};

/// Geometric Jacobian of a serial chain at one joint configuration.
pub struct Jacobian {
    /// A 6 x MAX_JOINTS matrix, of which the first `columns` columns are used.
    ///
    /// The Jacobian matrix maps the joint velocities to the end-effector velocities.
    /// Each column corresponds to a joint, and each row corresponds to a degree of freedom
    /// of the end-effector (linear and angular velocities).
    matrix: JacobianMatrix,

    columns: usize,

    /// Revolute joints are reported in degrees, prismatic ones in machine units.
    prismatic: [bool; MAX_JOINTS],
}

impl Jacobian {
    /// Constructs a new Jacobian struct by computing the Jacobian matrix for the given chain and joint configuration
    ///
    /// # Arguments
    ///
    /// * `parameters` - Geometry of the serial chain
    /// * `joints` - Joint configuration, degrees for revolute joints
    ///
    /// # Returns
    ///
    /// A new instance of `Jacobian`, or `InvalidInput` if the joints do not fit the chain.
    pub fn new(parameters: &SerialParameters, joints: &Joints) -> Result<Self, KinematicsError> {
        let matrix = geometric_jacobian(parameters, joints)?;
        Ok(Jacobian {
            matrix,
            columns: parameters.joint_count,
            prismatic: parameters.prismatic,
        })
    }

    /// Jacobian with radians as the unit of revolute joints.
    pub fn matrix(&self) -> &JacobianMatrix {
        &self.matrix
    }

    /// Computes the joint velocities required to achieve a desired end-effector velocity
    ///
    /// # Arguments
    ///
    /// * `desired_velocity` - Linear velocity and angular velocity (radians per unit time) of the end-effector
    ///
    /// # Returns
    ///
    /// Joint velocities, degrees per unit time for revolute joints, or `Singular` if the
    /// Jacobian cannot be inverted. Chains with fewer than six joints get the least squares
    /// solution, redundant chains the minimum norm one.
    pub fn velocities(&self, desired_velocity: &Screw) -> Result<Joints, KinematicsError> {
        self.velocities_from_vector(&desired_velocity.to_vector6())
    }

    /// Same as [`velocities`](Self::velocities), linear part in the first three elements.
    pub fn velocities_from_vector(&self, desired_velocity: &Vector6<f64>) -> Result<Joints, KinematicsError> {
        let inverse = pseudo_inverse(&self.matrix, self.columns)?;
        let joint_velocities = inverse * desired_velocity;
        self.to_joints(&joint_velocities, true)
    }

    /// Computes the joint torques (or forces, for prismatic joints) that balance the given
    /// force and torque at the end-effector: `Jᵗ * w`.
    pub fn torques(&self, desired_force_torque: &Screw) -> Result<Joints, KinematicsError> {
        self.torques_from_vector(&desired_force_torque.to_vector6())
    }

    pub fn torques_from_vector(&self, desired_force_torque: &Vector6<f64>) -> Result<Joints, KinematicsError> {
        let joint_torques = self.matrix.transpose() * desired_force_torque;
        self.to_joints(&joint_torques, false)
    }

    fn to_joints(&self, values: &SVector<f64, MAX_JOINTS>, revolute_in_degrees: bool) -> Result<Joints, KinematicsError> {
        let mut joints = Joints::zeros(self.columns)?;
        for i in 0..self.columns {
            joints[i] = if revolute_in_degrees && !self.prismatic[i] {
                values[i].to_degrees()
            } else {
                values[i]
            };
        }
        Ok(joints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use na::Vector3;
    use crate::serial::forward_kinematics;

    /// Single revolute joint around Z with the tip on its axis.
    fn single_joint() -> SerialParameters {
        let mut parameters = SerialParameters::default();
        parameters.joint_count = 1;
        parameters.a = [0.0; MAX_JOINTS];
        parameters.alpha = [0.0; MAX_JOINTS];
        parameters.d = [0.0; MAX_JOINTS];
        parameters
    }

    #[test]
    fn test_single_joint_jacobian() {
        let jacobian = Jacobian::new(&single_joint(), &Joints::from([0.0])).expect("valid chain");
        assert_abs_diff_eq!(jacobian.matrix()[(5, 0)], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(jacobian.matrix()[(1, 0)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_velocities_least_squares_single_joint() {
        let jacobian = Jacobian::new(&single_joint(), &Joints::from([30.0])).expect("valid chain");
        let turn = Screw::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0f64.to_radians()));
        let velocities = jacobian.velocities(&turn).expect("full column rank");
        assert_eq!(velocities.len(), 1);
        assert_abs_diff_eq!(velocities[0], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_velocities_reproduce_motion() {
        let parameters = SerialParameters::default();
        let joints = Joints::from([10.0, -20.0, 30.0, 15.0, 40.0, -25.0]);
        let jacobian = Jacobian::new(&parameters, &joints).expect("valid chain");
        let screw = Screw::new(Vector3::new(1.0, -2.0, 0.5), Vector3::new(0.001, 0.0, -0.002));
        let velocities = jacobian.velocities(&screw).expect("regular configuration");

        // Moving the joints a tiny bit at those rates moves the tip by the screw
        let dt = 1e-6;
        let mut moved = joints;
        for i in 0..6 {
            moved[i] += velocities[i] * dt;
        }
        let before = forward_kinematics(&parameters, &joints).expect("valid chain");
        let after = forward_kinematics(&parameters, &moved).expect("valid chain");
        let linear = (after.translation.vector - before.translation.vector) / dt;
        assert_abs_diff_eq!(linear.x, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(linear.y, -2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(linear.z, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_velocities_in_singularity() {
        let jacobian = Jacobian::new(&SerialParameters::default(), &Joints::from([0.0; 6])).expect("valid chain");
        let screw = Screw::new(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros());
        assert_eq!(jacobian.velocities(&screw), Err(KinematicsError::Singular));
    }

    #[test]
    fn test_torques_are_transpose_product() {
        let parameters = SerialParameters::default();
        let joints = Joints::from([10.0, -20.0, 30.0, 15.0, 40.0, -25.0]);
        let jacobian = Jacobian::new(&parameters, &joints).expect("valid chain");
        let wrench = Screw::new(Vector3::new(0.0, 0.0, -10.0), Vector3::zeros());
        let torques = jacobian.torques(&wrench).expect("valid chain");
        for i in 0..6 {
            assert_abs_diff_eq!(torques[i], -10.0 * jacobian.matrix()[(2, i)], epsilon = 1e-12);
        }
        // The last joint axis passes through the tip, a pure force does not load it
        assert_abs_diff_eq!(torques[5], 0.0, epsilon = 1e-9);
    }
}
