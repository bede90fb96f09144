#[cfg(test)]
mod tests {
    extern crate rand;

    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::corexy::CoreXy;
    use crate::five_axis::FiveAxis;
    use crate::kinematic_traits::{ForwardFlags, InverseFlags, Joints, Kinematics};
    use crate::linear_delta::LinearDelta;
    use crate::parameters::{
        CoreXyParameters, FiveAxisParameters, LinearDeltaParameters, PivotHeadParameters,
        PumaParameters, RotaryDeltaParameters, RotatedXyParameters, ScaraParameters,
        ScorbotParameters, TripodParameters, TrunnionParameters,
    };
    use crate::pivot_head::PivotHead;
    use crate::pose::Pose;
    use crate::puma::Puma;
    use crate::rotary_delta::RotaryDelta;
    use crate::rotated_xy::RotatedXy;
    use crate::scara::Scara;
    use crate::scorbot::Scorbot;
    use crate::topology::{Topology, TOPOLOGY_NAMES};
    use crate::tripod::Tripod;
    use crate::trunnion::Trunnion;

    const CASES: usize = 500;
    const TOLERANCE: f64 = 1e-7;

    fn either_sign(rng: &mut StdRng, low: f64, high: f64) -> f64 {
        let magnitude = rng.gen_range(low..high);
        if rng.gen_bool(0.5) { magnitude } else { -magnitude }
    }

    /// Forward, then inverse with the flags forward reported, must give the joints back.
    fn assert_joints_round_trip(kins: &dyn Kinematics, joints: &Joints) {
        let (pose, iflags) = kins.forward(joints, ForwardFlags::empty()).expect("forward kinematics");
        let (back, _) = kins.inverse(&pose, iflags).expect("inverse kinematics");
        for (found, expected) in back.iter().zip(joints.iter()) {
            assert_abs_diff_eq!(*found, *expected, epsilon = TOLERANCE);
        }
    }

    /// Inverse, then forward with the flags inverse reported, must give the pose back.
    fn assert_pose_round_trip(kins: &dyn Kinematics, pose: &Pose) {
        let (joints, fflags) = kins.inverse(pose, InverseFlags::empty()).expect("inverse kinematics");
        let (back, _) = kins.forward(&joints, fflags).expect("forward kinematics");
        assert!(back.approx_eq(pose, TOLERANCE, TOLERANCE), "{:?} came back as {:?}", pose, back);
    }

    #[test]
    fn test_scara_round_trips() {
        let mut rng = StdRng::seed_from_u64(42);
        let kins = Scara::new(ScaraParameters::default());
        for _ in 0..CASES {
            let joints = Joints::from([
                rng.gen_range(-90.0..90.0),
                either_sign(&mut rng, 20.0, 150.0),
                rng.gen_range(0.0..100.0),
                rng.gen_range(-90.0..90.0),
            ]);
            assert_joints_round_trip(&kins, &joints);
        }
    }

    #[test]
    fn test_scorbot_round_trips() {
        let mut rng = StdRng::seed_from_u64(43);
        let kins = Scorbot::new(ScorbotParameters::default());
        for _ in 0..CASES {
            let joints = Joints::from([
                rng.gen_range(-150.0..150.0),
                rng.gen_range(0.0..45.0),
                either_sign(&mut rng, 20.0, 80.0),
                rng.gen_range(-90.0..90.0),
                rng.gen_range(-180.0..180.0),
            ]);
            assert_joints_round_trip(&kins, &joints);
        }
    }

    #[test]
    fn test_puma_round_trips_on_every_branch() {
        let mut rng = StdRng::seed_from_u64(48);
        let kins = Puma::new(PumaParameters::default());
        for _ in 0..CASES {
            // Elbow kept off its stretched position, wrist off its singular one
            let joints = Joints::from([
                rng.gen_range(-170.0..170.0),
                rng.gen_range(-170.0..170.0),
                rng.gen_range(-70.0..85.0),
                rng.gen_range(-170.0..170.0),
                either_sign(&mut rng, 10.0, 170.0),
                rng.gen_range(-170.0..170.0),
            ]);
            let (pose, iflags) = kins.forward(&joints, ForwardFlags::empty()).expect("forward kinematics");
            let (back, _) = kins.inverse(&pose, iflags).expect("inverse kinematics");
            for (found, expected) in back.iter().zip(joints.iter()) {
                // Pose angles lose some precision near a pitch of 90 degrees
                assert_abs_diff_eq!(*found, *expected, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_rotary_delta_round_trips() {
        let mut rng = StdRng::seed_from_u64(44);
        let kins = RotaryDelta::new(RotaryDeltaParameters::default());
        for _ in 0..CASES {
            let joints = Joints::from([
                rng.gen_range(-20.0..60.0),
                rng.gen_range(-20.0..60.0),
                rng.gen_range(-20.0..60.0),
            ]);
            assert_joints_round_trip(&kins, &joints);
        }
    }

    #[test]
    fn test_linear_delta_round_trips() {
        let mut rng = StdRng::seed_from_u64(45);
        let kins = LinearDelta::new(LinearDeltaParameters::default());
        for _ in 0..CASES {
            let radius: f64 = rng.gen_range(0.0..80.0);
            let angle: f64 = rng.gen_range(0.0..360.0);
            let (sin, cos) = angle.to_radians().sin_cos();
            let pose = Pose::from_xyz(radius * cos, radius * sin, rng.gen_range(-100.0..100.0));
            assert_pose_round_trip(&kins, &pose);
        }
    }

    #[test]
    fn test_tripod_round_trips_on_both_sides() {
        let mut rng = StdRng::seed_from_u64(46);
        let kins = Tripod::new(TripodParameters::default());
        for _ in 0..CASES {
            let pose = Pose::from_xyz(
                rng.gen_range(0.0..400.0),
                rng.gen_range(0.0..350.0),
                either_sign(&mut rng, 50.0, 400.0),
            );
            assert_pose_round_trip(&kins, &pose);
        }
    }

    #[test]
    fn test_linear_coupled_round_trips() {
        let mut rng = StdRng::seed_from_u64(47);
        let corexy = CoreXy::new(CoreXyParameters { joint_count: 5 });
        let rotated = RotatedXy::new(RotatedXyParameters { angle: 30.0, joint_count: 5 });
        let pivot_head = PivotHead::new(PivotHeadParameters { pivot_length: 150.0, conventional_directions: true });
        let five_axis = FiveAxis::new(FiveAxisParameters::default());
        let trunnion_parameters = TrunnionParameters {
            rotation_point: [15.0, -20.0, 60.0].into(),
            axis_offset: [0.0, 12.0, -8.0].into(),
            tool_offset: 120.0,
            conventional_directions: false,
        };
        let xyzac = Trunnion::xyzac(trunnion_parameters);
        let xyzbc = Trunnion::xyzbc(trunnion_parameters);

        for _ in 0..CASES {
            let mut values = [0.0; 6];
            for value in values.iter_mut() {
                *value = rng.gen_range(-300.0..300.0);
            }
            let angles = [rng.gen_range(-120.0..120.0), rng.gen_range(-360.0..360.0)];

            assert_joints_round_trip(&corexy, &Joints::from_slice(&values[..5]).expect("five joints"));
            assert_joints_round_trip(&rotated, &Joints::from_slice(&values[..5]).expect("five joints"));
            assert_joints_round_trip(
                &five_axis,
                &Joints::from([values[0], values[1], values[2], angles[0], angles[1], values[3].abs() / 10.0]),
            );
            let table = Joints::from([values[0], values[1], values[2], angles[0], angles[1]]);
            assert_joints_round_trip(&xyzac, &table);
            assert_joints_round_trip(&xyzbc, &table);
            assert_joints_round_trip(&pivot_head, &table);
        }
    }

    #[test]
    fn test_every_topology_round_trips_at_home() {
        // Forward at the home configuration (or mid travel), back through inverse
        for name in TOPOLOGY_NAMES {
            let topology = Topology::from_name(name).expect("known name");
            let seed = match topology.joint_count() {
                3 if name == "tripodkins" => Joints::from([350.0, 403.11288741492746, 393.70039370059055]),
                3 if name == "lineardeltakins" => Joints::from([230.0, 230.0, 230.0]),
                3 => Joints::from([20.0, 10.0, 30.0]),
                n => Joints::from_slice(&[15.0, 25.0, 35.0, 10.0, 20.0, 5.0, 1.0, 2.0, 3.0][..n]).expect("fits"),
            };
            // Parallel platforms need an estimate near their working volume
            let seed_pose = match name {
                "genhexkins" => Pose::from_xyz(0.0, 0.0, 390.0),
                "pentakins" => Pose::from_xyz(0.0, 0.0, -490.0),
                _ => Pose::default(),
            };
            let (pose, joints) = topology.home(&seed_pose, &seed).expect("home is valid");
            let (_, iflags) = topology.forward_continuing(&joints, &pose, ForwardFlags::empty()).expect(name);
            let (back, _) = topology.inverse_continuing(&pose, &joints, iflags).expect(name);
            for (found, expected) in back.iter().zip(joints.iter()) {
                assert_abs_diff_eq!(*found, *expected, epsilon = 1e-5);
            }
        }
    }
}
