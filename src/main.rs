use anyhow::{Context, Result};
use rs_cnc_kinematics::hexapod::Hexapod;
use rs_cnc_kinematics::jacobian::Jacobian;
use rs_cnc_kinematics::kinematic_traits::{ForwardFlags, InverseFlags, Joints, Kinematics};
use rs_cnc_kinematics::parameters::{HexapodParameters, SerialParameters};
use rs_cnc_kinematics::pose::{Pose, Screw};
use rs_cnc_kinematics::topology::Topology;
use rs_cnc_kinematics::utils::{dump_joints, dump_pose};

/// Usage example.
fn main() -> Result<()> {
    println!("SCARA, both elbow configurations reaching the same point:");
    let scara = Topology::from_name("scarakins").context("unknown topology")?;
    let pose = Pose::new(350.0, 200.0, 450.0, 0.0, 0.0, 30.0);
    for iflags in [InverseFlags::empty(), InverseFlags::ELBOW_NEGATIVE] {
        let (joints, _) = scara.inverse(&pose, iflags)?;
        dump_joints(&joints);
    }

    println!("PUMA arm, the eight joint sets reaching one pose:");
    let puma = Topology::from_name("pumakins").context("unknown topology")?;
    let (pose, _) = puma.forward(&Joints::from([10.0, -20.0, 30.0, 15.0, 40.0, -25.0]), ForwardFlags::empty())?;
    for bits in 0..8u32 {
        let (joints, _) = puma.inverse(&pose, InverseFlags::from_bits_retain(bits << 1))?;
        dump_joints(&joints);
    }

    println!("Hexapod forward kinematics from strut lengths, starting at the home pose:");
    let hexapod = Hexapod::new(HexapodParameters::default());
    let target = Pose::new(10.0, -20.0, 380.0, 5.0, -3.0, 8.0);
    let (struts, _) = hexapod.inverse(&target, InverseFlags::empty())?;
    dump_joints(&struts);
    let (found, _) = hexapod.forward(&struts, ForwardFlags::empty())?;
    dump_pose(&found);
    println!("Iterations: {}", hexapod.stats().last());

    println!("Same struts, continuing from the previous pose:");
    hexapod.forward_continuing(&struts, &found, ForwardFlags::empty())?;
    println!("Iterations: {}", hexapod.stats().last());

    println!("Tool length changed at runtime, the same struts now place the tool 50 lower:");
    hexapod.parameters().update(|p| p.tool_offset = 50.0);
    let (found, _) = hexapod.forward_continuing(&struts, &found, ForwardFlags::empty())?;
    dump_pose(&found);

    println!("Serial chain, joint velocities moving the tip along X at 10 units per second:");
    let parameters = SerialParameters::default();
    let joints = Joints::from([10.0, -20.0, 30.0, 15.0, 40.0, -25.0]);
    let jacobian = Jacobian::new(&parameters, &joints)?;
    let velocities = jacobian.velocities(&Screw::new([10.0, 0.0, 0.0].into(), [0.0, 0.0, 0.0].into()))?;
    dump_joints(&velocities);

    #[cfg(feature = "allow_filesystem")]
    {
        // This requires YAML library
        println!("Reading:\n{}", parameters.to_yaml());
        let serial = Topology::from_yaml_str(&parameters.to_yaml())?;
        let (pose, _) = serial.forward(&joints, ForwardFlags::empty())?;
        dump_pose(&pose);
    }

    Ok(())
}
