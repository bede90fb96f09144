//! Closed set of supported machine topologies.
//!
//! The controller picks one at startup (usually from a configuration file, see
//! [`Topology::from_yaml_str`]) and calls it through the [`Kinematics`] trait. Every variant
//! owns its geometry, so switching machines means building another value.

use crate::corexy::CoreXy;
use crate::five_axis::FiveAxis;
use crate::hexapod::Hexapod;
use crate::kinematic_traits::{
    ForwardFlags, ForwardResult, InverseFlags, InverseResult, Joints, Kinematics, KinematicsType,
};
use crate::kinematics_error::KinematicsError;
use crate::linear_delta::LinearDelta;
use crate::parameters::{
    CoreXyParameters, FiveAxisParameters, HexapodParameters, LinearDeltaParameters,
    PentapodParameters, PivotHeadParameters, PumaParameters, RotaryDeltaParameters,
    RotatedXyParameters, ScaraParameters, ScorbotParameters, SerialParameters,
    TripodParameters, TrunnionParameters,
};
use crate::pentapod::Pentapod;
use crate::pivot_head::PivotHead;
use crate::pose::Pose;
use crate::puma::Puma;
use crate::rose::Rose;
use crate::rotary_delta::RotaryDelta;
use crate::rotated_xy::RotatedXy;
use crate::scara::Scara;
use crate::scorbot::Scorbot;
use crate::serial::Serial;
use crate::trivial::Trivial;
use crate::tripod::Tripod;
use crate::trunnion::{TiltAxis, Trunnion};

#[derive(Debug)]
pub enum Topology {
    Trivial(Trivial),
    CoreXy(CoreXy),
    RotatedXy(RotatedXy),
    Scara(Scara),
    Scorbot(Scorbot),
    Puma(Puma),
    RotaryDelta(RotaryDelta),
    LinearDelta(LinearDelta),
    Tripod(Tripod),
    Trunnion(Trunnion),
    FiveAxis(FiveAxis),
    PivotHead(PivotHead),
    Rose(Rose),
    Hexapod(Hexapod),
    Pentapod(Pentapod),
    Serial(Serial),
}

/// Names accepted by [`Topology::from_name`] and in the `kinematics` key of configuration files.
pub const TOPOLOGY_NAMES: [&str; 17] = [
    "trivkins",
    "corexykins",
    "rotatekins",
    "scarakins",
    "scorbot-kins",
    "pumakins",
    "rotarydeltakins",
    "lineardeltakins",
    "tripodkins",
    "xyzac-trt-kins",
    "xyzbc-trt-kins",
    "5axiskins",
    "maxkins",
    "rosekins",
    "genhexkins",
    "pentakins",
    "genserkins",
];

macro_rules! dispatch {
    ($self:expr, $kins:ident => $call:expr) => {
        match $self {
            Topology::Trivial($kins) => $call,
            Topology::CoreXy($kins) => $call,
            Topology::RotatedXy($kins) => $call,
            Topology::Scara($kins) => $call,
            Topology::Scorbot($kins) => $call,
            Topology::Puma($kins) => $call,
            Topology::RotaryDelta($kins) => $call,
            Topology::LinearDelta($kins) => $call,
            Topology::Tripod($kins) => $call,
            Topology::Trunnion($kins) => $call,
            Topology::FiveAxis($kins) => $call,
            Topology::PivotHead($kins) => $call,
            Topology::Rose($kins) => $call,
            Topology::Hexapod($kins) => $call,
            Topology::Pentapod($kins) => $call,
            Topology::Serial($kins) => $call,
        }
    };
}

impl Topology {
    /// Name of the topology as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Topology::Trivial(_) => "trivkins",
            Topology::CoreXy(_) => "corexykins",
            Topology::RotatedXy(_) => "rotatekins",
            Topology::Scara(_) => "scarakins",
            Topology::Scorbot(_) => "scorbot-kins",
            Topology::Puma(_) => "pumakins",
            Topology::RotaryDelta(_) => "rotarydeltakins",
            Topology::LinearDelta(_) => "lineardeltakins",
            Topology::Tripod(_) => "tripodkins",
            Topology::Trunnion(kins) => match kins.tilt_axis() {
                TiltAxis::A => "xyzac-trt-kins",
                TiltAxis::B => "xyzbc-trt-kins",
            },
            Topology::FiveAxis(_) => "5axiskins",
            Topology::PivotHead(_) => "maxkins",
            Topology::Rose(_) => "rosekins",
            Topology::Hexapod(_) => "genhexkins",
            Topology::Pentapod(_) => "pentakins",
            Topology::Serial(_) => "genserkins",
        }
    }

    /// Topology with its stock geometry, or `None` for an unknown name.
    pub fn from_name(name: &str) -> Option<Topology> {
        let topology = match name {
            "trivkins" => Topology::Trivial(Trivial::default()),
            "corexykins" => Topology::CoreXy(CoreXy::new(CoreXyParameters::default())),
            "rotatekins" => Topology::RotatedXy(RotatedXy::new(RotatedXyParameters::default())),
            "scarakins" => Topology::Scara(Scara::new(ScaraParameters::default())),
            "scorbot-kins" => Topology::Scorbot(Scorbot::new(ScorbotParameters::default())),
            "pumakins" => Topology::Puma(Puma::new(PumaParameters::default())),
            "rotarydeltakins" => Topology::RotaryDelta(RotaryDelta::new(RotaryDeltaParameters::default())),
            "lineardeltakins" => Topology::LinearDelta(LinearDelta::new(LinearDeltaParameters::default())),
            "tripodkins" => Topology::Tripod(Tripod::new(TripodParameters::default())),
            "xyzac-trt-kins" => Topology::Trunnion(Trunnion::xyzac(TrunnionParameters::default())),
            "xyzbc-trt-kins" => Topology::Trunnion(Trunnion::xyzbc(TrunnionParameters::default())),
            "5axiskins" => Topology::FiveAxis(FiveAxis::new(FiveAxisParameters::default())),
            "maxkins" => Topology::PivotHead(PivotHead::new(PivotHeadParameters::default())),
            "rosekins" => Topology::Rose(Rose::new()),
            "genhexkins" => Topology::Hexapod(Hexapod::new(HexapodParameters::default())),
            "pentakins" => Topology::Pentapod(Pentapod::new(PentapodParameters::default())),
            "genserkins" => Topology::Serial(Serial::new(SerialParameters::default())),
            _ => return None,
        };
        Some(topology)
    }
}

impl Kinematics for Topology {
    fn forward(&self, joints: &Joints, fflags: ForwardFlags) -> ForwardResult {
        dispatch!(self, kins => kins.forward(joints, fflags))
    }

    fn forward_continuing(&self, joints: &Joints, previous: &Pose, fflags: ForwardFlags) -> ForwardResult {
        dispatch!(self, kins => kins.forward_continuing(joints, previous, fflags))
    }

    fn inverse(&self, pose: &Pose, iflags: InverseFlags) -> InverseResult {
        dispatch!(self, kins => kins.inverse(pose, iflags))
    }

    fn inverse_continuing(&self, pose: &Pose, previous: &Joints, iflags: InverseFlags) -> InverseResult {
        dispatch!(self, kins => kins.inverse_continuing(pose, previous, iflags))
    }

    fn home_joints(&self) -> Option<Joints> {
        dispatch!(self, kins => kins.home_joints())
    }

    fn home(&self, seed_pose: &Pose, seed_joints: &Joints) -> Result<(Pose, Joints), KinematicsError> {
        dispatch!(self, kins => kins.home(seed_pose, seed_joints))
    }

    fn kind(&self) -> KinematicsType {
        dispatch!(self, kins => kins.kind())
    }

    fn joint_count(&self) -> usize {
        dispatch!(self, kins => kins.joint_count())
    }
}
