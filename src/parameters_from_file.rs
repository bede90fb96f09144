//! Builds a topology from a YAML configuration (optional)
//!
//! ```yaml
//! kinematics: genserkins
//! geometry:
//!   a: [0, 0, 300, 50, 0, 0]
//!   alpha: [0, deg(-90), 0, deg(-90), deg(90), deg(-90)]
//!   d: [0, 0, 70, 400, 0, 0]
//!   home: [0, -30, 30, 0, 30, 0]
//! convergence:
//!   iteration_limit: 50
//! ```
//!
//! `kinematics` names the topology (see [`TOPOLOGY_NAMES`]). Every key of `geometry` and
//! `convergence` is optional and falls back to the stock value of that topology, except that a
//! serial chain given by `a` must also list `alpha`, `d` and a non-singular `home` of the same
//! length.
//!
//! `deg(x)` is replaced by `x` converted to radians before parsing. Use it for the fields stored
//! in radians (the serial link twists `alpha`); joint positions and pose angles are already degrees.

use std::fs;
use std::path::Path;

extern crate nalgebra as na;

use na::Vector3;
use regex::{Captures, Regex};
use tracing::warn;
use yaml_rust2::{Yaml, YamlLoader};

use crate::convergence::Convergence;
use crate::corexy::CoreXy;
use crate::five_axis::FiveAxis;
use crate::hexapod::Hexapod;
use crate::kinematic_traits::{Joints, MAX_JOINTS};
use crate::linalg::pseudo_inverse;
use crate::linear_delta::LinearDelta;
use crate::parameter_error::ParameterError;
use crate::parameters::{
    CoreXyParameters, FiveAxisParameters, HexapodParameters, LinearDeltaParameters,
    PentapodParameters, PivotHeadParameters, PumaParameters, RotaryDeltaParameters,
    RotatedXyParameters, ScaraParameters, ScorbotParameters, SerialParameters,
    TrivialParameters, TripodParameters, TrunnionParameters,
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
use crate::serial::{geometric_jacobian, Serial};
use crate::topology::{Topology, TOPOLOGY_NAMES};
use crate::trivial::Trivial;
use crate::tripod::Tripod;
use crate::trunnion::Trunnion;

impl Topology {
    /// Read the machine configuration from a YAML file. See the module documentation for the format.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse the machine configuration from a YAML string.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let contents = expand_degrees(contents)?;
        let docs = YamlLoader::load_from_str(&contents)
            .map_err(|e| ParameterError::ParseError(e.to_string()))?;
        let doc = docs
            .first()
            .ok_or_else(|| ParameterError::ParseError("empty document".to_string()))?;

        let name = match &doc["kinematics"] {
            Yaml::String(name) => name.as_str(),
            Yaml::BadValue => return Err(ParameterError::MissingField("kinematics".to_string())),
            _ => return Err(ParameterError::InvalidValue("kinematics: expected a name".to_string())),
        };
        if !TOPOLOGY_NAMES.contains(&name) {
            return Err(ParameterError::UnknownKinematics(name.to_string()));
        }

        let geometry = Section::new(&doc["geometry"], "geometry")?;
        let convergence = Section::new(&doc["convergence"], "convergence")?;
        let iterative = matches!(name, "genhexkins" | "pentakins" | "genserkins");
        if !iterative && !convergence.is_empty() {
            warn!("{} is closed form, convergence settings ignored", name);
        }

        let topology = match name {
            "trivkins" => Topology::Trivial(Trivial::new(trivial(&geometry)?)),
            "corexykins" => {
                let default = CoreXyParameters::default();
                Topology::CoreXy(CoreXy::new(CoreXyParameters {
                    joint_count: geometry.count("joint_count", default.joint_count)?,
                }))
            }
            "rotatekins" => {
                let d = RotatedXyParameters::default();
                Topology::RotatedXy(RotatedXy::new(RotatedXyParameters {
                    angle: geometry.number("angle", d.angle)?,
                    joint_count: geometry.count("joint_count", d.joint_count)?,
                }))
            }
            "scarakins" => {
                let d = ScaraParameters::default();
                Topology::Scara(Scara::new(ScaraParameters {
                    d1: geometry.number("d1", d.d1)?,
                    d2: geometry.number("d2", d.d2)?,
                    d3: geometry.number("d3", d.d3)?,
                    d4: geometry.number("d4", d.d4)?,
                    d5: geometry.number("d5", d.d5)?,
                    d6: geometry.number("d6", d.d6)?,
                }))
            }
            "scorbot-kins" => {
                let d = ScorbotParameters::default();
                Topology::Scorbot(Scorbot::new(ScorbotParameters {
                    l0_horizontal: geometry.number("l0_horizontal", d.l0_horizontal)?,
                    l0_vertical: geometry.number("l0_vertical", d.l0_vertical)?,
                    l1: geometry.number("l1", d.l1)?,
                    l2: geometry.number("l2", d.l2)?,
                }))
            }
            "pumakins" => {
                let d = PumaParameters::default();
                Topology::Puma(Puma::new(PumaParameters {
                    a2: geometry.number("a2", d.a2)?,
                    a3: geometry.number("a3", d.a3)?,
                    d3: geometry.number("d3", d.d3)?,
                    d4: geometry.number("d4", d.d4)?,
                    d6: geometry.number("d6", d.d6)?,
                }))
            }
            "rotarydeltakins" => {
                let d = RotaryDeltaParameters::default();
                Topology::RotaryDelta(RotaryDelta::new(RotaryDeltaParameters {
                    platform_radius: geometry.number("platform_radius", d.platform_radius)?,
                    thigh_length: geometry.number("thigh_length", d.thigh_length)?,
                    shin_length: geometry.number("shin_length", d.shin_length)?,
                    foot_radius: geometry.number("foot_radius", d.foot_radius)?,
                }))
            }
            "lineardeltakins" => {
                let d = LinearDeltaParameters::default();
                Topology::LinearDelta(LinearDelta::new(LinearDeltaParameters {
                    radius: geometry.number("radius", d.radius)?,
                    rod_length: geometry.number("rod_length", d.rod_length)?,
                }))
            }
            "tripodkins" => {
                let d = TripodParameters::default();
                Topology::Tripod(Tripod::new(TripodParameters {
                    bx: geometry.number("bx", d.bx)?,
                    cx: geometry.number("cx", d.cx)?,
                    cy: geometry.number("cy", d.cy)?,
                }))
            }
            "xyzac-trt-kins" => Topology::Trunnion(Trunnion::xyzac(trunnion(&geometry)?)),
            "xyzbc-trt-kins" => Topology::Trunnion(Trunnion::xyzbc(trunnion(&geometry)?)),
            "5axiskins" => {
                let d = FiveAxisParameters::default();
                Topology::FiveAxis(FiveAxis::new(FiveAxisParameters {
                    pivot_length: geometry.number("pivot_length", d.pivot_length)?,
                }))
            }
            "maxkins" => {
                let d = PivotHeadParameters::default();
                Topology::PivotHead(PivotHead::new(PivotHeadParameters {
                    pivot_length: geometry.number("pivot_length", d.pivot_length)?,
                    conventional_directions: geometry.flag("conventional_directions", d.conventional_directions)?,
                }))
            }
            "rosekins" => Topology::Rose(Rose::new()),
            "genhexkins" => {
                let d = HexapodParameters::default();
                let parameters = HexapodParameters {
                    base: geometry.points("base", d.base)?,
                    platform: geometry.points("platform", d.platform)?,
                    spindle_offset: geometry.number("spindle_offset", d.spindle_offset)?,
                    tool_offset: geometry.number("tool_offset", d.tool_offset)?,
                    base_normal: geometry.points("base_normal", d.base_normal)?,
                    platform_normal: geometry.points("platform_normal", d.platform_normal)?,
                    screw_lead: geometry.number("screw_lead", d.screw_lead)?,
                    home: geometry.pose("home", d.home)?,
                };
                Topology::Hexapod(Hexapod::with_convergence(parameters, read_convergence(&convergence, Convergence::default())?))
            }
            "pentakins" => {
                let d = PentapodParameters::default();
                let parameters = PentapodParameters {
                    base: geometry.points("base", d.base)?,
                    ring_radius: geometry.numbers("ring_radius", d.ring_radius)?,
                    ring_position: geometry.numbers("ring_position", d.ring_position)?,
                    home: geometry.pose("home", d.home)?,
                };
                Topology::Pentapod(Pentapod::with_convergence(parameters, read_convergence(&convergence, Convergence::default())?))
            }
            "genserkins" => {
                let parameters = serial(&geometry)?;
                Topology::Serial(Serial::with_convergence(parameters, read_convergence(&convergence, Convergence::serial())?))
            }
            _ => return Err(ParameterError::UnknownKinematics(name.to_string())),
        };
        Ok(topology)
    }
}

/// Replaces every `deg(x)` with the value of `x` in radians.
fn expand_degrees(contents: &str) -> Result<String, ParameterError> {
    let re = Regex::new(r"deg\(\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*\)")
        .map_err(|e| ParameterError::ParseError(e.to_string()))?;
    let expanded = re.replace_all(contents, |caps: &Captures| {
        match caps[1].parse::<f64>() {
            Ok(degrees) => degrees.to_radians().to_string(),
            // Left in place, reported as an invalid number by the reader
            Err(_) => caps[0].to_string(),
        }
    });
    Ok(expanded.into_owned())
}

/// One mapping of the document. A missing mapping behaves as an empty one.
struct Section<'a> {
    yaml: &'a Yaml,
    name: &'static str,
}

impl<'a> Section<'a> {
    fn new(yaml: &'a Yaml, name: &'static str) -> Result<Self, ParameterError> {
        match yaml {
            Yaml::Hash(_) | Yaml::BadValue | Yaml::Null => Ok(Section { yaml, name }),
            _ => Err(ParameterError::InvalidValue(format!("{}: expected a mapping", name))),
        }
    }

    fn is_empty(&self) -> bool {
        match self.yaml {
            Yaml::Hash(hash) => hash.is_empty(),
            _ => true,
        }
    }

    fn get(&self, key: &str) -> Option<&'a Yaml> {
        let yaml: &'a Yaml = self.yaml;
        match yaml {
            Yaml::Hash(_) => match &yaml[key] {
                Yaml::BadValue | Yaml::Null => None,
                value => Some(value),
            },
            _ => None,
        }
    }

    fn field(&self, key: &str) -> String {
        format!("{}.{}", self.name, key)
    }

    fn number(&self, key: &str, default: f64) -> Result<f64, ParameterError> {
        match self.get(key) {
            Some(value) => to_f64(value, &self.field(key)),
            None => Ok(default),
        }
    }

    fn count(&self, key: &str, default: usize) -> Result<usize, ParameterError> {
        match self.get(key) {
            Some(Yaml::Integer(n)) if *n >= 0 => Ok(*n as usize),
            Some(_) => Err(ParameterError::InvalidValue(format!("{}: expected a count", self.field(key)))),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool, ParameterError> {
        match self.get(key) {
            Some(Yaml::Boolean(flag)) => Ok(*flag),
            Some(_) => Err(ParameterError::InvalidValue(format!("{}: expected true or false", self.field(key)))),
            None => Ok(default),
        }
    }

    fn text(&self, key: &str) -> Result<Option<&'a str>, ParameterError> {
        match self.get(key) {
            Some(Yaml::String(text)) => Ok(Some(text.as_str())),
            Some(_) => Err(ParameterError::InvalidValue(format!("{}: expected a string", self.field(key)))),
            None => Ok(None),
        }
    }

    /// Array of any length, `None` when the key is absent.
    fn list(&self, key: &str) -> Result<Option<Vec<f64>>, ParameterError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let field = self.field(key);
        let items = as_array(value, &field)?;
        items.iter().map(|item| to_f64(item, &field)).collect::<Result<Vec<_>, _>>().map(Some)
    }

    fn numbers<const N: usize>(&self, key: &str, default: [f64; N]) -> Result<[f64; N], ParameterError> {
        match self.list(key)? {
            Some(values) => fixed(&values),
            None => Ok(default),
        }
    }

    fn vector(&self, key: &str, default: Vector3<f64>) -> Result<Vector3<f64>, ParameterError> {
        let [x, y, z] = self.numbers(key, [default.x, default.y, default.z])?;
        Ok(Vector3::new(x, y, z))
    }

    /// Array of N points, each given as `[x, y, z]`.
    fn points<const N: usize>(&self, key: &str, default: [Vector3<f64>; N]) -> Result<[Vector3<f64>; N], ParameterError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        let field = self.field(key);
        let items = as_array(value, &field)?;
        if items.len() != N {
            return Err(ParameterError::InvalidLength { expected: N, found: items.len() });
        }
        let mut points = default;
        for (point, item) in points.iter_mut().zip(items) {
            let coordinates = as_array(item, &field)?
                .iter()
                .map(|c| to_f64(c, &field))
                .collect::<Result<Vec<_>, _>>()?;
            let [x, y, z]: [f64; 3] = fixed(&coordinates)?;
            *point = Vector3::new(x, y, z);
        }
        Ok(points)
    }

    /// Pose as `[x, y, z, a, b, c]`, angles in degrees.
    fn pose(&self, key: &str, default: Pose) -> Result<Pose, ParameterError> {
        match self.list(key)? {
            Some(values) => {
                let [x, y, z, a, b, c]: [f64; 6] = fixed(&values)?;
                Ok(Pose::new(x, y, z, a, b, c))
            }
            None => Ok(default),
        }
    }
}

fn to_f64(value: &Yaml, field: &str) -> Result<f64, ParameterError> {
    match value {
        Yaml::Integer(n) => Ok(*n as f64),
        Yaml::Real(_) => value
            .as_f64()
            .ok_or_else(|| ParameterError::InvalidValue(format!("{}: not a number", field))),
        _ => Err(ParameterError::InvalidValue(format!("{}: expected a number", field))),
    }
}

fn as_array<'a>(value: &'a Yaml, field: &str) -> Result<&'a Vec<Yaml>, ParameterError> {
    match value {
        Yaml::Array(items) => Ok(items),
        _ => Err(ParameterError::InvalidValue(format!("{}: expected an array", field))),
    }
}

fn fixed<const N: usize>(values: &[f64]) -> Result<[f64; N], ParameterError> {
    values
        .try_into()
        .map_err(|_| ParameterError::InvalidLength { expected: N, found: values.len() })
}

fn trivial(geometry: &Section) -> Result<TrivialParameters, ParameterError> {
    match geometry.text("coordinates")? {
        Some(coordinates) => TrivialParameters::from_coordinates(coordinates)
            .map_err(|e| ParameterError::InvalidValue(format!("{}: {}", geometry.field("coordinates"), e))),
        None => Ok(TrivialParameters::default()),
    }
}

fn trunnion(geometry: &Section) -> Result<TrunnionParameters, ParameterError> {
    let d = TrunnionParameters::default();
    Ok(TrunnionParameters {
        rotation_point: geometry.vector("rotation_point", d.rotation_point)?,
        axis_offset: geometry.vector("axis_offset", d.axis_offset)?,
        tool_offset: geometry.number("tool_offset", d.tool_offset)?,
        conventional_directions: geometry.flag("conventional_directions", d.conventional_directions)?,
    })
}

/// Serial chain. Without `a` the stock chain is used; otherwise the length of `a` sets the
/// number of joints, `alpha`, `d` and `home` must match it and the chain must not be singular
/// at `home`.
fn serial(geometry: &Section) -> Result<SerialParameters, ParameterError> {
    let mut parameters = SerialParameters::default();
    let Some(a) = geometry.list("a")? else {
        return Ok(parameters);
    };
    let n = a.len();
    if n == 0 || n > MAX_JOINTS {
        return Err(ParameterError::InvalidLength { expected: MAX_JOINTS, found: n });
    }

    let required = |key: &str| -> Result<Vec<f64>, ParameterError> {
        let values = geometry.list(key)?.ok_or_else(|| ParameterError::MissingField(geometry.field(key)))?;
        if values.len() != n {
            return Err(ParameterError::InvalidLength { expected: n, found: values.len() });
        }
        Ok(values)
    };
    let alpha = required("alpha")?;
    let d = required("d")?;

    // Plain inverse kinematics iterates from home, so it cannot default to all zeros
    let home = required("home")?;

    let prismatic = match geometry.get("prismatic") {
        Some(value) => {
            let field = geometry.field("prismatic");
            let items = as_array(value, &field)?;
            if items.len() != n {
                return Err(ParameterError::InvalidLength { expected: n, found: items.len() });
            }
            items
                .iter()
                .map(|item| item.as_bool().ok_or_else(|| ParameterError::InvalidValue(format!("{}: expected true or false", field))))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => vec![false; n],
    };

    parameters.joint_count = n;
    parameters.a = [0.0; MAX_JOINTS];
    parameters.alpha = [0.0; MAX_JOINTS];
    parameters.d = [0.0; MAX_JOINTS];
    parameters.home = [0.0; MAX_JOINTS];
    parameters.prismatic = [false; MAX_JOINTS];
    parameters.a[..n].copy_from_slice(&a);
    parameters.alpha[..n].copy_from_slice(&alpha);
    parameters.d[..n].copy_from_slice(&d);
    parameters.home[..n].copy_from_slice(&home);
    parameters.prismatic[..n].copy_from_slice(&prismatic);

    let singular = || ParameterError::InvalidValue(format!("{}: singular configuration", geometry.field("home")));
    let home = Joints::from_slice(&home).map_err(|_| singular())?;
    let jacobian = geometric_jacobian(&parameters, &home).map_err(|_| singular())?;
    pseudo_inverse(&jacobian, n).map_err(|_| singular())?;
    Ok(parameters)
}

fn read_convergence(section: &Section, default: Convergence) -> Result<Convergence, ParameterError> {
    let iteration_limit = section.count("iteration_limit", default.iteration_limit as usize)?;
    let iteration_limit = u32::try_from(iteration_limit)
        .map_err(|_| ParameterError::InvalidValue(section.field("iteration_limit")))?;
    Ok(Convergence {
        iteration_limit,
        criterion: section.number("criterion", default.criterion)?,
        angular_criterion: section.number("angular_criterion", default.angular_criterion)?,
        max_error: section.number("max_error", default.max_error)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_degrees() {
        let expanded = expand_degrees("alpha: [0, deg(-90), deg( 45.5 ), deg(1e1)]").expect("valid regex");
        let values: Vec<f64> = expanded
            .trim_start_matches("alpha: [")
            .trim_end_matches(']')
            .split(", ")
            .map(|v| v.parse().expect("number"))
            .collect();
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], (-90.0f64).to_radians());
        assert_eq!(values[2], 45.5f64.to_radians());
        assert_eq!(values[3], 10.0f64.to_radians());
    }

    #[test]
    fn test_integers_and_reals() {
        let docs = YamlLoader::load_from_str("g: {a: 3, b: 2.5, c: -1e-3, d: text}").expect("valid yaml");
        let section = Section::new(&docs[0]["g"], "g").expect("mapping");
        assert_eq!(section.number("a", 0.0).expect("integer"), 3.0);
        assert_eq!(section.number("b", 0.0).expect("real"), 2.5);
        assert_eq!(section.number("c", 0.0).expect("real"), -1e-3);
        assert_eq!(section.number("missing", 7.0).expect("default"), 7.0);
        assert!(matches!(section.number("d", 0.0), Err(ParameterError::InvalidValue(_))));
    }

    #[test]
    fn test_points_need_exact_count() {
        let docs = YamlLoader::load_from_str("g: {p: [[1, 2, 3], [4, 5, 6]]}").expect("valid yaml");
        let section = Section::new(&docs[0]["g"], "g").expect("mapping");
        let points = section.points("p", [Vector3::zeros(); 2]).expect("two points");
        assert_eq!(points[1], Vector3::new(4.0, 5.0, 6.0));
        assert!(matches!(
            section.points("p", [Vector3::zeros(); 3]),
            Err(ParameterError::InvalidLength { expected: 3, found: 2 })
        ));
    }
}
