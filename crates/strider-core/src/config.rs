use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_time_delta() -> f64 {
    0.02
}
const fn default_dls_damping() -> f64 {
    0.02
}
const fn default_stance_phase() -> f64 {
    0.9
}
const fn default_swing_phase() -> f64 {
    0.1
}
const fn default_phase_offset() -> f64 {
    0.1
}
fn default_max_angular_speed() -> f64 {
    f64::INFINITY
}

// ---------------------------------------------------------------------------
// HexapodConfig
// ---------------------------------------------------------------------------

/// Complete robot model configuration, loaded from TOML.
///
/// Every leg carries its own Denavit-Hartenberg parameter tables. There are
/// no defaults for the chain geometry: a missing joint or link parameter is
/// a parse error, since a partially described chain would silently compute
/// wrong tip positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexapodConfig {
    /// Robot designation used in diagnostics.
    pub name: String,

    /// Control cycle period in seconds (default: 0.02 = 50 Hz).
    #[serde(default = "default_time_delta")]
    pub time_delta: f64,

    /// Damping coefficient lambda for the damped-least-squares IK solve
    /// (default: 0.02). Larger values trade tracking accuracy for numerical
    /// stability near singular configurations.
    #[serde(default = "default_dls_damping")]
    pub dls_damping: f64,

    /// Gait timing and body compensation parameters.
    #[serde(default)]
    pub gait: GaitConfig,

    /// One entry per leg, ids contiguous from 0.
    pub legs: Vec<LegConfig>,
}

impl HexapodConfig {
    /// Validate the configuration. Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_delta <= 0.0 {
            return Err(ConfigError::InvalidTimeDelta(self.time_delta));
        }
        if self.dls_damping <= 0.0 {
            return Err(ConfigError::InvalidDlsDamping(self.dls_damping));
        }
        self.gait.validate()?;
        if self.legs.is_empty() {
            return Err(ConfigError::NoLegs);
        }
        for (position, leg) in self.legs.iter().enumerate() {
            if leg.id != position {
                return Err(ConfigError::NonContiguousLegId {
                    position,
                    id: leg.id,
                });
            }
            leg.validate()?;
        }
        Ok(())
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// GaitConfig
// ---------------------------------------------------------------------------

/// Step cycle timing shared by all legs, plus body compensation amplitudes.
///
/// The gait phase runs over `[0, stance_phase + swing_phase)`; the phase
/// value itself is produced by the external gait sequencer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaitConfig {
    /// Length of the stance period in phase units.
    #[serde(default = "default_stance_phase")]
    pub stance_phase: f64,

    /// Length of the swing period in phase units.
    #[serde(default = "default_swing_phase")]
    pub swing_phase: f64,

    /// Phase offset between leg groups in phase units.
    #[serde(default = "default_phase_offset")]
    pub phase_offset: f64,

    /// Pitch compensation amplitude in radians (0 disables).
    #[serde(default)]
    pub pitch_amplitude: f64,

    /// Roll compensation amplitude in radians (0 disables).
    #[serde(default)]
    pub roll_amplitude: f64,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            stance_phase: default_stance_phase(),
            swing_phase: default_swing_phase(),
            phase_offset: default_phase_offset(),
            pitch_amplitude: 0.0,
            roll_amplitude: 0.0,
        }
    }
}

impl GaitConfig {
    /// Total length of one step cycle in phase units.
    pub fn phase_length(&self) -> f64 {
        self.stance_phase + self.swing_phase
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("stance_phase", self.stance_phase),
            ("swing_phase", self.swing_phase),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::InvalidGaitTiming {
                    field: field.into(),
                    value,
                    message: "must be > 0".into(),
                });
            }
        }
        if self.phase_offset < 0.0 {
            return Err(ConfigError::InvalidGaitTiming {
                field: "phase_offset".into(),
                value: self.phase_offset,
                message: "must be >= 0".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LegConfig
// ---------------------------------------------------------------------------

/// One leg's kinematic chain description.
///
/// The chain is ordered base to tip and must satisfy
/// `links.len() == joints.len() + 1`: a fixed base link precedes the first
/// joint, and each subsequent link is actuated by the joint before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegConfig {
    /// Leg identifier; must equal the leg's position in the `legs` array.
    pub id: usize,

    /// Symbolic leg name (e.g. "AL" for front-left).
    pub name: String,

    /// Yaw of the default stance direction in the body frame (radians).
    #[serde(default)]
    pub stance_yaw: f64,

    /// Rotational degrees of freedom, ordered base to tip.
    pub joints: Vec<JointConfig>,

    /// DH segments, ordered base to tip; the first entry is the fixed base.
    pub links: Vec<LinkConfig>,
}

impl LegConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.joints.is_empty() {
            return Err(ConfigError::EmptyChain {
                leg: self.name.clone(),
            });
        }
        if self.links.len() != self.joints.len() + 1 {
            return Err(ConfigError::ChainArityMismatch {
                leg: self.name.clone(),
                joints: self.joints.len(),
                links: self.links.len(),
            });
        }
        for joint in &self.joints {
            if joint.min > joint.max {
                return Err(ConfigError::InvalidJointLimits {
                    leg: self.name.clone(),
                    joint: joint.name.clone(),
                    min: joint.min,
                    max: joint.max,
                });
            }
            if joint.max_angular_speed <= 0.0 {
                return Err(ConfigError::InvalidAngularSpeed {
                    leg: self.name.clone(),
                    joint: joint.name.clone(),
                    speed: joint.max_angular_speed,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JointConfig
// ---------------------------------------------------------------------------

/// One rotational joint's limits and reference positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointConfig {
    /// Joint designation within the leg (e.g. "coxa").
    pub name: String,

    /// Offset applied between commanded and physical zero (radians).
    #[serde(default)]
    pub offset: f64,

    /// Minimum position (radians).
    pub min: f64,

    /// Maximum position (radians).
    pub max: f64,

    /// Reference position for the packed (stowed) stance.
    #[serde(default)]
    pub packed: f64,

    /// Reference position for the unpacked (ready) stance.
    #[serde(default)]
    pub unpacked: f64,

    /// Maximum angular speed in rad/s (default: unlimited).
    #[serde(default = "default_max_angular_speed")]
    pub max_angular_speed: f64,
}

// ---------------------------------------------------------------------------
// LinkConfig
// ---------------------------------------------------------------------------

/// One DH segment: the four Denavit-Hartenberg parameters.
///
/// All four are required; there is no meaningful default for chain geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Link designation within the leg (e.g. "femur").
    pub name: String,

    /// Offset along the previous z axis (d).
    pub d: f64,

    /// Static rotation about the previous z axis (theta). For actuated
    /// links the live joint angle replaces this during kinematics.
    pub theta: f64,

    /// Length along the rotated x axis (r).
    pub r: f64,

    /// Twist about the rotated x axis (alpha).
    pub alpha: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
