//! Chain elements owned by a [`Leg`](crate::leg::Leg).
//!
//! Joints and links live in arenas on the leg and reference each other by
//! index: a joint knows the link supplying its frame geometry, and an
//! actuated link knows the joint driving it. Index `k` of the joint arena
//! pairs with index `k` of the link arena as its reference link; link `k+1`
//! is the segment it actuates. The link arena additionally holds the fixed
//! base segment at index 0.

use nalgebra::Matrix4;

use strider_core::config::{JointConfig, LinkConfig};

use crate::dh::DhParameters;

// ---------------------------------------------------------------------------
// Joint
// ---------------------------------------------------------------------------

/// One rotational degree of freedom.
///
/// `current_*` fields are sensed state written by the motor interface each
/// cycle; `desired_position` is the commanded output consumed by it.
#[derive(Debug, Clone)]
pub struct Joint {
    /// Position in the joint arena (chain order, 0 = closest to base).
    pub index: usize,
    /// Full designation, `<leg>_<joint>_joint`.
    pub name: String,
    /// Index of the link supplying this joint's frame geometry.
    pub reference_link: usize,

    /// Offset between commanded and physical zero (radians).
    pub position_offset: f64,
    /// Minimum position (radians).
    pub min_position: f64,
    /// Maximum position (radians).
    pub max_position: f64,
    /// Reference position for the packed (stowed) stance.
    pub packed_position: f64,
    /// Reference position for the unpacked (ready) stance.
    pub unpacked_position: f64,
    /// Maximum angular speed (rad/s).
    pub max_angular_speed: f64,

    /// Sensed position (radians).
    pub current_position: f64,
    /// Sensed velocity (rad/s).
    pub current_velocity: f64,
    /// Sensed effort (Nm).
    pub current_effort: f64,

    /// Commanded position (radians).
    pub desired_position: f64,
    /// Commanded position from the previous incremental IK step.
    pub prev_desired_position: f64,
}

impl Joint {
    pub(crate) fn new(leg_name: &str, config: &JointConfig, index: usize) -> Self {
        Self {
            index,
            name: format!("{leg_name}_{}_joint", config.name),
            reference_link: index,
            position_offset: config.offset,
            min_position: config.min,
            max_position: config.max,
            packed_position: config.packed,
            unpacked_position: config.unpacked,
            max_angular_speed: config.max_angular_speed,
            current_position: 0.0,
            current_velocity: 0.0,
            current_effort: 0.0,
            desired_position: 0.0,
            prev_desired_position: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// One DH segment between two joints (or base/tip).
///
/// The DH parameters are immutable after construction; only `transform` is
/// recomputed, each FK pass, from the actuating joint's desired position.
#[derive(Debug, Clone)]
pub struct Link {
    /// Position in the link arena (0 = fixed base).
    pub index: usize,
    /// Full designation, `<leg>_<link>_link`.
    pub name: String,
    /// Joint driving this segment; `None` for the fixed base.
    pub actuating_joint: Option<usize>,

    /// DH offset along the previous z axis (d).
    pub offset: f64,
    /// DH static reference angle about the previous z axis (theta).
    pub angle: f64,
    /// DH length along the rotated x axis (r).
    pub length: f64,
    /// DH twist about the rotated x axis (alpha).
    pub twist: f64,

    /// Live homogeneous transform relative to the predecessor frame.
    pub transform: Matrix4<f64>,
}

impl Link {
    pub(crate) fn new(leg_name: &str, config: &LinkConfig, index: usize) -> Self {
        let actuating_joint = index.checked_sub(1);
        let parameters = DhParameters {
            offset: config.d,
            angle: config.theta,
            length: config.r,
            twist: config.alpha,
        };
        Self {
            index,
            name: format!("{leg_name}_{}_link", config.name),
            actuating_joint,
            offset: config.d,
            angle: config.theta,
            length: config.r,
            twist: config.alpha,
            transform: parameters.to_matrix(),
        }
    }

    /// DH parameters of this segment with the given joint angle as theta.
    pub fn dh_with_angle(&self, angle: f64) -> DhParameters {
        DhParameters {
            offset: self.offset,
            angle,
            length: self.length,
            twist: self.twist,
        }
    }
}

// ---------------------------------------------------------------------------
// Tip
// ---------------------------------------------------------------------------

/// Terminal frame of a leg chain (the foot contact point).
///
/// Has no joint of its own; its transform is recomputed each FK pass from
/// the reference link's geometry and the last joint's desired position.
#[derive(Debug, Clone)]
pub struct Tip {
    /// Full designation, `<leg>_tip`.
    pub name: String,
    /// Index of the last link, whose geometry defines the tip frame.
    pub reference_link: usize,
    /// Live homogeneous transform relative to the last joint's frame.
    pub transform: Matrix4<f64>,
}

impl Tip {
    pub(crate) fn new(leg_name: &str, reference_link: &Link) -> Self {
        Self {
            name: format!("{leg_name}_tip"),
            reference_link: reference_link.index,
            transform: reference_link.dh_with_angle(reference_link.angle).to_matrix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
