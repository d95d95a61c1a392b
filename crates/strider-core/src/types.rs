use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LegState
// ---------------------------------------------------------------------------

/// Control state of a leg.
///
/// A `Walking` leg is driven by the gait trajectory and receives impedance
/// delta-z adjustment; a `Manual` leg is positioned directly by the operator
/// and is left untouched by the impedance layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LegState {
    #[default]
    Walking,
    Manual,
}

// ---------------------------------------------------------------------------
// ControlInput
// ---------------------------------------------------------------------------

/// Per-cycle operator input, populated by the external teleop transport.
///
/// Passed explicitly into each control step; scaling and dead-zoning of the
/// raw device axes is the transport's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlInput {
    /// Desired planar body velocity `[x, y]`.
    pub linear_velocity: [f64; 2],

    /// Desired body yaw rate.
    pub angular_velocity: f64,

    /// Manual body translation offset `[x, y, z]`.
    pub translation: [f64; 3],

    /// Manual body rotation offset `[roll, pitch, yaw]` in radians.
    pub rotation: [f64; 3],
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
