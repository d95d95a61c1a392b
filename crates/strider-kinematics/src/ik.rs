//! Damped-least-squares support for position-only inverse kinematics.

use nalgebra::{DMatrix, Vector3};

/// Per-axis tolerance for FK verification of an IK result (position units).
pub const IK_TOLERANCE: f64 = 0.001;

/// Damped-least-squares pseudo-inverse: `Jᵗ (J Jᵗ + λ² I₃)⁻¹`.
///
/// With a positive damping coefficient the damped normal matrix is
/// invertible for any finite, rank-deficient Jacobian; a fully extended leg
/// therefore still yields a finite solution, at the cost of a small bias
/// away from the exact pseudo-inverse. Returns `None` only when the matrix
/// carries non-finite entries, which indicates broken chain parameters.
pub fn dls_pseudo_inverse(jacobian: &DMatrix<f64>, damping: f64) -> Option<DMatrix<f64>> {
    if jacobian.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let rows = jacobian.nrows();
    let damped =
        jacobian * jacobian.transpose() + DMatrix::identity(rows, rows) * (damping * damping);
    let inverse = damped.try_inverse()?;
    Some(jacobian.transpose() * inverse)
}

/// Which bound a clamped joint ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitBound {
    Min,
    Max,
}

/// Record of a joint command clamped into its position limits.
///
/// A clamp means the commanded trajectory exceeded the leg's range; it is
/// recovered locally but must stay visible to the caller.
#[derive(Debug, Clone)]
pub struct LimitClamp {
    /// Full joint designation.
    pub joint: String,
    /// Commanded position before clamping (radians).
    pub attempted: f64,
    /// The limit the command was clamped to (radians).
    pub limit: f64,
    /// Which end of the range was exceeded.
    pub bound: LimitBound,
}

/// Record of one axis of the FK-verified tip position deviating from the
/// IK target beyond [`IK_TOLERANCE`].
#[derive(Debug, Clone)]
pub struct ToleranceViolation {
    /// Axis label: "x", "y" or "z".
    pub axis: &'static str,
    /// Target tip coordinate on this axis.
    pub desired: f64,
    /// FK-verified tip coordinate on this axis.
    pub actual: f64,
    /// Deviation as a percentage of the target coordinate.
    pub error_percentage: f64,
}

/// Outcome of one incremental IK step.
#[derive(Debug, Clone)]
pub struct IkReport {
    /// Whether the target was judged inside the reachable workspace.
    /// Always `true` in the current policy: tolerance violations are
    /// diagnostic only, and strict rejection is reserved for later.
    pub within_workspace: bool,
    /// FK-verified tip position after the joint update (leg base frame).
    pub tip_position: Vector3<f64>,
    /// Joints clamped into their position limits this step.
    pub clamped: Vec<LimitClamp>,
    /// Axes where the verified tip deviates from the target beyond
    /// tolerance. IK is best-effort over one incremental delta and
    /// converges over subsequent cycles, so these never abort the step.
    pub tolerance_violations: Vec<ToleranceViolation>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
