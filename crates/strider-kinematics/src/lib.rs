//! Per-leg kinematics for a multi-legged walking robot.
//!
//! Each leg is a serial chain of Denavit-Hartenberg frames:
//!
//! 1. **Chain model** — [`Joint`]/[`Link`]/[`Tip`] arenas owned by a [`Leg`],
//!    built once from configuration and mutated every control cycle.
//! 2. **Forward kinematics** — [`Leg::apply_fk`] walks the chain transforms
//!    to produce the tip position in the leg base frame.
//! 3. **Jacobian** — [`jacobian`] builds the 3×N matrix relating joint rates
//!    to tip linear velocity (position-only IK; no orientation rows).
//! 4. **Inverse kinematics** — [`Leg::apply_ik`] converts a desired tip
//!    displacement into incremental joint deltas via a damped-least-squares
//!    pseudo-inverse, clamps to limits and verifies the result against FK.
//! 5. **Tip force** — [`Leg::update_tip_force`] maps sensed joint efforts
//!    through the same Jacobian to a quasi-static tip force estimate.
//!
//! All computation is synchronous and bounded; legs share no mutable state
//! and may be updated in parallel across threads, one cycle at a time.

pub mod chain;
pub mod dh;
pub mod ik;
pub mod jacobian;
pub mod leg;
pub mod model;

pub use chain::{Joint, Link, Tip};
pub use dh::DhParameters;
pub use ik::{IkReport, LimitBound, LimitClamp, ToleranceViolation, IK_TOLERANCE};
pub use jacobian::jacobian;
pub use leg::{Leg, SpeedClamp};
pub use model::Model;
