//! Body posing offsets for a multi-legged walking robot.
//!
//! Walking tilts the body as legs leave and rejoin the ground. This crate
//! generates the counteracting pose offsets: deterministic pitch and roll
//! waveforms indexed by gait phase ([`compensation`]), plus the manual
//! offset path fed by operator input. The orchestrating control loop adds
//! the resulting [`PoseOffset`] to the commanded body pose before deriving
//! leg IK targets.

pub mod compensation;

pub use compensation::{
    auto_compensation, manual_compensation, pitch_compensation, roll_compensation, PoseOffset,
    Waveform,
};
