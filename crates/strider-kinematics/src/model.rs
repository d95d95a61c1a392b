//! The whole-robot model: every leg chain plus the shared body state.

use nalgebra::{Isometry3, Vector2};
use tracing::debug;

use strider_core::config::HexapodConfig;
use strider_core::error::ConfigError;

use crate::leg::Leg;

/// Robot model owning all leg chains.
///
/// Built once at startup; legs are indexed by their id and never added or
/// removed afterwards. The body pose and planar velocity are written by the
/// orchestrating loop and read by the per-leg kinematics, never the other
/// way around.
#[derive(Debug, Clone)]
pub struct Model {
    legs: Vec<Leg>,
    time_delta: f64,
    current_pose: Isometry3<f64>,
    linear_velocity: Vector2<f64>,
}

impl Model {
    /// Build the model from configuration.
    ///
    /// Validates first: a missing or malformed chain parameter is
    /// unrecoverable here, and the caller must handle the error before
    /// operating the robot.
    pub fn new(config: &HexapodConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let legs: Vec<Leg> = config
            .legs
            .iter()
            .enumerate()
            .map(|(id, leg_config)| {
                Leg::new(leg_config, id, config.time_delta, config.dls_damping)
            })
            .collect();
        debug!(robot = %config.name, legs = legs.len(), "model constructed");
        Ok(Self {
            legs,
            time_delta: config.time_delta,
            current_pose: Isometry3::identity(),
            linear_velocity: Vector2::zeros(),
        })
    }

    /// Initialise every leg (see [`Leg::init`]).
    pub fn init_legs(&mut self, use_default_joint_positions: bool) {
        for leg in &mut self.legs {
            leg.init(use_default_joint_positions);
        }
    }

    /// Number of legs.
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Leg by id.
    pub fn leg(&self, id: usize) -> Option<&Leg> {
        self.legs.get(id)
    }

    /// Mutable leg by id.
    pub fn leg_mut(&mut self, id: usize) -> Option<&mut Leg> {
        self.legs.get_mut(id)
    }

    /// All legs in id order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Mutable access to all legs.
    pub fn legs_mut(&mut self) -> &mut [Leg] {
        &mut self.legs
    }

    /// Control cycle period in seconds.
    pub fn time_delta(&self) -> f64 {
        self.time_delta
    }

    /// Current body pose.
    pub fn current_pose(&self) -> Isometry3<f64> {
        self.current_pose
    }

    /// Set the current body pose (orchestrating loop only).
    pub fn set_current_pose(&mut self, pose: Isometry3<f64>) {
        self.current_pose = pose;
    }

    /// Current planar body velocity.
    pub fn linear_velocity(&self) -> Vector2<f64> {
        self.linear_velocity
    }

    /// Set the planar body velocity (orchestrating loop only).
    pub fn set_linear_velocity(&mut self, velocity: Vector2<f64>) {
        self.linear_velocity = velocity;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
