//! Phase-indexed body compensation waveforms.
//!
//! Each axis follows a closed loop of six phase keypoints: plateaus at
//! plus/minus the configured amplitude joined by linear ramps. Pitch and
//! roll share the structure but place their ramp buffers differently, so
//! the two offsets peak at different points of the step cycle. Evaluation
//! is a pure function of the phase and must reproduce bit-for-bit across
//! calls; body stabilisation depends on the continuity of consecutive
//! samples.

use nalgebra::Vector3;

use strider_core::config::GaitConfig;
use strider_core::types::ControlInput;

// ---------------------------------------------------------------------------
// PoseOffset
// ---------------------------------------------------------------------------

/// Body pose offset applied by the control loop before leg IK targets are
/// derived.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseOffset {
    /// Body translation offset.
    pub translation: Vector3<f64>,
    /// Roll offset in radians.
    pub roll: f64,
    /// Pitch offset in radians.
    pub pitch: f64,
    /// Yaw offset in radians.
    pub yaw: f64,
}

// ---------------------------------------------------------------------------
// Waveform
// ---------------------------------------------------------------------------

/// Closed loop of six `(phase, value)` keypoints over one step cycle.
///
/// Keypoints alternate plateau and ramp segments: `p0..p1` flat, `p1..p2`
/// ramp, `p2..p3` flat, `p3..p4` ramp, `p4..p5` flat. The first and last
/// keypoints share the same value, so wrapping the phase keeps the loop
/// continuous.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    points: [[f64; 2]; 6],
    phase_length: f64,
}

impl Waveform {
    /// Pitch compensation keypoints.
    ///
    /// Buffered by half the inter-group phase offset: the ramps trail the
    /// leg groups' stance transitions.
    pub fn pitch(config: &GaitConfig) -> Self {
        let amplitude = config.pitch_amplitude;
        let length = config.phase_length();
        let buffer = config.phase_offset / 2.0;
        Self {
            points: [
                [0.0, -amplitude],
                [length / 6.0 + buffer, -amplitude],
                [2.0 * length / 6.0 + buffer, amplitude],
                [4.0 * length / 6.0 + buffer, amplitude],
                [5.0 * length / 6.0 + buffer, -amplitude],
                [length, -amplitude],
            ],
            phase_length: length,
        }
    }

    /// Roll compensation keypoints.
    ///
    /// Buffered by half the swing period, centring each ramp on a side's
    /// swing window.
    pub fn roll(config: &GaitConfig) -> Self {
        let amplitude = config.roll_amplitude;
        let length = config.phase_length();
        let buffer = config.swing_phase / 2.0;
        Self {
            points: [
                [0.0, -amplitude],
                [buffer, -amplitude],
                [length / 6.0 - buffer, amplitude],
                [3.0 * length / 6.0 + buffer, amplitude],
                [4.0 * length / 6.0 - buffer, -amplitude],
                [length, -amplitude],
            ],
            phase_length: length,
        }
    }

    /// Evaluate the waveform at the given phase.
    ///
    /// The phase wraps modulo the phase length, so values at or beyond the
    /// final keypoint (and negative values) re-enter the loop. Within a
    /// ramp the value is `gradient * phase - gradient * midpoint`, which
    /// meets the neighbouring plateaus exactly at the keypoints.
    pub fn evaluate(&self, phase: f64) -> f64 {
        let phase = phase.rem_euclid(self.phase_length);
        for (segment, pair) in self.points.windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            if phase >= start[0] && phase < end[0] {
                if segment % 2 == 0 {
                    return start[1];
                }
                let gradient = (end[1] - start[1]) / (end[0] - start[0]);
                let midpoint = (end[0] - start[0]) / 2.0 + start[0];
                return gradient * phase - gradient * midpoint;
            }
        }
        // Only reachable when keypoints are disordered (degenerate gait
        // timing); hold the loop's endpoint value.
        self.points[0][1]
    }

    /// Total length of one step cycle in phase units.
    pub fn phase_length(&self) -> f64 {
        self.phase_length
    }
}

// ---------------------------------------------------------------------------
// Compensation entry points
// ---------------------------------------------------------------------------

/// Pitch offset counteracting gait-induced body tilt at the given phase.
pub fn pitch_compensation(phase: f64, config: &GaitConfig) -> f64 {
    Waveform::pitch(config).evaluate(phase)
}

/// Roll offset counteracting gait-induced body tilt at the given phase.
pub fn roll_compensation(phase: f64, config: &GaitConfig) -> f64 {
    Waveform::roll(config).evaluate(phase)
}

/// Automatic (non-feedback) body compensation for the given gait phase.
pub fn auto_compensation(phase: f64, config: &GaitConfig) -> PoseOffset {
    PoseOffset {
        pitch: pitch_compensation(phase, config),
        roll: roll_compensation(phase, config),
        ..PoseOffset::default()
    }
}

/// Manual body compensation from per-cycle operator input.
pub fn manual_compensation(input: &ControlInput) -> PoseOffset {
    PoseOffset {
        translation: Vector3::new(
            input.translation[0],
            input.translation[1],
            input.translation[2],
        ),
        roll: input.rotation[0],
        pitch: input.rotation[1],
        yaw: input.rotation[2],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
