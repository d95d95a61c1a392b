use thiserror::Error;

/// Top-level error type for the strider workspace.
#[derive(Debug, Error)]
pub enum StriderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Robot model configuration errors.
///
/// A malformed kinematic description cannot be safely operated, so every
/// variant here is surfaced at construction time and must be handled before
/// the model is used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid time_delta: {0} (must be > 0)")]
    InvalidTimeDelta(f64),

    #[error("Invalid dls_damping: {0} (must be > 0)")]
    InvalidDlsDamping(f64),

    #[error("No legs defined")]
    NoLegs,

    #[error("Leg ids must be contiguous from 0: leg at position {position} has id {id}")]
    NonContiguousLegId { position: usize, id: usize },

    #[error("Leg {leg}: chain must have exactly one more link than joints ({joints} joints, {links} links)")]
    ChainArityMismatch {
        leg: String,
        joints: usize,
        links: usize,
    },

    #[error("Leg {leg}: chain must contain at least one joint")]
    EmptyChain { leg: String },

    #[error("Leg {leg}, joint {joint}: min position {min} exceeds max position {max}")]
    InvalidJointLimits {
        leg: String,
        joint: String,
        min: f64,
        max: f64,
    },

    #[error("Leg {leg}, joint {joint}: max angular speed {speed} must be > 0")]
    InvalidAngularSpeed {
        leg: String,
        joint: String,
        speed: f64,
    },

    #[error("Invalid gait timing: {field} = {value} ({message})")]
    InvalidGaitTiming {
        field: String,
        value: f64,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strider_error_from_config_error() {
        let err = ConfigError::InvalidTimeDelta(-0.02);
        let top: StriderError = err.into();
        assert!(matches!(top, StriderError::Config(_)));
        assert!(top.to_string().contains("-0.02"));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidTimeDelta(0.0).to_string(),
            "Invalid time_delta: 0 (must be > 0)"
        );
        assert_eq!(ConfigError::NoLegs.to_string(), "No legs defined");
        assert_eq!(
            ConfigError::NonContiguousLegId { position: 2, id: 5 }.to_string(),
            "Leg ids must be contiguous from 0: leg at position 2 has id 5"
        );
        assert_eq!(
            ConfigError::ChainArityMismatch {
                leg: "AL".into(),
                joints: 3,
                links: 3,
            }
            .to_string(),
            "Leg AL: chain must have exactly one more link than joints (3 joints, 3 links)"
        );
        assert_eq!(
            ConfigError::EmptyChain { leg: "AR".into() }.to_string(),
            "Leg AR: chain must contain at least one joint"
        );
        assert_eq!(
            ConfigError::InvalidJointLimits {
                leg: "AL".into(),
                joint: "coxa".into(),
                min: 0.5,
                max: -0.5,
            }
            .to_string(),
            "Leg AL, joint coxa: min position 0.5 exceeds max position -0.5"
        );
        assert_eq!(
            ConfigError::InvalidGaitTiming {
                field: "swing_phase".into(),
                value: 0.0,
                message: "must be > 0".into(),
            }
            .to_string(),
            "Invalid gait timing: swing_phase = 0 (must be > 0)"
        );
    }
}
