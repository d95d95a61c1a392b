// strider-core: Configuration, errors and shared types for the strider hexapod controller.

pub mod config;
pub mod error;
pub mod types;

pub use config::{GaitConfig, HexapodConfig, JointConfig, LegConfig, LinkConfig};
pub use error::{ConfigError, StriderError};
pub use types::{ControlInput, LegState};
