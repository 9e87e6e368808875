use thiserror::Error;

/// Top-level error type for quadpose.
#[derive(Debug, Error)]
pub enum QuadposeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Feedback error: {0}")]
    Feedback(#[from] FeedbackError),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Invalid control_hz: {0} (must be > 0)")]
    InvalidControlRate(f64),

    #[error("Invalid smoothing_divisor: {0} (must be >= 1)")]
    InvalidSmoothingDivisor(f64),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Inverse-kinematics failures.
///
/// Copy + numeric payloads for cheap propagation from the control thread.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum KinematicsError {
    #[error(
        "Foot target unreachable: leg extension {extension:.4} m outside [{min:.4}, {max:.4}] m"
    )]
    Unreachable { extension: f64, min: f64, max: f64 },

    #[error("Foot target inside abduction offset: lateral radius {radius:.4} m < {offset:.4} m")]
    InsideAbductionOffset { radius: f64, offset: f64 },

    #[error("Foot target contains a non-finite coordinate")]
    NonFiniteTarget,
}

/// Outbound command transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Command channel full")]
    Full,

    #[error("Command channel disconnected")]
    Disconnected,
}

/// Inbound feedback validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("Feedback length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Feedback contains a non-finite value at index {index}")]
    NonFinite { index: usize },
}
