use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RomcamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown exercise: {exercise}")]
    UnknownExercise { exercise: String },

    #[error("Configuration mismatch for exercise {exercise}: {message}")]
    ConfigurationMismatch { exercise: String, message: String },

    #[error("Unknown session: {session_id}")]
    UnknownSession { session_id: Uuid },

    #[error("Invalid landmark frame: {message}")]
    InvalidFrame { message: String },
}

impl RomcamError {
    pub fn unknown_exercise<S: Into<String>>(exercise: S) -> Self {
        Self::UnknownExercise {
            exercise: exercise.into(),
        }
    }

    pub fn configuration_mismatch<S: Into<String>>(exercise: S, message: S) -> Self {
        Self::ConfigurationMismatch {
            exercise: exercise.into(),
            message: message.into(),
        }
    }

    pub fn unknown_session(session_id: Uuid) -> Self {
        Self::UnknownSession { session_id }
    }

    pub fn invalid_frame<S: Into<String>>(message: S) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RomcamError>;
