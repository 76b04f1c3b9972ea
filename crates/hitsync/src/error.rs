use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a chart source into a frozen [`Chart`](crate::chart::Chart).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Chart not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed chart: {0}")]
    Malformed(String),
}

impl LoadError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Audio clip not found: {0}")]
    AudioNotFound(String),

    #[error("Sprite not found: {0}")]
    SpriteNotFound(String),
}

/// Rejected session configuration. Raised at session construction only.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error(
        "Hit windows must be ordered narrowest to widest \
         (perfect {perfect} <= great {great} <= early {early}, late {late})"
    )]
    WindowOrder {
        perfect: f64,
        great: f64,
        early: f64,
        late: f64,
    },

    #[error("Hit window `{name}` must be positive and finite, got {value}")]
    NonPositiveWindow { name: &'static str, value: f64 },

    #[error("At least one lane is required")]
    NoLanes,

    #[error("Travel time must be positive and finite, got {0}")]
    InvalidTravelTime(f64),

    #[error("Global offset must be finite, got {0}")]
    InvalidOffset(f64),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Session already started")]
    AlreadyStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Error::Load(LoadError::NotFound(_)) => true,
            Error::Asset(AssetError::AudioNotFound(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert!(Error::Io(io_err).is_not_found());

        let err = Error::from(LoadError::NotFound(PathBuf::from("levels/sakura.json")));
        assert!(err.is_not_found());

        let other = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::Io(other).is_not_found());
        assert!(!Error::from(LoadError::malformed("lane missing")).is_not_found());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NonPositiveWindow {
            name: "perfect",
            value: 0.0,
        };
        assert_eq!(
            err.to_string(),
            "Hit window `perfect` must be positive and finite, got 0"
        );
    }
}
