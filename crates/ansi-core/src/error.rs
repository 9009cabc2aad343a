use thiserror::Error;

/// Errors originating from the core module.
///
/// Unknown configuration values are never errors: every enum parser falls
/// back to its default instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Referenced file does not exist.
    #[error("Fichier introuvable : {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// The image could not be fetched or decoded.
    #[error("Impossible de charger {locator} : {reason}")]
    Load {
        /// Opaque locator handed to the loader.
        locator: String,
        /// Loader-specific failure description.
        reason: String,
    },

    /// Zero or negative target width, or a degenerate source image.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: i64,
        /// Height value.
        height: i64,
    },

    /// A styled document could not be decoded back into a grid.
    #[error("Document mal formé : {0}")]
    Markup(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidDimensions`].
    #[must_use]
    pub fn dimensions(width: impl Into<i64>, height: impl Into<i64>) -> Self {
        Self::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        }
    }

    /// True for failures that happen before any pixel is available.
    #[must_use]
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::FileNotFound { .. })
    }
}
