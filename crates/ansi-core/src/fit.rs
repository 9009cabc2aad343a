use crate::config::FitMode;

/// Plus petit facteur d'échelle autorisé.
pub const MIN_SCALE: f64 = 0.01;

/// Plus grand facteur d'échelle : le rendu n'est jamais agrandi.
pub const MAX_SCALE: f64 = 1.0;

/// Compute the display scale that fits the natural size into the
/// available envelope.
///
/// Each constrained axis with a positive available extent contributes
/// `available / natural`; the result is the minimum of 1 and those ratios,
/// clamped to `[0.01, 1]`. A zero, negative or non-finite natural extent on
/// a constrained axis, or any non-finite intermediate, yields 1.
///
/// # Example
/// ```
/// use ansi_core::fit::compute_scale;
/// use ansi_core::config::FitMode;
/// assert_eq!(compute_scale(800.0, 400.0, 400.0, 1000.0, FitMode::Width), 0.5);
/// assert_eq!(compute_scale(0.0, 400.0, 400.0, 1000.0, FitMode::Both), 1.0);
/// ```
#[must_use]
pub fn compute_scale(
    natural_width: f64,
    natural_height: f64,
    available_width: f64,
    available_height: f64,
    fit: FitMode,
) -> f64 {
    let (constrain_width, constrain_height) = fit.constrained_axes();
    let mut scale = MAX_SCALE;

    for (constrained, natural, available) in [
        (constrain_width, natural_width, available_width),
        (constrain_height, natural_height, available_height),
    ] {
        if !constrained {
            continue;
        }
        if !natural.is_finite() || natural <= 0.0 {
            log::debug!("Mesure naturelle invalide ({natural}), échelle 1");
            return MAX_SCALE;
        }
        if available > 0.0 {
            let axis = available / natural;
            if !axis.is_finite() {
                log::debug!("Échelle non finie ({available}/{natural}), échelle 1");
                return MAX_SCALE;
            }
            scale = scale.min(axis);
        }
    }

    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Natural size of the current output and the scale applied to it.
///
/// # Example
/// ```
/// use ansi_core::fit::ScaleState;
/// use ansi_core::config::FitMode;
/// let mut state = ScaleState::default();
/// state.refit(Some((800.0, 400.0)), (200.0, 0.0), FitMode::Auto);
/// assert_eq!(state.scale(), 0.25);
/// state.refit(Some((800.0, 400.0)), (200.0, 0.0), FitMode::None);
/// assert_eq!(state.scale(), 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleState {
    natural: Option<(f64, f64)>,
    scale: f64,
}

impl Default for ScaleState {
    fn default() -> Self {
        Self {
            natural: None,
            scale: MAX_SCALE,
        }
    }
}

impl ScaleState {
    /// Current scale factor, in `[0.01, 1]`.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Natural `(width, height)` measured at scale 1, if any.
    #[must_use]
    pub fn natural(&self) -> Option<(f64, f64)> {
        self.natural
    }

    /// Back to scale 1, forgetting the measurement.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Recompute the scale.
    ///
    /// With [`FitMode::None`] the engine is skipped and the scale is 1. A
    /// missing or empty measurement leaves the current scale untouched.
    /// Returns true if the engine ran.
    pub fn refit(
        &mut self,
        natural: Option<(f64, f64)>,
        available: (f64, f64),
        fit: FitMode,
    ) -> bool {
        if !fit.is_enabled() {
            self.scale = MAX_SCALE;
            return false;
        }
        let Some((nw, nh)) = natural.filter(|&(w, h)| w > 0.0 && h > 0.0) else {
            return false;
        };
        self.natural = Some((nw, nh));
        self.scale = compute_scale(nw, nh, available.0, available.1, fit);
        true
    }
}
